//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame pacing (requestAnimationFrame on web, a sleeping clock natively)
//! - Wallet identity (the address a score is filed under)

use std::time::Duration;

use crate::records::RecordsClient;
use crate::session::Session;

/// Supplies the wallet address scores are submitted for
pub trait IdentityProvider {
    /// Current address, if a wallet is connected
    fn address(&self) -> Option<String>;
}

/// Fixed identity (native runs, tests)
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Option<String>);

impl StaticIdentity {
    pub fn new(address: impl Into<String>) -> Self {
        Self(Some(address.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn address(&self) -> Option<String> {
        self.0.clone().filter(|a| !a.trim().is_empty())
    }
}

/// Reads the `userAddress` global the wallet script sets (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowIdentity;

#[cfg(target_arch = "wasm32")]
impl IdentityProvider for WindowIdentity {
    fn address(&self) -> Option<String> {
        let window = web_sys::window()?;
        js_sys::Reflect::get(&window, &wasm_bindgen::JsValue::from_str("userAddress"))
            .ok()?
            .as_string()
            .filter(|a| !a.is_empty())
    }
}

/// Host timing primitive: blocks or yields until the next display frame
pub trait FrameClock {
    fn wait_frame(&mut self);
}

/// Sleeps a fixed display interval between frames
#[derive(Debug, Clone)]
pub struct IntervalClock {
    interval: Duration,
}

impl IntervalClock {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Typical 60 Hz display refresh
    pub fn sixty_hz() -> Self {
        Self::new(Duration::from_micros(16_667))
    }
}

impl FrameClock for IntervalClock {
    fn wait_frame(&mut self) {
        std::thread::sleep(self.interval);
    }
}

/// No waiting at all (headless runs and tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateClock;

impl FrameClock for ImmediateClock {
    fn wait_frame(&mut self) {}
}

/// Run frames while the session is running, up to `max_frames`.
///
/// Returns the number of frames run. Game over stops the loop by clearing
/// the session's running flag.
pub fn drive<C, K>(session: &mut Session<C>, clock: &mut K, max_frames: Option<u64>) -> u64
where
    C: RecordsClient,
    K: FrameClock + ?Sized,
{
    drive_with(session, clock, max_frames, |_| {})
}

/// Like [`drive`], calling `before_frame` ahead of every frame (input
/// sources such as the autopilot press their keys there).
pub fn drive_with<C, K, F>(
    session: &mut Session<C>,
    clock: &mut K,
    max_frames: Option<u64>,
    mut before_frame: F,
) -> u64
where
    C: RecordsClient,
    K: FrameClock + ?Sized,
    F: FnMut(&mut Session<C>),
{
    let mut frames = 0;
    while session.is_running() && max_frames.is_none_or(|max| frames < max) {
        before_frame(session);
        session.frame();
        frames += 1;
        if session.is_running() {
            clock.wait_frame();
        }
    }
    frames
}
