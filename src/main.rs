//! Dog Runner entry point
//!
//! Web: wires keyboard input, start buttons, HUD text and the leaderboard,
//! then drives the session from requestAnimationFrame.
//! Native: plays one headless demo run against a local score file.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use dog_runner::input::Action;
    use dog_runner::platform::WindowIdentity;
    use dog_runner::records::HttpRecordsClient;
    use dog_runner::{GameConfig, Session, Snapshot};

    /// Leaderboard service the browser build reports to
    const LEADERBOARD_URL: &str = "https://dog-runner-1.onrender.com";

    /// Game instance holding all state
    struct Game {
        session: Session<HttpRecordsClient>,
        /// A requestAnimationFrame callback is queued
        frame_pending: bool,
    }

    impl Game {
        fn new(config: GameConfig, seed: u64) -> Self {
            Self {
                session: Session::new(
                    config,
                    seed,
                    Box::new(WindowIdentity),
                    HttpRecordsClient::new(LEADERBOARD_URL),
                ),
                frame_pending: false,
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, snapshot: &Snapshot) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let fields = [
                ("hud-score", snapshot.score.to_string()),
                ("hud-lives", snapshot.lives.to_string()),
                ("hud-world-record", snapshot.world_record.to_string()),
                ("hud-personal-record", snapshot.personal_record.to_string()),
            ];
            for (id, text) in fields {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(&text));
                }
            }

            if let Some(final_score) = snapshot.final_score {
                if let Some(el) = document.get_element_by_id("finalScore") {
                    el.set_text_content(Some(&final_score.to_string()));
                }
            }
        }
    }

    /// Hand the frame to the page's renderer, if it registered one
    fn publish_frame(snapshot: &Snapshot) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(render) = js_sys::Reflect::get(&window, &JsValue::from_str("renderFrame")) else {
            return;
        };
        let Ok(render) = render.dyn_into::<js_sys::Function>() else {
            return;
        };
        match serde_json::to_string(snapshot) {
            Ok(json) => {
                if let Err(e) = render.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::warn!("renderFrame failed: {:?}", e);
                }
            }
            Err(e) => log::warn!("Failed to serialize frame: {}", e),
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Dog Runner starting...");

        let window = web_sys::window().expect("no window");
        let view_width = window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(dog_runner::consts::VIEW_WIDTH as f64) as f32;

        let config = GameConfig::load(view_width);
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(config, seed)));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_start_buttons(game);

        log::info!("Dog Runner ready");
    }

    /// Fetch records, reset, and (re)start the frame loop
    async fn start(game: Rc<RefCell<Game>>) {
        // Never hold the borrow across the await
        let pending = game.borrow().session.fetch_records();
        let outcome = match pending {
            Some(pending) => Some(pending.await),
            None => None,
        };

        let schedule = {
            let mut g = game.borrow_mut();
            g.session.begin(outcome);
            !std::mem::replace(&mut g.frame_pending, true)
        };
        if schedule {
            request_animation_frame(game);
        }
    }

    fn setup_start_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        for id in ["startButton", "restartButton"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    wasm_bindgen_futures::spawn_local(start(game.clone()));
                });
                let _ = btn
                    .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if let Some(action) = Action::from_key(&event.code(), &event.key()) {
                    // Keep arrows and space from scrolling the page
                    event.prevent_default();
                    game.borrow_mut().session.key_down(action);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if let Some(action) = Action::from_key(&event.code(), &event.key()) {
                    game.borrow_mut().session.key_up(action);
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        let more = {
            let mut g = game.borrow_mut();
            let more = g.session.frame();
            let snapshot = g.session.snapshot();
            g.update_hud(&snapshot);
            publish_frame(&snapshot);
            if !more {
                g.frame_pending = false;
            }
            more
        };

        if more {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::env;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use dog_runner::autopilot;
    use dog_runner::leaderboard::ScoreBook;
    use dog_runner::platform::{
        FrameClock, IdentityProvider, ImmediateClock, IntervalClock, StaticIdentity, drive_with,
    };
    use dog_runner::records::LocalRecordsClient;
    use dog_runner::{GameConfig, Session};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Dog Runner (native) starting...");

    let config_path = env::var("DOG_RUNNER_CONFIG").ok().map(PathBuf::from);
    let config = match GameConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let scores_file =
        env::var("DOG_RUNNER_SCORES_FILE").unwrap_or_else(|_| "scores.json".to_string());
    let book = match ScoreBook::open(&scores_file) {
        Ok(book) => book,
        Err(e) => {
            log::error!("Failed to open {}: {}", scores_file, e);
            std::process::exit(1);
        }
    };

    let seed = env::var("DOG_RUNNER_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
    let max_frames: u64 = env::var("DOG_RUNNER_MAX_FRAMES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(20_000);
    let realtime = env::var("DOG_RUNNER_REALTIME").is_ok_and(|v| v == "1");
    let identity = StaticIdentity(env::var("DOG_RUNNER_ADDRESS").ok());

    // The local book answers immediately, so skip the async lookup
    let records = identity.address().map(|address| Ok(book.records(&address)));

    log::info!("Game initialized with seed: {}", seed);

    let mut session = Session::new(
        config,
        seed,
        Box::new(identity),
        LocalRecordsClient::new(book),
    );
    session.begin(records);

    let mut clock: Box<dyn FrameClock> = if realtime {
        Box::new(IntervalClock::sixty_hz())
    } else {
        Box::new(ImmediateClock)
    };

    let frames = drive_with(&mut session, &mut *clock, Some(max_frames), autopilot::steer);

    let snapshot = session.snapshot();
    log::info!(
        "Run finished after {} frames: score {}, lives {}, world record {}",
        frames,
        snapshot.score,
        snapshot.lives,
        session.client().book().borrow().world_record()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
