//! Run lifecycle
//!
//! `Session` owns everything a run needs: the simulation state, the seeded
//! RNG, the input latch, the cached leaderboard records, the wallet
//! identity and the reporting client. The host calls `frame` once per
//! display refresh while `is_running` is true.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::input::{Action, InputLatch};
use crate::platform::IdentityProvider;
use crate::records::{Records, RecordsClient, RecordsError, RecordsFuture};
use crate::settings::GameConfig;
use crate::sim::{Aabb, GameEvent, GameState, Obstacle, tick};

/// Player pose for the renderer
#[derive(Debug, Clone, Serialize)]
pub struct PlayerPose {
    pub pos: Vec2,
    pub size: Vec2,
    pub grounded: bool,
    /// Drawn upside down once the run is over
    pub flipped: bool,
}

/// What the renderer needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub player: PlayerPose,
    pub projectiles: Vec<Aabb>,
    pub obstacles: Vec<Obstacle>,
    /// Floored score
    pub score: u64,
    pub lives: i32,
    pub world_record: u64,
    pub personal_record: u64,
    pub game_over: bool,
    /// Score reported for the finished run; set once the run is over
    pub final_score: Option<u64>,
}

/// One player's game, across runs
pub struct Session<C: RecordsClient> {
    config: GameConfig,
    state: GameState,
    rng: Pcg32,
    input: InputLatch,
    /// Cleared on game over; the host stops scheduling frames
    running: bool,
    records: Records,
    /// Final score of the last finished run
    last_score: Option<u64>,
    identity: Box<dyn IdentityProvider>,
    client: C,
}

impl<C: RecordsClient> Session<C> {
    pub fn new(
        config: GameConfig,
        seed: u64,
        identity: Box<dyn IdentityProvider>,
        client: C,
    ) -> Self {
        Self {
            state: GameState::new(&config),
            config,
            rng: Pcg32::seed_from_u64(seed),
            input: InputLatch::new(),
            running: false,
            records: Records::default(),
            last_score: None,
            identity,
            client,
        }
    }

    /// Back to start values. Cached records are kept.
    pub fn reset(&mut self) {
        self.state = GameState::new(&self.config);
        self.input.clear();
    }

    /// Records lookup for the current wallet (None without an address)
    pub fn fetch_records(&self) -> Option<RecordsFuture> {
        let address = self.identity.address()?;
        Some(self.client.fetch(&address))
    }

    /// Apply a records lookup outcome, reset, and start running.
    ///
    /// A failed lookup keeps the previously cached records.
    pub fn begin(&mut self, outcome: Option<Result<Records, RecordsError>>) {
        match outcome {
            Some(Ok(records)) => self.records = records,
            Some(Err(e)) => log::warn!("Error fetching records: {}", e),
            None => log::debug!("No wallet address, records not fetched"),
        }

        self.reset();
        self.running = true;
        log::info!(
            "Run started (world record {}, personal record {})",
            self.records.world_record,
            self.records.personal_record
        );
    }

    /// Fetch records, then begin a new run
    pub async fn start(&mut self) {
        let outcome = match self.fetch_records() {
            Some(pending) => Some(pending.await),
            None => None,
        };
        self.begin(outcome);
    }

    /// Key pressed. Jump and shoot only count during a live run.
    pub fn key_down(&mut self, action: Action) {
        if matches!(action, Action::Jump | Action::Shoot) && !self.accepts_actions() {
            return;
        }
        self.input.press(action);
    }

    pub fn key_up(&mut self, action: Action) {
        self.input.release(action);
    }

    /// Run one frame. Returns whether another frame should be scheduled.
    pub fn frame(&mut self) -> bool {
        if !self.running {
            return false;
        }

        let input = self.input.take();
        tick(&mut self.state, &input, &self.config, &mut self.rng);

        for event in self.state.drain_events() {
            match event {
                GameEvent::GameOver { final_score } => self.finish(final_score),
                GameEvent::PlayerHit { kind, lives_left } => {
                    log::debug!("Hit by {} ({} lives left)", kind.as_str(), lives_left)
                }
                GameEvent::ObstacleDestroyed { kind } => {
                    log::debug!("Destroyed {}", kind.as_str())
                }
                GameEvent::ObstacleSpawned { .. } => {}
            }
        }

        self.running
    }

    /// Stop scheduling and report the final score
    fn finish(&mut self, final_score: u64) {
        self.running = false;
        self.last_score = Some(final_score);
        log::info!("Game over, final score {}", final_score);

        match self.identity.address() {
            Some(address) => self.client.submit(&address, final_score),
            None => log::debug!("No wallet address, score not submitted"),
        }
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            player: PlayerPose {
                pos: self.state.player.pos,
                size: self.state.player.size,
                grounded: self.state.player.grounded,
                flipped: self.state.game_over,
            },
            projectiles: self.state.projectiles.iter().map(|p| p.bounds()).collect(),
            obstacles: self.state.obstacles.clone(),
            score: self.state.display_score(),
            lives: self.state.player.lives,
            world_record: self.records.world_record,
            personal_record: self.records.personal_record,
            game_over: self.state.game_over,
            final_score: self.last_score.filter(|_| self.state.game_over),
        }
    }

    fn accepts_actions(&self) -> bool {
        self.running && !self.state.game_over
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access (debug tools, tests)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn records(&self) -> Records {
        self.records
    }

    pub fn last_score(&self) -> Option<u64> {
        self.last_score
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::StaticIdentity;
    use crate::sim::{ObstacleKind, Projectile};
    use std::cell::RefCell;
    use std::rc::Rc;

    const ALICE: &str = "0xa11ce";

    /// Records every submit; answers fetches with a canned result
    struct RecordingClient {
        submitted: RefCell<Vec<(String, u64)>>,
        fetched: RefCell<Vec<String>>,
        answer: RefCell<Result<Records, RecordsError>>,
    }

    impl RecordingClient {
        fn answering(answer: Result<Records, RecordsError>) -> Rc<Self> {
            Rc::new(Self {
                submitted: RefCell::new(Vec::new()),
                fetched: RefCell::new(Vec::new()),
                answer: RefCell::new(answer),
            })
        }
    }

    impl RecordsClient for RecordingClient {
        fn submit(&self, address: &str, score: u64) {
            self.submitted.borrow_mut().push((address.to_string(), score));
        }

        fn fetch(&self, address: &str) -> RecordsFuture {
            self.fetched.borrow_mut().push(address.to_string());
            Box::pin(std::future::ready(self.answer.borrow().clone()))
        }
    }

    fn records(world: u64, personal: u64) -> Records {
        Records {
            world_record: world,
            personal_record: personal,
        }
    }

    fn session(
        address: Option<&str>,
        client: &Rc<RecordingClient>,
    ) -> Session<Rc<RecordingClient>> {
        Session::new(
            GameConfig::default(),
            42,
            Box::new(StaticIdentity(address.map(String::from))),
            Rc::clone(client),
        )
    }

    /// Put an obstacle on the dog and set lives so the next frame ends the run
    fn doom(session: &mut Session<Rc<RecordingClient>>, score: f64) {
        let state = session.state_mut();
        state.player.pos.y = 220.0;
        state.player.grounded = true;
        state.player.lives = 1;
        state.score = score;
        state.obstacles.push(Obstacle {
            pos: Vec2::new(120.0, 240.0),
            size: Vec2::new(40.0, 40.0),
            speed: 6.0,
            kind: ObstacleKind::Cat,
            sprite: String::new(),
        });
    }

    #[test]
    fn start_fetches_records_then_runs() {
        let client = RecordingClient::answering(Ok(records(500, 120)));
        let mut session = session(Some(ALICE), &client);
        assert!(!session.is_running());

        pollster::block_on(session.start());

        assert!(session.is_running());
        assert_eq!(session.records(), records(500, 120));
        assert_eq!(*client.fetched.borrow(), vec![ALICE.to_string()]);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.world_record, 500);
        assert_eq!(snapshot.personal_record, 120);
    }

    #[test]
    fn start_without_address_skips_fetch() {
        let client = RecordingClient::answering(Ok(records(500, 120)));
        let mut session = session(None, &client);
        pollster::block_on(session.start());

        assert!(session.is_running());
        assert!(client.fetched.borrow().is_empty());
        assert_eq!(session.records(), Records::default());
    }

    #[test]
    fn failed_fetch_keeps_cached_records() {
        let client = RecordingClient::answering(Ok(records(500, 120)));
        let mut session = session(Some(ALICE), &client);
        pollster::block_on(session.start());

        *client.answer.borrow_mut() = Err(RecordsError::Status(503));
        pollster::block_on(session.start());

        assert!(session.is_running());
        assert_eq!(session.records(), records(500, 120));
    }

    #[test]
    fn failed_first_fetch_defaults_to_zero() {
        let client =
            RecordingClient::answering(Err(RecordsError::Malformed("not json".into())));
        let mut session = session(Some(ALICE), &client);
        pollster::block_on(session.start());
        assert!(session.is_running());
        assert_eq!(session.records(), Records::default());
    }

    #[test]
    fn game_over_submits_floored_score_once() {
        let client = RecordingClient::answering(Ok(Records::default()));
        let mut session = session(Some(ALICE), &client);
        pollster::block_on(session.start());
        doom(&mut session, 87.95);

        assert!(!session.frame());
        assert!(!session.is_running());
        assert_eq!(session.last_score(), Some(88));
        assert_eq!(*client.submitted.borrow(), vec![(ALICE.to_string(), 88)]);

        // Nothing more happens until a new start
        let frame = session.state().frame;
        assert!(!session.frame());
        assert_eq!(session.state().frame, frame);
        assert_eq!(client.submitted.borrow().len(), 1);
    }

    #[test]
    fn game_over_without_address_submits_nothing() {
        let client = RecordingClient::answering(Ok(Records::default()));
        let mut session = session(None, &client);
        pollster::block_on(session.start());
        doom(&mut session, 10.0);

        assert!(!session.frame());
        assert!(session.state().game_over);
        assert_eq!(session.last_score(), Some(10));
        assert!(client.submitted.borrow().is_empty());
    }

    #[test]
    fn snapshot_flips_dog_on_game_over() {
        let client = RecordingClient::answering(Ok(Records::default()));
        let mut session = session(None, &client);
        pollster::block_on(session.start());
        assert!(!session.snapshot().player.flipped);

        doom(&mut session, 3.2);
        session.frame();

        let snapshot = session.snapshot();
        assert!(snapshot.player.flipped);
        assert!(snapshot.game_over);
        assert_eq!(snapshot.lives, 0);
        assert_eq!(snapshot.score, 3);
    }

    #[test]
    fn final_score_is_the_submitted_one() {
        let client = RecordingClient::answering(Ok(Records::default()));
        let mut session = session(Some(ALICE), &client);
        pollster::block_on(session.start());
        assert_eq!(session.snapshot().final_score, None);

        doom(&mut session, 5.0);
        // A cat shot on the same tick still earns its bonus after game over
        let state = session.state_mut();
        state.obstacles.push(Obstacle {
            pos: Vec2::new(500.0, 240.0),
            size: Vec2::new(40.0, 40.0),
            speed: 6.0,
            kind: ObstacleKind::Cat,
            sprite: String::new(),
        });
        state.projectiles.push(Projectile {
            pos: Vec2::new(490.0, 250.0),
            size: Vec2::new(10.0, 4.0),
            speed: 10.0,
        });

        assert!(!session.frame());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.score, 15);
        assert_eq!(session.last_score(), Some(5));
        assert_eq!(snapshot.final_score, Some(5));
        assert_eq!(*client.submitted.borrow(), vec![(ALICE.to_string(), 5)]);

        // A new run clears it again
        pollster::block_on(session.start());
        assert_eq!(session.snapshot().final_score, None);
    }

    #[test]
    fn restart_resets_run_state() {
        let client = RecordingClient::answering(Ok(Records::default()));
        let mut session = session(None, &client);
        pollster::block_on(session.start());
        doom(&mut session, 50.0);
        session.frame();
        assert!(session.state().game_over);

        pollster::block_on(session.start());
        let state = session.state();
        assert!(session.is_running());
        assert!(!state.game_over);
        assert_eq!(state.player.lives, 3);
        assert_eq!(state.frame, 0);
        assert_eq!(state.score, 0.0);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn actions_need_a_live_run() {
        let client = RecordingClient::answering(Ok(Records::default()));
        let mut session = session(None, &client);

        // Not started yet: frames don't run
        session.key_down(Action::Shoot);
        assert!(!session.frame());

        pollster::block_on(session.start());
        session.key_down(Action::Shoot);
        session.key_down(Action::Shoot);
        session.frame();
        assert_eq!(session.state().projectiles.len(), 2);
        assert_eq!(session.snapshot().projectiles.len(), 2);
    }

    #[test]
    fn held_movement_applies_every_frame() {
        let client = RecordingClient::answering(Ok(Records::default()));
        let mut session = session(None, &client);
        pollster::block_on(session.start());

        session.key_down(Action::MoveRight);
        for _ in 0..4 {
            session.frame();
        }
        session.key_up(Action::MoveRight);
        session.frame();
        assert_eq!(session.state().player.pos.x, 120.0);
    }
}
