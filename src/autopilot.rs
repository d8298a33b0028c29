//! Demo autopilot
//!
//! Plays from the snapshot alone, like a player would: shoots cats that are
//! lined up, jumps everything else, drifts forward while airborne so long
//! cars clear, and walks back home once the way is clear. Used by the
//! headless native runner.

use crate::input::Action;
use crate::records::RecordsClient;
use crate::session::{Session, Snapshot};
use crate::sim::ObstacleKind;

/// Gap (px) at which the dog jumps
const JUMP_DISTANCE: f32 = 60.0;
/// Gap (px) inside which cats get shot
const SHOOT_DISTANCE: f32 = 320.0;
/// Gap (px) that counts as "way is clear" for walking back
const SAFE_DISTANCE: f32 = 200.0;
/// Where the dog likes to stand
const HOME_X: f32 = 100.0;

/// Keys the autopilot wants this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plan {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub shoot: bool,
}

impl Plan {
    /// Feed the plan to the session as key events
    pub fn press<C: RecordsClient>(&self, session: &mut Session<C>) {
        for (held, action) in [(self.left, Action::MoveLeft), (self.right, Action::MoveRight)] {
            if held {
                session.key_down(action);
            } else {
                session.key_up(action);
            }
        }
        if self.jump {
            session.key_down(Action::Jump);
        }
        if self.shoot {
            session.key_down(Action::Shoot);
        }
    }
}

/// Work out this frame's keys
pub fn decide(snapshot: &Snapshot) -> Plan {
    let mut plan = Plan::default();
    if snapshot.game_over {
        return plan;
    }

    let player = &snapshot.player;
    let front = player.pos.x + player.size.x;

    // Drift forward in the air so wide obstacles pass underneath
    if !player.grounded {
        plan.right = true;
        return plan;
    }

    // Closest obstacle that hasn't passed the dog yet
    let threat = snapshot
        .obstacles
        .iter()
        .filter(|o| o.pos.x + o.size.x > player.pos.x)
        .map(|o| (o.pos.x - front, o.kind))
        .min_by(|a, b| a.0.total_cmp(&b.0));

    match threat {
        Some((gap, _)) if gap < JUMP_DISTANCE => plan.jump = true,
        Some((gap, ObstacleKind::Cat)) if gap < SHOOT_DISTANCE => {
            plan.shoot = snapshot.projectiles.is_empty();
        }
        Some((gap, _)) if gap < SAFE_DISTANCE => {}
        _ => plan.left = player.pos.x > HOME_X,
    }

    plan
}

/// Decide and press in one go
pub fn steer<C: RecordsClient>(session: &mut Session<C>) {
    decide(&session.snapshot()).press(session);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::ScoreBook;
    use crate::platform::{ImmediateClock, StaticIdentity, drive, drive_with};
    use crate::records::LocalRecordsClient;
    use crate::settings::GameConfig;
    use crate::sim::Obstacle;
    use glam::Vec2;

    fn new_session() -> Session<LocalRecordsClient> {
        let mut session = Session::new(
            GameConfig::default(),
            3,
            Box::new(StaticIdentity::anonymous()),
            LocalRecordsClient::new(ScoreBook::in_memory()),
        );
        pollster::block_on(session.start());
        session
    }

    fn place(session: &mut Session<LocalRecordsClient>, kind: ObstacleKind, x: f32) {
        let state = session.state_mut();
        state.player.pos.y = 220.0;
        state.player.grounded = true;
        state.obstacles.push(Obstacle {
            pos: Vec2::new(x, 240.0),
            size: Vec2::new(40.0, 40.0),
            speed: 6.0,
            kind,
            sprite: String::new(),
        });
    }

    #[test]
    fn test_shoots_cats() {
        let mut session = new_session();
        place(&mut session, ObstacleKind::Cat, 300.0);
        let plan = decide(&session.snapshot());
        assert!(plan.shoot);
        assert!(!plan.jump);
    }

    #[test]
    fn test_jumps_when_close() {
        let mut session = new_session();
        place(&mut session, ObstacleKind::Bike, 400.0);
        assert_eq!(decide(&session.snapshot()), Plan::default());

        let mut session = new_session();
        place(&mut session, ObstacleKind::Bike, 200.0);
        assert!(decide(&session.snapshot()).jump);
    }

    #[test]
    fn test_drifts_right_in_the_air() {
        let session = new_session();
        // Fresh run: the dog is still falling onto the ground
        let plan = decide(&session.snapshot());
        assert!(plan.right);
        assert!(!plan.jump);
    }

    #[test]
    fn test_walks_home_when_clear() {
        let mut session = new_session();
        place(&mut session, ObstacleKind::Car, 780.0);
        session.state_mut().player.pos.x = 300.0;
        assert!(decide(&session.snapshot()).left);
    }

    #[test]
    fn test_outlives_idle_play() {
        let mut idle = new_session();
        let idle_frames = drive(&mut idle, &mut ImmediateClock, Some(5_000));

        let mut auto = new_session();
        let auto_frames = drive_with(&mut auto, &mut ImmediateClock, Some(5_000), steer);

        assert!(auto_frames > idle_frames);
    }
}
