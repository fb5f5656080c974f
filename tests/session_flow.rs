use std::time::Duration;

use dino_duel::game::{
    GameOutcome, GameSession, GameSettings, PlayerId, SessionHost, SessionPhase, TickEvent,
};
use dino_duel::relay::{RelayHub, RelaySignal};
use dino_duel::util::time::SessionClock;
use dino_duel::ws::protocol::{DrawCommand, ServerMsg};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn seeded(seed: u64) -> GameSettings {
    GameSettings {
        seed: Some(seed),
        ..GameSettings::default()
    }
}

/// Tick until the round ends, returning the outcome and the timestamp
fn run_until_game_over(session: &mut GameSession, mut now: f64) -> (GameOutcome, f64) {
    for _ in 0..60 * 120 {
        now += FRAME_MS;
        if let TickEvent::GameOver(outcome) = session.tick(now) {
            return (outcome, now);
        }
    }
    panic!("no collision within two simulated minutes");
}

#[test]
fn idle_players_lose_to_the_first_cactus() {
    let mut session = GameSession::new(seeded(11)).unwrap();
    session.tick(0.0);

    // Player two stands further right, so the first cactus reaches it first
    let (outcome, _) = run_until_game_over(&mut session, 0.0);
    assert_eq!(outcome, GameOutcome::Winner(PlayerId::One));
    assert!(session.game_speed() > session.settings().game_speed_start);
}

#[test]
fn same_seed_same_round() {
    let mut a = GameSession::new(seeded(99)).unwrap();
    let mut b = GameSession::new(seeded(99)).unwrap();
    a.tick(0.0);
    b.tick(0.0);

    let (_, end_a) = run_until_game_over(&mut a, 0.0);
    let (_, end_b) = run_until_game_over(&mut b, 0.0);

    assert_eq!(end_a, end_b);
    let xs_a: Vec<f32> = a.obstacles().obstacles().map(|o| o.x).collect();
    let xs_b: Vec<f32> = b.obstacles().obstacles().map(|o| o.x).collect();
    assert_eq!(xs_a, xs_b);
}

#[test]
fn restart_after_arming_starts_a_fresh_round() {
    let mut session = GameSession::new(seeded(3)).unwrap();
    session.tick(0.0);
    let (_, ended_at) = run_until_game_over(&mut session, 0.0);

    assert!(!session.restart());
    assert_eq!(session.tick(ended_at + 499.0), TickEvent::Idle);
    assert_eq!(session.tick(ended_at + 501.0), TickEvent::Armed);

    assert!(session.restart());
    assert!(!session.restart());
    assert_eq!(session.phase(), SessionPhase::Running);
    assert!(session.obstacles().is_empty());
    assert_eq!(session.game_speed(), session.settings().game_speed_start);
    assert_eq!(session.outcome(), None);
}

#[tokio::test]
async fn relay_press_reaches_hosted_session() {
    let settings = GameSettings {
        // Wide window so scheduling delays in the test runtime don't expire the press
        jump_debounce_ms: 10_000.0,
        ..seeded(1)
    };
    let session = GameSession::new(settings).unwrap();
    let clock = SessionClock::new();
    let hub = RelayHub::new(16, 100);

    let bridge = session.signal_bridge(clock);
    let bridge_task = tokio::spawn(bridge.run(hub.subscribe()));

    let (mut host, handle) = SessionHost::new(session, clock, 60, 1);
    let mut frames = handle.subscribe();
    host.step(clock.now_ms());

    hub.publish(RelaySignal::Jump(PlayerId::Two)).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        host.step(clock.now_ms());
    }

    let two = host.session().player(PlayerId::Two);
    let one = host.session().player(PlayerId::One);
    assert!(two.height_above_ground() > 0.0);
    assert_eq!(one.height_above_ground(), 0.0);

    // Latest frame draws player two above the baseline
    let mut last = None;
    while let Ok(msg) = frames.try_recv() {
        last = Some(msg);
    }
    let Some(ServerMsg::Frame { commands, .. }) = last else {
        panic!("expected a frame");
    };
    let standing_y = two.standing_y();
    let airborne = commands.iter().any(|c| {
        matches!(c, DrawCommand::Sprite { y, .. } if *y < standing_y - 0.5)
    });
    assert!(airborne);

    drop(hub);
    bridge_task.await.unwrap();
}
