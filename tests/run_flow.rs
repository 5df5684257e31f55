use dino_dash::FrameClock;
use dino_dash::consts::REFERENCE_FRAME_MS;
use dino_dash::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use proptest::prelude::*;

const MAX_FRAMES: usize = 60 * 600;

fn count_run_ends(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::RunEnded(_)))
        .count()
}

#[test]
fn idle_run_ends_exactly_once() {
    let mut state = GameState::new(2024);
    state.start_run();
    let input = TickInput::default();
    let mut events = Vec::new();

    for _ in 0..MAX_FRAMES {
        tick(&mut state, &input, REFERENCE_FRAME_MS);
        events.extend(state.drain_events());
        if state.phase == GamePhase::GameOver {
            break;
        }
    }
    assert_eq!(state.phase, GamePhase::GameOver);
    assert_eq!(state.run.lives, 0);

    // Ticking after game over changes nothing and emits nothing
    let time = state.run.time_ms;
    for _ in 0..60 {
        tick(&mut state, &input, REFERENCE_FRAME_MS);
    }
    events.extend(state.drain_events());
    assert_eq!(state.run.time_ms, time);
    assert_eq!(count_run_ends(&events), 1);

    let Some(GameEvent::RunEnded(summary)) = events
        .iter()
        .find(|e| matches!(e, GameEvent::RunEnded(_)))
    else {
        panic!("run end event missing");
    };
    assert_eq!(summary.score, state.run.score);
    assert_eq!(summary.level, state.run.level);
    assert!(summary.survived_ms > 0.0);
}

#[test]
fn autopilot_outlasts_idle_play_on_average() {
    fn survived(seed: u64, autopilot: bool) -> f64 {
        let mut state = GameState::new(seed);
        state.start_run();
        let input = TickInput {
            autopilot,
            ..Default::default()
        };
        for _ in 0..MAX_FRAMES {
            tick(&mut state, &input, REFERENCE_FRAME_MS);
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        state.run.time_ms
    }

    let seeds = 1..=8u64;
    let idle: f64 = seeds.clone().map(|s| survived(s, false)).sum();
    let auto: f64 = seeds.map(|s| survived(s, true)).sum();
    assert!(auto > idle, "autopilot {auto} vs idle {idle}");
}

#[test]
fn frame_clock_drives_the_sim_like_fixed_steps() {
    let mut state = GameState::new(77);
    state.start_run();
    let mut clock = FrameClock::new();
    let input = TickInput::default();

    // A long hitch is clamped to a single bounded step
    let stamps = [0.0, 16.0, 33.0, 5_000.0, 5_016.0];
    for now in stamps {
        let dt = clock.advance(now);
        tick(&mut state, &input, dt);
    }
    assert!((state.run.time_ms - (16.0 + 17.0 + 100.0 + 16.0)).abs() < 1e-6);
}

#[test]
fn new_run_after_game_over_starts_clean() {
    let mut state = GameState::new(5);
    state.start_run();
    state.run.lives = 1;
    state.take_damage(1);
    assert_eq!(state.phase, GamePhase::GameOver);

    state.start_run();
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.run.lives, 3);
    assert_eq!(state.run.score, 0);
    assert!(state.events.is_empty());
    assert!(state.scheduler.is_empty());
}

fn arb_input() -> impl Strategy<Value = TickInput> {
    (any::<bool>(), any::<bool>(), any::<bool>(), proptest::option::of(0f32..1280.0)).prop_map(
        |(jump, duck, special, pointer_x)| TickInput {
            pointer_x,
            jump,
            duck,
            special,
            ..Default::default()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn invariants_hold_under_random_play(
        seed in any::<u64>(),
        inputs in proptest::collection::vec((arb_input(), 0f32..120.0), 1..400),
    ) {
        let mut state = GameState::new(seed);
        state.start_run();
        let mut ends = 0;
        let mut last_level = state.run.level;

        for (input, dt) in &inputs {
            tick(&mut state, input, *dt);
            ends += count_run_ends(&state.drain_events());

            prop_assert!(state.run.lives <= 5);
            prop_assert!(state.run.combo >= 1.0 && state.run.combo <= 5.0);
            prop_assert!(state.run.level >= last_level);
            prop_assert!(!(state.dino.is_jumping && state.dino.is_ducking));
            let bosses = state.obstacles.iter().filter(|o| o.is_boss()).count();
            prop_assert!(bosses <= 1);
            prop_assert!(state.particles.len() <= state.max_particles);
            last_level = state.run.level;
        }

        prop_assert!(ends <= 1);
        prop_assert_eq!(ends == 1, state.phase == GamePhase::GameOver);
    }
}
