use koli_rhythm::config::Config;
use koli_rhythm::core::clock::{ClockSource, ManualClock};
use koli_rhythm::core::input::{InputEdge, Lane};
use koli_rhythm::game::chart::{Chart, ChartSet, LaneMask};
use koli_rhythm::game::leaderboard::Leaderboard;
use koli_rhythm::game::performance::Performance;
use koli_rhythm::game::session::{Session, SessionStatus};
use koli_rhythm::screens::{GameState, ScreenEvent, transition};

const TTR: u32 = 400;

fn chart(rows: &[(u64, &str)]) -> Chart {
    Chart::from_notes(rows.iter().map(|(ts, m)| (*ts, m.parse::<LaneMask>().expect("mask"))))
}

// Drives a session at a fixed tick, delivering each edge on the first tick
// whose clock has reached it.
fn play(chart: Chart, presses: &[(i64, Lane)], tick: i64) -> Performance {
    let mut edges: Vec<(i64, InputEdge)> = presses
        .iter()
        .flat_map(|&(at, lane)| [(at, InputEdge::down(lane)), (at + 48, InputEdge::up(lane))])
        .collect();
    edges.sort_by_key(|(at, _)| *at);

    let mut session = Session::new(&Config::default(), chart, ManualClock::new(), TTR, "scenario");
    let mut next = 0;
    loop {
        session.clock_mut().advance(tick);
        let clock = session.clock().position_ms();
        if session.is_started() {
            while let Some(&(at, edge)) = edges.get(next) {
                if at > clock {
                    break;
                }
                session.queue_input(edge);
                next += 1;
            }
        }
        if session.update(tick) == SessionStatus::Ended {
            break;
        }
    }
    session.into_record().expect("finished session yields a record")
}

fn mixed_chart() -> Chart {
    chart(&[(1000, "1000"), (1500, "0100"), (2000, "0011"), (2500, "1000")])
}

// Hit line for a note at `ts` is ts - TTR/2 + 1000 on the playback clock.
const MIXED_PRESSES: [(i64, Lane); 4] = [
    (1808, Lane::First),
    (2352, Lane::Second),
    (2736, Lane::Fourth),
    (2800, Lane::Third),
];

#[test]
fn mixed_chart_scores_as_expected() {
    let p = play(mixed_chart(), &MIXED_PRESSES, 4);
    assert_eq!(p.perfect_hits, 2);
    assert_eq!(p.good_hits, 2);
    assert_eq!(p.bad_hits, 0);
    assert_eq!(p.misses, 1);
    assert_eq!(p.score, 800);
    assert_eq!(p.combo, 0);
    assert_eq!(p.max_combo, 4);
    assert_eq!(p.max_possible_combo, 5);
    assert!((p.accuracy - 800.0 / 1500.0 * 100.0).abs() < 1e-9);
}

#[test]
fn result_does_not_depend_on_tick_rate() {
    let fine = play(mixed_chart(), &MIXED_PRESSES, 1);
    let coarse = play(mixed_chart(), &MIXED_PRESSES, 16);
    assert_eq!(fine, coarse);
}

// Presses between 16ms ticks reach the session up to 15ms late at the
// coarse rate; each is placed so both rates land in the same band.
const OFF_TICK_PRESSES: [(i64, Lane); 4] = [
    (1805, Lane::First),
    (2345, Lane::Second),
    (2723, Lane::Fourth),
    (2801, Lane::Third),
];

#[test]
fn presses_between_ticks_grade_the_same_at_any_rate() {
    assert!(OFF_TICK_PRESSES.iter().all(|(at, _)| at % 16 != 0));
    let fine = play(mixed_chart(), &OFF_TICK_PRESSES, 1);
    let coarse = play(mixed_chart(), &OFF_TICK_PRESSES, 16);
    let odd = play(mixed_chart(), &OFF_TICK_PRESSES, 7);
    assert_eq!((fine.perfect_hits, fine.good_hits, fine.misses), (2, 2, 1));
    assert_eq!(fine, coarse);
    assert_eq!(fine, odd);
}

#[test]
fn untouched_chart_is_all_misses() {
    let p = play(mixed_chart(), &[], 8);
    assert_eq!(p.misses, 5);
    assert_eq!(p.score, 0);
    assert_eq!(p.max_combo, 0);
    assert_eq!(p.accuracy, 0.0);
}

#[test]
fn long_streak_raises_the_multiplier() {
    let rows: Vec<(u64, &str)> = (0..25u64).map(|i| (1000 + i * 200, "0010")).collect();
    let presses: Vec<(i64, Lane)> = (0..25i64).map(|i| (1800 + i * 200, Lane::Third)).collect();
    let p = play(chart(&rows), &presses, 4);
    assert_eq!(p.perfect_hits, 25);
    // combos 0..=19 score x1, 20..=24 score x2
    assert_eq!(p.score, 20 * 300 + 5 * 600);
    assert_eq!(p.max_combo, 25);
    assert_eq!(p.accuracy, 100.0);
}

#[test]
fn finished_chart_lands_on_the_leaderboard() {
    let dir = tempfile::tempdir().expect("tempdir");
    let difficulty = r#"{
        "metadata": {"title": "Scenario", "artist": "Tester", "mapper": "Koli",
                     "bpm": 120, "difficulty": "Normal", "rating": 2},
        "notes": {"1000": "1000", "1500": "0100"},
        "general": {"audio": "audio.mp3", "background": "bg.png"}
    }"#;
    std::fs::write(dir.path().join("normal.json"), difficulty).expect("write");

    let set = ChartSet::load_dir(dir.path()).expect("chart set");
    assert_eq!(set.difficulty_names(), vec!["Normal"]);
    let chart = set.difficulties[0].clone();

    let first = play(chart.clone(), &[(1800, Lane::First), (2300, Lane::Second)], 4);
    let second = play(chart, &[(1800, Lane::First)], 4);
    assert!(first.score > second.score);

    let mut board = Leaderboard::load(dir.path()).expect("empty board");
    board.add(second);
    board.add(first.clone());
    board.save().expect("save");

    let reloaded = Leaderboard::load(dir.path()).expect("reload");
    assert_eq!(reloaded.performances().len(), 2);
    assert_eq!(reloaded.best(), Some(&first));
    // the leaderboard file is not mistaken for a difficulty
    assert_eq!(ChartSet::load_dir(dir.path()).expect("reload set").difficulties.len(), 1);
}

#[test]
fn screen_flow_follows_a_session() {
    let mut state = GameState::MainMenu;
    for event in [ScreenEvent::Play, ScreenEvent::ChartChosen, ScreenEvent::DifficultyChosen] {
        state = transition(state, event).expect("menu step");
    }

    let mut session = Session::new(
        &Config::default(),
        chart(&[(1000, "1000")]),
        ManualClock::new(),
        TTR,
        "scenario",
    );
    while session.update(4) == SessionStatus::PreRoll {}

    state = transition(state, ScreenEvent::Pause).expect("pause");
    session.pause();
    assert_eq!(session.update(4), SessionStatus::Paused);

    state = transition(state, ScreenEvent::Retry).expect("retry");
    session.retry();
    assert_eq!(state, GameState::Playing);
    assert_eq!(session.status(), SessionStatus::PreRoll);

    loop {
        session.clock_mut().advance(4);
        if session.update(4) == SessionStatus::Ended {
            break;
        }
    }
    state = transition(state, ScreenEvent::ChartFinished).expect("finish");
    assert_eq!(state, GameState::EndScreen);
    assert_eq!(session.final_record().map(|p| p.misses), Some(1));
}
