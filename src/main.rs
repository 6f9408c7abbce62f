use clap::{Args, Parser, Subcommand};
use koli_rhythm::config::{CONFIG_PATH, Config};
use koli_rhythm::core::clock::{ClockSource, ManualClock};
use koli_rhythm::core::input::{InputEdge, KeyEdge};
use koli_rhythm::game::chart::Chart;
use koli_rhythm::game::leaderboard::Leaderboard;
use koli_rhythm::game::session::{Session, SessionStatus};
use koli_rhythm::game::settings::{SETTINGS_PATH, Settings};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "koli-rhythm", version, about = "Four-lane rhythm game judging core")]
struct Cli {
    /// JSON engine config.
    #[arg(long, global = true, default_value = CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a chart headlessly against scripted key edges and print the result.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    chart: PathBuf,
    /// JSON array of `{"at_ms", "lane", "edge"}` events.
    #[arg(long)]
    inputs: PathBuf,
    /// Overrides the reaction window derived from player settings.
    #[arg(long)]
    time_to_react: Option<u32>,
    #[arg(long)]
    player: Option<String>,
    #[arg(long, default_value = SETTINGS_PATH)]
    settings: PathBuf,
    #[arg(long, default_value_t = 4)]
    tick_ms: i64,
    /// Append the finished record to the chart directory's leaderboard.
    #[arg(long)]
    record: bool,
}

#[derive(Debug, Deserialize)]
struct ScriptedEdge {
    at_ms: i64,
    lane: u8,
    edge: KeyEdge,
}

fn replay(config: &Config, args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default(&args.settings);
    let chart = Chart::load(&args.chart)?;

    let mut script: Vec<(i64, InputEdge)> = Vec::new();
    let raw: Vec<ScriptedEdge> = serde_json::from_str(&std::fs::read_to_string(&args.inputs)?)?;
    for ev in raw {
        script.push((ev.at_ms, InputEdge::from_raw(ev.lane, ev.edge)?));
    }
    script.sort_by_key(|(at, _)| *at);

    let ttr = args.time_to_react.unwrap_or_else(|| settings.time_to_react());
    let player = args.player.unwrap_or_else(|| settings.username.clone());
    let tick_ms = args.tick_ms.max(1);
    let mut session = Session::new(config, chart, ManualClock::new(), ttr, player);

    let mut next = 0;
    loop {
        session.clock_mut().advance(tick_ms);
        let clock_ms = session.clock().position_ms();
        if session.is_started() {
            while let Some((at, edge)) = script.get(next) {
                if *at > clock_ms {
                    break;
                }
                session.queue_input(*edge);
                next += 1;
            }
        }
        if session.update(tick_ms) == SessionStatus::Ended {
            break;
        }
    }

    let Some(performance) = session.into_record() else {
        return Ok(());
    };
    println!("{}", serde_json::to_string_pretty(&performance)?);

    if args.record {
        if let Some(dir) = args.chart.parent() {
            let mut board = Leaderboard::load_or_empty(dir);
            board.add(performance);
            board.save()?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install logger immediately, then set runtime max level from config after loading it.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    // Startup default when config is missing or malformed.
    log::set_max_level(log::LevelFilter::Warn);

    let cli = Cli::parse();
    let config = Config::load(&cli.config);
    log::set_max_level(config.log_level.as_level_filter());

    match cli.command {
        Command::Replay(args) => replay(&config, args),
    }
}
