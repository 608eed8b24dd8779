use clap::Parser;
use maze_of_shadows::config::SessionConfig;
use maze_of_shadows::constants::TICK_MS;
use maze_of_shadows::host_utils::{
    default_session_id, emit_log, load_config, now_ms, parse_host_command, parse_power_up_kinds,
    HostCommand,
};
use maze_of_shadows::session::GameSession;
use maze_of_shadows::types::{Command, RuntimeEvent};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about = "Real-time Maze of Shadows host speaking JSON lines")]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    cols: Option<i32>,
    #[arg(long)]
    rows: Option<i32>,
    #[arg(long, help = "Comma separated power-up kinds, e.g. `speed,illum,jump`.")]
    power_ups: Option<String>,
    #[arg(long)]
    session_id: Option<String>,
    #[arg(long, default_value_t = TICK_MS)]
    tick_ms: u64,
    #[arg(
        long,
        default_value_t = 6,
        help = "Emit a state frame every N ticks even when nothing happened."
    )]
    snapshot_every: u64,
    #[arg(long, help = "Skip the menu and start playing immediately.")]
    autostart: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineOutcome {
    Applied,
    Rejected,
    Unknown,
    Input,
    Snapshot,
    Quit,
}

struct DriverContext {
    session: GameSession,
    session_id: String,
    snapshot_every: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let session_id = cli
        .session_id
        .clone()
        .unwrap_or_else(|| default_session_id("drv", seed, now_ms()));

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            emit_log(
                "error",
                "config_rejected",
                &session_id,
                Some(seed),
                None,
                json!({ "error": error }),
            );
            std::process::exit(2);
        }
    };

    let mut ctx = DriverContext {
        session: GameSession::new(config, seed),
        session_id,
        snapshot_every: cli.snapshot_every.max(1),
    };
    emit_log(
        "info",
        "driver_started",
        &ctx.session_id,
        Some(seed),
        None,
        json!({
            "tickMs": cli.tick_ms,
            "cols": ctx.session.config.cols,
            "rows": ctx.session.config.rows,
        }),
    );

    if cli.autostart {
        ctx.session.apply(Command::Start);
    }
    publish_state(&mut ctx);

    let (tx, mut rx) = mpsc::channel::<String>(64);
    spawn_stdin_reader(tx);

    let mut interval = tokio::time::interval(Duration::from_millis(cli.tick_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick_at = Instant::now();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Instant::now();
                let dt_ms = now.duration_since(last_tick_at).as_millis() as u64;
                last_tick_at = now;
                if ctx.session.is_running() {
                    tick_session(&mut ctx, dt_ms);
                }
            }
            line = rx.recv() => {
                let Some(line) = line else {
                    break;
                };
                let outcome = handle_line(&mut ctx.session, &line);
                match outcome {
                    LineOutcome::Quit => break,
                    LineOutcome::Applied | LineOutcome::Snapshot => publish_state(&mut ctx),
                    LineOutcome::Input => {}
                    LineOutcome::Rejected | LineOutcome::Unknown => {
                        let reason = if outcome == LineOutcome::Unknown {
                            "unknown"
                        } else {
                            "not_applicable"
                        };
                        emit_log(
                            "warn",
                            "command_ignored",
                            &ctx.session_id,
                            Some(ctx.session.seed),
                            Some(ctx.session.tick()),
                            json!({
                                "line": line.trim(),
                                "reason": reason,
                                "state": ctx.session.state(),
                            }),
                        );
                    }
                }
            }
        }
    }

    emit_log(
        "info",
        "driver_stopped",
        &ctx.session_id,
        Some(ctx.session.seed),
        Some(ctx.session.tick()),
        json!({ "state": ctx.session.state() }),
    );
}

fn resolve_config(cli: &Cli) -> Result<SessionConfig, String> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(cols) = cli.cols {
        config.cols = cols;
    }
    if let Some(rows) = cli.rows {
        config.rows = rows;
    }
    if let Some(raw) = cli.power_ups.as_deref() {
        config.power_up_kinds =
            parse_power_up_kinds(raw).ok_or_else(|| format!("unknown power-up kind in {raw:?}"))?;
    }
    config.validate().map_err(|error| error.to_string())?;
    Ok(config)
}

fn spawn_stdin_reader(tx: mpsc::Sender<String>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
}

fn handle_line(session: &mut GameSession, line: &str) -> LineOutcome {
    match parse_host_command(line) {
        None => LineOutcome::Unknown,
        Some(HostCommand::Quit) => LineOutcome::Quit,
        Some(HostCommand::Snapshot) => LineOutcome::Snapshot,
        Some(HostCommand::Hold(dir)) => {
            session.hold(dir, true);
            LineOutcome::Input
        }
        Some(HostCommand::Release(dir)) => {
            session.hold(dir, false);
            LineOutcome::Input
        }
        Some(HostCommand::Session(command)) => {
            if session.apply(command) {
                LineOutcome::Applied
            } else {
                LineOutcome::Rejected
            }
        }
    }
}

fn tick_session(ctx: &mut DriverContext, dt_ms: u64) {
    ctx.session.step(dt_ms);
    if ctx.session.is_ended() {
        publish_state(ctx);
        if let Some(summary) = ctx.session.build_summary() {
            emit_log(
                "info",
                "game_over",
                &ctx.session_id,
                Some(ctx.session.seed),
                Some(ctx.session.tick()),
                json!({
                    "outcome": summary.outcome,
                    "seconds": summary.seconds,
                    "score": summary.score,
                    "regenerations": summary.regenerations,
                }),
            );
            print_message(&json!({
                "type": "game_over",
                "summary": summary,
            }));
        }
        return;
    }
    if ctx.session.tick() % ctx.snapshot_every == 0 || ctx.session.has_pending_events() {
        publish_state(ctx);
    }
}

fn publish_state(ctx: &mut DriverContext) {
    let snapshot = ctx.session.build_snapshot(true);
    for event in &snapshot.events {
        let level = match event {
            RuntimeEvent::PlayerCaught { .. } | RuntimeEvent::TrapTriggered { .. } => "warn",
            _ => "info",
        };
        emit_log(
            level,
            "runtime_event",
            &ctx.session_id,
            Some(ctx.session.seed),
            Some(snapshot.tick),
            serde_json::to_value(event).unwrap_or(Value::Null),
        );
    }
    print_message(&json!({
        "type": "state",
        "snapshot": snapshot,
    }));
}

fn print_message(message: &Value) {
    println!("{message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_of_shadows::types::{Direction, InputState, SessionState};

    fn session() -> GameSession {
        GameSession::new(SessionConfig::default(), 11)
    }

    #[test]
    fn menu_commands_follow_the_state_machine() {
        let mut session = session();
        assert_eq!(handle_line(&mut session, "info"), LineOutcome::Applied);
        assert_eq!(session.state(), SessionState::Info);
        assert_eq!(handle_line(&mut session, "start"), LineOutcome::Rejected);
        assert_eq!(handle_line(&mut session, "back"), LineOutcome::Applied);
        assert_eq!(handle_line(&mut session, "start"), LineOutcome::Applied);
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn hold_and_release_update_input() {
        let mut session = session();
        assert_eq!(handle_line(&mut session, "hold down"), LineOutcome::Input);
        assert!(session.input().down);
        assert_eq!(handle_line(&mut session, "release down"), LineOutcome::Input);
        assert_eq!(session.input(), InputState::default());
        session.hold(Direction::Left, true);
        assert!(session.input().left);
    }

    #[test]
    fn pause_toggles_running() {
        let mut session = session();
        handle_line(&mut session, "start");
        assert!(session.is_running());
        assert_eq!(handle_line(&mut session, "pause"), LineOutcome::Applied);
        assert!(!session.is_running());
        assert_eq!(handle_line(&mut session, "pause"), LineOutcome::Applied);
        assert!(session.is_running());
    }

    #[test]
    fn unknown_and_control_lines() {
        let mut session = session();
        assert_eq!(handle_line(&mut session, "dance"), LineOutcome::Unknown);
        assert_eq!(handle_line(&mut session, "snapshot"), LineOutcome::Snapshot);
        assert_eq!(handle_line(&mut session, "quit"), LineOutcome::Quit);
    }

    #[test]
    fn cli_overrides_are_validated() {
        let cli = Cli::parse_from(["driver", "--cols", "5", "--rows", "4"]);
        let config = resolve_config(&cli).expect("small grid is valid");
        assert_eq!((config.cols, config.rows), (5, 4));

        let cli = Cli::parse_from(["driver", "--rows", "0"]);
        assert!(resolve_config(&cli).is_err());
    }
}
