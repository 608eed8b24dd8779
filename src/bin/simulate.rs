use clap::Parser;
use maze_of_shadows::config::SessionConfig;
use maze_of_shadows::constants::TICK_MS;
use maze_of_shadows::host_utils::{
    default_session_id, emit_log, load_config, now_ms, parse_power_up_kinds,
};
use maze_of_shadows::session::GameSession;
use maze_of_shadows::types::{
    Command, Direction, GameOutcome, InputState, PowerUpKind, RuntimeEvent,
};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless Maze of Shadows runner")]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(
        long,
        default_value_t = 1,
        help = "Number of consecutive seeds, starting at `--seed`, run per scenario."
    )]
    runs: u32,
    #[arg(long, help = "Session-clock cap per run; the run is reported as a timeout past it.")]
    minutes: Option<u32>,
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
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct Scenario {
    name: String,
    seed: u32,
    minutes: u32,
    config: SessionConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum RunResult {
    Escaped,
    Caught,
    Timeout,
}

impl RunResult {
    fn key(self) -> &'static str {
        match self {
            RunResult::Escaped => "escaped",
            RunResult::Caught => "caught",
            RunResult::Timeout => "timeout",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    cols: i32,
    rows: i32,
    result: RunResult,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    score: i64,
    regenerations: u32,
    #[serde(rename = "initialPathCells")]
    initial_path_cells: usize,
    #[serde(rename = "trapsTriggered")]
    traps_triggered: u32,
    #[serde(rename = "powerUpsTaken")]
    power_ups_taken: u32,
    #[serde(rename = "jumpsUsed")]
    jumps_used: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "sessionId")]
    session_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "resultCounts")]
    result_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Copy, Debug)]
struct TickProbe {
    x: f32,
    y: f32,
    score: i64,
}

fn main() {
    let cli = Cli::parse();
    let run_started_at_ms = now_ms();
    let base_seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let session_id = cli
        .session_id
        .clone()
        .unwrap_or_else(|| default_session_id("sim", base_seed, run_started_at_ms));

    let scenarios = match resolve_scenarios(&cli, base_seed) {
        Ok(scenarios) => scenarios,
        Err(error) => {
            emit_log(
                "error",
                "config_rejected",
                &session_id,
                Some(base_seed),
                None,
                json!({ "error": error }),
            );
            std::process::exit(2);
        }
    };

    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut result_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_duration_ms = 0u64;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &session_id,
            Some(scenario.seed),
            None,
            json!({
                "scenario": scenario.name,
                "cols": scenario.config.cols,
                "rows": scenario.config.rows,
                "minutes": scenario.minutes,
                "powerUps": scenario.config.power_up_kinds,
            }),
        );
        let scenario_run = run_scenario(&scenario);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &session_id,
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({
                    "scenario": scenario.name,
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_duration_ms += scenario_run.result.duration_ms;
        *result_counts
            .entry(scenario_run.result.result.key().to_string())
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &session_id,
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "scenario": scenario.name,
                "result": scenario_run.result.result,
                "durationMs": scenario_run.result.duration_ms,
                "score": scenario_run.result.score,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_serialize_failed",
                &session_id,
                Some(scenario.seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at_ms = now_ms();
    let summary = build_run_summary(
        session_id.clone(),
        run_started_at_ms,
        run_finished_at_ms,
        scenario_results,
        result_counts,
        total_anomalies,
        total_duration_ms,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &session_id,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &session_id,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageDurationMs": summary.average_duration_ms,
            "resultCounts": summary.result_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario) -> ScenarioRunResult {
    let mut session = GameSession::new(scenario.config.clone(), scenario.seed);
    session.apply(Command::Start);
    let initial_path_cells = session
        .grid()
        .path_between(session.player_cell(), scenario.config.exit_cell())
        .map(|path| path.len())
        .unwrap_or(0);

    let max_ticks = scenario.minutes as u64 * 60_000 / TICK_MS;
    let mut traps_triggered = 0;
    let mut power_ups_taken = 0;
    let mut jumps_used = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_tick = 0u64;
    let mut probe = TickProbe {
        x: session.player().x,
        y: session.player().y,
        score: session.score(),
    };

    while !session.is_ended() && session.tick() < max_ticks {
        session.set_input(autopilot_input(&session));
        session.step(TICK_MS);
        let snapshot = session.build_snapshot(true);
        last_tick = snapshot.tick;

        for message in collect_tick_anomalies(&session, &snapshot.events, probe) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        probe = TickProbe {
            x: snapshot.player.x,
            y: snapshot.player.y,
            score: snapshot.score,
        };

        for event in &snapshot.events {
            match event {
                RuntimeEvent::TrapTriggered { .. } => traps_triggered += 1,
                RuntimeEvent::PowerUpTaken { .. } => power_ups_taken += 1,
                RuntimeEvent::JumpChargeUsed { .. } => jumps_used += 1,
                _ => {}
            }
        }
    }

    let result = match session.outcome() {
        Some(GameOutcome::Escaped) => RunResult::Escaped,
        Some(GameOutcome::Caught) => RunResult::Caught,
        None => RunResult::Timeout,
    };
    if let Some(summary) = session.build_summary() {
        if summary.score != session.score() || summary.seconds != summary.elapsed_ms / 1000 {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                last_tick,
                "summary disagrees with session clock".to_string(),
            );
        }
    }

    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            cols: scenario.config.cols,
            rows: scenario.config.rows,
            result,
            duration_ms: session.elapsed_ms(),
            score: session.score(),
            regenerations: session.regenerations(),
            initial_path_cells,
            traps_triggered,
            power_ups_taken,
            jumps_used,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    }
}

fn autopilot_input(session: &GameSession) -> InputState {
    let from = session.player_cell();
    let Some(path) = session
        .grid()
        .path_between(from, session.config.exit_cell())
    else {
        return InputState::default();
    };
    let Some(&(ni, nj)) = path.get(1) else {
        return InputState::default();
    };
    let dir = match (ni - from.0, nj - from.1) {
        (1, _) => Direction::Right,
        (-1, _) => Direction::Left,
        (_, 1) => Direction::Down,
        _ => Direction::Up,
    };
    InputState::only(dir)
}

fn collect_tick_anomalies(
    session: &GameSession,
    events: &[RuntimeEvent],
    previous: TickProbe,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    let config = &session.config;
    let grid = session.grid();

    if !grid.walls_are_symmetric() {
        anomalies.push("wall flags disagree between neighbours".to_string());
    }

    // A trap can fire in the same slice as the rebuild, after it.
    let regenerated_at = events
        .iter()
        .rposition(|event| matches!(event, RuntimeEvent::MazeRegenerated { .. }));
    if let Some(index) = regenerated_at {
        let toggled_after = events[index..]
            .iter()
            .any(|event| matches!(event, RuntimeEvent::TrapTriggered { .. }));
        if !toggled_after {
            let expected = grid.len().saturating_sub(1);
            if grid.passage_count() != expected {
                anomalies.push(format!(
                    "regenerated maze has {} passages, expected {expected}",
                    grid.passage_count()
                ));
            }
            if grid.reachable_from(0, 0).len() != grid.len() {
                anomalies.push("regenerated maze is not fully connected".to_string());
            }
        }
    }

    let score = session.score();
    if score < 0 || score > config.max_score {
        anomalies.push(format!("score out of range: {score}"));
    }
    if score > previous.score {
        anomalies.push(format!("score increased: {} -> {score}", previous.score));
    }

    let player = session.player();
    let width = config.cols as f32 * config.cell_size;
    let height = config.rows as f32 * config.cell_size;
    if !(player.x > 0.0 && player.x < width && player.y > 0.0 && player.y < height) {
        anomalies.push(format!("player left the grid: ({}, {})", player.x, player.y));
    }

    let step_limit =
        config.player_speed * config.speed_multiplier.max(1.0) * TICK_MS as f32 / 1000.0 + 0.01;
    let dx = (player.x - previous.x).abs();
    let dy = (player.y - previous.y).abs();
    if dx > step_limit || dy > step_limit {
        anomalies.push(format!(
            "player displaced {dx:.2}/{dy:.2} px in one tick (limit {step_limit:.2})"
        ));
    }

    for enemy in &session.entities().enemies {
        let pos = enemy.position();
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            anomalies.push(format!("enemy {} has a non-finite position", enemy.id));
        }
    }

    anomalies
}

fn resolve_scenarios(cli: &Cli, base_seed: u32) -> Result<Vec<Scenario>, String> {
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

    let minutes = cli.minutes.unwrap_or(5).clamp(1, 60);
    let runs = cli.runs.clamp(1, 1_000);
    let next_seed = |index: u32| base_seed.wrapping_add(index);

    let mut scenarios = Vec::new();
    if cli.single || cli.power_ups.is_some() {
        for index in 0..runs {
            scenarios.push(Scenario {
                name: "custom".to_string(),
                seed: next_seed(index),
                minutes,
                config: config.clone(),
            });
        }
        return Ok(scenarios);
    }

    let mut with_jumps = config.clone();
    if !with_jumps.power_up_kinds.contains(&PowerUpKind::Jump) {
        with_jumps.power_up_kinds.push(PowerUpKind::Jump);
    }
    for index in 0..runs {
        let seed = next_seed(index);
        scenarios.push(Scenario {
            name: "default-kit".to_string(),
            seed,
            minutes,
            config: config.clone(),
        });
        scenarios.push(Scenario {
            name: "jump-kit".to_string(),
            seed,
            minutes,
            config: with_jumps.clone(),
        });
    }
    Ok(scenarios)
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn build_run_summary(
    session_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    result_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_duration_ms: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_duration_ms = if scenario_count == 0 {
        0
    } else {
        total_duration_ms / scenario_count as u64
    };
    RunSummary {
        session_id,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_duration_ms,
        result_counts,
        scenarios,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_scenario_result(result: RunResult, duration_ms: u64) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            cols: 20,
            rows: 20,
            result,
            duration_ms,
            score: 0,
            regenerations: 0,
            initial_path_cells: 0,
            traps_triggered: 0,
            power_ups_taken: 0,
            jumps_used: 0,
            anomalies: Vec::new(),
        }
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("simulate").chain(args.iter().copied()))
    }

    fn quiet_scenario(seed: u32) -> Scenario {
        Scenario {
            name: "quiet".to_string(),
            seed,
            minutes: 10,
            config: SessionConfig {
                enemy_count: 0,
                trap_count: 0,
                power_up_kinds: Vec::new(),
                ..SessionConfig::default()
            },
        }
    }

    #[test]
    fn autopilot_escapes_a_quiet_maze() {
        for seed in [1u32, 2, 3] {
            let run = run_scenario(&quiet_scenario(seed));
            assert_eq!(run.result.result, RunResult::Escaped, "seed {seed}");
            assert!(run.result.anomalies.is_empty(), "{:?}", run.result.anomalies);
            assert!(run.result.initial_path_cells >= 2);
        }
    }

    #[test]
    fn full_runs_report_no_anomalies() {
        for seed in 0..4u32 {
            let scenario = Scenario {
                name: "full".to_string(),
                seed,
                minutes: 3,
                config: SessionConfig::default(),
            };
            let run = run_scenario(&scenario);
            assert!(run.result.anomalies.is_empty(), "{:?}", run.result.anomalies);
            assert!(run.result.duration_ms <= 3 * 60_000);
        }
    }

    #[test]
    fn timeout_is_reported_when_the_cap_is_hit() {
        let mut scenario = quiet_scenario(5);
        scenario.minutes = 1;
        scenario.config.player_speed = 1.0;
        let run = run_scenario(&scenario);
        assert_eq!(run.result.result, RunResult::Timeout);
        assert_eq!(run.result.regenerations, 0);
    }

    #[test]
    fn default_scenarios_pair_each_seed_with_a_jump_kit() {
        let scenarios = resolve_scenarios(&cli(&["--runs", "2"]), 9).expect("defaults are valid");
        assert_eq!(scenarios.len(), 4);
        assert_eq!(scenarios[0].seed, 9);
        assert_eq!(scenarios[0].seed, scenarios[1].seed);
        assert!(scenarios[1].config.power_up_kinds.contains(&PowerUpKind::Jump));
        assert!(!scenarios[0].config.power_up_kinds.contains(&PowerUpKind::Jump));
    }

    #[test]
    fn cli_overrides_reach_the_config() {
        let scenarios = resolve_scenarios(
            &cli(&["--single", "--cols", "8", "--rows", "6", "--power-ups", "jump"]),
            1,
        )
        .expect("overrides are valid");
        assert_eq!(scenarios.len(), 1);
        assert_eq!((scenarios[0].config.cols, scenarios[0].config.rows), (8, 6));
        assert_eq!(scenarios[0].config.power_up_kinds, vec![PowerUpKind::Jump]);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        assert!(resolve_scenarios(&cli(&["--cols", "0"]), 1).is_err());
        assert!(resolve_scenarios(&cli(&["--power-ups", "laser"]), 1).is_err());
    }

    #[test]
    fn build_run_summary_calculates_average_duration() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            1,
            2,
            vec![
                make_scenario_result(RunResult::Caught, 60_000),
                make_scenario_result(RunResult::Escaped, 90_000),
            ],
            BTreeMap::from([("caught".to_string(), 1usize), ("escaped".to_string(), 1usize)]),
            1,
            150_000,
        );
        assert_eq!(summary.average_duration_ms, 75_000);
        assert_eq!(summary.scenario_count, 2);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("maze-of-shadows-missing-{}", now_ms()))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            1,
            2,
            vec![make_scenario_result(RunResult::Timeout, 60_000)],
            BTreeMap::from([("timeout".to_string(), 1usize)]),
            0,
            60_000,
        );
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut records, &mut seen, 10, "same".to_string());
        push_anomaly(&mut anomalies, &mut records, &mut seen, 11, "same".to_string());

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].tick, 11);
    }
}
