use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::config::SessionConfig;
use crate::types::{Command, Direction, PowerUpKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostCommand {
    Session(Command),
    Hold(Direction),
    Release(Direction),
    Snapshot,
    Quit,
}

pub fn parse_host_command(line: &str) -> Option<HostCommand> {
    let normalized = line.trim().to_ascii_lowercase();
    let mut parts = normalized.split_whitespace();
    let head = parts.next()?;
    let arg = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let command = match (head, arg) {
        ("start", None) => HostCommand::Session(Command::Start),
        ("info", None) => HostCommand::Session(Command::ShowInfo),
        ("credits", None) => HostCommand::Session(Command::ShowCredits),
        ("back", None) => HostCommand::Session(Command::Back),
        ("pause" | "p", None) => HostCommand::Session(Command::TogglePause),
        ("restart", None) => HostCommand::Session(Command::Restart),
        ("menu", None) => HostCommand::Session(Command::Menu),
        ("hold", Some(dir)) => HostCommand::Hold(Direction::parse(dir)?),
        ("release", Some(dir)) => HostCommand::Release(Direction::parse(dir)?),
        ("snapshot", None) => HostCommand::Snapshot,
        ("quit" | "exit", None) => HostCommand::Quit,
        _ => return None,
    };
    Some(command)
}

pub fn parse_power_up_kinds(raw: &str) -> Option<Vec<PowerUpKind>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| PowerUpKind::parse(&part.to_ascii_lowercase()))
        .collect()
}

pub fn load_config(path: Option<&Path>) -> Result<SessionConfig, String> {
    let config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|error| format!("cannot read {}: {error}", path.to_string_lossy()))?;
            SessionConfig::from_json(&raw)?
        }
        None => SessionConfig::default(),
    };
    config.validate().map_err(|error| error.to_string())?;
    Ok(config)
}

#[derive(Clone, Debug, Serialize)]
pub struct StructuredLogLine {
    pub timestamp: String,
    #[serde(rename = "timestampMs")]
    pub timestamp_ms: u64,
    pub level: String,
    pub event: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
    pub details: Value,
}

pub fn build_log_line(
    level: &str,
    event: &str,
    session_id: &str,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) -> StructuredLogLine {
    StructuredLogLine {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        session_id: session_id.to_string(),
        seed,
        tick,
        details,
    }
}

pub fn emit_log(
    level: &str,
    event: &str,
    session_id: &str,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let line = build_log_line(level, event, session_id, seed, tick, details);
    match serde_json::to_string(&line) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => eprintln!("[log] failed to serialize {event}: {error}"),
    }
}

pub fn default_session_id(prefix: &str, seed: u32, timestamp_ms: u64) -> String {
    format!("{prefix}-{seed}-{timestamp_ms}")
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
