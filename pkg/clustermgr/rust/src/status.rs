// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Parsing of `vagrant status --machine-readable` output.
//!
//! Each line is a record `timestamp,target,type,data...`. Only `state`
//! records matter here: their first data field is the machine state.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineState {
    Running,
    Poweroff,
    Saved,
    Aborted,
    NotCreated,
    /// Provider-specific states (`stopped`, `paused`, ...).
    Other(String),
}

impl MachineState {
    pub fn is_running(&self) -> bool {
        *self == MachineState::Running
    }
}

impl From<&str> for MachineState {
    fn from(s: &str) -> Self {
        match s {
            "running" => MachineState::Running,
            "poweroff" => MachineState::Poweroff,
            "saved" => MachineState::Saved,
            "aborted" => MachineState::Aborted,
            "not_created" => MachineState::NotCreated,
            other => MachineState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineState::Running => write!(f, "running"),
            MachineState::Poweroff => write!(f, "poweroff"),
            MachineState::Saved => write!(f, "saved"),
            MachineState::Aborted => write!(f, "aborted"),
            MachineState::NotCreated => write!(f, "not_created"),
            MachineState::Other(s) => write!(f, "{s}"),
        }
    }
}

struct Record<'a> {
    target: &'a str,
    kind: &'a str,
    data: &'a str,
}

fn parse_record(line: &str) -> Option<Record<'_>> {
    let mut fields = line.trim().splitn(4, ',');
    let _timestamp = fields.next()?;
    let target = fields.next()?;
    let kind = fields.next()?;
    let data = fields.next()?;
    // Only the first data field is a state; later ones are human-readable.
    let data = data.split(',').next().unwrap_or_default();
    Some(Record { target, kind, data })
}

fn state_records<'a>(output: &'a str, node: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    output
        .lines()
        .filter_map(parse_record)
        .filter(move |r| r.target == node && r.kind == "state")
        .map(|r| r.data)
}

/// State reported for `node`, taken from its first `state` record.
pub fn node_state(output: &str, node: &str) -> Option<MachineState> {
    state_records(output, node).next().map(MachineState::from)
}

/// True if any `state` record pairs `node` with `running`.
pub fn node_is_running(output: &str, node: &str) -> bool {
    state_records(output, node).any(|state| state == "running")
}
