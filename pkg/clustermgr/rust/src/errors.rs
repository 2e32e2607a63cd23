// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("scripts directory not found: {}", path.display())]
    ScriptsDirMissing { path: PathBuf },

    #[error("failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("script {} failed: {status}", script.display())]
    ScriptFailed { script: PathBuf, status: ExitStatus },

    #[error("`{command}` failed: {status}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("failed to query cluster status")]
    StatusQuery(#[source] Box<Error>),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
