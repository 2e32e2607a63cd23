// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! File-backed `log` implementation.
//!
//! The interactive menu owns the terminal, so diagnostics are appended to a
//! log file instead: one line per record, `timestamp | LEVEL | target | message`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("logger already initialized: {0}")]
    AlreadySet(#[from] SetLoggerError),
}

pub struct FileLogger {
    level: LevelFilter,
    file: Mutex<File>,
}

impl FileLogger {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path, level: LevelFilter) -> Result<Self, InitError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| InitError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            level,
            file: Mutex::new(file),
        })
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(OffsetDateTime::now_utc(), record);
        // A failed write drops the record; logging must never take the menu down.
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn format_record(now: OffsetDateTime, record: &Record) -> String {
    let ts = now.format(&Rfc3339).unwrap_or_else(|_| "-".to_string());
    format!(
        "{ts} | {:<5} | {} | {}\n",
        record.level(),
        record.target(),
        record.args()
    )
}

/// Install a [`FileLogger`] writing to `path` as the global logger.
pub fn init(path: &Path, level: LevelFilter) -> Result<(), InitError> {
    let logger = FileLogger::open(path, level)?;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}
