// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::errors::Error;
use anyhow::{Context, Result};
use log::LevelFilter;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "CLUSTERMGR_CONFIG";
pub const SCRIPTS_DIR_ENV: &str = "CLUSTERMGR_SCRIPTS_DIR";

const DEFAULT_SCRIPTS_DIR: &str = "scripts/";
const DEFAULT_MASTER_NODE: &str = "master-1";
const DEFAULT_LOG_FILE: &str = "cluster-manager.log";
const DEFAULT_INTERPRETER: &str = "bash";
const DEFAULT_STATUS_COMMAND: [&str; 3] = ["vagrant", "status", "--machine-readable"];

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub scripts_dir: PathBuf,
    /// Vagrant machine whose `running` state marks the cluster as active.
    pub master_node_name: String,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    /// Program used to run every script, invoked as `<interpreter> <script>`.
    pub interpreter: String,
    /// Program and arguments producing Vagrant's machine-readable status.
    pub status_command: Vec<String>,
    /// Per-token overrides of the script a menu entry runs.
    pub scripts: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from(DEFAULT_SCRIPTS_DIR),
            master_node_name: DEFAULT_MASTER_NODE.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: LevelFilter::Info,
            interpreter: DEFAULT_INTERPRETER.to_string(),
            status_command: DEFAULT_STATUS_COMMAND.iter().map(|s| s.to_string()).collect(),
            scripts: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    scripts_dir: Option<PathBuf>,
    master_node_name: Option<String>,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
    interpreter: Option<String>,
    status_command: Option<Vec<String>>,
    #[serde(default)]
    scripts: BTreeMap<String, String>,
}

impl Config {
    /// Build the configuration from defaults, an optional YAML file and the
    /// environment. `path` wins over `CLUSTERMGR_CONFIG`; with neither, the
    /// defaults are used as-is.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = Config::default();
        if let Some(path) = path {
            let file = parse_config_file(&path)?;
            config
                .apply(file)
                .with_context(|| format!("applying {}", path.display()))?;
        }

        if let Some(dir) = std::env::var_os(SCRIPTS_DIR_ENV) {
            config.scripts_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile) -> Result<(), Error> {
        if let Some(dir) = file.scripts_dir {
            self.scripts_dir = dir;
        }
        if let Some(node) = file.master_node_name {
            self.master_node_name = node;
        }
        if let Some(log_file) = file.log_file {
            self.log_file = log_file;
        }
        if let Some(level) = file.log_level {
            self.log_level = level
                .parse()
                .map_err(|_| Error::Config(format!("unknown log_level: {level}")))?;
        }
        if let Some(interpreter) = file.interpreter {
            self.interpreter = interpreter;
        }
        if let Some(command) = file.status_command {
            if command.is_empty() {
                return Err(Error::Config("status_command must not be empty".into()));
            }
            self.status_command = command;
        }
        for (key, script) in file.scripts {
            // Keys are stored under the canonical token so aliases resolve.
            let token = crate::menu::lookup(&key)
                .filter(|entry| entry.script().is_some())
                .map(|entry| entry.token)
                .ok_or_else(|| Error::Config(format!("unknown menu token in scripts: {key}")))?;
            self.scripts.insert(token.to_string(), script);
        }
        Ok(())
    }

    /// The scripts directory is the only thing checked before the menu starts.
    pub fn validate_scripts_dir(&self) -> Result<(), Error> {
        if self.scripts_dir.is_dir() {
            Ok(())
        } else {
            Err(Error::ScriptsDirMissing {
                path: self.scripts_dir.clone(),
            })
        }
    }

    pub fn script_path(&self, name: &str) -> PathBuf {
        self.scripts_dir.join(name)
    }

    /// Script name for a menu token, honoring `scripts:` overrides.
    pub fn script_for<'a>(&'a self, token: &str, default: &'a str) -> &'a str {
        self.scripts.get(token).map(String::as_str).unwrap_or(default)
    }
}

fn parse_config_file(path: &Path) -> Result<ConfigFile> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    let file: ConfigFile =
        serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    Ok(file)
}
