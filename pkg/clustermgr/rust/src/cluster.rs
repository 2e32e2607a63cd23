// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::config::Config;
use crate::errors::Error;
use crate::process::ScriptRunner;
use crate::status;
use anyhow::{Context, Result};
use log::{debug, info};

pub const START_SCRIPT: &str = "up-k8s.sh";
pub const DESTROY_SCRIPT: &str = "destroy-cluster.sh";
pub const STATUS_SCRIPT: &str = "status-k8s.sh";

/// Cluster lifecycle operations, each backed by one script in the
/// configured scripts directory.
pub struct ClusterManager<R> {
    config: Config,
    runner: R,
}

impl<R: ScriptRunner> ClusterManager<R> {
    pub fn new(config: Config, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn runner(&self) -> &R {
        &self.runner
    }

    /// Ask Vagrant whether the master node is running. Never cached.
    pub async fn cluster_active(&self) -> Result<bool, Error> {
        let (program, args) = self
            .config
            .status_command
            .split_first()
            .ok_or_else(|| Error::Config("status_command must not be empty".into()))?;
        let output = self
            .runner
            .capture(program, args)
            .await
            .map_err(|e| Error::StatusQuery(Box::new(e)))?;

        let node = &self.config.master_node_name;
        match status::node_state(&output, node) {
            Some(state) => debug!("[{node}] state={state}"),
            None => debug!("[{node}] no state record in status output"),
        }
        Ok(status::node_is_running(&output, node))
    }

    pub async fn start_cluster(&self) -> Result<()> {
        self.run("init", START_SCRIPT)
            .await
            .context("failed to start cluster")
    }

    pub async fn destroy_cluster(&self) -> Result<()> {
        self.run("delete", DESTROY_SCRIPT)
            .await
            .context("failed to destroy cluster")
    }

    pub async fn show_status(&self) -> Result<()> {
        self.run("status", STATUS_SCRIPT)
            .await
            .context("failed to get cluster status")
    }

    /// Run the script behind an add-on menu token.
    pub async fn run_command(&self, token: &str, default_script: &str) -> Result<()> {
        self.run(token, default_script)
            .await
            .with_context(|| format!("{token} failed"))
    }

    async fn run(&self, token: &str, default_script: &str) -> Result<(), Error> {
        let script = self.config.script_for(token, default_script);
        let path = self.config.script_path(script);
        info!("[{token}] running {}", path.display());
        self.runner.run_script(&path).await
    }
}
