// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use anyhow::Result;
use clap::Parser;
use clustermgr::{ClusterManager, Config, Menu, ProcessRunner};
use log::{LevelFilter, error, info};
use std::path::PathBuf;
use tokio::io::BufReader;

#[derive(Debug, Parser)]
#[command(name = "clustermgr", version, about = "Interactive menu for a local Kubernetes cluster")]
struct Args {
    /// YAML configuration file (defaults to $CLUSTERMGR_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the cluster scripts
    #[arg(long)]
    scripts_dir: Option<PathBuf>,

    /// Log level written to the log file
    #[arg(long)]
    log_level: Option<LevelFilter>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(dir) = args.scripts_dir {
        config.scripts_dir = dir;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    if let Err(e) = clustermgr_log::init(&config.log_file, config.log_level) {
        eprintln!("warning: file logging disabled: {e}");
    }
    info!(
        "clustermgr starting (version {})",
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "scripts_dir={} master_node={} log_file={} interpreter={}",
        config.scripts_dir.display(),
        config.master_node_name,
        config.log_file.display(),
        config.interpreter
    );

    if let Err(e) = config.validate_scripts_dir() {
        error!("{e}");
        return Err(e.into());
    }

    let runner = ProcessRunner::new(config.interpreter.clone());
    let manager = ClusterManager::new(config, runner);
    let mut menu = Menu::new(
        manager,
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
    );

    // Exit directly: a Ctrl-C at the prompt leaves a blocking stdin read
    // behind that would otherwise hold up runtime shutdown.
    let code = match menu.run().await {
        Ok(()) => {
            info!("clustermgr exiting");
            0
        }
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            1
        }
    };
    log::logger().flush();
    std::process::exit(code);
}
