// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::cluster::{ClusterManager, DESTROY_SCRIPT, START_SCRIPT, STATUS_SCRIPT};
use crate::process::ScriptRunner;
use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use log::{error, info, warn};
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Init,
    Status,
    Delete,
    /// Run an add-on script; holds its default file name.
    Script(&'static str),
    Exit,
}

#[derive(Debug)]
pub struct MenuEntry {
    pub token: &'static str,
    pub aliases: &'static [&'static str],
    pub action: Action,
    pub description: &'static str,
}

impl MenuEntry {
    fn matches(&self, input: &str) -> bool {
        self.token == input || self.aliases.iter().any(|a| *a == input)
    }

    /// Default script for this entry, if it runs one.
    pub fn script(&self) -> Option<&'static str> {
        match self.action {
            Action::Init => Some(START_SCRIPT),
            Action::Status => Some(STATUS_SCRIPT),
            Action::Delete => Some(DESTROY_SCRIPT),
            Action::Script(script) => Some(script),
            Action::Exit => None,
        }
    }
}

const fn entry(
    token: &'static str,
    aliases: &'static [&'static str],
    action: Action,
    description: &'static str,
) -> MenuEntry {
    MenuEntry {
        token,
        aliases,
        action,
        description,
    }
}

/// Every token the menu accepts, in display order.
#[rustfmt::skip]
pub const MENU_ENTRIES: &[MenuEntry] = &[
    entry("init", &[], Action::Init, "Start the cluster with the default configuration"),
    entry("status", &[], Action::Status, "Show cluster status"),
    entry("cp", &[], Action::Script("copy-kubeconfig.sh"), "Copy the kubeconfig from the control plane"),
    entry("repos", &[], Action::Script("add-helm-repos.sh"), "Add the Helm chart repositories"),
    entry("metallb", &["cfgmetallb"], Action::Script("install-metallb.sh"), "Configure the MetalLB load balancer"),
    entry("nginx", &[], Action::Script("install-nginx.sh"), "Install the NGINX ingress controller"),
    entry("kps", &[], Action::Script("install-kps.sh"), "Install the Kube Prometheus Stack"),
    entry("argocd", &[], Action::Script("install-argocd.sh"), "Install Argo CD and its ingress"),
    entry("lgtm", &[], Action::Script("install-lgtm.sh"), "Install the full LGTM observability stack"),
    entry("loki", &[], Action::Script("install-loki.sh"), "Install Loki"),
    entry("minio", &[], Action::Script("install-minio.sh"), "Install MinIO"),
    entry("tempo", &[], Action::Script("install-tempo.sh"), "Install Tempo"),
    entry("mimir", &[], Action::Script("install-mimir.sh"), "Install Mimir"),
    entry("otel", &[], Action::Script("install-otel.sh"), "Install the OpenTelemetry Collector"),
    entry("fix-dns", &[], Action::Script("fix-dns.sh"), "Repair CoreDNS resolution"),
    entry("show_help", &["help"], Action::Script("show-help.sh"), "Show help for the cluster scripts"),
    entry("delete", &[], Action::Delete, "Destroy the cluster"),
    entry("exit", &["sair"], Action::Exit, "Quit"),
];

/// Exact match on a token or alias. Callers trim input first.
pub fn lookup(input: &str) -> Option<&'static MenuEntry> {
    MENU_ENTRIES.iter().find(|e| e.matches(input))
}

/// What a single dispatch did.
#[derive(Debug)]
pub enum Dispatch {
    Ran,
    Failed(anyhow::Error),
    AlreadyActive,
    Invalid,
    Exit,
}

pub struct Menu<S, R, W> {
    manager: ClusterManager<S>,
    input: Lines<R>,
    out: W,
}

impl<S, R, W> Menu<S, R, W>
where
    S: ScriptRunner,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(manager: ClusterManager<S>, input: R, out: W) -> Self {
        Self {
            manager,
            input: input.lines(),
            out,
        }
    }

    pub fn into_parts(self) -> (ClusterManager<S>, W) {
        (self.manager, self.out)
    }

    fn say(&mut self, text: ColoredString) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    /// `active` is `None` when the status query failed.
    pub fn print_header(&mut self, active: Option<bool>) -> io::Result<()> {
        self.say("=== Kubernetes Cluster Manager ===".cyan())?;
        match active {
            Some(true) => self.say("Cluster: ACTIVE".green())?,
            Some(false) => self.say("Cluster: INACTIVE".yellow())?,
            None => self.say("Cluster: UNKNOWN".red())?,
        }
        writeln!(self.out)
    }

    pub fn print_options(&mut self, active: bool) -> io::Result<()> {
        self.say("Choose an option:".cyan())?;
        for e in MENU_ENTRIES {
            let label = match e.aliases {
                [] => e.token.to_string(),
                aliases => format!("{} ({})", e.token, aliases.join(", ")),
            };
            let line = format!("{label:<22} - {}", e.description);
            let line = match e.action {
                Action::Init if active => {
                    format!("{label:<22} - (unavailable: cluster already active)").white()
                }
                Action::Delete => line.red(),
                Action::Exit => line.magenta(),
                _ => line.green(),
            };
            self.say(line)?;
        }
        writeln!(self.out)
    }

    /// Prompt and read one trimmed line. `None` on EOF or Ctrl-C.
    pub async fn read_input(&mut self) -> io::Result<Option<String>> {
        write!(self.out, "{}", "Enter your option: ".white())?;
        self.out.flush()?;
        tokio::select! {
            line = self.input.next_line() => Ok(line?.map(|l| l.trim().to_string())),
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted at prompt");
                writeln!(self.out)?;
                Ok(None)
            }
        }
    }

    pub async fn dispatch(&mut self, input: &str, active: bool) -> io::Result<Dispatch> {
        let Some(entry) = lookup(input) else {
            if !input.is_empty() {
                info!("invalid option: {input:?}");
            }
            self.say("Invalid option!".yellow())?;
            writeln!(self.out)?;
            return Ok(Dispatch::Invalid);
        };

        let result = match entry.action {
            Action::Exit => {
                self.say("Exiting...".magenta())?;
                return Ok(Dispatch::Exit);
            }
            Action::Init if active => {
                self.say("Cluster is already active!".yellow())?;
                writeln!(self.out)?;
                return Ok(Dispatch::AlreadyActive);
            }
            Action::Init => {
                self.say("Starting cluster...".cyan())?;
                let res = self.manager.start_cluster().await;
                if res.is_ok() {
                    self.say("Cluster started successfully!".green())?;
                }
                res
            }
            Action::Delete => {
                self.say("Deleting cluster...".cyan())?;
                let res = self.manager.destroy_cluster().await;
                if res.is_ok() {
                    self.say("Cluster deleted successfully!".green())?;
                }
                res
            }
            Action::Status => {
                self.say("Cluster status:".cyan())?;
                let res = self.manager.show_status().await;
                if res.is_ok() {
                    self.say("************************************".green())?;
                }
                res
            }
            Action::Script(script) => {
                self.say(format!("Running {}...", entry.token).cyan())?;
                let res = self.manager.run_command(entry.token, script).await;
                if res.is_ok() {
                    self.say(format!("{} finished.", entry.token).green())?;
                }
                res
            }
        };

        let outcome = match result {
            Ok(()) => Dispatch::Ran,
            Err(e) => {
                error!("[{}] {e:#}", entry.token);
                self.say(format!("Error: {e:#}").red())?;
                Dispatch::Failed(e)
            }
        };
        writeln!(self.out)?;
        Ok(outcome)
    }

    /// Header, options, prompt, dispatch; until `exit`, EOF or Ctrl-C.
    /// Only a status failure on the very first pass is fatal.
    pub async fn run(&mut self) -> Result<()> {
        let mut first = true;
        loop {
            let active = match self.manager.cluster_active().await {
                Ok(active) => Some(active),
                Err(e) if first => {
                    return Err(e).context("failed to check cluster status");
                }
                Err(e) => {
                    let e = anyhow::Error::from(e);
                    warn!("{e:#}");
                    self.say(format!("Error checking cluster status: {e:#}").red())?;
                    None
                }
            };
            first = false;

            self.print_header(active)?;
            let active = active.unwrap_or(false);
            self.print_options(active)?;

            let Some(input) = self.read_input().await? else {
                info!("input closed, exiting");
                return Ok(());
            };
            if let Dispatch::Exit = self.dispatch(&input, active).await? {
                info!("exit requested");
                return Ok(());
            }
        }
    }
}
