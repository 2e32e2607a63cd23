// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

pub mod cluster;
pub mod config;
pub mod errors;
pub mod menu;
pub mod process;
pub mod status;

pub use cluster::ClusterManager;
pub use config::Config;
pub use errors::Error;
pub use menu::Menu;
pub use process::{ProcessRunner, ScriptRunner};
