use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use mesos_state::{Resolver, Resources, Upid};
use statectl::config::Config;
use statectl::{load_snapshot, report};

#[derive(Parser)]
#[command(name = "statectl", version)]
struct Cli {
    /// TOML config (ip source order, slave address overrides).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Comma separated ip sources, overriding the config, e.g. `netinfo,host`.
    #[arg(long, global = true, value_delimiter = ',')]
    sources: Option<Vec<String>>,

    /// Log filter (env-filter syntax). Defaults to RUST_LOG.
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolved addresses and ports of every task, one JSON object per line
    Tasks {
        #[arg(long)]
        state: PathBuf,
        /// Include tasks that are not TASK_RUNNING
        #[arg(long)]
        all: bool,
    },

    /// Resolved addresses of a single task
    Ips {
        #[arg(long)]
        state: PathBuf,
        #[arg(long)]
        task: String,
    },

    /// Scheduler host and port of every framework
    Frameworks {
        #[arg(long)]
        state: PathBuf,
    },

    /// Parsed leader pid
    Leader {
        #[arg(long)]
        state: PathBuf,
    },

    /// Expand a port range literal, e.g. "[31000-31005]"
    Ports { range: String },

    /// Parse a pid of the form id@host:port
    Pid { pid: String },

    /// Write the default config to PATH
    ConfigInit { path: PathBuf },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match &cli.log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config::load_or_default(cli.config.as_deref())?;
    let resolver = match &cli.sources {
        Some(names) => Resolver::from_names(names),
        None => cfg.resolver(),
    };
    tracing::debug!(sources = ?resolver.source_names(), "resolver ready");

    match cli.cmd {
        Command::Tasks { state, all } => {
            let snap = load_snapshot(&state, &cfg.slaves)?;
            for r in report::task_reports(&snap, &resolver, !all) {
                print_json(&r)?;
            }
        }
        Command::Ips { state, task } => {
            let snap = load_snapshot(&state, &cfg.slaves)?;
            let Some(t) = snap.tasks().find(|t| t.id == task) else {
                bail!("task {task} not found in {}", state.display());
            };
            for ip in resolver.ips(t) {
                println!("{ip}");
            }
        }
        Command::Frameworks { state } => {
            let snap = load_snapshot(&state, &cfg.slaves)?;
            for r in report::framework_reports(&snap) {
                print_json(&r)?;
            }
        }
        Command::Leader { state } => {
            let snap = load_snapshot(&state, &cfg.slaves)?;
            let leader = snap.leader_upid().context("parse leader")?;
            println!("{leader}");
        }
        Command::Ports { range } => {
            let ports = Resources { port_ranges: range }.ports();
            println!("{}", ports.join(" "));
        }
        Command::Pid { pid } => {
            let pid = Upid::parse(&pid).with_context(|| format!("parse pid {pid:?}"))?;
            print_json(&serde_json::json!({
                "id": pid.id(),
                "host": pid.host(),
                "port": pid.port(),
            }))?;
        }
        Command::ConfigInit { path } => {
            Config::default().save_to(&path)?;
            println!("Wrote default config to {}", path.display());
        }
    }

    Ok(())
}
