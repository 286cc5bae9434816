//! etcd-join - bootstrap configuration for etcd cluster members
//!
//! This is the CLI entry point. Configuration lines go to stdout, logs go
//! to stderr.

use clap::Parser;
use etcd_join::cluster::{HttpMembershipClient, Reconciler};
use etcd_join::config::{JoinConfig, OutputFormat};
use etcd_join::error::Result;
use etcd_join::fleet::StaticFleet;
use etcd_join::output::{self, FAILURE_SENTINEL};
use etcd_join::{bootstrap, NodeIdentity};
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// etcd-join - compute etcd bootstrap configuration for this node
#[derive(Parser)]
#[command(name = "etcd-join")]
#[command(author = "Evoker Industries")]
#[command(version)]
#[command(about = "Bootstrap or join an etcd cluster from fleet membership", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// This node's member name (instance ID)
    #[arg(long, env = "ETCD_JOIN_NAME")]
    name: String,

    /// This node's private address (defaults to its fleet entry)
    #[arg(long, env = "ETCD_JOIN_PRIVATE_IP")]
    private_ip: Option<IpAddr>,

    /// Fleet membership file (YAML or JSON)
    #[arg(long, env = "ETCD_JOIN_FLEET_FILE")]
    fleet: PathBuf,

    /// Configuration file (YAML)
    #[arg(short, long, env = "ETCD_JOIN_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Discovery probe timeout in milliseconds
    #[arg(long)]
    probe_timeout_ms: Option<u64>,

    /// Fail when no candidate refused the probe and none answered
    #[arg(long)]
    strict_discovery: bool,
}

impl Cli {
    /// Load the configuration file and apply command line overrides
    fn join_config(&self) -> Result<JoinConfig> {
        let mut config = match &self.config {
            Some(path) => JoinConfig::load(path)?,
            None => JoinConfig::default(),
        };

        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(timeout_ms) = self.probe_timeout_ms {
            config.discovery.timeout_ms = timeout_ms;
        }
        if self.strict_discovery {
            config.discovery.strict = true;
        }

        config.validate()?;
        Ok(config)
    }
}

async fn run(cli: &Cli) -> Result<String> {
    let config = cli.join_config()?;
    let fleet = StaticFleet::load(&cli.fleet)?;
    let node = NodeIdentity::new(&cli.name, cli.private_ip);

    let reconciler = Reconciler::new(HttpMembershipClient::new()?, config.clone());
    let bootstrap_config = bootstrap(&node, &fleet, &reconciler).await?;

    Ok(bootstrap_config.render(&config.output))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if e.use_stderr() {
                println!("{}", FAILURE_SENTINEL);
            }
            e.exit();
        }
    };

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let (stdout, code) = output::finish(run(&cli).await);
    print!("{}", stdout);
    ExitCode::from(code)
}
