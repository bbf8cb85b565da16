//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};
use packtrace_session::{ObservationCoordinator, SessionConfig};
use packtrace_types::{ChangeCategory, RegistryTarget};
use tracing::info;

use crate::error::CliError;

/// Packtrace - capture system changes during an installer run
///
/// Watches filesystem roots, registry subtrees and the service table while
/// an installer executes, then writes a structured change report for
/// package sequencing.
#[derive(Debug, Parser)]
#[command(
    name = "packtrace",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "PACKTRACE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Filesystem root to watch (repeatable, overrides config roots)
    #[arg(long = "root", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub roots: Vec<PathBuf>,

    /// Registry key to watch, e.g. HKLM\SOFTWARE (repeatable, overrides config)
    #[arg(long = "registry-key", value_name = "HIVE\\SUBTREE")]
    pub registry_keys: Vec<String>,

    /// Observation window in seconds
    #[arg(short, long, value_name = "SECS")]
    pub duration: Option<u64>,

    /// Destination of the exported change report
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Resolve the effective session configuration.
    ///
    /// Precedence: command-line flags, then the config file, then built-in
    /// platform defaults.
    pub fn session_config(&self) -> Result<SessionConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };

        if !self.roots.is_empty() {
            config.roots = self.roots.clone();
        }
        if !self.registry_keys.is_empty() {
            config.registry_targets = self
                .registry_keys
                .iter()
                .map(|raw| raw.parse::<RegistryTarget>())
                .collect::<Result<_, _>>()?;
        }
        if let Some(duration) = self.duration {
            config.duration_secs = duration;
        }
        if let Some(output) = &self.output {
            config.report_path = output.clone();
        }

        Ok(config)
    }

    /// Run one observation session to completion.
    pub async fn execute(&self, config: SessionConfig) -> Result<(), CliError> {
        let report_path = config.report_path.clone();
        let coordinator = ObservationCoordinator::new(config);
        let stop = coordinator.stop_signal();

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping observation");
                stop.trigger();
            }
        });

        println!("Monitoring system changes for package sequencing... Press Ctrl+C to stop.");
        println!("Start the application installation now.");

        let snapshot = coordinator.run().await?;

        println!();
        println!("Captured changes:");
        for category in ChangeCategory::all() {
            println!(
                "  {:<10} {}",
                format!("{category}:"),
                snapshot.records(category).len()
            );
        }
        println!("Change report written to {}", report_path.display());
        println!();
        println!("Next steps for package creation:");
        println!("1. Open the sequencer on a clean virtual machine.");
        println!("2. Start a new sequencing project and install the application while the sequencer is monitoring.");
        println!("3. Use the change report to verify the captured changes.");
        println!("4. Save the resulting virtualized application package.");

        Ok(())
    }
}
