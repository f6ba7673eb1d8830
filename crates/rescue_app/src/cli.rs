//! Command line for the wayback rescue tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use rescue_core::{SearchState, TabId};
use rescue_engine::WorkflowOutcome;
use rescue_logging::{rescue_info, rescue_warn, LevelFilter};

use crate::platform::app::{
    print_variants, run_lookup, run_rescue, show_status_page, RescueRequest, SimulatedFailure,
};
use crate::platform::config::{load_config, write_config, RescueConfig, DEFAULT_CONFIG_PATH};
use crate::platform::logging::{self, LogDestination};

const EXIT_NOT_FOUND: u8 = 2;
const EXIT_FAILED: u8 = 3;

/// Top-level CLI for the wayback rescue tool.
#[derive(Debug, Parser)]
#[command(name = "wayback-rescue")]
#[command(about = "Recover failed pages from the Wayback Machine", long_about = None)]
pub struct Cli {
    /// Path to the RON configuration file.
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Log at debug level regardless of the configured level.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// List the URL variants a rescue would check, in priority order.
    Variants {
        /// The URL that failed to load.
        url: String,
    },

    /// Look every variant up in the archive and report the best match.
    Lookup {
        /// The URL that failed to load.
        url: String,
    },

    /// Simulate a failed navigation and rescue it end to end.
    Rescue {
        /// The URL that failed to load.
        url: String,
        /// HTTP status of the failed main-frame response.
        #[arg(long, value_name = "CODE", required_unless_present = "net_error")]
        status: Option<u16>,
        /// Network error name, e.g. net::ERR_NAME_NOT_RESOLVED.
        #[arg(long, value_name = "NAME", conflicts_with = "status")]
        net_error: Option<String>,
        /// Tab the failure happened in.
        #[arg(long, default_value = "1", value_name = "ID")]
        tab: TabId,
        /// Press close on the notice when no archive was redirected to.
        #[arg(long)]
        dismiss: bool,
    },

    /// Paint the status page for a status-page address.
    StatusPage {
        /// Address carrying the state as query parameters.
        address: String,
        /// Redirect on a found state, as a page without a controller does.
        #[arg(long)]
        auto_redirect: bool,
        /// Press close on the notice after painting it.
        #[arg(long)]
        dismiss: bool,
    },

    /// Write the default configuration to the config path.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn run_from_args() -> Result<ExitCode> {
        Cli::parse().run()
    }

    pub fn run(self) -> Result<ExitCode> {
        let (config, config_error) = match load_config(&self.config) {
            Ok(config) => (config, None),
            Err(err) => (RescueConfig::default(), Some(err)),
        };

        let destination = if config.log_to_file {
            LogDestination::Both
        } else {
            LogDestination::Terminal
        };
        let level = if self.verbose {
            LevelFilter::Debug
        } else {
            config.level()
        };
        logging::initialize(destination, level);
        if let Some(err) = config_error {
            rescue_warn!("{}; using defaults", err);
        }

        match self.command {
            CliCommand::Variants { url } => {
                print_variants(&url);
                Ok(ExitCode::SUCCESS)
            }
            CliCommand::Lookup { url } => match run_lookup(&config, &url)? {
                Some(_) => Ok(ExitCode::SUCCESS),
                None => Ok(ExitCode::from(EXIT_NOT_FOUND)),
            },
            CliCommand::Rescue {
                url,
                status,
                net_error,
                tab,
                dismiss,
            } => {
                let failure = match (status, net_error) {
                    (Some(status), _) => SimulatedFailure::HttpStatus(status),
                    (None, Some(error)) => SimulatedFailure::NetworkError(error),
                    (None, None) => bail!("either --status or --net-error is required"),
                };
                let request = RescueRequest {
                    url,
                    tab_id: tab,
                    failure,
                    dismiss,
                };
                Ok(outcome_exit_code(run_rescue(&config, &request)?.as_ref()))
            }
            CliCommand::StatusPage {
                address,
                auto_redirect,
                dismiss,
            } => {
                let state = show_status_page(&config, &address, auto_redirect, dismiss)?;
                Ok(match state {
                    SearchState::NotFound => ExitCode::from(EXIT_NOT_FOUND),
                    SearchState::Error { .. } => ExitCode::from(EXIT_FAILED),
                    _ => ExitCode::SUCCESS,
                })
            }
            CliCommand::InitConfig { force } => {
                init_config(&self.config, &config, force)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn outcome_exit_code(outcome: Option<&WorkflowOutcome>) -> ExitCode {
    match outcome {
        None | Some(WorkflowOutcome::Redirected { .. }) => ExitCode::SUCCESS,
        Some(WorkflowOutcome::NotFound) => ExitCode::from(EXIT_NOT_FOUND),
        Some(WorkflowOutcome::Failed { message }) => {
            eprintln!("rescue failed: {message}");
            ExitCode::from(EXIT_FAILED)
        }
    }
}

fn init_config(path: &Path, current: &RescueConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    let config = if force {
        RescueConfig::default()
    } else {
        current.clone()
    };
    write_config(path, &config)?;
    rescue_info!("Wrote configuration to {}", path.display());
    println!("Wrote {}", path.display());
    Ok(())
}
