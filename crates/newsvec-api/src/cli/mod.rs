//! CLI command definitions for the `newsvec` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod index;
pub mod recommend;
pub mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Content-based news article recommendations over embedding vectors.
#[derive(Parser)]
#[command(name = "newsvec", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Config file to use instead of `{data_dir}/config.toml`.
    #[arg(long, global = true, env = "NEWSVEC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,newsvec=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed the articles of a metadata CSV and store them.
    Index {
        /// Path to the NYT metadata CSV.
        csv: PathBuf,

        /// Number of rows read from the top of the file.
        #[arg(long, default_value_t = newsvec_infra::dataset::nyt::DEFAULT_LIMIT)]
        limit: usize,

        /// Drop previously stored articles first.
        #[arg(long)]
        reset: bool,
    },

    /// Recommend articles similar to a stored article.
    Recommend {
        /// Id of the stored article.
        article_id: String,

        /// Number of recommendations (defaults to `[store] top_k`).
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Recommend articles for a free-text preference.
    Ask {
        /// The preference; prompted for interactively when omitted.
        #[arg(long)]
        query: Option<String>,

        /// Number of recommendations (defaults to `[store] top_k`).
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Show stored metadata for one or more articles.
    Show {
        /// Article ids.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
