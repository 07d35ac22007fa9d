//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// EcoStatus - ecosystem status aggregator
///
/// Discovers the component inventory, probes configured services for
/// liveness and serves an aggregate snapshot over HTTP with live
/// WebSocket updates.
///
/// Examples:
///   ecostatus
///   ecostatus --config ./ecostatus.toml --port 9000
///   ecostatus --once --format json
///   ecostatus --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .ecostatus.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "ECOSTATUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind the HTTP server to
    #[arg(short, long, value_name = "PORT", env = "ECOSTATUS_PORT")]
    pub port: Option<u16>,

    /// Seconds between probe cycles
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Per-probe request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub probe_timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Discover and probe once, print a report and exit
    #[arg(long)]
    pub once: bool,

    /// Report format for --once (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT", requires = "once")]
    pub format: OutputFormat,

    /// Write the --once report to a file instead of stdout
    #[arg(short, long, value_name = "FILE", requires = "once")]
    pub output: Option<PathBuf>,

    /// With --once, exit with code 2 if any service is offline
    #[arg(long, requires = "once")]
    pub fail_on_offline: bool,

    /// Generate a default .ecostatus.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the one-shot report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.interval == Some(0) {
            return Err("Interval must be at least 1 second".to_string());
        }

        if self.probe_timeout == Some(0) {
            return Err("Probe timeout must be at least 1 second".to_string());
        }

        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: None,
            host: None,
            port: None,
            interval: None,
            probe_timeout: None,
            verbose: false,
            quiet: false,
            once: false,
            format: OutputFormat::Markdown,
            output: None,
            fail_on_offline: false,
            init_config: false,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_interval() {
        let mut args = make_args();
        args.interval = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.probe_timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_config_file() {
        let mut args = make_args();
        args.config = Some(PathBuf::from("/nonexistent/ecostatus.toml"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_parse_once_json() {
        let args = Args::try_parse_from(["ecostatus", "--once", "--format", "json"]).unwrap();
        assert!(args.once);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_format_requires_once() {
        assert!(Args::try_parse_from(["ecostatus", "--format", "json"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
