//! kd-inspect: checks recorded KPI dashboard embedding traffic.
//!
//! A developer tool that consumes the `kd-core` contracts.  It is not part of
//! the embedding protocol surface.
//!
//! # Usage
//!
//! ```text
//! kd-inspect [OPTIONS] messages <FILE|->
//! kd-inspect [OPTIONS] layout <FILE>
//!
//! Options:
//!   --config <PATH>              TOML config file
//!   --log-level <FILTER>         tracing filter when RUST_LOG is unset
//!   --expected-product <NAME>    kpiDashboard or analyticalDesigner
//!   --strict                     exit non-zero on the first invalid message
//! ```
//!
//! `messages` reads one JSON message per line (`-` for stdin) and prints one
//! JSON report per line, followed by a summary line.  `layout` parses a
//! persisted fluid layout and prints its shape.
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.  Both override the
//! config file, which overrides the built-in defaults.
//!
//! | Variable                       | Default        |
//! |--------------------------------|----------------|
//! | `KD_INSPECT_CONFIG`            | none           |
//! | `KD_INSPECT_LOG_LEVEL`         | `info`         |
//! | `KD_INSPECT_EXPECTED_PRODUCT`  | `kpiDashboard` |
//! | `KD_INSPECT_STRICT`            | `false`        |
//!
//! Logs go to stderr so stdout stays valid JSON lines.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kd_core::ProductName;
use kd_inspect::application::{layout_stats, MessageInspector};
use kd_inspect::domain::InspectConfig;
use kd_inspect::infrastructure::{load_config, JsonLinesSink};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspector for KPI dashboard embedding messages and layouts.
#[derive(Debug, Parser)]
#[command(
    name = "kd-inspect",
    about = "Checks recorded KPI dashboard embedding messages and persisted layouts",
    version
)]
struct Cli {
    /// TOML config file with `log_level`, `expected_product`, and `strict`.
    #[arg(long, env = "KD_INSPECT_CONFIG")]
    config: Option<PathBuf>,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[arg(long, env = "KD_INSPECT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Product every message is expected to carry.
    #[arg(long, env = "KD_INSPECT_EXPECTED_PRODUCT")]
    expected_product: Option<String>,

    /// Stop with a non-zero exit at the first message whose body does not
    /// decode or whose product is unexpected.
    #[arg(long, env = "KD_INSPECT_STRICT")]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect newline-delimited JSON messages.
    Messages {
        /// Input file, or `-` for stdin.
        input: String,
    },
    /// Print the shape of a persisted layout.
    Layout {
        /// Layout JSON file.
        file: PathBuf,
    },
}

impl Cli {
    /// Layers the config file and the CLI/environment overrides on top of
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or
    /// `--expected-product` is not a known product.
    fn resolve_config(&self) -> anyhow::Result<InspectConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => InspectConfig::default(),
        };

        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(name) = &self.expected_product {
            config.expected_product = ProductName::try_from(name.as_str())
                .map_err(|()| anyhow!("unknown product '{name}'"))?;
        }
        if self.strict {
            config.strict = true;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    match &cli.command {
        Command::Messages { input } => run_messages(input, config),
        Command::Layout { file } => run_layout(file),
    }
}

fn run_messages(input: &str, config: InspectConfig) -> anyhow::Result<()> {
    info!(input, strict = config.strict, product = %config.expected_product, "inspecting messages");

    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(input).with_context(|| format!("failed to open '{input}'"))?;
        Box::new(BufReader::new(file))
    };

    let mut sink = JsonLinesSink::new(io::stdout().lock());
    MessageInspector::new(config)
        .run(reader, &mut sink)
        .context("message inspection failed")?;
    Ok(())
}

fn run_layout(file: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read layout '{}'", file.display()))?;
    let stats = layout_stats(&text).with_context(|| format!("invalid layout '{}'", file.display()))?;
    println!("{}", serde_json::to_string(&stats)?);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_messages_subcommand_with_stdin() {
        // Arrange: parse with only the subcommand
        let cli = Cli::parse_from(["kd-inspect", "messages", "-"]);

        // Assert
        assert!(matches!(cli.command, Command::Messages { ref input } if input == "-"));
        assert!(!cli.strict);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_layout_subcommand() {
        let cli = Cli::parse_from(["kd-inspect", "layout", "dash.json"]);
        assert!(matches!(cli.command, Command::Layout { ref file } if file == &PathBuf::from("dash.json")));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["kd-inspect"]).is_err());
    }

    #[test]
    fn test_resolve_config_defaults() {
        // Arrange
        let cli = Cli::parse_from(["kd-inspect", "messages", "-"]);

        // Act
        let config = cli.resolve_config().unwrap();

        // Assert
        assert_eq!(config, InspectConfig::default());
    }

    #[test]
    fn test_resolve_config_cli_overrides() {
        let cli = Cli::parse_from([
            "kd-inspect",
            "--strict",
            "--log-level",
            "debug",
            "--expected-product",
            "analyticalDesigner",
            "messages",
            "-",
        ]);
        let config = cli.resolve_config().unwrap();
        assert!(config.strict);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.expected_product, ProductName::AnalyticalDesigner);
    }

    #[test]
    fn test_resolve_config_rejects_unknown_product() {
        let cli = Cli::parse_from(["kd-inspect", "--expected-product", "excel", "messages", "-"]);
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn test_resolve_config_cli_overrides_file() {
        // Arrange: the file asks for debug logging and strict mode
        let path = std::env::temp_dir().join(format!("kd-inspect-main-{}.toml", std::process::id()));
        std::fs::write(&path, "log_level = \"debug\"\nstrict = true\n").unwrap();
        let cli = Cli::parse_from([
            "kd-inspect",
            "--config",
            path.to_str().unwrap(),
            "--log-level",
            "warn",
            "layout",
            "x.json",
        ]);

        // Act
        let result = cli.resolve_config();
        let _ = std::fs::remove_file(&path);

        // Assert: CLI wins for log level, file value survives for strict
        let config = result.unwrap();
        assert_eq!(config.log_level, "warn");
        assert!(config.strict);
    }

    #[test]
    fn test_resolve_config_missing_file_is_error() {
        let cli = Cli::parse_from([
            "kd-inspect",
            "--config",
            "/nonexistent/kd-inspect.toml",
            "messages",
            "-",
        ]);
        assert!(cli.resolve_config().is_err());
    }
}
