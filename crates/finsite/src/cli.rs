use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing
    #[arg(long, default_value = "INFO", ignore_case = true)]
    pub trace: TraceLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the realtime price of a ticker until interrupted.
    Watch {
        ticker: String,

        /// Poll interval in milliseconds; defaults to POLL_INTERVAL_MS.
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Render the close series of a ticker to an SVG file.
    Chart {
        ticker: String,

        #[arg(long, default_value = "2025-01-01")]
        from: String,

        #[arg(long, default_value = "2025-12-31")]
        to: String,

        /// Output file; defaults to `<ticker>.svg`.
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Use the small panel size.
        #[arg(long)]
        compact: bool,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[value(rename_all = "UPPER")]
pub enum TraceLevel {
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_watch() {
        let cli = Cli::try_parse_from([
            "finsite", "--trace", "DEBUG", "watch", "2330", "--interval", "1000",
        ])
        .unwrap();
        assert_eq!(cli.trace, TraceLevel::DEBUG);
        match cli.command {
            Commands::Watch { ticker, interval } => {
                assert_eq!(ticker, "2330");
                assert_eq!(interval, Some(1000));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn chart_defaults() {
        let cli = Cli::try_parse_from(["finsite", "chart", "2330"]).unwrap();
        assert_eq!(cli.trace, TraceLevel::INFO);
        match cli.command {
            Commands::Chart { from, to, out, compact, .. } => {
                assert_eq!(from, "2025-01-01");
                assert_eq!(to, "2025-12-31");
                assert_eq!(out, None);
                assert!(!compact);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn trace_level_ignores_case() {
        let cli = Cli::try_parse_from(["finsite", "--trace", "warn", "chart", "2330"]).unwrap();
        assert_eq!(cli.trace, TraceLevel::WARN);
        assert!(Cli::try_parse_from(["finsite", "--trace", "LOUD", "chart", "2330"]).is_err());
    }
}
