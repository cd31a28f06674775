use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Terminal dashboard for mock crypto markets, signals and price alerts", long_about = None)]
pub struct Cli {
    /// Seed for the price-history generator. Random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Redraw interval in milliseconds
    #[arg(long, default_value_t = 250)]
    pub tick_rate_ms: u64,

    /// Log level for this crate (off, error, warn, info, debug, trace)
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags() {
        let cli = Cli::parse_from(["cryptoboard"]);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.tick_rate(), Duration::from_millis(250));
        assert_eq!(cli.log_level, LevelFilter::Info);
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::parse_from([
            "cryptoboard",
            "--seed",
            "42",
            "--tick-rate-ms",
            "0",
            "--log-level",
            "debug",
            "--log-file",
            "board.log",
        ]);
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.tick_rate(), Duration::from_millis(1));
        assert_eq!(cli.log_level, LevelFilter::Debug);
        assert_eq!(cli.log_file, Some(PathBuf::from("board.log")));
    }
}
