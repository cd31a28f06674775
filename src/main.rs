mod config;
mod error;
mod market;
mod ui;

use clap::Parser;
use config::Cli;
use env_logger::Builder;
use log::{info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::fs::File;
use std::io::Write;
use ui::core::state::AppState;
use ui::dashboard::Dashboard;

fn init_logger(cli: &Cli) -> Result<(), std::io::Error> {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module("cryptoboard", cli.log_level)
        .parse_default_env()
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                ts,
                record.level(),
                record.target(),
                record.args()
            )
        });

    // stderr is drawn over by the TUI
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .target(env_logger::Target::Pipe(Box::new(file)))
                .write_style(env_logger::WriteStyle::Never);
        }
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }

    builder.init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Configure logger
    let cli = Cli::parse();
    init_logger(&cli)?;

    info!("Starting Cryptoboard...");

    // History noise source
    let mut rng = match cli.seed {
        Some(seed) => {
            info!("Seeding price histories with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    // Seed catalog, signals and alerts
    let state = AppState::load_default(&mut rng)?;
    let mut dashboard = Dashboard::new(state, rng, cli.tick_rate());

    // Run until the user quits
    if let Err(e) = dashboard.run().await {
        log::error!("Dashboard error: {}", e);
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}
