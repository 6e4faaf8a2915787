//! DuelChess - UCI engine binary
//!
//! Usage:
//!     duel_chess [config.toml]
//!
//! Reads UCI commands from stdin and writes responses to stdout.
//! Log level is taken from RUST_LOG.

use std::io;
use std::process::ExitCode;

use duel_chess::uci::UCIProtocol;
use duel_chess::EngineConfig;
use log::{error, info};

fn main() -> ExitCode {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match EngineConfig::load(&path) {
            Ok(config) => {
                info!("loaded configuration from {}", path);
                config
            }
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    let mut uci = UCIProtocol::new(config);
    if let Err(e) = uci.run(io::stdin().lock()) {
        error!("{}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
