//! Transaction Ledger CLI
//!
//! Command-line interface for driving transactions from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > summary.csv
//! cargo run -- --strategy sync commands.csv > summary.csv
//! cargo run -- --report payments commands.csv > payments.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 commands.csv > summary.csv
//! RUST_LOG=audit=debug cargo run -- commands.csv > summary.csv
//! ```
//!
//! The report goes to stdout; logs and audit lines go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use std::process;
use transaction_ledger::{cli, logging, strategy};

fn main() {
    let args = cli::parse_args();

    logging::init_logging(&args.log_level);

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, args.report, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        tracing::error!(error = %e, "processing failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
