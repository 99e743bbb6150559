//! OpusCheckers - Checkers Engine
//!
//! Usage:
//!     opus_checkers [--threads N] [--depth N] [--no-force-jump] [--log-level LEVEL]
//!
//! The engine reads protocol commands from stdin and writes responses to
//! stdout. Logs go to stderr; `RUST_LOG` overrides `--log-level`.

use std::io;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use opus_checkers::protocol::CheckersProtocol;

#[derive(Parser, Debug)]
#[command(name = "opus_checkers")]
#[command(about = "8x8 checkers engine speaking a line-based text protocol", long_about = None)]
struct Args {
    /// Search threads (0 = all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Default search depth for `go`
    #[arg(short, long)]
    depth: Option<u32>,

    /// Allow steps even when a capture is available
    #[arg(long)]
    no_force_jump: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut protocol = CheckersProtocol::new(stdout.lock());

    if let Some(threads) = args.threads {
        if !protocol.set_option("Threads", &threads.to_string()) {
            warn!(threads, "thread count out of range, keeping default");
        }
    }
    if let Some(depth) = args.depth {
        if !protocol.set_option("Depth", &depth.to_string()) {
            warn!(depth, "depth out of range, keeping default");
        }
    }
    if args.no_force_jump {
        protocol.set_option("ForceJump", "false");
        protocol.process_command("newgame");
    }

    info!(version = env!("CARGO_PKG_VERSION"), "engine started");

    let stdin = io::stdin();
    protocol.run(stdin.lock());
}
