mod config;
mod generate;
mod packer;
mod password;
mod preseed;
mod utils;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use camino::Utf8Path;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::BuildConfig;

fn main() -> ExitCode {
    let mut config = BuildConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&mut config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &mut BuildConfig) -> Result<()> {
    // Ctrl-C reaches packer too, since it shares our process group. Packer
    // tears down its VM on SIGINT and then exits nonzero; stay alive until it
    // does so the failure is reported like any other. A second Ctrl-C exits.
    ctrlc::set_handler(|| {
        if interrupted_before() {
            std::process::exit(130);
        }
        tracing::warn!("interrupted, waiting for child processes to exit (Ctrl-C again to quit)");
    })
    .context("setting up signal handler")?;

    generate::run(config, Utf8Path::new("."))
}

/// Records an interrupt and reports whether one had already been seen.
fn interrupted_before() -> bool {
    static INTERRUPTED: AtomicBool = AtomicBool::new(false);
    INTERRUPTED.swap(true, Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_interrupt_is_seen() {
        assert!(!interrupted_before());
        assert!(interrupted_before());
        assert!(interrupted_before());
    }
}
