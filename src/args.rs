use std::{fs::File, io, sync::Mutex};

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// File to write the log to. If not specified, logs will be written to
    /// stderr (stdout carries the bar protocol).
    #[clap(long, short)]
    log_file: Option<String>,
}

impl Args {
    /// Build the tracing subscriber using parameters from the command line
    /// arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be created.
    pub fn init_tracing_subscriber(&self) -> Result<()> {
        let builder = tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(EnvFilter::from_default_env());

        match self.log_file.as_ref() {
            None => builder.with_writer(io::stderr).init(),
            Some(f) => builder
                .with_writer(Mutex::new(
                    File::create(f).with_context(|| format!("Failed to create log file {f}"))?,
                ))
                .init(),
        }
        Ok(())
    }
}
