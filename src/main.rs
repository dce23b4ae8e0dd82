use anyhow::Result;
use clap::Parser as _;

mod args;
mod bus;
mod commands;
mod dbus;
mod event_loop;
mod listener;
mod metadata;
mod output;
mod players;
mod sink;
mod status;
mod utils;

use event_loop::{event_loop, Session};
use status::StatusModule;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = args::Args::parse();
    args.init_tracing_subscriber()?;

    let (session, events) = Session::new(StatusModule::new());
    event_loop(session, events).await
}
