//! Session wiring and the main select loop.

use anyhow::{bail, Context as _, Result};
use tokio::{
    io::{AsyncBufReadExt as _, BufReader},
    select,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
};

use crate::{
    bus::{BusCache, BusEvent},
    commands::HostCommand,
    listener::ListenerService,
    players::player_menu,
    sink::{Sink, SinkCache},
};

/// One media-control session: the bus cache, the listener wiring, and the
/// sink cache, built once at startup and torn down on shutdown.
pub struct Session<S> {
    bus: BusCache,
    listener: ListenerService,
    sink_cache: SinkCache<S>,
    events: UnboundedSender<BusEvent>,
}

impl<S: Sink> Session<S> {
    /// Build the session around the given sink. The returned receiver is
    /// the other end of the notification channel the listener installs.
    pub fn new(sink: S) -> (Self, UnboundedReceiver<BusEvent>) {
        let (events, event_receiver) = mpsc::unbounded_channel();
        let mut sink_cache = SinkCache::new();
        sink_cache.set_sink(Some(sink));

        (
            Self {
                bus: BusCache::new(),
                listener: ListenerService::new(),
                sink_cache,
                events,
            },
            event_receiver,
        )
    }

    /// Full teardown and re-activation. This is both the activation path
    /// and the `reconnect` command.
    ///
    /// The listener is started before the bus so the initial service
    /// selection is already observed as a change notification.
    pub async fn reconnect(&mut self) -> Result<()> {
        self.listener.stop(&mut self.bus, &mut self.sink_cache);
        self.bus.stop().await?;
        if let Some(sink) = self.sink_cache.sink_mut() {
            sink.clear()?;
        }
        self.listener
            .start(&mut self.bus, self.events.clone())
            .await?;
        self.sink_cache.start_sink()
    }

    /// First connection attempt. A failure releases the bus connection
    /// instead of leaving it half-open.
    pub async fn activate(&mut self) -> Result<()> {
        if let Err(e) = self.reconnect().await {
            if let Err(stop_error) = self.bus.stop().await {
                tracing::warn!(?stop_error, "Failed to release the bus after an activation error");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Shutdown path once the host closes stdin.
    pub async fn deactivate(&mut self) -> Result<()> {
        self.listener.stop(&mut self.bus, &mut self.sink_cache);
        self.bus.stop().await?;
        if let Some(sink) = self.sink_cache.sink_mut() {
            sink.stop()?;
        }
        Ok(())
    }

    async fn handle_command(&mut self, command: HostCommand) -> Result<()> {
        match command {
            HostCommand::Transport(command) => self.bus.send_mpris_command(command).await,
            HostCommand::Reconnect => self.reconnect().await,
            HostCommand::Switch => {
                let menu = player_menu(&mut self.bus).await?;
                menu.print().context("Failed to write the player menu")
            }
            HostCommand::Select(service) => self.bus.set_service(Some(service)).await,
        }
    }
}

/// Drive the session until the host closes stdin.
pub async fn event_loop<S: Sink>(
    mut session: Session<S>,
    mut events: UnboundedReceiver<BusEvent>,
) -> Result<()> {
    session.activate().await?;

    let mut commands = BufReader::new(tokio::io::stdin()).lines();

    loop {
        select! {
            event = events.recv() => {
                let Some(event) = event else {
                    bail!("Bus event channel closed");
                };
                tracing::debug!(?event, "Bus event received");
                if let Err(e) = session.sink_cache.refresh(&session.bus).await {
                    tracing::warn!(?e, "Failed to refresh the status sink");
                }
            }
            line = commands.next_line() => {
                let Some(line) = line.context("Failed to read commands from stdin")? else {
                    tracing::info!("Host closed stdin, shutting down");
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line.parse::<HostCommand>() {
                    Ok(command) => {
                        tracing::info!(line, "Host command received");
                        if let Err(e) = session.handle_command(command).await {
                            tracing::warn!(?e, line, "Command failed");
                        }
                    }
                    Err(e) => tracing::warn!(?e, "Ignoring unparseable command"),
                }
            }
        }
    }

    session.deactivate().await
}
