//! Owns the D-Bus connection and the currently selected MPRIS service.

use anyhow::{bail, Context as _, Result};
use futures_lite::StreamExt as _;
use tokio::{select, sync::mpsc::UnboundedSender, task::JoinHandle};
use zbus::{fdo::DBusProxy, names::OwnedBusName, Connection};

use crate::dbus::{MediaPlayer2Proxy, PlayerProxy, MPRIS_PATH, MPRIS_PREFIX};

/// Notifications delivered through the handler channels installed on a
/// [`BusCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// The selected service switched (possibly to the same value).
    ServiceChanged,
    /// The selected player's `Metadata` or `PlaybackStatus` changed.
    PropertiesChanged,
}

/// Transport commands understood by every MPRIS player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MprisCommand {
    Next,
    Previous,
    Pause,
    PlayPause,
    Stop,
    Play,
}

impl MprisCommand {
    /// The method name on the `org.mpris.MediaPlayer2.Player` interface.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Next => "Next",
            Self::Previous => "Previous",
            Self::Pause => "Pause",
            Self::PlayPause => "PlayPause",
            Self::Stop => "Stop",
            Self::Play => "Play",
        }
    }
}

/// Single owner of the bus connection, the selected service, and the
/// proxies derived from it.
///
/// The player proxy and the property-change subscription are always
/// rebuilt together when the selection changes, and are absent while no
/// service is selected.
#[derive(Default)]
pub struct BusCache {
    connection: Option<Connection>,
    dbus_root: Option<DBusProxy<'static>>,
    service: Option<OwnedBusName>,
    player: Option<PlayerProxy<'static>>,
    property_handler: Option<UnboundedSender<BusEvent>>,
    subscription: Option<JoinHandle<()>>,
    service_changed: Option<UnboundedSender<BusEvent>>,
}

impl BusCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connection: None,
            dbus_root: None,
            service: None,
            player: None,
            property_handler: None,
            subscription: None,
            service_changed: None,
        }
    }

    /// Currently selected service, if any.
    #[must_use]
    pub fn selected_service(&self) -> Option<&OwnedBusName> {
        self.service.as_ref()
    }

    /// Player proxy for the selected service, if any.
    #[must_use]
    pub fn player(&self) -> Option<&PlayerProxy<'static>> {
        self.player.as_ref()
    }

    /// Open the session connection and select the first advertised player.
    /// No-op when a connection and a selected service already exist.
    pub async fn start(&mut self) -> Result<()> {
        if self.connection.is_some() && self.service.is_some() {
            return Ok(());
        }

        if self.connection.is_none() {
            let connection = Connection::session()
                .await
                .context("Failed to connect to the session bus")?;
            connection
                .request_name(format!("io.github.waynow.pid_{}", std::process::id()).as_str())
                .await
                .context("Failed to claim our bus name")?;
            self.connection = Some(connection);
        }

        if self.dbus_root.is_none() {
            let connection = self
                .connection
                .as_ref()
                .context("Session connection went away during start")?;
            self.dbus_root = Some(
                DBusProxy::new(connection)
                    .await
                    .context("Failed to create the D-Bus root proxy")?,
            );
        }

        let first = self.list_services().await?.into_iter().next();
        self.select_service(first).await
    }

    /// Tear down the selection and the connection. No-op when not started.
    pub async fn stop(&mut self) -> Result<()> {
        if self.connection.is_none() {
            return Ok(());
        }
        self.select_service(None).await?;
        self.dbus_root = None;
        // zbus closes the connection once the last handle is dropped.
        self.connection = None;
        Ok(())
    }

    /// MPRIS services currently advertised on the bus, in whatever order
    /// the bus returns them. Lazily starts when not yet connected.
    pub async fn services(&mut self) -> Result<Vec<OwnedBusName>> {
        if self.dbus_root.is_none() {
            self.start().await?;
        }
        self.list_services().await
    }

    async fn list_services(&mut self) -> Result<Vec<OwnedBusName>> {
        let Some(root) = &self.dbus_root else {
            bail!("D-Bus connection is not started yet");
        };

        let names = root
            .list_names()
            .await
            .context("Failed to list names on the bus")?;

        Ok(names
            .into_iter()
            .filter(|name| name.starts_with(MPRIS_PREFIX))
            .collect())
    }

    /// Human-readable identity of an arbitrary (not necessarily selected)
    /// service, resolved through a per-call proxy.
    pub async fn service_name(&mut self, service: &OwnedBusName) -> Result<String> {
        if self.connection.is_none() {
            self.start().await?;
        }
        let Some(connection) = &self.connection else {
            bail!("D-Bus connection is not started yet");
        };

        let root = MediaPlayer2Proxy::builder(connection)
            .destination(service.clone())?
            .path(MPRIS_PATH)?
            .build()
            .await
            .context("Failed to create the media player proxy")?;

        Ok(root.identity().await?)
    }

    /// Select a service, or none. Fires the service-changed notification
    /// unconditionally, even when the value did not change.
    pub async fn set_service(&mut self, service: Option<OwnedBusName>) -> Result<()> {
        if self.connection.is_none() {
            self.start().await?;
        }
        self.select_service(service).await
    }

    /// Non-lazy selection primitive shared by `start` and `set_service`.
    async fn select_service(&mut self, service: Option<OwnedBusName>) -> Result<()> {
        let Some(connection) = self.connection.clone() else {
            bail!("D-Bus connection is not started yet");
        };

        self.unsubscribe();
        self.service = service;

        self.player = match &self.service {
            Some(service) => {
                tracing::info!(%service, "Selecting player");
                Some(
                    PlayerProxy::builder(&connection)
                        .destination(service.clone())?
                        .path(MPRIS_PATH)?
                        .build()
                        .await
                        .context("Failed to create the player proxy")?,
                )
            }
            None => None,
        };

        self.resubscribe();

        if let Some(events) = &self.service_changed {
            if events.send(BusEvent::ServiceChanged).is_err() {
                tracing::debug!("Service change notification has no receiver");
            }
        }
        Ok(())
    }

    /// Install (or uninstall, with `None`) the property-change handler.
    /// Exactly one handler is live at a time; installing first removes the
    /// previous registration so no change is delivered twice.
    pub fn on_properties_changed(&mut self, handler: Option<UnboundedSender<BusEvent>>) {
        self.unsubscribe();
        self.property_handler = handler;
        self.resubscribe();
    }

    /// Install (or uninstall) the service-changed notification channel.
    /// Single-slot, like the property-change handler.
    pub fn on_service_changed(&mut self, handler: Option<UnboundedSender<BusEvent>>) {
        self.service_changed = handler;
    }

    /// Dispatch a transport command to the selected player, starting the
    /// bus first when nothing is selected yet.
    pub async fn send_mpris_command(&mut self, command: MprisCommand) -> Result<()> {
        if self.player.is_none() {
            self.start().await?;
        }
        let Some(player) = &self.player else {
            bail!("No MPRIS service is selected");
        };

        tracing::debug!(command = command.name(), "Sending MPRIS command");
        match command {
            MprisCommand::Next => player.next().await,
            MprisCommand::Previous => player.previous().await,
            MprisCommand::Pause => player.pause().await,
            MprisCommand::PlayPause => player.play_pause().await,
            MprisCommand::Stop => player.stop().await,
            MprisCommand::Play => player.play().await,
        }
        .with_context(|| format!("{} command failed", command.name()))
    }

    fn unsubscribe(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.abort();
        }
    }

    /// Re-register the installed handler against the current player by
    /// spawning a task that forwards its property-change streams.
    fn resubscribe(&mut self) {
        let (Some(events), Some(player)) = (&self.property_handler, &self.player) else {
            return;
        };
        let events = events.clone();
        let player = player.clone();

        self.subscription = Some(tokio::spawn(async move {
            let mut metadata_changed = player.receive_metadata_changed().await.fuse();
            let mut status_changed = player.receive_playback_status_changed().await.fuse();

            loop {
                select! {
                    Some(_) = metadata_changed.next() => {
                        if events.send(BusEvent::PropertiesChanged).is_err() {
                            break;
                        }
                    }
                    Some(_) = status_changed.next() => {
                        if events.send(BusEvent::PropertiesChanged).is_err() {
                            break;
                        }
                    }
                    else => break,
                }
            }
            tracing::debug!("Property subscription ended");
        }));
    }
}
