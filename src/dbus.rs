//! Typed proxies for the MPRIS D-Bus interfaces.

use std::collections::HashMap;

use zbus::{proxy, zvariant::OwnedValue};

/// Prefix shared by every MPRIS-compliant bus name.
pub const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// Object path every MPRIS player exposes its interfaces on.
pub const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";

#[proxy(
    interface = "org.mpris.MediaPlayer2",
    default_path = "/org/mpris/MediaPlayer2"
)]
pub trait MediaPlayer2 {
    /// Human-readable name of the player.
    #[zbus(property)]
    fn identity(&self) -> zbus::Result<String>;
}

#[proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_path = "/org/mpris/MediaPlayer2"
)]
pub trait Player {
    fn next(&self) -> zbus::Result<()>;

    fn previous(&self) -> zbus::Result<()>;

    fn pause(&self) -> zbus::Result<()>;

    fn play_pause(&self) -> zbus::Result<()>;

    fn stop(&self) -> zbus::Result<()>;

    fn play(&self) -> zbus::Result<()>;

    /// One of `Playing`, `Paused` or `Stopped`.
    #[zbus(property)]
    fn playback_status(&self) -> zbus::Result<String>;

    /// The `xesam:`/`mpris:` keyed property map of the current track.
    #[zbus(property)]
    fn metadata(&self) -> zbus::Result<HashMap<String, OwnedValue>>;
}
