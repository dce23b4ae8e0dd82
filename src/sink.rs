//! Decouples "a sink wants metadata" from "metadata changed right now".

use anyhow::Result;

use crate::{
    bus::BusCache,
    metadata::{build_mpris_metadata, MprisMetadata, BLANK_ART_URL},
};

/// Required operations of a metadata consumer.
///
/// The session drives the display lifecycle (`start`/`stop`/`clear`); the
/// cache itself only ever calls `update`.
pub trait Sink {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
    fn update(&mut self, metadata: &MprisMetadata) -> Result<()>;
}

/// Caches the last snapshot so a sink started after the last change still
/// receives it immediately, without a bus round-trip.
pub struct SinkCache<S> {
    sink: Option<S>,
    cached: Option<MprisMetadata>,
}

impl<S: Sink> SinkCache<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sink: None,
            cached: None,
        }
    }

    /// Attach a new sink, or detach with `None`. Returns the previous one.
    pub fn set_sink(&mut self, sink: Option<S>) -> Option<S> {
        std::mem::replace(&mut self.sink, sink)
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    /// Change-notification callback: re-read the selected player's state
    /// and push a fresh snapshot. A missing selection is the normal
    /// transient state during reconnects, not an error.
    pub async fn refresh(&mut self, bus: &BusCache) -> Result<()> {
        let Some(player) = bus.player() else {
            tracing::debug!("Property change with no player selected, ignoring");
            return Ok(());
        };

        let metadata = player.metadata().await?;
        let playback_status = player.playback_status().await?;

        self.accept(build_mpris_metadata(
            &metadata,
            &playback_status,
            BLANK_ART_URL,
        ))
    }

    /// Store a snapshot and forward it to the attached sink.
    pub fn accept(&mut self, metadata: MprisMetadata) -> Result<()> {
        let metadata = self.cached.insert(metadata);
        if let Some(sink) = &mut self.sink {
            sink.update(metadata)?;
        }
        Ok(())
    }

    /// Start the attached sink, replaying the cached snapshot if any.
    pub fn start_sink(&mut self) -> Result<()> {
        if let Some(sink) = &mut self.sink {
            sink.start()?;
            if let Some(metadata) = &self.cached {
                sink.update(metadata)?;
            }
        }
        Ok(())
    }

    /// Drop the cached snapshot without notifying the sink.
    pub fn clear(&mut self) {
        self.cached = None;
    }
}
