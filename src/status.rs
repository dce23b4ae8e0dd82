//! The bar-facing status indicator.

use anyhow::Result;

use crate::{metadata::MprisMetadata, output::StatusOutput, sink::Sink};

const PLAYING_GLYPH: &str = "\u{25b6}"; // ▶
const PAUSED_GLYPH: &str = "\u{23f8}"; // ⏸
const IDLE_GLYPH: &str = "\u{266a}"; // ♪

/// Renders metadata snapshots as Waybar records on stdout. Inactive until
/// started; shows the idle record when nothing is playing.
#[derive(Debug, Default)]
pub struct StatusModule {
    active: bool,
}

impl StatusModule {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: false }
    }
}

fn artist_line(artists: &[String]) -> Option<String> {
    match artists {
        [] => None,
        // Long credit lists collapse to the first name; the full list
        // stays available to hosts through the metadata snapshot itself.
        [first, _, _, ..] => Some(format!("by {first}, \u{2026}")),
        _ => Some(format!("by {}", artists.join(", "))),
    }
}

fn tooltip(metadata: &MprisMetadata) -> String {
    let mut lines = vec![metadata.title.clone()];
    if let Some(artists) = artist_line(&metadata.artists) {
        lines.push(artists);
    }
    if !metadata.album.is_empty() {
        lines.push(format!("from {}", metadata.album));
    }
    lines.join("\n")
}

fn idle_record() -> StatusOutput {
    StatusOutput::new(
        Some(IDLE_GLYPH),
        Some("idle"),
        Some("No media player connected"),
        Some("idle"),
    )
}

fn now_playing_record(metadata: &MprisMetadata) -> StatusOutput {
    let (glyph, state) = if metadata.playing {
        (PLAYING_GLYPH, "playing")
    } else {
        (PAUSED_GLYPH, "paused")
    };

    StatusOutput::new(
        Some(&format!("{glyph} {}", metadata.title)),
        Some(state),
        Some(&tooltip(metadata)),
        Some(state),
    )
}

impl Sink for StatusModule {
    fn start(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        tracing::info!("Starting status output");
        self.active = true;
        idle_record().print()?;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        tracing::info!("Stopped status output");
        self.active = false;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        idle_record().print()?;
        Ok(())
    }

    fn update(&mut self, metadata: &MprisMetadata) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        tracing::debug!(?metadata, "Got metadata");

        if metadata.title.is_empty() {
            return self.clear();
        }
        now_playing_record(metadata).print()?;
        Ok(())
    }
}
