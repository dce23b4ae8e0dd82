//! Normalized now-playing snapshot built from raw MPRIS properties.

use std::collections::HashMap;

use zbus::zvariant::OwnedValue;

use crate::utils::{extract_str, extract_str_array};

/// Art fallback used when a player advertises no usable `mpris:artUrl`: a
/// 1x1 transparent PNG, so consumers can treat the field as always set.
pub const BLANK_ART_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Snapshot of a player's displayable state.
///
/// Built fresh on every relevant property change, never mutated in place.
/// An empty `title` means nothing is playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MprisMetadata {
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    pub art_url: String,
    pub playing: bool,
}

/// Builds a [`MprisMetadata`] from the raw `Metadata` property map and the
/// `PlaybackStatus` string. Missing or oddly-typed fields degrade to empty
/// values; this never fails.
#[must_use]
pub fn build_mpris_metadata(
    metadata: &HashMap<String, OwnedValue>,
    playback_status: &str,
    blank_art: &str,
) -> MprisMetadata {
    let string_field = |key: &str| {
        metadata
            .get(key)
            .and_then(|v| extract_str(v))
            .map(ToString::to_string)
            .unwrap_or_default()
    };

    MprisMetadata {
        title: string_field("xesam:title"),
        artists: metadata
            .get("xesam:artist")
            .map(|v| extract_str_array(v))
            .unwrap_or_default()
            .into_iter()
            .filter(|artist| !artist.is_empty())
            .collect(),
        album: string_field("xesam:album"),
        art_url: metadata
            .get("mpris:artUrl")
            .and_then(|v| extract_str(v))
            .filter(|url| !url.is_empty())
            .map(ToString::to_string)
            .unwrap_or_else(|| blank_art.to_string()),
        playing: playback_status == "Playing",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zbus::zvariant::Value;

    fn owned(v: Value<'_>) -> OwnedValue {
        OwnedValue::try_from(v).unwrap()
    }

    fn map(entries: Vec<(&str, Value<'_>)>) -> HashMap<String, OwnedValue> {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), owned(v)))
            .collect()
    }

    #[test]
    fn empty_map_degrades_to_defaults() {
        let built = build_mpris_metadata(&HashMap::new(), "Stopped", BLANK_ART_URL);

        assert_eq!(
            built,
            MprisMetadata {
                title: String::new(),
                artists: Vec::new(),
                album: String::new(),
                art_url: BLANK_ART_URL.to_string(),
                playing: false,
            }
        );
    }

    #[test]
    fn playing_requires_the_exact_literal() {
        for status in ["Paused", "Stopped", "playing", "PLAYING", ""] {
            assert!(!build_mpris_metadata(&HashMap::new(), status, BLANK_ART_URL).playing);
        }
        assert!(build_mpris_metadata(&HashMap::new(), "Playing", BLANK_ART_URL).playing);
    }

    #[test]
    fn artists_are_not_truncated() {
        let metadata = map(vec![("xesam:artist", Value::new(vec!["A", "B", "C"]))]);

        assert_eq!(
            build_mpris_metadata(&metadata, "Playing", BLANK_ART_URL).artists,
            ["A", "B", "C"]
        );
    }

    #[test]
    fn empty_and_non_string_fields_are_dropped() {
        let metadata = map(vec![
            ("xesam:title", Value::new(42_i64)),
            ("xesam:artist", Value::new(vec!["A", "", "B"])),
            ("xesam:album", Value::new(vec!["not", "a", "string"])),
        ]);

        let built = build_mpris_metadata(&metadata, "Playing", BLANK_ART_URL);
        assert_eq!(built.title, "");
        assert_eq!(built.artists, ["A", "B"]);
        assert_eq!(built.album, "");
    }

    #[test]
    fn blank_art_replaces_missing_and_empty_urls() {
        let built = build_mpris_metadata(&HashMap::new(), "Playing", BLANK_ART_URL);
        assert_eq!(built.art_url, BLANK_ART_URL);

        let metadata = map(vec![("mpris:artUrl", Value::new(""))]);
        let built = build_mpris_metadata(&metadata, "Playing", BLANK_ART_URL);
        assert_eq!(built.art_url, BLANK_ART_URL);

        let metadata = map(vec![("mpris:artUrl", Value::new("file:///cover.png"))]);
        let built = build_mpris_metadata(&metadata, "Playing", BLANK_ART_URL);
        assert_eq!(built.art_url, "file:///cover.png");
    }

    #[test]
    fn paused_track_scenario() {
        let metadata = map(vec![
            ("xesam:title", Value::new("Song A")),
            ("xesam:artist", Value::new(vec!["Artist"])),
            ("mpris:artUrl", Value::new("")),
        ]);

        assert_eq!(
            build_mpris_metadata(&metadata, "Paused", BLANK_ART_URL),
            MprisMetadata {
                title: "Song A".to_string(),
                artists: vec!["Artist".to_string()],
                album: String::new(),
                art_url: BLANK_ART_URL.to_string(),
                playing: false,
            }
        );
    }

    #[test]
    fn variant_nested_strings_are_unwrapped() {
        let metadata = map(vec![(
            "xesam:title",
            Value::Value(Box::new(Value::new("Nested"))),
        )]);

        assert_eq!(
            build_mpris_metadata(&metadata, "Playing", BLANK_ART_URL).title,
            "Nested"
        );
    }
}
