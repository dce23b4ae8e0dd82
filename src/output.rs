use serde::Serialize;
use std::io::{self, Write};

/// A status record serialized to JSON and parsed by Waybar.
#[derive(Serialize, Debug, Default, PartialEq, Eq)]
pub struct StatusOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    class: Option<String>,
}

impl StatusOutput {
    /// Create a new record with the given contents. Waybar treats every
    /// field as pango markup, so all of them are HTML-escaped here.
    pub fn new(
        text: Option<&str>,
        alt: Option<&str>,
        tooltip: Option<&str>,
        class: Option<&str>,
    ) -> Self {
        Self {
            text: text.map(html_escape::encode_text).map(String::from),
            alt: alt.map(html_escape::encode_text).map(String::from),
            tooltip: tooltip.map(html_escape::encode_text).map(String::from),
            class: class.map(html_escape::encode_text).map(String::from),
        }
    }

    /// Format the record as JSON and write it to the given writer.
    ///
    /// # Errors
    ///
    /// This function will return an error if writing to the given writer fails.
    pub fn format<T: Write>(&self, mut f: &mut T) -> io::Result<()> {
        serde_json::to_writer(&mut f, self)?;
        f.write_all(b"\n")?;
        Ok(())
    }

    /// Print the record to stdout.
    ///
    /// # Errors
    ///
    /// This function will return an error if writing to stdout fails.
    pub fn print(&self) -> io::Result<()> {
        self.format(&mut io::stdout().lock())
    }
}

/// One selectable player in the `switch` menu.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct PlayerEntry {
    /// Display name, usually the player's `Identity`.
    pub label: String,
    /// The bus name; the host echoes this back to select the player.
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Whether this is the currently selected player.
    pub selected: bool,
}

/// The record emitted in response to the `switch` command. The host shows
/// it as a picker and writes the chosen `description` back on stdin; no
/// reply means nothing was chosen.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct PlayerMenu {
    pub players: Vec<PlayerEntry>,
}

impl PlayerMenu {
    /// Format the menu as JSON and write it to the given writer.
    ///
    /// # Errors
    ///
    /// This function will return an error if writing to the given writer fails.
    pub fn format<T: Write>(&self, mut f: &mut T) -> io::Result<()> {
        serde_json::to_writer(&mut f, self)?;
        f.write_all(b"\n")?;
        Ok(())
    }

    /// Print the menu to stdout.
    ///
    /// # Errors
    ///
    /// This function will return an error if writing to stdout fails.
    pub fn print(&self) -> io::Result<()> {
        self.format(&mut io::stdout().lock())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let record = StatusOutput {
            text: Some("text".to_owned()),
            alt: Some("alt".to_owned()),
            tooltip: Some("tooltip".to_owned()),
            class: Some("class".to_owned()),
        };
        let mut buf = Vec::new();
        record.format(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "{\"text\":\"text\",\"alt\":\"alt\",\"tooltip\":\"tooltip\",\"class\":\"class\"}\n"
        );
    }

    #[test]
    fn test_missing_fields() {
        let record = StatusOutput {
            text: None,
            alt: None,
            tooltip: None,
            class: None,
        };
        let mut buf = Vec::new();
        record.format(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{}\n");
    }

    #[test]
    fn test_markup_is_escaped() {
        let record = StatusOutput::new(Some("Tom & Jerry <live>"), None, None, None);
        let mut buf = Vec::new();
        record.format(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "{\"text\":\"Tom &amp; Jerry &lt;live&gt;\"}\n"
        );
    }

    #[test]
    fn test_menu_format() {
        let menu = PlayerMenu {
            players: vec![PlayerEntry {
                label: "VLC media player".to_owned(),
                description: "org.mpris.MediaPlayer2.vlc".to_owned(),
                detail: None,
                selected: true,
            }],
        };
        let mut buf = Vec::new();
        menu.format(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "{\"players\":[{\"label\":\"VLC media player\",\"description\":\"org.mpris.MediaPlayer2.vlc\",\"selected\":true}]}\n"
        );
    }
}
