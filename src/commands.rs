//! Host-facing command identifiers, delivered as lines on stdin.

use std::str::FromStr;

use anyhow::{anyhow, Error};
use zbus::names::OwnedBusName;

use crate::{bus::MprisCommand, dbus::MPRIS_PREFIX};

/// A command line received from the host.
///
/// Transport commands map onto [`MprisCommand`]; a bare MPRIS bus name is
/// the answer to a previously emitted `switch` menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Transport(MprisCommand),
    Reconnect,
    Switch,
    Select(OwnedBusName),
}

impl FromStr for HostCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Self::Transport(MprisCommand::Next)),
            "pause" => Ok(Self::Transport(MprisCommand::Pause)),
            "play_pause" => Ok(Self::Transport(MprisCommand::PlayPause)),
            "play" => Ok(Self::Transport(MprisCommand::Play)),
            "previous" => Ok(Self::Transport(MprisCommand::Previous)),
            "stop" => Ok(Self::Transport(MprisCommand::Stop)),
            "reconnect" => Ok(Self::Reconnect),
            "switch" => Ok(Self::Switch),
            s if s.starts_with(MPRIS_PREFIX) => Ok(Self::Select(
                OwnedBusName::try_from(s).map_err(|e| anyhow!("Invalid bus name {s:?}: {e}"))?,
            )),
            _ => Err(anyhow!("Unknown command {s:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_commands_parse() {
        for (line, expected) in [
            ("next", MprisCommand::Next),
            ("pause", MprisCommand::Pause),
            ("play_pause", MprisCommand::PlayPause),
            ("play", MprisCommand::Play),
            ("previous", MprisCommand::Previous),
            ("stop", MprisCommand::Stop),
        ] {
            assert_eq!(
                line.parse::<HostCommand>().unwrap(),
                HostCommand::Transport(expected)
            );
        }
    }

    #[test]
    fn lifecycle_commands_parse() {
        assert_eq!("reconnect".parse::<HostCommand>().unwrap(), HostCommand::Reconnect);
        assert_eq!("switch".parse::<HostCommand>().unwrap(), HostCommand::Switch);
    }

    #[test]
    fn mpris_bus_names_parse_as_selections() {
        let command = "org.mpris.MediaPlayer2.vlc".parse::<HostCommand>().unwrap();
        let HostCommand::Select(service) = command else {
            panic!("expected a selection, got {command:?}");
        };
        assert_eq!(service.as_str(), "org.mpris.MediaPlayer2.vlc");
    }

    #[test]
    fn unknown_lines_are_rejected() {
        assert!("volume_up".parse::<HostCommand>().is_err());
        assert!("Next".parse::<HostCommand>().is_err());
        assert!("".parse::<HostCommand>().is_err());
    }
}
