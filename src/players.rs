//! Player discovery menu for the `switch` command.

use anyhow::Result;

use crate::{
    bus::BusCache,
    output::{PlayerEntry, PlayerMenu},
};

/// Display label for a service whose `Identity` lookup came back useless:
/// the last dot-separated segment of the bus name.
fn fallback_label(service: &str) -> String {
    service.rsplit('.').next().unwrap_or(service).to_string()
}

/// Assemble the selection menu: one entry per advertised MPRIS service,
/// flagging the currently selected one.
pub async fn player_menu(bus: &mut BusCache) -> Result<PlayerMenu> {
    let services = bus.services().await?;
    let mut players = Vec::with_capacity(services.len());

    for service in services {
        let label = match bus.service_name(&service).await {
            Ok(name) if !name.is_empty() => name,
            Ok(_) => fallback_label(service.as_str()),
            Err(e) => {
                tracing::debug!(%service, ?e, "Identity lookup failed, using the bus name");
                fallback_label(service.as_str())
            }
        };
        let selected = bus.selected_service() == Some(&service);

        players.push(PlayerEntry {
            label,
            description: service.to_string(),
            detail: None,
            selected,
        });
    }

    Ok(PlayerMenu { players })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_the_last_segment() {
        assert_eq!(fallback_label("org.mpris.MediaPlayer2.vlc"), "vlc");
        assert_eq!(
            fallback_label("org.mpris.MediaPlayer2.chromium.instance123"),
            "instance123"
        );
    }

    #[test]
    fn fallback_keeps_undotted_names() {
        assert_eq!(fallback_label("vlc"), "vlc");
    }
}
