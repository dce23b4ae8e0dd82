//! Owns the subscription lifecycle linking bus notifications to the sink
//! cache.

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    bus::{BusCache, BusEvent},
    sink::{Sink, SinkCache},
};

/// stopped -> started -> stopped; both transitions are idempotent.
#[derive(Debug, Default)]
pub struct ListenerService {
    listening: bool,
}

impl ListenerService {
    #[must_use]
    pub const fn new() -> Self {
        Self { listening: false }
    }

    /// Register the event channel as both the service-changed subscriber
    /// and the property-change handler, then make sure the bus is up.
    pub async fn start(
        &mut self,
        bus: &mut BusCache,
        events: UnboundedSender<BusEvent>,
    ) -> Result<()> {
        if self.listening {
            return Ok(());
        }
        self.listening = true;

        bus.on_service_changed(Some(events.clone()));
        bus.on_properties_changed(Some(events));
        bus.start().await
    }

    /// Remove both registrations and drop the cached snapshot.
    pub fn stop<S: Sink>(&mut self, bus: &mut BusCache, cache: &mut SinkCache<S>) {
        if !self.listening {
            return;
        }
        self.listening = false;

        bus.on_service_changed(None);
        bus.on_properties_changed(None);
        cache.clear();
    }
}
