//! Rotation bridge between the event bus and a shared printer

use super::driver::SharedPrinter;
use crate::render::RenderSurface;
use gcodeprint_core::{AppEvent, EventBus, EventFilter, SubscriptionId, Topic};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Applies every rotation published on the bus to the printer's active layer.
///
/// The subscription only holds a weak reference to the printer and is
/// removed when the bridge is dropped.
#[derive(Debug)]
pub struct RotationBridge {
    bus: Arc<EventBus>,
    subscription: SubscriptionId,
}

impl RotationBridge {
    pub fn connect<S>(bus: &Arc<EventBus>, printer: &SharedPrinter<S>) -> Self
    where
        S: RenderSurface + Send + 'static,
    {
        let target: Weak<_> = Arc::downgrade(printer);
        let subscription = bus.subscribe(EventFilter::Topics(vec![Topic::Rotation]), move |event| {
            let AppEvent::Rotation { degrees } = event else {
                return;
            };
            match target.upgrade() {
                Some(printer) => {
                    if !printer.lock().apply_rotation(degrees) {
                        trace!("Rotation {} ignored, no active layer", degrees);
                    }
                }
                None => trace!("Rotation {} after printer dropped", degrees),
            }
        });
        debug!("Rotation bridge connected ({})", subscription);
        Self {
            bus: Arc::clone(bus),
            subscription,
        }
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }
}

impl Drop for RotationBridge {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}
