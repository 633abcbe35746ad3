//! # Event Bus Module
//!
//! Typed publish/subscribe between the host application and the playback
//! engine. The set of topics is fixed by [`Topic`]; every event carries a
//! typed payload. The bus is owned by the host and injected where needed,
//! there is no global instance.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gcodeprint_core::event_bus::{AppEvent, EventBus, EventFilter, Topic};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(EventFilter::Topics(vec![Topic::Rotation]), |event| {
//!     if let AppEvent::Rotation { degrees } = event {
//!         println!("rotate to {degrees}");
//!     }
//! });
//!
//! bus.publish(AppEvent::Rotation { degrees: 45.0 }).ok();
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
