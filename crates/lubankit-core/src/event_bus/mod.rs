//! # Event Bus Module
//!
//! Publish/subscribe plumbing between the editor core and its collaborators:
//! - the editor publishes task requests, history and progress changes, and
//!   render requests
//! - the worker layer answers with task results
//! - the UI subscribes to whatever it needs to redraw
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lubankit_core::event_bus::{EventBus, EventFilter, EventCategory, AppEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::History]),
//!     |event| tracing::info!("{}", event.description()),
//! );
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
