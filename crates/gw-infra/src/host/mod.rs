//! In-process stand-ins for what a browser page provides.

mod auth;
mod events;
mod location;

pub use auth::StaticAuthSession;
pub use events::BroadcastEvents;
pub use location::SessionLocation;
