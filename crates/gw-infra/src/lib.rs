pub mod host;
pub mod http;
pub mod storage;

pub use host::{BroadcastEvents, SessionLocation, StaticAuthSession};
pub use http::HttpApiClient;
pub use storage::{FileHandoffStore, MemoryHandoffStore};
