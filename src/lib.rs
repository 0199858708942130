pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{AccountController, RecordController};
pub use domain::model::{ItemResource, Record, Resource, UserResource};
pub use domain::outcome::{ErrorKind, Flash, FlashLevel, Outcome, Payload, Target};
pub use infra::config::Settings;
pub use storage::{MemoryAuth, MemoryStore, RemoteAuth, RemoteError, RemoteStore, WriteAck};
