pub mod memory;
pub mod remote;

pub use memory::{MemoryAuth, MemoryStore};
pub use remote::{RemoteAuth, RemoteError, RemoteStore, WriteAck};
