// Per-client sessions: the navigation state machine, its in-memory store,
// gateway orchestration and the HTTP handlers that drive it.

pub mod controller;
pub mod handlers;
pub mod machine;
pub mod snapshot;
pub mod store;

pub use store::SessionStore;
