// Asynchronous tailoring jobs: in-memory store, background runner, handlers.

pub mod handlers;
pub mod runner;
pub mod store;
