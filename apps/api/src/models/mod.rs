pub mod job;
pub mod library;
