//! Tax document intake: per-file classification, extraction status tracking, and CSV
//! artifact download, plus the reference extraction service those operations talk to.

pub mod client;
pub mod config;
pub mod error;
pub mod intake;
pub mod service;
pub mod telemetry;
