//! Navigation activity logging: JSONL append-only writer plus event sinks.

pub mod activity;
pub mod jsonl;

pub use activity::{ActivityEvent, ActivitySink, MemorySink, NullSink};
