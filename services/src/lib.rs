//! Small shared helpers: record ids, upload storage, tracing setup.

pub mod storage;
pub mod telemetry;
pub mod uuid;
