//! Session Instrumentation
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer.
//! It must **NEVER** be read inside decision logic (Extractor, Policy, or Scheduler).
//! It exists solely for observability and verification.
//!
//! # PRIVACY INVARIANT
//! Telemetry events must **NEVER** contain patient content (message text, free-form answers).
//! Only turn indices, output ids, field names, counts and outcome kinds are allowed.

pub mod event;
pub mod metrics;
pub mod recorder;
