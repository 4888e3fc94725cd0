pub mod config;
pub mod error;
pub mod kernel;
pub mod outputs;
pub mod services;

// Re-export specific items if needed for convenient access
pub use config::{PhrasingConfig, TriageConfig};
pub use kernel::extract::{FactSet, SignalExtractor};
pub use kernel::policy::{Action, ProgressionPolicy};
pub use kernel::reactor::Reactor;
