pub mod event;
pub mod extract;
pub mod normalize;
pub mod policy;
pub mod reactor;
pub mod scheduler;
pub mod state;
pub mod telemetry;
pub mod vocabulary;
