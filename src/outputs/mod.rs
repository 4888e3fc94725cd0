pub mod realizer;
pub mod report;
