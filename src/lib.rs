pub mod error;
pub mod runtime;
pub mod sources;
pub mod types;
