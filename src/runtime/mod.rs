pub mod fetcher;
pub mod logging;
pub mod orchestrator;
pub mod page;
pub mod types;
