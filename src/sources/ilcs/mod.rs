pub mod assembler;
pub mod crawler;
pub mod listing;
pub mod parser;
pub mod topics;
