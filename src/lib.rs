pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod ocr;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod session;
