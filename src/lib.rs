pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod sources;
pub mod storage;
pub mod telegram;
pub mod translate;
pub mod utils;
