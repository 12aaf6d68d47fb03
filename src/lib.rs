pub mod acquire;
pub mod aggregate;
pub mod cli;
pub mod config;
pub mod contract;
pub mod generate;
pub mod llm;
pub mod model;
pub mod parse;
pub mod prompt;
