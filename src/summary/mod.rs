//! Summary module for briefly
//!
//! The structured result of a pipeline run, how it is parsed out of model
//! output, and how it is rendered for people and tools.

mod models;
mod parser;
pub mod render;

pub use models::{ActionItem, SummaryResult};
pub use parser::OutputParser;
