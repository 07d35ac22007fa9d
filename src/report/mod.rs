//! Report generation for one-shot runs.

pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report, StatusReport};
