//! Data Transfer Objects

mod extract_options;

pub use extract_options::ExtractOptions;
