pub mod branch;
pub mod completions;
