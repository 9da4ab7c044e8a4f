pub mod common;
pub mod completions;
pub mod config;
pub mod create;
pub mod decode;
pub mod scan;
