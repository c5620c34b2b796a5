pub mod builder;
pub mod config;
pub mod display;
pub mod errors;
pub mod matrix;
pub mod report;
pub mod sampler;
pub mod timer;
pub mod types;
