//! Application-level configuration.
//!
//! - [`PipelineParams`]: TTLs, timeouts and classifier switches for the
//!   request pipeline

pub mod pipeline_params;

pub use pipeline_params::PipelineParams;
