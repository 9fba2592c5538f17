//! Fog of War mission tool — library entry point.
//!
//! Exposes config, parser, model, mission, sampler, plot, and report
//! for use by the CLI and tests.

pub mod config;
pub mod mission;
pub mod model;
pub mod parser;
pub mod plot;
pub mod report;
pub mod sampler;
pub mod util;
