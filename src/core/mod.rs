//! Core types: error taxonomy, configuration, and the observation model.

pub mod config;
pub mod errors;
pub mod observation;
