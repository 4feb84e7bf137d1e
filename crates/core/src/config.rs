//! Simulator configuration.
//!
//! A small hierarchical configuration consumed by `Simulator::new`. Use
//! `Config::default()` for the standard machine or deserialize one from
//! JSON.

use serde::Deserialize;

use crate::common::constants;

/// Pipeline shape parameters.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Superscalar width N: instructions fetched, retired, and issued per
    /// cycle.
    pub width: usize,
    /// Reservation station capacity; fetch is gated on `len ≤ capacity − N`.
    pub rs_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width: constants::DEFAULT_WIDTH,
            rs_capacity: constants::RS_CAPACITY,
        }
    }
}

/// Root configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pipeline shape.
    pub pipeline: PipelineConfig,
    /// Stack size in words reserved above the loaded image for `$sp`.
    pub stack_words: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            stack_words: constants::STACK_WORDS,
        }
    }
}

impl Config {
    /// Default configuration with a specific superscalar width.
    pub fn with_width(width: usize) -> Self {
        Self {
            pipeline: PipelineConfig {
                width,
                ..PipelineConfig::default()
            },
            ..Self::default()
        }
    }
}
