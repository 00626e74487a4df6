//! Core types and configuration for the fair-price engine.
//!
//! This crate provides shared types used across all other crates:
//! - Price samples, ranges, trends, verifications and strategies
//! - Configuration structures and named thresholds
//! - Common error types
//! - Presentation metadata and commodity slugs

pub mod commodity;
pub mod config;
pub mod display;
pub mod error;
pub mod types;

pub use commodity::{slugify, CommodityId};
pub use config::Config;
pub use display::DisplayMeta;
pub use error::{BoxError, Error, Result};
pub use types::*;
