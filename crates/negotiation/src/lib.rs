//! Quote verification and negotiation strategy generation.
//!
//! This crate provides:
//! - Deviation, verdict and confidence for a quoted price
//! - Ranking of comparable markets
//! - Rule-based, priority-ordered negotiation strategies
//! - Tactic phrasing templates

pub mod strategy;
pub mod tactics;
pub mod verifier;

pub use strategy::StrategyEngine;
pub use verifier::{rank_comparables, PriceVerifier};
