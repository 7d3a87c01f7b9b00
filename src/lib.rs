// src/lib.rs

pub mod config;
pub mod core;
pub mod curation;
pub mod error;
pub mod persistence;
pub mod repl;
pub mod report;
pub mod stats;
pub mod validation;

pub use crate::config::Config;
pub use crate::core::engine::{EngineState, RecommenderEngine, Session};
pub use crate::core::types::{Comparison, MedicineRecord, RankedMedicine, Recommendation};
pub use crate::error::{RecommendError, Result};
