// src/core/mod.rs

pub mod compare;
pub mod engine;
pub mod features;
pub mod similarity;
pub mod types;
pub mod vectorizer;
