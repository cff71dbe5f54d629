//! Domain services: classification, translation, batch migration, analysis

pub mod classifier;
pub mod heuristics;
pub mod pipeline;
pub mod summarizer;
pub mod translator;
