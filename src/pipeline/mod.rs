// Scoring pipelines: single-review inference and batch table scoring.

pub mod batch;
pub mod infer;
