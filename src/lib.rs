// reviewlens: dominant-topic detection for product reviews
//
// This is the library root. Each module corresponds to a stage of the
// review -> topic pipeline or to the presentation around it.

pub mod config;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod text;
