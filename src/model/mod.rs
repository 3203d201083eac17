// Pre-trained topic model artifacts: vocabulary, LDA parameters, loading.
//
// Everything in here is immutable once loaded. The model is trained elsewhere;
// this crate only consumes the exported parameters.

pub mod artifacts;
pub mod error;
pub mod lda;
pub mod traits;
pub mod vocabulary;
