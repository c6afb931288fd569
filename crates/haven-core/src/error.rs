//! Error types for `haven-core`.

use thiserror::Error;

use crate::rubric::AnswerKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown category: {0:?}")]
  UnknownCategory(String),

  #[error("unknown item {item:?} in category {category:?}")]
  UnknownItem { category: String, item: String },

  #[error("item {category}/{item} expects a {expected} answer, got {got}")]
  AnswerKindMismatch {
    category: String,
    item:     String,
    expected: AnswerKind,
    got:      &'static str,
  },

  #[error("star rating must be between 1 and 5, got {0}")]
  StarOutOfRange(u8),

  #[error("evaluation is {0}% complete; completing requires 100%")]
  EvaluationIncomplete(u8),

  #[error("store error: {0}")]
  Store(String),

  #[error("autosave worker is gone")]
  SaverClosed,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
