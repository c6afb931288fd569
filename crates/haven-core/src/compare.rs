//! Side-by-side comparison of evaluated homes.
//!
//! A comparison is a read-only projection: one column per requested home,
//! in the caller's order, each carrying the home and its evaluation if one
//! was ever saved. Cell rendering is total over every answer-kind/value
//! combination so a stale or mismatched stored answer degrades to a
//! placeholder instead of failing the whole view.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  evaluation::EvaluationRecord,
  home::Home,
  rubric::{AnswerKind, AnswerValue, QualitativeRating, RubricItem},
  session::SessionContext,
  store::HomeStore,
};

/// One home's column in the comparison grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonColumn {
  pub home:       Home,
  pub evaluation: Option<EvaluationRecord>,
}

impl ComparisonColumn {
  /// The display value for one rubric item in this column.
  pub fn cell(&self, category_id: &str, item: &RubricItem) -> CellDisplay {
    let answer = self
      .evaluation
      .as_ref()
      .and_then(|e| e.answer(category_id, &item.id));
    cell_display(item.kind, answer)
  }

  pub fn item_note(&self, category_id: &str, item_id: &str) -> Option<&str> {
    self
      .evaluation
      .as_ref()?
      .item_notes
      .get(&format!("{category_id}/{item_id}"))
      .map(String::as_str)
  }
}

/// The assembled comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
  pub columns: Vec<ComparisonColumn>,
}

impl Comparison {
  /// Load the requested homes and their evaluations. Column order follows
  /// `home_ids`; ids that resolve to no home are skipped, and a home
  /// without a saved evaluation still gets a column (every cell renders
  /// as a placeholder).
  pub async fn build<S: HomeStore>(
    store: &S,
    ctx: SessionContext,
    home_ids: &[Uuid],
  ) -> Result<Self> {
    let mut columns = Vec::with_capacity(home_ids.len());
    for &home_id in home_ids {
      let Some(home) = store
        .get_home(home_id)
        .await
        .map_err(|e| Error::Store(e.to_string()))?
      else {
        continue;
      };
      let evaluation = store
        .load_evaluation(home_id, ctx)
        .await
        .map_err(|e| Error::Store(e.to_string()))?;
      columns.push(ComparisonColumn { home, evaluation });
    }
    Ok(Self { columns })
  }
}

// ─── Cell rendering ──────────────────────────────────────────────────────────

/// What a comparison cell shows.
#[derive(Debug, Clone, PartialEq)]
pub enum CellDisplay {
  Rating(QualitativeRating),
  Stars(u8),
  /// A ticked checkbox, optionally with the free-text detail.
  Checked(Option<String>),
  Unchecked,
  Choice(String),
  Money(f64),
  /// Long text is not inlined into the grid.
  Note,
  /// Unanswered, or an answer that no longer fits the item's kind.
  Placeholder,
}

/// Map an item's stored answer to its cell. Total by construction: every
/// kind/value pairing lands somewhere.
pub fn cell_display(kind: AnswerKind, answer: Option<&AnswerValue>) -> CellDisplay {
  let Some(answer) = answer else {
    return CellDisplay::Placeholder;
  };
  if !answer.is_answered() {
    return CellDisplay::Placeholder;
  }
  match (kind, answer) {
    (AnswerKind::Rating, AnswerValue::Rating(r)) => CellDisplay::Rating(*r),
    (AnswerKind::NumericStar, AnswerValue::Number(n))
      if n.fract() == 0.0 && (1.0..=5.0).contains(n) =>
    {
      CellDisplay::Stars(*n as u8)
    }
    (AnswerKind::Boolean, AnswerValue::Flag(true)) => CellDisplay::Checked(None),
    (AnswerKind::Boolean, AnswerValue::Flag(false)) => CellDisplay::Unchecked,
    (AnswerKind::BooleanWithText, AnswerValue::Flag(true)) => {
      CellDisplay::Checked(None)
    }
    (AnswerKind::BooleanWithText, AnswerValue::Flag(false)) => {
      CellDisplay::Unchecked
    }
    (AnswerKind::BooleanWithText, AnswerValue::Text(s)) => {
      CellDisplay::Checked(Some(s.clone()))
    }
    // A zero dollar amount reads as "not applicable", same as unanswered.
    (AnswerKind::Currency, AnswerValue::Number(n)) if *n > 0.0 => {
      CellDisplay::Money(*n)
    }
    (AnswerKind::Dropdown, AnswerValue::Text(s)) => CellDisplay::Choice(s.clone()),
    (AnswerKind::FreeText, AnswerValue::Text(_)) => CellDisplay::Note,
    _ => CellDisplay::Placeholder,
  }
}

/// `"$1,234,567"` with no cents; comparison columns only need magnitude.
pub fn format_money(amount: f64) -> String {
  let whole = amount.round().abs() as u64;
  let digits = whole.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
  if amount < 0.0 {
    out.push('-');
  }
  out.push('$');
  let first_group = digits.len() % 3;
  for (i, ch) in digits.chars().enumerate() {
    if i != 0 && (i + 3 - first_group) % 3 == 0 {
      out.push(',');
    }
    out.push(ch);
  }
  out
}

impl fmt::Display for CellDisplay {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Rating(QualitativeRating::Good) => f.write_str("✓ good"),
      Self::Rating(QualitativeRating::Fair) => f.write_str("~ fair"),
      Self::Rating(QualitativeRating::Poor) => f.write_str("✗ poor"),
      Self::Stars(n) => write!(f, "{n}★"),
      Self::Checked(Some(text)) => write!(f, "✓ {text}"),
      Self::Checked(None) => f.write_str("✓"),
      Self::Unchecked => f.write_str("✗"),
      Self::Choice(s) => f.write_str(s),
      Self::Money(amount) => f.write_str(&format_money(*amount)),
      Self::Note => f.write_str("view note"),
      Self::Placeholder => f.write_str("—"),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
