//! The evaluation record: one user's rubric answers and notes for one home.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  home::HomeSummary,
  rubric::{AnswerValue, RatingsMap, RubricSchema},
  score,
  session::SessionContext,
};

/// Maximum stored length of an item or section note, in characters.
/// Longer input is truncated, not rejected.
pub const NOTE_MAX_CHARS: usize = 1000;

pub(crate) fn clamp_note(text: &str) -> String {
  text.chars().take(NOTE_MAX_CHARS).collect()
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle of an evaluation.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
  #[default]
  NotStarted,
  InProgress,
  Completed,
}

impl EvaluationStatus {
  /// The status an evaluation should carry when a save lands, given its
  /// recomputed completion percentage.
  ///
  /// Promotion out of `NotStarted` happens here and nowhere else, so an
  /// evaluation edited but never saved still reads as not started.
  /// `Completed` is sticky: later edits that lower completion below 100%
  /// don't demote it.
  pub fn at_save_point(self, completion_percentage: u8) -> Self {
    match self {
      Self::NotStarted if completion_percentage > 0 => Self::InProgress,
      other => other,
    }
  }

  pub fn is_completed(self) -> bool { matches!(self, Self::Completed) }
}

impl std::fmt::Display for EvaluationStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Self::NotStarted => "not started",
      Self::InProgress => "in progress",
      Self::Completed => "completed",
    })
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One user's evaluation of one home. At most one record exists per
/// `(home_id, user_id)` pair; the store enforces that with an upsert.
///
/// `overall_rating` and `completion_percentage` are derived from the
/// ratings map and refreshed by [`EvaluationRecord::snapshot_for_save`];
/// they are stored so listings and comparisons can read them without the
/// schema in hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
  pub evaluation_id:         Uuid,
  pub home_id:               Uuid,
  pub user_id:               Uuid,
  pub workspace_id:          Uuid,
  pub ratings:               RatingsMap,
  /// Notes keyed `"category_id/item_id"`.
  pub item_notes:            BTreeMap<String, String>,
  /// Notes keyed by category id.
  pub section_notes:         BTreeMap<String, String>,
  pub overall_rating:        f64,
  /// The buyer's own 1–5 star gut rating, separate from the computed one.
  pub user_overall_rating:   Option<u8>,
  pub completion_percentage: u8,
  pub status:                EvaluationStatus,
  pub started_at:            Option<DateTime<Utc>>,
  pub completed_at:          Option<DateTime<Utc>>,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
}

impl EvaluationRecord {
  /// A fresh, empty evaluation. Nothing is persisted until the first save.
  pub fn new(home_id: Uuid, ctx: &SessionContext) -> Self {
    let now = Utc::now();
    Self {
      evaluation_id: Uuid::new_v4(),
      home_id,
      user_id: ctx.user_id,
      workspace_id: ctx.workspace_id,
      ratings: RatingsMap::new(),
      item_notes: BTreeMap::new(),
      section_notes: BTreeMap::new(),
      overall_rating: 0.0,
      user_overall_rating: None,
      completion_percentage: 0,
      status: EvaluationStatus::NotStarted,
      started_at: None,
      completed_at: None,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn answer(&self, category_id: &str, item_id: &str) -> Option<&AnswerValue> {
    self.ratings.get(category_id)?.get(item_id)
  }

  /// Produce the copy of this record that should be written: derived
  /// fields recomputed, status advanced per [`EvaluationStatus::at_save_point`],
  /// timestamps stamped. The in-memory record is left untouched so the
  /// caller keeps editing while the save is in flight.
  pub fn snapshot_for_save(
    &self,
    schema: &RubricSchema,
    now: DateTime<Utc>,
  ) -> Self {
    let mut snap = self.clone();
    snap.overall_rating = score::overall_rating(&snap.ratings);
    snap.completion_percentage =
      score::completion_percentage(schema, &snap.ratings);
    snap.status = snap.status.at_save_point(snap.completion_percentage);
    if snap.status != EvaluationStatus::NotStarted && snap.started_at.is_none() {
      snap.started_at = Some(now);
    }
    snap.updated_at = now;
    snap
  }

  /// Fold a persisted snapshot back into the live record. Only identity,
  /// derived fields, status, and timestamps come back; ratings and notes
  /// stay as the user has them, which may already be ahead of the save.
  pub fn absorb_saved(&mut self, saved: &Self) {
    self.evaluation_id = saved.evaluation_id;
    self.overall_rating = saved.overall_rating;
    self.completion_percentage = saved.completion_percentage;
    self.status = saved.status;
    self.started_at = saved.started_at;
    self.completed_at = saved.completed_at;
    self.created_at = saved.created_at;
    self.updated_at = saved.updated_at;
  }

  /// The mirror fields written back onto the home after a save.
  pub fn summary(&self) -> HomeSummary {
    HomeSummary {
      evaluation_status: self.status,
      overall_rating:    self.overall_rating,
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::rubric::QualitativeRating;

  fn ctx() -> SessionContext { SessionContext::solo(Uuid::new_v4()) }

  #[test]
  fn status_advances_only_with_progress() {
    assert_eq!(
      EvaluationStatus::NotStarted.at_save_point(0),
      EvaluationStatus::NotStarted
    );
    assert_eq!(
      EvaluationStatus::NotStarted.at_save_point(2),
      EvaluationStatus::InProgress
    );
    assert_eq!(
      EvaluationStatus::InProgress.at_save_point(0),
      EvaluationStatus::InProgress
    );
  }

  #[test]
  fn completed_is_sticky() {
    assert_eq!(
      EvaluationStatus::Completed.at_save_point(40),
      EvaluationStatus::Completed
    );
    assert_eq!(
      EvaluationStatus::Completed.at_save_point(0),
      EvaluationStatus::Completed
    );
  }

  #[test]
  fn note_clamp_counts_chars() {
    let long = "é".repeat(NOTE_MAX_CHARS + 50);
    let clamped = clamp_note(&long);
    assert_eq!(clamped.chars().count(), NOTE_MAX_CHARS);

    assert_eq!(clamp_note("short"), "short");
  }

  #[test]
  fn snapshot_recomputes_and_stamps() {
    let schema = RubricSchema::standard();
    let ctx = ctx();
    let mut record = EvaluationRecord::new(Uuid::new_v4(), &ctx);
    record
      .ratings
      .entry("exteriors".to_owned())
      .or_default()
      .insert(
        "curb_appeal".to_owned(),
        AnswerValue::Rating(QualitativeRating::Good),
      );

    let now = Utc::now();
    let snap = record.snapshot_for_save(&schema, now);
    assert_eq!(snap.overall_rating, 5.0);
    assert_eq!(snap.completion_percentage, 2); // 1 of 66
    assert_eq!(snap.status, EvaluationStatus::InProgress);
    assert_eq!(snap.started_at, Some(now));
    assert_eq!(snap.updated_at, now);

    // The live record did not move.
    assert_eq!(record.status, EvaluationStatus::NotStarted);
    assert_eq!(record.overall_rating, 0.0);
    assert!(record.started_at.is_none());
  }

  #[test]
  fn empty_snapshot_stays_not_started() {
    let schema = RubricSchema::standard();
    let ctx = ctx();
    let record = EvaluationRecord::new(Uuid::new_v4(), &ctx);
    let snap = record.snapshot_for_save(&schema, Utc::now());
    assert_eq!(snap.status, EvaluationStatus::NotStarted);
    assert!(snap.started_at.is_none());
  }

  #[test]
  fn absorb_keeps_in_flight_edits() {
    let schema = RubricSchema::standard();
    let ctx = ctx();
    let mut record = EvaluationRecord::new(Uuid::new_v4(), &ctx);
    record
      .ratings
      .entry("exteriors".to_owned())
      .or_default()
      .insert(
        "curb_appeal".to_owned(),
        AnswerValue::Rating(QualitativeRating::Good),
      );
    let saved = record.snapshot_for_save(&schema, Utc::now());

    // A second edit lands while the save is in flight.
    record
      .ratings
      .entry("exteriors".to_owned())
      .or_default()
      .insert(
        "backyard".to_owned(),
        AnswerValue::Rating(QualitativeRating::Poor),
      );
    record
      .item_notes
      .insert("exteriors/backyard".to_owned(), "overgrown".to_owned());

    record.absorb_saved(&saved);
    assert_eq!(record.status, EvaluationStatus::InProgress);
    assert_eq!(record.completion_percentage, 2);
    // The newer answer and note survived.
    assert!(record.answer("exteriors", "backyard").is_some());
    assert_eq!(
      record.item_notes.get("exteriors/backyard").map(String::as_str),
      Some("overgrown")
    );
  }
}
