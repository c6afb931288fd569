//! Editing sessions: the mutation surface over evaluation and inspection
//! records, wired to the debounced autosaver.
//!
//! A session owns the live record behind a mutex. Every mutation method
//! validates against the schema, applies the edit, takes a save snapshot,
//! and hands it to the saver. The store is only touched by the save path
//! (and by the few operations that deliberately skip the debounce).

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  autosave::{Autosaver, DEFAULT_DEBOUNCE, SaveSink, SaveStatus},
  evaluation::{EvaluationRecord, EvaluationStatus, clamp_note},
  home::OfferIntent,
  inspection::{
    InspectionCategory, InspectionFilter, InspectionProgress, InspectionRating,
    InspectionRecord,
  },
  rubric::{AnswerValue, RubricSchema},
  store::HomeStore,
};

/// Who is editing, and in which shared workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
  pub user_id:      Uuid,
  pub workspace_id: Uuid,
}

impl SessionContext {
  pub fn new(user_id: Uuid, workspace_id: Uuid) -> Self {
    Self {
      user_id,
      workspace_id,
    }
  }

  /// A single-user context: the workspace is the user.
  pub fn solo(user_id: Uuid) -> Self { Self::new(user_id, user_id) }
}

// A poisoned lock means a panic elsewhere; the record data is still
// coherent (mutations are applied whole under the guard), so keep going.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn store_err<E: std::error::Error>(e: E) -> Error { Error::Store(e.to_string()) }

// ─── Evaluation ──────────────────────────────────────────────────────────────

/// Save sink for evaluation sessions: persist the snapshot, mirror the
/// summary onto the home, then fold the persisted identity back into the
/// live record.
pub struct EvaluationSink<S> {
  store:  Arc<S>,
  ctx:    SessionContext,
  record: Arc<Mutex<EvaluationRecord>>,
}

impl<S: HomeStore + 'static> SaveSink for EvaluationSink<S> {
  type Snapshot = EvaluationRecord;

  async fn save(&self, snapshot: EvaluationRecord) -> Result<()> {
    let home_id = snapshot.home_id;
    let saved = self
      .store
      .save_evaluation(snapshot)
      .await
      .map_err(store_err)?;
    self
      .store
      .update_home_summary(home_id, self.ctx, saved.summary())
      .await
      .map_err(store_err)?;
    lock(&self.record).absorb_saved(&saved);
    Ok(())
  }
}

/// An open evaluation for one home.
pub struct EvaluationSession<S: HomeStore + 'static> {
  store:  Arc<S>,
  ctx:    SessionContext,
  schema: Arc<RubricSchema>,
  record: Arc<Mutex<EvaluationRecord>>,
  saver:  Autosaver<EvaluationRecord>,
}

impl<S: HomeStore + 'static> EvaluationSession<S> {
  /// Open the user's evaluation of `home_id` with the standard rubric and
  /// the default debounce.
  pub async fn open(
    store: Arc<S>,
    ctx: SessionContext,
    home_id: Uuid,
  ) -> Result<Self> {
    Self::open_with(
      store,
      ctx,
      home_id,
      Arc::new(RubricSchema::standard()),
      DEFAULT_DEBOUNCE,
    )
    .await
  }

  pub async fn open_with(
    store: Arc<S>,
    ctx: SessionContext,
    home_id: Uuid,
    schema: Arc<RubricSchema>,
    debounce: std::time::Duration,
  ) -> Result<Self> {
    // No stored record yet means a fresh one, created lazily: no row
    // exists until the first save fires.
    let record = store
      .load_evaluation(home_id, ctx)
      .await
      .map_err(store_err)?
      .unwrap_or_else(|| EvaluationRecord::new(home_id, &ctx));
    let record = Arc::new(Mutex::new(record));

    let sink = Arc::new(EvaluationSink {
      store:  Arc::clone(&store),
      ctx,
      record: Arc::clone(&record),
    });
    let saver = Autosaver::spawn(sink, debounce);

    Ok(Self {
      store,
      ctx,
      schema,
      record,
      saver,
    })
  }

  /// Answer a rubric item. The value must match the item's declared kind;
  /// rejected edits leave the record untouched.
  pub fn set_item_rating(
    &self,
    category_id: &str,
    item_id: &str,
    value: AnswerValue,
  ) -> Result<()> {
    let item = self.lookup(category_id, item_id)?;
    if !value.matches_kind(item) {
      return Err(Error::AnswerKindMismatch {
        category: category_id.to_owned(),
        item:     item_id.to_owned(),
        expected: item.kind,
        got:      value.kind_name(),
      });
    }

    let mut record = lock(&self.record);
    if value.is_answered() {
      record
        .ratings
        .entry(category_id.to_owned())
        .or_default()
        .insert(item_id.to_owned(), value);
    } else {
      remove_answer(&mut record, category_id, item_id);
    }
    self.schedule(&record);
    Ok(())
  }

  /// Clear an item's answer.
  pub fn clear_item_rating(&self, category_id: &str, item_id: &str) -> Result<()> {
    self.lookup(category_id, item_id)?;
    let mut record = lock(&self.record);
    remove_answer(&mut record, category_id, item_id);
    self.schedule(&record);
    Ok(())
  }

  /// Set the note attached to one item. Blank clears it; long notes are
  /// truncated to [`crate::evaluation::NOTE_MAX_CHARS`].
  pub fn set_item_note(
    &self,
    category_id: &str,
    item_id: &str,
    text: &str,
  ) -> Result<()> {
    self.lookup(category_id, item_id)?;
    let key = format!("{category_id}/{item_id}");
    let mut record = lock(&self.record);
    if text.trim().is_empty() {
      record.item_notes.remove(&key);
    } else {
      record.item_notes.insert(key, clamp_note(text));
    }
    self.schedule(&record);
    Ok(())
  }

  /// Set a category-level note.
  pub fn set_section_note(&self, category_id: &str, text: &str) -> Result<()> {
    if self.schema.category(category_id).is_none() {
      return Err(Error::UnknownCategory(category_id.to_owned()));
    }
    let mut record = lock(&self.record);
    if text.trim().is_empty() {
      record.section_notes.remove(category_id);
    } else {
      record
        .section_notes
        .insert(category_id.to_owned(), clamp_note(text));
    }
    self.schedule(&record);
    Ok(())
  }

  /// The buyer's own 1–5 star rating, independent of the computed score.
  pub fn set_user_overall_rating(&self, stars: u8) -> Result<()> {
    if !(1..=5).contains(&stars) {
      return Err(Error::StarOutOfRange(stars));
    }
    let mut record = lock(&self.record);
    record.user_overall_rating = Some(stars);
    self.schedule(&record);
    Ok(())
  }

  /// Record the offer decision. Written to the home directly; this isn't
  /// part of the evaluation payload and doesn't wait on the debounce.
  pub async fn set_offer_intent(&self, intent: Option<OfferIntent>) -> Result<()> {
    let home_id = lock(&self.record).home_id;
    self
      .store
      .set_offer_intent(home_id, self.ctx, intent)
      .await
      .map_err(store_err)
  }

  /// Mark the evaluation completed and flush it. Requires every rubric
  /// item answered.
  pub async fn complete(&self) -> Result<()> {
    let snapshot = {
      let record = lock(&self.record);
      let mut snap = record.snapshot_for_save(&self.schema, Utc::now());
      if snap.completion_percentage < 100 {
        return Err(Error::EvaluationIncomplete(snap.completion_percentage));
      }
      snap.status = EvaluationStatus::Completed;
      snap.completed_at = Some(snap.updated_at);
      snap
    };
    self.saver.commit(snapshot).await
  }

  /// Flush pending edits now and wait for the save to land.
  pub async fn commit(&self) -> Result<()> {
    let snapshot = lock(&self.record).snapshot_for_save(&self.schema, Utc::now());
    self.saver.commit(snapshot).await
  }

  pub fn record(&self) -> EvaluationRecord { lock(&self.record).clone() }

  pub fn schema(&self) -> &RubricSchema { &self.schema }

  pub fn save_status(&self) -> SaveStatus { self.saver.status() }

  fn lookup(
    &self,
    category_id: &str,
    item_id: &str,
  ) -> Result<&crate::rubric::RubricItem> {
    if self.schema.category(category_id).is_none() {
      return Err(Error::UnknownCategory(category_id.to_owned()));
    }
    self
      .schema
      .item(category_id, item_id)
      .ok_or_else(|| Error::UnknownItem {
        category: category_id.to_owned(),
        item:     item_id.to_owned(),
      })
  }

  fn schedule(&self, record: &EvaluationRecord) {
    self
      .saver
      .schedule(record.snapshot_for_save(&self.schema, Utc::now()));
  }
}

fn remove_answer(record: &mut EvaluationRecord, category_id: &str, item_id: &str) {
  if let Some(items) = record.ratings.get_mut(category_id) {
    items.remove(item_id);
    if items.is_empty() {
      record.ratings.remove(category_id);
    }
  }
}

// ─── Inspection ──────────────────────────────────────────────────────────────

pub struct InspectionSink<S> {
  store:  Arc<S>,
  record: Arc<Mutex<InspectionRecord>>,
}

impl<S: HomeStore + 'static> SaveSink for InspectionSink<S> {
  type Snapshot = InspectionRecord;

  async fn save(&self, snapshot: InspectionRecord) -> Result<()> {
    let saved = self
      .store
      .save_inspection(snapshot)
      .await
      .map_err(store_err)?;
    lock(&self.record).absorb_saved(&saved);
    Ok(())
  }
}

/// An open inspection checklist for one home. Unlike the evaluation
/// session it holds no store handle of its own; everything flows through
/// the sink.
pub struct InspectionSession {
  record: Arc<Mutex<InspectionRecord>>,
  saver:  Autosaver<InspectionRecord>,
}

impl InspectionSession {
  pub async fn open<S: HomeStore + 'static>(
    store: Arc<S>,
    ctx: SessionContext,
    home_id: Uuid,
  ) -> Result<Self> {
    Self::open_with(store, ctx, home_id, DEFAULT_DEBOUNCE).await
  }

  pub async fn open_with<S: HomeStore + 'static>(
    store: Arc<S>,
    ctx: SessionContext,
    home_id: Uuid,
    debounce: std::time::Duration,
  ) -> Result<Self> {
    let record = store
      .load_inspection(home_id, ctx)
      .await
      .map_err(store_err)?
      .unwrap_or_else(|| InspectionRecord::from_checklist(home_id, &ctx));
    let record = Arc::new(Mutex::new(record));

    let sink = Arc::new(InspectionSink {
      store,
      record: Arc::clone(&record),
    });
    let saver = Autosaver::spawn(sink, debounce);

    Ok(Self { record, saver })
  }

  /// Set or clear an item's verdict.
  pub fn set_item_rating(
    &self,
    category_id: &str,
    item_id: &str,
    rating: Option<InspectionRating>,
  ) -> Result<()> {
    let mut record = lock(&self.record);
    let category = record
      .categories
      .get_mut(category_id)
      .ok_or_else(|| Error::UnknownCategory(category_id.to_owned()))?;
    let item = category
      .items
      .iter_mut()
      .find(|i| i.id == item_id)
      .ok_or_else(|| Error::UnknownItem {
        category: category_id.to_owned(),
        item:     item_id.to_owned(),
      })?;
    item.evaluation = rating;
    item.evaluated_at = rating.map(|_| Utc::now());
    category.recount();
    self.schedule(&record);
    Ok(())
  }

  pub fn set_item_note(
    &self,
    category_id: &str,
    item_id: &str,
    text: &str,
  ) -> Result<()> {
    let mut record = lock(&self.record);
    let category = record
      .categories
      .get_mut(category_id)
      .ok_or_else(|| Error::UnknownCategory(category_id.to_owned()))?;
    let item = category
      .items
      .iter_mut()
      .find(|i| i.id == item_id)
      .ok_or_else(|| Error::UnknownItem {
        category: category_id.to_owned(),
        item:     item_id.to_owned(),
      })?;
    item.notes = clamp_note(text);
    self.schedule(&record);
    Ok(())
  }

  pub fn set_section_note(&self, category_id: &str, text: &str) -> Result<()> {
    let mut record = lock(&self.record);
    let category = record
      .categories
      .get_mut(category_id)
      .ok_or_else(|| Error::UnknownCategory(category_id.to_owned()))?;
    category.section_notes = clamp_note(text);
    self.schedule(&record);
    Ok(())
  }

  pub fn filtered(&self, filter: InspectionFilter) -> Vec<InspectionCategory> {
    lock(&self.record).filtered(filter)
  }

  pub fn progress(&self) -> InspectionProgress {
    lock(&self.record).overall_progress()
  }

  pub fn record(&self) -> InspectionRecord { lock(&self.record).clone() }

  pub fn save_status(&self) -> SaveStatus { self.saver.status() }

  pub async fn commit(&self) -> Result<()> {
    let snapshot = lock(&self.record).snapshot_for_save(Utc::now());
    self.saver.commit(snapshot).await
  }

  fn schedule(&self, record: &InspectionRecord) {
    self.saver.schedule(record.snapshot_for_save(Utc::now()));
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
