//! In-memory [`HomeStore`] used by the unit tests.

use std::{
  collections::BTreeMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  evaluation::{EvaluationRecord, EvaluationStatus},
  home::{Home, HomeSummary, NewHome, OfferIntent},
  inspection::InspectionRecord,
  media::{EvaluationPhoto, EvaluationVoiceNote, NewPhoto, NewVoiceNote},
  session::SessionContext,
  store::HomeStore,
};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct MemoryStoreError(pub String);

type Result<T> = std::result::Result<T, MemoryStoreError>;

#[derive(Default)]
struct Inner {
  homes:       BTreeMap<Uuid, Home>,
  evaluations: BTreeMap<(Uuid, Uuid), EvaluationRecord>,
  inspections: BTreeMap<(Uuid, Uuid), InspectionRecord>,
  photos:      Vec<EvaluationPhoto>,
  voice_notes: Vec<EvaluationVoiceNote>,
}

/// A mutex-backed store with switchable save failure, for exercising the
/// autosave error path.
#[derive(Default)]
pub struct MemoryStore {
  inner:      Mutex<Inner>,
  save_count: AtomicUsize,
  fail_saves: AtomicBool,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  pub fn set_fail_saves(&self, fail: bool) {
    self.fail_saves.store(fail, Ordering::SeqCst);
  }

  /// Number of evaluation/inspection saves that reached the store.
  pub fn save_count(&self) -> usize { self.save_count.load(Ordering::SeqCst) }

  fn check_save(&self) -> Result<()> {
    if self.fail_saves.load(Ordering::SeqCst) {
      return Err(MemoryStoreError("save disabled by test".to_owned()));
    }
    Ok(())
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(|p| p.into_inner())
  }
}

impl HomeStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn add_home(&self, ctx: SessionContext, input: NewHome) -> Result<Home> {
    let now = Utc::now();
    let home = Home {
      home_id: Uuid::new_v4(),
      user_id: ctx.user_id,
      workspace_id: ctx.workspace_id,
      address: input.address,
      neighborhood: input.neighborhood,
      price: input.price,
      bedrooms: input.bedrooms,
      bathrooms: input.bathrooms,
      year_built: input.year_built,
      property_taxes: input.property_taxes,
      square_footage: input.square_footage,
      favorite: false,
      compare_selected: false,
      evaluation_status: EvaluationStatus::NotStarted,
      overall_rating: 0.0,
      offer_intent: None,
      primary_photo: input.primary_photo,
      created_at: now,
      updated_at: now,
    };
    self.lock().homes.insert(home.home_id, home.clone());
    Ok(home)
  }

  async fn get_home(&self, home_id: Uuid) -> Result<Option<Home>> {
    Ok(self.lock().homes.get(&home_id).cloned())
  }

  async fn load_homes(&self, ctx: SessionContext) -> Result<Vec<Home>> {
    Ok(
      self
        .lock()
        .homes
        .values()
        .filter(|h| h.workspace_id == ctx.workspace_id)
        .cloned()
        .collect(),
    )
  }

  async fn update_home_summary(
    &self,
    home_id: Uuid,
    _ctx: SessionContext,
    summary: HomeSummary,
  ) -> Result<()> {
    let mut inner = self.lock();
    let home = inner
      .homes
      .get_mut(&home_id)
      .ok_or_else(|| MemoryStoreError(format!("no home {home_id}")))?;
    home.evaluation_status = summary.evaluation_status;
    home.overall_rating = summary.overall_rating;
    home.updated_at = Utc::now();
    Ok(())
  }

  async fn set_offer_intent(
    &self,
    home_id: Uuid,
    _ctx: SessionContext,
    intent: Option<OfferIntent>,
  ) -> Result<()> {
    let mut inner = self.lock();
    let home = inner
      .homes
      .get_mut(&home_id)
      .ok_or_else(|| MemoryStoreError(format!("no home {home_id}")))?;
    home.offer_intent = intent;
    home.updated_at = Utc::now();
    Ok(())
  }

  async fn delete_home(&self, home_id: Uuid, _ctx: SessionContext) -> Result<()> {
    let mut inner = self.lock();
    inner.homes.remove(&home_id);
    let evaluation_ids: Vec<Uuid> = inner
      .evaluations
      .iter()
      .filter(|((h, _), _)| *h == home_id)
      .map(|(_, e)| e.evaluation_id)
      .collect();
    inner.evaluations.retain(|(h, _), _| *h != home_id);
    inner.inspections.retain(|(h, _), _| *h != home_id);
    inner
      .photos
      .retain(|p| !evaluation_ids.contains(&p.evaluation_id));
    inner
      .voice_notes
      .retain(|v| !evaluation_ids.contains(&v.evaluation_id));
    Ok(())
  }

  async fn load_evaluation(
    &self,
    home_id: Uuid,
    ctx: SessionContext,
  ) -> Result<Option<EvaluationRecord>> {
    Ok(self.lock().evaluations.get(&(home_id, ctx.user_id)).cloned())
  }

  async fn save_evaluation(
    &self,
    mut record: EvaluationRecord,
  ) -> Result<EvaluationRecord> {
    self.check_save()?;
    self.save_count.fetch_add(1, Ordering::SeqCst);
    let mut inner = self.lock();
    let key = (record.home_id, record.user_id);
    if let Some(existing) = inner.evaluations.get(&key) {
      record.evaluation_id = existing.evaluation_id;
      record.created_at = existing.created_at;
    }
    inner.evaluations.insert(key, record.clone());
    Ok(record)
  }

  async fn load_inspection(
    &self,
    home_id: Uuid,
    ctx: SessionContext,
  ) -> Result<Option<InspectionRecord>> {
    Ok(self.lock().inspections.get(&(home_id, ctx.user_id)).cloned())
  }

  async fn save_inspection(
    &self,
    mut record: InspectionRecord,
  ) -> Result<InspectionRecord> {
    self.check_save()?;
    self.save_count.fetch_add(1, Ordering::SeqCst);
    let mut inner = self.lock();
    let key = (record.home_id, record.user_id);
    if let Some(existing) = inner.inspections.get(&key) {
      record.inspection_id = existing.inspection_id;
      record.created_at = existing.created_at;
    }
    inner.inspections.insert(key, record.clone());
    Ok(record)
  }

  async fn add_photo(&self, input: NewPhoto) -> Result<EvaluationPhoto> {
    let photo = EvaluationPhoto {
      photo_id: Uuid::new_v4(),
      evaluation_id: input.evaluation_id,
      category_id: input.category_id,
      storage_path: input.storage_path,
      thumbnail_path: input.thumbnail_path,
      caption: input.caption,
      file_size: input.file_size,
      mime_type: input.mime_type,
      width: input.width,
      height: input.height,
      created_at: Utc::now(),
    };
    self.lock().photos.push(photo.clone());
    Ok(photo)
  }

  async fn list_photos(
    &self,
    evaluation_id: Uuid,
    category_id: String,
  ) -> Result<Vec<EvaluationPhoto>> {
    Ok(
      self
        .lock()
        .photos
        .iter()
        .filter(|p| p.evaluation_id == evaluation_id && p.category_id == category_id)
        .cloned()
        .collect(),
    )
  }

  async fn delete_photo(&self, photo_id: Uuid) -> Result<()> {
    self.lock().photos.retain(|p| p.photo_id != photo_id);
    Ok(())
  }

  async fn add_voice_note(&self, input: NewVoiceNote) -> Result<EvaluationVoiceNote> {
    let note = EvaluationVoiceNote {
      voice_note_id: Uuid::new_v4(),
      evaluation_id: input.evaluation_id,
      category_id: input.category_id,
      storage_path: input.storage_path,
      duration_secs: input.duration_secs,
      file_size: input.file_size,
      transcript: input.transcript,
      created_at: Utc::now(),
    };
    self.lock().voice_notes.push(note.clone());
    Ok(note)
  }

  async fn list_voice_notes(
    &self,
    evaluation_id: Uuid,
    category_id: String,
  ) -> Result<Vec<EvaluationVoiceNote>> {
    Ok(
      self
        .lock()
        .voice_notes
        .iter()
        .filter(|v| v.evaluation_id == evaluation_id && v.category_id == category_id)
        .cloned()
        .collect(),
    )
  }

  async fn delete_voice_note(&self, voice_note_id: Uuid) -> Result<()> {
    self
      .lock()
      .voice_notes
      .retain(|v| v.voice_note_id != voice_note_id);
    Ok(())
  }
}
