//! The storage abstraction. Backends implement [`HomeStore`];
//! `haven-store-sqlite` is the reference implementation and the in-memory
//! test store lives in `testutil`.

use std::future::Future;

use uuid::Uuid;

use crate::{
  evaluation::EvaluationRecord,
  home::{Home, HomeSummary, NewHome, OfferIntent},
  inspection::InspectionRecord,
  media::{EvaluationPhoto, EvaluationVoiceNote, NewPhoto, NewVoiceNote},
  session::SessionContext,
};

/// Persistence operations for homes, evaluations, inspections, and media.
///
/// Evaluations and inspections are saved whole: `save_*` upserts on
/// `(home_id, user_id)` and fully replaces the stored record, returning
/// what actually landed (the original row identity and `created_at`
/// survive an upsert). Loads of records that were never saved return
/// `Ok(None)`, not an error.
pub trait HomeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn add_home(
    &self,
    ctx: SessionContext,
    input: NewHome,
  ) -> impl Future<Output = Result<Home, Self::Error>> + Send + '_;

  fn get_home(
    &self,
    home_id: Uuid,
  ) -> impl Future<Output = Result<Option<Home>, Self::Error>> + Send + '_;

  fn load_homes(
    &self,
    ctx: SessionContext,
  ) -> impl Future<Output = Result<Vec<Home>, Self::Error>> + Send + '_;

  /// Write the evaluation mirror fields onto a home. Called by the
  /// evaluation save path right after the evaluation row lands.
  fn update_home_summary(
    &self,
    home_id: Uuid,
    ctx: SessionContext,
    summary: HomeSummary,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn set_offer_intent(
    &self,
    home_id: Uuid,
    ctx: SessionContext,
    intent: Option<OfferIntent>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a home and everything hanging off it (evaluations,
  /// inspections, media).
  fn delete_home(
    &self,
    home_id: Uuid,
    ctx: SessionContext,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn load_evaluation(
    &self,
    home_id: Uuid,
    ctx: SessionContext,
  ) -> impl Future<Output = Result<Option<EvaluationRecord>, Self::Error>> + Send + '_;

  fn save_evaluation(
    &self,
    record: EvaluationRecord,
  ) -> impl Future<Output = Result<EvaluationRecord, Self::Error>> + Send + '_;

  fn load_inspection(
    &self,
    home_id: Uuid,
    ctx: SessionContext,
  ) -> impl Future<Output = Result<Option<InspectionRecord>, Self::Error>> + Send + '_;

  fn save_inspection(
    &self,
    record: InspectionRecord,
  ) -> impl Future<Output = Result<InspectionRecord, Self::Error>> + Send + '_;

  fn add_photo(
    &self,
    input: NewPhoto,
  ) -> impl Future<Output = Result<EvaluationPhoto, Self::Error>> + Send + '_;

  fn list_photos(
    &self,
    evaluation_id: Uuid,
    category_id: String,
  ) -> impl Future<Output = Result<Vec<EvaluationPhoto>, Self::Error>> + Send + '_;

  fn delete_photo(
    &self,
    photo_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn add_voice_note(
    &self,
    input: NewVoiceNote,
  ) -> impl Future<Output = Result<EvaluationVoiceNote, Self::Error>> + Send + '_;

  fn list_voice_notes(
    &self,
    evaluation_id: Uuid,
    category_id: String,
  ) -> impl Future<Output = Result<Vec<EvaluationVoiceNote>, Self::Error>> + Send + '_;

  fn delete_voice_note(
    &self,
    voice_note_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
