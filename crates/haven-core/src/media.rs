//! Photos and voice notes attached to evaluation sections.
//!
//! Media writes go straight to the store (no debounce) and each mutation
//! is followed by a list re-fetch so callers always hold the store's view
//! of the section, regardless of what other sessions did in between.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, store::HomeStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPhoto {
  pub photo_id:       Uuid,
  pub evaluation_id:  Uuid,
  pub category_id:    String,
  pub storage_path:   String,
  pub thumbnail_path: String,
  pub caption:        Option<String>,
  pub file_size:      u64,
  pub mime_type:      String,
  pub width:          Option<u32>,
  pub height:         Option<u32>,
  pub created_at:     DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhoto {
  pub evaluation_id:  Uuid,
  pub category_id:    String,
  pub storage_path:   String,
  pub thumbnail_path: String,
  pub caption:        Option<String>,
  pub file_size:      u64,
  pub mime_type:      String,
  pub width:          Option<u32>,
  pub height:         Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationVoiceNote {
  pub voice_note_id: Uuid,
  pub evaluation_id: Uuid,
  pub category_id:   String,
  pub storage_path:  String,
  pub duration_secs: u32,
  pub file_size:     u64,
  pub transcript:    Option<String>,
  pub created_at:    DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVoiceNote {
  pub evaluation_id: Uuid,
  pub category_id:   String,
  pub storage_path:  String,
  pub duration_secs: u32,
  pub file_size:     u64,
  pub transcript:    Option<String>,
}

/// Media operations scoped to one evaluation. Cheap to clone and safe to
/// use concurrently; every method takes `&self`.
pub struct MediaUploader<S> {
  store:         Arc<S>,
  evaluation_id: Uuid,
}

impl<S> Clone for MediaUploader<S> {
  fn clone(&self) -> Self {
    Self {
      store:         Arc::clone(&self.store),
      evaluation_id: self.evaluation_id,
    }
  }
}

impl<S: HomeStore> MediaUploader<S> {
  pub fn new(store: Arc<S>, evaluation_id: Uuid) -> Self {
    Self {
      store,
      evaluation_id,
    }
  }

  /// Add a photo to a section and return the section's full photo list.
  pub async fn upload_photo(
    &self,
    input: NewPhoto,
  ) -> Result<Vec<EvaluationPhoto>> {
    let category_id = input.category_id.clone();
    self
      .store
      .add_photo(input)
      .await
      .map_err(|e| Error::Store(e.to_string()))?;
    self.photos(&category_id).await
  }

  pub async fn remove_photo(
    &self,
    photo_id: Uuid,
    category_id: &str,
  ) -> Result<Vec<EvaluationPhoto>> {
    self
      .store
      .delete_photo(photo_id)
      .await
      .map_err(|e| Error::Store(e.to_string()))?;
    self.photos(category_id).await
  }

  pub async fn photos(&self, category_id: &str) -> Result<Vec<EvaluationPhoto>> {
    self
      .store
      .list_photos(self.evaluation_id, category_id.to_owned())
      .await
      .map_err(|e| Error::Store(e.to_string()))
  }

  /// Add a voice note to a section and return the section's full list.
  pub async fn upload_voice_note(
    &self,
    input: NewVoiceNote,
  ) -> Result<Vec<EvaluationVoiceNote>> {
    let category_id = input.category_id.clone();
    self
      .store
      .add_voice_note(input)
      .await
      .map_err(|e| Error::Store(e.to_string()))?;
    self.voice_notes(&category_id).await
  }

  pub async fn remove_voice_note(
    &self,
    voice_note_id: Uuid,
    category_id: &str,
  ) -> Result<Vec<EvaluationVoiceNote>> {
    self
      .store
      .delete_voice_note(voice_note_id)
      .await
      .map_err(|e| Error::Store(e.to_string()))?;
    self.voice_notes(category_id).await
  }

  pub async fn voice_notes(
    &self,
    category_id: &str,
  ) -> Result<Vec<EvaluationVoiceNote>> {
    self
      .store
      .list_voice_notes(self.evaluation_id, category_id.to_owned())
      .await
      .map_err(|e| Error::Store(e.to_string()))
  }
}
