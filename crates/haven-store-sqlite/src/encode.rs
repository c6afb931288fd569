//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Structured fields (the
//! ratings map, note maps, inspection categories) are stored as compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use haven_core::{
  evaluation::{EvaluationRecord, EvaluationStatus},
  home::{Home, OfferIntent},
  inspection::{InspectionCategory, InspectionRecord},
  media::{EvaluationPhoto, EvaluationVoiceNote},
  rubric::RatingsMap,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── EvaluationStatus ────────────────────────────────────────────────────────

pub fn encode_status(s: EvaluationStatus) -> &'static str {
  match s {
    EvaluationStatus::NotStarted => "not_started",
    EvaluationStatus::InProgress => "in_progress",
    EvaluationStatus::Completed => "completed",
  }
}

pub fn decode_status(s: &str) -> Result<EvaluationStatus> {
  match s {
    "not_started" => Ok(EvaluationStatus::NotStarted),
    "in_progress" => Ok(EvaluationStatus::InProgress),
    "completed" => Ok(EvaluationStatus::Completed),
    other => Err(Error::UnknownEnum {
      field: "evaluation status",
      value: other.to_owned(),
    }),
  }
}

// ─── OfferIntent ─────────────────────────────────────────────────────────────

pub fn encode_offer_intent(i: OfferIntent) -> &'static str {
  match i {
    OfferIntent::Yes => "yes",
    OfferIntent::Maybe => "maybe",
    OfferIntent::No => "no",
  }
}

pub fn decode_offer_intent(s: &str) -> Result<OfferIntent> {
  match s {
    "yes" => Ok(OfferIntent::Yes),
    "maybe" => Ok(OfferIntent::Maybe),
    "no" => Ok(OfferIntent::No),
    other => Err(Error::UnknownEnum {
      field: "offer intent",
      value: other.to_owned(),
    }),
  }
}

// ─── JSON maps ───────────────────────────────────────────────────────────────

pub fn encode_ratings(r: &RatingsMap) -> Result<String> {
  Ok(serde_json::to_string(r)?)
}

pub fn decode_ratings(s: &str) -> Result<RatingsMap> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_notes(n: &BTreeMap<String, String>) -> Result<String> {
  Ok(serde_json::to_string(n)?)
}

pub fn decode_notes(s: &str) -> Result<BTreeMap<String, String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_categories(
  c: &BTreeMap<String, InspectionCategory>,
) -> Result<String> {
  Ok(serde_json::to_string(c)?)
}

pub fn decode_categories(s: &str) -> Result<BTreeMap<String, InspectionCategory>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `homes` row.
pub struct RawHome {
  pub home_id:           String,
  pub user_id:           String,
  pub workspace_id:      String,
  pub address:           String,
  pub neighborhood:      Option<String>,
  pub price:             f64,
  pub bedrooms:          i64,
  pub bathrooms:         f64,
  pub year_built:        Option<i64>,
  pub property_taxes:    Option<f64>,
  pub square_footage:    Option<i64>,
  pub favorite:          bool,
  pub compare_selected:  bool,
  pub evaluation_status: String,
  pub overall_rating:    f64,
  pub offer_intent:      Option<String>,
  pub primary_photo:     Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawHome {
  pub fn into_home(self) -> Result<Home> {
    Ok(Home {
      home_id:           decode_uuid(&self.home_id)?,
      user_id:           decode_uuid(&self.user_id)?,
      workspace_id:      decode_uuid(&self.workspace_id)?,
      address:           self.address,
      neighborhood:      self.neighborhood,
      price:             self.price,
      bedrooms:          self.bedrooms as u8,
      bathrooms:         self.bathrooms as f32,
      year_built:        self.year_built.map(|y| y as u16),
      property_taxes:    self.property_taxes,
      square_footage:    self.square_footage.map(|s| s as u32),
      favorite:          self.favorite,
      compare_selected:  self.compare_selected,
      evaluation_status: decode_status(&self.evaluation_status)?,
      overall_rating:    self.overall_rating,
      offer_intent:      self
        .offer_intent
        .as_deref()
        .map(decode_offer_intent)
        .transpose()?,
      primary_photo:     self.primary_photo,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from an `evaluations` row.
pub struct RawEvaluation {
  pub evaluation_id:         String,
  pub home_id:               String,
  pub user_id:               String,
  pub workspace_id:          String,
  pub ratings:               String,
  pub item_notes:            String,
  pub section_notes:         String,
  pub overall_rating:        f64,
  pub user_overall_rating:   Option<i64>,
  pub completion_percentage: i64,
  pub status:                String,
  pub started_at:            Option<String>,
  pub completed_at:          Option<String>,
  pub created_at:            String,
  pub updated_at:            String,
}

impl RawEvaluation {
  pub fn into_record(self) -> Result<EvaluationRecord> {
    Ok(EvaluationRecord {
      evaluation_id:         decode_uuid(&self.evaluation_id)?,
      home_id:               decode_uuid(&self.home_id)?,
      user_id:               decode_uuid(&self.user_id)?,
      workspace_id:          decode_uuid(&self.workspace_id)?,
      ratings:               decode_ratings(&self.ratings)?,
      item_notes:            decode_notes(&self.item_notes)?,
      section_notes:         decode_notes(&self.section_notes)?,
      overall_rating:        self.overall_rating,
      user_overall_rating:   self.user_overall_rating.map(|n| n as u8),
      completion_percentage: self.completion_percentage as u8,
      status:                decode_status(&self.status)?,
      started_at:            self.started_at.as_deref().map(decode_dt).transpose()?,
      completed_at:          self.completed_at.as_deref().map(decode_dt).transpose()?,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from an `inspections` row.
pub struct RawInspection {
  pub inspection_id: String,
  pub home_id:       String,
  pub user_id:       String,
  pub workspace_id:  String,
  pub categories:    String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawInspection {
  pub fn into_record(self) -> Result<InspectionRecord> {
    Ok(InspectionRecord {
      inspection_id: decode_uuid(&self.inspection_id)?,
      home_id:       decode_uuid(&self.home_id)?,
      user_id:       decode_uuid(&self.user_id)?,
      workspace_id:  decode_uuid(&self.workspace_id)?,
      categories:    decode_categories(&self.categories)?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `photos` row.
pub struct RawPhoto {
  pub photo_id:       String,
  pub evaluation_id:  String,
  pub category_id:    String,
  pub storage_path:   String,
  pub thumbnail_path: String,
  pub caption:        Option<String>,
  pub file_size:      i64,
  pub mime_type:      String,
  pub width:          Option<i64>,
  pub height:         Option<i64>,
  pub created_at:     String,
}

impl RawPhoto {
  pub fn into_photo(self) -> Result<EvaluationPhoto> {
    Ok(EvaluationPhoto {
      photo_id:       decode_uuid(&self.photo_id)?,
      evaluation_id:  decode_uuid(&self.evaluation_id)?,
      category_id:    self.category_id,
      storage_path:   self.storage_path,
      thumbnail_path: self.thumbnail_path,
      caption:        self.caption,
      file_size:      self.file_size as u64,
      mime_type:      self.mime_type,
      width:          self.width.map(|w| w as u32),
      height:         self.height.map(|h| h as u32),
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `voice_notes` row.
pub struct RawVoiceNote {
  pub voice_note_id: String,
  pub evaluation_id: String,
  pub category_id:   String,
  pub storage_path:  String,
  pub duration_secs: i64,
  pub file_size:     i64,
  pub transcript:    Option<String>,
  pub created_at:    String,
}

impl RawVoiceNote {
  pub fn into_voice_note(self) -> Result<EvaluationVoiceNote> {
    Ok(EvaluationVoiceNote {
      voice_note_id: decode_uuid(&self.voice_note_id)?,
      evaluation_id: decode_uuid(&self.evaluation_id)?,
      category_id:   self.category_id,
      storage_path:  self.storage_path,
      duration_secs: self.duration_secs as u32,
      file_size:     self.file_size as u64,
      transcript:    self.transcript,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
