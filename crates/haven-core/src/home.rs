//! The home listing model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluation::EvaluationStatus;

/// The buyer's current stance on making an offer. Stored on the home so
/// the listing grid can show it without loading the evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferIntent {
  Yes,
  Maybe,
  No,
}

impl std::fmt::Display for OfferIntent {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Self::Yes => "yes",
      Self::Maybe => "maybe",
      Self::No => "no",
    })
  }
}

impl std::str::FromStr for OfferIntent {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "yes" => Ok(Self::Yes),
      "maybe" => Ok(Self::Maybe),
      "no" => Ok(Self::No),
      other => Err(format!("expected yes, maybe, or no, got {other:?}")),
    }
  }
}

/// A saved home listing.
///
/// `evaluation_status` and `overall_rating` mirror the owning user's
/// evaluation record and exist so listing queries don't need a join; they
/// are written back whenever an evaluation save lands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Home {
  pub home_id:           Uuid,
  pub user_id:           Uuid,
  pub workspace_id:      Uuid,
  pub address:           String,
  pub neighborhood:      Option<String>,
  pub price:             f64,
  pub bedrooms:          u8,
  pub bathrooms:         f32,
  pub year_built:        Option<u16>,
  pub property_taxes:    Option<f64>,
  pub square_footage:    Option<u32>,
  pub favorite:          bool,
  pub compare_selected:  bool,
  pub evaluation_status: EvaluationStatus,
  pub overall_rating:    f64,
  pub offer_intent:      Option<OfferIntent>,
  pub primary_photo:     Option<String>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input for creating a home. The store assigns the id, ownership fields,
/// and timestamps; evaluation mirrors start at their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHome {
  pub address:        String,
  pub neighborhood:   Option<String>,
  pub price:          f64,
  pub bedrooms:       u8,
  pub bathrooms:      f32,
  pub year_built:     Option<u16>,
  pub property_taxes: Option<f64>,
  pub square_footage: Option<u32>,
  pub primary_photo:  Option<String>,
}

/// The slice of a home that mirrors its evaluation. Written only by the
/// evaluation save path, immediately after the evaluation row lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeSummary {
  pub evaluation_status: EvaluationStatus,
  pub overall_rating:    f64,
}
