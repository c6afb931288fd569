//! The rubric schema — the fixed set of categories and items a home can be
//! rated against, and the typed answer values those items accept.
//!
//! The schema is declarative and immutable after construction. Category
//! order is display-significant: progress math and section navigation both
//! depend on it staying stable across sessions. Item ids are unique within
//! a category but not globally; an answer is always addressed by the pair
//! `(category_id, item_id)`.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

// ─── Icons ───────────────────────────────────────────────────────────────────

/// Closed set of icon identifiers. UI layers resolve these through an
/// explicit mapping table, so an unknown icon is unrepresentable rather
/// than a silent runtime fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconId {
  Home,
  Layout,
  Utensils,
  Settings,
  MapPin,
  Star,
  Smartphone,
  DollarSign,
  FileText,
  Hammer,
  Droplets,
  Zap,
  Thermometer,
  Shield,
}

// ─── Answer kinds ────────────────────────────────────────────────────────────

/// The type of value an item accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
  /// Qualitative three-state rating (good / fair / poor).
  Rating,
  /// Whole-star rating from 1 to 5.
  NumericStar,
  Boolean,
  /// A checkbox that may instead carry a short free-text detail.
  BooleanWithText,
  /// Non-negative dollar amount.
  Currency,
  /// Bounded free text.
  FreeText,
  /// One of the item's declared `options`.
  Dropdown,
}

impl fmt::Display for AnswerKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Rating => "rating",
      Self::NumericStar => "star",
      Self::Boolean => "boolean",
      Self::BooleanWithText => "boolean-with-text",
      Self::Currency => "currency",
      Self::FreeText => "free-text",
      Self::Dropdown => "dropdown",
    };
    f.write_str(s)
  }
}

// ─── Qualitative rating ──────────────────────────────────────────────────────

/// The three-state answer used by [`AnswerKind::Rating`] items — the only
/// answers that feed the overall-rating formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualitativeRating {
  Good,
  Fair,
  Poor,
}

impl QualitativeRating {
  /// Point value used by the overall-rating formula.
  pub fn points(self) -> u32 {
    match self {
      Self::Good => 5,
      Self::Fair => 3,
      Self::Poor => 1,
    }
  }
}

impl fmt::Display for QualitativeRating {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Good => "good",
      Self::Fair => "fair",
      Self::Poor => "poor",
    })
  }
}

impl std::str::FromStr for QualitativeRating {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "good" => Ok(Self::Good),
      "fair" => Ok(Self::Fair),
      "poor" => Ok(Self::Poor),
      other => Err(format!("expected good, fair, or poor, got {other:?}")),
    }
  }
}

// ─── Answer values ───────────────────────────────────────────────────────────

/// A committed answer for one rubric item.
///
/// Serialises untagged so the persisted ratings map stays a plain nested
/// JSON object of string keys and primitive values, which is what dynamic
/// category/item identifiers require at the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
  Rating(QualitativeRating),
  Flag(bool),
  Number(f64),
  Text(String),
}

impl AnswerValue {
  /// Short name used in validation error messages.
  pub fn kind_name(&self) -> &'static str {
    match self {
      Self::Rating(_) => "rating",
      Self::Flag(_) => "boolean",
      Self::Number(_) => "number",
      Self::Text(_) => "text",
    }
  }

  /// Whether this value counts as an answer. Blank strings and non-finite
  /// numbers are treated as absent so aggregation stays total over
  /// whatever is in the map.
  pub fn is_answered(&self) -> bool {
    match self {
      Self::Text(s) => !s.trim().is_empty(),
      Self::Number(n) => n.is_finite(),
      Self::Rating(_) | Self::Flag(_) => true,
    }
  }

  /// Validate this value against an item's declared answer kind.
  pub fn matches_kind(&self, item: &RubricItem) -> bool {
    match (item.kind, self) {
      (AnswerKind::Rating, Self::Rating(_)) => true,
      (AnswerKind::NumericStar, Self::Number(n)) => {
        n.fract() == 0.0 && (1.0..=5.0).contains(n)
      }
      (AnswerKind::Boolean, Self::Flag(_)) => true,
      (AnswerKind::BooleanWithText, Self::Flag(_) | Self::Text(_)) => true,
      (AnswerKind::Currency, Self::Number(n)) => n.is_finite() && *n >= 0.0,
      (AnswerKind::FreeText, Self::Text(_)) => true,
      (AnswerKind::Dropdown, Self::Text(s)) => {
        item.options.iter().any(|o| o == s)
      }
      _ => false,
    }
  }
}

/// Sparse committed answers keyed by category id, then item id. An absent
/// entry means unanswered; blank values are removed, never stored.
pub type RatingsMap = BTreeMap<String, BTreeMap<String, AnswerValue>>;

// ─── Schema ──────────────────────────────────────────────────────────────────

/// One rateable attribute within a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricItem {
  pub id:      String,
  pub label:   String,
  pub kind:    AnswerKind,
  /// Valid choices for [`AnswerKind::Dropdown`] items; empty otherwise.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub options: Vec<String>,
}

impl RubricItem {
  fn new(id: &str, label: &str, kind: AnswerKind) -> Self {
    Self {
      id: id.to_owned(),
      label: label.to_owned(),
      kind,
      options: Vec::new(),
    }
  }
}

/// A named, ordered group of rubric items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricCategory {
  pub id:    String,
  pub title: String,
  pub icon:  IconId,
  pub items: Vec<RubricItem>,
}

/// The full rubric: an ordered sequence of categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricSchema {
  pub categories: Vec<RubricCategory>,
}

impl RubricSchema {
  pub fn category(&self, category_id: &str) -> Option<&RubricCategory> {
    self.categories.iter().find(|c| c.id == category_id)
  }

  pub fn item(&self, category_id: &str, item_id: &str) -> Option<&RubricItem> {
    self
      .category(category_id)?
      .items
      .iter()
      .find(|i| i.id == item_id)
  }

  /// Total item count across all categories, every answer kind included —
  /// the denominator of the completion percentage.
  pub fn total_items(&self) -> usize {
    self.categories.iter().map(|c| c.items.len()).sum()
  }

  /// The production evaluation rubric.
  pub fn standard() -> Self {
    use AnswerKind::{Boolean, BooleanWithText, Currency, FreeText, Rating};

    let rating = |id, label| RubricItem::new(id, label, Rating);
    let checkbox = |id, label| RubricItem::new(id, label, Boolean);
    let checkbox_text = |id, label| RubricItem::new(id, label, BooleanWithText);
    let currency = |id, label| RubricItem::new(id, label, Currency);
    let textarea = |id, label| RubricItem::new(id, label, FreeText);

    let category = |id: &str, title: &str, icon, items| RubricCategory {
      id: id.to_owned(),
      title: title.to_owned(),
      icon,
      items,
    };

    Self {
      categories: vec![
        category("exteriors", "Exteriors", IconId::Home, vec![
          rating("curb_appeal", "Curb Appeal"),
          rating("backyard", "Backyard"),
          rating("windows_doors", "Windows / Doors"),
          rating("roofing", "Roofing"),
          rating("entryway_driveway", "Entryway / Driveway"),
          rating("balcony_deck_patio_porch", "Balcony / Deck / Patio / Porch"),
          rating("fencing", "Fencing"),
        ]),
        category("interiors", "Interiors", IconId::Layout, vec![
          rating("walls_ceiling", "Walls / Ceiling"),
          rating("stairs", "Stairs"),
          rating("dine_in_area", "Dine-in Area"),
          rating("other_bedrooms", "Other Bedrooms"),
          rating("other_bathrooms", "Other Bathrooms"),
          rating("laundry_area_appliances", "Laundry Area & Appliances"),
          rating("light_fixtures", "Light Fixtures"),
          rating("basement", "Basement"),
          rating("flooring", "Flooring"),
          rating("living_area_room", "Living Area / Room"),
          rating("primary_bedroom", "Primary Bedroom"),
          rating("primary_bathroom", "Primary Bathroom"),
          rating("den_home_office", "Den / Home Office"),
          rating("walk_in_closet_storage", "Walk-in Closet / Storage"),
          rating("garage", "Garage"),
          rating("home_layout", "Home Layout"),
        ]),
        category("kitchen", "Kitchen", IconId::Utensils, vec![
          rating("overall_kitchen", "Overall Kitchen"),
          rating("counter_space", "Counter Space"),
          rating("kitchen_flooring", "Flooring"),
          rating("pantry", "Pantry"),
          rating("dishwasher", "Dishwasher"),
          rating("island", "Island"),
          rating("countertop", "Countertop"),
          rating("cabinets", "Cabinets"),
          rating("backsplash", "Backsplash"),
          rating("microwave", "Microwave"),
          rating("stove_oven", "Stove / Oven"),
        ]),
        category("home_systems", "Home Systems", IconId::Settings, vec![
          rating("hvac", "Heating, Ventilation & Air Conditioning (HVAC)"),
          rating("electrical_plumbing", "Electrical & Plumbing"),
        ]),
        category("location", "Location", IconId::MapPin, vec![
          rating("your_work", "Your Work"),
          rating("public_transport", "Public Transport"),
          rating("child_care", "Child Care"),
          rating("grocery_shopping_centers", "Grocery / Shopping Centers"),
          rating("place_of_worship", "Place of Worship"),
          rating("mobile_network", "Mobile Network"),
          rating("spouse_work", "Your Spouse's Work"),
          rating("highway", "Highway"),
          rating("schools", "Schools"),
          rating("medical_care", "Medical Care"),
          rating("parks_playgrounds", "Parks & Playgrounds"),
        ]),
        category("additional_features", "Additional Features", IconId::Star, vec![
          rating("fireplace", "Fireplace"),
          rating("family_room", "Family Room"),
          rating("extra_parking", "Extra Parking"),
          rating("pool", "Pool"),
          rating("pot_lights", "Pot Lights"),
          rating("walk_in_closet", "Walk-in Closet"),
          checkbox_text("additional_other", "Other"),
        ]),
        category("smart_features", "Smart Home Features", IconId::Smartphone, vec![
          checkbox("smart_thermostat", "Smart Thermostat"),
          checkbox("smart_doorbell", "Smart Door Bell"),
          checkbox("smart_garage_opener", "Smart Garage Opener"),
          checkbox("smart_smoke_detector", "Smart Smoke Detector"),
          checkbox("smart_door_lock", "Smart Door Lock"),
          checkbox("smart_security_camera", "Smart Security Camera"),
          checkbox_text("smart_other", "Other"),
        ]),
        category("monthly_costs", "Monthly Costs", IconId::DollarSign, vec![
          currency("utilities_cost", "Utilities"),
          currency("condo_fees", "Condo / POTL Fees"),
          currency("insurance_cost", "Insurance"),
          currency("other_fees", "Other Fees"),
        ]),
        category("other_observations", "Other Observations", IconId::FileText, vec![
          textarea("general_notes", "General observations"),
        ]),
      ],
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
