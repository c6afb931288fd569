//! The inspection checklist: a walkthrough companion with per-item
//! good / fix / replace verdicts and running counts per category.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{rubric::IconId, session::SessionContext};

// ─── Ratings & filters ───────────────────────────────────────────────────────

/// Verdict on a single inspection item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectionRating {
  Good,
  Fix,
  Replace,
}

impl std::fmt::Display for InspectionRating {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Self::Good => "good",
      Self::Fix => "fix",
      Self::Replace => "replace",
    })
  }
}

impl std::str::FromStr for InspectionRating {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "good" => Ok(Self::Good),
      "fix" => Ok(Self::Fix),
      "replace" => Ok(Self::Replace),
      other => Err(format!("expected good, fix, or replace, got {other:?}")),
    }
  }
}

/// View filter over inspection items. Purely a projection; the underlying
/// record is never altered by filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InspectionFilter {
  #[default]
  All,
  Good,
  Fix,
  Replace,
  NotRated,
}

impl InspectionFilter {
  pub fn keeps(self, rating: Option<InspectionRating>) -> bool {
    match self {
      Self::All => true,
      Self::Good => rating == Some(InspectionRating::Good),
      Self::Fix => rating == Some(InspectionRating::Fix),
      Self::Replace => rating == Some(InspectionRating::Replace),
      Self::NotRated => rating.is_none(),
    }
  }
}

// ─── Items & categories ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionItem {
  pub id:           String,
  /// 1-based display number within the category.
  pub number:       u32,
  pub description:  String,
  pub evaluation:   Option<InspectionRating>,
  pub notes:        String,
  pub evaluated_at: Option<DateTime<Utc>>,
}

/// A checklist section with denormalised verdict counts.
///
/// The counts are stored for cheap listing display but never trusted:
/// [`InspectionCategory::recount`] rebuilds them from the items after
/// every mutation and on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionCategory {
  pub id:              String,
  pub name:            String,
  pub description:     String,
  pub icon:            IconId,
  pub items:           Vec<InspectionItem>,
  pub section_notes:   String,
  pub completed_count: u32,
  pub good_count:      u32,
  pub fix_count:       u32,
  pub replace_count:   u32,
}

impl InspectionCategory {
  /// Rebuild all counts from the items.
  pub fn recount(&mut self) {
    let mut good = 0;
    let mut fix = 0;
    let mut replace = 0;
    for item in &self.items {
      match item.evaluation {
        Some(InspectionRating::Good) => good += 1,
        Some(InspectionRating::Fix) => fix += 1,
        Some(InspectionRating::Replace) => replace += 1,
        None => {}
      }
    }
    self.good_count = good;
    self.fix_count = fix;
    self.replace_count = replace;
    self.completed_count = good + fix + replace;
  }

  pub fn not_rated_count(&self) -> u32 {
    self.items.len() as u32 - self.completed_count
  }
}

// ─── Progress ────────────────────────────────────────────────────────────────

/// Whole-checklist progress, recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectionProgress {
  pub completed:     u32,
  pub total:         u32,
  pub percentage:    u8,
  pub good_count:    u32,
  pub fix_count:     u32,
  pub replace_count: u32,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One user's inspection of one home, upserted whole like an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRecord {
  pub inspection_id: Uuid,
  pub home_id:       Uuid,
  pub user_id:       Uuid,
  pub workspace_id:  Uuid,
  pub categories:    BTreeMap<String, InspectionCategory>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl InspectionRecord {
  /// A fresh record instantiated from the standard checklist template.
  pub fn from_checklist(home_id: Uuid, ctx: &SessionContext) -> Self {
    let now = Utc::now();
    Self {
      inspection_id: Uuid::new_v4(),
      home_id,
      user_id: ctx.user_id,
      workspace_id: ctx.workspace_id,
      categories: standard_checklist(),
      created_at: now,
      updated_at: now,
    }
  }

  pub fn recount_all(&mut self) {
    for category in self.categories.values_mut() {
      category.recount();
    }
  }

  pub fn overall_progress(&self) -> InspectionProgress {
    let mut completed = 0;
    let mut total = 0;
    let mut good = 0;
    let mut fix = 0;
    let mut replace = 0;
    for category in self.categories.values() {
      total += category.items.len() as u32;
      completed += category.completed_count;
      good += category.good_count;
      fix += category.fix_count;
      replace += category.replace_count;
    }
    let percentage = if total == 0 {
      0
    } else {
      ((f64::from(completed) / f64::from(total)) * 100.0).round() as u8
    };
    InspectionProgress {
      completed,
      total,
      percentage,
      good_count: good,
      fix_count: fix,
      replace_count: replace,
    }
  }

  /// Project the checklist through a filter. Categories keep their order
  /// and metadata; only the item lists shrink. Empty categories are kept
  /// so section counts stay visible under the filter.
  pub fn filtered(&self, filter: InspectionFilter) -> Vec<InspectionCategory> {
    self
      .categories
      .values()
      .map(|category| {
        let mut c = category.clone();
        c.items.retain(|i| filter.keeps(i.evaluation));
        c
      })
      .collect()
  }

  /// Copy to persist: counts rebuilt, timestamp stamped.
  pub fn snapshot_for_save(&self, now: DateTime<Utc>) -> Self {
    let mut snap = self.clone();
    snap.recount_all();
    snap.updated_at = now;
    snap
  }

  /// Fold a persisted snapshot's identity and timestamps back in without
  /// disturbing verdicts or notes edited since the snapshot was taken.
  pub fn absorb_saved(&mut self, saved: &Self) {
    self.inspection_id = saved.inspection_id;
    self.created_at = saved.created_at;
    self.updated_at = saved.updated_at;
  }
}

// ─── Checklist template ──────────────────────────────────────────────────────

/// The standard walkthrough checklist.
pub fn standard_checklist() -> BTreeMap<String, InspectionCategory> {
  let section = |id: &str, name: &str, description: &str, icon, items: &[&str]| {
    let category = InspectionCategory {
      id: id.to_owned(),
      name: name.to_owned(),
      description: description.to_owned(),
      icon,
      items: items
        .iter()
        .enumerate()
        .map(|(i, description)| InspectionItem {
          id:           format!("{id}_{}", i + 1),
          number:       i as u32 + 1,
          description:  (*description).to_owned(),
          evaluation:   None,
          notes:        String::new(),
          evaluated_at: None,
        })
        .collect(),
      section_notes: String::new(),
      completed_count: 0,
      good_count: 0,
      fix_count: 0,
      replace_count: 0,
    };
    (id.to_owned(), category)
  };

  BTreeMap::from([
    section(
      "exterior_roof",
      "Roof & Exterior",
      "Condition of the envelope and water management",
      IconId::Home,
      &[
        "Shingles",
        "Gutters & downspouts",
        "Siding & trim",
        "Grading & drainage",
        "Windows & seals",
      ],
    ),
    section(
      "foundation_basement",
      "Foundation & Basement",
      "Structure and moisture below grade",
      IconId::Hammer,
      &[
        "Visible cracks",
        "Moisture / efflorescence",
        "Sump pump",
        "Floor joists & posts",
      ],
    ),
    section(
      "plumbing",
      "Plumbing",
      "Supply, drainage, and the water heater",
      IconId::Droplets,
      &[
        "Water pressure",
        "Leaks under sinks",
        "Water heater age & condition",
        "Drain speed",
        "Shut-off valve",
      ],
    ),
    section(
      "electrical",
      "Electrical",
      "Panel, outlets, and visible wiring",
      IconId::Zap,
      &[
        "Panel condition & labelling",
        "Outlet grounding",
        "GFCI in wet areas",
        "Visible wiring",
      ],
    ),
    section(
      "hvac",
      "HVAC",
      "Heating and cooling equipment",
      IconId::Thermometer,
      &[
        "Furnace age & service tag",
        "A/C operation",
        "Ductwork & vents",
        "Thermostat",
      ],
    ),
    section(
      "interior",
      "Interior",
      "Surfaces, doors, and stairs",
      IconId::Layout,
      &[
        "Walls & ceilings",
        "Floors level",
        "Doors close & latch",
        "Stairs & railings",
        "Pests",
      ],
    ),
    section(
      "kitchen_appliances",
      "Kitchen & Appliances",
      "Appliance operation and cabinetry",
      IconId::Utensils,
      &[
        "Stove & oven",
        "Dishwasher cycle",
        "Refrigerator",
        "Range hood & venting",
        "Cabinets & drawers",
      ],
    ),
    section(
      "safety",
      "Safety",
      "Detectors, railings, and lighting",
      IconId::Shield,
      &[
        "Smoke detectors",
        "CO detectors",
        "Radon results",
        "Handrail security",
        "Exterior lighting",
      ],
    ),
  ])
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn record() -> InspectionRecord {
    let ctx = SessionContext::solo(Uuid::new_v4());
    InspectionRecord::from_checklist(Uuid::new_v4(), &ctx)
  }

  fn rate(record: &mut InspectionRecord, category: &str, idx: usize, r: InspectionRating) {
    let category = record.categories.get_mut(category).unwrap();
    category.items[idx].evaluation = Some(r);
    category.items[idx].evaluated_at = Some(Utc::now());
    category.recount();
  }

  #[test]
  fn template_shape() {
    let record = record();
    assert_eq!(record.categories.len(), 8);
    let progress = record.overall_progress();
    assert_eq!(progress.total, 37);
    assert_eq!(progress.completed, 0);
    assert_eq!(progress.percentage, 0);

    // Item numbers are 1-based and sequential.
    let plumbing = &record.categories["plumbing"];
    let numbers: Vec<_> = plumbing.items.iter().map(|i| i.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
  }

  #[test]
  fn counts_partition_the_items() {
    let mut record = record();
    rate(&mut record, "plumbing", 0, InspectionRating::Good);
    rate(&mut record, "plumbing", 1, InspectionRating::Fix);
    rate(&mut record, "plumbing", 2, InspectionRating::Replace);
    rate(&mut record, "plumbing", 3, InspectionRating::Good);

    let c = &record.categories["plumbing"];
    assert_eq!(c.good_count, 2);
    assert_eq!(c.fix_count, 1);
    assert_eq!(c.replace_count, 1);
    assert_eq!(c.completed_count, 4);
    assert_eq!(
      c.good_count + c.fix_count + c.replace_count + c.not_rated_count(),
      c.items.len() as u32
    );

    // Re-rating moves the counts, never double-counts.
    rate(&mut record, "plumbing", 1, InspectionRating::Good);
    let c = &record.categories["plumbing"];
    assert_eq!(c.good_count, 3);
    assert_eq!(c.fix_count, 0);
    assert_eq!(c.completed_count, 4);
  }

  #[test]
  fn clearing_a_verdict_recounts() {
    let mut record = record();
    rate(&mut record, "safety", 0, InspectionRating::Replace);
    let category = record.categories.get_mut("safety").unwrap();
    category.items[0].evaluation = None;
    category.items[0].evaluated_at = None;
    category.recount();
    assert_eq!(category.completed_count, 0);
    assert_eq!(category.replace_count, 0);
  }

  #[test]
  fn progress_aggregates_categories() {
    let mut record = record();
    rate(&mut record, "electrical", 0, InspectionRating::Good);
    rate(&mut record, "hvac", 0, InspectionRating::Fix);
    rate(&mut record, "hvac", 1, InspectionRating::Fix);

    let progress = record.overall_progress();
    assert_eq!(progress.completed, 3);
    assert_eq!(progress.good_count, 1);
    assert_eq!(progress.fix_count, 2);
    assert_eq!(progress.replace_count, 0);
    // 3 of 37 → 8.1 → 8
    assert_eq!(progress.percentage, 8);
  }

  #[test]
  fn filter_projects_without_mutating() {
    let mut record = record();
    rate(&mut record, "interior", 0, InspectionRating::Fix);
    rate(&mut record, "interior", 1, InspectionRating::Good);

    let fixes = record.filtered(InspectionFilter::Fix);
    let interior = fixes.iter().find(|c| c.id == "interior").unwrap();
    assert_eq!(interior.items.len(), 1);
    assert_eq!(interior.items[0].description, "Walls & ceilings");
    // Counts on the projection still describe the whole category.
    assert_eq!(interior.completed_count, 2);

    let not_rated = record.filtered(InspectionFilter::NotRated);
    let interior = not_rated.iter().find(|c| c.id == "interior").unwrap();
    assert_eq!(interior.items.len(), 3);

    // The record itself is untouched.
    assert_eq!(record.categories["interior"].items.len(), 5);
  }

  #[test]
  fn snapshot_heals_stale_counts() {
    let mut record = record();
    let category = record.categories.get_mut("kitchen_appliances").unwrap();
    category.items[2].evaluation = Some(InspectionRating::Replace);
    // Deliberately skip recount.
    assert_eq!(record.categories["kitchen_appliances"].completed_count, 0);

    let snap = record.snapshot_for_save(Utc::now());
    assert_eq!(snap.categories["kitchen_appliances"].completed_count, 1);
    assert_eq!(snap.categories["kitchen_appliances"].replace_count, 1);
  }
}
