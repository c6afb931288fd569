//! Integration tests for `SqliteStore` against an in-memory database.

use haven_core::{
  evaluation::{EvaluationRecord, EvaluationStatus},
  home::{HomeSummary, NewHome, OfferIntent},
  inspection::{InspectionRating, InspectionRecord},
  media::{NewPhoto, NewVoiceNote},
  rubric::{AnswerValue, QualitativeRating},
  session::SessionContext,
  store::HomeStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ctx() -> SessionContext { SessionContext::solo(Uuid::new_v4()) }

fn new_home(address: &str) -> NewHome {
  NewHome {
    address:        address.to_owned(),
    neighborhood:   Some("Riverdale".to_owned()),
    price:          725_000.0,
    bedrooms:       4,
    bathrooms:      2.5,
    year_built:     Some(2004),
    property_taxes: Some(5100.0),
    square_footage: Some(2100),
    primary_photo:  None,
  }
}

fn evaluation(home_id: Uuid, ctx: &SessionContext) -> EvaluationRecord {
  let mut record = EvaluationRecord::new(home_id, ctx);
  record
    .ratings
    .entry("exteriors".to_owned())
    .or_default()
    .insert(
      "curb_appeal".to_owned(),
      AnswerValue::Rating(QualitativeRating::Good),
    );
  record
    .item_notes
    .insert("exteriors/curb_appeal".to_owned(), "fresh paint".to_owned());
  record.overall_rating = 5.0;
  record.completion_percentage = 2;
  record.status = EvaluationStatus::InProgress;
  record
}

// ─── Homes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_home() {
  let s = store().await;
  let ctx = ctx();

  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();
  assert_eq!(home.address, "12 Elm St");
  assert_eq!(home.evaluation_status, EvaluationStatus::NotStarted);
  assert_eq!(home.overall_rating, 0.0);

  let fetched = s.get_home(home.home_id).await.unwrap().unwrap();
  assert_eq!(fetched, home);
}

#[tokio::test]
async fn get_home_missing_returns_none() {
  let s = store().await;
  assert!(s.get_home(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn load_homes_is_scoped_to_the_workspace() {
  let s = store().await;
  let ours = ctx();
  let theirs = ctx();

  s.add_home(ours, new_home("1 First")).await.unwrap();
  s.add_home(ours, new_home("2 Second")).await.unwrap();
  s.add_home(theirs, new_home("3 Third")).await.unwrap();

  let homes = s.load_homes(ours).await.unwrap();
  assert_eq!(homes.len(), 2);
  assert!(homes.iter().all(|h| h.workspace_id == ours.workspace_id));
}

#[tokio::test]
async fn summary_and_offer_intent_update_the_home() {
  let s = store().await;
  let ctx = ctx();
  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();

  s.update_home_summary(home.home_id, ctx, HomeSummary {
    evaluation_status: EvaluationStatus::InProgress,
    overall_rating:    3.7,
  })
  .await
  .unwrap();
  s.set_offer_intent(home.home_id, ctx, Some(OfferIntent::Yes))
    .await
    .unwrap();

  let fetched = s.get_home(home.home_id).await.unwrap().unwrap();
  assert_eq!(fetched.evaluation_status, EvaluationStatus::InProgress);
  assert_eq!(fetched.overall_rating, 3.7);
  assert_eq!(fetched.offer_intent, Some(OfferIntent::Yes));

  s.set_offer_intent(home.home_id, ctx, None).await.unwrap();
  let fetched = s.get_home(home.home_id).await.unwrap().unwrap();
  assert_eq!(fetched.offer_intent, None);
}

#[tokio::test]
async fn updating_a_missing_home_errors() {
  let s = store().await;
  let err = s
    .update_home_summary(Uuid::new_v4(), ctx(), HomeSummary {
      evaluation_status: EvaluationStatus::InProgress,
      overall_rating:    1.0,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::HomeNotFound(_)));

  let err = s
    .set_offer_intent(Uuid::new_v4(), ctx(), Some(OfferIntent::No))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::HomeNotFound(_)));
}

// ─── Evaluations ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_evaluation_missing_returns_none() {
  let s = store().await;
  let ctx = ctx();
  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();
  assert!(s.load_evaluation(home.home_id, ctx).await.unwrap().is_none());
}

#[tokio::test]
async fn save_and_load_evaluation_round_trips() {
  let s = store().await;
  let ctx = ctx();
  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();

  let record = evaluation(home.home_id, &ctx);
  let saved = s.save_evaluation(record.clone()).await.unwrap();
  assert_eq!(saved, record);

  let loaded = s.load_evaluation(home.home_id, ctx).await.unwrap().unwrap();
  assert_eq!(loaded, record);
  assert_eq!(
    loaded.answer("exteriors", "curb_appeal"),
    Some(&AnswerValue::Rating(QualitativeRating::Good))
  );
}

#[tokio::test]
async fn resave_preserves_row_identity_and_created_at() {
  let s = store().await;
  let ctx = ctx();
  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();

  let first = s
    .save_evaluation(evaluation(home.home_id, &ctx))
    .await
    .unwrap();

  // A second session starts from scratch with a fresh id; the upsert
  // keeps the original row.
  let second = s
    .save_evaluation(evaluation(home.home_id, &ctx))
    .await
    .unwrap();
  assert_eq!(second.evaluation_id, first.evaluation_id);
  assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn resave_fully_replaces_the_payload() {
  let s = store().await;
  let ctx = ctx();
  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();

  s.save_evaluation(evaluation(home.home_id, &ctx))
    .await
    .unwrap();

  // The replacement drops the exteriors answer and rates the kitchen.
  let mut replacement = EvaluationRecord::new(home.home_id, &ctx);
  replacement
    .ratings
    .entry("kitchen".to_owned())
    .or_default()
    .insert(
      "pantry".to_owned(),
      AnswerValue::Rating(QualitativeRating::Fair),
    );
  replacement.user_overall_rating = Some(3);
  s.save_evaluation(replacement).await.unwrap();

  let loaded = s.load_evaluation(home.home_id, ctx).await.unwrap().unwrap();
  assert!(loaded.answer("exteriors", "curb_appeal").is_none());
  assert!(loaded.answer("kitchen", "pantry").is_some());
  assert!(loaded.item_notes.is_empty());
  assert_eq!(loaded.user_overall_rating, Some(3));
}

#[tokio::test]
async fn idempotent_resave_loads_identically() {
  let s = store().await;
  let ctx = ctx();
  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();

  let saved = s
    .save_evaluation(evaluation(home.home_id, &ctx))
    .await
    .unwrap();
  let first = s.load_evaluation(home.home_id, ctx).await.unwrap().unwrap();
  s.save_evaluation(saved).await.unwrap();
  let second = s.load_evaluation(home.home_id, ctx).await.unwrap().unwrap();
  assert_eq!(first, second);
}

#[tokio::test]
async fn evaluations_are_per_user() {
  let s = store().await;
  let workspace = Uuid::new_v4();
  let alice = SessionContext::new(Uuid::new_v4(), workspace);
  let bob = SessionContext::new(Uuid::new_v4(), workspace);
  let home = s.add_home(alice, new_home("12 Elm St")).await.unwrap();

  s.save_evaluation(evaluation(home.home_id, &alice))
    .await
    .unwrap();

  assert!(s.load_evaluation(home.home_id, bob).await.unwrap().is_none());

  let mut bobs = EvaluationRecord::new(home.home_id, &bob);
  bobs
    .ratings
    .entry("exteriors".to_owned())
    .or_default()
    .insert(
      "curb_appeal".to_owned(),
      AnswerValue::Rating(QualitativeRating::Poor),
    );
  s.save_evaluation(bobs).await.unwrap();

  let alices = s.load_evaluation(home.home_id, alice).await.unwrap().unwrap();
  assert_eq!(
    alices.answer("exteriors", "curb_appeal"),
    Some(&AnswerValue::Rating(QualitativeRating::Good))
  );
}

// ─── Inspections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_and_load_inspection_round_trips() {
  let s = store().await;
  let ctx = ctx();
  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();

  let mut record = InspectionRecord::from_checklist(home.home_id, &ctx);
  {
    let plumbing = record.categories.get_mut("plumbing").unwrap();
    plumbing.items[0].evaluation = Some(InspectionRating::Fix);
    plumbing.items[0].notes = "low pressure".to_owned();
    plumbing.recount();
  }
  let saved = s.save_inspection(record.clone()).await.unwrap();
  assert_eq!(saved.inspection_id, record.inspection_id);

  let loaded = s.load_inspection(home.home_id, ctx).await.unwrap().unwrap();
  assert_eq!(loaded.categories["plumbing"].fix_count, 1);
  assert_eq!(loaded.categories["plumbing"].items[0].notes, "low pressure");
}

#[tokio::test]
async fn load_inspection_heals_stale_counts() {
  let s = store().await;
  let ctx = ctx();
  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();

  // Rate an item but skip the recount before saving.
  let mut record = InspectionRecord::from_checklist(home.home_id, &ctx);
  record.categories.get_mut("safety").unwrap().items[0].evaluation =
    Some(InspectionRating::Replace);
  s.save_inspection(record).await.unwrap();

  let loaded = s.load_inspection(home.home_id, ctx).await.unwrap().unwrap();
  assert_eq!(loaded.categories["safety"].replace_count, 1);
  assert_eq!(loaded.categories["safety"].completed_count, 1);
}

#[tokio::test]
async fn inspection_resave_preserves_row_identity() {
  let s = store().await;
  let ctx = ctx();
  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();

  let first = s
    .save_inspection(InspectionRecord::from_checklist(home.home_id, &ctx))
    .await
    .unwrap();
  let second = s
    .save_inspection(InspectionRecord::from_checklist(home.home_id, &ctx))
    .await
    .unwrap();
  assert_eq!(second.inspection_id, first.inspection_id);
  assert_eq!(second.created_at, first.created_at);
}

// ─── Media ───────────────────────────────────────────────────────────────────

async fn saved_evaluation(s: &SqliteStore, ctx: SessionContext) -> EvaluationRecord {
  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();
  s.save_evaluation(evaluation(home.home_id, &ctx))
    .await
    .unwrap()
}

#[tokio::test]
async fn photos_round_trip_and_scope_by_section() {
  let s = store().await;
  let ctx = ctx();
  let eval = saved_evaluation(&s, ctx).await;

  let photo = s
    .add_photo(NewPhoto {
      evaluation_id:  eval.evaluation_id,
      category_id:    "kitchen".to_owned(),
      storage_path:   "photos/a.jpg".to_owned(),
      thumbnail_path: "thumbs/a.jpg".to_owned(),
      caption:        Some("counters".to_owned()),
      file_size:      2048,
      mime_type:      "image/jpeg".to_owned(),
      width:          Some(800),
      height:         Some(600),
    })
    .await
    .unwrap();
  s.add_photo(NewPhoto {
    evaluation_id:  eval.evaluation_id,
    category_id:    "exteriors".to_owned(),
    storage_path:   "photos/b.jpg".to_owned(),
    thumbnail_path: "thumbs/b.jpg".to_owned(),
    caption:        None,
    file_size:      1024,
    mime_type:      "image/jpeg".to_owned(),
    width:          None,
    height:         None,
  })
  .await
  .unwrap();

  let kitchen = s
    .list_photos(eval.evaluation_id, "kitchen".to_owned())
    .await
    .unwrap();
  assert_eq!(kitchen.len(), 1);
  assert_eq!(kitchen[0], photo);

  s.delete_photo(photo.photo_id).await.unwrap();
  let kitchen = s
    .list_photos(eval.evaluation_id, "kitchen".to_owned())
    .await
    .unwrap();
  assert!(kitchen.is_empty());
}

#[tokio::test]
async fn voice_notes_round_trip() {
  let s = store().await;
  let ctx = ctx();
  let eval = saved_evaluation(&s, ctx).await;

  let note = s
    .add_voice_note(NewVoiceNote {
      evaluation_id: eval.evaluation_id,
      category_id:   "exteriors".to_owned(),
      storage_path:  "voice/1.ogg".to_owned(),
      duration_secs: 31,
      file_size:     40_000,
      transcript:    Some("gutters need clearing".to_owned()),
    })
    .await
    .unwrap();

  let notes = s
    .list_voice_notes(eval.evaluation_id, "exteriors".to_owned())
    .await
    .unwrap();
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0], note);

  s.delete_voice_note(note.voice_note_id).await.unwrap();
  let notes = s
    .list_voice_notes(eval.evaluation_id, "exteriors".to_owned())
    .await
    .unwrap();
  assert!(notes.is_empty());
}

// ─── Cascade ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_a_home_cascades() {
  let s = store().await;
  let ctx = ctx();
  let home = s.add_home(ctx, new_home("12 Elm St")).await.unwrap();
  let eval = s
    .save_evaluation(evaluation(home.home_id, &ctx))
    .await
    .unwrap();
  s.save_inspection(InspectionRecord::from_checklist(home.home_id, &ctx))
    .await
    .unwrap();
  s.add_photo(NewPhoto {
    evaluation_id:  eval.evaluation_id,
    category_id:    "kitchen".to_owned(),
    storage_path:   "photos/a.jpg".to_owned(),
    thumbnail_path: "thumbs/a.jpg".to_owned(),
    caption:        None,
    file_size:      100,
    mime_type:      "image/jpeg".to_owned(),
    width:          None,
    height:         None,
  })
  .await
  .unwrap();

  s.delete_home(home.home_id, ctx).await.unwrap();

  assert!(s.get_home(home.home_id).await.unwrap().is_none());
  assert!(s.load_evaluation(home.home_id, ctx).await.unwrap().is_none());
  assert!(s.load_inspection(home.home_id, ctx).await.unwrap().is_none());
  assert!(
    s.list_photos(eval.evaluation_id, "kitchen".to_owned())
      .await
      .unwrap()
      .is_empty()
  );
}
