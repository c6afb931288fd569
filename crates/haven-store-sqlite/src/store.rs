//! [`SqliteStore`] — the SQLite implementation of [`HomeStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use haven_core::{
  evaluation::EvaluationRecord,
  home::{Home, HomeSummary, NewHome, OfferIntent},
  inspection::InspectionRecord,
  media::{EvaluationPhoto, EvaluationVoiceNote, NewPhoto, NewVoiceNote},
  session::SessionContext,
  store::HomeStore,
};

use crate::{
  Error, Result,
  encode::{
    RawEvaluation, RawHome, RawInspection, RawPhoto, RawVoiceNote,
    encode_categories, encode_dt, encode_notes, encode_offer_intent,
    encode_ratings, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

const HOME_COLUMNS: &str = "home_id, user_id, workspace_id, address, \
   neighborhood, price, bedrooms, bathrooms, year_built, property_taxes, \
   square_footage, favorite, compare_selected, evaluation_status, \
   overall_rating, offer_intent, primary_photo, created_at, updated_at";

const EVALUATION_COLUMNS: &str = "evaluation_id, home_id, user_id, \
   workspace_id, ratings, item_notes, section_notes, overall_rating, \
   user_overall_rating, completion_percentage, status, started_at, \
   completed_at, created_at, updated_at";

fn read_home(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawHome> {
  Ok(RawHome {
    home_id:           row.get(0)?,
    user_id:           row.get(1)?,
    workspace_id:      row.get(2)?,
    address:           row.get(3)?,
    neighborhood:      row.get(4)?,
    price:             row.get(5)?,
    bedrooms:          row.get(6)?,
    bathrooms:         row.get(7)?,
    year_built:        row.get(8)?,
    property_taxes:    row.get(9)?,
    square_footage:    row.get(10)?,
    favorite:          row.get(11)?,
    compare_selected:  row.get(12)?,
    evaluation_status: row.get(13)?,
    overall_rating:    row.get(14)?,
    offer_intent:      row.get(15)?,
    primary_photo:     row.get(16)?,
    created_at:        row.get(17)?,
    updated_at:        row.get(18)?,
  })
}

fn read_evaluation(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvaluation> {
  Ok(RawEvaluation {
    evaluation_id:         row.get(0)?,
    home_id:               row.get(1)?,
    user_id:               row.get(2)?,
    workspace_id:          row.get(3)?,
    ratings:               row.get(4)?,
    item_notes:            row.get(5)?,
    section_notes:         row.get(6)?,
    overall_rating:        row.get(7)?,
    user_overall_rating:   row.get(8)?,
    completion_percentage: row.get(9)?,
    status:                row.get(10)?,
    started_at:            row.get(11)?,
    completed_at:          row.get(12)?,
    created_at:            row.get(13)?,
    updated_at:            row.get(14)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Haven home store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── HomeStore impl ──────────────────────────────────────────────────────────

impl HomeStore for SqliteStore {
  type Error = Error;

  // ── Homes ─────────────────────────────────────────────────────────────────

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
      evaluation_status: Default::default(),
      overall_rating: 0.0,
      offer_intent: None,
      primary_photo: input.primary_photo,
      created_at: now,
      updated_at: now,
    };

    let home_id_str      = encode_uuid(home.home_id);
    let user_id_str      = encode_uuid(home.user_id);
    let workspace_id_str = encode_uuid(home.workspace_id);
    let address          = home.address.clone();
    let neighborhood     = home.neighborhood.clone();
    let price            = home.price;
    let bedrooms         = i64::from(home.bedrooms);
    let bathrooms        = f64::from(home.bathrooms);
    let year_built       = home.year_built.map(i64::from);
    let property_taxes   = home.property_taxes;
    let square_footage   = home.square_footage.map(i64::from);
    let status_str       = encode_status(home.evaluation_status).to_owned();
    let primary_photo    = home.primary_photo.clone();
    let at_str           = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO homes (
             home_id, user_id, workspace_id, address, neighborhood,
             price, bedrooms, bathrooms, year_built, property_taxes,
             square_footage, favorite, compare_selected, evaluation_status,
             overall_rating, offer_intent, primary_photo, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                     ?11, 0, 0, ?12, 0.0, NULL, ?13, ?14, ?14)",
          rusqlite::params![
            home_id_str,
            user_id_str,
            workspace_id_str,
            address,
            neighborhood,
            price,
            bedrooms,
            bathrooms,
            year_built,
            property_taxes,
            square_footage,
            status_str,
            primary_photo,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(home)
  }

  async fn get_home(&self, home_id: Uuid) -> Result<Option<Home>> {
    let id_str = encode_uuid(home_id);

    let raw: Option<RawHome> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {HOME_COLUMNS} FROM homes WHERE home_id = ?1"),
              rusqlite::params![id_str],
              read_home,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawHome::into_home).transpose()
  }

  async fn load_homes(&self, ctx: SessionContext) -> Result<Vec<Home>> {
    let workspace_str = encode_uuid(ctx.workspace_id);

    let raws: Vec<RawHome> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HOME_COLUMNS} FROM homes
           WHERE workspace_id = ?1
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![workspace_str], read_home)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHome::into_home).collect()
  }

  async fn update_home_summary(
    &self,
    home_id: Uuid,
    _ctx: SessionContext,
    summary: HomeSummary,
  ) -> Result<()> {
    let id_str     = encode_uuid(home_id);
    let status_str = encode_status(summary.evaluation_status).to_owned();
    let rating     = summary.overall_rating;
    let at_str     = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE homes
           SET evaluation_status = ?2, overall_rating = ?3, updated_at = ?4
           WHERE home_id = ?1",
          rusqlite::params![id_str, status_str, rating, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::HomeNotFound(home_id));
    }
    Ok(())
  }

  async fn set_offer_intent(
    &self,
    home_id: Uuid,
    _ctx: SessionContext,
    intent: Option<OfferIntent>,
  ) -> Result<()> {
    let id_str     = encode_uuid(home_id);
    let intent_str = intent.map(encode_offer_intent).map(str::to_owned);
    let at_str     = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE homes SET offer_intent = ?2, updated_at = ?3 WHERE home_id = ?1",
          rusqlite::params![id_str, intent_str, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::HomeNotFound(home_id));
    }
    Ok(())
  }

  async fn delete_home(&self, home_id: Uuid, _ctx: SessionContext) -> Result<()> {
    let id_str = encode_uuid(home_id);

    // Evaluations, inspections, and media cascade.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM homes WHERE home_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Evaluations ───────────────────────────────────────────────────────────

  async fn load_evaluation(
    &self,
    home_id: Uuid,
    ctx: SessionContext,
  ) -> Result<Option<EvaluationRecord>> {
    let home_str = encode_uuid(home_id);
    let user_str = encode_uuid(ctx.user_id);

    let raw: Option<RawEvaluation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {EVALUATION_COLUMNS} FROM evaluations
                 WHERE home_id = ?1 AND user_id = ?2"
              ),
              rusqlite::params![home_str, user_str],
              read_evaluation,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvaluation::into_record).transpose()
  }

  async fn save_evaluation(
    &self,
    record: EvaluationRecord,
  ) -> Result<EvaluationRecord> {
    let evaluation_id_str = encode_uuid(record.evaluation_id);
    let home_id_str       = encode_uuid(record.home_id);
    let user_id_str       = encode_uuid(record.user_id);
    let workspace_id_str  = encode_uuid(record.workspace_id);
    let ratings_str       = encode_ratings(&record.ratings)?;
    let item_notes_str    = encode_notes(&record.item_notes)?;
    let section_notes_str = encode_notes(&record.section_notes)?;
    let overall_rating    = record.overall_rating;
    let user_rating       = record.user_overall_rating.map(i64::from);
    let completion        = i64::from(record.completion_percentage);
    let status_str        = encode_status(record.status).to_owned();
    let started_str       = record.started_at.map(encode_dt);
    let completed_str     = record.completed_at.map(encode_dt);
    let created_str       = encode_dt(record.created_at);
    let updated_str       = encode_dt(record.updated_at);

    // Last write wins: on conflict the whole payload is replaced, but the
    // original row identity and created_at survive.
    let raw: RawEvaluation = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO evaluations (
             evaluation_id, home_id, user_id, workspace_id, ratings,
             item_notes, section_notes, overall_rating, user_overall_rating,
             completion_percentage, status, started_at, completed_at,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
           ON CONFLICT (home_id, user_id) DO UPDATE SET
             workspace_id          = excluded.workspace_id,
             ratings               = excluded.ratings,
             item_notes            = excluded.item_notes,
             section_notes         = excluded.section_notes,
             overall_rating        = excluded.overall_rating,
             user_overall_rating   = excluded.user_overall_rating,
             completion_percentage = excluded.completion_percentage,
             status                = excluded.status,
             started_at            = excluded.started_at,
             completed_at          = excluded.completed_at,
             updated_at            = excluded.updated_at",
          rusqlite::params![
            evaluation_id_str,
            home_id_str,
            user_id_str,
            workspace_id_str,
            ratings_str,
            item_notes_str,
            section_notes_str,
            overall_rating,
            user_rating,
            completion,
            status_str,
            started_str,
            completed_str,
            created_str,
            updated_str,
          ],
        )?;

        Ok(conn.query_row(
          &format!(
            "SELECT {EVALUATION_COLUMNS} FROM evaluations
             WHERE home_id = ?1 AND user_id = ?2"
          ),
          rusqlite::params![home_id_str, user_id_str],
          read_evaluation,
        )?)
      })
      .await?;

    raw.into_record()
  }

  // ── Inspections ───────────────────────────────────────────────────────────

  async fn load_inspection(
    &self,
    home_id: Uuid,
    ctx: SessionContext,
  ) -> Result<Option<InspectionRecord>> {
    let home_str = encode_uuid(home_id);
    let user_str = encode_uuid(ctx.user_id);

    let raw: Option<RawInspection> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT inspection_id, home_id, user_id, workspace_id,
                      categories, created_at, updated_at
               FROM inspections WHERE home_id = ?1 AND user_id = ?2",
              rusqlite::params![home_str, user_str],
              |row| {
                Ok(RawInspection {
                  inspection_id: row.get(0)?,
                  home_id:       row.get(1)?,
                  user_id:       row.get(2)?,
                  workspace_id:  row.get(3)?,
                  categories:    row.get(4)?,
                  created_at:    row.get(5)?,
                  updated_at:    row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    // Stored counts could be stale if written by an older build; rebuild
    // them from the items on the way out.
    let mut record = match raw.map(RawInspection::into_record).transpose()? {
      Some(r) => r,
      None => return Ok(None),
    };
    record.recount_all();
    Ok(Some(record))
  }

  async fn save_inspection(
    &self,
    record: InspectionRecord,
  ) -> Result<InspectionRecord> {
    let inspection_id_str = encode_uuid(record.inspection_id);
    let home_id_str       = encode_uuid(record.home_id);
    let user_id_str       = encode_uuid(record.user_id);
    let workspace_id_str  = encode_uuid(record.workspace_id);
    let categories_str    = encode_categories(&record.categories)?;
    let created_str       = encode_dt(record.created_at);
    let updated_str       = encode_dt(record.updated_at);

    let raw: RawInspection = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO inspections (
             inspection_id, home_id, user_id, workspace_id,
             categories, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (home_id, user_id) DO UPDATE SET
             workspace_id = excluded.workspace_id,
             categories   = excluded.categories,
             updated_at   = excluded.updated_at",
          rusqlite::params![
            inspection_id_str,
            home_id_str,
            user_id_str,
            workspace_id_str,
            categories_str,
            created_str,
            updated_str,
          ],
        )?;

        Ok(conn.query_row(
          "SELECT inspection_id, home_id, user_id, workspace_id,
                  categories, created_at, updated_at
           FROM inspections WHERE home_id = ?1 AND user_id = ?2",
          rusqlite::params![home_id_str, user_id_str],
          |row| {
            Ok(RawInspection {
              inspection_id: row.get(0)?,
              home_id:       row.get(1)?,
              user_id:       row.get(2)?,
              workspace_id:  row.get(3)?,
              categories:    row.get(4)?,
              created_at:    row.get(5)?,
              updated_at:    row.get(6)?,
            })
          },
        )?)
      })
      .await?;

    raw.into_record()
  }

  // ── Media ─────────────────────────────────────────────────────────────────

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

    let photo_id_str      = encode_uuid(photo.photo_id);
    let evaluation_id_str = encode_uuid(photo.evaluation_id);
    let category_id       = photo.category_id.clone();
    let storage_path      = photo.storage_path.clone();
    let thumbnail_path    = photo.thumbnail_path.clone();
    let caption           = photo.caption.clone();
    let file_size         = photo.file_size as i64;
    let mime_type         = photo.mime_type.clone();
    let width             = photo.width.map(i64::from);
    let height            = photo.height.map(i64::from);
    let at_str            = encode_dt(photo.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO photos (
             photo_id, evaluation_id, category_id, storage_path,
             thumbnail_path, caption, file_size, mime_type,
             width, height, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            photo_id_str,
            evaluation_id_str,
            category_id,
            storage_path,
            thumbnail_path,
            caption,
            file_size,
            mime_type,
            width,
            height,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(photo)
  }

  async fn list_photos(
    &self,
    evaluation_id: Uuid,
    category_id: String,
  ) -> Result<Vec<EvaluationPhoto>> {
    let evaluation_str = encode_uuid(evaluation_id);

    let raws: Vec<RawPhoto> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT photo_id, evaluation_id, category_id, storage_path,
                  thumbnail_path, caption, file_size, mime_type,
                  width, height, created_at
           FROM photos
           WHERE evaluation_id = ?1 AND category_id = ?2
           ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![evaluation_str, category_id], |row| {
            Ok(RawPhoto {
              photo_id:       row.get(0)?,
              evaluation_id:  row.get(1)?,
              category_id:    row.get(2)?,
              storage_path:   row.get(3)?,
              thumbnail_path: row.get(4)?,
              caption:        row.get(5)?,
              file_size:      row.get(6)?,
              mime_type:      row.get(7)?,
              width:          row.get(8)?,
              height:         row.get(9)?,
              created_at:     row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPhoto::into_photo).collect()
  }

  async fn delete_photo(&self, photo_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(photo_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM photos WHERE photo_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_voice_note(
    &self,
    input: NewVoiceNote,
  ) -> Result<EvaluationVoiceNote> {
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

    let note_id_str       = encode_uuid(note.voice_note_id);
    let evaluation_id_str = encode_uuid(note.evaluation_id);
    let category_id       = note.category_id.clone();
    let storage_path      = note.storage_path.clone();
    let duration          = i64::from(note.duration_secs);
    let file_size         = note.file_size as i64;
    let transcript        = note.transcript.clone();
    let at_str            = encode_dt(note.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO voice_notes (
             voice_note_id, evaluation_id, category_id, storage_path,
             duration_secs, file_size, transcript, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            note_id_str,
            evaluation_id_str,
            category_id,
            storage_path,
            duration,
            file_size,
            transcript,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(note)
  }

  async fn list_voice_notes(
    &self,
    evaluation_id: Uuid,
    category_id: String,
  ) -> Result<Vec<EvaluationVoiceNote>> {
    let evaluation_str = encode_uuid(evaluation_id);

    let raws: Vec<RawVoiceNote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT voice_note_id, evaluation_id, category_id, storage_path,
                  duration_secs, file_size, transcript, created_at
           FROM voice_notes
           WHERE evaluation_id = ?1 AND category_id = ?2
           ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![evaluation_str, category_id], |row| {
            Ok(RawVoiceNote {
              voice_note_id: row.get(0)?,
              evaluation_id: row.get(1)?,
              category_id:   row.get(2)?,
              storage_path:  row.get(3)?,
              duration_secs: row.get(4)?,
              file_size:     row.get(5)?,
              transcript:    row.get(6)?,
              created_at:    row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVoiceNote::into_voice_note).collect()
  }

  async fn delete_voice_note(&self, voice_note_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(voice_note_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM voice_notes WHERE voice_note_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
