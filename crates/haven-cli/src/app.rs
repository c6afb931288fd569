//! Subcommand implementations over the SQLite store.

use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use haven_core::{
  compare::Comparison,
  home::{Home, NewHome, OfferIntent},
  inspection::{InspectionFilter, InspectionRating},
  rubric::{AnswerKind, AnswerValue, RubricItem, RubricSchema},
  session::{EvaluationSession, InspectionSession, SessionContext},
  store::HomeStore,
};
use haven_store_sqlite::SqliteStore;

use crate::Command;

pub async fn run(
  store: Arc<SqliteStore>,
  ctx: SessionContext,
  command: Command,
) -> Result<()> {
  match command {
    Command::AddHome {
      address,
      neighborhood,
      price,
      bedrooms,
      bathrooms,
      year_built,
      property_taxes,
      square_footage,
    } => {
      let home = store
        .add_home(ctx, NewHome {
          address,
          neighborhood,
          price,
          bedrooms,
          bathrooms,
          year_built,
          property_taxes,
          square_footage,
          primary_photo: None,
        })
        .await?;
      println!("saved {} ({})", home.address, home.home_id);
    }

    Command::Homes => {
      let homes = store.load_homes(ctx).await?;
      if homes.is_empty() {
        println!("no homes saved yet");
        return Ok(());
      }
      for home in homes {
        let rating = if home.overall_rating > 0.0 {
          format!("{:.1}/5.0", home.overall_rating)
        } else {
          "—".to_owned()
        };
        let offer = home
          .offer_intent
          .map(|i| format!("  offer: {i}"))
          .unwrap_or_default();
        println!(
          "{}  ${:.0}  {}bd/{}ba  [{}]  {rating}{offer}",
          home.address, home.price, home.bedrooms, home.bathrooms,
          home.evaluation_status,
        );
      }
    }

    Command::Rate {
      home,
      category,
      item,
      value,
    } => {
      let home = find_home(&store, ctx, &home).await?;
      let session =
        EvaluationSession::open(Arc::clone(&store), ctx, home.home_id).await?;
      let rubric_item = session
        .schema()
        .item(&category, &item)
        .with_context(|| format!("no item {category}/{item}"))?;
      let value = parse_answer(rubric_item, &value)?;
      session.set_item_rating(&category, &item, value)?;
      session.commit().await?;
      let record = session.record();
      println!(
        "{}: {}% complete, rating {:.1}",
        home.address, record.completion_percentage, record.overall_rating,
      );
    }

    Command::Note {
      home,
      category,
      item,
      text,
    } => {
      let home = find_home(&store, ctx, &home).await?;
      let session =
        EvaluationSession::open(Arc::clone(&store), ctx, home.home_id).await?;
      session.set_item_note(&category, &item, &text)?;
      session.commit().await?;
      println!("noted");
    }

    Command::SectionNote {
      home,
      category,
      text,
    } => {
      let home = find_home(&store, ctx, &home).await?;
      let session =
        EvaluationSession::open(Arc::clone(&store), ctx, home.home_id).await?;
      session.set_section_note(&category, &text)?;
      session.commit().await?;
      println!("noted");
    }

    Command::Stars { home, stars } => {
      let home = find_home(&store, ctx, &home).await?;
      let session =
        EvaluationSession::open(Arc::clone(&store), ctx, home.home_id).await?;
      session.set_user_overall_rating(stars)?;
      session.commit().await?;
      println!("{}: {stars}★", home.address);
    }

    Command::Offer { home, intent } => {
      let home = find_home(&store, ctx, &home).await?;
      let intent = match intent.as_str() {
        "clear" => None,
        other => Some(
          other
            .parse::<OfferIntent>()
            .map_err(|e| anyhow::anyhow!(e))?,
        ),
      };
      store.set_offer_intent(home.home_id, ctx, intent).await?;
      match intent {
        Some(i) => println!("{}: offer {i}", home.address),
        None => println!("{}: offer cleared", home.address),
      }
    }

    Command::Complete { home } => {
      let home = find_home(&store, ctx, &home).await?;
      let session =
        EvaluationSession::open(Arc::clone(&store), ctx, home.home_id).await?;
      session.complete().await?;
      let record = session.record();
      println!(
        "{} completed with rating {:.1}/5.0",
        home.address, record.overall_rating,
      );
    }

    Command::Inspect { home, filter } => {
      let home = find_home(&store, ctx, &home).await?;
      let filter = parse_filter(&filter)?;
      let session =
        InspectionSession::open(Arc::clone(&store), ctx, home.home_id).await?;
      let progress = session.progress();
      println!(
        "{}: {}/{} ({}%)  good {}  fix {}  replace {}",
        home.address,
        progress.completed,
        progress.total,
        progress.percentage,
        progress.good_count,
        progress.fix_count,
        progress.replace_count,
      );
      for category in session.filtered(filter) {
        if category.items.is_empty() && filter != InspectionFilter::All {
          continue;
        }
        println!("\n{} ({}/{})", category.name, category.completed_count, category.items.len());
        for item in &category.items {
          let verdict = item
            .evaluation
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_owned());
          println!("  {:>2}. [{verdict}] {}", item.number, item.description);
          if !item.notes.is_empty() {
            println!("      note: {}", item.notes);
          }
        }
      }
    }

    Command::InspectRate {
      home,
      category,
      item,
      verdict,
    } => {
      let home = find_home(&store, ctx, &home).await?;
      let session =
        InspectionSession::open(Arc::clone(&store), ctx, home.home_id).await?;
      let rating = match verdict.as_str() {
        "clear" => None,
        other => Some(
          other
            .parse::<InspectionRating>()
            .map_err(|e| anyhow::anyhow!(e))?,
        ),
      };
      session.set_item_rating(&category, &item, rating)?;
      session.commit().await?;
      let progress = session.progress();
      println!(
        "{}: {}/{} inspected ({}%)",
        home.address, progress.completed, progress.total, progress.percentage,
      );
    }

    Command::Compare { homes } => {
      if homes.len() < 2 {
        bail!("compare needs at least two homes");
      }
      let mut ids = Vec::with_capacity(homes.len());
      for query in &homes {
        ids.push(find_home(&store, ctx, query).await?.home_id);
      }
      let comparison = Comparison::build(store.as_ref(), ctx, &ids).await?;
      print_comparison(&comparison);
    }

    Command::DeleteHome { home } => {
      let home = find_home(&store, ctx, &home).await?;
      store.delete_home(home.home_id, ctx).await?;
      println!("deleted {}", home.address);
    }
  }

  Ok(())
}

/// Resolve a home by case-insensitive address substring.
async fn find_home(
  store: &SqliteStore,
  ctx: SessionContext,
  query: &str,
) -> Result<Home> {
  let needle = query.to_lowercase();
  let matches: Vec<Home> = store
    .load_homes(ctx)
    .await?
    .into_iter()
    .filter(|h| h.address.to_lowercase().contains(&needle))
    .collect();
  match matches.len() {
    0 => bail!("no home matching {query:?}"),
    1 => Ok(matches.into_iter().next().expect("one match")),
    n => {
      let addresses: Vec<_> = matches.iter().map(|h| h.address.as_str()).collect();
      bail!("{n} homes match {query:?}: {}", addresses.join(", "))
    }
  }
}

/// Parse a command-line value according to the item's answer kind.
fn parse_answer(item: &RubricItem, raw: &str) -> Result<AnswerValue> {
  let value = match item.kind {
    AnswerKind::Rating => AnswerValue::Rating(
      raw.parse().map_err(|e: String| anyhow::anyhow!(e))?,
    ),
    AnswerKind::NumericStar | AnswerKind::Currency => AnswerValue::Number(
      raw
        .parse::<f64>()
        .with_context(|| format!("{raw:?} is not a number"))?,
    ),
    AnswerKind::Boolean => AnswerValue::Flag(parse_flag(raw)?),
    AnswerKind::BooleanWithText => match parse_flag(raw) {
      Ok(flag) => AnswerValue::Flag(flag),
      Err(_) => AnswerValue::Text(raw.to_owned()),
    },
    AnswerKind::FreeText | AnswerKind::Dropdown => AnswerValue::Text(raw.to_owned()),
  };
  Ok(value)
}

fn parse_flag(raw: &str) -> Result<bool> {
  match raw {
    "yes" | "true" | "on" => Ok(true),
    "no" | "false" | "off" => Ok(false),
    other => bail!("expected yes or no, got {other:?}"),
  }
}

fn parse_filter(raw: &str) -> Result<InspectionFilter> {
  Ok(match raw {
    "all" => InspectionFilter::All,
    "good" => InspectionFilter::Good,
    "fix" => InspectionFilter::Fix,
    "replace" => InspectionFilter::Replace,
    "not-rated" => InspectionFilter::NotRated,
    other => bail!("unknown filter {other:?}"),
  })
}

fn print_comparison(comparison: &Comparison) {
  const LABEL_WIDTH: usize = 38;
  const CELL_WIDTH: usize = 18;

  let schema = RubricSchema::standard();

  print!("{:LABEL_WIDTH$}", "");
  for column in &comparison.columns {
    print!("{:<CELL_WIDTH$}", truncate(&column.home.address, CELL_WIDTH - 2));
  }
  println!();

  print!("{:<LABEL_WIDTH$}", "Price");
  for column in &comparison.columns {
    print!(
      "{:<CELL_WIDTH$}",
      haven_core::compare::format_money(column.home.price)
    );
  }
  println!();

  print!("{:<LABEL_WIDTH$}", "Overall rating");
  for column in &comparison.columns {
    let cell = if column.home.overall_rating > 0.0 {
      format!("{:.1}/5.0", column.home.overall_rating)
    } else {
      "—".to_owned()
    };
    print!("{cell:<CELL_WIDTH$}");
  }
  println!();

  for category in &schema.categories {
    println!("\n── {} ──", category.title);
    for item in &category.items {
      // Skip rows no column has answered.
      let answered = comparison.columns.iter().any(|c| {
        c.evaluation
          .as_ref()
          .and_then(|e| e.answer(&category.id, &item.id))
          .is_some()
      });
      if !answered {
        continue;
      }
      print!("{:<LABEL_WIDTH$}", truncate(&item.label, LABEL_WIDTH - 2));
      for column in &comparison.columns {
        let cell = column.cell(&category.id, item).to_string();
        print!("{:<CELL_WIDTH$}", truncate(&cell, CELL_WIDTH - 2));
      }
      println!();
    }
  }
}

fn truncate(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_owned()
  } else {
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
  }
}
