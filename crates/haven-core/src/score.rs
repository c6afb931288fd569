//! Pure scoring functions over a ratings map.
//!
//! Both functions are total: any combination of schema and map (including
//! answers for items the schema no longer knows about) produces a value
//! rather than an error.

use crate::rubric::{AnswerValue, RatingsMap, RubricSchema};

/// Aggregate qualitative answers into a 0.0–5.0 overall rating, rounded to
/// one decimal place.
///
/// Only [`AnswerValue::Rating`] answers participate; checkboxes, dollar
/// amounts, and free text carry no point value. With no qualitative
/// answers at all the result is `0.0`, which doubles as the "not yet
/// rated" sentinel downstream. A home rated all-poor also scores well
/// above zero (poor is worth 1 of 5 points), so the sentinel never
/// collides with a real score.
pub fn overall_rating(ratings: &RatingsMap) -> f64 {
  let mut points = 0u32;
  let mut count = 0u32;
  for items in ratings.values() {
    for value in items.values() {
      if let AnswerValue::Rating(r) = value {
        points += r.points();
        count += 1;
      }
    }
  }
  if count == 0 {
    return 0.0;
  }
  let avg = f64::from(points) / f64::from(count * 5);
  (avg * 5.0 * 10.0).round() / 10.0
}

/// Percentage of schema items that have a committed answer, rounded to the
/// nearest whole number.
///
/// The denominator is every item in the schema regardless of kind. Map
/// entries for items the schema doesn't declare are ignored, so schema
/// evolution can only lower a stored percentage, never push it past 100.
pub fn completion_percentage(schema: &RubricSchema, ratings: &RatingsMap) -> u8 {
  let total = schema.total_items();
  if total == 0 {
    return 0;
  }
  let answered = schema
    .categories
    .iter()
    .filter_map(|c| ratings.get(&c.id).map(|items| (c, items)))
    .map(|(c, items)| {
      c.items
        .iter()
        .filter(|i| items.get(&i.id).is_some_and(AnswerValue::is_answered))
        .count()
    })
    .sum::<usize>();
  ((answered as f64 / total as f64) * 100.0).round() as u8
}
