//! WASM bindings for chore-engine.
//!
//! Exposes the occurrence predicate and windowed expansion to a browser UI via
//! `wasm-bindgen`. Chores cross the boundary as JSON strings in their storage
//! shape (`{id, title, notes, startDate, recurrence, createdAt}`), dates as
//! `YYYY-MM-DD` strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p chore-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/wasm/ \
//!   target/wasm32-unknown-unknown/release/chore_engine_wasm.wasm
//! ```

use chore_engine::date::{format_date, parse_date};
use chore_engine::expander::{expand_window, DateWindow, Occurrence};
use chore_engine::chore::decode_chores;
use chore_engine::Chore;
use chrono::NaiveDate;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OccurrenceDto<'a> {
    chore_id: &'a str,
    title: &'a str,
    date: String,
}

impl<'a> From<&Occurrence<'a>> for OccurrenceDto<'a> {
    fn from(occ: &Occurrence<'a>) -> Self {
        Self {
            chore_id: &occ.chore.id,
            title: &occ.chore.title,
            date: format_date(occ.date),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers (plain `String` errors so they can be tested off-wasm)
// ---------------------------------------------------------------------------

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("Invalid date '{}': expected YYYY-MM-DD", s))
}

fn parse_chore_json(json: &str) -> Result<Chore, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid chore JSON: {}", e))
}

/// Entries that do not decode are skipped; only a non-array input is an error.
fn parse_chores_json(json: &str) -> Result<Vec<Chore>, String> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| format!("Invalid chores JSON: {}", e))?;
    Ok(decode_chores(entries))
}

fn expand_to_json(chores: &[Chore], window: DateWindow) -> Result<String, String> {
    let occurrences = expand_window(chores, window);
    let dtos: Vec<OccurrenceDto> = occurrences.iter().map(OccurrenceDto::from).collect();
    serde_json::to_string(&dtos).map_err(|e| format!("Serialization error: {}", e))
}

fn occurs_on_date_impl(chore_json: &str, date: &str) -> Result<bool, String> {
    let chore = parse_chore_json(chore_json)?;
    let date = parse_date_arg(date)?;
    Ok(chore_engine::occurs_on_date(&chore, date))
}

fn expand_occurrences_impl(
    chores_json: &str,
    window_start: &str,
    window_end: &str,
) -> Result<String, String> {
    let chores = parse_chores_json(chores_json)?;
    let window = DateWindow::new(parse_date_arg(window_start)?, parse_date_arg(window_end)?);
    expand_to_json(&chores, window)
}

fn upcoming_impl(chores_json: &str, today: &str, days: u32) -> Result<String, String> {
    let chores = parse_chores_json(chores_json)?;
    let window = DateWindow::horizon(parse_date_arg(today)?, days);
    expand_to_json(&chores, window)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Whether a chore occurs on a date.
///
/// `chore_json` is a single chore object; `date` is `YYYY-MM-DD`.
#[wasm_bindgen(js_name = "occursOnDate")]
pub fn occurs_on_date(chore_json: &str, date: &str) -> Result<bool, JsValue> {
    occurs_on_date_impl(chore_json, date).map_err(|e| JsValue::from_str(&e))
}

/// Expand chores over an inclusive date window.
///
/// Returns a JSON array of `{choreId, title, date}` objects sorted by date,
/// then title.
#[wasm_bindgen(js_name = "expandOccurrences")]
pub fn expand_occurrences(
    chores_json: &str,
    window_start: &str,
    window_end: &str,
) -> Result<String, JsValue> {
    expand_occurrences_impl(chores_json, window_start, window_end)
        .map_err(|e| JsValue::from_str(&e))
}

/// Expand chores over `days` dates starting at `today` (the upcoming list).
#[wasm_bindgen(js_name = "upcoming")]
pub fn upcoming(chores_json: &str, today: &str, days: u32) -> Result<String, JsValue> {
    upcoming_impl(chores_json, today, days).map_err(|e| JsValue::from_str(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHORES: &str = r#"[
        {"id":"2","title":"Laundry","startDate":"2024-04-01","recurrence":""},
        {"id":"1","title":"Dishes","startDate":"2024-04-01","recurrence":"daily"}
    ]"#;

    #[test]
    fn occurs_on_date_checks_rules() {
        let chore = r#"{"id":"1","title":"Rent","startDate":"2024-01-31","recurrence":"monthly"}"#;
        assert_eq!(occurs_on_date_impl(chore, "2024-03-31"), Ok(true));
        assert_eq!(occurs_on_date_impl(chore, "2024-04-30"), Ok(false));
    }

    #[test]
    fn expand_returns_sorted_dtos() {
        let json = expand_occurrences_impl(CHORES, "2024-04-01", "2024-04-02").unwrap();
        assert_eq!(
            json,
            r#"[{"choreId":"1","title":"Dishes","date":"2024-04-01"},{"choreId":"2","title":"Laundry","date":"2024-04-01"},{"choreId":"1","title":"Dishes","date":"2024-04-02"}]"#
        );
    }

    #[test]
    fn upcoming_uses_horizon() {
        let json = upcoming_impl(CHORES, "2024-04-02", 3).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 3);
    }

    #[test]
    fn corrupt_chore_entries_are_skipped_not_thrown() {
        let chores = r#"[
            {"id":"1","title":"A","startDate":"2024-01-01","recurrence":"daily"},
            {"id":"2","title":"B","startDate":{"bad":1}},
            {"title":"No id","startDate":"2024-01-01"}
        ]"#;
        let json = expand_occurrences_impl(chores, "2024-01-01", "2024-01-02").unwrap();
        assert_eq!(
            json,
            r#"[{"choreId":"1","title":"A","date":"2024-01-01"},{"choreId":"1","title":"A","date":"2024-01-02"}]"#
        );
    }

    #[test]
    fn bad_inputs_are_errors_not_panics() {
        assert!(occurs_on_date_impl("{", "2024-04-01").is_err());
        assert!(occurs_on_date_impl(r#"{"id":"1"}"#, "04/01/2024").is_err());
        assert!(expand_occurrences_impl("{}", "2024-04-01", "2024-04-02").is_err());
        assert!(upcoming_impl(CHORES, "tomorrow", 3).is_err());
    }
}
