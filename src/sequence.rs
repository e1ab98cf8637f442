use std::collections::{BTreeMap, HashMap};

use crate::record::{MatchNumber, MatchRecord, has_text};

// 2^63; every f64 below it and at or above -2^63 fits in an i64.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Number matches within each (season, event) group. Existing numbers are
/// kept; missing ones are handed out in `match_id` order, continuing after the
/// group's highest existing number. Records with no event name are only
/// normalized. Row order is preserved.
pub fn fill_event_match_numbers(records: Vec<MatchRecord>) -> Vec<MatchRecord> {
    let records = records
        .into_iter()
        .map(|mut record| {
            record.event_match_number = normalize_match_number(record.event_match_number.as_ref());
            record
        })
        .collect::<Vec<_>>();

    let assigned = assign_numbers(&records);

    records
        .into_iter()
        .enumerate()
        .map(|(idx, mut record)| {
            if let Some(number) = assigned.get(&idx) {
                record.event_match_number = Some(MatchNumber::Int(*number));
            }
            record
        })
        .collect()
}

/// Empty text is null, integral values become `Int`, finite fractional values
/// stay `Float`. Anything else, including integers outside the i64 range, is null.
pub fn normalize_match_number(raw: Option<&MatchNumber>) -> Option<MatchNumber> {
    match raw? {
        MatchNumber::Int(n) => Some(MatchNumber::Int(*n)),
        MatchNumber::Float(float) => from_float(*float),
        MatchNumber::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            if let Ok(n) = trimmed.parse::<i64>() {
                return Some(MatchNumber::Int(n));
            }
            from_float(trimmed.parse::<f64>().ok()?)
        }
    }
}

fn from_float(float: f64) -> Option<MatchNumber> {
    if !float.is_finite() {
        return None;
    }
    if float.fract() != 0.0 {
        return Some(MatchNumber::Float(float));
    }
    if float >= -I64_BOUND && float < I64_BOUND {
        Some(MatchNumber::Int(float as i64))
    } else {
        None
    }
}

/// Integer part used when finding a group's highest number; 2.5 counts as 2.
fn number_floor(number: &MatchNumber) -> Option<i64> {
    match number {
        MatchNumber::Int(n) => Some(*n),
        // Fractional values are below 2^53, so truncation cannot overflow.
        MatchNumber::Float(float) => Some(float.trunc() as i64),
        MatchNumber::Text(_) => None,
    }
}

fn assign_numbers(records: &[MatchRecord]) -> HashMap<usize, i64> {
    let mut groups: BTreeMap<(Option<&str>, &str), Vec<usize>> = BTreeMap::new();
    for (idx, record) in records.iter().enumerate() {
        if !has_text(&record.event_name) {
            continue;
        }
        let event = record.event_name.as_deref().unwrap_or_default();
        groups
            .entry((record.season.as_deref(), event))
            .or_default()
            .push(idx);
    }

    let mut assigned = HashMap::new();
    for members in groups.values_mut() {
        members.sort_by(|a, b| records[*a].match_id.cmp(&records[*b].match_id));
        let existing_max = members
            .iter()
            .filter_map(|idx| records[*idx].event_match_number.as_ref())
            .filter_map(number_floor)
            .max();
        // A group already at i64::MAX has no room left; its gaps stay null.
        let mut next = match existing_max {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };
        for idx in members.iter() {
            if records[*idx].event_match_number.is_some() {
                continue;
            }
            let Some(number) = next else {
                break;
            };
            assigned.insert(*idx, number);
            next = number.checked_add(1);
        }
    }
    assigned
}
