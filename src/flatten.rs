use std::path::Path;

use serde_json::Value;

use crate::record::{DeliveryRecord, Dismissal, MatchNumber, MatchRecord, Tier};

/// Output of flattening one source document.
#[derive(Debug, Clone)]
pub struct FlatMatch {
    /// `None` when the match type fits no tier; the caller drops such matches.
    pub tier: Option<Tier>,
    pub record: MatchRecord,
    pub deliveries: Vec<DeliveryRecord>,
}

pub fn match_id_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

pub fn flatten_match(root: &Value, match_id: &str) -> FlatMatch {
    let info = root.get("info").unwrap_or(&Value::Null);
    let record = parse_match_info(info, match_id);
    let tier = Tier::classify(&record.match_type);
    let deliveries = parse_deliveries(root.get("innings"), match_id);
    FlatMatch {
        tier,
        record,
        deliveries,
    }
}

pub fn parse_match_info(info: &Value, match_id: &str) -> MatchRecord {
    let match_type = pick_str(info, "match_type")
        .unwrap_or_default()
        .to_lowercase();
    let toss = info.get("toss").unwrap_or(&Value::Null);
    let outcome = info.get("outcome").unwrap_or(&Value::Null);
    let event = info.get("event").unwrap_or(&Value::Null);

    let margin = outcome_margin(outcome.get("by"));
    let (outcome_type, outcome_by) = match margin.into_iter().next() {
        Some((kind, by)) => (Some(kind), by),
        None => (None, None),
    };

    MatchRecord {
        match_id: match_id.to_string(),
        match_type,
        season: info.get("season").and_then(scalar_text),
        venue: pick_str(info, "venue"),
        city: pick_str(info, "city"),
        dates: string_list(info.get("dates")),
        teams: string_list(info.get("teams")),
        toss_winner: pick_str(toss, "winner"),
        toss_decision: pick_str(toss, "decision"),
        outcome_result: pick_str(outcome, "result"),
        outcome_winner: pick_str(outcome, "winner"),
        outcome_type,
        outcome_by,
        event_name: pick_str(event, "name"),
        event_match_number: event.get("match_number").and_then(raw_match_number),
        balls_per_over: info.get("balls_per_over").and_then(as_i64_any),
        match_type_number: info.get("match_type_number").and_then(as_i64_any),
        overs: info.get("overs").and_then(as_i64_any),
        gender: pick_str(info, "gender"),
        officials: info.get("officials").filter(|v| !v.is_null()).cloned(),
        player_of_match: string_list(info.get("player_of_match")),
        team_type: pick_str(info, "team_type"),
    }
}

/// Entries of `outcome.by` in document order. The first entry is the margin
/// that counts, e.g. `{"innings": 1, "runs": 12}` is an innings win.
pub fn outcome_margin(by: Option<&Value>) -> Vec<(String, Option<i64>)> {
    let Some(map) = by.and_then(|v| v.as_object()) else {
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| (key.clone(), as_i64_any(value)))
        .collect()
}

pub fn parse_deliveries(innings: Option<&Value>, match_id: &str) -> Vec<DeliveryRecord> {
    let mut out = Vec::new();
    for (innings_idx, inning) in array_items(innings).enumerate() {
        let batting_team = pick_str(inning, "team");
        for over in array_items(inning.get("overs")) {
            let over_num = over.get("over").and_then(as_i64_any);
            for (ball_idx, delivery) in array_items(over.get("deliveries")).enumerate() {
                out.push(parse_delivery(
                    delivery,
                    match_id,
                    innings_idx + 1,
                    batting_team.clone(),
                    over_num,
                    ball_idx + 1,
                ));
            }
        }
    }
    out
}

fn parse_delivery(
    delivery: &Value,
    match_id: &str,
    innings: usize,
    batting_team: Option<String>,
    over: Option<i64>,
    delivery_in_over: usize,
) -> DeliveryRecord {
    let runs = delivery.get("runs").unwrap_or(&Value::Null);
    DeliveryRecord {
        match_id: match_id.to_string(),
        innings,
        batting_team,
        over,
        delivery_in_over,
        batter: pick_str(delivery, "batter"),
        bowler: pick_str(delivery, "bowler"),
        non_striker: pick_str(delivery, "non_striker"),
        runs_batter: runs.get("batter").and_then(as_i64_any),
        runs_extras: runs.get("extras").and_then(as_i64_any),
        runs_total: runs.get("total").and_then(as_i64_any),
        wicket: last_dismissal(delivery.get("wickets")),
    }
}

/// Cricsheet lists every dismissal on the ball; the last one is kept.
fn last_dismissal(wickets: Option<&Value>) -> Option<Dismissal> {
    let wicket = wickets.and_then(|v| v.as_array())?.last()?;
    let fielders = array_items(wicket.get("fielders"))
        .filter_map(|f| pick_str(f, "name"))
        .filter(|name| !name.is_empty())
        .collect();
    Some(Dismissal {
        kind: pick_str(wicket, "kind"),
        player_out: pick_str(wicket, "player_out"),
        fielders,
    })
}

fn array_items(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter())
        .into_iter()
        .flatten()
}

fn pick_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    array_items(value).filter_map(scalar_text).collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn raw_match_number(value: &Value) -> Option<MatchNumber> {
    match value {
        Value::Number(n) => Some(match (n.as_i64(), n.as_f64()) {
            (Some(int), _) => MatchNumber::Int(int),
            (None, Some(float)) if float.is_finite() && float.fract() != 0.0 => {
                MatchNumber::Float(float)
            }
            _ => MatchNumber::Text(n.to_string()),
        }),
        Value::String(s) => Some(MatchNumber::Text(s.clone())),
        _ => None,
    }
}

fn as_i64_any(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<i64>().ok()
}
