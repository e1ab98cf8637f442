use crate::record::{MatchRecord, has_text};

pub const DEFAULT_OUTCOME_RESULT: &str = "win";

/// Fill missing `city`, `outcome_result` and `event_name` on every record of
/// one tier, using `universe` (all tiers, pre-imputation) as the only evidence.
/// Every rule reads the record as it arrived, so rules can run in any order.
pub fn impute_match_fields(records: Vec<MatchRecord>, universe: &[MatchRecord]) -> Vec<MatchRecord> {
    records
        .into_iter()
        .map(|record| impute_record(record, universe))
        .collect()
}

pub fn impute_record(mut record: MatchRecord, universe: &[MatchRecord]) -> MatchRecord {
    let city = backfill_city(&record, universe);
    let outcome_result = default_outcome_result(&record);
    let event_name = backfill_event_name(&record, universe);
    if city.is_some() {
        record.city = city;
    }
    if outcome_result.is_some() {
        record.outcome_result = outcome_result;
    }
    if event_name.is_some() {
        record.event_name = event_name;
    }
    record
}

/// City of the first universe record played at the same venue.
pub fn backfill_city(record: &MatchRecord, universe: &[MatchRecord]) -> Option<String> {
    if has_text(&record.city) {
        return None;
    }
    let venue = record.venue.as_deref()?;
    universe
        .iter()
        .find(|other| other.venue.as_deref() == Some(venue) && has_text(&other.city))
        .and_then(|other| other.city.clone())
}

/// A recorded margin means someone won; Cricsheet leaves `result` out in that case.
pub fn default_outcome_result(record: &MatchRecord) -> Option<String> {
    if record.outcome_type.is_some() && !has_text(&record.outcome_result) {
        Some(DEFAULT_OUTCOME_RESULT.to_string())
    } else {
        None
    }
}

/// Event name of a fixture between the same two teams, preferring one played in
/// the same city. A record without a city takes any named city on the first pass.
pub fn backfill_event_name(record: &MatchRecord, universe: &[MatchRecord]) -> Option<String> {
    if has_text(&record.event_name) || record.teams.is_empty() {
        return None;
    }
    let key = record.team_key();
    let same_fixture = |other: &&MatchRecord| has_text(&other.event_name) && other.team_key() == key;

    let same_city = |other: &&MatchRecord| {
        if has_text(&record.city) {
            other.city == record.city
        } else {
            has_text(&other.city)
        }
    };

    universe
        .iter()
        .filter(same_fixture)
        .find(same_city)
        .or_else(|| universe.iter().find(same_fixture))
        .and_then(|other| other.event_name.clone())
}

#[cfg(test)]
mod tests {
    use super::{impute_match_fields, impute_record};
    use crate::record::MatchRecord;

    fn record(id: &str, venue: &str, city: Option<&str>) -> MatchRecord {
        let mut r = MatchRecord::empty(id, "odi");
        r.venue = Some(venue.to_string());
        r.city = city.map(|c| c.to_string());
        r.teams = vec!["India".to_string(), "England".to_string()];
        r
    }

    #[test]
    fn city_comes_from_same_venue() {
        let a = record("1", "Wankhede Stadium", Some("Mumbai"));
        let b = record("2", "Wankhede Stadium", Some(""));
        let universe = vec![a.clone(), b.clone()];
        let out = impute_match_fields(vec![a, b], &universe);
        assert_eq!(out[0].city.as_deref(), Some("Mumbai"));
        assert_eq!(out[1].city.as_deref(), Some("Mumbai"));
    }

    #[test]
    fn city_stays_empty_without_evidence() {
        let a = record("1", "Lord's", None);
        let b = record("2", "The Oval", Some("London"));
        let universe = vec![a.clone(), b];
        let out = impute_record(a, &universe);
        assert_eq!(out.city, None);
    }

    #[test]
    fn margin_implies_win() {
        let mut a = record("1", "Lord's", Some("London"));
        a.outcome_type = Some("runs".to_string());
        a.outcome_by = Some(10);
        let out = impute_record(a.clone(), &[a.clone()]);
        assert_eq!(out.outcome_result.as_deref(), Some("win"));

        let mut tie = record("2", "Lord's", Some("London"));
        tie.outcome_result = Some("tie".to_string());
        let out = impute_record(tie.clone(), &[tie]);
        assert_eq!(out.outcome_result.as_deref(), Some("tie"));
    }

    #[test]
    fn event_prefers_same_city_then_any() {
        let target = record("3", "Eden Gardens", Some("Kolkata"));
        let mut elsewhere = record("1", "Lord's", Some("London"));
        elsewhere.event_name = Some("India tour of England".to_string());
        let mut here = record("2", "Eden Gardens", Some("Kolkata"));
        here.teams.reverse();
        here.event_name = Some("England tour of India".to_string());

        let universe = vec![elsewhere.clone(), here, target.clone()];
        let out = impute_record(target.clone(), &universe);
        assert_eq!(out.event_name.as_deref(), Some("England tour of India"));

        let out = impute_record(target, &[elsewhere]);
        assert_eq!(out.event_name.as_deref(), Some("India tour of England"));
    }

    #[test]
    fn event_lookup_uses_city_as_it_arrived() {
        // No city on the target: first pass accepts any named city.
        let target = record("2", "Eden Gardens", None);
        let mut other = record("1", "Lord's", Some("London"));
        other.event_name = Some("Series".to_string());
        let universe = vec![other, target.clone()];
        let out = impute_record(target, &universe);
        assert_eq!(out.event_name.as_deref(), Some("Series"));
    }

    #[test]
    fn event_lookup_skips_blank_cities_first() {
        let target = record("3", "Eden Gardens", None);
        let mut blank = record("1", "Unknown Ground", Some(""));
        blank.event_name = Some("A".to_string());
        let mut london = record("2", "Lord's", Some("London"));
        london.event_name = Some("B".to_string());

        let out = impute_record(target.clone(), &[blank.clone(), london, target.clone()]);
        assert_eq!(out.event_name.as_deref(), Some("B"));

        // Only blank cities on offer: the fallback still takes them.
        let out = impute_record(target.clone(), &[blank, target]);
        assert_eq!(out.event_name.as_deref(), Some("A"));
    }

    #[test]
    fn universe_is_left_untouched() {
        let a = record("1", "Wankhede Stadium", Some("Mumbai"));
        let b = record("2", "Wankhede Stadium", None);
        let universe = vec![a, b.clone()];
        let before = universe.clone();
        let _ = impute_match_fields(vec![b], &universe);
        assert_eq!(universe, before);
    }
}
