use cricket_tables::impute::impute_match_fields;
use cricket_tables::record::{MatchNumber, MatchRecord};
use cricket_tables::sequence::fill_event_match_numbers;

fn odi(id: &str) -> MatchRecord {
    let mut m = MatchRecord::empty(id, "odi");
    m.season = Some("2023".to_string());
    m.teams = vec!["India".to_string(), "Sri Lanka".to_string()];
    m
}

#[test]
fn shared_venue_backfills_city() {
    let mut a = odi("1");
    a.venue = Some("Wankhede Stadium".to_string());
    a.city = Some("Mumbai".to_string());
    let mut b = odi("2");
    b.venue = Some("Wankhede Stadium".to_string());
    b.city = Some(String::new());

    let universe = vec![a.clone(), b.clone()];
    let out = impute_match_fields(vec![a, b], &universe);
    assert!(out.iter().all(|m| m.city.as_deref() == Some("Mumbai")));
}

#[test]
fn backfilled_city_always_comes_from_the_same_venue() {
    let venues = ["Galle", "Pallekele", "Galle", "Colombo", "Pallekele", "Dambulla"];
    let cities = [Some("Galle"), None, None, Some("Colombo"), Some("Kandy"), None];
    let records = venues
        .iter()
        .zip(cities)
        .enumerate()
        .map(|(idx, (venue, city))| {
            let mut m = odi(&idx.to_string());
            m.venue = Some(venue.to_string());
            m.city = city.map(|c| c.to_string());
            m
        })
        .collect::<Vec<_>>();

    let out = impute_match_fields(records.clone(), &records);
    for (before, after) in records.iter().zip(&out) {
        if before.city.is_some() {
            assert_eq!(before.city, after.city);
            continue;
        }
        if let Some(city) = after.city.as_ref() {
            assert!(records.iter().any(|other| other.venue == before.venue
                && other.city.as_ref() == Some(city)));
        }
    }
    assert_eq!(out[1].city.as_deref(), Some("Kandy"));
    assert_eq!(out[2].city.as_deref(), Some("Galle"));
    assert_eq!(out[5].city, None);
}

#[test]
fn missing_event_numbers_follow_existing_max() {
    let records = ["m1", "m2", "m3"]
        .iter()
        .zip([None, Some(MatchNumber::Int(2)), None])
        .map(|(id, number)| {
            let mut m = odi(id);
            m.event_name = Some("Asia Cup".to_string());
            m.event_match_number = number;
            m
        })
        .collect::<Vec<_>>();

    let out = fill_event_match_numbers(records);
    let numbers = out
        .iter()
        .map(|m| m.event_match_number.as_ref().and_then(MatchNumber::as_int))
        .collect::<Vec<_>>();
    assert_eq!(numbers, vec![Some(3), Some(2), Some(4)]);
}

#[test]
fn single_unnumbered_match_gets_one() {
    let mut m = odi("solo");
    m.event_name = Some("Bilateral".to_string());
    let out = fill_event_match_numbers(vec![m]);
    assert_eq!(out[0].event_match_number, Some(MatchNumber::Int(1)));
}

#[test]
fn imputed_event_joins_the_numbering_group() {
    let mut named = odi("100");
    named.city = Some("Colombo".to_string());
    named.event_name = Some("India tour of Sri Lanka".to_string());
    named.event_match_number = Some(MatchNumber::Int(1));
    let mut unnamed = odi("101");
    unnamed.city = Some("Colombo".to_string());
    unnamed.teams.reverse();

    let universe = vec![named.clone(), unnamed.clone()];
    let out = fill_event_match_numbers(impute_match_fields(vec![named, unnamed], &universe));
    assert_eq!(out[1].event_name.as_deref(), Some("India tour of Sri Lanka"));
    assert_eq!(out[1].event_match_number, Some(MatchNumber::Int(2)));
}
