use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Test,
    Odi,
    T20,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Test, Tier::Odi, Tier::T20];

    /// First tier whose name is a substring of the lower-cased match type.
    pub fn classify(match_type: &str) -> Option<Tier> {
        let lowered = match_type.to_lowercase();
        Tier::ALL
            .into_iter()
            .find(|tier| lowered.contains(tier.label()))
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Test => "test",
            Tier::Odi => "odi",
            Tier::T20 => "t20",
        }
    }
}

/// `event.match_number` as published. The sequencer leaves only `Int` and
/// `Float` behind; `Float` is always finite with a fractional part.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl MatchNumber {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            MatchNumber::Int(n) => Some(*n),
            MatchNumber::Float(_) | MatchNumber::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub match_id: String,
    pub match_type: String,
    pub season: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub dates: Vec<String>,
    pub teams: Vec<String>,
    pub toss_winner: Option<String>,
    pub toss_decision: Option<String>,
    pub outcome_result: Option<String>,
    pub outcome_winner: Option<String>,
    pub outcome_type: Option<String>,
    pub outcome_by: Option<i64>,
    pub event_name: Option<String>,
    pub event_match_number: Option<MatchNumber>,
    pub balls_per_over: Option<i64>,
    pub match_type_number: Option<i64>,
    pub overs: Option<i64>,
    pub gender: Option<String>,
    pub officials: Option<Value>,
    pub player_of_match: Vec<String>,
    pub team_type: Option<String>,
}

impl MatchRecord {
    pub fn empty(match_id: impl Into<String>, match_type: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            match_type: match_type.into(),
            season: None,
            venue: None,
            city: None,
            dates: Vec::new(),
            teams: Vec::new(),
            toss_winner: None,
            toss_decision: None,
            outcome_result: None,
            outcome_winner: None,
            outcome_type: None,
            outcome_by: None,
            event_name: None,
            event_match_number: None,
            balls_per_over: None,
            match_type_number: None,
            overs: None,
            gender: None,
            officials: None,
            player_of_match: Vec::new(),
            team_type: None,
        }
    }

    /// Team names sorted, so home/away order does not matter when comparing fixtures.
    pub fn team_key(&self) -> Vec<&str> {
        let mut key = self.teams.iter().map(String::as_str).collect::<Vec<_>>();
        key.sort_unstable();
        key
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dismissal {
    pub kind: Option<String>,
    pub player_out: Option<String>,
    pub fielders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecord {
    pub match_id: String,
    pub innings: usize,
    pub batting_team: Option<String>,
    pub over: Option<i64>,
    pub delivery_in_over: usize,
    pub batter: Option<String>,
    pub bowler: Option<String>,
    pub non_striker: Option<String>,
    pub runs_batter: Option<i64>,
    pub runs_extras: Option<i64>,
    pub runs_total: Option<i64>,
    pub wicket: Option<Dismissal>,
}

/// Present and not blank.
pub fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{MatchRecord, Tier};

    #[test]
    fn classify_prefers_test_then_odi_then_t20() {
        assert_eq!(Tier::classify("Test"), Some(Tier::Test));
        assert_eq!(Tier::classify("ODI"), Some(Tier::Odi));
        assert_eq!(Tier::classify("IT20"), Some(Tier::T20));
        assert_eq!(Tier::classify("t20 odi test"), Some(Tier::Test));
        assert_eq!(Tier::classify("odi-t20"), Some(Tier::Odi));
        assert_eq!(Tier::classify("MDM"), None);
        assert_eq!(Tier::classify(""), None);
    }

    #[test]
    fn team_key_ignores_order() {
        let mut a = MatchRecord::empty("1", "odi");
        a.teams = vec!["India".to_string(), "Australia".to_string()];
        let mut b = MatchRecord::empty("2", "odi");
        b.teams = vec!["Australia".to_string(), "India".to_string()];
        assert_eq!(a.team_key(), b.team_key());
    }
}
