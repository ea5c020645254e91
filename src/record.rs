use chrono::{NaiveDate, NaiveTime};

/// One of the five source leagues, keyed by its football-data division code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum League {
    England,
    Spain,
    Germany,
    Italy,
    France,
}

impl League {
    pub const ALL: [League; 5] = [
        League::England,
        League::Spain,
        League::Germany,
        League::Italy,
        League::France,
    ];

    pub fn code(self) -> &'static str {
        match self {
            League::England => "E0",
            League::Spain => "SP1",
            League::Germany => "D1",
            League::Italy => "I1",
            League::France => "F1",
        }
    }

    pub fn country(self) -> &'static str {
        match self {
            League::England => "England",
            League::Spain => "Spain",
            League::Germany => "Germany",
            League::Italy => "Italy",
            League::France => "France",
        }
    }

    pub fn from_code(code: &str) -> Option<League> {
        League::ALL.into_iter().find(|l| l.code() == code.trim())
    }
}

/// Full-time (or half-time) match outcome. The same single-character codes are
/// used for the actual result column and the derived market favorite, so the
/// two are directly comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    pub fn code(self) -> char {
        match self {
            Outcome::Home => 'H',
            Outcome::Draw => 'D',
            Outcome::Away => 'A',
        }
    }

    pub fn from_code(raw: &str) -> Option<Outcome> {
        match raw.trim() {
            "H" => Some(Outcome::Home),
            "D" => Some(Outcome::Draw),
            "A" => Some(Outcome::Away),
            _ => None,
        }
    }
}

/// Home/draw/away decimal odds quoted by one bookmaker (or one aggregate).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OddsTriple {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}

impl OddsTriple {
    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

/// Home/draw/away probabilities, as percentages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProbTriple {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}

impl ProbTriple {
    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }
}

/// One played match on the canonical schema. Field order follows the stored
/// column order. Anything the source could not supply (or that failed typed
/// parsing) is None.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub league: League,
    pub date: Option<NaiveDate>,
    pub kickoff: Option<NaiveTime>,
    pub home_team: String,
    pub away_team: String,

    pub ft_home_goals: Option<i32>,
    pub ft_away_goals: Option<i32>,
    pub ft_result: Option<Outcome>,
    pub ht_home_goals: Option<i32>,
    pub ht_away_goals: Option<i32>,
    pub ht_result: Option<Outcome>,

    pub home_shots: Option<i32>,
    pub away_shots: Option<i32>,
    pub home_shots_on_target: Option<i32>,
    pub away_shots_on_target: Option<i32>,
    pub home_fouls: Option<i32>,
    pub away_fouls: Option<i32>,
    pub home_corners: Option<i32>,
    pub away_corners: Option<i32>,
    pub home_yellow: Option<i32>,
    pub away_yellow: Option<i32>,
    pub home_red: Option<i32>,
    pub away_red: Option<i32>,

    pub b365: OddsTriple,
    pub bw: OddsTriple,
    pub iw: OddsTriple,
    pub ps: OddsTriple,
    pub wh: OddsTriple,
    pub vc: OddsTriple,

    // Aggregates as shipped by the source. Known to be computed over a larger
    // bookmaker universe than the six columns above; kept untouched for audit.
    pub src_max: OddsTriple,
    pub src_avg: OddsTriple,

    pub b365_over25: Option<f64>,
    pub b365_under25: Option<f64>,
    pub p_over25: Option<f64>,
    pub p_under25: Option<f64>,
    pub max_over25: Option<f64>,
    pub max_under25: Option<f64>,
    pub avg_over25: Option<f64>,
    pub avg_under25: Option<f64>,

    pub ah_line: Option<f64>,
    pub b365_ah_home: Option<f64>,
    pub b365_ah_away: Option<f64>,
    pub p_ah_home: Option<f64>,
    pub p_ah_away: Option<f64>,
    pub max_ah_home: Option<f64>,
    pub max_ah_away: Option<f64>,
    pub avg_ah_home: Option<f64>,
    pub avg_ah_away: Option<f64>,
}

impl MatchRecord {
    /// The six bookmaker quotes for one outcome, in fixed catalog order
    /// (Bet365, Bet&Win, Interwetten, Pinnacle, William Hill, VC Bet).
    pub fn book_odds(&self, outcome: Outcome) -> [Option<f64>; 6] {
        [
            self.b365.get(outcome),
            self.bw.get(outcome),
            self.iw.get(outcome),
            self.ps.get(outcome),
            self.wh.get(outcome),
            self.vc.get(outcome),
        ]
    }
}

/// Metrics recomputed per record from its own six bookmaker columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedMetrics {
    pub max_books: OddsTriple,
    pub avg_books: OddsTriple,
    pub implied: ProbTriple,
    pub normalized: ProbTriple,
    pub market_pick: Option<Outcome>,
    pub realized_prob: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedMatch {
    pub record: MatchRecord,
    pub metrics: DerivedMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_codes_round_trip() {
        for league in League::ALL {
            assert_eq!(League::from_code(league.code()), Some(league));
        }
        assert_eq!(League::from_code("B1"), None);
    }

    #[test]
    fn outcome_codes_match_result_column() {
        assert_eq!(Outcome::from_code("H"), Some(Outcome::Home));
        assert_eq!(Outcome::from_code(" D "), Some(Outcome::Draw));
        assert_eq!(Outcome::from_code("A"), Some(Outcome::Away));
        assert_eq!(Outcome::from_code("X"), None);
        assert_eq!(Outcome::Away.code(), 'A');
    }
}
