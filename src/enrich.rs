use crate::record::{DerivedMetrics, EnrichedMatch, MatchRecord, OddsTriple, Outcome, ProbTriple};

/// Recomputes the per-outcome aggregate odds from the six bookmaker columns
/// actually present and derives the probability metrics. Pure per record:
/// nothing here looks at any other row.
pub fn enrich(record: MatchRecord) -> EnrichedMatch {
    let per_outcome = |f: fn(&[Option<f64>; 6]) -> Option<f64>| OddsTriple {
        home: f(&record.book_odds(Outcome::Home)),
        draw: f(&record.book_odds(Outcome::Draw)),
        away: f(&record.book_odds(Outcome::Away)),
    };

    let max_books = per_outcome(derived_max);
    let avg_books = per_outcome(derived_mean);

    let implied = ProbTriple {
        home: implied_prob(avg_books.home),
        draw: implied_prob(avg_books.draw),
        away: implied_prob(avg_books.away),
    };
    let normalized = normalized_probs(&avg_books);
    let market_pick = market_pick(&avg_books);
    let realized_prob = record.ft_result.and_then(|result| normalized.get(result));

    EnrichedMatch {
        record,
        metrics: DerivedMetrics {
            max_books,
            avg_books,
            implied,
            normalized,
            market_pick,
            realized_prob,
        },
    }
}

/// Maximum over the present entries; None when all six are absent.
pub fn derived_max(odds: &[Option<f64>; 6]) -> Option<f64> {
    odds.iter()
        .flatten()
        .fold(None, |best: Option<f64>, &quote| {
            Some(best.map_or(quote, |b| b.max(quote)))
        })
}

/// Mean over the present entries, rounded to 2 decimals. A zero count
/// short-circuits to None before any division happens.
pub fn derived_mean(odds: &[Option<f64>; 6]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0u32;
    for quote in odds.iter().flatten() {
        sum += quote;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(round2(sum / f64::from(count)))
}

/// Raw implied probability as a percentage: 100 / mean odds. Null mean odds
/// propagate; this is a defined "cannot compute" state, not an error.
pub fn implied_prob(mean_odds: Option<f64>) -> Option<f64> {
    let mean_odds = mean_odds?;
    if mean_odds <= 0.0 {
        return None;
    }
    Some(round2(100.0 / mean_odds))
}

/// Implied probabilities rescaled so the three outcomes sum to exactly 100,
/// removing the bookmaker margin. Requires all three mean odds; otherwise all
/// three outputs are None.
fn normalized_probs(avg: &OddsTriple) -> ProbTriple {
    let (Some(home), Some(draw), Some(away)) = (avg.home, avg.draw, avg.away) else {
        return ProbTriple::default();
    };
    if home <= 0.0 || draw <= 0.0 || away <= 0.0 {
        return ProbTriple::default();
    }
    let raw_home = 100.0 / home;
    let raw_draw = 100.0 / draw;
    let raw_away = 100.0 / away;
    let sum = raw_home + raw_draw + raw_away;
    ProbTriple {
        home: Some(round2(raw_home * 100.0 / sum)),
        draw: Some(round2(raw_draw * 100.0 / sum)),
        away: Some(round2(raw_away * 100.0 / sum)),
    }
}

/// The market favorite: lowest mean odds wins, ties resolve in fixed outcome
/// priority home, then draw, then away. Comparable only when all three means
/// are present.
fn market_pick(avg: &OddsTriple) -> Option<Outcome> {
    let (home, draw, away) = (avg.home?, avg.draw?, avg.away?);
    if home <= draw && home <= away {
        Some(Outcome::Home)
    } else if draw <= away {
        Some(Outcome::Draw)
    } else {
        Some(Outcome::Away)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
