//! Declarative threshold ladders.
//!
//! A ladder is an if/else-if chain over one metric: rungs are tried in order
//! and the first whose predicate holds contributes its points (and signal, if
//! any). Scores are the sum of every ladder's contribution on top of a base.
//! Keeping the tables as data lets scorers and tests walk the same rungs.

use analysis_core::FundamentalsRecord;

pub type Predicate<C> = fn(&FundamentalsRecord, &C) -> bool;

/// One branch of a ladder.
pub struct Rung<C: 'static> {
    pub when: Predicate<C>,
    pub points: f64,
    pub signal: Option<&'static str>,
}

/// An ordered if/else-if chain; at most one rung applies.
pub struct Ladder<C: 'static> {
    pub metric: &'static str,
    pub rungs: &'static [Rung<C>],
}

impl<C: 'static> Ladder<C> {
    /// First rung whose predicate holds, if any.
    pub fn climb(&self, record: &FundamentalsRecord, context: &C) -> Option<&'static Rung<C>> {
        self.rungs.iter().find(|rung| (rung.when)(record, context))
    }

    /// Largest contribution any rung of this ladder can make.
    pub fn max_points(&self) -> f64 {
        self.rungs
            .iter()
            .map(|rung| rung.points)
            .fold(0.0, f64::max)
    }
}

/// Points and signals accumulated over a set of ladders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    pub points: f64,
    pub signals: Vec<String>,
}

/// Sum points and collect signals over every ladder, in table order.
pub fn tally<C: 'static>(ladders: &[Ladder<C>], record: &FundamentalsRecord, context: &C) -> Tally {
    let mut result = Tally::default();
    for ladder in ladders {
        if let Some(rung) = ladder.climb(record, context) {
            result.points += rung.points;
            if let Some(signal) = rung.signal {
                result.signals.push(signal.to_string());
            }
        }
    }
    result
}

/// `base` plus every ladder's contribution, clamped to 0..=100.
pub fn score<C: 'static>(base: f64, ladders: &[Ladder<C>], record: &FundamentalsRecord, context: &C) -> f64 {
    (base + tally(ladders, record, context).points).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    static PRICE_LADDERS: &[Ladder<f64>] = &[
        Ladder {
            metric: "price",
            rungs: &[
                Rung { when: |r, _| r.price < 10.0, points: 30.0, signal: Some("CHEAP") },
                Rung { when: |r, _| r.price < 20.0, points: 10.0, signal: None },
                Rung { when: |_, _| true, points: -40.0, signal: Some("EXPENSIVE") },
            ],
        },
        Ladder {
            metric: "threshold",
            rungs: &[Rung { when: |r, limit| r.eps > *limit, points: 5.0, signal: Some("EARNS") }],
        },
    ];

    fn record(price: f64, eps: f64) -> FundamentalsRecord {
        FundamentalsRecord { symbol: "T".to_string(), price, eps, ..Default::default() }
    }

    #[test]
    fn test_first_matching_rung_wins() {
        let t = tally(PRICE_LADDERS, &record(5.0, 2.0), &1.0);
        assert_eq!(t.points, 35.0);
        assert_eq!(t.signals, vec!["CHEAP", "EARNS"]);

        let t = tally(PRICE_LADDERS, &record(15.0, 0.0), &1.0);
        assert_eq!(t.points, 10.0);
        assert!(t.signals.is_empty());
    }

    #[test]
    fn test_score_clamps() {
        assert_eq!(score(20.0, PRICE_LADDERS, &record(50.0, 0.0), &1.0), 0.0);
        assert_eq!(score(90.0, PRICE_LADDERS, &record(1.0, 3.0), &1.0), 100.0);
    }

    #[test]
    fn test_max_points() {
        assert_eq!(PRICE_LADDERS[0].max_points(), 30.0);
        assert_eq!(PRICE_LADDERS[1].max_points(), 5.0);
    }
}
