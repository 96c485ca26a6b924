//! Greedy top-N selection that keeps one prolific player from taking every
//! slot in a report.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::factoid::ScoredFact;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionParams {
    /// Facts scoring below this are never reported.
    pub min_impressiveness: f64,
    /// Multiplier applied to a player's weight each time one of their facts
    /// is picked.
    pub penalty_decay: f64,
    /// Facts per report. Applied by the caller, not by `select_top_facts`.
    pub cap: usize,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            min_impressiveness: 5.0,
            penalty_decay: 0.8,
            cap: 6,
        }
    }
}

/// A fact in selection order, with the owner's multiplier at the time it was
/// picked.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub fact: ScoredFact,
    pub multiplier: f64,
}

impl Selection {
    pub fn effective_score(&self) -> f64 {
        self.fact.impressiveness * self.multiplier
    }
}

/// Rank every fact at or above the threshold. Each round picks the highest
/// `impressiveness * multiplier`, then decays that player's multiplier.
/// Ties fall back to impressiveness, then interest, then input order.
pub fn select_top_facts(facts: Vec<ScoredFact>, params: &SelectionParams) -> Vec<Selection> {
    let mut remaining: Vec<ScoredFact> = facts
        .into_iter()
        .filter(|f| f.impressiveness >= params.min_impressiveness)
        .collect();
    let mut multipliers: HashMap<u64, f64> = HashMap::new();
    let mut out = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let mut best = 0usize;
        for idx in 1..remaining.len() {
            let ord = compare_candidates(&remaining[idx], &remaining[best], &multipliers);
            if ord == Ordering::Greater {
                best = idx;
            }
        }

        let fact = remaining.remove(best);
        let multiplier = multiplier_of(&multipliers, fact.player_id());
        multipliers.insert(fact.player_id(), multiplier * params.penalty_decay);
        out.push(Selection { fact, multiplier });
    }

    out
}

fn multiplier_of(multipliers: &HashMap<u64, f64>, player_id: u64) -> f64 {
    multipliers.get(&player_id).copied().unwrap_or(1.0)
}

fn compare_candidates(
    a: &ScoredFact,
    b: &ScoredFact,
    multipliers: &HashMap<u64, f64>,
) -> Ordering {
    let ea = a.impressiveness * multiplier_of(multipliers, a.player_id());
    let eb = b.impressiveness * multiplier_of(multipliers, b.player_id());
    ea.total_cmp(&eb)
        .then_with(|| a.impressiveness.total_cmp(&b.impressiveness))
        .then_with(|| a.interest().total_cmp(&b.interest()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params() {
        let p = SelectionParams::default();
        assert_eq!(p.min_impressiveness, 5.0);
        assert_eq!(p.penalty_decay, 0.8);
        assert_eq!(p.cap, 6);
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert!(select_top_facts(Vec::new(), &SelectionParams::default()).is_empty());
    }
}
