//! Core data structures: gambles, roles, treatment flags, choice vectors,
//! and resolved outcomes.
//!
//! Session-scope data (ladder, payoff table) is built once at setup and
//! shared read-only across all participant resolutions. Per-participant data
//! ([`ChoiceVector`], [`ResolvedOutcome`]) is exclusively owned by that
//! participant's record; no cross-participant synchronization is needed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two lotteries offered at every row of the price list.
///
/// At the host-framework boundary choices arrive as binary form values:
/// 0 selects A, 1 selects B.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gamble {
    A,
    B,
}

impl Gamble {
    /// Decode a binary form value (0 = A, 1 = B).
    pub fn from_binary(value: u8) -> Option<Gamble> {
        match value {
            0 => Some(Gamble::A),
            1 => Some(Gamble::B),
            _ => None,
        }
    }

    /// The letter shown to participants.
    pub fn as_letter(self) -> &'static str {
        match self {
            Gamble::A => "A",
            Gamble::B => "B",
        }
    }
}

impl fmt::Display for Gamble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_letter())
    }
}

/// An experiment role name (e.g. `decision_maker`).
///
/// Ordered and hashable so `(round, Role)` can key the payoff table.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Role(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// High/low monetary outcomes of a single gamble.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GambleOutcome {
    pub high: f64,
    pub low: f64,
}

impl GambleOutcome {
    pub fn new(high: f64, low: f64) -> Self {
        GambleOutcome { high, low }
    }

    /// Invariant checked at configuration validation.
    pub fn is_ordered(&self) -> bool {
        self.high >= self.low
    }
}

/// The pair of gambles offered at every row, for one (round, role).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GambleSpec {
    pub a: GambleOutcome,
    pub b: GambleOutcome,
}

impl GambleSpec {
    pub fn new(a: GambleOutcome, b: GambleOutcome) -> Self {
        GambleSpec { a, b }
    }

    /// Outcomes of the given gamble.
    #[inline(always)]
    pub fn outcome(&self, gamble: Gamble) -> &GambleOutcome {
        match gamble {
            Gamble::A => &self.a,
            Gamble::B => &self.b,
        }
    }
}

/// Payment treatment of one (treatment, round) cell.
///
/// The multiplier is consumed by the payoff-table builder; by the time the
/// resolver runs, amounts are already scaled. Test and hypothetical rounds
/// still draw an outcome but pay zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayTreatmentFlags {
    pub multiplier: f64,
    pub hypothetical: bool,
    pub test: bool,
}

impl PayTreatmentFlags {
    pub fn paying(multiplier: f64) -> Self {
        PayTreatmentFlags {
            multiplier,
            hypothetical: false,
            test: false,
        }
    }

    /// Whether the realized payoff is kept (not nulled to zero).
    #[inline(always)]
    pub fn pays_out(&self) -> bool {
        !(self.test || self.hypothetical)
    }
}

/// A named treatment: one [`PayTreatmentFlags`] per round, in round order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreatmentSchedule {
    pub name: String,
    pub rounds: Vec<PayTreatmentFlags>,
}

impl TreatmentSchedule {
    pub fn new(name: impl Into<String>, rounds: Vec<PayTreatmentFlags>) -> Self {
        TreatmentSchedule {
            name: name.into(),
            rounds,
        }
    }

    /// Flags for a 1-based round number.
    pub fn flags_for_round(&self, round: u32) -> Option<&PayTreatmentFlags> {
        if round == 0 {
            return None;
        }
        self.rounds.get(round as usize - 1)
    }
}

/// The participant's per-row decisions: one ordered slot per ladder row.
///
/// A single indexed sequence replaces the original's N discrete
/// string-interpolated form fields; unset slots model rows the participant
/// has not answered (e.g. after a page timeout).
#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceVector {
    slots: Vec<Option<Gamble>>,
}

impl ChoiceVector {
    /// An empty vector with `num_choices` unset rows.
    pub fn new(num_choices: u32) -> Self {
        ChoiceVector {
            slots: vec![None; num_choices as usize],
        }
    }

    /// The canonical single-crossing pattern: gamble A on every row below
    /// `switch_row`, gamble B on `switch_row` and above. `switch_row` may be
    /// `num_choices + 1`, meaning the participant never switches.
    pub fn from_switch_row(num_choices: u32, switch_row: u32) -> Self {
        let slots = (1..=num_choices)
            .map(|row| {
                if row < switch_row {
                    Some(Gamble::A)
                } else {
                    Some(Gamble::B)
                }
            })
            .collect();
        ChoiceVector { slots }
    }

    /// Number of rows (set or not).
    pub fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record a decision for a 1-based row. Rows outside the ladder are
    /// ignored by `get`, so out-of-range writes are rejected here.
    pub fn record(&mut self, row: u32, gamble: Gamble) {
        debug_assert!(
            row >= 1 && row <= self.len(),
            "row {} out of range 1..={}",
            row,
            self.len()
        );
        if row >= 1 && row <= self.len() {
            self.slots[row as usize - 1] = Some(gamble);
        }
    }

    /// Decision at a 1-based row, `None` if unset or out of range.
    pub fn get(&self, row: u32) -> Option<Gamble> {
        if row == 0 {
            return None;
        }
        self.slots.get(row as usize - 1).copied().flatten()
    }

    /// Whether every row has a recorded decision.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    /// Iterate `(row, decision)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Option<Gamble>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (i as u32 + 1, *s))
    }
}

/// The resolver's output for one participant-round.
///
/// `drawn_amount` is the weighted draw from the chosen gamble's outcomes;
/// `final_payoff` equals it unless the round is flagged test/hypothetical,
/// in which case it is zero. Computed exactly once and cached; never
/// recomputed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedOutcome {
    pub row_to_pay: u32,
    pub chosen_gamble: Gamble,
    pub drawn_amount: f64,
    pub final_payoff: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamble_from_binary() {
        assert_eq!(Gamble::from_binary(0), Some(Gamble::A));
        assert_eq!(Gamble::from_binary(1), Some(Gamble::B));
        assert_eq!(Gamble::from_binary(2), None);
    }

    #[test]
    fn test_choice_vector_record_get() {
        let mut v = ChoiceVector::new(10);
        assert_eq!(v.len(), 10);
        assert!(!v.is_complete());
        assert_eq!(v.get(5), None);

        v.record(5, Gamble::B);
        assert_eq!(v.get(5), Some(Gamble::B));
        assert_eq!(v.get(4), None);
        assert_eq!(v.get(0), None);
        assert_eq!(v.get(11), None);
    }

    #[test]
    fn test_choice_vector_switch_row() {
        let v = ChoiceVector::from_switch_row(10, 6);
        for row in 1..=5 {
            assert_eq!(v.get(row), Some(Gamble::A), "row {}", row);
        }
        for row in 6..=10 {
            assert_eq!(v.get(row), Some(Gamble::B), "row {}", row);
        }
        assert!(v.is_complete());

        // Never switches: all A.
        let all_a = ChoiceVector::from_switch_row(10, 11);
        assert!((1..=10).all(|r| all_a.get(r) == Some(Gamble::A)));

        // Switches immediately: all B.
        let all_b = ChoiceVector::from_switch_row(10, 1);
        assert!((1..=10).all(|r| all_b.get(r) == Some(Gamble::B)));
    }

    #[test]
    fn test_flags_pays_out() {
        assert!(PayTreatmentFlags::paying(1.0).pays_out());
        let test = PayTreatmentFlags {
            multiplier: 1.0,
            hypothetical: false,
            test: true,
        };
        assert!(!test.pays_out());
        let hypo = PayTreatmentFlags {
            multiplier: 1.0,
            hypothetical: true,
            test: false,
        };
        assert!(!hypo.pays_out());
    }

    #[test]
    fn test_schedule_round_lookup() {
        let sched = TreatmentSchedule::new(
            "lo",
            vec![
                PayTreatmentFlags {
                    multiplier: 1.0,
                    hypothetical: false,
                    test: true,
                },
                PayTreatmentFlags::paying(1.0),
                PayTreatmentFlags::paying(20.0),
            ],
        );
        assert!(sched.flags_for_round(0).is_none());
        assert!(sched.flags_for_round(1).unwrap().test);
        assert_eq!(sched.flags_for_round(3).unwrap().multiplier, 20.0);
        assert!(sched.flags_for_round(4).is_none());
    }
}
