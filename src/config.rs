//! Session configuration: row/round counts, base payoffs, treatments, and
//! the scaling and probability rules that distinguish experiment variants.
//!
//! All variant knobs are threaded explicitly through [`SessionConfig`];
//! builders take the config as input and hold no process-wide state.

use std::collections::BTreeMap;

use crate::constants::*;
use crate::error::LotteryError;
use crate::types::{
    Gamble, GambleOutcome, GambleSpec, PayTreatmentFlags, Role, TreatmentSchedule,
};

/// Display rounding for the ladder's percent strings. Purely presentational;
/// never consulted by any draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PercentFormat {
    /// Nearest integer percent ("70%").
    Whole,
    /// One decimal place ("66.7%").
    OneDecimal,
}

impl PercentFormat {
    /// Format a probability in [0, 1] as a percent string.
    pub fn render(self, probability: f64) -> String {
        match self {
            PercentFormat::Whole => format!("{:.0}%", probability * 100.0),
            PercentFormat::OneDecimal => format!("{:.1}%", probability * 100.0),
        }
    }
}

/// Which probability column drives the high-outcome draw for each gamble.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WinProbabilityRule {
    /// Both gambles draw their high outcome with the row's A-probability.
    /// This is the standard Holt-Laury design: the two gambles share one win
    /// probability per row and differ only in outcome spread.
    TiedToGambleA,
    /// Gamble A draws high with the row's A-probability, gamble B with the
    /// complement column. For designs where the gambles do not share a win
    /// probability.
    PerGambleColumn,
}

/// Treatment-selected payoff scaling, applied at table-build time.
///
/// Scaling happens in exactly one layer: the payoff-table builder. The
/// resolver consumes pre-scaled amounts and never multiplies again.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalingRule {
    /// Each round's [`PayTreatmentFlags::multiplier`] scales every amount of
    /// every gamble for every role.
    TreatmentMultiplier,
    /// The designated role's designated gamble has its *low* outcome reduced
    /// by `step * (round - 1)`. Reproduced literally: no clamping at zero.
    /// All other amounts stay at their base values.
    RoundStepReduction {
        role: Role,
        gamble: Gamble,
        step: f64,
    },
}

/// Full session/round configuration consumed by the builders.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Number of rows in the price list (N >= 2).
    pub num_choices: u32,
    /// Number of rounds (R >= 1).
    pub num_rounds: u32,
    /// Ladder variant: `true` spans [0, 1] inclusive via (i-1)/(N-1);
    /// `false` uses i/N and never reaches exactly zero.
    pub include_boundary_rows: bool,
    pub percent_format: PercentFormat,
    pub probability_rule: WinProbabilityRule,
    /// Base (unscaled) payoffs per role.
    pub base_payoffs: BTreeMap<Role, GambleSpec>,
    /// Treatments a participant can be assigned to.
    pub treatments: Vec<TreatmentSchedule>,
    pub scaling: ScalingRule,
}

impl SessionConfig {
    /// The reference experiment: 10 rows, 3 rounds, payoffs A = {20, 16} and
    /// B = {38, 1} for a single decision-maker role, `lo`/`hi` treatments
    /// with a non-paying first test round.
    pub fn default_experiment() -> Self {
        let mut base_payoffs = BTreeMap::new();
        base_payoffs.insert(
            Role::new(ROLE_DECISION_MAKER),
            GambleSpec::new(
                GambleOutcome::new(BASE_A_HIGH, BASE_A_LOW),
                GambleOutcome::new(BASE_B_HIGH, BASE_B_LOW),
            ),
        );

        let schedule = |name: &str, multipliers: &[f64]| {
            let rounds = multipliers
                .iter()
                .enumerate()
                .map(|(i, &m)| PayTreatmentFlags {
                    multiplier: m,
                    hypothetical: false,
                    test: i as u32 + 1 == TEST_ROUND,
                })
                .collect();
            TreatmentSchedule::new(name, rounds)
        };

        SessionConfig {
            num_choices: DEFAULT_NUM_CHOICES,
            num_rounds: DEFAULT_NUM_ROUNDS,
            include_boundary_rows: false,
            percent_format: PercentFormat::Whole,
            probability_rule: WinProbabilityRule::TiedToGambleA,
            base_payoffs,
            treatments: vec![
                schedule(TREATMENT_LO, &LO_MULTIPLIERS),
                schedule(TREATMENT_HI, &HI_MULTIPLIERS),
            ],
            scaling: ScalingRule::TreatmentMultiplier,
        }
    }

    /// The role the table is resolved against when the caller does not care
    /// about role structure (single-role experiments).
    pub fn primary_role(&self) -> &Role {
        self.base_payoffs
            .keys()
            .next()
            .expect("validated config has at least one role")
    }

    /// Validate before any builder runs. Fatal at session-setup time.
    pub fn validate(&self) -> Result<(), LotteryError> {
        if self.num_choices < 2 {
            return Err(LotteryError::InvalidConfiguration(format!(
                "num_choices must be >= 2, got {}",
                self.num_choices
            )));
        }
        if self.num_rounds == 0 {
            return Err(LotteryError::InvalidConfiguration(
                "num_rounds must be >= 1".to_string(),
            ));
        }
        if self.base_payoffs.is_empty() {
            return Err(LotteryError::InvalidConfiguration(
                "base_payoffs must define at least one role".to_string(),
            ));
        }
        for (role, spec) in &self.base_payoffs {
            for (letter, outcome) in [("A", &spec.a), ("B", &spec.b)] {
                if !outcome.is_ordered() {
                    return Err(LotteryError::InvalidConfiguration(format!(
                        "role {} gamble {}: high {} < low {}",
                        role, letter, outcome.high, outcome.low
                    )));
                }
            }
        }
        if self.treatments.is_empty() {
            return Err(LotteryError::InvalidConfiguration(
                "at least one treatment is required".to_string(),
            ));
        }
        for treatment in &self.treatments {
            if treatment.rounds.len() != self.num_rounds as usize {
                return Err(LotteryError::InvalidConfiguration(format!(
                    "treatment {} defines {} rounds, config has {}",
                    treatment.name,
                    treatment.rounds.len(),
                    self.num_rounds
                )));
            }
            for (i, flags) in treatment.rounds.iter().enumerate() {
                if !flags.multiplier.is_finite() || flags.multiplier < 0.0 {
                    return Err(LotteryError::InvalidConfiguration(format!(
                        "treatment {} round {}: bad multiplier {}",
                        treatment.name,
                        i + 1,
                        flags.multiplier
                    )));
                }
            }
        }
        if let ScalingRule::RoundStepReduction { role, step, .. } = &self.scaling {
            if !self.base_payoffs.contains_key(role) {
                return Err(LotteryError::InvalidConfiguration(format!(
                    "scaling rule references unknown role {}",
                    role
                )));
            }
            if !step.is_finite() || *step < 0.0 {
                return Err(LotteryError::InvalidConfiguration(format!(
                    "scaling step must be a non-negative finite amount, got {}",
                    step
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_experiment_valid() {
        let config = SessionConfig::default_experiment();
        config.validate().unwrap();
        assert_eq!(config.num_choices, 10);
        assert_eq!(config.num_rounds, 3);
        assert_eq!(config.treatments.len(), 2);
        assert_eq!(config.primary_role().as_str(), ROLE_DECISION_MAKER);
    }

    #[test]
    fn test_reject_single_row() {
        let mut config = SessionConfig::default_experiment();
        config.num_choices = 1;
        assert!(matches!(
            config.validate(),
            Err(LotteryError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_reject_inverted_outcome() {
        let mut config = SessionConfig::default_experiment();
        let role = config.primary_role().clone();
        config.base_payoffs.get_mut(&role).unwrap().a = GambleOutcome::new(10.0, 12.0);
        assert!(matches!(
            config.validate(),
            Err(LotteryError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_reject_round_count_mismatch() {
        let mut config = SessionConfig::default_experiment();
        config.treatments[0].rounds.pop();
        assert!(matches!(
            config.validate(),
            Err(LotteryError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_reject_unknown_scaling_role() {
        let mut config = SessionConfig::default_experiment();
        config.scaling = ScalingRule::RoundStepReduction {
            role: Role::new("receiver"),
            gamble: Gamble::B,
            step: 2.0,
        };
        assert!(matches!(
            config.validate(),
            Err(LotteryError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_percent_format() {
        assert_eq!(PercentFormat::Whole.render(0.7), "70%");
        assert_eq!(PercentFormat::Whole.render(1.0 / 3.0), "33%");
        assert_eq!(PercentFormat::OneDecimal.render(2.0 / 3.0), "66.7%");
    }
}
