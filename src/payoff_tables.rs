//! Payoff Table Builder.
//!
//! Expands the base payoff spec into concrete per-(round, role) gamble
//! amounts under the treatment's scaling rule. The table is a pure function
//! of configuration, built eagerly at session setup and cached for the
//! session's lifetime; the resolver reads amounts from it without applying
//! any further scaling.

use std::collections::BTreeMap;

use crate::config::{ScalingRule, SessionConfig};
use crate::error::LotteryError;
use crate::types::{GambleOutcome, GambleSpec, Role, TreatmentSchedule};

/// Concrete payoff amounts for every (round, role) of one treatment.
#[derive(Clone, Debug, PartialEq)]
pub struct PayoffTable {
    specs: BTreeMap<(u32, Role), GambleSpec>,
}

impl PayoffTable {
    /// Amounts for a 1-based round and a role.
    pub fn get(&self, round: u32, role: &Role) -> Option<&GambleSpec> {
        self.specs.get(&(round, role.clone()))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterate entries in (round, role) order.
    pub fn iter(&self) -> impl Iterator<Item = (&(u32, Role), &GambleSpec)> {
        self.specs.iter()
    }
}

/// Build the payoff table for one treatment schedule.
///
/// `ScalingRule::TreatmentMultiplier` scales every amount by the round's
/// multiplier; `ScalingRule::RoundStepReduction` lowers the designated
/// role's designated gamble's low outcome by `step * (round - 1)` with no
/// floor, leaving everything else at base values.
pub fn build_payoff_table(
    config: &SessionConfig,
    schedule: &TreatmentSchedule,
) -> Result<PayoffTable, LotteryError> {
    if schedule.rounds.len() != config.num_rounds as usize {
        return Err(LotteryError::InvalidConfiguration(format!(
            "treatment {} defines {} rounds, config has {}",
            schedule.name,
            schedule.rounds.len(),
            config.num_rounds
        )));
    }
    if let ScalingRule::RoundStepReduction { role, .. } = &config.scaling {
        if !config.base_payoffs.contains_key(role) {
            return Err(LotteryError::InvalidConfiguration(format!(
                "scaling rule references unknown role {}",
                role
            )));
        }
    }

    let mut specs = BTreeMap::new();
    for round in 1..=config.num_rounds {
        for (role, base) in &config.base_payoffs {
            let spec = match &config.scaling {
                ScalingRule::TreatmentMultiplier => {
                    let multiplier = schedule
                        .flags_for_round(round)
                        .expect("round count checked above")
                        .multiplier;
                    scale_spec(base, multiplier)
                }
                ScalingRule::RoundStepReduction {
                    role: target_role,
                    gamble,
                    step,
                } => {
                    let mut spec = *base;
                    if role == target_role {
                        let outcome = match gamble {
                            crate::types::Gamble::A => &mut spec.a,
                            crate::types::Gamble::B => &mut spec.b,
                        };
                        outcome.low -= step * (round - 1) as f64;
                    }
                    spec
                }
            };
            specs.insert((round, role.clone()), spec);
        }
    }

    Ok(PayoffTable { specs })
}

fn scale_spec(base: &GambleSpec, multiplier: f64) -> GambleSpec {
    GambleSpec::new(
        GambleOutcome::new(base.a.high * multiplier, base.a.low * multiplier),
        GambleOutcome::new(base.b.high * multiplier, base.b.low * multiplier),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{TREATMENT_HI, TREATMENT_LO};
    use crate::types::Gamble;

    fn default_config() -> SessionConfig {
        SessionConfig::default_experiment()
    }

    #[test]
    fn test_multiplier_baked_per_round() {
        let config = default_config();
        let role = config.primary_role().clone();
        let lo = build_payoff_table(&config, &config.treatments[0]).unwrap();
        assert_eq!(config.treatments[0].name, TREATMENT_LO);

        // Rounds 1-2 at base amounts, round 3 scaled by 20.
        let r1 = lo.get(1, &role).unwrap();
        assert_eq!(r1.a.high, 20.0);
        assert_eq!(r1.b.low, 1.0);
        let r3 = lo.get(3, &role).unwrap();
        assert_eq!(r3.a.high, 400.0);
        assert_eq!(r3.a.low, 320.0);
        assert_eq!(r3.b.high, 760.0);
        assert_eq!(r3.b.low, 20.0);

        let hi = build_payoff_table(&config, &config.treatments[1]).unwrap();
        assert_eq!(config.treatments[1].name, TREATMENT_HI);
        assert_eq!(hi.get(3, &role).unwrap().a.high, 1800.0);
    }

    #[test]
    fn test_table_covers_all_rounds_and_roles() {
        let config = default_config();
        let table = build_payoff_table(&config, &config.treatments[0]).unwrap();
        assert_eq!(
            table.len(),
            config.num_rounds as usize * config.base_payoffs.len()
        );
        for round in 1..=config.num_rounds {
            assert!(table.get(round, config.primary_role()).is_some());
        }
        assert!(table.get(0, config.primary_role()).is_none());
        assert!(table.get(4, config.primary_role()).is_none());
    }

    #[test]
    fn test_deterministic() {
        let config = default_config();
        let a = build_payoff_table(&config, &config.treatments[1]).unwrap();
        let b = build_payoff_table(&config, &config.treatments[1]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_step_reduction_literal_no_clamp() {
        let mut config = default_config();
        let role = config.primary_role().clone();
        config.scaling = ScalingRule::RoundStepReduction {
            role: role.clone(),
            gamble: Gamble::B,
            step: 5.0,
        };
        let table = build_payoff_table(&config, &config.treatments[0]).unwrap();

        // Round 1 untouched, round 2 reduced by one step, round 3 by two.
        // Goes below zero: there is no clamping.
        assert_eq!(table.get(1, &role).unwrap().b.low, 1.0);
        assert_eq!(table.get(2, &role).unwrap().b.low, -4.0);
        assert_eq!(table.get(3, &role).unwrap().b.low, -9.0);
        // High outcomes and gamble A stay at base.
        assert_eq!(table.get(3, &role).unwrap().b.high, 38.0);
        assert_eq!(table.get(3, &role).unwrap().a.high, 20.0);
        assert_eq!(table.get(3, &role).unwrap().a.low, 16.0);
    }

    #[test]
    fn test_round_count_mismatch_rejected() {
        let config = default_config();
        let mut short = config.treatments[0].clone();
        short.rounds.pop();
        assert!(matches!(
            build_payoff_table(&config, &short),
            Err(LotteryError::InvalidConfiguration(_))
        ));
    }
}
