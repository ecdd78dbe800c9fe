//! Canonical experiment constants.
//!
//! Values of the reference Holt-Laury configuration: a 10-row price list
//! played over 3 rounds, with a low-stakes and a high-stakes treatment that
//! differ only in the final round's multiplier. Round 1 is a test round in
//! both treatments and never pays out.

/// Number of rows in the reference price list.
pub const DEFAULT_NUM_CHOICES: u32 = 10;

/// Number of rounds in the reference experiment.
pub const DEFAULT_NUM_ROUNDS: u32 = 3;

/// Gamble A outcomes: the "safe" lottery with a narrow spread.
pub const BASE_A_HIGH: f64 = 20.0;
pub const BASE_A_LOW: f64 = 16.0;

/// Gamble B outcomes: the "risky" lottery with a wide spread.
pub const BASE_B_HIGH: f64 = 38.0;
pub const BASE_B_LOW: f64 = 1.0;

/// The role whose payoffs the reference configuration defines.
pub const ROLE_DECISION_MAKER: &str = "decision_maker";

/// Treatment names.
pub const TREATMENT_LO: &str = "lo";
pub const TREATMENT_HI: &str = "hi";

/// Per-round multipliers. Rounds 1-2 pay base amounts; round 3 scales by
/// 20x (lo) or 90x (hi) to test for incentive effects.
pub const LO_MULTIPLIERS: [f64; DEFAULT_NUM_ROUNDS as usize] = [1.0, 1.0, 20.0];
pub const HI_MULTIPLIERS: [f64; DEFAULT_NUM_ROUNDS as usize] = [1.0, 1.0, 90.0];

/// Round (1-based) flagged as a non-paying test round in both treatments.
pub const TEST_ROUND: u32 = 1;
