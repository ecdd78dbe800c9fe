//! Probability Ladder Builder.
//!
//! Produces the ordered win-probability sequence for gamble A across the N
//! rows of the price list, the complements for gamble B, and the formatted
//! percent strings shown on the decision page. Two ladder variants exist:
//!
//! - `i / N` for row i (the reference design): probabilities start at 1/N
//!   and reach exactly 1 on the last row, never exactly 0.
//! - `(i - 1) / (N - 1)` with boundary rows: spans [0, 1] inclusive, with a
//!   degenerate all-low first row and all-high last row.
//!
//! Built once per session and read-only thereafter.

use crate::config::SessionConfig;
use crate::error::LotteryError;

/// One row of the price list: a fixed pair of win probabilities plus their
/// display strings. Probabilities are strictly increasing in `index`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceRow {
    /// 1-based row number.
    pub index: u32,
    /// Win probability of gamble A's high outcome at this row.
    pub probability_a: f64,
    /// Complement, displayed as gamble B's loss probability.
    pub probability_b: f64,
    /// Formatted `probability_a` ("70%"). Presentational only.
    pub percent_a: String,
    /// Formatted `probability_b`. Presentational only.
    pub percent_b: String,
}

impl ChoiceRow {
    /// Row label for the choice form, e.g. `"70% / 30%"`.
    pub fn label(&self) -> String {
        format!("{} / {}", self.percent_a, self.percent_b)
    }
}

/// Build the N-row probability ladder for a session.
///
/// Fails with `InvalidConfiguration` for `num_choices < 2`; no other error
/// is possible.
pub fn build_ladder(config: &SessionConfig) -> Result<Vec<ChoiceRow>, LotteryError> {
    let n = config.num_choices;
    if n < 2 {
        return Err(LotteryError::InvalidConfiguration(format!(
            "ladder needs at least 2 rows, got {}",
            n
        )));
    }

    let rows = (1..=n)
        .map(|i| {
            let probability_a = if config.include_boundary_rows {
                (i - 1) as f64 / (n - 1) as f64
            } else {
                i as f64 / n as f64
            };
            let probability_b = 1.0 - probability_a;
            ChoiceRow {
                index: i,
                probability_a,
                probability_b,
                percent_a: config.percent_format.render(probability_a),
                percent_b: config.percent_format.render(probability_b),
            }
        })
        .collect();

    Ok(rows)
}
