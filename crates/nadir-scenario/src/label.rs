//! Scenario label codec.
//!
//! A shock of `-0.30` is labeled `<prefix>-30pct`. The magnitude is rounded
//! to the nearest whole percent (ties to even), so distinct shocks closer
//! than half a percent share a label.

use nadir_returns::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Default label prefix.
pub const DEFAULT_LABEL_PREFIX: &str = "SPX_shock_";

/// Label suffix.
pub const LABEL_SUFFIX: &str = "pct";

/// Two-way mapping between shock fractions and scenario labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCodec {
    prefix: String,
}

impl Default for LabelCodec {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_PREFIX)
    }
}

impl LabelCodec {
    /// Create a codec with a custom prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Label prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Shock fraction as a signed whole percentage.
    ///
    /// # Errors
    /// [`AnalysisError::Domain`] for a non-finite shock.
    pub fn percent(shock: f64) -> Result<i64> {
        if !shock.is_finite() {
            return Err(AnalysisError::Domain(format!(
                "shock magnitude {} cannot be labeled",
                shock
            )));
        }
        Ok((shock * 100.0).round_ties_even() as i64)
    }

    /// Label for a shock fraction, e.g. `-0.30` -> `SPX_shock_-30pct`.
    pub fn encode(&self, shock: f64) -> Result<String> {
        Ok(self.encode_percent(Self::percent(shock)?))
    }

    /// Label for a whole-percent shock.
    pub fn encode_percent(&self, percent: i64) -> String {
        format!("{}{}{}", self.prefix, percent, LABEL_SUFFIX)
    }

    /// Whole-percent shock encoded in `label`.
    ///
    /// # Errors
    /// [`AnalysisError::Domain`] if the label does not have this codec's shape.
    pub fn decode(&self, label: &str) -> Result<i64> {
        label
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_suffix(LABEL_SUFFIX))
            .and_then(|core| core.parse::<i64>().ok())
            .ok_or_else(|| AnalysisError::Domain(format!("unrecognized scenario label: {}", label)))
    }

    /// Shock fraction encoded in `label`, e.g. `SPX_shock_-30pct` -> `-0.30`.
    pub fn decode_fraction(&self, label: &str) -> Result<f64> {
        Ok(self.decode(label)? as f64 / 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.30, "SPX_shock_30pct")]
    #[case(-0.30, "SPX_shock_-30pct")]
    #[case(-0.15, "SPX_shock_-15pct")]
    #[case(0.0, "SPX_shock_0pct")]
    #[case(-0.0, "SPX_shock_0pct")]
    #[case(0.304, "SPX_shock_30pct")]
    #[case(-0.999, "SPX_shock_-100pct")]
    fn test_encode(#[case] shock: f64, #[case] expected: &str) {
        assert_eq!(LabelCodec::default().encode(shock).unwrap(), expected);
    }

    #[test]
    fn test_ties_round_to_even() {
        assert_eq!(LabelCodec::percent(0.125).unwrap(), 12);
        assert_eq!(LabelCodec::percent(-0.025).unwrap(), -2);
    }

    #[rstest]
    #[case(-0.30)]
    #[case(-0.15)]
    #[case(0.0)]
    #[case(0.25)]
    fn test_decode_round_trips(#[case] shock: f64) {
        let codec = LabelCodec::default();
        let label = codec.encode(shock).unwrap();
        assert_relative_eq!(codec.decode_fraction(&label).unwrap(), shock, epsilon = 1e-12);
    }

    #[rstest]
    #[case("SPX_shock_30")]
    #[case("NDX_shock_30pct")]
    #[case("SPX_shock_abcpct")]
    #[case("SPX_shock_pct")]
    fn test_decode_rejects(#[case] label: &str) {
        assert!(LabelCodec::default().decode(label).is_err());
    }

    #[test]
    fn test_custom_prefix() {
        let codec = LabelCodec::new("NDX_shock_");
        assert_eq!(codec.encode(-0.2).unwrap(), "NDX_shock_-20pct");
        assert_eq!(codec.decode("NDX_shock_-20pct").unwrap(), -20);
    }

    #[test]
    fn test_non_finite_shock() {
        assert!(LabelCodec::default().encode(f64::NAN).is_err());
        assert!(LabelCodec::default().encode(f64::INFINITY).is_err());
    }
}
