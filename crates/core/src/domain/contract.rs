use crate::domain::advice::Advice;
use crate::domain::allocation::{Allocation, AllocationBreakdown};
use anyhow::ensure;
use serde::{Deserialize, Serialize};

// LLM arithmetic is loose; anything within this many percentage points is renormalized.
const SUM_TOLERANCE: f64 = 0.5;
const MAX_RATIONALE_LINES: usize = 5;

/// Allocation advice exactly as an LLM advisor emits it, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAllocationAdvice {
    pub stock_percent: f64,
    pub bond_percent: f64,
    pub breakdown: LlmBreakdown,
    pub rationale: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmBreakdown {
    pub large_cap: f64,
    pub mid_cap: f64,
    pub small_cap: f64,
    pub international: f64,
    pub bonds: f64,
}

impl LlmAllocationAdvice {
    pub fn validate_and_into_advice(self) -> anyhow::Result<Advice> {
        let b = &self.breakdown;
        for (name, v) in [
            ("stock_percent", self.stock_percent),
            ("bond_percent", self.bond_percent),
            ("large_cap", b.large_cap),
            ("mid_cap", b.mid_cap),
            ("small_cap", b.small_cap),
            ("international", b.international),
            ("bonds", b.bonds),
        ] {
            ensure!(
                v.is_finite() && (0.0..=100.0).contains(&v),
                "{name} must be within 0..=100 (got {v})"
            );
        }

        ensure!(
            (self.stock_percent + self.bond_percent - 100.0).abs() <= SUM_TOLERANCE,
            "stock_percent + bond_percent must be 100 (got {})",
            self.stock_percent + self.bond_percent
        );

        let total = b.large_cap + b.mid_cap + b.small_cap + b.international + b.bonds;
        ensure!(
            (total - 100.0).abs() <= SUM_TOLERANCE,
            "breakdown must sum to 100 (got {total})"
        );
        ensure!(
            (b.bonds - self.bond_percent).abs() <= SUM_TOLERANCE,
            "breakdown.bonds ({}) must match bond_percent ({})",
            b.bonds,
            self.bond_percent
        );

        ensure!(
            (1..=MAX_RATIONALE_LINES).contains(&self.rationale.len()),
            "rationale must have 1..={MAX_RATIONALE_LINES} lines (got {})",
            self.rationale.len()
        );
        let rationale: Vec<String> = self
            .rationale
            .iter()
            .map(|s| s.trim().to_string())
            .collect();
        ensure!(
            rationale.iter().all(|s| !s.is_empty()),
            "rationale lines must be non-empty"
        );

        let allocation = Allocation::from_buckets(AllocationBreakdown {
            large_cap: b.large_cap,
            mid_cap: b.mid_cap,
            small_cap: b.small_cap,
            international: b.international,
            bonds: b.bonds,
        })?;

        Ok(Advice {
            allocation,
            rationale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn advice(stock: f64, bonds: f64, rationale: serde_json::Value) -> LlmAllocationAdvice {
        serde_json::from_value(json!({
            "stock_percent": stock,
            "bond_percent": bonds,
            "breakdown": {
                "large_cap": stock * 0.6,
                "mid_cap": stock * 0.25,
                "small_cap": stock * 0.1,
                "international": stock * 0.05,
                "bonds": bonds,
            },
            "rationale": rationale,
        }))
        .unwrap()
    }

    #[test]
    fn accepts_and_normalizes_valid_advice() {
        let a = advice(70.0, 30.0, json!([" keep it simple ", "age-based glide path"]))
            .validate_and_into_advice()
            .unwrap();
        assert_eq!(a.allocation.stock_percent, 70.0);
        assert_eq!(a.allocation.bond_percent, 30.0);
        assert_eq!(a.rationale[0], "keep it simple");
    }

    #[test]
    fn absorbs_small_rounding_drift() {
        let mut raw = advice(66.6, 33.3, json!(["thirds"]));
        raw.breakdown.bonds = 33.4;
        let a = raw.validate_and_into_advice().unwrap();
        a.allocation.validate().unwrap();
    }

    #[test]
    fn rejects_split_that_does_not_sum() {
        assert!(advice(80.0, 30.0, json!(["x"]))
            .validate_and_into_advice()
            .is_err());
    }

    #[test]
    fn rejects_missing_or_blank_rationale() {
        assert!(advice(60.0, 40.0, json!([])).validate_and_into_advice().is_err());
        assert!(advice(60.0, 40.0, json!(["  "]))
            .validate_and_into_advice()
            .is_err());
    }
}
