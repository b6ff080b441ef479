use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

// Percentages are normalized at hundredth-of-a-percent precision.
const UNITS_PER_PERCENT: f64 = 100.0;
const TOTAL_UNITS: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationBreakdown {
    pub large_cap: f64,
    pub mid_cap: f64,
    pub small_cap: f64,
    pub international: f64,
    pub bonds: f64,
}

/// Stock/bond split plus the five-bucket breakdown, all in percent of the total portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub stock_percent: f64,
    pub bond_percent: f64,
    pub breakdown: AllocationBreakdown,
}

fn to_units(percent: f64) -> i64 {
    (percent * UNITS_PER_PERCENT).round() as i64
}

fn from_units(units: i64) -> f64 {
    units as f64 / UNITS_PER_PERCENT
}

impl Allocation {
    /// Builds an allocation from raw bucket percentages.
    ///
    /// Buckets are rounded to 0.01% and whatever rounding remainder is left over is assigned to
    /// the largest bucket, so the result always sums to exactly 100.
    pub fn from_buckets(raw: AllocationBreakdown) -> anyhow::Result<Self> {
        let values = [
            raw.large_cap,
            raw.mid_cap,
            raw.small_cap,
            raw.international,
            raw.bonds,
        ];
        for v in values {
            ensure!(
                v.is_finite() && v >= 0.0,
                "allocation bucket must be a finite non-negative percent (got {v})"
            );
        }

        let mut units = values.map(to_units);
        let remainder = TOTAL_UNITS - units.iter().sum::<i64>();
        if remainder != 0 {
            // First maximum wins on ties so the result is deterministic.
            let largest = units
                .iter()
                .enumerate()
                .fold(0, |best, (i, &u)| if u > units[best] { i } else { best });
            units[largest] += remainder;
            tracing::debug!(remainder, bucket = largest, "assigned allocation rounding remainder");
        }

        let [large, mid, small, intl, bonds] = units;
        let allocation = Self {
            stock_percent: from_units(large + mid + small + intl),
            bond_percent: from_units(bonds),
            breakdown: AllocationBreakdown {
                large_cap: from_units(large),
                mid_cap: from_units(mid),
                small_cap: from_units(small),
                international: from_units(intl),
                bonds: from_units(bonds),
            },
        };
        allocation
            .validate()
            .context("allocation invariant violated after normalization")?;
        Ok(allocation)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let b = &self.breakdown;
        let buckets = [b.large_cap, b.mid_cap, b.small_cap, b.international, b.bonds].map(to_units);
        for u in buckets {
            ensure!(
                (0..=TOTAL_UNITS).contains(&u),
                "allocation bucket out of range: {}",
                from_units(u)
            );
        }

        let stock = to_units(self.stock_percent);
        let bond = to_units(self.bond_percent);
        ensure!(
            stock + bond == TOTAL_UNITS,
            "stock ({}) + bond ({}) must equal 100",
            self.stock_percent,
            self.bond_percent
        );
        ensure!(
            buckets.iter().sum::<i64>() == TOTAL_UNITS,
            "allocation breakdown must sum to 100"
        );
        ensure!(
            buckets[4] == bond,
            "bonds bucket ({}) must equal bond percent ({})",
            b.bonds,
            self.bond_percent
        );
        ensure!(
            buckets[..4].iter().sum::<i64>() == stock,
            "stock buckets must sum to stock percent ({})",
            self.stock_percent
        );
        Ok(())
    }

    pub fn stock_fraction(&self) -> f64 {
        self.stock_percent / 100.0
    }

    pub fn bond_fraction(&self) -> f64 {
        self.bond_percent / 100.0
    }
}
