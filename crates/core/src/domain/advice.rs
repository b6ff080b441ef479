use crate::domain::allocation::Allocation;
use serde::{Deserialize, Serialize};

/// Allocation decided by an advisor, with the reasons it gave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub allocation: Allocation,
    pub rationale: Vec<String>,
}
