use serde_json::Value;
use std::fmt;

/// Advisor failure with enough context to debug a bad model response.
#[derive(Debug, Clone)]
pub struct AdvisorDiagnosticsError {
    pub advisor: &'static str,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl fmt::Display for AdvisorDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "advisor error (advisor={}, stage={}): {}",
            self.advisor, self.stage, self.detail
        )
    }
}

impl std::error::Error for AdvisorDiagnosticsError {}
