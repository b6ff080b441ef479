use crate::domain::advice::Advice;
use crate::domain::contract::LlmAllocationAdvice;
use anyhow::Context;

pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.starts_with("```") {
        // Strip ```json ... ``` fences.
        let mut inner = trimmed;
        if let Some(after_first) = inner.split_once('\n').map(|(_, rest)| rest) {
            inner = after_first;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}

pub fn parse_advice(text: &str) -> anyhow::Result<Advice> {
    let json_str = extract_json(text).unwrap_or_else(|| text.trim().to_string());
    let parsed = serde_json::from_str::<LlmAllocationAdvice>(&json_str)
        .with_context(|| format!("advisor output is not valid allocation JSON: {json_str}"))?;
    parsed.validate_and_into_advice()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_advice_json() -> String {
        json!({
            "stock_percent": 60.0,
            "bond_percent": 40.0,
            "breakdown": {
                "large_cap": 36.0,
                "mid_cap": 15.0,
                "small_cap": 6.0,
                "international": 3.0,
                "bonds": 40.0,
            },
            "rationale": ["balanced for a mid-career saver"],
        })
        .to_string()
    }

    #[test]
    fn extract_json_handles_fenced_blocks() {
        let body = "{\"a\":1}";
        let fenced = format!("```json\n{body}\n```\n");
        assert_eq!(extract_json(&fenced), Some(body.to_string()));
    }

    #[test]
    fn extract_json_falls_back_to_braces() {
        let s = "Here you go: {\"a\":1} hope it helps";
        assert_eq!(extract_json(s), Some("{\"a\":1}".to_string()));
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn parse_advice_accepts_prose_wrapped_json() {
        let text = format!("Sure.\n{}\nLet me know.", valid_advice_json());
        let advice = parse_advice(&text).unwrap();
        assert_eq!(advice.allocation.stock_percent, 60.0);
        assert_eq!(advice.rationale.len(), 1);
    }

    #[test]
    fn parse_advice_rejects_invalid_split() {
        let text = valid_advice_json().replace("40.0", "55.0");
        assert!(parse_advice(&text).is_err());
    }
}
