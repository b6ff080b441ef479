use crate::advisor::error::AdvisorDiagnosticsError;
use crate::advisor::json;
use crate::advisor::Advisor;
use crate::config::Settings;
use crate::domain::advice::Advice;
use crate::domain::contract::LlmAllocationAdvice;
use crate::domain::health::HealthMetrics;
use crate::domain::profile::Profile;
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const REPAIR_ATTEMPTS: u32 = 1;

const ADVISOR_NAME: &str = "anthropic";
const TOOL_NAME_EMIT_ALLOCATION: &str = "emit_allocation";

#[derive(Debug, Clone)]
pub struct AnthropicAdvisor {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicAdvisor {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let max_tokens = std::env::var("ANTHROPIC_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let timeout_secs = std::env::var("ANTHROPIC_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
            max_tokens,
        })
    }

    async fn create_message(
        &self,
        req: CreateMessageRequest,
    ) -> anyhow::Result<(serde_json::Value, CreateMessageResponse)> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("Anthropic request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Anthropic response body")?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(AdvisorDiagnosticsError {
                advisor: ADVISOR_NAME,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
                raw_response_json,
            }
            .into());
        }

        let raw_json = serde_json::from_str::<serde_json::Value>(&text)
            .with_context(|| format!("failed to parse Anthropic response JSON: {text}"))?;
        let parsed = serde_json::from_value::<CreateMessageResponse>(raw_json.clone())
            .context("failed to decode Anthropic response into CreateMessageResponse")?;
        Ok((raw_json, parsed))
    }

    fn tools() -> Vec<Tool> {
        let pct = serde_json::json!({"type": "number", "minimum": 0, "maximum": 100});
        let schema = serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["stock_percent", "bond_percent", "breakdown", "rationale"],
            "properties": {
                "stock_percent": pct,
                "bond_percent": pct,
                "breakdown": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["large_cap", "mid_cap", "small_cap", "international", "bonds"],
                    "properties": {
                        "large_cap": pct,
                        "mid_cap": pct,
                        "small_cap": pct,
                        "international": pct,
                        "bonds": pct,
                    }
                },
                "rationale": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": 5,
                    "items": {"type": "string"}
                }
            }
        });

        vec![Tool {
            name: TOOL_NAME_EMIT_ALLOCATION,
            description: "Emit the recommended portfolio allocation as structured JSON",
            input_schema: schema,
        }]
    }

    fn tool_choice() -> ToolChoice {
        ToolChoice::Tool {
            name: TOOL_NAME_EMIT_ALLOCATION,
        }
    }

    fn system_prompt() -> String {
        [
            "You are a retirement planning assistant that recommends a stock/bond allocation.",
            "Return ONLY valid JSON. Do not wrap in markdown. Do not include any extra keys.",
            "Output schema:",
            "{",
            "  \"stock_percent\": 75.0,",
            "  \"bond_percent\": 25.0,",
            "  \"breakdown\": {",
            "    \"large_cap\": 45.0, \"mid_cap\": 18.75, \"small_cap\": 7.5,",
            "    \"international\": 3.75, \"bonds\": 25.0",
            "  },",
            "  \"rationale\": [\"line1\", \"line2\"]",
            "}",
            "Rules:",
            "- all values are percentages in [0, 100]",
            "- stock_percent + bond_percent = 100",
            "- the five breakdown buckets sum to 100 and breakdown.bonds = bond_percent",
            "- rationale has 1 to 5 short lines",
            "- a common baseline is 110 minus age in stocks, adjusted for risk tolerance",
        ]
        .join("\n")
    }

    fn user_prompt(profile: &Profile, health: &HealthMetrics) -> String {
        let fmt_opt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |x| format!("{x:.2}"));
        let mut lines = vec![
            format!("Age: {}", profile.age),
            format!("Annual income: {:.0}", profile.annual_income),
            format!("Current savings: {:.0}", profile.current_savings),
            format!("Monthly expenses: {:.0}", profile.monthly_expenses),
            format!("Total debt: {:.0}", profile.total_debt),
            format!("Risk tolerance: {}", profile.risk_tolerance),
            format!(
                "Years to retirement: {}",
                profile
                    .known_years_to_retirement()
                    .map_or_else(|| "unknown".to_string(), |y| y.to_string())
            ),
            format!("Dependents: {}", profile.dependents),
            format!("Savings rate %: {}", fmt_opt(health.savings_rate_percent)),
            format!("Debt to income: {}", fmt_opt(health.debt_to_income)),
            format!("Emergency fund months: {}", fmt_opt(health.emergency_fund_months)),
            format!("Financial risk level: {:?}", health.risk_level),
            format!("Suggested strategy: {}", health.strategy),
        ];
        if !profile.preferred_sectors.is_empty() {
            lines.push(format!(
                "Preferred sectors: {}",
                profile.preferred_sectors.join(", ")
            ));
        }
        if !health.flags.is_empty() {
            let flags: Vec<String> = health.flags.iter().map(ToString::to_string).collect();
            lines.push(format!("Concerns: {}", flags.join("; ")));
        }
        if let Some(career) = &profile.career_field {
            lines.push(format!("Career: {career}"));
        }
        if let Some(location) = &profile.location {
            lines.push(format!("Location: {location}"));
        }
        if !profile.life_goals.is_empty() {
            lines.push(format!("Life goals: {}", profile.life_goals.join("; ")));
        }
        if let Some(notes) = &profile.notes {
            lines.push(format!("Notes: {notes}"));
        }

        format!(
            "Task: Recommend an allocation for this investor.\n\nProfile:\n{}",
            lines.join("\n")
        )
    }

    fn repair_prompt(previous_output: &str, error: &anyhow::Error) -> String {
        format!(
            "Your previous answer was rejected: {error:#}\n\n\
TASK: Output ONLY a single JSON object with keys stock_percent, bond_percent, breakdown, rationale.\n\
- Do NOT include any markdown, prose, or code fences.\n\
- stock_percent + bond_percent MUST be 100.\n\
- breakdown (large_cap, mid_cap, small_cap, international, bonds) MUST sum to 100.\n\
- breakdown.bonds MUST equal bond_percent.\n\n\
INVALID OUTPUT (for reference only; DO NOT copy verbatim):\n{previous_output}"
        )
    }

    fn response_text(res: &CreateMessageResponse) -> String {
        let mut out = String::new();
        for block in &res.content {
            if let ContentBlock::Text { text } = block {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
        out
    }

    fn response_tool_advice(
        res: &CreateMessageResponse,
    ) -> anyhow::Result<Option<LlmAllocationAdvice>> {
        for block in &res.content {
            if let ContentBlock::ToolUse { name, input, .. } = block {
                if name == TOOL_NAME_EMIT_ALLOCATION {
                    let parsed = serde_json::from_value::<LlmAllocationAdvice>(input.clone())
                        .context("failed to decode tool_use.input into LlmAllocationAdvice")?;
                    return Ok(Some(parsed));
                }
            }
        }
        Ok(None)
    }

    fn request(&self, max_tokens: u32, content: String) -> CreateMessageRequest {
        CreateMessageRequest {
            model: self.model.clone(),
            max_tokens,
            system: Some(Self::system_prompt()),
            messages: vec![Message {
                role: "user",
                content,
            }],
            tools: Some(Self::tools()),
            tool_choice: Some(Self::tool_choice()),
        }
    }

    fn parse_response(res: &CreateMessageResponse) -> anyhow::Result<Advice> {
        match Self::response_tool_advice(res)? {
            Some(tool_advice) => tool_advice.validate_and_into_advice(),
            None => json::parse_advice(&Self::response_text(res)),
        }
    }

    fn output_for_repair(res: &CreateMessageResponse, raw_json: &serde_json::Value) -> String {
        res.content
            .iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse { input, .. } => Some(input.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| {
                let text = Self::response_text(res);
                if text.is_empty() {
                    raw_json.to_string()
                } else {
                    text
                }
            })
    }
}

#[async_trait::async_trait]
impl Advisor for AnthropicAdvisor {
    fn name(&self) -> &'static str {
        ADVISOR_NAME
    }

    async fn advise(&self, profile: &Profile, health: &HealthMetrics) -> anyhow::Result<Advice> {
        let prompt = Self::user_prompt(profile, health);
        let (mut raw_json, mut res) = self
            .create_message(self.request(self.max_tokens, prompt.clone()))
            .await?;

        // If the model hit max_tokens, retry once with a higher ceiling.
        if matches!(res.stop_reason.as_deref(), Some("max_tokens")) {
            let bumped = self.max_tokens.saturating_mul(2).max(2048);
            tracing::warn!(
                from = self.max_tokens,
                to = bumped,
                "Anthropic stop_reason=max_tokens; retrying once with higher max_tokens"
            );
            (raw_json, res) = self.create_message(self.request(bumped, prompt)).await?;
        }

        let mut last_err = match Self::parse_response(&res) {
            Ok(advice) => return Ok(advice),
            Err(err) => err,
        };
        let mut last_output = Self::output_for_repair(&res, &raw_json);

        for attempt in 1..=REPAIR_ATTEMPTS {
            tracing::warn!(attempt, error = %last_err, "advisor output invalid; asking for a repair");
            let content = Self::repair_prompt(&last_output, &last_err);
            let (repair_raw, repair_res) = self
                .create_message(self.request(self.max_tokens, content))
                .await?;
            match Self::parse_response(&repair_res) {
                Ok(advice) => return Ok(advice),
                Err(err) => {
                    last_err = err;
                    last_output = Self::output_for_repair(&repair_res, &repair_raw);
                    raw_json = repair_raw;
                }
            }
        }

        Err(AdvisorDiagnosticsError {
            advisor: ADVISOR_NAME,
            stage: "parse_after_repair",
            detail: format!("final_error={last_err:#}"),
            raw_output: Some(last_output),
            raw_response_json: Some(raw_json),
        }
        .into())
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Tool {
    name: &'static str,
    description: &'static str,
    input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
enum ToolChoice {
    #[serde(rename = "tool")]
    Tool { name: &'static str },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },

    #[serde(other)]
    Unknown,
}
