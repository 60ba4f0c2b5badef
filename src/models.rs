//! Data models for the competitive analysis client.
//!
//! This module contains the analysis step table and the competitor
//! records returned by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One named remote analysis operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnalysisStep {
    #[serde(rename = "finder")]
    Finder,
    #[serde(rename = "summarizer")]
    Summarizer,
    #[serde(rename = "rewards")]
    Rewards,
    #[serde(rename = "positioning")]
    Positioning,
    #[serde(rename = "feedback")]
    Feedback,
    #[serde(rename = "swot")]
    Swot,
    #[serde(rename = "compSummary")]
    CompSummary,
    #[serde(rename = "opportunities")]
    Opportunities,
}

/// Shape of the JSON body posted for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `{"brand_name": <brand>}`
    BrandName,
    /// `{}`
    Empty,
}

impl BodyKind {
    /// Build the request body for the given brand name.
    pub fn build(self, brand_name: &str) -> Value {
        match self {
            BodyKind::BrandName => json!({ "brand_name": brand_name }),
            BodyKind::Empty => json!({}),
        }
    }
}

/// Static routing entry for a step.
#[derive(Debug, Clone, Copy)]
pub struct StepSpec {
    pub step: AnalysisStep,
    /// Wire and display name.
    pub name: &'static str,
    /// Environment variable holding the base URL.
    pub env_var: &'static str,
    /// Path appended to the base URL.
    pub path: &'static str,
    pub body: BodyKind,
    /// Label shown on controls and spinners.
    pub label: &'static str,
}

static STEP_TABLE: [StepSpec; 8] = [
    StepSpec {
        step: AnalysisStep::Finder,
        name: "finder",
        env_var: "COMPETITOR_FINDER_URL",
        path: "/analyze-competitors",
        body: BodyKind::BrandName,
        label: "Find Competitors",
    },
    StepSpec {
        step: AnalysisStep::Summarizer,
        name: "summarizer",
        env_var: "PROGRAM_SUMMARIZER_URL",
        path: "/update-all",
        body: BodyKind::Empty,
        label: "Summarize Programs",
    },
    StepSpec {
        step: AnalysisStep::Rewards,
        name: "rewards",
        env_var: "REWARDS_ANALYZER_URL",
        path: "/analyze-rewards",
        body: BodyKind::BrandName,
        label: "Analyze Rewards",
    },
    StepSpec {
        step: AnalysisStep::Positioning,
        name: "positioning",
        env_var: "COMPETITOR_POSITIONING_URL",
        path: "/analyze-positioning",
        body: BodyKind::BrandName,
        label: "Analyze Positioning",
    },
    StepSpec {
        step: AnalysisStep::Feedback,
        name: "feedback",
        env_var: "FEEDBACK_ANALYZER_URL",
        path: "/analyze-feedback",
        body: BodyKind::BrandName,
        label: "Analyze Feedback",
    },
    StepSpec {
        step: AnalysisStep::Swot,
        name: "swot",
        env_var: "SWOT_ANALYZER_URL",
        path: "/analyze-swot",
        body: BodyKind::BrandName,
        label: "SWOT Analysis",
    },
    StepSpec {
        step: AnalysisStep::CompSummary,
        name: "compSummary",
        env_var: "COMPETITIVE_SUMMARY_URL",
        path: "/analyze-competitive-summary",
        body: BodyKind::BrandName,
        label: "Competitive Summary",
    },
    StepSpec {
        step: AnalysisStep::Opportunities,
        name: "opportunities",
        env_var: "DETAILED_OPPORTUNITIES_URL",
        path: "/analyze-opportunities",
        body: BodyKind::BrandName,
        label: "Detect Opportunities",
    },
];

impl AnalysisStep {
    /// All steps in dashboard order.
    pub const ALL: [AnalysisStep; 8] = [
        AnalysisStep::Finder,
        AnalysisStep::Summarizer,
        AnalysisStep::Rewards,
        AnalysisStep::Positioning,
        AnalysisStep::Feedback,
        AnalysisStep::Swot,
        AnalysisStep::CompSummary,
        AnalysisStep::Opportunities,
    ];

    /// Returns the routing entry for this step.
    pub fn spec(self) -> &'static StepSpec {
        // Table is declared in the same order as the enum.
        let entry = &STEP_TABLE[self as usize];
        debug_assert_eq!(entry.step, self);
        entry
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn env_var(self) -> &'static str {
        self.spec().env_var
    }

    pub fn default_path(self) -> &'static str {
        self.spec().path
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    /// Build the JSON request body for this step.
    pub fn request_body(self, brand_name: &str) -> Value {
        self.spec().body.build(brand_name)
    }

    pub fn is_finder(self) -> bool {
        self == AnalysisStep::Finder
    }
}

impl fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AnalysisStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisStep::ALL
            .into_iter()
            .find(|step| step.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown analysis step: {}", s))
    }
}

/// One discovered competitor, as returned by the finder step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub competitor_name: String,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub program_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub competitor_positioning: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub competitor_rewards_benefits: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub competitor_user_feedback: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub competitor_strength: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub competitor_weakness: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub competitor_opportunity: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub competitor_threats: Option<String>,
}

impl Competitor {
    /// Creates a competitor with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            competitor_name: name.into(),
            ..Self::default()
        }
    }

    /// Whether any of the SWOT fields carries text.
    pub fn has_swot(&self) -> bool {
        [
            &self.competitor_strength,
            &self.competitor_weakness,
            &self.competitor_opportunity,
            &self.competitor_threats,
        ]
        .into_iter()
        .any(|field| non_empty(field).is_some())
    }
}

/// Accepts any JSON value for an optional text field.
///
/// Non-string values are kept as their compact JSON text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Returns the field text if it is present and not blank.
pub fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|text| !text.trim().is_empty())
}

/// Success payload of the finder endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinderResponse {
    #[serde(default)]
    pub competitors: Option<Vec<Competitor>>,
}

impl FinderResponse {
    /// Extract the competitor list from an arbitrary success payload.
    pub fn competitors_from(payload: &Value) -> Result<Vec<Competitor>, serde_json::Error> {
        let response = FinderResponse::deserialize(payload)?;
        Ok(response.competitors.unwrap_or_default())
    }
}

/// Failure payload of any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Returns the `detail` message, verbatim when it is a string.
    ///
    /// A blank string counts as absent.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Metadata about an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Brand the analysis was run for.
    pub brand_name: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Steps requested on the command line, in run order.
    pub steps_requested: Vec<AnalysisStep>,
    /// Steps that completed successfully.
    pub steps_completed: Vec<AnalysisStep>,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete competitive analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Latest competitor list.
    pub competitors: Vec<Competitor>,
    /// Last error shown in the error slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Refresh calls that failed silently.
    #[serde(default)]
    pub refresh_failures: usize,
    /// Raw success payloads by step.
    #[serde(default)]
    pub payloads: BTreeMap<AnalysisStep, Value>,
}
