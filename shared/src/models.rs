//! Shared data models.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// How the student seems to be feeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeelingLabel {
    Anxious,
    Sad,
    Mad,
    Stressed,
    Lonely,
    Mixed,
    Unsure,
    Calm,
    Happy,
    Positive,
}

impl FeelingLabel {
    pub const ALL: [FeelingLabel; 10] = [
        FeelingLabel::Anxious,
        FeelingLabel::Sad,
        FeelingLabel::Mad,
        FeelingLabel::Stressed,
        FeelingLabel::Lonely,
        FeelingLabel::Mixed,
        FeelingLabel::Unsure,
        FeelingLabel::Calm,
        FeelingLabel::Happy,
        FeelingLabel::Positive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeelingLabel::Anxious => "anxious",
            FeelingLabel::Sad => "sad",
            FeelingLabel::Mad => "mad",
            FeelingLabel::Stressed => "stressed",
            FeelingLabel::Lonely => "lonely",
            FeelingLabel::Mixed => "mixed",
            FeelingLabel::Unsure => "unsure",
            FeelingLabel::Calm => "calm",
            FeelingLabel::Happy => "happy",
            FeelingLabel::Positive => "positive",
        }
    }
}

impl FromStr for FeelingLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown feeling label: {}", s))
    }
}

impl fmt::Display for FeelingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgently the reply points the student toward human help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Escalation {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "encourage-counselor")]
    EncourageCounselor,
    #[serde(rename = "crisis-988")]
    Crisis988,
}

impl Escalation {
    pub const ALL: [Escalation; 3] = [
        Escalation::None,
        Escalation::EncourageCounselor,
        Escalation::Crisis988,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Escalation::None => "none",
            Escalation::EncourageCounselor => "encourage-counselor",
            Escalation::Crisis988 => "crisis-988",
        }
    }
}

impl FromStr for Escalation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown escalation: {}", s))
    }
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The UI-ready reply returned to the caller.
///
/// Every field is serialized on every path. `crisisFlag` is not settable from
/// outside the crate; the safety gate derives it from `escalation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredReply {
    pub message_student: String,
    pub feeling_label: FeelingLabel,
    pub skill_tag: Vec<String>,
    pub tip_summary: String,
    pub next_step_prompt: String,
    pub resource_suggestion: String,
    pub escalation: Escalation,
    #[serde(rename = "crisisFlag")]
    pub(crate) crisis_flag: bool,
}

impl StructuredReply {
    /// The reply used whenever model output cannot be recovered.
    pub fn fallback() -> Self {
        Self {
            message_student: "Sorry, I couldn't process that. Could you try saying it a different way?"
                .to_string(),
            feeling_label: FeelingLabel::Unsure,
            skill_tag: Vec::new(),
            tip_summary: String::new(),
            next_step_prompt: String::new(),
            resource_suggestion: String::new(),
            escalation: Escalation::None,
            crisis_flag: false,
        }
    }

    /// Build a reply from a parsed JSON object.
    ///
    /// Present, well-typed fields are taken as-is. Absent or mistyped fields,
    /// and enum strings outside the known set, take the fallback value.
    /// Any `crisisFlag` in the object is ignored.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let fallback = Self::fallback();
        let text = |key: &str, default: String| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(default)
        };

        Self {
            message_student: text("message_student", fallback.message_student),
            feeling_label: object
                .get("feeling_label")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
                .unwrap_or(fallback.feeling_label),
            skill_tag: match object.get("skill_tag") {
                Some(Value::Array(tags)) => tags
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                Some(Value::String(tag)) if !tag.trim().is_empty() => vec![tag.clone()],
                _ => fallback.skill_tag,
            },
            tip_summary: text("tip_summary", fallback.tip_summary),
            next_step_prompt: text("next_step_prompt", fallback.next_step_prompt),
            resource_suggestion: text("resource_suggestion", fallback.resource_suggestion),
            escalation: object
                .get("escalation")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
                .unwrap_or(fallback.escalation),
            crisis_flag: false,
        }
    }

    /// Whether the reply directs the student to crisis services.
    pub fn crisis_flag(&self) -> bool {
        self.crisis_flag
    }
}
