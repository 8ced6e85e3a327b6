//! Safety and escalation gate.

use tracing::warn;

use crate::upstream::GenerateContentResponse;
use crate::{Escalation, FeelingLabel, StructuredReply};

/// Finish reasons that mean the candidate was withheld for content policy.
const SAFETY_FINISH_REASONS: [&str; 5] = [
    "SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
    "IMAGE_SAFETY",
];

/// Why the completion service withheld its output, if it did.
///
/// A prompt block or a content-policy finish reason both count, whatever text
/// came with the candidate.
pub fn block_reason(response: &GenerateContentResponse) -> Option<String> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.clone())
    {
        return Some(reason);
    }

    match response.finish_reason() {
        Some(reason) if SAFETY_FINISH_REASONS.contains(&reason) => Some(reason.to_string()),
        _ => None,
    }
}

/// The fixed reply returned whenever the completion service reports a block.
pub fn safety_reply(reason: &str) -> StructuredReply {
    warn!(block_reason = %reason, "Completion blocked by safety filter, returning crisis reply");

    finalize(StructuredReply {
        message_student: "It sounds like you might be going through something really hard, and you \
deserve support right now. If you are in danger or thinking about hurting yourself, call or text \
988 (Suicide & Crisis Lifeline) any time, or call 911 in an emergency. Please also tell a trusted \
adult, like a parent, teacher, or school counselor."
            .to_string(),
        feeling_label: FeelingLabel::Unsure,
        skill_tag: vec!["reach-out".to_string()],
        tip_summary: "Reach out to a trusted adult or call 988.".to_string(),
        next_step_prompt: "Who is one trusted adult you could talk to today?".to_string(),
        resource_suggestion: "988 Suicide & Crisis Lifeline: call or text 988".to_string(),
        escalation: Escalation::Crisis988,
        crisis_flag: true,
    })
}

/// Recompute the crisis flag from the escalation category.
pub fn finalize(mut reply: StructuredReply) -> StructuredReply {
    reply.crisis_flag = reply.escalation == Escalation::Crisis988;
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: serde_json::Value) -> GenerateContentResponse {
        GenerateContentResponse::parse(&body.to_string()).unwrap()
    }

    #[test]
    fn test_prompt_block_detected() {
        let blocked = response(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }));
        assert_eq!(block_reason(&blocked).as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_prompt_block_wins_over_text() {
        let blocked = response(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "{\"escalation\":\"none\"}"}]}}],
            "promptFeedback": {"blockReason": "OTHER"}
        }));
        assert_eq!(block_reason(&blocked).as_deref(), Some("OTHER"));
    }

    #[test]
    fn test_safety_finish_without_text_is_block() {
        let blocked = response(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }));
        assert_eq!(block_reason(&blocked).as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_safety_finish_with_partial_text_is_block() {
        let blocked = response(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"message_student\":\"partial\",\"escalation\":\"none\"}"}]},
                "finishReason": "SAFETY"
            }]
        }));
        assert_eq!(block_reason(&blocked).as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_every_policy_finish_reason_is_block() {
        for reason in ["PROHIBITED_CONTENT", "BLOCKLIST", "SPII", "IMAGE_SAFETY"] {
            let blocked = response(serde_json::json!({
                "candidates": [{"finishReason": reason}]
            }));
            assert_eq!(block_reason(&blocked).as_deref(), Some(reason));
        }
    }

    #[test]
    fn test_normal_finish_is_not_block() {
        for reason in ["STOP", "MAX_TOKENS"] {
            let ok = response(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "{}"}]}, "finishReason": reason}]
            }));
            assert_eq!(block_reason(&ok), None);
        }
    }

    #[test]
    fn test_safety_reply_is_crisis() {
        let reply = safety_reply("SAFETY");
        assert_eq!(reply.escalation, Escalation::Crisis988);
        assert!(reply.crisis_flag());
        assert!(reply.message_student.contains("988"));
        assert!(reply.message_student.contains("trusted adult"));
    }

    #[test]
    fn test_finalize_derives_flag() {
        let mut reply = StructuredReply::fallback();
        reply.crisis_flag = true;
        assert!(!finalize(reply).crisis_flag());

        let mut reply = StructuredReply::fallback();
        reply.escalation = Escalation::Crisis988;
        assert!(finalize(reply).crisis_flag());

        let mut reply = StructuredReply::fallback();
        reply.escalation = Escalation::EncourageCounselor;
        assert!(!finalize(reply).crisis_flag());
    }
}
