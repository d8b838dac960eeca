use log::warn;
use serde_json::Value;

/// Structured fields extracted from the model's free-form reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedReply {
    pub response: String,
    pub suggested_next_exercise_topic: Option<String>,
    pub risk_hints: Vec<String>,
}

impl DecodedReply {
    fn plain_text(raw: &str) -> Self {
        Self {
            response: raw.to_string(),
            suggested_next_exercise_topic: None,
            risk_hints: Vec::new(),
        }
    }
}

/// Extract the JSON object the model was asked to return, tolerating
/// leading/trailing prose around it. Any parse failure, of any kind,
/// degrades to treating the whole reply as plain text.
pub fn decode_reply(raw: &str) -> DecodedReply {
    let trimmed = raw.trim();

    let parsed: Option<Value> = if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).ok()
    } else {
        match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(start), Some(end)) if start < end => {
                serde_json::from_str(&trimmed[start..=end]).ok()
            }
            _ => None,
        }
    };

    let object = match parsed {
        Some(Value::Object(object)) => object,
        Some(_) => return DecodedReply::plain_text(trimmed),
        None => {
            if trimmed.contains('{') {
                warn!("Failed to parse JSON from model reply");
            }
            return DecodedReply::plain_text(trimmed);
        }
    };

    let response = match object.get("response") {
        Some(Value::String(s)) => s.clone(),
        // Missing or non-string: fall back to the full reply text.
        _ => trimmed.to_string(),
    };

    let suggested_next_exercise_topic = object
        .get("suggestedNextExerciseTopic")
        .and_then(Value::as_str)
        .map(String::from);

    let risk_hints = match object.get("riskHints") {
        Some(Value::String(hint)) => vec![hint.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };

    DecodedReply {
        response,
        suggested_next_exercise_topic,
        risk_hints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json_object() {
        let decoded = decode_reply(
            r#"{"response":"ok","suggestedNextExerciseTopic":"MALWARE","riskHints":["a","b"]}"#,
        );
        assert_eq!(decoded.response, "ok");
        assert_eq!(
            decoded.suggested_next_exercise_topic.as_deref(),
            Some("MALWARE")
        );
        assert_eq!(decoded.risk_hints, vec!["a", "b"]);
    }

    #[test]
    fn wraps_single_string_risk_hint_in_list() {
        let decoded = decode_reply(r#"{"response":"x","riskHints":"y"}"#);
        assert_eq!(decoded.risk_hints, vec!["y"]);
    }

    #[test]
    fn coerces_non_list_risk_hints_to_empty() {
        let decoded = decode_reply(r#"{"response":"x","riskHints":42}"#);
        assert!(decoded.risk_hints.is_empty());
    }

    #[test]
    fn extracts_object_between_surrounding_noise() {
        let decoded = decode_reply(r#"noise {"response":"x"} trailing"#);
        assert_eq!(decoded.response, "x");
        assert_eq!(decoded.suggested_next_exercise_topic, None);
    }

    #[test]
    fn plain_text_without_braces_passes_through() {
        let decoded = decode_reply("plain text, no braces");
        assert_eq!(decoded.response, "plain text, no braces");
        assert_eq!(decoded.suggested_next_exercise_topic, None);
        assert!(decoded.risk_hints.is_empty());
    }

    #[test]
    fn malformed_json_falls_back_to_raw_text() {
        let raw = r#"{"response": "unclosed"#;
        let decoded = decode_reply(raw);
        assert_eq!(decoded.response, raw);
        assert!(decoded.risk_hints.is_empty());
    }

    #[test]
    fn object_missing_response_field_keeps_full_reply() {
        let raw = r#"{"riskHints":["hint"]}"#;
        let decoded = decode_reply(raw);
        assert_eq!(decoded.response, raw);
        assert_eq!(decoded.risk_hints, vec!["hint"]);
    }

    #[test]
    fn leading_whitespace_is_trimmed_before_detection() {
        let decoded = decode_reply("   \n {\"response\":\"x\"} ");
        assert_eq!(decoded.response, "x");
    }
}
