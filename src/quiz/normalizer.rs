//! Turns whatever the quiz generator sent back into canonical multiple-choice
//! questions. Each field is resolved by a list of extractors tried in order;
//! the first one that matches wins.

use crate::api::QuizPayload;
use crate::error::{AppError, Result};
use crate::logger;
use crate::models::{Question, QuestionKind};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    static ref LEADING_JSON_FENCE: Regex = Regex::new(r"(?i)^```json\s*").unwrap();
    static ref LEADING_FENCE: Regex = Regex::new(r"^```\s*").unwrap();
    static ref TRAILING_FENCE: Regex = Regex::new(r"\s*```$").unwrap();
    static ref PLACEHOLDER_OPTION: Regex = Regex::new(r"(?i)^[A-D]$").unwrap();
}

const QUESTION_TEXT_FIELDS: [&str; 2] = ["question", "q"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionShape {
    /// `options: [..]`
    List,
    /// `option1` .. `option4`
    Numbered,
    /// `a` .. `d`
    Lettered,
}

const OPTION_SHAPES: [OptionShape; 3] =
    [OptionShape::List, OptionShape::Numbered, OptionShape::Lettered];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CorrectSource {
    ZeroBased(&'static str),
    OneBased(&'static str),
    AnswerText(&'static str),
}

const CORRECT_SOURCES: [CorrectSource; 4] = [
    CorrectSource::ZeroBased("correct"),
    CorrectSource::ZeroBased("correctAnswer"),
    CorrectSource::OneBased("correctOption"),
    CorrectSource::AnswerText("answer"),
];

/// JavaScript-style truthiness, which is how generators signal "absent".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_field<'a>(raw: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|v| is_truthy(v))
}

impl OptionShape {
    fn extract(&self, raw: &Map<String, Value>) -> Option<Vec<Value>> {
        match self {
            OptionShape::List => match raw.get("options") {
                Some(Value::Array(items)) => Some(items.clone()),
                _ => None,
            },
            OptionShape::Numbered => {
                Self::collect_fields(raw, &["option1", "option2", "option3", "option4"])
            }
            OptionShape::Lettered => Self::collect_fields(raw, &["a", "b", "c", "d"]),
        }
    }

    /// Requires the first two fields to be present; keeps every truthy one.
    fn collect_fields(raw: &Map<String, Value>, keys: &[&str]) -> Option<Vec<Value>> {
        truthy_field(raw, keys[0])?;
        truthy_field(raw, keys[1])?;
        Some(
            keys.iter()
                .filter_map(|key| truthy_field(raw, key).cloned())
                .collect(),
        )
    }
}

impl CorrectSource {
    fn extract(&self, raw: &Map<String, Value>, options: &[String]) -> Option<i64> {
        match self {
            CorrectSource::ZeroBased(key) => raw.get(*key).and_then(number_as_index),
            CorrectSource::OneBased(key) => raw
                .get(*key)
                .and_then(number_as_index)
                .map(|i| i.saturating_sub(1)),
            CorrectSource::AnswerText(key) => {
                let answer = raw.get(*key)?.as_str()?;
                let index = options
                    .iter()
                    .position(|opt| opt == answer)
                    .map(|i| i as i64)
                    .or_else(|| letter_index(answer))
                    .unwrap_or(0);
                Some(index)
            }
        }
    }
}

fn number_as_index(value: &Value) -> Option<i64> {
    value.as_f64().map(|f| f.trunc() as i64)
}

fn letter_index(answer: &str) -> Option<i64> {
    match answer {
        "a" | "A" => Some(0),
        "b" | "B" => Some(1),
        "c" | "C" => Some(2),
        "d" | "D" => Some(3),
        _ => None,
    }
}

fn question_text(raw: &Map<String, Value>, position: usize) -> String {
    QUESTION_TEXT_FIELDS
        .iter()
        .find_map(|key| truthy_field(raw, key))
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| format!("Question {}", position))
}

fn is_placeholder(option: &Value) -> bool {
    option
        .as_str()
        .is_some_and(|s| PLACEHOLDER_OPTION.is_match(s.trim()))
}

/// Strip a markdown code fence (optionally tagged `json`) around a payload.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_json = LEADING_JSON_FENCE.replace(trimmed, "");
    let without_leading = LEADING_FENCE.replace(&without_json, "");
    TRAILING_FENCE
        .replace_all(&without_leading, "")
        .trim()
        .to_string()
}

/// Decode a payload into its list of raw question objects.
pub fn parse_payload(payload: QuizPayload) -> Result<Vec<Value>> {
    match payload {
        QuizPayload::Questions(items) => Ok(items),
        QuizPayload::Text(text) => {
            let cleaned = strip_code_fences(&text);
            let parsed: Value = serde_json::from_str(&cleaned).map_err(|e| {
                logger::error(&format!("Failed to parse quiz JSON: {}\nCleaned: {}", e, cleaned));
                AppError::Parse(format!("Failed to parse quiz data: {}", e))
            })?;
            match parsed {
                Value::Array(items) => Ok(items),
                other => Err(AppError::Parse(format!(
                    "Quiz data is not an array. Received: {}",
                    json_type_name(&other)
                ))),
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalize one raw question. `position` is its 1-based place in the input.
/// Returns `None` when the question has no usable options.
fn normalize_question(raw: &Value, position: usize) -> Option<(String, Vec<String>, usize)> {
    let Some(fields) = raw.as_object() else {
        logger::warn(&format!("Question {} is not an object, skipping", position));
        return None;
    };

    let text = question_text(fields, position);

    let resolved = OPTION_SHAPES
        .iter()
        .find_map(|shape| shape.extract(fields))
        .unwrap_or_default();

    if resolved.iter().all(is_placeholder) || resolved.len() < 2 {
        logger::warn(&format!(
            "Question {} has placeholder or insufficient options, skipping: {:?}",
            position, resolved
        ));
        return None;
    }

    let options: Vec<String> = resolved
        .iter()
        .filter_map(Value::as_str)
        .filter(|opt| !opt.trim().is_empty())
        .map(str::to_string)
        .collect();

    if options.len() < 2 {
        logger::warn(&format!(
            "Question {} has insufficient valid options after filtering",
            position
        ));
        return None;
    }

    let correct = CORRECT_SOURCES
        .iter()
        .find_map(|source| source.extract(fields, &options))
        .unwrap_or(0)
        .clamp(0, options.len() as i64 - 1) as usize;

    Some((text, options, correct))
}

/// Normalize raw question objects, dropping unusable ones. Ids are assigned
/// 1..n over the questions that survive, in input order.
pub fn normalize_questions(raw: &[Value]) -> Result<Vec<Question>> {
    let questions: Vec<Question> = raw
        .iter()
        .enumerate()
        .filter_map(|(index, value)| normalize_question(value, index + 1))
        .enumerate()
        .map(|(index, (question, options, correct))| Question {
            id: index as u32 + 1,
            kind: QuestionKind::MultipleChoice,
            question,
            options,
            correct,
        })
        .collect();

    if questions.is_empty() {
        return Err(AppError::EmptyQuiz);
    }
    Ok(questions)
}

pub fn normalize_quiz(payload: QuizPayload) -> Result<Vec<Question>> {
    let raw = parse_payload(payload)?;
    normalize_questions(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize_one(value: Value) -> Option<Question> {
        normalize_questions(&[value]).ok().map(|mut q| q.remove(0))
    }

    #[test]
    fn test_strip_code_fences_json_tag() {
        let raw = "```json\n[{\"question\":\"x\"}]\n```";
        assert_eq!(strip_code_fences(raw), "[{\"question\":\"x\"}]");
    }

    #[test]
    fn test_strip_code_fences_uppercase_tag_and_plain() {
        assert_eq!(strip_code_fences("```JSON [1]```"), "[1]");
        assert_eq!(strip_code_fences("```\n[2]\n```"), "[2]");
        assert_eq!(strip_code_fences("  [3]  "), "[3]");
    }

    #[test]
    fn test_text_payload_with_fences_parses() {
        let payload = QuizPayload::Text(
            r#"```json
[{"question":"Capital of France?","options":["Berlin","Paris","Rome"],"correct":1}]
```"#
                .to_string(),
        );
        let questions = normalize_quiz(payload).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options[questions[0].correct], "Paris");
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = normalize_quiz(QuizPayload::Text("```json\n[{oops\n```".to_string()));
        assert!(matches!(result, Err(AppError::Parse(_))));
    }

    #[test]
    fn test_non_array_json_is_parse_error() {
        let result = normalize_quiz(QuizPayload::Text(r#"{"question":"x"}"#.to_string()));
        match result {
            Err(AppError::Parse(msg)) => assert!(msg.contains("object")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_placeholder_options_rejected() {
        let q = json!({"question": "Pick", "options": ["A", "B", "C", "D"], "correct": 0});
        assert!(normalize_one(q).is_none());

        let lower = json!({"question": "Pick", "options": [" a ", "b", "c", "d"]});
        assert!(normalize_one(lower).is_none());
    }

    #[test]
    fn test_placeholder_question_dropped_but_others_kept() {
        let raw = vec![
            json!({"question": "Bad", "options": ["A", "B", "C", "D"]}),
            json!({"question": "Good", "options": ["Mitosis", "Meiosis"], "correct": 1}),
        ];
        let questions = normalize_questions(&raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, 1);
        assert_eq!(questions[0].question, "Good");
    }

    #[test]
    fn test_all_rejected_is_empty_quiz() {
        let raw = vec![json!({"question": "Only letters", "options": ["A", "B"]})];
        assert!(matches!(normalize_questions(&raw), Err(AppError::EmptyQuiz)));
    }

    #[test]
    fn test_blank_options_filtered_then_counted() {
        let q = json!({"question": "x", "options": ["Real", "  ", 3, null]});
        assert!(normalize_one(q).is_none());

        let q = json!({"question": "x", "options": ["One", "", "Two"], "correct": 1});
        let question = normalize_one(q).unwrap();
        assert_eq!(question.options, vec!["One", "Two"]);
        assert_eq!(question.correct, 1);
    }

    #[test]
    fn test_question_text_fallbacks() {
        let q = json!({"q": "Short form", "options": ["x", "y"]});
        assert_eq!(normalize_one(q).unwrap().question, "Short form");

        let raw = vec![
            json!({"question": "First", "options": ["x", "y"]}),
            json!({"options": ["x", "y"]}),
        ];
        let questions = normalize_questions(&raw).unwrap();
        assert_eq!(questions[1].question, "Question 2");
    }

    #[test]
    fn test_non_string_question_text_kept() {
        let q = json!({"question": 42, "options": ["x", "y"]});
        assert_eq!(normalize_one(q).unwrap().question, "42");

        let q = json!({"question": "", "q": "Fallback", "options": ["x", "y"]});
        assert_eq!(normalize_one(q).unwrap().question, "Fallback");
    }

    #[test]
    fn test_numbered_option_fields() {
        let q = json!({
            "question": "Largest planet?",
            "option1": "Mars", "option2": "Jupiter", "option3": "", "option4": "Venus",
            "correctOption": 2
        });
        let question = normalize_one(q).unwrap();
        assert_eq!(question.options, vec!["Mars", "Jupiter", "Venus"]);
        assert_eq!(question.correct, 1);
    }

    #[test]
    fn test_lettered_option_fields_with_letter_answer() {
        let q = json!({
            "question": "H2O is?",
            "a": "Salt", "b": "Water", "c": "Air", "d": "Fire",
            "answer": "b"
        });
        let question = normalize_one(q).unwrap();
        assert_eq!(question.options.len(), 4);
        assert_eq!(question.correct, 1);
    }

    #[test]
    fn test_explicit_list_beats_other_shapes() {
        let q = json!({
            "question": "x",
            "options": ["List 1", "List 2"],
            "option1": "Numbered 1", "option2": "Numbered 2"
        });
        assert_eq!(normalize_one(q).unwrap().options, vec!["List 1", "List 2"]);
    }

    #[test]
    fn test_answer_text_matches_option_literally() {
        let q = json!({"question": "x", "options": ["Red", "Green", "Blue"], "answer": "Blue"});
        assert_eq!(normalize_one(q).unwrap().correct, 2);
    }

    #[test]
    fn test_unknown_answer_defaults_to_zero() {
        let q = json!({"question": "x", "options": ["Red", "Green"], "answer": "Purple"});
        assert_eq!(normalize_one(q).unwrap().correct, 0);
    }

    #[test]
    fn test_correct_priority_order() {
        let q = json!({
            "question": "x",
            "options": ["a1", "a2", "a3"],
            "correct": 2, "correctAnswer": 1, "correctOption": 1, "answer": "a1"
        });
        assert_eq!(normalize_one(q).unwrap().correct, 2);

        let q = json!({
            "question": "x",
            "options": ["a1", "a2", "a3"],
            "correct": "2", "correctAnswer": 1
        });
        assert_eq!(normalize_one(q).unwrap().correct, 1);
    }

    #[test]
    fn test_correct_index_clamped() {
        let high = json!({"question": "x", "options": ["p", "q"], "correct": 9});
        assert_eq!(normalize_one(high).unwrap().correct, 1);

        let low = json!({"question": "x", "options": ["p", "q"], "correctOption": 0});
        assert_eq!(normalize_one(low).unwrap().correct, 0);

        let huge_negative =
            json!({"question": "x", "options": ["x", "y", "z"], "correctOption": -1e300});
        assert_eq!(normalize_one(huge_negative).unwrap().correct, 0);
    }

    #[test]
    fn test_correct_always_within_bounds() {
        let raw: Vec<Value> = (-3..8)
            .map(|c| json!({"question": "x", "options": ["a1", "a2", "a3"], "correct": c}))
            .chain((-3..8).map(|c| json!({"question": "y", "a": "p", "b": "q", "correctOption": c})))
            .collect();
        for question in normalize_questions(&raw).unwrap() {
            assert!(question.correct < question.options.len());
        }
    }

    #[test]
    fn test_non_object_entries_skipped() {
        let raw = vec![json!("just text"), json!({"question": "ok", "options": ["x", "y"]})];
        let questions = normalize_questions(&raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, 1);
    }
}
