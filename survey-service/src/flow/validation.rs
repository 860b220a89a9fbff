use std::collections::HashMap;

use serde_json::Value;

use crate::study::{QuestionKind, Screen};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_NUMBER_MESSAGE: &str = "Please enter a valid number.";
pub const INVALID_SELECTION_MESSAGE: &str = "Invalid selection.";

/// A validated answer, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub question_id: &'static str,
    pub value: Value,
}

/// What goes back to the participant when a submission is rejected: the
/// message per failing question and every trimmed value as submitted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationFailure {
    pub errors: HashMap<&'static str, &'static str>,
    pub raw_answers: HashMap<&'static str, String>,
}

/// Validate a form submission against the screen's questions.
///
/// Fields that do not belong to a question are ignored. Every question is
/// checked so that all messages are shown at once.
pub fn validate_answers(
    screen: &Screen,
    form: &HashMap<String, String>,
) -> Result<Vec<Answer>, ValidationFailure> {
    let mut failure = ValidationFailure::default();
    let mut answers = Vec::with_capacity(screen.questions.len());

    for question in screen.questions {
        let raw = form
            .get(question.id)
            .map(|v| v.trim())
            .unwrap_or_default();
        failure.raw_answers.insert(question.id, raw.to_string());

        if raw.is_empty() && question.required {
            failure.errors.insert(question.id, REQUIRED_MESSAGE);
            continue;
        }

        // Values are stored as submitted; the kind only decides what is accepted.
        let error = match question.kind {
            _ if raw.is_empty() => None,
            QuestionKind::Text => None,
            QuestionKind::Int => (!is_integer(raw)).then_some(INVALID_NUMBER_MESSAGE),
            QuestionKind::Likert => {
                let selected = raw.parse::<i64>().ok();
                (!selected.is_some_and(|v| question.accepts_option(v)))
                    .then_some(INVALID_SELECTION_MESSAGE)
            }
        };

        match error {
            None => answers.push(Answer {
                question_id: question.id,
                value: Value::String(raw.to_string()),
            }),
            Some(message) => {
                failure.errors.insert(question.id, message);
            }
        }
    }

    if failure.errors.is_empty() {
        Ok(answers)
    } else {
        Err(failure)
    }
}

/// An optionally signed run of ASCII digits, of any length.
fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
