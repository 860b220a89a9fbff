use std::collections::HashMap;

use crate::study::{QuestionKind, Screen, StudyGraph};

use super::validation::ValidationFailure;

#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: i64,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct QuestionView {
    pub id: &'static str,
    pub kind: QuestionKind,
    pub prompt_html: &'static str,
    pub required: bool,
    pub value: String,
    pub error: Option<&'static str>,
    pub options: Vec<OptionView>,
}

/// Everything the screen templates need, flattened so the templates only
/// read fields.
#[derive(Debug, Clone)]
pub struct ScreenView {
    pub key: &'static str,
    pub kind: &'static str,
    pub is_interstitial: bool,
    pub text_html: &'static str,
    pub image_url: Option<&'static str>,
    pub next_key: Option<&'static str>,
    pub step: usize,
    pub total_steps: usize,
    pub questions: Vec<QuestionView>,
    pub has_errors: bool,
}

impl ScreenView {
    pub fn new(graph: &StudyGraph, screen: &'static Screen) -> Self {
        Self::build(graph, screen, None)
    }

    /// Re-render of a rejected submission.
    pub fn with_failure(
        graph: &StudyGraph,
        screen: &'static Screen,
        failure: &ValidationFailure,
    ) -> Self {
        Self::build(graph, screen, Some(failure))
    }

    fn build(
        graph: &StudyGraph,
        screen: &'static Screen,
        failure: Option<&ValidationFailure>,
    ) -> Self {
        let no_errors = HashMap::new();
        let no_answers = HashMap::new();
        let (errors, raw) = failure
            .map(|f| (&f.errors, &f.raw_answers))
            .unwrap_or((&no_errors, &no_answers));
        let (step, total_steps) = graph.position(screen.key).unwrap_or((0, 0));

        let questions = screen
            .questions
            .iter()
            .map(|q| {
                let value = raw.get(q.id).cloned().unwrap_or_default();
                let options = q
                    .options
                    .iter()
                    .map(|o| OptionView {
                        value: o.value,
                        label: o.label,
                        selected: value == o.value.to_string(),
                    })
                    .collect();
                QuestionView {
                    id: q.id,
                    kind: q.kind,
                    prompt_html: q.prompt_html,
                    required: q.required,
                    error: errors.get(q.id).copied(),
                    value,
                    options,
                }
            })
            .collect();

        Self {
            key: screen.key,
            kind: screen.kind.as_str(),
            is_interstitial: screen.kind == crate::study::ScreenKind::Interstitial,
            text_html: screen.text_html,
            image_url: screen.image_url,
            next_key: screen.next_key,
            step,
            total_steps,
            questions,
            has_errors: !errors.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::validation::{validate_answers, REQUIRED_MESSAGE};
    use crate::study::STUDY;

    #[test]
    fn fresh_view_has_no_errors() {
        let view = ScreenView::new(&STUDY, STUDY.screen("start").unwrap());
        assert_eq!(view.key, "start");
        assert_eq!((view.step, view.total_steps), (1, 4));
        assert!(!view.has_errors);
        assert!(view.questions.iter().all(|q| q.error.is_none() && q.value.is_empty()));
    }

    #[test]
    fn failure_view_keeps_raw_values_and_messages() {
        let screen = STUDY.screen("start").unwrap();
        let form = HashMap::from([("age".to_string(), "abc".to_string())]);
        let failure = validate_answers(screen, &form).unwrap_err();

        let view = ScreenView::with_failure(&STUDY, screen, &failure);
        assert!(view.has_errors);
        let name = view.questions.iter().find(|q| q.id == "name").unwrap();
        assert_eq!(name.error, Some(REQUIRED_MESSAGE));
        let age = view.questions.iter().find(|q| q.id == "age").unwrap();
        assert_eq!(age.value, "abc");
    }

    #[test]
    fn likert_selection_survives_rerender() {
        let screen = STUDY.screen("task_1").unwrap();
        let failure = ValidationFailure {
            errors: HashMap::from([("interest", "forced")]),
            raw_answers: HashMap::from([("interest", "3".to_string())]),
        };
        let view = ScreenView::with_failure(&STUDY, screen, &failure);
        let selected: Vec<i64> = view.questions[0]
            .options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect();
        assert_eq!(selected, vec![3]);
        assert_eq!(view.image_url, Some("https://via.placeholder.com/400x300"));
    }

    #[test]
    fn interstitial_points_at_successor() {
        let view = ScreenView::new(&STUDY, STUDY.screen("interstitial_1").unwrap());
        assert!(view.is_interstitial);
        assert_eq!(view.next_key, Some("task_1"));
    }
}
