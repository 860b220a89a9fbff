//! The static study: a chain of screens walked in order.

mod screens;

use std::collections::HashSet;
use thiserror::Error;

pub use screens::STUDY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Content,
    Interstitial,
}

impl ScreenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Interstitial => "interstitial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Text,
    Int,
    Likert,
}

#[derive(Debug, Clone, Copy)]
pub struct LikertOption {
    pub value: i64,
    pub label: &'static str,
}

#[derive(Debug)]
pub struct Question {
    pub id: &'static str,
    pub kind: QuestionKind,
    pub prompt_html: &'static str,
    pub required: bool,
    pub options: &'static [LikertOption],
}

impl Question {
    pub fn accepts_option(&self, value: i64) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

#[derive(Debug)]
pub struct Screen {
    pub key: &'static str,
    pub kind: ScreenKind,
    pub text_html: &'static str,
    pub image_url: Option<&'static str>,
    pub questions: &'static [Question],
    pub next_key: Option<&'static str>,
}

impl Screen {
    pub fn is_terminal(&self) -> bool {
        self.next_key.is_none()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("first screen '{0}' is not defined")]
    MissingFirstScreen(&'static str),
    #[error("screen key '{0}' is defined more than once")]
    DuplicateScreen(&'static str),
    #[error("screen '{from}' points to unknown screen '{to}'")]
    DanglingNext {
        from: &'static str,
        to: &'static str,
    },
    #[error("screen chain revisits '{0}'")]
    Cycle(&'static str),
    #[error("screen '{screen}' repeats question id '{question}'")]
    DuplicateQuestion {
        screen: &'static str,
        question: &'static str,
    },
    #[error("question '{screen}.{question}' has the wrong option set for its kind")]
    BadOptions {
        screen: &'static str,
        question: &'static str,
    },
}

/// An ordered table of screens plus the key participants start on.
#[derive(Debug)]
pub struct StudyGraph {
    first_key: &'static str,
    screens: &'static [Screen],
}

impl StudyGraph {
    pub const fn new(first_key: &'static str, screens: &'static [Screen]) -> Self {
        Self { first_key, screens }
    }

    pub fn first_screen_key(&self) -> &'static str {
        self.first_key
    }

    pub fn screen(&self, key: &str) -> Option<&'static Screen> {
        self.screens.iter().find(|s| s.key == key)
    }

    pub fn next_key(&self, key: &str) -> Option<&'static str> {
        self.screen(key).and_then(|s| s.next_key)
    }

    /// 1-based step of `key` along the chain from the first screen, and the
    /// chain length. `None` for keys that are not on the chain.
    pub fn position(&self, key: &str) -> Option<(usize, usize)> {
        let chain = self.chain();
        let step = chain.iter().position(|k| *k == key)?;
        Some((step + 1, chain.len()))
    }

    fn chain(&self) -> Vec<&'static str> {
        let mut chain = Vec::new();
        let mut current = self.screen(self.first_key);
        while let Some(screen) = current {
            if chain.contains(&screen.key) {
                break;
            }
            chain.push(screen.key);
            current = screen.next_key.and_then(|k| self.screen(k));
        }
        chain
    }

    /// Check the structural invariants the handlers rely on.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut keys = HashSet::new();
        for screen in self.screens {
            if !keys.insert(screen.key) {
                return Err(GraphError::DuplicateScreen(screen.key));
            }
        }

        if !keys.contains(self.first_key) {
            return Err(GraphError::MissingFirstScreen(self.first_key));
        }

        for screen in self.screens {
            if let Some(next) = screen.next_key {
                if !keys.contains(next) {
                    return Err(GraphError::DanglingNext {
                        from: screen.key,
                        to: next,
                    });
                }
            }

            let mut question_ids = HashSet::new();
            for question in screen.questions {
                if !question_ids.insert(question.id) {
                    return Err(GraphError::DuplicateQuestion {
                        screen: screen.key,
                        question: question.id,
                    });
                }
                let needs_options = question.kind == QuestionKind::Likert;
                if needs_options == question.options.is_empty() {
                    return Err(GraphError::BadOptions {
                        screen: screen.key,
                        question: question.id,
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        let mut current = Some(self.first_key);
        while let Some(key) = current {
            if !seen.insert(key) {
                return Err(GraphError::Cycle(key));
            }
            current = self.next_key(key);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_study_is_valid() {
        assert_eq!(STUDY.validate(), Ok(()));
    }

    #[test]
    fn walks_start_to_done() {
        assert_eq!(STUDY.first_screen_key(), "start");
        assert_eq!(STUDY.next_key("start"), Some("interstitial_1"));
        assert_eq!(STUDY.next_key("interstitial_1"), Some("task_1"));
        assert_eq!(STUDY.next_key("task_1"), Some("done"));
        assert_eq!(STUDY.next_key("done"), None);
        assert!(STUDY.screen("done").unwrap().is_terminal());
    }

    #[test]
    fn unknown_keys_resolve_to_nothing() {
        assert!(STUDY.screen("nope").is_none());
        assert_eq!(STUDY.next_key("nope"), None);
        assert_eq!(STUDY.position("nope"), None);
    }

    #[test]
    fn position_counts_along_chain() {
        assert_eq!(STUDY.position("start"), Some((1, 4)));
        assert_eq!(STUDY.position("task_1"), Some((3, 4)));
        assert_eq!(STUDY.position("done"), Some((4, 4)));
    }

    static LOOP: [Screen; 2] = [
        Screen {
            key: "a",
            kind: ScreenKind::Content,
            text_html: "",
            image_url: None,
            questions: &[],
            next_key: Some("b"),
        },
        Screen {
            key: "b",
            kind: ScreenKind::Content,
            text_html: "",
            image_url: None,
            questions: &[],
            next_key: Some("a"),
        },
    ];

    #[test]
    fn detects_cycles() {
        let graph = StudyGraph::new("a", &LOOP);
        assert_eq!(graph.validate(), Err(GraphError::Cycle("a")));
        // position() must still terminate on a cyclic table
        assert_eq!(graph.position("b"), Some((2, 2)));
    }

    static DANGLING: [Screen; 1] = [Screen {
        key: "a",
        kind: ScreenKind::Content,
        text_html: "",
        image_url: None,
        questions: &[],
        next_key: Some("missing"),
    }];

    #[test]
    fn detects_dangling_successor() {
        let graph = StudyGraph::new("a", &DANGLING);
        assert_eq!(
            graph.validate(),
            Err(GraphError::DanglingNext {
                from: "a",
                to: "missing"
            })
        );
        assert_eq!(
            StudyGraph::new("zzz", &DANGLING).validate(),
            Err(GraphError::MissingFirstScreen("zzz"))
        );
    }

    static BARE_LIKERT: [Screen; 1] = [Screen {
        key: "a",
        kind: ScreenKind::Content,
        text_html: "",
        image_url: None,
        questions: &[Question {
            id: "q",
            kind: QuestionKind::Likert,
            prompt_html: "",
            required: true,
            options: &[],
        }],
        next_key: None,
    }];

    #[test]
    fn likert_without_options_is_rejected() {
        let graph = StudyGraph::new("a", &BARE_LIKERT);
        assert_eq!(
            graph.validate(),
            Err(GraphError::BadOptions {
                screen: "a",
                question: "q"
            })
        );
    }
}
