use super::{LikertOption, Question, QuestionKind, Screen, ScreenKind, StudyGraph};

const AGREEMENT_SCALE: &[LikertOption] = &[
    LikertOption {
        value: 1,
        label: "Strongly Disagree",
    },
    LikertOption {
        value: 2,
        label: "Disagree",
    },
    LikertOption {
        value: 3,
        label: "Neutral",
    },
    LikertOption {
        value: 4,
        label: "Agree",
    },
    LikertOption {
        value: 5,
        label: "Strongly Agree",
    },
];

static SCREENS: [Screen; 4] = [
    Screen {
        key: "start",
        kind: ScreenKind::Content,
        text_html: "<h1>Welcome to the study</h1><p>Please answer the following questions to begin.</p>",
        image_url: None,
        questions: &[
            Question {
                id: "name",
                kind: QuestionKind::Text,
                prompt_html: "What is your name?",
                required: true,
                options: &[],
            },
            Question {
                id: "age",
                kind: QuestionKind::Int,
                prompt_html: "How old are you?",
                required: true,
                options: &[],
            },
        ],
        next_key: Some("interstitial_1"),
    },
    Screen {
        key: "interstitial_1",
        kind: ScreenKind::Interstitial,
        text_html: "<h2>Get ready</h2><p>The next task shows an image.</p>\
                    <p>Press <strong>Space</strong> to continue.</p>",
        image_url: None,
        questions: &[],
        next_key: Some("task_1"),
    },
    Screen {
        key: "task_1",
        kind: ScreenKind::Content,
        text_html: "<h2>Task 1</h2><p>Observe the image and rate your agreement.</p>",
        image_url: Some("https://via.placeholder.com/400x300"),
        questions: &[Question {
            id: "interest",
            kind: QuestionKind::Likert,
            prompt_html: "I found this task interesting.",
            required: true,
            options: AGREEMENT_SCALE,
        }],
        next_key: Some("done"),
    },
    Screen {
        key: "done",
        kind: ScreenKind::Content,
        text_html: "<h2>Thank you!</h2><p>You have completed the study.</p>",
        image_url: None,
        questions: &[],
        next_key: None,
    },
];

pub static STUDY: StudyGraph = StudyGraph::new("start", &SCREENS);
