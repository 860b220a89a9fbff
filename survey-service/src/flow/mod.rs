//! Screen advancement: answer validation and the view model the templates
//! render.

pub mod validation;
pub mod view;

pub use validation::{validate_answers, Answer, ValidationFailure};
pub use view::ScreenView;
