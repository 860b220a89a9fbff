pub mod client;
pub mod participant;
pub mod response;
pub mod screen_event;

pub use client::ClientInfo;
pub use participant::{Participant, Progress};
pub use response::SurveyResponse;
pub use screen_event::{ScreenEvent, ScreenEventType};
