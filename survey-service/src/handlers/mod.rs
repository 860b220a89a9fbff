pub mod app;
pub mod flow;
