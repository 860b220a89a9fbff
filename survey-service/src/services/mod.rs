pub mod database;
pub mod metrics;
pub mod participants;

pub use database::Database;
