pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod state;
pub mod store;
pub mod ui;
pub mod validation;

pub use app::router;
pub use client::PersistenceClient;
pub use config::Config;
pub use state::AppState;
pub use store::{Backend, DocumentStore};
