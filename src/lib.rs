pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod poller;
pub mod services;
pub mod session;

pub use app::{app, AppState};
