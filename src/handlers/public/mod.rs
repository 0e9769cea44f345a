pub mod auth;
pub mod pages;

pub use pages::{health, login_page};
