pub mod pages;
pub mod profile;

pub use pages::{dashboard, home};
pub use profile::me;
