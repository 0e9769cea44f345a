pub mod admin_dashboard;

pub use admin_dashboard::admin_dashboard;
