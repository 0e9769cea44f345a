pub mod login;
pub mod logout;
pub mod session;

pub use login::login;
pub use logout::logout;
pub use session::session;
