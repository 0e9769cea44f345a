// handlers/mod.rs - tiered handlers
//
// Public (allow-listed, no session) → Protected (any session) → Elevated (administrator)
pub mod public;
pub mod protected;
pub mod elevated;
