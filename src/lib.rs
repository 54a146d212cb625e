//! Admin console core for an IoT device management platform.
//!
//! ARCHITECTURE
//! ============
//! - [`api`]: authenticated REST client and the platform's endpoint surface
//! - [`session`]: current identity, persisted session record, backend logins
//! - [`guard`]: route access decisions read through the session
//! - [`storage`]: key/value persistence shared by the token and the session
//!
//! The entry point builds one [`storage::SessionStorage`], one
//! [`api::ApiClient`] and one [`session::SessionContext`], calls
//! [`session::SessionContext::initialize_auth`], and shares them by `Arc`.

pub mod api;
pub mod config;
pub mod display;
pub mod guard;
pub mod identity;
pub mod session;
pub mod storage;

#[cfg(test)]
mod test_support;
