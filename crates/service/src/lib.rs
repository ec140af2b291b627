//! Service layer: business operations on top of the `models` entities.
//! - Everything is scoped to the acting user.
//! - Auth (password hashing, sessions) sits behind a repository trait.
//! - Calendar grids and list columns are computed here, not in the client.

pub mod errors;
pub mod auth;
pub mod calendar;
pub mod db;
pub mod events;
pub mod views;
#[cfg(test)]
pub mod test_support;
