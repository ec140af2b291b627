//! Owner-scoped data access. Every function takes the acting user's id and
//! never touches rows belonging to someone else; a foreign id looks exactly
//! like a missing one.

pub mod label_service;
pub mod task_service;
pub mod user_service;

#[cfg(test)]
mod tests;
