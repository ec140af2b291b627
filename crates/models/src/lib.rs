//! SeaORM entities for users, tasks, labels and their join table, with the
//! field validation shared by every write path.

pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod task;
pub mod label;
pub mod task_label;

#[cfg(test)]
mod tests;
