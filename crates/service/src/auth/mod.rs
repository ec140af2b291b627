//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and password changes live here, together with the
//! JWT issuer the HTTP layer uses to verify bearer tokens.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod token;

pub use service::AuthService;
pub use token::{Claims, TokenIssuer};
