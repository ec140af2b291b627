use async_trait::async_trait;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Profile fields of a user being created.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, user_id: i32) -> Result<Option<AuthUser>, AuthError>;

    /// Create the user and its credentials atomically.
    async fn create_user(&self, user: NewUser<'_>, password_hash: String, password_algorithm: String) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: i32, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: username
        creds: Mutex<HashMap<i32, Credentials>>, // key: user_id
    }

    impl MockAuthRepository {
        fn lock_err<T>(_: T) -> AuthError {
            AuthError::Repository("mock lock poisoned".into())
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().map_err(Self::lock_err)?;
            Ok(users.get(username).cloned())
        }

        async fn find_user_by_id(&self, user_id: i32) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().map_err(Self::lock_err)?;
            Ok(users.values().find(|u| u.id == user_id).cloned())
        }

        async fn create_user(&self, user: NewUser<'_>, password_hash: String, password_algorithm: String) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().map_err(Self::lock_err)?;
            if users.contains_key(user.username) {
                return Err(AuthError::Conflict);
            }
            let created = AuthUser {
                id: users.len() as i32 + 1,
                username: user.username.to_string(),
                first_name: user.first_name.to_string(),
                last_name: user.last_name.to_string(),
            };
            users.insert(created.username.clone(), created.clone());
            drop(users);
            let mut creds = self.creds.lock().map_err(Self::lock_err)?;
            creds.insert(created.id, Credentials { user_id: created.id, password_hash, password_algorithm });
            Ok(created)
        }

        async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().map_err(Self::lock_err)?;
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: i32, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().map_err(Self::lock_err)?;
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }
    }
}
