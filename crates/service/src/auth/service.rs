use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::{AuthRepository, NewUser};
use super::token::TokenIssuer;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub password_algorithm: String,
}

impl Default for AuthConfig {
    fn default() -> Self { Self { password_algorithm: "argon2".into() } }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    tokens: TokenIssuer,
    cfg: AuthConfig,
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, tokens: TokenIssuer, cfg: AuthConfig) -> Self { Self { repo, tokens, cfg } }

    pub fn tokens(&self) -> &TokenIssuer { &self.tokens }

    /// Register a new user with a hashed password and sign them in.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository, TokenIssuer};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let tokens = TokenIssuer::new("secret", chrono::Duration::hours(1));
    /// let svc = AuthService::new(repo, tokens, AuthConfig::default());
    /// let input = RegisterInput { username: "ann".into(), password: "Secret123".into(), first_name: "Ann".into(), last_name: "Lee".into() };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.username, "ann");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        models::user::validate_username(&input.username)?;
        models::user::validate_name("first_name", &input.first_name)?;
        models::user::validate_name("last_name", &input.last_name)?;
        validate_password(&input.password)?;
        if let Some(existing) = self.repo.find_user_by_username(&input.username).await? {
            debug!("username taken: {}", existing.username);
            return Err(AuthError::Conflict);
        }

        let hash = hash_password(&input.password)?;
        let new_user = NewUser { username: &input.username, first_name: &input.first_name, last_name: &input.last_name };
        let user = self.repo.create_user(new_user, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = user.id, username = %user.username, "user_registered");
        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession { user, token })
    }

    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository, TokenIssuer};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let tokens = TokenIssuer::new("secret", chrono::Duration::hours(1));
    /// let svc = AuthService::new(repo, tokens.clone(), AuthConfig::default());
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "bob".into(), password: "Passw0rd".into(), first_name: "Bob".into(), last_name: "B".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "bob".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(tokens.verify(&session.token).unwrap().uid, session.user.id);
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_username(&input.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        self.check_password(user.id, &input.password).await?;
        let token = self.tokens.issue(user.id)?;
        info!(user_id = user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Replace the password after re-checking the current one.
    #[instrument(skip(self, current, new_password))]
    pub async fn change_password(&self, user_id: i32, current: &str, new_password: &str) -> Result<(), AuthError> {
        validate_password(new_password)?;
        self.check_password(user_id, current).await?;
        let hash = hash_password(new_password)?;
        self.repo.upsert_password(user_id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id, "password_changed");
        Ok(())
    }

    pub async fn user(&self, user_id: i32) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::NotFound)
    }

    async fn check_password(&self, user_id: i32, password: &str) -> Result<(), AuthError> {
        let cred = self.repo
            .get_credentials(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }
        Ok(())
    }
}
