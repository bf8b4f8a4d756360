//! Authentication and user management service

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{is_password_valid, CreateUser, LoginRequest, LoginResponse, NewUser, User, UserClaims},
    repository::UserStore,
};

const LOGIN_FAILED: &str = "incorrect email address or password";

#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UserStore>,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(users: Arc<dyn UserStore>, config: AuthConfig) -> Self {
        Self { users, config }
    }

    /// Register a new account
    pub async fn register(&self, data: CreateUser) -> AppResult<User> {
        if data.has_blank_fields() {
            return Err(AppError::Validation(
                "first_name, last_name, email and password are required".to_string(),
            ));
        }

        let data = CreateUser {
            first_name: data.first_name.trim().to_string(),
            last_name: data.last_name.trim().to_string(),
            email: data.email.trim().to_lowercase(),
            password: data.password,
        };

        data.validate()
            .map_err(|_| AppError::Validation("invalid email address".to_string()))?;

        if self.users.get_by_email(&data.email).await?.is_some() {
            return Err(AppError::Conflict(
                "failed to register. Email address already in use".to_string(),
            ));
        }

        if !is_password_valid(&data.password) {
            return Err(AppError::Validation(
                "password must be 8 to 15 characters long and contain an upper case letter, a lower case letter and a digit, without spaces"
                    .to_string(),
            ));
        }

        let new_user = NewUser {
            id: Uuid::new_v4(),
            password_hash: self.hash_password(&data.password)?,
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
        };

        let user = self.users.create(&new_user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check credentials and issue a token
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let user = self
            .users
            .get_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::Authentication(LOGIN_FAILED.to_string()))?;

        if !self.verify_password(&user, &request.password)? {
            tracing::debug!(user_id = %user.id, "login rejected");
            return Err(AppError::Authentication(LOGIN_FAILED.to_string()));
        }

        let token = self.create_token(&user)?;
        Ok(LoginResponse {
            email: user.email,
            token,
        })
    }

    /// Resolve a bearer token to the user it was issued for
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("invalid or expired token".to_string()))?;

        self.users
            .get_by_email(&claims.email)
            .await?
            .ok_or_else(|| AppError::Authentication("unknown user".to_string()))
    }

    fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
