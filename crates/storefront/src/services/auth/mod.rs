//! Authentication service.
//!
//! Mock email/password authentication against the in-memory account table.
//! Passwords are stored as Argon2id PHC strings; successful logins get a
//! bearer token from [`TokenStore`].

mod error;
pub mod tokens;

pub use error::AuthError;
pub use tokens::{IssuedToken, TokenStore};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};

use afrovibz_core::{Email, UserId, UserRole};

use crate::db::RepositoryError;
use crate::db::accounts::AccountRepository;
use crate::models::{AddressInput, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Demo customer login.
pub const DEMO_CUSTOMER_EMAIL: &str = "customer@afrovibz.com";
/// Demo customer password.
pub const DEMO_CUSTOMER_PASSWORD: &str = "vibes2024!";
/// Demo admin login.
pub const DEMO_ADMIN_EMAIL: &str = "admin@afrovibz.com";
/// Demo admin password, unless overridden by `AFROVIBZ_ADMIN_PASSWORD`.
pub const DEMO_ADMIN_PASSWORD: &str = "admin2024!";

// Hashed once per process; every app instance seeds the same demo table.
static DEMO_CUSTOMER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password(DEMO_CUSTOMER_PASSWORD).ok());
static DEMO_ADMIN_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password(DEMO_ADMIN_PASSWORD).ok());

/// Authentication service.
///
/// Handles registration and login over the account repository.
pub struct AuthService<'a> {
    accounts: &'a AccountRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(accounts: &'a AccountRepository) -> Self {
        Self { accounts }
    }

    /// Register a new customer with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::MissingName` if the name is blank.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        if name.trim().is_empty() {
            return Err(AuthError::MissingName);
        }

        let password_hash = hash_password(password)?;

        self.accounts
            .create(email, name, UserRole::Customer, password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .accounts
            .get_password_hash(&email)
            .await
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.accounts
            .get(user_id)
            .await
            .ok_or(AuthError::UserNotFound)
    }
}

/// Seed the demo customer and admin.
///
/// The customer gets a saved address so checkout works out of the box.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails, or a repository
/// error if the accounts already exist.
pub async fn seed_demo_accounts(
    accounts: &AccountRepository,
    admin_password: Option<&SecretString>,
) -> Result<(), AuthError> {
    let customer_hash = DEMO_CUSTOMER_HASH
        .clone()
        .ok_or(AuthError::PasswordHash)?;
    let admin_hash = match admin_password {
        Some(password) => hash_password(password.expose_secret())?,
        None => DEMO_ADMIN_HASH.clone().ok_or(AuthError::PasswordHash)?,
    };

    let customer = accounts
        .create(
            Email::parse(DEMO_CUSTOMER_EMAIL)?,
            "Ama Mensah",
            UserRole::Customer,
            customer_hash,
        )
        .await?;
    accounts
        .create(
            Email::parse(DEMO_ADMIN_EMAIL)?,
            "AFROVIBZ Admin",
            UserRole::Admin,
            admin_hash,
        )
        .await?;

    accounts
        .add_address(
            customer.id,
            AddressInput {
                full_name: "Ama Mensah".to_string(),
                phone: "+233 20 123 4567".to_string(),
                line1: "14 Oxford Street".to_string(),
                line2: Some("Osu".to_string()),
                city: "Accra".to_string(),
                region: "Greater Accra".to_string(),
                postal_code: None,
                country: "Ghana".to_string(),
                make_default: true,
            },
        )
        .await?;

    tracing::info!(
        customer = DEMO_CUSTOMER_EMAIL,
        admin = DEMO_ADMIN_EMAIL,
        custom_admin_password = admin_password.is_some(),
        "Seeded demo accounts"
    );
    Ok(())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
