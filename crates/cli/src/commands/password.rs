//! Password hashing.

use std::io::Write;

use afrovibz_storefront::services::auth::hash_password;

/// Print an Argon2id PHC hash of `password` on stdout.
///
/// # Errors
///
/// Returns an error if hashing or writing fails.
pub fn hash(password: &str) -> Result<(), Box<dyn std::error::Error>> {
    if password.is_empty() {
        return Err("password must not be empty".into());
    }
    let hash = hash_password(password)?;
    writeln!(std::io::stdout().lock(), "{hash}")?;
    Ok(())
}
