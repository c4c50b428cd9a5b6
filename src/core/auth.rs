//! Login checks and password handling.
//!
//! A login resolves to either the configured administrator credential pair or
//! a technician record looked up by username. Technician passwords are stored
//! as salted SHA-256 hashes and verified with a constant-time comparison.
//! There is no lockout and no rate limiting; the caller surfaces the typed
//! failures inline on its login form.

use crate::{
    config::settings::AdminCredentials,
    entities::technician,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Who is acting on the system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    /// The administrator (fixed configured credential pair)
    Admin,
    /// A logged-in technician
    Technician(technician::Model),
}

impl Identity {
    /// Whether this identity is the administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Stable author id recorded on notes: `"admin"` or the technician's id.
    #[must_use]
    pub fn author_id(&self) -> String {
        match self {
            Self::Admin => "admin".to_string(),
            Self::Technician(tech) => tech.id.to_string(),
        }
    }

    /// Display name recorded on notes.
    #[must_use]
    pub fn author_name(&self) -> String {
        match self {
            Self::Admin => "Admin".to_string(),
            Self::Technician(tech) => tech.name.clone(),
        }
    }
}

/// Checks a submitted username and password.
///
/// The configured administrator credential wins regardless of the technician
/// table contents; otherwise the username must match a technician record and
/// the password must verify against its stored hash.
///
/// # Errors
/// * [`Error::UsernameNotFound`] - no administrator or technician matches
/// * [`Error::WrongPassword`] - the username matched but the password did not
pub async fn authenticate(
    db: &DatabaseConnection,
    admin: &AdminCredentials,
    username: &str,
    password: &str,
) -> Result<Identity> {
    if username == admin.username {
        if constant_time_eq(password.as_bytes(), admin.password.as_bytes()) {
            debug!("administrator login");
            return Ok(Identity::Admin);
        }
        return Err(Error::WrongPassword);
    }

    let technician = crate::core::technician::get_technician_by_username(db, username)
        .await?
        .ok_or(Error::UsernameNotFound)?;

    if verify_password(&technician.password_hash, password) {
        debug!(technician_id = technician.id, "technician login");
        Ok(Identity::Technician(technician))
    } else {
        Err(Error::WrongPassword)
    }
}

/// Hashes a password with a fresh random salt.
///
/// The result is `"<hex salt>$<hex sha256(salt || password)>"`, the form
/// stored in `technicians.password_hash`.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::random();
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    format!("{}${}", hex::encode(salt), hex::encode(hasher.finalize()))
}

/// Verifies a password against a stored `"<salt>$<digest>"` hash.
///
/// A malformed stored hash verifies as false rather than erroring; such a
/// record is unusable for login either way.
#[must_use]
pub fn verify_password(stored: &str, password: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());
    constant_time_eq(hasher.finalize().as_slice(), &expected)
}

/// Compares two byte strings without short-circuiting on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
