use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use iplus_shared::errors::{AppError, ErrorCode};

/// Reset codes are valid for 15 minutes from creation.
pub const OTP_EXPIRY_MINUTES: i64 = 15;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must contain at least one number"));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must contain at least one letter"));
    }
    Ok(())
}

/// 4-digit one-time reset code.
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    format!("{}", rng.gen_range(1000..10000))
}

pub fn otp_expired(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at > Duration::minutes(OTP_EXPIRY_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("hunter2abc1").unwrap();
        assert!(verify_password("hunter2abc1", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn password_strength_rules() {
        assert!(validate_password("short1").is_err());
        assert!(validate_password("lettersonly").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("passw0rd").is_ok());
    }

    #[test]
    fn otp_is_four_digits() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 4);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            assert!(!otp.starts_with('0'));
        }
    }

    #[test]
    fn otp_expiry_window() {
        let now = Utc::now();
        // matching code but stale timestamp must be rejected
        assert!(otp_expired(now - Duration::minutes(16), now));
        assert!(otp_expired(now - Duration::hours(2), now));
        assert!(!otp_expired(now - Duration::minutes(14), now));
        assert!(!otp_expired(now, now));
    }
}
