use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use iplus_shared::errors::AppError;
use iplus_shared::types::auth::{Claims, UserRole};

/// Issue a signed bearer token. The claims are returned alongside so the
/// caller can persist the `jti` in `access_tokens` for later revocation.
pub fn issue_token(
    user_id: Uuid,
    role: UserRole,
    secret: &str,
    ttl_secs: i64,
) -> Result<(String, Claims), AppError> {
    let claims = Claims::new(user_id, role, ttl_secs);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))?;
    Ok((token, claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iplus_shared::types::auth::decode_token;

    #[test]
    fn issued_token_decodes_to_same_claims() {
        let user_id = Uuid::now_v7();
        let (token, claims) = issue_token(user_id, UserRole::User, "secret", 3600).unwrap();

        let decoded = decode_token(&token, "secret").unwrap();
        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.jti, claims.jti);
        assert_eq!(decoded.exp, claims.iat + 3600);
    }

    #[test]
    fn each_token_gets_fresh_jti() {
        let user_id = Uuid::now_v7();
        let (_, a) = issue_token(user_id, UserRole::User, "secret", 3600).unwrap();
        let (_, b) = issue_token(user_id, UserRole::User, "secret", 3600).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}
