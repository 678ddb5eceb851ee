use uuid::Uuid;

use iplus_shared::errors::{AppError, AppResult, ErrorCode};
use iplus_shared::types::auth::AuthUser;

/// The one ownership predicate every owner-gated handler goes through.
pub fn ensure_owner(principal: &AuthUser, owner_id: Uuid, code: ErrorCode) -> AppResult<()> {
    if principal.id == owner_id {
        Ok(())
    } else {
        Err(AppError::new(code, "you do not own this resource"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iplus_shared::types::auth::UserRole;

    fn principal(id: Uuid) -> AuthUser {
        AuthUser { id, role: UserRole::User, token_id: Uuid::now_v7() }
    }

    #[test]
    fn owner_passes_stranger_fails() {
        let owner = Uuid::now_v7();
        assert!(ensure_owner(&principal(owner), owner, ErrorCode::Forbidden).is_ok());

        let err = ensure_owner(&principal(Uuid::now_v7()), owner, ErrorCode::NotListingOwner)
            .unwrap_err();
        match err {
            AppError::Known { code, .. } => assert_eq!(code, ErrorCode::NotListingOwner),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
