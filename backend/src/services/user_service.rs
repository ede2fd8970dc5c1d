use crate::error::AppError;
use crate::models::{ProfileChanges, User};
use crate::services::auth_service::{map_identity_conflict, normalize_email};
use bid_lotto_shared::{
    UpdateUserRequest, UserRole, ERROR_ADMIN_ONLY, ERROR_EMAIL_ALREADY_EXISTS, ERROR_PHONE_ALREADY_EXISTS,
    ERROR_USER_NOT_FOUND,
};
use sqlx::PgPool;
use tracing::info;

/// User directory and profile edits. Role, wallet and password are out of reach here.
#[derive(Clone)]
pub struct UserService {
    db_pool: PgPool,
}

impl UserService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        User::list_all(&self.db_pool).await
    }

    /// Fetch user `id` on behalf of the requester (admin or the user themself).
    pub async fn get(&self, requester_id: i64, requester_role: UserRole, id: i64) -> Result<User, AppError> {
        ensure_self_or_admin(requester_id, requester_role, id)?;

        User::find_by_id(&self.db_pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()))
    }

    pub async fn update_profile(
        &self,
        requester_id: i64,
        requester_role: UserRole,
        id: i64,
        request: UpdateUserRequest,
    ) -> Result<User, AppError> {
        ensure_self_or_admin(requester_id, requester_role, id)?;

        if request.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        let email = request.email.as_deref().map(normalize_email);
        let phone = request.phone.as_deref().map(str::trim);

        let mut tx = self.db_pool.begin().await?;

        if let Some(email) = email.as_deref() {
            if User::email_taken(&mut *tx, email, Some(id)).await? {
                return Err(AppError::Conflict(ERROR_EMAIL_ALREADY_EXISTS.to_string()));
            }
        }
        if let Some(phone) = phone {
            if User::phone_taken(&mut *tx, phone, Some(id)).await? {
                return Err(AppError::Conflict(ERROR_PHONE_ALREADY_EXISTS.to_string()));
            }
        }

        let changes = ProfileChanges {
            email: email.as_deref(),
            phone,
            first_name: request.first_name.as_deref().map(str::trim),
            last_name: request.last_name.as_deref().map(str::trim),
        };

        let user = User::update_profile(&mut *tx, id, changes)
            .await
            .map_err(map_identity_conflict)?
            .ok_or_else(|| AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()))?;

        tx.commit().await?;

        info!("User {} updated profile of user {}", requester_id, id);
        Ok(user)
    }
}

fn ensure_self_or_admin(requester_id: i64, requester_role: UserRole, id: i64) -> Result<(), AppError> {
    if requester_role == UserRole::Admin || requester_id == id {
        Ok(())
    } else {
        Err(AppError::Authorization(ERROR_ADMIN_ONLY.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_self_or_admin_may_access_a_profile() {
        assert!(ensure_self_or_admin(5, UserRole::Customer, 5).is_ok());
        assert!(ensure_self_or_admin(1, UserRole::Admin, 5).is_ok());
        assert!(matches!(
            ensure_self_or_admin(4, UserRole::Customer, 5),
            Err(AppError::Authorization(_))
        ));
    }
}
