//! First-run admin account.

use admissions_core::roles::ROLE_ADMIN;
use admissions_db::models::user::{CreateUser, User};
use admissions_db::repositories::UserRepo;
use admissions_db::DbPool;

use crate::auth::password::hash_password;

/// Create an admin account when the users table is empty.
///
/// Returns the new user, or `None` when any account already exists.
pub async fn ensure_admin(
    pool: &DbPool,
    username: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(None);
    }

    let password_hash = hash_password(password)
        .map_err(|e| anyhow::anyhow!("failed to hash bootstrap password: {e}"))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            password_hash,
            display_name: Some("Administrator".to_string()),
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await?;

    Ok(Some(user))
}
