//! Administrator queries.

use super::db::{Store, StoreError};
use super::models::Admin;
use super::password::{hash_password, verify_password};

impl Store {
    /// Get an administrator by id.
    pub async fn get_admin(&self, id: i64) -> Result<Admin, StoreError> {
        self.find_admin(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Admin {id}")))
    }

    /// Get an administrator by id, `None` when it does not exist.
    pub async fn find_admin(&self, id: i64) -> Result<Option<Admin>, StoreError> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(admin)
    }

    /// Get an administrator by username.
    pub async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool())
            .await?;
        Ok(admin)
    }

    /// Check a login attempt. `None` for an unknown user or a wrong password.
    pub async fn authenticate_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Admin>, StoreError> {
        let Some(admin) = self.find_admin_by_username(username).await? else {
            return Ok(None);
        };

        if verify_password(password, &admin.password)? {
            Ok(Some(admin))
        } else {
            Ok(None)
        }
    }

    /// Replace an administrator's password after verifying the old one.
    ///
    /// Returns `false` (and changes nothing) when `old_password` does not match.
    pub async fn change_admin_password(
        &self,
        id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<bool, StoreError> {
        let admin = self.get_admin(id).await?;
        if !verify_password(old_password, &admin.password)? {
            log::warn!("Password change for admin {} rejected: old password mismatch", admin.username);
            return Ok(false);
        }

        let hash = hash_password(new_password)?;
        sqlx::query("UPDATE admins SET password = ? WHERE id = ?")
            .bind(hash)
            .bind(id)
            .execute(self.pool())
            .await?;

        log::info!("Password changed for admin {}", admin.username);
        Ok(true)
    }
}
