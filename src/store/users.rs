//! VPN user queries.

use super::db::{Store, StoreError};
use super::models::{NewUser, UserStats, UserUpdate, VpnUser};

impl Store {
    /// Create a user.
    ///
    /// A taken username yields `StoreError::Conflict` and leaves the existing
    /// row untouched.
    pub async fn create_user(&self, user: &NewUser) -> Result<VpnUser, StoreError> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            "INSERT INTO users \
             (username, password, upload_mbps, download_mbps, total_traffic_gb, expiry_date) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.upload_mbps)
        .bind(user.download_mbps)
        .bind(user.total_traffic_gb)
        .bind(&user.expiry_date)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        let created = sqlx::query_as::<_, VpnUser>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        log::info!("Created user {} (id {})", created.username, created.id);
        Ok(created)
    }

    /// Get a user by id.
    pub async fn get_user(&self, id: i64) -> Result<VpnUser, StoreError> {
        self.find_user(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("User {id}")))
    }

    /// Get a user by id, `None` when absent.
    pub async fn find_user(&self, id: i64) -> Result<Option<VpnUser>, StoreError> {
        let user = sqlx::query_as::<_, VpnUser>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    /// All users, newest first.
    pub async fn list_users(&self) -> Result<Vec<VpnUser>, StoreError> {
        let users = sqlx::query_as::<_, VpnUser>(
            "SELECT * FROM users ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }

    /// The `limit` most recently created users.
    pub async fn recent_users(&self, limit: i64) -> Result<Vec<VpnUser>, StoreError> {
        let users = sqlx::query_as::<_, VpnUser>(
            "SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }

    /// Active users in insertion order.
    ///
    /// This order is the order of the auth list in the generated config.
    pub async fn active_users(&self) -> Result<Vec<VpnUser>, StoreError> {
        let users = sqlx::query_as::<_, VpnUser>(
            "SELECT * FROM users WHERE is_active = 1 ORDER BY id ASC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }

    /// Update a user.
    ///
    /// `update.password == None` keeps the stored password. Renaming onto a
    /// taken username yields `StoreError::Conflict`.
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<VpnUser, StoreError> {
        let mut tx = self.pool().begin().await?;

        let result = match &update.password {
            Some(password) => {
                sqlx::query(
                    "UPDATE users SET username = ?, password = ?, upload_mbps = ?, \
                     download_mbps = ?, total_traffic_gb = ?, expiry_date = ?, is_active = ? \
                     WHERE id = ?",
                )
                .bind(&update.username)
                .bind(password)
                .bind(update.upload_mbps)
                .bind(update.download_mbps)
                .bind(update.total_traffic_gb)
                .bind(&update.expiry_date)
                .bind(update.is_active)
                .bind(id)
                .execute(&mut *tx)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE users SET username = ?, upload_mbps = ?, \
                     download_mbps = ?, total_traffic_gb = ?, expiry_date = ?, is_active = ? \
                     WHERE id = ?",
                )
                .bind(&update.username)
                .bind(update.upload_mbps)
                .bind(update.download_mbps)
                .bind(update.total_traffic_gb)
                .bind(&update.expiry_date)
                .bind(update.is_active)
                .bind(id)
                .execute(&mut *tx)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("User {id}")));
        }

        let updated = sqlx::query_as::<_, VpnUser>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        log::info!("Updated user {} (id {})", updated.username, id);
        Ok(updated)
    }

    /// Delete a user by id. Returns whether a row was removed.
    pub async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            log::info!("Deleted user id {}", id);
        }
        Ok(removed)
    }

    /// Counters for the dashboard.
    pub async fn user_stats(&self) -> Result<UserStats, StoreError> {
        let (total_users, active_users, total_used_traffic_gb): (i64, i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0), \
                    CAST(COALESCE(SUM(used_traffic_gb), 0) AS REAL) \
             FROM users",
        )
        .fetch_one(self.pool())
        .await?;

        Ok(UserStats {
            total_users,
            active_users,
            total_used_traffic_gb,
        })
    }
}
