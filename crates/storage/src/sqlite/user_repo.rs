use literacy_core::model::{Role, User};

use super::SqliteRepository;
use super::mapping::{conn, map_user_row, write_error};
use crate::repository::{StorageError, UserRepository};

const INSERT_USER: &str = r"
    INSERT INTO users (id, username, password, full_name, role, class_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
";

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn insert_user(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(INSERT_USER)
            .bind(user.id().to_string())
            .bind(user.username())
            .bind(user.password())
            .bind(user.full_name())
            .bind(user.role().as_str())
            .bind(user.class_id())
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        Ok(())
    }

    async fn insert_users(&self, users: &[User]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for user in users {
            sqlx::query(INSERT_USER)
                .bind(user.id().to_string())
                .bind(user.username())
                .bind(user.password())
                .bind(user.full_name())
                .bind(user.role().as_str())
                .bind(user.class_id())
                .execute(&mut *tx)
                .await
                .map_err(write_error)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, username, password, full_name, role, class_id
            FROM users
            WHERE username = ?1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn list_class(
        &self,
        class_id: &str,
        role: Role,
        limit: u32,
    ) -> Result<Vec<User>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, username, password, full_name, role, class_id
            FROM users
            WHERE class_id = ?1 AND role = ?2
            ORDER BY username ASC
            LIMIT ?3
            ",
        )
        .bind(class_id)
        .bind(role.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_user_row).collect()
    }
}
