//! Role store over PostgreSQL.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_core::query_scalar::query_scalar;
use time::OffsetDateTime;
use uuid::Uuid;

use gatehouse_auth::store::roles::{Role, RoleStore};
use gatehouse_auth::{AuthError, AuthResult};

use crate::{PgPool, db_err, is_unique_violation};

/// PostgreSQL implementation of [`RoleStore`].
///
/// Membership rows carry an `assigned_at` timestamp; `role_names` reports
/// roles in assignment order.
pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    /// Creates a role store over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn find_by_name(&self, name: &str) -> AuthResult<Option<Role>> {
        let row: Option<(Uuid, String, OffsetDateTime)> =
            query_as("SELECT id, name, created_at FROM roles WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_err("find role by name", e))?;

        Ok(row.map(|(id, name, created_at)| Role {
            id,
            name,
            created_at,
        }))
    }

    async fn create(&self, role: &Role) -> AuthResult<()> {
        let result = query("INSERT INTO roles (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(role.id)
            .bind(&role.name)
            .bind(role.created_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AuthError::storage(format!(
                "role '{}' already exists",
                role.name
            ))),
            Err(e) => Err(db_err("create role", e)),
        }
    }

    async fn is_member(&self, user_id: Uuid, role_id: Uuid) -> AuthResult<bool> {
        let exists: bool = query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_roles WHERE user_id = $1 AND role_id = $2)",
        )
        .bind(user_id)
        .bind(role_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("check role membership", e))?;

        Ok(exists)
    }

    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AuthResult<()> {
        // ON CONFLICT keeps the (user, role) pair unique even when two
        // registrations race the membership check.
        query(
            r#"
            INSERT INTO user_roles (user_id, role_id, assigned_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("assign role", e))?;

        Ok(())
    }

    async fn role_names(&self, user_id: Uuid) -> AuthResult<Vec<String>> {
        let names: Vec<(String,)> = query_as(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY ur.assigned_at, r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("list role names", e))?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }
}
