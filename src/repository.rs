use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::{models::CurrentUser, roles::Role};

/// Repository Trait
///
/// The persistence contract the access layer depends on. Everything else the
/// application stores (products, sales, transfers, ...) is read and written by
/// the front end directly against the hosted database and never passes through
/// here.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Resolves the profile and role of an authenticated user.
    /// `None` when the user has no profile (deleted, or never provisioned).
    async fn get_current_user(&self, id: Uuid) -> Option<CurrentUser>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// UserRoleRow
///
/// Flat result of the `users LEFT JOIN roles` query.
#[derive(Debug, FromRow)]
struct UserRoleRow {
    id: Uuid,
    full_name: Option<String>,
    branch_id: Option<Uuid>,
    role_id: Option<Uuid>,
    role_name: Option<String>,
    role_name_ar: Option<String>,
}

impl From<UserRoleRow> for CurrentUser {
    fn from(row: UserRoleRow) -> Self {
        let role = row.role_id.map(|id| Role {
            id,
            name: row.role_name,
            name_ar: row.role_name_ar,
        });

        CurrentUser {
            id: row.id,
            full_name: row.full_name.unwrap_or_default(),
            branch_id: row.branch_id,
            role,
        }
    }
}

/// PostgresRepository
///
/// `Repository` backed by the hosted Postgres database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// get_current_user
    ///
    /// Loads the user row with its nested role. A user without a `role_id`
    /// still resolves, just with `role: None`.
    async fn get_current_user(&self, id: Uuid) -> Option<CurrentUser> {
        let query = r#"
            SELECT
                u.id,
                u.full_name,
                u.branch_id,
                r.id as role_id,
                r.name as role_name,
                r.name_ar as role_name_ar
            FROM users u
            LEFT JOIN roles r ON u.role_id = r.id
            WHERE u.id = $1
        "#;

        sqlx::query_as::<_, UserRoleRow>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(CurrentUser::from))
            .unwrap_or_else(|e| {
                tracing::error!("get_current_user error: {:?}", e);
                None
            })
    }
}
