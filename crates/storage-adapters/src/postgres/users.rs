use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use domains::{DomainError, Page, PageRequest, Result, User, UserFilter, UserId, UserRepository};

use super::filters::push_user_filter;
use super::{db_error, is_unique_violation};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn email_taken(err: sqlx::Error) -> DomainError {
    if is_unique_violation(&err) {
        DomainError::conflict("user already exists with this email")
    } else {
        db_error(err)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, doc, created_at) VALUES ($1, $2, $3)")
            .bind(user.id.as_uuid())
            .bind(Json(user))
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(email_taken)?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        let result = sqlx::query("UPDATE users SET doc = $2 WHERE id = $1")
            .bind(user.id.as_uuid())
            .bind(Json(user))
            .execute(&self.pool)
            .await
            .map_err(email_taken)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("User", user.id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row: Option<(Json<User>,)> = sqlx::query_as("SELECT doc FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(|(Json(user),)| user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<(Json<User>,)> =
            sqlx::query_as("SELECT doc FROM users WHERE lower(doc->>'email') = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        Ok(row.map(|(Json(user),)| user))
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let ids: Vec<Uuid> = ids.iter().map(UserId::as_uuid).collect();
        let rows: Vec<(Json<User>,)> = sqlx::query_as("SELECT doc FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(|(Json(user),)| user).collect())
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>> {
        let total = self.count(filter).await?;
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM users WHERE TRUE");
        push_user_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows: Vec<(Json<User>,)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(Page::new(
            rows.into_iter().map(|(Json(user),)| user).collect(),
            total,
            page,
        ))
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        push_user_filter(&mut qb, filter);
        let (count,): (i64,) = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(count.max(0) as u64)
    }
}
