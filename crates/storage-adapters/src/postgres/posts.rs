use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use domains::{
    DomainError, Page, PageRequest, Post, PostFilter, PostId, PostMutation, PostRepository, PostSort,
    Result,
};

use super::db_error;
use super::filters::push_post_filter;

const ENGAGEMENT: &str = "(jsonb_array_length(COALESCE(doc->'likes', '[]'::jsonb)) \
     + jsonb_array_length(COALESCE(doc->'comments', '[]'::jsonb)) \
     + jsonb_array_length(COALESCE(doc->'shares', '[]'::jsonb)))";

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, post: &Post) -> Result<()> {
        sqlx::query("INSERT INTO posts (id, doc, created_at) VALUES ($1, $2, $3)")
            .bind(post.id.as_uuid())
            .bind(Json(post))
            .bind(post.created_at)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn modify(&self, id: PostId, mutate: PostMutation) -> Result<Post> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let row: Option<(Json<Post>,)> =
            sqlx::query_as("SELECT doc FROM posts WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error)?;
        let Some((Json(mut post),)) = row else {
            return Err(DomainError::not_found("Post", id));
        };
        mutate(&mut post)?;

        sqlx::query("UPDATE posts SET doc = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(Json(&post))
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;
        Ok(post)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>> {
        let row: Option<(Json<Post>,)> = sqlx::query_as("SELECT doc FROM posts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(|(Json(post),)| post))
    }

    async fn list(&self, filter: &PostFilter, sort: PostSort, page: PageRequest) -> Result<Page<Post>> {
        let total = self.count(filter).await?;
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM posts WHERE TRUE");
        push_post_filter(&mut qb, filter);
        match sort {
            PostSort::Newest => qb.push(" ORDER BY created_at DESC, id DESC"),
            PostSort::Trending => qb
                .push(" ORDER BY ")
                .push(ENGAGEMENT)
                .push(" DESC, created_at DESC, id DESC"),
        };
        qb.push(" LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows: Vec<(Json<Post>,)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(Page::new(
            rows.into_iter().map(|(Json(post),)| post).collect(),
            total,
            page,
        ))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts WHERE TRUE");
        push_post_filter(&mut qb, filter);
        let (count,): (i64,) = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(count.max(0) as u64)
    }

    async fn record_view(&self, id: PostId) -> Result<()> {
        sqlx::query(
            "UPDATE posts SET doc = jsonb_set(doc, '{views}', to_jsonb(COALESCE((doc->>'views')::bigint, 0) + 1)) WHERE id = $1",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}
