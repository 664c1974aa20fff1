use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use domains::{
    Application, DomainError, Page, PageRequest, Pet, PetFilter, PetId, PetMutation, PetRepository,
    PetStatus, Result,
};

use super::filters::push_pet_filter;
use super::{db_error, is_unique_violation};

pub struct PgPetRepository {
    pool: PgPool,
}

impl PgPetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PetRepository for PgPetRepository {
    async fn insert(&self, pet: &Pet) -> Result<()> {
        sqlx::query("INSERT INTO pets (id, doc, created_at) VALUES ($1, $2, $3)")
            .bind(pet.id.as_uuid())
            .bind(Json(pet))
            .bind(pet.created_at)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// The row stays locked from the read until commit, so concurrent
    /// appends and view counts are applied before or after, never lost.
    async fn modify(&self, id: PetId, mutate: PetMutation) -> Result<Pet> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let row: Option<(Json<Pet>,)> =
            sqlx::query_as("SELECT doc FROM pets WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error)?;
        let Some((Json(mut pet),)) = row else {
            return Err(DomainError::not_found("Pet", id));
        };
        // Dropping `tx` on error rolls back and releases the lock.
        mutate(&mut pet)?;

        sqlx::query("UPDATE pets SET doc = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(Json(&pet))
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        tx.commit().await.map_err(db_error)?;
        Ok(pet)
    }

    async fn delete(&self, id: PetId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: PetId) -> Result<Option<Pet>> {
        let row: Option<(Json<Pet>,)> = sqlx::query_as("SELECT doc FROM pets WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(|(Json(pet),)| pet))
    }

    async fn find_many(&self, ids: &[PetId]) -> Result<Vec<Pet>> {
        let ids: Vec<Uuid> = ids.iter().map(PetId::as_uuid).collect();
        let rows: Vec<(Json<Pet>,)> = sqlx::query_as(
            "SELECT doc FROM pets WHERE id = ANY($1) ORDER BY created_at DESC",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(|(Json(pet),)| pet).collect())
    }

    async fn list(&self, filter: &PetFilter, page: PageRequest) -> Result<Page<Pet>> {
        let total = self.count(filter).await?;
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM pets WHERE TRUE");
        push_pet_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows: Vec<(Json<Pet>,)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(Page::new(
            rows.into_iter().map(|(Json(pet),)| pet).collect(),
            total,
            page,
        ))
    }

    async fn count(&self, filter: &PetFilter) -> Result<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM pets WHERE TRUE");
        push_pet_filter(&mut qb, filter);
        let (count,): (i64,) = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(count.max(0) as u64)
    }

    async fn find_ids(&self, filter: &PetFilter) -> Result<Vec<PetId>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM pets WHERE TRUE");
        push_pet_filter(&mut qb, filter);
        let rows: Vec<(Uuid,)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(|(id,)| PetId::from_uuid(id)).collect())
    }

    /// Locks the pet row, inserts the `(pet, applicant)` guard row and
    /// rewrites the document in one transaction.
    async fn append_application(&self, pet_id: PetId, application: &Application) -> Result<Pet> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let row: Option<(Json<Pet>,)> =
            sqlx::query_as("SELECT doc FROM pets WHERE id = $1 FOR UPDATE")
                .bind(pet_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error)?;
        let Some((Json(mut pet),)) = row else {
            return Err(DomainError::not_found("Pet", pet_id));
        };
        if pet.status != PetStatus::Available {
            return Err(DomainError::unavailable("this pet is not available for adoption"));
        }

        sqlx::query("INSERT INTO pet_applications (pet_id, user_id, application_id) VALUES ($1, $2, $3)")
            .bind(pet_id.as_uuid())
            .bind(application.user.as_uuid())
            .bind(application.id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    DomainError::DuplicateApplication
                } else {
                    db_error(err)
                }
            })?;

        pet.applications.push(application.clone());
        pet.updated_at = application.submitted_at;
        sqlx::query("UPDATE pets SET doc = $2 WHERE id = $1")
            .bind(pet_id.as_uuid())
            .bind(Json(&pet))
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(pet)
    }

    async fn record_view(&self, id: PetId) -> Result<()> {
        sqlx::query(
            "UPDATE pets SET doc = jsonb_set(doc, '{views}', to_jsonb(COALESCE((doc->>'views')::bigint, 0) + 1)) WHERE id = $1",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}
