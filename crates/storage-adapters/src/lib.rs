//! # storage-adapters
//!
//! Outbound adapters for the persistence and media ports.
//!
//! - `memory`: `dashmap`-backed document store, always compiled.
//! - `postgres`: JSONB document store (feature `db-postgres`).
//! - `media`: local filesystem image storage (feature `media-local`).

pub mod memory;

#[cfg(feature = "media-local")]
pub mod media;
#[cfg(feature = "db-postgres")]
pub mod postgres;

use std::sync::Arc;

use domains::{PetRepository, PostRepository, UserRepository};

/// One repository per collection, all over the same backend.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub pets: Arc<dyn PetRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Repositories {
    pub fn memory() -> Self {
        Self {
            users: Arc::new(memory::MemoryUserRepository::new()),
            pets: Arc::new(memory::MemoryPetRepository::new()),
            posts: Arc::new(memory::MemoryPostRepository::new()),
        }
    }

    #[cfg(feature = "db-postgres")]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserRepository::new(pool.clone())),
            pets: Arc::new(postgres::PgPetRepository::new(pool.clone())),
            posts: Arc::new(postgres::PgPostRepository::new(pool)),
        }
    }
}
