//! # In-memory document store
//!
//! One `DashMap` per collection. Every mutation happens under the entry's
//! shard lock, which gives the same per-document atomicity a document
//! database offers. Used by tests, the seed binary and database-less runs.

mod pets;
mod posts;
mod users;

pub use pets::MemoryPetRepository;
pub use posts::MemoryPostRepository;
pub use users::MemoryUserRepository;

use chrono::{DateTime, Utc};
use domains::{Page, PageRequest};

/// Sorts newest first (ids are time-ordered, so they break ties) and cuts
/// one page.
pub(crate) fn newest_page<T, K>(mut items: Vec<T>, page: PageRequest, key: K) -> Page<T>
where
    K: Fn(&T) -> (DateTime<Utc>, uuid::Uuid),
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    slice_page(items, page)
}

pub(crate) fn slice_page<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset())
        .take(page.limit as usize)
        .collect();
    Page::new(items, total, page)
}
