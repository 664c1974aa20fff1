//! Route groups mounted under `/api`.

pub(super) mod auth;
pub(super) mod feed;
pub(super) mod health;
pub(super) mod pets;
pub(super) mod posts;
pub(super) mod users;
