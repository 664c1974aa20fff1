//! # Ports
//!
//! Contracts the services depend on. Storage, authentication and media
//! adapters implement these; the services never see a concrete backend.
//!
//! With the `testing` feature enabled each trait gets a mockall `MockXxx`.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::models::{
    Application, Page, PageRequest, PasswordHash, Pet, PetFilter, PetId, Post, PostFilter, PostId,
    PostSort, Role, User, UserFilter, UserId,
};

/// User documents.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn insert(&self, user: &User) -> Result<()>;
    /// Replaces the stored document. `NotFound` if it does not exist.
    async fn update(&self, user: &User) -> Result<()>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;
    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>>;
    /// Newest first.
    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>>;
    async fn count(&self, filter: &UserFilter) -> Result<u64>;
}

/// In-place change to a stored pet. An `Err` aborts the write.
pub type PetMutation = Box<dyn FnOnce(&mut Pet) -> Result<()> + Send>;

/// In-place change to a stored post. An `Err` aborts the write.
pub type PostMutation = Box<dyn FnOnce(&mut Post) -> Result<()> + Send>;

/// Pet documents with their embedded applications.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait PetRepository: Send + Sync {
    async fn insert(&self, pet: &Pet) -> Result<()>;
    /// Read-modify-write under the document lock: `mutate` sees the latest
    /// stored pet, including applications and views committed by other
    /// requests. Returns the document as written. `NotFound` if missing.
    async fn modify(&self, id: PetId, mutate: PetMutation) -> Result<Pet>;
    /// Hard delete. Returns whether a document was removed.
    async fn delete(&self, id: PetId) -> Result<bool>;
    async fn find_by_id(&self, id: PetId) -> Result<Option<Pet>>;
    async fn find_many(&self, ids: &[PetId]) -> Result<Vec<Pet>>;
    /// Newest first.
    async fn list(&self, filter: &PetFilter, page: PageRequest) -> Result<Page<Pet>>;
    async fn count(&self, filter: &PetFilter) -> Result<u64>;
    async fn find_ids(&self, filter: &PetFilter) -> Result<Vec<PetId>>;
    /// Appends `application` to the pet in one atomic write. The store
    /// itself rejects a second application by the same user with
    /// `DuplicateApplication`, whatever the caller checked beforehand.
    async fn append_application(&self, pet_id: PetId, application: &Application) -> Result<Pet>;
    /// Atomic `views += 1`.
    async fn record_view(&self, id: PetId) -> Result<()>;
}

/// Post documents with their embedded engagement records.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<()>;
    /// Same contract as [`PetRepository::modify`].
    async fn modify(&self, id: PostId, mutate: PostMutation) -> Result<Post>;
    /// Returns soft-deleted posts too; callers decide visibility.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>>;
    async fn list(&self, filter: &PostFilter, sort: PostSort, page: PageRequest) -> Result<Page<Post>>;
    async fn count(&self, filter: &PostFilter) -> Result<u64>;
    async fn record_view(&self, id: PostId) -> Result<()>;
}

/// An uploaded file as received by an inbound adapter.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Multipart field name (`images`, `image`); becomes the file name prefix.
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    /// Public path, e.g. `/uploads/images-0190c...jpg`.
    pub path: String,
    pub content_type: String,
    pub size: u64,
}

/// Binary file storage. Returned paths are opaque to the domain.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Validates and stores the upload. Rejected content is a `Validation`.
    async fn store(&self, upload: Upload) -> Result<StoredMedia>;
    /// Removes a previously stored file. Unknown paths are ignored.
    async fn remove(&self, path: &str) -> Result<()>;
}

/// One-way password hashing.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<PasswordHash>;
    fn verify(&self, plain: &str, hash: &PasswordHash) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity carried by a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// Bearer credential issuing and verification.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, user: &User) -> Result<IssuedToken>;
    /// Fails with `Unauthorized` for malformed, forged or expired tokens.
    fn verify(&self, token: &str) -> Result<TokenClaims>;
}

/// Source of "now" for every timestamp the services write.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
