use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use domains::{DomainError, Page, PageRequest, Result, User, UserFilter, UserId, UserRepository};

use super::newest_page;

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: DashMap<UserId, User>,
    /// Lowercased email to id; the uniqueness guard.
    emails: DashMap<String, UserId>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<()> {
        match self.emails.entry(user.email.to_lowercase()) {
            Entry::Occupied(_) => Err(DomainError::conflict("user already exists with this email")),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut stored = self
            .users
            .get_mut(&user.id)
            .ok_or_else(|| DomainError::not_found("User", user.id))?;
        if stored.email != user.email {
            let email = user.email.to_lowercase();
            match self.emails.entry(email) {
                Entry::Occupied(_) => {
                    return Err(DomainError::conflict("user already exists with this email"))
                }
                Entry::Vacant(slot) => {
                    slot.insert(user.id);
                }
            }
            self.emails.remove(&stored.email.to_lowercase());
        }
        *stored = user.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let Some(id) = self.emails.get(&email.to_lowercase()).map(|id| *id) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| u.clone()))
            .collect())
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>> {
        let matching = self
            .users
            .iter()
            .filter(|u| filter.matches(u.value()))
            .map(|u| u.value().clone())
            .collect();
        Ok(newest_page(matching, page, |u: &User| (u.created_at, u.id.as_uuid())))
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64> {
        Ok(self.users.iter().filter(|u| filter.matches(u.value())).count() as u64)
    }
}
