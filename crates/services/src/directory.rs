//! Read-time population of user references.

use std::collections::HashMap;

use domains::{Result, UserId, UserRepository, UserSummary};

/// User summaries keyed by id, loaded in one batch for a set of references.
/// References to users that no longer exist are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDirectory {
    users: HashMap<UserId, UserSummary>,
}

impl UserDirectory {
    /// Takes the ids by value so no borrow of the referencing documents is
    /// held across the lookup.
    pub async fn load(repo: &dyn UserRepository, mut ids: Vec<UserId>) -> Result<Self> {
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(Self::default());
        }
        let users = repo
            .find_many(&ids)
            .await?
            .iter()
            .map(|user| (user.id, user.summary()))
            .collect();
        Ok(Self { users })
    }

    pub fn get(&self, id: UserId) -> Option<&UserSummary> {
        self.users.get(&id)
    }

    /// A copy restricted to `ids`.
    pub fn pick(&self, ids: impl IntoIterator<Item = UserId>) -> Self {
        let users = ids
            .into_iter()
            .filter_map(|id| self.users.get(&id).map(|u| (id, u.clone())))
            .collect();
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<UserSummary> for UserDirectory {
    fn from_iter<T: IntoIterator<Item = UserSummary>>(iter: T) -> Self {
        Self {
            users: iter.into_iter().map(|u| (u.id, u)).collect(),
        }
    }
}
