//! # UserService
//!
//! Member directory and administrative account management.

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;

use domains::{
    Actor, AdminUserUpdate, Clock, DomainError, Page, PageRequest, Result, Role, User, UserFilter,
    UserId, UserRepository,
};

pub const DEFAULT_USER_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCount {
    pub role: Role,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: u64,
    pub active_users: u64,
    pub verified_users: u64,
    pub new_users_today: u64,
    pub by_role: Vec<RoleCount>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

fn require_admin(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::forbidden("admin role required"))
    }
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<User>> {
        self.users.list(&UserFilter::default(), page).await
    }

    /// Case-insensitive substring search over name and email.
    pub async fn search(&self, query: &str, page: PageRequest) -> Result<Page<User>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::validation("search query is required"));
        }
        let filter = UserFilter {
            text: Some(query.to_owned()),
            ..UserFilter::default()
        };
        self.users.list(&filter, page).await
    }

    pub async fn get(&self, id: UserId) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    pub async fn update(&self, actor: &Actor, id: UserId, update: AdminUserUpdate) -> Result<User> {
        require_admin(actor)?;
        let mut user = self.get(id).await?;
        user.apply_admin_update(update, self.clock.now())?;
        self.users.update(&user).await?;
        tracing::info!(admin = %actor.id, user_id = %id, "user updated by admin");
        Ok(user)
    }

    /// Soft delete: the account is kept with `is_active = false`.
    pub async fn deactivate(&self, actor: &Actor, id: UserId) -> Result<User> {
        require_admin(actor)?;
        if actor.id == id {
            return Err(DomainError::validation("you cannot deactivate your own account"));
        }
        let mut user = self.get(id).await?;
        user.deactivate(self.clock.now());
        self.users.update(&user).await?;
        tracing::info!(admin = %actor.id, user_id = %id, "user deactivated");
        Ok(user)
    }

    pub async fn stats(&self, actor: &Actor) -> Result<UserStats> {
        require_admin(actor)?;
        let count = |filter: UserFilter| {
            let users = Arc::clone(&self.users);
            async move { users.count(&filter).await }
        };

        let mut by_role = Vec::with_capacity(Role::ALL.len());
        for role in Role::ALL {
            by_role.push(RoleCount {
                role,
                count: count(UserFilter {
                    role: Some(role),
                    ..UserFilter::default()
                })
                .await?,
            });
        }

        Ok(UserStats {
            total_users: count(UserFilter::default()).await?,
            active_users: count(UserFilter {
                is_active: Some(true),
                ..UserFilter::default()
            })
            .await?,
            verified_users: count(UserFilter {
                is_verified: Some(true),
                ..UserFilter::default()
            })
            .await?,
            new_users_today: count(UserFilter {
                created_after: Some(self.clock.now() - Duration::hours(24)),
                ..UserFilter::default()
            })
            .await?,
            by_role,
        })
    }
}

#[cfg(test)]
mod tests {
    use domains::{MockUserRepository, SystemClock};

    use super::*;

    fn service(users: MockUserRepository) -> UserService {
        UserService::new(Arc::new(users), Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn admin_operations_reject_regular_users() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();
        users.expect_count().never();
        let service = service(users);
        let actor = Actor::new(UserId::generate(), Role::User);

        assert!(matches!(
            service.deactivate(&actor, UserId::generate()).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            service.stats(&actor).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn admins_cannot_deactivate_themselves() {
        let admin = Actor::new(UserId::generate(), Role::Admin);
        let err = service(MockUserRepository::new())
            .deactivate(&admin, admin.id)
            .await
            .expect_err("self deactivation");
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn stats_counts_each_role() {
        let mut users = MockUserRepository::new();
        users.expect_count().returning(|filter| {
            Ok(match filter.role {
                Some(Role::Admin) => 1,
                Some(_) => 2,
                None => 5,
            })
        });
        let stats = service(users)
            .stats(&Actor::new(UserId::generate(), Role::Admin))
            .await
            .expect("stats");
        assert_eq!(stats.total_users, 5);
        assert_eq!(stats.by_role.len(), 3);
        assert_eq!(stats.by_role[1].role, Role::Admin);
        assert_eq!(stats.by_role[1].count, 1);
    }

    #[tokio::test]
    async fn blank_search_is_rejected() {
        let err = service(MockUserRepository::new())
            .search("  ", PageRequest::first(10))
            .await
            .expect_err("blank query");
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
