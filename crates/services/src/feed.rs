//! # FeedService
//!
//! Home-page aggregates built from the post and pet services.

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;

use domains::{
    Actor, Clock, DomainError, Page, PageRequest, PetFilter, PostFilter, PostSort, Result,
    UserFilter, UserRepository,
};

use crate::pets::{PetDetails, PetService};
use crate::posts::{PostDetails, PostService};

pub const FEED_FEATURED_PETS: u32 = 3;
pub const FEED_TRENDING_POSTS: u32 = 5;
pub const RECOMMENDED_PETS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub posts: Page<PostDetails>,
    pub featured_pets: Vec<PetDetails>,
    pub trending_posts: Vec<PostDetails>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonalizedFeed {
    pub posts: Page<PostDetails>,
    pub recommended_pets: Vec<PetDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub posts: u64,
    pub pets: u64,
    pub users: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStats {
    pub total_posts: u64,
    pub total_pets: u64,
    pub total_users: u64,
    /// Created in the last 24 hours.
    pub recent_activity: RecentActivity,
}

#[derive(Clone)]
pub struct FeedService {
    posts: PostService,
    pets: PetService,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl FeedService {
    pub fn new(
        posts: PostService,
        pets: PetService,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            pets,
            users,
            clock,
        }
    }

    pub async fn feed(&self, page: PageRequest) -> Result<Feed> {
        Ok(Feed {
            posts: self.posts.list(page).await?,
            featured_pets: self.pets.featured_limited(FEED_FEATURED_PETS).await?,
            trending_posts: self.posts.trending(FEED_TRENDING_POSTS).await?,
        })
    }

    /// Posts about pets of the user's preferred types, plus available pets
    /// of those types. No preference means no restriction.
    pub async fn personalized(&self, actor: &Actor, page: PageRequest) -> Result<PersonalizedFeed> {
        let user = self
            .users
            .find_by_id(actor.id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", actor.id))?;
        let preferred = user.preferences.pet_types;

        let mut post_filter = PostFilter::visible();
        let mut pet_filter = PetFilter::available();
        if !preferred.is_empty() {
            let pet_ids = self
                .pets
                .ids_matching(&PetFilter {
                    pet_types: Some(preferred.clone()),
                    ..PetFilter::default()
                })
                .await?;
            post_filter.pet_ids = Some(pet_ids);
            pet_filter.pet_types = Some(preferred);
        }

        Ok(PersonalizedFeed {
            posts: self.posts.query(post_filter, PostSort::Newest, page).await?,
            recommended_pets: self
                .pets
                .list_filtered(&pet_filter, PageRequest::first(RECOMMENDED_PETS))
                .await?,
        })
    }

    pub async fn stats(&self) -> Result<FeedStats> {
        let since = self.clock.now() - Duration::hours(24);
        let active_users = UserFilter {
            is_active: Some(true),
            ..UserFilter::default()
        };

        Ok(FeedStats {
            total_posts: self.posts.count(&PostFilter::visible()).await?,
            total_pets: self.pets.count(&PetFilter::available()).await?,
            total_users: self.users.count(&active_users).await?,
            recent_activity: RecentActivity {
                posts: self
                    .posts
                    .count(&PostFilter {
                        created_after: Some(since),
                        ..PostFilter::visible()
                    })
                    .await?,
                pets: self
                    .pets
                    .count(&PetFilter {
                        created_after: Some(since),
                        ..PetFilter::available()
                    })
                    .await?,
                users: self
                    .users
                    .count(&UserFilter {
                        created_after: Some(since),
                        ..active_users
                    })
                    .await?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use domains::{
        Location, MockPetRepository, MockPostRepository, MockUserRepository, NewUser, PasswordHash,
        PetId, PetType, Preferences, Role, SystemClock, User,
    };

    use super::*;

    fn user_preferring(types: Vec<PetType>) -> User {
        User::register(
            NewUser {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                password: PasswordHash::new("x"),
                role: Role::User,
                phone: None,
                location: Location::default(),
                bio: None,
                preferences: Preferences {
                    pet_types: types,
                    ..Preferences::default()
                },
                is_verified: false,
            },
            Utc::now(),
        )
        .expect("valid user")
    }

    fn feed_service(
        posts: MockPostRepository,
        pets: MockPetRepository,
        users: MockUserRepository,
    ) -> FeedService {
        let posts: Arc<dyn domains::PostRepository> = Arc::new(posts);
        let pets: Arc<dyn domains::PetRepository> = Arc::new(pets);
        let users: Arc<dyn UserRepository> = Arc::new(users);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        FeedService::new(
            PostService::new(posts, Arc::clone(&pets), Arc::clone(&users), Arc::clone(&clock)),
            PetService::new(pets, Arc::clone(&users), Arc::clone(&clock)),
            users,
            clock,
        )
    }

    #[tokio::test]
    async fn personalized_feed_restricts_posts_to_preferred_pet_types() {
        let user = user_preferring(vec![PetType::Cat]);
        let actor = Actor::new(user.id, user.role);
        let cat_pet = PetId::generate();

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(move |_| Ok(Some(user)));
        users.expect_find_many().returning(|_| Ok(Vec::new()));

        let mut pets = MockPetRepository::new();
        pets.expect_find_ids()
            .withf(|f| f.pet_types == Some(vec![PetType::Cat]) && f.status.is_none())
            .return_once(move |_| Ok(vec![cat_pet]));
        pets.expect_list()
            .withf(|f, _| f.pet_types == Some(vec![PetType::Cat]))
            .return_once(|_, page| Ok(Page::new(Vec::new(), 0, page)));

        let mut posts = MockPostRepository::new();
        posts
            .expect_list()
            .withf(move |f, _, _| f.visible_only && f.pet_ids == Some(vec![cat_pet]))
            .return_once(|_, _, page| Ok(Page::new(Vec::new(), 0, page)));

        feed_service(posts, pets, users)
            .personalized(&actor, PageRequest::first(10))
            .await
            .expect("feed");
    }

    #[tokio::test]
    async fn no_preferences_means_no_restriction() {
        let user = user_preferring(Vec::new());
        let actor = Actor::new(user.id, user.role);

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(move |_| Ok(Some(user)));
        users.expect_find_many().returning(|_| Ok(Vec::new()));

        let mut pets = MockPetRepository::new();
        pets.expect_find_ids().never();
        pets.expect_list()
            .return_once(|_, page| Ok(Page::new(Vec::new(), 0, page)));

        let mut posts = MockPostRepository::new();
        posts
            .expect_list()
            .withf(|f, _, _| f.pet_ids.is_none())
            .return_once(|_, _, page| Ok(Page::new(Vec::new(), 0, page)));

        feed_service(posts, pets, users)
            .personalized(&actor, PageRequest::first(10))
            .await
            .expect("feed");
    }

    #[tokio::test]
    async fn stats_counts_recent_activity() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_count()
            .returning(|f| Ok(if f.created_after.is_some() { 1 } else { 7 }));
        let mut pets = MockPetRepository::new();
        pets.expect_count()
            .returning(|f| Ok(if f.created_after.is_some() { 2 } else { 9 }));
        let mut users = MockUserRepository::new();
        users
            .expect_count()
            .returning(|f| Ok(if f.created_after.is_some() { 3 } else { 11 }));

        let stats = feed_service(posts, pets, users).stats().await.expect("stats");
        assert_eq!(stats.total_posts, 7);
        assert_eq!(stats.total_pets, 9);
        assert_eq!(stats.total_users, 11);
        assert_eq!(
            stats.recent_activity,
            RecentActivity {
                posts: 1,
                pets: 2,
                users: 3
            }
        );
    }
}
