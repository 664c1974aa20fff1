//! # Services
//!
//! Use cases of PetConnect. Each service owns its ports as shared trait
//! objects and is cheap to clone into request handlers.

pub mod auth;
pub mod directory;
pub mod feed;
pub mod pets;
pub mod posts;
pub mod users;

pub use auth::{AuthService, AuthSession, Registration};
pub use directory::UserDirectory;
pub use feed::{Feed, FeedService, FeedStats, PersonalizedFeed, RecentActivity};
pub use pets::{ApplicationEntry, FavoriteToggle, PetDetails, PetService, DEFAULT_PET_LIMIT};
pub use posts::{PostDetails, PostService, DEFAULT_POST_LIMIT, TRENDING_LIMIT};
pub use users::{RoleCount, UserService, UserStats, DEFAULT_USER_LIMIT};

use std::sync::Arc;

use domains::{Clock, PasswordHasher, PetRepository, PostRepository, TokenService, UserRepository};

/// Every service wired over one set of adapters.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub users: UserService,
    pub pets: PetService,
    pub posts: PostService,
    pub feed: FeedService,
}

impl Services {
    pub fn new(
        users: Arc<dyn UserRepository>,
        pets: Arc<dyn PetRepository>,
        posts: Arc<dyn PostRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let pet_service = PetService::new(Arc::clone(&pets), Arc::clone(&users), Arc::clone(&clock));
        let post_service = PostService::new(posts, pets, Arc::clone(&users), Arc::clone(&clock));
        Self {
            auth: AuthService::new(Arc::clone(&users), hasher, tokens, Arc::clone(&clock)),
            users: UserService::new(Arc::clone(&users), Arc::clone(&clock)),
            feed: FeedService::new(
                post_service.clone(),
                pet_service.clone(),
                users,
                clock,
            ),
            pets: pet_service,
            posts: post_service,
        }
    }
}
