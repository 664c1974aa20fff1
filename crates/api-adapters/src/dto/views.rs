use chrono::{DateTime, Utc};
use serde::Serialize;

use domains::{
    Age, Application, ApplicationId, ApplicationStatus, Behavior, CommentId, EditRecord, Gender,
    Health, Like, Location, Page, PetId, PetLocation, PetStatus, PetSummary, PetType, PostId,
    PostStatus, PostType, Preferences, ReplyId, Role, Share, Size, User, UserId, UserSummary,
};
use services::{
    ApplicationEntry, AuthSession, FavoriteToggle, Feed, PersonalizedFeed, PetDetails, PostDetails,
    UserDirectory,
};

use crate::envelope::Pagination;

/// A user as returned to clients. Carries no password material.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub display_name: String,
    pub email: String,
    pub avatar: String,
    pub role: Role,
    pub phone: Option<String>,
    pub location: Location,
    pub bio: Option<String>,
    pub preferences: Preferences,
    pub is_verified: bool,
    pub is_active: bool,
    pub last_login: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            display_name: user.display_name().to_owned(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            role: user.role,
            phone: user.phone.clone(),
            location: user.location.clone(),
            bio: user.bio.clone(),
            preferences: user.preferences.clone(),
            is_verified: user.is_verified,
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub user: UserView,
    pub token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

impl From<&AuthSession> for SessionView {
    fn from(session: &AuthSession) -> Self {
        Self {
            user: UserView::from(&session.user),
            token: session.token.token.clone(),
            expires_at: session.token.expires_at,
        }
    }
}

/// A populated user reference, or just the id when the user is gone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated(UserSummary),
    Unresolved { id: UserId },
}

impl UserRef {
    pub fn resolve(users: &UserDirectory, id: UserId) -> Self {
        match users.get(id) {
            Some(summary) => Self::Populated(summary.clone()),
            None => Self::Unresolved { id },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub user: UserRef,
    pub message: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<UserRef>,
}

impl ApplicationView {
    pub fn build(application: &Application, users: &UserDirectory) -> Self {
        Self {
            id: application.id,
            user: UserRef::resolve(users, application.user),
            message: application.message.clone(),
            status: application.status,
            submitted_at: application.submitted_at,
            reviewed_at: application.reviewed_at,
            reviewed_by: application.reviewed_by.map(|id| UserRef::resolve(users, id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetView {
    pub id: PetId,
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: PetType,
    pub breed: String,
    pub age: Age,
    pub age_in_years: f64,
    pub age_display: String,
    pub gender: Gender,
    pub size: Size,
    pub color: String,
    pub description: String,
    pub images: Vec<String>,
    pub owner: UserRef,
    pub status: PetStatus,
    pub health: Health,
    pub behavior: Behavior,
    pub characteristics: Vec<String>,
    pub requirements: Vec<String>,
    pub location: PetLocation,
    pub adoption_fee: f64,
    pub is_featured: bool,
    pub views: u64,
    pub favorites: Vec<UserId>,
    pub favorite_count: usize,
    pub applications: Vec<ApplicationView>,
    pub application_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PetDetails> for PetView {
    fn from(details: &PetDetails) -> Self {
        let pet = &details.pet;
        Self {
            id: pet.id,
            name: pet.name.clone(),
            pet_type: pet.pet_type,
            breed: pet.breed.clone(),
            age: pet.age,
            age_in_years: pet.age_in_years(),
            age_display: pet.age_display(),
            gender: pet.gender,
            size: pet.size,
            color: pet.color.clone(),
            description: pet.description.clone(),
            images: pet.images.clone(),
            owner: UserRef::resolve(&details.users, pet.owner),
            status: pet.status,
            health: pet.health.clone(),
            behavior: pet.behavior.clone(),
            characteristics: pet.characteristics.clone(),
            requirements: pet.requirements.clone(),
            location: pet.location.clone(),
            adoption_fee: pet.adoption_fee,
            is_featured: pet.is_featured,
            views: pet.views,
            favorites: pet.favorites.clone(),
            favorite_count: pet.favorite_count(),
            applications: pet
                .applications
                .iter()
                .map(|app| ApplicationView::build(app, &details.users))
                .collect(),
            application_count: pet.application_count(),
            created_at: pet.created_at,
            updated_at: pet.updated_at,
        }
    }
}

impl PetView {
    pub fn page(page: &Page<PetDetails>) -> Vec<Self> {
        page.items.iter().map(Self::from).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteView {
    pub is_favorited: bool,
    pub favorite_count: usize,
}

impl From<FavoriteToggle> for FavoriteView {
    fn from(toggle: FavoriteToggle) -> Self {
        Self {
            is_favorited: toggle.is_favorited,
            favorite_count: toggle.favorite_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEntryView {
    pub pet: PetSummary,
    pub pet_status: PetStatus,
    pub application: ApplicationView,
}

impl From<&ApplicationEntry> for ApplicationEntryView {
    fn from(entry: &ApplicationEntry) -> Self {
        let users: UserDirectory = entry.applicant.iter().cloned().collect();
        Self {
            pet: entry.pet.clone(),
            pet_status: entry.pet_status,
            application: ApplicationView::build(&entry.application, &users),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    pub id: ReplyId,
    pub user: UserRef,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub user: UserRef,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes: Vec<UserId>,
    pub like_count: usize,
    pub replies: Vec<ReplyView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: PostId,
    pub author: UserRef,
    pub content: String,
    pub images: Vec<String>,
    pub pet: Option<PetSummary>,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub tags: Vec<String>,
    pub location: Location,
    pub likes: Vec<Like>,
    pub comments: Vec<CommentView>,
    pub shares: Vec<Share>,
    pub like_count: usize,
    pub comment_count: usize,
    pub share_count: usize,
    pub engagement: usize,
    /// Present when the request was authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    pub is_public: bool,
    pub is_pinned: bool,
    pub is_edited: bool,
    pub edit_history: Vec<EditRecord>,
    pub views: u64,
    pub status: PostStatus,
    pub time_ago: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    pub fn build(details: &PostDetails, viewer: Option<UserId>, now: DateTime<Utc>) -> Self {
        let post = &details.post;
        let users = &details.users;
        Self {
            id: post.id,
            author: UserRef::resolve(users, post.author),
            content: post.content.clone(),
            images: post.images.clone(),
            pet: details.pet.clone(),
            post_type: post.post_type,
            tags: post.tags.clone(),
            location: post.location.clone(),
            likes: post.likes.clone(),
            comments: post
                .comments
                .iter()
                .map(|comment| CommentView {
                    id: comment.id,
                    user: UserRef::resolve(users, comment.user),
                    content: comment.content.clone(),
                    created_at: comment.created_at,
                    likes: comment.likes.clone(),
                    like_count: comment.likes.len(),
                    replies: comment
                        .replies
                        .iter()
                        .map(|reply| ReplyView {
                            id: reply.id,
                            user: UserRef::resolve(users, reply.user),
                            content: reply.content.clone(),
                            created_at: reply.created_at,
                        })
                        .collect(),
                })
                .collect(),
            shares: post.shares.clone(),
            like_count: post.like_count(),
            comment_count: post.comment_count(),
            share_count: post.share_count(),
            engagement: post.engagement(),
            is_liked: viewer.map(|user| post.is_liked_by(user)),
            is_public: post.is_public,
            is_pinned: post.is_pinned,
            is_edited: post.is_edited,
            edit_history: post.edit_history.clone(),
            views: post.views,
            status: post.status,
            time_ago: post.time_ago(now),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }

    pub fn list(items: &[PostDetails], viewer: Option<UserId>, now: DateTime<Utc>) -> Vec<Self> {
        items.iter().map(|d| Self::build(d, viewer, now)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedView {
    pub posts: Vec<PostView>,
    pub featured_pets: Vec<PetView>,
    pub trending_posts: Vec<PostView>,
    pub pagination: Pagination,
}

impl FeedView {
    pub fn build(feed: &Feed, viewer: Option<UserId>, now: DateTime<Utc>) -> Self {
        Self {
            posts: PostView::list(&feed.posts.items, viewer, now),
            featured_pets: feed.featured_pets.iter().map(PetView::from).collect(),
            trending_posts: PostView::list(&feed.trending_posts, viewer, now),
            pagination: Pagination::from(&feed.posts),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedFeedView {
    pub posts: Vec<PostView>,
    pub recommended_pets: Vec<PetView>,
    pub pagination: Pagination,
}

impl PersonalizedFeedView {
    pub fn build(feed: &PersonalizedFeed, viewer: UserId, now: DateTime<Utc>) -> Self {
        Self {
            posts: PostView::list(&feed.posts.items, Some(viewer), now),
            recommended_pets: feed.recommended_pets.iter().map(PetView::from).collect(),
            pagination: Pagination::from(&feed.posts),
        }
    }
}
