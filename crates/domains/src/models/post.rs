//! # Post
//!
//! Social feed entries and their engagement records. Likes, comments,
//! replies and shares are owned by the post and live and die with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Actor, CommentId, Location, PetId, PostId, ReplyId, UserId};
use crate::errors::{require_text, DomainError, Result};

pub const CONTENT_MAX: usize = 2000;
pub const COMMENT_MAX: usize = 500;
pub const REPLY_MAX: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    General,
    Adoption,
    Story,
    Tip,
    Event,
}

impl PostType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Adoption => "adoption",
            Self::Story => "story",
            Self::Tip => "tip",
            Self::Event => "event",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Active,
    Hidden,
    Deleted,
}

impl PostStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Hidden => "hidden",
            Self::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub user: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: ReplyId,
    pub user: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub user: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: Vec<UserId>,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub user: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    pub content: String,
    pub edited_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub author: UserId,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub pet: Option<PetId>,
    #[serde(rename = "type", default)]
    pub post_type: PostType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub shares: Vec<Share>,
    pub is_public: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_edited: bool,
    #[serde(default)]
    pub edit_history: Vec<EditRecord>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`Post::create`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPost {
    pub content: String,
    pub images: Vec<String>,
    pub pet: Option<PetId>,
    pub post_type: PostType,
    pub tags: Vec<String>,
    pub location: Location,
    pub is_public: Option<bool>,
}

/// Author edit. `add_images` are appended to the existing images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostUpdate {
    pub content: Option<String>,
    pub post_type: Option<PostType>,
    pub tags: Option<Vec<String>>,
    pub location: Option<Location>,
    pub is_public: Option<bool>,
    pub add_images: Vec<String>,
}

/// Result of [`Post::toggle_like`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub liked: bool,
    pub like_count: usize,
}

impl Comment {
    /// Whether `user` likes this comment, with the current like count.
    pub fn like_state(&self, user: UserId) -> LikeToggle {
        LikeToggle {
            liked: self.likes.contains(&user),
            like_count: self.likes.len(),
        }
    }
}

/// Trims tags and drops empty ones, keeping first occurrences only.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_owned());
        }
    }
    out
}

impl Post {
    pub fn create(author: UserId, new: NewPost, now: DateTime<Utc>) -> Result<Self> {
        require_text("content", &new.content, CONTENT_MAX)?;
        Ok(Self {
            id: PostId::generate(),
            author,
            content: new.content.trim().to_owned(),
            images: new.images,
            pet: new.pet,
            post_type: new.post_type,
            tags: normalize_tags(new.tags),
            location: new.location,
            likes: Vec::new(),
            comments: Vec::new(),
            shares: Vec::new(),
            is_public: new.is_public.unwrap_or(true),
            is_pinned: false,
            is_edited: false,
            edit_history: Vec::new(),
            views: 0,
            status: PostStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Public and active.
    pub fn is_visible(&self) -> bool {
        self.is_public && self.status == PostStatus::Active
    }

    pub fn is_deleted(&self) -> bool {
        self.status == PostStatus::Deleted
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn share_count(&self) -> usize {
        self.shares.len()
    }

    pub fn engagement(&self) -> usize {
        self.like_count() + self.comment_count() + self.share_count()
    }

    pub fn is_liked_by(&self, user: UserId) -> bool {
        self.likes.iter().any(|like| like.user == user)
    }

    pub fn toggle_like(&mut self, user: UserId, now: DateTime<Utc>) -> LikeToggle {
        let liked = if let Some(index) = self.likes.iter().position(|like| like.user == user) {
            self.likes.remove(index);
            false
        } else {
            self.likes.push(Like {
                user,
                created_at: now,
            });
            true
        };
        LikeToggle {
            liked,
            like_count: self.like_count(),
        }
    }

    pub fn add_comment(&mut self, user: UserId, content: &str, now: DateTime<Utc>) -> Result<&Comment> {
        require_text("comment", content, COMMENT_MAX)?;
        self.comments.push(Comment {
            id: CommentId::generate(),
            user,
            content: content.trim().to_owned(),
            created_at: now,
            likes: Vec::new(),
            replies: Vec::new(),
        });
        Ok(&self.comments[self.comments.len() - 1])
    }

    pub fn add_reply(
        &mut self,
        comment_id: CommentId,
        user: UserId,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<&Reply> {
        let comment = self
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| DomainError::not_found("Comment", comment_id))?;
        require_text("reply", content, REPLY_MAX)?;
        comment.replies.push(Reply {
            id: ReplyId::generate(),
            user,
            content: content.trim().to_owned(),
            created_at: now,
        });
        Ok(&comment.replies[comment.replies.len() - 1])
    }

    /// Same toggle semantics as post likes, scoped to one comment.
    pub fn toggle_comment_like(&mut self, comment_id: CommentId, user: UserId) -> Result<LikeToggle> {
        let comment = self
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| DomainError::not_found("Comment", comment_id))?;
        if let Some(index) = comment.likes.iter().position(|u| *u == user) {
            comment.likes.remove(index);
        } else {
            comment.likes.push(user);
        }
        Ok(comment.like_state(user))
    }

    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    /// Every share is recorded, repeats included.
    pub fn share(&mut self, user: UserId, now: DateTime<Utc>) -> usize {
        self.shares.push(Share {
            user,
            created_at: now,
        });
        self.share_count()
    }

    pub fn record_view(&mut self) {
        self.views = self.views.saturating_add(1);
    }

    /// Replaces the content, pushing the superseded version to the edit
    /// history. Unchanged content is a no-op.
    pub fn edit_content(&mut self, content: &str, now: DateTime<Utc>) -> Result<()> {
        require_text("content", content, CONTENT_MAX)?;
        let content = content.trim();
        if content == self.content {
            return Ok(());
        }
        let previous = std::mem::replace(&mut self.content, content.to_owned());
        self.edit_history.push(EditRecord {
            content: previous,
            edited_at: now,
        });
        self.is_edited = true;
        self.updated_at = now;
        Ok(())
    }

    pub fn apply_update(&mut self, update: PostUpdate, now: DateTime<Utc>) -> Result<()> {
        if let Some(content) = &update.content {
            self.edit_content(content, now)?;
        }
        if let Some(post_type) = update.post_type {
            self.post_type = post_type;
        }
        if let Some(tags) = update.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(is_public) = update.is_public {
            self.is_public = is_public;
        }
        self.images.extend(update.add_images);
        self.updated_at = now;
        Ok(())
    }

    pub fn soft_delete(&mut self, requester: &Actor, now: DateTime<Utc>) -> Result<()> {
        if !requester.owns_or_admin(self.author) {
            return Err(DomainError::forbidden("not authorized to delete this post"));
        }
        self.status = PostStatus::Deleted;
        self.updated_at = now;
        Ok(())
    }

    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        time_ago(self.created_at, now)
    }
}

/// Relative age bucketed at minute, hour, day, month and year granularity.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    let days = secs / 86_400;
    match secs {
        s if s < 60 => "just now".to_owned(),
        s if s < 3_600 => format!("{} min ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        _ if days < 30 => format!("{days} days ago"),
        _ if days < 365 => format!("{} months ago", days / 30),
        _ => format!("{} years ago", days / 365),
    }
}
