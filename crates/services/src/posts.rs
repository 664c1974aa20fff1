//! # PostService
//!
//! The social feed: posts, likes, threaded comments, shares and views.
//! Soft-deleted posts behave as missing for every read and mutation.

use std::sync::Arc;

use domains::{
    Actor, Clock, Comment, CommentId, DomainError, LikeToggle, NewPost, Page, PageRequest, PetId,
    PetRepository, PetSummary, Post, PostFilter, PostId, PostRepository, PostSort, PostUpdate,
    Result, UserId, UserRepository, UserSummary,
};

use crate::directory::UserDirectory;

pub const DEFAULT_POST_LIMIT: u32 = 10;
pub const TRENDING_LIMIT: u32 = 10;

/// A post with its author, commenters and referenced pet populated.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetails {
    pub post: Post,
    pub pet: Option<PetSummary>,
    pub users: UserDirectory,
}

impl PostDetails {
    pub fn author(&self) -> Option<&UserSummary> {
        self.users.get(self.post.author)
    }
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    pets: Arc<dyn PetRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

fn participants(post: &Post) -> Vec<UserId> {
    std::iter::once(post.author)
        .chain(post.comments.iter().flat_map(|c: &Comment| {
            std::iter::once(c.user).chain(c.replies.iter().map(|r| r.user))
        }))
        .collect()
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        pets: Arc<dyn PetRepository>,
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

    async fn load(&self, id: PostId) -> Result<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .filter(|post| !post.is_deleted())
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    async fn pet_summaries(&self, posts: &[Post]) -> Result<Vec<PetSummary>> {
        let mut ids: Vec<PetId> = posts.iter().filter_map(|p| p.pet).collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.pets.find_many(&ids).await?.iter().map(|p| p.summary()).collect())
    }

    /// Populates author and pet for a batch of posts.
    pub(crate) async fn summarize(&self, posts: Vec<Post>) -> Result<Vec<PostDetails>> {
        let authors = posts.iter().map(|p| p.author).collect();
        let directory = UserDirectory::load(self.users.as_ref(), authors).await?;
        let pets = self.pet_summaries(&posts).await?;
        Ok(posts
            .into_iter()
            .map(|post| PostDetails {
                pet: post
                    .pet
                    .and_then(|id| pets.iter().find(|p| p.id == id).cloned()),
                users: directory.pick([post.author]),
                post,
            })
            .collect())
    }

    async fn summarize_page(&self, page: Page<Post>) -> Result<Page<PostDetails>> {
        let Page {
            items,
            total,
            page,
            limit,
        } = page;
        Ok(Page {
            items: self.summarize(items).await?,
            total,
            page,
            limit,
        })
    }

    /// Populates author, pet and every comment and reply author.
    async fn detailed(&self, post: Post) -> Result<PostDetails> {
        let users = UserDirectory::load(self.users.as_ref(), participants(&post)).await?;
        let pet = self.pet_summaries(std::slice::from_ref(&post)).await?.into_iter().next();
        Ok(PostDetails { post, pet, users })
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<PostDetails>> {
        self.query(PostFilter::visible(), PostSort::Newest, page).await
    }

    pub(crate) async fn query(
        &self,
        filter: PostFilter,
        sort: PostSort,
        page: PageRequest,
    ) -> Result<Page<PostDetails>> {
        let posts = self.posts.list(&filter, sort, page).await?;
        self.summarize_page(posts).await
    }

    /// Hidden and private posts are only shown to their author and admins.
    pub async fn get(&self, id: PostId, viewer: Option<&Actor>) -> Result<PostDetails> {
        let mut post = self.load(id).await?;
        if !post.is_visible() && !viewer.is_some_and(|v| v.owns_or_admin(post.author)) {
            return Err(DomainError::not_found("Post", id));
        }
        if viewer.is_some() {
            self.posts.record_view(id).await?;
            post.record_view();
        }
        self.detailed(post).await
    }

    pub async fn create(&self, actor: &Actor, new: NewPost) -> Result<PostDetails> {
        if let Some(pet_id) = new.pet {
            if self.pets.find_by_id(pet_id).await?.is_none() {
                return Err(DomainError::not_found("Pet", pet_id));
            }
        }
        let post = Post::create(actor.id, new, self.clock.now())?;
        self.posts.insert(&post).await?;
        tracing::info!(post_id = %post.id, author = %actor.id, "post created");
        self.detailed(post).await
    }

    /// Read-modify-write of a live post. Soft-deleted posts are missing.
    async fn modify_live(
        &self,
        id: PostId,
        mutate: impl FnOnce(&mut Post) -> Result<()> + Send + 'static,
    ) -> Result<Post> {
        self.posts
            .modify(
                id,
                Box::new(move |post: &mut Post| -> Result<()> {
                    if post.is_deleted() {
                        return Err(DomainError::not_found("Post", post.id));
                    }
                    mutate(post)
                }),
            )
            .await
    }

    /// Author-only edit. Content changes are recorded in the edit history.
    pub async fn update(&self, actor: &Actor, id: PostId, update: PostUpdate) -> Result<PostDetails> {
        let author = actor.id;
        let now = self.clock.now();
        let post = self
            .modify_live(id, move |post: &mut Post| -> Result<()> {
                if post.author != author {
                    return Err(DomainError::forbidden("not authorized to update this post"));
                }
                post.apply_update(update, now)
            })
            .await?;
        self.detailed(post).await
    }

    pub async fn delete(&self, actor: &Actor, id: PostId) -> Result<()> {
        let requester = *actor;
        let now = self.clock.now();
        self.modify_live(id, move |post: &mut Post| -> Result<()> {
            post.soft_delete(&requester, now)
        })
        .await?;
        tracing::info!(post_id = %id, by = %actor.id, "post soft-deleted");
        Ok(())
    }

    pub async fn toggle_like(&self, actor: &Actor, id: PostId) -> Result<LikeToggle> {
        let user = actor.id;
        let now = self.clock.now();
        let post = self
            .modify_live(id, move |post: &mut Post| -> Result<()> {
                post.toggle_like(user, now);
                Ok(())
            })
            .await?;
        let toggle = LikeToggle {
            liked: post.is_liked_by(user),
            like_count: post.like_count(),
        };
        tracing::debug!(post_id = %id, user = %user, liked = toggle.liked, "like toggled");
        Ok(toggle)
    }

    pub async fn add_comment(&self, actor: &Actor, id: PostId, content: &str) -> Result<PostDetails> {
        let user = actor.id;
        let content = content.to_owned();
        let now = self.clock.now();
        let post = self
            .modify_live(id, move |post: &mut Post| -> Result<()> {
                post.add_comment(user, &content, now)?;
                Ok(())
            })
            .await?;
        self.detailed(post).await
    }

    pub async fn add_reply(
        &self,
        actor: &Actor,
        id: PostId,
        comment_id: CommentId,
        content: &str,
    ) -> Result<PostDetails> {
        let user = actor.id;
        let content = content.to_owned();
        let now = self.clock.now();
        let post = self
            .modify_live(id, move |post: &mut Post| -> Result<()> {
                post.add_reply(comment_id, user, &content, now)?;
                Ok(())
            })
            .await?;
        self.detailed(post).await
    }

    pub async fn toggle_comment_like(
        &self,
        actor: &Actor,
        id: PostId,
        comment_id: CommentId,
    ) -> Result<LikeToggle> {
        let user = actor.id;
        let post = self
            .modify_live(id, move |post: &mut Post| -> Result<()> {
                post.toggle_comment_like(comment_id, user)?;
                Ok(())
            })
            .await?;
        post.comment(comment_id)
            .map(|comment| comment.like_state(user))
            .ok_or_else(|| DomainError::not_found("Comment", comment_id))
    }

    /// Returns the new share count.
    pub async fn share(&self, actor: &Actor, id: PostId) -> Result<usize> {
        let user = actor.id;
        let now = self.clock.now();
        let post = self
            .modify_live(id, move |post: &mut Post| -> Result<()> {
                post.share(user, now);
                Ok(())
            })
            .await?;
        Ok(post.share_count())
    }

    pub async fn user_posts(&self, author: UserId, page: PageRequest) -> Result<Page<PostDetails>> {
        let filter = PostFilter {
            author: Some(author),
            ..PostFilter::visible()
        };
        self.query(filter, PostSort::Newest, page).await
    }

    pub async fn trending(&self, limit: u32) -> Result<Vec<PostDetails>> {
        Ok(self
            .query(PostFilter::visible(), PostSort::Trending, PageRequest::first(limit))
            .await?
            .items)
    }

    /// Visible posts only, whatever the filter says.
    pub async fn search(&self, mut filter: PostFilter, page: PageRequest) -> Result<Page<PostDetails>> {
        filter.visible_only = true;
        self.query(filter, PostSort::Newest, page).await
    }

    pub(crate) async fn count(&self, filter: &PostFilter) -> Result<u64> {
        self.posts.count(filter).await
    }
}

#[cfg(test)]
#[path = "posts_tests.rs"]
mod tests;
