use async_trait::async_trait;
use dashmap::DashMap;

use domains::{
    DomainError, Page, PageRequest, Post, PostFilter, PostId, PostMutation, PostRepository, PostSort,
    Result,
};

use super::slice_page;

#[derive(Debug, Default)]
pub struct MemoryPostRepository {
    posts: DashMap<PostId, Post>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, post: &Post) -> Result<()> {
        self.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn modify(&self, id: PostId, mutate: PostMutation) -> Result<Post> {
        let mut stored = self
            .posts
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Post", id))?;
        let mut post = stored.clone();
        mutate(&mut post)?;
        *stored = post.clone();
        Ok(post)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|p| p.clone()))
    }

    async fn list(&self, filter: &PostFilter, sort: PostSort, page: PageRequest) -> Result<Page<Post>> {
        let mut matching: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| filter.matches(p.value()))
            .map(|p| p.value().clone())
            .collect();
        matching.sort_by(|a, b| sort.compare(a, b).then_with(|| b.id.cmp(&a.id)));
        Ok(slice_page(matching, page))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64> {
        Ok(self.posts.iter().filter(|p| filter.matches(p.value())).count() as u64)
    }

    async fn record_view(&self, id: PostId) -> Result<()> {
        let mut post = self
            .posts
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Post", id))?;
        post.record_view();
        Ok(())
    }
}
