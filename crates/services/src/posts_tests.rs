//! Tests for the post service.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    MockPetRepository, MockPostRepository, MockUserRepository, PostStatus, Role, SystemClock,
};

use super::*;

fn post_by(author: UserId) -> Post {
    Post::create(
        author,
        NewPost {
            content: "Hello".into(),
            ..NewPost::default()
        },
        Utc::now(),
    )
    .expect("valid post")
}

fn no_users() -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users.expect_find_many().returning(|_| Ok(Vec::new()));
    users
}

/// `modify` runs the service's mutation against `post`, as a store would.
fn modifying(post: Post) -> MockPostRepository {
    let mut posts = MockPostRepository::new();
    posts.expect_modify().times(1).return_once(move |_, mutate| {
        let mut post = post;
        mutate(&mut post)?;
        Ok(post)
    });
    posts
}

fn service(posts: MockPostRepository, pets: MockPetRepository) -> PostService {
    PostService::new(
        Arc::new(posts),
        Arc::new(pets),
        Arc::new(no_users()),
        Arc::new(SystemClock),
    )
}

#[tokio::test]
async fn deleted_posts_are_not_found() {
    let mut post = post_by(UserId::generate());
    post.status = PostStatus::Deleted;
    let posts = modifying(post);

    let actor = Actor::new(UserId::generate(), Role::User);
    let err = service(posts, MockPetRepository::new())
        .toggle_like(&actor, PostId::generate())
        .await
        .expect_err("deleted");
    assert!(matches!(err, DomainError::NotFound { entity: "Post", .. }));
}

#[tokio::test]
async fn hidden_posts_are_visible_to_their_author_only() {
    let author = Actor::new(UserId::generate(), Role::User);
    let mut post = post_by(author.id);
    post.status = PostStatus::Hidden;
    let hidden = post.clone();

    let mut posts = MockPostRepository::new();
    posts.expect_find_by_id().return_once(move |_| Ok(Some(post)));
    let err = service(posts, MockPetRepository::new())
        .get(PostId::generate(), None)
        .await
        .expect_err("hidden from anonymous viewers");
    assert!(matches!(err, DomainError::NotFound { .. }));

    let mut posts = MockPostRepository::new();
    posts.expect_find_by_id().return_once(move |_| Ok(Some(hidden)));
    posts.expect_record_view().return_once(|_| Ok(()));
    service(posts, MockPetRepository::new())
        .get(PostId::generate(), Some(&author))
        .await
        .expect("author sees hidden post");
}

#[tokio::test]
async fn only_the_author_may_edit() {
    let posts = modifying(post_by(UserId::generate()));

    let admin = Actor::new(UserId::generate(), Role::Admin);
    let err = service(posts, MockPetRepository::new())
        .update(
            &admin,
            PostId::generate(),
            PostUpdate {
                content: Some("Edited".into()),
                ..PostUpdate::default()
            },
        )
        .await
        .expect_err("admins cannot edit");
    assert!(matches!(err, DomainError::Forbidden(_)));
}

#[tokio::test]
async fn creating_a_post_about_a_missing_pet_fails() {
    let mut pets = MockPetRepository::new();
    pets.expect_find_by_id().return_once(|_| Ok(None));
    let mut posts = MockPostRepository::new();
    posts.expect_insert().never();

    let actor = Actor::new(UserId::generate(), Role::User);
    let err = service(posts, pets)
        .create(
            &actor,
            NewPost {
                content: "Meet Luna".into(),
                pet: Some(PetId::generate()),
                ..NewPost::default()
            },
        )
        .await
        .expect_err("missing pet");
    assert!(matches!(err, DomainError::NotFound { entity: "Pet", .. }));
}

#[tokio::test]
async fn soft_delete_persists_deleted_status() {
    let author = Actor::new(UserId::generate(), Role::User);
    let post = post_by(author.id);
    let mut posts = MockPostRepository::new();
    posts.expect_modify().times(1).return_once(move |_, mutate| {
        let mut post = post;
        mutate(&mut post)?;
        assert_eq!(post.status, PostStatus::Deleted);
        Ok(post)
    });

    service(posts, MockPetRepository::new())
        .delete(&author, PostId::generate())
        .await
        .expect("deleted");
}

#[tokio::test]
async fn comment_like_toggle_reports_the_written_comment() {
    let reader = Actor::new(UserId::generate(), Role::User);
    let mut post = post_by(UserId::generate());
    let comment_id = post
        .add_comment(UserId::generate(), "So cute", Utc::now())
        .expect("commented")
        .id;
    let posts = modifying(post);

    let toggle = service(posts, MockPetRepository::new())
        .toggle_comment_like(&reader, PostId::generate(), comment_id)
        .await
        .expect("toggled");
    assert_eq!(
        toggle,
        LikeToggle {
            liked: true,
            like_count: 1,
        }
    );
}

#[tokio::test]
async fn search_forces_visibility() {
    let mut posts = MockPostRepository::new();
    posts
        .expect_list()
        .withf(|filter, sort, _| filter.visible_only && *sort == PostSort::Newest)
        .times(1)
        .return_once(|_, _, page| Ok(Page::new(Vec::new(), 0, page)));

    service(posts, MockPetRepository::new())
        .search(PostFilter::default(), PageRequest::first(10))
        .await
        .expect("searched");
}
