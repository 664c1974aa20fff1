//! Lifecycle rules exercised across entities, without any storage.

use chrono::{Duration, Utc};
use domains::{
    Actor, DomainError, PetFilter, PetStatus, PetType, Post, PostFilter, PostSort, ReviewDecision,
    Role, UserId,
};
use integration_tests::{new_pet, new_post};

fn owner_actor(id: UserId) -> Actor {
    Actor::new(id, Role::User)
}

#[test]
fn luna_adoption_scenario() {
    let now = Utc::now();
    let owner = UserId::generate();
    let applicant = UserId::generate();
    let mut luna = domains::Pet::create(owner, new_pet("Luna", PetType::Dog), now).unwrap();
    assert_eq!(luna.status, PetStatus::Available);

    let application_id = luna.submit_application(applicant, "I love dogs", now).unwrap().id;
    let outcome = luna
        .review_application(application_id, &owner_actor(owner), ReviewDecision::Approved, now)
        .unwrap();

    assert_eq!(outcome.pet.status, PetStatus::Pending);
    assert_eq!(luna.status, PetStatus::Pending);
    let application = luna.application(application_id).unwrap();
    assert_eq!(application.status, domains::ApplicationStatus::Approved);
    assert_eq!(application.reviewed_by, Some(owner));
    assert_eq!(application.reviewed_at, Some(now));
}

#[test]
fn approved_pet_leaves_the_available_listing() {
    let now = Utc::now();
    let owner = UserId::generate();
    let mut pet = domains::Pet::create(owner, new_pet("Rex", PetType::Dog), now).unwrap();
    let available = PetFilter::available();
    assert!(available.matches(&pet));

    let id = pet.submit_application(UserId::generate(), "hello", now).unwrap().id;
    pet.review_application(id, &owner_actor(owner), ReviewDecision::Approved, now)
        .unwrap();

    assert!(!available.matches(&pet));
    let err = pet
        .submit_application(UserId::generate(), "me too", now)
        .unwrap_err();
    assert!(matches!(err, DomainError::Unavailable(_)));
    assert_eq!(pet.applications.len(), 1);
}

#[test]
fn deleted_hidden_and_private_posts_are_not_visible() {
    let now = Utc::now();
    let author = UserId::generate();
    let visible = PostFilter::visible();

    let mut deleted = Post::create(author, new_post("bye"), now).unwrap();
    deleted.soft_delete(&owner_actor(author), now).unwrap();
    assert!(!visible.matches(&deleted));

    let private = Post::create(
        author,
        domains::NewPost {
            is_public: Some(false),
            ..new_post("just for me")
        },
        now,
    )
    .unwrap();
    assert!(!visible.matches(&private));

    let public = Post::create(author, new_post("hello"), now).unwrap();
    assert!(visible.matches(&public));
    assert!(PostFilter::default().matches(&deleted));
}

#[test]
fn trending_orders_by_engagement_then_recency() {
    let start = Utc::now();
    let author = UserId::generate();
    let mut posts: Vec<Post> = [5usize, 12, 3]
        .into_iter()
        .enumerate()
        .map(|(i, shares)| {
            let at = start + Duration::seconds(i as i64);
            let mut post = Post::create(author, new_post(&format!("post {i}")), at).unwrap();
            for _ in 0..shares {
                post.share(UserId::generate(), at);
            }
            post
        })
        .collect();

    posts.sort_by(|a, b| PostSort::Trending.compare(a, b));
    let order: Vec<usize> = posts.iter().map(Post::engagement).collect();
    assert_eq!(order, vec![12, 5, 3]);

    let tie_old = Post::create(author, new_post("old"), start).unwrap();
    let tie_new = Post::create(author, new_post("new"), start + Duration::minutes(1)).unwrap();
    let mut ties = vec![tie_old, tie_new];
    ties.sort_by(|a, b| PostSort::Trending.compare(a, b));
    assert_eq!(ties[0].content, "new");
}

/// The SQL store filters on these JSON paths; renaming a field breaks it.
#[test]
fn stored_document_keys_match_query_paths() {
    let now = Utc::now();
    let mut pet = domains::Pet::create(UserId::generate(), new_pet("Mia", PetType::Cat), now).unwrap();
    pet.submit_application(UserId::generate(), "hi", now).unwrap();
    let doc = serde_json::to_value(&pet).unwrap();

    assert_eq!(doc["type"], "cat");
    assert_eq!(doc["status"], "available");
    assert!(doc["adoptionFee"].is_number());
    assert!(doc["age"]["value"].is_number());
    assert!(doc["health"]["isVaccinated"].is_boolean());
    assert!(doc["favorites"].is_array());
    assert!(doc["applications"][0]["submittedAt"].is_string());

    let post = Post::create(UserId::generate(), new_post("hello"), now).unwrap();
    let doc = serde_json::to_value(&post).unwrap();
    assert_eq!(doc["isPublic"], true);
    assert_eq!(doc["status"], "active");
    assert!(doc["likes"].is_array());
    assert!(doc["shares"].is_array());
}
