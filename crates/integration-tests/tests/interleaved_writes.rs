//! Pet and post writes that land while another request is between its read
//! and its write. Every acknowledged change has to survive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domains::{
    Application, ApplicationId, ApplicationStatus, Page, PageRequest, Pet, PetFilter, PetId,
    PetMutation, PetRepository, PetStatus, PetType, Result, ReviewDecision, UserId,
};
use integration_tests::{actor, new_pet, new_post, World};
use services::PetService;

/// Commits an application from `applicant` the first time a pet is
/// modified, before the modification itself reaches the store.
struct ApplicationLandsMidRequest {
    inner: Arc<dyn PetRepository>,
    applicant: UserId,
    fired: AtomicBool,
}

impl ApplicationLandsMidRequest {
    fn new(inner: Arc<dyn PetRepository>, applicant: UserId) -> Self {
        Self {
            inner,
            applicant,
            fired: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl PetRepository for ApplicationLandsMidRequest {
    async fn insert(&self, pet: &Pet) -> Result<()> {
        self.inner.insert(pet).await
    }

    async fn modify(&self, id: PetId, mutate: PetMutation) -> Result<Pet> {
        if !self.fired.swap(true, Ordering::SeqCst) {
            let application = Application {
                id: ApplicationId::generate(),
                user: self.applicant,
                message: "Sent while the other request was in flight".into(),
                status: ApplicationStatus::Pending,
                submitted_at: Utc::now(),
                reviewed_at: None,
                reviewed_by: None,
            };
            self.inner.append_application(id, &application).await?;
        }
        self.inner.modify(id, mutate).await
    }

    async fn delete(&self, id: PetId) -> Result<bool> {
        self.inner.delete(id).await
    }

    async fn find_by_id(&self, id: PetId) -> Result<Option<Pet>> {
        self.inner.find_by_id(id).await
    }

    async fn find_many(&self, ids: &[PetId]) -> Result<Vec<Pet>> {
        self.inner.find_many(ids).await
    }

    async fn list(&self, filter: &PetFilter, page: PageRequest) -> Result<Page<Pet>> {
        self.inner.list(filter, page).await
    }

    async fn count(&self, filter: &PetFilter) -> Result<u64> {
        self.inner.count(filter).await
    }

    async fn find_ids(&self, filter: &PetFilter) -> Result<Vec<PetId>> {
        self.inner.find_ids(filter).await
    }

    async fn append_application(&self, pet_id: PetId, application: &Application) -> Result<Pet> {
        self.inner.append_application(pet_id, application).await
    }

    async fn record_view(&self, id: PetId) -> Result<()> {
        self.inner.record_view(id).await
    }
}

fn racing_service(world: &World, applicant: UserId) -> PetService {
    PetService::new(
        Arc::new(ApplicationLandsMidRequest::new(
            Arc::clone(&world.repos.pets),
            applicant,
        )),
        Arc::clone(&world.repos.users),
        world.clock.clone(),
    )
}

#[tokio::test]
async fn favoriting_keeps_an_application_committed_meanwhile() {
    let world = World::new();
    let owner = world.user("Owen").await;
    let applicant = world.user("Ada").await;
    let fan = world.user("Fay").await;
    let pet = world
        .services
        .pets
        .create(&actor(&owner), new_pet("Luna", PetType::Dog))
        .await
        .unwrap()
        .pet;

    let toggle = racing_service(&world, applicant.id)
        .toggle_favorite(&actor(&fan), pet.id)
        .await
        .unwrap();
    assert!(toggle.is_favorited);

    let stored = world.repos.pets.find_by_id(pet.id).await.unwrap().unwrap();
    assert_eq!(stored.favorites, vec![fan.id]);
    assert_eq!(stored.applications.len(), 1);
    assert_eq!(stored.applications[0].user, applicant.id);

    let mine = world
        .services
        .pets
        .my_applications(&actor(&applicant))
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
}

#[tokio::test]
async fn reviewing_keeps_an_application_committed_meanwhile() {
    let world = World::new();
    let owner = world.user("Owen").await;
    let first = world.user("Ada").await;
    let second = world.user("Bea").await;
    let pet = world
        .services
        .pets
        .create(&actor(&owner), new_pet("Luna", PetType::Dog))
        .await
        .unwrap()
        .pet;
    let application = world
        .services
        .pets
        .apply(&actor(&first), pet.id, "Big garden")
        .await
        .unwrap();

    let outcome = racing_service(&world, second.id)
        .review_application(&actor(&owner), pet.id, application.id, ReviewDecision::Approved)
        .await
        .unwrap();
    assert_eq!(outcome.application.status, ApplicationStatus::Approved);
    assert_eq!(outcome.pet.status, PetStatus::Pending);
    assert_eq!(outcome.pet.applications.len(), 2);

    let stored = world.repos.pets.find_by_id(pet.id).await.unwrap().unwrap();
    let applicants: Vec<UserId> = stored.applications.iter().map(|a| a.user).collect();
    assert_eq!(applicants, vec![first.id, second.id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_on_one_pet_all_take_effect() {
    let world = Arc::new(World::new());
    let owner = world.user("Owen").await;
    let pet = world
        .services
        .pets
        .create(&actor(&owner), new_pet("Luna", PetType::Dog))
        .await
        .unwrap()
        .pet;
    let mut people = Vec::new();
    for i in 0..12 {
        people.push(world.user(&format!("Person{i}")).await);
    }

    let mut tasks = Vec::new();
    for person in people.iter().cloned() {
        let world = Arc::clone(&world);
        tasks.push(tokio::spawn(async move {
            let who = actor(&person);
            let (applied, favorited) = tokio::join!(
                world.services.pets.apply(&who, pet.id, "Count me in"),
                world.services.pets.toggle_favorite(&who, pet.id),
            );
            applied.unwrap();
            favorited.unwrap();
            world.services.pets.get(pet.id, Some(&who)).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let stored = world.repos.pets.find_by_id(pet.id).await.unwrap().unwrap();
    assert_eq!(stored.applications.len(), 12);
    assert_eq!(stored.favorites.len(), 12);
    assert_eq!(stored.views, 12);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_engagement_on_one_post_is_all_counted() {
    let world = Arc::new(World::new());
    let author = world.user("Ava").await;
    let post = world
        .services
        .posts
        .create(&actor(&author), new_post("Adopted today!"))
        .await
        .unwrap()
        .post;
    let mut people = Vec::new();
    for i in 0..10 {
        people.push(world.user(&format!("Reader{i}")).await);
    }

    let mut tasks = Vec::new();
    for person in people.iter().cloned() {
        let world = Arc::clone(&world);
        tasks.push(tokio::spawn(async move {
            let who = actor(&person);
            let (liked, commented, shared) = tokio::join!(
                world.services.posts.toggle_like(&who, post.id),
                world.services.posts.add_comment(&who, post.id, "Congrats"),
                world.services.posts.share(&who, post.id),
            );
            liked.unwrap();
            commented.unwrap();
            shared.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let stored = world.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.like_count(), 10);
    assert_eq!(stored.comment_count(), 10);
    assert_eq!(stored.share_count(), 10);
}
