//! # PetService
//!
//! Pet listings and the adoption workflow. Authorization is checked here;
//! the lifecycle rules themselves live on [`Pet`].

use std::sync::Arc;

use domains::{
    Actor, Application, ApplicationId, Clock, DomainError, NewPet, Page, PageRequest, Pet,
    PetFilter, PetId, PetRepository, PetStatus, PetSummary, PetUpdate, Result, ReviewDecision,
    ReviewOutcome, UserId, UserRepository, UserSummary,
};

use crate::directory::UserDirectory;

pub const DEFAULT_PET_LIMIT: u32 = 12;
pub const FEATURED_LIMIT: u32 = 6;

/// A pet with the users it references populated.
#[derive(Debug, Clone, PartialEq)]
pub struct PetDetails {
    pub pet: Pet,
    /// Owner, plus applicants and reviewers when loaded for a detail view.
    pub users: UserDirectory,
}

impl PetDetails {
    pub fn owner(&self) -> Option<&UserSummary> {
        self.users.get(self.pet.owner)
    }
}

/// One application seen from outside its pet.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationEntry {
    pub pet: PetSummary,
    pub pet_status: PetStatus,
    pub application: Application,
    pub applicant: Option<UserSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteToggle {
    pub is_favorited: bool,
    pub favorite_count: usize,
}

#[derive(Clone)]
pub struct PetService {
    pets: Arc<dyn PetRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl PetService {
    pub fn new(
        pets: Arc<dyn PetRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { pets, users, clock }
    }

    async fn load(&self, id: PetId) -> Result<Pet> {
        self.pets
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Pet", id))
    }

    async fn load_managed(&self, id: PetId, actor: &Actor) -> Result<Pet> {
        let pet = self.load(id).await?;
        ensure_manager(&pet, actor)?;
        Ok(pet)
    }

    /// Populates the owner of every pet with a single lookup.
    pub(crate) async fn with_owners(&self, pets: Vec<Pet>) -> Result<Vec<PetDetails>> {
        let owners = pets.iter().map(|p| p.owner).collect();
        let directory = UserDirectory::load(self.users.as_ref(), owners).await?;
        Ok(pets
            .into_iter()
            .map(|pet| PetDetails {
                users: directory.pick([pet.owner]),
                pet,
            })
            .collect())
    }

    async fn page_with_owners(&self, page: Page<Pet>) -> Result<Page<PetDetails>> {
        let Page {
            items,
            total,
            page,
            limit,
        } = page;
        Ok(Page {
            items: self.with_owners(items).await?,
            total,
            page,
            limit,
        })
    }

    async fn detailed(&self, pet: Pet) -> Result<PetDetails> {
        let ids = std::iter::once(pet.owner)
            .chain(
                pet.applications
                    .iter()
                    .flat_map(|app| std::iter::once(app.user).chain(app.reviewed_by)),
            )
            .collect();
        let users = UserDirectory::load(self.users.as_ref(), ids).await?;
        Ok(PetDetails { pet, users })
    }

    /// Available pets, newest first.
    pub async fn list_available(&self, page: PageRequest) -> Result<Page<PetDetails>> {
        let pets = self.pets.list(&PetFilter::available(), page).await?;
        self.page_with_owners(pets).await
    }

    /// Search is always restricted to available pets.
    pub async fn search(&self, mut filter: PetFilter, page: PageRequest) -> Result<Page<PetDetails>> {
        filter.status = Some(PetStatus::Available);
        let pets = self.pets.list(&filter, page).await?;
        self.page_with_owners(pets).await
    }

    pub async fn featured(&self) -> Result<Vec<PetDetails>> {
        self.featured_limited(FEATURED_LIMIT).await
    }

    pub(crate) async fn featured_limited(&self, limit: u32) -> Result<Vec<PetDetails>> {
        let filter = PetFilter {
            featured: Some(true),
            ..PetFilter::available()
        };
        let pets = self.pets.list(&filter, PageRequest::first(limit)).await?;
        self.with_owners(pets.items).await
    }

    /// Loads a pet for display. Authenticated viewers bump the view counter.
    pub async fn get(&self, id: PetId, viewer: Option<&Actor>) -> Result<PetDetails> {
        let mut pet = self.load(id).await?;
        if viewer.is_some() {
            self.pets.record_view(id).await?;
            pet.record_view();
        }
        self.detailed(pet).await
    }

    pub async fn create(&self, actor: &Actor, new: NewPet) -> Result<PetDetails> {
        let pet = Pet::create(actor.id, new, self.clock.now())?;
        self.pets.insert(&pet).await?;
        tracing::info!(pet_id = %pet.id, owner = %actor.id, "pet listed");
        self.detailed(pet).await
    }

    pub async fn update(&self, actor: &Actor, id: PetId, mut update: PetUpdate) -> Result<PetDetails> {
        if update.is_featured.is_some() && !actor.is_admin() {
            update.is_featured = None;
        }
        let actor = *actor;
        let now = self.clock.now();
        let pet = self
            .pets
            .modify(
                id,
                Box::new(move |pet: &mut Pet| -> Result<()> {
                    ensure_manager(pet, &actor)?;
                    pet.apply_update(update, now)
                }),
            )
            .await?;
        tracing::info!(pet_id = %id, by = %actor.id, status = %pet.status, "pet updated");
        self.detailed(pet).await
    }

    /// Hard delete by the owner or an admin. Returns the removed pet so the
    /// caller can release its media.
    pub async fn delete(&self, actor: &Actor, id: PetId) -> Result<Pet> {
        let pet = self.load_managed(id, actor).await?;
        if !self.pets.delete(id).await? {
            return Err(DomainError::not_found("Pet", id));
        }
        tracing::info!(pet_id = %id, by = %actor.id, "pet deleted");
        Ok(pet)
    }

    pub async fn toggle_favorite(&self, actor: &Actor, id: PetId) -> Result<FavoriteToggle> {
        let user = actor.id;
        let pet = self
            .pets
            .modify(
                id,
                Box::new(move |pet: &mut Pet| -> Result<()> {
                    pet.toggle_favorite(user);
                    Ok(())
                }),
            )
            .await?;
        Ok(FavoriteToggle {
            is_favorited: pet.is_favorite_of(user),
            favorite_count: pet.favorite_count(),
        })
    }

    /// Submits an application. The domain checks run first; the store then
    /// appends atomically and rejects a concurrent duplicate on its own.
    pub async fn apply(&self, actor: &Actor, id: PetId, message: &str) -> Result<Application> {
        let mut pet = self.load(id).await?;
        let application = pet
            .submit_application(actor.id, message, self.clock.now())?
            .clone();
        self.pets.append_application(id, &application).await?;
        tracing::info!(
            pet_id = %id,
            application_id = %application.id,
            applicant = %actor.id,
            "adoption application submitted"
        );
        Ok(application)
    }

    /// Owner review. Approval moves the pet to `pending` in the same write.
    pub async fn review_application(
        &self,
        actor: &Actor,
        pet_id: PetId,
        application_id: ApplicationId,
        decision: ReviewDecision,
    ) -> Result<ReviewOutcome> {
        let reviewer = *actor;
        let now = self.clock.now();
        let pet = self
            .pets
            .modify(
                pet_id,
                Box::new(move |pet: &mut Pet| -> Result<()> {
                    pet.review_application(application_id, &reviewer, decision, now)?;
                    Ok(())
                }),
            )
            .await?;
        let application = written_application(&pet, application_id)?;
        tracing::info!(
            pet_id = %pet_id,
            application_id = %application_id,
            status = application.status.as_str(),
            pet_status = %pet.status,
            "adoption application reviewed"
        );
        Ok(ReviewOutcome { pet, application })
    }

    pub async fn withdraw_application(
        &self,
        actor: &Actor,
        pet_id: PetId,
        application_id: ApplicationId,
    ) -> Result<Application> {
        let applicant = actor.id;
        let now = self.clock.now();
        let pet = self
            .pets
            .modify(
                pet_id,
                Box::new(move |pet: &mut Pet| -> Result<()> {
                    pet.withdraw_application(application_id, applicant, now)?;
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(pet_id = %pet_id, application_id = %application_id, "adoption application withdrawn");
        written_application(&pet, application_id)
    }

    pub async fn my_pets(&self, actor: &Actor, page: PageRequest) -> Result<Page<PetDetails>> {
        let filter = PetFilter {
            owner: Some(actor.id),
            ..PetFilter::default()
        };
        let pets = self.pets.list(&filter, page).await?;
        self.page_with_owners(pets).await
    }

    pub async fn favorites(&self, actor: &Actor, page: PageRequest) -> Result<Page<PetDetails>> {
        let filter = PetFilter {
            favorited_by: Some(actor.id),
            ..PetFilter::default()
        };
        let pets = self.pets.list(&filter, page).await?;
        self.page_with_owners(pets).await
    }

    /// Applications across every pet the actor owns, newest first.
    pub async fn applications_received(&self, actor: &Actor) -> Result<Vec<ApplicationEntry>> {
        let pets = self.all_matching(PetFilter {
            owner: Some(actor.id),
            ..PetFilter::default()
        })
        .await?;
        let applicants: Vec<UserId> = pets
            .iter()
            .flat_map(|p| p.applications.iter().map(|a| a.user))
            .collect();
        let directory = UserDirectory::load(self.users.as_ref(), applicants).await?;
        Ok(collect_entries(&pets, |_| true, Some(&directory)))
    }

    /// The actor's own applications, newest first.
    pub async fn my_applications(&self, actor: &Actor) -> Result<Vec<ApplicationEntry>> {
        let pets = self.all_matching(PetFilter {
            applicant: Some(actor.id),
            ..PetFilter::default()
        })
        .await?;
        Ok(collect_entries(&pets, |app| app.user == actor.id, None))
    }

    async fn all_matching(&self, filter: PetFilter) -> Result<Vec<Pet>> {
        let ids = self.pets.find_ids(&filter).await?;
        self.pets.find_many(&ids).await
    }

    pub(crate) async fn ids_matching(&self, filter: &PetFilter) -> Result<Vec<PetId>> {
        self.pets.find_ids(filter).await
    }

    pub(crate) async fn list_filtered(&self, filter: &PetFilter, page: PageRequest) -> Result<Vec<PetDetails>> {
        let pets = self.pets.list(filter, page).await?;
        self.with_owners(pets.items).await
    }

    pub(crate) async fn count(&self, filter: &PetFilter) -> Result<u64> {
        self.pets.count(filter).await
    }
}

fn ensure_manager(pet: &Pet, actor: &Actor) -> Result<()> {
    if pet.can_be_managed_by(actor) {
        Ok(())
    } else {
        Err(DomainError::forbidden("not authorized to modify this pet"))
    }
}

fn written_application(pet: &Pet, id: ApplicationId) -> Result<Application> {
    pet.application(id)
        .cloned()
        .ok_or_else(|| DomainError::not_found("Application", id))
}

fn collect_entries(
    pets: &[Pet],
    keep: impl Fn(&Application) -> bool,
    directory: Option<&UserDirectory>,
) -> Vec<ApplicationEntry> {
    let keep = &keep;
    let mut entries: Vec<ApplicationEntry> = pets
        .iter()
        .flat_map(|pet| {
            pet.applications
                .iter()
                .filter(move |app| keep(app))
                .map(move |app| (pet, app))
        })
        .map(|(pet, app)| ApplicationEntry {
            pet: pet.summary(),
            pet_status: pet.status,
            application: app.clone(),
            applicant: directory.and_then(|d| d.get(app.user).cloned()),
        })
        .collect();
    entries.sort_by(|a, b| b.application.submitted_at.cmp(&a.application.submitted_at));
    entries
}

#[cfg(test)]
#[path = "pets_tests.rs"]
mod tests;
