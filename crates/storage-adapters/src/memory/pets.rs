use async_trait::async_trait;
use dashmap::DashMap;

use domains::{
    Application, DomainError, Page, PageRequest, Pet, PetFilter, PetId, PetMutation, PetRepository,
    PetStatus, Result,
};

use super::newest_page;

#[derive(Debug, Default)]
pub struct MemoryPetRepository {
    pets: DashMap<PetId, Pet>,
}

impl MemoryPetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, filter: &PetFilter) -> Vec<Pet> {
        self.pets
            .iter()
            .filter(|p| filter.matches(p.value()))
            .map(|p| p.value().clone())
            .collect()
    }
}

#[async_trait]
impl PetRepository for MemoryPetRepository {
    async fn insert(&self, pet: &Pet) -> Result<()> {
        self.pets.insert(pet.id, pet.clone());
        Ok(())
    }

    async fn modify(&self, id: PetId, mutate: PetMutation) -> Result<Pet> {
        let mut stored = self
            .pets
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Pet", id))?;
        // Mutate a copy so a failed closure leaves the document untouched.
        let mut pet = stored.clone();
        mutate(&mut pet)?;
        *stored = pet.clone();
        Ok(pet)
    }

    async fn delete(&self, id: PetId) -> Result<bool> {
        Ok(self.pets.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: PetId) -> Result<Option<Pet>> {
        Ok(self.pets.get(&id).map(|p| p.clone()))
    }

    async fn find_many(&self, ids: &[PetId]) -> Result<Vec<Pet>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.pets.get(id).map(|p| p.clone()))
            .collect())
    }

    async fn list(&self, filter: &PetFilter, page: PageRequest) -> Result<Page<Pet>> {
        Ok(newest_page(self.matching(filter), page, |p: &Pet| {
            (p.created_at, p.id.as_uuid())
        }))
    }

    async fn count(&self, filter: &PetFilter) -> Result<u64> {
        Ok(self.pets.iter().filter(|p| filter.matches(p.value())).count() as u64)
    }

    async fn find_ids(&self, filter: &PetFilter) -> Result<Vec<PetId>> {
        Ok(self
            .pets
            .iter()
            .filter(|p| filter.matches(p.value()))
            .map(|p| *p.key())
            .collect())
    }

    async fn append_application(&self, pet_id: PetId, application: &Application) -> Result<Pet> {
        // Check and append under the entry lock so two racing submissions
        // cannot both pass the duplicate check.
        let mut pet = self
            .pets
            .get_mut(&pet_id)
            .ok_or_else(|| DomainError::not_found("Pet", pet_id))?;
        if pet.status != PetStatus::Available {
            return Err(DomainError::unavailable("this pet is not available for adoption"));
        }
        if pet.has_application_from(application.user) {
            return Err(DomainError::DuplicateApplication);
        }
        pet.applications.push(application.clone());
        pet.updated_at = application.submitted_at;
        Ok(pet.clone())
    }

    async fn record_view(&self, id: PetId) -> Result<()> {
        let mut pet = self
            .pets
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Pet", id))?;
        pet.record_view();
        Ok(())
    }
}
