//! # Pet
//!
//! Pets listed for adoption and the adoption lifecycle that governs them.
//!
//! Status machine: `available -> pending` (only through an approved
//! application), `pending -> adopted`, `available <-> not_available`.
//! `adopted` is terminal. New applications are accepted only while the pet
//! is `available`.
//!
//! Application machine: `pending -> approved | rejected | withdrawn`, each
//! terminal. `reviewed_at` is stamped exactly once, on leaving `pending`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Actor, ApplicationId, PetId, PetLocation, UserId};
use crate::errors::{check_max_len, require_text, DomainError, Result};

pub const NAME_MAX: usize = 30;
pub const DESCRIPTION_MAX: usize = 1000;
pub const SPECIAL_NEEDS_MAX: usize = 500;
pub const APPLICATION_MESSAGE_MAX: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    #[default]
    Dog,
    Cat,
    Bird,
    Fish,
    Rabbit,
    Hamster,
    Other,
}

impl PetType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dog => "dog",
            Self::Cat => "cat",
            Self::Bird => "bird",
            Self::Fish => "fish",
            Self::Rabbit => "rabbit",
            Self::Hamster => "hamster",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeUnit {
    Months,
    #[default]
    Years,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Size {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl Size {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::ExtraLarge => "extra-large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetStatus {
    #[default]
    Available,
    Pending,
    Adopted,
    NotAvailable,
}

impl PetStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Adopted => "adopted",
            Self::NotAvailable => "not_available",
        }
    }

    /// Transitions an owner may request directly. `pending` is only reachable
    /// through [`Pet::review_application`].
    pub const fn can_be_set_manually(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Available, Self::NotAvailable)
                | (Self::NotAvailable, Self::Available)
                | (Self::Pending, Self::Adopted)
        )
    }
}

impl fmt::Display for PetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaccineStatus {
    Completed,
    #[default]
    Pending,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperament {
    Calm,
    Energetic,
    Shy,
    #[default]
    Friendly,
    Aggressive,
    Playful,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Age {
    pub value: f64,
    #[serde(default)]
    pub unit: AgeUnit,
}

impl Age {
    pub fn years(value: f64) -> Self {
        Self {
            value,
            unit: AgeUnit::Years,
        }
    }

    pub fn months(value: f64) -> Self {
        Self {
            value,
            unit: AgeUnit::Months,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(DomainError::validation("age cannot be negative"));
        }
        Ok(())
    }

    /// Age in years; months are divided by 12 and rounded to one decimal.
    pub fn in_years(&self) -> f64 {
        match self.unit {
            AgeUnit::Years => self.value,
            AgeUnit::Months => (self.value / 12.0 * 10.0).round() / 10.0,
        }
    }

    /// "1 year", "3 years", "1 month", "5 months".
    pub fn display(&self) -> String {
        let singular = self.value == 1.0;
        let unit = match (self.unit, singular) {
            (AgeUnit::Years, true) => "year",
            (AgeUnit::Years, false) => "years",
            (AgeUnit::Months, true) => "month",
            (AgeUnit::Months, false) => "months",
        };
        format!("{} {unit}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub veterinarian: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccine {
    pub name: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: VaccineStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    #[serde(default)]
    pub is_vaccinated: bool,
    #[serde(default)]
    pub is_spayed: bool,
    #[serde(default = "default_true")]
    pub is_healthy: bool,
    #[serde(default)]
    pub medical_history: Vec<MedicalRecord>,
    #[serde(default)]
    pub vaccines: Vec<Vaccine>,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            is_vaccinated: false,
            is_spayed: false,
            is_healthy: true,
            medical_history: Vec::new(),
            vaccines: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodWith {
    #[serde(default = "default_true")]
    pub children: bool,
    #[serde(default = "default_true")]
    pub dogs: bool,
    #[serde(default = "default_true")]
    pub cats: bool,
    #[serde(default = "default_true")]
    pub other_pets: bool,
}

impl Default for GoodWith {
    fn default() -> Self {
        Self {
            children: true,
            dogs: true,
            cats: true,
            other_pets: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Behavior {
    #[serde(default)]
    pub temperament: Temperament,
    #[serde(default)]
    pub good_with: GoodWith,
    #[serde(default)]
    pub special_needs: Option<String>,
}

impl Behavior {
    fn validate(&self) -> Result<()> {
        if let Some(needs) = &self.special_needs {
            check_max_len("special needs", needs, SPECIAL_NEEDS_MAX)?;
        }
        Ok(())
    }
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }
}

/// The outcome an owner may give a pending application. Withdrawal is the
/// applicant's own action and has no owner-side counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for ApplicationStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => Self::Approved,
            ReviewDecision::Rejected => Self::Rejected,
        }
    }
}

/// An adoption request embedded in its pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub user: UserId,
    pub message: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_by: Option<UserId>,
}

impl Application {
    fn close(&mut self, status: ApplicationStatus, by: UserId, now: DateTime<Utc>) -> Result<()> {
        if self.status != ApplicationStatus::Pending {
            return Err(DomainError::validation(format!(
                "application has already been {}",
                self.status.as_str()
            )));
        }
        self.status = status;
        self.reviewed_by = Some(by);
        self.reviewed_at = Some(now);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: PetType,
    pub breed: String,
    pub age: Age,
    pub gender: Gender,
    pub size: Size,
    pub color: String,
    pub description: String,
    pub images: Vec<String>,
    pub owner: UserId,
    pub status: PetStatus,
    #[serde(default)]
    pub health: Health,
    #[serde(default)]
    pub behavior: Behavior,
    #[serde(default)]
    pub characteristics: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub location: PetLocation,
    #[serde(default)]
    pub adoption_fee: f64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub favorites: Vec<UserId>,
    #[serde(default)]
    pub applications: Vec<Application>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`Pet::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewPet {
    pub name: String,
    pub pet_type: PetType,
    pub breed: String,
    pub age: Age,
    pub gender: Gender,
    pub size: Size,
    pub color: String,
    pub description: String,
    pub images: Vec<String>,
    pub health: Health,
    pub behavior: Behavior,
    pub characteristics: Vec<String>,
    pub requirements: Vec<String>,
    pub location: PetLocation,
    pub adoption_fee: f64,
}

/// Explicit partial update. Fields left `None` are untouched; `add_images`
/// are appended after the existing images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PetUpdate {
    pub name: Option<String>,
    pub pet_type: Option<PetType>,
    pub breed: Option<String>,
    pub age: Option<Age>,
    pub gender: Option<Gender>,
    pub size: Option<Size>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub add_images: Vec<String>,
    pub status: Option<PetStatus>,
    pub health: Option<Health>,
    pub behavior: Option<Behavior>,
    pub characteristics: Option<Vec<String>>,
    pub requirements: Option<Vec<String>>,
    pub location: Option<PetLocation>,
    pub adoption_fee: Option<f64>,
    pub is_featured: Option<bool>,
}

/// Result of an owner's review: both entities as written by the same save.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    pub pet: Pet,
    pub application: Application,
}

/// Subset of a pet shown where a post references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSummary {
    pub id: PetId,
    pub name: String,
    pub images: Vec<String>,
}

fn trimmed_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

fn validate_fee(fee: f64) -> Result<()> {
    if !fee.is_finite() || fee < 0.0 {
        return Err(DomainError::validation("adoption fee cannot be negative"));
    }
    Ok(())
}

impl Pet {
    pub fn create(owner: UserId, new: NewPet, now: DateTime<Utc>) -> Result<Self> {
        require_text("name", &new.name, NAME_MAX)?;
        require_text("breed", &new.breed, usize::MAX)?;
        require_text("color", &new.color, usize::MAX)?;
        require_text("description", &new.description, DESCRIPTION_MAX)?;
        new.age.validate()?;
        new.behavior.validate()?;
        validate_fee(new.adoption_fee)?;

        let images = trimmed_list(new.images);
        if images.is_empty() {
            return Err(DomainError::validation("at least one image is required"));
        }

        Ok(Self {
            id: PetId::generate(),
            name: new.name.trim().to_owned(),
            pet_type: new.pet_type,
            breed: new.breed.trim().to_owned(),
            age: new.age,
            gender: new.gender,
            size: new.size,
            color: new.color.trim().to_owned(),
            description: new.description,
            images,
            owner,
            status: PetStatus::Available,
            health: new.health,
            behavior: new.behavior,
            characteristics: trimmed_list(new.characteristics),
            requirements: trimmed_list(new.requirements),
            location: new.location,
            adoption_fee: new.adoption_fee,
            is_featured: false,
            views: 0,
            favorites: Vec::new(),
            applications: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn can_be_managed_by(&self, actor: &Actor) -> bool {
        actor.owns_or_admin(self.owner)
    }

    /// Applies an owner edit. Validates every provided field before mutating
    /// anything, so a rejected update leaves the pet untouched.
    pub fn apply_update(&mut self, update: PetUpdate, now: DateTime<Utc>) -> Result<()> {
        if let Some(name) = &update.name {
            require_text("name", name, NAME_MAX)?;
        }
        if let Some(breed) = &update.breed {
            require_text("breed", breed, usize::MAX)?;
        }
        if let Some(color) = &update.color {
            require_text("color", color, usize::MAX)?;
        }
        if let Some(description) = &update.description {
            require_text("description", description, DESCRIPTION_MAX)?;
        }
        if let Some(age) = &update.age {
            age.validate()?;
        }
        if let Some(behavior) = &update.behavior {
            behavior.validate()?;
        }
        if let Some(fee) = update.adoption_fee {
            validate_fee(fee)?;
        }
        if let Some(status) = update.status {
            if status != self.status && !self.status.can_be_set_manually(status) {
                return Err(DomainError::validation(format!(
                    "pet status cannot change from {} to {}",
                    self.status, status
                )));
            }
        }

        if let Some(name) = update.name {
            self.name = name.trim().to_owned();
        }
        if let Some(pet_type) = update.pet_type {
            self.pet_type = pet_type;
        }
        if let Some(breed) = update.breed {
            self.breed = breed.trim().to_owned();
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(size) = update.size {
            self.size = size;
        }
        if let Some(color) = update.color {
            self.color = color.trim().to_owned();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        self.images.extend(trimmed_list(update.add_images));
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(health) = update.health {
            self.health = health;
        }
        if let Some(behavior) = update.behavior {
            self.behavior = behavior;
        }
        if let Some(characteristics) = update.characteristics {
            self.characteristics = trimmed_list(characteristics);
        }
        if let Some(requirements) = update.requirements {
            self.requirements = trimmed_list(requirements);
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(fee) = update.adoption_fee {
            self.adoption_fee = fee;
        }
        if let Some(featured) = update.is_featured {
            self.is_featured = featured;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Validates and appends a pending application from `applicant`.
    pub fn submit_application(
        &mut self,
        applicant: UserId,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<&Application> {
        require_text("message", message, APPLICATION_MESSAGE_MAX)?;
        if self.status != PetStatus::Available {
            return Err(DomainError::unavailable(
                "this pet is not available for adoption",
            ));
        }
        // Any earlier application blocks a new one, withdrawn included.
        if self.has_application_from(applicant) {
            return Err(DomainError::DuplicateApplication);
        }

        self.applications.push(Application {
            id: ApplicationId::generate(),
            user: applicant,
            message: message.trim().to_owned(),
            status: ApplicationStatus::Pending,
            submitted_at: now,
            reviewed_at: None,
            reviewed_by: None,
        });
        self.updated_at = now;
        Ok(&self.applications[self.applications.len() - 1])
    }

    pub fn has_application_from(&self, user: UserId) -> bool {
        self.applications.iter().any(|app| app.user == user)
    }

    pub fn application(&self, id: ApplicationId) -> Option<&Application> {
        self.applications.iter().find(|app| app.id == id)
    }

    /// Owner review of a pending application. Approval moves the pet to
    /// `pending` as part of the same mutation.
    pub fn review_application(
        &mut self,
        application_id: ApplicationId,
        reviewer: &Actor,
        decision: ReviewDecision,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome> {
        if reviewer.id != self.owner {
            return Err(DomainError::forbidden(
                "only the owner can review applications for this pet",
            ));
        }
        let index = self
            .applications
            .iter()
            .position(|app| app.id == application_id)
            .ok_or_else(|| DomainError::not_found("Application", application_id))?;

        if decision == ReviewDecision::Approved && self.status == PetStatus::Adopted {
            return Err(DomainError::unavailable("this pet has already been adopted"));
        }

        self.applications[index].close(decision.into(), reviewer.id, now)?;
        if decision == ReviewDecision::Approved {
            self.status = PetStatus::Pending;
        }
        self.updated_at = now;

        Ok(ReviewOutcome {
            application: self.applications[index].clone(),
            pet: self.clone(),
        })
    }

    /// The applicant withdraws their own pending application.
    pub fn withdraw_application(
        &mut self,
        application_id: ApplicationId,
        applicant: UserId,
        now: DateTime<Utc>,
    ) -> Result<&Application> {
        let index = self
            .applications
            .iter()
            .position(|app| app.id == application_id)
            .ok_or_else(|| DomainError::not_found("Application", application_id))?;
        if self.applications[index].user != applicant {
            return Err(DomainError::forbidden(
                "only the applicant can withdraw this application",
            ));
        }
        self.applications[index].close(ApplicationStatus::Withdrawn, applicant, now)?;
        self.updated_at = now;
        Ok(&self.applications[index])
    }

    /// Adds `user` to favorites if absent, removes it if present.
    /// Returns whether the user is a favorite afterwards.
    pub fn toggle_favorite(&mut self, user: UserId) -> bool {
        if let Some(index) = self.favorites.iter().position(|fav| *fav == user) {
            self.favorites.remove(index);
            false
        } else {
            self.favorites.push(user);
            true
        }
    }

    pub fn is_favorite_of(&self, user: UserId) -> bool {
        self.favorites.contains(&user)
    }

    pub fn record_view(&mut self) {
        self.views = self.views.saturating_add(1);
    }

    pub fn age_in_years(&self) -> f64 {
        self.age.in_years()
    }

    pub fn age_display(&self) -> String {
        self.age.display()
    }

    pub fn application_count(&self) -> usize {
        self.applications.len()
    }

    pub fn favorite_count(&self) -> usize {
        self.favorites.len()
    }

    pub fn summary(&self) -> PetSummary {
        PetSummary {
            id: self.id,
            name: self.name.clone(),
            images: self.images.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_pet() -> NewPet {
        NewPet {
            name: "Luna".into(),
            pet_type: PetType::Dog,
            breed: "Labrador".into(),
            age: Age::years(2.0),
            gender: Gender::Female,
            size: Size::Large,
            color: "Golden".into(),
            description: "Gentle and playful".into(),
            images: vec!["/uploads/images-1.jpg".into()],
            health: Health::default(),
            behavior: Behavior::default(),
            characteristics: vec![" loyal ".into(), "".into()],
            requirements: Vec::new(),
            location: PetLocation::default(),
            adoption_fee: 0.0,
        }
    }

    fn owner() -> Actor {
        Actor::new(UserId::generate(), Role::User)
    }

    #[test]
    fn create_requires_at_least_one_image() {
        let mut input = new_pet();
        input.images = vec!["  ".into()];
        let err = Pet::create(UserId::generate(), input, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_negative_age_and_fee() {
        let mut input = new_pet();
        input.age = Age::years(-1.0);
        assert!(Pet::create(UserId::generate(), input, Utc::now()).is_err());

        let mut input = new_pet();
        input.adoption_fee = -5.0;
        assert!(Pet::create(UserId::generate(), input, Utc::now()).is_err());
    }

    #[test]
    fn create_defaults_to_available_and_trims_lists() {
        let pet = Pet::create(UserId::generate(), new_pet(), Utc::now()).unwrap();
        assert_eq!(pet.status, PetStatus::Available);
        assert_eq!(pet.characteristics, vec!["loyal".to_owned()]);
        assert!(pet.health.is_healthy);
    }

    #[test]
    fn second_application_from_same_user_is_rejected() {
        let mut pet = Pet::create(UserId::generate(), new_pet(), Utc::now()).unwrap();
        let applicant = UserId::generate();
        pet.submit_application(applicant, "I love dogs", Utc::now()).unwrap();
        let err = pet
            .submit_application(applicant, "Please!", Utc::now())
            .unwrap_err();
        assert_eq!(err, DomainError::DuplicateApplication);
        assert_eq!(pet.application_count(), 1);
    }

    #[test]
    fn withdrawn_application_still_blocks_reapplying() {
        let mut pet = Pet::create(UserId::generate(), new_pet(), Utc::now()).unwrap();
        let applicant = UserId::generate();
        let app_id = pet.submit_application(applicant, "Hi", Utc::now()).unwrap().id;
        pet.withdraw_application(app_id, applicant, Utc::now()).unwrap();
        assert_eq!(
            pet.submit_application(applicant, "Again", Utc::now()),
            Err(DomainError::DuplicateApplication)
        );
    }

    #[test]
    fn applications_need_an_available_pet_and_a_message() {
        let mut pet = Pet::create(UserId::generate(), new_pet(), Utc::now()).unwrap();
        assert!(matches!(
            pet.submit_application(UserId::generate(), "   ", Utc::now()),
            Err(DomainError::Validation(_))
        ));

        pet.status = PetStatus::NotAvailable;
        assert!(matches!(
            pet.submit_application(UserId::generate(), "Hello", Utc::now()),
            Err(DomainError::Unavailable(_))
        ));
        assert!(pet.applications.is_empty());
    }

    #[test]
    fn approval_moves_pet_to_pending_and_stamps_review() {
        let owner = owner();
        let mut pet = Pet::create(owner.id, new_pet(), Utc::now()).unwrap();
        let applicant = UserId::generate();
        let app_id = pet.submit_application(applicant, "I love dogs", Utc::now()).unwrap().id;

        let outcome = pet
            .review_application(app_id, &owner, ReviewDecision::Approved, Utc::now())
            .unwrap();

        assert_eq!(outcome.pet.status, PetStatus::Pending);
        assert_eq!(outcome.application.status, ApplicationStatus::Approved);
        assert_eq!(outcome.application.reviewed_by, Some(owner.id));
        assert!(outcome.application.reviewed_at.is_some());
        assert_eq!(pet.status, PetStatus::Pending);
    }

    #[test]
    fn rejection_leaves_pet_available() {
        let owner = owner();
        let mut pet = Pet::create(owner.id, new_pet(), Utc::now()).unwrap();
        let app_id = pet.submit_application(UserId::generate(), "Hi", Utc::now()).unwrap().id;
        pet.review_application(app_id, &owner, ReviewDecision::Rejected, Utc::now())
            .unwrap();
        assert_eq!(pet.status, PetStatus::Available);
    }

    #[test]
    fn reviewed_at_is_stamped_only_once() {
        let owner = owner();
        let mut pet = Pet::create(owner.id, new_pet(), Utc::now()).unwrap();
        let app_id = pet.submit_application(UserId::generate(), "Hi", Utc::now()).unwrap().id;
        pet.review_application(app_id, &owner, ReviewDecision::Rejected, Utc::now())
            .unwrap();
        let first = pet.application(app_id).unwrap().reviewed_at;

        let err = pet
            .review_application(app_id, &owner, ReviewDecision::Approved, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(pet.application(app_id).unwrap().reviewed_at, first);
        assert_eq!(pet.status, PetStatus::Available);
    }

    #[test]
    fn only_the_owner_reviews() {
        let mut pet = Pet::create(UserId::generate(), new_pet(), Utc::now()).unwrap();
        let app_id = pet.submit_application(UserId::generate(), "Hi", Utc::now()).unwrap().id;
        let admin = Actor::new(UserId::generate(), Role::Admin);
        assert!(matches!(
            pet.review_application(app_id, &admin, ReviewDecision::Approved, Utc::now()),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn owners_can_only_approve_or_reject() {
        assert_eq!(
            serde_json::from_str::<ReviewDecision>("\"rejected\"").unwrap(),
            ReviewDecision::Rejected
        );
        assert!(serde_json::from_str::<ReviewDecision>("\"withdrawn\"").is_err());
        assert_eq!(
            ApplicationStatus::from(ReviewDecision::Approved),
            ApplicationStatus::Approved
        );
    }

    #[test]
    fn unknown_application_is_not_found() {
        let owner = owner();
        let mut pet = Pet::create(owner.id, new_pet(), Utc::now()).unwrap();
        assert!(matches!(
            pet.review_application(
                ApplicationId::generate(),
                &owner,
                ReviewDecision::Rejected,
                Utc::now()
            ),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn toggling_favorite_twice_restores_membership() {
        let mut pet = Pet::create(UserId::generate(), new_pet(), Utc::now()).unwrap();
        let other = UserId::generate();
        pet.toggle_favorite(other);
        let before = pet.favorites.clone();

        let user = UserId::generate();
        assert!(pet.toggle_favorite(user));
        assert!(!pet.toggle_favorite(user));
        assert_eq!(pet.favorites, before);
    }

    #[test]
    fn manual_status_changes_follow_the_state_machine() {
        let mut pet = Pet::create(UserId::generate(), new_pet(), Utc::now()).unwrap();
        let to = |status| PetUpdate {
            status: Some(status),
            ..PetUpdate::default()
        };

        assert!(pet.apply_update(to(PetStatus::Pending), Utc::now()).is_err());
        assert!(pet.apply_update(to(PetStatus::Adopted), Utc::now()).is_err());
        pet.apply_update(to(PetStatus::NotAvailable), Utc::now()).unwrap();
        pet.apply_update(to(PetStatus::Available), Utc::now()).unwrap();

        pet.status = PetStatus::Pending;
        pet.apply_update(to(PetStatus::Adopted), Utc::now()).unwrap();
        assert!(pet.apply_update(to(PetStatus::Available), Utc::now()).is_err());
        assert_eq!(pet.status, PetStatus::Adopted);
    }

    #[test]
    fn rejected_update_changes_nothing() {
        let mut pet = Pet::create(UserId::generate(), new_pet(), Utc::now()).unwrap();
        let before = pet.clone();
        let update = PetUpdate {
            name: Some("Nova".into()),
            description: Some("x".repeat(DESCRIPTION_MAX + 1)),
            ..PetUpdate::default()
        };
        assert!(pet.apply_update(update, Utc::now()).is_err());
        assert_eq!(pet, before);
    }

    #[test]
    fn update_appends_new_images() {
        let mut pet = Pet::create(UserId::generate(), new_pet(), Utc::now()).unwrap();
        pet.apply_update(
            PetUpdate {
                add_images: vec!["/uploads/images-2.jpg".into()],
                ..PetUpdate::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(pet.images.len(), 2);
    }

    #[test]
    fn age_helpers() {
        assert_eq!(Age::months(18.0).in_years(), 1.5);
        assert_eq!(Age::months(5.0).in_years(), 0.4);
        assert_eq!(Age::years(3.0).in_years(), 3.0);
        assert_eq!(Age::years(1.0).display(), "1 year");
        assert_eq!(Age::years(3.0).display(), "3 years");
        assert_eq!(Age::months(1.0).display(), "1 month");
        assert_eq!(Age::months(5.0).display(), "5 months");
    }

    #[test]
    fn pet_documents_use_camel_case_and_type_key() {
        let pet = Pet::create(UserId::generate(), new_pet(), Utc::now()).unwrap();
        let doc = serde_json::to_value(&pet).unwrap();
        assert_eq!(doc["type"], "dog");
        assert_eq!(doc["status"], "available");
        assert_eq!(doc["size"], "large");
        assert!(doc.get("adoptionFee").is_some());
    }
}
