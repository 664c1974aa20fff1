//! Shared fixtures for the integration suites.
//!
//! [`World`] wires every service over the in-memory store with a manual
//! clock; [`http::TestApp`] puts the axum router on top of it.

#[cfg(feature = "web-axum")]
pub mod http;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use auth_adapters::{Argon2PasswordHasher, JwtTokenService};
use domains::{
    Actor, Age, Behavior, Clock, Gender, Health, Location, NewPet, NewPost, PetLocation, PetType,
    PostType, Role, Size, User,
};
use services::{Registration, Services};
use storage_adapters::Repositories;

pub const PASSWORD: &str = "secret123";
pub const JWT_SECRET: &[u8] = b"integration-test-secret";

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Every service over one in-memory store.
pub struct World {
    pub services: Services,
    pub repos: Repositories,
    pub clock: Arc<ManualClock>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        let repos = Repositories::memory();
        let clock = Arc::new(ManualClock::default());
        let services = Services::new(
            Arc::clone(&repos.users),
            Arc::clone(&repos.pets),
            Arc::clone(&repos.posts),
            Arc::new(Argon2PasswordHasher::with_params(8, 1, 1).expect("argon2 params")),
            Arc::new(JwtTokenService::with_ttl_hours(JWT_SECRET, 24)),
            clock.clone(),
        );
        Self {
            services,
            repos,
            clock,
        }
    }

    /// Registers `name` as `<name>@example.com`.
    pub async fn user(&self, name: &str) -> User {
        self.account(name, Role::User).await
    }

    pub async fn admin(&self, name: &str) -> User {
        self.account(name, Role::Admin).await
    }

    async fn account(&self, name: &str, role: Role) -> User {
        self.services
            .auth
            .create_account(registration(name), role, false)
            .await
            .expect("account created")
            .user
    }

    /// Moves time forward so consecutive records get distinct timestamps.
    pub fn tick(&self) {
        self.clock.advance(Duration::seconds(1));
    }
}

pub fn actor(user: &User) -> Actor {
    Actor::new(user.id, user.role)
}

pub fn email(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase())
}

pub fn registration(name: &str) -> Registration {
    Registration {
        name: name.into(),
        email: email(name),
        password: PASSWORD.into(),
        phone: None,
        location: Location::default(),
    }
}

pub fn new_pet(name: &str, pet_type: PetType) -> NewPet {
    NewPet {
        name: name.into(),
        pet_type,
        breed: "Mixed".into(),
        age: Age::years(2.0),
        gender: Gender::Female,
        size: Size::Medium,
        color: "Brown".into(),
        description: format!("{name} is looking for a home"),
        images: vec![format!("/uploads/images-{}.jpg", name.to_lowercase())],
        health: Health::default(),
        behavior: Behavior::default(),
        characteristics: Vec::new(),
        requirements: Vec::new(),
        location: PetLocation::default(),
        adoption_fee: 0.0,
    }
}

pub fn new_post(content: &str) -> NewPost {
    NewPost {
        content: content.into(),
        images: Vec::new(),
        pet: None,
        post_type: PostType::General,
        tags: Vec::new(),
        location: Location::default(),
        is_public: None,
    }
}
