//! # AuthService
//!
//! Registration, login, bearer-token resolution and self-service account
//! changes.

use std::sync::Arc;

use domains::{
    normalize_email, validate_password, Actor, Clock, DomainError, IssuedToken, Location, NewUser,
    PasswordHasher, Preferences, ProfileUpdate, Result, Role, TokenService, User, UserRepository,
};

/// A user together with a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: IssuedToken,
}

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub location: Location,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }

    pub async fn register(&self, input: Registration) -> Result<AuthSession> {
        self.create_account(input, Role::User, false).await
    }

    /// Registration with an explicit role, used by seeding and admin tooling.
    pub async fn create_account(
        &self,
        input: Registration,
        role: Role,
        is_verified: bool,
    ) -> Result<AuthSession> {
        validate_password(&input.password)?;
        let email = normalize_email(&input.email)?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("user already exists with this email"));
        }

        let user = User::register(
            NewUser {
                name: input.name,
                email,
                password: self.hasher.hash(&input.password)?,
                role,
                phone: input.phone,
                location: input.location,
                bio: None,
                preferences: Preferences::default(),
                is_verified,
            },
            self.clock.now(),
        )?;
        self.users.insert(&user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "user registered");

        let token = self.tokens.issue(&user)?;
        Ok(AuthSession { user, token })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let invalid = || DomainError::unauthorized("invalid credentials");

        let email = normalize_email(email).map_err(|_| invalid())?;
        let mut user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;
        if !self.hasher.verify(password, &user.password)? {
            tracing::warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(invalid());
        }
        if !user.is_active {
            return Err(DomainError::unauthorized("account is deactivated"));
        }

        user.record_login(self.clock.now());
        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, "user logged in");

        let token = self.tokens.issue(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Resolves a bearer token to the current, active user. The role is
    /// taken from the stored user, not from the token.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.tokens.verify(token)?;
        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| DomainError::unauthorized("user no longer exists"))?;
        if !user.is_active {
            return Err(DomainError::unauthorized("account is deactivated"));
        }
        Ok(user)
    }

    pub async fn me(&self, actor: &Actor) -> Result<User> {
        self.users
            .find_by_id(actor.id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", actor.id))
    }

    pub async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> Result<User> {
        let mut user = self.me(actor).await?;
        user.apply_profile_update(update, self.clock.now())?;
        self.users.update(&user).await?;
        Ok(user)
    }

    pub async fn change_password(&self, actor: &Actor, current: &str, new: &str) -> Result<()> {
        let mut user = self.me(actor).await?;
        if !self.hasher.verify(current, &user.password)? {
            return Err(DomainError::validation("current password is incorrect"));
        }
        validate_password(new)?;
        user.change_password(self.hasher.hash(new)?, self.clock.now());
        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, "password changed");
        Ok(())
    }

    pub async fn set_avatar(&self, actor: &Actor, path: String) -> Result<User> {
        let mut user = self.me(actor).await?;
        user.set_avatar(path, self.clock.now());
        self.users.update(&user).await?;
        Ok(user)
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
