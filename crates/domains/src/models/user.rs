//! # User
//!
//! Registered members of PetConnect. Users own pets and posts by reference;
//! they are never hard-deleted, only deactivated through `is_active`.

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Location, PetType, UserId};
use crate::errors::{check_max_len, require_text, DomainError, Result};

pub const NAME_MAX: usize = 50;
pub const BIO_MAX: usize = 500;
pub const PASSWORD_MIN: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Veterinarian,
}

impl Role {
    pub const ALL: [Self; 3] = [Self::User, Self::Admin, Self::Veterinarian];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Veterinarian => "veterinarian",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown role '{s}'")))
    }
}

/// An Argon2 PHC string. Never rendered by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Treated as a set: duplicates are dropped on write.
    #[serde(default)]
    pub pet_types: Vec<PetType>,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Preferences {
    fn normalized(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.pet_types.len());
        self.pet_types.retain(|t| {
            if seen.contains(t) {
                false
            } else {
                seen.push(*t);
                true
            }
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Lowercased and trimmed; unique across all users.
    pub email: String,
    pub password: PasswordHash,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub is_verified: bool,
    pub is_active: bool,
    pub last_login: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for [`User::register`]. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: PasswordHash,
    pub role: Role,
    pub phone: Option<String>,
    pub location: Location,
    pub bio: Option<String>,
    pub preferences: Preferences,
    pub is_verified: bool,
}

/// Self-service profile changes. Only the named fields can change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<Location>,
    pub preferences: Option<Preferences>,
}

/// Administrative changes to another user's account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminUserUpdate {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<Location>,
}

/// The subset of a user shown wherever another entity references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub avatar: String,
    pub phone: Option<String>,
    pub location: Location,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            phone: user.phone.clone(),
            location: user.location.clone(),
        }
    }
}

/// Lowercases, trims and validates an email address.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(DomainError::validation("email is required"));
    }
    if !EMAIL_RE.is_match(&email) {
        return Err(DomainError::validation("please provide a valid email"));
    }
    Ok(email)
}

/// Checks a plaintext password before it is hashed.
pub fn validate_password(plain: &str) -> Result<()> {
    if plain.chars().count() < PASSWORD_MIN {
        return Err(DomainError::validation(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    require_text("name", name, NAME_MAX)?;
    Ok(name.to_owned())
}

fn validate_bio(bio: Option<String>) -> Result<Option<String>> {
    if let Some(bio) = &bio {
        check_max_len("bio", bio, BIO_MAX)?;
    }
    Ok(bio)
}

impl User {
    pub fn register(new: NewUser, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id: UserId::generate(),
            name: validate_name(&new.name)?,
            email: normalize_email(&new.email)?,
            password: new.password,
            avatar: String::new(),
            role: new.role,
            phone: new.phone.map(|p| p.trim().to_owned()),
            location: new.location,
            bio: validate_bio(new.bio)?,
            preferences: new.preferences.normalized(),
            is_verified: new.is_verified,
            is_active: true,
            last_login: now,
            created_at: now,
            updated_at: now,
        })
    }

    /// Name, or the local part of the email when the name is blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.email.split('@').next().unwrap_or_default()
        } else {
            &self.name
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary::from(self)
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login = now;
    }

    /// Replaces the stored hash. Callers hash the new password first.
    pub fn change_password(&mut self, hash: PasswordHash, now: DateTime<Utc>) {
        self.password = hash;
        self.updated_at = now;
    }

    pub fn set_avatar(&mut self, path: impl Into<String>, now: DateTime<Utc>) {
        self.avatar = path.into();
        self.updated_at = now;
    }

    pub fn apply_profile_update(&mut self, update: ProfileUpdate, now: DateTime<Utc>) -> Result<()> {
        let name = update.name.as_deref().map(validate_name).transpose()?;
        let bio = validate_bio(update.bio)?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone.trim().to_owned());
        }
        if bio.is_some() {
            self.bio = bio;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences.normalized();
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn apply_admin_update(&mut self, update: AdminUserUpdate, now: DateTime<Utc>) -> Result<()> {
        let name = update.name.as_deref().map(validate_name).transpose()?;
        let bio = validate_bio(update.bio)?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        if let Some(verified) = update.is_verified {
            self.is_verified = verified;
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone.trim().to_owned());
        }
        if bio.is_some() {
            self.bio = bio;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Soft-disables the account.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "  Maria  ".into(),
            email: email.into(),
            password: PasswordHash::new("$argon2id$stub"),
            role: Role::User,
            phone: None,
            location: Location::default(),
            bio: None,
            preferences: Preferences {
                pet_types: vec![PetType::Dog, PetType::Cat, PetType::Dog],
                ..Preferences::default()
            },
            is_verified: false,
        }
    }

    #[test]
    fn register_normalizes_email_name_and_preferences() {
        let user = User::register(new_user("  Maria@Example.COM "), Utc::now()).unwrap();
        assert_eq!(user.email, "maria@example.com");
        assert_eq!(user.name, "Maria");
        assert_eq!(user.preferences.pet_types, vec![PetType::Dog, PetType::Cat]);
        assert!(user.is_active);
    }

    #[test]
    fn register_rejects_malformed_email() {
        let err = User::register(new_user("not-an-email"), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn name_longer_than_fifty_chars_is_rejected() {
        let mut input = new_user("a@b.com");
        input.name = "x".repeat(NAME_MAX + 1);
        assert!(User::register(input, Utc::now()).is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        let mut user = User::register(new_user("luna.fan@example.com"), Utc::now()).unwrap();
        user.name.clear();
        assert_eq!(user.display_name(), "luna.fan");
    }

    #[test]
    fn password_hash_is_redacted_in_debug_output() {
        let user = User::register(new_user("a@b.com"), Utc::now()).unwrap();
        assert!(!format!("{user:?}").contains("argon2"));
    }

    #[test]
    fn profile_update_leaves_unnamed_fields_alone() {
        let mut user = User::register(new_user("a@b.com"), Utc::now()).unwrap();
        user.apply_profile_update(
            ProfileUpdate {
                bio: Some("Rescue volunteer".into()),
                ..ProfileUpdate::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(user.name, "Maria");
        assert_eq!(user.bio.as_deref(), Some("Rescue volunteer"));
    }
}
