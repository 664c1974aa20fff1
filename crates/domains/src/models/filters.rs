//! Listing predicates.
//!
//! Filters are plain data so every storage backend can translate them into
//! its own query language. `matches` is the reference semantics; the
//! in-memory store uses it directly and the SQL store must agree with it.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::location::contains_ignore_case;
use super::{Gender, Pet, PetId, PetStatus, PetType, Post, PostType, Role, Size, User, UserId};
use crate::errors::DomainError;

/// Inclusive bounds on `age.value`, parsed from `"min-max"` or `"max"`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgeRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AgeRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

impl FromStr for AgeRange {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| DomainError::validation(format!("invalid age range '{s}'")))
        };
        match s.split_once('-') {
            Some((min, max)) => Ok(Self {
                min: Some(parse(min)?),
                max: Some(parse(max)?),
            }),
            None => Ok(Self {
                min: None,
                max: Some(parse(s)?),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PetFilter {
    pub status: Option<PetStatus>,
    /// Substring of name or breed.
    pub text: Option<String>,
    pub pet_type: Option<PetType>,
    pub pet_types: Option<Vec<PetType>>,
    pub breed: Option<String>,
    pub age: Option<AgeRange>,
    pub gender: Option<Gender>,
    pub size: Option<Size>,
    pub city: Option<String>,
    pub min_fee: Option<f64>,
    pub max_fee: Option<f64>,
    pub is_vaccinated: Option<bool>,
    pub is_spayed: Option<bool>,
    pub owner: Option<UserId>,
    pub favorited_by: Option<UserId>,
    pub applicant: Option<UserId>,
    pub featured: Option<bool>,
    pub created_after: Option<DateTime<Utc>>,
}

impl PetFilter {
    pub fn available() -> Self {
        Self {
            status: Some(PetStatus::Available),
            ..Self::default()
        }
    }

    pub fn matches(&self, pet: &Pet) -> bool {
        self.status.is_none_or(|s| pet.status == s)
            && self.text.as_deref().is_none_or(|q| {
                contains_ignore_case(&pet.name, q) || contains_ignore_case(&pet.breed, q)
            })
            && self.pet_type.is_none_or(|t| pet.pet_type == t)
            && self
                .pet_types
                .as_ref()
                .is_none_or(|types| types.contains(&pet.pet_type))
            && self
                .breed
                .as_deref()
                .is_none_or(|b| contains_ignore_case(&pet.breed, b))
            && self.age.is_none_or(|range| range.contains(pet.age.value))
            && self.gender.is_none_or(|g| pet.gender == g)
            && self.size.is_none_or(|s| pet.size == s)
            && self
                .city
                .as_deref()
                .is_none_or(|c| pet.location.city_contains(c))
            && self.min_fee.is_none_or(|min| pet.adoption_fee >= min)
            && self.max_fee.is_none_or(|max| pet.adoption_fee <= max)
            && self
                .is_vaccinated
                .is_none_or(|v| pet.health.is_vaccinated == v)
            && self.is_spayed.is_none_or(|v| pet.health.is_spayed == v)
            && self.owner.is_none_or(|o| pet.owner == o)
            && self.favorited_by.is_none_or(|u| pet.is_favorite_of(u))
            && self.applicant.is_none_or(|u| pet.has_application_from(u))
            && self.featured.is_none_or(|f| pet.is_featured == f)
            && self.created_after.is_none_or(|t| pet.created_at >= t)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    /// Restrict to `is_public && status == active`.
    pub visible_only: bool,
    pub author: Option<UserId>,
    /// Substring of content.
    pub text: Option<String>,
    pub post_type: Option<PostType>,
    /// Any-of match on tags.
    pub tags_any: Option<Vec<String>>,
    pub pet_ids: Option<Vec<PetId>>,
    pub created_after: Option<DateTime<Utc>>,
}

impl PostFilter {
    pub fn visible() -> Self {
        Self {
            visible_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        (!self.visible_only || post.is_visible())
            && self.author.is_none_or(|a| post.author == a)
            && self
                .text
                .as_deref()
                .is_none_or(|q| contains_ignore_case(&post.content, q))
            && self.post_type.is_none_or(|t| post.post_type == t)
            && self
                .tags_any
                .as_ref()
                .is_none_or(|tags| post.tags.iter().any(|t| tags.contains(t)))
            && self
                .pet_ids
                .as_ref()
                .is_none_or(|ids| post.pet.is_some_and(|p| ids.contains(&p)))
            && self.created_after.is_none_or(|t| post.created_at >= t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    /// `created_at` descending.
    #[default]
    Newest,
    /// Engagement descending, then `created_at` descending.
    Trending,
}

impl PostSort {
    pub fn compare(self, a: &Post, b: &Post) -> std::cmp::Ordering {
        match self {
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::Trending => b
                .engagement()
                .cmp(&a.engagement())
                .then_with(|| b.created_at.cmp(&a.created_at)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    /// Substring of name or email.
    pub text: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
    pub created_after: Option<DateTime<Utc>>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.text.as_deref().is_none_or(|q| {
            contains_ignore_case(&user.name, q) || contains_ignore_case(&user.email, q)
        }) && self.role.is_none_or(|r| user.role == r)
            && self.is_active.is_none_or(|a| user.is_active == a)
            && self.is_verified.is_none_or(|v| user.is_verified == v)
            && self.created_after.is_none_or(|t| user.created_at >= t)
    }
}
