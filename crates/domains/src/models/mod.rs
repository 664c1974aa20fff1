//! Entities, value types and the lifecycle rules that govern them.

mod actor;
mod filters;
mod ids;
pub mod location;
mod pagination;
pub mod pet;
pub mod post;
pub mod user;

pub use actor::Actor;
pub use filters::{AgeRange, PetFilter, PostFilter, PostSort, UserFilter};
pub use ids::{ApplicationId, CommentId, PetId, PostId, ReplyId, UserId};
pub use location::{Coordinates, Location, PetLocation};
pub use pagination::{Page, PageRequest, MAX_LIMIT};
pub use pet::{
    Age, AgeUnit, Application, ApplicationStatus, Behavior, Gender, GoodWith, Health,
    MedicalRecord, NewPet, Pet, PetStatus, PetSummary, PetType, PetUpdate, ReviewDecision,
    ReviewOutcome, Size, Temperament, Vaccine, VaccineStatus,
};
pub use post::{
    normalize_tags, time_ago, Comment, EditRecord, Like, LikeToggle, NewPost, Post, PostStatus,
    PostType, PostUpdate, Reply, Share,
};
pub use user::{
    normalize_email, validate_password, AdminUserUpdate, NewUser, NotificationSettings,
    PasswordHash, Preferences, ProfileUpdate, Role, User, UserSummary,
};
