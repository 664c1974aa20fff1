use serde::Deserialize;

use domains::{
    AdminUserUpdate, Age, Behavior, Gender, Health, Location, NewPet, NewPost, PetId,
    PetLocation, PetStatus, PetType, PetUpdate, PostType, PostUpdate, Preferences, ProfileUpdate,
    ReviewDecision, Role, Size,
};
use services::Registration;

use super::lenient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Location,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            phone: req.phone,
            location: req.location,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

impl From<ProfileRequest> for ProfileUpdate {
    fn from(req: ProfileRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            bio: req.bio,
            location: req.location,
            preferences: req.preferences,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl From<AdminUserRequest> for AdminUserUpdate {
    fn from(req: AdminUserRequest) -> Self {
        Self {
            name: req.name,
            role: req.role,
            is_active: req.is_active,
            is_verified: req.is_verified,
            phone: req.phone,
            bio: req.bio,
            location: req.location,
        }
    }
}

/// Pet creation. Image paths in the body are kept ahead of uploaded files.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePetRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: PetType,
    pub breed: String,
    pub age: Age,
    pub gender: Gender,
    pub size: Size,
    pub color: String,
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub health: Health,
    #[serde(default)]
    pub behavior: Behavior,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub characteristics: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub requirements: Option<Vec<String>>,
    #[serde(default)]
    pub location: PetLocation,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub adoption_fee: Option<f64>,
}

impl CreatePetRequest {
    pub fn into_new_pet(self, uploaded: Vec<String>) -> NewPet {
        let mut images = self.images.unwrap_or_default();
        images.extend(uploaded);
        NewPet {
            name: self.name,
            pet_type: self.pet_type,
            breed: self.breed,
            age: self.age,
            gender: self.gender,
            size: self.size,
            color: self.color,
            description: self.description,
            images,
            health: self.health,
            behavior: self.behavior,
            characteristics: self.characteristics.unwrap_or_default(),
            requirements: self.requirements.unwrap_or_default(),
            location: self.location,
            adoption_fee: self.adoption_fee.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePetRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub pet_type: Option<PetType>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<Age>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Paths appended to the existing images.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<PetStatus>,
    #[serde(default)]
    pub health: Option<Health>,
    #[serde(default)]
    pub behavior: Option<Behavior>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub characteristics: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub requirements: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<PetLocation>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub adoption_fee: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub is_featured: Option<bool>,
}

impl UpdatePetRequest {
    pub fn into_update(self, uploaded: Vec<String>) -> PetUpdate {
        let mut add_images = self.images.unwrap_or_default();
        add_images.extend(uploaded);
        PetUpdate {
            name: self.name,
            pet_type: self.pet_type,
            breed: self.breed,
            age: self.age,
            gender: self.gender,
            size: self.size,
            color: self.color,
            description: self.description,
            add_images,
            status: self.status,
            health: self.health,
            behavior: self.behavior,
            characteristics: self.characteristics,
            requirements: self.requirements,
            location: self.location,
            adoption_fee: self.adoption_fee,
            is_featured: self.is_featured,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub message: String,
}

/// Owner decision on an application: `approved` or `rejected`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub status: ReviewDecision,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePostRequest {
    pub content: String,
    #[serde(default, rename = "type")]
    pub post_type: PostType,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub pet: Option<PetId>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub location: Location,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub is_public: Option<bool>,
}

impl CreatePostRequest {
    pub fn into_new_post(self, uploaded: Vec<String>) -> NewPost {
        let mut images = self.images.unwrap_or_default();
        images.extend(uploaded);
        NewPost {
            content: self.content,
            images,
            pet: self.pet,
            post_type: self.post_type,
            tags: self.tags.unwrap_or_default(),
            location: self.location,
            is_public: self.is_public,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "type")]
    pub post_type: Option<PostType>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "lenient::optional")]
    pub is_public: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub images: Option<Vec<String>>,
}

impl UpdatePostRequest {
    pub fn into_update(self, uploaded: Vec<String>) -> PostUpdate {
        let mut add_images = self.images.unwrap_or_default();
        add_images.extend(uploaded);
        PostUpdate {
            content: self.content,
            post_type: self.post_type,
            tags: self.tags,
            location: self.location,
            is_public: self.is_public,
            add_images,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
}
