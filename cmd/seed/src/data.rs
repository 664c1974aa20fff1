//! Demo content.

use domains::{
    Age, AgeUnit, Behavior, Gender, Health, Location, NewPet, NewPost, PetId, PetLocation,
    PetType, PostType, Role, Size, Temperament,
};

pub struct DemoAccount {
    pub name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub phone: Option<&'static str>,
    pub role: Role,
    pub city: &'static str,
    pub pets: &'static [DemoPet],
    pub posts: &'static [DemoPost],
}

pub struct DemoPet {
    pub name: &'static str,
    pub pet_type: PetType,
    pub breed: &'static str,
    pub age: (f64, AgeUnit),
    pub gender: Gender,
    pub size: Size,
    pub color: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub vaccinated: bool,
    pub spayed: bool,
    pub temperament: Temperament,
    pub characteristics: &'static [&'static str],
    pub adoption_fee: f64,
    pub featured: bool,
}

pub struct DemoPost {
    pub content: &'static str,
    pub post_type: PostType,
    pub tags: &'static [&'static str],
    /// Attach the account's first pet.
    pub about_pet: bool,
}

const COUNTRY: &str = "USA";

pub fn location(city: &str) -> Location {
    Location {
        city: Some(city.to_owned()),
        state: None,
        country: Some(COUNTRY.to_owned()),
    }
}

impl DemoPet {
    pub fn to_new_pet(&self, city: &str) -> NewPet {
        let (value, unit) = self.age;
        NewPet {
            name: self.name.into(),
            pet_type: self.pet_type,
            breed: self.breed.into(),
            age: Age { value, unit },
            gender: self.gender,
            size: self.size,
            color: self.color.into(),
            description: self.description.into(),
            images: vec![self.image.into()],
            health: Health {
                is_vaccinated: self.vaccinated,
                is_spayed: self.spayed,
                ..Health::default()
            },
            behavior: Behavior {
                temperament: self.temperament,
                ..Behavior::default()
            },
            characteristics: self.characteristics.iter().map(|c| c.to_string()).collect(),
            requirements: Vec::new(),
            location: PetLocation {
                city: Some(city.to_owned()),
                state: None,
                country: Some(COUNTRY.to_owned()),
                coordinates: None,
            },
            adoption_fee: self.adoption_fee,
        }
    }
}

impl DemoPost {
    pub fn to_new_post(&self, pet: Option<PetId>) -> NewPost {
        NewPost {
            content: self.content.into(),
            images: Vec::new(),
            pet: pet.filter(|_| self.about_pet),
            post_type: self.post_type,
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            location: Location::default(),
            is_public: None,
        }
    }
}

pub const ADMIN: DemoAccount = DemoAccount {
    name: "PetConnect Admin",
    email: "admin@petconnect.local",
    password: "admin123",
    phone: None,
    role: Role::Admin,
    city: "Austin",
    pets: &[],
    posts: &[DemoPost {
        content: "Welcome to PetConnect! Share your stories, find your next best friend and help pets in need.",
        post_type: PostType::General,
        tags: &["welcome", "community"],
        about_pet: false,
    }],
};

pub const MEMBERS: &[DemoAccount] = &[
    DemoAccount {
        name: "Dr. Emily Carter",
        email: "vet@petconnect.local",
        password: "vet12345",
        phone: Some("555-0101"),
        role: Role::Veterinarian,
        city: "Austin",
        pets: &[],
        posts: &[DemoPost {
            content: "Reminder: most dogs need their rabies booster every one to three years. Check your pet's records!",
            post_type: PostType::Tip,
            tags: &["health", "vaccines", "dogs"],
            about_pet: false,
        }],
    },
    DemoAccount {
        name: "Sarah Johnson",
        email: "sarah@petconnect.local",
        password: "password123",
        phone: Some("555-0102"),
        role: Role::User,
        city: "Denver",
        pets: &[
            DemoPet {
                name: "Buddy",
                pet_type: PetType::Dog,
                breed: "Golden Retriever",
                age: (3.0, AgeUnit::Years),
                gender: Gender::Male,
                size: Size::Large,
                color: "Golden",
                description: "Buddy is a gentle, well-trained golden who loves long walks and belly rubs.",
                image: "/uploads/seed-buddy.jpg",
                vaccinated: true,
                spayed: true,
                temperament: Temperament::Friendly,
                characteristics: &["house-trained", "loves kids"],
                adoption_fee: 150.0,
                featured: true,
            },
            DemoPet {
                name: "Pepper",
                pet_type: PetType::Rabbit,
                breed: "Holland Lop",
                age: (8.0, AgeUnit::Months),
                gender: Gender::Female,
                size: Size::Small,
                color: "Black and white",
                description: "Pepper is a curious little lop who enjoys fresh greens and quiet afternoons.",
                image: "/uploads/seed-pepper.jpg",
                vaccinated: false,
                spayed: false,
                temperament: Temperament::Shy,
                characteristics: &["litter-trained"],
                adoption_fee: 40.0,
                featured: false,
            },
        ],
        posts: &[DemoPost {
            content: "Buddy is looking for his forever home. He is great with kids and other dogs!",
            post_type: PostType::Adoption,
            tags: &["adoption", "dogs", "golden"],
            about_pet: true,
        }],
    },
    DemoAccount {
        name: "Mike Chen",
        email: "mike@petconnect.local",
        password: "password123",
        phone: None,
        role: Role::User,
        city: "Portland",
        pets: &[DemoPet {
            name: "Whiskers",
            pet_type: PetType::Cat,
            breed: "Maine Coon",
            age: (2.0, AgeUnit::Years),
            gender: Gender::Female,
            size: Size::Medium,
            color: "Tabby",
            description: "Whiskers is a calm, affectionate cat who will happily share your couch.",
            image: "/uploads/seed-whiskers.jpg",
            vaccinated: true,
            spayed: true,
            temperament: Temperament::Calm,
            characteristics: &["indoor", "quiet"],
            adoption_fee: 75.0,
            featured: true,
        }],
        posts: &[
            DemoPost {
                content: "Two years ago Whiskers picked me at the shelter. Best decision I never made.",
                post_type: PostType::Story,
                tags: &["cats", "rescue"],
                about_pet: true,
            },
            DemoPost {
                content: "Adoption meetup this Saturday at Laurelhurst Park, 10am. Bring treats!",
                post_type: PostType::Event,
                tags: &["event", "meetup"],
                about_pet: false,
            },
        ],
    },
];
