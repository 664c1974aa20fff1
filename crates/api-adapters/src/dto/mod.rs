//! Request commands and response views.
//!
//! Requests are explicit commands: every field is named and update commands
//! reject unknown fields. Views decide what leaves the process; the password
//! hash never does.

pub mod lenient;
mod queries;
mod requests;
mod views;

pub use queries::{PageQuery, PetSearchQuery, PostSearchQuery, TrendingQuery, UserSearchQuery};
pub use requests::{
    AdminUserRequest, ApplyRequest, CommentRequest, CreatePetRequest, CreatePostRequest,
    LoginRequest, PasswordRequest, ProfileRequest, RegisterRequest, ReviewRequest,
    UpdatePetRequest, UpdatePostRequest,
};
pub use views::{
    ApplicationEntryView, ApplicationView, CommentView, FavoriteView, FeedView,
    PersonalizedFeedView, PetView, PostView, ReplyView, SessionView, UserRef, UserView,
};
