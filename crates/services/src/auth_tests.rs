//! Tests for the auth service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use domains::{
    MockPasswordHasher, MockTokenService, MockUserRepository, PasswordHash, SystemClock,
    TokenClaims,
};

use super::*;

fn stored_user(active: bool) -> User {
    let mut user = User::register(
        NewUser {
            name: "Maria".into(),
            email: "maria@example.com".into(),
            password: PasswordHash::new("hashed:secret1"),
            role: Role::User,
            phone: None,
            location: Location::default(),
            bio: None,
            preferences: Preferences::default(),
            is_verified: false,
        },
        Utc::now(),
    )
    .expect("valid user");
    user.is_active = active;
    user
}

fn plain_hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|plain| Ok(PasswordHash::new(format!("hashed:{plain}"))));
    hasher
        .expect_verify()
        .returning(|plain, hash| Ok(hash.as_str() == format!("hashed:{plain}")));
    hasher
}

fn issuing_tokens() -> MockTokenService {
    let mut tokens = MockTokenService::new();
    tokens.expect_issue().returning(|_| {
        Ok(IssuedToken {
            token: "token".into(),
            expires_at: Utc::now() + Duration::days(7),
        })
    });
    tokens
}

fn service(users: MockUserRepository, tokens: MockTokenService) -> AuthService {
    AuthService::new(
        Arc::new(users),
        Arc::new(plain_hasher()),
        Arc::new(tokens),
        Arc::new(SystemClock),
    )
}

#[tokio::test]
async fn register_rejects_taken_email() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .withf(|email| email.to_string() == "maria@example.com")
        .return_once(|_| Ok(Some(stored_user(true))));
    users.expect_insert().never();

    let err = service(users, MockTokenService::new())
        .register(Registration {
            name: "Maria".into(),
            email: "Maria@Example.com".into(),
            password: "secret1".into(),
            ..Registration::default()
        })
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn register_hashes_password_and_issues_token() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().return_once(|_| Ok(None));
    users
        .expect_insert()
        .withf(|user| user.password.as_str() == "hashed:secret1")
        .times(1)
        .return_once(|_| Ok(()));

    let session = service(users, issuing_tokens())
        .register(Registration {
            name: "Maria".into(),
            email: "maria@example.com".into(),
            password: "secret1".into(),
            ..Registration::default()
        })
        .await
        .expect("registered");
    assert_eq!(session.user.role, Role::User);
    assert_eq!(session.token.token, "token");
}

#[tokio::test]
async fn register_rejects_short_password_before_touching_storage() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().never();

    let err = service(users, MockTokenService::new())
        .register(Registration {
            name: "Maria".into(),
            email: "maria@example.com".into(),
            password: "123".into(),
            ..Registration::default()
        })
        .await
        .expect_err("short password");
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(|_| Ok(Some(stored_user(true))));
    users.expect_update().never();

    let err = service(users, MockTokenService::new())
        .login("maria@example.com", "wrong-password")
        .await
        .expect_err("wrong password");
    assert!(matches!(err, DomainError::Unauthorized(_)));
}

#[tokio::test]
async fn login_rejects_deactivated_accounts() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(|_| Ok(Some(stored_user(false))));

    let err = service(users, MockTokenService::new())
        .login("maria@example.com", "secret1")
        .await
        .expect_err("inactive");
    assert!(matches!(err, DomainError::Unauthorized(_)));
}

#[tokio::test]
async fn login_stamps_last_login() {
    let user = stored_user(true);
    let before = user.last_login;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(user)));
    users
        .expect_update()
        .withf(move |u| u.last_login >= before)
        .times(1)
        .return_once(|_| Ok(()));

    service(users, issuing_tokens())
        .login("maria@example.com", "secret1")
        .await
        .expect("logged in");
}

#[tokio::test]
async fn authenticate_rejects_tokens_of_inactive_users() {
    let user = stored_user(false);
    let user_id = user.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    let mut tokens = MockTokenService::new();
    tokens.expect_verify().return_once(move |_| {
        Ok(TokenClaims {
            user_id,
            role: Role::User,
            expires_at: Utc::now() + Duration::hours(1),
        })
    });

    let err = service(users, tokens)
        .authenticate("token")
        .await
        .expect_err("inactive");
    assert!(matches!(err, DomainError::Unauthorized(_)));
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let user = stored_user(true);
    let actor = Actor::new(user.id, user.role);
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));
    users.expect_update().never();

    let err = service(users, MockTokenService::new())
        .change_password(&actor, "not-it", "newsecret")
        .await
        .expect_err("wrong current password");
    assert!(matches!(err, DomainError::Validation(_)));
}
