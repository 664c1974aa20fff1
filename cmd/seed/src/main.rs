//! # Seed
//!
//! Fills a PetConnect database with demo accounts, pets and posts. Runs
//! through the services, so every record passes the same validation as
//! live traffic. Accounts whose email already exists are skipped along
//! with their content, which makes repeated runs harmless.

mod data;

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use auth_adapters::{Argon2PasswordHasher, JwtTokenService};
use configs::Settings;
use domains::{Actor, DomainError, PetUpdate, Role, SystemClock};
use services::{Registration, Services};
use storage_adapters::Repositories;

use data::{DemoAccount, ADMIN, MEMBERS};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load().context("failed to load configuration")?;
    let repos = repositories(&settings).await?;
    let services = Services::new(
        repos.users,
        repos.pets,
        repos.posts,
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(JwtTokenService::with_ttl_hours(
            settings.auth.jwt_secret.expose_secret().as_bytes(),
            settings.auth.token_ttl_hours,
        )),
        Arc::new(SystemClock),
    );

    let mut created = 0usize;
    created += usize::from(seed_or_skip(&services, &ADMIN, None).await?);
    let admin = services
        .auth
        .login(ADMIN.email, ADMIN.password)
        .await
        .map(|session| Actor::new(session.user.id, session.user.role))
        .map_err(|err| tracing::warn!(error = %err, "cannot sign in as the demo admin, pets will not be featured"))
        .ok();
    for account in MEMBERS {
        created += usize::from(seed_or_skip(&services, account, admin.as_ref()).await?);
    }
    tracing::info!(created, skipped = MEMBERS.len() + 1 - created, "seeding finished");
    Ok(())
}

async fn seed_or_skip(
    services: &Services,
    account: &DemoAccount,
    admin: Option<&Actor>,
) -> anyhow::Result<bool> {
    let created = seed_account(services, account, admin)
        .await
        .with_context(|| format!("failed to seed {}", account.email))?;
    if !created {
        tracing::info!(email = account.email, "account exists, skipped");
    }
    Ok(created)
}

async fn repositories(settings: &Settings) -> anyhow::Result<Repositories> {
    #[cfg(feature = "db-postgres")]
    if let Some(url) = settings.database.url.as_deref() {
        let pool = storage_adapters::postgres::connect(url, settings.database.max_connections)
            .await
            .context("failed to connect to postgres")?;
        return Ok(Repositories::postgres(pool));
    }
    #[cfg(not(feature = "db-postgres"))]
    if settings.database.url.is_some() {
        anyhow::bail!("database.url is set but this build has no postgres support");
    }
    tracing::warn!("no database.url configured, seeding a throwaway in-memory store");
    Ok(Repositories::memory())
}

/// Returns `false` when the account already existed.
async fn seed_account(
    services: &Services,
    account: &DemoAccount,
    admin: Option<&Actor>,
) -> anyhow::Result<bool> {
    let registration = Registration {
        name: account.name.into(),
        email: account.email.into(),
        password: account.password.into(),
        phone: account.phone.map(String::from),
        location: data::location(account.city),
    };
    let session = match services
        .auth
        .create_account(registration, account.role, account.role != Role::User)
        .await
    {
        Ok(session) => session,
        Err(DomainError::Conflict(_)) => return Ok(false),
        Err(err) => return Err(err.into()),
    };
    let actor = Actor::new(session.user.id, session.user.role);
    let featuring = if actor.is_admin() { Some(&actor) } else { admin };

    let mut first_pet = None;
    for demo in account.pets {
        let pet = services.pets.create(&actor, demo.to_new_pet(account.city)).await?;
        if let (true, Some(admin)) = (demo.featured, featuring) {
            services
                .pets
                .update(
                    admin,
                    pet.pet.id,
                    PetUpdate {
                        is_featured: Some(true),
                        ..PetUpdate::default()
                    },
                )
                .await?;
        }
        first_pet.get_or_insert(pet.pet.id);
    }
    for demo in account.posts {
        services.posts.create(&actor, demo.to_new_post(first_pet)).await?;
    }
    tracing::info!(
        email = account.email,
        role = %account.role,
        pets = account.pets.len(),
        posts = account.posts.len(),
        "account seeded"
    );
    Ok(true)
}
