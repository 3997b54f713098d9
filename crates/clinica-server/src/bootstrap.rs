//! Startup seeding.

use anyhow::Context;

use clinica_auth::password::hash_password;
use clinica_auth::storage::{User, UserStorage};

use crate::config::SeedConfig;

/// Seeds the administrator account configured in `[seed]`.
///
/// Runs once at startup. Nothing happens when the seed section is
/// incomplete or the username already exists, so restarts are safe.
pub async fn seed_admin(config: &SeedConfig, users: &dyn UserStorage) -> anyhow::Result<()> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password)
    else {
        return Ok(());
    };

    if users
        .find_by_username(username)
        .await
        .context("seed lookup failed")?
        .is_some()
    {
        tracing::debug!(username, "seed admin already exists");
        return Ok(());
    }

    let email = format!("{username}@clinica.local");
    let hash = hash_password(password).context("seed password rejected")?;
    let admin = User::new(username, email, format!("seed-{username}"), hash);
    users.create(&admin).await.context("seed insert failed")?;

    tracing::info!(username, "seeded administrator account");
    Ok(())
}
