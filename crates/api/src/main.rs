use std::sync::Arc;

use anyhow::Context;

use dealdesk_api::accounts::InMemoryAccounts;
use dealdesk_api::config::ApiConfig;
use dealdesk_auth::Role;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dealdesk_observability::init();

    // A missing or weak secret stops the process before it can serve anything.
    let config = ApiConfig::from_env().context("invalid configuration")?;

    let accounts = Arc::new(InMemoryAccounts::new());
    if let Some(admin) = config.bootstrap_admin() {
        accounts
            .insert(&admin.email, &admin.password, Role::Admin)
            .await
            .context("failed to seed bootstrap admin")?;
        tracing::info!(email = %admin.email, "seeded bootstrap admin");
    }

    let app = dealdesk_api::app::build_app(&config, accounts)
        .context("invalid session settings")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        secure_cookies = config.session().secure_cookies,
        ttl_days = config.session().ttl.num_days(),
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
