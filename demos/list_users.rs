//! List users example.
//!
//! Authenticates with a username and password (or refresh token) and
//! prints the first page-worth of users plus the available statuses.
//!
//! Run with: cargo run --example list_users
//!
//! Environment variables:
//! - DIRECTORY_USERNAME (required)
//! - DIRECTORY_PASSWORD or DIRECTORY_REFRESH_TOKEN (one required)
//! - DIRECTORY_API_URL, DIRECTORY_TOKEN_URL, DIRECTORY_PAGE_SIZE (optional)

use std::sync::Arc;

use directory_client::{
    ClientConfig, Credentials, DirectoryClient, InMemoryCache, ListOptions, ResourceId,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> directory_client::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let username = std::env::var("DIRECTORY_USERNAME")
        .expect("DIRECTORY_USERNAME environment variable required");
    let credentials = match std::env::var("DIRECTORY_REFRESH_TOKEN") {
        Ok(token) => Credentials::user_refresh_token(&username, token),
        Err(_) => Credentials::password(
            &username,
            std::env::var("DIRECTORY_PASSWORD")
                .expect("DIRECTORY_PASSWORD or DIRECTORY_REFRESH_TOKEN required"),
        ),
    };

    let client = DirectoryClient::builder(credentials)
        .config(ClientConfig::from_env()?)
        .cache(Arc::new(InMemoryCache::new()))
        .build()?;

    client.authenticate(None).await?;
    println!("Successfully authenticated!");

    let users = client.users().list(ListOptions::default().limit(20)).await?;
    println!("\nFound {} user(s):", users.len());
    for user in &users {
        println!("  - {} {}", user["id"], user["name"]);
    }

    if let Some(id) = users.first().and_then(|u| u["id"].as_u64()) {
        let user = client.users().get(&ResourceId::from(id)).await?;
        println!("\nFirst user: {user:#}");
    }

    let statuses = client.statuses().list(ListOptions::default()).await?;
    println!("\n{} status value(s) available", statuses.len());

    println!("\nDone!");
    Ok(())
}
