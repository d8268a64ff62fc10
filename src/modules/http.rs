use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

/// Blocking HTTP client identifying as this crate.
///
/// `None` disables the overall request timeout, which the live radio stream needs.
pub fn build_client(timeout: Option<Duration>) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION"),
        ))
        .build()
        .context("Could not build HTTP client")
}
