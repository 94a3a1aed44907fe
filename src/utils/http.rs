use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("mistral_post_bot/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to build HTTP client")
});

/// Process-wide client; callers set per-request timeouts.
pub fn get_http_client() -> &'static Client {
    &HTTP_CLIENT
}
