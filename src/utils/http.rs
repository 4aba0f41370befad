use reqwest::Client;
use std::time::Duration;

// uploads of large videos go through the same clients
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15 * 60);

pub fn create_telegram_client() -> reqwest::Result<Client> {
    let builder = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30))
        .user_agent("ClipDrop/1.0");

    build_client(builder)
}

pub fn create_max_client() -> reqwest::Result<Client> {
    let builder = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(30))
        .user_agent("ClipDrop/1.0");

    build_client(builder)
}

fn build_client(builder: reqwest::ClientBuilder) -> reqwest::Result<Client> {
    let client = builder.build()?;
    debug!("HTTP client built");
    Ok(client)
}
