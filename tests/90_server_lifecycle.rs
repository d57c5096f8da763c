mod common;

use std::time::Duration;

use anyhow::Result;

use common::{database_configured, TestServer};

#[tokio::test]
async fn dropped_server_stops_listening() -> Result<()> {
    if !database_configured() {
        return Ok(());
    }

    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(15)).await?;
    let health = server.url("/health");
    assert!(reqwest::get(&health).await?.status().is_success());

    drop(server);

    // The process is reaped on drop, so nothing answers on its port
    assert!(reqwest::get(&health).await.is_err());

    Ok(())
}

#[tokio::test]
async fn stop_is_idempotent() -> Result<()> {
    if !database_configured() {
        return Ok(());
    }

    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(15)).await?;
    server.stop();
    server.stop();
    assert!(reqwest::get(server.url("/health")).await.is_err());

    Ok(())
}
