extern crate tello_link;

use std::time::Duration;

use tello_link::{Command, Session, SessionOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    fly().await
}

/// Flies a square, one right-angle turn per corner.
async fn fly() -> anyhow::Result<()> {
    let session = Session::connect(SessionOptions::default()).await?;

    session.request(Command::take_off())?;
    for _ in 0..4 {
        session.request(Command::forward(100))?;
        session.request(Command::turn_clockwise(90))?;
    }
    session.request(Command::land())?;

    tokio::time::sleep(Duration::from_secs(60)).await;

    Ok(())
}
