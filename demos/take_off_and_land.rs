extern crate tello_link;

use std::time::Duration;

use tello_link::{Command, Result, Session, SessionOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    fly().await.unwrap();
}

async fn fly() -> Result<()> {
    let session = Session::connect(SessionOptions::default()).await?;

    session.request(Command::take_off())?;
    session.request(Command::land())?;

    // outcomes are not reported back, so just give the sequence time to run
    tokio::time::sleep(Duration::from_secs(20)).await;

    Ok(())
}
