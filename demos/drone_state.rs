extern crate tello_link;

use tello_link::{Result, Session, SessionOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    watch_state().await.unwrap();
}

async fn watch_state() -> Result<()> {
    let session = Session::connect(SessionOptions::default()).await?;

    let mut snapshots = session.subscribe();
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        println!(
            "battery {}% height {}cm | pitch {} roll {} yaw {}",
            snapshot.get("bat").unwrap_or("?"),
            snapshot.get("h").unwrap_or("?"),
            snapshot.get("pitch").unwrap_or("?"),
            snapshot.get("roll").unwrap_or("?"),
            snapshot.get("yaw").unwrap_or("?"),
        );
    }

    Ok(())
}
