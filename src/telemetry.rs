use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::{spawn, task};
use tracing::{debug, warn};

use crate::errors::Result;

/// One decoded state report from the drone.
///
/// The drone broadcasts its state at least ten times a second as `key:value`
/// pairs joined by `;` with a trailing separator, eg
///
/// `"pitch:0;roll:0;yaw:-3;vgx:0;vgy:0;vgz:1;templ:58;temph:60;tof:71;h:50;bat:82;baro:-57.14;time:14;agx:17.00;agy:-4.00;agz:-956.00;"`
///
/// Each report fully replaces the previous one; fields are never merged
/// across reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    fields: HashMap<String, String>,
}

impl Snapshot {
    /// Decodes one state datagram.
    ///
    /// Segments without a `:` are dropped; if a key somehow appears twice
    /// the last occurrence wins. Never fails - unreadable input just yields
    /// fewer fields.
    pub fn decode(payload: &str) -> Snapshot {
        let mut fields = HashMap::new();

        for segment in payload.split(';') {
            if segment.is_empty() {
                continue;
            }

            match segment.split_once(':') {
                Some((key, value)) => {
                    fields.insert(key.to_string(), value.to_string());
                }
                None => debug!("ignoring malformed state segment {segment:?}"),
            }
        }

        Snapshot { fields }
    }

    /// The raw value of a field, eg `"bat"`, if the last report carried it.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// A field parsed as a number, if present and numeric.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field)?.parse().ok()
    }

    /// True until the first report arrives.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields of the last report.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug)]
pub(crate) struct TelemetryListener {
    local_addr: SocketAddr,
    task: task::JoinHandle<()>,
}

impl TelemetryListener {
    /// Binds the state port and publishes a [`Snapshot`] for every datagram
    /// the drone broadcasts. Port 0 lets the OS pick one.
    pub(crate) async fn start(port: u16, publisher: watch::Sender<Snapshot>) -> Result<Self> {
        let sock = UdpSocket::bind(("0.0.0.0", port)).await?;
        let local_addr = sock.local_addr()?;
        debug!("listening for state reports at {local_addr}");

        let task = spawn(async move {
            let mut buf = vec![0; 1024];
            loop {
                match sock.recv(&mut buf).await {
                    Ok(n) => {
                        let report = String::from_utf8_lossy(&buf[..n]);
                        // all receivers gone means the session is gone
                        if publisher.send(Snapshot::decode(report.trim())).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!("state channel receive failed: {err}"),
                }
            }
        });

        Ok(Self { local_addr, task })
    }

    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub(crate) fn stop(&self) {
        self.task.abort();
    }
}
