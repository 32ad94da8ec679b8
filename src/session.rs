use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tokio::{spawn, task};
use tracing::{debug, error, info, warn};

use crate::command::Command;
use crate::errors::{Result, SessionError};
use crate::options::SessionOptions;
use crate::sequencer::Sequencer;
use crate::telemetry::{Snapshot, TelemetryListener};

#[derive(Debug)]
enum Request {
    Enqueue(Command),
    Clear,
}

/// A live control session with a drone.
///
/// Owns the two UDP channels of the Tello protocol: the control channel,
/// over which commands are sent and acknowledged strictly one at a time, and
/// the one-way channel the drone broadcasts state reports on.
///
/// Every method returns immediately. A command's outcome is never reported
/// back to the caller - it is only observable through its effect on later
/// commands and on the drone itself.
#[derive(Debug)]
pub struct Session {
    requests: mpsc::UnboundedSender<Request>,
    snapshots: watch::Receiver<Snapshot>,
    command_addr: SocketAddr,
    state_addr: SocketAddr,
    listener: TelemetryListener,
    link: task::JoinHandle<()>,
}

impl Session {
    /// Binds both channels and starts the session by queueing the SDK mode
    /// handshake, which the drone acknowledges like any other command.
    pub async fn connect(options: SessionOptions) -> Result<Session> {
        let sock = UdpSocket::bind(("0.0.0.0", options.command_port)).await?;
        sock.connect(&options.drone_address).await?;
        let command_addr = sock.local_addr()?;
        info!("control channel {command_addr} → {}", options.drone_address);

        let (snapshot_tx, snapshots) = watch::channel(Snapshot::default());
        let listener = TelemetryListener::start(options.state_port, snapshot_tx).await?;
        let state_addr = listener.local_addr();

        let (requests, request_rx) = mpsc::unbounded_channel();

        let response_timeout = options.response_timeout;
        let link = spawn(async move {
            if let Err(err) = run_link(sock, request_rx, response_timeout).await {
                error!("control channel failed: {err}");
            }
        });

        let session = Session {
            requests,
            snapshots,
            command_addr,
            state_addr,
            listener,
            link,
        };

        session.request(Command::init())?;

        Ok(session)
    }

    /// Queues a command. The command is transmitted once every earlier
    /// queued command has its outcome, and never while the flight state
    /// forbids it - a forbidden command is dropped without being sent.
    pub fn request(&self, command: impl Into<Command>) -> Result<()> {
        self.requests
            .send(Request::Enqueue(command.into()))
            .map_err(|_| SessionError::SessionClosed)
    }

    /// Queues the two mission pad setup commands: detection on, downward
    /// camera only. EDU only.
    pub fn enable_mission_pads(&self) -> Result<()> {
        self.request(Command::mission_pads_on())?;
        self.request(Command::mission_pad_downward())
    }

    /// The most recent value of a state field, eg `"bat"`, or `None` if the
    /// drone has not reported it.
    pub fn query_state(&self, field: &str) -> Option<String> {
        self.snapshots.borrow().get(field).map(str::to_string)
    }

    /// The latest full state report.
    pub fn state(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// A channel yielding every state report as it arrives.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Drops every queued command and treats the drone as grounded again.
    /// The command currently awaiting its outcome, if any, cannot be
    /// recalled from the drone - its outcome is discarded when it arrives.
    pub fn clear(&self) -> Result<()> {
        self.requests
            .send(Request::Clear)
            .map_err(|_| SessionError::SessionClosed)
    }

    /// Local address of the control channel.
    pub fn command_addr(&self) -> SocketAddr {
        self.command_addr
    }

    /// Local address state reports are received on.
    pub fn state_addr(&self) -> SocketAddr {
        self.state_addr
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.link.abort();
        self.listener.stop();
    }
}

/// The single owner of the sequencer. Caller requests, inbound
/// acknowledgements and the in-flight deadline are serialized here, so no
/// two of them can ever interleave inside a state transition.
async fn run_link(
    sock: UdpSocket,
    mut requests: mpsc::UnboundedReceiver<Request>,
    response_timeout: Option<Duration>,
) -> Result<()> {
    let mut sequencer = Sequencer::new();
    let mut deadline: Option<Instant> = None;
    let mut buf = vec![0; 256];

    loop {
        let overdue_at = deadline;
        let outcome_overdue = async move {
            match overdue_at {
                Some(at) => sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        let transmit = tokio::select! {
            request = requests.recv() => match request {
                Some(Request::Enqueue(command)) => sequencer.enqueue(command),
                Some(Request::Clear) => {
                    debug!("clearing the command queue");
                    sequencer.reset();
                    None
                }
                // session handle dropped
                None => return Ok(()),
            },
            received = sock.recv(&mut buf) => {
                let n = match received {
                    Ok(n) => n,
                    Err(err) => {
                        warn!("control channel receive failed: {err}");
                        continue;
                    }
                };
                let payload = String::from_utf8_lossy(&buf[..n]);
                debug!("RECEIVED {:?}", payload.trim());
                sequencer.acknowledged(payload.trim())
            }
            _ = outcome_overdue => {
                warn!("no outcome within {response_timeout:?}, giving up on the command");
                sequencer.abandon_in_flight()
            }
        };

        match transmit {
            Some(command) => {
                debug!("SEND {command}");
                sock.send(command.text().as_bytes()).await?;
                deadline = response_timeout.map(|timeout| Instant::now() + timeout);
            }
            None if !sequencer.is_busy() => deadline = None,
            None => {}
        }
    }
}
