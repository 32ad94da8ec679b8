use std::time::Duration;

const DEFAULT_DRONE_ADDRESS: &str = "192.168.10.1:8889";
const DEFAULT_COMMAND_PORT: u16 = 40001;
const DEFAULT_STATE_PORT: u16 = 8890;

/// Tello session connection options.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Address of the drone's control port.
    pub drone_address: String,

    /// Local port the control channel binds to. Port 0 lets the OS choose.
    pub command_port: u16,

    /// Local port the drone broadcasts state reports to. Port 0 lets the OS
    /// choose, which only makes sense when something else tells the sender
    /// where to aim.
    pub state_port: u16,

    /// How long to wait for a command's outcome before giving up on it and
    /// moving on, exactly as if the drone had reported an error. `None`
    /// waits forever.
    pub response_timeout: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            drone_address: DEFAULT_DRONE_ADDRESS.into(),
            command_port: DEFAULT_COMMAND_PORT,
            state_port: DEFAULT_STATE_PORT,
            response_timeout: Some(Duration::from_secs(30)),
        }
    }
}
