use std::fmt;

pub(crate) const INIT: &str = "command";
pub(crate) const TAKE_OFF: &str = "takeoff";
pub(crate) const LAND: &str = "land";
pub(crate) const MISSION_PADS_ON: &str = "mon";
pub(crate) const MISSION_PAD_DOWNWARD: &str = "mdirection 2";

/// A single textual command for the drone, eg `"up 50"`.
///
/// The sequencer treats commands as opaque wire text; the constructors here
/// produce the exact tokens the drone firmware expects (case-sensitive
/// ASCII). Distances are in cm, speeds in cm/s, rotations in degrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(String);

impl Command {
    /// An arbitrary command, sent verbatim.
    pub fn raw(text: impl Into<String>) -> Self {
        Command(text.into())
    }

    /// The SDK mode handshake. The first command of every session.
    pub(crate) fn init() -> Self {
        Command(INIT.into())
    }

    pub fn take_off() -> Self {
        Command(TAKE_OFF.into())
    }

    pub fn land() -> Self {
        Command(LAND.into())
    }

    pub fn up(cm: u32) -> Self {
        Command(format!("up {cm}"))
    }

    pub fn down(cm: u32) -> Self {
        Command(format!("down {cm}"))
    }

    pub fn left(cm: u32) -> Self {
        Command(format!("left {cm}"))
    }

    pub fn right(cm: u32) -> Self {
        Command(format!("right {cm}"))
    }

    pub fn forward(cm: u32) -> Self {
        Command(format!("forward {cm}"))
    }

    pub fn back(cm: u32) -> Self {
        Command(format!("back {cm}"))
    }

    pub fn turn_clockwise(degrees: u32) -> Self {
        Command(format!("cw {degrees}"))
    }

    pub fn turn_counter_clockwise(degrees: u32) -> Self {
        Command(format!("ccw {degrees}"))
    }

    pub fn flip(direction: FlipDirection) -> Self {
        Command(format!("flip {direction}"))
    }

    /// Fly to `(x, y, z)` relative to the current position at `speed` cm/s.
    pub fn go(x: i32, y: i32, z: i32, speed: u32) -> Self {
        Command(format!("go {x} {y} {z} {speed}"))
    }

    /// Fly a curve through `(x1, y1, z1)` ending at `(x2, y2, z2)` at
    /// `speed` cm/s.
    pub fn curve(x1: i32, y1: i32, z1: i32, x2: i32, y2: i32, z2: i32, speed: u32) -> Self {
        Command(format!("curve {x1} {y1} {z1} {x2} {y2} {z2} {speed}"))
    }

    /// Turn on mission pad detection. EDU only.
    pub fn mission_pads_on() -> Self {
        Command(MISSION_PADS_ON.into())
    }

    /// Restrict mission pad detection to the downward camera. EDU only.
    pub fn mission_pad_downward() -> Self {
        Command(MISSION_PAD_DOWNWARD.into())
    }

    /// As [`Command::go`], with coordinates relative to mission pad `pad`
    /// (`"m1"`..`"m8"`). EDU only.
    pub fn go_from_pad(x: i32, y: i32, z: i32, speed: u32, pad: &str) -> Self {
        Command(format!("go {x} {y} {z} {speed} {pad}"))
    }

    /// As [`Command::curve`], with coordinates relative to mission pad
    /// `pad`. EDU only.
    pub fn curve_from_pad(
        x1: i32,
        y1: i32,
        z1: i32,
        x2: i32,
        y2: i32,
        z2: i32,
        speed: u32,
        pad: &str,
    ) -> Self {
        Command(format!("curve {x1} {y1} {z1} {x2} {y2} {z2} {speed} {pad}"))
    }

    /// Fly to `(x, y, z)` relative to `from_pad`, then over `to_pad`, ending
    /// rotated to `yaw` degrees. EDU only.
    pub fn jump(x: i32, y: i32, z: i32, speed: u32, yaw: i32, from_pad: &str, to_pad: &str) -> Self {
        Command(format!("jump {x} {y} {z} {speed} {yaw} {from_pad} {to_pad}"))
    }

    /// The wire text of this command.
    pub fn text(&self) -> &str {
        &self.0
    }

    pub(crate) fn is(&self, text: &str) -> bool {
        self.0 == text
    }

    fn allowed_while_grounded(&self) -> bool {
        matches!(
            self.0.as_str(),
            INIT | MISSION_PADS_ON | MISSION_PAD_DOWNWARD | TAKE_OFF
        )
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Command(text.to_string())
    }
}

impl From<String> for Command {
    fn from(text: String) -> Self {
        Command(text)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction of a flip manoeuvre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Forward,
    Back,
    Left,
    Right,
}

impl fmt::Display for FlipDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            FlipDirection::Forward => "f",
            FlipDirection::Back => "b",
            FlipDirection::Left => "l",
            FlipDirection::Right => "r",
        };
        f.write_str(c)
    }
}

/// Whether the drone is believed to be on the ground or in the air.
///
/// Flipped only by acknowledged `takeoff` and `land` commands, never
/// speculatively at send time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightState {
    #[default]
    Grounded,
    Airborne,
}

impl FlightState {
    /// While grounded only the session handshake, the mission pad setup
    /// commands and `takeoff` may be sent; everything else requires the
    /// drone to be airborne.
    pub fn permits(self, command: &Command) -> bool {
        self == FlightState::Airborne || command.allowed_while_grounded()
    }
}
