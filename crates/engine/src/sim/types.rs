use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveIntent {
    #[default]
    None,
    Left,
    Right,
}

impl MoveIntent {
    pub fn facing(self) -> Option<Facing> {
        match self {
            Self::None => None,
            Self::Left => Some(Facing::Left),
            Self::Right => Some(Facing::Right),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimState {
    #[default]
    Still,
    Walking,
    Attacking,
}

/// Attacking wins over walking, walking over standing still.
pub fn derive_anim_state(attacking: bool, moving: bool) -> AnimState {
    if attacking {
        AnimState::Attacking
    } else if moving {
        AnimState::Walking
    } else {
        AnimState::Still
    }
}

/// Decoded host input. Each variant maps to one session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    StopMove,
    Punch,
    TogglePause,
    Reset,
}

impl Intent {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::MoveLeft => "move_left",
            Self::MoveRight => "move_right",
            Self::StopMove => "stop",
            Self::Punch => "punch",
            Self::TogglePause => "pause",
            Self::Reset => "reset",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "move_left" => Some(Self::MoveLeft),
            "move_right" => Some(Self::MoveRight),
            "stop" => Some(Self::StopMove),
            "punch" => Some(Self::Punch),
            "pause" => Some(Self::TogglePause),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}
