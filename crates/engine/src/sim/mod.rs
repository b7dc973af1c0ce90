mod actor;
mod enemy;
mod events;
mod player;
mod session;
mod snapshot;
mod types;
mod zone;


pub use actor::{Actor, Behavior};
pub use enemy::EnemyBehavior;
pub use events::{GameplayEvent, GameplayEventCounts, GameplayEventKind};
pub use player::PlayerBehavior;
pub use session::Session;
pub use snapshot::{ActorSnapshot, SessionSnapshot};
pub use types::{derive_anim_state, ActorId, ActorKind, AnimState, Facing, Intent, MoveIntent, Vec2};
pub use zone::{Zone, ZoneManager};
