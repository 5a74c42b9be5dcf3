//! Polling synchronization engine.

pub mod expansion;
pub mod messages;
pub mod normalize;
pub mod presence;
pub mod seen_index;
pub mod session;

pub use expansion::ExpansionState;
pub use session::{Session, SessionSettings};
