//! Safety layer
//!
//! Everything that can veto or shorten a move: the workspace envelope, the
//! boundary guard that clamps into it, the per-direction move quota and the
//! stop-on-silence watchdog.

pub mod envelope;
pub mod guard;
pub mod quota;
pub mod watchdog;

pub use envelope::SafetyEnvelope;
pub use guard::{clamp, Clamped};
pub use quota::{MoveQuota, QuotaCeilings};
pub use watchdog::Watchdog;
