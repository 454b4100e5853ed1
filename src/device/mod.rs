//! Per-board state: the shared session, per-open handles, the identity
//! heuristic and the textual read/write payloads.

pub mod fingerprint;
pub mod handle;
pub mod session;
pub mod text;

pub use fingerprint::DeviceFingerprint;
pub use handle::AccessHandle;
pub use session::DeviceSession;
