//! Media stream acquisition
//!
//! This module wraps the permission-gated device capture API behind the
//! `StreamSource` seam and owns the acquisition state machine.

pub mod acquirer;
pub mod traits;

pub use acquirer::{StreamAcquirer, StreamState};
pub use traits::{
    CaptureError, CaptureKind, CaptureResult, StreamConstraints, StreamHandle, StreamSource,
};
