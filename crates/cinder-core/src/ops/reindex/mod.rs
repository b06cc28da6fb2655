//! Operations that only rewrite a view's shape and strides.
//!
//! Reshape is the exception: it copies when the new shape cannot be
//! expressed over the existing layout.
mod broadcast;
mod permute;
mod reshape;
mod squeeze;

pub use broadcast::Broadcast;
pub use permute::Permute;
pub use reshape::{Reshape, ReshapePlan};
pub use squeeze::{ExpandDims, Squeeze};
