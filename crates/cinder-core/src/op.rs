use crate::{InvariantError, StorageView};
use std::fmt::Debug;

/// # Operation
///
/// Operation should be implemented for every type that derives a new tensor
/// from existing ones.
///
/// The Rust type system is not sufficient to check all invariants at compile time (we need
/// dependent types). Therefore, we move the checks to runtime, and every check runs before
/// any element is read or written.
pub trait Operation: Debug {
    fn name(&self) -> &'static str;

    /// # Check Invariants
    ///
    /// All operations have some invariants that must be upheld to ensure correctness.
    fn check_invariants(&self) -> Result<(), InvariantError>;

    /// # Compute View
    ///
    /// Determine the shape & strides of the resultant tensor.
    fn compute_view(&self) -> Result<StorageView, InvariantError>;
}
