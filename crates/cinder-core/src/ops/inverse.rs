use derive_new::new;

use crate::{Enforcer, InvariantError, Operation, StorageView, Tensor, TensorDType};

/// What inversion does when elimination meets a zero pivot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Hash, strum_macros::Display, strum_macros::EnumIter,
)]
pub enum PivotPolicy {
    /// Divide anyway. The affected matrix fills with infinities and NaNs.
    #[default]
    Unchecked,
    /// Stop with [`crate::TensorError::SingularMatrix`].
    Checked,
}

/// Batched Gauss-Jordan inverse over the trailing two dimensions.
#[derive(new, Debug, Clone)]
pub struct Inverse<T: TensorDType> {
    pub src: Tensor<T>,
    policy: PivotPolicy,
}

impl<T: TensorDType> Inverse<T> {
    pub fn policy(&self) -> PivotPolicy {
        self.policy
    }
}

impl<T: TensorDType> Operation for Inverse<T> {
    fn name(&self) -> &'static str {
        "inverse"
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        Enforcer::assert_min_rank(self.name(), self.src.shape(), 2)?;
        Enforcer::assert_square(self.src.shape())?;
        Ok(())
    }

    fn compute_view(&self) -> Result<StorageView, InvariantError> {
        Ok(StorageView::contiguous(self.src.shape().clone()))
    }
}
