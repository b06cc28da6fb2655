use derive_new::new;

use crate::{Enforcer, InvariantError, Operation, RVec, StorageView, Tensor, TensorDType};

/// Reorders dimensions. Output axis `i` is source axis `dims[i]`.
#[derive(new, Debug, Clone)]
pub struct Permute<T: TensorDType> {
    pub src: Tensor<T>,
    dims: RVec<usize>,
}

impl<T: TensorDType> Permute<T> {
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }
}

impl<T: TensorDType> Operation for Permute<T> {
    fn name(&self) -> &'static str {
        "permute"
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        Enforcer::check_permutation(&self.dims, self.src.rank())
    }

    fn compute_view(&self) -> Result<StorageView, InvariantError> {
        let (shape, strides) = (self.src.shape(), self.src.strides());
        Ok(StorageView::new(
            self.dims.iter().map(|&d| shape[d]).collect(),
            self.dims.iter().map(|&d| strides[d]).collect(),
        ))
    }
}
