use derive_new::new;

use crate::{Enforcer, InvariantError, Operation, StorageView, Tensor, TensorDType};

/// Sum over one axis, which is removed from the result.
#[derive(new, Debug, Clone)]
pub struct Sum<T: TensorDType> {
    pub src: Tensor<T>,
    axis: isize,
}

impl<T: TensorDType> Sum<T> {
    pub fn axis(&self) -> isize {
        self.axis
    }
}

impl<T: TensorDType> Operation for Sum<T> {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        let shape = self.src.shape();
        Enforcer::normalize_axis(self.axis, shape.rank())?;
        Enforcer::assert_min_rank(self.name(), shape, 2)
    }

    fn compute_view(&self) -> Result<StorageView, InvariantError> {
        let mut shape = self.src.shape().clone();
        shape.remove(Enforcer::normalize_axis(self.axis, shape.rank())?);
        Ok(StorageView::contiguous(shape))
    }
}
