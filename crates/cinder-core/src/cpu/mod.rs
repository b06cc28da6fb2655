mod binary;
mod inverse;
mod matmul;
mod reduce;
mod reindex;
mod utils;

pub(crate) use reindex::materialize;

use crate::{Operation, StorageView, Tensor, TensorDType, TensorError};

/// Executes an [`Operation`] on host memory.
///
/// `dst` is the view returned by [`Operation::compute_view`]. Metadata-only
/// operations alias their source with it, the rest allocate a fresh buffer.
pub trait CPUOperation<T: TensorDType>: Operation {
    fn apply_cpu(&self, dst: StorageView) -> Result<Tensor<T>, TensorError>;
}
