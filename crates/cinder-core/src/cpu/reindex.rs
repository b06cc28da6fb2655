use super::utils::cpu_store_result;
use crate::{
    Broadcast, CPUOperation, ExpandDims, Permute, Reshape, ReshapePlan, Squeeze, StorageView,
    Tensor, TensorDType, TensorError,
};

/// Gathers the elements of a view into row-major order.
pub(crate) fn materialize<T: TensorDType>(src: &Tensor<T>) -> Vec<T> {
    let buffer = src.storage().read_recursive();
    let data = buffer.as_slice();
    src.view().offsets().map(|offset| data[offset]).collect()
}

impl<T: TensorDType> CPUOperation<T> for Reshape<T> {
    fn apply_cpu(&self, dst: StorageView) -> Result<Tensor<T>, TensorError> {
        match self.plan()? {
            ReshapePlan::Materialize(_) => {
                log::debug!(
                    "Reshape of {} with strides {} into {:?} requires a copy",
                    self.src.shape(),
                    self.src.strides(),
                    self.dims()
                );
                Ok(cpu_store_result(materialize(&self.src), dst))
            }
            ReshapePlan::Unchanged | ReshapePlan::Strided(_) => Ok(self.src.alias(dst)),
        }
    }
}

macro_rules! impl_cpu_alias {
    ($($op:ident),*) => {
        $(
            impl<T: TensorDType> CPUOperation<T> for $op<T> {
                fn apply_cpu(&self, dst: StorageView) -> Result<Tensor<T>, TensorError> {
                    Ok(self.src.alias(dst))
                }
            }
        )*
    };
}

impl_cpu_alias!(Permute, Broadcast, Squeeze, ExpandDims);
