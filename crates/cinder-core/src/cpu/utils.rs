use crate::{CPUBuffer, Storage, StorageView, Tensor, TensorDType};

/// Wraps freshly computed, row-major data in a tensor that owns it.
pub(crate) fn cpu_store_result<T: TensorDType>(data: Vec<T>, dst: StorageView) -> Tensor<T> {
    assert_eq!(data.len(), dst.numel());
    debug_assert!(dst.is_contiguous());
    Tensor::new(dst, Storage::new(CPUBuffer::new(data)))
}
