use ndarray::{ArrayD, IxDyn};

use crate::{Shape, Tensor, TensorDType};

/// Conversion to and from ndarray arrays
impl<T: TensorDType> Tensor<T> {
    /// Copies the logical contents into an owned, standard-layout array.
    pub fn to_ndarray(&self) -> anyhow::Result<ArrayD<T>> {
        let shape = IxDyn(&self.shape().to_vec());
        Ok(ArrayD::from_shape_vec(shape, self.to_vec())?)
    }
}

impl<T: TensorDType> From<ArrayD<T>> for Tensor<T> {
    fn from(it: ArrayD<T>) -> Self {
        let shape: Shape = it.shape().into();
        let data: Vec<T> = it.iter().copied().collect();
        Tensor::from_data(data, shape)
    }
}
