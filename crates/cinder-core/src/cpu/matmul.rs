use crate::{CPUOperation, Matmul, StorageView, Tensor, TensorDType, TensorError};

/// Broadcast-multiply-reduce.
///
/// `a: [.., m, n] -> [.., 1, m, n] -> [.., n, m, 1]` and
/// `b: [.., n, p] -> [.., 1, n, p] -> [.., n, 1, p]`. Their product
/// broadcasts to `[.., n, m, p]` and summing axis -3 leaves `[.., m, p]`.
impl<T: TensorDType> CPUOperation<T> for Matmul<T> {
    fn apply_cpu(&self, dst: StorageView) -> Result<Tensor<T>, TensorError> {
        let (lhs, rhs) = self.operands()?;
        let product = lhs.mul(&rhs)?;
        let result = product.sum(-3)?;
        debug_assert_eq!(result.shape(), dst.shape());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::{shape, ErrorKind, Tensor};

    #[test]
    fn test_square_product() {
        let a = Tensor::<f32>::from_data([1., 2., 3., 4.], shape![2, 2]);
        let b = Tensor::<f32>::from_data([5., 6., 7., 8.], shape![2, 2]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.to_vec(), vec![19., 22., 43., 50.]);
    }

    #[test]
    fn test_rectangular_product() {
        let a = Tensor::<f32>::from_data([1., 2., 3., 4., 5., 6.], shape![2, 3]);
        let b = Tensor::<f32>::from_data([7., 8., 9., 10., 11., 12.], shape![3, 2]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape(), &shape![2, 2]);
        assert_eq!(c.to_vec(), vec![58., 64., 139., 154.]);
    }

    #[test]
    fn test_identity_is_neutral() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let b = Tensor::<f32>::from_data(data, shape![3, 4]);
        let c = Tensor::<f32>::eye(3).matmul(&b).unwrap();
        assert_eq!(c.to_vec(), b.to_vec());
    }

    #[test]
    fn test_batched_product() {
        let a = Tensor::<f32>::from_data([1., 0., 0., 1., 2., 0., 0., 2.], shape![2, 2, 2]);
        let b = Tensor::<f32>::from_data([1., 2., 3., 4., 1., 2., 3., 4.], shape![2, 2, 2]);
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.shape(), &shape![2, 2, 2]);
        assert_eq!(c.to_vec(), vec![1., 2., 3., 4., 2., 4., 6., 8.]);
    }

    #[test]
    fn test_matmul_rejects() {
        let v = Tensor::<f32>::zeros(shape![3]);
        let m = Tensor::<f32>::zeros(shape![3, 3]);
        assert_eq!(v.matmul(&m).unwrap_err().kind(), ErrorKind::Rank);
        let batched = Tensor::<f32>::zeros(shape![2, 3, 3]);
        assert_eq!(m.matmul(&batched).unwrap_err().kind(), ErrorKind::Rank);
        let wide = Tensor::<f32>::zeros(shape![3, 4]);
        assert_eq!(wide.matmul(&wide).unwrap_err().kind(), ErrorKind::Broadcast);
    }
}
