use crate::{CPUOperation, Enforcer, StorageView, Sum, Tensor, TensorDType, TensorError};

impl<T: TensorDType> CPUOperation<T> for Sum<T> {
    fn apply_cpu(&self, dst: StorageView) -> Result<Tensor<T>, TensorError> {
        let src = &self.src;
        let axis = Enforcer::normalize_axis(self.axis(), src.rank())?;

        let mut kept = src.shape().clone();
        kept[axis] = 1;
        let result = Tensor::<T>::zeros(kept);
        {
            // Every source element along `axis` maps onto one accumulator cell.
            let accumulator = result.broadcast_to(src.shape().clone())?;
            let src_buffer = src.storage().read_recursive();
            let mut acc_buffer = result.storage().write();
            let (s, acc) = (src_buffer.as_slice(), acc_buffer.as_mut_slice());
            for (i, j) in src.view().offsets().zip(accumulator.view().offsets()) {
                acc[j] = acc[j] + s[i];
            }
        }
        let reduced = result.squeeze(axis as isize)?;
        debug_assert_eq!(reduced.view(), &dst);
        Ok(reduced)
    }
}

#[cfg(test)]
mod tests {
    use crate::{shape, ErrorKind, InvariantError, Tensor, TensorError};

    fn grid() -> Tensor<f32> {
        Tensor::from_data([1., 2., 3., 4., 5., 6.], shape![2, 3])
    }

    #[test]
    fn test_sum_rows_and_columns() {
        let rows = grid().sum(1).unwrap();
        assert_eq!(rows.shape(), &shape![2]);
        assert_eq!(rows.to_vec(), vec![6., 15.]);

        let cols = grid().sum(0).unwrap();
        assert_eq!(cols.shape(), &shape![3]);
        assert_eq!(cols.to_vec(), vec![5., 7., 9.]);

        let last = grid().sum(-1).unwrap();
        assert_eq!(last.to_vec(), vec![6., 15.]);
    }

    #[test]
    fn test_sum_strided_source() {
        let t = grid().swap_axes(0, 1).unwrap();
        assert_eq!(t.sum(1).unwrap().to_vec(), vec![5., 7., 9.]);
    }

    #[test]
    fn test_sum_middle_axis() {
        let data: Vec<f32> = (0..24).map(|v| v as f32).collect();
        let t = Tensor::from_data(data, shape![2, 3, 4]);
        let s = t.sum(1).unwrap();
        assert_eq!(s.shape(), &shape![2, 4]);
        assert_eq!(s.get(&[0, 0]), 0. + 4. + 8.);
        assert_eq!(s.get(&[1, 3]), 15. + 19. + 23.);
    }

    #[test]
    fn test_sum_rejects() {
        let err = grid().sum(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Axis);

        let err = Tensor::<f32>::zeros(shape![4]).sum(0).unwrap_err();
        assert!(matches!(
            err,
            TensorError::InvariantError(InvariantError::RankTooLow { minimum: 2, .. })
        ));
    }
}
