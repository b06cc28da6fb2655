use super::utils::cpu_store_result;
use crate::{Binary, BinaryOp, CPUOperation, StorageView, Tensor, TensorDType, TensorError};

fn binary_fn<T: TensorDType>(op: BinaryOp) -> fn(T, T) -> T {
    match op {
        BinaryOp::Add => |lhs, rhs| lhs + rhs,
        BinaryOp::Sub => |lhs, rhs| lhs - rhs,
        BinaryOp::Mul => |lhs, rhs| lhs * rhs,
        BinaryOp::Div => |lhs, rhs| lhs / rhs,
    }
}

/// Applies `f` pairwise over two views of identical shape, in row-major order.
#[inline]
pub(crate) fn binary_map<T: TensorDType>(
    lhs: &Tensor<T>,
    rhs: &Tensor<T>,
    f: fn(T, T) -> T,
) -> Vec<T> {
    assert_eq!(lhs.shape(), rhs.shape());
    let lhs_buffer = lhs.storage().read_recursive();
    let rhs_buffer = rhs.storage().read_recursive();
    let (l, r) = (lhs_buffer.as_slice(), rhs_buffer.as_slice());
    lhs.view()
        .offsets()
        .zip(rhs.view().offsets())
        .map(|(i, j)| f(l[i], r[j]))
        .collect()
}

impl<T: TensorDType> CPUOperation<T> for Binary<T> {
    fn apply_cpu(&self, dst: StorageView) -> Result<Tensor<T>, TensorError> {
        let (lhs, rhs) = Tensor::broadcast_pair(&self.lhs, &self.rhs)?;
        let result = binary_map(&lhs, &rhs, binary_fn(self.op()));
        Ok(cpu_store_result(result, dst))
    }
}

#[cfg(test)]
mod tests {
    use crate::{shape, BinaryOp, ErrorKind, Tensor};
    use test_strategy::proptest;

    fn pair() -> (Tensor<f32>, Tensor<f32>) {
        (
            Tensor::from_data([1., 2., 3., 4.], shape![2, 2]),
            Tensor::from_data([5., 6., 7., 8.], shape![2, 2]),
        )
    }

    #[test]
    fn test_add_mul() {
        let (a, b) = pair();
        assert_eq!(a.add(&b).unwrap().to_vec(), vec![6., 8., 10., 12.]);
        assert_eq!(a.mul(&b).unwrap().to_vec(), vec![5., 12., 21., 32.]);
        assert_eq!(b.sub(&a).unwrap().to_vec(), vec![4., 4., 4., 4.]);
        assert_eq!(b.div(&a).unwrap().to_vec(), vec![5., 3., 7. / 3., 2.]);
    }

    #[test]
    fn test_broadcast_column() {
        let col = Tensor::<f32>::from_data([1., 2., 3.], shape![3, 1]);
        let rows = Tensor::<f32>::ones(shape![3, 4]);
        let out = col.add(&rows).unwrap();
        assert_eq!(out.shape(), &shape![3, 4]);
        assert_eq!(
            out.to_vec(),
            vec![2., 2., 2., 2., 3., 3., 3., 3., 4., 4., 4., 4.]
        );
        assert!(out.is_contiguous());
    }

    #[test]
    fn test_same_buffer_both_sides() {
        let a = Tensor::<f32>::from_data([1., 2., 3., 4.], shape![2, 2]);
        let t = a.swap_axes(0, 1).unwrap();
        let out = a.add(&t).unwrap();
        assert_eq!(out.to_vec(), vec![2., 5., 5., 8.]);
    }

    #[test]
    fn test_incompatible_shapes() {
        let a = Tensor::<f32>::zeros(shape![3, 2]);
        let b = Tensor::<f32>::zeros(shape![3, 4]);
        assert_eq!(a.add(&b).unwrap_err().kind(), ErrorKind::Broadcast);
        let c = Tensor::<f32>::zeros(shape![3]);
        assert_eq!(a.mul(&c).unwrap_err().kind(), ErrorKind::Broadcast);
    }

    #[test]
    fn test_operands_released() {
        let (a, b) = pair();
        let _ = a.add(&b).unwrap();
        assert_eq!(a.ref_count(), 1);
        assert_eq!(b.ref_count(), 1);
    }

    fn apply(lhs: &Tensor<f32>, rhs: &Tensor<f32>, op: BinaryOp) -> Vec<f32> {
        let out = match op {
            BinaryOp::Add => lhs.add(rhs),
            BinaryOp::Sub => lhs.sub(rhs),
            BinaryOp::Mul => lhs.mul(rhs),
            BinaryOp::Div => lhs.div(rhs),
        };
        out.unwrap().to_vec()
    }

    #[proptest(cases = 32)]
    fn test_binary_symmetry(
        op: BinaryOp,
        #[strategy(proptest::collection::vec(1f32..10f32, 24))] data: Vec<f32>,
    ) {
        let a = Tensor::from_data(&data[..12], shape![3, 4]);
        let b = Tensor::from_data(&data[12..], shape![3, 4]);
        let ab = apply(&a, &b, op);
        let ba = apply(&b, &a, op);
        match op {
            BinaryOp::Add | BinaryOp::Mul => assert_eq!(ab, ba),
            BinaryOp::Sub => ab.iter().zip(&ba).for_each(|(x, y)| assert_eq!(*x, -*y)),
            BinaryOp::Div => ab
                .iter()
                .zip(&ba)
                .for_each(|(x, y)| assert!((x * y - 1.0).abs() < 1e-5)),
        }
    }
}
