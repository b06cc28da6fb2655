use crate::cpu::{materialize, CPUOperation};
use crate::{
    ops::*, shape, DType, Elem, Enforcer, ErrorKind, Fill, Indices, InvariantError, Offsets,
    RVec, Shape, Storage, Strides, TensorDType,
};

use derive_new::new;

#[cfg(feature = "rand")]
use {rand::prelude::*, rand_distr::StandardNormal};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error(transparent)]
    InvariantError(#[from] InvariantError),
    #[error("Matrix {batch} is singular, no usable pivot for row {row}.")]
    SingularMatrix { batch: usize, row: usize },
}

impl TensorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TensorError::InvariantError(e) => e.kind(),
            TensorError::SingularMatrix { .. } => ErrorKind::Singular,
        }
    }
}

/// Tensors are just a view into their underlying storage.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct StorageView {
    shape: Shape,
    strides: Strides,
}

impl StorageView {
    /// Row-major view of `shape` over a dense buffer.
    pub fn contiguous(shape: Shape) -> Self {
        let strides = Strides::from(&shape);
        Self { shape, strides }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &Strides {
        &self.strides
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    /// Size-1 dimensions may carry any stride.
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 1;
        for (&size, &stride) in self.shape.iter().zip(self.strides.iter()).rev() {
            if size == 1 {
                continue;
            }
            if stride != expected {
                return false;
            }
            expected *= size as isize;
        }
        true
    }

    /// Buffer offset of a logical index.
    ///
    /// # Panics
    ///
    /// If `index` does not have one in-range component per dimension.
    pub fn offset_of(&self, index: &[usize]) -> usize {
        assert_eq!(
            index.len(),
            self.rank(),
            "Index {:?} does not match shape {}",
            index,
            self.shape
        );
        let offset = index
            .iter()
            .zip(self.shape.iter().zip(self.strides.iter()))
            .enumerate()
            .fold(0isize, |acc, (axis, (&i, (&size, &stride)))| {
                assert!(
                    i < size,
                    "Index {} out of bounds for axis {} with size {}",
                    i,
                    axis,
                    size
                );
                acc + i as isize * stride
            });
        offset as usize
    }

    pub fn offsets(&self) -> Offsets {
        Offsets::new(&self.shape, &self.strides)
    }
}

/// A strided view over shared storage.
///
/// Cloning a tensor creates another view over the same buffer. Writes through
/// [`Tensor::set`] are visible through every view of that buffer.
#[derive(Clone)]
pub struct Tensor<T: TensorDType = Elem> {
    view: StorageView,
    storage: Storage<T>,
}

impl<T: TensorDType> Tensor<T> {
    pub(crate) fn new(view: StorageView, storage: Storage<T>) -> Self {
        Self { view, storage }
    }

    /// Another view over this tensor's storage.
    pub(crate) fn alias(&self, view: StorageView) -> Self {
        Self::new(view, self.storage.clone())
    }

    pub fn view(&self) -> &StorageView {
        &self.view
    }

    pub fn shape(&self) -> &Shape {
        &self.view.shape
    }

    pub fn strides(&self) -> &Strides {
        &self.view.strides
    }

    pub fn rank(&self) -> usize {
        self.view.rank()
    }

    pub fn numel(&self) -> usize {
        self.view.numel()
    }

    pub fn dt(&self) -> DType {
        T::dt()
    }

    pub fn storage(&self) -> &Storage<T> {
        &self.storage
    }

    /// Number of views currently holding this tensor's buffer.
    pub fn ref_count(&self) -> usize {
        self.storage.ref_count()
    }

    pub fn shares_storage(&self, other: &Tensor<T>) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    pub fn is_contiguous(&self) -> bool {
        self.view.is_contiguous()
    }

    fn apply_op<O: CPUOperation<T>>(op: O) -> Result<Self, TensorError> {
        op.check_invariants()?;
        let view = op.compute_view()?;
        log::trace!(
            "{} -> shape {} strides {}",
            op.name(),
            view.shape(),
            view.strides()
        );
        op.apply_cpu(view)
    }
}

/// Constructors
impl<T: TensorDType> Tensor<T> {
    fn filled(shape: Shape, fill: Fill<T>) -> Self {
        let storage = Storage::allocate(shape.numel(), fill);
        Self::new(StorageView::contiguous(shape), storage)
    }

    pub fn zeros(shape: Shape) -> Self {
        Self::filled(shape, Fill::Zeros)
    }

    pub fn ones(shape: Shape) -> Self {
        Self::filled(shape, Fill::Ones)
    }

    pub fn full(value: T, shape: Shape) -> Self {
        Self::filled(shape, Fill::Value(value))
    }

    /// One element, with every one of `rank` dimensions of size 1.
    pub fn single(value: T, rank: usize) -> Self {
        Self::full(value, Shape::new(crate::rvec![1; rank]))
    }

    /// Identity matrix of shape `[size, size]`.
    pub fn eye(size: usize) -> Self {
        let mut data = vec![T::zero(); size * size];
        for i in 0..size {
            data[i * size + i] = T::one();
        }
        Self::from_data(data, shape![size, size])
    }

    /// Creates a new tensor from a chunk of data, laid out row-major.
    ///
    /// # Panics
    ///
    /// If the data length does not match the element count of `shape`.
    pub fn from_data<U: AsRef<[T]>>(data: U, shape: Shape) -> Self {
        let data = data.as_ref();
        assert_eq!(
            data.len(),
            shape.numel(),
            "{} elements cannot fill shape {}",
            data.len(),
            shape
        );
        Self::new(StorageView::contiguous(shape), Storage::from_slice(data))
    }

    /// Creates a new tensor from native-endian element bytes.
    ///
    /// # Panics
    ///
    /// If the byte length does not match the element count of `shape`.
    pub fn from_bytes(bytes: &[u8], shape: Shape) -> Self {
        assert_eq!(
            bytes.len(),
            shape.numel() * T::dt().size_of(),
            "{} bytes cannot fill shape {} of {}",
            bytes.len(),
            shape,
            T::dt()
        );
        let buffer = crate::CPUBuffer::from_bytes(bytes);
        Self::new(StorageView::contiguous(shape), Storage::new(buffer))
    }

    #[cfg(feature = "rand")]
    pub fn randn(shape: Shape) -> Self {
        Self::randn_with(shape, &mut rand::thread_rng())
    }

    /// Standard normal samples drawn from `rng`.
    #[cfg(feature = "rand")]
    pub fn randn_with<R: Rng + ?Sized>(shape: Shape, rng: &mut R) -> Self {
        let data = (0..shape.numel())
            .map(|_| {
                let sample: f32 = StandardNormal.sample(&mut *rng);
                <T as num_traits::NumCast>::from(sample).unwrap_or_else(T::zero)
            })
            .collect::<Vec<_>>();
        Self::from_data(data, shape)
    }
}

/// Element access and copies
impl<T: TensorDType> Tensor<T> {
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn get(&self, index: &[usize]) -> T {
        let offset = self.view.offset_of(index);
        self.storage.read().as_slice()[offset]
    }

    /// Writes one element. Every view sharing this buffer observes the write,
    /// including every position a broadcast view maps onto the same cell.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn set(&self, index: &[usize], value: T) {
        let offset = self.view.offset_of(index);
        self.storage.write().as_mut_slice()[offset] = value;
    }

    /// Elements in row-major logical order.
    pub fn to_vec(&self) -> Vec<T> {
        materialize(self)
    }

    /// A contiguous copy with its own buffer.
    pub fn deep_clone(&self) -> Tensor<T> {
        Tensor::from_data(materialize(self), self.shape().clone())
    }

    /// This view if it is already row-major contiguous, otherwise a copy.
    pub fn contiguous(&self) -> Result<Tensor<T>, TensorError> {
        if self.is_contiguous() {
            Ok(self.clone())
        } else {
            log::debug!(
                "Materializing {} view with strides {}",
                self.shape(),
                self.strides()
            );
            Ok(self.deep_clone())
        }
    }
}

/// Shape algebra
impl<T: TensorDType> Tensor<T> {
    /// One entry of `dims` may be negative and is inferred from the element
    /// count. Strides are kept when the new shape can be expressed over the
    /// existing layout, otherwise the data is copied.
    pub fn reshape(&self, dims: &[isize]) -> Result<Tensor<T>, TensorError> {
        Self::apply_op(Reshape::new(self.clone(), dims.into()))
    }

    pub fn permute(&self, dims: &[usize]) -> Result<Tensor<T>, TensorError> {
        Self::apply_op(Permute::new(self.clone(), dims.into()))
    }

    pub fn swap_axes(&self, a: isize, b: isize) -> Result<Tensor<T>, TensorError> {
        let rank = self.rank();
        let a = Enforcer::normalize_axis(a, rank)?;
        let b = Enforcer::normalize_axis(b, rank)?;
        let mut dims: RVec<usize> = (0..rank).collect();
        dims.swap(a, b);
        self.permute(&dims)
    }

    /// Inserts a size-1 dimension, `axis` counted against `rank + 1`.
    pub fn expand_dims(&self, axis: isize) -> Result<Tensor<T>, TensorError> {
        Self::apply_op(ExpandDims::new(self.clone(), axis))
    }

    pub fn squeeze(&self, axis: isize) -> Result<Tensor<T>, TensorError> {
        Self::apply_op(Squeeze::new(self.clone(), axis))
    }

    pub fn broadcast_to(&self, to: Shape) -> Result<Tensor<T>, TensorError> {
        Self::apply_op(Broadcast::new(self.clone(), to))
    }

    /// Broadcasts two equal-rank tensors against each other.
    pub fn broadcast_pair(
        lhs: &Tensor<T>,
        rhs: &Tensor<T>,
    ) -> Result<(Tensor<T>, Tensor<T>), TensorError> {
        let to = Shape::broadcast_pair(lhs.shape(), rhs.shape())?;
        Ok((lhs.broadcast_to(to.clone())?, rhs.broadcast_to(to)?))
    }
}

/// Arithmetic
impl<T: TensorDType> Tensor<T> {
    fn binary(&self, other: &Tensor<T>, op: BinaryOp) -> Result<Tensor<T>, TensorError> {
        Self::apply_op(Binary::new(self.clone(), other.clone(), op))
    }

    pub fn add(&self, other: &Tensor<T>) -> Result<Tensor<T>, TensorError> {
        self.binary(other, BinaryOp::Add)
    }

    pub fn sub(&self, other: &Tensor<T>) -> Result<Tensor<T>, TensorError> {
        self.binary(other, BinaryOp::Sub)
    }

    pub fn mul(&self, other: &Tensor<T>) -> Result<Tensor<T>, TensorError> {
        self.binary(other, BinaryOp::Mul)
    }

    pub fn div(&self, other: &Tensor<T>) -> Result<Tensor<T>, TensorError> {
        self.binary(other, BinaryOp::Div)
    }

    /// Sums over `axis`, removing it.
    pub fn sum(&self, axis: isize) -> Result<Tensor<T>, TensorError> {
        Self::apply_op(Sum::new(self.clone(), axis))
    }

    /// Batched matrix product over the trailing two dimensions.
    pub fn matmul(&self, other: &Tensor<T>) -> Result<Tensor<T>, TensorError> {
        Self::apply_op(Matmul::new(self.clone(), other.clone()))
    }

    /// Batched inverse over the trailing two dimensions.
    pub fn inverse(&self) -> Result<Tensor<T>, TensorError> {
        self.inverse_with(PivotPolicy::default())
    }

    pub fn inverse_with(&self, policy: PivotPolicy) -> Result<Tensor<T>, TensorError> {
        Self::apply_op(Inverse::new(self.clone(), policy))
    }
}

impl<T: TensorDType> std::fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("dt", &self.dt())
            .field("shape", self.shape())
            .field("strides", self.strides())
            .field("storage", &self.storage.dump(false))
            .finish()
    }
}

impl<T: TensorDType> Tensor<T> {
    pub fn all_close(&self, other: &Self, atol: f64, rtol: f64) -> anyhow::Result<()> {
        if self.shape() != other.shape() {
            anyhow::bail!("Shape mismatch {:?} != {:?}", self.shape(), other.shape())
        }

        let mut stats = CloseStats::new(atol, rtol);
        for idx in Indices::new(self.shape()) {
            let (a, b) = (self.get(&idx), other.get(&idx));
            stats.update(
                a.to_f64().unwrap_or(f64::NAN),
                b.to_f64().unwrap_or(f64::NAN),
                idx,
            );
        }

        if stats.fail_count > 0 {
            anyhow::bail!(
                "{} samples not close - AVGE={} MAE={} at {:?}",
                stats.fail_count,
                stats.avg_error(),
                stats.max_abs_error,
                stats.max_abs_error_idxs,
            );
        }
        log::debug!(
            "All close - AVGE={} MAE={} at {:?}",
            stats.avg_error(),
            stats.max_abs_error,
            stats.max_abs_error_idxs
        );
        Ok(())
    }
}

struct CloseStats {
    total_error: f64,
    max_abs_error: f64,
    max_abs_error_idxs: Option<RVec<usize>>,
    element_count: usize,
    fail_count: usize,
    atol: f64,
    rtol: f64,
}

impl CloseStats {
    fn new(atol: f64, rtol: f64) -> Self {
        Self {
            total_error: 0.0,
            max_abs_error: 0.0,
            max_abs_error_idxs: None,
            element_count: 0,
            fail_count: 0,
            atol,
            rtol,
        }
    }

    fn update(&mut self, a: f64, b: f64, index: RVec<usize>) {
        let abs_diff = (a - b).abs();
        self.element_count += 1;

        if abs_diff.is_finite() {
            self.total_error += abs_diff;
            if abs_diff > self.max_abs_error {
                self.max_abs_error = abs_diff;
                self.max_abs_error_idxs = Some(index);
            }
        }

        if !self.is_close(a, b, abs_diff) {
            self.fail_count += 1;
        }
    }

    fn avg_error(&self) -> f64 {
        self.total_error / self.element_count.max(1) as f64
    }

    fn is_close(&self, a: f64, b: f64, abs_diff: f64) -> bool {
        (a.is_nan() && b.is_nan())
            || (a.is_infinite() && b.is_infinite() && a.signum() == b.signum())
            || abs_diff <= self.atol + self.rtol * b.abs()
    }
}
