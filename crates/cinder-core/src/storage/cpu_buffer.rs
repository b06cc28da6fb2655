use crate::TensorDType;

/// How a freshly allocated buffer is initialised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill<T: TensorDType> {
    Zeros,
    Ones,
    Value(T),
}

/// Managed CPU buffer
///
/// A flat, fixed-length run of elements. Allocation failure aborts the
/// process, as every other Rust allocation does.
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct CPUBuffer<T: TensorDType> {
    inner: Vec<T>,
}

impl<T: TensorDType> CPUBuffer<T> {
    pub fn allocate(len: usize, fill: Fill<T>) -> Self {
        let value = match fill {
            Fill::Zeros => T::zero(),
            Fill::Ones => T::one(),
            Fill::Value(v) => v,
        };
        Self::new(vec![value; len])
    }

    pub fn from_slice(data: &[T]) -> Self {
        Self::new(data.to_vec())
    }

    /// Reinterprets native-endian element bytes.
    ///
    /// # Panics
    ///
    /// If `bytes` is not a whole number of elements.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(
            bytes.len() % std::mem::size_of::<T>(),
            0,
            "{} bytes is not a whole number of {} elements",
            bytes.len(),
            T::dt()
        );
        Self::new(bytemuck::pod_collect_to_vec(bytes))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn n_bytes(&self) -> usize {
        self.len() * T::dt().size_of()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.inner
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.inner
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.inner)
    }

    pub fn dump(&self, full: bool) -> String {
        let data = self.as_slice();
        let length = if data.len() < 64 { data.len() } else { 64 };
        if full || data.len() <= 2 * length {
            format!("{:?}", data)
        } else {
            format!("{:?}...{:?}", &data[..length], &data[data.len() - length..])
        }
    }
}

impl<T: TensorDType> Drop for CPUBuffer<T> {
    fn drop(&mut self) {
        log::trace!("Releasing buffer of {} {} elements", self.len(), T::dt());
    }
}
