mod cpu_buffer;

pub use cpu_buffer::*;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::{Arc, Weak};

use crate::TensorDType;

/// Shared handle to a [`CPUBuffer`].
///
/// Every clone is another holder of the same buffer. The buffer is released
/// when the last holder drops, no matter which view created it.
#[derive(Debug)]
pub struct Storage<T: TensorDType> {
    inner: Arc<RwLock<CPUBuffer<T>>>,
}

impl<T: TensorDType> Storage<T> {
    pub fn new(buffer: CPUBuffer<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(buffer)),
        }
    }

    pub fn allocate(len: usize, fill: Fill<T>) -> Self {
        Self::new(CPUBuffer::allocate(len, fill))
    }

    pub fn from_slice(data: &[T]) -> Self {
        Self::new(CPUBuffer::from_slice(data))
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read(&self) -> RwLockReadGuard<'_, CPUBuffer<T>> {
        self.inner.read()
    }

    /// Shared access that never blocks behind a queued writer.
    ///
    /// Operations reading both operands from the same buffer take two of
    /// these on one thread.
    pub fn read_recursive(&self) -> RwLockReadGuard<'_, CPUBuffer<T>> {
        self.inner.read_recursive()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, CPUBuffer<T>> {
        self.inner.write()
    }

    /// Number of live holders of this buffer.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakStorage<T> {
        WeakStorage {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn dump(&self, full: bool) -> String {
        self.read().dump(full)
    }
}

impl<T: TensorDType> Clone for Storage<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Observes a buffer without keeping it alive.
#[derive(Debug, Clone)]
pub struct WeakStorage<T: TensorDType> {
    inner: Weak<RwLock<CPUBuffer<T>>>,
}

impl<T: TensorDType> WeakStorage<T> {
    pub fn is_released(&self) -> bool {
        self.inner.strong_count() == 0
    }

    pub fn upgrade(&self) -> Option<Storage<T>> {
        self.inner.upgrade().map(|inner| Storage { inner })
    }
}
