use crate::{rvec, RVec, Shape};

/// Per-dimension distance, in elements, between neighbouring positions.
///
/// A stride of 0 marks a broadcast dimension.
#[derive(Clone, PartialEq, Eq, Default, Hash)]
pub struct Strides(RVec<isize>);

impl Strides {
    pub fn new(strides: RVec<isize>) -> Self {
        Self(strides)
    }

    pub fn inner(&self) -> &RVec<isize> {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<isize> {
        self.0.to_vec()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, isize> {
        self.0.iter()
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, index: usize, stride: isize) {
        self.0.insert(index, stride);
    }

    pub fn remove(&mut self, index: usize) -> isize {
        self.0.remove(index)
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.0.swap(a, b);
    }
}

impl std::fmt::Debug for Strides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut shape = format!("[{}", self.0.first().unwrap_or(&0));
        for dim in self.0.iter().skip(1) {
            shape.push_str(&format!("x{}", dim));
        }
        write!(f, "{}]", shape)
    }
}

impl std::fmt::Display for Strides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl std::ops::Index<usize> for Strides {
    type Output = isize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl std::ops::IndexMut<usize> for Strides {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl FromIterator<isize> for Strides {
    fn from_iter<I: IntoIterator<Item = isize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<isize>> for Strides {
    fn from(strides: Vec<isize>) -> Self {
        Self(strides.into())
    }
}

/// Row-major strides for a contiguous layout of `shape`.
impl From<&Shape> for Strides {
    fn from(shape: &Shape) -> Self {
        let mut strides = rvec![];
        let mut stride = 1;
        for size in shape.inner().iter().rev() {
            strides.push(stride);
            stride *= *size as isize;
        }
        strides.reverse();
        Self(strides)
    }
}
