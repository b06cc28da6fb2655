use crate::{rvec, RVec, Shape, Strides};

/// Odometer over a strided view.
///
/// Walks every logical index of `shape` in row-major order (last axis
/// fastest), tracking the buffer offset incrementally.
#[derive(Debug, Clone)]
pub struct Cursor {
    shape: Shape,
    strides: Strides,
    index: RVec<usize>,
    offset: isize,
    position: usize,
    exhausted: bool,
}

impl Cursor {
    pub fn new(shape: &Shape, strides: &Strides) -> Self {
        assert_eq!(shape.rank(), strides.rank());
        Self {
            shape: shape.clone(),
            strides: strides.clone(),
            index: rvec![0; shape.rank()],
            offset: 0,
            position: 0,
            exhausted: shape.numel() == 0,
        }
    }

    pub fn reset(&mut self) {
        self.index.iter_mut().for_each(|i| *i = 0);
        self.offset = 0;
        self.position = 0;
        self.exhausted = self.shape.numel() == 0;
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn offset(&self) -> isize {
        self.offset
    }

    /// Row-major position of the current index.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn remaining(&self) -> usize {
        if self.exhausted {
            0
        } else {
            self.shape.numel() - self.position
        }
    }

    /// Steps to the next index.
    ///
    /// Returns the displacement from the previous offset, or `None` once the
    /// index wraps back to all zeros.
    pub fn advance(&mut self) -> Option<isize> {
        if self.exhausted {
            return None;
        }
        let mut displacement = 0;
        for axis in (0..self.shape.rank()).rev() {
            self.index[axis] += 1;
            displacement += self.strides[axis];
            if self.index[axis] < self.shape[axis] {
                self.offset += displacement;
                self.position += 1;
                return Some(displacement);
            }
            displacement -= self.strides[axis] * self.shape[axis] as isize;
            self.index[axis] = 0;
        }
        self.offset = 0;
        self.position = self.shape.numel();
        self.exhausted = true;
        None
    }
}

/// Buffer offsets of a view, in row-major order.
#[derive(Debug, Clone)]
pub struct Offsets {
    cursor: Cursor,
}

impl Offsets {
    pub fn new(shape: &Shape, strides: &Strides) -> Self {
        Self {
            cursor: Cursor::new(shape, strides),
        }
    }

    pub fn reset(&mut self) {
        self.cursor.reset();
    }
}

impl Iterator for Offsets {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.is_exhausted() {
            return None;
        }
        let offset = self.cursor.offset() as usize;
        self.cursor.advance();
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Offsets {}

/// Logical index tuples of a view, in row-major order.
#[derive(Debug, Clone)]
pub struct Indices {
    cursor: Cursor,
}

impl Indices {
    pub fn new(shape: &Shape) -> Self {
        Self {
            cursor: Cursor::new(shape, &Strides::from(shape)),
        }
    }

    pub fn reset(&mut self) {
        self.cursor.reset();
    }
}

impl Iterator for Indices {
    type Item = RVec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.is_exhausted() {
            return None;
        }
        let index = self.cursor.index().into();
        self.cursor.advance();
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Indices {}
