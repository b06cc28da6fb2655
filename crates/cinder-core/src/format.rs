use std::fmt;

use crate::{Offsets, Shape, Tensor, TensorDType};

const INDENT: &str = "   ";

/// Nested rendering of a tensor's logical contents.
///
/// Starts with the shape and strides, then one bracketed row per innermost
/// vector. Values print with four decimals unless the formatter asks for a
/// different precision.
impl<T: TensorDType> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(4);
        writeln!(f, "Shape: {}", self.shape())?;
        writeln!(f, "Steps: {}", self.strides())?;

        let buffer = self.storage().read_recursive();
        let data = buffer.as_slice();
        let mut offsets = self.view().offsets();
        if self.rank() == 0 {
            let offset = offsets.next().ok_or(fmt::Error)?;
            return writeln!(f, "[{:.*}]", precision, data[offset]);
        }
        write_nested(f, self.shape(), 0, &mut offsets, data, precision)
    }
}

fn write_nested<T: TensorDType>(
    f: &mut fmt::Formatter<'_>,
    shape: &Shape,
    depth: usize,
    offsets: &mut Offsets,
    data: &[T],
    precision: usize,
) -> fmt::Result {
    let indent = INDENT.repeat(depth);
    if depth == shape.rank() - 1 {
        write!(f, "{}[", indent)?;
        for i in 0..shape[depth] {
            if i > 0 {
                write!(f, ", ")?;
            }
            let offset = offsets.next().ok_or(fmt::Error)?;
            write!(f, "{:.*}", precision, data[offset])?;
        }
        return writeln!(f, "]");
    }

    writeln!(f, "{}[", indent)?;
    for _ in 0..shape[depth] {
        write_nested(f, shape, depth + 1, offsets, data, precision)?;
    }
    writeln!(f, "{}]", indent)
}

#[cfg(test)]
mod tests {
    use crate::{shape, Tensor};

    #[test]
    fn test_matrix() {
        let a = Tensor::<f32>::from_data([1., 2., 3., 4.], shape![2, 2]);
        let expected = "Shape: [2, 2]\nSteps: [2, 1]\n[\n   [1.0000, 2.0000]\n   [3.0000, 4.0000]\n]\n";
        assert_eq!(a.to_string(), expected);
    }

    #[test]
    fn test_vector_and_precision() {
        let a = Tensor::<f64>::from_data([0.5, -1.25], shape![2]);
        assert_eq!(a.to_string(), "Shape: [2]\nSteps: [1]\n[0.5000, -1.2500]\n");
        assert_eq!(format!("{:.1}", a), "Shape: [2]\nSteps: [1]\n[0.5, -1.2]\n");
    }

    #[test]
    fn test_strided_nesting() {
        let a = Tensor::<f32>::from_data([1., 2., 3., 4.], shape![2, 2]);
        let t = a.swap_axes(0, 1).unwrap().expand_dims(0).unwrap();
        let expected = "Shape: [1, 2, 2]\nSteps: [2, 1, 2]\n[\n   [\n      [1.0000, 3.0000]\n      [2.0000, 4.0000]\n   ]\n]\n";
        assert_eq!(t.to_string(), expected);
    }

    #[test]
    fn test_unit_axis_stride_shown_as_stored() {
        let a = Tensor::<f32>::from_data([1., 2., 3., 4., 5., 6.], shape![2, 3]);
        let t = a.expand_dims(1).unwrap();
        assert!(t.to_string().starts_with("Shape: [2, 1, 3]\nSteps: [3, 3, 1]\n"));
    }

    #[test]
    fn test_scalar() {
        let s = Tensor::<f32>::full(2.0, shape![]);
        assert_eq!(s.to_string(), "Shape: []\nSteps: []\n[2.0000]\n");
    }
}
