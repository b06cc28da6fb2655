use crate::{CPUOperation, Inverse, PivotPolicy, StorageView, Tensor, TensorDType, TensorError};

/// Gauss-Jordan elimination of one row-major `n x n` matrix.
///
/// `a` is consumed in place, `inv` receives the inverse. Pivots are not
/// searched beyond a single swap for rows whose diagonal starts at zero.
/// On a zero pivot the row is returned as the error under
/// [`PivotPolicy::Checked`].
fn gauss_jordan<T: TensorDType>(
    a: &mut [T],
    inv: &mut [T],
    n: usize,
    policy: PivotPolicy,
) -> Result<(), usize> {
    for i in 0..n {
        inv[i * n + i] = T::one();
    }

    for i in 0..n {
        if a[i * n + i] != T::zero() {
            continue;
        }
        let swap = (0..n).find(|&ii| {
            ii != i && a[i * n + ii] != T::zero() && a[ii * n + i] != T::zero()
        });
        if let Some(ii) = swap {
            log::debug!("Swapping rows {} and {} for a non-zero pivot", i, ii);
            for j in 0..n {
                a.swap(i * n + j, ii * n + j);
                inv.swap(i * n + j, ii * n + j);
            }
        }
    }

    for i in 0..n {
        for k in 0..i {
            let x = a[i * n + k];
            for j in 0..n {
                a[i * n + j] = a[i * n + j] - x * a[k * n + j];
                inv[i * n + j] = inv[i * n + j] - x * inv[k * n + j];
            }
        }

        let pivot = a[i * n + i];
        if pivot == T::zero() {
            match policy {
                PivotPolicy::Checked => return Err(i),
                PivotPolicy::Unchecked => log::warn!("Zero pivot in row {}", i),
            }
        }
        let x = T::one() / pivot;
        for j in 0..n {
            a[i * n + j] = a[i * n + j] * x;
            inv[i * n + j] = inv[i * n + j] * x;
        }
    }

    for i in (1..n).rev() {
        for ii in (0..i).rev() {
            let x = a[ii * n + i];
            for j in 0..n {
                a[ii * n + j] = a[ii * n + j] - x * a[i * n + j];
                inv[ii * n + j] = inv[ii * n + j] - x * inv[i * n + j];
            }
        }
    }
    Ok(())
}

impl<T: TensorDType> CPUOperation<T> for Inverse<T> {
    fn apply_cpu(&self, dst: StorageView) -> Result<Tensor<T>, TensorError> {
        let n = self.src.shape()[self.src.rank() - 1];
        let mut input = self.src.to_vec();
        let mut output = vec![T::zero(); input.len()];

        let chunk = n * n;
        if chunk > 0 {
            for (batch, (a, inv)) in input
                .chunks_exact_mut(chunk)
                .zip(output.chunks_exact_mut(chunk))
                .enumerate()
            {
                gauss_jordan(a, inv, n, self.policy())
                    .map_err(|row| TensorError::SingularMatrix { batch, row })?;
            }
        }
        Ok(super::utils::cpu_store_result(output, dst))
    }
}
