use ndarray::{Array1, ArrayView1};
use crate::zdff::error::ZdffError;
/// Symmetric banded matrix stored by its lower bands: `bands[i * (p + 1) + k] = A[i][i - k]`.
#[derive(Clone, Debug)]
pub struct SymmetricBanded {
    n: usize,
    bandwidth: usize,
    bands: Vec<f64>,
}
impl SymmetricBanded {
    pub fn zeros(n: usize, bandwidth: usize) -> Self {
        Self {
            n,
            bandwidth,
            bands: vec![0.0; n * (bandwidth + 1)],
        }
    }
    /// `lambda * DᵀD` for the order-`order` forward difference operator on `n` points.
    pub fn difference_penalty(n: usize, order: usize, lambda: f64) -> Self {
        let mut matrix = Self::zeros(n, order);
        let coeffs = difference_coefficients(order);
        for row in 0..n.saturating_sub(order) {
            for (a, ca) in coeffs.iter().enumerate() {
                for (b, cb) in coeffs.iter().enumerate().take(a + 1) {
                    let k = a - b;
                    let idx = matrix.offset(row + a, k);
                    matrix.bands[idx] += lambda * ca * cb;
                }
            }
        }
        matrix
    }
    #[cfg(test)]
    fn get(&self, i: usize, j: usize) -> f64 {
        let (i, j) = if i >= j { (i, j) } else { (j, i) };
        let k = i - j;
        if k > self.bandwidth {
            0.0
        } else {
            self.bands[self.offset(i, k)]
        }
    }
    fn offset(&self, i: usize, k: usize) -> usize {
        i * (self.bandwidth + 1) + k
    }
    /// Returns a copy with `diagonal` added onto the main diagonal.
    pub fn with_added_diagonal(&self, diagonal: ArrayView1<'_, f64>) -> Self {
        let mut out = self.clone();
        for (i, d) in diagonal.iter().enumerate().take(self.n) {
            let idx = out.offset(i, 0);
            out.bands[idx] += d;
        }
        out
    }
    /// Solves `A x = rhs` by banded Cholesky factorization, consuming `self` as scratch space.
    pub fn solve(mut self, rhs: ArrayView1<'_, f64>) -> Result<Array1<f64>, ZdffError> {
        if rhs.len() != self.n {
            return Err(ZdffError::Solver(format!(
                "right-hand side has {} rows, matrix has {}",
                rhs.len(),
                self.n
            )));
        }
        let p = self.bandwidth;
        // In-place A = L Lᵀ, L stored over the lower bands.
        for i in 0..self.n {
            let j_start = i.saturating_sub(p);
            for j in j_start..=i {
                let mut sum = self.bands[self.offset(i, i - j)];
                let k_start = j_start.max(j.saturating_sub(p));
                for k in k_start..j {
                    sum -= self.bands[self.offset(i, i - k)] * self.bands[self.offset(j, j - k)];
                }
                if i == j {
                    if !(sum > 0.0) || !sum.is_finite() {
                        return Err(ZdffError::Solver(format!(
                            "matrix is not positive definite at row {i} (pivot {sum:e})"
                        )));
                    }
                    let idx = self.offset(i, 0);
                    self.bands[idx] = sum.sqrt();
                } else {
                    let idx = self.offset(i, i - j);
                    self.bands[idx] = sum / self.bands[self.offset(j, 0)];
                }
            }
        }
        // L y = rhs
        let mut x = rhs.to_owned();
        for i in 0..self.n {
            let mut sum = x[i];
            for k in i.saturating_sub(p)..i {
                sum -= self.bands[self.offset(i, i - k)] * x[k];
            }
            x[i] = sum / self.bands[self.offset(i, 0)];
        }
        // Lᵀ x = y
        for i in (0..self.n).rev() {
            let mut sum = x[i];
            for k in (i + 1)..(i + p + 1).min(self.n) {
                sum -= self.bands[self.offset(k, k - i)] * x[k];
            }
            x[i] = sum / self.bands[self.offset(i, 0)];
        }
        Ok(x)
    }
}
/// Signed binomial weights of the forward difference, e.g. `[1, -2, 1]` for order 2.
fn difference_coefficients(order: usize) -> Vec<f64> {
    let mut coeffs = vec![1.0];
    for _ in 0..order {
        let mut next = vec![0.0; coeffs.len() + 1];
        for (i, c) in coeffs.iter().enumerate() {
            next[i] -= c;
            next[i + 1] += c;
        }
        coeffs = next;
    }
    coeffs
}
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    #[test]
    fn difference_coefficients_are_binomial() {
        assert_eq!(difference_coefficients(1), vec![-1.0, 1.0]);
        assert_eq!(difference_coefficients(2), vec![1.0, -2.0, 1.0]);
        assert_eq!(difference_coefficients(3), vec![-1.0, 3.0, -3.0, 1.0]);
    }
    #[test]
    fn second_difference_penalty_has_expected_entries() {
        let m = SymmetricBanded::difference_penalty(6, 2, 1.0);
        let expected_diag = [1.0, 5.0, 6.0, 6.0, 5.0, 1.0];
        for (i, d) in expected_diag.iter().enumerate() {
            assert_eq!(m.get(i, i), *d);
        }
        assert_eq!(m.get(1, 0), -2.0);
        assert_eq!(m.get(2, 1), -4.0);
        assert_eq!(m.get(0, 2), 1.0);
        assert_eq!(m.get(0, 3), 0.0);
    }
    #[test]
    fn solves_against_dense_reference() {
        let weights = array![1.0, 0.5, 2.0, 0.0, 1.0, 3.0, 1.0];
        let matrix = SymmetricBanded::difference_penalty(7, 2, 0.7).with_added_diagonal(weights.view());
        let truth = array![1.0, -2.0, 0.5, 4.0, 3.0, -1.0, 0.25];
        let rhs = Array1::from_iter((0..7).map(|i| (0..7).map(|j| matrix.get(i, j) * truth[j]).sum::<f64>()));
        let x = matrix.solve(rhs.view()).unwrap();
        for (a, b) in x.iter().zip(truth.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }
    #[test]
    fn singular_system_is_reported() {
        // DᵀD alone annihilates constants.
        let matrix = SymmetricBanded::difference_penalty(5, 1, 1.0);
        let rhs = Array1::<f64>::ones(5);
        assert!(matches!(matrix.solve(rhs.view()), Err(ZdffError::Solver(_))));
    }
}
