use rand::Rng;
use std::f64::consts::PI;
use std::ops::AddAssign;

/// Dense row-major matrix. Rows are samples, columns are features.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![0.0; rows * cols]
        }
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix { rows, cols, data: vec![value; rows * cols] }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Matrix {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            assert_eq!(row.len(), n_cols, "Matrix::from_rows: ragged rows");
            data.extend(row);
        }
        Matrix { rows: n_rows, cols: n_cols, data }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Both uniforms in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He (Kaiming) initialization: samples from N(0, sqrt(2 / fan_in)).
    ///
    /// Recommended before ReLU layers. The variance 2/fan_in accounts for
    /// the fact that ReLU zeroes half of its inputs on average.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, fan_in: usize, rng: &mut R) -> Matrix {
        let std_dev = (2.0 / fan_in as f64).sqrt();
        let data = (0..rows * cols)
            .map(|_| Matrix::sample_standard_normal(rng) * std_dev)
            .collect();
        Matrix { rows, cols, data }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let cols = self.cols;
        &mut self.data[row * cols..(row + 1) * cols]
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// `self · rhs`
    pub fn matmul(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.cols, rhs.rows,
            "matmul: ({}x{}) · ({}x{})", self.rows, self.cols, rhs.rows, rhs.cols
        );
        let mut res = Matrix::zeros(self.rows, rhs.cols);

        // i-k-j order keeps the inner loop on contiguous rows.
        for i in 0..self.rows {
            let out = &mut res.data[i * rhs.cols..(i + 1) * rhs.cols];
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                if a == 0.0 {
                    continue;
                }
                let rhs_row = &rhs.data[k * rhs.cols..(k + 1) * rhs.cols];
                for (o, &b) in out.iter_mut().zip(rhs_row) {
                    *o += a * b;
                }
            }
        }

        res
    }

    /// Accumulates `lhsᵀ · rhs` into `self` without materialising the
    /// transpose or a temporary product.
    pub fn add_matmul_transpose_a(&mut self, lhs: &Matrix, rhs: &Matrix) {
        assert_eq!(
            lhs.rows, rhs.rows,
            "add_matmul_transpose_a: ({}x{})ᵀ · ({}x{})", lhs.rows, lhs.cols, rhs.rows, rhs.cols
        );
        assert_eq!(
            self.shape(), (lhs.cols, rhs.cols),
            "add_matmul_transpose_a: accumulator shape mismatch"
        );

        for k in 0..lhs.rows {
            let lhs_row = lhs.row(k);
            let rhs_row = rhs.row(k);
            for (i, &a) in lhs_row.iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                let out = &mut self.data[i * rhs.cols..(i + 1) * rhs.cols];
                for (o, &b) in out.iter_mut().zip(rhs_row) {
                    *o += a * b;
                }
            }
        }
    }

    /// `self · rhsᵀ` without materialising the transpose.
    pub fn matmul_transpose_b(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.cols, rhs.cols,
            "matmul_transpose_b: ({}x{}) · ({}x{})ᵀ", self.rows, self.cols, rhs.rows, rhs.cols
        );
        let mut res = Matrix::zeros(self.rows, rhs.rows);

        for i in 0..self.rows {
            let lhs_row = self.row(i);
            for j in 0..rhs.rows {
                res.data[i * rhs.rows + j] = lhs_row.iter()
                    .zip(rhs.row(j))
                    .map(|(a, b)| a * b)
                    .sum();
            }
        }

        res
    }

    /// Adds a 1×cols row vector to every row.
    pub fn add_row(&self, row: &Matrix) -> Matrix {
        assert_eq!(row.rows, 1, "add_row expects a single row");
        assert_eq!(self.cols, row.cols, "add_row: column count mismatch");
        let mut res = self.clone();
        for i in 0..res.rows {
            for (x, &b) in res.row_mut(i).iter_mut().zip(&row.data) {
                *x += b;
            }
        }
        res
    }

    /// Column-wise sum, returned as a 1×cols matrix.
    pub fn sum_rows(&self) -> Matrix {
        let mut res = Matrix::zeros(1, self.cols);
        for i in 0..self.rows {
            for (acc, &x) in res.data.iter_mut().zip(self.row(i)) {
                *acc += x;
            }
        }
        res
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.shape(), rhs.shape(), "hadamard: shape mismatch");
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&rhs.data).map(|(a, b)| a * b).collect(),
        }
    }

    /// Index of the maximum element of `row`. Ties resolve to the first index.
    pub fn argmax_row(&self, row: usize) -> usize {
        let mut best = 0;
        let values = self.row(row);
        for (i, &v) in values.iter().enumerate() {
            if v > values[best] {
                best = i;
            }
        }
        best
    }
}

impl AddAssign<&Matrix> for Matrix {
    fn add_assign(&mut self, rhs: &Matrix) {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        for (a, &b) in self.data.iter_mut().zip(&rhs.data) {
            *a += b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows)
    }

    fn transpose(a: &Matrix) -> Matrix {
        let mut res = Matrix::zeros(a.cols, a.rows);
        for i in 0..a.rows {
            for j in 0..a.cols {
                res.set(j, i, a.get(i, j));
            }
        }
        res
    }

    #[test]
    fn matmul_matches_hand_computation() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![5.0, 6.0, 7.0], vec![8.0, 9.0, 10.0]]);
        let c = a.matmul(&b);
        assert_eq!(c, m(vec![vec![21.0, 24.0, 27.0], vec![47.0, 54.0, 61.0]]));
    }

    #[test]
    fn transposed_products_agree_with_explicit_transpose() {
        let a = m(vec![vec![1.0, -2.0, 0.5], vec![3.0, 0.0, 4.0]]);
        let b = m(vec![vec![2.0, 1.0], vec![-1.0, 3.0]]);
        let mut at_b = Matrix::zeros(3, 2);
        at_b.add_matmul_transpose_a(&a, &b);
        assert_eq!(at_b, transpose(&a).matmul(&b));

        let c = m(vec![vec![0.0, 1.0, 2.0], vec![1.0, 1.0, 1.0], vec![5.0, -1.0, 2.0]]);
        assert_eq!(a.matmul_transpose_b(&c), a.matmul(&transpose(&c)));
    }

    #[test]
    fn add_row_and_sum_rows() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![10.0, 20.0]]);
        assert_eq!(a.add_row(&b), m(vec![vec![11.0, 22.0], vec![13.0, 24.0]]));
        assert_eq!(a.sum_rows(), m(vec![vec![4.0, 6.0]]));
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        let a = m(vec![vec![1.0, 3.0, 3.0], vec![-1.0, -5.0, -2.0]]);
        assert_eq!(a.argmax_row(0), 1);
        assert_eq!(a.argmax_row(1), 0);
    }

    #[test]
    fn he_init_is_seeded_and_scaled() {
        let mut r1 = ChaCha8Rng::seed_from_u64(7);
        let mut r2 = ChaCha8Rng::seed_from_u64(7);
        let w1 = Matrix::he(200, 100, 200, &mut r1);
        let w2 = Matrix::he(200, 100, 200, &mut r2);
        assert_eq!(w1, w2);

        let n = w1.data.len() as f64;
        let mean = w1.data.iter().sum::<f64>() / n;
        let var = w1.data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.01, "mean = {mean}");
        assert!((var - 2.0 / 200.0).abs() < 0.001, "var = {var}");
    }

    #[test]
    fn accumulating_product_adds_onto_existing_values() {
        let a = m(vec![vec![1.0, -2.0, 0.5], vec![3.0, 0.0, 4.0]]);
        let b = m(vec![vec![2.0, 1.0], vec![-1.0, 3.0]]);
        let product = transpose(&a).matmul(&b);

        let mut acc = Matrix::filled(3, 2, 1.0);
        acc.add_matmul_transpose_a(&a, &b);
        acc.add_matmul_transpose_a(&a, &b);
        let mut expected = Matrix::filled(3, 2, 1.0);
        expected += &product;
        expected += &product;
        assert_eq!(acc, expected);
    }

    #[test]
    #[should_panic]
    fn mismatched_add_panics() {
        let mut a = Matrix::zeros(2, 2);
        a += &Matrix::zeros(3, 2);
    }
}
