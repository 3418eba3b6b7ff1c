/// Singular value decomposition `A = U * diag(s) * V^T` of a square matrix.
///
/// All matrices are stored row-major. Singular values are sorted in
/// non-increasing order.
#[derive(Debug, Clone, Copy)]
pub struct SvdN<const N: usize> {
    /// Left singular vectors as columns.
    pub u: [[f64; N]; N],
    /// Singular values.
    pub s: [f64; N],
    /// Right singular vectors as columns.
    pub v: [[f64; N]; N],
}

/// Compute the SVD of a square row-major matrix using faer.
///
/// # Arguments
///
/// * `m` - The input matrix.
///
/// # Returns
///
/// The decomposition with singular values sorted from largest to smallest.
pub fn svd<const N: usize>(m: &[[f64; N]; N]) -> SvdN<N> {
    let mat = faer::Mat::<f64>::from_fn(N, N, |i, j| m[i][j]);
    let svd = mat.svd();

    let (u_mat, v_mat, s_col) = (svd.u(), svd.v(), svd.s_diagonal());

    let mut out = SvdN {
        u: [[0.0; N]; N],
        s: [0.0; N],
        v: [[0.0; N]; N],
    };
    for i in 0..N {
        out.s[i] = s_col.read(i);
        for j in 0..N {
            out.u[i][j] = u_mat.read(i, j);
            out.v[i][j] = v_mat.read(i, j);
        }
    }

    // faer already sorts, but keep the contract independent of the backend
    let mut order: [usize; N] = core::array::from_fn(|i| i);
    order.sort_by(|&a, &b| out.s[b].total_cmp(&out.s[a]));
    SvdN {
        u: core::array::from_fn(|i| core::array::from_fn(|j| out.u[i][order[j]])),
        s: core::array::from_fn(|j| out.s[order[j]]),
        v: core::array::from_fn(|i| core::array::from_fn(|j| out.v[i][order[j]])),
    }
}

/// Whether `value` lies strictly within `tolerance` of zero.
pub fn is_close_to_zero(value: f64, tolerance: f64) -> bool {
    value.abs() < tolerance
}

/// Compute the determinant of a 3x3 matrix.
pub fn det_mat33(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Multiply two 3x3 matrices `a * b`.
pub fn matmul33(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut m = [[0.0; 3]; 3];
    for (i, row) in m.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    m
}

/// Transpose a 3x3 matrix.
pub fn transpose33(m: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    [
        [m[0][0], m[1][0], m[2][0]],
        [m[0][1], m[1][1], m[2][1]],
        [m[0][2], m[1][2], m[2][2]],
    ]
}

/// Multiply a 3x3 matrix by a 3-vector.
pub fn mat33_vec3(m: &[[f64; 3]; 3], v: &[f64; 3]) -> [f64; 3] {
    [
        dot_product3(&m[0], v),
        dot_product3(&m[1], v),
        dot_product3(&m[2], v),
    ]
}

/// Dot product of two 3-vectors.
pub fn dot_product3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Squared Euclidean distance between two points.
pub fn squared_distance3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}
