/// Compute the cross-covariance matrix of two centered point sets.
///
/// `H = Σ moving[i] * fixed[i]^T`, i.e. the moving point is the column and the
/// fixed point the row of each outer product. The rotation solver relies on
/// this operand order.
///
/// # Arguments
///
/// * `moving_centered` - Moving points with their centroid removed.
/// * `fixed_centered` - Fixed points with their centroid removed.
///
/// PRECONDITION: both sets have the same length; extra points in the longer set are ignored.
pub fn cross_covariance(
    moving_centered: &[[f64; 3]],
    fixed_centered: &[[f64; 3]],
) -> [[f64; 3]; 3] {
    let mut h = [[0.0; 3]; 3];
    for (q, q_prime) in moving_centered.iter().zip(fixed_centered.iter()) {
        for (r, row) in h.iter_mut().enumerate() {
            for (c, val) in row.iter_mut().enumerate() {
                *val += q[r] * q_prime[c];
            }
        }
    }
    h
}
