/// Compute the centroid of a set of points.
///
/// An empty set has its centroid at the origin.
///
/// Example:
///
/// ```
/// use kornia_calib::points::centroid;
///
/// let c = centroid(&[[1.0, 2.0, 3.0], [3.0, 4.0, 5.0]]);
/// assert_eq!(c, [2.0, 3.0, 4.0]);
/// ```
pub fn centroid(points: &[[f64; 3]]) -> [f64; 3] {
    let sum = points.iter().fold([0.0; 3], |acc, p| {
        [acc[0] + p[0], acc[1] + p[1], acc[2] + p[2]]
    });

    if points.is_empty() {
        return sum;
    }

    let n = points.len() as f64;
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

/// Subtract `offset` from every point, keeping the order of the input.
pub fn translate_points(points: &[[f64; 3]], offset: &[f64; 3]) -> Vec<[f64; 3]> {
    points
        .iter()
        .map(|p| [p[0] - offset[0], p[1] - offset[1], p[2] - offset[2]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_centroid() {
        let points = vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [-2.0, 0.5, 0.0]];
        let c = centroid(&points);
        assert_relative_eq!(c[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(c[1], 2.5, epsilon = 1e-12);
        assert_relative_eq!(c[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_centroid_empty() {
        assert_eq!(centroid(&[]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_translate_points_centers() {
        let points = vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let centered = translate_points(&points, &centroid(&points));
        assert_eq!(centered, vec![[-1.5, -1.5, -1.5], [1.5, 1.5, 1.5]]);
        assert_eq!(centroid(&centered), [0.0, 0.0, 0.0]);
    }
}
