//! Finite difference Jacobian computation.

use nalgebra::{DMatrix, DVector};

/// Compute Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by epsilon and computes (f(x+e) - f(x))/epsilon.
/// `f_x` is the already-evaluated `f(x)`.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let n = x.len();
    let m = f_x.len();

    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let mut x_perturbed = x.clone();
        x_perturbed[j] += epsilon * x[j].abs().max(1.0);
        // Use the representable step, not the requested one.
        let dx = x_perturbed[j] - x[j];

        let f_perturbed = f(&x_perturbed);
        let df = (f_perturbed - f_x) / dx;

        jac.set_column(j, &df);
    }

    jac
}

/// Default perturbation: square root of machine epsilon.
pub fn default_epsilon() -> f64 {
    f64::EPSILON.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_linear() {
        // f(x) = 2*x, J = 2
        let f = |x: &DVector<f64>| DVector::from_element(1, 2.0 * x[0]);

        let x = DVector::from_element(1, 3.0);
        let fx = f(&x);
        let jac = finite_difference_jacobian(&x, &fx, f, 1e-7);

        assert!((jac[(0, 0)] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn jacobian_coupled() {
        // f(x, y) = (x*y, x - y)
        let f = |v: &DVector<f64>| DVector::from_vec(vec![v[0] * v[1], v[0] - v[1]]);

        let x = DVector::from_vec(vec![2.0, 5.0]);
        let fx = f(&x);
        let jac = finite_difference_jacobian(&x, &fx, f, default_epsilon());

        assert!((jac[(0, 0)] - 5.0).abs() < 1e-6);
        assert!((jac[(0, 1)] - 2.0).abs() < 1e-6);
        assert!((jac[(1, 0)] - 1.0).abs() < 1e-6);
        assert!((jac[(1, 1)] + 1.0).abs() < 1e-6);
    }
}
