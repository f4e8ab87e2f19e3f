//! Dense output: evaluating the solution between internal steps.

use nalgebra::{DMatrix, DVector};

/// Continuous extension of the solution over one accepted step.
#[derive(Clone, Debug)]
pub enum DenseSegment {
    /// Cubic Hermite interpolant built from the endpoint states and slopes.
    Hermite {
        t_old: f64,
        t_new: f64,
        y_old: DVector<f64>,
        y_new: DVector<f64>,
        f_old: DVector<f64>,
        f_new: DVector<f64>,
    },
    /// BDF interpolating polynomial in backward-difference form.
    ///
    /// `d` holds rows `0..=order` of the difference array after the step,
    /// for equally spaced nodes `t, t - h, ..., t - order * h`.
    Backward {
        t: f64,
        h: f64,
        order: usize,
        d: DMatrix<f64>,
    },
}

impl DenseSegment {
    /// Time at which this segment ends.
    pub fn t_end(&self) -> f64 {
        match self {
            DenseSegment::Hermite { t_new, .. } => *t_new,
            DenseSegment::Backward { t, .. } => *t,
        }
    }

    /// Evaluate the interpolant at `t`.
    pub fn eval(&self, at: f64) -> DVector<f64> {
        match self {
            DenseSegment::Hermite {
                t_old,
                t_new,
                y_old,
                y_new,
                f_old,
                f_new,
            } => {
                let h = t_new - t_old;
                let s = (at - t_old) / h;
                let s2 = s * s;
                let s3 = s2 * s;
                let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
                let h10 = s3 - 2.0 * s2 + s;
                let h01 = -2.0 * s3 + 3.0 * s2;
                let h11 = s3 - s2;
                y_old * h00 + f_old * (h10 * h) + y_new * h01 + f_new * (h11 * h)
            }
            DenseSegment::Backward { t, h, order, d } => {
                let mut y = d.row(0).transpose();
                let mut p = 1.0;
                for m in 0..*order {
                    let shift = t - h * m as f64;
                    let denom = h * (m as f64 + 1.0);
                    p *= (at - shift) / denom;
                    y += d.row(m + 1).transpose() * p;
                }
                y
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hermite_reproduces_cubic() {
        // y = t^3 on [0, 2]: y(0)=0, y(2)=8, y'(0)=0, y'(2)=12
        let seg = DenseSegment::Hermite {
            t_old: 0.0,
            t_new: 2.0,
            y_old: DVector::from_element(1, 0.0),
            y_new: DVector::from_element(1, 8.0),
            f_old: DVector::from_element(1, 0.0),
            f_new: DVector::from_element(1, 12.0),
        };
        for &t in &[0.0, 0.5, 1.0, 1.7, 2.0] {
            assert!((seg.eval(t)[0] - t * t * t).abs() < 1e-12);
        }
        assert_eq!(seg.t_end(), 2.0);
    }

    #[test]
    fn backward_differences_reproduce_line() {
        // y = 2t through nodes t=1 and t=0.5 (h=0.5, order 1):
        // D0 = y(1) = 2, D1 = y(1) - y(0.5) = 1
        let d = DMatrix::from_row_slice(2, 1, &[2.0, 1.0]);
        let seg = DenseSegment::Backward {
            t: 1.0,
            h: 0.5,
            order: 1,
            d,
        };
        assert!((seg.eval(1.0)[0] - 2.0).abs() < 1e-12);
        assert!((seg.eval(0.75)[0] - 1.5).abs() < 1e-12);
        assert!((seg.eval(0.5)[0] - 1.0).abs() < 1e-12);
    }
}
