use crate::{CoreError, CoreResult};

/// Floating point type used throughout system
pub type Real = f64;

/// Relative difference |a - b| / |reference|, falling back to the absolute
/// difference when the reference is zero.
pub fn relative_difference(a: Real, b: Real, reference: Real) -> Real {
    let diff = (a - b).abs();
    if reference == 0.0 {
        diff
    } else {
        diff / reference.abs()
    }
}

pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and >= 0.
pub fn ensure_non_negative(v: Real, what: &'static str) -> CoreResult<Real> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(CoreError::Negative { what, value: v });
    }
    Ok(v)
}

/// Finite and strictly > 0.
pub fn ensure_positive(v: Real, what: &'static str) -> CoreResult<Real> {
    let v = ensure_finite(v, what)?;
    if v <= 0.0 {
        return Err(CoreError::OutOfRange {
            what,
            value: v,
            min: 0.0,
            max: Real::INFINITY,
        });
    }
    Ok(v)
}

/// Finite and inside the closed interval [0, 1].
pub fn ensure_unit_interval(v: Real, what: &'static str) -> CoreResult<Real> {
    let v = ensure_finite(v, what)?;
    if !(0.0..=1.0).contains(&v) {
        return Err(CoreError::OutOfRange {
            what,
            value: v,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn range_checks() {
        assert!(ensure_non_negative(0.0, "x").is_ok());
        assert!(ensure_non_negative(-1e-9, "x").is_err());
        assert!(ensure_positive(0.0, "x").is_err());
        assert!(ensure_positive(2.0, "x").is_ok());
        assert!(ensure_unit_interval(1.0, "u").is_ok());
        assert!(ensure_unit_interval(1.01, "u").is_err());
        assert!(ensure_unit_interval(Real::INFINITY, "u").is_err());
    }

    #[test]
    fn relative_difference_zero_reference() {
        assert_eq!(relative_difference(3.0, 1.0, 0.0), 2.0);
        assert_eq!(relative_difference(3.0, 1.0, 4.0), 0.5);
    }
}
