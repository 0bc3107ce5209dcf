// src/core/complex.rs

//! Complex arithmetic on amplitudes.
//!
//! Amplitudes are plain `Complex<f64>` values. The free functions here spell out
//! the handful of operations the gate kernels rely on so the arithmetic each
//! kernel performs is explicit at the call site.

use num_complex::Complex;

/// A single complex amplitude of a basis state.
pub type Amplitude = Complex<f64>;

/// `a + b`
#[inline]
pub fn add(a: Amplitude, b: Amplitude) -> Amplitude {
    Complex::new(a.re + b.re, a.im + b.im)
}

/// `a * b` using `(a.re*b.re - a.im*b.im, a.re*b.im + a.im*b.re)`.
#[inline]
pub fn multiply(a: Amplitude, b: Amplitude) -> Amplitude {
    Complex::new(a.re * b.re - a.im * b.im, a.re * b.im + a.im * b.re)
}

/// `-a`
#[inline]
pub fn negate(a: Amplitude) -> Amplitude {
    Complex::new(-a.re, -a.im)
}

/// Multiplies by a real scalar.
#[inline]
pub fn scale(a: Amplitude, k: f64) -> Amplitude {
    Complex::new(a.re * k, a.im * k)
}

/// `re² + im²`, the Born-rule weight of an amplitude.
#[inline]
pub fn norm_sqr(a: Amplitude) -> f64 {
    a.re * a.re + a.im * a.im
}

/// `e^(iθ)`
#[inline]
pub fn phase_factor(theta: f64) -> Amplitude {
    Complex::new(theta.cos(), theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_matches_num_complex() {
        let a = Complex::new(1.5, -2.0);
        let b = Complex::new(-0.25, 3.0);
        let ours = multiply(a, b);
        let theirs = a * b;
        assert!((ours - theirs).norm() < 1e-15);
        // i * i = -1
        assert_eq!(multiply(Complex::i(), Complex::i()), Complex::new(-1.0, 0.0));
    }

    #[test]
    fn test_add_and_negate() {
        let a = Complex::new(0.5, 0.5);
        assert_eq!(add(a, negate(a)), Complex::new(0.0, 0.0));
        assert_eq!(scale(a, 2.0), Complex::new(1.0, 1.0));
        assert!((norm_sqr(a) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_phase_factor_is_unit() {
        for k in 0..8 {
            let theta = k as f64 * std::f64::consts::FRAC_PI_4;
            assert!((norm_sqr(phase_factor(theta)) - 1.0).abs() < 1e-12);
        }
    }
}
