//! Chebyshev series evaluation for SPK records.
//!
//! SPK Types 2 and 3 store each coordinate as a Chebyshev expansion over
//! a normalised time `s` in `[-1, 1]`. Both the value and its derivative
//! are evaluated with a single backward Clenshaw pass.

/// Evaluate `sum(c_k * T_k(s))` with the Clenshaw recurrence.
pub fn clenshaw(coeffs: &[f64], s: f64) -> f64 {
    clenshaw_with_derivative(coeffs, s).0
}

/// Evaluate a Chebyshev expansion and its derivative with respect to `s`.
///
/// The derivative is carried alongside the value by differentiating the
/// recurrence itself:
/// ```text
/// b_k = 2s b_{k+1} - b_{k+2} + c_k
/// d_k = 2 b_{k+1} + 2s d_{k+1} - d_{k+2}
/// f   = s b_1 - b_2 + c_0
/// f'  = b_1 + s d_1 - d_2
/// ```
pub fn clenshaw_with_derivative(coeffs: &[f64], s: f64) -> (f64, f64) {
    match coeffs.len() {
        0 => return (0.0, 0.0),
        1 => return (coeffs[0], 0.0),
        _ => {}
    }

    let two_s = 2.0 * s;
    let (mut b1, mut b2) = (0.0, 0.0);
    let (mut d1, mut d2) = (0.0, 0.0);

    for &c_k in coeffs[1..].iter().rev() {
        let b_k = two_s * b1 - b2 + c_k;
        let d_k = 2.0 * b1 + two_s * d1 - d2;
        b2 = b1;
        b1 = b_k;
        d2 = d1;
        d1 = d_k;
    }

    (s * b1 - b2 + coeffs[0], b1 + s * d1 - d2)
}

/// Map an epoch onto the normalised interval of a record.
///
/// `mid` and `radius` are the record's midpoint and half-width in seconds.
pub fn normalise(epoch_s: f64, mid: f64, radius: f64) -> f64 {
    (epoch_s - mid) / radius
}
