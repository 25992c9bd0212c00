//! Modified Bessel functions via the Abramowitz & Stegun polynomial fits
//! (9.8.1, 9.8.5, 9.8.6). Relative error stays below 2e-7 over x > 0.

/// Modified Bessel function of the first kind, order 0, for |x| <= 3.75.
fn bessel_i0_small(x: f64) -> f64 {
    let u = (x / 3.75).powi(2);
    1.0 + u
        * (3.5156229
            + u * (3.0899424 + u * (1.2067492 + u * (0.2659732 + u * (0.0360768 + u * 0.0045813)))))
}

/// Modified Bessel function of the second kind, order 0.
///
/// Returns `+inf` at zero and NaN for negative or NaN arguments.
pub fn bessel_k0(x: f64) -> f64 {
    if x.is_nan() || x < 0.0 {
        return f64::NAN;
    }
    if x == 0.0 {
        return f64::INFINITY;
    }

    if x <= 2.0 {
        let y = x * x / 4.0;
        let series = -0.57721566
            + y * (0.42278420
                + y * (0.23069756
                    + y * (0.03488590 + y * (0.00262698 + y * (0.00010750 + y * 0.00000740)))));
        -(x / 2.0).ln() * bessel_i0_small(x) + series
    } else {
        let y = 2.0 / x;
        let asymptotic = 1.25331414
            + y * (-0.07832358
                + y * (0.02189568
                    + y * (-0.01062446 + y * (0.00587872 + y * (-0.00251540 + y * 0.00053208)))));
        (-x).exp() / x.sqrt() * asymptotic
    }
}
