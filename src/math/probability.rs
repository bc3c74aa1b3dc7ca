use crate::io::error::{Result, invalid_parameter};

/// Exponential-decay mixing probability between two time markers
///
/// Computes `(e^-t1 - e^-t2) / (1 - e^-t2)`, the success probability of the
/// binomial noise drawn between steps `t1` and `t2`. For `0 <= t1 <= t2` the
/// result lies in `[0, 1]`: it is 1 at `t1 = 0`, falls to 0 as `t1` reaches
/// `t2`, and for fixed `t1` grows with `t2`.
///
/// # Errors
///
/// Returns an error if:
/// - Either marker is not finite
/// - `t2 <= 0`, where the denominator vanishes
/// - `t1` is negative or greater than `t2`
pub fn mixing_probability(t1: f64, t2: f64) -> Result<f64> {
    if !t1.is_finite() || !t2.is_finite() {
        return Err(invalid_parameter(
            "time markers",
            &format!("({t1}, {t2})"),
            &"time markers must be finite",
        ));
    }
    if t2 <= 0.0 {
        return Err(invalid_parameter(
            "t2",
            &t2,
            &"must be strictly positive",
        ));
    }
    if !(0.0..=t2).contains(&t1) {
        return Err(invalid_parameter(
            "t1",
            &t1,
            &format!("must lie in [0, {t2}]"),
        ));
    }

    Ok(mixing_probability_unchecked(t1, t2))
}

/// Mixing probability without range validation, for markers already known to be valid
pub fn mixing_probability_unchecked(t1: f64, t2: f64) -> f64 {
    let decay_second = (-t2).exp();
    ((-t1).exp() - decay_second) / (1.0 - decay_second)
}
