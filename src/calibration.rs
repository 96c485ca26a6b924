// Raw factoid magnitudes live on a nominal 0..100 scale but are not clamped.
// Calibration squashes them through a logistic centred at raw = 50.

const CALIBRATION_SLOPE: f64 = 0.1;
const CALIBRATION_CENTER: f64 = 50.0;

pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Map a raw magnitude onto 0..100: raw ~0 saturates near 0, raw >= ~100
/// saturates near 100.
pub fn calibrate(raw: f64) -> f64 {
    100.0 * logistic(CALIBRATION_SLOPE * raw - CALIBRATION_SLOPE * CALIBRATION_CENTER)
}

/// Final score of a fact: calibrated raw magnitude weighted by its kind's
/// interest.
pub fn impressiveness(interest: f64, raw: f64) -> f64 {
    interest * calibrate(raw)
}

/// Bump centred at `x == 50` (where it reaches 50) that falls off
/// symmetrically on both sides.
pub fn peak(x: f64) -> f64 {
    let k = CALIBRATION_SLOPE * (x - CALIBRATION_CENTER);
    let s = logistic(k);
    200.0 * s * (1.0 - s)
}
