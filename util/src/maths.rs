//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit a value to the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    value.max(min).min(max)
}

/// Round a value to the given number of decimal places.
pub fn round_dp<T>(value: T, places: i32) -> T
where
    T: Float,
{
    let scale = T::from(10).map(|ten| ten.powi(places)).unwrap_or_else(T::one);

    (value * scale).round() / scale
}

/// Convert radians to degrees.
pub fn rad_to_deg<T: Float>(value: T) -> T {
    value.to_degrees()
}

/// Convert degrees to radians.
pub fn deg_to_rad<T: Float>(value: T) -> T {
    value.to_radians()
}
