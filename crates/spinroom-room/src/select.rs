//! Uniform winner selection.
//!
//! One draw per room, ever — so there is no RNG state to manage, just a
//! single uniformly distributed index over the wheel.

use rand::Rng;

/// Errors from [`draw`].
#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    /// The wheel must have at least one slot.
    #[error("cannot draw from an empty wheel")]
    EmptyWheel,
}

/// Draws a uniformly distributed index in `[0, n)`.
///
/// `rand::rng()` is a CSPRNG, and the reduction starts from a full
/// 32-bit draw, so modulo bias is below 2⁻¹² for any realistic wheel
/// size (n ≤ 2²⁰).
///
/// # Errors
/// Returns [`DrawError::EmptyWheel`] if `n == 0`.
pub fn draw(n: usize) -> Result<usize, DrawError> {
    if n == 0 {
        return Err(DrawError::EmptyWheel);
    }
    let roll: u32 = rand::rng().random();
    Ok(roll as usize % n)
}
