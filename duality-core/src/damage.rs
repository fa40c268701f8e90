//! Threshold damage.
//!
//! Incoming damage is never subtracted directly. It is compared against
//! multiples of the target's threshold and converted into 0 to 3 lost hit
//! points.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DamageError {
    #[error("Damage threshold must be positive, got {0}")]
    InvalidThreshold(i32),
}

/// Number of hit points lost for `incoming` damage against `threshold`.
pub fn hits_for(incoming: u32, threshold: i32) -> Result<u8, DamageError> {
    if threshold <= 0 {
        return Err(DamageError::InvalidThreshold(threshold));
    }
    let incoming = incoming as i64;
    let threshold = threshold as i64;
    let hits = if incoming >= 3 * threshold {
        3
    } else if incoming >= 2 * threshold {
        2
    } else if incoming >= threshold {
        1
    } else {
        0
    };
    Ok(hits)
}

/// Apply damage to a hit point total, returning `(new_hp, hits_taken)`.
pub fn apply_damage(current_hp: u32, incoming: u32, threshold: i32) -> Result<(u32, u8), DamageError> {
    let hits = hits_for(incoming, threshold)?;
    Ok((current_hp.saturating_sub(hits as u32), hits))
}
