//! Deterministic luck draws.
//!
//! A match seed and a stream index hash to a 32-bit draw, read as a fraction
//! of `2^32`. The same seed always yields the same battle.

/// Stream for the attacker's roll.
pub const ATTACK_STREAM: u64 = 0;
/// Stream for the counter-attack roll.
pub const COUNTER_STREAM: u64 = 1;

/// Mix `seed` and `stream` into a well-distributed 64-bit value.
#[must_use]
pub const fn simple_hash(seed: u64, stream: u64) -> u64 {
    let mut x = seed.wrapping_add(stream.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}

/// 32-bit luck draw for `stream` of a seeded battle.
#[must_use]
pub const fn luck_draw(seed: u64, stream: u64) -> u32 {
    (simple_hash(seed, stream) >> 32) as u32
}

/// Luck term for a unit at `hp`: `ceil(draw * k) - 1` with
/// `k = ceil(hp / 10) + 1`, never below zero.
///
/// The result lies in `0..=ceil(hp / 10)`.
#[must_use]
pub fn luck_bonus(draw: u32, hp: u8) -> u16 {
    let k = u64::from(hp.div_ceil(10)) + 1;
    let scaled = (u64::from(draw) * k).div_ceil(1 << 32);
    u16::try_from(scaled.saturating_sub(1)).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NEUTRAL_LUCK_DRAW;

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(simple_hash(7, 0), simple_hash(7, 0));
        assert_ne!(simple_hash(7, ATTACK_STREAM), simple_hash(7, COUNTER_STREAM));
        assert_ne!(luck_draw(1, 0), luck_draw(2, 0));
    }

    #[test]
    fn test_bonus_range() {
        assert_eq!(luck_bonus(0, 100), 0);
        assert_eq!(luck_bonus(u32::MAX, 100), 10);
        assert_eq!(luck_bonus(u32::MAX, 1), 1);
        for seed in 0..500 {
            let bonus = luck_bonus(luck_draw(seed, ATTACK_STREAM), 57);
            assert!(bonus <= 6);
        }
    }

    #[test]
    fn test_neutral_draw_is_midpoint() {
        // k = 11 at full health: ceil(5.5) - 1
        assert_eq!(luck_bonus(NEUTRAL_LUCK_DRAW, 100), 5);
        // k = 2 at 1 HP: ceil(1.0) - 1
        assert_eq!(luck_bonus(NEUTRAL_LUCK_DRAW, 1), 0);
    }
}
