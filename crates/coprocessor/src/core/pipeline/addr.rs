//! Address register arithmetic.
//!
//! Post-increment and offset accesses update AN according to the mode
//! register MN:
//! 1. **Linear** (`MN = 0x1fff`): `AN + offset`.
//! 2. **Bit-reversed** (`MN = 0`): the offset is added in bit-reversed order,
//!    which walks FFT data in butterfly order.
//! 3. **Modulo** (any other MN): bits outside MN are kept, bits inside wrap.

use crate::common::constants::{ADDR_MODE_BITREV, ADDR_MODE_LINEAR};

/// Reverses bits `0..=width` of `num` (a 13-bit reversal for width 12).
pub const fn bit_rev(num: u32, width: u32) -> u32 {
    let mut out = 0;
    let mut i = 0;
    while i <= width {
        if num & (1 << i) != 0 {
            out |= 1 << (width - i);
        }
        i += 1;
    }
    out
}

/// Computes the updated address register value.
///
/// # Arguments
///
/// * `addr` - Current AN value.
/// * `offs` - Signed step (NN, -NN or the instruction offset).
/// * `mode` - MN value selecting the arithmetic.
///
/// # Returns
///
/// The new address; callers keep the low 13 bits.
pub const fn adjust_addr(addr: u32, offs: i32, mode: u32) -> u32 {
    match mode {
        ADDR_MODE_BITREV => {
            let a = bit_rev(addr, 12);
            let o = bit_rev(offs.unsigned_abs(), 12);
            let sum = if offs >= 0 { a.wrapping_add(o) } else { a.wrapping_sub(o) };
            bit_rev(sum, 12)
        }
        ADDR_MODE_LINEAR => addr.wrapping_add(offs as u32),
        _ => (addr & !mode).wrapping_add(addr.wrapping_add(offs as u32) & mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_rev_thirteen_bits() {
        assert_eq!(bit_rev(1, 12), 0x1000);
        assert_eq!(bit_rev(0x1000, 12), 1);
        assert_eq!(bit_rev(0x3, 12), 0x1800);
        assert_eq!(bit_rev(0x2000, 12), 0);
    }

    #[test]
    fn test_linear_mode() {
        assert_eq!(adjust_addr(10, 5, ADDR_MODE_LINEAR) & 0x1fff, 15);
        assert_eq!(adjust_addr(0, -1, ADDR_MODE_LINEAR) & 0x1fff, 0x1fff);
    }

    #[test]
    fn test_modulo_mode_wraps_inside_mask() {
        assert_eq!(adjust_addr(0x107, 1, 0x7), 0x100);
        assert_eq!(adjust_addr(0x100, -1, 0x7), 0x107);
        assert_eq!(adjust_addr(0x103, 2, 0x7), 0x105);
    }

    #[test]
    fn test_bitrev_mode_steps_in_reversed_order() {
        // A step of 0x800 is the second-highest reversed bit: 0 -> 0x800 -> 0x400 -> 0xc00.
        let mut a = 0;
        let mut seen = Vec::new();
        for _ in 0..4 {
            a = adjust_addr(a, 0x800, ADDR_MODE_BITREV) & 0x1fff;
            seen.push(a);
        }
        assert_eq!(seen, vec![0x800, 0x400, 0xc00, 0x200]);
    }
}
