//! Pipeline ordering and address arithmetic properties.
//!
//! Verifies:
//! 1. Both pipes stay in issue order for arbitrary instruction mixes.
//! 2. Linear, modulo and bit-reversed address updates behave as documented.

use k128cp2_core::common::constants::ADDR_MODE_LINEAR;
use k128cp2_core::core::pipeline::addr::{adjust_addr, bit_rev};
use k128cp2_core::isa::HiOp;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::builder::Vliw;
use crate::common::builder::vliw::NOP;
use crate::common::harness::{MAX_TEST_CYCLES, TestContext};

/// Words that neither branch nor stop.
fn straight_line_words() -> Vec<u64> {
    vec![
        NOP,
        Vliw::new().hi(HiOp::Add, 3, 1, 2).build(),
        Vliw::new().hi(HiOp::PsMul, 4, 1, 1).seti(5, 9).build(),
        Vliw::new().updaddrnp(1).build(),
        Vliw::new().lwi(6, 0x40).build(),
        Vliw::new().hi(HiOp::Copy, 7, 6, 0).swi(3, 0x41).build(),
        Vliw::new().ldi(8, 0x42).build(),
        Vliw::new().sync().build(),
    ]
}

/// Returns true if tickets rise and stages fall from oldest to youngest.
fn in_issue_order(entries: impl Iterator<Item = (u64, u8)>) -> bool {
    let entries: Vec<_> = entries.collect();
    entries.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 > w[1].1)
}

proptest! {
    /// Older entries are always further along than younger ones, in both pipes.
    #[test]
    fn pipes_complete_in_issue_order(picks in prop::collection::vec(0usize..8, 1..40)) {
        let table = straight_line_words();
        let mut program: Vec<u64> = picks.iter().map(|&i| table[i]).collect();
        program.push(Vliw::new().stopi(0).build());

        let mut tc = TestContext::new().load(&program);
        tc.sim.start(0).unwrap();
        for _ in 0..MAX_TEST_CYCLES {
            tc.clock(1);
            let m = tc.machine();
            prop_assert!(in_issue_order(m.cal.iter().map(|e| (e.ticket, e.stage))));
            prop_assert!(in_issue_order(m.lmem_pipe.iter().map(|e| (e.ticket, e.stage))));
            if !m.is_running() && !m.pending_work() && m.cal.is_empty() && m.lmem_pipe.is_empty() {
                break;
            }
        }
        prop_assert!(tc.machine().cal.is_empty());
        prop_assert!(tc.machine().lmem_pipe.is_empty());
    }

    /// Linear mode is a plain 13-bit wrapping add.
    #[test]
    fn linear_mode_adds(addr in 0u32..0x2000, offs in -0x1fffi32..0x2000) {
        let expected = (addr as i32 + offs).rem_euclid(0x2000) as u32;
        prop_assert_eq!(adjust_addr(addr, offs, ADDR_MODE_LINEAR) & 0x1fff, expected);
    }

    /// Modulo mode wraps inside the mask and keeps the bits above it.
    #[test]
    fn modulo_mode_keeps_base(addr in 0u32..0x2000, offs in 0i32..0x100, bits in 1u32..12) {
        let mode = (1 << bits) - 1;
        let r = adjust_addr(addr, offs, mode);
        prop_assert_eq!(r & !mode, addr & !mode);
        prop_assert_eq!(r & mode, (addr + offs as u32) & mode);
    }

    /// Bit-reversed steps are undone by the opposite step.
    #[test]
    fn bitrev_step_is_invertible(addr in 0u32..0x2000, offs in 0i32..0x1000) {
        let there = adjust_addr(addr, offs, 0) & 0x1fff;
        prop_assert_eq!(adjust_addr(there, -offs, 0) & 0x1fff, addr);
    }
}

/// A step of 0x1000 walks addresses in bit-reversed counting order.
#[test]
fn bitrev_walk_order() {
    let mut addr = 0;
    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(addr);
        addr = adjust_addr(addr, 0x1000, 0) & 0x1fff;
    }
    assert_eq!(seen, vec![0, 0x1000, 0x0800, 0x1800]);
    assert_eq!(bit_rev(bit_rev(0x0abc, 12), 12), 0x0abc);
}
