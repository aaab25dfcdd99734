//! Hardware loop, call and jump tests.
//!
//! Each body word bumps an address register with `updaddrnp`, so the
//! final AN values count how often each word executed.

use k128cp2_core::common::CtrlReg;
use k128cp2_core::common::constants::NUM_ADDR_REGS;
use k128cp2_core::core::arch::status::{STATUS_POE, STATUS_PUE};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::builder::Vliw;
use crate::common::builder::vliw::NOP;
use crate::common::harness::{MAX_TEST_CYCLES, TestContext};

fn an(tc: &TestContext, n: usize) -> u64 {
    tc.machine().regs.an[n]
}

/// `doi 3` runs the body and the word after the loop end three times each.
#[test]
fn doi_three_iterations() {
    let program = [
        Vliw::new().doi(3, 2).build(),
        Vliw::new().updaddrnp(2).build(),
        Vliw::new().updaddrnp(0).build(),
        Vliw::new().updaddrnp(1).build(),
        Vliw::new().stopi(7).build(),
    ];
    let mut tc = TestContext::new().load(&program);
    let outcome = tc.run();

    assert_eq!(outcome.stop_code, 7);
    assert_eq!(an(&tc, 2), 3);
    assert_eq!(an(&tc, 0), 3);
    assert_eq!(an(&tc, 1), 3);
    let m = tc.machine();
    assert_eq!(m.flow.lsp_cur, 0);
    assert_eq!(m.debug_ctrlreg(CtrlReg::Lsp), 0);
    assert_eq!(m.debug_ctrlreg(CtrlReg::Lc), 0);
    assert_eq!(m.debug_ctrlreg(CtrlReg::La), 0);
}

/// The PC points just past the loop end on the clock the loop frame is popped.
#[test]
fn loop_exit_lands_after_end_address() {
    let program = [
        Vliw::new().doi(3, 2).build(),
        NOP,
        NOP,
        NOP,
        Vliw::new().stopi(1).build(),
    ];
    let mut tc = TestContext::new().load(&program);
    tc.sim.start(0).unwrap();

    let mut entered = false;
    let mut exited_at = None;
    for _ in 0..MAX_TEST_CYCLES {
        tc.clock(1);
        let lsp = tc.machine().flow.lsp_cur;
        if lsp == 1 {
            entered = true;
        } else if entered && lsp == 0 {
            exited_at = Some(tc.machine().regs.pc());
            break;
        }
    }
    assert!(entered, "loop frame was never pushed");
    assert_eq!(exited_at, Some(3));
}

/// A zero-trip `doi` annuls the word after it and skips the body and its delay slot.
#[test]
fn zero_trip_doi_skips_body() {
    let program = [
        Vliw::new().doi(0, 3).build(),
        Vliw::new().updaddrnp(0).build(),
        Vliw::new().updaddrnp(1).build(),
        Vliw::new().updaddrnp(2).build(),
        Vliw::new().updaddrnp(3).build(),
        Vliw::new().stopi(1).build(),
    ];
    let mut tc = TestContext::new().load(&program);
    let outcome = tc.run();

    assert_eq!(outcome.stop_code, 1);
    for n in 0..4 {
        assert_eq!(an(&tc, n), 0, "a{n} must not be touched");
    }
    assert_eq!(tc.machine().flow.lsp_cur, 0);
}

/// `do rN` takes its trip count from a GPR.
#[test]
fn do_counts_from_register() {
    let program = [
        Vliw::new().seti(4, 2).build(),
        NOP,
        NOP,
        Vliw::new().do_(4, 5).build(),
        Vliw::new().updaddrnp(0).build(),
        Vliw::new().updaddrnp(1).build(),
        NOP,
        Vliw::new().stopi(2).build(),
    ];
    let mut tc = TestContext::new().load(&program);
    let outcome = tc.run();

    assert_eq!(outcome.stop_code, 2);
    assert_eq!(an(&tc, 0), 2);
    assert_eq!(an(&tc, 1), 2);
}

/// Call and return both execute their delay slot; the return lands after the call's slot.
#[test]
fn call_and_return_with_delay_slots() {
    let program = [
        Vliw::new().calli(4).build(),
        Vliw::new().updaddrnp(1).build(),
        Vliw::new().stopi(9).build(),
        Vliw::new().stopi(0xbad).build(),
        Vliw::new().updaddrnp(0).build(),
        Vliw::new().ret().build(),
        Vliw::new().updaddrnp(2).build(),
        Vliw::new().stopi(0xbad).build(),
    ];
    let mut tc = TestContext::new().load(&program);
    let outcome = tc.run();

    assert_eq!(outcome.stop_code, 9);
    assert_eq!([an(&tc, 0), an(&tc, 1), an(&tc, 2)], [1, 1, 1]);
    assert_eq!(tc.machine().flow.psp_cur, 0);
    assert_eq!(tc.machine().debug_ctrlreg(CtrlReg::Psp), 0);
}

/// Nested calls unwind completely.
#[test]
fn nested_calls_leave_no_frames() {
    let program = [
        Vliw::new().calli(4).build(),
        NOP,
        Vliw::new().stopi(9).build(),
        NOP,
        Vliw::new().calli(8).build(),
        NOP,
        Vliw::new().ret().build(),
        NOP,
        Vliw::new().updaddrnp(0).build(),
        Vliw::new().ret().build(),
        NOP,
    ];
    let mut tc = TestContext::new().load(&program);
    let outcome = tc.run();

    assert_eq!(outcome.stop_code, 9);
    assert_eq!(an(&tc, 0), 1);
    assert_eq!(tc.machine().flow.psp_cur, 0);
    assert_eq!(tc.machine().debug_ctrlreg(CtrlReg::Psp), 0);
}

/// `ret` with an empty call stack raises PUE and falls through.
#[test]
fn return_underflow_is_sticky_and_falls_through() {
    let program = [Vliw::new().ret().build(), NOP, Vliw::new().stopi(3).build()];
    let mut tc = TestContext::new().load(&program);
    let outcome = tc.run();

    assert_eq!(outcome.stop_code, 3);
    assert_ne!(tc.machine().regs.status() & STATUS_PUE, 0);
}

/// `jumpi` executes one delay slot before the target.
#[test]
fn jump_has_one_delay_slot() {
    let program = [
        Vliw::new().jumpi(4).build(),
        Vliw::new().updaddrnp(0).build(),
        Vliw::new().stopi(0xbad).build(),
        NOP,
        Vliw::new().stopi(5).build(),
    ];
    let mut tc = TestContext::new().load(&program);
    let outcome = tc.run();

    assert_eq!(outcome.stop_code, 5);
    assert_eq!(an(&tc, 0), 1);
}

/// An inner loop restores the outer frame once per outer iteration.
#[test]
fn nested_loops_restore_parent_frame() {
    let program = [
        Vliw::new().doi(2, 7).build(),
        Vliw::new().doi(3, 3).build(),
        Vliw::new().updaddrnp(0).build(),
        Vliw::new().updaddrnp(1).build(),
        Vliw::new().updaddrnp(2).build(),
        Vliw::new().updaddrnp(3).build(),
        NOP,
        Vliw::new().updaddrnp(4).build(),
        NOP,
        Vliw::new().stopi(4).build(),
    ];
    let mut tc = TestContext::new().load(&program);
    tc.sim.start(0).unwrap();

    let mut depths = Vec::new();
    let mut restored_lc = Vec::new();
    let mut last = 0;
    for _ in 0..MAX_TEST_CYCLES {
        tc.clock(1);
        let m = tc.machine();
        let depth = m.flow.lsp_cur;
        if depth != last {
            if last == 2 && depth == 1 {
                assert_eq!((m.flow.la_cur.start, m.flow.la_cur.end), (1, 7), "outer frame restored");
                restored_lc.push(m.flow.lc_cur);
            }
            depths.push(depth);
            last = depth;
        }
        if !m.is_running() && !m.pending_work() {
            break;
        }
    }

    assert_eq!(depths, vec![1, 2, 1, 2, 1, 0]);
    assert_eq!(restored_lc, vec![2, 1]);
    let counts: Vec<u64> = (0..5).map(|n| an(&tc, n)).collect();
    assert_eq!(counts, vec![6, 6, 6, 2, 2]);
    let m = tc.machine();
    assert_eq!(m.debug_ctrlreg(CtrlReg::Lsp), 0);
    assert_eq!(m.debug_ctrlreg(CtrlReg::Lc), 0);
    assert_eq!(m.debug_ctrlreg(CtrlReg::La), 0);
}

/// `enddo` leaves the inner loop at once and hands control back to the outer one.
#[test]
fn enddo_pops_inner_loop_early() {
    let program = [
        Vliw::new().doi(2, 5).build(),
        Vliw::new().doi(4, 4).build(),
        Vliw::new().updaddrnp(0).build(),
        Vliw::new().enddo().build(),
        Vliw::new().updaddrnp(1).build(),
        Vliw::new().updaddrnp(2).build(),
        NOP,
        Vliw::new().stopi(6).build(),
    ];
    let mut tc = TestContext::new().load(&program);
    let outcome = tc.run();

    assert_eq!(outcome.stop_code, 6);
    assert_eq!([an(&tc, 0), an(&tc, 1), an(&tc, 2)], [2, 2, 2]);
    let m = tc.machine();
    assert_eq!(m.flow.lsp_cur, 0);
    assert_eq!(m.debug_ctrlreg(CtrlReg::Lsp), 0);
    assert_eq!(m.debug_ctrlreg(CtrlReg::La), 0);
}

/// A call injected through the FIFO records its frame but leaves the PC alone,
/// while an injected jump moves it.
#[test]
fn fifo_call_keeps_pc_but_fifo_jump_moves_it() {
    let mut tc = TestContext::new();
    tc.push(Vliw::new().calli(0x10).build());
    tc.clock(6);
    {
        let m = tc.machine();
        assert_eq!(m.regs.pc(), 0);
        assert_eq!(m.flow.newpc, 0);
        assert!(!m.flow.jump_flag);
        assert_eq!(m.flow.psp_cur, 1, "call frame stays pushed");
    }

    tc.push(Vliw::new().jumpi(0x20).build());
    tc.clock(6);
    assert_eq!(tc.machine().regs.pc(), 0x20);
    assert!(!tc.machine().is_running());
}

/// First IRAM address of subroutine `k` in the generated call programs.
const fn sub_base(k: usize) -> usize {
    64 + k * 8
}

/// Main calls subroutines in `calls` order; subroutine `k` bumps `a{k}` and,
/// when `nest[k]` is set, calls subroutine `k + 1` before returning.
fn call_program(calls: &[usize], nest: &[bool; 3]) -> Vec<u64> {
    let mut program = vec![NOP; sub_base(4)];
    for (n, &k) in calls.iter().enumerate() {
        program[2 * n] = Vliw::new().calli(sub_base(k) as u64).build();
    }
    program[2 * calls.len()] = Vliw::new().stopi(1).build();
    for k in 0..4 {
        let base = sub_base(k);
        program[base] = Vliw::new().updaddrnp(k as u64).build();
        if k < 3 && nest[k] {
            program[base + 1] = Vliw::new().calli(sub_base(k + 1) as u64).build();
        }
        program[base + 3] = Vliw::new().ret().build();
    }
    program
}

proptest! {
    /// Balanced calls return to the instruction after each call's delay slot
    /// and leave both stack pointers at zero.
    #[test]
    fn balanced_calls_leave_no_frames(
        calls in prop::collection::vec(0usize..4, 1..10),
        nest in any::<[bool; 3]>(),
    ) {
        let mut tc = TestContext::new().load(&call_program(&calls, &nest));
        let outcome = tc.run();

        prop_assert_eq!(outcome.stop_code, 1);
        let mut expected = [0u64; NUM_ADDR_REGS];
        for &c in &calls {
            let mut k = c;
            loop {
                expected[k] += 1;
                if k == 3 || !nest[k] {
                    break;
                }
                k += 1;
            }
        }
        for (k, &e) in expected.iter().enumerate().take(4) {
            prop_assert_eq!(an(&tc, k), e, "a{}", k);
        }
        let m = tc.machine();
        prop_assert_eq!(m.flow.psp_cur, 0);
        prop_assert_eq!(m.debug_ctrlreg(CtrlReg::Psp), 0);
        prop_assert_eq!(m.regs.status() & (STATUS_POE | STATUS_PUE), 0);
    }
}
