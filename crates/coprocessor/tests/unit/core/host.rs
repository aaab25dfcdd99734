//! Host boundary tests.
//!
//! Exercises the register, FIFO, memory and DMA surface the host CPU uses
//! to drive the coprocessor.

use k128cp2_core::common::constants::{HOST_FIFO_CAPACITY, IRAM_WORDS, LMEM_WORDS};
use k128cp2_core::common::{CtrlReg, RegId, RegVal, SimError};
use k128cp2_core::core::arch::status::{CONTROL_RS, STATUS_COMMK64, STATUS_FE, STATUS_RUN};
use k128cp2_core::core::machine::HostReg;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::builder::Vliw;
use crate::common::builder::vliw::NOP;
use crate::common::harness::TestContext;
use crate::common::mocks::dma::MockDma;

/// `check_dma` polls the installed controller once and writes its answer to a GPR.
#[test]
fn check_dma_reads_controller() {
    let program = [
        Vliw::new().check_dma(4).build(),
        NOP,
        NOP,
        Vliw::new().stop(4).build(),
    ];
    let mut tc = TestContext::new().load(&program);
    let mut dma = MockDma::new();
    dma.expect_check_dma().times(1).return_const(0xabc_u64);
    tc.machine_mut().set_dma_controller(Box::new(dma));

    let outcome = tc.run();
    assert_eq!(outcome.stop_code, 0xabc);
    assert_eq!(tc.gpr(4), 0xabc);
}

/// Without a controller `check_dma` reads zero.
#[test]
fn check_dma_without_controller_reads_zero() {
    let program = [
        Vliw::new().seti(4, 0x99).build(),
        Vliw::new().check_dma(4).build(),
        NOP,
        NOP,
        Vliw::new().stopi(0).build(),
    ];
    let mut tc = TestContext::new().load(&program);
    tc.run();
    assert_eq!(tc.gpr(4), 0);
}

/// `start_dma` raises a request the host collects exactly once.
#[test]
fn start_dma_request_is_taken_once() {
    let program = [Vliw::new().start_dma().build(), Vliw::new().stopi(0).build()];
    let mut tc = TestContext::new().load(&program);
    tc.run();
    assert!(tc.machine_mut().take_start_dma());
    assert!(!tc.machine_mut().take_start_dma());
}

/// Words pre-loaded through the FIFO form a program the host can start.
#[test]
fn ldc2_preload_then_run() {
    let mut tc = TestContext::new();
    let program = [
        Vliw::new().seti(1, 0x21).build(),
        NOP,
        NOP,
        Vliw::new().stop(1).build(),
    ];
    for word in program {
        tc.machine_mut().reg_write(HostReg::Fifo, word, u64::MAX, true).unwrap();
    }
    tc.clock(6);
    assert!(tc.machine().fifo.is_empty());
    assert!(!tc.machine().is_running());

    let outcome = tc.run();
    assert_eq!(outcome.stop_code, 0x21);
}

/// Writes beyond the FIFO capacity are dropped and condition 0 reports a full FIFO.
#[test]
fn full_fifo_drops_writes() {
    let mut tc = TestContext::new();
    for v in 0..=HOST_FIFO_CAPACITY as u64 {
        tc.push(Vliw::new().seti(1, v).build());
    }
    let m = tc.machine();
    assert_eq!(m.fifo.len(), HOST_FIFO_CAPACITY);
    assert!(m.fifo_full());
    assert!(m.condcode(0).unwrap());
    assert!(matches!(m.condcode(1), Err(SimError::InvalidCondCode(1))));
}

/// FE drops while the FIFO holds words and rises again once it drains.
#[test]
fn fifo_empty_flag_tracks_queue() {
    let mut tc = TestContext::new();
    assert_ne!(tc.machine().regs.status() & STATUS_FE, 0);
    tc.push(NOP);
    assert!(tc.machine().pending_work());
    tc.clock(1);
    assert_eq!(tc.machine().regs.status() & STATUS_FE, 0);
    tc.clock(1);
    assert_ne!(tc.machine().regs.status() & STATUS_FE, 0);
    assert!(!tc.machine().pending_work());
}

/// A host COMM write is visible to the coprocessor and raises COMMK64.
#[test]
fn host_comm_write_raises_flag() {
    let mut tc = TestContext::new();
    tc.machine_mut().reg_write(HostReg::Comm, 0x55, u64::MAX, false).unwrap();
    tc.clock(2);
    let m = tc.machine_mut();
    assert_eq!(m.debug_ctrlreg(CtrlReg::Comm), 0x55);
    assert_ne!(m.regs.status() & STATUS_COMMK64, 0);
    assert_eq!(m.reg_read(HostReg::Comm).unwrap(), 0x55);
}

#[test]
fn host_register_access_rules() {
    let mut tc = TestContext::new();
    let m = tc.machine_mut();
    assert!(m.reg_read(HostReg::Fifo).is_err());
    assert!(m.reg_write(HostReg::StopCode, 1, u64::MAX, false).is_err());
    assert!(m.reg_write(HostReg::ClockCount, 1, u64::MAX, false).is_err());
    assert_eq!(HostReg::from_index(100).unwrap(), HostReg::ClockCount);
    assert!(matches!(HostReg::from_index(4), Err(SimError::InvalidHostRegister(4))));
}

/// The free-running clock counter is readable by the host.
#[test]
fn clock_count_is_readable() {
    let mut tc = TestContext::new();
    tc.clock(10);
    assert_eq!(tc.machine_mut().reg_read(HostReg::ClockCount).unwrap(), 10);
    assert_eq!(tc.machine().regs.status() & STATUS_RUN, 0);
}

#[test]
fn memory_access_is_range_checked() {
    let mut tc = TestContext::new();
    let m = tc.machine_mut();
    m.lmem_write(2, 100, &[1, 2, 3]).unwrap();
    let mut buf = [0; 3];
    m.lmem_read(2, 100, &mut buf).unwrap();
    assert_eq!(buf, [1, 2, 3]);
    m.lmem_read(1, 100, &mut buf).unwrap();
    assert_eq!(buf, [0, 0, 0]);

    assert!(m.lmem_write(0, LMEM_WORDS - 1, &[1, 2]).is_err());
    assert!(m.lmem_read(4, 0, &mut buf).is_err());
    let mut word = [0; 1];
    assert!(m.iram_read(IRAM_WORDS, &mut word).is_err());
}

/// `iram_write` appends at the committed PC.
#[test]
fn iram_write_advances_pc() {
    let mut tc = TestContext::new();
    let m = tc.machine_mut();
    m.iram_write(&[0x11, 0x22]).unwrap();
    m.iram_write(&[0x33]).unwrap();
    let mut buf = [0; 3];
    m.iram_read(0, &mut buf).unwrap();
    assert_eq!(buf, [0x11, 0x22, 0x33]);
    assert_eq!(m.debug_ctrlreg(CtrlReg::Pc), 3);
    assert!(m.iram_write(&[0; IRAM_WORDS]).is_err());
}

/// Reset keeps memories but restores the register image.
#[test]
fn reset_keeps_memories() {
    let mut tc = TestContext::new();
    let m = tc.machine_mut();
    m.lmem_write(0, 5, &[0x55]).unwrap();
    m.regs.gpr[3] = 7;
    m.reset();
    assert_eq!(m.lmem[0][5], 0x55);
    assert_eq!(m.debug_gpr(3).unwrap(), 0);
    assert_eq!(m.regs.status(), STATUS_FE);
}

fn endless_program() -> TestContext {
    let program = [
        Vliw::new().seti(1, 5).build(),
        Vliw::new().seti(2, 6).build(),
        Vliw::new().jumpi(0).build(),
        NOP,
    ];
    let mut tc = TestContext::new().load(&program);
    tc.sim.start(0).unwrap();
    tc.clock(4);
    assert!(tc.machine().is_running());
    tc
}

/// A host CONTROL.RS write empties everything in flight and keeps CONTROL.
#[test]
fn control_reset_from_host_drops_in_flight_work() {
    let mut tc = endless_program();
    tc.machine_mut()
        .schedule_write(RegId::gpr(3), RegVal::new(0x33), 10, false)
        .unwrap();
    tc.machine_mut().reg_write(HostReg::Control, CONTROL_RS, u64::MAX, false).unwrap();

    let m = tc.machine();
    assert!(!m.is_running());
    assert!(m.cal.is_empty());
    assert!(m.lmem_pipe.is_empty());
    assert!(m.queue.is_empty());
    assert!(m.fifo.is_empty());
    assert!(!m.pending_work());
    assert_eq!(m.regs.status(), STATUS_FE);
    assert_eq!(m.debug_ctrlreg(CtrlReg::Control), CONTROL_RS);

    tc.clock(15);
    for n in 1..=3 {
        assert_eq!(tc.gpr(n), 0, "r{n} written after reset");
    }
    assert_eq!(tc.machine().regs.pc(), 0);
    assert!(!tc.machine().is_running());
}

/// A CONTROL.RS write committed by the queue stops the program and leaves PC at 0.
#[test]
fn control_reset_during_clock_leaves_pc_at_zero() {
    let mut tc = endless_program();
    tc.machine_mut()
        .schedule_write(RegId::ctrl(CtrlReg::Control), RegVal::new(CONTROL_RS), 0, false)
        .unwrap();
    tc.clock(1);

    let m = tc.machine();
    assert!(!m.is_running());
    assert_eq!(m.regs.pc(), 0);
    assert_eq!(m.flow.newpc, 0);
    assert!(m.queue.is_empty());
    assert_eq!(m.regs.status() & STATUS_RUN, 0);
}

/// `run rN` past the end of IRAM halts the program without a fatal error.
#[test]
fn run_past_iram_halts_quietly() {
    let mut tc = TestContext::new();
    tc.machine_mut().regs.gpr[1] = 0x9000;
    tc.push(Vliw::new().run(1).build());
    tc.clock(12);

    let m = tc.machine();
    assert!(!m.is_running());
    assert!(!m.pending_work());
    assert_eq!(m.regs.status() & STATUS_RUN, 0);
}

proptest! {
    /// Execute-now FIFO words run in the order they were written.
    #[test]
    fn fifo_words_execute_in_order(values in prop::collection::vec(0u64..0x1_0000, 1..=HOST_FIFO_CAPACITY)) {
        let mut tc = TestContext::new();
        for (n, v) in values.iter().enumerate() {
            tc.push(Vliw::new().seti(1, *v).build());
            tc.push(Vliw::new().seti(2 + n as u64, *v).build());
            tc.clock(3);
        }
        tc.clock(4);
        prop_assert_eq!(tc.gpr(1), *values.last().unwrap());
        for (n, v) in values.iter().enumerate() {
            prop_assert_eq!(tc.gpr(2 + n), *v);
        }
    }
}
