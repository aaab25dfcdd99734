//! Arithmetic pipe tests.
//!
//! Operands are planted directly in every section's FPRs after loading, so
//! each program only needs the operation under test and a `stopi`.

use k128cp2_core::common::constants::NUM_SECTIONS;
use k128cp2_core::core::arch::status::{FCSR_CAUSE, STATUS_FPE};
use k128cp2_core::core::units::fpu::exception_flags::FpFlags;
use k128cp2_core::isa::HiOp;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder::Vliw;
use crate::common::builder::vliw::NOP;
use crate::common::harness::TestContext;

const fn pack(hi: u32, lo: u32) -> u64 {
    ((hi as u64) << 32) | lo as u64
}

fn pair(v: f32) -> u64 {
    pack(v.to_bits(), v.to_bits())
}

/// Runs `word; stopi 0` with f1 = `a` and f2 = `b` in every section.
fn run_with_operands(word: u64, a: u64, b: u64) -> TestContext {
    let mut tc = TestContext::new().load(&[word, Vliw::new().stopi(0).build()]);
    tc.set_fpr_all(1, a);
    tc.set_fpr_all(2, b);
    tc.run();
    tc
}

#[rstest]
#[case::add_wraps_per_half(HiOp::Add, pack(1, 0xffff_ffff), pack(2, 1), pack(3, 0))]
#[case::sub_wraps_per_half(HiOp::Sub, pack(5, 0), pack(7, 1), pack(0xffff_fffe, 0xffff_ffff))]
#[case::and(HiOp::And, 0xff00_ff00_ff00_ff00, 0x0ff0_0ff0_0ff0_0ff0, 0x0f00_0f00_0f00_0f00)]
#[case::or(HiOp::Or, 0xff00_ff00_ff00_ff00, 0x0ff0_0ff0_0ff0_0ff0, 0xfff0_fff0_fff0_fff0)]
#[case::xor(HiOp::Xor, 0xff00_ff00_ff00_ff00, 0x0ff0_0ff0_0ff0_0ff0, 0xf0f0_f0f0_f0f0_f0f0)]
#[case::not(HiOp::Not, 0xff00_ff00_ff00_ff00, 0, 0x00ff_00ff_00ff_00ff)]
#[case::neg(HiOp::Neg, pack(1, 0), 0, pack(0xffff_ffff, 0))]
#[case::abs(HiOp::Abs, pack(0xffff_fffb, 7), 0, pack(5, 7))]
#[case::lshift_left(HiOp::LShift, pack(1, 0x8000_0001), pack(0, 4), pack(0x10, 0x10))]
#[case::ashift_right(HiOp::AShift, pack(0x8000_0000, 0x40), pack(0, 0xffff_fffc), pack(0xf800_0000, 4))]
fn integer_ops(#[case] op: HiOp, #[case] a: u64, #[case] b: u64, #[case] expected: u64) {
    let tc = run_with_operands(Vliw::new().hi(op, 3, 1, 2).build(), a, b);
    for s in 0..NUM_SECTIONS {
        assert_eq!(tc.fpr(s, 3), expected, "section {s}");
    }
}

#[rstest]
#[case::addi(HiOp::AddI, 5, pack(1, 2), pack(6, 7))]
#[case::subi(HiOp::SubI, 3, pack(1, 2), pack(0xffff_fffe, 0xffff_ffff))]
#[case::lshifti(HiOp::LShiftI, 4, pack(1, 2), pack(0x10, 0x20))]
fn immediate_ops(#[case] op: HiOp, #[case] imm: u64, #[case] a: u64, #[case] expected: u64) {
    let word = Vliw::new().hi(op, 3, 1, 0).imm(imm).build();
    let tc = run_with_operands(word, a, 0);
    assert_eq!(tc.fpr(0, 3), expected);
}

/// `li2` replaces one 16-bit lane and keeps the others.
#[test]
fn load_immediate_lane() {
    let mut tc = TestContext::new().load(&[
        Vliw::new().hi(HiOp::Li2, 7, 0, 0).imm(0xbeef).build(),
        Vliw::new().stopi(0).build(),
    ]);
    tc.set_fpr_all(7, 0x1111_2222_3333_4444);
    tc.run();
    assert_eq!(tc.fpr(1, 7), 0x1111_beef_3333_4444);
}

/// `rdsec` gives every section its own number.
#[test]
fn rdsec_differs_per_section() {
    let mut tc = TestContext::new().load(&[
        Vliw::new().hi(HiOp::RdSec, 9, 0, 0).build(),
        Vliw::new().stopi(0).build(),
    ]);
    tc.run();
    for s in 0..NUM_SECTIONS {
        assert_eq!(tc.fpr(s, 9), s as u64);
    }
}

#[rstest]
#[case::overflow(HiOp::PsAdd, f32::MAX, FpFlags::OF, f32::INFINITY)]
#[case::underflow(HiOp::PsMul, 1e-30, FpFlags::UF, 0.0)]
fn exception_flags_raised(#[case] op: HiOp, #[case] operand: f32, #[case] flag: FpFlags, #[case] result: f32) {
    let tc = run_with_operands(Vliw::new().hi(op, 3, 1, 2).build(), pair(operand), pair(operand));
    let m = tc.machine();
    for s in 0..NUM_SECTIONS {
        let fcsr = m.regs.sections[s].fcsr;
        assert_ne!(fcsr & flag.fcsr_flags(), 0, "flags of section {s}");
        assert_ne!(fcsr & flag.fcsr_cause(), 0, "cause of section {s}");
    }
    assert_ne!(m.regs.status() & flag.status_fpe() & STATUS_FPE, 0);
    assert_eq!(tc.fpr(0, 3), pair(result));
}

/// A clean operation clears FCSR.cause but keeps the sticky flags.
#[test]
fn flags_are_sticky_across_operations() {
    let mut tc = TestContext::new().load(&[
        Vliw::new().hi(HiOp::PsAdd, 3, 1, 2).build(),
        Vliw::new().hi(HiOp::PsAdd, 4, 5, 5).build(),
        Vliw::new().stopi(0).build(),
    ]);
    tc.set_fpr_all(1, pair(f32::MAX));
    tc.set_fpr_all(2, pair(f32::MAX));
    tc.set_fpr_all(5, pair(1.0));
    tc.run();

    let fcsr = tc.machine().regs.sections[2].fcsr;
    assert_ne!(fcsr & FpFlags::OF.fcsr_flags(), 0);
    assert_eq!(fcsr & FCSR_CAUSE, 0);
    assert_eq!(tc.fpr(2, 4), pair(2.0));
}

/// `c.gt.w` sets an FCCR bit per section and a predicated add only runs where it is set.
#[test]
fn ccond_predicates_following_operation() {
    let mut program = vec![Vliw::new().ccond(1, 2, 6, 1, 2).build()];
    program.extend([NOP; 8]);
    program.push(Vliw::new().hi(HiOp::Add, 5, 3, 3).pred(2).build());
    program.push(Vliw::new().stopi(0).build());

    let mut tc = TestContext::new().load(&program);
    for s in 0..NUM_SECTIONS {
        tc.machine_mut().regs.sections[s].fpr[1] = s as u64;
    }
    tc.set_fpr_all(2, 1);
    tc.set_fpr_all(3, pack(1, 1));
    tc.run();

    let m = tc.machine();
    for s in 0..NUM_SECTIONS {
        let taken = s > 1;
        assert_eq!(m.regs.sections[s].fccr & 0b100 != 0, taken, "fccr of section {s}");
        let expected = if taken { pack(2, 2) } else { 0 };
        assert_eq!(tc.fpr(s, 5), expected, "f5 of section {s}");
        assert_eq!(m.regs.sections[s].fccr & 1, 1, "bit 0 stays set");
    }
}
