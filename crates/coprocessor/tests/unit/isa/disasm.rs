//! Disassembly of builder-encoded words.

use k128cp2_core::isa::HiOp;
use k128cp2_core::isa::disasm::disassemble;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder::Vliw;

#[rstest]
#[case::seti(Vliw::new().seti(1, 0x21), "nop ; seti r1, 0x0021")]
#[case::seti_addr(Vliw::new().seti_addr(3, 4, 0xff), "nop ; seti m4, 0x00ff")]
#[case::stopi(Vliw::new().stopi(7), "nop ; stopi 0x0007")]
#[case::stop(Vliw::new().stop(4), "nop ; stop r4")]
#[case::calli(Vliw::new().calli(4), "nop ; calli 0x0004")]
#[case::ret(Vliw::new().ret(), "nop ; ret")]
#[case::doi(Vliw::new().doi(3, 2), "nop ; doi 3, 0x0002")]
#[case::do_reg(Vliw::new().do_(4, 5), "nop ; do r4, 0x0005")]
#[case::updaddrnp(Vliw::new().updaddrnp(0), "nop ; updaddrnp (a0)+")]
#[case::swnp(Vliw::new().swnp(9, 2), "nop ; swnp f9, (a2)+")]
#[case::lwi(Vliw::new().lwi(6, 0x40), "nop ; lwi f6, 0x0040")]
#[case::check_dma(Vliw::new().check_dma(4), "nop ; check_dma r4")]
#[case::ccond(Vliw::new().ccond(1, 2, 6, 1, 2), "c.gt.w cc2, f1, f2 ; nop")]
#[case::predicated(Vliw::new().hi(HiOp::Add, 3, 1, 2).pred(2), "add f3, f1, f2 ?cc2 ; nop")]
#[case::both_halves(Vliw::new().hi(HiOp::Copy, 7, 6, 0).swi(3, 0x41), "copy f7, f6 ; swi f3, 0x0041")]
fn renders(#[case] word: Vliw, #[case] text: &str) {
    assert_eq!(disassemble(word.instruction()), text);
}

/// Immediates are shown sign-extended.
#[test]
fn negative_immediate() {
    let word = Vliw::new().hi(HiOp::AddI, 3, 1, 0).imm(0xfff);
    assert_eq!(disassemble(word.instruction()), "addi f3, f1, -1 ; nop");
}
