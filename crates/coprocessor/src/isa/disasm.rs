//! Instruction disassembler.
//!
//! Converts a 64-bit VLIW word into `hi ; lo` assembly text for the
//! instruction dump, the CLI `disasm` command and test diagnostics.
//! Unassigned opcodes render as `.word` so a dump never fails.
//!
//! # Usage
//!
//! ```
//! use k128cp2_core::isa::disasm::disassemble;
//! use k128cp2_core::isa::Instruction;
//! let text = disassemble(Instruction(0));
//! assert_eq!(text, "nop ; nop");
//! ```

use super::instruction::Instruction;
use super::opcodes::{HiOp, LoOp};

const MOVE_CLASSES: [&str; 7] = ["r", "f", "c", "a", "n", "m", "i"];
const SETI_CLASSES: [&str; 4] = ["r", "a", "n", "m"];
const CCOND_FORMATS: [&str; 4] = ["s", "w", "ps", "pw"];
const CCOND_NAMES: [&str; 8] = ["t", "un", "lt", "le", "eq", "ne", "gt", "ge"];

/// Renders one instruction word.
///
/// # Arguments
///
/// * `word` - The instruction to render.
///
/// # Returns
///
/// `hi ; lo` assembly text.
pub fn disassemble(word: Instruction) -> String {
    format!("{} ; {}", hi_text(word), lo_text(word))
}

fn hi_text(i: Instruction) -> String {
    let Ok(op) = HiOp::try_from(i.hi_opcode()) else {
        return format!(".word 0x{:08x}", i.0 >> 32);
    };
    let m = op.mnemonic();
    let (fd, fs, ft, fq) = (i.fd(), i.fs(), i.ft(), i.fq());
    let text = match op {
        HiOp::Nop => m.to_string(),
        HiOp::Clear | HiOp::RdSec | HiOp::GetCoeff => format!("{m} f{fd}"),
        HiOp::Li0 | HiOp::Li1 | HiOp::Li2 | HiOp::Li3 => format!("{m} f{fd}, 0x{:04x}", i.imm16()),
        HiOp::AddI | HiOp::SubI => format!("{m} f{fd}, f{fs}, {}", i.imm12()),
        HiOp::IncI | HiOp::DecI => format!("{m} f{fd}, {}", i.imm18()),
        HiOp::LShiftI | HiOp::AShiftI => format!("{m} f{fd}, f{fs}, {}", i.imm6()),
        HiOp::Mfc => format!("{m} f{fd}, {}", fpu_ctrl_name(i.cntrlreg())),
        HiOp::Mtc => format!("{m} {}, f{fd}", fpu_ctrl_name(i.cntrlreg())),
        HiOp::Ccond => {
            let fmt = CCOND_FORMATS[i.fmt() as usize];
            let cond = CCOND_NAMES[i.cond() as usize];
            format!("c.{cond}.{fmt} cc{}, f{fs}, f{ft}", i.cc1())
        }
        HiOp::QsDot => format!("{m} f{fd}.{}, f{fs}, f{ft}", if i.mode() == 0 { "lo" } else { "hi" }),
        HiOp::CaddSub | HiOp::PsAddSub | HiOp::MTrans => format!("{m} f{fd}, f{fq}, f{fs}, f{ft}"),
        HiOp::Split32 | HiOp::RrLog2 => format!("{m} f{fd}, f{fq}, f{fs}"),
        HiOp::Recip | HiOp::Sinc | HiOp::Atanc | HiOp::Log2c | HiOp::Exp2 | HiOp::Rsqrt => {
            let (src, dst) = match i.elf_cond() {
                0 => ("lo", "lo"),
                1 => ("hi", "lo"),
                2 => ("lo", "hi"),
                _ => ("hi", "hi"),
            };
            format!("{m} f{fd}.{dst}, f{fs}.{src}")
        }
        HiOp::Copy
        | HiOp::SwapHl
        | HiOp::Swap64
        | HiOp::Cneg
        | HiOp::Cmuli
        | HiOp::Cmulni
        | HiOp::Cconj
        | HiOp::PsNeg
        | HiOp::PsAbs
        | HiOp::PsGetExp
        | HiOp::PsGetMan
        | HiOp::Abs
        | HiOp::Neg
        | HiOp::Not
        | HiOp::PwToPs
        | HiOp::PsToPw
        | HiOp::Split8
        | HiOp::Split16
        | HiOp::ExtSign8H
        | HiOp::ExtSign8W
        | HiOp::ExtSign16W
        | HiOp::Join8
        | HiOp::Join16
        | HiOp::RrCosSin
        | HiOp::RrSin
        | HiOp::RrCos => format!("{m} f{fd}, f{fs}"),
        HiOp::Unpck16WsToPs => format!("{m} f{fd}, f{fs}, f{ft}"),
        _ => format!("{m} f{fd}, f{fs}, f{ft}"),
    };
    match i.cc() {
        0 => text,
        cc => format!("{text} ?cc{cc}"),
    }
}

fn lo_text(i: Instruction) -> String {
    let Ok(op) = LoOp::try_from(i.lo_opcode()) else {
        return format!(".word 0x{:08x}", i.0 & 0xffff_ffff);
    };
    let m = op.mnemonic();
    match op {
        LoOp::Nop | LoOp::Ret | LoOp::EndDo | LoOp::Sync | LoOp::StartDma => m.to_string(),
        LoOp::StopI | LoOp::RunI | LoOp::JumpI | LoOp::CallI => format!("{m} 0x{:04x}", i.imm13()),
        LoOp::Stop | LoOp::Run | LoOp::Jump | LoOp::Call => format!("{m} r{}", i.gs()),
        LoOp::Clr => format!("{m} a{}", i.gs()),
        LoOp::CheckDma => format!("{m} r{}", i.gt()),
        LoOp::DoI => format!("{m} {}, 0x{:04x}", i.cnt10(), i.imm13()),
        LoOp::Do => format!("{m} r{}, 0x{:04x}", i.gs(), i.imm13()),
        LoOp::SetI => {
            let class = SETI_CLASSES[i.regtype() as usize];
            format!("{m} {class}{}, 0x{:04x}", i.gt(), i.imm16lo())
        }
        LoOp::Move => {
            let dst = MOVE_CLASSES.get(i.dtyp() as usize).copied().unwrap_or("?");
            let src = MOVE_CLASSES.get(i.styp() as usize).copied().unwrap_or("?");
            format!("{m} {dst}{}, {src}{}", i.gt(), i.gs())
        }
        LoOp::MtFpr => {
            let src = if i.mfpr() == 0 { "r" } else { "i" };
            format!("{m} f{}, {src}{}, {}", i.ft2(), i.gs(), section_name(i.secn()))
        }
        LoOp::MfFpr => {
            let dst = if i.mfpr() == 0 { "r" } else { "i" };
            format!("{m} {dst}{}, f{}, {}", i.gs(), i.ft2(), section_name(i.secn()))
        }
        LoOp::PsPrmSgn0 | LoOp::PsPrmSgn1 => {
            let bank = if op == LoOp::PsPrmSgn1 { 32 } else { 0 };
            let lanes: Vec<String> = (0..4)
                .map(|k| format!("{}{}", if i.neg_lane(k) { "-" } else { "" }, i.sel_lane(k)))
                .collect();
            format!("{m} f{}, f{}, [{}]", i.fd2() + bank, i.ft2(), lanes.join(","))
        }
        _ => match op.mem_access() {
            Some(access) => {
                use super::opcodes::{AccessClass, AddrMode};
                let rn = i.gs();
                let ea = match access.mode {
                    AddrMode::Imm => format!("0x{:04x}", i.imm13()),
                    AddrMode::PostInc => format!("(a{rn})+"),
                    AddrMode::PostDec => format!("(a{rn})-"),
                    AddrMode::Offset => format!("(a{rn}){:+}", i.offset13()),
                };
                match access.class {
                    AccessClass::UpdateAddr => format!("{m} {ea}"),
                    AccessClass::Load | AccessClass::Store => format!("{m} f{}, {ea}", i.ft2()),
                }
            }
            None => m.to_string(),
        },
    }
}

fn fpu_ctrl_name(n: u32) -> String {
    match n {
        0 => "fccr".to_string(),
        1 => "fcsr".to_string(),
        _ => format!("fc{n}"),
    }
}

fn section_name(secn: usize) -> String {
    if secn >= 4 {
        "all".to_string()
    } else {
        format!("s{secn}")
    }
}
