/// Assembly text of representative words.
pub mod disasm;
