/// VLIW word builder.
pub mod vliw;

pub use vliw::Vliw;
