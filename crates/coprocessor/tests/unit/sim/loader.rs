//! Program image loading.

use k128cp2_core::sim::loader::load_program;
use pretty_assertions::assert_eq;

use crate::common::builder::Vliw;

#[test]
fn loads_little_endian_words() {
    let program = [Vliw::new().seti(1, 5).build(), Vliw::new().stopi(1).build()];
    let bytes: Vec<u8> = program.iter().flat_map(|w| w.to_le_bytes()).collect();
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), bytes).unwrap();

    assert_eq!(load_program(file.path()).unwrap(), program.to_vec());
}

#[test]
fn partial_word_is_an_error() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), [0u8; 9]).unwrap();
    assert!(load_program(file.path()).is_err());
}

#[test]
fn empty_image_loads_nothing() {
    let file = tempfile::NamedTempFile::new().unwrap();
    assert!(load_program(file.path()).unwrap().is_empty());
}
