//! Yolk library.
//!
//! Assembles pseudo-yolk text into yolk bytecode and decompiles bytecode back
//! into pseudo-yolk.

pub mod bytecode;
pub mod utils;
