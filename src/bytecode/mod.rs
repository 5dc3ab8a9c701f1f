//! Yolk bytecode and its pseudo-yolk text form.
//!
//! Yolk is a flat, stack-oriented bytecode: each instruction is a one-byte
//! opcode tag followed by at most one fixed-width, big-endian argument.
//! Pseudo-yolk is its line-oriented textual rendering, one mnemonic with
//! `--flag value` modifiers per line.
//!
//! # Instruction set
//!
//! | Tag | Mnemonic           | Flags                    | Width |
//! |-----|--------------------|--------------------------|-------|
//! | 0   | `start-expression` |                          | 1     |
//! | 1   | `push-name`        | `--ref <N>` (required)   | 5     |
//! | 2   | `push-num`         | `--val I` (required)     | 9     |
//! | 3   | `push-str`         | `--ref <N>` (required)   | 5     |
//! | 4   | `push-bool`        | `--val B` (required)     | 9     |
//! | 5   | `eval`             | `--discard` (optional)   | 9     |
//!
//! # Modules
//!
//! - [`argument`]: Fixed-width argument codec
//! - [`assembler`]: Line-oriented pseudo-yolk to bytecode pipeline
//! - [`errors`]: Flag, assembler, decoding and file-level error types
//! - [`flags`]: Flag schemas, token classification and validation
//! - [`isa`]: Instruction table, opcodes and the instruction codec
//! - [`parser`]: Per-mnemonic construction of instructions from flags
//! - [`program`]: Whole-program encoding, decoding and rendering

pub mod argument;
pub mod assembler;
pub mod errors;
pub mod flags;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod parser;
pub mod program;
