//! Whole-program encoding, decoding and rendering.
//!
//! A [`Program`] is an ordered list of instructions. Its binary form is the
//! flat concatenation of the encoded instructions; its text form is one
//! rendered pseudo-yolk line per instruction.

use std::fs;
use std::path::Path;

use crate::bytecode::argument::ByteReader;
use crate::bytecode::errors::{DecodeError, ToolError};
use crate::bytecode::isa::Instruction;
use crate::{debug, info};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Total encoded size in bytes.
    pub fn byte_len(&self) -> usize {
        self.instructions.iter().map(Instruction::width).sum()
    }

    /// Encodes every instruction in order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        for instruction in &self.instructions {
            instruction.serialize_to(&mut out);
        }
        out
    }

    /// Decodes instructions back to back until the buffer is exhausted.
    ///
    /// Fails on the first unknown opcode or truncated instruction.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes, 0);
        let mut instructions = Vec::new();
        while !reader.is_exhausted() {
            instructions.push(Instruction::decode(&mut reader)?);
        }
        Ok(Self { instructions })
    }

    /// One rendered line per instruction, each terminated by `\n`.
    pub fn to_pseudo_yolk(&self) -> String {
        let mut out = String::new();
        for instruction in &self.instructions {
            out.push_str(&instruction.render());
            out.push('\n');
        }
        out
    }
}

pub(crate) fn read_input<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, ToolError> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| ToolError::Io {
        path: path.display().to_string(),
        source: e.to_string(),
    })
}

pub(crate) fn write_output<P: AsRef<Path>>(path: P, contents: &[u8]) -> Result<(), ToolError> {
    let path = path.as_ref();
    fs::write(path, contents).map_err(|e| ToolError::Io {
        path: path.display().to_string(),
        source: e.to_string(),
    })
}

/// Decodes the bytecode file `input` and writes its pseudo-yolk rendering to
/// `output`. Nothing is written if decoding fails.
pub fn decompile_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<Program, ToolError> {
    let bytes = read_input(&input)?;
    debug!(
        "Decoding {} byte(s) from {}",
        bytes.len(),
        input.as_ref().display()
    );

    let program = Program::from_bytes(&bytes)?;
    write_output(&output, program.to_pseudo_yolk().as_bytes())?;

    info!(
        "Decompiled {} instruction(s) into {}",
        program.len(),
        output.as_ref().display()
    );
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::argument::{BooleanArgument, NameArgument, NumberArgument};

    fn sample() -> Program {
        Program::from(vec![
            Instruction::Start {},
            Instruction::PushName {
                name: NameArgument::new(4),
            },
            Instruction::PushNum {
                val: NumberArgument::new(-1),
            },
            Instruction::Eval {
                discard: BooleanArgument::new(true),
            },
        ])
    }

    #[test]
    fn empty_program() {
        let program = Program::default();
        assert!(program.is_empty());
        assert!(program.to_bytes().is_empty());
        assert_eq!(program.to_pseudo_yolk(), "");
        assert_eq!(Program::from_bytes(&[]).unwrap(), program);
    }

    #[test]
    fn bytes_are_flat_concatenation() {
        let program = sample();
        let bytes = program.to_bytes();
        assert_eq!(program.byte_len(), 1 + 5 + 9 + 9);
        assert_eq!(bytes.len(), program.byte_len());
        assert_eq!(&bytes[..6], &[0, 1, 0, 0, 0, 4]);
        assert_eq!(Program::from_bytes(&bytes).unwrap(), program);
    }

    #[test]
    fn pseudo_yolk_lines() {
        assert_eq!(
            sample().to_pseudo_yolk(),
            "start-expression\npush-name --ref <4>\npush-num --val -1\neval --discard\n"
        );
    }

    #[test]
    fn from_bytes_rejects_trailing_garbage() {
        let mut bytes = sample().to_bytes();
        bytes.push(9);
        let offset = bytes.len() - 1;
        assert_eq!(
            Program::from_bytes(&bytes),
            Err(DecodeError::InvalidOpcode { opcode: 9, offset })
        );
    }

    #[test]
    fn from_bytes_rejects_truncation() {
        let bytes = sample().to_bytes();
        assert!(matches!(
            Program::from_bytes(&bytes[..bytes.len() - 1]),
            Err(DecodeError::UnexpectedEndOfBytecode { .. })
        ));
    }

    #[test]
    fn decompile_file_writes_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("program.yolk");
        let output = dir.path().join("program.psuedoyolk");
        fs::write(&input, sample().to_bytes()).unwrap();

        let program = decompile_file(&input, &output).unwrap();
        assert_eq!(program, sample());
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            sample().to_pseudo_yolk()
        );
    }

    #[test]
    fn decompile_file_reports_decode_errors() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.yolk");
        let output = dir.path().join("bad.psuedoyolk");
        fs::write(&input, [2, 0, 0]).unwrap();

        assert!(matches!(
            decompile_file(&input, &output),
            Err(ToolError::Decode(DecodeError::UnexpectedEndOfBytecode { .. }))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn decompile_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = decompile_file(dir.path().join("absent.yolk"), dir.path().join("out"));
        assert!(matches!(result, Err(ToolError::Io { .. })));
    }
}
