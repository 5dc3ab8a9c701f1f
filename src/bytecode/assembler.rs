//! Pseudo-yolk assembler.
//!
//! Converts pseudo-yolk text into yolk bytecode, one instruction per line.
//!
//! # Syntax
//!
//! ```text
//! mnemonic --flag value --switch ...
//! ```
//!
//! - Mnemonics are lowercase and match exactly (e.g. `push-num`, `eval`)
//! - References are written `<N>` (e.g. `--ref <3>`)
//! - Integers are signed decimal (e.g. `--val -42`)
//! - Booleans are `true` or `false`
//! - Blank lines are skipped and do not produce an instruction
//!
//! Every line is processed even after a failure; all diagnostics are
//! collected with their 1-based line numbers.

use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::bytecode::errors::{ToolError, YolkError};
use crate::bytecode::isa::Instruction;
use crate::bytecode::parser::InstructionParser;
use crate::bytecode::program::{Program, write_output};
use crate::{debug, error, info};

/// Splits a line into its mnemonic and the following tokens.
/// Returns `None` for blank lines.
pub fn tokenize(line: &str) -> Option<(&str, Vec<&str>)> {
    let mut tokens = line.split_whitespace();
    let mnemonic = tokens.next()?;
    Some((mnemonic, tokens.collect()))
}

/// Assembles one line. Returns `None` for blank lines.
pub fn assemble_line(line_no: usize, line: &str) -> Option<Result<Instruction, YolkError>> {
    let (mnemonic, tokens) = tokenize(line)?;

    let Some(parser) = InstructionParser::for_mnemonic(mnemonic) else {
        return Some(Err(YolkError::UnknownInstruction {
            line: line_no,
            mnemonic: mnemonic.to_string(),
        }));
    };

    Some(
        parser
            .parse(&tokens)
            .map_err(|reason| YolkError::FailedToParseInstruction {
                line: line_no,
                mnemonic: mnemonic.to_string(),
                reason,
            }),
    )
}

/// Result of one assembler pass: instructions and diagnostics, both in line order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assembly {
    instructions: Vec<Instruction>,
    errors: Vec<YolkError>,
}

impl Assembly {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn errors(&self) -> &[YolkError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// The assembled program, or every diagnostic if any line failed.
    pub fn into_program(self) -> Result<Program, Vec<YolkError>> {
        if self.errors.is_empty() {
            Ok(Program::from(self.instructions))
        } else {
            Err(self.errors)
        }
    }
}

/// Assembles every line; line numbers start at 1.
pub fn assemble_lines<I, S>(lines: I) -> Assembly
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut assembly = Assembly::default();
    for (index, line) in lines.into_iter().enumerate() {
        match assemble_line(index + 1, line.as_ref()) {
            Some(Ok(instruction)) => assembly.instructions.push(instruction),
            Some(Err(err)) => assembly.errors.push(err),
            None => {}
        }
    }
    assembly
}

pub fn assemble_source(source: &str) -> Assembly {
    assemble_lines(source.lines())
}

/// Formats a compiler-style diagnostic pointing at the offending mnemonic.
pub fn render_diagnostic(file: &str, source: &str, err: &YolkError) -> String {
    let line = err.line();
    let raw_line = source
        .lines()
        .nth(line.saturating_sub(1))
        .map(|l| l.trim_end_matches('\r'));
    let column = raw_line
        .and_then(|l| l.find(err.mnemonic()).map(|offset| l[..offset].chars().count()))
        .map_or(1, |chars| chars + 1);

    let mut diag = String::new();
    let _ = writeln!(diag, "error: {err}");
    let _ = writeln!(diag, " --> {file}:{line}:{column}");

    if let Some(line_text) = raw_line {
        let underline = " ".repeat(column - 1);
        let carets = "^".repeat(err.mnemonic().chars().count().max(1));
        let _ = writeln!(diag, "  |");
        let _ = writeln!(diag, "{:>4} | {}", line, line_text);
        let _ = writeln!(diag, "  | {}{}", underline, carets);
    }
    if let Some(reason) = err.reason() {
        let _ = writeln!(diag, "  = note: {reason}");
    }

    diag
}

/// Assembles the pseudo-yolk file `input` and writes its bytecode to `output`.
///
/// On any diagnostic, every error is logged and nothing is written.
pub fn compile_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<Program, ToolError> {
    let input = input.as_ref();
    let file_name = input.display().to_string();
    let source = fs::read_to_string(input).map_err(|e| ToolError::Io {
        path: file_name.clone(),
        source: e.to_string(),
    })?;

    let assembly = assemble_source(&source);
    debug!(
        "Assembled {} instruction(s) with {} error(s) from {}",
        assembly.instruction_count(),
        assembly.errors().len(),
        file_name
    );

    let program = match assembly.into_program() {
        Ok(program) => program,
        Err(errors) => {
            error!("Compilation failed..");
            for err in &errors {
                error!("{}", render_diagnostic(&file_name, &source, err));
            }
            return Err(ToolError::CompilationFailed {
                count: errors.len(),
                errors,
            });
        }
    };

    write_output(&output, &program.to_bytes())?;
    info!(
        "Compiled {} instruction(s) ({} bytes) into {}",
        program.len(),
        program.byte_len(),
        output.as_ref().display()
    );
    Ok(program)
}
