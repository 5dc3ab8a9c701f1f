use yolk_derive::Error;

/// Reason a line's flags were rejected by an instruction parser.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlagError {
    /// A value token that does not follow a `--flag` marker.
    #[error("value `{token}` does not follow a flag")]
    StrayValue { token: String },
    /// A value token that is neither a reference, a boolean nor an integer.
    #[error("malformed value `{token}` for flag --{flag}")]
    MalformedValue { flag: String, token: String },
    /// A required flag is absent.
    #[error("missing required flag --{flag}")]
    MissingRequired { flag: String },
    /// A flag the mnemonic does not declare.
    #[error("unexpected flag --{flag}")]
    Undeclared { flag: String },
    /// A declared flag whose value has the wrong kind.
    #[error("flag --{flag} expects {expected}")]
    KindMismatch { flag: String, expected: &'static str },
    /// A value that does not fit the argument it feeds.
    #[error("value {value} of flag --{flag} is out of range")]
    OutOfRange { flag: String, value: i64 },
}

/// Line-numbered assembler diagnostic. Lines are 1-based.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum YolkError {
    /// Mnemonic is not part of the instruction table.
    #[error("Instruction {line}: Unknown instruction {mnemonic}.")]
    UnknownInstruction { line: usize, mnemonic: String },
    /// Mnemonic is known but its flags were rejected.
    #[error("Instruction {line}: Unable to parse instruction {mnemonic}.")]
    FailedToParseInstruction {
        line: usize,
        mnemonic: String,
        reason: FlagError,
    },
}

impl YolkError {
    /// Source line the error was reported on.
    pub fn line(&self) -> usize {
        match self {
            YolkError::UnknownInstruction { line, .. }
            | YolkError::FailedToParseInstruction { line, .. } => *line,
        }
    }

    pub fn mnemonic(&self) -> &str {
        match self {
            YolkError::UnknownInstruction { mnemonic, .. }
            | YolkError::FailedToParseInstruction { mnemonic, .. } => mnemonic,
        }
    }

    /// Why the flags were rejected, for parse failures.
    pub fn reason(&self) -> Option<&FlagError> {
        match self {
            YolkError::UnknownInstruction { .. } => None,
            YolkError::FailedToParseInstruction { reason, .. } => Some(reason),
        }
    }
}

/// Errors raised while decoding a bytecode buffer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer ended in the middle of an instruction.
    #[error(
        "unexpected end of bytecode at offset {offset}: needed {requested} byte(s), {available} available"
    )]
    UnexpectedEndOfBytecode {
        offset: usize,
        requested: usize,
        available: usize,
    },
    /// Tag byte outside the opcode table.
    #[error("invalid opcode {opcode} at offset {offset}")]
    InvalidOpcode { opcode: u8, offset: usize },
}

/// Errors of the file-level compile and decompile operations.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("io error on {path}: {source}")]
    Io { path: String, source: String },
    /// The source had diagnostics; nothing was written.
    #[error("compilation failed with {count} error(s)")]
    CompilationFailed { count: usize, errors: Vec<YolkError> },
    #[error("decoding error: {0}")]
    Decode(DecodeError),
}

impl From<DecodeError> for ToolError {
    fn from(err: DecodeError) -> Self {
        ToolError::Decode(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_instruction_message() {
        let err = YolkError::UnknownInstruction {
            line: 4,
            mnemonic: "push-float".to_string(),
        };
        assert_eq!(err.to_string(), "Instruction 4: Unknown instruction push-float.");
        assert_eq!(err.line(), 4);
        assert_eq!(err.mnemonic(), "push-float");
        assert!(err.reason().is_none());
    }

    #[test]
    fn failed_to_parse_message_omits_reason() {
        let err = YolkError::FailedToParseInstruction {
            line: 1,
            mnemonic: "start-expression".to_string(),
            reason: FlagError::Undeclared {
                flag: "unknown_arg".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Instruction 1: Unable to parse instruction start-expression."
        );
        assert_eq!(
            err.reason().map(ToString::to_string).as_deref(),
            Some("unexpected flag --unknown_arg")
        );
    }

    #[test]
    fn decode_error_messages() {
        let err = DecodeError::UnexpectedEndOfBytecode {
            offset: 3,
            requested: 8,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "unexpected end of bytecode at offset 3: needed 8 byte(s), 2 available"
        );

        let err = DecodeError::InvalidOpcode {
            opcode: 0xFF,
            offset: 0,
        };
        assert_eq!(err.to_string(), "invalid opcode 255 at offset 0");
    }

    #[test]
    fn tool_error_wraps_decode_error() {
        let err: ToolError = DecodeError::InvalidOpcode {
            opcode: 9,
            offset: 5,
        }
        .into();
        assert_eq!(err.to_string(), "decoding error: invalid opcode 9 at offset 5");

        let err = ToolError::CompilationFailed {
            count: 2,
            errors: Vec::new(),
        };
        assert_eq!(err.to_string(), "compilation failed with 2 error(s)");
    }
}
