//! Instruction Set Architecture (ISA) definitions.
//!
//! The [`for_each_instruction!`](crate::for_each_instruction) macro holds the
//! canonical instruction table and invokes a callback macro for code
//! generation, so every per-opcode concern is derived from a single list.
//!
//! This module generates:
//! - The [`Opcode`] tag enum with `TryFrom<u8>` and mnemonic lookup
//! - The [`Instruction`] enum with width, encoding, decoding and rendering
//!
//! See [`parser`](super::parser) for the flag schemas and the construction of
//! instructions from pseudo-yolk flags.
//!
//! # Bytecode Format
//!
//! Instructions are a 1-byte opcode tag followed by at most one fixed-width
//! argument (see [`argument`](super::argument)). A program is a flat
//! concatenation of instructions without header or terminator.

use std::fmt;

use crate::bytecode::argument::{
    Argument, BooleanArgument, ByteReader, NameArgument, NumberArgument, StringArgument,
};
use crate::bytecode::errors::DecodeError;
use crate::bytecode::flags::ArgKind;

/// Invokes a callback macro with the complete instruction definition list.
///
/// Each entry is `Variant = tag, "mnemonic" => [fields]` where a field reads
/// `field: ArgumentType = required|optional "flag": FlagKind`.
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            /// start-expression ; opens a new expression
            Start = 0, "start-expression" => [],
            /// push-name --ref <N> ; pushes the named binding N
            PushName = 1, "push-name" => [name: NameArgument = required "ref": RefId],
            /// push-num --val I ; pushes the integer literal I
            PushNum = 2, "push-num" => [val: NumberArgument = required "val": Num],
            /// push-str --ref <N> ; pushes the interned string N
            PushString = 3, "push-str" => [string: StringArgument = required "ref": RefId],
            /// push-bool --val true|false ; pushes a boolean literal
            PushBool = 4, "push-bool" => [val: BooleanArgument = required "val": Bool],
            /// eval [--discard] ; evaluates the open expression, dropping the result if discard is set
            Eval = 5, "eval" => [discard: BooleanArgument = optional "discard": None],
        }
    };
}

macro_rules! define_instructions {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:literal, $mnemonic:literal => [
                $( $field:ident : $arg:ident = $presence:ident $flag:literal : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        // =========================
        // Opcode tags
        // =========================
        #[repr(u8)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl TryFrom<u8> for Opcode {
            /// The rejected tag byte.
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $opcode => Ok(Opcode::$name), )*
                    _ => Err(value),
                }
            }
        }

        impl Opcode {
            /// Every opcode in tag order.
            pub const ALL: &'static [Opcode] = &[ $( Opcode::$name ),* ];

            /// Returns the pseudo-yolk mnemonic for this opcode.
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $( Opcode::$name => $mnemonic, )*
                }
            }

            /// Looks up an opcode by exact mnemonic.
            pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
                match mnemonic {
                    $( $mnemonic => Some(Opcode::$name), )*
                    _ => None,
                }
            }

            /// Encoded size of an instruction with this opcode (tag + argument).
            pub const fn width(self) -> usize {
                match self {
                    $( Opcode::$name => 1usize $( + <$arg as Argument>::WIDTH )*, )*
                }
            }
        }

        // =========================
        // Instruction enum
        // =========================
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Instruction {
            $(
                $(#[$doc])*
                $name { $( $field: $arg ),* },
            )*
        }

        impl Instruction {
            pub const fn opcode(&self) -> Opcode {
                match self {
                    $( Instruction::$name { .. } => Opcode::$name, )*
                }
            }

            pub const fn mnemonic(&self) -> &'static str {
                self.opcode().mnemonic()
            }

            /// Encoded size in bytes, including the opcode tag.
            pub const fn width(&self) -> usize {
                self.opcode().width()
            }

            /// Appends the opcode tag and the argument bytes to `out`.
            pub fn serialize_to(&self, out: &mut Vec<u8>) {
                match self {
                    $(
                        Instruction::$name { $( $field ),* } => {
                            out.push(Opcode::$name as u8);
                            $( $field.encode(out); )*
                        }
                    )*
                }
            }

            pub fn serialize(&self) -> Vec<u8> {
                let mut out = Vec::with_capacity(self.width());
                self.serialize_to(&mut out);
                out
            }

            /// Decodes one instruction at the reader's cursor.
            pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
                let offset = reader.position();
                let tag = reader.read_u8()?;
                let opcode = Opcode::try_from(tag)
                    .map_err(|opcode| DecodeError::InvalidOpcode { opcode, offset })?;

                Ok(match opcode {
                    $(
                        Opcode::$name => Instruction::$name {
                            $( $field: <$arg as Argument>::decode(reader)?, )*
                        },
                    )*
                })
            }
        }

        impl fmt::Display for Instruction {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(
                        Instruction::$name { $( $field ),* } => {
                            f.write_str($mnemonic)?;
                            $( write_flag(f, $flag, ArgKind::$kind, $field)?; )*
                            Ok(())
                        }
                    )*
                }
            }
        }
    };
}

for_each_instruction!(define_instructions);

/// Writes ` --flag value`, or ` --flag` alone for presence-only flags that are set.
fn write_flag<A: Argument>(
    f: &mut fmt::Formatter<'_>,
    flag: &str,
    kind: ArgKind,
    arg: &A,
) -> fmt::Result {
    match kind {
        ArgKind::None if arg.flag_value() != 0 => write!(f, " --{flag}"),
        ArgKind::None => Ok(()),
        _ => write!(f, " --{flag} {arg}"),
    }
}

impl Instruction {
    /// Decodes the instruction whose tag byte sits at `from`.
    pub fn deserialize(buffer: &[u8], from: usize) -> Result<Self, DecodeError> {
        Self::decode(&mut ByteReader::new(buffer, from))
    }

    /// Canonical pseudo-yolk line, without trailing newline.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// Reads the tag at `from` and decodes the matching instruction.
pub fn deserialize(buffer: &[u8], from: usize) -> Result<Instruction, DecodeError> {
    Instruction::deserialize(buffer, from)
}
