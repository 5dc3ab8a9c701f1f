//! Per-mnemonic instruction parsers.
//!
//! Uses [`for_each_instruction!`](crate::for_each_instruction) to generate:
//! - [`schema_for`], the static flag schema of every opcode
//! - the construction of an [`Instruction`] from a validated [`FlagSet`]
//!
//! Each argument is read from the flag of the same entry in the instruction
//! table. A required flag supplies its value directly. An optional flag that
//! is absent yields the argument's zero value, and a presence-only switch
//! yields 1.

use crate::bytecode::argument::{
    Argument, BooleanArgument, NameArgument, NumberArgument, StringArgument,
};
use crate::bytecode::errors::FlagError;
use crate::bytecode::flags::{ArgKind, Flag, FlagSchema, FlagSet, SchemaEntry};
use crate::bytecode::isa::{Instruction, Opcode};
use crate::for_each_instruction;

macro_rules! define_instruction_parsers {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:literal, $mnemonic:literal => [
                $( $field:ident : $arg:ident = $presence:ident $flag:literal : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        /// Returns the required and optional flags accepted by `opcode`.
        pub const fn schema_for(opcode: Opcode) -> FlagSchema {
            match opcode {
                $(
                    Opcode::$name => {
                        const ENTRIES: &[SchemaEntry] = &[
                            $( SchemaEntry::$presence(Flag::new($flag, ArgKind::$kind)) ),*
                        ];
                        FlagSchema::new(ENTRIES)
                    }
                )*
            }
        }

        /// Builds the instruction for `opcode` from flags that already passed
        /// schema validation.
        fn build_instruction(opcode: Opcode, flags: &FlagSet<'_>) -> Result<Instruction, FlagError> {
            Ok(match opcode {
                $(
                    Opcode::$name => Instruction::$name {
                        $( $field: argument_from_flag::<$arg>($flag, flags)?, )*
                    },
                )*
            })
        }
    };
}

for_each_instruction!(define_instruction_parsers);

fn argument_from_flag<A: Argument>(name: &str, flags: &FlagSet<'_>) -> Result<A, FlagError> {
    let value = match flags.get(name) {
        None => 0,
        Some(None) => 1,
        Some(Some(value)) => value.value,
    };

    A::from_flag_value(value).ok_or_else(|| FlagError::OutOfRange {
        flag: name.to_string(),
        value,
    })
}

/// Parser bound to one mnemonic and its flag schema.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InstructionParser {
    opcode: Opcode,
    schema: FlagSchema,
}

impl InstructionParser {
    pub const fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            schema: schema_for(opcode),
        }
    }

    /// Parser for `mnemonic`, if it names an instruction.
    pub fn for_mnemonic(mnemonic: &str) -> Option<Self> {
        Opcode::from_mnemonic(mnemonic).map(Self::new)
    }

    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub const fn schema(&self) -> FlagSchema {
        self.schema
    }

    /// Parses the tokens following the mnemonic. Nothing is built unless
    /// every token and the whole flag set are valid.
    pub fn parse(&self, tokens: &[&str]) -> Result<Instruction, FlagError> {
        let flags = FlagSet::collect(tokens)?;
        self.schema.validate(&flags)?;
        build_instruction(self.opcode, &flags)
    }
}
