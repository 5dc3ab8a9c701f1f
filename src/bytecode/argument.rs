//! Fixed-width instruction arguments.
//!
//! Every argument kind has a statically known width, so an instruction's
//! encoded size only depends on its opcode.
//!
//! # Encoding
//!
//! - Reference ids (`NameArgument`, `StringArgument`): `u32`, 4 bytes, big-endian
//! - Integers (`NumberArgument`): `i64` two's complement, 8 bytes, big-endian
//! - Booleans (`BooleanArgument`): same layout as integers, 0 = false

use std::fmt;

use crate::bytecode::errors::DecodeError;

/// Numeric reference into an external name or string table.
pub type RefId = u32;
/// Literal integer payload.
pub type Number = i64;

/// Read cursor over an encoded buffer.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at `pos`.
    pub fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads exactly `count` bytes and advances the cursor past them.
    pub fn read_exact(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        let available = self.remaining();

        let slice = start
            .checked_add(count)
            .and_then(|end| self.data.get(start..end))
            .ok_or(DecodeError::UnexpectedEndOfBytecode {
                offset: start,
                requested: count,
                available,
            })?;

        self.pos = start + count;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_exact(1)?[0])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_exact(N)?);
        Ok(out)
    }
}

/// A typed, fixed-width instruction argument.
pub trait Argument: Sized + Copy + fmt::Display {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Decodes the argument at the reader's cursor.
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError>;

    /// Appends exactly [`Self::WIDTH`] bytes to `out`.
    fn encode(&self, out: &mut Vec<u8>);

    /// Builds the argument from a parsed flag value, `None` if it does not fit.
    fn from_flag_value(value: i64) -> Option<Self>;

    /// The argument as a flag value.
    fn flag_value(&self) -> i64;

    /// Decodes the argument starting at `offset` in `buffer`.
    fn read_from(buffer: &[u8], offset: usize) -> Result<Self, DecodeError> {
        Self::decode(&mut ByteReader::new(buffer, offset))
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIDTH);
        self.encode(&mut out);
        out
    }
}

macro_rules! reference_argument {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name {
            pub ref_id: RefId,
        }

        impl $name {
            pub const fn new(ref_id: RefId) -> Self {
                Self { ref_id }
            }
        }

        impl Argument for $name {
            const WIDTH: usize = size_of::<RefId>();

            fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
                Ok(Self::new(RefId::from_be_bytes(reader.read_array()?)))
            }

            fn encode(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.ref_id.to_be_bytes());
            }

            fn from_flag_value(value: i64) -> Option<Self> {
                RefId::try_from(value).ok().map(Self::new)
            }

            fn flag_value(&self) -> i64 {
                i64::from(self.ref_id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "<{}>", self.ref_id)
            }
        }
    };
}

reference_argument! {
    /// Reference to a named binding.
    NameArgument
}

reference_argument! {
    /// Reference to an interned string.
    StringArgument
}

/// Literal signed integer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NumberArgument {
    pub value: Number,
}

impl NumberArgument {
    pub const fn new(value: Number) -> Self {
        Self { value }
    }
}

impl Argument for NumberArgument {
    const WIDTH: usize = size_of::<Number>();

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self::new(Number::from_be_bytes(reader.read_array()?)))
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.value.to_be_bytes());
    }

    fn from_flag_value(value: i64) -> Option<Self> {
        Some(Self::new(value))
    }

    fn flag_value(&self) -> i64 {
        self.value
    }
}

impl fmt::Display for NumberArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Boolean stored with the integer layout; any nonzero value is true.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BooleanArgument {
    pub value: Number,
}

impl BooleanArgument {
    pub const fn new(value: bool) -> Self {
        Self {
            value: value as Number,
        }
    }

    pub const fn is_set(&self) -> bool {
        self.value != 0
    }
}

impl Argument for BooleanArgument {
    const WIDTH: usize = size_of::<Number>();

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            value: Number::from_be_bytes(reader.read_array()?),
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.value.to_be_bytes());
    }

    fn from_flag_value(value: i64) -> Option<Self> {
        Some(Self::new(value != 0))
    }

    fn flag_value(&self) -> i64 {
        self.value
    }
}

impl fmt::Display for BooleanArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_set() { "true" } else { "false" })
    }
}
