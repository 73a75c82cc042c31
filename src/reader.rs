//! Big-endian operand decoding over a method's code array.
use crate::error::DispatchFault;

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

type Result<T> = std::result::Result<T, DispatchFault>;

/// Cursor over instruction bytes. Positions are absolute offsets into the
/// method's code, which matters for the 4-byte alignment of switch operands.
pub struct BytecodeReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BytecodeReader<'a> {
    pub fn new(code: &'a [u8], position: usize) -> Self {
        let mut cursor = Cursor::new(code);
        cursor.set_position(position as u64);
        Self { cursor }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.cursor
            .read_u8()
            .map_err(|_| DispatchFault::TruncatedOperand)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.cursor
            .read_i8()
            .map_err(|_| DispatchFault::TruncatedOperand)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.cursor
            .read_u16::<BigEndian>()
            .map_err(|_| DispatchFault::TruncatedOperand)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.cursor
            .read_i16::<BigEndian>()
            .map_err(|_| DispatchFault::TruncatedOperand)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.cursor
            .read_i32::<BigEndian>()
            .map_err(|_| DispatchFault::TruncatedOperand)
    }

    /// Skips the 0-3 padding bytes that precede switch operands.
    pub fn align4(&mut self) -> Result<()> {
        while self.position() % 4 != 0 {
            self.read_u8()?;
        }
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.cursor
            .get_ref()
            .len()
            .saturating_sub(self.position())
    }
}
