//! Per-frame local variable array.
use crate::error::{LocalFault, RuntimeError};
use crate::program::BaseTypeKind;
use crate::value::{Reference, Slot, Value};

type Result<T> = std::result::Result<T, RuntimeError>;

macro_rules! typed_read {
    ($name:ident, $variant:ident, $t:ty) => {
        pub fn $name(&self, index: usize) -> Result<$t> {
            match self.read(index, BaseTypeKind::$variant)? {
                Value::$variant(value) => Ok(value),
                other => Err(Self::fault(
                    index,
                    LocalFault::KindMismatch {
                        expected: BaseTypeKind::$variant,
                        found: other.kind(),
                    },
                )),
            }
        }
    };
}

/// Fixed-size array of `max_locals` slots. A long or double written at `i`
/// also claims `i + 1`, which then holds an upper-half marker.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariables {
    slots: Vec<Slot>,
}

impl LocalVariables {
    pub fn new(max_locals: usize) -> Self {
        Self {
            slots: vec![Slot::Empty; max_locals],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn fault(index: usize, fault: LocalFault) -> RuntimeError {
        RuntimeError::Local { index, fault }
    }

    pub fn write(&mut self, index: usize, value: Value) -> Result<()> {
        let size = value.size();
        if index + size > self.slots.len() {
            return Err(Self::fault(
                index,
                LocalFault::OutOfBounds {
                    len: self.slots.len(),
                },
            ));
        }
        self.slots[index] = Slot::Value(value);
        if size == 2 {
            self.slots[index + 1] = Slot::Upper;
        }
        Ok(())
    }

    /// Reads the value at `index`, which must have been written with a value
    /// of `kind`.
    pub fn read(&self, index: usize, kind: BaseTypeKind) -> Result<Value> {
        let slot = self.slots.get(index).ok_or_else(|| {
            Self::fault(
                index,
                LocalFault::OutOfBounds {
                    len: self.slots.len(),
                },
            )
        })?;
        let value = match slot {
            Slot::Empty => return Err(Self::fault(index, LocalFault::Uninitialized)),
            Slot::Upper => return Err(Self::fault(index, LocalFault::UpperHalf)),
            Slot::Value(value) => *value,
        };
        if value.kind() != kind {
            return Err(Self::fault(
                index,
                LocalFault::KindMismatch {
                    expected: kind,
                    found: value.kind(),
                },
            ));
        }
        if value.is_wide() && self.slots.get(index + 1) != Some(&Slot::Upper) {
            return Err(Self::fault(index, LocalFault::BrokenPair));
        }
        Ok(value)
    }

    typed_read!(read_int, Int, i32);
    typed_read!(read_long, Long, i64);
    typed_read!(read_float, Float, f32);
    typed_read!(read_double, Double, f64);
    typed_read!(read_reference, Reference, Reference);
}
