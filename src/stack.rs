//! Per-frame operand stack.
//!
//! The stack is stored slot by slot so that the shuffle instructions, which
//! the JVM defines in terms of slots, can be expressed directly. A long or
//! double is pushed as its value followed by an upper-half marker.
use crate::error::StackFault;
use crate::program::BaseTypeKind;
use crate::value::{Reference, Slot, Value};

type Result<T> = std::result::Result<T, StackFault>;

macro_rules! typed_pop {
    ($name:ident, $variant:ident, $t:ty) => {
        pub fn $name(&mut self) -> Result<$t> {
            match self.pop()? {
                Value::$variant(value) => Ok(value),
                other => Err(StackFault::KindMismatch {
                    expected: BaseTypeKind::$variant,
                    found: other.kind(),
                }),
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperandStack {
    slots: Vec<Slot>,
}

impl OperandStack {
    pub fn with_capacity(max_stack: usize) -> Self {
        Self {
            slots: Vec::with_capacity(max_stack),
        }
    }

    pub fn push(&mut self, value: Value) {
        self.slots.push(Slot::Value(value));
        if value.is_wide() {
            self.slots.push(Slot::Upper);
        }
    }

    /// Pops one whole value, both slots for a long or double.
    pub fn pop(&mut self) -> Result<Value> {
        match self.slots.pop() {
            None => Err(StackFault::Underflow),
            Some(Slot::Upper) => match self.slots.pop() {
                None => Err(StackFault::Underflow),
                Some(Slot::Value(value)) if value.is_wide() => Ok(value),
                Some(_) => Err(StackFault::SplitWide),
            },
            Some(Slot::Value(value)) if !value.is_wide() => Ok(value),
            Some(_) => Err(StackFault::SplitWide),
        }
    }

    typed_pop!(pop_int, Int, i32);
    typed_pop!(pop_long, Long, i64);
    typed_pop!(pop_float, Float, f32);
    typed_pop!(pop_double, Double, f64);
    typed_pop!(pop_reference, Reference, Reference);

    /// Returns the value `depth` values below the top without removing it.
    pub fn peek(&self, depth: usize) -> Result<Value> {
        self.slots
            .iter()
            .rev()
            .filter_map(|slot| match slot {
                Slot::Value(value) => Some(*value),
                _ => None,
            })
            .nth(depth)
            .ok_or(StackFault::Underflow)
    }

    /// Current depth in slots.
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Removes the top `count` slots, refusing to cut a two-slot value in
    /// half.
    pub fn pop_slots(&mut self, count: usize) -> Result<Vec<Slot>> {
        let len = self.slots.len();
        if count > len {
            return Err(StackFault::Underflow);
        }
        let at = len - count;
        if self.slots.get(at) == Some(&Slot::Upper) {
            return Err(StackFault::SplitWide);
        }
        Ok(self.slots.split_off(at))
    }

    /// Copies the top `width` slots and inserts the copy `depth` slots
    /// further down. Covers the whole dup family: `dup` is `(1, 0)`,
    /// `dup_x2` is `(1, 2)`, `dup2_x1` is `(2, 1)` and so on.
    pub fn dup_x(&mut self, width: usize, depth: usize) -> Result<()> {
        if width + depth > self.slots.len() {
            return Err(StackFault::Underflow);
        }
        let top = self.pop_slots(width)?;
        let under = self.pop_slots(depth)?;
        self.slots.extend_from_slice(&top);
        self.slots.extend(under);
        self.slots.extend(top);
        Ok(())
    }

    /// Exchanges the top two single-slot values.
    pub fn swap(&mut self) -> Result<()> {
        if self.slots.len() < 2 {
            return Err(StackFault::Underflow);
        }
        let top = self.pop_slots(1)?;
        let under = self.pop_slots(1)?;
        self.slots.extend(top);
        self.slots.extend(under);
        Ok(())
    }

    /// Drops the top `count` slots: `pop` is one, `pop2` is two, which is
    /// either one long/double or two narrow values. Slots go one at a time,
    /// so two `pop`s also clear a long or double. A half left behind by a
    /// single `pop` faults with `SplitWide` as soon as it is read.
    pub fn discard(&mut self, count: usize) -> Result<()> {
        let len = self.slots.len();
        if count > len {
            return Err(StackFault::Underflow);
        }
        self.slots.truncate(len - count);
        Ok(())
    }
}
