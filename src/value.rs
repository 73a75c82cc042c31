//! JVM values and the numeric semantics of the instruction set.
//!
//! The free functions here are the arithmetic, shift, comparison and
//! conversion rules the interpreter applies. Only integer division and
//! remainder can fail.
use crate::error::ArithmeticFault;
use crate::program::BaseTypeKind;

/// Opaque object reference. The interpreter never dereferences it; it only
/// compares identities and tests for null.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Reference {
    #[default]
    Null,
    Handle(u32),
}

impl Reference {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// JVM value types.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Reference(Reference),
}

impl Value {
    /// Returns the type of the value.
    pub fn kind(&self) -> BaseTypeKind {
        match self {
            Self::Int(_) => BaseTypeKind::Int,
            Self::Long(_) => BaseTypeKind::Long,
            Self::Float(_) => BaseTypeKind::Float,
            Self::Double(_) => BaseTypeKind::Double,
            Self::Reference(_) => BaseTypeKind::Reference,
        }
    }

    /// Returns the number of slots the value occupies.
    pub fn size(&self) -> usize {
        self.kind().size()
    }

    pub fn is_wide(&self) -> bool {
        self.size() == 2
    }

    pub fn null() -> Self {
        Self::Reference(Reference::Null)
    }
}

/// A single storage unit of the operand stack or local variable array.
///
/// Longs and doubles take two consecutive slots: the value itself in the
/// lower one and an [`Slot::Upper`] marker in the one above.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Slot {
    Empty,
    Value(Value),
    Upper,
}

pub fn int_div(a: i32, b: i32) -> Result<i32, ArithmeticFault> {
    if b == 0 {
        return Err(ArithmeticFault::DivideByZero);
    }
    Ok(a.wrapping_div(b))
}

pub fn int_rem(a: i32, b: i32) -> Result<i32, ArithmeticFault> {
    if b == 0 {
        return Err(ArithmeticFault::DivideByZero);
    }
    Ok(a.wrapping_rem(b))
}

pub fn long_div(a: i64, b: i64) -> Result<i64, ArithmeticFault> {
    if b == 0 {
        return Err(ArithmeticFault::DivideByZero);
    }
    Ok(a.wrapping_div(b))
}

pub fn long_rem(a: i64, b: i64) -> Result<i64, ArithmeticFault> {
    if b == 0 {
        return Err(ArithmeticFault::DivideByZero);
    }
    Ok(a.wrapping_rem(b))
}

// Rust's `%` on floats is the truncated remainder (C fmod), the sign of the
// result follows the dividend.
pub fn float_rem(a: f32, b: f32) -> f32 {
    a % b
}

pub fn double_rem(a: f64, b: f64) -> f64 {
    a % b
}

// `wrapping_shl`/`wrapping_shr` mask the count to the bit width, which is
// exactly the JVM's `& 0x1f` and `& 0x3f`.
pub fn int_shl(value: i32, count: i32) -> i32 {
    value.wrapping_shl(count as u32)
}

pub fn int_shr(value: i32, count: i32) -> i32 {
    value.wrapping_shr(count as u32)
}

pub fn int_ushr(value: i32, count: i32) -> i32 {
    (value as u32).wrapping_shr(count as u32) as i32
}

pub fn long_shl(value: i64, count: i32) -> i64 {
    value.wrapping_shl(count as u32)
}

pub fn long_shr(value: i64, count: i32) -> i64 {
    value.wrapping_shr(count as u32)
}

pub fn long_ushr(value: i64, count: i32) -> i64 {
    (value as u64).wrapping_shr(count as u32) as i64
}

// Float to integer casts in Rust saturate and map NaN to zero, matching the
// JVM's f2i, f2l, d2i and d2l.
pub fn f2i(value: f32) -> i32 {
    value as i32
}

pub fn f2l(value: f32) -> i64 {
    value as i64
}

pub fn d2i(value: f64) -> i32 {
    value as i32
}

pub fn d2l(value: f64) -> i64 {
    value as i64
}

pub fn i2b(value: i32) -> i32 {
    value as i8 as i32
}

pub fn i2c(value: i32) -> i32 {
    value as u16 as i32
}

pub fn i2s(value: i32) -> i32 {
    value as i16 as i32
}

pub fn lcmp(a: i64, b: i64) -> i32 {
    a.cmp(&b) as i32
}

/// Three-way float comparison; `nan` is pushed when either side is NaN
/// (-1 for `fcmpl`, 1 for `fcmpg`).
pub fn fcmp(a: f32, b: f32, nan: i32) -> i32 {
    a.partial_cmp(&b).map_or(nan, |ordering| ordering as i32)
}

pub fn dcmp(a: f64, b: f64, nan: i32) -> i32 {
    a.partial_cmp(&b).map_or(nan, |ordering| ordering as i32)
}
