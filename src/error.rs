//! Error types raised while building programs and executing bytecode.
//!
//! Every runtime fault is terminal for the invocation it occurs in: the
//! frame that raised it is discarded along with every frame above the
//! top-level call, and the error is handed back to the embedder.
use crate::program::BaseTypeKind;

use thiserror::Error;

/// Integer arithmetic failures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticFault {
    #[error("/ by zero")]
    DivideByZero,
}

/// Operand stack and call stack failures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum StackFault {
    #[error("operand stack underflow")]
    Underflow,
    /// A slot-level operation would separate the two halves of a long or
    /// double.
    #[error("operation splits a two-slot value")]
    SplitWide,
    #[error("expected {expected:?} on the operand stack, found {found:?}")]
    KindMismatch {
        expected: BaseTypeKind,
        found: BaseTypeKind,
    },
    #[error("call stack exceeded {0} frames")]
    Overflow(usize),
}

/// Local variable array failures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum LocalFault {
    #[error("read before any write")]
    Uninitialized,
    #[error("expected {expected:?}, found {found:?}")]
    KindMismatch {
        expected: BaseTypeKind,
        found: BaseTypeKind,
    },
    /// Read of the second slot of a long or double.
    #[error("upper half of a two-slot value is not independently readable")]
    UpperHalf,
    /// The second slot of a long or double was overwritten.
    #[error("two-slot value was broken by a later write")]
    BrokenPair,
    #[error("index out of bounds for {len} locals")]
    OutOfBounds { len: usize },
}

/// Failures while handing control to a callee.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationFault {
    #[error("expected {expected} arguments, found {found}")]
    ArityMismatch { expected: usize, found: usize },
    #[error("argument {index}: expected {expected:?}, found {found:?}")]
    KindMismatch {
        index: usize,
        expected: BaseTypeKind,
        found: BaseTypeKind,
    },
    #[error("no method {name}{descriptor}")]
    Unresolved { name: String, descriptor: String },
    #[error("constant #{0} is not a method reference")]
    NotAMethodRef(u16),
    #[error("no method at index {0}")]
    NoSuchMethod(usize),
}

/// Malformed instruction streams.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum DispatchFault {
    #[error("invalid opcode 0x{0:02x}")]
    InvalidOpcode(u8),
    #[error("opcode 0x{0:02x} cannot follow wide")]
    InvalidWide(u8),
    #[error("instruction operands run past the end of the code")]
    TruncatedOperand,
    #[error("branch target {0} is outside the method")]
    InvalidBranchTarget(i64),
    #[error("malformed switch table")]
    MalformedSwitch,
    #[error("no resolved switch table")]
    MissingSwitchTable,
    #[error("constant #{0} cannot be loaded by this instruction")]
    InvalidConstant(u16),
    #[error("{opcode} does not match declared return type {declared:?}")]
    ReturnKindMismatch {
        opcode: &'static str,
        declared: BaseTypeKind,
    },
    #[error("execution ran off the end of the code")]
    FellOffEnd,
}

/// Coarse classification of a [`RuntimeError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    ArithmeticFault,
    StackFault,
    LocalFault,
    InvocationFault,
    DispatchFault,
}

/// `RuntimeError` represents every way an invocation can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("ArithmeticException: {0}")]
    Arithmetic(#[from] ArithmeticFault),
    #[error("stack fault: {0}")]
    Stack(#[from] StackFault),
    #[error("local variable {index}: {fault}")]
    Local { index: usize, fault: LocalFault },
    #[error("invoking {method}: {fault}")]
    Invocation {
        method: String,
        fault: InvocationFault,
    },
    #[error("pc {pc}: {fault}")]
    Dispatch { pc: usize, fault: DispatchFault },
}

impl RuntimeError {
    pub fn kind(&self) -> RuntimeErrorKind {
        match self {
            Self::Arithmetic(_) => RuntimeErrorKind::ArithmeticFault,
            Self::Stack(_) => RuntimeErrorKind::StackFault,
            Self::Local { .. } => RuntimeErrorKind::LocalFault,
            Self::Invocation { .. } => RuntimeErrorKind::InvocationFault,
            Self::Dispatch { .. } => RuntimeErrorKind::DispatchFault,
        }
    }
}

/// Errors raised while assembling or loading program input.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("malformed method descriptor `{0}`")]
    MalformedDescriptor(String),
    #[error(transparent)]
    Pattern(#[from] regex::Error),
    #[error("method {method}: pc {pc}: {fault}")]
    InvalidCode {
        method: String,
        pc: usize,
        fault: DispatchFault,
    },
    #[error("method {method}: {max_locals} locals cannot hold {needed} argument slots")]
    LocalsTooSmall {
        method: String,
        max_locals: u16,
        needed: usize,
    },
    #[error("opcode 0x{0:02x} is not a branch")]
    NotABranch(u8),
    #[error("label {0} was never bound")]
    UnboundLabel(usize),
    #[error("branch at pc {pc} cannot reach offset {offset}")]
    BranchOutOfRange { pc: usize, offset: i64 },
    #[error("no {op} instruction for {kind:?}")]
    UnsupportedKind {
        op: &'static str,
        kind: BaseTypeKind,
    },
}
