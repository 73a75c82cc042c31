//! cortado is a bytecode interpreter for the JVM's static subset: integer
//! and floating point arithmetic, constants, local variables, operand stack
//! shuffles, conversions, branches, switches and static calls.
//!
//! Programs are assembled in memory from resolved methods (see
//! [`program::Program`] and [`builder::CodeBuilder`]) and executed by a
//! [`runtime::Runtime`].
pub mod builder;
pub mod bytecode;
pub mod config;
pub mod error;
pub mod frame;
pub mod interpreter;
pub mod locals;
pub mod program;
pub mod reader;
pub mod runtime;
pub mod stack;
pub mod switch;
pub mod value;

pub use config::RuntimeConfig;
pub use error::{ProgramError, RuntimeError, RuntimeErrorKind};
pub use program::{BaseTypeKind, Constant, Method, Program};
pub use runtime::Runtime;
pub use value::{Reference, Value};
