//! Interpreter for JVM bytecode.
//!
//! [`Interpreter::step`] executes exactly one instruction of the top frame.
//! Calls and returns are reported back to the runtime as an
//! [`ExecutionState`] so that frames live on an explicit call stack instead
//! of the host stack.
use crate::bytecode::OPCode;
use crate::error::{DispatchFault, InvocationFault, RuntimeError, StackFault};
use crate::frame::Frame;
use crate::program::{BaseTypeKind, Constant, Program};
use crate::reader::BytecodeReader;
use crate::switch::branch_target;
use crate::value::{self, Value};

use log::trace;

type Result<T> = std::result::Result<T, RuntimeError>;

// Order of the per-kind groups in the load, store and return opcode ranges.
const LOCAL_KINDS: [BaseTypeKind; 5] = [
    BaseTypeKind::Int,
    BaseTypeKind::Long,
    BaseTypeKind::Float,
    BaseTypeKind::Double,
    BaseTypeKind::Reference,
];

/// Outcome of a single step.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionState {
    Running,
    /// The frame called `method_index`; its program counter already points
    /// past the call.
    Invoke {
        method_index: usize,
        args: Vec<Value>,
    },
    Returned(Option<Value>),
}

/// Pops `b` then `a` and pushes `Value::$ctor(body)`.
macro_rules! binary {
    ($frame:ident, $pop:ident, $ctor:ident, |$a:ident, $b:ident| $body:expr) => {{
        let $b = $frame.stack_mut().$pop()?;
        let $a = $frame.stack_mut().$pop()?;
        $frame.stack_mut().push(Value::$ctor($body));
    }};
}

macro_rules! unary {
    ($frame:ident, $pop:ident, $ctor:ident, |$a:ident| $body:expr) => {{
        let $a = $frame.stack_mut().$pop()?;
        $frame.stack_mut().push(Value::$ctor($body));
    }};
}

/// Shifts pop an int count above a value of the shifted kind.
macro_rules! shift {
    ($frame:ident, $pop:ident, $ctor:ident, $f:path) => {{
        let count = $frame.stack_mut().pop_int()?;
        let value = $frame.stack_mut().$pop()?;
        $frame.stack_mut().push(Value::$ctor($f(value, count)));
    }};
}

fn kind_at(op: OPCode, first: OPCode, group: u8) -> (BaseTypeKind, usize) {
    let offset = u8::from(op) - u8::from(first);
    (
        LOCAL_KINDS[(offset / group) as usize],
        (offset % group) as usize,
    )
}

fn load(frame: &mut Frame, kind: BaseTypeKind, index: usize) -> Result<()> {
    let value = frame.locals().read(index, kind)?;
    frame.stack_mut().push(value);
    Ok(())
}

fn store(frame: &mut Frame, kind: BaseTypeKind, index: usize) -> Result<()> {
    let value = frame.stack_mut().pop()?;
    if value.kind() != kind {
        return Err(StackFault::KindMismatch {
            expected: kind,
            found: value.kind(),
        }
        .into());
    }
    frame.locals_mut().write(index, value)
}

fn iinc(frame: &mut Frame, index: usize, delta: i32) -> Result<()> {
    let value = frame.locals().read_int(index)?;
    frame
        .locals_mut()
        .write(index, Value::Int(value.wrapping_add(delta)))
}

/// Int comparison tested by a conditional branch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Relation {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

impl Relation {
    /// Relation of an `if<cond>` or `if_icmp<cond>` opcode, `None` for
    /// anything else.
    fn of(op: OPCode) -> Option<Self> {
        match op {
            OPCode::IfEq | OPCode::IfICmpEq => Some(Self::Eq),
            OPCode::IfNe | OPCode::IfICmpNe => Some(Self::Ne),
            OPCode::IfLt | OPCode::IfICmpLt => Some(Self::Lt),
            OPCode::IfGe | OPCode::IfICmpGe => Some(Self::Ge),
            OPCode::IfGt | OPCode::IfICmpGt => Some(Self::Gt),
            OPCode::IfLe | OPCode::IfICmpLe => Some(Self::Le),
            _ => None,
        }
    }

    fn holds(self, a: i32, b: i32) -> bool {
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Lt => a < b,
            Self::Ge => a >= b,
            Self::Gt => a > b,
            Self::Le => a <= b,
        }
    }
}

fn return_kind(op: OPCode) -> (BaseTypeKind, &'static str) {
    match op {
        OPCode::IReturn => (BaseTypeKind::Int, "ireturn"),
        OPCode::LReturn => (BaseTypeKind::Long, "lreturn"),
        OPCode::FReturn => (BaseTypeKind::Float, "freturn"),
        OPCode::DReturn => (BaseTypeKind::Double, "dreturn"),
        OPCode::AReturn => (BaseTypeKind::Reference, "areturn"),
        _ => (BaseTypeKind::Void, "return"),
    }
}

/// `Interpreter` for a stack based virtual machine for JVM bytecode.
pub struct Interpreter<'a> {
    program: &'a Program,
    // Log every instruction before executing it.
    trace: bool,
}

impl<'a> Interpreter<'a> {
    pub fn new(program: &'a Program, trace: bool) -> Self {
        Self { program, trace }
    }

    /// Executes the instruction at the frame's program counter.
    pub fn step(&self, frame: &mut Frame) -> Result<ExecutionState> {
        let pc = frame.pc();
        let method_index = frame.method_index();
        let method = self
            .program
            .method(method_index)
            .ok_or_else(|| RuntimeError::Invocation {
                method: format!("#{method_index}"),
                fault: InvocationFault::NoSuchMethod(method_index),
            })?;
        let code = method.code();
        let dispatch = move |fault| RuntimeError::Dispatch { pc, fault };
        let byte = *code.get(pc).ok_or(dispatch(DispatchFault::FellOffEnd))?;
        let op = OPCode::from(byte);
        if self.trace {
            trace!(
                "{}{} pc={pc} {op:?} depth={}",
                method.name(),
                method.descriptor(),
                frame.stack().depth()
            );
        }
        let mut reader = BytecodeReader::new(code, pc + 1);
        let jump = |frame: &mut Frame, offset: i32| -> Result<ExecutionState> {
            let target = branch_target(code.len(), pc, offset).map_err(dispatch)?;
            frame.jump(target);
            Ok(ExecutionState::Running)
        };

        match op {
            OPCode::Nop => (),
            // Constants.
            OPCode::AconstNull => frame.stack_mut().push(Value::null()),
            OPCode::IconstM1
            | OPCode::Iconst0
            | OPCode::Iconst1
            | OPCode::Iconst2
            | OPCode::Iconst3
            | OPCode::Iconst4
            | OPCode::Iconst5 => {
                let n = i32::from(byte) - i32::from(u8::from(OPCode::Iconst0));
                frame.stack_mut().push(Value::Int(n));
            }
            OPCode::Lconst0 | OPCode::Lconst1 => {
                let n = byte - u8::from(OPCode::Lconst0);
                frame.stack_mut().push(Value::Long(i64::from(n)));
            }
            OPCode::Fconst0 | OPCode::Fconst1 | OPCode::Fconst2 => {
                let n = byte - u8::from(OPCode::Fconst0);
                frame.stack_mut().push(Value::Float(f32::from(n)));
            }
            OPCode::Dconst0 | OPCode::Dconst1 => {
                let n = byte - u8::from(OPCode::Dconst0);
                frame.stack_mut().push(Value::Double(f64::from(n)));
            }
            OPCode::Bipush => {
                let n = reader.read_i8().map_err(dispatch)?;
                frame.stack_mut().push(Value::Int(i32::from(n)));
            }
            OPCode::Sipush => {
                let n = reader.read_i16().map_err(dispatch)?;
                frame.stack_mut().push(Value::Int(i32::from(n)));
            }
            OPCode::Ldc | OPCode::LdcW => {
                let index = if op == OPCode::Ldc {
                    u16::from(reader.read_u8().map_err(dispatch)?)
                } else {
                    reader.read_u16().map_err(dispatch)?
                };
                let value = match self.program.constant(index) {
                    Some(Constant::Integer(n)) => Value::Int(*n),
                    Some(Constant::Float(n)) => Value::Float(*n),
                    _ => return Err(dispatch(DispatchFault::InvalidConstant(index))),
                };
                frame.stack_mut().push(value);
            }
            OPCode::Ldc2W => {
                let index = reader.read_u16().map_err(dispatch)?;
                let value = match self.program.constant(index) {
                    Some(Constant::Long(n)) => Value::Long(*n),
                    Some(Constant::Double(n)) => Value::Double(*n),
                    _ => return Err(dispatch(DispatchFault::InvalidConstant(index))),
                };
                frame.stack_mut().push(value);
            }
            // Loads and stores.
            OPCode::ILoad | OPCode::LLoad | OPCode::FLoad | OPCode::DLoad | OPCode::ALoad => {
                let (kind, _) = kind_at(op, OPCode::ILoad, 1);
                let index = reader.read_u8().map_err(dispatch)?;
                load(frame, kind, usize::from(index))?;
            }
            OPCode::ILoad0
            | OPCode::ILoad1
            | OPCode::ILoad2
            | OPCode::ILoad3
            | OPCode::LLoad0
            | OPCode::LLoad1
            | OPCode::LLoad2
            | OPCode::LLoad3
            | OPCode::FLoad0
            | OPCode::FLoad1
            | OPCode::FLoad2
            | OPCode::FLoad3
            | OPCode::DLoad0
            | OPCode::DLoad1
            | OPCode::DLoad2
            | OPCode::DLoad3
            | OPCode::ALoad0
            | OPCode::ALoad1
            | OPCode::ALoad2
            | OPCode::ALoad3 => {
                let (kind, index) = kind_at(op, OPCode::ILoad0, 4);
                load(frame, kind, index)?;
            }
            OPCode::IStore | OPCode::LStore | OPCode::FStore | OPCode::DStore | OPCode::AStore => {
                let (kind, _) = kind_at(op, OPCode::IStore, 1);
                let index = reader.read_u8().map_err(dispatch)?;
                store(frame, kind, usize::from(index))?;
            }
            OPCode::IStore0
            | OPCode::IStore1
            | OPCode::IStore2
            | OPCode::IStore3
            | OPCode::LStore0
            | OPCode::LStore1
            | OPCode::LStore2
            | OPCode::LStore3
            | OPCode::FStore0
            | OPCode::FStore1
            | OPCode::FStore2
            | OPCode::FStore3
            | OPCode::DStore0
            | OPCode::DStore1
            | OPCode::DStore2
            | OPCode::DStore3
            | OPCode::AStore0
            | OPCode::AStore1
            | OPCode::AStore2
            | OPCode::AStore3 => {
                let (kind, index) = kind_at(op, OPCode::IStore0, 4);
                store(frame, kind, index)?;
            }
            OPCode::IInc => {
                let index = reader.read_u8().map_err(dispatch)?;
                let delta = reader.read_i8().map_err(dispatch)?;
                iinc(frame, usize::from(index), i32::from(delta))?;
            }
            OPCode::Wide => {
                let inner = OPCode::from(reader.read_u8().map_err(dispatch)?);
                let index = usize::from(reader.read_u16().map_err(dispatch)?);
                match inner {
                    OPCode::ILoad
                    | OPCode::LLoad
                    | OPCode::FLoad
                    | OPCode::DLoad
                    | OPCode::ALoad => load(frame, kind_at(inner, OPCode::ILoad, 1).0, index)?,
                    OPCode::IStore
                    | OPCode::LStore
                    | OPCode::FStore
                    | OPCode::DStore
                    | OPCode::AStore => store(frame, kind_at(inner, OPCode::IStore, 1).0, index)?,
                    OPCode::IInc => {
                        let delta = reader.read_i16().map_err(dispatch)?;
                        iinc(frame, index, i32::from(delta))?;
                    }
                    other => return Err(dispatch(DispatchFault::InvalidWide(other.into()))),
                }
            }
            // Operand stack shuffles.
            OPCode::Pop => frame.stack_mut().discard(1)?,
            OPCode::Pop2 => frame.stack_mut().discard(2)?,
            OPCode::Dup => frame.stack_mut().dup_x(1, 0)?,
            OPCode::DupX1 => frame.stack_mut().dup_x(1, 1)?,
            OPCode::DupX2 => frame.stack_mut().dup_x(1, 2)?,
            OPCode::Dup2 => frame.stack_mut().dup_x(2, 0)?,
            OPCode::Dup2X1 => frame.stack_mut().dup_x(2, 1)?,
            OPCode::Dup2X2 => frame.stack_mut().dup_x(2, 2)?,
            OPCode::Swap => frame.stack_mut().swap()?,
            // Arithmetic.
            OPCode::IAdd => binary!(frame, pop_int, Int, |a, b| a.wrapping_add(b)),
            OPCode::LAdd => binary!(frame, pop_long, Long, |a, b| a.wrapping_add(b)),
            OPCode::FAdd => binary!(frame, pop_float, Float, |a, b| a + b),
            OPCode::DAdd => binary!(frame, pop_double, Double, |a, b| a + b),
            OPCode::ISub => binary!(frame, pop_int, Int, |a, b| a.wrapping_sub(b)),
            OPCode::LSub => binary!(frame, pop_long, Long, |a, b| a.wrapping_sub(b)),
            OPCode::FSub => binary!(frame, pop_float, Float, |a, b| a - b),
            OPCode::DSub => binary!(frame, pop_double, Double, |a, b| a - b),
            OPCode::IMul => binary!(frame, pop_int, Int, |a, b| a.wrapping_mul(b)),
            OPCode::LMul => binary!(frame, pop_long, Long, |a, b| a.wrapping_mul(b)),
            OPCode::FMul => binary!(frame, pop_float, Float, |a, b| a * b),
            OPCode::DMul => binary!(frame, pop_double, Double, |a, b| a * b),
            OPCode::IDiv => binary!(frame, pop_int, Int, |a, b| value::int_div(a, b)?),
            OPCode::LDiv => binary!(frame, pop_long, Long, |a, b| value::long_div(a, b)?),
            OPCode::FDiv => binary!(frame, pop_float, Float, |a, b| a / b),
            OPCode::DDiv => binary!(frame, pop_double, Double, |a, b| a / b),
            OPCode::IRem => binary!(frame, pop_int, Int, |a, b| value::int_rem(a, b)?),
            OPCode::LRem => binary!(frame, pop_long, Long, |a, b| value::long_rem(a, b)?),
            OPCode::FRem => binary!(frame, pop_float, Float, |a, b| value::float_rem(a, b)),
            OPCode::DRem => binary!(frame, pop_double, Double, |a, b| value::double_rem(a, b)),
            OPCode::INeg => unary!(frame, pop_int, Int, |a| a.wrapping_neg()),
            OPCode::LNeg => unary!(frame, pop_long, Long, |a| a.wrapping_neg()),
            OPCode::FNeg => unary!(frame, pop_float, Float, |a| -a),
            OPCode::DNeg => unary!(frame, pop_double, Double, |a| -a),
            OPCode::IShl => shift!(frame, pop_int, Int, value::int_shl),
            OPCode::LShl => shift!(frame, pop_long, Long, value::long_shl),
            OPCode::IShr => shift!(frame, pop_int, Int, value::int_shr),
            OPCode::LShr => shift!(frame, pop_long, Long, value::long_shr),
            OPCode::IUShr => shift!(frame, pop_int, Int, value::int_ushr),
            OPCode::LUShr => shift!(frame, pop_long, Long, value::long_ushr),
            OPCode::IAnd => binary!(frame, pop_int, Int, |a, b| a & b),
            OPCode::LAnd => binary!(frame, pop_long, Long, |a, b| a & b),
            OPCode::IOr => binary!(frame, pop_int, Int, |a, b| a | b),
            OPCode::LOr => binary!(frame, pop_long, Long, |a, b| a | b),
            OPCode::IXor => binary!(frame, pop_int, Int, |a, b| a ^ b),
            OPCode::LXor => binary!(frame, pop_long, Long, |a, b| a ^ b),
            // Conversions.
            OPCode::I2L => unary!(frame, pop_int, Long, |a| i64::from(a)),
            OPCode::I2F => unary!(frame, pop_int, Float, |a| a as f32),
            OPCode::I2D => unary!(frame, pop_int, Double, |a| f64::from(a)),
            OPCode::L2I => unary!(frame, pop_long, Int, |a| a as i32),
            OPCode::L2F => unary!(frame, pop_long, Float, |a| a as f32),
            OPCode::L2D => unary!(frame, pop_long, Double, |a| a as f64),
            OPCode::F2I => unary!(frame, pop_float, Int, |a| value::f2i(a)),
            OPCode::F2L => unary!(frame, pop_float, Long, |a| value::f2l(a)),
            OPCode::F2D => unary!(frame, pop_float, Double, |a| f64::from(a)),
            OPCode::D2I => unary!(frame, pop_double, Int, |a| value::d2i(a)),
            OPCode::D2L => unary!(frame, pop_double, Long, |a| value::d2l(a)),
            OPCode::D2F => unary!(frame, pop_double, Float, |a| a as f32),
            OPCode::I2B => unary!(frame, pop_int, Int, |a| value::i2b(a)),
            OPCode::I2C => unary!(frame, pop_int, Int, |a| value::i2c(a)),
            OPCode::I2S => unary!(frame, pop_int, Int, |a| value::i2s(a)),
            // Comparisons.
            OPCode::LCmp => binary!(frame, pop_long, Int, |a, b| value::lcmp(a, b)),
            OPCode::FCmpL => binary!(frame, pop_float, Int, |a, b| value::fcmp(a, b, -1)),
            OPCode::FCmpG => binary!(frame, pop_float, Int, |a, b| value::fcmp(a, b, 1)),
            OPCode::DCmpL => binary!(frame, pop_double, Int, |a, b| value::dcmp(a, b, -1)),
            OPCode::DCmpG => binary!(frame, pop_double, Int, |a, b| value::dcmp(a, b, 1)),
            // Control flow.
            OPCode::IfEq
            | OPCode::IfNe
            | OPCode::IfLt
            | OPCode::IfGe
            | OPCode::IfGt
            | OPCode::IfLe => {
                let relation = Relation::of(op)
                    .ok_or(dispatch(DispatchFault::InvalidOpcode(byte)))?;
                let offset = reader.read_i16().map_err(dispatch)?;
                let value = frame.stack_mut().pop_int()?;
                if relation.holds(value, 0) {
                    return jump(frame, offset.into());
                }
            }
            OPCode::IfICmpEq
            | OPCode::IfICmpNe
            | OPCode::IfICmpLt
            | OPCode::IfICmpGe
            | OPCode::IfICmpGt
            | OPCode::IfICmpLe => {
                let relation = Relation::of(op)
                    .ok_or(dispatch(DispatchFault::InvalidOpcode(byte)))?;
                let offset = reader.read_i16().map_err(dispatch)?;
                let b = frame.stack_mut().pop_int()?;
                let a = frame.stack_mut().pop_int()?;
                if relation.holds(a, b) {
                    return jump(frame, offset.into());
                }
            }
            OPCode::IfACmpEq | OPCode::IfACmpNe => {
                let offset = reader.read_i16().map_err(dispatch)?;
                let b = frame.stack_mut().pop_reference()?;
                let a = frame.stack_mut().pop_reference()?;
                if (a == b) == (op == OPCode::IfACmpEq) {
                    return jump(frame, offset.into());
                }
            }
            OPCode::IfNull | OPCode::IfNonNull => {
                let offset = reader.read_i16().map_err(dispatch)?;
                let reference = frame.stack_mut().pop_reference()?;
                if reference.is_null() == (op == OPCode::IfNull) {
                    return jump(frame, offset.into());
                }
            }
            OPCode::Goto => {
                let offset = reader.read_i16().map_err(dispatch)?;
                return jump(frame, offset.into());
            }
            OPCode::GotoW => {
                let offset = reader.read_i32().map_err(dispatch)?;
                return jump(frame, offset);
            }
            OPCode::TableSwitch | OPCode::LookupSwitch => {
                let key = frame.stack_mut().pop_int()?;
                let table = method
                    .switch_table(pc)
                    .ok_or(dispatch(DispatchFault::MissingSwitchTable))?;
                return jump(frame, table.offset_for(key));
            }
            // Returns.
            OPCode::IReturn
            | OPCode::LReturn
            | OPCode::FReturn
            | OPCode::DReturn
            | OPCode::AReturn
            | OPCode::Return => {
                let (kind, opcode) = return_kind(op);
                let declared = method.return_type();
                if declared != kind {
                    return Err(dispatch(DispatchFault::ReturnKindMismatch { opcode, declared }));
                }
                if kind == BaseTypeKind::Void {
                    return Ok(ExecutionState::Returned(None));
                }
                let value = frame.stack_mut().pop()?;
                if value.kind() != kind {
                    return Err(StackFault::KindMismatch {
                        expected: kind,
                        found: value.kind(),
                    }
                    .into());
                }
                return Ok(ExecutionState::Returned(Some(value)));
            }
            OPCode::InvokeStatic => {
                let index = reader.read_u16().map_err(dispatch)?;
                let invocation = |fault| RuntimeError::Invocation {
                    method: format!("#{index}"),
                    fault,
                };
                let callee_index = self.program.resolve_method(index).map_err(invocation)?;
                let callee = self
                    .program
                    .method(callee_index)
                    .ok_or_else(|| invocation(InvocationFault::NoSuchMethod(callee_index)))?;
                let mut args = (0..callee.arg_types().len())
                    .map(|_| frame.stack_mut().pop())
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                args.reverse();
                frame.jump(reader.position());
                return Ok(ExecutionState::Invoke {
                    method_index: callee_index,
                    args,
                });
            }
            OPCode::Unknown(byte) => return Err(dispatch(DispatchFault::InvalidOpcode(byte))),
        }
        frame.jump(reader.position());
        Ok(ExecutionState::Running)
    }
}
