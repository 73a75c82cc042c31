//! Activation records.
use crate::locals::LocalVariables;
use crate::program::Method;
use crate::stack::OperandStack;

/// Program counter for the runtime points to the current instruction
/// and method we're executing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProgramCounter {
    method_index: usize,
    instruction_index: usize,
}

impl ProgramCounter {
    pub fn new(method_index: usize, instruction_index: usize) -> Self {
        Self {
            method_index,
            instruction_index,
        }
    }

    /// Returns current method index pointed at by the program counter.
    pub fn get_method_index(&self) -> usize {
        self.method_index
    }

    /// Returns current instruction index pointed at by the program counter.
    pub fn get_instruction_index(&self) -> usize {
        self.instruction_index
    }
}

/// Execution state of one method activation. A frame is created on
/// invocation and dropped when the method returns or faults.
#[derive(Debug, Clone)]
pub struct Frame {
    pc: ProgramCounter,
    stack: OperandStack,
    locals: LocalVariables,
}

impl Frame {
    pub fn new(method_index: usize, method: &Method) -> Self {
        Self {
            pc: ProgramCounter::new(method_index, 0),
            stack: OperandStack::with_capacity(method.max_stack()),
            locals: LocalVariables::new(method.max_locals()),
        }
    }

    pub fn method_index(&self) -> usize {
        self.pc.get_method_index()
    }

    pub fn pc(&self) -> usize {
        self.pc.get_instruction_index()
    }

    /// Moves the program counter to an absolute code offset.
    pub fn jump(&mut self, target: usize) {
        self.pc.instruction_index = target;
    }

    /// Moves the program counter forward by `len` bytes.
    pub fn advance(&mut self, len: usize) {
        self.pc.instruction_index += len;
    }

    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut OperandStack {
        &mut self.stack
    }

    pub fn locals(&self) -> &LocalVariables {
        &self.locals
    }

    pub fn locals_mut(&mut self) -> &mut LocalVariables {
        &mut self.locals
    }
}
