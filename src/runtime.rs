//! JVM runtime module responsible for creating a new runtime
//! environment and running programs.
use crate::config::RuntimeConfig;
use crate::error::{InvocationFault, RuntimeError, StackFault};
use crate::frame::Frame;
use crate::interpreter::{ExecutionState, Interpreter};
use crate::program::{Program, MAIN_DESCRIPTOR};
use crate::value::Value;

use log::{debug, warn};

type Result<T> = std::result::Result<T, RuntimeError>;

/// `Runtime` represents an execution context for JVM programs and is
/// responsible for invoking methods and driving the interpreter.
///
/// Frames are kept on an explicit call stack: a static call pushes a frame,
/// a return pops it and hands the result to the caller below. A fault
/// discards every frame of the invocation that raised it.
pub struct Runtime {
    // Program to run.
    program: Program,
    // Live activations, innermost last.
    frames: Vec<Frame>,
    config: RuntimeConfig,
}

impl Runtime {
    pub fn new(program: Program) -> Self {
        Self::with_config(program, RuntimeConfig::default())
    }

    pub fn with_config(program: Program, config: RuntimeConfig) -> Self {
        Self {
            program,
            frames: Vec::new(),
            config,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Number of live frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Runs method `method_index` with `args` to completion and returns its
    /// result, `None` for void methods.
    pub fn invoke(&mut self, method_index: usize, args: &[Value]) -> Result<Option<Value>> {
        let base = self.frames.len();
        let result = self
            .push_frame(method_index, args.to_vec())
            .and_then(|()| self.execute(base));
        if let Err(err) = &result {
            warn!("invocation of method #{method_index} aborted: {err}");
            self.frames.truncate(base);
        }
        result
    }

    /// Looks a method up by name and descriptor and invokes it.
    pub fn invoke_static(
        &mut self,
        name: &str,
        descriptor: &str,
        args: &[Value],
    ) -> Result<Option<Value>> {
        let method_index = self
            .program
            .find_method(name, descriptor)
            .ok_or_else(|| unresolved(name, descriptor))?;
        self.invoke(method_index, args)
    }

    /// Runs `main(String[])` with a null argument array.
    pub fn run(&mut self) -> Result<()> {
        let main = self
            .program
            .entry_point()
            .ok_or_else(|| unresolved("main", MAIN_DESCRIPTOR))?;
        self.invoke(main, &[Value::null()]).map(drop)
    }

    /// Builds a frame for `method_index` whose leading locals hold `args`.
    fn push_frame(&mut self, method_index: usize, args: Vec<Value>) -> Result<()> {
        let method = self
            .program
            .method(method_index)
            .ok_or_else(|| RuntimeError::Invocation {
                method: format!("#{method_index}"),
                fault: InvocationFault::NoSuchMethod(method_index),
            })?;
        if let Some(max_frames) = self.config.max_frames {
            if self.frames.len() >= max_frames {
                return Err(StackFault::Overflow(max_frames).into());
            }
        }
        let mismatch = |fault| RuntimeError::Invocation {
            method: format!("{}{}", method.name(), method.descriptor()),
            fault,
        };
        let expected = method.arg_types();
        if expected.len() != args.len() {
            return Err(mismatch(InvocationFault::ArityMismatch {
                expected: expected.len(),
                found: args.len(),
            }));
        }
        for (index, (&kind, arg)) in expected.iter().zip(&args).enumerate() {
            if arg.kind() != kind {
                return Err(mismatch(InvocationFault::KindMismatch {
                    index,
                    expected: kind,
                    found: arg.kind(),
                }));
            }
        }

        let mut frame = Frame::new(method_index, method);
        let mut slot = 0;
        for arg in args {
            frame.locals_mut().write(slot, arg)?;
            slot += arg.size();
        }
        debug!(
            "enter {}{} depth={}",
            method.name(),
            method.descriptor(),
            self.frames.len() + 1
        );
        self.frames.push(frame);
        Ok(())
    }

    /// Steps the top frame until the frame at `base` returns.
    fn execute(&mut self, base: usize) -> Result<Option<Value>> {
        loop {
            let state = {
                let frame = self.frames.last_mut().ok_or(StackFault::Underflow)?;
                Interpreter::new(&self.program, self.config.trace_execution).step(frame)?
            };
            match state {
                ExecutionState::Running => (),
                ExecutionState::Invoke { method_index, args } => {
                    self.push_frame(method_index, args)?;
                }
                ExecutionState::Returned(value) => {
                    if let Some(frame) = self.frames.pop() {
                        if let Some(method) = self.program.method(frame.method_index()) {
                            debug!(
                                "leave {}{} -> {value:?} depth={}",
                                method.name(),
                                method.descriptor(),
                                self.frames.len()
                            );
                        }
                    }
                    if self.frames.len() <= base {
                        return Ok(value);
                    }
                    if let (Some(value), Some(caller)) = (value, self.frames.last_mut()) {
                        caller.stack_mut().push(value);
                    }
                }
            }
        }
    }
}

fn unresolved(name: &str, descriptor: &str) -> RuntimeError {
    RuntimeError::Invocation {
        method: format!("{name}{descriptor}"),
        fault: InvocationFault::Unresolved {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        },
    }
}
