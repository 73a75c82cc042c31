//! Abstract representation of a Java program.
//!
//! A `Program` is a resolved constant pool and a method table. It is the
//! input to the runtime: class file parsing and linking happen elsewhere, the
//! runtime only needs each method's signature, limits and code.
use crate::error::{InvocationFault, ProgramError};
use crate::switch::{resolve_switch_tables, SwitchTable};
use std::collections::HashMap;

use regex::Regex;

/// Descriptor of the conventional program entry point.
pub const MAIN_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

/// Types the interpreter distinguishes. `byte`, `char`, `short` and
/// `boolean` are all carried as `Int`; classes and arrays are `Reference`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BaseTypeKind {
    Int,
    Long,
    Float,
    Double,
    Reference,
    Void,
}

impl BaseTypeKind {
    /// Returns the size in slots of a given type.
    pub fn size(&self) -> usize {
        match self {
            Self::Int | Self::Float | Self::Reference => 1,
            Self::Long | Self::Double => 2,
            Self::Void => 0,
        }
    }

    /// Decodes a single field descriptor such as `I`, `[J` or
    /// `Ljava/lang/String;`.
    fn decode(descriptor: &str) -> Option<Self> {
        match descriptor.as_bytes().first()? {
            b'I' | b'B' | b'C' | b'S' | b'Z' => Some(Self::Int),
            b'J' => Some(Self::Long),
            b'F' => Some(Self::Float),
            b'D' => Some(Self::Double),
            b'V' => Some(Self::Void),
            b'L' | b'[' => Some(Self::Reference),
            _ => None,
        }
    }
}

/// Resolved constant pool entries.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    MethodRef { name: String, descriptor: String },
}

/// Representation of Java programs that we want to run.
#[derive(Debug, Clone, Default)]
pub struct Program {
    // Constant pool, addressed from 1 like a class file's.
    constant_pool: Vec<Constant>,
    methods: Vec<Method>,
    // (name, descriptor) -> method index.
    index: HashMap<(String, String), usize>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a constant and returns its pool index.
    pub fn add_constant(&mut self, constant: Constant) -> u16 {
        self.constant_pool.push(constant);
        self.constant_pool.len() as u16
    }

    /// Appends a method reference constant.
    pub fn method_ref(&mut self, name: &str, descriptor: &str) -> u16 {
        self.add_constant(Constant::MethodRef {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    /// Adds a method and returns its index. A later method with the same
    /// name and descriptor shadows the earlier one for lookups.
    pub fn add_method(&mut self, method: Method) -> usize {
        let index = self.methods.len();
        self.index
            .insert((method.name.clone(), method.descriptor.clone()), index);
        self.methods.push(method);
        index
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<usize> {
        self.index
            .get(&(name.to_string(), descriptor.to_string()))
            .copied()
    }

    /// Resolves the method reference at constant pool `index` to a method
    /// index.
    pub fn resolve_method(&self, index: u16) -> Result<usize, InvocationFault> {
        match self.constant(index) {
            Some(Constant::MethodRef { name, descriptor }) => self
                .find_method(name, descriptor)
                .ok_or_else(|| InvocationFault::Unresolved {
                    name: name.clone(),
                    descriptor: descriptor.clone(),
                }),
            _ => Err(InvocationFault::NotAMethodRef(index)),
        }
    }

    pub fn method(&self, method_index: usize) -> Option<&Method> {
        self.methods.get(method_index)
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn constant(&self, index: u16) -> Option<&Constant> {
        (index as usize)
            .checked_sub(1)
            .and_then(|i| self.constant_pool.get(i))
    }

    /// Returns program entry point, in this case the index of
    /// `main(String[])`.
    pub fn entry_point(&self) -> Option<usize> {
        self.find_method("main", MAIN_DESCRIPTOR)
    }
}

/// Java class method representation for the interpreter.
#[derive(Debug, Clone)]
pub struct Method {
    name: String,
    descriptor: String,
    arg_types: Vec<BaseTypeKind>,
    return_type: BaseTypeKind,
    max_stack: u16,
    max_locals: u16,
    code: Vec<u8>,
    // Switch tables keyed by the pc of their instruction.
    switch_tables: HashMap<usize, SwitchTable>,
}

impl Method {
    /// Builds a method, parsing its descriptor and resolving its switch
    /// tables. Code with unknown opcodes or branches leaving the method is
    /// rejected here rather than at dispatch.
    pub fn new(
        name: &str,
        descriptor: &str,
        max_stack: u16,
        max_locals: u16,
        code: Vec<u8>,
    ) -> Result<Self, ProgramError> {
        let (arg_types, return_type) = parse_method_types(descriptor)?;
        let needed: usize = arg_types.iter().map(BaseTypeKind::size).sum();
        if usize::from(max_locals) < needed {
            return Err(ProgramError::LocalsTooSmall {
                method: format!("{name}{descriptor}"),
                max_locals,
                needed,
            });
        }
        let switch_tables =
            resolve_switch_tables(&code).map_err(|(pc, fault)| ProgramError::InvalidCode {
                method: format!("{name}{descriptor}"),
                pc,
                fault,
            })?;
        Ok(Self {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            arg_types,
            return_type,
            max_stack,
            max_locals,
            code,
            switch_tables,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn arg_types(&self) -> &[BaseTypeKind] {
        &self.arg_types
    }

    pub fn return_type(&self) -> BaseTypeKind {
        self.return_type
    }

    pub fn max_stack(&self) -> usize {
        self.max_stack as usize
    }

    pub fn max_locals(&self) -> usize {
        self.max_locals as usize
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Number of local slots the arguments occupy.
    pub fn arg_slot_count(&self) -> usize {
        self.arg_types.iter().map(BaseTypeKind::size).sum()
    }

    pub fn switch_table(&self, pc: usize) -> Option<&SwitchTable> {
        self.switch_tables.get(&pc)
    }
}

// Parse a method descriptor, returns a tuple of argument types and return
// type.
fn parse_method_types(
    descriptor: &str,
) -> Result<(Vec<BaseTypeKind>, BaseTypeKind), ProgramError> {
    let re = Regex::new(
        r"^\(((?:\[*(?:[BCDFIJSZ]|L[^;]+;))*)\)(V|\[*(?:[BCDFIJSZ]|L[^;]+;))$",
    )?;
    let caps = re
        .captures(descriptor)
        .ok_or_else(|| ProgramError::MalformedDescriptor(descriptor.to_string()))?;
    let arg_string = caps.get(1).map_or("", |m| m.as_str());
    let return_type_string = caps.get(2).map_or("", |m| m.as_str());

    let malformed = || ProgramError::MalformedDescriptor(descriptor.to_string());
    let field = Regex::new(r"\[*(?:[BCDFIJSZ]|L[^;]+;)")?;
    let arg_types = field
        .find_iter(arg_string)
        .map(|m| match BaseTypeKind::decode(m.as_str()) {
            Some(BaseTypeKind::Void) | None => Err(malformed()),
            Some(kind) => Ok(kind),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let return_type = BaseTypeKind::decode(return_type_string).ok_or_else(malformed)?;
    Ok((arg_types, return_type))
}
