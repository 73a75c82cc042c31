//! Assembler for JVM method bodies.
//!
//! Branches name a [`Label`] that may be bound before or after the branch;
//! offsets are patched in [`CodeBuilder::finish`]. Local variable accesses
//! pick the shortest encoding: `xload_<n>`, the one-byte index form, or the
//! `wide` prefix.
use crate::bytecode::OPCode;
use crate::error::ProgramError;
use crate::program::BaseTypeKind;

use byteorder::{BigEndian, ByteOrder};

/// A branch target inside the method being assembled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Label(usize);

#[derive(Debug)]
struct Fixup {
    label: Label,
    // pc of the instruction the offset is relative to.
    base: usize,
    // Position of the offset bytes in the buffer.
    at: usize,
    wide: bool,
}

#[derive(Debug, Default)]
pub struct CodeBuilder {
    buf: Vec<u8>,
    labels: Vec<Option<usize>>,
    fixups: Vec<Fixup>,
    // First misuse, reported by `finish`.
    error: Option<ProgramError>,
}

/// Position of a kind within the per-kind opcode groups
/// (`iload`, `lload`, `fload`, `dload`, `aload`).
fn kind_offset(kind: BaseTypeKind) -> Option<u8> {
    match kind {
        BaseTypeKind::Int => Some(0),
        BaseTypeKind::Long => Some(1),
        BaseTypeKind::Float => Some(2),
        BaseTypeKind::Double => Some(3),
        BaseTypeKind::Reference => Some(4),
        BaseTypeKind::Void => None,
    }
}

impl CodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current byte offset in the code.
    pub fn current_offset(&self) -> usize {
        self.buf.len()
    }

    fn emit_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn emit_u16(&mut self, v: u16) {
        let mut bytes = [0; 2];
        BigEndian::write_u16(&mut bytes, v);
        self.buf.extend_from_slice(&bytes);
    }

    fn emit_i32(&mut self, v: i32) {
        let mut bytes = [0; 4];
        BigEndian::write_i32(&mut bytes, v);
        self.buf.extend_from_slice(&bytes);
    }

    fn emit_op(&mut self, op: OPCode) {
        self.buf.push(op.into());
    }

    fn fail(&mut self, error: ProgramError) {
        self.error.get_or_insert(error);
    }

    fn emit_fixup(&mut self, label: Label, base: usize, wide: bool) {
        let at = self.buf.len();
        self.fixups.push(Fixup {
            label,
            base,
            at,
            wide,
        });
        if wide {
            self.emit_i32(0);
        } else {
            self.emit_u16(0);
        }
    }

    pub fn label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Binds `label` to the current position.
    pub fn bind(&mut self, label: Label) -> &mut Self {
        let offset = self.buf.len();
        if let Some(slot) = self.labels.get_mut(label.0) {
            *slot = Some(offset);
        }
        self
    }

    /// Emits an instruction without operands.
    pub fn op(&mut self, op: OPCode) -> &mut Self {
        self.emit_op(op);
        self
    }

    /// Pushes an int constant with `iconst_<n>`, `bipush` or `sipush`.
    pub fn push_int(&mut self, value: i16) -> &mut Self {
        match value {
            -1..=5 => {
                let iconst_0 = i16::from(u8::from(OPCode::Iconst0));
                self.emit_u8((iconst_0 + value) as u8);
            }
            _ => match i8::try_from(value) {
                Ok(byte) => {
                    self.emit_op(OPCode::Bipush);
                    self.emit_u8(byte as u8);
                }
                Err(_) => {
                    self.emit_op(OPCode::Sipush);
                    self.emit_u16(value as u16);
                }
            },
        }
        self
    }

    fn local_access(
        &mut self,
        name: &'static str,
        kind: BaseTypeKind,
        index: u16,
        long_form: u8,
        short_form: u8,
    ) -> &mut Self {
        let Some(k) = kind_offset(kind) else {
            self.fail(ProgramError::UnsupportedKind { op: name, kind });
            return self;
        };
        match index {
            0..=3 => self.emit_u8(short_form + 4 * k + index as u8),
            4..=255 => {
                self.emit_u8(long_form + k);
                self.emit_u8(index as u8);
            }
            _ => {
                self.emit_op(OPCode::Wide);
                self.emit_u8(long_form + k);
                self.emit_u16(index);
            }
        }
        self
    }

    pub fn load(&mut self, kind: BaseTypeKind, index: u16) -> &mut Self {
        self.local_access(
            "load",
            kind,
            index,
            OPCode::ILoad.into(),
            OPCode::ILoad0.into(),
        )
    }

    pub fn store(&mut self, kind: BaseTypeKind, index: u16) -> &mut Self {
        self.local_access(
            "store",
            kind,
            index,
            OPCode::IStore.into(),
            OPCode::IStore0.into(),
        )
    }

    /// Adds `delta` to int local `index`, widening when either operand does
    /// not fit a byte.
    pub fn iinc(&mut self, index: u16, delta: i16) -> &mut Self {
        match (u8::try_from(index), i8::try_from(delta)) {
            (Ok(index), Ok(delta)) => {
                self.emit_op(OPCode::IInc);
                self.emit_u8(index);
                self.emit_u8(delta as u8);
            }
            _ => {
                self.emit_op(OPCode::Wide);
                self.emit_op(OPCode::IInc);
                self.emit_u16(index);
                self.emit_u16(delta as u16);
            }
        }
        self
    }

    /// Emits a conditional branch, `goto` or `goto_w` to `label`.
    pub fn branch(&mut self, op: OPCode, label: Label) -> &mut Self {
        if !op.is_branch() {
            self.fail(ProgramError::NotABranch(op.into()));
            return self;
        }
        let base = self.buf.len();
        self.emit_op(op);
        self.emit_fixup(label, base, op == OPCode::GotoW);
        self
    }

    /// Loads an int or float constant with `ldc` or `ldc_w`.
    pub fn ldc(&mut self, index: u16) -> &mut Self {
        match u8::try_from(index) {
            Ok(index) => {
                self.emit_op(OPCode::Ldc);
                self.emit_u8(index);
            }
            Err(_) => {
                self.emit_op(OPCode::LdcW);
                self.emit_u16(index);
            }
        }
        self
    }

    pub fn ldc2_w(&mut self, index: u16) -> &mut Self {
        self.emit_op(OPCode::Ldc2W);
        self.emit_u16(index);
        self
    }

    pub fn invokestatic(&mut self, method_ref: u16) -> &mut Self {
        self.emit_op(OPCode::InvokeStatic);
        self.emit_u16(method_ref);
        self
    }

    fn align(&mut self) {
        while self.buf.len() % 4 != 0 {
            self.emit_u8(0);
        }
    }

    /// Emits a `tableswitch` whose `targets` cover the keys from `low`
    /// upwards.
    pub fn tableswitch(&mut self, low: i32, targets: &[Label], default: Label) -> &mut Self {
        let base = self.buf.len();
        self.emit_op(OPCode::TableSwitch);
        self.align();
        self.emit_fixup(default, base, true);
        let high = i64::from(low) + targets.len() as i64 - 1;
        self.emit_i32(low);
        self.emit_i32(high as i32);
        for &target in targets {
            self.emit_fixup(target, base, true);
        }
        self
    }

    /// Emits a `lookupswitch`; `pairs` are sorted by key here.
    pub fn lookupswitch(&mut self, pairs: &[(i32, Label)], default: Label) -> &mut Self {
        let mut pairs = pairs.to_vec();
        pairs.sort_by_key(|&(key, _)| key);
        let base = self.buf.len();
        self.emit_op(OPCode::LookupSwitch);
        self.align();
        self.emit_fixup(default, base, true);
        self.emit_i32(pairs.len() as i32);
        for (key, target) in pairs {
            self.emit_i32(key);
            self.emit_fixup(target, base, true);
        }
        self
    }

    /// Emits the return instruction matching `kind`.
    pub fn return_(&mut self, kind: BaseTypeKind) -> &mut Self {
        let op = match kind {
            BaseTypeKind::Int => OPCode::IReturn,
            BaseTypeKind::Long => OPCode::LReturn,
            BaseTypeKind::Float => OPCode::FReturn,
            BaseTypeKind::Double => OPCode::DReturn,
            BaseTypeKind::Reference => OPCode::AReturn,
            BaseTypeKind::Void => OPCode::Return,
        };
        self.op(op)
    }

    /// Resolves every branch and returns the code.
    pub fn finish(mut self) -> Result<Vec<u8>, ProgramError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        for fixup in &self.fixups {
            let target = self
                .labels
                .get(fixup.label.0)
                .copied()
                .flatten()
                .ok_or(ProgramError::UnboundLabel(fixup.label.0))?;
            let offset = target as i64 - fixup.base as i64;
            let out_of_range = || ProgramError::BranchOutOfRange {
                pc: fixup.base,
                offset,
            };
            if fixup.wide {
                let offset = i32::try_from(offset).map_err(|_| out_of_range())?;
                BigEndian::write_i32(&mut self.buf[fixup.at..fixup.at + 4], offset);
            } else {
                let offset = i16::try_from(offset).map_err(|_| out_of_range())?;
                BigEndian::write_i16(&mut self.buf[fixup.at..fixup.at + 2], offset);
            }
        }
        Ok(self.buf)
    }
}
