//! `tableswitch` and `lookupswitch` tables.
//!
//! Tables are decoded once, when a method is built, and kept keyed by the
//! program counter of the switch instruction. All offsets are relative to
//! that program counter.
use std::collections::HashMap;

use crate::bytecode::OPCode;
use crate::error::DispatchFault;
use crate::reader::BytecodeReader;

type Result<T> = std::result::Result<T, DispatchFault>;

/// Decoded jump table of a switch instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchTable {
    /// Dense table covering every key in `low..=low + offsets.len() - 1`.
    Table {
        default: i32,
        low: i32,
        offsets: Vec<i32>,
    },
    /// Sparse `(key, offset)` pairs sorted by strictly ascending key.
    Lookup { default: i32, pairs: Vec<(i32, i32)> },
}

impl SwitchTable {
    /// Decodes the operands of a switch instruction. `reader` must be
    /// positioned just past the opcode.
    pub fn decode(op: OPCode, reader: &mut BytecodeReader) -> Result<Self> {
        reader.align4()?;
        let default = reader.read_i32()?;
        match op {
            OPCode::TableSwitch => {
                let low = reader.read_i32()?;
                let high = reader.read_i32()?;
                if high < low {
                    return Err(DispatchFault::MalformedSwitch);
                }
                let count = (i64::from(high) - i64::from(low) + 1) as usize;
                if count > reader.remaining() / 4 {
                    return Err(DispatchFault::TruncatedOperand);
                }
                let offsets = (0..count)
                    .map(|_| reader.read_i32())
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Table {
                    default,
                    low,
                    offsets,
                })
            }
            OPCode::LookupSwitch => {
                let npairs = reader.read_i32()?;
                let count =
                    usize::try_from(npairs).map_err(|_| DispatchFault::MalformedSwitch)?;
                if count > reader.remaining() / 8 {
                    return Err(DispatchFault::TruncatedOperand);
                }
                let mut pairs = Vec::with_capacity(count);
                for _ in 0..count {
                    let key = reader.read_i32()?;
                    let offset = reader.read_i32()?;
                    if matches!(pairs.last(), Some(&(previous, _)) if previous >= key) {
                        return Err(DispatchFault::MalformedSwitch);
                    }
                    pairs.push((key, offset));
                }
                Ok(Self::Lookup { default, pairs })
            }
            _ => Err(DispatchFault::MalformedSwitch),
        }
    }

    /// Returns the branch offset selected by `key`.
    pub fn offset_for(&self, key: i32) -> i32 {
        match self {
            Self::Table {
                default,
                low,
                offsets,
            } => usize::try_from(i64::from(key) - i64::from(*low))
                .ok()
                .and_then(|index| offsets.get(index))
                .copied()
                .unwrap_or(*default),
            Self::Lookup { default, pairs } => pairs
                .binary_search_by_key(&key, |&(k, _)| k)
                .map(|index| pairs[index].1)
                .unwrap_or(*default),
        }
    }

    /// Every offset the table can produce, the default included.
    pub fn offsets(&self) -> Vec<i32> {
        match self {
            Self::Table {
                default, offsets, ..
            } => std::iter::once(*default)
                .chain(offsets.iter().copied())
                .collect(),
            Self::Lookup { default, pairs } => std::iter::once(*default)
                .chain(pairs.iter().map(|&(_, offset)| offset))
                .collect(),
        }
    }
}

/// Resolves `pc + offset` into an index inside a method of `code_len` bytes.
pub fn branch_target(code_len: usize, pc: usize, offset: i32) -> Result<usize> {
    let target = pc as i64 + i64::from(offset);
    if target < 0 || target >= code_len as i64 {
        return Err(DispatchFault::InvalidBranchTarget(target));
    }
    Ok(target as usize)
}

/// Walks `code` instruction by instruction, decoding every switch table and
/// checking that every branch lands inside the method.
///
/// Fails with the program counter of the offending instruction.
pub fn resolve_switch_tables(
    code: &[u8],
) -> std::result::Result<HashMap<usize, SwitchTable>, (usize, DispatchFault)> {
    let mut tables = HashMap::new();
    let mut pc = 0;
    while pc < code.len() {
        let op = OPCode::from(code[pc]);
        let mut reader = BytecodeReader::new(code, pc + 1);
        let at = move |fault| (pc, fault);
        match op {
            OPCode::TableSwitch | OPCode::LookupSwitch => {
                let table = SwitchTable::decode(op, &mut reader).map_err(at)?;
                for offset in table.offsets() {
                    branch_target(code.len(), pc, offset).map_err(at)?;
                }
                tables.insert(pc, table);
            }
            OPCode::Wide => {
                let inner = OPCode::from(reader.read_u8().map_err(at)?);
                if !inner.is_widenable() {
                    return Err(at(DispatchFault::InvalidWide(inner.into())));
                }
                reader.read_u16().map_err(at)?;
                if inner == OPCode::IInc {
                    reader.read_i16().map_err(at)?;
                }
            }
            OPCode::GotoW => {
                let offset = reader.read_i32().map_err(at)?;
                branch_target(code.len(), pc, offset).map_err(at)?;
            }
            op if op.is_branch() => {
                let offset = reader.read_i16().map_err(at)?;
                branch_target(code.len(), pc, i32::from(offset)).map_err(at)?;
            }
            OPCode::Unknown(byte) => return Err(at(DispatchFault::InvalidOpcode(byte))),
            op => {
                let len = op.operand_len().unwrap_or(0);
                if len > reader.remaining() {
                    return Err(at(DispatchFault::TruncatedOperand));
                }
                pc += 1 + len;
                continue;
            }
        }
        pc = reader.position();
    }
    Ok(tables)
}
