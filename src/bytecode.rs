//! JVM opcodes understood by the interpreter.
//!
//! Only the arithmetic, constant, load/store, stack, conversion, control
//! flow and static invocation families are listed; every other byte decodes
//! to [`OPCode::Unknown`] and is rejected at dispatch.

/// Declares the opcode table once and derives the byte mapping and operand
/// lengths from it. `None` marks instructions whose length depends on their
/// position or operands.
macro_rules! opcodes {
    ($($name:ident = $byte:literal, $len:expr;)*) => {
        /// JVM instruction mnemonics.
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum OPCode {
            $($name,)*
            Unknown(u8),
        }

        impl From<u8> for OPCode {
            fn from(byte: u8) -> Self {
                match byte {
                    $($byte => Self::$name,)*
                    other => Self::Unknown(other),
                }
            }
        }

        impl From<OPCode> for u8 {
            fn from(op: OPCode) -> u8 {
                match op {
                    $(OPCode::$name => $byte,)*
                    OPCode::Unknown(byte) => byte,
                }
            }
        }

        impl OPCode {
            /// Number of operand bytes following the opcode, `None` for
            /// `tableswitch`, `lookupswitch` and `wide`.
            pub const fn operand_len(self) -> Option<usize> {
                match self {
                    $(Self::$name => $len,)*
                    Self::Unknown(_) => None,
                }
            }
        }
    };
}

opcodes! {
    Nop = 0x00, Some(0);
    AconstNull = 0x01, Some(0);
    IconstM1 = 0x02, Some(0);
    Iconst0 = 0x03, Some(0);
    Iconst1 = 0x04, Some(0);
    Iconst2 = 0x05, Some(0);
    Iconst3 = 0x06, Some(0);
    Iconst4 = 0x07, Some(0);
    Iconst5 = 0x08, Some(0);
    Lconst0 = 0x09, Some(0);
    Lconst1 = 0x0a, Some(0);
    Fconst0 = 0x0b, Some(0);
    Fconst1 = 0x0c, Some(0);
    Fconst2 = 0x0d, Some(0);
    Dconst0 = 0x0e, Some(0);
    Dconst1 = 0x0f, Some(0);
    Bipush = 0x10, Some(1);
    Sipush = 0x11, Some(2);
    Ldc = 0x12, Some(1);
    LdcW = 0x13, Some(2);
    Ldc2W = 0x14, Some(2);
    ILoad = 0x15, Some(1);
    LLoad = 0x16, Some(1);
    FLoad = 0x17, Some(1);
    DLoad = 0x18, Some(1);
    ALoad = 0x19, Some(1);
    ILoad0 = 0x1a, Some(0);
    ILoad1 = 0x1b, Some(0);
    ILoad2 = 0x1c, Some(0);
    ILoad3 = 0x1d, Some(0);
    LLoad0 = 0x1e, Some(0);
    LLoad1 = 0x1f, Some(0);
    LLoad2 = 0x20, Some(0);
    LLoad3 = 0x21, Some(0);
    FLoad0 = 0x22, Some(0);
    FLoad1 = 0x23, Some(0);
    FLoad2 = 0x24, Some(0);
    FLoad3 = 0x25, Some(0);
    DLoad0 = 0x26, Some(0);
    DLoad1 = 0x27, Some(0);
    DLoad2 = 0x28, Some(0);
    DLoad3 = 0x29, Some(0);
    ALoad0 = 0x2a, Some(0);
    ALoad1 = 0x2b, Some(0);
    ALoad2 = 0x2c, Some(0);
    ALoad3 = 0x2d, Some(0);
    IStore = 0x36, Some(1);
    LStore = 0x37, Some(1);
    FStore = 0x38, Some(1);
    DStore = 0x39, Some(1);
    AStore = 0x3a, Some(1);
    IStore0 = 0x3b, Some(0);
    IStore1 = 0x3c, Some(0);
    IStore2 = 0x3d, Some(0);
    IStore3 = 0x3e, Some(0);
    LStore0 = 0x3f, Some(0);
    LStore1 = 0x40, Some(0);
    LStore2 = 0x41, Some(0);
    LStore3 = 0x42, Some(0);
    FStore0 = 0x43, Some(0);
    FStore1 = 0x44, Some(0);
    FStore2 = 0x45, Some(0);
    FStore3 = 0x46, Some(0);
    DStore0 = 0x47, Some(0);
    DStore1 = 0x48, Some(0);
    DStore2 = 0x49, Some(0);
    DStore3 = 0x4a, Some(0);
    AStore0 = 0x4b, Some(0);
    AStore1 = 0x4c, Some(0);
    AStore2 = 0x4d, Some(0);
    AStore3 = 0x4e, Some(0);
    Pop = 0x57, Some(0);
    Pop2 = 0x58, Some(0);
    Dup = 0x59, Some(0);
    DupX1 = 0x5a, Some(0);
    DupX2 = 0x5b, Some(0);
    Dup2 = 0x5c, Some(0);
    Dup2X1 = 0x5d, Some(0);
    Dup2X2 = 0x5e, Some(0);
    Swap = 0x5f, Some(0);
    IAdd = 0x60, Some(0);
    LAdd = 0x61, Some(0);
    FAdd = 0x62, Some(0);
    DAdd = 0x63, Some(0);
    ISub = 0x64, Some(0);
    LSub = 0x65, Some(0);
    FSub = 0x66, Some(0);
    DSub = 0x67, Some(0);
    IMul = 0x68, Some(0);
    LMul = 0x69, Some(0);
    FMul = 0x6a, Some(0);
    DMul = 0x6b, Some(0);
    IDiv = 0x6c, Some(0);
    LDiv = 0x6d, Some(0);
    FDiv = 0x6e, Some(0);
    DDiv = 0x6f, Some(0);
    IRem = 0x70, Some(0);
    LRem = 0x71, Some(0);
    FRem = 0x72, Some(0);
    DRem = 0x73, Some(0);
    INeg = 0x74, Some(0);
    LNeg = 0x75, Some(0);
    FNeg = 0x76, Some(0);
    DNeg = 0x77, Some(0);
    IShl = 0x78, Some(0);
    LShl = 0x79, Some(0);
    IShr = 0x7a, Some(0);
    LShr = 0x7b, Some(0);
    IUShr = 0x7c, Some(0);
    LUShr = 0x7d, Some(0);
    IAnd = 0x7e, Some(0);
    LAnd = 0x7f, Some(0);
    IOr = 0x80, Some(0);
    LOr = 0x81, Some(0);
    IXor = 0x82, Some(0);
    LXor = 0x83, Some(0);
    IInc = 0x84, Some(2);
    I2L = 0x85, Some(0);
    I2F = 0x86, Some(0);
    I2D = 0x87, Some(0);
    L2I = 0x88, Some(0);
    L2F = 0x89, Some(0);
    L2D = 0x8a, Some(0);
    F2I = 0x8b, Some(0);
    F2L = 0x8c, Some(0);
    F2D = 0x8d, Some(0);
    D2I = 0x8e, Some(0);
    D2L = 0x8f, Some(0);
    D2F = 0x90, Some(0);
    I2B = 0x91, Some(0);
    I2C = 0x92, Some(0);
    I2S = 0x93, Some(0);
    LCmp = 0x94, Some(0);
    FCmpL = 0x95, Some(0);
    FCmpG = 0x96, Some(0);
    DCmpL = 0x97, Some(0);
    DCmpG = 0x98, Some(0);
    IfEq = 0x99, Some(2);
    IfNe = 0x9a, Some(2);
    IfLt = 0x9b, Some(2);
    IfGe = 0x9c, Some(2);
    IfGt = 0x9d, Some(2);
    IfLe = 0x9e, Some(2);
    IfICmpEq = 0x9f, Some(2);
    IfICmpNe = 0xa0, Some(2);
    IfICmpLt = 0xa1, Some(2);
    IfICmpGe = 0xa2, Some(2);
    IfICmpGt = 0xa3, Some(2);
    IfICmpLe = 0xa4, Some(2);
    IfACmpEq = 0xa5, Some(2);
    IfACmpNe = 0xa6, Some(2);
    Goto = 0xa7, Some(2);
    TableSwitch = 0xaa, None;
    LookupSwitch = 0xab, None;
    IReturn = 0xac, Some(0);
    LReturn = 0xad, Some(0);
    FReturn = 0xae, Some(0);
    DReturn = 0xaf, Some(0);
    AReturn = 0xb0, Some(0);
    Return = 0xb1, Some(0);
    InvokeStatic = 0xb8, Some(2);
    Wide = 0xc4, None;
    IfNull = 0xc6, Some(2);
    IfNonNull = 0xc7, Some(2);
    GotoW = 0xc8, Some(4);
}

impl OPCode {
    /// Returns true for instructions whose operand is a single signed
    /// branch offset relative to the opcode.
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Self::IfEq
                | Self::IfNe
                | Self::IfLt
                | Self::IfGe
                | Self::IfGt
                | Self::IfLe
                | Self::IfICmpEq
                | Self::IfICmpNe
                | Self::IfICmpLt
                | Self::IfICmpGe
                | Self::IfICmpGt
                | Self::IfICmpLe
                | Self::IfACmpEq
                | Self::IfACmpNe
                | Self::Goto
                | Self::IfNull
                | Self::IfNonNull
                | Self::GotoW
        )
    }

    /// Returns true for the instructions `wide` may prefix.
    pub const fn is_widenable(self) -> bool {
        matches!(
            self,
            Self::ILoad
                | Self::LLoad
                | Self::FLoad
                | Self::DLoad
                | Self::ALoad
                | Self::IStore
                | Self::LStore
                | Self::FStore
                | Self::DStore
                | Self::AStore
                | Self::IInc
        )
    }
}
