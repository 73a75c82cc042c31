//! Fixture classes assembled the way javac compiles them.
#![allow(dead_code)]

use cortado::builder::CodeBuilder;
use cortado::bytecode::OPCode;
use cortado::program::MAIN_DESCRIPTOR;
use cortado::{BaseTypeKind, Constant, Method, Program, Runtime, RuntimeError, Value};

use BaseTypeKind::{Double, Float, Int, Long, Reference, Void};

/// Collects the methods of one fixture class.
#[derive(Default)]
pub struct Fixture {
    program: Program,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(&mut self, constant: Constant) -> u16 {
        self.program.add_constant(constant)
    }

    pub fn method_ref(&mut self, name: &str, descriptor: &str) -> u16 {
        self.program.method_ref(name, descriptor)
    }

    /// Adds `name` with the code emitted by `body`.
    pub fn method(
        &mut self,
        name: &str,
        descriptor: &str,
        max_stack: u16,
        max_locals: u16,
        body: impl FnOnce(&mut CodeBuilder),
    ) -> &mut Self {
        let mut b = CodeBuilder::new();
        body(&mut b);
        let code = b.finish().unwrap();
        let method = Method::new(name, descriptor, max_stack, max_locals, code).unwrap();
        self.program.add_method(method);
        self
    }

    /// `static R name(A a, A b) { return a OP b; }`
    pub fn binary(
        &mut self,
        name: &str,
        descriptor: &str,
        kind: BaseTypeKind,
        op: OPCode,
    ) -> &mut Self {
        let size = kind.size() as u16;
        self.method(name, descriptor, 2 * size, 2 * size, |b| {
            b.load(kind, 0).load(kind, size).op(op).return_(kind);
        })
    }

    /// `static long name(long a, int b) { return a OP b; }`
    pub fn long_shift(&mut self, name: &str, op: OPCode) -> &mut Self {
        self.method(name, "(JI)J", 3, 3, |b| {
            b.load(Long, 0).load(Int, 2).op(op).return_(Long);
        })
    }

    /// `static R name(A a) { return OP a; }`, also used for casts.
    pub fn unary(
        &mut self,
        name: &str,
        descriptor: &str,
        from: BaseTypeKind,
        to: BaseTypeKind,
        op: OPCode,
    ) -> &mut Self {
        let max_stack = from.size().max(to.size()) as u16;
        self.method(name, descriptor, max_stack, from.size() as u16, |b| {
            b.load(from, 0).op(op).return_(to);
        })
    }

    /// `static R name() { return <constant>; }`
    pub fn constant_method(
        &mut self,
        name: &str,
        descriptor: &str,
        kind: BaseTypeKind,
        emit: impl FnOnce(&mut CodeBuilder),
    ) -> &mut Self {
        self.method(name, descriptor, kind.size() as u16, 0, |b| {
            emit(b);
            b.return_(kind);
        })
    }

    pub fn program(self) -> Program {
        self.program
    }

    pub fn runtime(self) -> Runtime {
        Runtime::new(self.program)
    }
}

pub fn call(
    runtime: &mut Runtime,
    name: &str,
    descriptor: &str,
    args: &[Value],
) -> Result<Option<Value>, RuntimeError> {
    runtime.invoke_static(name, descriptor, args)
}

macro_rules! typed_call {
    ($name:ident, $variant:ident, $t:ty) => {
        pub fn $name(runtime: &mut Runtime, name: &str, descriptor: &str, args: &[Value]) -> $t {
            match call(runtime, name, descriptor, args) {
                Ok(Some(Value::$variant(value))) => value,
                other => panic!("{name}{descriptor}: {other:?}"),
            }
        }
    };
}

typed_call!(call_int, Int, i32);
typed_call!(call_long, Long, i64);
typed_call!(call_float, Float, f32);
typed_call!(call_double, Double, f64);

/// ArithmeticTest
pub fn arithmetic() -> Runtime {
    let mut f = Fixture::new();
    f.binary("testIADD", "(II)I", Int, OPCode::IAdd)
        .binary("testISUB", "(II)I", Int, OPCode::ISub)
        .binary("testIMUL", "(II)I", Int, OPCode::IMul)
        .binary("testIDIV", "(II)I", Int, OPCode::IDiv)
        .binary("testIREM", "(II)I", Int, OPCode::IRem)
        .unary("testINEG", "(I)I", Int, Int, OPCode::INeg)
        .binary("testLADD", "(JJ)J", Long, OPCode::LAdd)
        .binary("testLSUB", "(JJ)J", Long, OPCode::LSub)
        .binary("testLMUL", "(JJ)J", Long, OPCode::LMul)
        .binary("testLDIV", "(JJ)J", Long, OPCode::LDiv)
        .binary("testLREM", "(JJ)J", Long, OPCode::LRem)
        .unary("testLNEG", "(J)J", Long, Long, OPCode::LNeg)
        .binary("testFADD", "(FF)F", Float, OPCode::FAdd)
        .binary("testFSUB", "(FF)F", Float, OPCode::FSub)
        .binary("testFMUL", "(FF)F", Float, OPCode::FMul)
        .binary("testFDIV", "(FF)F", Float, OPCode::FDiv)
        .binary("testFREM", "(FF)F", Float, OPCode::FRem)
        .unary("testFNEG", "(F)F", Float, Float, OPCode::FNeg)
        .binary("testDADD", "(DD)D", Double, OPCode::DAdd)
        .binary("testDSUB", "(DD)D", Double, OPCode::DSub)
        .binary("testDMUL", "(DD)D", Double, OPCode::DMul)
        .binary("testDDIV", "(DD)D", Double, OPCode::DDiv)
        .binary("testDREM", "(DD)D", Double, OPCode::DRem)
        .unary("testDNEG", "(D)D", Double, Double, OPCode::DNeg)
        .binary("testIAND", "(II)I", Int, OPCode::IAnd)
        .binary("testIOR", "(II)I", Int, OPCode::IOr)
        .binary("testIXOR", "(II)I", Int, OPCode::IXor)
        .binary("testISHL", "(II)I", Int, OPCode::IShl)
        .binary("testISHR", "(II)I", Int, OPCode::IShr)
        .binary("testIUSHR", "(II)I", Int, OPCode::IUShr)
        .binary("testLAND", "(JJ)J", Long, OPCode::LAnd)
        .binary("testLOR", "(JJ)J", Long, OPCode::LOr)
        .binary("testLXOR", "(JJ)J", Long, OPCode::LXor)
        .long_shift("testLSHL", OPCode::LShl)
        .long_shift("testLSHR", OPCode::LShr)
        .long_shift("testLUSHR", OPCode::LUShr);

    f.method("lcmp", "(JJ)I", 4, 4, |b| {
        b.load(Long, 0).load(Long, 2).op(OPCode::LCmp).return_(Int);
    });
    f.method("fcmpl", "(FF)I", 2, 2, |b| {
        b.load(Float, 0).load(Float, 1).op(OPCode::FCmpL).return_(Int);
    });
    f.method("fcmpg", "(FF)I", 2, 2, |b| {
        b.load(Float, 0).load(Float, 1).op(OPCode::FCmpG).return_(Int);
    });
    f.method("dcmpl", "(DD)I", 4, 4, |b| {
        b.load(Double, 0).load(Double, 2).op(OPCode::DCmpL).return_(Int);
    });
    f.method("dcmpg", "(DD)I", 4, 4, |b| {
        b.load(Double, 0).load(Double, 2).op(OPCode::DCmpG).return_(Int);
    });
    f.runtime()
}

/// ConstantTest
pub fn constants() -> Runtime {
    let mut f = Fixture::new();
    for (name, value) in [
        ("testICONST_M1", -1),
        ("testICONST_0", 0),
        ("testICONST_1", 1),
        ("testICONST_2", 2),
        ("testICONST_3", 3),
        ("testICONST_4", 4),
        ("testICONST_5", 5),
        ("testBIPUSH_127", 127),
        ("testBIPUSH_Neg128", -128),
        ("testBIPUSH_0", 0),
        ("testSIPUSH_32767", 32767),
        ("testSIPUSH_Neg32768", -32768),
        ("testSIPUSH_100", 100),
    ] {
        f.constant_method(name, "()I", Int, |b| {
            b.push_int(value);
        });
    }
    for (name, op) in [("testLCONST_0", OPCode::Lconst0), ("testLCONST_1", OPCode::Lconst1)] {
        f.constant_method(name, "()J", Long, |b| {
            b.op(op);
        });
    }
    for (name, op) in [
        ("testFCONST_0", OPCode::Fconst0),
        ("testFCONST_1", OPCode::Fconst1),
        ("testFCONST_2", OPCode::Fconst2),
    ] {
        f.constant_method(name, "()F", Float, |b| {
            b.op(op);
        });
    }
    for (name, op) in [("testDCONST_0", OPCode::Dconst0), ("testDCONST_1", OPCode::Dconst1)] {
        f.constant_method(name, "()D", Double, |b| {
            b.op(op);
        });
    }
    f.constant_method("testACONST_NULL", "()Ljava/lang/Object;", Reference, |b| {
        b.op(OPCode::AconstNull);
    });

    // Values outside the immediate encodings come from the constant pool.
    let int = f.constant(Constant::Integer(100_000));
    let float = f.constant(Constant::Float(1.5));
    let long = f.constant(Constant::Long(1 << 40));
    let double = f.constant(Constant::Double(-2.25));
    f.constant_method("testLDC_int", "()I", Int, |b| {
        b.ldc(int);
    });
    f.constant_method("testLDC_float", "()F", Float, |b| {
        b.ldc(float);
    });
    f.constant_method("testLDC2_W_long", "()J", Long, |b| {
        b.ldc2_w(long);
    });
    f.constant_method("testLDC2_W_double", "()D", Double, |b| {
        b.ldc2_w(double);
    });
    // Push the pool past 255 entries so the next int needs ldc_w.
    for n in 0..300 {
        f.constant(Constant::Integer(n));
    }
    let far = f.constant(Constant::Integer(-7_654_321));
    f.constant_method("testLDC_W_int", "()I", Int, |b| {
        b.ldc(far);
    });
    // ldc cannot load a long.
    f.constant_method("badLDC_long", "()J", Long, |b| {
        b.ldc(long);
    });
    f.runtime()
}

/// ConversionTest
pub fn conversions() -> Runtime {
    let mut f = Fixture::new();
    f.unary("testI2L", "(I)J", Int, Long, OPCode::I2L)
        .unary("testI2F", "(I)F", Int, Float, OPCode::I2F)
        .unary("testI2D", "(I)D", Int, Double, OPCode::I2D)
        .unary("testL2I", "(J)I", Long, Int, OPCode::L2I)
        .unary("testL2F", "(J)F", Long, Float, OPCode::L2F)
        .unary("testL2D", "(J)D", Long, Double, OPCode::L2D)
        .unary("testF2I", "(F)I", Float, Int, OPCode::F2I)
        .unary("testF2L", "(F)J", Float, Long, OPCode::F2L)
        .unary("testF2D", "(F)D", Float, Double, OPCode::F2D)
        .unary("testD2I", "(D)I", Double, Int, OPCode::D2I)
        .unary("testD2L", "(D)J", Double, Long, OPCode::D2L)
        .unary("testD2F", "(D)F", Double, Float, OPCode::D2F)
        .unary("testI2B", "(I)I", Int, Int, OPCode::I2B)
        .unary("testI2C", "(I)I", Int, Int, OPCode::I2C)
        .unary("testI2S", "(I)I", Int, Int, OPCode::I2S);

    // float nan = Float.NaN; return (int) nan;
    let cases = [
        ("testF2I_NaN", Constant::Float(f32::NAN)),
        ("testF2I_Infinity", Constant::Float(f32::INFINITY)),
        ("testD2I_NaN", Constant::Double(f64::NAN)),
        ("testD2I_Infinity", Constant::Double(f64::INFINITY)),
    ];
    for (name, constant) in cases {
        let wide = matches!(constant, Constant::Double(_));
        let index = f.constant(constant);
        let (kind, op) = if wide {
            (Double, OPCode::D2I)
        } else {
            (Float, OPCode::F2I)
        };
        f.method(name, "()I", kind.size() as u16, kind.size() as u16, |b| {
            if wide {
                b.ldc2_w(index);
            } else {
                b.ldc(index);
            }
            b.store(kind, 0).load(kind, 0).op(op).return_(Int);
        });
    }
    f.runtime()
}

/// `if (<cond>) return then; return otherwise;` where javac branches over
/// the `then` block on the inverted condition `skip`.
fn guarded(f: &mut Fixture, name: &str, skip: OPCode, then: i16, otherwise: i16) {
    let two_operands = matches!(
        skip,
        OPCode::IfICmpEq
            | OPCode::IfICmpNe
            | OPCode::IfICmpLt
            | OPCode::IfICmpGe
            | OPCode::IfICmpGt
            | OPCode::IfICmpLe
    );
    let descriptor = if two_operands { "(II)I" } else { "(I)I" };
    let locals = if two_operands { 2 } else { 1 };
    f.method(name, descriptor, locals, locals, |b| {
        let after = b.label();
        b.load(Int, 0);
        if two_operands {
            b.load(Int, 1);
        }
        b.branch(skip, after)
            .push_int(then)
            .return_(Int)
            .bind(after)
            .push_int(otherwise)
            .return_(Int);
    });
}

fn factorial_body(b: &mut CodeBuilder) {
    let positive = b.label();
    let check = b.label();
    let done = b.label();
    b.load(Int, 0)
        .branch(OPCode::IfGt, positive)
        .push_int(1)
        .return_(Int)
        .bind(positive)
        .push_int(1)
        .store(Int, 1)
        .push_int(1)
        .store(Int, 2)
        .bind(check)
        .load(Int, 2)
        .load(Int, 0)
        .branch(OPCode::IfICmpGt, done)
        .load(Int, 1)
        .load(Int, 2)
        .op(OPCode::IMul)
        .store(Int, 1)
        .iinc(2, 1)
        .branch(OPCode::Goto, check)
        .bind(done)
        .load(Int, 1)
        .return_(Int);
}

/// ControlFlowTest
pub fn control_flow() -> Runtime {
    let mut f = Fixture::new();
    let single = [
        ("IFEQ", OPCode::IfNe),
        ("IFNE", OPCode::IfEq),
        ("IFLT", OPCode::IfGe),
        ("IFGE", OPCode::IfLt),
        ("IFGT", OPCode::IfLe),
        ("IFLE", OPCode::IfGt),
        ("IF_ICMPEQ", OPCode::IfICmpNe),
        ("IF_ICMPNE", OPCode::IfICmpEq),
        ("IF_ICMPLT", OPCode::IfICmpGe),
        ("IF_ICMPGE", OPCode::IfICmpLt),
        ("IF_ICMPGT", OPCode::IfICmpLe),
        ("IF_ICMPLE", OPCode::IfICmpGt),
    ];
    for (name, skip) in single {
        guarded(&mut f, &format!("test{name}_True"), skip, 1, 0);
        guarded(&mut f, &format!("test{name}_False"), skip, 0, 1);
    }
    guarded(&mut f, "testGOTO", OPCode::IfLe, 10, 20);

    let tables: [(&str, &[i16], i16); 2] = [
        ("testTABLESWITCH", &[100, 200, 300, 400], 0),
        ("testTABLESWITCH_Default", &[100, 200, 300], 999),
    ];
    for (name, results, fallback) in tables {
        f.method(name, "(I)I", 1, 1, |b| {
            let cases: Vec<_> = results.iter().map(|_| b.label()).collect();
            let default = b.label();
            b.load(Int, 0).tableswitch(0, &cases, default);
            for (case, &result) in cases.iter().zip(results) {
                b.bind(*case).push_int(result).return_(Int);
            }
            b.bind(default).push_int(fallback).return_(Int);
        });
    }
    for (name, fallback) in [("testLOOKUPSWITCH", 0), ("testLOOKUPSWITCH_Default", 9999)] {
        f.method(name, "(I)I", 1, 1, |b| {
            let pairs: Vec<_> = [10, 20, 30].into_iter().map(|key| (key, b.label())).collect();
            let default = b.label();
            b.load(Int, 0).lookupswitch(&pairs, default);
            for &(key, case) in &pairs {
                b.bind(case).push_int(key as i16 * 100).return_(Int);
            }
            b.bind(default).push_int(fallback).return_(Int);
        });
    }

    f.method("testNestedIf", "(II)I", 1, 2, |b| {
        let a_not_positive = b.label();
        let b_not_positive = b.label();
        let neither = b.label();
        b.load(Int, 0)
            .branch(OPCode::IfLe, a_not_positive)
            .load(Int, 1)
            .branch(OPCode::IfLe, b_not_positive)
            .push_int(1)
            .return_(Int)
            .bind(b_not_positive)
            .push_int(2)
            .return_(Int)
            .bind(a_not_positive)
            .load(Int, 1)
            .branch(OPCode::IfLe, neither)
            .push_int(3)
            .return_(Int)
            .bind(neither)
            .push_int(4)
            .return_(Int);
    });
    f.method("testWhileLoop", "(I)I", 2, 2, |b| {
        let check = b.label();
        let done = b.label();
        b.push_int(0)
            .store(Int, 1)
            .bind(check)
            .load(Int, 0)
            .branch(OPCode::IfLe, done)
            .load(Int, 1)
            .load(Int, 0)
            .op(OPCode::IAdd)
            .store(Int, 1)
            .iinc(0, -1)
            .branch(OPCode::Goto, check)
            .bind(done)
            .load(Int, 1)
            .return_(Int);
    });
    f.method("factorial", "(I)I", 2, 3, factorial_body);

    // static int far(int n) { ... } with a goto_w jumping over the body.
    f.method("gotoW", "(I)I", 1, 1, |b| {
        let end = b.label();
        b.branch(OPCode::GotoW, end)
            .push_int(-1)
            .return_(Int)
            .bind(end)
            .load(Int, 0)
            .return_(Int);
    });
    f.runtime()
}

/// LoadStoreTest
pub fn load_store() -> Runtime {
    let mut f = Fixture::new();
    let ints = ["(I)I", "(II)I", "(III)I", "(IIII)I"];
    f.method("testILOAD", "(I)I", 1, 1, |b| {
        b.load(Int, 0).return_(Int);
    });
    for (index, descriptor) in ints.iter().enumerate() {
        let n = index as u16;
        f.method(&format!("testILOAD_{n}"), descriptor, 1, n + 1, |b| {
            b.load(Int, n).return_(Int);
        });
    }
    f.method("testISTORE", "(I)I", 1, 2, |b| {
        b.load(Int, 0).store(Int, 1).load(Int, 1).return_(Int);
    });
    for (index, descriptor) in ints.iter().enumerate() {
        let n = index as u16;
        f.method(&format!("testISTORE_{n}"), descriptor, 1, n + 2, |b| {
            b.load(Int, n).store(Int, n + 1).load(Int, n + 1).return_(Int);
        });
    }
    let kinds = [
        (Long, "L", "J"),
        (Float, "F", "F"),
        (Double, "D", "D"),
        (Reference, "A", "Ljava/lang/Object;"),
    ];
    for (kind, letter, field) in kinds {
        let size = kind.size() as u16;
        let one = format!("({field}){field}");
        let two = format!("({field}{field}){field}");
        f.method(&format!("test{letter}LOAD"), &one, size, size, |b| {
            b.load(kind, 0).return_(kind);
        });
        f.method(&format!("test{letter}LOAD_0"), &one, size, size, |b| {
            b.load(kind, 0).return_(kind);
        });
        f.method(&format!("test{letter}LOAD_1"), &two, size, 2 * size, |b| {
            b.load(kind, size).return_(kind);
        });
        f.method(&format!("test{letter}STORE"), &one, size, 2 * size, |b| {
            b.load(kind, 0).store(kind, size).load(kind, size).return_(kind);
        });
        f.method(&format!("test{letter}STORE_0"), &one, size, 2 * size, |b| {
            b.load(kind, 0).store(kind, size).load(kind, size).return_(kind);
        });
    }

    // static int fifth(int a, int b, int c, int d, int e) { return e; }
    f.method("fifth", "(IIIII)I", 1, 5, |b| {
        b.load(Int, 4).return_(Int);
    });
    // A method with 300 locals reaches the last ones through wide.
    f.method("wideLocal", "(I)I", 1, 300, |b| {
        b.load(Int, 0).store(Int, 299).iinc(299, 1).load(Int, 299).return_(Int);
    });
    // static long upper(long a) { reads the second half of a }
    f.method("upperHalf", "(J)I", 1, 2, |b| {
        b.load(Int, 1).return_(Int);
    });
    // int x; return x; (never verifies, but must fault cleanly)
    f.method("uninitialized", "()I", 1, 1, |b| {
        b.load(Int, 0).return_(Int);
    });
    f.runtime()
}

/// StackTest, with the shuffles written out explicitly.
pub fn stack() -> Runtime {
    let mut f = Fixture::new();
    // a + b, with a discarded extra copy of b
    f.method("testPOP", "(II)I", 3, 2, |b| {
        b.load(Int, 0)
            .load(Int, 1)
            .load(Int, 1)
            .op(OPCode::Pop)
            .op(OPCode::IAdd)
            .return_(Int);
    });
    // a + b, with a discarded extra copy of b
    f.method("testPOP2", "(JJ)J", 6, 4, |b| {
        b.load(Long, 0)
            .load(Long, 2)
            .load(Long, 2)
            .op(OPCode::Pop2)
            .op(OPCode::LAdd)
            .return_(Long);
    });
    // a + a
    f.method("testDUP", "(I)I", 2, 1, |b| {
        b.load(Int, 0).op(OPCode::Dup).op(OPCode::IAdd).return_(Int);
    });
    // b, a -> a, b, a: a + b + a
    f.method("testDUP_X1", "(II)I", 3, 2, |b| {
        b.load(Int, 1)
            .load(Int, 0)
            .op(OPCode::DupX1)
            .op(OPCode::IAdd)
            .op(OPCode::IAdd)
            .return_(Int);
    });
    // c, b, a -> a, c, b, a: a + b + c + a
    f.method("testDUP_X2", "(III)I", 4, 3, |b| {
        b.load(Int, 2)
            .load(Int, 1)
            .load(Int, 0)
            .op(OPCode::DupX2)
            .op(OPCode::IAdd)
            .op(OPCode::IAdd)
            .op(OPCode::IAdd)
            .return_(Int);
    });
    // a + a for a long
    f.method("testDUP2", "(J)J", 4, 2, |b| {
        b.load(Long, 0).op(OPCode::Dup2).op(OPCode::LAdd).return_(Long);
    });
    // a, b -> b, a: b - a
    f.method("testSWAP", "(II)I", 2, 2, |b| {
        b.load(Int, 0)
            .load(Int, 1)
            .op(OPCode::Swap)
            .op(OPCode::ISub)
            .return_(Int);
    });
    // int i, long j -> j, i, j; keeps the top j in local 3 and
    // returns (j - i) + j.
    f.method("dup2X1", "(IJ)J", 5, 5, |b| {
        b.load(Int, 0)
            .load(Long, 1)
            .op(OPCode::Dup2X1)
            .store(Long, 3)
            .op(OPCode::I2L)
            .op(OPCode::LSub)
            .load(Long, 3)
            .op(OPCode::LAdd)
            .return_(Long);
    });
    // long a, long b -> b, a, b; returns b - (a - b).
    f.method("dup2X2", "(JJ)J", 6, 4, |b| {
        b.load(Long, 0)
            .load(Long, 2)
            .op(OPCode::Dup2X2)
            .op(OPCode::LSub)
            .op(OPCode::LSub)
            .return_(Long);
    });
    // long a; two pops clear both halves.
    f.method("popHalves", "(J)V", 2, 2, |b| {
        b.load(Long, 0)
            .op(OPCode::Pop)
            .op(OPCode::Pop)
            .return_(Void);
    });
    // dup of a long splits it.
    f.method("splitDup", "(J)J", 4, 2, |b| {
        b.load(Long, 0).op(OPCode::Dup).op(OPCode::LAdd).return_(Long);
    });
    // iadd with one operand.
    f.method("underflow", "()I", 1, 0, |b| {
        b.push_int(1).op(OPCode::IAdd).return_(Int);
    });
    f.runtime()
}

/// MethodInvocationTest, plus a recursive factorial, a call with mixed
/// argument widths and a `main` entry point.
pub fn invocation() -> Program {
    let mut f = Fixture::new();
    f.method("factorial", "(I)I", 2, 3, factorial_body);
    let factorial = f.method_ref("factorial", "(I)I");
    f.method("testInvokeStaticFactorial", "(I)I", 1, 1, |b| {
        b.load(Int, 0).invokestatic(factorial).return_(Int);
    });

    // static int recursive(int n) { return n <= 1 ? 1 : n * recursive(n - 1); }
    let recursive = f.method_ref("recursive", "(I)I");
    f.method("recursive", "(I)I", 3, 1, |b| {
        let recurse = b.label();
        b.load(Int, 0)
            .push_int(1)
            .branch(OPCode::IfICmpGt, recurse)
            .push_int(1)
            .return_(Int)
            .bind(recurse)
            .load(Int, 0)
            .load(Int, 0)
            .push_int(1)
            .op(OPCode::ISub)
            .invokestatic(recursive)
            .op(OPCode::IMul)
            .return_(Int);
    });

    let static_add = f.method_ref("staticAdd", "(II)I");
    f.method("staticAdd", "(II)I", 2, 2, |b| {
        b.load(Int, 0).load(Int, 1).op(OPCode::IAdd).return_(Int);
    });
    f.method("callStaticAdd", "()I", 2, 0, |b| {
        b.push_int(42).push_int(58).invokestatic(static_add).return_(Int);
    });

    // static double mix(int a, long b, double c) { return a + b + c; }
    let mix = f.method_ref("mix", "(IJD)D");
    f.method("mix", "(IJD)D", 4, 5, |b| {
        b.load(Int, 0)
            .op(OPCode::I2L)
            .load(Long, 1)
            .op(OPCode::LAdd)
            .op(OPCode::L2D)
            .load(Double, 3)
            .op(OPCode::DAdd)
            .return_(Double);
    });
    let two = f.constant(Constant::Long(2));
    let three_and_a_half = f.constant(Constant::Double(3.5));
    f.method("callMix", "()D", 5, 0, |b| {
        b.push_int(1)
            .ldc2_w(two)
            .ldc2_w(three_and_a_half)
            .invokestatic(mix)
            .return_(Double);
    });

    // public static void main(String[] args) { staticAdd(42, 58); }
    f.method("main", MAIN_DESCRIPTOR, 2, 1, |b| {
        b.push_int(42)
            .push_int(58)
            .invokestatic(static_add)
            .op(OPCode::Pop)
            .return_(Void);
    });

    // static int callMissing() { return missing(); }
    let missing = f.method_ref("missing", "()I");
    f.method("callMissing", "()I", 1, 0, |b| {
        b.invokestatic(missing).return_(Int);
    });
    // static int divide(int a, int b) { return a / b; } called with b = 0
    let divide = f.method_ref("divide", "(II)I");
    f.method("divide", "(II)I", 2, 2, |b| {
        b.load(Int, 0).load(Int, 1).op(OPCode::IDiv).return_(Int);
    });
    f.method("divideByZero", "()I", 2, 0, |b| {
        b.push_int(7).push_int(0).invokestatic(divide).return_(Int);
    });
    f.program()
}
