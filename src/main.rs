use clap::{Parser as ClapParser, ValueEnum};
use env_logger::Env;
use std::process;

use cortado::builder::CodeBuilder;
use cortado::bytecode::OPCode;
use cortado::{BaseTypeKind, Method, Program, ProgramError, Runtime, RuntimeConfig, Value};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Demo {
    /// Iterative factorial of one argument
    Factorial,
    /// Adds two ints through a static call
    StaticAdd,
    /// Dense switch over 0..=3
    TableSwitch,
    /// Sparse switch over 1000, 2000 and 3000
    LookupSwitch,
}

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Demo program to run
    #[arg(value_enum)]
    demo: Demo,

    /// Int arguments passed to the demo
    #[arg(allow_negative_numbers = true)]
    args: Vec<i32>,

    /// Log every executed instruction
    #[arg(long)]
    trace: bool,
}

// static int factorial(int n) {
//     int result = 1;
//     for (int i = 2; i <= n; i++) result *= i;
//     return result;
// }
fn factorial(program: &mut Program) -> Result<usize, ProgramError> {
    let mut b = CodeBuilder::new();
    let check = b.label();
    let done = b.label();
    b.push_int(1)
        .store(BaseTypeKind::Int, 1)
        .push_int(2)
        .store(BaseTypeKind::Int, 2)
        .bind(check)
        .load(BaseTypeKind::Int, 2)
        .load(BaseTypeKind::Int, 0)
        .branch(OPCode::IfICmpGt, done)
        .load(BaseTypeKind::Int, 1)
        .load(BaseTypeKind::Int, 2)
        .op(OPCode::IMul)
        .store(BaseTypeKind::Int, 1)
        .iinc(2, 1)
        .branch(OPCode::Goto, check)
        .bind(done)
        .load(BaseTypeKind::Int, 1)
        .return_(BaseTypeKind::Int);
    let method = Method::new("factorial", "(I)I", 2, 3, b.finish()?)?;
    Ok(program.add_method(method))
}

// static int staticAdd(int a, int b) { return a + b; }
// static int callStaticAdd(int a, int b) { return staticAdd(a, b); }
fn static_add(program: &mut Program) -> Result<usize, ProgramError> {
    let mut b = CodeBuilder::new();
    b.load(BaseTypeKind::Int, 0)
        .load(BaseTypeKind::Int, 1)
        .op(OPCode::IAdd)
        .return_(BaseTypeKind::Int);
    program.add_method(Method::new("staticAdd", "(II)I", 2, 2, b.finish()?)?);

    let add = program.method_ref("staticAdd", "(II)I");
    let mut b = CodeBuilder::new();
    b.load(BaseTypeKind::Int, 0)
        .load(BaseTypeKind::Int, 1)
        .invokestatic(add)
        .return_(BaseTypeKind::Int);
    let caller = Method::new("callStaticAdd", "(II)I", 2, 2, b.finish()?)?;
    Ok(program.add_method(caller))
}

// static int tableSwitch(int k) {
//     switch (k) { case 0: return 100; ... case 3: return 400; default: return 0; }
// }
fn table_switch(program: &mut Program) -> Result<usize, ProgramError> {
    let mut b = CodeBuilder::new();
    let cases: Vec<_> = (0..4).map(|_| b.label()).collect();
    let default = b.label();
    b.load(BaseTypeKind::Int, 0).tableswitch(0, &cases, default);
    for (case, result) in cases.iter().zip([100, 200, 300, 400]) {
        b.bind(*case).push_int(result).return_(BaseTypeKind::Int);
    }
    b.bind(default).push_int(0).return_(BaseTypeKind::Int);
    let method = Method::new("tableSwitch", "(I)I", 1, 1, b.finish()?)?;
    Ok(program.add_method(method))
}

// static int lookupSwitch(int k) {
//     switch (k) {
//         case 1000: return 1; case 2000: return 2; case 3000: return 3;
//         default: return -1;
//     }
// }
fn lookup_switch(program: &mut Program) -> Result<usize, ProgramError> {
    let mut b = CodeBuilder::new();
    let cases: Vec<_> = [1000, 2000, 3000].map(|key| (key, b.label())).to_vec();
    let default = b.label();
    b.load(BaseTypeKind::Int, 0).lookupswitch(&cases, default);
    for (result, (_, case)) in (1..).zip(&cases) {
        b.bind(*case).push_int(result).return_(BaseTypeKind::Int);
    }
    b.bind(default).push_int(-1).return_(BaseTypeKind::Int);
    let method = Method::new("lookupSwitch", "(I)I", 1, 1, b.finish()?)?;
    Ok(program.add_method(method))
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.trace { "trace" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let mut program = Program::new();
    let (entry, defaults) = match cli.demo {
        Demo::Factorial => (factorial(&mut program), vec![5]),
        Demo::StaticAdd => (static_add(&mut program), vec![42, 58]),
        Demo::TableSwitch => (table_switch(&mut program), vec![2]),
        Demo::LookupSwitch => (lookup_switch(&mut program), vec![2000]),
    };
    let entry = match entry {
        Ok(entry) => entry,
        Err(err) => {
            eprintln!("Error building {:?}: {}", cli.demo, err);
            process::exit(1);
        }
    };

    let ints = if cli.args.is_empty() {
        defaults
    } else {
        cli.args
    };
    let args: Vec<Value> = ints.into_iter().map(Value::Int).collect();

    let config = RuntimeConfig::new().with_trace_execution(cli.trace);
    let mut runtime = Runtime::with_config(program, config);
    match runtime.invoke(entry, &args) {
        Ok(Some(value)) => println!("{value:?}"),
        Ok(None) => println!("void"),
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    }
}
