//! End-to-end tests: VM (or Jack) source is translated, assembled and then
//! executed on the simulator, and the resulting RAM is inspected.

use std::fs;

use hack_sim::{Halt, Machine};
use hack_toolchain::vm::SourceUnit;
use hack_toolchain::{asm, jack, vm};

/// Translate the given units, assemble the result, and load a machine.
fn build(units: &[(&str, &str)], bootstrap: bool) -> Machine {
    let units: Vec<SourceUnit> = units
        .iter()
        .map(|(name, source)| SourceUnit::new(*name, *source))
        .collect();
    let translated = vm::translate(&units, bootstrap);
    assert!(
        translated.errors.is_empty(),
        "translation errors: {:?}",
        translated
            .errors
            .iter()
            .flat_map(|u| u.errors.iter().map(|e| format!("{}: {e}", u.unit)))
            .collect::<Vec<_>>()
    );
    let assembled = asm::assemble(&translated.asm);
    assert!(assembled.errors.is_empty(), "asm errors: {:?}", assembled.errors);
    Machine::new(assembled.words)
}

/// Run a bootstrap-less VM fragment with the stack at 256.
fn run_fragment(source: &str) -> Machine {
    let mut machine = build(&[("Test", source)], false);
    machine.set_ram(0, 256);
    machine.run(100_000);
    machine
}

/// Append a `push` of an arbitrary signed value (negatives via `neg`).
fn push_value(out: &mut String, value: i16) {
    if value >= 0 {
        out.push_str(&format!("push constant {value}\n"));
    } else if value == i16::MIN {
        out.push_str("push constant 32767\nneg\npush constant 1\nsub\n");
    } else {
        out.push_str(&format!("push constant {}\nneg\n", -(value as i32)));
    }
}

#[test]
fn add_leaves_sum_on_stack() {
    let machine = run_fragment("push constant 7\npush constant 8\nadd");
    assert_eq!(machine.ram_at(256), 15);
    assert_eq!(machine.ram_at(0), 257);
}

#[test]
fn binary_and_unary_arithmetic() {
    assert_eq!(
        run_fragment("push constant 9\npush constant 3\nsub").ram_at(256),
        6
    );
    assert_eq!(
        run_fragment("push constant 12\npush constant 10\nand").ram_at(256),
        8
    );
    assert_eq!(
        run_fragment("push constant 12\npush constant 10\nor").ram_at(256),
        14
    );
    assert_eq!(run_fragment("push constant 7\nneg").ram_at(256), -7);
    assert_eq!(run_fragment("push constant 0\nnot").ram_at(256), -1);
    assert_eq!(run_fragment("push constant 3\nshiftleft").ram_at(256), 6);
    assert_eq!(run_fragment("push constant 6\nshiftright").ram_at(256), 3);
}

#[test]
fn shiftright_is_arithmetic_on_negatives() {
    let mut source = String::new();
    push_value(&mut source, -2);
    source.push_str("shiftright\n");
    assert_eq!(run_fragment(&source).ram_at(256), -1);
}

fn check_compare(x: i16, y: i16) {
    for (op, expected) in [("lt", x < y), ("gt", x > y), ("eq", x == y)] {
        let mut source = String::new();
        push_value(&mut source, x);
        push_value(&mut source, y);
        source.push_str(op);
        source.push('\n');
        let machine = run_fragment(&source);
        assert_eq!(
            machine.ram_at(256),
            if expected { -1 } else { 0 },
            "{x} {op} {y}"
        );
        assert_eq!(machine.ram_at(0), 257, "{x} {op} {y} left a bad SP");
    }
}

#[test]
fn comparisons_across_the_signed_boundary_grid() {
    let interesting = [
        0,
        1,
        -1,
        2,
        -2,
        100,
        -100,
        i16::MAX,
        i16::MIN,
        i16::MAX - 1,
        i16::MIN + 1,
    ];
    for &x in &interesting {
        for &y in &interesting {
            check_compare(x, y);
        }
    }
}

mod comparison_properties {
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// `lt`/`gt`/`eq` agree with Rust's signed semantics on random pairs.
        #[test]
        fn comparisons_match_signed_semantics(x in any::<i16>(), y in any::<i16>()) {
            super::check_compare(x, y);
        }
    }
}

#[test]
fn comparison_survives_subtraction_overflow() {
    // 32767 - (-32768) and (-32768) - 32767 both overflow a 16-bit word;
    // the sign-split expansion must still get these right.
    check_compare(i16::MAX, i16::MIN);
    check_compare(i16::MIN, i16::MAX);
    check_compare(i16::MIN, 1);
    check_compare(1, i16::MIN);
}

#[test]
fn segment_addressing() {
    let mut machine = build(
        &[(
            "Test",
            "push constant 3000\n\
             pop pointer 0\n\
             push constant 3010\n\
             pop pointer 1\n\
             push constant 9\n\
             pop this 2\n\
             push constant 8\n\
             pop that 1\n\
             push constant 7\n\
             pop temp 3\n\
             push constant 6\n\
             pop static 0\n\
             push constant 5\n\
             pop local 2\n\
             push constant 4\n\
             pop argument 0\n\
             push this 2\n\
             push that 1\n\
             add\n\
             pop static 1\n",
        )],
        false,
    );
    machine.set_ram(0, 256);
    machine.set_ram(1, 300); // LCL
    machine.set_ram(2, 400); // ARG
    machine.run(100_000);

    assert_eq!(machine.ram_at(3), 3000, "THIS via pointer 0");
    assert_eq!(machine.ram_at(4), 3010, "THAT via pointer 1");
    assert_eq!(machine.ram_at(3002), 9, "this 2");
    assert_eq!(machine.ram_at(3011), 8, "that 1");
    assert_eq!(machine.ram_at(8), 7, "temp 3 at RAM[5+3]");
    assert_eq!(machine.ram_at(16), 6, "first static of the file");
    assert_eq!(machine.ram_at(302), 5, "local 2");
    assert_eq!(machine.ram_at(400), 4, "argument 0");
    assert_eq!(machine.ram_at(17), 17, "9 + 8 into the second static");
}

#[test]
fn statics_are_scoped_per_file() {
    let mut machine = build(
        &[
            ("One", "push constant 11\npop static 0\n"),
            ("Two", "push constant 22\npop static 0\n"),
        ],
        false,
    );
    machine.set_ram(0, 256);
    machine.run(10_000);
    assert_eq!(machine.ram_at(16), 11);
    assert_eq!(machine.ram_at(17), 22);
}

#[test]
fn if_goto_loop_accumulates() {
    // sum += i; i -= 1; while i != 0. The classic counting loop.
    let mut machine = build(
        &[(
            "Test",
            "push constant 0\n\
             pop local 0\n\
             label LOOP_START\n\
             push argument 0\n\
             push local 0\n\
             add\n\
             pop local 0\n\
             push argument 0\n\
             push constant 1\n\
             sub\n\
             pop argument 0\n\
             push argument 0\n\
             if-goto LOOP_START\n\
             push local 0\n",
        )],
        false,
    );
    machine.set_ram(0, 256);
    machine.set_ram(1, 300);
    machine.set_ram(2, 400);
    machine.set_ram(400, 5);
    machine.run(100_000);
    assert_eq!(machine.ram_at(256), 15);
}

#[test]
fn call_and_return_round_trip() {
    let main_vm = "\
function Main.double 0
push argument 0
push argument 0
add
return
";
    let sys_vm = "\
function Sys.init 0
push constant 5
call Main.double 1
pop static 0
label HALT
goto HALT
";
    let mut machine = build(&[("Main", main_vm), ("Sys", sys_vm)], true);
    let halt = machine.run(100_000);
    assert_eq!(halt, Halt::Halted);
    // Sys.0 is the first variable symbol the assembler sees.
    assert_eq!(machine.ram_at(16), 10);
}

#[test]
fn nested_recursion_fibonacci() {
    let main_vm = fs::read_to_string("../tests/test_programs/FibonacciElement/Main.vm").unwrap();
    let sys_vm = fs::read_to_string("../tests/test_programs/FibonacciElement/Sys.vm").unwrap();
    let mut machine = build(&[("Main", main_vm.as_str()), ("Sys", sys_vm.as_str())], true);
    let halt = machine.run(1_000_000);
    assert_eq!(halt, Halt::Halted);

    // Sys.init's stack slot holds fibonacci(4) = 3 when the halt loop parks.
    let sp = machine.ram_at(0) as u16;
    assert_eq!(machine.ram_at(sp - 1), 3);
}

#[test]
fn jack_while_loop_end_to_end() {
    let jack_source = "\
class Main {
  static int total;
  function void main() {
    var int i;
    let i = 1;
    let total = 0;
    while (i < 11) {
      let total = total + i;
      let i = i + 1;
    }
    return;
  }
}";
    let main_vm = jack::compile(jack_source).expect("compile error");
    let sys_vm = "\
function Sys.init 0
call Main.main 0
pop temp 0
label HALT
goto HALT
";
    let mut machine = build(&[("Main", main_vm.as_str()), ("Sys", sys_vm)], true);
    let halt = machine.run(1_000_000);
    assert_eq!(halt, Halt::Halted);
    // Main.0 (the `total` static) is the first variable symbol.
    assert_eq!(machine.ram_at(16), 55);
}

#[test]
fn jack_objects_end_to_end() {
    // Constructor and method calling conventions, executed: `Memory.alloc`
    // is stubbed with a VM bump allocator at 2048.
    let main_jack = "\
class Main {
  static int result;
  function void main() {
    var Point p;
    let p = Point.new(3, 4);
    let result = p.sum();
    return;
  }
}";
    let point_jack = "\
class Point {
  field int x, y;
  constructor Point new(int ax, int ay) {
    let x = ax;
    let y = ay;
    return this;
  }
  method int sum() {
    return x + y;
  }
}";
    let memory_vm = "\
function Memory.alloc 0
push constant 2048
push static 0
add
push static 0
push argument 0
add
pop static 0
return
";
    let sys_vm = "\
function Sys.init 0
call Main.main 0
pop temp 0
label HALT
goto HALT
";
    let main_vm = jack::compile(main_jack).expect("compile error");
    let point_vm = jack::compile(point_jack).expect("compile error");
    let mut machine = build(
        &[
            ("Main", main_vm.as_str()),
            ("Memory", memory_vm),
            ("Point", point_vm.as_str()),
            ("Sys", sys_vm),
        ],
        true,
    );
    let halt = machine.run(1_000_000);
    assert_eq!(halt, Halt::Halted);

    // Main.0 (`result`) is the first variable symbol: x + y of the object.
    assert_eq!(machine.ram_at(16), 7);
    // The object was allocated at the stub heap base with its two fields.
    assert_eq!(machine.ram_at(2048), 3);
    assert_eq!(machine.ram_at(2049), 4);
}
