//! Statement and Expression Tests
//!
//! Each program is translated, run in the interpreter from `common`, and
//! checked against the values Python would leave behind, except where Aseba
//! integer semantics differ on purpose.

mod common;

use aspy_codegen::{CompileError, simple_transpile};
use common::{run, transpile};

// ===== Assignments =====

#[test]
fn test_tuple_assignment_swaps() {
    let vm = run("a = 1\nb = 2\na, b = b, a\n");
    assert_eq!((vm.get("a"), vm.get("b")), (2, 1));
}

#[test]
fn test_chained_assignment() {
    let source = "a = b = 4\n";
    assert_eq!(transpile(source), "var a\nvar b\n\na = 4\nb = 4\n");
    let vm = run(source);
    assert_eq!((vm.get("a"), vm.get("b")), (4, 4));
}

#[test]
fn test_augmented_element_evaluates_index_once() {
    let source = "a = [1, 2, 3]\ni = 1\na[i + 1] += 10\n";
    let output = transpile(source);
    assert!(output.contains("_tmp[0] = i + 1\na[_tmp[0]] = a[_tmp[0]] + 10\n"), "{output}");
    assert_eq!(run(source).array("a"), vec![1, 2, 13]);
}

#[test]
fn test_negative_constant_index() {
    let source = "a = [1, 2, 3]\nb = a[-1]\n";
    assert!(transpile(source).contains("b = a[2]"));
    assert_eq!(run(source).get("b"), 3);
}

#[test]
fn test_array_copy_and_repeat() {
    let vm = run("a = [5] * 4\nb = [0, 0, 0, 0]\nb = a\nb[0] = 1\n");
    assert_eq!(vm.array("a"), vec![5, 5, 5, 5]);
    assert_eq!(vm.array("b"), vec![1, 5, 5, 5]);
}

#[test]
fn test_del_and_pass_emit_nothing() {
    assert_eq!(transpile("a = 1\ndel a\npass\n\"\"\"doc\"\"\"\n"), "var a\n\na = 1\n");
}

// ===== Operators =====

#[test]
fn test_arithmetic_operators() {
    let source = "\
a = 17
b = 5
c = a // b
d = a % b
f = a << 2 | 1
g = a & b ^ 3
h = ~a
k = abs(b - a)
m = 2 ** 3 + b ** 2
";
    let vm = run(source);
    assert_eq!(vm.get("c"), 3);
    assert_eq!(vm.get("d"), 2);
    assert_eq!(vm.get("f"), 69);
    assert_eq!(vm.get("g"), 2);
    assert_eq!(vm.get("h"), -18);
    assert_eq!(vm.get("k"), 12);
    assert_eq!(vm.get("m"), 33);
    assert!(transpile(source).contains("m = 8 + b * b"));
}

#[test]
fn test_division_truncates_toward_zero() {
    // Aseba division and modulo follow C, not Python.
    let vm = run("a = 17\nb = 5\ne = -a // b\nr = -a % b\n");
    assert_eq!(vm.get("e"), -3);
    assert_eq!(vm.get("r"), -2);
}

#[test]
fn test_parentheses_follow_aseba_precedence() {
    let source = "a = 17\nb = 5\nn = (a + b) * (a - b) % 7\np = a % (b * 2)\nq = a - (b - 1)\n";
    let output = transpile(source);
    assert!(output.contains("n = (a + b) * (a - b) % 7"), "{output}");
    assert!(output.contains("p = a % (b * 2)"), "{output}");
    assert!(output.contains("q = a - (b - 1)"), "{output}");
    let vm = run(source);
    assert_eq!((vm.get("n"), vm.get("p"), vm.get("q")), (5, 7, 13));
}

#[test]
fn test_sixteen_bit_wraparound() {
    let vm = run("a = 32767\nb = a + 1\nc = 300 * 300\n");
    assert_eq!(vm.get("b"), -32768);
    assert_eq!(vm.get("c"), (300i32 * 300) as i16);
}

// ===== Control flow =====

#[test]
fn test_if_elif_else() {
    let source = "x = 5\nif x < 3:\n    y = 1\nelif x < 6:\n    y = 2\nelse:\n    y = 3\n";
    let output = transpile(source);
    assert!(output.contains("if x < 3 then\n\ty = 1\nelseif x < 6 then\n\ty = 2\nelse\n\ty = 3\nend\n"), "{output}");
    assert_eq!(run(source).get("y"), 2);
    assert_eq!(run(&source.replace("x = 5", "x = 9")).get("y"), 3);
}

#[test]
fn test_arithmetic_condition_compares_with_zero() {
    let source = "x = 2\ny = 0\nif x - 2:\n    y = 1\nwhile x:\n    x -= 1\n";
    let output = transpile(source);
    assert!(output.contains("if x - 2 != 0 then"), "{output}");
    assert!(output.contains("while x != 0 do"), "{output}");
    let vm = run(source);
    assert_eq!((vm.get("x"), vm.get("y")), (0, 0));
}

#[test]
fn test_while_else_runs_without_break() {
    let vm = run("n = 0\nwhile n < 3:\n    n += 1\nelse:\n    n = 100\n");
    assert_eq!(vm.get("n"), 100);
}

#[test]
fn test_break_skips_while_else() {
    let source = "n = 0\nwhile True:\n    n += 1\n    if n == 4:\n        break\nelse:\n    n = 100\n";
    assert_eq!(run(source).get("n"), 4);
}

#[test]
fn test_continue_and_break_in_while() {
    let source = "\
total = 0
i = 0
while i < 10:
    i += 1
    if i % 2 == 0:
        continue
    if i > 7:
        break
    total += i
";
    let vm = run(source);
    assert_eq!((vm.get("total"), vm.get("i")), (16, 9));
}

#[test]
fn test_counted_for_loops() {
    let source = "t = 0\nfor i in range(3):\n    for j in range(4):\n        t += i * j\n";
    let output = transpile(source);
    assert!(output.contains("for i in 0:2 do\n\tfor j in 0:3 do\n"), "{output}");
    assert_eq!(run(source).get("t"), 18);
}

#[test]
fn test_negative_step_range() {
    let source = "s = 0\nfor k in range(10, 0, -3):\n    s += k\n";
    assert!(transpile(source).contains("for k in 10:1 step -3 do"));
    assert_eq!(run(source).get("s"), 22);
}

#[test]
fn test_empty_range_runs_else_only() {
    let vm = run("s = 0\nfor k in range(5, 5):\n    s += 1\nelse:\n    s = 7\n");
    assert_eq!(vm.get("s"), 7);
}

#[test]
fn test_range_with_variable_bound() {
    let source = "n = 4\ns = 0\nfor k in range(1, n + 1):\n    s += k\n";
    let output = transpile(source);
    assert!(output.contains("while _tmp[0] < _tmp[1] do"), "{output}");
    let vm = run(source);
    assert_eq!((vm.get("s"), vm.get("k")), (10, 4));
}

#[test]
fn test_for_break_keeps_loop_variable() {
    let source = "found = -1\nfor k in range(10):\n    if k * k > 20:\n        found = k\n        break\nelse:\n    found = 99\n";
    let vm = run(source);
    assert_eq!((vm.get("found"), vm.get("k")), (5, 5));
}

#[test]
fn test_loop_variable_keeps_last_value() {
    let vm = run("for i in range(3):\n    pass\nx = i\n");
    assert_eq!((vm.get("x"), vm.get("i")), (2, 2));

    let vm = run("s = 0\nfor k in range(10, 0, -3):\n    s += k\nx = k\n");
    assert_eq!(vm.get("x"), 1);

    let vm = run("n = 3\nfor i in range(n):\n    pass\nx = i\n");
    assert_eq!(vm.get("x"), 2);
}

#[test]
fn test_range_up_to_the_largest_word() {
    let source = "n = 0\nfor i in range(32765, 32768):\n    n += 1\n";
    let output = transpile(source);
    assert!(!output.contains("32768"), "{output}");
    let vm = run(source);
    assert_eq!((vm.get("n"), vm.get("i")), (3, 32767));

    let vm = run("n = 0\nfor i in range(32760, 32767, 3):\n    n += 1\n");
    assert_eq!((vm.get("n"), vm.get("i")), (3, 32766));

    let vm = run("m = 32767\nn = 0\nfor i in range(32764, m, 2):\n    n += 1\n");
    assert_eq!((vm.get("n"), vm.get("i")), (2, 32766));
}

#[test]
fn test_range_down_to_the_smallest_word() {
    let source = "n = 0\nfor i in range(-32765, -32769, -1):\n    n += 1\n";
    let vm = run(source);
    assert_eq!((vm.get("n"), vm.get("i")), (4, -32768));

    let vm = run("n = 0\nfor i in range(3, -40000):\n    n += 1\nelse:\n    n = 9\n");
    assert_eq!(vm.get("n"), 9);
}

const READ_THEN_ASSIGNED: &str = "\
@onevent
def timer0():
    global g, x
    x = g + 1

@onevent
def timer1():
    global g
    g = VALUE
";

#[test]
fn test_global_read_in_one_handler_assigned_in_another() {
    let source = READ_THEN_ASSIGNED.replace("VALUE", "5");
    let mut vm = run(&source);
    vm.fire("timer1", &[]).unwrap();
    vm.fire("timer0", &[]).unwrap();
    assert_eq!(vm.get("x"), 6);

    let source = READ_THEN_ASSIGNED.replace("VALUE", "[1, 2]");
    let error = match simple_transpile(&source) {
        Ok(output) => panic!("translation should fail:\n{output}"),
        Err(error) => error,
    };
    match error {
        CompileError::IncompatibleSize { ref name, expected, got, .. } => {
            assert_eq!((name.as_str(), expected, got), ("g", 1, 2));
        }
        ref other => panic!("unexpected {other:?}"),
    }
    let location = error.location();
    assert_eq!((location.line, location.column), (9, 5));
}

#[test]
fn test_short_circuit_skips_calls() {
    let source = "\
def bump():
    global hits
    hits += 1
    return 1

hits = 0
x = 0
if x != 0 and bump() == 1:
    x = 5
if x == 0 or bump() == 1:
    x = 6
if x == 6 and bump() == 1:
    x = 7
";
    let vm = run(source);
    assert_eq!(vm.get("hits"), 1);
    assert_eq!(vm.get("x"), 7);
}

// ===== Robot =====

#[test]
fn test_robot_variables_need_no_declaration() {
    let source = "motor_left_target = 200\nmotor.right.target = -200\n";
    let output = transpile(source);
    assert_eq!(output, "motor.left.target = 200\nmotor.right.target = -200\n");
    let vm = run(source);
    assert_eq!(vm.get("motor.left.target"), 200);
    assert_eq!(vm.get("motor.right.target"), -200);
}

#[test]
fn test_color_constants() {
    let source = "c = RED\nleds_top(c[0], c[1], c[2])\n";
    let output = transpile(source);
    assert!(output.contains("c = [32, 0, 0]"), "{output}");
    assert!(output.contains("call leds.top(c[0], c[1], c[2])"), "{output}");
    let vm = run(source);
    assert_eq!(vm.calls, vec![("leds.top".to_string(), vec![32, 0, 0])]);
}

#[test]
fn test_native_functions_return_through_scratch() {
    let source = "a = 3\nb = 9\nc = math_min(a, b) + math_max(a, b)\n";
    let output = transpile(source);
    assert!(output.contains("call math.min(_tmp[0], a, b)\ncall math.max(_tmp[1], a, b)\nc = _tmp[0] + _tmp[1]\n"), "{output}");
    assert_eq!(run(source).get("c"), 12);
}

#[test]
fn test_array_natives_write_in_place() {
    let source = "a = [1, 2, 3]\nb = [10, 20, 30]\nc = [0, 0, 0]\nnf_math_add(c, a, b)\nd = [0, 0, 0]\nnf_math_fill(d, 7)\n";
    let output = transpile(source);
    assert!(output.contains("call math.add(c, a, b)"), "{output}");
    let vm = run(source);
    assert_eq!(vm.array("c"), vec![11, 22, 33]);
    assert_eq!(vm.array("d"), vec![7, 7, 7]);
}

#[test]
fn test_complex_native_arguments_are_spilled() {
    let source = "x = 4\nleds_top(x * 8, 0, x - 4)\n";
    let output = transpile(source);
    assert!(output.contains("_tmp[0] = x * 8\n_tmp[1] = x - 4\ncall leds.top(_tmp[0], 0, _tmp[1])\n"), "{output}");
    let vm = run(source);
    assert_eq!(vm.calls, vec![("leds.top".to_string(), vec![32, 0, 0])]);
}
