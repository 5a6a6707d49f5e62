use std::cell::RefCell;
use std::rc::Rc;

use rlox::program::{ExitKind, Program};

/// A `Program` wired to in-memory sinks and a fixed clock.
fn harness() -> (Program, Rc<RefCell<Vec<u8>>>, Rc<RefCell<Vec<u8>>>) {
    let stdout: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let stderr: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));

    let program = Program::with_io(stdout.clone(), stderr.clone(), Rc::new(|| 1234.5));

    (program, stdout, stderr)
}

fn run(source: &str) -> (ExitKind, String, String) {
    let (mut program, stdout, stderr) = harness();
    let kind = program.run(source);

    let out = String::from_utf8(stdout.borrow().clone()).unwrap();
    let err = String::from_utf8(stderr.borrow().clone()).unwrap();
    (kind, out, err)
}

fn run_ok(source: &str) -> String {
    let (kind, out, err) = run(source);
    assert_eq!(kind, ExitKind::Ok, "stderr: {}", err);
    out
}

#[test]
fn prints_arithmetic() {
    assert_eq!(run_ok("print 1 + 2;"), "3\n");
}

#[test]
fn prints_value_formats() {
    let out = run_ok(
        "print nil;\n\
         print true;\n\
         print false;\n\
         print 2.5;\n\
         print 4.0;\n\
         print \"hi\";\n\
         fun f() {}\n\
         print f;\n\
         class C {}\n\
         print C;\n\
         print C();\n\
         print clock;",
    );
    assert_eq!(
        out,
        "nil\ntrue\nfalse\n2.5\n4\nhi\n<fn f>\nC\nC instance\n<native fn>\n"
    );
}

#[test]
fn string_concatenation() {
    assert_eq!(run_ok("print \"foo\" + \"bar\";"), "foobar\n");
}

#[test]
fn division_and_comparison() {
    assert_eq!(run_ok("print 7 / 2;"), "3.5\n");
    assert_eq!(run_ok("print 1 < 2;"), "true\n");
    assert_eq!(run_ok("print 2 <= 1;"), "false\n");
}

#[test]
fn equality_follows_value_semantics() {
    let out = run_ok(
        "print nil == nil;\n\
         print nil == false;\n\
         print 1 == 1;\n\
         print \"1\" == 1;\n\
         print \"a\" == \"a\";\n\
         print true != false;",
    );
    assert_eq!(out, "true\nfalse\ntrue\nfalse\ntrue\ntrue\n");
}

#[test]
fn truthiness_counts_only_nil_and_false_as_falsy() {
    let out = run_ok(
        "if (0) print \"zero\";\n\
         if (\"\") print \"empty\";\n\
         if (nil) print \"nil\"; else print \"no nil\";\n\
         if (false) print \"false\"; else print \"no false\";",
    );
    assert_eq!(out, "zero\nempty\nno nil\nno false\n");
}

#[test]
fn logical_operators_return_operand_values() {
    let out = run_ok(
        "print \"hi\" or 2;\n\
         print nil or \"yes\";\n\
         print nil and 1;\n\
         print 1 and 2;",
    );
    assert_eq!(out, "hi\nyes\nnil\n2\n");
}

#[test]
fn variables_blocks_and_shadowing() {
    let out = run_ok(
        "var a = \"outer\";\n\
         {\n\
           var a = \"inner\";\n\
           print a;\n\
         }\n\
         print a;",
    );
    assert_eq!(out, "inner\nouter\n");
}

#[test]
fn while_and_for_loops() {
    assert_eq!(
        run_ok("var i = 0; while (i < 3) { print i; i = i + 1; }"),
        "0\n1\n2\n"
    );
    assert_eq!(
        run_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
        "0\n1\n2\n"
    );
}

#[test]
fn functions_return_nil_by_default() {
    assert_eq!(run_ok("fun f() {} print f();"), "nil\n");
}

#[test]
fn return_unwinds_through_loops_and_blocks() {
    let out = run_ok(
        "fun first(n) {\n\
           for (var i = 0; i < 100; i = i + 1) {\n\
             if (i >= n) { return i; }\n\
           }\n\
         }\n\
         print first(7);",
    );
    assert_eq!(out, "7\n");
}

#[test]
fn closures_capture_their_defining_environment() {
    let out = run_ok(
        "fun makeCounter() {\n\
           var i = 0;\n\
           fun count() { i = i + 1; return i; }\n\
           return count;\n\
         }\n\
         var c = makeCounter();\n\
         print c();\n\
         print c();",
    );
    assert_eq!(out, "1\n2\n");
}

#[test]
fn resolver_binds_closures_statically() {
    // The closure sees the `a` that was lexically visible at its definition,
    // not the one declared later in the same block.
    let out = run_ok(
        "var a = \"global\";\n\
         {\n\
           fun show() { print a; }\n\
           show();\n\
           var a = \"block\";\n\
           show();\n\
         }",
    );
    assert_eq!(out, "global\nglobal\n");
}

#[test]
fn recursion_works() {
    assert_eq!(
        run_ok("fun fib(n) { if (n <= 1) return n; return fib(n - 1) + fib(n - 2); } print fib(10);"),
        "55\n"
    );
}

#[test]
fn class_methods_and_fields() {
    let out = run_ok(
        "class Counter {\n\
           init() { this.count = 0; }\n\
           bump() { this.count = this.count + 1; return this.count; }\n\
         }\n\
         var c = Counter();\n\
         print c.bump();\n\
         print c.bump();\n\
         print c.count;",
    );
    assert_eq!(out, "1\n2\n2\n");
}

#[test]
fn initializer_parameters_set_fields() {
    assert_eq!(
        run_ok("class P { init(x) { this.x = x; } } print P(7).x;"),
        "7\n"
    );
}

#[test]
fn initializer_returns_the_instance_even_on_bare_return() {
    let out = run_ok(
        "class C {\n\
           init(n) { if (n > 0) return; this.big = true; }\n\
         }\n\
         print C(1);\n\
         print C(1) == nil;",
    );
    assert_eq!(out, "C instance\nfalse\n");
}

#[test]
fn methods_are_bound_to_their_receiver() {
    let out = run_ok(
        "class Person {\n\
           init(name) { this.name = name; }\n\
           greet() { print this.name; }\n\
         }\n\
         var m = Person(\"Ada\").greet;\n\
         m();",
    );
    assert_eq!(out, "Ada\n");
}

#[test]
fn inheritance_and_super_dispatch() {
    let out = run_ok(
        "class A { greet() { print \"hi\"; } }\n\
         class B < A { greet() { super.greet(); print \"B\"; } }\n\
         B().greet();",
    );
    assert_eq!(out, "hi\nB\n");
}

#[test]
fn methods_are_inherited_transitively() {
    let out = run_ok(
        "class A { m() { print \"A\"; } }\n\
         class B < A {}\n\
         class C < B {}\n\
         C().m();",
    );
    assert_eq!(out, "A\n");
}

#[test]
fn clock_uses_the_injected_time_provider() {
    assert_eq!(run_ok("print clock();"), "1234.5\n");
}

#[test]
fn runtime_error_adding_string_and_number() {
    let (kind, out, err) = run("print \"a\" + 1;");

    assert_eq!(kind, ExitKind::RuntimeError);
    assert_eq!(out, "");
    assert_eq!(err, "Operands must be two numbers or two strings.\n[line 1]\n");
}

#[test]
fn runtime_error_on_undefined_variable() {
    let (kind, _, err) = run("print missing;");

    assert_eq!(kind, ExitKind::RuntimeError);
    assert!(err.contains("Undefined variable 'missing'."));
}

#[test]
fn assigning_to_an_undeclared_name_is_an_error() {
    let (kind, _, err) = run("missing = 1;");

    assert_eq!(kind, ExitKind::RuntimeError);
    assert!(err.contains("Undefined variable 'missing'."));
}

#[test]
fn calling_a_non_callable_is_an_error() {
    let (kind, _, err) = run("var x = 1; x();");

    assert_eq!(kind, ExitKind::RuntimeError);
    assert!(err.contains("Can only call functions and classes."));
}

#[test]
fn arity_mismatch_is_an_error() {
    let (kind, _, err) = run("fun f(a, b) {} f(1);");

    assert_eq!(kind, ExitKind::RuntimeError);
    assert!(err.contains("Expected 2 arguments but got 1."));
}

#[test]
fn property_access_on_a_non_instance_is_an_error() {
    let (kind, _, err) = run("print (1).x;");

    assert_eq!(kind, ExitKind::RuntimeError);
    assert!(err.contains("Only instances have properties."));
}

#[test]
fn undefined_property_is_an_error() {
    let (kind, _, err) = run("class C {} print C().missing;");

    assert_eq!(kind, ExitKind::RuntimeError);
    assert!(err.contains("Undefined property 'missing'."));
}

#[test]
fn superclass_must_be_a_class() {
    let (kind, _, err) = run("var A = 1; class B < A {}");

    assert_eq!(kind, ExitKind::RuntimeError);
    assert!(err.contains("Superclass must be a class."));
}

#[test]
fn runtime_error_inside_a_loop_propagates() {
    let (kind, out, err) = run("for (;;) { print \"once\"; print 1 + nil; }");

    assert_eq!(kind, ExitKind::RuntimeError);
    assert_eq!(out, "once\n");
    assert!(err.contains("Operands must be two numbers or two strings."));
}

#[test]
fn compile_errors_report_before_execution() {
    let (kind, out, err) = run("print 1;\nvar = 2;");

    assert_eq!(kind, ExitKind::CompileError);
    // Nothing executes when any stage reports an error.
    assert_eq!(out, "");
    assert!(err.contains("Expect variable name."));
}

#[test]
fn lexical_errors_yield_a_compile_error() {
    let (kind, _, err) = run("print #;");

    assert_eq!(kind, ExitKind::CompileError);
    assert!(err.contains("Unexpected character: #"));
}

#[test]
fn resolve_errors_yield_a_compile_error() {
    let (kind, _, err) = run("return 1;");

    assert_eq!(kind, ExitKind::CompileError);
    assert!(err.contains("Cannot return from top-level code."));
}

#[test]
fn globals_persist_across_runs_like_a_repl() {
    let (mut program, stdout, stderr) = harness();

    assert_eq!(program.run("var x = 40;"), ExitKind::Ok);
    assert_eq!(program.run("fun add(a, b) { return a + b; }"), ExitKind::Ok);

    // A compile error in between must not poison later lines.
    assert_eq!(program.run("var = oops;"), ExitKind::CompileError);

    assert_eq!(program.run("print add(x, 2);"), ExitKind::Ok);

    let out = String::from_utf8(stdout.borrow().clone()).unwrap();
    assert_eq!(out, "42\n");

    let err = String::from_utf8(stderr.borrow().clone()).unwrap();
    assert!(err.contains("Expect variable name."));
}

#[test]
fn closures_survive_across_runs() {
    let (mut program, stdout, _) = harness();

    assert_eq!(
        program.run("fun counter() { var n = 0; fun c() { n = n + 1; return n; } return c; } var c = counter();"),
        ExitKind::Ok
    );
    assert_eq!(program.run("print c();"), ExitKind::Ok);
    assert_eq!(program.run("print c();"), ExitKind::Ok);

    let out = String::from_utf8(stdout.borrow().clone()).unwrap();
    assert_eq!(out, "1\n2\n");
}

#[test]
fn pure_initializer_matches_direct_evaluation() {
    assert_eq!(run_ok("var x = 2 + 3 * 4; print x;"), run_ok("print 2 + 3 * 4;"));
}
