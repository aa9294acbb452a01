use lox::{run_batch, Diagnostics, ErrorKind, Expr, Interpreter, Session, Span, Value};
use pretty_assertions::assert_eq;

fn output(source: &str) -> Vec<String> {
    let outcome = run_batch(source);
    assert!(
        !outcome.had_syntax_error() && !outcome.had_runtime_error(),
        "unexpected errors for {:?}: {:?}",
        source,
        outcome.diagnostics.errors()
    );
    outcome.output
}

/// Run a program expected to stop on a runtime error; returns what it
/// printed first and the error's message.
fn runtime_failure(source: &str) -> (Vec<String>, String) {
    let outcome = run_batch(source);
    assert!(!outcome.had_syntax_error(), "syntax error in {:?}", source);
    assert!(outcome.had_runtime_error(), "no runtime error in {:?}", source);

    let errors = outcome.diagnostics.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ErrorKind::Runtime);
    (outcome.output.clone(), errors[0].message.clone())
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(output("print (1 + 2) * 3;"), vec!["9"]);
    assert_eq!(output("print 1 + 2 * 3;"), vec!["7"]);
}

#[test]
fn block_shadowing_reads_outer_value_in_initializer() {
    assert_eq!(
        output("var a = 1; { var a = a + 1; print a; } print a;"),
        vec!["2", "1"]
    );
}

#[test]
fn plus_concatenates_when_either_side_is_text() {
    assert_eq!(output("print \"a\" + 1;"), vec!["a1"]);
    assert_eq!(output("print 1 + \"a\";"), vec!["1a"]);
    assert_eq!(output("print \"n: \" + nil;"), vec!["n: nil"]);
    assert_eq!(output("print true + \"!\";"), vec!["true!"]);
    assert_eq!(output("print 2.5 + \"x\";"), vec!["2.5x"]);
    assert_eq!(output("print \"a\" + \"b\";"), vec!["ab"]);
}

#[test]
fn plus_rejects_other_mixes() {
    let outcome = run_batch("1 + true;");
    assert!(outcome.had_runtime_error());
    let error = &outcome.diagnostics.errors()[0];
    assert_eq!(error.location, " at '+'");
    assert_eq!(
        error.message,
        "Operands must be two numbers or at least one string."
    );

    let (_, message) = runtime_failure("nil + 1;");
    assert_eq!(message, "Operands must be two numbers or at least one string.");
}

#[test]
fn division_by_zero_is_an_error() {
    let (printed, message) = runtime_failure("10 / 0;");
    assert!(printed.is_empty());
    assert_eq!(message, "Division by zero.");

    let (_, message) = runtime_failure("print 1 / (2 - 2);");
    assert_eq!(message, "Division by zero.");
}

#[test]
fn if_else_runs_one_branch() {
    assert_eq!(
        output("if (false) print \"x\"; else print \"y\";"),
        vec!["y"]
    );
    assert_eq!(output("if (nil) print \"x\";"), Vec::<String>::new());
    assert_eq!(output("if (0) print \"zero is truthy\";"), vec!["zero is truthy"]);
    assert_eq!(output("if (\"\") print \"so is empty text\";"), vec!["so is empty text"]);
}

#[test]
fn syntax_error_prevents_execution() {
    let outcome = run_batch("var = 1;\nprint 2;");
    assert!(outcome.had_syntax_error());
    assert!(!outcome.had_runtime_error());
    assert!(outcome.output.is_empty());

    let errors = outcome.diagnostics.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line(), 1);
    assert_eq!(
        errors[0].to_string(),
        "[line 1] Syntax error at '=': Expect variable name."
    );
}

#[test]
fn scanner_errors_also_prevent_execution() {
    let outcome = run_batch("print 1;\nprint 2 # 3;");
    assert!(outcome.had_syntax_error());
    assert!(outcome.output.is_empty());
    assert_eq!(outcome.diagnostics.errors()[0].kind, ErrorKind::Lexical);
    assert_eq!(outcome.diagnostics.errors()[0].line(), 2);
}

#[test]
fn literals_evaluate_to_themselves() {
    let values = [
        Value::Nil,
        Value::Bool(true),
        Value::Bool(false),
        Value::Number(0.0),
        Value::Number(-12.5),
        Value::String("text".to_string()),
        Value::String(String::new()),
    ];

    let mut interpreter = Interpreter::with_output(Vec::new());
    for value in values {
        let expr = Expr::Literal {
            value: value.clone(),
            span: Span::new(0, 1, 1),
        };
        assert_eq!(interpreter.evaluate(&expr), Ok(value));
    }
}

#[test]
fn logical_operators_short_circuit() {
    assert_eq!(
        output("var x = 0; false and (x = 1); print x; true or (x = 2); print x;"),
        vec!["0", "0"]
    );
    assert_eq!(
        output("var x = 0; true and (x = 1); print x; false or (x = 2); print x;"),
        vec!["1", "2"]
    );
}

#[test]
fn logical_operators_return_the_deciding_operand() {
    assert_eq!(output("print nil or \"yes\";"), vec!["yes"]);
    assert_eq!(output("print 1 and 2;"), vec!["2"]);
    assert_eq!(output("print false and 1;"), vec!["false"]);
    assert_eq!(output("print 0 or 1;"), vec!["0"]);
}

#[test]
fn skipped_operand_errors_are_not_raised() {
    assert_eq!(output("print true or undefined_name;"), vec!["true"]);
    assert_eq!(output("print nil and 1 / 0;"), vec!["nil"]);
}

#[test]
fn block_locals_do_not_leak() {
    let (printed, message) = runtime_failure("{ var inner = 1; print inner; } print inner;");
    assert_eq!(printed, vec!["1"]);
    assert_eq!(message, "Undefined variable 'inner'.");
}

#[test]
fn assignment_inside_block_updates_outer_binding() {
    assert_eq!(output("var a = 1; { a = 2; } print a;"), vec!["2"]);
    assert_eq!(output("var a = 1; { { a = a + 10; } } print a;"), vec!["11"]);
}

#[test]
fn nested_shadowing() {
    let source = r#"
        var a = "global";
        {
            var a = "outer";
            {
                var a = "inner";
                print a;
            }
            print a;
        }
        print a;
    "#;
    assert_eq!(output(source), vec!["inner", "outer", "global"]);
}

#[test]
fn assignment_to_undeclared_name_fails() {
    let (_, message) = runtime_failure("x = 1;");
    assert_eq!(message, "Undefined variable 'x'.");

    let (_, message) = runtime_failure("{ y = 1; }");
    assert_eq!(message, "Undefined variable 'y'.");
}

#[test]
fn assignment_is_an_expression() {
    assert_eq!(output("var a; var b; a = b = 3; print a; print b;"), vec!["3", "3"]);
    assert_eq!(output("var a = 1; print a = 5;"), vec!["5"]);
}

#[test]
fn declarations() {
    assert_eq!(output("var a; print a;"), vec!["nil"]);
    assert_eq!(output("var a = 1; var a = 2; print a;"), vec!["2"]);
}

#[test]
fn number_formatting() {
    assert_eq!(output("print 1.5 + 1.5;"), vec!["3"]);
    assert_eq!(output("print 10 / 4;"), vec!["2.5"]);
    assert_eq!(output("print -0.5;"), vec!["-0.5"]);
    assert_eq!(output("print 100;"), vec!["100"]);
}

#[test]
fn comparison_requires_numbers() {
    assert_eq!(output("print 1 < 2; print 2 <= 2; print 3 > 4; print 4 >= 5;"), vec!["true", "true", "false", "false"]);

    let (_, message) = runtime_failure("print \"a\" < \"bb\";");
    assert_eq!(message, "Operands must be numbers.");

    let (_, message) = runtime_failure("print 1 - \"1\";");
    assert_eq!(message, "Operands must be numbers.");
}

#[test]
fn equality_is_structural_without_coercion() {
    assert_eq!(
        output("print nil == nil; print 1 == \"1\"; print \"a\" == \"a\"; print true != nil; print 0 == false;"),
        vec!["true", "false", "true", "true", "false"]
    );
}

#[test]
fn unary_operators() {
    assert_eq!(output("print !nil; print !0; print -(-3);"), vec!["true", "false", "3"]);

    let (_, message) = runtime_failure("print -\"x\";");
    assert_eq!(message, "Operand must be a number.");
}

#[test]
fn while_loop() {
    assert_eq!(
        output("var i = 0; while (i < 3) { print i; i = i + 1; }"),
        vec!["0", "1", "2"]
    );
}

#[test]
fn for_loop_variable_is_scoped_to_the_loop() {
    let (printed, message) =
        runtime_failure("for (var i = 0; i < 3; i = i + 1) print i; print i;");
    assert_eq!(printed, vec!["0", "1", "2"]);
    assert_eq!(message, "Undefined variable 'i'.");
}

#[test]
fn for_loop_with_outer_counter() {
    assert_eq!(
        output("var total = 0; var i; for (i = 1; i <= 4; i = i + 1) total = total + i; print total; print i;"),
        vec!["10", "5"]
    );
}

#[test]
fn runtime_error_stops_the_run() {
    let (printed, message) = runtime_failure("print 1; print missing; print 2;");
    assert_eq!(printed, vec!["1"]);
    assert_eq!(message, "Undefined variable 'missing'.");
}

#[test]
fn runtime_error_reports_its_line() {
    let outcome = run_batch("var a = 1;\n\nprint a + nil;");
    assert_eq!(outcome.diagnostics.errors()[0].line(), 3);
    assert_eq!(
        outcome.diagnostics.errors()[0].to_string(),
        "[line 3] Runtime error at '+': Operands must be two numbers or at least one string."
    );
}

#[test]
fn failed_block_restores_the_enclosing_scope() {
    let mut interpreter = Interpreter::with_output(Vec::new());
    let mut diagnostics = Diagnostics::new();
    lox::run_source(
        "var a = 1; { var a = 2; { print nope; } }",
        &mut interpreter,
        &mut diagnostics,
    );

    assert!(diagnostics.had_runtime_error());
    assert_eq!(interpreter.environment().depth(), 0);
    assert_eq!(interpreter.environment().get("a"), Some(Value::Number(1.0)));
}

#[test]
fn session_keeps_definitions_and_echoes_expressions() {
    let mut session = Session::with_output(Vec::new());

    assert_eq!(session.run_entry("var a = 10;"), None);
    assert_eq!(session.run_entry("a * 2"), Some("20".to_string()));
    assert_eq!(session.run_entry("a = 3"), Some("3".to_string()));
    assert_eq!(session.run_entry("a"), Some("3".to_string()));
    assert_eq!(session.run_entry("\"a is \" + a"), Some("a is 3".to_string()));
    assert_eq!(session.run_entry("print a;"), None);

    assert_eq!(String::from_utf8_lossy(session.interpreter().output()), "3\n");
    assert!(!session.diagnostics().had_syntax_error());
    assert!(!session.diagnostics().had_runtime_error());
}

#[test]
fn session_resets_only_the_syntax_flag() {
    let mut session = Session::with_output(Vec::new());

    assert_eq!(session.run_entry("var = ;"), None);
    assert!(session.diagnostics().had_syntax_error());

    assert_eq!(session.run_entry("1 + 1"), Some("2".to_string()));
    assert!(!session.diagnostics().had_syntax_error());

    assert_eq!(session.run_entry("nope"), None);
    assert!(session.diagnostics().had_runtime_error());

    assert_eq!(session.run_entry("1"), Some("1".to_string()));
    assert!(session.diagnostics().had_runtime_error());
}

#[test]
fn session_keeps_state_after_a_runtime_error() {
    let mut session = Session::with_output(Vec::new());

    session.run_entry("var a = 1;");
    session.run_entry("{ var a = 2; a = a / 0; }");
    assert!(session.diagnostics().had_runtime_error());
    assert_eq!(session.run_entry("a"), Some("1".to_string()));

    let messages: Vec<String> = session
        .diagnostics_mut()
        .take_errors()
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert_eq!(messages, vec!["Division by zero."]);
}
