use arith_eval::{Environment, EvalError, evaluate};

fn variables() -> Environment {
    let mut environment = Environment::new();
    environment.set("x", 10.0);
    environment.set("y", 5.0);
    environment
}

#[test]
fn simple_expression() {
    assert_eq!(evaluate("10 + 5", &Environment::new()), Ok(15.0));
}

#[test]
fn expression_with_variables() {
    assert_eq!(evaluate("x + y", &variables()), Ok(15.0));
}

#[test]
fn expression_with_parentheses() {
    assert_eq!(evaluate("(10 + 5) * 2", &Environment::new()), Ok(30.0));
}

#[test]
fn expression_with_division() {
    assert_eq!(evaluate("10 / 5", &Environment::new()), Ok(2.0));
}

#[test]
fn division_by_zero() {
    let error = evaluate("10 / 0", &Environment::new()).unwrap_err();
    assert!(matches!(error, EvalError::DivisionByZero { .. }));
    assert_eq!(error.to_string(), "division by zero");
}

#[test]
fn undefined_variable() {
    let error = evaluate("z + 5", &variables()).unwrap_err();
    assert!(matches!(&error, EvalError::UndefinedVariable { name, .. } if name == "z"));
    assert_eq!(error.to_string(), "undefined variable `z`");

    let help = miette::Diagnostic::help(&error).unwrap().to_string();
    assert_eq!(help, "give `z` a value in the environment before evaluating");
}

#[test]
fn whitespace_does_not_matter() {
    let environment = Environment::new();
    assert_eq!(
        evaluate("10+5", &environment),
        evaluate("10 + 5", &environment)
    );
    assert_eq!(
        evaluate("\t( x+y )*2\n", &variables()),
        evaluate("(x + y) * 2", &variables())
    );
}

#[test]
fn evaluation_is_repeatable() {
    let environment = variables();
    let before = environment.clone();
    let expression = "x * (y - 2) / 4 + x";

    let first = evaluate(expression, &environment);
    let second = evaluate(expression, &environment);
    assert_eq!(first, Ok(17.5));
    assert_eq!(first, second);
    assert_eq!(environment, before);

    let failing = "x / (y - 5)";
    assert_eq!(
        evaluate(failing, &environment),
        evaluate(failing, &environment)
    );
}

#[test]
fn matches_native_arithmetic() {
    let (a, b, c) = (7.25, 3.5, 2.0);
    let environment: Environment = [("a", a), ("b", b), ("c", c)].into_iter().collect();

    let cases = [
        ("a + b * c", a + b * c),
        ("a - b - c", a - b - c),
        ("a / b / c", a / b / c),
        ("a * b / c - a", a * b / c - a),
        ("(a + b) * (a - c)", (a + b) * (a - c)),
        ("a / (b - c) + 1.5", a / (b - c) + 1.5),
        ("((a))", a),
        ("a - (b - (c - 1))", a - (b - (c - 1.0))),
    ];

    for (expression, expected) in cases {
        let value = evaluate(expression, &environment)
            .unwrap_or_else(|e| panic!("`{expression}` failed: {e}"));
        assert!(
            (value - expected).abs() < 1e-12,
            "`{expression}` gave {value}, expected {expected}"
        );
    }
}

#[test]
fn later_bindings_replace_earlier_ones() {
    let mut environment = variables();
    environment.set("x", 1.0);
    assert_eq!(evaluate("x + y", &environment), Ok(6.0));
}

#[test]
fn malformed_input_is_an_error_not_a_panic() {
    let environment = variables();
    for expression in ["", "   ", "+", "x +", "(x", "x y", "* 3", "(", "1.2.3"] {
        let result = evaluate(expression, &environment);
        assert!(
            matches!(
                result,
                Err(EvalError::MalformedExpression { .. } | EvalError::MalformedNumber { .. })
            ),
            "`{expression}` gave {result:?}"
        );
    }
}

#[test]
fn errors_render_with_source_labels() {
    let expression = "x / (y - 5)";
    let error = evaluate(expression, &variables()).unwrap_err();
    assert_eq!(error.span(), miette::SourceSpan::from(2..3));

    let report = miette::Report::new(error).with_source_code(expression.to_string());
    let mut rendered = String::new();
    miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
        .render_report(&mut rendered, &*report)
        .unwrap();
    assert!(rendered.contains("division by zero"));
    assert!(rendered.contains("right-hand side of this division is zero"));
}
