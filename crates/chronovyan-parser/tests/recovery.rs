//! Error recovery: one diagnostic per fault, placeholders, forward progress

use chronovyan_ast::*;
use chronovyan_diagnostics::Diagnostics;
use chronovyan_parser::parse;
use proptest::prelude::*;

fn parse_with_errors(source: &str) -> (Program, Vec<String>) {
    let mut diags = Diagnostics::new();
    let file = diags.register_file("recovery.cvy");
    let program = parse(source, file, &mut diags);
    let messages = diags.iter().map(|d| d.message.clone()).collect();
    (program, messages)
}

#[test]
fn test_missing_variable_name() {
    let (program, errors) = parse_with_errors("let = 5; let y = 2;");
    assert_eq!(errors, vec!["Expect variable name after 'let' or 'const'"]);
    assert_eq!(program.declarations.len(), 1);
}

#[test]
fn test_missing_semicolon_keeps_next_statement() {
    let (program, errors) = parse_with_errors("x = 1 y = 2;");
    assert_eq!(errors, vec!["Expect ';' after expression"]);
    assert_eq!(program.declarations.len(), 2);

    let (program, errors) = parse_with_errors("let a = 1 let b = 2;");
    assert_eq!(errors, vec!["Expect ';' after variable declaration"]);
    assert_eq!(program.declarations.len(), 2);
}

#[test]
fn test_missing_closing_brace() {
    let (_, errors) = parse_with_errors("if (x > 0) { y = 1;");
    assert_eq!(errors, vec!["Expect '}' after block"]);
}

#[test]
fn test_missing_condition_uses_true_placeholder() {
    let (program, errors) = parse_with_errors("if () { }");
    assert_eq!(errors, vec!["Invalid or missing condition in if statement"]);
    match &program.declarations[0] {
        Decl::Stmt(Stmt {
            kind: StmtKind::If { condition, .. },
            ..
        }) => assert!(matches!(condition.kind, ExprKind::Literal(Literal::Bool(true)))),
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_missing_body_uses_empty_block() {
    let (program, errors) = parse_with_errors("while (x)");
    assert_eq!(errors, vec!["Invalid or missing body in while statement"]);
    match &program.declarations[0] {
        Decl::Stmt(Stmt {
            kind: StmtKind::While { body, .. },
            ..
        }) => match &body.kind {
            StmtKind::Block(block) => assert!(block.declarations.is_empty()),
            other => panic!("expected placeholder block, got {:?}", other),
        },
        other => panic!("expected while, got {:?}", other),
    }
}

#[test]
fn test_missing_else_branch() {
    let (_, errors) = parse_with_errors("if (a) { } else");
    assert_eq!(errors, vec!["Invalid or missing else branch in if statement"]);
}

#[test]
fn test_invalid_assignment_target() {
    let (program, errors) = parse_with_errors("1 = 2; x = 3;");
    assert_eq!(errors, vec!["Invalid assignment target. Left side must be a variable."]);
    assert_eq!(program.declarations.len(), 1);
}

#[test]
fn test_missing_assignment_value() {
    let (_, errors) = parse_with_errors("x = ;");
    assert_eq!(errors, vec!["Invalid or missing expression on right side of assignment"]);
}

#[test]
fn test_unexpected_token_in_expression() {
    let (program, errors) = parse_with_errors(") ; let a = 1;");
    assert_eq!(errors, vec!["Expected expression, got ')'"]);
    assert_eq!(program.declarations.len(), 1);
}

#[test]
fn test_unclosed_paren() {
    let (_, errors) = parse_with_errors("x = (1 + 2;");
    assert_eq!(errors, vec!["Expect ')' after expression"]);
}

#[test]
fn test_resource_spec_errors() {
    let (_, errors) = parse_with_errors("ALLOCATE_RESOURCES { CHRONON 5 } { }");
    assert_eq!(errors, vec!["Expect ':' after 'CHRONON'"]);

    let (_, errors) = parse_with_errors("EXPEND_RESOURCES { AETHEL: 5 ");
    assert_eq!(errors, vec!["Expect '}' after resource specifications"]);

    let (_, errors) = parse_with_errors("BORROW_RESOURCES { CHRONON: 1 } x = 1;");
    assert_eq!(errors, vec!["Expect '{' after resource specifications"]);
}

#[test]
fn test_error_inside_block_recovers_at_brace() {
    let (program, errors) = parse_with_errors("{ x = ; } let ok = 1;");
    assert_eq!(errors.len(), 1);
    assert_eq!(program.declarations.len(), 2);
}

#[test]
fn test_lex_errors_are_skipped_by_parser() {
    let (program, errors) = parse_with_errors("let c = ''; let d = 1;");
    assert_eq!(errors[0], "Empty character literal");
    assert!(program.declarations.len() >= 1);
}

#[test]
fn test_stray_closing_braces() {
    let (_, errors) = parse_with_errors("} } let a = 1;");
    assert_eq!(errors, vec!["Expected expression, got '}'"]);
}

#[test]
fn test_deep_parentheses_report_instead_of_overflowing() {
    let (_, errors) = parse_with_errors(&format!("x = {}1;", "(".repeat(50_000)));
    assert_eq!(errors, vec!["Expression nesting too deep"]);

    let depth = 10_000;
    let source = format!("x = {}1{}; let after = 2;", "(".repeat(depth), ")".repeat(depth));
    let (program, errors) = parse_with_errors(&source);
    assert_eq!(errors, vec!["Expression nesting too deep"]);
    assert_eq!(program.declarations.len(), 1);
}

#[test]
fn test_deep_brackets_terminate() {
    let (_, errors) = parse_with_errors(&format!("x = {}1;", "[".repeat(10_000)));
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_deep_unary_and_call_arguments() {
    let (_, errors) = parse_with_errors(&format!("x = {}1;", "-".repeat(10_000)));
    assert_eq!(errors, vec!["Expression nesting too deep"]);

    let (_, errors) = parse_with_errors(&format!("{}1;", "f(".repeat(10_000)));
    assert_eq!(errors, vec!["Expression nesting too deep"]);

    let (_, errors) = parse_with_errors(&format!("{}1;", "a = ".repeat(10_000)));
    assert_eq!(errors, vec!["Expression nesting too deep"]);
}

#[test]
fn test_deep_blocks_report_instead_of_overflowing() {
    let depth = 10_000;
    let source = format!("{}{}", "{".repeat(depth), "}".repeat(depth));
    let (_, errors) = parse_with_errors(&source);
    assert_eq!(errors[0], "Statement nesting too deep");
    assert!(errors.len() <= 2, "{:?}", errors);
}

#[test]
fn test_deep_if_chain_terminates() {
    let (_, errors) = parse_with_errors(&format!("{}a;", "if (a) ".repeat(10_000)));
    assert!(!errors.is_empty());
    assert!(errors.iter().all(|e| e == "Statement nesting too deep"));
}

#[test]
fn test_nesting_below_limit_parses_clean() {
    let depth = MAX_NESTING / 2;
    let source = format!(
        "{} x = {}1{}; {}",
        "{".repeat(depth / 2),
        "(".repeat(depth / 2),
        ")".repeat(depth / 2),
        "}".repeat(depth / 2),
    );
    let (_, errors) = parse_with_errors(&source);
    assert!(errors.is_empty(), "{:?}", errors);
}

const VOCABULARY: &[&str] = &[
    "let", "const", "if", "else", "while", "return", "FUNCTION", "x", "y", "1", "2.5", "\"s\"",
    "'c'", "true", "null", "(", ")", "{", "}", ",", ";", ":", "=", "==", "+", "-", "*", "/", "!",
    "<", "&&", "||", "ALLOCATE_RESOURCES", "REPAY_DEBT", "CHRONON", "AETHEL", "BRANCH_TIMELINE",
    "MERGE_TIMELINES", "REWIND_FLOW", "REVERSE_FLOW", "PARALLEL_EXECUTION", "0x", "''", "@",
];

proptest! {
    #[test]
    fn prop_parse_terminates_on_token_soup(
        picks in proptest::collection::vec(0..VOCABULARY.len(), 0..120)
    ) {
        let source = picks
            .iter()
            .map(|&i| VOCABULARY[i])
            .collect::<Vec<_>>()
            .join(" ");
        let (_, errors) = parse_with_errors(&source);
        // Every diagnostic is a real message
        prop_assert!(errors.iter().all(|e| !e.is_empty()));
    }

    #[test]
    fn prop_parse_terminates_on_arbitrary_text(source in "\\PC{0,200}") {
        let _ = parse_with_errors(&source);
    }
}
