//! `.chron` byte layout

use chronovyan_ast::Program;
use chronovyan_codegen::*;
use chronovyan_diagnostics::Diagnostics;
use chronovyan_parser::parse;

fn parse_ok(source: &str) -> Program {
    let mut diags = Diagnostics::new();
    let file = diags.register_file("module.cvy");
    let program = parse(source, file, &mut diags);
    assert!(diags.is_empty(), "{}", diags.render_all());
    program
}

#[derive(Debug)]
struct RawRecord {
    tag: u8,
    id: u32,
    fields: String,
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Split a module into records, given the child count of every record in
/// stream order (the format does not store it)
fn split(bytes: &[u8], child_counts: &[usize]) -> Vec<(RawRecord, Vec<u32>)> {
    let mut records = Vec::new();
    let mut pos = MAGIC.len() + VERSION.len();
    for &count in child_counts {
        let tag = bytes[pos];
        let id = read_u32(bytes, pos + 1);
        let len = read_u32(bytes, pos + 5) as usize;
        let fields = String::from_utf8(bytes[pos + 9..pos + 9 + len].to_vec()).unwrap();
        pos += 9 + len;
        let children = (0..count).map(|i| read_u32(bytes, pos + 4 * i)).collect();
        pos += 4 * count;
        records.push((RawRecord { tag, id, fields }, children));
    }
    assert_eq!(pos, bytes.len(), "trailing bytes after last record");
    records
}

#[test]
fn test_header() {
    let bytes = encode(&parse_ok(""));
    assert_eq!(&bytes[..8], &[0x43, 0x48, 0x52, 0x4F, 0x4E, 0x00, 0x01, 0x00]);
    // Empty program: one record with no children
    assert_eq!(bytes[8], NodeTag::Program as u8);
    assert_eq!(read_u32(&bytes, 9), 1);
    assert_eq!(&bytes[17..], b"numDeclarations=0");
}

#[test]
fn test_var_decl_records() {
    let bytes = encode(&parse_ok("let x: int = 42;"));
    // Stream order is post-order: type, literal, var decl, program
    let records = split(&bytes, &[0, 0, 2, 1]);

    let (ty, _) = &records[0];
    assert_eq!(ty.tag, 0x40);
    assert_eq!(ty.id, 3);
    assert_eq!(ty.fields, "name=int");

    let (literal, _) = &records[1];
    assert_eq!(literal.tag, 0x30);
    assert_eq!(literal.id, 4);
    assert_eq!(literal.fields, "type=int:value=42");

    let (decl, children) = &records[2];
    assert_eq!(decl.tag, 0x10);
    assert_eq!(decl.id, 2);
    assert_eq!(decl.fields, "name=x:isConst=false:hasType=true:hasInit=true");
    assert_eq!(children, &vec![3, 4]);

    let (program, children) = &records[3];
    assert_eq!(program.tag, 0x01);
    assert_eq!(program.id, 1);
    assert_eq!(children, &vec![2]);
}

#[test]
fn test_statement_records() {
    let bytes = encode(&parse_ok("if (a < 2.5) { } else { }"));
    // a, 2.5, binary, then-block, else-block, if, stmt-decl, program
    let records = split(&bytes, &[0, 0, 2, 0, 0, 3, 1, 1]);
    let tags: Vec<u8> = records.iter().map(|(r, _)| r.tag).collect();
    assert_eq!(tags, vec![0x31, 0x30, 0x33, 0x02, 0x02, 0x21, 0x11, 0x01]);

    assert_eq!(records[1].0.fields, "type=float:value=2.500000");
    assert_eq!(records[2].0.fields, "operator=<");
    assert_eq!(records[5].0.fields, "hasElse=true");
    // Pre-order ids: program 1, stmt-decl 2, if 3, binary 4, a 5, 2.5 6, blocks 7 and 8
    assert_eq!(records[5].1, vec![4, 7, 8]);
    assert_eq!(records[6].1, vec![3]);
}

#[test]
fn test_temporal_and_function_records() {
    let bytes = encode(&parse_ok(
        "FUNCTION f(a, b) { return; } MERGE_TIMELINES; REWIND_FLOW(true) { }",
    ));
    // return, stmt-decl, body block, function; merge, stmt-decl;
    // true, block, rewind, stmt-decl; program
    let records = split(&bytes, &[0, 1, 1, 1, 0, 1, 0, 0, 2, 1, 3]);
    assert_eq!(records[0].0.fields, "hasValue=false");
    assert_eq!(records[1].0.tag, 0x11);
    assert_eq!(records[3].0.tag, 0x12);
    assert_eq!(records[3].0.fields, "name=f:numParams=2:params=a,b");
    assert_eq!(records[4].0.tag, 0x27);
    assert_eq!(records[8].0.tag, 0x28);
    assert_eq!(records[8].0.fields, "direction=rewind:hasLimit=false");
}

#[test]
fn test_resource_and_literal_fields() {
    let bytes = encode(&parse_ok(
        "BORROW_RESOURCES { CHRONON: 7 } { } f(\"hi\", null, true);",
    ));
    // 7, block, resource, stmt-decl; f, "hi", null, true, call, expr-stmt, stmt-decl; program
    let records = split(&bytes, &[0, 0, 2, 1, 0, 0, 0, 0, 4, 1, 1, 2]);
    assert_eq!(records[2].0.fields, "operation=2:hasChronons=true:hasAethel=false");
    assert_eq!(records[5].0.fields, "type=string:value=hi");
    assert_eq!(records[6].0.fields, "type=null:value=null");
    assert_eq!(records[7].0.fields, "type=bool:value=true");
    assert_eq!(records[8].0.fields, "numArgs=3");
}

#[test]
fn test_encoding_is_deterministic() {
    let program = parse_ok("let a = 1; a = a + 2;");
    let first = encode(&program);
    let second = encode(&program);
    assert_eq!(first, second);
}

#[test]
fn test_write_to_file() {
    let program = parse_ok("let x = 1;");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.chron");

    ChronEncoder::new().write_to_file(&program, &path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), encode(&program));
}

#[test]
fn test_write_failure_is_an_error() {
    let program = parse_ok("let x = 1;");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.chron");

    let err = ChronEncoder::new().write_to_file(&program, &path).unwrap_err();
    assert!(matches!(err, EncodeError::Io(_)));
}
