#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chronovyan::diagnostics::Diagnostics;
use chronovyan::{compile, Compilation, CompileOptions};

/// Load a source file from tests/fixtures/
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Compile a source string under a test file name
pub fn compile_source(source: &str) -> Compilation {
    let options = CompileOptions {
        file_name: "test.cvy".to_string(),
        debug_output: false,
    };
    compile(source, &options)
}

/// Assert that compilation produced IR and no errors or warnings
pub fn assert_compiles_clean(source: &str) -> Compilation {
    let compilation = compile_source(source);
    assert!(
        compilation.diagnostics.is_empty(),
        "Expected no diagnostics, got:\n{}",
        compilation.diagnostics.render_all()
    );
    assert!(compilation.ir.is_some(), "Expected IR to be generated");
    compilation
}

/// Diagnostic messages in emission order
pub fn messages(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics.iter().map(|d| d.message.clone()).collect()
}
