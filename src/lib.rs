//! Chronovyan - a compiler front end for a temporal programming language
//!
//! This is the root workspace crate. The stages live in the member crates;
//! [`compile`] chains them with a gate after each stage.

pub use chronovyan_ast as ast;
pub use chronovyan_checker as checker;
pub use chronovyan_codegen as codegen;
pub use chronovyan_diagnostics as diagnostics;
pub use chronovyan_lexer as lexer;
pub use chronovyan_parser as parser;

use chronovyan_ast::Program;
use chronovyan_checker::{ExprTypes, SemanticAnalyzer};
use chronovyan_codegen::{IrGenerator, IrProgram};
use chronovyan_diagnostics::Diagnostics;
use tracing::{debug, info_span};

/// Options for one compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Name registered for every source location
    pub file_name: String,
    /// Keep INFO and HINT diagnostics
    pub debug_output: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            file_name: "<input>".to_string(),
            debug_output: false,
        }
    }
}

/// Everything produced by one compilation
#[derive(Debug)]
pub struct Compilation {
    pub program: Program,
    pub types: ExprTypes,
    /// Present only when parsing and analysis produced no errors
    pub ir: Option<IrProgram>,
    pub diagnostics: Diagnostics,
}

impl Compilation {
    pub fn succeeded(&self) -> bool {
        self.ir.is_some() && !self.diagnostics.has_errors()
    }
}

/// Parse, analyze and lower a source string
///
/// Analysis runs only if parsing reported no errors, and lowering only if
/// analysis reported none.
pub fn compile(source: &str, options: &CompileOptions) -> Compilation {
    let _span = info_span!("compile", file = %options.file_name).entered();

    let mut diagnostics = Diagnostics::with_debug_output(options.debug_output);
    let file = diagnostics.register_file(options.file_name.clone());

    let program = chronovyan_parser::parse(source, file, &mut diagnostics);
    if diagnostics.has_errors() {
        debug!(errors = diagnostics.error_count(), "stopping after parse");
        return Compilation {
            program,
            types: ExprTypes::new(),
            ir: None,
            diagnostics,
        };
    }

    let types = SemanticAnalyzer::new(&mut diagnostics).analyze(&program);
    if diagnostics.has_errors() {
        debug!(errors = diagnostics.error_count(), "stopping after analysis");
        return Compilation {
            program,
            types,
            ir: None,
            diagnostics,
        };
    }

    let ir = IrGenerator::new(&mut diagnostics).generate(&program);
    diagnostics.info(
        program.location,
        format!("Generated IR for {} function(s)", ir.functions.len()),
    );
    Compilation {
        program,
        types,
        ir: Some(ir),
        diagnostics,
    }
}
