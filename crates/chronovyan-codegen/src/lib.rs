//! Chronovyan Codegen - IR lowering and module encoding
//!
//! Two independent back ends over the AST: a stack-machine IR organized in
//! labeled basic blocks, and the `.chron` binary module encoder.

mod chron;
mod generator;
mod ir;

pub use chron::*;
pub use generator::*;
pub use ir::*;

use chronovyan_ast::Program;
use chronovyan_diagnostics::Diagnostics;
use thiserror::Error;

/// Structural faults hit while lowering; reported as diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("Cannot add instruction outside of a basic block")]
    InstructionOutsideBlock,

    #[error("Cannot create basic block outside of a function")]
    BlockOutsideFunction,

    #[error("Unsupported call target")]
    UnsupportedCallTarget,
}

/// Lower a program to IR
pub fn lower(program: &Program, diagnostics: &mut Diagnostics) -> IrProgram {
    IrGenerator::new(diagnostics).generate(program)
}

/// Encode a program as a `.chron` module
pub fn encode(program: &Program) -> Vec<u8> {
    ChronEncoder::new().encode(program)
}
