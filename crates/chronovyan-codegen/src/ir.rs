//! Intermediate representation for codegen
//!
//! A stack machine whose instructions live in labeled basic blocks. Jumps
//! name their target block by label.

use std::fmt;

use chronovyan_ast::{BinaryOp, UnaryOp};
use chronovyan_diagnostics::SourceLocation;
use serde::{Deserialize, Serialize};

/// Maximum number of operands on one instruction
pub const MAX_OPERANDS: usize = 3;

/// An IR-level constant or reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrValue {
    Void,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// String constant; also used for jump labels
    String(String),
    /// Named variable
    Reference(String),
    /// Named function
    Function(String),
}

impl IrValue {
    pub fn label(name: impl Into<String>) -> Self {
        IrValue::String(name.into())
    }

    pub fn reference(name: impl Into<String>) -> Self {
        IrValue::Reference(name.into())
    }
}

impl fmt::Display for IrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrValue::Void => write!(f, "void"),
            IrValue::Boolean(b) => write!(f, "{}", b),
            IrValue::Integer(n) => write!(f, "{}", n),
            IrValue::Float(x) => write!(f, "{:.4}", x),
            IrValue::String(s) => write!(f, "\"{}\"", s),
            IrValue::Reference(name) => write!(f, "@{}", name),
            IrValue::Function(name) => write!(f, "func:{}", name),
        }
    }
}

/// IR operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Nop,
    Label,
    Jump,
    JumpIfTrue,
    JumpIfFalse,
    Call,
    Return,
    LoadConst,
    LoadVar,
    StoreVar,
    Push,
    Pop,
    Dup,
    Swap,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    And,
    Or,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Temporal operations
    Rewind,
    Branch,
    Merge,
    Snapshot,
    // Resources
    ConsumeAethel,
    ConsumeChronon,
    CheckResources,
    // Parallel execution
    ParallelBegin,
    ParallelEnd,
    ThreadId,
    ThreadCount,
    // Timeline branching
    TimelineBranchBegin,
    TimelineBranchEnd,
    TimelineId,
    TimelineCount,
    DebugPrint,
}

impl Opcode {
    pub fn name(&self) -> &'static str {
        match self {
            Opcode::Nop => "NOP",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfTrue => "JUMP_IF_TRUE",
            Opcode::JumpIfFalse => "JUMP_IF_FALSE",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::LoadConst => "LOAD_CONST",
            Opcode::LoadVar => "LOAD_VAR",
            Opcode::StoreVar => "STORE_VAR",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Dup => "DUP",
            Opcode::Swap => "SWAP",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Neg => "NEG",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Eq => "EQ",
            Opcode::Ne => "NE",
            Opcode::Lt => "LT",
            Opcode::Le => "LE",
            Opcode::Gt => "GT",
            Opcode::Ge => "GE",
            Opcode::Rewind => "REWIND",
            Opcode::Branch => "BRANCH",
            Opcode::Merge => "MERGE",
            Opcode::Snapshot => "SNAPSHOT",
            Opcode::ConsumeAethel => "CONSUME_AETHEL",
            Opcode::ConsumeChronon => "CONSUME_CHRONON",
            Opcode::CheckResources => "CHECK_RESOURCES",
            Opcode::ParallelBegin => "PARALLEL_BEGIN",
            Opcode::ParallelEnd => "PARALLEL_END",
            Opcode::ThreadId => "THREAD_ID",
            Opcode::ThreadCount => "THREAD_COUNT",
            Opcode::TimelineBranchBegin => "TIMELINE_BRANCH_BEGIN",
            Opcode::TimelineBranchEnd => "TIMELINE_BRANCH_END",
            Opcode::TimelineId => "TIMELINE_ID",
            Opcode::TimelineCount => "TIMELINE_COUNT",
            Opcode::DebugPrint => "DEBUG_PRINT",
        }
    }

    pub fn from_binary_op(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Add => Opcode::Add,
            BinaryOp::Sub => Opcode::Sub,
            BinaryOp::Mul => Opcode::Mul,
            BinaryOp::Div => Opcode::Div,
            BinaryOp::Mod => Opcode::Mod,
            BinaryOp::Eq => Opcode::Eq,
            BinaryOp::Ne => Opcode::Ne,
            BinaryOp::Lt => Opcode::Lt,
            BinaryOp::Le => Opcode::Le,
            BinaryOp::Gt => Opcode::Gt,
            BinaryOp::Ge => Opcode::Ge,
            BinaryOp::And => Opcode::And,
            BinaryOp::Or => Opcode::Or,
        }
    }

    pub fn from_unary_op(op: UnaryOp) -> Self {
        match op {
            UnaryOp::Neg => Opcode::Neg,
            UnaryOp::Not => Opcode::Not,
        }
    }

    pub fn is_jump(&self) -> bool {
        matches!(self, Opcode::Jump | Opcode::JumpIfTrue | Opcode::JumpIfFalse)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One IR instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrInstruction {
    pub opcode: Opcode,
    pub operands: Vec<IrValue>,
    pub location: SourceLocation,
}

impl IrInstruction {
    pub fn new(opcode: Opcode, location: SourceLocation) -> Self {
        Self {
            opcode,
            operands: Vec::new(),
            location,
        }
    }

    /// Append an operand. Operands beyond `MAX_OPERANDS` are dropped.
    pub fn operand(mut self, value: IrValue) -> Self {
        debug_assert!(
            self.operands.len() < MAX_OPERANDS,
            "{} already has {} operands",
            self.opcode,
            MAX_OPERANDS
        );
        if self.operands.len() < MAX_OPERANDS {
            self.operands.push(value);
        }
        self
    }

    /// Label named by a jump instruction
    pub fn jump_target(&self) -> Option<&str> {
        match (self.opcode.is_jump(), self.operands.first()) {
            (true, Some(IrValue::String(label))) => Some(label),
            _ => None,
        }
    }
}

impl fmt::Display for IrInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for (i, operand) in self.operands.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, operand)?;
        }
        Ok(())
    }
}

/// A labeled straight-line run of instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrBasicBlock {
    pub label: String,
    pub instructions: Vec<IrInstruction>,
}

impl IrBasicBlock {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instructions: Vec::new(),
        }
    }

    pub fn push(&mut self, instruction: IrInstruction) {
        self.instructions.push(instruction);
    }
}

impl fmt::Display for IrBasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        for instruction in &self.instructions {
            writeln!(f, "    {}", instruction)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrFunction {
    pub name: String,
    pub params: Vec<String>,
    pub blocks: Vec<IrBasicBlock>,
}

impl IrFunction {
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
            blocks: Vec::new(),
        }
    }

    pub fn block(&self, label: &str) -> Option<&IrBasicBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }

    /// All instructions in block order
    pub fn instructions(&self) -> impl Iterator<Item = &IrInstruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }
}

impl fmt::Display for IrFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "function {}({}) {{", self.name, self.params.join(", "))?;
        for block in &self.blocks {
            write!(f, "{}", block)?;
        }
        writeln!(f, "}}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IrProgram {
    pub functions: Vec<IrFunction>,
}

impl IrProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn function(&self, name: &str) -> Option<&IrFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for IrProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, function) in self.functions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}
