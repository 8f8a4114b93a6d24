//! `.chron` module encoding
//!
//! Layout: magic `CHRON`, three version bytes, then one record per AST node:
//!
//! ```text
//! [tag: u8][id: u32 BE][len: u32 BE][len bytes "name=value:name=value"][child ids: u32 BE]*
//! ```
//!
//! Ids are handed out in pre-order starting at 1, and a node's record is
//! written once its children are encoded, so children precede parents.
//! Records carry no child count and the stream has no record count; a
//! reader derives both from the tag and its fields.

use std::fmt::Display;
use std::path::Path;

use chronovyan_ast::*;
use thiserror::Error;
use tracing::debug;

pub const MAGIC: [u8; 5] = *b"CHRON";
pub const VERSION: [u8; 3] = [0x00, 0x01, 0x00];

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to write module: {0}")]
    Io(#[from] std::io::Error),
}

/// Record type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeTag {
    Program = 0x01,
    Block = 0x02,
    VarDecl = 0x10,
    StmtDecl = 0x11,
    FunctionDecl = 0x12,
    ExprStmt = 0x20,
    IfStmt = 0x21,
    WhileStmt = 0x22,
    ResourceStmt = 0x23,
    ParallelExecution = 0x24,
    BranchTimeline = 0x25,
    ReturnStmt = 0x26,
    MergeTimelines = 0x27,
    RewindFlow = 0x28,
    Literal = 0x30,
    Variable = 0x31,
    Unary = 0x32,
    Binary = 0x33,
    Call = 0x34,
    Assign = 0x35,
    BasicType = 0x40,
}

struct Record {
    tag: NodeTag,
    id: u32,
    fields: Vec<(&'static str, String)>,
    children: Vec<u32>,
}

impl Record {
    fn new(tag: NodeTag, id: u32) -> Self {
        Self {
            tag,
            id,
            fields: Vec::new(),
            children: Vec::new(),
        }
    }

    fn field(mut self, name: &'static str, value: impl Display) -> Self {
        self.fields.push((name, value.to_string()));
        self
    }

    fn child(&mut self, id: u32) {
        self.children.push(id);
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let data = self
            .fields
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(":");

        out.push(self.tag as u8);
        out.extend_from_slice(&self.id.to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(data.as_bytes());
        for child in &self.children {
            out.extend_from_slice(&child.to_be_bytes());
        }
    }
}

/// Serializes an AST into the `.chron` module format
///
/// Encoding never inspects semantic validity; any tree the parser returns
/// can be encoded.
#[derive(Debug, Default)]
pub struct ChronEncoder {
    next_id: u32,
    bytes: Vec<u8>,
}

impl ChronEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, program: &Program) -> Vec<u8> {
        self.next_id = 1;
        self.bytes = Vec::new();
        self.bytes.extend_from_slice(&MAGIC);
        self.bytes.extend_from_slice(&VERSION);

        self.program(program);

        debug!(
            nodes = self.next_id - 1,
            bytes = self.bytes.len(),
            "encoded module"
        );
        std::mem::take(&mut self.bytes)
    }

    pub fn write_to_file(
        &mut self,
        program: &Program,
        path: impl AsRef<Path>,
    ) -> Result<(), EncodeError> {
        let bytes = self.encode(program);
        std::fs::write(path.as_ref(), &bytes)?;
        debug!(path = %path.as_ref().display(), bytes = bytes.len(), "wrote module");
        Ok(())
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn write(&mut self, record: Record) -> u32 {
        record.encode(&mut self.bytes);
        record.id
    }

    fn program(&mut self, program: &Program) -> u32 {
        let id = self.allocate_id();
        let mut record = Record::new(NodeTag::Program, id)
            .field("numDeclarations", program.declarations.len());
        for decl in &program.declarations {
            let child = self.declaration(decl);
            record.child(child);
        }
        self.write(record)
    }

    fn declaration(&mut self, decl: &Decl) -> u32 {
        let id = self.allocate_id();
        match decl {
            Decl::Var(var) => {
                let mut record = Record::new(NodeTag::VarDecl, id)
                    .field("name", &var.name)
                    .field("isConst", var.is_const)
                    .field("hasType", var.type_annotation.is_some())
                    .field("hasInit", var.initializer.is_some());
                if let Some(annotation) = &var.type_annotation {
                    let child = self.basic_type(annotation);
                    record.child(child);
                }
                if let Some(init) = &var.initializer {
                    let child = self.expr(init);
                    record.child(child);
                }
                self.write(record)
            }
            Decl::Function(func) => {
                let mut record = Record::new(NodeTag::FunctionDecl, id)
                    .field("name", &func.name)
                    .field("numParams", func.params.len())
                    .field("params", func.param_names().join(","));
                let body = self.block(&func.body);
                record.child(body);
                self.write(record)
            }
            Decl::Stmt(stmt) => {
                let mut record = Record::new(NodeTag::StmtDecl, id);
                let child = self.statement(stmt);
                record.child(child);
                self.write(record)
            }
        }
    }

    fn basic_type(&mut self, annotation: &TypeAnnotation) -> u32 {
        let id = self.allocate_id();
        self.write(Record::new(NodeTag::BasicType, id).field("name", &annotation.name))
    }

    fn block(&mut self, block: &Block) -> u32 {
        let id = self.allocate_id();
        let record = self.block_record(id, block);
        self.write(record)
    }

    fn block_record(&mut self, id: u32, block: &Block) -> Record {
        let mut record =
            Record::new(NodeTag::Block, id).field("numStmts", block.declarations.len());
        for decl in &block.declarations {
            let child = self.declaration(decl);
            record.child(child);
        }
        record
    }

    fn optional(&mut self, record: &mut Record, expr: Option<&Expr>) {
        if let Some(expr) = expr {
            let child = self.expr(expr);
            record.child(child);
        }
    }

    fn statement(&mut self, stmt: &Stmt) -> u32 {
        let id = self.allocate_id();
        let record = match &stmt.kind {
            StmtKind::Block(block) => self.block_record(id, block),
            StmtKind::Expr(expr) => {
                let mut record = Record::new(NodeTag::ExprStmt, id);
                let child = self.expr(expr);
                record.child(child);
                record
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut record =
                    Record::new(NodeTag::IfStmt, id).field("hasElse", else_branch.is_some());
                let cond = self.expr(condition);
                record.child(cond);
                let then_id = self.statement(then_branch);
                record.child(then_id);
                if let Some(else_branch) = else_branch {
                    let else_id = self.statement(else_branch);
                    record.child(else_id);
                }
                record
            }
            StmtKind::While { condition, body } => {
                let mut record = Record::new(NodeTag::WhileStmt, id);
                let cond = self.expr(condition);
                record.child(cond);
                let body_id = self.statement(body);
                record.child(body_id);
                record
            }
            StmtKind::Return(value) => {
                let mut record =
                    Record::new(NodeTag::ReturnStmt, id).field("hasValue", value.is_some());
                self.optional(&mut record, value.as_ref());
                record
            }
            StmtKind::Resource {
                op,
                chronons,
                aethel,
                body,
            } => {
                let mut record = Record::new(NodeTag::ResourceStmt, id)
                    .field("operation", op.code())
                    .field("hasChronons", chronons.is_some())
                    .field("hasAethel", aethel.is_some());
                self.optional(&mut record, chronons.as_ref());
                self.optional(&mut record, aethel.as_ref());
                let body_id = self.block(body);
                record.child(body_id);
                record
            }
            StmtKind::ParallelExecution { thread_count, body } => {
                self.counted(NodeTag::ParallelExecution, id, thread_count.as_ref(), body)
            }
            StmtKind::BranchTimeline { branch_count, body } => {
                self.counted(NodeTag::BranchTimeline, id, branch_count.as_ref(), body)
            }
            StmtKind::MergeTimelines => Record::new(NodeTag::MergeTimelines, id),
            StmtKind::RewindFlow {
                direction,
                condition,
                max_iterations,
                body,
            } => {
                let mut record = Record::new(NodeTag::RewindFlow, id)
                    .field("direction", direction.name())
                    .field("hasLimit", max_iterations.is_some());
                let cond = self.expr(condition);
                record.child(cond);
                self.optional(&mut record, max_iterations.as_ref());
                let body_id = self.statement(body);
                record.child(body_id);
                record
            }
        };
        self.write(record)
    }

    fn counted(&mut self, tag: NodeTag, id: u32, count: Option<&Expr>, body: &Block) -> Record {
        let mut record = Record::new(tag, id).field("hasCount", count.is_some());
        self.optional(&mut record, count);
        let body_id = self.block(body);
        record.child(body_id);
        record
    }

    // Recursion depth is bounded by the parser's `MAX_NESTING`
    fn expr(&mut self, expr: &Expr) -> u32 {
        let id = self.allocate_id();
        let record = match &expr.kind {
            ExprKind::Literal(literal) => {
                let value = match literal {
                    Literal::Int(n) => n.to_string(),
                    Literal::Float(x) => format!("{:.6}", x),
                    Literal::String(s) => s.clone(),
                    Literal::Bool(b) => b.to_string(),
                    Literal::Null => "null".to_string(),
                };
                Record::new(NodeTag::Literal, id)
                    .field("type", literal.kind_name())
                    .field("value", value)
            }
            ExprKind::Variable(name) => Record::new(NodeTag::Variable, id).field("name", name),
            ExprKind::Unary { op, operand } => {
                let mut record = Record::new(NodeTag::Unary, id).field("operator", op.symbol());
                let child = self.expr(operand);
                record.child(child);
                record
            }
            ExprKind::Binary { op, left, right } => {
                let mut record = Record::new(NodeTag::Binary, id).field("operator", op.symbol());
                let left_id = self.expr(left);
                record.child(left_id);
                let right_id = self.expr(right);
                record.child(right_id);
                record
            }
            ExprKind::Call { callee, args } => {
                let mut record = Record::new(NodeTag::Call, id).field("numArgs", args.len());
                let callee_id = self.expr(callee);
                record.child(callee_id);
                for arg in args {
                    let arg_id = self.expr(arg);
                    record.child(arg_id);
                }
                record
            }
            ExprKind::Assign { target, value } => {
                let mut record = Record::new(NodeTag::Assign, id).field("name", target);
                let child = self.expr(value);
                record.child(child);
                record
            }
        };
        self.write(record)
    }
}
