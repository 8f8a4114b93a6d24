//! Statement AST nodes

use serde::{Deserialize, Serialize};
use crate::{Decl, Expr, SourceLocation};

/// A braced block
///
/// Blocks hold declarations so `let`/`const` may appear inside them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub declarations: Vec<Decl>,
    pub location: SourceLocation,
}

impl Block {
    pub fn new(declarations: Vec<Decl>, location: SourceLocation) -> Self {
        Self {
            declarations,
            location,
        }
    }

    pub fn empty(location: SourceLocation) -> Self {
        Self::new(Vec::new(), location)
    }
}

/// A statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: SourceLocation,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }

    /// An empty block statement, used where a body is missing
    pub fn empty_block(location: SourceLocation) -> Self {
        Self::new(StmtKind::Block(Block::empty(location)), location)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StmtKind {
    /// Expression statement: `foo();`
    Expr(Expr),

    /// Block: `{ ... }`
    Block(Block),

    /// `if (cond) stmt else stmt`
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while (cond) stmt`
    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    /// `return;` or `return expr;`
    Return(Option<Expr>),

    /// `ALLOCATE_RESOURCES { CHRONON: a, AETHEL: b } { ... }`
    Resource {
        op: ResourceOp,
        chronons: Option<Expr>,
        aethel: Option<Expr>,
        body: Block,
    },

    /// `PARALLEL_EXECUTION(n) { ... }`
    ParallelExecution {
        thread_count: Option<Expr>,
        body: Block,
    },

    /// `BRANCH_TIMELINE(n) { ... }`
    BranchTimeline {
        branch_count: Option<Expr>,
        body: Block,
    },

    /// `MERGE_TIMELINES;`
    MergeTimelines,

    /// `REWIND_FLOW(cond, limit) stmt` / `REVERSE_FLOW(cond) stmt`
    RewindFlow {
        direction: FlowDirection,
        condition: Expr,
        max_iterations: Option<Expr>,
        body: Box<Stmt>,
    },
}

/// The four resource-operation keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceOp {
    Allocate,
    Expend,
    Borrow,
    Repay,
}

impl ResourceOp {
    /// Numeric code written to compiled modules
    pub fn code(&self) -> u8 {
        match self {
            ResourceOp::Allocate => 0,
            ResourceOp::Expend => 1,
            ResourceOp::Borrow => 2,
            ResourceOp::Repay => 3,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ResourceOp::Allocate => "ALLOCATE_RESOURCES",
            ResourceOp::Expend => "EXPEND_RESOURCES",
            ResourceOp::Borrow => "BORROW_RESOURCES",
            ResourceOp::Repay => "REPAY_DEBT",
        }
    }

    pub fn consumes_chronons(&self) -> bool {
        matches!(self, ResourceOp::Allocate | ResourceOp::Borrow)
    }

    pub fn consumes_aethel(&self) -> bool {
        matches!(self, ResourceOp::Allocate | ResourceOp::Expend)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowDirection {
    Rewind,
    Reverse,
}

impl FlowDirection {
    pub fn name(&self) -> &'static str {
        match self {
            FlowDirection::Rewind => "rewind",
            FlowDirection::Reverse => "reverse",
        }
    }
}
