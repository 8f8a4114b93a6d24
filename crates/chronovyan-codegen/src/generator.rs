//! Lowering from AST to IR

use chronovyan_ast::*;
use chronovyan_diagnostics::Diagnostics;
use tracing::{debug, trace};

use crate::{CodegenError, IrBasicBlock, IrFunction, IrInstruction, IrProgram, IrValue, Opcode};

/// Name of the function holding top-level code
pub const MAIN_FUNCTION: &str = "main";

/// Label of the first block in every function
pub const ENTRY_BLOCK: &str = "entry";

/// IR generator
///
/// The label counter belongs to the generator and is never reset, so two
/// lowerings by the same generator produce distinct label numbers.
pub struct IrGenerator<'d> {
    diagnostics: &'d mut Diagnostics,
    program: IrProgram,
    current_function: Option<usize>,
    current_block: Option<usize>,
    label_counter: u32,
    has_error: bool,
}

impl<'d> IrGenerator<'d> {
    pub fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            diagnostics,
            program: IrProgram::new(),
            current_function: None,
            current_block: None,
            label_counter: 0,
            has_error: false,
        }
    }

    /// Whether the last lowering hit a structural error
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// Lower a program. Top-level code goes into `main`; each function
    /// declaration becomes its own IR function.
    pub fn generate(&mut self, program: &Program) -> IrProgram {
        self.program = IrProgram::new();
        self.has_error = false;

        self.start_function(MAIN_FUNCTION, Vec::new(), program.location);
        for decl in &program.declarations {
            self.lower_declaration(decl);
        }
        self.end_function();

        debug!(
            functions = self.program.functions.len(),
            instructions = self
                .program
                .functions
                .iter()
                .map(|f| f.instructions().count())
                .sum::<usize>(),
            "lowered program"
        );
        std::mem::take(&mut self.program)
    }

    // === Function and block structure ===

    fn start_function(&mut self, name: &str, params: Vec<String>, location: SourceLocation) {
        self.program.functions.push(IrFunction::new(name, params));
        self.current_function = Some(self.program.functions.len() - 1);
        self.start_block(ENTRY_BLOCK.to_string(), location);
    }

    fn end_function(&mut self) {
        self.current_function = None;
        self.current_block = None;
    }

    fn start_block(&mut self, label: String, location: SourceLocation) {
        let Some(func) = self.current_function else {
            self.error(location, CodegenError::BlockOutsideFunction);
            return;
        };
        let blocks = &mut self.program.functions[func].blocks;
        blocks.push(IrBasicBlock::new(label));
        self.current_block = Some(blocks.len() - 1);
    }

    fn emit(&mut self, instruction: IrInstruction) {
        match (self.current_function, self.current_block) {
            (Some(func), Some(block)) => {
                trace!(%instruction, "emit");
                self.program.functions[func].blocks[block].push(instruction);
            }
            _ => self.error(instruction.location, CodegenError::InstructionOutsideBlock),
        }
    }

    fn emit_op(&mut self, opcode: Opcode, location: SourceLocation) {
        self.emit(IrInstruction::new(opcode, location));
    }

    fn emit_const(&mut self, value: IrValue, location: SourceLocation) {
        self.emit(IrInstruction::new(Opcode::LoadConst, location).operand(value));
    }

    fn emit_jump(&mut self, opcode: Opcode, label: &str, location: SourceLocation) {
        self.emit(IrInstruction::new(opcode, location).operand(IrValue::label(label)));
    }

    fn next_label_id(&mut self) -> u32 {
        let id = self.label_counter;
        self.label_counter += 1;
        id
    }

    fn current_block_returns(&self) -> bool {
        let (Some(func), Some(block)) = (self.current_function, self.current_block) else {
            return false;
        };
        self.program.functions[func].blocks[block]
            .instructions
            .last()
            .is_some_and(|inst| inst.opcode == Opcode::Return)
    }

    fn error(&mut self, location: SourceLocation, error: CodegenError) {
        self.diagnostics.error(location, error.to_string());
        self.has_error = true;
    }

    // === Declarations ===

    fn lower_declaration(&mut self, decl: &Decl) {
        match decl {
            Decl::Var(var) => {
                match &var.initializer {
                    Some(init) => self.lower_expr(init),
                    None => self.emit_const(IrValue::Void, var.location),
                }
                self.emit(
                    IrInstruction::new(Opcode::StoreVar, var.location)
                        .operand(IrValue::reference(&var.name)),
                );
            }
            Decl::Function(func) => self.lower_function(func),
            Decl::Stmt(stmt) => self.lower_statement(stmt),
        }
    }

    fn lower_function(&mut self, func: &FunctionDecl) {
        let saved = (self.current_function, self.current_block);

        self.start_function(&func.name, func.param_names(), func.location);
        for decl in &func.body.declarations {
            self.lower_declaration(decl);
        }
        if !self.current_block_returns() {
            self.emit_const(IrValue::Void, func.location);
            self.emit_op(Opcode::Return, func.location);
        }
        self.end_function();

        (self.current_function, self.current_block) = saved;
    }

    // === Statements ===

    fn lower_block(&mut self, block: &Block) {
        for decl in &block.declarations {
            self.lower_declaration(decl);
        }
    }

    fn lower_statement(&mut self, stmt: &Stmt) {
        let location = stmt.location;
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.lower_expr(expr);
                self.emit_op(Opcode::Pop, location);
            }
            StmtKind::Block(block) => self.lower_block(block),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.lower_expr(condition);
                let id = self.next_label_id();
                let else_label = format!("else_{}", id);
                let end_label = format!("endif_{}", id);

                self.emit_jump(Opcode::JumpIfFalse, &else_label, location);
                self.lower_statement(then_branch);
                self.emit_jump(Opcode::Jump, &end_label, location);

                self.start_block(else_label, location);
                if let Some(else_branch) = else_branch {
                    self.lower_statement(else_branch);
                }
                self.start_block(end_label, location);
            }
            StmtKind::While { condition, body } => {
                let id = self.next_label_id();
                let cond_label = format!("while_cond_{}", id);
                let body_label = format!("while_body_{}", id);
                let end_label = format!("while_end_{}", id);

                self.start_block(cond_label.clone(), location);
                self.lower_expr(condition);
                self.emit_jump(Opcode::JumpIfTrue, &body_label, location);
                self.emit_jump(Opcode::Jump, &end_label, location);

                self.start_block(body_label, location);
                self.lower_statement(body);
                self.emit_jump(Opcode::Jump, &cond_label, location);

                self.start_block(end_label, location);
            }
            StmtKind::Return(value) => {
                match value {
                    Some(value) => self.lower_expr(value),
                    None => self.emit_const(IrValue::Void, location),
                }
                self.emit_op(Opcode::Return, location);
            }
            StmtKind::Resource {
                op,
                chronons,
                aethel,
                body,
            } => {
                for amount in [chronons, aethel] {
                    match amount {
                        Some(expr) => self.lower_expr(expr),
                        None => self.emit_const(IrValue::Float(0.0), location),
                    }
                }
                if op.consumes_aethel() {
                    self.emit_op(Opcode::ConsumeAethel, location);
                }
                if op.consumes_chronons() {
                    self.emit_op(Opcode::ConsumeChronon, location);
                }
                self.lower_block(body);
            }
            StmtKind::ParallelExecution { thread_count, body } => {
                self.lower_count(thread_count.as_ref(), location);
                self.emit_op(Opcode::ParallelBegin, location);
                self.lower_block(body);
                self.emit_op(Opcode::ParallelEnd, location);
            }
            StmtKind::BranchTimeline { branch_count, body } => {
                self.lower_count(branch_count.as_ref(), location);
                self.emit_op(Opcode::TimelineBranchBegin, location);
                self.lower_block(body);
                self.emit_op(Opcode::TimelineBranchEnd, location);
            }
            StmtKind::MergeTimelines => self.emit_op(Opcode::Merge, location),
            StmtKind::RewindFlow {
                direction,
                condition,
                max_iterations,
                body,
            } => self.lower_rewind(*direction, condition, max_iterations.as_ref(), body, location),
        }
    }

    fn lower_count(&mut self, count: Option<&Expr>, location: SourceLocation) {
        match count {
            Some(expr) => self.lower_expr(expr),
            None => self.emit_const(IrValue::Integer(1), location),
        }
    }

    /// `rewind_N: SNAPSHOT; cond; JUMP_IF_FALSE rewind_end_N; body; [limit;]
    /// REWIND "rewind_N", reverse, has_limit` followed by `rewind_end_N:`.
    /// When `has_limit` is true the limit value is on the stack.
    fn lower_rewind(
        &mut self,
        direction: FlowDirection,
        condition: &Expr,
        limit: Option<&Expr>,
        body: &Stmt,
        location: SourceLocation,
    ) {
        let id = self.next_label_id();
        let start_label = format!("rewind_{}", id);
        let end_label = format!("rewind_end_{}", id);

        self.start_block(start_label.clone(), location);
        self.emit_op(Opcode::Snapshot, location);
        self.lower_expr(condition);
        self.emit_jump(Opcode::JumpIfFalse, &end_label, location);
        self.lower_statement(body);
        if let Some(limit) = limit {
            self.lower_expr(limit);
        }
        self.emit(
            IrInstruction::new(Opcode::Rewind, location)
                .operand(IrValue::label(start_label))
                .operand(IrValue::Boolean(direction == FlowDirection::Reverse))
                .operand(IrValue::Boolean(limit.is_some())),
        );
        self.start_block(end_label, location);
    }

    // === Expressions ===

    // Recursion depth is bounded by the parser's `MAX_NESTING`
    fn lower_expr(&mut self, expr: &Expr) {
        let location = expr.location;
        match &expr.kind {
            ExprKind::Literal(literal) => {
                let value = match literal {
                    Literal::Int(n) => IrValue::Integer(*n),
                    Literal::Float(x) => IrValue::Float(*x),
                    Literal::String(s) => IrValue::String(s.clone()),
                    Literal::Bool(b) => IrValue::Boolean(*b),
                    Literal::Null => IrValue::Void,
                };
                self.emit_const(value, location);
            }
            ExprKind::Variable(name) => {
                self.emit(
                    IrInstruction::new(Opcode::LoadVar, location).operand(IrValue::reference(name)),
                );
            }
            ExprKind::Unary { op, operand } => {
                self.lower_expr(operand);
                self.emit_op(Opcode::from_unary_op(*op), location);
            }
            ExprKind::Binary { op, left, right } => {
                self.lower_expr(left);
                self.lower_expr(right);
                self.emit_op(Opcode::from_binary_op(*op), location);
            }
            ExprKind::Call { callee, args } => {
                let Some(name) = callee.as_variable() else {
                    self.error(callee.location, CodegenError::UnsupportedCallTarget);
                    // Keep the stack balanced for the enclosing expression
                    self.emit_const(IrValue::Void, location);
                    return;
                };
                for arg in args {
                    self.lower_expr(arg);
                }
                self.emit(
                    IrInstruction::new(Opcode::Call, location)
                        .operand(IrValue::Function(name.to_string()))
                        .operand(IrValue::Integer(args.len() as i64)),
                );
            }
            ExprKind::Assign { target, value } => {
                self.lower_expr(value);
                self.emit(
                    IrInstruction::new(Opcode::StoreVar, location)
                        .operand(IrValue::reference(target)),
                );
                self.emit_op(Opcode::Dup, location);
            }
        }
    }
}
