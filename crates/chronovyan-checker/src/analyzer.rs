//! Semantic analysis over the parsed AST

use std::collections::HashMap;

use chronovyan_ast::*;
use chronovyan_diagnostics::Diagnostics;
use tracing::{debug, trace};

use crate::{BaseType, SemanticError, Symbol, SymbolKind, SymbolTable, Type};

/// Inferred type of every analyzed expression, keyed by expression id
#[derive(Debug, Clone, Default)]
pub struct ExprTypes {
    types: HashMap<ExprId, Type>,
}

impl ExprTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type of an expression; `Unknown` if it was never analyzed
    pub fn get(&self, id: ExprId) -> Type {
        self.types.get(&id).cloned().unwrap_or_default()
    }

    pub fn record(&mut self, id: ExprId, ty: Type) {
        self.types.insert(id, ty);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Walks a program, resolving names and checking types
pub struct SemanticAnalyzer<'d> {
    diagnostics: &'d mut Diagnostics,
    symbols: SymbolTable,
    types: ExprTypes,
    function_depth: usize,
}

impl<'d> SemanticAnalyzer<'d> {
    pub fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            diagnostics,
            symbols: SymbolTable::new(),
            types: ExprTypes::new(),
            function_depth: 0,
        }
    }

    /// Symbols left in the table after analysis (the global scope)
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn analyze(&mut self, program: &Program) -> ExprTypes {
        let errors_before = self.diagnostics.error_count();

        // Hoist top-level functions so calls may precede definitions
        for func in program.functions() {
            self.declare_function(func);
        }

        for decl in &program.declarations {
            match decl {
                Decl::Function(func) => self.check_function_body(func),
                other => self.check_declaration(other),
            }
        }

        debug!(
            expressions = self.types.len(),
            errors = self.diagnostics.error_count() - errors_before,
            "semantic analysis complete"
        );
        std::mem::take(&mut self.types)
    }

    fn report(&mut self, location: SourceLocation, error: SemanticError) {
        self.diagnostics.error(location, error.to_string());
    }

    fn warn(&mut self, location: SourceLocation, error: SemanticError) {
        self.diagnostics.warning(location, error.to_string());
    }

    fn check_declaration(&mut self, decl: &Decl) {
        match decl {
            Decl::Var(var) => self.check_var_decl(var),
            Decl::Function(func) => {
                self.declare_function(func);
                self.check_function_body(func);
            }
            Decl::Stmt(stmt) => self.check_statement(stmt),
        }
    }

    fn check_var_decl(&mut self, var: &VarDecl) {
        let init_type = var.initializer.as_ref().map(|init| self.check_expr(init));
        let annotated = var
            .type_annotation
            .as_ref()
            .map(|annotation| Type::from_name(&annotation.name));

        if let (Some(expected), Some(found)) = (&annotated, &init_type) {
            if !found.is_compatible_with(expected) {
                self.report(
                    var.name_location,
                    SemanticError::InitMismatch {
                        expected: expected.clone(),
                        found: found.clone(),
                    },
                );
            }
        }
        if var.is_const && var.initializer.is_none() {
            self.report(
                var.name_location,
                SemanticError::UninitializedConstant {
                    name: var.name.clone(),
                },
            );
        }

        let symbol = Symbol {
            name: var.name.clone(),
            kind: if var.is_const {
                SymbolKind::Constant
            } else {
                SymbolKind::Variable
            },
            declared_type: annotated.or(init_type).unwrap_or_default(),
            initialized: var.initializer.is_some(),
            location: var.name_location,
        };
        trace!(name = %symbol.name, ty = %symbol.declared_type, "declare variable");
        if !self.symbols.add_symbol(symbol) {
            self.report(
                var.name_location,
                SemanticError::RedeclaredVariable {
                    name: var.name.clone(),
                },
            );
        }
    }

    fn declare_function(&mut self, func: &FunctionDecl) {
        let symbol = Symbol {
            name: func.name.clone(),
            kind: SymbolKind::Function {
                arity: func.params.len(),
            },
            declared_type: Type::new(BaseType::Function),
            initialized: true,
            location: func.location,
        };
        if !self.symbols.add_symbol(symbol) {
            self.report(
                func.location,
                SemanticError::RedeclaredFunction {
                    name: func.name.clone(),
                },
            );
        }
    }

    fn check_function_body(&mut self, func: &FunctionDecl) {
        self.symbols.enter_scope();
        for param in &func.params {
            let mut symbol = Symbol::variable(&param.name, Type::unknown(), param.location);
            symbol.initialized = true;
            if !self.symbols.add_symbol(symbol) {
                self.report(
                    param.location,
                    SemanticError::RedeclaredVariable {
                        name: param.name.clone(),
                    },
                );
            }
        }

        self.function_depth += 1;
        for decl in &func.body.declarations {
            self.check_declaration(decl);
        }
        self.function_depth -= 1;
        self.symbols.exit_scope();
    }

    fn check_block(&mut self, block: &Block) {
        self.symbols.enter_scope();
        for decl in &block.declarations {
            self.check_declaration(decl);
        }
        self.symbols.exit_scope();
    }

    fn check_statement(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.check_expr(expr);
            }
            StmtKind::Block(block) => self.check_block(block),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition);
                self.check_statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_statement(else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.check_condition(condition);
                self.check_statement(body);
            }
            StmtKind::Return(value) => {
                if self.function_depth == 0 {
                    self.report(stmt.location, SemanticError::TopLevelReturn);
                }
                if let Some(value) = value {
                    self.check_expr(value);
                }
            }
            StmtKind::Resource {
                chronons,
                aethel,
                body,
                ..
            } => {
                self.check_integer(chronons.as_ref(), "Chronons value");
                self.check_integer(aethel.as_ref(), "Aethel value");
                self.check_block(body);
            }
            StmtKind::ParallelExecution { thread_count, body } => {
                self.check_integer(thread_count.as_ref(), "Thread count");
                self.check_block(body);
            }
            StmtKind::BranchTimeline { branch_count, body } => {
                self.check_integer(branch_count.as_ref(), "Branch count");
                self.check_block(body);
            }
            StmtKind::MergeTimelines => {}
            StmtKind::RewindFlow {
                condition,
                max_iterations,
                body,
                ..
            } => {
                self.check_condition(condition);
                self.check_integer(max_iterations.as_ref(), "Iteration limit");
                self.check_statement(body);
            }
        }
    }

    fn check_condition(&mut self, condition: &Expr) {
        let ty = self.check_expr(condition);
        if !ty.is_boolean() && !ty.is_unknown() {
            self.report(condition.location, SemanticError::NonBooleanCondition);
        }
    }

    fn check_integer(&mut self, expr: Option<&Expr>, what: &'static str) {
        let Some(expr) = expr else { return };
        let ty = self.check_expr(expr);
        if !ty.is_integer_like() && !ty.is_unknown() {
            self.report(expr.location, SemanticError::NonIntegerCount { what });
        }
    }

    // Recursion depth is bounded by the parser's `MAX_NESTING`
    fn check_expr(&mut self, expr: &Expr) -> Type {
        let ty = self.infer_expr(expr);
        self.types.record(expr.id, ty.clone());
        ty
    }

    fn infer_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Literal(literal) => Type::of_literal(literal),
            ExprKind::Variable(name) => self.check_variable(name, expr.location),
            ExprKind::Unary { op, operand } => {
                let operand_type = self.check_expr(operand);
                match Type::unary_result(*op, &operand_type) {
                    Some(ty) => ty,
                    None => {
                        self.report(
                            expr.location,
                            SemanticError::InvalidUnaryOperand {
                                op: op.symbol(),
                                operand: operand_type,
                            },
                        );
                        Type::unknown()
                    }
                }
            }
            ExprKind::Binary { op, left, right } => {
                let left_type = self.check_expr(left);
                let right_type = self.check_expr(right);
                match Type::binary_result(*op, &left_type, &right_type) {
                    Some(ty) => ty,
                    None => {
                        self.report(
                            expr.location,
                            SemanticError::InvalidBinaryOperands {
                                op: op.symbol(),
                                left: left_type,
                                right: right_type,
                            },
                        );
                        Type::unknown()
                    }
                }
            }
            ExprKind::Call { callee, args } => {
                self.check_call(callee, args.len());
                for arg in args {
                    self.check_expr(arg);
                }
                Type::unknown()
            }
            ExprKind::Assign { target, value } => {
                let value_type = self.check_expr(value);
                self.check_assignment(target, &value_type, expr.location);
                value_type
            }
        }
    }

    fn check_variable(&mut self, name: &str, location: SourceLocation) -> Type {
        let Some(symbol) = self.symbols.lookup_symbol(name) else {
            self.report(
                location,
                SemanticError::UndefinedVariable {
                    name: name.to_string(),
                },
            );
            return Type::unknown();
        };
        let ty = symbol.declared_type.clone();
        if !symbol.initialized {
            self.warn(
                location,
                SemanticError::UninitializedUse {
                    name: name.to_string(),
                },
            );
        }
        ty
    }

    fn check_call(&mut self, callee: &Expr, argc: usize) {
        let Some(name) = callee.as_variable() else {
            self.check_expr(callee);
            self.report(callee.location, SemanticError::UnsupportedCallTarget);
            return;
        };
        let arity = match self.symbols.lookup_symbol(name) {
            None => {
                self.report(
                    callee.location,
                    SemanticError::UndefinedFunction {
                        name: name.to_string(),
                    },
                );
                self.types.record(callee.id, Type::unknown());
                return;
            }
            Some(symbol) => match symbol.kind {
                SymbolKind::Function { arity } => Some(arity),
                _ => None,
            },
        };

        if let Some(expected) = arity {
            if expected != argc {
                self.report(
                    callee.location,
                    SemanticError::ArityMismatch {
                        name: name.to_string(),
                        expected,
                        found: argc,
                    },
                );
            }
            self.types.record(callee.id, Type::new(BaseType::Function));
        } else {
            self.check_expr(callee);
            self.report(
                callee.location,
                SemanticError::NotAFunction {
                    name: name.to_string(),
                },
            );
        }
    }

    fn check_assignment(&mut self, target: &str, value_type: &Type, location: SourceLocation) {
        let Some(symbol) = self.symbols.lookup_symbol_mut(target) else {
            self.report(
                location,
                SemanticError::UndefinedVariable {
                    name: target.to_string(),
                },
            );
            return;
        };

        let error = match symbol.kind {
            SymbolKind::Constant => Some(SemanticError::AssignToConstant {
                name: target.to_string(),
            }),
            _ if !value_type.is_compatible_with(&symbol.declared_type) => {
                Some(SemanticError::AssignMismatch {
                    name: target.to_string(),
                    expected: symbol.declared_type.clone(),
                    found: value_type.clone(),
                })
            }
            _ => {
                symbol.initialized = true;
                None
            }
        };
        if let Some(error) = error {
            self.report(location, error);
        }
    }
}
