//! Recursive descent parser with panic-mode recovery

use chronovyan_ast::*;
use chronovyan_diagnostics::{Diagnostics, FileId};
use chronovyan_lexer::{Lexer, Token, TokenKind};
use tracing::debug;

use crate::{ParseError, ParseResult};

pub struct Parser<'src, 'd> {
    lexer: Lexer<'src>,
    diagnostics: &'d mut Diagnostics,
    current: Token,
    previous: Token,
    next_expr_id: u32,
    /// Set after an error is reported; further reports are dropped until the
    /// parser reaches a statement boundary again
    panic_mode: bool,
    /// Number of tokens consumed so far, used to guarantee progress
    consumed: usize,
    /// Nesting depth of `{ }` blocks being parsed
    depth: usize,
    /// Recursion depth across nested statements and expressions
    nesting: usize,
}

impl<'src, 'd> Parser<'src, 'd> {
    pub fn new(source: &'src str, file: FileId, diagnostics: &'d mut Diagnostics) -> Self {
        let mut lexer = Lexer::new(source, file);
        let current = Self::next_valid(&mut lexer, diagnostics);
        let previous = current.clone();
        Self {
            lexer,
            diagnostics,
            current,
            previous,
            next_expr_id: 0,
            panic_mode: false,
            consumed: 0,
            depth: 0,
            nesting: 0,
        }
    }

    // === Token helpers ===

    /// Pull tokens until one is not an error; error tokens were already
    /// reported by the lexer
    fn next_valid(lexer: &mut Lexer<'src>, diagnostics: &mut Diagnostics) -> Token {
        loop {
            let token = lexer.next_token(diagnostics);
            if token.kind != TokenKind::Error {
                return token;
            }
        }
    }

    fn peek(&self) -> TokenKind {
        self.current.kind
    }

    /// Kind of the token after the current one
    fn peek_next(&mut self) -> TokenKind {
        self.lexer.peek_token(self.diagnostics).kind
    }

    fn advance(&mut self) -> Token {
        if self.current.kind != TokenKind::EndOfFile {
            let next = Self::next_valid(&mut self.lexer, self.diagnostics);
            self.previous = std::mem::replace(&mut self.current, next);
        } else {
            self.previous = self.current.clone();
        }
        self.consumed += 1;
        self.previous.clone()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek())
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(message))
        }
    }

    /// Like `consume`, but reports and carries on when the token is missing
    fn expect(&mut self, kind: TokenKind, message: &str) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            let err = self.error_here(message);
            self.report(err);
            false
        }
    }

    fn error_here(&self, message: &str) -> ParseError {
        ParseError::expected(message, self.current.location)
    }

    fn report(&mut self, error: ParseError) {
        if self.panic_mode {
            debug!(%error, "suppressed error while recovering");
            return;
        }
        self.panic_mode = true;
        self.diagnostics.error(error.location(), error.to_string());
    }

    /// Discard tokens until just past a `;`, or until a token that starts a
    /// statement or closes the enclosing block
    fn synchronize(&mut self) {
        self.panic_mode = false;
        let line = self.current.location.line;
        while !self.at(TokenKind::EndOfFile) {
            if self.at(TokenKind::Semicolon) {
                self.advance();
                break;
            }
            if self.peek().starts_statement() || (self.depth > 0 && self.at(TokenKind::RightBrace)) {
                break;
            }
            self.advance();
        }
        debug!(from_line = line, to_line = self.current.location.line, "synchronized");
    }

    /// Run a recursive parse one nesting level deeper, failing once
    /// `MAX_NESTING` levels are open
    fn nested<T>(
        &mut self,
        what: &'static str,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.nesting >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                what,
                location: self.current.location,
            });
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    fn make_expr(&mut self, kind: ExprKind, location: SourceLocation) -> Expr {
        let id = ExprId(self.next_expr_id);
        self.next_expr_id += 1;
        Expr::new(id, kind, location)
    }

    fn placeholder_condition(&mut self, location: SourceLocation) -> Expr {
        self.make_expr(ExprKind::Literal(Literal::Bool(true)), location)
    }

    // === Program ===

    pub fn parse(&mut self) -> Program {
        let location = self.current.location;
        let mut declarations = Vec::new();

        while !self.at(TokenKind::EndOfFile) {
            if let Some(decl) = self.declaration() {
                declarations.push(decl);
            }
        }

        debug!(
            declarations = declarations.len(),
            errors = self.diagnostics.error_count(),
            "parsed program"
        );
        Program::new(declarations, location)
    }

    /// Parse one declaration, recovering from any syntax error inside it
    ///
    /// Always consumes at least one token.
    fn declaration(&mut self) -> Option<Decl> {
        let before = self.consumed;

        let result = self.nested("Statement", |p| match p.peek() {
            TokenKind::Let | TokenKind::Const => p.var_declaration().map(Decl::Var),
            TokenKind::Function => p.function_declaration().map(Decl::Function),
            _ => p.statement().map(Decl::Stmt),
        });

        let decl = match result {
            Ok(decl) => {
                self.panic_mode = false;
                Some(decl)
            }
            Err(err) => {
                self.report(err);
                self.synchronize();
                None
            }
        };

        if self.consumed == before {
            self.advance();
        }
        decl
    }

    fn var_declaration(&mut self) -> ParseResult<VarDecl> {
        let keyword = self.advance();
        let is_const = keyword.kind == TokenKind::Const;

        let name = self.consume(TokenKind::Identifier, "Expect variable name after 'let' or 'const'")?;

        let type_annotation = if self.at(TokenKind::Colon) {
            self.advance();
            if self.at(TokenKind::Identifier) || self.peek().is_keyword() {
                let ty = self.advance();
                Some(TypeAnnotation::new(ty.lexeme, ty.location))
            } else {
                return Err(self.error_here("Expect type name after ':'"));
            }
        } else {
            None
        };

        let initializer = if self.at(TokenKind::Equal) {
            self.advance();
            Some(self.expression()?)
        } else {
            None
        };

        self.expect(TokenKind::Semicolon, "Expect ';' after variable declaration");

        Ok(VarDecl {
            name: name.lexeme,
            is_const,
            type_annotation,
            initializer,
            location: keyword.location,
            name_location: name.location,
        })
    }

    fn function_declaration(&mut self) -> ParseResult<FunctionDecl> {
        let keyword = self.advance();
        let name = self
            .consume(TokenKind::Identifier, "Expect function name after 'FUNCTION'")?
            .lexeme;
        self.consume(TokenKind::LeftParen, "Expect '(' after function name")?;

        let mut params = Vec::new();
        if !self.at(TokenKind::RightParen) {
            loop {
                let param = self.consume(TokenKind::Identifier, "Expect parameter name")?;
                params.push(Param {
                    name: param.lexeme,
                    location: param.location,
                });
                if !self.at(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters")?;

        if !self.at(TokenKind::LeftBrace) {
            return Err(self.error_here("Expect '{' before function body"));
        }
        let body = self.block();

        Ok(FunctionDecl {
            name,
            params,
            body,
            location: keyword.location,
        })
    }

    // === Statements ===

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek() {
            TokenKind::LeftBrace => {
                let block = self.block();
                let location = block.location;
                Ok(Stmt::new(StmtKind::Block(block), location))
            }
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Return => self.return_statement(),
            kind if kind.is_resource_keyword() => self.resource_statement(),
            TokenKind::ParallelExecution => self.parallel_statement(),
            TokenKind::BranchTimeline => self.branch_statement(),
            TokenKind::MergeTimelines => self.merge_statement(),
            TokenKind::RewindFlow | TokenKind::ReverseFlow => self.rewind_statement(),
            _ => self.expression_statement(),
        }
    }

    /// Parse a statement, substituting an empty block when it is missing or
    /// malformed
    fn statement_or_placeholder(&mut self, message: &str) -> Stmt {
        let location = self.current.location;
        if self.at_any(&[TokenKind::EndOfFile, TokenKind::RightBrace, TokenKind::Else]) {
            let err = self.error_here(message);
            self.report(err);
            return Stmt::empty_block(location);
        }
        match self.nested("Statement", Self::statement) {
            Ok(stmt) => stmt,
            Err(err) => {
                self.report(err);
                self.synchronize();
                Stmt::empty_block(location)
            }
        }
    }

    /// Parse a parenthesised condition, substituting `true` when it is
    /// missing or malformed
    fn condition(&mut self, message: &str) -> Expr {
        let location = self.current.location;
        if self.at(TokenKind::RightParen) {
            let err = self.error_here(message);
            self.report(err);
            return self.placeholder_condition(location);
        }
        match self.expression() {
            Ok(expr) => expr,
            Err(err) => {
                let err = match err {
                    ParseError::NestingTooDeep { .. } => err,
                    _ => ParseError::expected(message, location),
                };
                self.report(err);
                while !self.at_any(&[
                    TokenKind::RightParen,
                    TokenKind::LeftBrace,
                    TokenKind::RightBrace,
                    TokenKind::Semicolon,
                    TokenKind::EndOfFile,
                ]) {
                    self.advance();
                }
                self.placeholder_condition(location)
            }
        }
    }

    fn block(&mut self) -> Block {
        let open = self.advance();
        let mut declarations = Vec::new();

        self.depth += 1;
        while !self.at(TokenKind::RightBrace) && !self.at(TokenKind::EndOfFile) {
            if let Some(decl) = self.declaration() {
                declarations.push(decl);
            }
        }
        self.depth -= 1;

        self.expect(TokenKind::RightBrace, "Expect '}' after block");
        Block::new(declarations, open.location)
    }

    /// A `{ ... }` body, or an empty block after reporting `message`
    fn body_block(&mut self, message: &str) -> Block {
        if self.at(TokenKind::LeftBrace) {
            self.block()
        } else {
            let location = self.current.location;
            let err = self.error_here(message);
            self.report(err);
            Block::empty(location)
        }
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'")?;
        let condition = self.condition("Invalid or missing condition in if statement");
        self.expect(TokenKind::RightParen, "Expect ')' after if condition");

        let then_branch =
            self.statement_or_placeholder("Invalid or missing then branch in if statement");

        let else_branch = if self.at(TokenKind::Else) {
            self.advance();
            Some(Box::new(self.statement_or_placeholder(
                "Invalid or missing else branch in if statement",
            )))
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch: Box::new(then_branch),
                else_branch,
            },
            keyword.location,
        ))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'")?;
        let condition = self.condition("Invalid or missing condition in while statement");
        self.expect(TokenKind::RightParen, "Expect ')' after while condition");
        let body = self.statement_or_placeholder("Invalid or missing body in while statement");

        Ok(Stmt::new(
            StmtKind::While {
                condition,
                body: Box::new(body),
            },
            keyword.location,
        ))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        let value = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::Semicolon, "Expect ';' after return value");
        Ok(Stmt::new(StmtKind::Return(value), keyword.location))
    }

    fn resource_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        let op = match keyword.kind {
            TokenKind::AllocateResources => ResourceOp::Allocate,
            TokenKind::ExpendResources => ResourceOp::Expend,
            TokenKind::BorrowResources => ResourceOp::Borrow,
            _ => ResourceOp::Repay,
        };

        let mut chronons = None;
        let mut aethel = None;

        // A brace followed by CHRONON or AETHEL is the quantity list, not the body
        if self.at(TokenKind::LeftBrace)
            && matches!(self.peek_next(), TokenKind::Chronon | TokenKind::Aethel)
        {
            self.advance();
            if self.at(TokenKind::Chronon) {
                self.advance();
                self.consume(TokenKind::Colon, "Expect ':' after 'CHRONON'")?;
                chronons = Some(self.expression()?);
                if self.at(TokenKind::Comma) {
                    self.advance();
                }
            }
            if self.at(TokenKind::Aethel) {
                self.advance();
                self.consume(TokenKind::Colon, "Expect ':' after 'AETHEL'")?;
                aethel = Some(self.expression()?);
            }
            self.consume(TokenKind::RightBrace, "Expect '}' after resource specifications")?;
        }

        let body = self.body_block("Expect '{' after resource specifications");

        Ok(Stmt::new(
            StmtKind::Resource {
                op,
                chronons,
                aethel,
                body,
            },
            keyword.location,
        ))
    }

    /// Optional `( expr )` after a temporal keyword
    fn optional_count(&mut self, closing_message: &str) -> ParseResult<Option<Expr>> {
        if !self.at(TokenKind::LeftParen) {
            return Ok(None);
        }
        self.advance();
        let count = self.expression()?;
        self.expect(TokenKind::RightParen, closing_message);
        Ok(Some(count))
    }

    fn parallel_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        let thread_count = self.optional_count("Expect ')' after thread count")?;
        let body = self.body_block("Expect '{' after 'PARALLEL_EXECUTION'");
        Ok(Stmt::new(
            StmtKind::ParallelExecution { thread_count, body },
            keyword.location,
        ))
    }

    fn branch_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        let branch_count = self.optional_count("Expect ')' after branch count")?;
        let body = self.body_block("Expect '{' after 'BRANCH_TIMELINE'");
        Ok(Stmt::new(
            StmtKind::BranchTimeline { branch_count, body },
            keyword.location,
        ))
    }

    fn merge_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        self.expect(TokenKind::Semicolon, "Expect ';' after 'MERGE_TIMELINES'");
        Ok(Stmt::new(StmtKind::MergeTimelines, keyword.location))
    }

    fn rewind_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.advance();
        let (direction, name) = match keyword.kind {
            TokenKind::ReverseFlow => (FlowDirection::Reverse, "REVERSE_FLOW"),
            _ => (FlowDirection::Rewind, "REWIND_FLOW"),
        };

        self.consume(TokenKind::LeftParen, &format!("Expect '(' after '{}'", name))?;
        let condition = self.condition(&format!("Invalid or missing condition in {} statement", name));
        let max_iterations = if self.at(TokenKind::Comma) {
            self.advance();
            Some(self.expression()?)
        } else {
            None
        };
        self.expect(TokenKind::RightParen, &format!("Expect ')' after {} condition", name));
        let body = self.statement_or_placeholder(&format!("Invalid or missing body in {} statement", name));

        Ok(Stmt::new(
            StmtKind::RewindFlow {
                direction,
                condition,
                max_iterations,
                body: Box::new(body),
            },
            keyword.location,
        ))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        let location = expr.location;
        self.expect(TokenKind::Semicolon, "Expect ';' after expression");
        Ok(Stmt::new(StmtKind::Expr(expr), location))
    }

    // === Expressions ===

    pub fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let target = self.or()?;

        if !self.at(TokenKind::Equal) {
            return Ok(target);
        }
        let equals = self.advance();

        let value = match self.nested("Expression", Self::assignment) {
            Ok(value) => value,
            Err(ParseError::ExpectedExpression { location, .. }) => {
                return Err(ParseError::expected(
                    "Invalid or missing expression on right side of assignment",
                    location,
                ))
            }
            Err(err) => return Err(err),
        };

        match target.kind {
            ExprKind::Variable(name) => Ok(self.make_expr(
                ExprKind::Assign {
                    target: name,
                    value: Box::new(value),
                },
                target.location,
            )),
            _ => Err(ParseError::InvalidAssignmentTarget {
                location: equals.location,
            }),
        }
    }

    fn binary(&mut self, op: BinaryOp, left: Expr, right: Expr, location: SourceLocation) -> Expr {
        self.make_expr(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            location,
        )
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut left = self.and()?;

        while self.at(TokenKind::Or) {
            let operator = self.advance();
            let right = self.and()?;
            left = self.binary(BinaryOp::Or, left, right, operator.location);
        }

        Ok(left)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut left = self.equality()?;

        while self.at(TokenKind::And) {
            let operator = self.advance();
            let right = self.equality()?;
            left = self.binary(BinaryOp::And, left, right, operator.location);
        }

        Ok(left)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.comparison()?;

        loop {
            let op = match self.peek() {
                TokenKind::EqualEqual => BinaryOp::Eq,
                TokenKind::BangEqual => BinaryOp::Ne,
                _ => break,
            };
            let operator = self.advance();
            let right = self.comparison()?;
            left = self.binary(op, left, right, operator.location);
        }

        Ok(left)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.term()?;

        loop {
            let op = match self.peek() {
                TokenKind::Less => BinaryOp::Lt,
                TokenKind::LessEqual => BinaryOp::Le,
                TokenKind::Greater => BinaryOp::Gt,
                TokenKind::GreaterEqual => BinaryOp::Ge,
                _ => break,
            };
            let operator = self.advance();
            let right = self.term()?;
            left = self.binary(op, left, right, operator.location);
        }

        Ok(left)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut left = self.factor()?;

        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let operator = self.advance();
            let right = self.factor()?;
            left = self.binary(op, left, right, operator.location);
        }

        Ok(left)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut left = self.unary()?;

        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let operator = self.advance();
            let right = self.unary()?;
            left = self.binary(op, left, right, operator.location);
        }

        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek() {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };

        if let Some(op) = op {
            let operator = self.advance();
            let operand = self.nested("Expression", Self::unary)?;
            return Ok(self.make_expr(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                operator.location,
            ));
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        while self.at(TokenKind::LeftParen) {
            let paren = self.advance();
            let mut args = Vec::new();
            if !self.at(TokenKind::RightParen) {
                loop {
                    args.push(self.nested("Expression", Self::expression)?);
                    if !self.at(TokenKind::Comma) {
                        break;
                    }
                    self.advance();
                }
            }
            self.consume(TokenKind::RightParen, "Expect ')' after arguments")?;
            expr = self.make_expr(
                ExprKind::Call {
                    callee: Box::new(expr),
                    args,
                },
                paren.location,
            );
        }

        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        match self.peek() {
            TokenKind::Integer
            | TokenKind::Float
            | TokenKind::String
            | TokenKind::Character
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => {
                let token = self.advance();
                let literal = token.literal.unwrap_or(Literal::Null);
                Ok(self.make_expr(ExprKind::Literal(literal), token.location))
            }
            TokenKind::Identifier => {
                let token = self.advance();
                Ok(self.make_expr(ExprKind::Variable(token.lexeme), token.location))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.nested("Expression", Self::expression)?;
                self.consume(TokenKind::RightParen, "Expect ')' after expression")?;
                Ok(expr)
            }
            _ => Err(ParseError::ExpectedExpression {
                found: self.current.display_text().to_string(),
                location: self.current.location,
            }),
        }
    }
}
