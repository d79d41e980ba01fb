//! Recursive descent parser for DI with explicit precedence climbing.
//!
//! The grammar is expression-oriented: a program is a sequence of
//! expressions separated by `EndLine` tokens, and the parser returns a
//! single root scope node. Assignment (`:=` / `=:`) binds loosest and
//! associates to the right; `**` also folds from the right; comparison,
//! additive, multiplicative, and shift chains are collected flat and folded
//! by the evaluator.

use crate::compiler::tokens::{AddOp, AssignOp, Keyword, LogicalOp, MulOp, ShiftOp, Token, TokenKind};
use di_core::ast::{ArithOp, Ident, NaryOp, Node, NumberLit, Pos, UnaryOp};
use di_core::error::{DiError, DiResult};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// The token stream must be non-empty and end with `Eof`, as produced
    /// by the lexer.
    pub fn new(tokens: Vec<Token>) -> Self {
        let tokens = if tokens.is_empty() {
            vec![Token::new(TokenKind::Eof, Pos::new(1, 1))]
        } else {
            tokens
        };
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn eat_endlines(&mut self) {
        while matches!(self.kind(), TokenKind::EndLine) {
            self.advance();
        }
    }

    /// Build a caret-aligned syntax error pointing at the current token.
    fn syntax_error(&self, reason: impl Into<String>) -> DiError {
        let prev = self
            .pos
            .checked_sub(1)
            .map(|i| self.tokens[i].kind.to_string())
            .unwrap_or_default();
        let curr = self.current().kind.to_string();
        let pad = " ".repeat(prev.chars().count() + 19);
        let carets = "^".repeat(curr.chars().count().max(1));
        DiError::static_syntax(
            self.current().pos,
            format!("parsing error: '{prev}' '{curr}'\n{pad}{carets}\n{}", reason.into()),
        )
    }

    fn expect(&mut self, expected: TokenKind, what: &str) -> DiResult<()> {
        if self.kind() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error(format!("expected {what}, found '{}'", self.kind())))
        }
    }

    fn expect_identifier(&mut self) -> DiResult<Ident> {
        if let TokenKind::Identifier(name) = self.kind() {
            let ident = Ident {
                name: name.clone(),
                pos: self.current().pos,
            };
            self.advance();
            Ok(ident)
        } else {
            Err(self.syntax_error(format!("expected an identifier, found '{}'", self.kind())))
        }
    }

    /// Parse the whole token stream into the root scope.
    pub fn parse_program(&mut self) -> DiResult<Node> {
        let mut instructions = Vec::new();
        loop {
            self.eat_endlines();
            if matches!(self.kind(), TokenKind::Eof) {
                break;
            }
            instructions.push(self.parse_expression()?);
        }
        Ok(Node::Scope(instructions, Pos::new(1, 1)))
    }

    /// One instruction, with surrounding `EndLine` separators consumed.
    pub fn parse_expression(&mut self) -> DiResult<Node> {
        self.eat_endlines();
        let node = self.parse_assignment()?;
        self.eat_endlines();
        Ok(node)
    }

    fn parse_assignment(&mut self) -> DiResult<Node> {
        let first = self.parse_logical_or()?;
        if !matches!(self.kind(), TokenKind::OpAssign(_)) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut targets = Vec::new();
        let mut orders = Vec::new();
        let mut current = first;
        while let TokenKind::OpAssign(op) = self.kind() {
            let swap = *op == AssignOp::Swap;
            self.advance();
            targets.push(current);
            orders.push(swap);
            current = self.parse_logical_or()?;
        }
        Ok(Node::Assignment {
            targets,
            orders,
            value: Box::new(current),
            pos,
        })
    }

    fn parse_logical_or(&mut self) -> DiResult<Node> {
        let first = self.parse_logical_and()?;
        if !matches!(self.kind(), TokenKind::OpLogical(LogicalOp::Or)) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut operands = vec![first];
        while matches!(self.kind(), TokenKind::OpLogical(LogicalOp::Or)) {
            self.advance();
            operands.push(self.parse_logical_and()?);
        }
        Ok(Node::Operator {
            op: NaryOp::Or,
            operands,
            pos,
        })
    }

    fn parse_logical_and(&mut self) -> DiResult<Node> {
        let first = self.parse_logical_not()?;
        if !matches!(self.kind(), TokenKind::OpLogical(LogicalOp::And)) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut operands = vec![first];
        while matches!(self.kind(), TokenKind::OpLogical(LogicalOp::And)) {
            self.advance();
            operands.push(self.parse_logical_not()?);
        }
        Ok(Node::Operator {
            op: NaryOp::And,
            operands,
            pos,
        })
    }

    fn parse_logical_not(&mut self) -> DiResult<Node> {
        if matches!(self.kind(), TokenKind::OpLogical(LogicalOp::Not)) {
            let pos = self.current().pos;
            self.advance();
            let operand = self.parse_comparison()?;
            return Ok(Node::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                pos,
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> DiResult<Node> {
        let first = self.parse_bit_or()?;
        if !matches!(self.kind(), TokenKind::OpComparison(_)) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut operands = vec![first];
        let mut ops = Vec::new();
        while let TokenKind::OpComparison(op) = self.kind() {
            ops.push(*op);
            self.advance();
            operands.push(self.parse_bit_or()?);
        }
        Ok(Node::Comparison { ops, operands, pos })
    }

    fn parse_bit_or(&mut self) -> DiResult<Node> {
        let first = self.parse_bit_xor()?;
        if !matches!(self.kind(), TokenKind::OpBitOr) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut operands = vec![first];
        while matches!(self.kind(), TokenKind::OpBitOr) {
            self.advance();
            operands.push(self.parse_bit_xor()?);
        }
        Ok(Node::Operator {
            op: NaryOp::BitOr,
            operands,
            pos,
        })
    }

    fn parse_bit_xor(&mut self) -> DiResult<Node> {
        let first = self.parse_bit_and()?;
        if !matches!(self.kind(), TokenKind::OpBitXor) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut operands = vec![first];
        while matches!(self.kind(), TokenKind::OpBitXor) {
            self.advance();
            operands.push(self.parse_bit_and()?);
        }
        Ok(Node::Operator {
            op: NaryOp::BitXor,
            operands,
            pos,
        })
    }

    fn parse_bit_and(&mut self) -> DiResult<Node> {
        let first = self.parse_shift()?;
        if !matches!(self.kind(), TokenKind::OpBitAnd) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut operands = vec![first];
        while matches!(self.kind(), TokenKind::OpBitAnd) {
            self.advance();
            operands.push(self.parse_shift()?);
        }
        Ok(Node::Operator {
            op: NaryOp::BitAnd,
            operands,
            pos,
        })
    }

    fn parse_shift(&mut self) -> DiResult<Node> {
        let first = self.parse_additive()?;
        if !matches!(self.kind(), TokenKind::OpShift(_)) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut operands = vec![first];
        let mut ops = Vec::new();
        while let TokenKind::OpShift(op) = self.kind() {
            ops.push(match op {
                ShiftOp::Shl => ArithOp::Shl,
                ShiftOp::Shr => ArithOp::Shr,
            });
            self.advance();
            operands.push(self.parse_additive()?);
        }
        Ok(Node::LeftPoly { ops, operands, pos })
    }

    fn parse_additive(&mut self) -> DiResult<Node> {
        let first = self.parse_multiplicative()?;
        if !matches!(self.kind(), TokenKind::OpAdd(_)) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut operands = vec![first];
        let mut ops = Vec::new();
        while let TokenKind::OpAdd(op) = self.kind() {
            ops.push(match op {
                AddOp::Add => ArithOp::Add,
                AddOp::Sub => ArithOp::Sub,
            });
            self.advance();
            operands.push(self.parse_multiplicative()?);
        }
        Ok(Node::LeftPoly { ops, operands, pos })
    }

    fn parse_multiplicative(&mut self) -> DiResult<Node> {
        let first = self.parse_power()?;
        if !matches!(self.kind(), TokenKind::OpMul(_)) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut operands = vec![first];
        let mut ops = Vec::new();
        while let TokenKind::OpMul(op) = self.kind() {
            ops.push(match op {
                MulOp::Mul => ArithOp::Mul,
                MulOp::Div => ArithOp::Div,
                MulOp::FloorDiv => ArithOp::FloorDiv,
                MulOp::Mod => ArithOp::Mod,
                MulOp::MatMul => ArithOp::MatMul,
            });
            self.advance();
            operands.push(self.parse_power()?);
        }
        Ok(Node::LeftPoly { ops, operands, pos })
    }

    fn parse_power(&mut self) -> DiResult<Node> {
        let first = self.parse_unary()?;
        if !matches!(self.kind(), TokenKind::OpPower) {
            return Ok(first);
        }
        let pos = first.pos();
        let mut operands = vec![first];
        while matches!(self.kind(), TokenKind::OpPower) {
            self.advance();
            operands.push(self.parse_unary()?);
        }
        // Flat operand list; evaluation folds from the right.
        Ok(Node::Operator {
            op: NaryOp::Pow,
            operands,
            pos,
        })
    }

    fn parse_unary(&mut self) -> DiResult<Node> {
        let pos = self.current().pos;
        let op = match self.kind() {
            TokenKind::OpAdd(AddOp::Add) => Some(UnaryOp::Plus),
            TokenKind::OpAdd(AddOp::Sub) => Some(UnaryOp::Minus),
            TokenKind::OpBitNot => Some(UnaryOp::BitNot),
            TokenKind::OpIndex => Some(UnaryOp::Len),
            TokenKind::OpEllipsis => {
                self.advance();
                let inner = self.parse_postfix()?;
                return Ok(Node::Ellipsis {
                    inner: Box::new(inner),
                    pos,
                });
            }
            _ => None,
        };
        match op {
            Some(op) => {
                self.advance();
                let operand = self.parse_postfix()?;
                Ok(Node::Unary {
                    op,
                    operand: Box::new(operand),
                    pos,
                })
            }
            None => self.parse_postfix(),
        }
    }

    /// Postfix chains over a single head: consecutive call groups become one
    /// `$func` layer, consecutive index groups one `$index` layer, and
    /// consecutive member accesses one `$attr` layer, so
    /// `f(a)(b)[i](c).field` parses as nested layers.
    fn parse_postfix(&mut self) -> DiResult<Node> {
        let mut head = self.parse_primary()?;
        loop {
            match self.kind() {
                TokenKind::OpenBracket => {
                    let pos = head.pos();
                    let mut groups = Vec::new();
                    while matches!(self.kind(), TokenKind::OpenBracket) {
                        groups.push(self.parse_group(
                            TokenKind::OpenBracket,
                            TokenKind::CloseBracket,
                            "a closing ')'",
                        )?);
                    }
                    head = Node::Call {
                        head: Box::new(head),
                        groups,
                        pos,
                    };
                }
                TokenKind::OpenSquare => {
                    let pos = head.pos();
                    let mut groups = Vec::new();
                    while matches!(self.kind(), TokenKind::OpenSquare) {
                        groups.push(self.parse_group(
                            TokenKind::OpenSquare,
                            TokenKind::CloseSquare,
                            "a closing ']'",
                        )?);
                    }
                    head = Node::Index {
                        head: Box::new(head),
                        groups,
                        pos,
                    };
                }
                TokenKind::OpAttr => {
                    let pos = head.pos();
                    let mut chain = Vec::new();
                    while matches!(self.kind(), TokenKind::OpAttr) {
                        self.advance();
                        chain.push(self.expect_identifier()?);
                    }
                    head = Node::Attr {
                        head: Box::new(head),
                        chain,
                        pos,
                    };
                }
                _ => break,
            }
        }
        Ok(head)
    }

    /// Comma-separated expressions between matching delimiters. Newlines
    /// are allowed after the opening delimiter and after each comma.
    fn parse_group(
        &mut self,
        open: TokenKind,
        close: TokenKind,
        close_text: &str,
    ) -> DiResult<Vec<Node>> {
        let open_text = open.to_string();
        self.expect(open, &format!("'{open_text}'"))?;
        self.eat_endlines();
        let mut items = Vec::new();
        while self.kind() != &close {
            items.push(self.parse_expression()?);
            if self.kind() == &close {
                break;
            }
            self.expect(TokenKind::Comma, "a ',' between elements")?;
            self.eat_endlines();
        }
        self.expect(close, close_text)?;
        Ok(items)
    }

    fn parse_primary(&mut self) -> DiResult<Node> {
        let pos = self.current().pos;
        let kind = self.kind().clone();
        match kind {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Node::Number(NumberLit::Int(value), pos))
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Node::Number(NumberLit::Float(value), pos))
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Node::Str(value, pos))
            }
            TokenKind::Boolean(value) => {
                self.advance();
                Ok(Node::Boolean(value, pos))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Node::Null(pos))
            }
            TokenKind::OpenSquare => {
                let elements = self.parse_group(
                    TokenKind::OpenSquare,
                    TokenKind::CloseSquare,
                    "a closing ']'",
                )?;
                Ok(Node::List(elements, pos))
            }
            TokenKind::OpenBracket => {
                self.advance();
                let node = self.parse_expression()?;
                self.expect(TokenKind::CloseBracket, "a closing ')'")?;
                Ok(node)
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Node::Identifier(Ident { name, pos }))
            }
            TokenKind::OpenBrace => self.parse_scope(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::Function) => self.parse_callable(false),
            TokenKind::Keyword(Keyword::Class) => self.parse_callable(true),
            other => Err(self.syntax_error(format!("unexpected token '{other}' in expression"))),
        }
    }

    /// A `{ … }` block, or a single expression standing in for one.
    fn parse_scope(&mut self) -> DiResult<Node> {
        if !matches!(self.kind(), TokenKind::OpenBrace) {
            let instruction = self.parse_expression()?;
            let pos = instruction.pos();
            return Ok(Node::Scope(vec![instruction], pos));
        }
        let pos = self.current().pos;
        self.advance();
        let mut instructions = Vec::new();
        loop {
            self.eat_endlines();
            if matches!(self.kind(), TokenKind::CloseBrace) {
                break;
            }
            if matches!(self.kind(), TokenKind::Eof) {
                return Err(self.syntax_error("expected '}' to close the block"));
            }
            instructions.push(self.parse_expression()?);
        }
        self.advance();
        Ok(Node::Scope(instructions, pos))
    }

    fn parse_if(&mut self) -> DiResult<Node> {
        let pos = self.current().pos;
        self.advance();
        let mut conditions = vec![self.parse_condition()?];
        let mut branches = vec![self.parse_scope()?];
        let mut else_scope = None;
        loop {
            if self.keyword_after_endlines(Keyword::Elif) {
                self.eat_endlines();
                self.advance();
                conditions.push(self.parse_condition()?);
                branches.push(self.parse_scope()?);
            } else if self.keyword_after_endlines(Keyword::Else) {
                self.eat_endlines();
                self.advance();
                else_scope = Some(Box::new(self.parse_scope()?));
                break;
            } else {
                break;
            }
        }
        Ok(Node::IfElse {
            conditions,
            branches,
            else_scope,
            pos,
        })
    }

    /// Whether an `elif`/`else` continuation follows, possibly separated by
    /// line breaks. Nothing is consumed.
    fn keyword_after_endlines(&self, kw: Keyword) -> bool {
        let mut i = self.pos;
        while matches!(self.tokens.get(i).map(|t| &t.kind), Some(TokenKind::EndLine)) {
            i += 1;
        }
        matches!(
            self.tokens.get(i).map(|t| &t.kind),
            Some(TokenKind::Keyword(k)) if *k == kw
        )
    }

    fn parse_while(&mut self) -> DiResult<Node> {
        let pos = self.current().pos;
        self.advance();
        let condition = self.parse_condition()?;
        let body = self.parse_scope()?;
        Ok(Node::While {
            condition: Box::new(condition),
            body: Box::new(body),
            pos,
        })
    }

    fn parse_condition(&mut self) -> DiResult<Node> {
        self.expect(TokenKind::OpenBracket, "a '(' before the condition")?;
        let node = self.parse_logical_or()?;
        self.expect(TokenKind::CloseBracket, "a ')' after the condition")?;
        Ok(node)
    }

    fn parse_callable(&mut self, class: bool) -> DiResult<Node> {
        let pos = self.current().pos;
        self.advance();
        self.expect(TokenKind::OpenBracket, "a '(' before the parameter list")?;
        self.eat_endlines();
        let mut params = Vec::new();
        while !matches!(self.kind(), TokenKind::CloseBracket) {
            params.push(self.expect_identifier()?);
            if matches!(self.kind(), TokenKind::CloseBracket) {
                break;
            }
            self.expect(TokenKind::Comma, "a ',' between parameters")?;
            self.eat_endlines();
        }
        self.advance();
        let body = Box::new(self.parse_scope()?);
        Ok(if class {
            Node::ClassDecl { params, body, pos }
        } else {
            Node::FunctionDecl { params, body, pos }
        })
    }
}
