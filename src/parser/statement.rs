use crate::ast::{Expr, ExprKind, Span, Statement, StatementKind};
use crate::error;
use crate::lexer::{Token, TokenKind};
use crate::parser::expression::is_assignment_op;
use crate::parser::{ParseResult, Parser, Symbol, type_of};
use crate::typechecker;
use crate::value::{DataType, Value};

impl<'a> Parser<'a> {
    pub fn parse_statement(&mut self) -> ParseResult<Statement> {
        self.nested(Self::statement)
    }

    fn statement(&mut self) -> ParseResult<Statement> {
        match self.peek().kind {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::KeywordIf => self.parse_conditional(),
            TokenKind::KeywordWhile => self.parse_while(),
            TokenKind::KeywordFor => self.parse_for(),
            TokenKind::KeywordFun => self.parse_function(),
            _ => {
                let mut statement = self.parse_simple_statement()?;
                if self.peek().kind != TokenKind::Semicolon {
                    return Err(self.syntax_error(self.peek(), "Expected ';' after the statement"));
                }
                let semicolon = self.consume();
                statement.span = statement.span.to(&Span::from(semicolon));
                Ok(statement)
            }
        }
    }

    /// A statement that is terminated by `;`, without the `;`. Also used
    /// for the init and update clauses of `for`.
    pub(crate) fn parse_simple_statement(&mut self) -> ParseResult<Statement> {
        let token = self.peek();
        match token.kind {
            ref kind if type_of(kind).is_some() => self.parse_declaration(),
            TokenKind::Identifier(_) if is_assignment_op(&self.peek_ahead(1).kind) => {
                let (target, value, span) = self.parse_assignment_parts()?;
                Ok(Statement {
                    kind: StatementKind::Assignment { target, value },
                    span,
                })
            }
            TokenKind::KeywordPrint | TokenKind::KeywordPrintln => {
                self.consume();
                let expr = self.parse_expression()?;
                let span = Span::from(token).to(&expr.span);
                if expr.ty == DataType::Void {
                    return Err(self.type_error(&span, error::unary_type_message("print", expr.ty)));
                }
                let kind = if token.kind == TokenKind::KeywordPrint {
                    StatementKind::Print(expr)
                } else {
                    StatementKind::PrintLine(expr)
                };
                Ok(Statement { kind, span })
            }
            TokenKind::KeywordReturn => self.parse_return(),
            _ => {
                let expr = self.parse_expression()?;
                Ok(Statement {
                    span: expr.span.clone(),
                    kind: StatementKind::Expression(expr),
                })
            }
        }
    }

    fn parse_declaration(&mut self) -> ParseResult<Statement> {
        let type_token = self.consume();
        let ty = type_of(&type_token.kind).unwrap_or(DataType::Void);
        if ty == DataType::Void {
            return Err(self.syntax_error(type_token, "Variables cannot be declared void"));
        }

        let name_token = self.peek();
        let TokenKind::Identifier(name) = &name_token.kind else {
            return Err(self.syntax_error(name_token, "Expected a variable name after the type"));
        };
        self.consume();
        if self.symbols.is_declared_in_scope(name) {
            return Err(self.scope_error(name_token, &error::redeclared_message(name)));
        }

        let mut span = Span::from(type_token).to(&Span::from(name_token));
        let initializer = if self.peek().kind == TokenKind::Assign {
            self.consume();
            let value = self.parse_expression()?;
            span = span.to(&value.span);
            if !typechecker::implicit_cast(value.ty, ty) {
                let span = Span::from(name_token).to(&value.span);
                return Err(self.cast_error(&span, value.ty, ty, false));
            }
            Some(value)
        } else {
            None
        };

        // declared after the initializer so `int x = x;` sees an outer x
        self.symbols.declare(name.clone(), Symbol::Variable(ty));
        Ok(Statement {
            kind: StatementKind::NewDeclaration {
                name: name.clone(),
                ty,
                initializer,
            },
            span,
        })
    }

    fn parse_block(&mut self) -> ParseResult<Statement> {
        let open = self.consume();
        self.symbols.enter_scope();
        let (statements, close) = self.block_statements(open)?;
        self.symbols.leave_scope();

        Ok(Statement {
            kind: StatementKind::Block(statements),
            span: Span::from(open).to(&Span::from(close)),
        })
    }

    /// Statements up to and including the `}` matching `open`.
    pub(crate) fn block_statements(
        &mut self,
        open: &Token,
    ) -> ParseResult<(Vec<Statement>, &'a Token)> {
        let mut statements = vec![];
        loop {
            match self.peek().kind {
                TokenKind::RBrace => return Ok((statements, self.consume())),
                TokenKind::End => {
                    return Err(self.syntax_error(open, "The block is missing a closing '}'"));
                }
                _ => statements.push(self.parse_statement()?),
            }
        }
    }

    /// Body of a conditional or loop. A lone statement gets its own block
    /// so it has a scope like a braced body does.
    fn parse_body(&mut self) -> ParseResult<Statement> {
        if self.peek().kind == TokenKind::LBrace {
            return self.parse_block();
        }
        self.symbols.enter_scope();
        let statement = self.parse_statement()?;
        self.symbols.leave_scope();

        Ok(Statement {
            span: statement.span.clone(),
            kind: StatementKind::Block(vec![statement]),
        })
    }

    fn parse_condition(&mut self, construct: &str) -> ParseResult<Expr> {
        let condition = self.parse_expression()?;
        if condition.ty != DataType::Bool {
            let message = format!("The {construct} condition must be a bool, not {}", condition.ty);
            return Err(self.type_error(&condition.span, message));
        }
        Ok(condition)
    }

    fn parse_conditional(&mut self) -> ParseResult<Statement> {
        let if_token = self.consume();
        let mut conditions = vec![self.parse_condition("if")?];
        let mut bodies = vec![self.parse_body()?];

        loop {
            match self.peek().kind {
                TokenKind::KeywordElif => {
                    self.consume();
                    conditions.push(self.parse_condition("elif")?);
                    bodies.push(self.parse_body()?);
                }
                TokenKind::KeywordElse => {
                    let else_token = self.consume();
                    conditions.push(Expr {
                        kind: ExprKind::Literal(Value::Bool(true)),
                        ty: DataType::Bool,
                        span: Span::from(else_token),
                    });
                    bodies.push(self.parse_body()?);
                    break;
                }
                _ => break,
            }
        }

        let span = Span::from(if_token).to(&bodies[bodies.len() - 1].span);
        Ok(Statement {
            kind: StatementKind::Conditional { conditions, bodies },
            span,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        let while_token = self.consume();
        let condition = self.parse_condition("while")?;
        let body = self.parse_body()?;

        Ok(Statement {
            span: Span::from(while_token).to(&body.span),
            kind: StatementKind::While {
                condition,
                body: Box::new(body),
            },
        })
    }

    fn parse_for(&mut self) -> ParseResult<Statement> {
        let for_token = self.consume();
        self.expect(TokenKind::LParen, "Expected '(' after 'for'")?;
        self.symbols.enter_scope();

        let init = match self.peek().kind {
            TokenKind::Semicolon => None,
            _ => Some(Box::new(self.parse_simple_statement()?)),
        };
        self.expect(TokenKind::Semicolon, "Expected ';' after the loop initializer")?;
        let condition = self.parse_condition("for")?;
        self.expect(TokenKind::Semicolon, "Expected ';' after the loop condition")?;
        let update = match self.peek().kind {
            TokenKind::RParen => None,
            ref kind if type_of(kind).is_some() => {
                let message = "The loop update cannot declare a variable";
                return Err(self.syntax_error(self.peek(), message));
            }
            _ => Some(Box::new(self.parse_simple_statement()?)),
        };
        self.expect(TokenKind::RParen, "Expected ')' to close the loop header")?;
        let body = self.parse_body()?;

        self.symbols.leave_scope();
        Ok(Statement {
            span: Span::from(for_token).to(&body.span),
            kind: StatementKind::For {
                init,
                condition,
                update,
                body: Box::new(body),
            },
        })
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        let token = self.consume();
        let Some(&expected) = self.return_types.last() else {
            return Err(self.syntax_error(token, "'return' is only allowed inside a function"));
        };

        let value = match self.peek().kind {
            TokenKind::Semicolon => None,
            _ => Some(self.parse_expression()?),
        };
        let (ty, span) = match &value {
            Some(value) => (value.ty, Span::from(token).to(&value.span)),
            None => (DataType::Void, Span::from(token)),
        };
        if !typechecker::implicit_cast(ty, expected) {
            return Err(self.cast_error(&span, ty, expected, false));
        }

        Ok(Statement {
            kind: StatementKind::Return(value),
            span,
        })
    }
}
