use tracing::trace;

use std::rc::Rc;

use crate::ast::{Expr, ExprKind, Function, Span, Statement, StatementKind};
use crate::error;
use crate::lexer::{Token, TokenKind};
use crate::parser::{ParseResult, Parser, Symbol, type_of};
use crate::typechecker;
use crate::value::DataType;

impl<'a> Parser<'a> {
    /// `fun name(type a, type b) -> type { ... }`
    pub fn parse_function(&mut self) -> ParseResult<Statement> {
        let fun_token = self.consume();

        let name_token = self.peek();
        let TokenKind::Identifier(name) = &name_token.kind else {
            return Err(self.syntax_error(name_token, "Expected a function name after 'fun'"));
        };
        self.consume();
        if self.symbols.is_declared_in_scope(name) {
            return Err(self.scope_error(name_token, &error::redeclared_message(name)));
        }

        self.expect(TokenKind::LParen, "Expected '(' after the function name")?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, "Expected ',' or ')' after a parameter")?;
        self.expect(TokenKind::Arrow, "Expected '->' and a return type after the parameters")?;

        let type_token = self.consume();
        let Some(return_type) = type_of(&type_token.kind) else {
            return Err(self.syntax_error(type_token, "Expected a return type after '->'"));
        };
        let open = self.expect(TokenKind::LBrace, "Expected '{' to open the function body")?;

        // bound before the body so the function can call itself
        self.symbols.declare(
            name.clone(),
            Symbol::Function {
                params: params.iter().map(|(_, ty, _)| *ty).collect(),
                return_type,
            },
        );

        self.symbols.enter_scope();
        for (param, ty, token) in &params {
            if self.symbols.is_declared_in_scope(param) {
                return Err(self.scope_error(token, &error::redeclared_message(param)));
            }
            self.symbols.declare(param.clone(), Symbol::Variable(*ty));
        }
        self.return_types.push(return_type);
        let (body, close) = self.block_statements(open)?;
        self.return_types.pop();
        self.symbols.leave_scope();

        trace!(name = %name, params = params.len(), %return_type, "parsed function");

        let function = Function {
            name: name.clone(),
            params: params
                .into_iter()
                .map(|(param, ty, _)| (param, ty))
                .collect(),
            return_type,
            body,
        };
        Ok(Statement {
            kind: StatementKind::FunctionDeclaration(Rc::new(function)),
            span: Span::from(fun_token).to(&Span::from(close)),
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<(String, DataType, &'a Token)>> {
        let mut params = vec![];
        if self.peek().kind == TokenKind::RParen {
            return Ok(params);
        }

        loop {
            let type_token = self.consume();
            let ty = match type_of(&type_token.kind) {
                Some(ty) if ty != DataType::Void => ty,
                _ => return Err(self.syntax_error(type_token, "Expected a parameter type")),
            };

            let name_token = self.peek();
            let TokenKind::Identifier(param) = &name_token.kind else {
                return Err(
                    self.syntax_error(name_token, "Expected a parameter name after its type")
                );
            };
            self.consume();
            params.push((param.clone(), ty, name_token));

            if self.peek().kind != TokenKind::Comma {
                return Ok(params);
            }
            self.consume();
        }
    }

    /// `name(args)` with the cursor on `(`.
    pub(crate) fn parse_call(&mut self, name: &'a Token) -> ParseResult<Expr> {
        let callee = self.place(name)?;
        let Ok(Symbol::Function {
            params,
            return_type,
        }) = self.symbols.get(&callee.name).cloned()
        else {
            return Err(self.type_error(
                &Span::from(name),
                error::unary_type_message("function call", callee.ty),
            ));
        };

        let open = self.consume();
        let mut args = vec![];
        if self.peek().kind != TokenKind::RParen {
            loop {
                args.push(self.parse_expression()?);
                if self.peek().kind != TokenKind::Comma {
                    break;
                }
                self.consume();
            }
        }
        if self.peek().kind != TokenKind::RParen {
            return Err(self.syntax_error(open, "The function call is missing a ')'"));
        }
        let close = self.consume();
        let span = Span::from(name).to(&Span::from(close));

        if args.len() != params.len() {
            let message = format!(
                "The function '{}' takes {} argument(s) but {} were given",
                callee.name,
                params.len(),
                args.len()
            );
            return Err(self.type_error(&span, message));
        }
        for (arg, &param) in args.iter().zip(&params) {
            if !typechecker::implicit_cast(arg.ty, param) {
                return Err(self.cast_error(&arg.span, arg.ty, param, false));
            }
        }

        Ok(Expr {
            kind: ExprKind::Call { callee, args },
            ty: return_type,
            span,
        })
    }
}
