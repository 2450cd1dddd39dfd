pub mod expression;
pub mod function;
pub mod statement;


use tracing::debug;

use crate::ast::{Place, Program, Span};
use crate::config::Config;
use crate::error::{self, CompileError, ErrorKind};
use crate::lexer::{Token, TokenKind};
use crate::source::Source;
use crate::symbol_table::SymbolTable;
use crate::value::DataType;

pub type ParseResult<T> = Result<T, CompileError>;

/// What the checker knows about a name while parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable(DataType),
    Function {
        params: Vec<DataType>,
        return_type: DataType,
    },
}

impl Symbol {
    pub fn ty(&self) -> DataType {
        match self {
            Symbol::Variable(ty) => *ty,
            Symbol::Function { .. } => DataType::Function,
        }
    }
}

/// Single-pass parser and static checker. Declarations and scope changes
/// take effect in `symbols` as soon as they are parsed.
pub struct Parser<'a> {
    tokens: &'a [Token],
    cursor: usize,
    source: &'a Source,
    symbols: SymbolTable<Symbol>,
    // return types of the functions being parsed, innermost last
    return_types: Vec<DataType>,
    depth: usize,
    max_depth: usize,
}

/// Type named by a type keyword.
pub fn type_of(kind: &TokenKind) -> Option<DataType> {
    match kind {
        TokenKind::KeywordInt => Some(DataType::Int),
        TokenKind::KeywordDouble => Some(DataType::Double),
        TokenKind::KeywordBool => Some(DataType::Bool),
        TokenKind::KeywordChar => Some(DataType::Char),
        TokenKind::KeywordString => Some(DataType::String),
        TokenKind::KeywordVoid => Some(DataType::Void),
        _ => None,
    }
}

impl<'a> Parser<'a> {
    /// `tokens` must end with the `TokenKind::End` marker produced by the lexer.
    pub fn new(tokens: &'a [Token], source: &'a Source, config: &Config) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|token| &token.kind),
            Some(TokenKind::End)
        ));
        Parser {
            tokens,
            cursor: 0,
            source,
            symbols: SymbolTable::new(),
            return_types: vec![],
            depth: 0,
            max_depth: config.max_nesting_depth,
        }
    }

    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut statements = vec![];
        while self.peek().kind != TokenKind::End {
            statements.push(self.parse_statement()?);
        }
        debug!(statements = statements.len(), file = %self.source.name, "parsed program");
        Ok(Program { statements })
    }

    pub(crate) fn peek(&self) -> &'a Token {
        self.peek_ahead(0)
    }

    pub(crate) fn peek_ahead(&self, offset: usize) -> &'a Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.cursor + offset).min(last)]
    }

    /// Returns the current token and advances, staying put on the end marker.
    pub(crate) fn consume(&mut self) -> &'a Token {
        let token = self.peek();
        if token.kind != TokenKind::End {
            self.cursor += 1;
        }
        token
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> ParseResult<&'a Token> {
        if self.peek().kind == kind {
            Ok(self.consume())
        } else {
            Err(self.syntax_error(self.peek(), message))
        }
    }

    /// Runs `parse` one nesting level deeper, failing once the limit is hit.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.chained(|this| {
            this.deepen()?;
            parse(this)
        })
    }

    /// Runs `parse`, which may [`Parser::deepen`] once per link of a
    /// left-leaning chain, and restores the nesting level afterwards.
    pub(crate) fn chained<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let outer = self.depth;
        let result = parse(self);
        self.depth = outer;
        result
    }

    pub(crate) fn deepen(&mut self) -> ParseResult<()> {
        if self.depth >= self.max_depth {
            let message = format!("Nesting exceeds the limit of {} levels", self.max_depth);
            return Err(self.syntax_error(self.peek(), &message));
        }
        self.depth += 1;
        Ok(())
    }

    /// Resolves an identifier token against the visible scopes.
    pub(crate) fn place(&self, token: &Token) -> ParseResult<Place> {
        let name = token.lexeme.as_str();
        let scope = self
            .symbols
            .resolve(name)
            .ok_or_else(|| self.scope_error(token, &error::undeclared_message(name)))?;
        let ty = self
            .symbols
            .get_at(scope, name)
            .map_or(DataType::Void, Symbol::ty);

        Ok(Place {
            name: name.to_string(),
            scope,
            ty,
        })
    }

    /// Like [`Parser::place`] but rejects bindings that cannot be written.
    pub(crate) fn assignable(&self, token: &Token) -> ParseResult<Place> {
        let place = self.place(token)?;
        if place.ty == DataType::Function {
            return Err(self.type_error(
                &Span::from(token),
                error::unary_type_message("assignment", place.ty),
            ));
        }
        Ok(place)
    }

    pub(crate) fn error(
        &self,
        kind: ErrorKind,
        span: &Span,
        element: &str,
        message: &str,
    ) -> CompileError {
        CompileError::new(
            kind,
            self.source,
            (span.start_line, span.end_line),
            span.range.clone(),
            element,
            message,
        )
    }

    pub(crate) fn syntax_error(&self, token: &Token, message: &str) -> CompileError {
        let element = if token.kind == TokenKind::End {
            "end of input"
        } else {
            token.lexeme.as_str()
        };
        self.error(ErrorKind::Syntax, &Span::from(token), element, message)
    }

    pub(crate) fn scope_error(&self, token: &Token, message: &str) -> CompileError {
        self.error(ErrorKind::StaticScope, &Span::from(token), &token.lexeme, message)
    }

    pub(crate) fn type_error(&self, span: &Span, message: String) -> CompileError {
        let element = self.source.slice(&span.range);
        self.error(ErrorKind::StaticType, span, element, &message)
    }

    pub(crate) fn cast_error(
        &self,
        span: &Span,
        from: DataType,
        to: DataType,
        explicit: bool,
    ) -> CompileError {
        let element = self.source.slice(&span.range);
        let message = error::cast_message(from, to, explicit);
        self.error(ErrorKind::StaticCast, span, element, &message)
    }
}
