use crate::ast::{
    ArithmeticOp, BinaryOp, BitLogicalOp, ComparisonOp, Expr, ExprKind, IncrementOp, OperatorName,
    Place, Span, UnaryOp,
};
use crate::error;
use crate::lexer::{Number, Token, TokenKind};
use crate::parser::{ParseResult, Parser, type_of};
use crate::typechecker;
use crate::value::{DataType, Value};

type Level<'a> = fn(&mut Parser<'a>) -> ParseResult<Expr>;

pub(crate) fn is_assignment_op(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Assign
            | TokenKind::AddAssign
            | TokenKind::SubAssign
            | TokenKind::MulAssign
            | TokenKind::PowerAssign
            | TokenKind::DivAssign
            | TokenKind::ModAssign
            | TokenKind::AndAssign
            | TokenKind::OrAssign
            | TokenKind::XorAssign
            | TokenKind::ShiftLeftAssign
            | TokenKind::ShiftRightAssign
    )
}

/// Operator a compound assignment applies before storing. `&=`, `|=` and `^=`
/// on a bool target are the logical forms.
fn compound_op(kind: &TokenKind, target: DataType) -> Option<BinaryOp> {
    use ArithmeticOp::*;
    use BitLogicalOp::*;

    let logical = target == DataType::Bool;
    Some(match kind {
        TokenKind::AddAssign => BinaryOp::Arithmetic(Add),
        TokenKind::SubAssign => BinaryOp::Arithmetic(Sub),
        TokenKind::MulAssign => BinaryOp::Arithmetic(Mul),
        TokenKind::PowerAssign => BinaryOp::Arithmetic(Power),
        TokenKind::DivAssign => BinaryOp::Arithmetic(Div),
        TokenKind::ModAssign => BinaryOp::Arithmetic(Mod),
        TokenKind::AndAssign => BinaryOp::BitLogical(if logical { And } else { BitAnd }),
        TokenKind::OrAssign => BinaryOp::BitLogical(if logical { Or } else { BitOr }),
        TokenKind::XorAssign => BinaryOp::BitLogical(if logical { Xor } else { BitXor }),
        TokenKind::ShiftLeftAssign => BinaryOp::BitLogical(ShiftLeft),
        TokenKind::ShiftRightAssign => BinaryOp::BitLogical(ShiftRight),
        _ => return None,
    })
}

fn literal(value: Value, at: &Token) -> Expr {
    Expr {
        ty: value.data_type(),
        kind: ExprKind::Literal(value),
        span: Span::from(at),
    }
}

impl<'a> Parser<'a> {
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.nested(Self::parse_assignment)
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        if matches!(self.peek().kind, TokenKind::Identifier(_))
            && is_assignment_op(&self.peek_ahead(1).kind)
        {
            let (target, value, span) = self.parse_assignment_parts()?;
            return Ok(Expr {
                ty: target.ty,
                kind: ExprKind::Assignment {
                    target,
                    value: Box::new(value),
                },
                span,
            });
        }

        let expr = self.parse_logic_or()?;
        if is_assignment_op(&self.peek().kind) {
            return Err(self.syntax_error(
                self.peek(),
                "The left side of an assignment must be a variable",
            ));
        }
        Ok(expr)
    }

    /// Parses `name op value` with the cursor on `name`. Compound operators
    /// are expanded to `name = name op value`.
    pub(crate) fn parse_assignment_parts(&mut self) -> ParseResult<(Place, Expr, Span)> {
        let name = self.consume();
        let op = self.consume();
        let target = self.assignable(name)?;
        let rhs = self.parse_expression()?;

        let value = match compound_op(&op.kind, target.ty) {
            Some(binary) => {
                let current = Expr {
                    kind: ExprKind::Variable(target.clone()),
                    ty: target.ty,
                    span: Span::from(name),
                };
                self.binary(binary, current, rhs)?
            }
            None => rhs,
        };

        let span = Span::from(name).to(&value.span);
        if !typechecker::implicit_cast(value.ty, target.ty) {
            return Err(self.cast_error(&span, value.ty, target.ty, false));
        }
        Ok((target, value, span))
    }

    /// Type checks and builds a two-operand node.
    pub(crate) fn binary(&self, op: BinaryOp, left: Expr, right: Expr) -> ParseResult<Expr> {
        let span = left.span.to(&right.span);
        let Some(ty) = typechecker::binary(op, left.ty, right.ty) else {
            let message = error::binary_type_message(op.name(), left.ty, right.ty);
            return Err(self.type_error(&span, message));
        };

        let (left, right) = (Box::new(left), Box::new(right));
        let kind = match op {
            BinaryOp::Arithmetic(op) => ExprKind::Arithmetic { op, left, right },
            BinaryOp::BitLogical(op) => ExprKind::BitLogical { op, left, right },
            BinaryOp::Comparison(op) => ExprKind::Comparison { op, left, right },
        };
        Ok(Expr { kind, ty, span })
    }

    /// One left-associative precedence level. Each operator puts the tree
    /// one level deeper, so it counts against the nesting limit.
    fn binary_level(
        &mut self,
        next: Level<'a>,
        operator: fn(&TokenKind) -> Option<BinaryOp>,
    ) -> ParseResult<Expr> {
        self.chained(|this| {
            let mut head = next(this)?;
            while let Some(op) = operator(&this.peek().kind) {
                this.deepen()?;
                this.consume();
                let right = next(this)?;
                head = this.binary(op, head, right)?;
            }
            Ok(head)
        })
    }

    fn parse_logic_or(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::parse_logic_xor, |kind| match kind {
            TokenKind::Or => Some(BinaryOp::BitLogical(BitLogicalOp::Or)),
            _ => None,
        })
    }

    fn parse_logic_xor(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::parse_logic_and, |kind| match kind {
            TokenKind::Xor => Some(BinaryOp::BitLogical(BitLogicalOp::Xor)),
            _ => None,
        })
    }

    fn parse_logic_and(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::parse_bit_or, |kind| match kind {
            TokenKind::And => Some(BinaryOp::BitLogical(BitLogicalOp::And)),
            _ => None,
        })
    }

    fn parse_bit_or(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::parse_bit_xor, |kind| match kind {
            TokenKind::BitOr => Some(BinaryOp::BitLogical(BitLogicalOp::BitOr)),
            _ => None,
        })
    }

    fn parse_bit_xor(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::parse_bit_and, |kind| match kind {
            TokenKind::BitXor => Some(BinaryOp::BitLogical(BitLogicalOp::BitXor)),
            _ => None,
        })
    }

    fn parse_bit_and(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::parse_equality, |kind| match kind {
            TokenKind::BitAnd => Some(BinaryOp::BitLogical(BitLogicalOp::BitAnd)),
            _ => None,
        })
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::parse_relational, |kind| match kind {
            TokenKind::Eq => Some(BinaryOp::Comparison(ComparisonOp::Eq)),
            TokenKind::NotEq => Some(BinaryOp::Comparison(ComparisonOp::NotEq)),
            _ => None,
        })
    }

    fn parse_relational(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::parse_shift, |kind| match kind {
            TokenKind::Less => Some(BinaryOp::Comparison(ComparisonOp::Less)),
            TokenKind::LessEq => Some(BinaryOp::Comparison(ComparisonOp::LessEq)),
            TokenKind::Greater => Some(BinaryOp::Comparison(ComparisonOp::Greater)),
            TokenKind::GreaterEq => Some(BinaryOp::Comparison(ComparisonOp::GreaterEq)),
            _ => None,
        })
    }

    fn parse_shift(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::parse_additive, |kind| match kind {
            TokenKind::ShiftLeft => Some(BinaryOp::BitLogical(BitLogicalOp::ShiftLeft)),
            TokenKind::ShiftRight => Some(BinaryOp::BitLogical(BitLogicalOp::ShiftRight)),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::parse_multiplicative, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Arithmetic(ArithmeticOp::Add)),
            TokenKind::Minus => Some(BinaryOp::Arithmetic(ArithmeticOp::Sub)),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        self.binary_level(Self::parse_exponent, |kind| match kind {
            TokenKind::Mul => Some(BinaryOp::Arithmetic(ArithmeticOp::Mul)),
            TokenKind::Div => Some(BinaryOp::Arithmetic(ArithmeticOp::Div)),
            TokenKind::Mod => Some(BinaryOp::Arithmetic(ArithmeticOp::Mod)),
            _ => None,
        })
    }

    // right-associative: 2 ** 3 ** 2 is 2 ** 9
    fn parse_exponent(&mut self) -> ParseResult<Expr> {
        let base = self.parse_prefix()?;
        if self.peek().kind != TokenKind::Power {
            return Ok(base);
        }
        self.consume();
        let exponent = self.nested(Self::parse_exponent)?;
        self.binary(BinaryOp::Arithmetic(ArithmeticOp::Power), base, exponent)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        let token = self.peek();
        let op = match token.kind {
            TokenKind::Increment | TokenKind::Decrement => {
                self.consume();
                let name = self.peek();
                let TokenKind::Identifier(_) = name.kind else {
                    return Err(
                        self.syntax_error(name, "Prefix operator expects a variable argument")
                    );
                };
                self.consume();
                let op = if token.kind == TokenKind::Increment {
                    IncrementOp::PrefixIncrement
                } else {
                    IncrementOp::PrefixDecrement
                };
                return self.increment(op, name, Span::from(token).to(&Span::from(name)));
            }
            TokenKind::LParen if self.is_cast() => return self.parse_cast(),
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Not => UnaryOp::Not,
            TokenKind::BitNot => UnaryOp::BitNot,
            _ => return self.parse_postfix(),
        };

        self.consume();
        let operand = self.nested(Self::parse_prefix)?;
        let span = Span::from(token).to(&operand.span);
        let Some(ty) = typechecker::unary(op, operand.ty) else {
            return Err(self.type_error(&span, error::unary_type_message(op.name(), operand.ty)));
        };

        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
            span,
        })
    }

    // `(type)` directly after the cursor
    fn is_cast(&self) -> bool {
        type_of(&self.peek_ahead(1).kind).is_some() && self.peek_ahead(2).kind == TokenKind::RParen
    }

    fn parse_cast(&mut self) -> ParseResult<Expr> {
        let open = self.consume();
        let target = type_of(&self.consume().kind).unwrap_or(DataType::Void);
        self.consume();

        let operand = self.nested(Self::parse_prefix)?;
        let span = Span::from(open).to(&operand.span);
        if !typechecker::explicit_cast(operand.ty, target) {
            return Err(self.cast_error(&span, operand.ty, target, true));
        }

        Ok(Expr {
            kind: ExprKind::Cast {
                target,
                operand: Box::new(operand),
            },
            ty: target,
            span,
        })
    }

    fn increment(&self, op: IncrementOp, name: &Token, span: Span) -> ParseResult<Expr> {
        let target = self.place(name)?;
        let Some(ty) = typechecker::increment(target.ty) else {
            return Err(self.type_error(&span, error::unary_type_message(op.name(), target.ty)));
        };
        Ok(Expr {
            kind: ExprKind::Increment { op, target },
            ty,
            span,
        })
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let token = self.peek();
        let head = if let TokenKind::Identifier(_) = token.kind {
            self.consume();
            match self.peek().kind {
                TokenKind::LParen => self.parse_call(token)?,
                TokenKind::Increment | TokenKind::Decrement => {
                    let op_token = self.consume();
                    let op = if op_token.kind == TokenKind::Increment {
                        IncrementOp::PostfixIncrement
                    } else {
                        IncrementOp::PostfixDecrement
                    };
                    self.increment(op, token, Span::from(token).to(&Span::from(op_token)))?
                }
                _ => self.variable(token)?,
            }
        } else {
            self.parse_primary()?
        };

        self.chained(|this| {
            let mut head = head;
            while this.peek().kind == TokenKind::LBracket {
                this.deepen()?;
                head = this.parse_string_access(head)?;
            }
            Ok(head)
        })
    }

    fn variable(&self, token: &Token) -> ParseResult<Expr> {
        let place = self.place(token)?;
        Ok(Expr {
            ty: place.ty,
            kind: ExprKind::Variable(place),
            span: Span::from(token),
        })
    }

    /// `s[i]` or `s[start:end]`, either bound of a slice optional.
    fn parse_string_access(&mut self, receiver: Expr) -> ParseResult<Expr> {
        let open = self.consume();
        if receiver.ty != DataType::String {
            let span = receiver.span.to(&Span::from(open));
            return Err(self.type_error(
                &span,
                error::unary_type_message("string indexing", receiver.ty),
            ));
        }

        let start = if self.peek().kind == TokenKind::Colon {
            literal(Value::Int(0), self.peek())
        } else {
            self.index_bound(&receiver)?
        };

        let end = if self.peek().kind == TokenKind::Colon {
            self.consume();
            if self.peek().kind == TokenKind::RBracket {
                // -1 runs through the last character
                Some(literal(Value::Int(-1), self.peek()))
            } else {
                Some(self.index_bound(&receiver)?)
            }
        } else {
            None
        };

        if self.peek().kind != TokenKind::RBracket {
            return Err(self.syntax_error(self.peek(), "String access must end with ']'"));
        }
        let close = self.consume();

        Ok(Expr {
            ty: if end.is_some() {
                DataType::String
            } else {
                DataType::Char
            },
            span: receiver.span.to(&Span::from(close)),
            kind: ExprKind::ArrayAccess {
                receiver: Box::new(receiver),
                start: Box::new(start),
                end: end.map(Box::new),
            },
        })
    }

    fn index_bound(&mut self, receiver: &Expr) -> ParseResult<Expr> {
        let bound = self.parse_expression()?;
        if !typechecker::index(bound.ty) {
            let span = receiver.span.to(&bound.span);
            return Err(self.type_error(
                &span,
                error::unary_type_message("string indexing", bound.ty),
            ));
        }
        Ok(bound)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek();
        let value = match &token.kind {
            TokenKind::Number(Number::Int(i)) => Value::Int(*i),
            TokenKind::Number(Number::Double(d)) => Value::Double(*d),
            TokenKind::Bool(b) => Value::Bool(*b),
            TokenKind::Char(c) => Value::Char(*c),
            TokenKind::Str(s) => Value::Str(s.clone()),
            TokenKind::Identifier(_) => {
                self.consume();
                return self.variable(token);
            }
            TokenKind::LParen => {
                self.consume();
                let inner = self.parse_expression()?;
                if self.peek().kind != TokenKind::RParen {
                    let message = "Expected ')' to close the parenthesized expression";
                    return Err(self.syntax_error(self.peek(), message));
                }
                let close = self.consume();
                return Ok(Expr {
                    ty: inner.ty,
                    kind: ExprKind::Grouped(Box::new(inner)),
                    span: Span::from(token).to(&Span::from(close)),
                });
            }
            TokenKind::End => {
                let message = "Expected an expression but reached the end of input";
                return Err(self.syntax_error(token, message));
            }
            _ => return Err(self.syntax_error(token, "Expected an expression")),
        };

        self.consume();
        Ok(literal(value, token))
    }
}
