pub mod eval;


use tracing::{debug, trace};

use std::io::Write;
use std::rc::Rc;

use crate::ast::{Place, Program, Statement, StatementKind};
use crate::config::Config;
use crate::error::RuntimeError;
use crate::symbol_table::SymbolTable;
use crate::value::Value;

/// Where control goes after a statement has run.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    /// A `return` is on its way to the nearest call boundary.
    Return(Value),
}

/// Tree-walking executor for checked programs. Scopes are entered and left
/// exactly where the parser entered and left them, so every [`Place`] the
/// parser resolved lands on the same binding here.
pub struct Interpreter<W: Write> {
    symbols: SymbolTable<Value>,
    out: W,
    call_depth: usize,
    max_call_depth: usize,
    // nested evaluate/execute steps, bounded to stay inside the stack
    frames: usize,
    max_frames: usize,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W, config: &Config) -> Self {
        Interpreter {
            symbols: SymbolTable::new(),
            out,
            call_depth: 0,
            max_call_depth: config.max_call_depth,
            frames: 0,
            max_frames: config.max_frames(),
        }
    }

    pub fn execute_program(&mut self, program: &Program) -> Result<(), RuntimeError> {
        // a top-level `return` never parses, so the flow is always Normal
        self.execute_block(&program.statements)?;
        self.out.flush()?;
        debug!(statements = program.statements.len(), "program finished");
        Ok(())
    }

    pub fn execute(&mut self, statement: &Statement) -> Result<Flow, RuntimeError> {
        self.descend(statement.span.start_line + 1, |this| this.execute_kind(statement))
    }

    fn execute_kind(&mut self, statement: &Statement) -> Result<Flow, RuntimeError> {
        match &statement.kind {
            StatementKind::Expression(expr) => {
                self.evaluate(expr)?;
            }
            StatementKind::Print(expr) => {
                let value = self.evaluate(expr)?;
                write!(self.out, "{value}")?;
            }
            StatementKind::PrintLine(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{value}")?;
            }

            StatementKind::Conditional { conditions, bodies } => {
                for (condition, body) in conditions.iter().zip(bodies) {
                    if self.evaluate(condition)?.as_bool() {
                        return self.execute(body);
                    }
                }
            }

            StatementKind::While { condition, body } => {
                while self.evaluate(condition)?.as_bool() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }

            StatementKind::For {
                init,
                condition,
                update,
                body,
            } => {
                return self.scoped(|this| {
                    if let Some(init) = init
                        && let Flow::Return(value) = this.execute(init)?
                    {
                        return Ok(Flow::Return(value));
                    }
                    while this.evaluate(condition)?.as_bool() {
                        if let Flow::Return(value) = this.execute(body)? {
                            return Ok(Flow::Return(value));
                        }
                        if let Some(update) = update
                            && let Flow::Return(value) = this.execute(update)?
                        {
                            return Ok(Flow::Return(value));
                        }
                    }
                    Ok(Flow::Normal)
                });
            }

            StatementKind::NewDeclaration {
                name,
                ty,
                initializer,
            } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?.cast(*ty),
                    None => Value::zero(*ty),
                };
                self.symbols.declare(name.clone(), value);
            }

            StatementKind::Assignment { target, value } => {
                let value = self.evaluate(value)?;
                self.store(target, value);
            }

            StatementKind::FunctionDeclaration(function) => {
                trace!(name = %function.name, "bound function");
                self.symbols
                    .declare(function.name.clone(), Value::Function(Rc::clone(function)));
            }

            StatementKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Void,
                };
                return Ok(Flow::Return(value));
            }

            StatementKind::Block(statements) => {
                return self.scoped(|this| this.execute_block(statements));
            }
        }
        Ok(Flow::Normal)
    }

    /// Runs statements in order until one of them returns.
    pub(crate) fn execute_block(&mut self, statements: &[Statement]) -> Result<Flow, RuntimeError> {
        for statement in statements {
            if let Flow::Return(value) = self.execute(statement)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    /// Runs `step` one frame deeper, failing once the frame budget is spent.
    pub(crate) fn descend<T>(
        &mut self,
        line: usize,
        step: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        if self.frames >= self.max_frames {
            return Err(RuntimeError::StackExhausted {
                limit: self.max_frames,
                line,
            });
        }
        self.frames += 1;
        let result = step(self);
        self.frames -= 1;
        result
    }

    /// Runs `body` in a fresh scope that is left again even when `body` fails.
    fn scoped<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        self.symbols.enter_scope();
        let result = body(self);
        self.symbols.leave_scope();
        result
    }

    pub(crate) fn load(&self, place: &Place) -> Value {
        match self.symbols.get_at(place.scope, &place.name) {
            Some(value) => value.clone(),
            None => unreachable!("checked program lost the binding '{}'", place.name),
        }
    }

    /// Writes through a resolved place and returns the value as stored.
    pub(crate) fn store(&mut self, place: &Place, value: Value) -> Value {
        match self.symbols.assign(place.scope, &place.name, value) {
            Ok(stored) => stored,
            Err(error) => unreachable!("checked program lost a binding: {error}"),
        }
    }
}
