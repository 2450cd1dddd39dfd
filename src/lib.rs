pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod symbol_table;
pub mod typechecker;
pub mod value;

use std::io::Write;
use std::panic;
use std::thread;

use crate::config::Config;
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::source::Source;

/// Lexes, checks and runs a whole program, writing its output to `out`.
pub fn run<W: Write + Send>(source: &Source, out: W, config: &Config) -> Result<(), Error> {
    with_stack(config, || -> Result<(), Error> {
        let tokens = lexer::lex(source)?;
        let program = Parser::new(&tokens, source, config).parse_program()?;
        Interpreter::new(out, config).execute_program(&program)?;
        Ok(())
    })
    .map_err(Error::Thread)?
}

/// Runs `task` on a thread whose stack holds the deepest nesting and call
/// chain `config` permits, so hitting a limit is an error and not a crash.
pub fn with_stack<T: Send>(
    config: &Config,
    task: impl FnOnce() -> T + Send,
) -> std::io::Result<T> {
    thread::scope(|scope| {
        let handle = thread::Builder::new()
            .name("pebble".to_string())
            .stack_size(config.stack_size())
            .spawn_scoped(scope, task)?;
        match handle.join() {
            Ok(value) => Ok(value),
            Err(payload) => panic::resume_unwind(payload),
        }
    })
}
