//! Main module for promptc library functionality

pub mod ast;
pub mod compiler;
pub mod config;
pub mod emitter;
pub mod formats;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod source;

#[cfg(test)]
pub mod testing;
