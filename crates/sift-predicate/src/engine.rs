//! One-call parse and compile.

use sift_query::{ParseLimits, parse_with_limits};

use crate::{
    compile::{CompileOptions, Compiler},
    error::EngineError,
    predicate::Predicate,
    resolver::FieldResolver,
};

/// Parses `query` and compiles it against `resolver` with default limits and options.
///
/// Either a complete predicate tree is returned or the call fails as a whole.
pub fn parse_and_compile<R: FieldResolver + ?Sized>(
    query: &str,
    resolver: &R,
) -> Result<Predicate, EngineError> {
    Engine::default().run(query, resolver)
}

/// Parse limits and compile options bundled for repeated use.
///
/// An engine holds no per-query state and can be shared across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engine {
    /// Hard ceilings applied while parsing.
    pub limits: ParseLimits,
    /// Options applied while compiling.
    pub options: CompileOptions,
}

impl Engine {
    /// Creates an engine from explicit limits and options.
    pub fn new(limits: ParseLimits, options: CompileOptions) -> Self {
        Self { limits, options }
    }

    /// Parses and compiles one query.
    pub fn run<R: FieldResolver + ?Sized>(
        &self,
        query: &str,
        resolver: &R,
    ) -> Result<Predicate, EngineError> {
        let expr = parse_with_limits(query, &self.limits)?;
        let predicate = Compiler::new(resolver)
            .with_options(self.options)
            .compile(&expr)?;
        Ok(predicate)
    }
}
