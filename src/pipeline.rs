//! Pipeline driver (§2, §5): the single owner of one assembly unit's
//! source, tokens, AST, and symbol tables, from input string to a
//! type-checked `FileRoot` or a list of diagnostics.

use crate::ast::FileRoot;
use crate::diagnostics::{Diagnostic, Stage};
use crate::lexer;
use crate::parser;
use crate::source::SourceView;
use crate::typecheck::{self, symbols::SymbolTables};

pub struct Assembled {
    pub file: FileRoot,
    pub symbols: SymbolTables,
}

pub struct Pipeline;

impl Pipeline {
    /// Runs the whole front end over `text`: scan, parse, type-check.
    /// Returns the type-checked AST and symbol tables on success, or every
    /// diagnostic collected along the way on failure.
    pub fn assemble(text: &str) -> Result<Assembled, Vec<Diagnostic>> {
        let source = SourceView::new(text);
        log::debug!("assembling {} bytes of source", source.len());

        let tokens = lexer::tokenize(&source).map_err(|err| {
            vec![Diagnostic::new(Stage::Parser, err.message, err.span, &source)]
        })?;
        log::trace!("scanned source into a token stream");

        let mut file = parser::build_ast(&source, tokens).map_err(|err| vec![err.0])?;
        log::trace!("parsed file with sections present: static={} global={} code={}",
            file.static_section.is_some(), file.global_section.is_some(), file.code_section.is_some());

        let outcome = typecheck::type_check(&mut file, &source);
        if !outcome.success {
            log::debug!("type check failed with {} diagnostics", outcome.diagnostics.len());
            return Err(outcome.diagnostics);
        }
        log::debug!("type check succeeded");

        Ok(Assembled {
            file,
            symbols: outcome.symbols,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_happy_path_source() {
        let result = Pipeline::assemble("code {\n@main\n    push i32, 42\n    exit\n}\n");
        assert!(result.is_ok());
    }

    #[test]
    fn surfaces_diagnostics_on_failure() {
        let result = Pipeline::assemble("code {\n@other\n  exit\n}\n");
        let diagnostics = result.unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("missing main label"));
    }
}
