//! Proteus compiler driver library
//!
//! The compilation pipeline (lex → parse → lower) with diagnostics collected
//! in one shape so the binary can render them uniformly, plus the IR dump
//! used by `--emit ir`.

use std::fmt::Write as _;

use ariadne::{Color, Label, Report, ReportKind, Source};
use proteus_ast::{Program, Span};
use proteus_ir::IrModule;
use proteus_lexer::{Lexer, TokenKind};
use tracing::debug;

/// A compile error located in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: &'static str,
    pub title: &'static str,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    /// Render as an ariadne report on stderr.
    pub fn emit(&self, filename: &str, source: &str) {
        let span = (filename, self.span.start..self.span.end);
        let _ = Report::build(ReportKind::Error, span.clone())
            .with_code(self.code)
            .with_message(self.title)
            .with_label(Label::new(span).with_message(&self.message).with_color(Color::Red))
            .finish()
            .eprint((filename, Source::from(source)));
    }
}

/// Lex and parse `source`, reporting lexical errors before parse errors.
pub fn parse(source: &str) -> Result<Program, Vec<Diagnostic>> {
    let tokens = Lexer::new(source).tokenize();

    let lex_errors: Vec<Diagnostic> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Error)
        .map(|t| Diagnostic {
            code: "E0001",
            title: "Lexical error",
            message: t.value.clone(),
            span: t.span,
        })
        .collect();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }
    debug!(tokens = tokens.len(), "lexed");

    proteus_parser::Parser::new(tokens).parse_program().map_err(|errors| {
        errors
            .into_iter()
            .map(|err| Diagnostic {
                code: "E1000",
                title: "Parse error",
                message: err.message,
                span: err.span,
            })
            .collect()
    })
}

/// Run the front end and lower the program to IR.
pub fn compile_to_ir(source: &str) -> Result<IrModule, Vec<Diagnostic>> {
    let program = parse(source)?;
    debug!(statements = program.body.stmts.len(), "parsed");

    proteus_ir::lower_program(&program).map_err(|err| {
        vec![Diagnostic {
            code: "E2000",
            title: "Code generation error",
            message: err.to_string(),
            span: err.span(),
        }]
    })
}

/// Textual IR listing.
pub fn dump_ir(module: &IrModule) -> String {
    let mut out = String::new();

    for ext in &module.extern_functions {
        let _ = writeln!(out, "extern {}{}", ext.name, ext.signature());
    }
    if !module.extern_functions.is_empty() {
        out.push('\n');
    }

    for func in &module.functions {
        let _ = write!(out, "fn {}(", func.name);
        for (i, (id, ty)) in func.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}: {}", id, ty);
        }
        let _ = writeln!(out, ") -> {} {{", func.return_type);

        for (id, ty) in func.locals.iter().skip(func.params.len()) {
            let _ = writeln!(out, "  let {}: {}", id, ty);
        }
        for block in &func.blocks {
            let _ = writeln!(out, "  {}:", block.id);
            for instr in &block.instructions {
                let _ = writeln!(out, "    {}", instr);
            }
            let _ = writeln!(out, "    {}", block.terminator);
        }
        out.push_str("}\n\n");
    }

    if !module.string_literals.is_empty() {
        out.push_str("String literals:\n");
        for (i, s) in module.string_literals.iter().enumerate() {
            let _ = writeln!(out, "  [{}] {:?}", i, s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_errors_come_first() {
        let errors = parse("x = #; y = ;").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "E0001");
        assert_eq!(errors[0].span, Span::new(4, 5, 0));
    }

    #[test]
    fn test_parse_errors_are_collected() {
        let errors = parse("x = ; y = ;").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.code == "E1000"));
    }

    #[test]
    fn test_lowering_error_has_span() {
        let errors = compile_to_ir("nope(1);").unwrap_err();
        assert_eq!(errors[0].code, "E2000");
        assert_eq!(errors[0].message, "undefined function `nope`");
        assert_eq!(errors[0].span, Span::new(0, 4, 0));
    }

    #[test]
    fn test_dump_ir() {
        let module = compile_to_ir("int add(int a, int b) { return a + b; }").unwrap();
        let text = dump_ir(&module);
        assert!(text.contains("extern getSlot fn(ptr, str, i64) -> ptr"));
        assert!(text.contains("fn add(_local0: i64, _local1: i64) -> i64 {"));
        assert!(text.contains("call newobj(const null)"));
        assert!(text.contains("fn main() -> void {"));
    }
}
