//! SWC compiler backend implementation.
//!
//! Parses TypeScript/JSX, strips types, lowers JSX and emits ES module code
//! with an optional v3 source map. The map is either returned alongside the
//! code or, for `SourceMapKind::Inline`, also embedded as a base64 data URL.

#![allow(clippy::default_trait_access)]

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::spec::{EsTarget, JsxRuntime, MediaType, ModuleKind, SourceMapKind};
use super::{CompilerBackend, CompilerError, Diagnostic, TranspileOutput, TranspileSpec};

/// SWC-based compiler backend.
///
/// `SwcBackend` is `Send + Sync`; every call to `transpile` builds its own
/// `SourceMap` and globals, so calls are independent.
#[derive(Debug, Clone, Default)]
pub struct SwcBackend {
    _private: (),
}

impl SwcBackend {
    /// Create a new SWC backend with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl CompilerBackend for SwcBackend {
    fn name(&self) -> &'static str {
        "swc"
    }

    fn transpile(
        &self,
        spec: &TranspileSpec,
        source: &str,
    ) -> Result<TranspileOutput, CompilerError> {
        if spec.module == ModuleKind::CommonJS {
            return Err(CompilerError::unsupported(
                "CommonJS output is not supported, use ESM",
            ));
        }

        let media_type = spec.effective_media_type();
        if matches!(media_type, MediaType::Json | MediaType::Wasm) {
            return Err(CompilerError::unsupported(format!(
                "cannot transpile {} as a script module",
                spec.input_path.display()
            )));
        }

        compile_with_swc(spec, source, media_type.is_typescript(), media_type.is_jsx())
    }
}

fn compile_with_swc(
    spec: &TranspileSpec,
    source: &str,
    is_ts: bool,
    is_jsx: bool,
) -> Result<TranspileOutput, CompilerError> {
    use swc_common::{
        comments::SingleThreadedComments, sync::Lrc, FileName, Globals, Mark, SourceMap, Spanned,
        GLOBALS,
    };
    use swc_ecma_ast::{EsVersion, Program};
    use swc_ecma_codegen::{text_writer::JsWriter, Emitter};
    use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};
    use swc_ecma_transforms_base::{fixer::fixer, hygiene::hygiene, resolver};
    use swc_ecma_transforms_react::{react, Options as ReactOptions, Runtime};
    use swc_ecma_transforms_typescript::strip;
    use swc_ecma_visit::FoldWith;

    let cm: Lrc<SourceMap> = Default::default();

    let fm = cm.new_source_file(
        Lrc::new(FileName::Real(spec.input_path.clone())),
        source.to_string(),
    );

    let syntax = if is_ts {
        Syntax::Typescript(TsSyntax {
            tsx: is_jsx,
            decorators: true,
            ..Default::default()
        })
    } else {
        Syntax::Es(EsSyntax {
            jsx: is_jsx,
            decorators: true,
            ..Default::default()
        })
    };

    let target = match spec.target {
        EsTarget::ES2015 => EsVersion::Es2015,
        EsTarget::ES2016 => EsVersion::Es2016,
        EsTarget::ES2017 => EsVersion::Es2017,
        EsTarget::ES2018 => EsVersion::Es2018,
        EsTarget::ES2019 => EsVersion::Es2019,
        EsTarget::ES2020 => EsVersion::Es2020,
        EsTarget::ES2021 => EsVersion::Es2021,
        EsTarget::ES2022 => EsVersion::Es2022,
        EsTarget::ESNext => EsVersion::EsNext,
    };

    let comments = SingleThreadedComments::default();

    let lexer = Lexer::new(syntax, target, StringInput::from(&*fm), Some(&comments));
    let mut parser = Parser::new_from(lexer);

    let to_diagnostic = |e: &swc_ecma_parser::error::Error| {
        let loc = cm.lookup_char_pos(e.span().lo);
        Diagnostic::error(e.kind().msg()).with_location(
            spec.input_path.clone(),
            loc.line as u32,
            loc.col.0 as u32 + 1,
        )
    };

    let module = parser.parse_module().map_err(|e| {
        CompilerError::parse_error(format!("Failed to parse {}", spec.input_path.display()))
            .with_diagnostics(vec![to_diagnostic(&e)])
    })?;

    let recovered: Vec<Diagnostic> = parser.take_errors().iter().map(to_diagnostic).collect();
    if !recovered.is_empty() {
        return Err(CompilerError::parse_error(format!(
            "Failed to parse {}",
            spec.input_path.display()
        ))
        .with_diagnostics(recovered));
    }

    let output = GLOBALS.set(&Globals::default(), || {
        let unresolved_mark = Mark::new();
        let top_level_mark = Mark::new();

        let mut program = Program::Module(module);
        program = program.fold_with(&mut resolver(unresolved_mark, top_level_mark, is_ts));

        if is_ts {
            program = program.fold_with(&mut strip(unresolved_mark, top_level_mark));
        }

        let mut module = match program {
            Program::Module(m) => m,
            Program::Script(s) => swc_ecma_ast::Module {
                span: s.span,
                body: s
                    .body
                    .into_iter()
                    .map(swc_ecma_ast::ModuleItem::Stmt)
                    .collect(),
                shebang: s.shebang,
            },
        };

        if is_jsx {
            let runtime = match spec.jsx_runtime {
                JsxRuntime::Automatic => Runtime::Automatic,
                JsxRuntime::Classic => Runtime::Classic,
            };

            let react_options = ReactOptions {
                runtime: Some(runtime),
                import_source: Some(spec.jsx_import_source.clone()),
                ..Default::default()
            };

            module = module.fold_with(&mut react(
                cm.clone(),
                Some(&comments),
                react_options,
                top_level_mark,
                unresolved_mark,
            ));
        }

        module = module.fold_with(&mut hygiene());
        module = module.fold_with(&mut fixer(Some(&comments)));

        module
    });

    let mut buf = Vec::new();
    let mut src_map_buf = Vec::new();

    {
        let writer = JsWriter::new(cm.clone(), "\n", &mut buf, Some(&mut src_map_buf));

        let mut emitter = Emitter {
            cfg: swc_ecma_codegen::Config::default().with_target(target),
            cm: cm.clone(),
            comments: Some(&comments),
            wr: writer,
        };

        emitter
            .emit_module(&output)
            .map_err(|e| CompilerError::transform_error(format!("Failed to emit: {e}")))?;
    }

    let mut code = String::from_utf8(buf)
        .map_err(|e| CompilerError::transform_error(format!("Invalid UTF-8 output: {e}")))?;

    let source_map = match spec.sourcemaps {
        SourceMapKind::None => None,
        SourceMapKind::Inline | SourceMapKind::External => {
            let srcmap = cm.build_source_map(&src_map_buf);
            let mut map_buf = Vec::new();
            srcmap.to_writer(&mut map_buf).map_err(|e| {
                CompilerError::transform_error(format!("Failed to write source map: {e}"))
            })?;
            Some(String::from_utf8(map_buf).map_err(|e| {
                CompilerError::transform_error(format!("Invalid UTF-8 source map: {e}"))
            })?)
        }
    };

    if let (SourceMapKind::Inline, Some(map)) = (spec.sourcemaps, &source_map) {
        if !code.ends_with('\n') {
            code.push('\n');
        }
        code.push_str(&inline_source_map_comment(map));
    }

    let mut output = TranspileOutput::new(code).with_module(spec.module);
    if let Some(map) = source_map {
        output = output.with_source_map(map);
    }
    Ok(output)
}

/// `//# sourceMappingURL=` comment embedding `map` as a base64 data URL.
fn inline_source_map_comment(map: &str) -> String {
    format!(
        "//# sourceMappingURL=data:application/json;base64,{}",
        STANDARD.encode(map)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swc_backend_name() {
        assert_eq!(SwcBackend::new().name(), "swc");
    }

    #[test]
    fn test_transpile_empty_source() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("src/app.ts");

        let output = backend.transpile(&spec, "").unwrap();
        assert_eq!(output.code, "");
        assert!(output.source_map.is_none());
    }

    #[test]
    fn test_empty_source_still_gets_inline_map() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("/deno/remote/empty.ts").with_sourcemaps(SourceMapKind::Inline);

        let output = backend.transpile(&spec, "").unwrap();
        assert!(output
            .code
            .contains("//# sourceMappingURL=data:application/json;base64,"));
        assert!(output.source_map.unwrap().contains("\"version\":3"));
    }

    #[test]
    fn test_transpile_simple_js() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("src/app.js");

        let output = backend.transpile(&spec, "const x = 1;").unwrap();
        assert!(output.code.contains("const x = 1;"));
        assert!(output.source_map.is_none());
    }

    #[test]
    fn test_transpile_strips_as_expression() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("/proj/file.ts").with_sourcemaps(SourceMapKind::Inline);

        let output = backend
            .transpile(&spec, "export const a = 1 as number;")
            .unwrap();

        assert!(output.code.contains("export const a = 1;"));
        assert!(!output.code.contains("as number"));
        assert!(output
            .code
            .contains("//# sourceMappingURL=data:application/json;base64,"));
        assert_eq!(output.module, ModuleKind::ESM);

        let map = output.source_map.unwrap();
        assert!(map.contains("\"version\":3"));
        assert!(map.contains("file.ts"));
    }

    #[test]
    fn test_transpile_typescript() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("src/app.ts");

        let source = r#"
            interface User {
                name: string;
                age: number;
            }
            const user: User = { name: "Alice", age: 30 };
            console.log(user.name);
        "#;

        let output = backend.transpile(&spec, source).unwrap();

        assert!(!output.code.contains("interface"));
        assert!(!output.code.contains(": User"));
        assert!(output.code.contains("const user"));
        assert!(output.code.contains("console.log"));
    }

    #[test]
    fn test_transpile_uses_media_type_for_extensionless_cache_file() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("/deno/remote/https/deno.land/8a1c2f")
            .with_media_type(MediaType::TypeScript);

        let output = backend
            .transpile(&spec, "export function id<T>(x: T): T { return x; }")
            .unwrap();

        assert!(output.code.contains("export function id(x)"));
    }

    #[test]
    fn test_transpile_tsx_automatic() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("src/App.tsx").with_jsx_runtime(JsxRuntime::Automatic);

        let source = r"
            interface Props {
                name: string;
            }
            export function Greeting({ name }: Props) {
                return <h1>Hello, {name}!</h1>;
            }
        ";

        let output = backend.transpile(&spec, source).unwrap();

        assert!(!output.code.contains("interface"));
        assert!(!output.code.contains("<h1>"));
        assert!(output.code.contains("react/jsx-runtime"));
        assert!(output.code.contains("function Greeting"));
    }

    #[test]
    fn test_transpile_tsx_custom_import_source() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("src/App.tsx").with_jsx_import_source("preact");

        let output = backend
            .transpile(&spec, "export const App = () => <main>hi</main>;")
            .unwrap();

        assert!(output.code.contains("preact/jsx-runtime"));
        assert!(!output.code.contains("react/jsx-runtime"));
    }

    #[test]
    fn test_transpile_jsx_classic() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("src/App.jsx").with_jsx_runtime(JsxRuntime::Classic);

        let source = r"
            function App() {
                return <div>Hello</div>;
            }
        ";

        let output = backend.transpile(&spec, source).unwrap();

        assert!(output.code.contains("createElement"));
        assert!(!output.code.contains("<div"));
    }

    #[test]
    fn test_external_source_map_is_not_inlined() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("src/app.ts").with_sourcemaps(SourceMapKind::External);

        let output = backend.transpile(&spec, "const x: number = 42;").unwrap();

        assert!(output.source_map.is_some());
        assert!(!output.code.contains("sourceMappingURL"));
    }

    #[test]
    fn test_parse_error_has_location() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("src/app.ts");

        let err = backend.transpile(&spec, "const x = {").unwrap_err();

        assert_eq!(err.code, "COMPILER_PARSE_ERROR");
        assert!(!err.diagnostics.is_empty());
        assert_eq!(err.diagnostics[0].line, Some(1));
    }

    #[test]
    fn test_commonjs_is_unsupported() {
        let backend = SwcBackend::new();
        let spec = TranspileSpec::new("src/app.js").with_module(ModuleKind::CommonJS);

        let err = backend.transpile(&spec, "export const x = 1;").unwrap_err();
        assert_eq!(err.code, "COMPILER_UNSUPPORTED");
    }

    #[test]
    fn test_inline_comment_round_trips() {
        let comment = inline_source_map_comment("{\"version\":3}");
        let encoded = comment
            .strip_prefix("//# sourceMappingURL=data:application/json;base64,")
            .unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"{\"version\":3}");
    }
}
