//! The compile driver.
//!
//! A compile call moves through these states:
//!
//! ```text
//! Idle ──► Converting ──┬──► Succeeded(description)
//!                       ├──► Aborted(diagnostic)      conversion failed, reported
//!                       └──► FatalError(propagated)   generation failed, reported
//! ```
//!
//! Conversion failures of a script are contained by the session and come
//! back as [`CompileOutcome::Aborted`]. Anything that goes wrong while
//! lowering is reported and then always returned as
//! [`CompileError::Generation`].

use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;

use kiln_diagnostic::{
    CallTrace, ColorMode, Diagnostic, DiagnosticEmitter, ErrorCode, TerminalEmitter, TraceFrame,
};
use kiln_ir::{CompileConfig, ConfigRegistry, EvalContext, Tree};
use kiln_plugins::{global_registry, PluginRegistry};

use crate::errors::GENERATION_FAILED;
use crate::lower::{
    DescriptionLowering, LowerError, LowerRequest, Lowering, MethodDescription, EVAL_SCRIPT_NAME,
    SCRIPT_NAME,
};
use crate::{CompileError, CompileResult, Node, NodeRegistry, Session};

/// File name used for eval'd strings when the caller gives none.
pub const DEFAULT_EVAL_FILE: &str = "(eval)";

/// Turns source text into a tree.
pub trait SourceParser {
    fn parse(&self, source: &str, file: &str, line: u32) -> Result<Tree, String>;
}

impl<F> SourceParser for F
where
    F: Fn(&str, &str, u32) -> Result<Tree, String>,
{
    fn parse(&self, source: &str, file: &str, line: u32) -> Result<Tree, String> {
        self(source, file, line)
    }
}

/// What a compile call starts from.
#[derive(Clone, Debug)]
pub enum CompileInput<'s> {
    /// Source text, handed to the configured parser.
    Source(&'s str),
    /// An already parsed tree.
    Tree(Tree),
}

impl<'s> From<&'s str> for CompileInput<'s> {
    fn from(source: &'s str) -> Self {
        CompileInput::Source(source)
    }
}

impl From<Tree> for CompileInput<'_> {
    fn from(tree: Tree) -> Self {
        CompileInput::Tree(tree)
    }
}

/// Non-fatal result of a compile call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompileOutcome {
    Succeeded(MethodDescription),
    /// Conversion failed; the diagnostic has already been emitted.
    Aborted(Diagnostic),
}

impl CompileOutcome {
    pub fn description(&self) -> Option<&MethodDescription> {
        match self {
            CompileOutcome::Succeeded(description) => Some(description),
            CompileOutcome::Aborted(_) => None,
        }
    }

    pub fn into_description(self) -> Option<MethodDescription> {
        match self {
            CompileOutcome::Succeeded(description) => Some(description),
            CompileOutcome::Aborted(_) => None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, CompileOutcome::Aborted(_))
    }
}

/// Compiles trees (or source, given a parser) into method descriptions.
pub struct Compiler<'r, E = TerminalEmitter<io::Stderr>> {
    config: Arc<CompileConfig>,
    nodes: NodeRegistry,
    plugins: &'r PluginRegistry,
    parser: Option<Box<dyn SourceParser + 'r>>,
    lowering: Box<dyn Lowering + 'r>,
    emitter: E,
}

impl Compiler<'static> {
    /// A compiler with the core nodes, the built-in plugins, the default
    /// lowering, and diagnostics on stderr.
    pub fn new(config: Arc<CompileConfig>) -> Self {
        let is_tty = io::stderr().is_terminal();
        Compiler {
            config,
            nodes: NodeRegistry::with_core(),
            plugins: global_registry(),
            parser: None,
            lowering: Box::new(DescriptionLowering),
            emitter: TerminalEmitter::stderr(ColorMode::Auto, is_tty),
        }
    }

    /// A compiler using a snapshot of the process-wide config.
    pub fn from_global_config() -> Self {
        Self::new(ConfigRegistry::global().snapshot())
    }
}

impl<'r, E: DiagnosticEmitter> Compiler<'r, E> {
    /// Send diagnostics to `emitter` instead.
    pub fn with_emitter<E2: DiagnosticEmitter>(self, emitter: E2) -> Compiler<'r, E2> {
        Compiler {
            config: self.config,
            nodes: self.nodes,
            plugins: self.plugins,
            parser: self.parser,
            lowering: self.lowering,
            emitter,
        }
    }

    /// Resolve plugins from `registry` instead of the built-in one.
    pub fn with_plugin_registry<'q>(self, registry: &'q PluginRegistry) -> Compiler<'q, E>
    where
        'r: 'q,
    {
        Compiler {
            config: self.config,
            nodes: self.nodes,
            plugins: registry,
            parser: self.parser,
            lowering: self.lowering,
            emitter: self.emitter,
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: impl SourceParser + 'r) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    #[must_use]
    pub fn with_lowering(mut self, lowering: impl Lowering + 'r) -> Self {
        self.lowering = Box::new(lowering);
        self
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Mutable config for the next compile. Sessions already built keep
    /// their own snapshot.
    pub fn config_mut(&mut self) -> &mut CompileConfig {
        Arc::make_mut(&mut self.config)
    }

    /// Node registry, for registering more constructs.
    pub fn nodes_mut(&mut self) -> &mut NodeRegistry {
        &mut self.nodes
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn into_emitter(self) -> E {
        self.emitter
    }

    /// Compile `input`.
    ///
    /// Without a context the tree is converted as a script named
    /// `__script__`. With one, it is converted for that live activation
    /// and named `__eval_script__`.
    pub fn compile<'s>(
        &mut self,
        input: impl Into<CompileInput<'s>>,
        context: Option<EvalContext>,
        source_name: &str,
        start_line: u32,
    ) -> CompileResult<CompileOutcome> {
        let name = if context.is_some() {
            EVAL_SCRIPT_NAME
        } else {
            SCRIPT_NAME
        };
        self.compile_named(input.into(), context, source_name, start_line, name)
    }

    /// Compile an already parsed tree.
    pub fn compile_tree(
        &mut self,
        tree: Tree,
        context: Option<EvalContext>,
        source_name: &str,
        start_line: u32,
    ) -> CompileResult<CompileOutcome> {
        self.compile(tree, context, source_name, start_line)
    }

    /// Compile a string for eval. The result is always named
    /// `__eval_script__`, with or without a context.
    pub fn compile_string(
        &mut self,
        source: &str,
        context: Option<EvalContext>,
        file: &str,
        line: u32,
    ) -> CompileResult<CompileOutcome> {
        self.compile_named(
            CompileInput::Source(source),
            context,
            file,
            line,
            EVAL_SCRIPT_NAME,
        )
    }

    /// Read and compile a file as a script, enabling `flags` first.
    pub fn compile_file<I, S>(
        &mut self,
        path: impl AsRef<Path>,
        flags: I,
    ) -> CompileResult<CompileOutcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = path.as_ref();
        self.config_mut().apply_flags(flags);
        let source = fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = path.display().to_string();
        self.compile_named(CompileInput::Source(&source), None, &file, 1, SCRIPT_NAME)
    }

    #[tracing::instrument(
        level = "debug",
        skip(self, input, context),
        fields(eval = context.is_some())
    )]
    fn compile_named(
        &mut self,
        input: CompileInput<'_>,
        context: Option<EvalContext>,
        source_name: &str,
        start_line: u32,
        name: &str,
    ) -> CompileResult<CompileOutcome> {
        let tree = match input {
            CompileInput::Tree(tree) => tree,
            CompileInput::Source(source) => self.parse(source, source_name, start_line)?,
        };

        let mut session = Session::new(Arc::clone(&self.config), &self.nodes, self.plugins, context)?;
        session.set_position(source_name, start_line);

        let result = self.run(&mut session, &tree, name, source_name, start_line);
        let diagnostics = session.take_diagnostics();
        drop(session);

        self.emitter.emit_all(&diagnostics);
        self.emitter.flush();
        result
    }

    fn parse(&self, source: &str, file: &str, line: u32) -> CompileResult<Tree> {
        let Some(parser) = &self.parser else {
            return Err(CompileError::Parse {
                file: file.to_string(),
                message: "no source parser configured".to_string(),
            });
        };
        parser
            .parse(source, file, line)
            .map_err(|message| CompileError::Parse {
                file: file.to_string(),
                message,
            })
    }

    fn run(
        &self,
        session: &mut Session<'_>,
        tree: &Tree,
        name: &str,
        file: &str,
        first_line: u32,
    ) -> CompileResult<CompileOutcome> {
        let body = if session.is_eval() {
            session.convert_eval(tree)?
        } else {
            match session.into_script(tree)? {
                Some(body) => body,
                None => {
                    let diagnostic = session.diagnostics().last().cloned().unwrap_or_else(|| {
                        Diagnostic::error(ErrorCode::E9001)
                            .with_message("compilation aborted without a diagnostic")
                    });
                    return Ok(CompileOutcome::Aborted(diagnostic));
                }
            }
        };
        self.generate(session, name, file, first_line, body)
            .map(CompileOutcome::Succeeded)
    }

    /// Lower `body`. Every failure is reported and re-raised as a
    /// generation error; one that already is passes through unreported.
    #[tracing::instrument(level = "debug", skip(self, session, body))]
    fn generate(
        &self,
        session: &mut Session<'_>,
        name: &str,
        file: &str,
        first_line: u32,
        body: Node,
    ) -> CompileResult<MethodDescription> {
        let request = LowerRequest {
            name,
            file,
            first_line,
            body,
            scope: session.scope(),
            config: session.config(),
        };
        match self.lowering.lower(request) {
            Ok(description) => Ok(description),
            Err(LowerError::Generation(message)) => Err(CompileError::Generation { message }),
            Err(LowerError::Failed {
                kind,
                message,
                trace,
            }) => {
                let position = session.position().clone();
                let trace = if trace.is_empty() {
                    CallTrace::new(vec![TraceFrame::new(name, Some(position.clone()))])
                } else {
                    trace
                };
                let diagnostic = Diagnostic::error(ErrorCode::E5001)
                    .with_message(message)
                    .with_origin(kind)
                    .with_location(position)
                    .with_note("bytecode generation error")
                    .with_trace(trace);
                session.report(diagnostic);
                Err(CompileError::Generation {
                    message: GENERATION_FAILED.to_string(),
                })
            }
        }
    }
}
