//! Builder pattern API for String method generation.
//!
//! Provides a fluent interface for configuring and running one generation:
//!
//! ```rust,ignore
//! use enumstr_core::prelude::*;
//!
//! let generation = Enumstr::new("/path/to/package")
//!     .types(["Color", "Shape"])
//!     .output("-")
//!     .run()?;
//!
//! for diagnostic in generation.diagnostics() {
//!     eprintln!("enumstr: {}", diagnostic);
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analysis::{analyze_package, Package};
use crate::config::EnumstrConfig;
use crate::constraint::BuildContext;
use crate::error::{EnumstrError, EnumstrResult, Stage};
use crate::extract::{extract_constants, retain_package_types, TypeRegistry};
use crate::generate::{generate_source, HandlebarsRenderer};
use crate::logging::log_failure;
use crate::output::OutputTarget;
use crate::scan::gather_go_files;
use crate::select::{select_types, InclusionFilter, Selection};

/// Progress of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Analyzing,
    Extracting,
    Selecting,
    Rendering,
    Writing,
    Done,
    Failed { stage: Stage, cause: String },
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::Extracting => write!(f, "extracting"),
            Self::Selecting => write!(f, "selecting"),
            Self::Rendering => write!(f, "rendering"),
            Self::Writing => write!(f, "writing"),
            Self::Done => write!(f, "done"),
            Self::Failed { stage, .. } => write!(f, "failed while {}", stage),
        }
    }
}

/// Builder for configuring a generation run.
///
/// # Example
///
/// ```rust,ignore
/// let generation = Enumstr::new("./color")
///     .types(["Color"])
///     .generate()?;
/// print!("{}", generation.source);
/// ```
#[derive(Debug, Clone)]
pub struct Enumstr {
    /// Package directory
    dir: PathBuf,

    /// Requested type names; empty means every exported type
    types: Vec<String>,

    /// Output name as given by the user
    output: Option<String>,

    /// Extra build tags
    tags: Vec<String>,

    state: RunState,

    history: Vec<RunState>,
}

impl Enumstr {
    /// Create a new builder for the package in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            types: Vec::new(),
            output: None,
            tags: Vec::new(),
            state: RunState::Idle,
            history: vec![RunState::Idle],
        }
    }

    /// Apply the values set in a configuration.
    pub fn with_config(mut self, config: &EnumstrConfig) -> Self {
        if let Some(types) = &config.types {
            self.types = types.clone();
        }
        if let Some(output) = &config.output {
            self.output = Some(output.clone());
        }
        if let Some(tags) = &config.tags {
            self.tags = tags.clone();
        }
        self
    }

    /// Restrict generation to these types.
    pub fn types(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.types = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the output file; `-` means standard output.
    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Add build tags used when selecting source files.
    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current state of the run.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// States entered by the latest run, starting at `Idle`.
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Analyze the package and extract its constants.
    pub fn analyze(&mut self) -> EnumstrResult<Analysis> {
        self.begin();
        let analyzed = self.analyze_stage()?;
        self.transition(RunState::Done);
        Ok(Analysis {
            package: analyzed.package.name,
            registry: analyzed.registry,
        })
    }

    /// Analyze and filter; nothing is rendered.
    pub fn select(&mut self) -> EnumstrResult<Selected> {
        self.begin();
        let analyzed = self.analyze_stage()?;
        let selection = self.select_stage(&analyzed);
        self.transition(RunState::Done);
        Ok(Selected {
            package: analyzed.package.name,
            selection,
        })
    }

    /// Produce the generated source without writing it.
    pub fn generate(&mut self) -> EnumstrResult<Generation> {
        self.begin();
        let generation = self.generation_stages()?;
        self.transition(RunState::Done);
        Ok(generation)
    }

    /// Generate and write to the output target.
    pub fn run(&mut self) -> EnumstrResult<Generation> {
        self.begin();
        let generation = self.generation_stages()?;
        self.transition(RunState::Writing);
        generation
            .target
            .write(&generation.source)
            .map_err(|e| self.fail(Stage::Writing, e))?;
        self.transition(RunState::Done);
        Ok(generation)
    }

    fn analyze_stage(&mut self) -> EnumstrResult<Analyzed> {
        self.transition(RunState::Analyzing);
        let dir = self.dir.clone();
        let ctx = BuildContext::host().with_tags(self.tags.clone());
        let package = gather_go_files(&dir, &ctx)
            .and_then(|units| analyze_package(&dir, &units))
            .map_err(|e| self.fail(Stage::Analyzing, e))?;
        info!(
            event = "package_analyzed",
            package = %package.name,
            files = package.files.len(),
            "analyzed package"
        );

        self.transition(RunState::Extracting);
        let registry = extract_constants(&package);
        debug!(
            types = registry.len(),
            constants = registry.constant_count(),
            "extracted constants"
        );
        Ok(Analyzed { package, registry })
    }

    fn select_stage(&mut self, analyzed: &Analyzed) -> Selection {
        self.transition(RunState::Selecting);
        let candidates = retain_package_types(&analyzed.registry, &analyzed.package);
        select_types(&candidates, InclusionFilter::from_names(&self.types))
    }

    fn render_stage(&mut self, package: &str, selection: &Selection) -> EnumstrResult<String> {
        self.transition(RunState::Rendering);
        HandlebarsRenderer::new()
            .and_then(|renderer| generate_source(package, selection, &renderer))
            .map_err(|e| self.fail(Stage::Rendering, e))
    }

    /// Everything up to a rendered file; the caller finishes the run.
    fn generation_stages(&mut self) -> EnumstrResult<Generation> {
        let analyzed = self.analyze_stage()?;
        let selection = self.select_stage(&analyzed);
        let package = analyzed.package.name;
        let source = self.render_stage(&package, &selection)?;
        let target = OutputTarget::resolve(&self.dir, &package, self.output.as_deref());
        Ok(Generation {
            package,
            selection,
            source,
            target,
        })
    }

    fn begin(&mut self) {
        self.state = RunState::Idle;
        self.history.clear();
        self.history.push(RunState::Idle);
    }

    fn transition(&mut self, next: RunState) {
        debug!(event = "state_transition", from = %self.state, to = %next);
        self.history.push(next.clone());
        self.state = next;
    }

    fn fail(&mut self, stage: Stage, err: EnumstrError) -> EnumstrError {
        log_failure(stage, &err);
        self.transition(RunState::Failed {
            stage,
            cause: err.to_string(),
        });
        err
    }
}

struct Analyzed {
    package: Package,
    registry: TypeRegistry,
}

/// Result of [`Enumstr::analyze`]. The registry holds every attributed
/// constant, including those declared inside function bodies.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub package: String,
    pub registry: TypeRegistry,
}

/// Result of [`Enumstr::select`].
#[derive(Debug, Clone)]
pub struct Selected {
    pub package: String,
    pub selection: Selection,
}

/// Result of [`Enumstr::generate`] and [`Enumstr::run`].
#[derive(Debug, Clone)]
pub struct Generation {
    pub package: String,
    pub selection: Selection,
    /// Canonical Go source
    pub source: String,
    pub target: OutputTarget,
}

impl Generation {
    /// Non-fatal diagnostics of the run.
    pub fn diagnostics(&self) -> Vec<String> {
        self.selection.diagnostics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn package(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, source) in files {
            fs::write(dir.path().join(name), source).unwrap();
        }
        dir
    }

    #[test]
    fn test_builder_defaults() {
        let builder = Enumstr::new("/pkg");
        assert_eq!(builder.dir(), Path::new("/pkg"));
        assert_eq!(builder.state(), &RunState::Idle);
    }

    #[test]
    fn test_with_config_only_overrides_set_values() {
        let builder = Enumstr::new(".").types(["A"]).output("x.go").with_config(&EnumstrConfig {
            types: None,
            output: Some("-".to_string()),
            tags: Some(vec!["extra".to_string()]),
        });
        assert_eq!(builder.types, vec!["A"]);
        assert_eq!(builder.output.as_deref(), Some("-"));
        assert_eq!(builder.tags, vec!["extra"]);
    }

    #[test]
    fn test_analyze_reaches_done() {
        let dir = package(&[("a.go", "package p\n\ntype T int\n\nconst A T = 1\n")]);
        let mut builder = Enumstr::new(dir.path());
        let analysis = builder.analyze().unwrap();
        assert_eq!(analysis.package, "p");
        assert_eq!(analysis.registry.names("T"), vec!["A"]);
        assert_eq!(builder.state(), &RunState::Done);
    }

    #[test]
    fn test_transitions_pass_through_done_once() {
        let dir = package(&[("a.go", "package p\n\ntype T int\n\nconst A T = 1\n")]);
        let mut builder = Enumstr::new(dir.path()).output("gen.go");

        builder.generate().unwrap();
        assert_eq!(
            builder.history(),
            [
                RunState::Idle,
                RunState::Analyzing,
                RunState::Extracting,
                RunState::Selecting,
                RunState::Rendering,
                RunState::Done,
            ]
        );

        builder.run().unwrap();
        assert_eq!(
            builder.history(),
            [
                RunState::Idle,
                RunState::Analyzing,
                RunState::Extracting,
                RunState::Selecting,
                RunState::Rendering,
                RunState::Writing,
                RunState::Done,
            ]
        );
        assert_eq!(
            builder.history().iter().filter(|s| **s == RunState::Done).count(),
            1
        );
    }

    #[test]
    fn test_failed_run_history_ends_in_failure() {
        let dir = package(&[("a.go", "package p\n\nconst A = undefinedThing\n")]);
        let mut builder = Enumstr::new(dir.path());
        builder.select().unwrap_err();
        let history = builder.history();
        assert_eq!(history[..2], [RunState::Idle, RunState::Analyzing]);
        assert_eq!(history.len(), 3);
        assert!(matches!(
            history[2],
            RunState::Failed {
                stage: Stage::Analyzing,
                ..
            }
        ));
    }

    #[test]
    fn test_failure_records_stage() {
        let dir = package(&[("main.go", "package main\n\nfunc main() {}\n")]);
        let mut builder = Enumstr::new(dir.path());
        let err = builder.generate().unwrap_err();
        assert!(matches!(err, EnumstrError::PackageName { .. }));
        match builder.state() {
            RunState::Failed { stage, cause } => {
                assert_eq!(*stage, Stage::Analyzing);
                assert!(cause.contains("Refuse to process package \"main\""));
            }
            other => panic!("expected failed state, got {other}"),
        }
    }

    #[test]
    fn test_generate_does_not_write() {
        let dir = package(&[("a.go", "package p\n\ntype T int\n\nconst A T = 1\n")]);
        let generation = Enumstr::new(dir.path()).generate().unwrap();
        assert_eq!(
            generation.target,
            OutputTarget::File(dir.path().join("p_string.go"))
        );
        assert!(generation.source.contains("func (t T) String() string {"));
        assert!(!dir.path().join("p_string.go").exists());
    }

    #[test]
    fn test_run_writes_output() {
        let dir = package(&[("a.go", "package p\n\ntype T int\n\nconst A T = 1\n")]);
        let mut builder = Enumstr::new(dir.path()).output("gen.go");
        let generation = builder.run().unwrap();
        let written = fs::read_to_string(dir.path().join("gen.go")).unwrap();
        assert_eq!(written, generation.source);
        assert_eq!(builder.state(), &RunState::Done);
    }

    #[test]
    fn test_run_failure_keeps_existing_output() {
        let dir = package(&[("a.go", "package p\n\nconst A = undefinedThing\n")]);
        fs::write(dir.path().join("out.go.txt"), "previous").unwrap();
        let mut builder = Enumstr::new(dir.path()).output("out.go.txt");
        assert!(matches!(
            builder.run().unwrap_err(),
            EnumstrError::TypeCheck { .. }
        ));
        assert_eq!(
            fs::read_to_string(dir.path().join("out.go.txt")).unwrap(),
            "previous"
        );
    }
}
