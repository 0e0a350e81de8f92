//! Task emission: one ninja edge per STL, plus optional option registration.
use crate::catalog::Catalog;
use crate::encode::parameters_to_string;
use crate::error::GenerateResult;
use crate::ninja::{BuildGraph, COPY_RULE, OPENSCAD_RULE};
use crate::paths::BuildPaths;
use crate::registry::{OptionRegistry, Predicate};
use crate::schema::Manifest;
use crate::value::ParamMap;

/// An OpenSCAD invocation producing one STL.
///
/// - `parameters`: global options, used for the build and for STL selection
/// - `file_local_parameters`: options that only mean something to this input
/// - `openscad_only_parameters`: passed to OpenSCAD, ignored for selection
/// - `select_if`: selection-only options; several clauses are OR-ed
#[derive(Debug, Clone)]
pub struct ScadTask {
    output: String,
    input: String,
    parameters: ParamMap,
    file_local_parameters: ParamMap,
    openscad_only_parameters: ParamMap,
    select_if: Predicate,
}

impl ScadTask {
    pub fn new(output: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            input: input.into(),
            parameters: ParamMap::new(),
            file_local_parameters: ParamMap::new(),
            openscad_only_parameters: ParamMap::new(),
            select_if: Predicate::always(),
        }
    }

    pub fn parameters(mut self, parameters: ParamMap) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn file_local_parameters(mut self, parameters: ParamMap) -> Self {
        self.file_local_parameters = parameters;
        self
    }

    pub fn openscad_only_parameters(mut self, parameters: ParamMap) -> Self {
        self.openscad_only_parameters = parameters;
        self
    }

    pub fn select_if(mut self, predicate: impl Into<Predicate>) -> Self {
        self.select_if = predicate.into();
        self
    }

    /// Everything OpenSCAD sees; later groups win on key collisions.
    fn openscad_parameters(&self) -> ParamMap {
        let mut all = self.parameters.clone();
        all.extend(self.file_local_parameters.clone());
        all.extend(self.openscad_only_parameters.clone());
        all
    }
}

/// Outputs of a successful generation pass.
#[derive(Debug)]
pub struct Generated {
    pub graph: BuildGraph,
    pub manifest: Option<Manifest>,
}

/// Collects build edges and, when enabled, STL option registrations.
#[derive(Debug)]
pub struct Generator {
    paths: BuildPaths,
    graph: BuildGraph,
    registry: Option<OptionRegistry>,
}

impl Generator {
    /// Start a generation pass; `track_options` enables the STL manifest.
    pub fn new(paths: BuildPaths, openscad_command: &str, track_options: bool) -> Self {
        let mut graph = BuildGraph::new();
        graph.rule(
            OPENSCAD_RULE,
            &format!("{openscad_command} $parameters $in -o $out -d $out.d"),
            Some("$out.d"),
        );
        Self {
            paths,
            graph,
            registry: track_options.then(OptionRegistry::new),
        }
    }

    pub fn graph(&self) -> &BuildGraph {
        &self.graph
    }

    pub fn registry(&self) -> Option<&OptionRegistry> {
        self.registry.as_ref()
    }

    /// Declare an OpenSCAD task.
    pub fn declare(&mut self, task: ScadTask) -> GenerateResult<()> {
        let variables = vec![(
            "parameters".to_string(),
            parameters_to_string(&task.openscad_parameters()),
        )];
        self.graph.build(
            &self.paths.output(&task.output),
            OPENSCAD_RULE,
            &self.paths.source(&task.input),
            variables,
        )?;

        if let Some(registry) = self.registry.as_mut() {
            registry.register(
                &task.output,
                &task.input,
                &task.parameters,
                &task.file_local_parameters,
                &task.select_if,
            );
        }
        Ok(())
    }

    /// Declare an OpenSCAD task that the STL selector never offers.
    pub fn build_only(
        &mut self,
        output: &str,
        input: &str,
        parameters: &ParamMap,
    ) -> GenerateResult<()> {
        self.graph.build(
            &self.paths.output(output),
            OPENSCAD_RULE,
            &self.paths.source(input),
            vec![("parameters".to_string(), parameters_to_string(parameters))],
        )
    }

    /// Copy a prebuilt STL from the extras directory into the build directory.
    pub fn copy_stl(&mut self, stl: &str, select_if: impl Into<Predicate>) -> GenerateResult<()> {
        if !self.graph.has_rule(COPY_RULE) {
            self.graph.rule(COPY_RULE, "cp $in $out", None);
        }
        self.graph.build(
            &self.paths.output(stl),
            COPY_RULE,
            &self.paths.extra(stl),
            Vec::new(),
        )?;

        if let Some(registry) = self.registry.as_mut() {
            registry.register(
                stl,
                stl,
                &ParamMap::new(),
                &ParamMap::new(),
                &select_if.into(),
            );
        }
        Ok(())
    }

    /// End the pass: validate registrations (if any) into a manifest.
    pub fn finish(self, catalog: &Catalog) -> GenerateResult<Generated> {
        tracing::info!(edges = self.graph.edges().len(), "build graph complete");
        let manifest = match self.registry {
            Some(registry) => Some(registry.finalize(catalog)?),
            None => None,
        };
        Ok(Generated {
            graph: self.graph,
            manifest,
        })
    }
}
