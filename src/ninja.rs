//! In-memory ninja build file.
//!
//! Rules and build edges are collected during generation and rendered once
//! validation has passed, so nothing reaches disk on a failed run.
use crate::error::{GenerateError, GenerateResult};
use std::collections::BTreeSet;

/// Ninja rule running OpenSCAD.
pub const OPENSCAD_RULE: &str = "openscad";
/// Ninja rule copying a prebuilt file.
pub const COPY_RULE: &str = "copy";

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,
    pub command: String,
    pub depfile: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildEdge {
    pub output: String,
    pub rule: String,
    pub input: String,
    pub variables: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct BuildGraph {
    rules: Vec<Rule>,
    edges: Vec<BuildEdge>,
    outputs: BTreeSet<String>,
}

impl BuildGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(&mut self, name: &str, command: &str, depfile: Option<&str>) {
        self.rules.push(Rule {
            name: name.to_string(),
            command: command.to_string(),
            depfile: depfile.map(str::to_string),
        });
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name == name)
    }

    /// Add a build edge; each output may only be built once.
    pub fn build(
        &mut self,
        output: &str,
        rule: &str,
        input: &str,
        variables: Vec<(String, String)>,
    ) -> GenerateResult<()> {
        if !self.outputs.insert(output.to_string()) {
            return Err(GenerateError::DuplicateOutput {
                output: output.to_string(),
            });
        }
        self.edges.push(BuildEdge {
            output: output.to_string(),
            rule: rule.to_string(),
            input: input.to_string(),
            variables,
        });
        Ok(())
    }

    pub fn edges(&self) -> &[BuildEdge] {
        &self.edges
    }

    /// Render the graph in ninja syntax.
    pub fn render(&self) -> String {
        let mut out = String::new();
        push_line(&mut out, "# Generated by flexbuild. Do not edit.");
        out.push('\n');
        for rule in &self.rules {
            push_line(&mut out, &format!("rule {}", rule.name));
            push_line(&mut out, &format!("  command = {}", rule.command));
            if let Some(depfile) = &rule.depfile {
                push_line(&mut out, &format!("  depfile = {depfile}"));
            }
            out.push('\n');
        }
        for edge in &self.edges {
            push_line(
                &mut out,
                &format!(
                    "build {}: {} {}",
                    escape_path(&edge.output),
                    edge.rule,
                    escape_path(&edge.input)
                ),
            );
            for (name, value) in &edge.variables {
                push_line(&mut out, &format!("  {name} = {}", escape_value(value)));
            }
        }
        out
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// Escape a path for use in a `build` line.
pub fn escape_path(path: &str) -> String {
    path.replace('$', "$$")
        .replace(' ', "$ ")
        .replace(':', "$:")
}

/// Escape a variable value; only `$` is special there.
pub fn escape_value(value: &str) -> String {
    value.replace('$', "$$")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_rules_and_edges() {
        let mut graph = BuildGraph::new();
        graph.rule(
            OPENSCAD_RULE,
            "openscad $parameters $in -o $out -d $out.d",
            Some("$out.d"),
        );
        graph
            .build(
                "builds/gears.stl",
                OPENSCAD_RULE,
                "openscad/gears.scad",
                vec![("parameters".to_string(), "-D 'motorised=true'".to_string())],
            )
            .expect("build edge");

        let rendered = graph.render();
        assert!(rendered.contains(
            "rule openscad\n  command = openscad $parameters $in -o $out -d $out.d\n  depfile = $out.d\n"
        ));
        assert!(rendered.contains(
            "build builds/gears.stl: openscad openscad/gears.scad\n  parameters = -D 'motorised=true'\n"
        ));
    }

    #[test]
    fn duplicate_outputs_are_rejected() {
        let mut graph = BuildGraph::new();
        graph
            .build("builds/feet.stl", OPENSCAD_RULE, "openscad/feet.scad", Vec::new())
            .expect("first edge");
        let err = graph
            .build("builds/feet.stl", OPENSCAD_RULE, "openscad/feet.scad", Vec::new())
            .expect_err("duplicate");
        assert_eq!(
            err,
            GenerateError::DuplicateOutput {
                output: "builds/feet.stl".to_string()
            }
        );
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape_path("my parts/c:$x.stl"), "my$ parts/c$:$$x.stl");
        assert_eq!(escape_value("-D 'price=$5'"), "-D 'price=$$5'");
    }
}
