// src/core/graph.rs
use std::collections::{BTreeSet, HashSet};
use serde::{Deserialize, Serialize};

use super::layer::Layer;
use super::scanner::Occurrence;

/// Relationship between a referencing class and a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
    Declaration,
    Queries,
    Calls,
    Binds,
    UiBinds,
    Refers,
}

/// Directed edge from a class to the field it touches
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub layer: Layer,
}

/// Class/file/field graph for one attribute.
///
/// Class names, file paths and the field name share one node namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub nodes: BTreeSet<String>,
    pub edges: Vec<DependencyEdge>,
    #[serde(skip)]
    seen: HashSet<DependencyEdge>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for `field_name` declared in `class_name`
    pub fn build(class_name: &str, field_name: &str, occurrences: &[Occurrence]) -> Self {
        let mut graph = Self::new();
        graph.nodes.insert(class_name.to_string());
        graph.nodes.insert(field_name.to_string());
        graph.add_occurrences(field_name, occurrences);
        graph
    }

    /// Graph of a class that declares nothing: a single node, no edges
    pub fn single(node: &str) -> Self {
        let mut graph = Self::new();
        graph.nodes.insert(node.to_string());
        graph
    }

    /// Add nodes and edges for `occurrences`; re-adding the same list is a no-op
    pub fn add_occurrences(&mut self, field_name: &str, occurrences: &[Occurrence]) {
        for occurrence in occurrences {
            self.nodes.insert(occurrence.class_name.clone());
            self.nodes.insert(occurrence.file_path.clone());

            for edge_type in Self::edge_types_for(occurrence) {
                self.add_edge(DependencyEdge {
                    from: occurrence.class_name.clone(),
                    to: field_name.to_string(),
                    edge_type,
                    layer: occurrence.layer,
                });
            }
        }
    }

    /// Insert unless an identical (from, to, type, layer) edge exists
    pub fn add_edge(&mut self, edge: DependencyEdge) -> bool {
        if self.seen.contains(&edge) {
            return false;
        }
        self.seen.insert(edge.clone());
        self.edges.push(edge);
        true
    }

    /// Edge types an occurrence contributes; the rules are not exclusive
    fn edge_types_for(occurrence: &Occurrence) -> Vec<EdgeType> {
        let mut types = Vec::new();

        if occurrence.layer == Layer::Model && occurrence.usage.is_declaration() {
            types.push(EdgeType::Declaration);
        }

        match occurrence.layer {
            Layer::Repository => types.push(EdgeType::Queries),
            Layer::Service => types.push(EdgeType::Calls),
            Layer::Controller => types.push(EdgeType::Binds),
            Layer::Ui => types.push(EdgeType::UiBinds),
            _ => {}
        }

        if occurrence.usage.is_reference() {
            types.push(EdgeType::Refers);
        }

        types
    }

    #[cfg(test)]
    pub fn edges_of_type(&self, edge_type: EdgeType) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter().filter(move |e| e.edge_type == edge_type)
    }
}
