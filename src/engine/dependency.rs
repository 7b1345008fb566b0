// ABOUTME: Dependency graph construction and topological ordering
// ABOUTME: Plans task node execution and orders named definitions before resolution

use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::NodeIndex;
use petgraph::{Direction, Graph};
use std::collections::HashMap;

use super::error::{ExecutionError, Result};
use super::task::Task;

/// The transitive dependency closure of one task node.
pub struct DependencyGraph {
    graph: Graph<Task, ()>,
    root: NodeIndex,
}

impl DependencyGraph {
    /// Collect `root` and everything it transitively depends on. Edges point
    /// from a dependency to its dependent.
    pub fn for_task(root: &Task) -> Self {
        let mut graph = Graph::new();
        let mut task_indices = HashMap::new();
        let root_index = Self::add_task(&mut graph, &mut task_indices, root);

        Self {
            graph,
            root: root_index,
        }
    }

    fn add_task(
        graph: &mut Graph<Task, ()>,
        task_indices: &mut HashMap<usize, NodeIndex>,
        task: &Task,
    ) -> NodeIndex {
        if let Some(&index) = task_indices.get(&task.node_id()) {
            return index;
        }

        let index = graph.add_node(task.clone());
        task_indices.insert(task.node_id(), index);

        for dependency in task.dependencies() {
            let dependency_index = Self::add_task(graph, task_indices, dependency);
            graph.update_edge(dependency_index, index, ());
        }

        index
    }

    /// Dependencies strictly before dependents. The order is stable for a
    /// given graph shape.
    pub fn execution_order(&self) -> Result<Vec<Task>> {
        let sorted =
            toposort(&self.graph, None).map_err(|cycle| ExecutionError::CircularReference {
                kind: "task",
                members: vec![self.graph[cycle.node_id()].label()],
            })?;

        Ok(sorted
            .into_iter()
            .map(|index| self.graph[index].clone())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct dependencies of the root node.
    pub fn root_dependencies(&self) -> Vec<Task> {
        self.graph
            .neighbors_directed(self.root, Direction::Incoming)
            .map(|index| self.graph[index].clone())
            .collect()
    }
}

/// Named definitions referring to each other by name, such as declared tasks
/// or file sets.
pub struct DefinitionGraph {
    kind: &'static str,
    graph: Graph<String, ()>,
}

impl DefinitionGraph {
    /// Build from `(name, references)` pairs. Fails on the first reference to
    /// an undefined name.
    pub fn from_definitions<'a, I, R>(kind: &'static str, definitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, R)>,
        R: IntoIterator<Item = &'a String>,
    {
        let definitions: Vec<(&String, Vec<&String>)> = definitions
            .into_iter()
            .map(|(name, references)| (name, references.into_iter().collect()))
            .collect();

        let mut graph = Graph::new();
        let mut indices: IndexMap<&String, NodeIndex> = IndexMap::new();

        for (name, _) in &definitions {
            let index = graph.add_node((*name).clone());
            indices.insert(*name, index);
        }

        for (name, references) in &definitions {
            let owner = indices[*name];
            for reference in references {
                let Some(&target) = indices.get(*reference) else {
                    return Err(ExecutionError::UnknownReference {
                        kind,
                        owner: (*name).clone(),
                        reference: (*reference).clone(),
                    });
                };
                graph.add_edge(target, owner, ());
            }
        }

        Ok(Self { kind, graph })
    }

    /// Names ordered so every definition follows everything it refers to.
    pub fn resolution_order(&self) -> Result<Vec<String>> {
        let sorted =
            toposort(&self.graph, None).map_err(|cycle| ExecutionError::CircularReference {
                kind: self.kind,
                members: vec![self.graph[cycle.node_id()].clone()],
            })?;

        Ok(sorted
            .into_iter()
            .map(|index| self.graph[index].clone())
            .collect())
    }
}
