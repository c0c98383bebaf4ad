//! Object and object-part affordance records and the part tree they hang
//! from.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::mesh::Mesh;
use crate::model::hydration::Hydration;

/// Hydrated geometry of an affordance.
#[derive(Debug, Clone, PartialEq)]
pub enum AffordanceMesh {
    /// The affordance owns a model directly.
    Single(Arc<Mesh>),
    /// Meshes of the constituent parts, keyed by part id.
    Parts(BTreeMap<String, Arc<Mesh>>),
}

/// One object or object part with its affordance labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Affordance {
    pub obj_id: String,
    pub obj_name: String,
    pub has_model: bool,
    /// Root of the part tree this object belongs to.
    pub obj_instance_id: String,
    /// Direct children in the part tree; empty for a leaf part.
    pub obj_part_id: Vec<String>,
    /// Function-level affordances.
    pub affordance_list: Vec<String>,
    /// Interaction-level affordances.
    pub affordance_instantiation_list: Vec<String>,
    pub state: Hydration<AffordanceMesh>,
}

impl Affordance {
    pub fn is_part(&self) -> bool {
        self.obj_part_id.is_empty()
    }

    pub fn is_instantiated(&self) -> bool {
        self.state.is_hydrated()
    }

    pub fn mesh(&self) -> Option<&AffordanceMesh> {
        self.state.payload()
    }
}

/// Parent → children relation between objects and their parts, with the
/// reverse child → parent lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartTree {
    children: HashMap<String, Vec<String>>,
    parents: HashMap<String, String>,
}

impl PartTree {
    pub fn new(children: HashMap<String, Vec<String>>) -> Self {
        let parents = rev_part_tree(&children);
        Self { children, parents }
    }

    pub fn children_of(&self, id: &str) -> Option<&[String]> {
        self.children.get(id).map(Vec::as_slice)
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    pub fn parents(&self) -> &HashMap<String, String> {
        &self.parents
    }

    pub fn root_of<'a>(&'a self, id: &'a str) -> &'a str {
        get_part_tree_root(&self.parents, id)
    }
}

/// Invert a parent → children map into child → parent.
pub fn rev_part_tree(children: &HashMap<String, Vec<String>>) -> HashMap<String, String> {
    children
        .iter()
        .flat_map(|(parent, kids)| kids.iter().map(move |k| (k.clone(), parent.clone())))
        .collect()
}

/// Follow parent links from `id` up to the root.
///
/// The parent map must be acyclic; the walk gives up after as many hops as
/// there are links and returns wherever it stopped.
pub fn get_part_tree_root<'a>(parents: &'a HashMap<String, String>, id: &'a str) -> &'a str {
    part_tree_root_with_depth(parents, id).0
}

/// [`get_part_tree_root`] plus the number of hops taken.
pub fn part_tree_root_with_depth<'a>(
    parents: &'a HashMap<String, String>,
    id: &'a str,
) -> (&'a str, usize) {
    let mut current = id;
    let mut hops = 0;
    while let Some(parent) = parents.get(current) {
        if hops >= parents.len() {
            break;
        }
        current = parent;
        hops += 1;
    }
    (current, hops)
}
