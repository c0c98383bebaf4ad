//! Stable, human-readable identifiers for the primitive segments of a
//! sequence.
//!
//! Affordance-typed and transient-typed segments are named independently.
//! Within each group the first segment of a primitive type is named after
//! the type (`pour`), later ones get an occurrence suffix (`pour#1`,
//! `pour#2`), counted in the group's key order. The merged map follows the
//! program file's key order.

use std::collections::HashMap;

use crate::model::frame_range::FrameRangeDef;
use crate::program::classify::PrimitiveClassifier;
use crate::program::info::ProgramInfo;
use crate::{Error, Result};

/// Ordered bijection between frame range definitions and task identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskNameMap {
    entries: Vec<(FrameRangeDef, String)>,
    by_def: HashMap<FrameRangeDef, usize>,
    by_name: HashMap<String, usize>,
}

impl TaskNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, def: FrameRangeDef, name: String) {
        let i = self.entries.len();
        self.by_def.insert(def, i);
        self.by_name.insert(name.clone(), i);
        self.entries.push((def, name));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name_of(&self, def: &FrameRangeDef) -> Option<&str> {
        self.by_def.get(def).map(|&i| self.entries[i].1.as_str())
    }

    pub fn def_of(&self, name: &str) -> Option<&FrameRangeDef> {
        self.by_name.get(name).map(|&i| &self.entries[i].0)
    }

    pub fn contains_def(&self, def: &FrameRangeDef) -> bool {
        self.by_def.contains_key(def)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FrameRangeDef, &str)> {
        self.entries.iter().map(|(d, n)| (d, n.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, n)| n.as_str())
    }

    /// Identifier → definition lookup.
    pub fn reverse(&self) -> HashMap<String, FrameRangeDef> {
        self.entries.iter().map(|(d, n)| (n.clone(), *d)).collect()
    }
}

fn suffix_segments<F>(info: &ProgramInfo, keep: F) -> TaskNameMap
where
    F: Fn(&str) -> bool,
{
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut map = TaskNameMap::new();
    for (def, item) in info.iter() {
        let primitive = item.primitive.as_str();
        if !keep(primitive) {
            continue;
        }
        let count = seen.entry(primitive).or_insert(0);
        let name = match *count {
            0 => primitive.to_string(),
            n => format!("{primitive}#{n}"),
        };
        *count += 1;
        map.push(*def, name);
    }
    map
}

pub fn affordance_namemap(info: &ProgramInfo, classifier: &dyn PrimitiveClassifier) -> TaskNameMap {
    suffix_segments(info, |p| classifier.is_affordance(p))
}

pub fn transient_namemap(info: &ProgramInfo, classifier: &dyn PrimitiveClassifier) -> TaskNameMap {
    suffix_segments(info, |p| classifier.is_transient(p))
}

/// The two partial maps plus their merge in program key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNames {
    pub affordance: TaskNameMap,
    pub transient: TaskNameMap,
    pub full: TaskNameMap,
}

impl TaskNames {
    pub fn build(info: &ProgramInfo, classifier: &dyn PrimitiveClassifier) -> Result<Self> {
        let affordance = affordance_namemap(info, classifier);
        let transient = transient_namemap(info, classifier);

        let mut full = TaskNameMap::new();
        for def in info.keys() {
            let name = affordance
                .name_of(def)
                .or_else(|| transient.name_of(def))
                .ok_or_else(|| Error::MissingEntry {
                    kind: "task name",
                    key: def.to_string(),
                })?;
            full.push(*def, name.to_string());
        }

        Ok(Self {
            affordance,
            transient,
            full,
        })
    }
}
