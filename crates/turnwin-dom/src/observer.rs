//! Mutation observers
//!
//! Observers register a target node and options. The document reports every
//! mutation to the registry, which queues a record for each observer whose
//! target (or, with `subtree`, an ancestor of the mutated node) matches.

use crate::{DomTree, NodeId};
use std::collections::BTreeMap;

/// Observer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    pub attribute_filter: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
            attribute_name: None,
            old_value: None,
        }
    }

    pub fn attribute(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }

    pub fn character_data(target: NodeId, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: None,
            old_value,
        }
    }
}

#[derive(Debug)]
struct Observation {
    target: NodeId,
    options: MutationObserverInit,
    pending: Vec<MutationRecord>,
}

impl Observation {
    fn wants(&self, tree: &DomTree, record: &MutationRecord) -> bool {
        let matches_type = match record.mutation_type {
            MutationType::Attributes => self.options.attributes,
            MutationType::CharacterData => self.options.character_data,
            MutationType::ChildList => self.options.child_list,
        };
        if !matches_type {
            return false;
        }

        if record.mutation_type == MutationType::Attributes {
            if let (Some(filter), Some(attr)) = (&self.options.attribute_filter, &record.attribute_name) {
                if !filter.iter().any(|f| f.eq_ignore_ascii_case(attr)) {
                    return false;
                }
            }
        }

        if record.target == self.target {
            return true;
        }
        self.options.subtree && tree.is_inclusive_ancestor(self.target, record.target)
    }
}

/// Registry of live observers for one document
#[derive(Debug, Default)]
pub struct MutationObservers {
    next_id: u64,
    observations: BTreeMap<ObserverId, Observation>,
}

impl MutationObservers {
    /// Start observing `target`
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.observations.insert(
            id,
            Observation {
                target,
                options,
                pending: Vec::new(),
            },
        );
        tracing::trace!(?id, ?target, "mutation observer attached");
        id
    }

    /// Drop an observer and its queued records. Unknown ids are ignored.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.observations.remove(&id).is_some()
    }

    /// Take queued records
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observations
            .get_mut(&id)
            .map(|o| std::mem::take(&mut o.pending))
            .unwrap_or_default()
    }

    pub fn is_observing(&self, id: ObserverId) -> bool {
        self.observations.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Queue a mutation for every interested observer
    pub fn notify(&mut self, tree: &DomTree, record: MutationRecord) {
        for observation in self.observations.values_mut() {
            if observation.wants(tree, &record) {
                observation.pending.push(record.clone());
            }
        }
    }
}
