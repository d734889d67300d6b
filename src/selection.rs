use crate::graph::NodeId;
use slint::{Model, VecModel};
use std::collections::BTreeSet;

/// Set of selected nodes, iterated in id order.
#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    selected: BTreeSet<NodeId>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on a node based on interaction modifiers
    pub fn handle_interaction(&mut self, id: NodeId, shift_held: bool) {
        if shift_held {
            if !self.selected.remove(&id) {
                self.selected.insert(id);
            }
        } else {
            if self.selected.len() == 1 && self.selected.contains(&id) {
                return;
            }
            self.selected.clear();
            self.selected.insert(id);
        }
    }

    /// Clear the current selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the current selection with a new set of IDs
    ///
    /// Used when a rubber-band selection completes
    pub fn replace_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.selected.clear();
        self.selected.extend(ids);
    }

    /// Add IDs without dropping the current selection
    pub fn extend<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.selected.extend(ids);
    }

    /// Drop every ID for which `keep` returns false (e.g. deleted nodes)
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&NodeId) -> bool,
    {
        self.selected.retain(keep);
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.selected.iter().copied()
    }

    /// Mirror the selection into a Slint model of raw node ids
    pub fn sync_to_model(&self, model: &VecModel<i32>) {
        model.set_vec(self.selected.iter().map(|id| id.0).collect::<Vec<_>>());
    }

    /// Replace the selection from any Slint model of raw node ids
    pub fn sync_from_model(&mut self, model: &dyn Model<Data = i32>) {
        self.selected.clear();
        for i in 0..model.row_count() {
            if let Some(id) = model.row_data(i) {
                self.selected.insert(NodeId(id));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
