//! Context resolution along the ownership chain

use crate::model::{ContextData, ElementId, ElementTree};

/// Merge the context entries of `target` and all its ancestors
///
/// Entries nearer to the target win on key collisions. Returns None when
/// there is no target.
pub fn resolve(tree: &dyn ElementTree, target: Option<ElementId>) -> Option<ContextData> {
    let target = target?;
    let mut merged = ContextData::new();
    for element in tree.path_from(target).iter() {
        if let Some(own) = tree.context_data(element) {
            merged.merge_inherited(own);
        }
    }
    Some(merged)
}
