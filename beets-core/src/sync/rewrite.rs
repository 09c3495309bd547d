use std::collections::HashMap;

use beets_types::Id;

/// Temporary id → persistent id, filled in as new rows come back from the
/// store. Lives for exactly one sync call.
#[derive(Debug, Default)]
pub struct RewriteTable {
    ids: HashMap<Id, Id>,
}

impl RewriteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember that `before` was persisted as `after`. Only temporary ids
    /// are worth remembering; anything else is ignored.
    pub fn record(&mut self, before: &Id, after: &Id) {
        if before.is_temporary() {
            self.ids.insert(before.clone(), after.clone());
        }
    }

    pub fn resolve(&self, temporary: &Id) -> Option<&Id> {
        self.ids.get(temporary)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
