use std::collections::HashMap;
use std::rc::Rc;

use crate::host::ObjectId;

use super::kind::KindEntry;
use super::state::SmoothingState;

pub(crate) struct Tracked<W> {
    pub(crate) state: SmoothingState,
    pub(crate) kind: Rc<KindEntry<W>>,
}

/// Tracked objects, keyed by identity, iterated in tracking order.
///
/// Holds at most one record per object.
pub struct ObjectSmoothingRegistry<W> {
    entries: HashMap<ObjectId, Tracked<W>>,
    order: Vec<ObjectId>,
}

impl<W> ObjectSmoothingRegistry<W> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    #[inline]
    pub fn state(&self, id: ObjectId) -> Option<&SmoothingState> {
        self.entries.get(&id).map(|t| &t.state)
    }

    /// Ids in tracking order.
    #[inline]
    pub fn ids(&self) -> &[ObjectId] {
        &self.order
    }

    pub fn states(&self) -> impl Iterator<Item = &SmoothingState> + '_ {
        self.order.iter().filter_map(|id| self.state(*id))
    }

    #[inline]
    pub(crate) fn get(&self, id: ObjectId) -> Option<&Tracked<W>> {
        self.entries.get(&id)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: ObjectId) -> Option<&mut Tracked<W>> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn tracked_mut(&mut self) -> impl Iterator<Item = &mut Tracked<W>> + '_ {
        self.entries.values_mut()
    }

    /// Returns `false` when `id` was already tracked; the existing record is kept.
    pub(crate) fn insert(&mut self, id: ObjectId, kind: Rc<KindEntry<W>>) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        let state = SmoothingState::new(id, kind.id, &kind.spec, kind.value_kind());
        self.entries.insert(id, Tracked { state, kind });
        self.order.push(id);
        true
    }

    pub(crate) fn remove(&mut self, id: ObjectId) -> bool {
        if self.entries.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|o| *o != id);
        true
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl<W> Default for ObjectSmoothingRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}
