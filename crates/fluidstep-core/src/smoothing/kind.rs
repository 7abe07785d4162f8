use std::collections::HashMap;
use std::rc::Rc;

use crate::core_invariants::require;
use crate::host::KindId;

use super::accessor::Accessor;
use super::history::MAX_HISTORY;
use super::value::ValueKind;

/// How the engine treats objects of a kind beyond the generic policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindRole {
    #[default]
    Generic,
    /// Always interpolated, whatever the configured mode.
    Camera,
    /// Carries riders: its smoothing offset is propagated onto actors it pushed.
    Platform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
    pub role: KindRole,
    pub history_depth: usize,
}

impl KindSpec {
    #[inline]
    pub const fn new(role: KindRole) -> Self {
        Self {
            role,
            history_depth: 2,
        }
    }

    #[inline]
    pub const fn generic() -> Self {
        Self::new(KindRole::Generic)
    }

    #[inline]
    pub const fn camera() -> Self {
        Self::new(KindRole::Camera)
    }

    #[inline]
    pub const fn platform() -> Self {
        Self::new(KindRole::Platform)
    }

    pub fn with_history_depth(mut self, depth: usize) -> Self {
        require(
            (2..=MAX_HISTORY).contains(&depth),
            "history depth must be 2 or 3",
        );
        self.history_depth = depth;
        self
    }
}

impl Default for KindSpec {
    fn default() -> Self {
        Self::generic()
    }
}

pub struct KindEntry<W> {
    pub id: KindId,
    pub spec: KindSpec,
    pub accessor: Accessor<W>,
}

impl<W> KindEntry<W> {
    #[inline]
    pub fn value_kind(&self) -> ValueKind {
        self.accessor.value_kind()
    }
}

/// Registered kinds and their accessors.
pub struct KindRegistry<W> {
    kinds: HashMap<KindId, Rc<KindEntry<W>>>,
}

impl<W> KindRegistry<W> {
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Registers or replaces a kind. Objects already tracked keep the entry they were created with.
    pub fn register(&mut self, id: KindId, spec: KindSpec, accessor: Accessor<W>) {
        let entry = Rc::new(KindEntry { id, spec, accessor });
        if self.kinds.insert(id, entry).is_some() {
            log::warn!("smoothing: kind '{}' re-registered", id.name());
        } else {
            log::debug!(
                "smoothing: kind '{}' registered ({:?}, {:?})",
                id.name(),
                spec.role,
                self.kinds[&id].value_kind()
            );
        }
    }

    #[inline]
    pub fn get(&self, id: KindId) -> Option<Rc<KindEntry<W>>> {
        self.kinds.get(&id).cloned()
    }

    #[inline]
    pub fn contains(&self, id: KindId) -> bool {
        self.kinds.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl<W> Default for KindRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}
