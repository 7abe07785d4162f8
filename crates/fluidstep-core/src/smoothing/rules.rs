use super::state::SmoothingState;

/// Host-supplied predicate exempting an object from smoothing for one draw.
///
/// Exempt objects are drawn at their authoritative value.
pub trait OverrideRule<W: ?Sized> {
    fn name(&self) -> &'static str;

    fn exempt(&self, world: &W, state: &SmoothingState) -> bool;
}

pub struct FnRule<W> {
    name: &'static str,
    f: Box<dyn Fn(&W, &SmoothingState) -> bool>,
}

impl<W> FnRule<W> {
    pub fn new<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(&W, &SmoothingState) -> bool + 'static,
    {
        Self {
            name,
            f: Box::new(f),
        }
    }
}

impl<W> OverrideRule<W> for FnRule<W> {
    #[inline]
    fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    fn exempt(&self, world: &W, state: &SmoothingState) -> bool {
        (self.f)(world, state)
    }
}

/// Ordered rule list. The first exempting rule wins.
pub struct OverrideRules<W> {
    rules: Vec<Box<dyn OverrideRule<W>>>,
}

impl<W> OverrideRules<W> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn push(&mut self, rule: Box<dyn OverrideRule<W>>) {
        log::debug!("smoothing: override rule '{}' added", rule.name());
        self.rules.push(rule);
    }

    pub fn first_exempting(&self, world: &W, state: &SmoothingState) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|r| r.exempt(world, state))
            .map(|r| r.name())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<W> Default for OverrideRules<W> {
    fn default() -> Self {
        Self::new()
    }
}
