use crate::core_invariants::bad_state;
use crate::host::ObjectId;
use crate::math::{Angle, Vec2};

use super::value::{Sample, ValueKind};

/// Reads and writes one smoothable value on a host object.
pub trait ValueAccessor<W: ?Sized, T> {
    fn get(&self, world: &W, id: ObjectId) -> T;

    fn set(&self, world: &mut W, id: ObjectId, value: T);

    /// Hidden objects are not smoothed, and the first draw after they reappear is not either.
    fn is_visible(&self, _world: &W, _id: ObjectId) -> bool {
        true
    }
}

/// Accessor for objects moving along a path, whose value is a progress in `[0, 1]`.
///
/// `position_at` is what lets a path-following platform carry riders.
pub trait PathAccessor<W: ?Sized>: ValueAccessor<W, f32> {
    fn position_at(&self, world: &W, id: ObjectId, percent: f32) -> Vec2;
}

type GetFn<W, T> = Box<dyn Fn(&W, ObjectId) -> T>;
type SetFn<W, T> = Box<dyn Fn(&mut W, ObjectId, T)>;
type VisibleFn<W> = Box<dyn Fn(&W, ObjectId) -> bool>;
type PathFn<W> = Box<dyn Fn(&W, ObjectId, f32) -> Vec2>;

/// Closure-backed accessor.
pub struct FnAccessor<W, T> {
    get: GetFn<W, T>,
    set: SetFn<W, T>,
    visible: Option<VisibleFn<W>>,
}

impl<W, T> FnAccessor<W, T> {
    pub fn new<G, S>(get: G, set: S) -> Self
    where
        G: Fn(&W, ObjectId) -> T + 'static,
        S: Fn(&mut W, ObjectId, T) + 'static,
    {
        Self {
            get: Box::new(get),
            set: Box::new(set),
            visible: None,
        }
    }

    pub fn with_visibility<V>(mut self, visible: V) -> Self
    where
        V: Fn(&W, ObjectId) -> bool + 'static,
    {
        self.visible = Some(Box::new(visible));
        self
    }
}

impl<W, T> ValueAccessor<W, T> for FnAccessor<W, T> {
    #[inline]
    fn get(&self, world: &W, id: ObjectId) -> T {
        (self.get)(world, id)
    }

    #[inline]
    fn set(&self, world: &mut W, id: ObjectId, value: T) {
        (self.set)(world, id, value)
    }

    #[inline]
    fn is_visible(&self, world: &W, id: ObjectId) -> bool {
        self.visible.as_ref().map_or(true, |v| v(world, id))
    }
}

/// Closure-backed path accessor.
pub struct FnPathAccessor<W> {
    inner: FnAccessor<W, f32>,
    path: PathFn<W>,
}

impl<W> FnPathAccessor<W> {
    pub fn new<P>(inner: FnAccessor<W, f32>, path: P) -> Self
    where
        P: Fn(&W, ObjectId, f32) -> Vec2 + 'static,
    {
        Self {
            inner,
            path: Box::new(path),
        }
    }
}

impl<W> ValueAccessor<W, f32> for FnPathAccessor<W> {
    #[inline]
    fn get(&self, world: &W, id: ObjectId) -> f32 {
        self.inner.get(world, id)
    }

    #[inline]
    fn set(&self, world: &mut W, id: ObjectId, value: f32) {
        self.inner.set(world, id, value)
    }

    #[inline]
    fn is_visible(&self, world: &W, id: ObjectId) -> bool {
        self.inner.is_visible(world, id)
    }
}

impl<W> PathAccessor<W> for FnPathAccessor<W> {
    #[inline]
    fn position_at(&self, world: &W, id: ObjectId, percent: f32) -> Vec2 {
        (self.path)(world, id, percent)
    }
}

/// Type-erased accessor for one object kind.
pub enum Accessor<W> {
    Position(Box<dyn ValueAccessor<W, Vec2>>),
    Scalar(Box<dyn ValueAccessor<W, f32>>),
    Angle(Box<dyn ValueAccessor<W, Angle>>),
    Percent(Box<dyn PathAccessor<W>>),
}

impl<W> Accessor<W> {
    pub fn position(a: impl ValueAccessor<W, Vec2> + 'static) -> Self {
        Accessor::Position(Box::new(a))
    }

    pub fn scalar(a: impl ValueAccessor<W, f32> + 'static) -> Self {
        Accessor::Scalar(Box::new(a))
    }

    pub fn angle(a: impl ValueAccessor<W, Angle> + 'static) -> Self {
        Accessor::Angle(Box::new(a))
    }

    pub fn percent(a: impl PathAccessor<W> + 'static) -> Self {
        Accessor::Percent(Box::new(a))
    }

    #[inline]
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Accessor::Position(_) => ValueKind::Position,
            Accessor::Scalar(_) => ValueKind::Scalar,
            Accessor::Angle(_) => ValueKind::Angle,
            Accessor::Percent(_) => ValueKind::Percent,
        }
    }

    pub fn sample(&self, world: &W, id: ObjectId) -> Sample {
        match self {
            Accessor::Position(a) => Sample::Position(a.get(world, id)),
            Accessor::Scalar(a) => Sample::Scalar(a.get(world, id)),
            Accessor::Angle(a) => Sample::Angle(a.get(world, id)),
            Accessor::Percent(a) => Sample::Percent(a.get(world, id)),
        }
    }

    pub fn apply(&self, world: &mut W, id: ObjectId, sample: Sample) {
        match (self, sample) {
            (Accessor::Position(a), Sample::Position(v)) => a.set(world, id, v),
            (Accessor::Scalar(a), Sample::Scalar(v)) => a.set(world, id, v),
            (Accessor::Angle(a), Sample::Angle(v)) => a.set(world, id, v),
            (Accessor::Percent(a), Sample::Percent(v)) => a.set(world, id, v),
            _ => bad_state("sample kind does not match accessor"),
        }
    }

    pub fn is_visible(&self, world: &W, id: ObjectId) -> bool {
        match self {
            Accessor::Position(a) => a.is_visible(world, id),
            Accessor::Scalar(a) => a.is_visible(world, id),
            Accessor::Angle(a) => a.is_visible(world, id),
            Accessor::Percent(a) => a.is_visible(world, id),
        }
    }

    /// World position a sample stands for, when the kind has one.
    pub fn position_of(&self, world: &W, id: ObjectId, sample: Sample) -> Option<Vec2> {
        match (self, sample) {
            (Accessor::Position(_), Sample::Position(p)) => Some(p),
            (Accessor::Percent(a), Sample::Percent(p)) => Some(a.position_at(world, id, p)),
            _ => None,
        }
    }
}
