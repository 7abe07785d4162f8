use crate::core_invariants::bad_state;
use crate::host::{KindId, ObjectId};
use crate::math::{Angle, Vec2};

use super::history::History;
use super::kind::{KindRole, KindSpec};
use super::policy::{smooth, snaps, SmoothParams};
use super::value::{Sample, Smoothable, ValueKind};

/// Lifecycle of one tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatePhase {
    /// Tracked, no sample yet: drawn as is.
    PendingFirstSample,
    /// One sample: drawn as is, since history is flat.
    Unsmoothed,
    /// Two or more samples.
    Steady,
}

#[derive(Debug, Clone, Copy)]
struct Channel<T: Smoothable> {
    history: History<T>,
}

impl<T: Smoothable> Channel<T> {
    fn new(depth: usize) -> Self {
        Self {
            history: History::new(depth),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Track {
    Position(Channel<Vec2>),
    Scalar(Channel<f32>),
    Angle(Channel<Angle>),
    Percent(Channel<f32>),
}

macro_rules! with_history {
    ($track:expr, $h:ident => $body:expr) => {
        match $track {
            Track::Position(c) => {
                let $h = &c.history;
                $body
            }
            Track::Scalar(c) | Track::Percent(c) => {
                let $h = &c.history;
                $body
            }
            Track::Angle(c) => {
                let $h = &c.history;
                $body
            }
        }
    };
}

/// Per-object smoothing record: value history plus the values produced for the current draw.
#[derive(Debug, Clone)]
pub struct SmoothingState {
    id: ObjectId,
    kind: KindId,
    role: KindRole,
    track: Track,
    was_invisible: bool,

    original: Option<Sample>,
    smoothed: Option<Sample>,
    computed_stamp: u64,
    pub(crate) computing: bool,
}

impl SmoothingState {
    pub fn new(id: ObjectId, kind: KindId, spec: &KindSpec, value: ValueKind) -> Self {
        let depth = spec.history_depth;
        let track = match value {
            ValueKind::Position => Track::Position(Channel::new(depth)),
            ValueKind::Scalar => Track::Scalar(Channel::new(depth)),
            ValueKind::Angle => Track::Angle(Channel::new(depth)),
            ValueKind::Percent => Track::Percent(Channel::new(depth)),
        };
        Self {
            id,
            kind,
            role: spec.role,
            track,
            was_invisible: false,
            original: None,
            smoothed: None,
            computed_stamp: 0,
            computing: false,
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> KindId {
        self.kind
    }

    #[inline]
    pub fn role(&self) -> KindRole {
        self.role
    }

    pub fn value_kind(&self) -> ValueKind {
        match self.track {
            Track::Position(_) => ValueKind::Position,
            Track::Scalar(_) => ValueKind::Scalar,
            Track::Angle(_) => ValueKind::Angle,
            Track::Percent(_) => ValueKind::Percent,
        }
    }

    pub fn phase(&self) -> StatePhase {
        match self.sample_count() {
            0 => StatePhase::PendingFirstSample,
            1 => StatePhase::Unsmoothed,
            _ => StatePhase::Steady,
        }
    }

    #[inline]
    pub fn sample_count(&self) -> u64 {
        with_history!(&self.track, h => h.samples())
    }

    /// Hidden at some sample since it was last drawn visible.
    #[inline]
    pub fn was_invisible(&self) -> bool {
        self.was_invisible
    }

    /// The two newest samples differ.
    #[inline]
    pub fn changed(&self) -> bool {
        with_history!(&self.track, h => h.changed())
    }

    /// History slot `index`, 0 being the newest sample.
    pub fn history(&self, index: usize) -> Option<Sample> {
        match &self.track {
            Track::Position(c) => c.history.get(index).map(Sample::Position),
            Track::Scalar(c) => c.history.get(index).map(Sample::Scalar),
            Track::Angle(c) => c.history.get(index).map(Sample::Angle),
            Track::Percent(c) => c.history.get(index).map(Sample::Percent),
        }
    }

    #[inline]
    pub fn newest(&self) -> Option<Sample> {
        self.history(0)
    }

    #[inline]
    pub fn previous(&self) -> Option<Sample> {
        self.history(1)
    }

    /// Newest two positions, for position-valued objects.
    pub fn position_pair(&self) -> Option<(Vec2, Vec2)> {
        match &self.track {
            Track::Position(c) => Some((c.history.previous()?, c.history.newest()?)),
            _ => None,
        }
    }

    /// Value written during the current draw, if one was computed.
    #[inline]
    pub fn smoothed(&self) -> Option<Sample> {
        self.smoothed
    }

    /// Authoritative value captured when the current draw's value was computed.
    #[inline]
    pub fn original(&self) -> Option<Sample> {
        self.original
    }

    /// `smoothed - original` for position-valued objects.
    pub fn position_delta(&self) -> Option<Vec2> {
        match (self.smoothed?, self.original?) {
            (Sample::Position(s), Sample::Position(o)) => Some(s - o),
            _ => None,
        }
    }

    /// Appends one authoritative sample taken at the end of a step.
    pub(crate) fn record(&mut self, sample: Sample, visible: bool) {
        if !visible {
            self.was_invisible = true;
        }
        match (&mut self.track, sample) {
            (Track::Position(c), Sample::Position(v)) => c.history.push(v),
            (Track::Scalar(c), Sample::Scalar(v)) => c.history.push(v),
            (Track::Angle(c), Sample::Angle(v)) => c.history.push(v),
            (Track::Percent(c), Sample::Percent(v)) => c.history.push(v.clamp(0.0, 1.0)),
            _ => bad_state("sample kind does not match tracked history"),
        }
    }

    /// Clears the sticky invisibility flag, reporting whether it was set.
    #[inline]
    pub(crate) fn take_was_invisible(&mut self) -> bool {
        std::mem::replace(&mut self.was_invisible, false)
    }

    /// The newest step left an unset sample or moved further than `threshold`.
    pub(crate) fn snaps(&self, threshold: f32) -> bool {
        with_history!(&self.track, h => snaps(h, threshold))
    }

    /// Generic smoothing of this object's history.
    pub(crate) fn smooth(&self, authoritative: Sample, params: &SmoothParams) -> Sample {
        match (&self.track, authoritative) {
            (Track::Position(c), Sample::Position(a)) => {
                Sample::Position(smooth(&c.history, a, params))
            }
            (Track::Scalar(c), Sample::Scalar(a)) => Sample::Scalar(smooth(&c.history, a, params)),
            (Track::Angle(c), Sample::Angle(a)) => Sample::Angle(smooth(&c.history, a, params)),
            (Track::Percent(c), Sample::Percent(a)) => {
                Sample::Percent(smooth(&c.history, a, params).clamp(0.0, 1.0))
            }
            _ => bad_state("sample kind does not match tracked history"),
        }
    }

    #[inline]
    pub(crate) fn is_computed(&self, stamp: u64) -> bool {
        self.computed_stamp == stamp && self.smoothed.is_some()
    }

    pub(crate) fn finish(&mut self, original: Sample, smoothed: Sample, stamp: u64) {
        self.original = Some(original);
        self.smoothed = Some(smoothed);
        self.computed_stamp = stamp;
        self.computing = false;
    }
}
