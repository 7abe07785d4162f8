use std::fmt;

use crate::math::{lerp, Angle, Vec2};

/// A value type the smoothing math can work on.
pub trait Smoothable: Copy + PartialEq + Default + fmt::Debug {
    /// "Never written" sentinel: a freshly spawned or reset object.
    fn is_unset(&self) -> bool;

    fn interpolate(from: Self, to: Self, t: f32) -> Self;

    /// `newest` pushed further along the last step's motion by `factor` steps.
    fn extrapolate(previous: Self, newest: Self, factor: f32) -> Self;

    /// Squared distance for teleport detection. Values without a spatial meaning return `None`.
    fn distance_squared(_a: Self, _b: Self) -> Option<f32> {
        None
    }
}

impl Smoothable for Vec2 {
    #[inline]
    fn is_unset(&self) -> bool {
        *self == Vec2::ZERO || !self.is_finite()
    }

    #[inline]
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        from.lerp(to, t)
    }

    #[inline]
    fn extrapolate(previous: Self, newest: Self, factor: f32) -> Self {
        newest + (newest - previous) * factor
    }

    #[inline]
    fn distance_squared(a: Self, b: Self) -> Option<f32> {
        Some(a.distance_squared(b))
    }
}

impl Smoothable for f32 {
    #[inline]
    fn is_unset(&self) -> bool {
        !self.is_finite()
    }

    #[inline]
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        lerp(from, to, t)
    }

    #[inline]
    fn extrapolate(previous: Self, newest: Self, factor: f32) -> Self {
        newest + (newest - previous) * factor
    }
}

impl Smoothable for Angle {
    #[inline]
    fn is_unset(&self) -> bool {
        !self.0.is_finite()
    }

    #[inline]
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        from.lerp(to, t)
    }

    #[inline]
    fn extrapolate(previous: Self, newest: Self, factor: f32) -> Self {
        Angle(newest.0 + previous.delta_to(newest) * factor)
    }
}

/// Which interpretation a kind's sampled value has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// 2D position.
    Position,
    /// Free scalar.
    Scalar,
    /// Rotation in radians, smoothed along the shortest arc.
    Angle,
    /// Progress along a host-defined path, clamped to `[0, 1]`.
    Percent,
}

/// One authoritative or smoothed value as exchanged with host accessors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Position(Vec2),
    Scalar(f32),
    Angle(Angle),
    Percent(f32),
}

impl Sample {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Sample::Position(_) => ValueKind::Position,
            Sample::Scalar(_) => ValueKind::Scalar,
            Sample::Angle(_) => ValueKind::Angle,
            Sample::Percent(_) => ValueKind::Percent,
        }
    }

    #[inline]
    pub fn as_position(&self) -> Option<Vec2> {
        match *self {
            Sample::Position(p) => Some(p),
            _ => None,
        }
    }

    #[inline]
    pub fn as_scalar(&self) -> Option<f32> {
        match *self {
            Sample::Scalar(v) | Sample::Percent(v) => Some(v),
            Sample::Angle(a) => Some(a.0),
            Sample::Position(_) => None,
        }
    }
}
