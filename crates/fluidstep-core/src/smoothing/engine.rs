use crate::error::{FluidError, FluidResult};
use crate::host::{HostWorld, KindId, ObjectId};
use crate::math::Vec2;
use crate::player::{PlayerExtrapolator, PlayerFrame};
use crate::pusher::PusherOffsetTracker;

use super::accessor::Accessor;
use super::kind::{KindRegistry, KindRole, KindSpec};
use super::policy::{SmoothParams, SmoothingMode, DEFAULT_TELEPORT_THRESHOLD};
use super::registry::ObjectSmoothingRegistry;
use super::rules::{OverrideRule, OverrideRules};
use super::state::SmoothingState;
use super::value::{Sample, Smoothable};

#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingSettings {
    pub enabled: bool,
    pub mode: SmoothingMode,
    /// Mode used for the player object only.
    pub player_mode: SmoothingMode,
    pub teleport_threshold: f32,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: SmoothingMode::Interpolate,
            player_mode: SmoothingMode::Extrapolate,
            teleport_threshold: DEFAULT_TELEPORT_THRESHOLD,
        }
    }
}

/// Per-draw inputs shared by every object.
struct DrawCx {
    fraction: f32,
    time_rate: f32,
    player: Option<ObjectId>,
}

/// Owns the tracked table and turns histories into draw-time values.
///
/// Call order per iteration: `update_history` after each simulation step, then per draw
/// `compute_smoothed`, `apply_smoothed`, the host draw, `restore_original`.
pub struct SmoothingEngine<W> {
    kinds: KindRegistry<W>,
    registry: ObjectSmoothingRegistry<W>,
    rules: OverrideRules<W>,
    settings: SmoothingSettings,
    draw_stamp: u64,
    applied: bool,
    scratch: Vec<(ObjectId, KindId)>,
}

impl<W: HostWorld> SmoothingEngine<W> {
    pub fn new(settings: SmoothingSettings) -> Self {
        Self {
            kinds: KindRegistry::new(),
            registry: ObjectSmoothingRegistry::new(),
            rules: OverrideRules::new(),
            settings,
            draw_stamp: 0,
            applied: false,
            scratch: Vec::new(),
        }
    }

    #[inline]
    pub fn settings(&self) -> &SmoothingSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SmoothingSettings) {
        if settings != self.settings {
            log::info!(
                "smoothing: enabled={} mode={:?} player_mode={:?}",
                settings.enabled,
                settings.mode,
                settings.player_mode
            );
        }
        self.settings = settings;
    }

    pub fn register_kind(&mut self, kind: KindId, spec: KindSpec, accessor: Accessor<W>) {
        self.kinds.register(kind, spec, accessor);
    }

    #[inline]
    pub fn kinds(&self) -> &KindRegistry<W> {
        &self.kinds
    }

    pub fn add_rule(&mut self, rule: impl OverrideRule<W> + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Starts tracking `id`. Returns `Ok(false)` when it was already tracked.
    pub fn track(&mut self, id: ObjectId, kind: KindId) -> FluidResult<bool> {
        let Some(entry) = self.kinds.get(kind) else {
            log::error!(
                "smoothing: object {:?} has kind '{}' with no registered accessor",
                id,
                kind.name()
            );
            return Err(FluidError::UnsupportedKind(kind.name()));
        };
        Ok(self.registry.insert(id, entry))
    }

    /// Returns `false` when `id` was not tracked.
    pub fn untrack(&mut self, id: ObjectId) -> bool {
        self.registry.remove(id)
    }

    pub fn clear_all(&mut self) {
        self.registry.clear();
        self.applied = false;
    }

    /// Replaces the tracked table with the world's live objects.
    ///
    /// Objects of kinds without an accessor are skipped here: a scene may legitimately contain
    /// things that are never smoothed.
    pub fn rescan(&mut self, world: &W) -> usize {
        self.clear_all();
        let mut live = std::mem::take(&mut self.scratch);
        live.clear();
        world.live_objects(&mut live);

        let mut tracked = 0usize;
        let mut skipped = 0usize;
        for &(id, kind) in &live {
            match self.kinds.get(kind) {
                Some(entry) => {
                    if self.registry.insert(id, entry) {
                        tracked += 1;
                    }
                }
                None => skipped += 1,
            }
        }
        live.clear();
        self.scratch = live;

        log::debug!("smoothing: rescan tracked {tracked} objects, skipped {skipped}");
        tracked
    }

    #[inline]
    pub fn state(&self, id: ObjectId) -> Option<&SmoothingState> {
        self.registry.state(id)
    }

    pub fn states(&self) -> impl Iterator<Item = &SmoothingState> + '_ {
        self.registry.states()
    }

    #[inline]
    pub fn is_tracked(&self, id: ObjectId) -> bool {
        self.registry.contains(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Smoothed values are currently written onto the objects.
    #[inline]
    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Samples every tracked object. Runs exactly once per simulation step, after it.
    pub fn update_history(&mut self, world: &W) {
        for t in self.registry.tracked_mut() {
            let id = t.state.id();
            let sample = t.kind.accessor.sample(world, id);
            let visible = t.kind.accessor.is_visible(world, id);
            t.state.record(sample, visible);
        }
    }

    /// Computes this draw's value for every tracked object, the player first.
    pub fn compute_smoothed(
        &mut self,
        world: &mut W,
        fraction: f32,
        pushers: &PusherOffsetTracker,
        player: &mut PlayerExtrapolator,
    ) {
        if !self.settings.enabled {
            return;
        }
        self.draw_stamp += 1;

        let cx = DrawCx {
            fraction,
            time_rate: world.time_rate(),
            player: world.player().filter(|p| self.registry.contains(*p)),
        };

        if let Some(p) = cx.player {
            self.ensure_smoothed(world, p, &cx, pushers, player);
        }
        for i in 0..self.registry.len() {
            let id = self.registry.ids()[i];
            self.ensure_smoothed(world, id, &cx, pushers, player);
        }
    }

    /// Writes this draw's smoothed values onto the objects.
    pub fn apply_smoothed(&mut self, world: &mut W) {
        if !self.settings.enabled {
            return;
        }
        for &id in self.registry.ids() {
            let Some(t) = self.registry.get(id) else {
                continue;
            };
            if !t.state.is_computed(self.draw_stamp) {
                continue;
            }
            if let (Some(s), Some(o)) = (t.state.smoothed(), t.state.original()) {
                if s != o {
                    t.kind.accessor.apply(world, id, s);
                }
            }
        }
        self.applied = true;
    }

    /// Puts the authoritative values back. Safe to call when nothing was applied.
    pub fn restore_original(&mut self, world: &mut W) {
        if !self.applied {
            return;
        }
        for &id in self.registry.ids() {
            let Some(t) = self.registry.get(id) else {
                continue;
            };
            if !t.state.is_computed(self.draw_stamp) {
                continue;
            }
            if let (Some(s), Some(o)) = (t.state.smoothed(), t.state.original()) {
                if s != o {
                    t.kind.accessor.apply(world, id, o);
                }
            }
        }
        self.applied = false;
    }

    /// Returns `false` if `id` is untracked or its value is part of a push cycle being computed.
    fn ensure_smoothed(
        &mut self,
        world: &mut W,
        id: ObjectId,
        cx: &DrawCx,
        pushers: &PusherOffsetTracker,
        player: &mut PlayerExtrapolator,
    ) -> bool {
        let stamp = self.draw_stamp;
        let kind = {
            let Some(t) = self.registry.get_mut(id) else {
                return false;
            };
            if t.state.is_computed(stamp) {
                return true;
            }
            if t.state.computing {
                log::trace!("smoothing: push cycle through {id:?}");
                return false;
            }
            t.state.computing = true;
            t.kind.clone()
        };

        let original = kind.accessor.sample(world, id);
        let smoothed = self.smooth_object(world, id, kind.spec.role, original, cx, pushers, player);

        if let Some(t) = self.registry.get_mut(id) {
            t.state.finish(original, smoothed, stamp);
        }
        true
    }

    #[allow(clippy::too_many_arguments)]
    fn smooth_object(
        &mut self,
        world: &mut W,
        id: ObjectId,
        role: KindRole,
        original: Sample,
        cx: &DrawCx,
        pushers: &PusherOffsetTracker,
        player: &mut PlayerExtrapolator,
    ) -> Sample {
        if self.cancelled(world, id) {
            return original;
        }

        if let Some(carried) = self.carried_by_player(world, id, original, cx) {
            return carried;
        }

        let push_offset = self.push_offset(world, id, cx, pushers, player);

        if cx.player == Some(id) {
            return self.smooth_player(world, id, original, push_offset, cx, player);
        }

        if let (Some(offset), Sample::Position(pos)) = (push_offset, original) {
            return Sample::Position(pos + offset);
        }

        let mode = match role {
            KindRole::Camera => SmoothingMode::Interpolate,
            _ => self.settings.mode,
        };
        self.smooth_generic(id, original, mode, cx)
    }

    /// Visibility, snap and override checks that force the authoritative value on every path.
    fn cancelled(&mut self, world: &W, id: ObjectId) -> bool {
        let Some(t) = self.registry.get_mut(id) else {
            return true;
        };
        if !t.kind.accessor.is_visible(world, id) {
            return true;
        }
        if t.state.take_was_invisible() {
            return true;
        }
        if t.state.snaps(self.settings.teleport_threshold) {
            return true;
        }
        if let Some(rule) = self.rules.first_exempting(world, &t.state) {
            log::trace!("smoothing: {id:?} exempted by '{rule}'");
            return true;
        }
        false
    }

    fn carried_by_player(
        &self,
        world: &W,
        id: ObjectId,
        original: Sample,
        cx: &DrawCx,
    ) -> Option<Sample> {
        let pid = cx.player?;
        if pid == id {
            return None;
        }
        let pos = original.as_position()?;
        if !world.carried_by_player(id) {
            return None;
        }
        let delta = self
            .registry
            .state(pid)
            .filter(|s| s.is_computed(self.draw_stamp))?
            .position_delta()?;
        Some(Sample::Position(pos + delta))
    }

    /// Sum of the smoothing deltas of the platforms that moved `id` this step.
    fn push_offset(
        &mut self,
        world: &mut W,
        id: ObjectId,
        cx: &DrawCx,
        pushers: &PusherOffsetTracker,
        player: &mut PlayerExtrapolator,
    ) -> Option<Vec2> {
        let mut sum = Vec2::ZERO;
        let mut any = false;
        for &p in pushers.pushers_of(id) {
            if !self.ensure_smoothed(world, p, cx, pushers, player) {
                continue;
            }
            let Some(t) = self.registry.get(p) else {
                continue;
            };
            if !t.state.changed() {
                continue;
            }
            let (Some(s), Some(o)) = (t.state.smoothed(), t.state.original()) else {
                continue;
            };
            let (Some(sp), Some(op)) = (
                t.kind.accessor.position_of(world, p, s),
                t.kind.accessor.position_of(world, p, o),
            ) else {
                continue;
            };
            sum += sp - op;
            any = true;
        }
        any.then_some(sum)
    }

    fn smooth_player(
        &self,
        world: &mut W,
        id: ObjectId,
        original: Sample,
        push_offset: Option<Vec2>,
        cx: &DrawCx,
        player: &mut PlayerExtrapolator,
    ) -> Sample {
        let Sample::Position(pos) = original else {
            return self.smooth_generic(id, original, self.settings.player_mode, cx);
        };

        match self.settings.player_mode {
            SmoothingMode::None => original,
            SmoothingMode::Interpolate => match push_offset {
                Some(offset) => Sample::Position(pos + offset),
                None => self.smooth_generic(id, original, SmoothingMode::Interpolate, cx),
            },
            SmoothingMode::Extrapolate => {
                let Some((previous, newest)) = self.state(id).and_then(|s| s.position_pair())
                else {
                    return original;
                };
                if previous.is_unset() || newest.is_unset() {
                    return original;
                }
                let frame = PlayerFrame {
                    previous,
                    newest,
                    authoritative: pos,
                    fraction: cx.fraction,
                    time_rate: cx.time_rate,
                    frozen: world.simulation_frozen(),
                    gravity_inverted: world.gravity_inverted(id).unwrap_or(false),
                    push_offset,
                    teleport_threshold: self.settings.teleport_threshold,
                };
                Sample::Position(player.extrapolate(&frame, world.input()))
            }
        }
    }

    fn smooth_generic(
        &self,
        id: ObjectId,
        original: Sample,
        mode: SmoothingMode,
        cx: &DrawCx,
    ) -> Sample {
        let Some(state) = self.state(id) else {
            return original;
        };
        state.smooth(
            original,
            &SmoothParams {
                mode,
                fraction: cx.fraction,
                time_rate: cx.time_rate,
                teleport_threshold: self.settings.teleport_threshold,
            },
        )
    }
}
