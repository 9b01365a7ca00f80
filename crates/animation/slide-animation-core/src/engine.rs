//! AnimationEngine: one slide's element registry, group sequencing and
//! completion tracking.
//!
//! Control methods (`add_element`, `start`, `start_grouped`, `next_group`,
//! `emphasis`, `exit`, `skip`, `reset`) return immediately. Completion is only
//! observed through `advance()` (virtual time) and the subscriber callbacks.
//!
//! Two mechanisms make stale completions harmless:
//! - every timer captures the engine generation, bumped by `skip()`/`reset()`;
//! - every triggered phase stores a token on the element, and a completion
//!   only applies if the element still holds that token.

use log::{debug, warn};

use crate::config::{Config, GroupCompletion, LateRegistration, PlaybackMode};
use crate::descriptor::{AnimationKind, ElementSpec, PhaseKind};
use crate::element::ElementState;
use crate::ids::{Generation, IdAllocator, PhaseToken};
use crate::outputs::{EngineEvent, EventBus, Outputs, StateChange};
use crate::registry::{ElementEntry, ElementHandle, ElementRegistry};
use crate::scheduler::{CompletionScheduler, Timer};
use crate::sequencer::GroupSequencer;

#[derive(Debug)]
pub struct AnimationEngine {
    cfg: Config,
    mode: PlaybackMode,
    registry: ElementRegistry,
    sequencer: GroupSequencer,
    scheduler: CompletionScheduler,
    ids: IdAllocator,
    bus: EventBus,
    generation: Generation,

    // Engine-level notification bookkeeping (per playback cycle)
    enter_reported: bool,
    emphasis_round: u64,
    emphasis_reported: u64,
    exit_requested: bool,
    exit_reported: bool,

    // Changes/events produced since the last advance()
    outputs: Outputs,
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AnimationEngine {
    pub fn new(cfg: Config) -> Self {
        Self {
            mode: cfg.mode,
            cfg,
            registry: ElementRegistry::new(),
            sequencer: GroupSequencer::new(),
            scheduler: CompletionScheduler::new(),
            ids: IdAllocator::new(),
            bus: EventBus::default(),
            generation: Generation::default(),
            enter_reported: false,
            emphasis_round: 0,
            emphasis_reported: 0,
            exit_requested: false,
            exit_reported: false,
            outputs: Outputs::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    fn enabled(&self) -> bool {
        self.cfg.animations_enabled
    }

    // ----- registration -----

    /// Register (or replace) an element without a host handle.
    pub fn add_element(&mut self, id: impl Into<String>, spec: ElementSpec) -> &mut Self {
        self.add_element_with_handle(id, None, spec)
    }

    /// Register (or replace) an element. An element with an enter descriptor is
    /// put in its hidden pre-enter state until its enter fires.
    pub fn add_element_with_handle(
        &mut self,
        id: impl Into<String>,
        handle: Option<ElementHandle>,
        spec: ElementSpec,
    ) -> &mut Self {
        let id = id.into();
        let tag = spec.group;

        if !self.enabled() {
            let mut entry = ElementEntry::new(id, handle, spec);
            entry.lifecycle.reveal();
            entry.enter_completed = true;
            entry.emphasis_completed = true;
            entry.exit_completed = true;
            self.registry.insert(entry);
            return self;
        }

        let current_tag = self.registry.tag_at(self.sequencer.current());
        let (slot, is_new) = match tag {
            Some(t) => match self.registry.group_tags().binary_search(&t) {
                Ok(index) => (index, false),
                Err(index) => (index, true),
            },
            None => (0, false),
        };
        let late = self.sequencer.is_late(tag, slot, is_new);
        if late && self.cfg.late_registration == LateRegistration::Reject {
            warn!("element '{id}' registered after its group started; ignored");
            return self;
        }

        let entry = ElementEntry::new(id.clone(), handle, spec);
        let hidden = entry.state() == ElementState::Hidden;
        let handle = entry.handle.clone();
        if self.registry.insert(entry).is_some() {
            warn!("element '{id}' registered twice; replacing previous entry");
        }
        // Keep the pointer on the same tag if a lower tag was just introduced.
        if let (true, Some(cur)) = (self.sequencer.is_started(), current_tag) {
            if let Some(index) = self.registry.group_index(cur) {
                self.sequencer.rebase(index);
            }
        }
        if hidden {
            self.outputs.push_change(StateChange {
                element: id.clone(),
                handle,
                state: ElementState::Hidden,
                kind: None,
            });
        }
        if late {
            debug!("late registration of '{id}'; entering immediately");
            match tag {
                // A group that never fired is fired now so it can report.
                Some(t) if !self.sequencer.was_fired(t) => self.fire_group(t),
                _ => self.fire_enter(&id),
            }
        }
        self
    }

    /// Switch parallel/sequential. Only affects later `start*` calls and
    /// group completions observed from now on.
    pub fn set_mode(&mut self, mode: PlaybackMode) -> &mut Self {
        self.mode = mode;
        self
    }

    #[inline]
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    // ----- playback control -----

    /// Enter every element regardless of groups. Sequential mode staggers the
    /// groups by `sequential_stagger_ms`, each group internally parallel.
    pub fn start(&mut self) -> &mut Self {
        if !self.enabled() {
            return self;
        }
        self.sequencer.start_all();
        for id in self.registry.ungrouped_ids() {
            self.fire_enter(&id);
        }
        let tags = self.registry.group_tags().to_vec();
        for (index, tag) in tags.into_iter().enumerate() {
            if index == 0 || self.mode == PlaybackMode::Parallel {
                self.fire_group(tag);
            } else {
                let delay = self.cfg.sequential_stagger_ms.saturating_mul(index as u64);
                self.scheduler.schedule(
                    delay,
                    Timer::FireGroup {
                        group: tag,
                        generation: self.generation,
                    },
                );
            }
        }
        self.check_all_entered();
        self
    }

    /// Enter group 0 (and ungrouped elements). Later groups follow on
    /// `next_group()`, or automatically in sequential mode. A second call while
    /// grouped playback is active does nothing.
    pub fn start_grouped(&mut self) -> &mut Self {
        if !self.enabled() {
            return self;
        }
        if self.sequencer.start_grouped().is_none() {
            debug!("start_grouped ignored: grouped playback already active");
            return self;
        }
        for id in self.registry.ungrouped_ids() {
            self.fire_enter(&id);
        }
        if let Some(tag) = self.registry.tag_at(0) {
            self.fire_group(tag);
        }
        self
    }

    /// Move to the next group and enter it. No-op at the last group.
    pub fn next_group(&mut self) -> &mut Self {
        if !self.enabled() {
            return self;
        }
        let total = self.registry.total_groups();
        if let Some(index) = self.sequencer.next_group(total) {
            if let Some(tag) = self.registry.tag_at(index) {
                self.fire_group(tag);
            }
        }
        self
    }

    /// Emphasize every entered element that has an emphasis descriptor.
    /// Each call that starts something is a new trigger round; an element
    /// already emphasizing restarts. A call with no eligible element is ignored.
    pub fn emphasis(&mut self) -> &mut Self {
        if !self.enabled() {
            return self;
        }
        let round = self.emphasis_round + 1;
        let mut started = false;
        for id in self.sorted_ids_with(PhaseKind::Emphasis) {
            let Some(entry) = self.registry.get_mut(&id) else {
                continue;
            };
            if !entry.enter_completed || !entry.lifecycle.begin_emphasis(round) {
                continue;
            }
            started = true;
            self.begin_phase(&id, PhaseKind::Emphasis);
        }
        if started {
            self.emphasis_round = round;
        } else {
            debug!("emphasis ignored: no entered element with an emphasis animation");
        }
        self
    }

    /// Exit every element with an exit descriptor. An element still entering or
    /// emphasizing has that phase completed first, without waiting for it.
    /// Groups finished this way still report, but no further group starts.
    pub fn exit(&mut self) -> &mut Self {
        if !self.enabled() {
            return self;
        }
        self.exit_requested = true;
        self.sequencer.halt();
        let mut touched_groups: Vec<u32> = Vec::new();
        for id in self.sorted_ids_with(PhaseKind::Exit) {
            let Some(entry) = self.registry.get_mut(&id) else {
                continue;
            };
            if entry.exit_completed {
                continue;
            }
            let mut interrupted = Vec::new();
            match entry.state() {
                ElementState::Hidden => {
                    entry.enter_completed = true;
                }
                ElementState::Entering => {
                    entry.lifecycle.finish_enter();
                    entry.mark_completed(PhaseKind::Enter);
                    interrupted.push(PhaseKind::Enter);
                }
                ElementState::Emphasizing => {
                    let round = entry.lifecycle.emphasis_round();
                    entry.lifecycle.finish_emphasis(round);
                    entry.mark_completed(PhaseKind::Emphasis);
                    interrupted.push(PhaseKind::Emphasis);
                }
                _ => {}
            }
            if let Some(tag) = entry.group() {
                touched_groups.push(tag);
            }
            if !entry.lifecycle.begin_exit() {
                continue;
            }
            for phase in interrupted {
                self.emit(EngineEvent::PhaseCompleted {
                    element: id.clone(),
                    phase,
                });
            }
            self.begin_phase(&id, PhaseKind::Exit);
        }
        touched_groups.sort_unstable();
        touched_groups.dedup();
        for tag in touched_groups {
            self.check_group(tag);
        }
        self.check_all_entered();
        self.check_emphasis_complete();
        self.check_exit_complete();
        self
    }

    /// Complete everything now. Pending timers are cancelled and any that still
    /// arrive are ignored; each engine-level notification not yet delivered in
    /// this cycle is delivered exactly once.
    pub fn skip(&mut self) -> &mut Self {
        if !self.enabled() {
            return self;
        }
        self.generation = self.generation.next();
        self.scheduler.cancel_stale(self.generation);

        let mut changes = Vec::new();
        for entry in self.registry.iter_mut() {
            entry.pending = None;
            let before = entry.state();
            if before == ElementState::Exiting {
                entry.lifecycle.finish_exit();
            } else {
                entry.lifecycle.reveal();
            }
            entry.enter_completed = true;
            entry.emphasis_completed = true;
            entry.exit_completed = true;
            if entry.state() != before {
                changes.push(StateChange {
                    element: entry.id.clone(),
                    handle: entry.handle.clone(),
                    state: entry.state(),
                    kind: None,
                });
            }
        }
        changes.sort_by(|a, b| a.element.cmp(&b.element));
        self.outputs.changes.extend(changes);

        let tags = self.registry.group_tags().to_vec();
        self.sequencer.finish_all(&tags);
        self.sequencer.start_all();
        self.emit(EngineEvent::Skipped);

        self.report_enter();
        let round = self.emphasis_round.max(1);
        self.emphasis_round = round;
        if self.emphasis_reported < round {
            self.emphasis_reported = round;
            self.emit(EngineEvent::EmphasisComplete);
        }
        self.exit_requested = true;
        if !self.exit_reported {
            self.exit_reported = true;
            self.emit(EngineEvent::ExitComplete);
        }
        self
    }

    /// Drop all elements, timers and subscribers. The engine is afterwards
    /// equivalent to a freshly constructed one (virtual time keeps running).
    pub fn reset(&mut self) -> &mut Self {
        self.generation = self.generation.next();
        self.scheduler.clear();
        self.registry.clear();
        self.sequencer.reset();
        self.bus.clear();
        self.mode = self.cfg.mode;
        self.enter_reported = false;
        self.emphasis_round = 0;
        self.emphasis_reported = 0;
        self.exit_requested = false;
        self.exit_reported = false;
        self.outputs.clear();
        self.outputs.push_event(EngineEvent::Reset);
        self
    }

    // ----- clock -----

    /// Advance virtual time by `dt_ms`, firing every due completion in order.
    /// Returns the changes and events produced since the previous call,
    /// including those from synchronous operations such as `skip()`.
    pub fn advance(&mut self, dt_ms: u64) -> Outputs {
        let target = self.scheduler.now_ms().saturating_add(dt_ms);
        while let Some(timer) = self.scheduler.pop_due(target) {
            self.handle_timer(timer);
        }
        self.scheduler.settle(target);
        self.take_outputs()
    }

    /// Fire every pending timer, however far in the future.
    pub fn run_until_idle(&mut self) -> Outputs {
        while let Some(deadline) = self.scheduler.next_deadline() {
            if let Some(timer) = self.scheduler.pop_due(deadline) {
                self.handle_timer(timer);
            }
        }
        self.take_outputs()
    }

    fn take_outputs(&mut self) -> Outputs {
        let mut out = std::mem::take(&mut self.outputs);
        out.now_ms = self.scheduler.now_ms();
        out
    }

    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    #[inline]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    // ----- queries -----

    /// Whether grouped enter playback is finished. See [`GroupCompletion`].
    pub fn is_all_groups_complete(&self) -> bool {
        if !self.enabled() {
            return true;
        }
        let total = self.registry.total_groups();
        let at_end = self.sequencer.pointer_at_end(total);
        match self.cfg.group_completion {
            GroupCompletion::Pointer => at_end,
            GroupCompletion::Confirmed => {
                at_end && (total == 0 || self.registry.all_grouped_entered())
            }
        }
    }

    #[inline]
    pub fn get_current_group(&self) -> usize {
        self.sequencer.current()
    }

    #[inline]
    pub fn get_total_groups(&self) -> usize {
        self.registry.total_groups()
    }

    /// Every element with an enter descriptor has entered.
    pub fn is_enter_complete(&self) -> bool {
        !self.enabled() || self.registry.phase_complete(PhaseKind::Enter)
    }

    pub fn is_emphasis_complete(&self) -> bool {
        !self.enabled() || self.registry.phase_complete(PhaseKind::Emphasis)
    }

    pub fn is_exit_complete(&self) -> bool {
        !self.enabled() || self.registry.phase_complete(PhaseKind::Exit)
    }

    /// Some element declares an emphasis animation.
    pub fn has_emphasis(&self) -> bool {
        self.enabled() && self.registry.declares(PhaseKind::Emphasis)
    }

    pub fn has_exit(&self) -> bool {
        self.enabled() && self.registry.declares(PhaseKind::Exit)
    }

    /// Some element is currently animating `phase`.
    pub fn is_running(&self, phase: PhaseKind) -> bool {
        self.enabled() && self.registry.any_in_phase(phase)
    }

    #[inline]
    pub fn is_grouped_playback_active(&self) -> bool {
        self.sequencer.is_grouped_active()
    }

    #[inline]
    pub fn element(&self, id: &str) -> Option<&ElementEntry> {
        self.registry.get(id)
    }

    /// Registered elements, in no particular order.
    pub fn elements(&self) -> impl Iterator<Item = &ElementEntry> {
        self.registry.iter()
    }

    pub fn element_state(&self, id: &str) -> Option<ElementState> {
        self.registry.get(id).map(|e| e.state())
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.registry.len()
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    // ----- subscriptions -----

    pub fn on_enter_complete(&mut self, cb: impl FnMut() + 'static) -> &mut Self {
        self.bus.on_enter_complete(cb);
        self
    }

    pub fn on_emphasis_complete(&mut self, cb: impl FnMut() + 'static) -> &mut Self {
        self.bus.on_emphasis_complete(cb);
        self
    }

    pub fn on_exit_complete(&mut self, cb: impl FnMut() + 'static) -> &mut Self {
        self.bus.on_exit_complete(cb);
        self
    }

    /// `cb(group_tag, is_last_group)`
    pub fn on_group_complete(&mut self, cb: impl FnMut(u32, bool) + 'static) -> &mut Self {
        self.bus.on_group_complete(cb);
        self
    }

    // ----- internals -----

    fn emit(&mut self, event: EngineEvent) {
        self.bus.dispatch(&event);
        self.outputs.push_event(event);
    }

    fn sorted_ids_with(&self, phase: PhaseKind) -> Vec<String> {
        let mut ids: Vec<String> = self
            .registry
            .iter()
            .filter(|e| e.has(phase))
            .map(|e| e.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Enter every member of `tag` and evaluate the group right away, so a
    /// group with nothing left to animate completes synchronously.
    fn fire_group(&mut self, tag: u32) {
        if self.sequencer.was_fired(tag) {
            return;
        }
        let Some(index) = self.registry.group_index(tag) else {
            return;
        };
        self.sequencer.mark_fired(tag, index);
        debug!("group {tag} (#{index}) entering");
        self.emit(EngineEvent::GroupStarted { group: tag, index });
        for id in self.registry.ids_in_group(tag) {
            self.fire_enter(&id);
        }
        self.check_group(tag);
    }

    fn fire_enter(&mut self, id: &str) {
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };
        if entry.spec.enter.is_none() || !entry.lifecycle.begin_enter() {
            return;
        }
        self.begin_phase(id, PhaseKind::Enter);
    }

    /// Schedule completion for a phase whose lifecycle transition already
    /// happened, and publish the start.
    fn begin_phase(&mut self, id: &str, phase: PhaseKind) {
        let token = self.ids.alloc_token();
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };
        let (delay, kind): (u64, Option<AnimationKind>) = match entry.spec.descriptor(phase) {
            Some(d) => (d.total_ms(), Some(d.kind.clone())),
            None => (0, None),
        };
        entry.pending = Some((phase, token));
        self.outputs.push_change(StateChange {
            element: entry.id.clone(),
            handle: entry.handle.clone(),
            state: entry.state(),
            kind,
        });
        self.scheduler.schedule(
            delay,
            Timer::PhaseComplete {
                element: id.to_string(),
                phase,
                token,
                generation: self.generation,
            },
        );
        self.emit(EngineEvent::PhaseStarted {
            element: id.to_string(),
            phase,
        });
    }

    fn handle_timer(&mut self, timer: Timer) {
        if timer.generation() != self.generation {
            return;
        }
        match timer {
            Timer::FireGroup { group, .. } => {
                if self.sequencer.is_halted() {
                    debug!("group {group} not started: slide is exiting");
                } else {
                    self.fire_group(group);
                }
            }
            Timer::PhaseComplete {
                element,
                phase,
                token,
                ..
            } => self.complete_phase(&element, phase, token),
        }
    }

    fn complete_phase(&mut self, id: &str, phase: PhaseKind, token: PhaseToken) {
        let Some(entry) = self.registry.get_mut(id) else {
            return;
        };
        if entry.pending != Some((phase, token)) {
            return;
        }
        entry.pending = None;
        let finished = match phase {
            PhaseKind::Enter => entry.lifecycle.finish_enter(),
            PhaseKind::Emphasis => {
                let round = entry.lifecycle.emphasis_round();
                entry.lifecycle.finish_emphasis(round)
            }
            PhaseKind::Exit => entry.lifecycle.finish_exit(),
        };
        if !finished {
            return;
        }
        entry.mark_completed(phase);
        let group = entry.group();
        self.outputs.push_change(StateChange {
            element: entry.id.clone(),
            handle: entry.handle.clone(),
            state: entry.state(),
            kind: None,
        });
        self.emit(EngineEvent::PhaseCompleted {
            element: id.to_string(),
            phase,
        });
        match phase {
            PhaseKind::Enter => {
                if let Some(tag) = group {
                    self.check_group(tag);
                }
                self.check_all_entered();
            }
            PhaseKind::Emphasis => self.check_emphasis_complete(),
            PhaseKind::Exit => self.check_exit_complete(),
        }
    }

    /// Group completion: evaluated synchronously at the completion that
    /// finishes the group. The group count is read now, not cached.
    fn check_group(&mut self, tag: u32) {
        if !self.sequencer.was_fired(tag) || !self.registry.group_entered(tag) {
            return;
        }
        let Some(index) = self.registry.group_index(tag) else {
            return;
        };
        let total = self.registry.total_groups();
        let outcome = self.sequencer.on_group_entered(tag, index, total, self.mode);
        if !outcome.report {
            return;
        }
        debug!("group {tag} complete (last: {})", outcome.is_last);
        self.emit(EngineEvent::GroupComplete {
            group: tag,
            index,
            is_last: outcome.is_last,
        });
        if outcome.is_last {
            if self.sequencer.is_grouped_active() {
                self.report_enter();
            }
        } else if let Some(next) = outcome.advance_to {
            if let Some(next_tag) = self.registry.tag_at(next) {
                self.fire_group(next_tag);
            }
        }
    }

    /// `start()` path: every element with an enter descriptor has entered.
    /// Grouped playback reports through the last group instead.
    fn check_all_entered(&mut self) {
        if self.sequencer.is_started_all() && self.registry.phase_complete(PhaseKind::Enter) {
            self.report_enter();
        }
    }

    fn report_enter(&mut self) {
        if !self.enter_reported {
            self.enter_reported = true;
            self.emit(EngineEvent::EnterComplete);
        }
    }

    fn check_emphasis_complete(&mut self) {
        if self.emphasis_round > self.emphasis_reported
            && !self.registry.any_in_phase(PhaseKind::Emphasis)
            && self.registry.phase_complete(PhaseKind::Emphasis)
        {
            self.emphasis_reported = self.emphasis_round;
            self.emit(EngineEvent::EmphasisComplete);
        }
    }

    fn check_exit_complete(&mut self) {
        if self.exit_requested
            && !self.exit_reported
            && !self.registry.any_in_phase(PhaseKind::Exit)
            && self.registry.phase_complete(PhaseKind::Exit)
        {
            self.exit_reported = true;
            self.emit(EngineEvent::ExitComplete);
        }
    }
}
