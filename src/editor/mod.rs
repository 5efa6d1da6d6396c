//! Timeline editor: the single owner of the interaction list.
//!
//! `Editor` ties the engine pieces together:
//! - [`InteractionList`] - the only shared mutable state
//! - [`TimelineState`] - viewport + marker gestures
//! - [`SelectionState`] / [`FormState`] - what is hovered, selected, edited
//! - [`SyncPipeline`] - optimistic persistence
//! - [`Notifications`] - failures the user must see
//!
//! Widgets never mutate the editor; they emit events which the app feeds to
//! [`Editor::handle_event`] once per frame. The editor in turn emits
//! notification events (seek, saved, failed...) on the same bus.
//!
//! Call [`Editor::tick`] every frame: it advances the video clock, follows the
//! playhead, sends due debounced moves and applies finished store calls.

pub mod editor_events;
pub mod form;
pub mod hotkeys;
pub mod selection;

pub use form::{FormState, FormTarget, SaveDecision};
pub use hotkeys::{EditorCommand, HotkeyHandler};
pub use selection::{AddStep, EditorMode, ModeClass, SelectionState};

use crate::core::event_bus::{BoxedEvent, EventBus, downcast_event};
use crate::core::notifications::{Notifications, ToastLevel};
use crate::core::playback::{PlaybackState, VideoHost};
use crate::entities::{Interaction, InteractionId, InteractionKind, InteractionList};
use crate::sync::{SyncOp, SyncOutcome, SyncPipeline};
use crate::validation::ConflictRules;
use crate::widgets::timeline::gestures::{GestureAction, PointerInput, add_at_playhead};
use crate::widgets::timeline::timeline_events::{
    MinimapClickEvent, TimelineFollowChangedEvent, TimelinePointerEvent, TimelineScrollEvent,
};
use crate::widgets::timeline::timeline_helpers::Minimap;
use crate::widgets::timeline::{TimelineState, TimelineView};
use editor_events::*;
use log::{debug, info, trace};
use std::time::Instant;

pub struct Editor<V: VideoHost = PlaybackState> {
    list: InteractionList,
    pub timeline: TimelineState,
    selection: SelectionState,
    form: Option<FormState>,
    pipeline: SyncPipeline,
    notifications: Notifications,
    hotkeys: HotkeyHandler,
    rules: ConflictRules,
    bus: EventBus,
    pub video: V,
    /// A text field has keyboard focus (set by the UI each frame)
    text_focus: bool,
    /// Playback position at the previous tick, for pause triggers
    last_play_time: f64,
}

impl<V: VideoHost> Editor<V> {
    /// Mount the editor and request the initial list.
    pub fn new(mut pipeline: SyncPipeline, video: V, bus: EventBus) -> Self {
        pipeline.load();
        let duration = video.duration().unwrap_or(0.0);
        let last_play_time = video.current_time();
        Self {
            list: InteractionList::new(),
            timeline: TimelineState::new(duration),
            selection: SelectionState::default(),
            form: None,
            pipeline,
            notifications: Notifications::default(),
            hotkeys: HotkeyHandler::default(),
            rules: ConflictRules::default(),
            bus,
            video,
            text_focus: false,
            last_play_time,
        }
    }

    pub fn with_rules(mut self, rules: ConflictRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_notifications(mut self, notifications: Notifications) -> Self {
        self.notifications = notifications;
        self
    }

    // ===== Accessors =====

    pub fn list(&self) -> &InteractionList {
        &self.list
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    pub fn pipeline(&self) -> &SyncPipeline {
        &self.pipeline
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn rules(&self) -> &ConflictRules {
        &self.rules
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn hotkeys_mut(&mut self) -> &mut HotkeyHandler {
        &mut self.hotkeys
    }

    pub fn video_duration(&self) -> f64 {
        self.video.duration().unwrap_or(0.0)
    }

    pub fn current_time(&self) -> f64 {
        self.video.current_time()
    }

    pub fn set_text_focus(&mut self, focused: bool) {
        self.text_focus = focused;
    }

    /// Read-only view for the timeline renderer plus its mutable state.
    pub fn timeline_parts(&mut self) -> (TimelineView<'_>, &mut TimelineState) {
        let view = TimelineView {
            list: &self.list,
            selection: &self.selection,
            current_time: self.video.current_time(),
            playing: self.video.is_playing(),
        };
        (view, &mut self.timeline)
    }

    // ===== Frame loop =====

    /// Per-frame update.
    pub fn tick(&mut self, now: Instant) {
        self.sync_duration();

        if let Some(t) = self.video.update(now) {
            self.pause_at_triggers(t);
            self.timeline.on_time_update(t, self.video.is_playing());
        }

        let sent = self.pipeline.tick(now);
        if sent > 0 {
            trace!("Sent {} debounced move(s)", sent);
        }
        self.sync();
        self.notifications.expire(now);
    }

    /// Apply finished store calls.
    pub fn sync(&mut self) {
        let outcomes = self.pipeline.poll(&mut self.list);
        if outcomes.is_empty() {
            return;
        }
        for outcome in outcomes {
            self.apply_outcome(outcome);
        }
        self.refresh_form_report();
    }

    /// Send pending moves now (app exit).
    pub fn flush(&mut self) {
        let n = self.pipeline.flush_moves();
        if n > 0 {
            info!("Flushed {} pending move(s)", n);
        }
    }

    fn sync_duration(&mut self) {
        let duration = self.video_duration();
        if self.timeline.viewport.video_duration() != duration {
            debug!("Timeline duration -> {:.2}s", duration);
            self.timeline.viewport.set_duration(duration);
            self.refresh_form_report();
        }
    }

    /// Stop on an enabled pausing interaction the playhead just crossed.
    fn pause_at_triggers(&mut self, t: f64) {
        let prev = self.last_play_time;
        self.last_play_time = t;
        if t <= prev {
            return;
        }
        let hit = self
            .list
            .iter()
            .find(|i| i.enabled && i.pauses_playback() && i.trigger_time > prev && i.trigger_time <= t)
            .map(|i| (i.trigger_time, i.title.clone()));
        if let Some((at, title)) = hit {
            debug!("Pausing at \"{}\" ({:.2}s)", title, at);
            self.video.pause();
            self.video.seek(at);
            self.last_play_time = at;
        }
    }

    fn apply_outcome(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Loaded { count } => {
                info!("Loaded {} interaction(s)", count);
                let edited_gone = self
                    .form
                    .as_ref()
                    .and_then(|f| match &f.target {
                        FormTarget::Edit(id) => Some(id),
                        FormTarget::Add => None,
                    })
                    .is_some_and(|id| !self.list.contains(id));
                if edited_gone {
                    self.close_form();
                    self.notifications
                        .push(ToastLevel::Warning, "The interaction being edited no longer exists");
                }
                let known: Vec<InteractionId> = [
                    self.selection.hovered.clone(),
                    self.selection.selected.clone(),
                ]
                .into_iter()
                .flatten()
                .collect();
                for id in known {
                    if !self.list.contains(&id) {
                        self.selection.forget(&id);
                    }
                }
            }
            SyncOutcome::Created { id, .. } => {
                self.selection.select(id.clone());
                self.notifications.push(ToastLevel::Success, "Interaction created");
                self.bus.emit(InteractionSavedEvent { id, op: SyncOp::Create });
            }
            SyncOutcome::Saved { op, id } => {
                self.bus.emit(InteractionSavedEvent { id, op });
            }
            SyncOutcome::Deleted { id } => {
                self.bus.emit(InteractionDeletedEvent { id });
            }
            SyncOutcome::Failed {
                op,
                id,
                error,
                rolled_back,
            } => {
                let message = format!("Failed to {}: {}", op.verb(), error);
                self.notifications.error(message.clone());
                self.bus.emit(SyncFailedEvent {
                    op,
                    id,
                    message,
                    rolled_back,
                });
            }
            SyncOutcome::Stale { op, id } => {
                trace!("Ignored stale {:?} for {}", op, id);
            }
        }
    }

    fn refresh_form_report(&mut self) {
        let duration = self.video_duration();
        if let Some(form) = self.form.as_mut() {
            form.revalidate(self.list.as_slice(), duration, &self.rules);
        }
    }

    // ===== Keyboard =====

    /// Route one key press through the hotkey table.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool) -> Option<EditorCommand> {
        let cmd = self.hotkeys.handle_key_with_modifiers(
            key,
            ctrl,
            shift,
            alt,
            self.selection.mode_class(),
            self.text_focus,
        )?;
        trace!("Hotkey {} -> {:?}", key, cmd);
        self.execute(cmd);
        Some(cmd)
    }

    pub fn execute(&mut self, cmd: EditorCommand) {
        match cmd {
            EditorCommand::Cancel => self.cancel(),
            EditorCommand::RequestDelete => {
                self.request_delete();
            }
            EditorCommand::ConfirmDelete => {
                self.confirm_delete();
            }
            EditorCommand::TogglePlay => self.video.toggle_play(),
            EditorCommand::AddAtPlayhead => {
                // Same gate as the toolbar button
                if self.video.duration().is_some_and(|d| d > 0.0) {
                    self.begin_add(add_at_playhead(self.current_time()));
                } else {
                    debug!("Add at playhead ignored: video duration unknown");
                }
            }
            EditorCommand::EditSelected => {
                if let Some(id) = self.selection.selected.clone() {
                    self.begin_edit(&id);
                }
            }
            EditorCommand::ZoomIn => {
                let t = self.current_time();
                let changed = self.timeline.viewport.zoom_in(t);
                self.zoom_changed(changed);
            }
            EditorCommand::ZoomOut => {
                let t = self.current_time();
                let changed = self.timeline.viewport.zoom_out(t);
                self.zoom_changed(changed);
            }
            EditorCommand::ResetZoom => {
                let changed = self.timeline.viewport.reset_zoom();
                self.zoom_changed(changed);
            }
            EditorCommand::SeekBy(dt) => self.seek(self.current_time() + dt),
        }
    }

    fn zoom_changed(&mut self, changed: bool) {
        if changed {
            let vp = &self.timeline.viewport;
            self.bus.emit(ZoomChangedEvent {
                zoom: vp.zoom(),
                viewport_start: vp.viewport_start(),
            });
        }
    }

    /// Escape: leave the warning dialog first, then the form or confirmation.
    pub fn cancel(&mut self) {
        if let Some(form) = self.form.as_mut()
            && form.confirming
        {
            form.cancel_confirmation();
            return;
        }
        match self.selection.mode {
            EditorMode::Editing(_) | EditorMode::Adding(_) => self.close_form(),
            EditorMode::ConfirmingDelete(_) => {
                self.selection.cancel();
            }
            EditorMode::Idle => {}
        }
    }

    // ===== Timeline =====

    pub fn seek(&mut self, t: f64) {
        self.video.seek(t);
        let time = self.video.current_time();
        self.last_play_time = time;
        self.bus.emit(SeekEvent { time });
    }

    /// Pointer input from the strip.
    pub fn pointer(&mut self, input: PointerInput, width: f64, now: Instant) {
        let viewport = self.timeline.viewport;
        let actions = self.timeline.gestures.handle(input, &viewport, width);
        for action in actions {
            self.apply_gesture(action, now);
        }
    }

    fn apply_gesture(&mut self, action: GestureAction, now: Instant) {
        match action {
            GestureAction::Hover(id) => self.selection.hover(id),
            GestureAction::Select(id) => {
                self.selection.select(id);
            }
            GestureAction::Seek(t) => self.seek(t),
            GestureAction::DragStarted { id, origin } => {
                trace!("Dragging {} from {:.2}s", id, origin);
            }
            GestureAction::Move { id, time } => {
                if self.pipeline.move_local(&mut self.list, &id, time, now) {
                    self.bus.emit(InteractionMovedEvent { id, time });
                    self.refresh_form_report();
                }
            }
            GestureAction::DragEnded { id, from, to } => {
                debug!("Moved {}: {:.2}s -> {:.2}s", id, from, to);
            }
            GestureAction::Edit(id) => {
                self.begin_edit(&id);
            }
        }
    }

    /// Minimap click: recenter and seek.
    pub fn minimap_click(&mut self, fraction: f64) {
        let minimap = Minimap::new(self.video_duration());
        let t = minimap.click(fraction, &mut self.timeline.viewport);
        self.seek(t);
    }

    pub fn scroll(&mut self, dt: f64) {
        self.timeline.viewport.scroll_by(dt);
    }

    // ===== Sidebar / selection =====

    pub fn hover(&mut self, id: Option<InteractionId>) {
        self.selection.hover(id);
    }

    pub fn select(&mut self, id: InteractionId) -> bool {
        self.list.contains(&id) && self.selection.select(id)
    }

    pub fn jump_to(&mut self, id: &InteractionId) {
        if let Some(t) = self.list.get(id).map(|i| i.trigger_time) {
            self.timeline.viewport.center_on(t);
            self.seek(t);
        }
    }

    pub fn toggle_enabled(&mut self, id: &InteractionId) -> Option<bool> {
        let enabled = self.pipeline.toggle_enabled(&mut self.list, id)?;
        self.refresh_form_report();
        Some(enabled)
    }

    /// Reload the list from the store.
    pub fn reload(&mut self) {
        self.pipeline.load();
    }

    // ===== Delete =====

    /// Ask for confirmation for the selected interaction.
    pub fn request_delete(&mut self) -> Option<InteractionId> {
        self.selection.request_delete()
    }

    /// Confirmed: remove optimistically and persist.
    pub fn confirm_delete(&mut self) -> Option<InteractionId> {
        let id = self.selection.take_delete_confirmation()?;
        if self
            .timeline
            .gestures
            .drag_session()
            .is_some_and(|s| s.interaction_id == id)
        {
            self.timeline.gestures.cancel();
        }
        if self.pipeline.delete(&mut self.list, &id) {
            self.selection.forget(&id);
            Some(id)
        } else {
            None
        }
    }

    // ===== Form =====

    /// Open the add flow with a draft at `trigger_time`.
    pub fn begin_add(&mut self, trigger_time: f64) {
        let mut form = FormState::add(trigger_time);
        form.revalidate(self.list.as_slice(), self.video_duration(), &self.rules);
        self.form = Some(form);
        self.selection.begin_add();
    }

    pub fn begin_edit(&mut self, id: &InteractionId) -> bool {
        let Some(mut form) = self.list.get(id).and_then(FormState::edit) else {
            return false;
        };
        form.revalidate(self.list.as_slice(), self.video_duration(), &self.rules);
        self.form = Some(form);
        self.selection.begin_edit(id.clone());
        true
    }

    pub fn choose_type(&mut self, kind: InteractionKind) {
        let duration = self.video_duration();
        if let Some(form) = self.form.as_mut() {
            form.choose_type(kind);
            form.revalidate(self.list.as_slice(), duration, &self.rules);
            self.selection.set_add_step(form.step);
        }
    }

    pub fn back_to_type(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.back_to_type();
            self.selection.set_add_step(form.step);
        }
    }

    pub fn set_draft(&mut self, draft: Interaction) {
        let duration = self.video_duration();
        if let Some(form) = self.form.as_mut() {
            form.set_draft(draft, self.list.as_slice(), duration, &self.rules);
        }
    }

    pub fn update_draft<F: FnOnce(&mut Interaction)>(&mut self, f: F) {
        let duration = self.video_duration();
        if let Some(form) = self.form.as_mut() {
            form.update_draft(f, self.list.as_slice(), duration, &self.rules);
        }
    }

    /// Save button. Returns what happened; `Create`/`Update` mean the call
    /// was dispatched and the form closed.
    pub fn save_form(&mut self) -> SaveDecision {
        let Some(form) = self.form.as_mut() else {
            return SaveDecision::Blocked;
        };
        let decision = form.request_save();
        self.commit(decision)
    }

    pub fn proceed_anyway(&mut self) -> SaveDecision {
        let Some(form) = self.form.as_mut() else {
            return SaveDecision::Blocked;
        };
        let decision = form.proceed_anyway();
        self.commit(decision)
    }

    pub fn cancel_warnings(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.cancel_confirmation();
        }
    }

    fn commit(&mut self, decision: SaveDecision) -> SaveDecision {
        match &decision {
            SaveDecision::Create(draft) => {
                self.pipeline.create(draft.clone());
                self.close_form();
            }
            SaveDecision::Update(draft) => {
                if !self.pipeline.update(&mut self.list, draft.clone()) {
                    self.notifications
                        .error(format!("\"{}\" no longer exists", draft.title));
                }
                self.close_form();
            }
            SaveDecision::Blocked | SaveDecision::Confirm(_) => {}
        }
        decision
    }

    /// Close the form, discarding the draft and its messages.
    pub fn close_form(&mut self) {
        self.form = None;
        if matches!(self.selection.mode, EditorMode::Editing(_) | EditorMode::Adding(_)) {
            self.selection.cancel();
        }
    }

    // ===== Events =====

    /// Apply one widget event. Returns false for events the editor does not
    /// consume (including its own notifications).
    pub fn handle_event(&mut self, event: &BoxedEvent) -> bool {
        let now = Instant::now();

        if let Some(e) = downcast_event::<TimelinePointerEvent>(event) {
            self.pointer(e.input.clone(), e.width, now);
            return true;
        }
        if let Some(e) = downcast_event::<MinimapClickEvent>(event) {
            self.minimap_click(e.0);
            return true;
        }
        if let Some(e) = downcast_event::<TimelineScrollEvent>(event) {
            self.scroll(e.0);
            return true;
        }
        if let Some(e) = downcast_event::<TimelineFollowChangedEvent>(event) {
            self.timeline.follow_playhead = e.0;
            return true;
        }
        if let Some(e) = downcast_event::<CommandEvent>(event) {
            self.execute(e.0);
            return true;
        }
        if let Some(e) = downcast_event::<SelectInteractionEvent>(event) {
            self.select(e.0.clone());
            return true;
        }
        if let Some(e) = downcast_event::<HoverInteractionEvent>(event) {
            self.hover(e.0.clone());
            return true;
        }
        if let Some(e) = downcast_event::<EditInteractionEvent>(event) {
            self.begin_edit(&e.0);
            return true;
        }
        if let Some(e) = downcast_event::<DeleteInteractionEvent>(event) {
            if self.select(e.0.clone()) {
                self.request_delete();
            }
            return true;
        }
        if let Some(e) = downcast_event::<ToggleEnabledEvent>(event) {
            self.toggle_enabled(&e.0);
            return true;
        }
        if let Some(e) = downcast_event::<JumpToInteractionEvent>(event) {
            self.jump_to(&e.0);
            return true;
        }
        if let Some(e) = downcast_event::<ChooseTypeEvent>(event) {
            self.choose_type(e.0);
            return true;
        }
        if downcast_event::<BackToTypeEvent>(event).is_some() {
            self.back_to_type();
            return true;
        }
        if let Some(e) = downcast_event::<DraftChangedEvent>(event) {
            self.set_draft((*e.0).clone());
            return true;
        }
        if downcast_event::<SaveFormEvent>(event).is_some() {
            self.save_form();
            return true;
        }
        if downcast_event::<ProceedAnywayEvent>(event).is_some() {
            self.proceed_anyway();
            return true;
        }
        if downcast_event::<CancelWarningsEvent>(event).is_some() {
            self.cancel_warnings();
            return true;
        }
        if downcast_event::<CloseFormEvent>(event).is_some() {
            self.close_form();
            return true;
        }
        if downcast_event::<RetryVideoEvent>(event).is_some() {
            self.video.retry();
            return true;
        }
        if downcast_event::<ReloadInteractionsEvent>(event).is_some() {
            self.reload();
            return true;
        }
        if let Some(e) = downcast_event::<DismissToastEvent>(event) {
            self.notifications.dismiss(e.0);
            return true;
        }
        false
    }

    /// Drain the bus and apply every intent.
    pub fn handle_events(&mut self) -> usize {
        let events = self.bus.poll();
        events.iter().filter(|e| self.handle_event(e)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::workers::InlineRunner;
    use crate::entities::{InteractionConfig, PollConfig};
    use crate::sync::{InteractionStore, MemoryStore, StoreCall, StoreError};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn tip(title: &str, t: f64) -> Interaction {
        Interaction::draft(InteractionConfig::default_for(InteractionKind::Tip), t, title)
    }

    fn editor(items: Vec<Interaction>) -> (Arc<MemoryStore>, Editor) {
        let store = Arc::new(MemoryStore::with_items(items));
        let pipeline = SyncPipeline::new(store.clone(), Arc::new(InlineRunner));
        let mut ed = Editor::new(pipeline, PlaybackState::with_duration(600.0), EventBus::new());
        ed.sync();
        store.clear_calls();
        (store, ed)
    }

    #[test]
    fn test_mount_loads_sorted_list() {
        let (_, ed) = editor(vec![tip("b", 50.0), tip("a", 5.0)]);
        assert_eq!(ed.list().len(), 2);
        assert_eq!(ed.list().as_slice()[0].title, "a");
        assert_eq!(ed.timeline.viewport.video_duration(), 600.0);
    }

    #[test]
    fn test_add_poll_end_to_end() {
        let (store, mut ed) = editor(vec![tip("early", 10.0), tip("late", 90.0)]);
        ed.seek(30.7);
        ed.execute(EditorCommand::AddAtPlayhead);
        assert_eq!(ed.selection().mode, EditorMode::Adding(AddStep::ChooseType));
        assert_eq!(ed.form().unwrap().draft.trigger_time, 30.0);

        ed.choose_type(InteractionKind::Poll);
        assert_eq!(ed.selection().mode, EditorMode::Adding(AddStep::EnterFields));
        ed.update_draft(|d| {
            d.title = "Quick check".into();
            d.config = InteractionConfig::Poll(PollConfig {
                options: vec!["A".into(), "B".into()],
                allow_multiple: false,
            });
        });
        assert!(ed.form().unwrap().report.errors.is_empty());

        assert!(matches!(ed.save_form(), SaveDecision::Create(_)));
        assert!(ed.form().is_none());
        ed.sync();

        let titles: Vec<_> = ed.list().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "Quick check", "late"]);
        assert_eq!(store.snapshot().len(), 3);
        assert!(ed.selection().selected.is_some());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let (store, mut ed) = editor(vec![tip("a", 10.0)]);
        let a: InteractionId = "1".into();

        // Nothing selected: Delete does nothing
        assert_eq!(ed.handle_key("Delete", false, false, false), Some(EditorCommand::RequestDelete));
        assert_eq!(ed.selection().mode, EditorMode::Idle);

        ed.select(a.clone());
        ed.handle_key("Delete", false, false, false);
        assert_eq!(ed.selection().mode, EditorMode::ConfirmingDelete(a.clone()));
        assert_eq!(ed.list().len(), 1);

        ed.handle_key("Enter", false, false, false);
        assert!(ed.list().is_empty());
        ed.sync();
        assert_eq!(store.calls(), vec![StoreCall::Delete(a)]);
        assert_eq!(ed.selection().selected, None);
    }

    #[test]
    fn test_typing_in_form_never_deletes() {
        let (_, mut ed) = editor(vec![tip("a", 10.0)]);
        let a: InteractionId = "1".into();
        ed.select(a.clone());
        ed.begin_edit(&a);
        ed.set_text_focus(true);
        assert_eq!(ed.handle_key("Backspace", false, false, false), None);
        ed.set_text_focus(false);
        assert_eq!(ed.handle_key("Backspace", false, false, false), None);
        assert_eq!(ed.list().len(), 1);

        // Escape still works from a text field
        ed.set_text_focus(true);
        assert_eq!(ed.handle_key("Escape", false, false, false), Some(EditorCommand::Cancel));
        assert!(ed.form().is_none());
        assert_eq!(ed.selection().selected, Some(a));
    }

    #[test]
    fn test_drag_then_single_persisted_move() {
        let (store, mut ed) = editor(vec![tip("a", 10.0)]);
        let a: InteractionId = "1".into();
        let t0 = Instant::now();
        let w = 600.0;

        ed.pointer(PointerInput::MarkerDown { id: a.clone(), time: 10.0 }, w, t0);
        ed.pointer(PointerInput::Move { x: 12.0 }, w, t0 + Duration::from_millis(100));
        ed.pointer(PointerInput::Move { x: 15.0 }, w, t0 + Duration::from_millis(200));
        ed.pointer(PointerInput::Up, w, t0 + Duration::from_millis(200));
        ed.pointer(PointerInput::StripClick { x: 15.0 }, w, t0 + Duration::from_millis(200));

        assert!((ed.list().get(&a).unwrap().trigger_time - 15.0).abs() < 1e-9);
        assert_eq!(ed.current_time(), 0.0, "marker press must not seek");
        assert!(store.calls().is_empty());

        ed.tick(t0 + Duration::from_millis(800));
        let patches: Vec<_> = store
            .calls()
            .into_iter()
            .filter(|c| matches!(c, StoreCall::Patch(..)))
            .collect();
        assert_eq!(patches.len(), 1);
        assert!((store.get(&a).unwrap().trigger_time - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_toggle_failure_notifies_and_rolls_back() {
        let (store, mut ed) = editor(vec![tip("a", 10.0)]);
        let a: InteractionId = "1".into();
        let failures = Arc::new(Mutex::new(Vec::new()));
        let f = Arc::clone(&failures);
        ed.bus().subscribe::<SyncFailedEvent, _>(move |e| {
            f.lock().unwrap().push(e.clone());
        });

        store.fail_next(StoreError::Http { status: 500, message: None });
        assert_eq!(ed.toggle_enabled(&a), Some(false));
        ed.sync();

        assert!(ed.list().get(&a).unwrap().enabled);
        assert_eq!(ed.notifications().len(), 1);
        let failures = failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].rolled_back);
        assert_eq!(failures[0].op, SyncOp::Toggle);
    }

    #[test]
    fn test_zoom_hotkeys_follow_playhead() {
        let (_, mut ed) = editor(vec![]);
        ed.seek(300.0);
        for _ in 0..3 {
            ed.handle_key("Plus", false, true, false);
        }
        ed.execute(EditorCommand::ZoomIn);
        // 16x on 600s -> 37.5s window centered on 300
        let vp = ed.timeline.viewport;
        assert_eq!(vp.zoom(), 16.0);
        assert!(vp.contains(300.0));
        ed.handle_key("Num0", false, false, false);
        assert_eq!(ed.timeline.viewport.zoom(), 1.0);
    }

    #[test]
    fn test_pause_interaction_stops_playback() {
        let pause = Interaction::draft(
            InteractionConfig::default_for(InteractionKind::Pause),
            2.0,
            "Breather",
        );
        let (_, mut ed) = editor(vec![pause]);
        ed.video.play();
        let t0 = Instant::now();
        ed.video.advance(t0);
        ed.tick(t0 + Duration::from_secs(1));
        assert!(ed.video.is_playing());
        ed.tick(t0 + Duration::from_secs(3));
        assert!(!ed.video.is_playing());
        assert_eq!(ed.current_time(), 2.0);
    }

    #[test]
    fn test_reload_closes_form_for_removed_item() {
        let (store, mut ed) = editor(vec![tip("a", 10.0), tip("b", 20.0)]);
        let a: InteractionId = "1".into();
        let b: InteractionId = "2".into();
        assert!(ed.begin_edit(&a));
        store.delete(&a).unwrap();
        ed.reload();
        ed.sync();

        assert!(ed.form().is_none());
        assert_eq!(ed.selection().mode, EditorMode::Idle);
        assert_eq!(ed.notifications().len(), 1);

        // Shortcuts are live again, and only act on what is still there
        ed.select(b.clone());
        assert_eq!(ed.handle_key("Delete", false, false, false), Some(EditorCommand::RequestDelete));
        assert_eq!(ed.selection().mode, EditorMode::ConfirmingDelete(b));
    }

    #[test]
    fn test_reload_keeps_form_for_surviving_item() {
        let (_, mut ed) = editor(vec![tip("a", 10.0)]);
        let a: InteractionId = "1".into();
        ed.begin_edit(&a);
        ed.reload();
        ed.sync();
        assert!(ed.form().is_some());
        assert_eq!(ed.selection().mode, EditorMode::Editing(a));
        assert_eq!(ed.handle_key("Delete", false, false, false), None);
    }

    #[test]
    fn test_add_hotkey_waits_for_duration() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = SyncPipeline::new(store, Arc::new(InlineRunner));
        let mut ed = Editor::new(pipeline, PlaybackState::new(), EventBus::new());
        ed.sync();

        assert_eq!(ed.handle_key("A", false, false, false), Some(EditorCommand::AddAtPlayhead));
        assert!(ed.form().is_none());
        assert_eq!(ed.selection().mode, EditorMode::Idle);

        ed.video.set_duration(120.0);
        ed.handle_key("A", false, false, false);
        assert_eq!(ed.selection().mode, EditorMode::Adding(AddStep::ChooseType));
    }

    #[test]
    fn test_events_drive_the_editor() {
        let (_, mut ed) = editor(vec![tip("a", 10.0)]);
        let emitter = ed.bus().emitter();
        emitter.emit(SelectInteractionEvent("1".into()));
        emitter.emit(EditInteractionEvent("1".into()));
        // Notifications emitted by the editor itself are not consumed
        emitter.emit(SeekEvent { time: 1.0 });
        assert_eq!(ed.handle_events(), 2);
        assert_eq!(ed.selection().mode, EditorMode::Editing("1".into()));
    }
}
