//! View controller: the single writer between the store and the view.
//!
//! # Responsibility
//! - Apply user commands (add/edit/delete, navigation, filters) in order.
//! - Reload the full event list from the store after every mutation.
//! - Publish an immutable [`TimelineSnapshot`] after every state change.
//!
//! # Invariants
//! - Commands take `&mut self`, so they never interleave.
//! - The in-memory list is replaced wholesale or not at all; a failed
//!   store command leaves list and mode untouched.
//! - Validation runs before any store mutation.

use crate::model::catalog::{CatalogDraft, Entity, EntityId, Tag, TagId};
use crate::model::datetime::{
    format_date_time, parse_date_time, parse_date_time_or, DateTimeParseError,
    PLACEHOLDER_DATE_TIME,
};
use crate::model::event::{Event, EventDraft, EventId, ValidationError};
use crate::repo::{EventRepository, StoreError};
use crate::view::clock::Clock;
use crate::view::filter::{connections, is_highlighted, visible_events, ViewFilter};
use crate::view::snapshot::{DetailMode, TimelineSnapshot, VisibleEvent};
use crate::view::window::{InvertedRangeError, TimelineWindow};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::watch;

pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug)]
pub enum ControllerError {
    /// Form input rejected before reaching the store.
    Validation(ValidationError),
    /// Date/time text could not be parsed.
    MalformedInput(DateTimeParseError),
    InvalidRange(InvertedRangeError),
    /// Command is not allowed in the current detail mode.
    InvalidTransition {
        action: &'static str,
        mode: DetailMode,
    },
    /// Event id is not part of the loaded list.
    UnknownEvent(EventId),
    Store(StoreError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::MalformedInput(err) => write!(f, "{err}"),
            Self::InvalidRange(err) => write!(f, "{err}"),
            Self::InvalidTransition { action, mode } => {
                write!(f, "cannot {action} while {}", mode.as_str())
            }
            Self::UnknownEvent(id) => write!(f, "event not loaded: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::MalformedInput(err) => Some(err),
            Self::InvalidRange(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::InvalidTransition { .. } | Self::UnknownEvent(_) => None,
        }
    }
}

impl From<ValidationError> for ControllerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DateTimeParseError> for ControllerError {
    fn from(value: DateTimeParseError) -> Self {
        Self::MalformedInput(value)
    }
}

impl From<InvertedRangeError> for ControllerError {
    fn from(value: InvertedRangeError) -> Self {
        Self::InvalidRange(value)
    }
}

impl From<StoreError> for ControllerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

/// Editable detail-panel fields. Dates are raw text as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub related_events: Vec<EventId>,
    pub related_entities: Vec<EntityId>,
    pub tags: Vec<TagId>,
}

impl EventForm {
    /// Prefills the form from a loaded event.
    pub fn from_event(event: &Event) -> Self {
        let draft = event.to_draft();
        Self {
            title: draft.title,
            description: draft.description,
            start: format_date_time(&event.start),
            end: format_date_time(&event.end),
            related_events: draft.related_events,
            related_entities: draft.related_entities,
            tags: draft.tags,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        Ok(())
    }

    /// Draft for a new event: blank start falls back to the placeholder
    /// instant, blank end falls back to the start.
    fn to_new_draft(&self) -> ControllerResult<EventDraft> {
        self.validate()?;
        let start = parse_date_time_or(&self.start, PLACEHOLDER_DATE_TIME)?;
        let end = if self.end.trim().is_empty() {
            start
        } else {
            parse_date_time(&self.end)?
        };
        Ok(self.draft_with(start, end))
    }

    /// Draft replacing `current`: blank date fields keep the stored values.
    fn to_edit_draft(&self, current: &Event) -> ControllerResult<EventDraft> {
        self.validate()?;
        let start = if self.start.trim().is_empty() {
            current.start
        } else {
            parse_date_time(&self.start)?
        };
        let end = if self.end.trim().is_empty() {
            current.end
        } else {
            parse_date_time(&self.end)?
        };
        Ok(self.draft_with(start, end))
    }

    fn draft_with(&self, start: chrono::NaiveDateTime, end: chrono::NaiveDateTime) -> EventDraft {
        EventDraft::new(self.title.trim(), start)
            .with_end(end)
            .with_description(self.description.clone())
            .with_related_events(self.related_events.iter().copied())
            .with_entities(self.related_entities.iter().copied())
            .with_tags(self.tags.iter().copied())
    }
}

pub struct ViewController<R: EventRepository, C: Clock> {
    repo: R,
    clock: C,
    window: TimelineWindow,
    events: Vec<Event>,
    entities: Vec<Entity>,
    tags: Vec<Tag>,
    mode: DetailMode,
    filter: ViewFilter,
    highlight_related: bool,
    show_connections: bool,
    snapshot_tx: watch::Sender<Arc<TimelineSnapshot>>,
}

impl<R: EventRepository, C: Clock> ViewController<R, C> {
    /// Creates a controller and loads the initial list from the store.
    pub fn new(repo: R, clock: C, window: TimelineWindow) -> ControllerResult<Self> {
        let (snapshot_tx, _) = watch::channel(Arc::new(empty_snapshot(&window)));
        let mut controller = Self {
            repo,
            clock,
            window,
            events: Vec::new(),
            entities: Vec::new(),
            tags: Vec::new(),
            mode: DetailMode::None,
            filter: ViewFilter::default(),
            highlight_related: false,
            show_connections: false,
            snapshot_tx,
        };
        controller.reload()?;
        Ok(controller)
    }

    /// Seeds sample data when the store holds no events.
    ///
    /// Returns whether seeding happened.
    pub fn seed_if_empty(&mut self) -> ControllerResult<bool> {
        if !self.repo.is_empty()? {
            return Ok(false);
        }
        self.repo.load_test_data().map_err(|err| {
            error!("event=seed module=controller status=error error={err}");
            err
        })?;
        info!("event=seed module=controller status=ok");
        self.reload()?;
        Ok(true)
    }

    /// Reloads events, entities and tags, replacing all three at once.
    pub fn reload(&mut self) -> ControllerResult<()> {
        let events = self.repo.get_all_events()?;
        let entities = self.repo.list_entities()?;
        let tags = self.repo.list_tags()?;

        self.events = events;
        self.entities = entities;
        self.tags = tags;
        if let Some(id) = self.mode.event_id() {
            if self.find_event(id).is_none() {
                self.mode = DetailMode::None;
            }
        }
        info!(
            "event=events_load module=controller status=ok events={} entities={} tags={}",
            self.events.len(),
            self.entities.len(),
            self.tags.len()
        );
        self.publish();
        Ok(())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn window(&self) -> &TimelineWindow {
        &self.window
    }

    pub fn mode(&self) -> DetailMode {
        self.mode
    }

    pub fn filter(&self) -> ViewFilter {
        self.filter
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.mode.event_id().and_then(|id| self.find_event(id))
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<TimelineSnapshot> {
        self.snapshot_tx.borrow().clone()
    }

    /// Subscribes to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<Arc<TimelineSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    // Detail panel state machine.

    pub fn select_event(&mut self, id: EventId) -> ControllerResult<()> {
        self.require_mode("select", |mode| {
            matches!(mode, DetailMode::None | DetailMode::Viewing(_))
        })?;
        if self.find_event(id).is_none() {
            return Err(ControllerError::UnknownEvent(id));
        }
        self.set_mode(DetailMode::Viewing(id));
        Ok(())
    }

    pub fn close_detail(&mut self) {
        self.set_mode(DetailMode::None);
    }

    pub fn begin_create(&mut self) -> ControllerResult<()> {
        self.require_mode("create", |mode| {
            matches!(mode, DetailMode::None | DetailMode::Viewing(_))
        })?;
        self.set_mode(DetailMode::Creating);
        Ok(())
    }

    pub fn begin_edit(&mut self) -> ControllerResult<()> {
        let DetailMode::Viewing(id) = self.mode else {
            return Err(self.invalid_transition("edit"));
        };
        self.set_mode(DetailMode::Editing(id));
        Ok(())
    }

    pub fn cancel(&mut self) -> ControllerResult<()> {
        self.require_mode("cancel", |mode| {
            matches!(mode, DetailMode::Editing(_) | DetailMode::Creating)
        })?;
        info!(
            "event=detail_cancel module=controller status=ok mode={}",
            self.mode.as_str()
        );
        self.set_mode(DetailMode::None);
        Ok(())
    }

    /// Saves the form as a new event (creating) or over the edited one (editing).
    pub fn save(&mut self, form: &EventForm) -> ControllerResult<EventId> {
        let id = match self.mode {
            DetailMode::Creating => {
                let draft = form.to_new_draft()?;
                let id = self.run_store_command("event_add", |repo| repo.add_event(&draft))?;
                info!("event=event_add module=controller status=ok event_id={id}");
                id
            }
            DetailMode::Editing(id) => {
                let current = self
                    .find_event(id)
                    .ok_or(ControllerError::UnknownEvent(id))?;
                let draft = form.to_edit_draft(current)?;
                self.run_store_command("event_edit", |repo| repo.edit_event(id, &draft))?;
                info!("event=event_edit module=controller status=ok event_id={id}");
                id
            }
            _ => return Err(self.invalid_transition("save")),
        };

        self.mode = DetailMode::None;
        self.reload()?;
        Ok(id)
    }

    /// Deletes the event shown in the detail panel.
    pub fn delete_selected(&mut self) -> ControllerResult<EventId> {
        let id = match self.mode {
            DetailMode::Viewing(id) | DetailMode::Editing(id) => id,
            _ => return Err(self.invalid_transition("delete")),
        };
        self.run_store_command("event_delete", |repo| repo.delete_event(id))?;
        info!("event=event_delete module=controller status=ok event_id={id}");

        self.mode = DetailMode::None;
        self.reload()?;
        Ok(id)
    }

    // Navigation.

    pub fn zoom_in(&mut self) -> bool {
        let changed = self.window.zoom_in();
        if changed {
            self.publish();
        }
        changed
    }

    pub fn zoom_out(&mut self) -> bool {
        let changed = self.window.zoom_out();
        if changed {
            self.publish();
        }
        changed
    }

    pub fn pan_left(&mut self) {
        self.window.pan_left();
        self.publish();
    }

    pub fn pan_right(&mut self) {
        self.window.pan_right();
        self.publish();
    }

    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) -> ControllerResult<()> {
        self.window.set_range(start, end)?;
        self.publish();
        Ok(())
    }

    pub fn jump_to_today(&mut self) {
        self.window.center_on(self.clock.today());
        self.publish();
    }

    /// Grows the range so a loaded event is visible with some margin.
    pub fn reveal_event(&mut self, id: EventId) -> ControllerResult<bool> {
        let (start, end) = self
            .find_event(id)
            .map(|event| (event.start.date(), event.end.date()))
            .ok_or(ControllerError::UnknownEvent(id))?;
        let changed = self.window.expand_to_include(start, end);
        if changed {
            self.publish();
        }
        Ok(changed)
    }

    // Display options.

    pub fn set_tag_filter(&mut self, tag: Option<TagId>) {
        self.filter.tag = tag;
        self.publish();
    }

    pub fn set_entity_filter(&mut self, entity: Option<EntityId>) {
        self.filter.entity = entity;
        self.publish();
    }

    pub fn set_highlight_related(&mut self, enabled: bool) {
        self.highlight_related = enabled;
        self.publish();
    }

    pub fn set_show_connections(&mut self, enabled: bool) {
        self.show_connections = enabled;
        self.publish();
    }

    // Catalog and link commands.

    pub fn create_entity(&mut self, draft: &CatalogDraft) -> ControllerResult<EntityId> {
        draft.validate()?;
        let id = self.run_store_command("entity_add", |repo| repo.create_entity(draft))?;
        info!("event=entity_add module=controller status=ok entity_id={id}");
        self.reload()?;
        Ok(id)
    }

    pub fn create_tag(&mut self, draft: &CatalogDraft) -> ControllerResult<TagId> {
        draft.validate()?;
        let id = self.run_store_command("tag_add", |repo| repo.create_tag(draft))?;
        info!("event=tag_add module=controller status=ok tag_id={id}");
        self.reload()?;
        Ok(id)
    }

    pub fn link_events(&mut self, from: EventId, to: EventId) -> ControllerResult<()> {
        self.run_store_command("event_link", |repo| repo.link_events(from, to))?;
        self.reload()
    }

    pub fn unlink_events(&mut self, from: EventId, to: EventId) -> ControllerResult<()> {
        self.run_store_command("event_unlink", |repo| repo.unlink_events(from, to))?;
        self.reload()
    }

    /// Events currently visible, ascending by start.
    pub fn visible_events(&self) -> Vec<&Event> {
        visible_events(&self.events, &self.window, &self.filter)
    }

    fn run_store_command<T>(
        &mut self,
        action: &'static str,
        command: impl FnOnce(&mut R) -> Result<T, StoreError>,
    ) -> ControllerResult<T> {
        command(&mut self.repo).map_err(|err| {
            error!("event={action} module=controller status=error error={err}");
            ControllerError::from(err)
        })
    }

    fn find_event(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    fn require_mode(
        &self,
        action: &'static str,
        allowed: impl Fn(DetailMode) -> bool,
    ) -> ControllerResult<()> {
        if allowed(self.mode) {
            Ok(())
        } else {
            Err(self.invalid_transition(action))
        }
    }

    fn invalid_transition(&self, action: &'static str) -> ControllerError {
        warn!(
            "event=detail_transition module=controller status=rejected action={} mode={}",
            action,
            self.mode.as_str()
        );
        ControllerError::InvalidTransition {
            action,
            mode: self.mode,
        }
    }

    fn set_mode(&mut self, mode: DetailMode) {
        self.mode = mode;
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(Arc::new(self.build_snapshot()));
    }

    fn build_snapshot(&self) -> TimelineSnapshot {
        let selected = self.selected_event();
        let visible = self.visible_events();
        let connections = if self.show_connections {
            connections(&visible)
        } else {
            Vec::new()
        };
        let highlight_source = if self.highlight_related { selected } else { None };

        TimelineSnapshot {
            range_start: self.window.range_start(),
            range_end: self.window.range_end(),
            zoom_index: self.window.zoom_index(),
            zoom_width_days: self.window.zoom_width(),
            can_zoom_in: self.window.can_zoom_in(),
            can_zoom_out: self.window.can_zoom_out(),
            mode: self.mode,
            selected: selected.cloned(),
            filter: self.filter,
            highlight_related: self.highlight_related,
            show_connections: self.show_connections,
            visible: visible
                .iter()
                .map(|event| VisibleEvent {
                    event: (*event).clone(),
                    selected: selected.is_some_and(|current| current.id == event.id),
                    highlighted: is_highlighted(highlight_source, event),
                })
                .collect(),
            connections,
            total_events: self.events.len(),
            entities: self.entities.clone(),
            tags: self.tags.clone(),
        }
    }
}

fn empty_snapshot(window: &TimelineWindow) -> TimelineSnapshot {
    TimelineSnapshot {
        range_start: window.range_start(),
        range_end: window.range_end(),
        zoom_index: window.zoom_index(),
        zoom_width_days: window.zoom_width(),
        can_zoom_in: window.can_zoom_in(),
        can_zoom_out: window.can_zoom_out(),
        mode: DetailMode::None,
        selected: None,
        filter: ViewFilter::default(),
        highlight_related: false,
        show_connections: false,
        visible: Vec::new(),
        connections: Vec::new(),
        total_events: 0,
        entities: Vec::new(),
        tags: Vec::new(),
    }
}
