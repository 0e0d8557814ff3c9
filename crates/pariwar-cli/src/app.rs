//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pariwar_core::{
  feed::{SnapshotEvent, SubscriptionError},
  record::Record,
  store::RecordStore,
  subscription::Subscription,
};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
  form::{FormMode, RecordForm, Submission},
  list::RecordList,
  notify::Notifier,
};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the record table.
  RecordList,
  /// The modal record form is open.
  RecordForm,
}

// ─── Events ───────────────────────────────────────────────────────────────────

/// Results flowing back into the event loop from background tasks.
///
/// Live-query events carry the generation of the mount that produced them;
/// events from a replaced subscription are dropped.
#[derive(Debug)]
pub enum AppEvent {
  Feed {
    generation: u64,
    event:      SnapshotEvent,
  },
  Subscribed {
    generation: u64,
    result:     Result<Subscription, String>,
  },
  Saved {
    ticket: u64,
    mode:   FormMode,
    result: Result<Record, String>,
  },
  Deleted {
    id:     Uuid,
    result: Result<bool, String>,
  },
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S> {
  store: Arc<S>,

  pub list: RecordList,

  /// The open form, if any. Only one form is open at a time.
  pub form: Option<RecordForm>,

  /// Record awaiting a `y` to be deleted.
  pub confirm_delete: Option<Uuid>,

  pub notices: Notifier,

  /// Bumped on every (re)mount of the live query.
  generation: u64,

  events: mpsc::UnboundedSender<AppEvent>,
}

impl<S> App<S>
where
  S: RecordStore + 'static,
{
  /// Create an [`App`] and the receiving end of its event channel.
  pub fn new(store: Arc<S>) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
    let (events, rx) = mpsc::unbounded_channel();
    let app = Self {
      store,
      list: RecordList::new(),
      form: None,
      confirm_delete: None,
      notices: Notifier::default(),
      generation: 0,
      events,
    };
    (app, rx)
  }

  pub fn screen(&self) -> Screen {
    if self.form.is_some() {
      Screen::RecordForm
    } else {
      Screen::RecordList
    }
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  /// Open the live query and route its events into the event channel.
  pub async fn mount(&mut self) {
    self.generation += 1;
    let result = self.store.subscribe().await.map_err(|e| e.to_string());
    self.attach(self.generation, result);
  }

  /// Re-open the live query in the background; the user's retry after a
  /// failed subscription.
  fn spawn_refresh(&mut self) {
    self.generation += 1;
    let generation = self.generation;
    tracing::info!(generation, "refreshing record list");

    let store = Arc::clone(&self.store);
    let tx = self.events.clone();
    tokio::spawn(async move {
      let result = store.subscribe().await.map_err(|e| e.to_string());
      let _ = tx.send(AppEvent::Subscribed { generation, result });
    });
  }

  fn attach(&mut self, generation: u64, result: Result<Subscription, String>) {
    if generation != self.generation {
      tracing::debug!(generation, "dropping superseded subscription");
      return;
    }
    match result {
      Ok(subscription) => {
        let tx = self.events.clone();
        self.list.mount(subscription, move |event| {
          let _ = tx.send(AppEvent::Feed { generation, event });
        });
        tracing::info!(generation, "record list mounted");
      }
      Err(message) => {
        self.notices.error(format!("Could not load records: {message}"));
        self
          .list
          .apply(SnapshotEvent::Failed(SubscriptionError(message)));
      }
    }
  }

  pub fn unmount(&mut self) { self.list.unmount(); }

  // ── Background results ────────────────────────────────────────────────────

  pub fn handle_event(&mut self, event: AppEvent) {
    match event {
      AppEvent::Feed { generation, event } => {
        if generation != self.generation {
          return;
        }
        if let SnapshotEvent::Failed(e) = &event
          && self.list.is_mounted()
        {
          self.notices.error(format!("Live updates failed: {e}"));
        }
        self.list.apply(event);
      }

      AppEvent::Subscribed { generation, result } => self.attach(generation, result),

      AppEvent::Saved { ticket, mode, result } => {
        let settled = self
          .form
          .as_mut()
          .is_some_and(|form| form.mode() == mode && form.settle(ticket));
        match result {
          Ok(record) => {
            tracing::info!(record_id = %record.id, ?mode, "record saved");
            if settled {
              self.form = None;
            }
            self.notices.success(match mode {
              FormMode::Create => "Record created",
              FormMode::Edit(_) => "Record updated",
            });
          }
          Err(message) => self.notices.error(match mode {
            FormMode::Create => format!("Could not create record: {message}"),
            FormMode::Edit(_) => format!("Could not update record: {message}"),
          }),
        }
      }

      AppEvent::Deleted { id, result } => match result {
        Ok(true) => self.notices.success("Record deleted"),
        Ok(false) => {
          tracing::debug!(record_id = %id, "delete target already gone");
          self.notices.success("Record was already removed");
        }
        Err(message) => {
          self
            .notices
            .error(format!("Could not delete record: {message}"))
        }
      },
    }
  }

  // ── Store requests ────────────────────────────────────────────────────────

  fn spawn_save(&self, submission: Submission) {
    let store = Arc::clone(&self.store);
    let tx = self.events.clone();
    tokio::spawn(async move {
      let result = submission
        .send(store.as_ref())
        .await
        .map_err(|e| e.to_string());
      let _ = tx.send(AppEvent::Saved {
        ticket: submission.ticket,
        mode: submission.mode,
        result,
      });
    });
  }

  fn spawn_delete(&self, id: Uuid) {
    let store = Arc::clone(&self.store);
    let tx = self.events.clone();
    tokio::spawn(async move {
      let result = RecordList::delete(store.as_ref(), id)
        .await
        .map_err(|e| e.to_string());
      let _ = tx.send(AppEvent::Deleted { id, result });
    });
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  ///
  /// Never waits on the store: requests are spawned and their results come
  /// back through [`App::handle_event`].
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.form.is_some() {
      self.handle_form_key(key);
      return true;
    }

    if let Some(id) = self.confirm_delete.take() {
      if key.code == KeyCode::Char('y') {
        self.spawn_delete(id);
      }
      return true;
    }

    self.handle_list_key(key)
  }

  fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Char('j') | KeyCode::Down => self.list.move_down(),
      KeyCode::Char('k') | KeyCode::Up => self.list.move_up(),
      KeyCode::Char('n') => self.form = Some(RecordForm::create()),
      KeyCode::Char('r') => self.spawn_refresh(),
      KeyCode::Char('e') | KeyCode::Enter => {
        if let Some(form) = self.list.edit_selected() {
          self.form = Some(form);
        }
      }
      KeyCode::Char('d') => {
        self.confirm_delete = self.list.selected().map(|r| r.id);
      }
      _ => {}
    }
    true
  }

  fn handle_form_key(&mut self, key: KeyEvent) {
    let Some(form) = self.form.as_mut() else {
      return;
    };
    match key.code {
      KeyCode::Esc => self.form = None,
      KeyCode::Tab | KeyCode::Down => form.focus_next(),
      KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
      KeyCode::Backspace => form.backspace(),
      KeyCode::Enter => match form.begin_submit() {
        Ok(submission) => self.spawn_save(submission),
        Err(pariwar_core::Error::SubmissionPending) => {
          tracing::debug!("ignoring submit while a submission is in flight");
        }
        Err(e) => self.notices.error(e.to_string()),
      },
      KeyCode::Char(c) => form.insert(c),
      _ => {}
    }
  }
}
