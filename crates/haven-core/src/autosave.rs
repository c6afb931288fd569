//! Debounced autosave.
//!
//! Edits are cheap and frequent; saves are not. The [`Autosaver`] owns a
//! background task that coalesces a burst of [`Autosaver::schedule`] calls
//! into one save per quiet period (trailing edge), runs at most one save
//! at a time, and queues exactly one follow-up when edits land mid-save.
//! [`Autosaver::commit`] bypasses the timer for flush points like
//! completing an evaluation or leaving a screen.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{
  sync::{mpsc, oneshot, watch},
  time::Instant,
};

use crate::{Error, Result};

/// Quiet period before a scheduled save fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Something that can persist a snapshot. The sink is called from the
/// autosave task, one call at a time.
pub trait SaveSink: Send + Sync + 'static {
  type Snapshot: Clone + Send + 'static;

  fn save(
    &self,
    snapshot: Self::Snapshot,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Save state machine ──────────────────────────────────────────────────────

/// Where the saver is in its cycle. Kept separate from the driver so the
/// transitions are testable without a runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveState {
  #[default]
  Idle,
  /// An edit is waiting on the debounce timer.
  Pending,
  Saving,
  /// A save is running and another edit arrived; one follow-up save will
  /// start when the current one finishes.
  SavingQueued,
}

/// What the driver should do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveEffect {
  None,
  ArmTimer,
  StartSave,
}

impl SaveState {
  /// An edit arrived. The timer always re-arms: the debounce is trailing
  /// edge, so the newest edit restarts the quiet period.
  pub fn on_edit(&mut self) -> SaveEffect {
    if *self == Self::Idle {
      *self = Self::Pending;
    }
    SaveEffect::ArmTimer
  }

  /// The debounce timer fired.
  pub fn on_timer(&mut self) -> SaveEffect {
    match *self {
      Self::Pending => {
        *self = Self::Saving;
        SaveEffect::StartSave
      }
      Self::Saving => {
        *self = Self::SavingQueued;
        SaveEffect::None
      }
      Self::Idle | Self::SavingQueued => SaveEffect::None,
    }
  }

  /// The in-flight save finished. `timer_armed` distinguishes "edits are
  /// still waiting on the timer" from truly idle.
  pub fn on_save_done(&mut self, timer_armed: bool) -> SaveEffect {
    match *self {
      Self::SavingQueued => {
        *self = Self::Saving;
        SaveEffect::StartSave
      }
      Self::Saving => {
        *self = if timer_armed { Self::Pending } else { Self::Idle };
        SaveEffect::None
      }
      Self::Idle | Self::Pending => SaveEffect::None,
    }
  }

  /// An explicit flush was requested.
  pub fn on_commit(&mut self) -> SaveEffect {
    match *self {
      Self::Idle | Self::Pending => {
        *self = Self::Saving;
        SaveEffect::StartSave
      }
      Self::Saving => {
        *self = Self::SavingQueued;
        SaveEffect::None
      }
      Self::SavingQueued => SaveEffect::None,
    }
  }

  pub fn is_saving(self) -> bool {
    matches!(self, Self::Saving | Self::SavingQueued)
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Observable saver status, published through a watch channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveStatus {
  pub saving:     bool,
  pub last_saved: Option<DateTime<Utc>>,
  pub last_error: Option<String>,
}

// ─── Handle ──────────────────────────────────────────────────────────────────

enum Msg<T> {
  Edit(T),
  Commit(T, oneshot::Sender<Result<()>>),
}

/// Handle to the autosave task. Cloneable; dropping every handle shuts
/// the task down after it flushes whatever is still pending.
pub struct Autosaver<T> {
  tx:     mpsc::UnboundedSender<Msg<T>>,
  status: watch::Receiver<SaveStatus>,
}

impl<T> Clone for Autosaver<T> {
  fn clone(&self) -> Self {
    Self {
      tx:     self.tx.clone(),
      status: self.status.clone(),
    }
  }
}

impl<T: Clone + Send + 'static> Autosaver<T> {
  pub fn spawn<S>(sink: Arc<S>, debounce: Duration) -> Self
  where
    S: SaveSink<Snapshot = T>,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(SaveStatus::default());
    tokio::spawn(run(sink, debounce, rx, status_tx));
    Self {
      tx,
      status: status_rx,
    }
  }

  /// Record an edit. The snapshot supersedes any previously scheduled
  /// one; only the newest is ever saved.
  pub fn schedule(&self, snapshot: T) {
    // A closed channel means the task is gone; the next commit reports it.
    let _ = self.tx.send(Msg::Edit(snapshot));
  }

  /// Save `snapshot` now, skipping the debounce, and wait for the result.
  pub async fn commit(&self, snapshot: T) -> Result<()> {
    let (done_tx, done_rx) = oneshot::channel();
    self
      .tx
      .send(Msg::Commit(snapshot, done_tx))
      .map_err(|_| Error::SaverClosed)?;
    done_rx.await.map_err(|_| Error::SaverClosed)?
  }

  pub fn status(&self) -> SaveStatus { self.status.borrow().clone() }

  /// Watch channel for status updates, for callers that want to render
  /// "saving…" indicators.
  pub fn watch_status(&self) -> watch::Receiver<SaveStatus> {
    self.status.clone()
  }
}

// ─── Driver ──────────────────────────────────────────────────────────────────

// Error isn't Clone; commits waiting on the same save each get a copy.
fn clone_result(result: &Result<()>) -> Result<()> {
  match result {
    Ok(()) => Ok(()),
    Err(e) => Err(Error::Store(e.to_string())),
  }
}

async fn run<S: SaveSink>(
  sink: Arc<S>,
  debounce: Duration,
  mut rx: mpsc::UnboundedReceiver<Msg<S::Snapshot>>,
  status: watch::Sender<SaveStatus>,
) {
  let mut state = SaveState::default();
  let mut latest: Option<S::Snapshot> = None;
  let mut deadline: Option<Instant> = None;
  let mut waiters: Vec<oneshot::Sender<Result<()>>> = Vec::new();
  // Completions of spawned saves come back on this channel so the loop
  // never blocks on a save.
  let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Result<()>>();

  let start_save =
    |latest: &mut Option<S::Snapshot>,
     status: &watch::Sender<SaveStatus>,
     done_tx: &mpsc::UnboundedSender<Result<()>>| {
      status.send_modify(|s| s.saving = true);
      match latest.take() {
        Some(snapshot) => {
          let sink = Arc::clone(&sink);
          let done_tx = done_tx.clone();
          tokio::spawn(async move {
            let result = sink.save(snapshot).await;
            let _ = done_tx.send(result);
          });
        }
        // Commit with nothing newer than the last save.
        None => {
          let _ = done_tx.send(Ok(()));
        }
      }
    };

  let finish_save = |status: &watch::Sender<SaveStatus>, result: &Result<()>| {
    match result {
      Ok(()) => status.send_modify(|s| {
        s.saving = false;
        s.last_saved = Some(Utc::now());
        s.last_error = None;
      }),
      Err(e) => {
        tracing::warn!(error = %e, "autosave failed");
        status.send_modify(|s| {
          s.saving = false;
          s.last_error = Some(e.to_string());
        });
      }
    }
  };

  loop {
    tokio::select! {
      msg = rx.recv() => match msg {
        Some(Msg::Edit(snapshot)) => {
          latest = Some(snapshot);
          if state.on_edit() == SaveEffect::ArmTimer {
            deadline = Some(Instant::now() + debounce);
          }
        }
        Some(Msg::Commit(snapshot, done)) => {
          latest = Some(snapshot);
          deadline = None;
          waiters.push(done);
          if state.on_commit() == SaveEffect::StartSave {
            start_save(&mut latest, &status, &done_tx);
          }
        }
        None => break,
      },
      () = tokio::time::sleep_until(
        deadline.unwrap_or_else(Instant::now),
      ), if deadline.is_some() => {
        deadline = None;
        if state.on_timer() == SaveEffect::StartSave {
          start_save(&mut latest, &status, &done_tx);
        }
      }
      result = done_rx.recv() => {
        // The sender side lives in this scope, so recv can't return None
        // until we drop it.
        let Some(result) = result else { break };
        finish_save(&status, &result);
        if state.on_save_done(deadline.is_some()) == SaveEffect::StartSave {
          // Queued follow-up; its completion answers every waiter.
          start_save(&mut latest, &status, &done_tx);
        }
        if !state.is_saving() {
          for waiter in waiters.drain(..) {
            let _ = waiter.send(clone_result(&result));
          }
        }
      }
    }
  }

  // Every handle is gone. Drain the in-flight save, then flush anything
  // still pending so the last edits aren't lost.
  if state.is_saving() {
    if let Some(result) = done_rx.recv().await {
      finish_save(&status, &result);
    }
  }
  if let Some(snapshot) = latest.take() {
    let result = sink.save(snapshot).await;
    finish_save(&status, &result);
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
