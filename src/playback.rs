//! Hotkey-driven playback coordination.
//!
//! [`PlaybackController`] turns hotkey actions into calls on an external
//! transport and song list. Switching songs runs as a strict sequence:
//!
//! ```text
//! Idle → Stopping → Switching → Starting → Idle
//! ```
//!
//! Each stage awaits the collaborator's completion before the next begins,
//! and overlapping switch requests are serialized, so playback never starts
//! before the new selection has taken effect.

use anyhow::{Context, Result};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::shortcuts::{Action, ActionReceiver, ActionSender, HotkeyService, ShortcutSet};

/// The player that actually produces output.
pub trait Transport {
    /// Toggles between playing and paused.
    fn toggle_play_pause(&self) -> impl Future<Output = Result<()>> + Send;

    /// Stops playback; resolves once playback has fully stopped.
    fn stop(&self) -> impl Future<Output = Result<()>> + Send;

    /// Starts playing the current selection.
    fn start(&self) -> impl Future<Output = Result<()>> + Send;
}

/// The list of songs playback selects from.
pub trait SongList {
    /// Moves the selection back one song; resolves once it has taken effect.
    fn select_previous(&self) -> impl Future<Output = Result<()>> + Send;

    /// Moves the selection forward one song; resolves once it has taken effect.
    fn select_next(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Stage of the song-switch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No switch in progress
    #[default]
    Idle,
    /// Waiting for the transport to stop
    Stopping,
    /// Waiting for the song list to change selection
    Switching,
    /// Waiting for the transport to start
    Starting,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Stopping => write!(f, "stopping"),
            Self::Switching => write!(f, "switching"),
            Self::Starting => write!(f, "starting"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Previous,
    Next,
}

/// Coordinates hotkeys, the transport and the song list.
pub struct PlaybackController<T, S, H> {
    transport: T,
    songs: S,
    hotkeys: Mutex<H>,
    phase: watch::Sender<Phase>,
    /// Held for the whole of a switch sequence
    sequence: tokio::sync::Mutex<()>,
}

impl<T, S, H> PlaybackController<T, S, H>
where
    T: Transport + Sync,
    S: SongList + Sync,
    H: HotkeyService,
{
    /// Creates an idle controller. No shortcuts are registered yet.
    pub fn new(transport: T, songs: S, hotkeys: H) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            transport,
            songs,
            hotkeys: Mutex::new(hotkeys),
            phase,
            sequence: tokio::sync::Mutex::new(()),
        }
    }

    /// Current stage of the switch sequence.
    #[must_use]
    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Subscribes to phase changes.
    #[must_use]
    pub fn watch_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// The transport being driven.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// The song list being driven.
    #[must_use]
    pub const fn songs(&self) -> &S {
        &self.songs
    }

    fn hotkeys(&self) -> MutexGuard<'_, H> {
        self.hotkeys.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers the four actions against `shortcuts`.
    ///
    /// Any previous registration is dropped first; there is no incremental
    /// update. Failures are returned so the caller can log them and carry on
    /// without shortcuts.
    pub fn bind(&self, shortcuts: &ShortcutSet, sink: ActionSender) -> Result<()> {
        let mut hotkeys = self.hotkeys();
        hotkeys
            .unregister_all()
            .context("Failed to unregister shortcuts")?;
        hotkeys
            .register(&shortcuts.bindings(), sink)
            .context("Failed to register shortcuts")?;

        info!(
            start_pause = %shortcuts.start_pause,
            stop = %shortcuts.stop,
            prev_song = %shortcuts.prev_song,
            next_song = %shortcuts.next_song,
            "Registered playback shortcuts"
        );
        Ok(())
    }

    /// Drops all shortcut registrations.
    pub fn unbind(&self) -> Result<()> {
        self.hotkeys()
            .unregister_all()
            .context("Failed to unregister shortcuts")
    }

    /// Handles the play/pause shortcut.
    pub async fn on_start_pause(&self) -> Result<()> {
        self.transport
            .toggle_play_pause()
            .await
            .context("Failed to toggle playback")
    }

    /// Handles the stop shortcut.
    pub async fn on_stop(&self) -> Result<()> {
        self.transport.stop().await.context("Failed to stop playback")
    }

    /// Stops, selects the previous song, and starts it.
    pub async fn on_prev_song(&self) -> Result<()> {
        self.switch_song(Direction::Previous).await
    }

    /// Stops, selects the next song, and starts it.
    pub async fn on_next_song(&self) -> Result<()> {
        self.switch_song(Direction::Next).await
    }

    /// Routes an action to its handler.
    pub async fn dispatch(&self, action: Action) -> Result<()> {
        debug!(action = action.id(), "Dispatching action");
        match action {
            Action::StartPause => self.on_start_pause().await,
            Action::Stop => self.on_stop().await,
            Action::PrevSong => self.on_prev_song().await,
            Action::NextSong => self.on_next_song().await,
        }
    }

    /// Handles actions one at a time until every sender is dropped.
    ///
    /// Handler failures are logged and do not stop the loop.
    pub async fn run(&self, mut actions: ActionReceiver) {
        while let Some(action) = actions.recv().await {
            if let Err(err) = self.dispatch(action).await {
                warn!(action = action.id(), error = %format!("{err:#}"), "Shortcut action failed");
            }
        }
        debug!("Action channel closed");
    }

    async fn switch_song(&self, direction: Direction) -> Result<()> {
        let _sequence = self.sequence.lock().await;

        let result = self.run_switch(direction).await;
        self.set_phase(Phase::Idle);

        if let Err(err) = &result {
            warn!(?direction, error = %format!("{err:#}"), "Song switch aborted");
        }
        result
    }

    async fn run_switch(&self, direction: Direction) -> Result<()> {
        self.set_phase(Phase::Stopping);
        self.transport
            .stop()
            .await
            .context("Failed to stop playback before switching songs")?;

        self.set_phase(Phase::Switching);
        let selection = match direction {
            Direction::Previous => self.songs.select_previous().await,
            Direction::Next => self.songs.select_next().await,
        };
        selection.context("Failed to change song selection")?;

        self.set_phase(Phase::Starting);
        self.transport
            .start()
            .await
            .context("Failed to start playback after switching songs")?;

        Ok(())
    }

    fn set_phase(&self, phase: Phase) {
        let previous = self.phase.send_replace(phase);
        if previous != phase {
            debug!(from = %previous, to = %phase, "Playback phase changed");
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    songs: Vec<String>,
    selected: Option<usize>,
}

/// In-memory song list with circular selection.
///
/// Moving back from the first song (or with nothing selected) lands on the
/// last song; moving forward from the last song (or with nothing selected)
/// lands on the first.
#[derive(Debug, Default)]
pub struct SongQueue {
    state: Mutex<QueueState>,
}

impl SongQueue {
    /// Creates a queue with nothing selected.
    #[must_use]
    pub fn new(songs: Vec<String>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                songs,
                selected: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of songs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().songs.len()
    }

    /// Returns true if the queue has no songs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().songs.is_empty()
    }

    /// Index of the selected song.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.lock().selected
    }

    /// Name of the selected song.
    #[must_use]
    pub fn selected_song(&self) -> Option<String> {
        let state = self.lock();
        state.selected.and_then(|index| state.songs.get(index).cloned())
    }

    /// Selects a song by index; out-of-range indices clear the selection.
    pub fn select(&self, index: Option<usize>) {
        let mut state = self.lock();
        state.selected = index.filter(|index| *index < state.songs.len());
    }

    /// Replaces the songs, keeping the selection only if it is still in range.
    pub fn set_songs(&self, songs: Vec<String>) {
        let mut state = self.lock();
        state.songs = songs;
        let len = state.songs.len();
        state.selected = state.selected.filter(|index| *index < len);
    }

    fn step(&self, direction: Direction) {
        let mut state = self.lock();
        let len = state.songs.len();
        if len == 0 {
            state.selected = None;
            return;
        }

        let next = match (direction, state.selected) {
            (Direction::Next, Some(index)) if index + 1 < len => index + 1,
            (Direction::Next, _) => 0,
            (Direction::Previous, Some(index)) if index > 0 && index < len => index - 1,
            (Direction::Previous, _) => len - 1,
        };
        state.selected = Some(next);
        debug!(selected = next, song = %state.songs[next], "Song selected");
    }
}

impl SongList for SongQueue {
    async fn select_previous(&self) -> Result<()> {
        self.step(Direction::Previous);
        Ok(())
    }

    async fn select_next(&self) -> Result<()> {
        self.step(Direction::Next);
        Ok(())
    }
}
