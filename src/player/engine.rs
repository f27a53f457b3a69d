//! Playback engine actor.
//!
//! A single tokio task owns the queue, the state machine and the ticker.
//! [`EngineHandle`] is a cheap clonable front end: each operation is sent
//! as a [`Command`] with a oneshot reply and executed in mailbox order, so
//! ticks and user commands can never interleave mid-operation.
//!
//! ```text
//!  EngineHandle ──Command──▶ mpsc mailbox ──▶ PlaybackEngine::run
//!       ▲                         ▲                  │
//!       │ watch / broadcast       │ Tick{generation} │ owns
//!       │                         │                  ▼
//!  observers ◀── publish() ─── Ticker task     PlaybackQueue
//!                                              PlaybackStateMachine
//! ```
//!
//! Context resolution goes through the [`TrackLookup`] on the caller's
//! task before anything is sent to the actor, so a slow library never
//! blocks other commands or ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use super::clock::PlaybackClock;
use super::context::NavigationContext;
use super::queue::{PlaybackQueue, QueueSummary, RepeatMode};
use super::state::{CurrentPlaybackState, PlaybackPhase, PlaybackStateMachine};
use super::ticker::{Ticker, TickerCounts, TickerStats};
use crate::config::PlaybackConfig;
use crate::error::{Error, Result};
use crate::library::TrackLookup;
use crate::model::{Track, TrackId};

const MAILBOX_CAPACITY: usize = 64;

type Reply<T> = oneshot::Sender<Result<T>>;

/// Notifications published after engine mutations.
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    /// The playback snapshot changed
    StateChanged(CurrentPlaybackState),
    /// Queue order, position or modes changed
    QueueChanged(QueueSummary),
    /// An in-flight transition failed
    Error(String),
}

/// Messages processed by the engine task.
#[derive(Debug)]
pub(crate) enum Command {
    Play(Reply<bool>),
    Pause(Reply<()>),
    Stop(Reply<()>),
    Seek(i64, Reply<()>),
    TogglePlayPause(Reply<bool>),
    InstallQueue {
        tracks: Vec<Arc<Track>>,
        target: TrackId,
        context: NavigationContext,
        autoplay: bool,
        reply: Reply<bool>,
    },
    ResolutionFailed {
        message: String,
        reply: Reply<()>,
    },
    Next(Reply<bool>),
    Previous(Reply<bool>),
    JumpTo(usize, Reply<bool>),
    Add(Arc<Track>, Reply<()>),
    Insert(usize, Arc<Track>, Reply<()>),
    Move(usize, usize, Reply<()>),
    Remove(usize, Reply<Arc<Track>>),
    ToggleShuffle(Reply<bool>),
    CycleRepeat(Reply<RepeatMode>),
    SetRepeat(RepeatMode, Reply<()>),
    QueueTracks(Reply<Vec<Arc<Track>>>),
    Tick { generation: u64 },
    Shutdown,
}

/// State owned by the engine task.
pub struct PlaybackEngine {
    queue: PlaybackQueue,
    machine: PlaybackStateMachine,
    clock: Arc<dyn PlaybackClock>,
    tick_interval: Duration,
    restart_threshold_ms: u64,
    mailbox: mpsc::WeakSender<Command>,
    ticker: Option<Ticker>,
    generation: u64,
    last_tick_ms: u64,
    tickers: Arc<TickerStats>,
    state_tx: watch::Sender<CurrentPlaybackState>,
    queue_tx: watch::Sender<QueueSummary>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl PlaybackEngine {
    /// Spawn the engine task and return a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        lookup: Arc<dyn TrackLookup>,
        clock: Arc<dyn PlaybackClock>,
        config: PlaybackConfig,
    ) -> EngineHandle {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);

        let mut queue = PlaybackQueue::new();
        queue.set_repeat_mode(config.default_repeat);
        queue.set_shuffle(config.shuffle_on_start);

        let mut machine = PlaybackStateMachine::new();
        machine.set_modes(queue.shuffle(), queue.repeat_mode());

        let (state_tx, state_rx) = watch::channel(machine.state().clone());
        let (queue_tx, queue_rx) = watch::channel(queue.summary());
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let tickers = Arc::new(TickerStats::default());

        let engine = Self {
            queue,
            machine,
            clock,
            tick_interval: config.tick_interval(),
            restart_threshold_ms: config.restart_threshold_ms,
            mailbox: tx.downgrade(),
            ticker: None,
            generation: 0,
            last_tick_ms: 0,
            tickers: tickers.clone(),
            state_tx,
            queue_tx,
            events: events.clone(),
        };

        tokio::spawn(engine.run(rx));

        EngineHandle {
            tx,
            lookup,
            state_rx,
            queue_rx,
            events,
            tickers,
        }
    }

    /// Main run loop.
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        let tick_ms = self.tick_interval.as_millis() as u64;
        tracing::info!(target: "engine", tick_ms, "Playback engine started");

        while let Some(cmd) = rx.recv().await {
            if matches!(cmd, Command::Shutdown) {
                break;
            }
            self.handle(cmd);
        }

        self.cancel_ticker();
        tracing::info!(target: "engine", "Playback engine stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Play(reply) => {
                let result = self.play();
                self.respond(reply, result);
            }
            Command::Pause(reply) => {
                let result = self.pause();
                self.respond(reply, result);
            }
            Command::Stop(reply) => {
                let result = self.stop();
                self.respond(reply, result);
            }
            Command::Seek(ms, reply) => {
                let result = self.seek(ms);
                self.respond(reply, result);
            }
            Command::TogglePlayPause(reply) => {
                let result = if self.machine.phase() == PlaybackPhase::Playing {
                    self.pause().map(|()| false)
                } else {
                    self.play()
                };
                self.respond(reply, result);
            }
            Command::InstallQueue {
                tracks,
                target,
                context,
                autoplay,
                reply,
            } => {
                let result = self.install_queue(tracks, target, context, autoplay);
                self.respond(reply, result);
            }
            Command::ResolutionFailed { message, reply } => {
                self.fail(message);
                self.respond(reply, Ok(()));
            }
            Command::Next(reply) => {
                let result = self.play_next();
                self.respond(reply, result);
            }
            Command::Previous(reply) => {
                let result = self.play_previous();
                self.respond(reply, result);
            }
            Command::JumpTo(position, reply) => {
                let result = self.jump_to(position);
                self.respond(reply, result);
            }
            Command::Add(track, reply) => {
                self.queue.add_song(track);
                self.sync_current();
                self.respond(reply, Ok(()));
            }
            Command::Insert(position, track, reply) => {
                let result = self.queue.insert_song(position, track);
                self.sync_current();
                self.respond(reply, result);
            }
            Command::Move(from, to, reply) => {
                let len = self.queue.len();
                let result = if self.queue.move_song(from, to) {
                    self.sync_current();
                    Ok(())
                } else {
                    Err(Error::InvalidPosition {
                        position: from.max(to),
                        len,
                    })
                };
                self.respond(reply, result);
            }
            Command::Remove(position, reply) => {
                let result = self.remove(position);
                self.respond(reply, result);
            }
            Command::ToggleShuffle(reply) => {
                let enabled = self.queue.toggle_shuffle();
                tracing::debug!(target: "engine", enabled, "Shuffle toggled");
                self.sync_current();
                self.respond(reply, Ok(enabled));
            }
            Command::CycleRepeat(reply) => {
                let mode = self.queue.cycle_repeat_mode();
                tracing::debug!(target: "engine", ?mode, "Repeat mode cycled");
                self.sync_current();
                self.respond(reply, Ok(mode));
            }
            Command::SetRepeat(mode, reply) => {
                self.queue.set_repeat_mode(mode);
                self.sync_current();
                self.respond(reply, Ok(()));
            }
            Command::QueueTracks(reply) => {
                let _ = reply.send(Ok(self.queue.tracks()));
            }
            Command::Tick { generation } => {
                self.on_tick(generation);
                self.publish();
            }
            Command::Shutdown => {}
        }
    }

    /// Publish first so a caller that sees the reply also sees the new
    /// snapshot.
    fn respond<T>(&self, reply: Reply<T>, result: Result<T>) {
        if let Err(e) = &result
            && e.is_validation()
        {
            tracing::warn!(target: "engine", "Rejected: {}", e);
        }
        self.publish();
        let _ = reply.send(result);
    }

    // ---------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------

    fn play(&mut self) -> Result<bool> {
        match self.machine.phase() {
            PlaybackPhase::Playing => Ok(true),
            PlaybackPhase::Paused => {
                self.machine.resume()?;
                self.start_ticker();
                tracing::debug!(target: "engine", "Resumed");
                Ok(true)
            }
            _ => {
                let Some(track) = self.machine.state().current_track.clone() else {
                    tracing::debug!(target: "engine", "Play requested with no current track");
                    return Ok(false);
                };
                self.start_track(track)?;
                Ok(true)
            }
        }
    }

    fn pause(&mut self) -> Result<()> {
        self.machine.pause()?;
        self.cancel_ticker();
        tracing::debug!(target: "engine", position_ms = self.machine.state().position_ms, "Paused");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.machine.stop()?;
        self.cancel_ticker();
        tracing::debug!(target: "engine", "Stopped");
        Ok(())
    }

    /// Stop if anything is active; no-op otherwise.
    fn halt(&mut self) {
        if self.stop().is_err() {
            self.cancel_ticker();
        }
    }

    fn seek(&mut self, position_ms: i64) -> Result<()> {
        self.machine.seek(position_ms)?;
        self.last_tick_ms = self.clock.now_ms();
        Ok(())
    }

    /// Load `track` and start playing it from the beginning.
    fn start_track(&mut self, track: Arc<Track>) -> Result<()> {
        self.cancel_ticker();
        self.machine.play(Some(track.clone()))?;
        self.machine.set_queue_index(self.queue.current_index());
        self.publish();

        let loaded = self
            .clock
            .resolve_duration_ms(&track)
            .and_then(|duration_ms| self.machine.loaded(duration_ms).map(|()| duration_ms));
        let duration_ms = match loaded {
            Ok(duration_ms) => duration_ms,
            Err(e) => {
                self.fail(format!("Failed to load \"{}\": {}", track.title, e));
                return Err(e);
            }
        };
        self.start_ticker();

        tracing::info!(
            target: "engine",
            track_id = track.id,
            duration_ms,
            "Playing \"{}\"",
            track.title
        );
        Ok(())
    }

    /// Record an in-flight failure on the state and notify observers.
    fn fail(&mut self, message: String) {
        tracing::error!(target: "engine", "{}", message);
        self.cancel_ticker();
        self.machine.error(message.clone());
        let _ = self.events.send(PlaybackEvent::Error(message));
    }

    // ---------------------------------------------------------------
    // Queue navigation
    // ---------------------------------------------------------------

    fn install_queue(
        &mut self,
        tracks: Vec<Arc<Track>>,
        target: TrackId,
        context: NavigationContext,
        autoplay: bool,
    ) -> Result<bool> {
        let start_index = context.start_index();
        let label = context.label().to_string();
        self.queue.set_queue(tracks, context)?;

        let fallback_id = self
            .queue
            .base_tracks()
            .get(start_index)
            .or_else(|| self.queue.base_tracks().first())
            .map(|t| t.id);
        let track = match self.queue.jump_to_song(target) {
            Some(track) => Some(track),
            None => {
                tracing::debug!(
                    target: "engine",
                    track_id = target,
                    "Requested track not in resolved queue, using start index"
                );
                fallback_id.and_then(|id| self.queue.jump_to_song(id))
            }
        };
        let Some(track) = track else {
            return Err(Error::EmptyQueue);
        };
        self.queue.anchor_current();

        tracing::info!(
            target: "engine",
            tracks = self.queue.len(),
            "Queue set from \"{}\"",
            label
        );
        self.machine
            .set_modes(self.queue.shuffle(), self.queue.repeat_mode());

        if autoplay {
            self.start_track(track)?;
            return Ok(true);
        }

        let already_loaded = self.machine.state().is_loaded()
            && self
                .machine
                .state()
                .current_track
                .as_ref()
                .is_some_and(|current| current.id == track.id);
        if already_loaded {
            self.machine.set_queue_index(self.queue.current_index());
        } else {
            self.halt();
            self.machine
                .set_current(Some(track), self.queue.current_index());
        }
        Ok(false)
    }

    fn play_next(&mut self) -> Result<bool> {
        if self.queue.is_empty() {
            self.halt();
            return Ok(false);
        }
        match self.queue.next_song() {
            Some(track) => {
                self.start_track(track)?;
                Ok(true)
            }
            None => {
                tracing::info!(target: "engine", "Reached end of queue");
                self.halt();
                Ok(false)
            }
        }
    }

    fn play_previous(&mut self) -> Result<bool> {
        if self.queue.is_empty() {
            return Ok(false);
        }
        let state = self.machine.state();
        if state.is_loaded() && state.position_ms > self.restart_threshold_ms {
            return self.restart_current();
        }
        match self.queue.previous_song() {
            Some(track) => {
                self.start_track(track)?;
                Ok(true)
            }
            None => self.restart_current(),
        }
    }

    fn restart_current(&mut self) -> Result<bool> {
        if self.machine.state().is_loaded() {
            self.seek(0)?;
        }
        self.play()
    }

    fn jump_to(&mut self, position: usize) -> Result<bool> {
        let len = self.queue.len();
        let track = self
            .queue
            .jump_to(position)
            .ok_or(Error::InvalidPosition { position, len })?;
        self.start_track(track)?;
        Ok(true)
    }

    /// Remove a track from the active order.
    ///
    /// Removing the current track while playing or paused moves playback to
    /// the track that slid into its place. Removing the last track in the
    /// order follows "next" rules: `One` plays the new last track, `All`
    /// wraps and `Off` stops.
    fn remove(&mut self, position: usize) -> Result<Arc<Track>> {
        let len = self.queue.len();
        let was_current = self.queue.current_index() == Some(position);
        let was_last = position + 1 == len;
        let removed = self
            .queue
            .remove_song(position)
            .ok_or(Error::InvalidPosition { position, len })?;

        tracing::debug!(target: "engine", track_id = removed.id, position, "Removed from queue");

        if !was_current {
            self.sync_current();
            return Ok(removed);
        }

        if self.queue.is_empty() {
            self.halt();
            self.machine.clear_track();
            return Ok(removed);
        }

        let active = matches!(
            self.machine.phase(),
            PlaybackPhase::Playing | PlaybackPhase::Paused | PlaybackPhase::Loading
        );
        let replacement = if !was_last {
            self.queue.current()
        } else {
            match self.queue.repeat_mode() {
                RepeatMode::One => self.queue.current(),
                RepeatMode::All => self.queue.jump_to(0),
                RepeatMode::Off => None,
            }
        };

        match replacement {
            Some(track) if active => self.start_track(track)?,
            Some(track) => self
                .machine
                .set_current(Some(track), self.queue.current_index()),
            None => {
                self.halt();
                self.machine
                    .set_current(self.queue.current(), self.queue.current_index());
            }
        }
        Ok(removed)
    }

    /// Mirror queue flags and position onto the state after a queue edit.
    fn sync_current(&mut self) {
        self.machine
            .set_modes(self.queue.shuffle(), self.queue.repeat_mode());
        if self.machine.state().current_track.is_none() {
            if let Some(track) = self.queue.current() {
                self.machine
                    .set_current(Some(track), self.queue.current_index());
            }
        } else {
            self.machine.set_queue_index(self.queue.current_index());
        }
    }

    // ---------------------------------------------------------------
    // Ticker
    // ---------------------------------------------------------------

    fn start_ticker(&mut self) {
        self.cancel_ticker();
        self.generation += 1;
        self.last_tick_ms = self.clock.now_ms();

        let generation = self.generation;
        self.ticker = Some(Ticker::spawn(
            self.tick_interval,
            self.mailbox.clone(),
            move || Command::Tick { generation },
            self.tickers.clone(),
        ));
        tracing::trace!(target: "ticker", generation, "Ticker started");
    }

    fn cancel_ticker(&mut self) {
        if self.ticker.take().is_some() {
            self.generation += 1;
            tracing::trace!(target: "ticker", generation = self.generation, "Ticker cancelled");
        }
    }

    fn on_tick(&mut self, generation: u64) {
        if generation != self.generation || self.ticker.is_none() {
            tracing::trace!(target: "ticker", generation, "Ignoring stale tick");
            return;
        }
        if self.machine.phase() != PlaybackPhase::Playing {
            return;
        }

        let now = self.clock.now_ms();
        let elapsed = now.saturating_sub(self.last_tick_ms);
        self.last_tick_ms = now;

        if !self.machine.advance(elapsed) {
            return;
        }

        self.publish();
        tracing::debug!(target: "engine", "Track finished");
        if let Err(e) = self.play_next()
            && !self.machine.state().has_error()
        {
            self.fail(format!("Auto-advance failed: {}", e));
        }
    }

    // ---------------------------------------------------------------
    // Publishing
    // ---------------------------------------------------------------

    /// Push the current queue summary and snapshot to observers if they
    /// changed since the last publish. The summary goes first so state
    /// observers can pair each snapshot with an up-to-date queue.
    fn publish(&self) {
        let summary = self.queue.summary();
        let queue_changed = self.queue_tx.send_if_modified(|current| {
            if *current == summary {
                false
            } else {
                *current = summary.clone();
                true
            }
        });
        if queue_changed {
            let _ = self.events.send(PlaybackEvent::QueueChanged(summary));
        }

        let snapshot = self.machine.state().clone();
        let state_changed = self.state_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });
        if state_changed {
            let _ = self.events.send(PlaybackEvent::StateChanged(snapshot));
        }
    }
}

/// Clonable handle to a running [`PlaybackEngine`].
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
    lookup: Arc<dyn TrackLookup>,
    state_rx: watch::Receiver<CurrentPlaybackState>,
    queue_rx: watch::Receiver<QueueSummary>,
    events: broadcast::Sender<PlaybackEvent>,
    tickers: Arc<TickerStats>,
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("closed", &self.tx.is_closed())
            .field("phase", &self.state_rx.borrow().phase)
            .finish()
    }
}

impl EngineHandle {
    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| Error::EngineClosed)?;
        rx.await.map_err(|_| Error::EngineClosed)?
    }

    /// Start or resume playback of the current track.
    ///
    /// Returns `Ok(false)` when there is nothing to play.
    pub async fn play(&self) -> Result<bool> {
        self.request(Command::Play).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(Command::Pause).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.request(Command::Stop).await
    }

    /// Seek within the loaded track. Rejects positions outside `[0, duration]`.
    pub async fn seek_to(&self, position_ms: i64) -> Result<()> {
        self.request(|reply| Command::Seek(position_ms, reply)).await
    }

    /// Pause when playing, play otherwise. Returns whether playback is
    /// running afterwards.
    pub async fn toggle_play_pause(&self) -> Result<bool> {
        self.request(Command::TogglePlayPause).await
    }

    /// Replace the queue with the tracks of `context` and play `track`.
    ///
    /// If no track of the context resolves, the engine moves to the
    /// `Error` phase and the resolution error is returned.
    pub async fn play_song_with_context(
        &self,
        track: &Track,
        context: NavigationContext,
    ) -> Result<bool> {
        let tracks = self.resolve(&context).await?;
        self.request(|reply| Command::InstallQueue {
            tracks,
            target: track.id,
            context,
            autoplay: true,
            reply,
        })
        .await
    }

    /// Replace the queue without starting playback.
    ///
    /// Used when `track` is already playing and only its surrounding
    /// context changes.
    pub async fn setup_queue_from_context(
        &self,
        track: &Track,
        context: NavigationContext,
    ) -> Result<()> {
        let tracks = self.resolve(&context).await?;
        self.request(|reply| Command::InstallQueue {
            tracks,
            target: track.id,
            context,
            autoplay: false,
            reply,
        })
        .await
        .map(|_| ())
    }

    /// Play a single track as a one-song queue.
    pub async fn play_single(&self, track: &Track) -> Result<bool> {
        let context = NavigationContext::single_track(track.id, &track.title);
        self.play_song_with_context(track, context).await
    }

    async fn resolve(&self, context: &NavigationContext) -> Result<Vec<Arc<Track>>> {
        let outcome = self.lookup.resolve_context_tracks(context).await;
        let message = match outcome {
            Ok(tracks) if !tracks.is_empty() => return Ok(tracks),
            Ok(_) => format!("No playable tracks in \"{}\"", context.label()),
            Err(e) => format!("Could not resolve \"{}\": {}", context.label(), e),
        };
        self.request(|reply| Command::ResolutionFailed {
            message: message.clone(),
            reply,
        })
        .await?;
        Err(Error::resolution(message))
    }

    /// Skip to the next track. Returns `Ok(false)` and stops at the end of
    /// the queue.
    pub async fn play_next(&self) -> Result<bool> {
        self.request(Command::Next).await
    }

    /// Go back one track, or restart the current one when it has played
    /// past the restart threshold.
    pub async fn play_previous(&self) -> Result<bool> {
        self.request(Command::Previous).await
    }

    /// Play the track at `position` in the active order.
    pub async fn jump_to(&self, position: usize) -> Result<bool> {
        self.request(|reply| Command::JumpTo(position, reply)).await
    }

    pub async fn add_to_queue(&self, track: Arc<Track>) -> Result<()> {
        self.request(|reply| Command::Add(track, reply)).await
    }

    pub async fn insert_into_queue(&self, position: usize, track: Arc<Track>) -> Result<()> {
        self.request(|reply| Command::Insert(position, track, reply))
            .await
    }

    pub async fn move_in_queue(&self, from: usize, to: usize) -> Result<()> {
        self.request(|reply| Command::Move(from, to, reply)).await
    }

    pub async fn remove_from_queue(&self, position: usize) -> Result<Arc<Track>> {
        self.request(|reply| Command::Remove(position, reply)).await
    }

    /// Returns the new shuffle flag.
    pub async fn toggle_shuffle(&self) -> Result<bool> {
        self.request(Command::ToggleShuffle).await
    }

    /// Off → All → One → Off. Returns the new mode.
    pub async fn cycle_repeat_mode(&self) -> Result<RepeatMode> {
        self.request(Command::CycleRepeat).await
    }

    pub async fn set_repeat_mode(&self, mode: RepeatMode) -> Result<()> {
        self.request(|reply| Command::SetRepeat(mode, reply)).await
    }

    /// Tracks in the active play order.
    pub async fn queue_tracks(&self) -> Result<Vec<Arc<Track>>> {
        self.request(Command::QueueTracks).await
    }

    /// Latest published playback state.
    pub fn snapshot(&self) -> CurrentPlaybackState {
        self.state_rx.borrow().clone()
    }

    /// Latest published queue summary.
    pub fn queue_summary(&self) -> QueueSummary {
        self.queue_rx.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<CurrentPlaybackState> {
        self.state_rx.clone()
    }

    pub fn subscribe_queue(&self) -> watch::Receiver<QueueSummary> {
        self.queue_rx.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    pub fn ticker_stats(&self) -> TickerCounts {
        self.tickers.counts()
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Stop the engine task. Later requests fail with `EngineClosed`.
    pub async fn shutdown(&self) -> Result<()> {
        self.tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| Error::EngineClosed)
    }
}
