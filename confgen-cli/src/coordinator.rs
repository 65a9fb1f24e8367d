//! Change-driven regeneration.
//!
//! The coordinator is the only concurrent piece of the tool: one
//! event-consuming loop, at most one armed debounce deadline, and at
//! most one retry task polling for a removed file to reappear. All
//! parties communicate through a single channel the loop consumes, so
//! the singularity invariants hold by construction: the loop owns the
//! deadline, and [`RetryGuard`] refuses to start a second poller while
//! one is in flight.
//!
//! The loop moves between three states: idle, waiting out a debounce
//! window (the last event in the window wins), and watching-unavailable
//! after the input file disappeared. Editors that save by
//! delete-then-recreate land in the third state; the bounded retry
//! re-attaches the watch when the file is back and schedules one
//! regeneration to pick up the recreated content.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant, SystemTime};

use colored::Colorize;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::WatchError;

/// Events consumed by the coordinator loop.
#[derive(Debug)]
pub enum CoordinatorEvent {
    /// The watched file was written or created.
    Changed,
    /// The watched file was removed.
    Removed,
    /// The file reappeared after a remove.
    Reappeared,
    /// The bounded retry gave up.
    RetryExhausted,
    /// The watch backend reported an error.
    WatchFailed(String),
    /// Stop the loop.
    Shutdown,
}

/// Sender half of the coordinator channel, used by watch backends,
/// signal handlers, and tests.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: Sender<CoordinatorEvent>,
}

impl CoordinatorHandle {
    /// Enqueue an event for the loop.
    pub fn send(&self, event: CoordinatorEvent) {
        // A send only fails after the loop has exited; nothing is
        // listening then and the event is moot.
        let _ = self.tx.send(event);
    }

    /// Request a clean stop.
    pub fn shutdown(&self) {
        self.send(CoordinatorEvent::Shutdown);
    }
}

/// Attaches and detaches the underlying file watch.
pub trait WatchBackend {
    fn attach(&mut self) -> Result<(), WatchError>;
    fn detach(&mut self);
}

/// notify-backed watch on a single file, feeding the coordinator
/// channel.
pub struct NotifyBackend {
    path: PathBuf,
    handle: CoordinatorHandle,
    watcher: Option<RecommendedWatcher>,
}

impl NotifyBackend {
    pub fn new(path: impl Into<PathBuf>, handle: CoordinatorHandle) -> Self {
        Self {
            path: path.into(),
            handle,
            watcher: None,
        }
    }
}

impl WatchBackend for NotifyBackend {
    fn attach(&mut self) -> Result<(), WatchError> {
        let handle = self.handle.clone();
        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                match result {
                    Ok(event) => match event.kind {
                        EventKind::Create(_) | EventKind::Modify(_) => {
                            handle.send(CoordinatorEvent::Changed);
                        }
                        EventKind::Remove(_) => handle.send(CoordinatorEvent::Removed),
                        _ => {}
                    },
                    Err(e) => handle.send(CoordinatorEvent::WatchFailed(e.to_string())),
                }
            })
            .map_err(|e| WatchError::attach(self.path.clone(), e.to_string()))?;

        watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::attach(self.path.clone(), e.to_string()))?;

        self.watcher = Some(watcher);
        Ok(())
    }

    fn detach(&mut self) {
        // Dropping the watcher releases the OS watch; the path itself
        // is usually already gone.
        self.watcher = None;
    }
}

/// At most one retry task in flight.
struct RetryGuard {
    handle: Option<JoinHandle<()>>,
    cancel: Arc<AtomicBool>,
}

impl RetryGuard {
    fn new() -> Self {
        Self {
            handle: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn a task unless one is already in flight. Returns whether a
    /// new task started.
    fn spawn_if_idle(&mut self, task: impl FnOnce(&AtomicBool) + Send + 'static) -> bool {
        if self.is_active() {
            return false;
        }
        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Arc::clone(&cancel);
        self.handle = Some(std::thread::spawn(move || task(&cancel)));
        true
    }

    fn cancel_and_join(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Serializes regeneration runs behind a debounce window and recovers
/// from delete-then-recreate edit patterns.
pub struct RegenerationCoordinator {
    path: PathBuf,
    debounce: Duration,
    retry_attempts: u32,
    retry_interval: Duration,
    rx: Receiver<CoordinatorEvent>,
    handle: CoordinatorHandle,
}

impl RegenerationCoordinator {
    /// Create a coordinator for the given input file, returning the
    /// handle event sources feed.
    pub fn new(path: impl Into<PathBuf>, debounce: Duration) -> (Self, CoordinatorHandle) {
        let (tx, rx) = channel();
        let handle = CoordinatorHandle { tx };
        let coordinator = Self {
            path: path.into(),
            debounce,
            retry_attempts: 10,
            retry_interval: Duration::from_millis(100),
            rx,
            handle: handle.clone(),
        };
        (coordinator, handle)
    }

    /// Set the bounded-retry parameters.
    pub fn with_retry(mut self, attempts: u32, interval: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_interval = interval;
        self
    }

    /// The watched input file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the loop until shutdown, invoking `regenerate` once per
    /// elapsed debounce window.
    ///
    /// An attach failure at startup is fatal; regeneration failures
    /// are logged and the loop keeps watching.
    pub fn run(
        self,
        mut backend: impl WatchBackend,
        mut regenerate: impl FnMut() -> anyhow::Result<()>,
    ) -> Result<(), WatchError> {
        backend.attach()?;

        let mut pending: Option<Instant> = None;
        let mut retry = RetryGuard::new();

        loop {
            let event = match pending {
                Some(deadline) => {
                    let now = Instant::now();
                    if deadline <= now {
                        pending = None;
                        run_pipeline(&mut regenerate);
                        continue;
                    }
                    match self.rx.recv_timeout(deadline - now) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => {
                            pending = None;
                            run_pipeline(&mut regenerate);
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.rx.recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };

            match event {
                CoordinatorEvent::Changed => {
                    // Re-arm the single deadline; the last event in
                    // the window is the one whose run executes.
                    pending = Some(Instant::now() + self.debounce);
                }
                CoordinatorEvent::Removed => {
                    pending = None;
                    backend.detach();

                    let path = self.path.clone();
                    let handle = self.handle.clone();
                    let attempts = self.retry_attempts;
                    let interval = self.retry_interval;
                    let started = retry.spawn_if_idle(move |cancel| {
                        for _ in 0..attempts {
                            std::thread::sleep(interval);
                            if cancel.load(Ordering::Relaxed) {
                                return;
                            }
                            if path.exists() {
                                handle.send(CoordinatorEvent::Reappeared);
                                return;
                            }
                        }
                        handle.send(CoordinatorEvent::RetryExhausted);
                    });
                    if started {
                        println!("{}", "File removed, waiting for recreation...".yellow());
                    }
                }
                CoordinatorEvent::Reappeared => match backend.attach() {
                    Ok(()) => {
                        println!("{}", "File recreated, watching again...".cyan());
                        // Pick up the recreated content.
                        pending = Some(Instant::now() + self.debounce);
                    }
                    Err(e) => {
                        // The file vanished again between the poll and
                        // the attach; go back to waiting.
                        eprintln!("{} {e}", "Watch error:".red());
                        self.handle.send(CoordinatorEvent::Removed);
                    }
                },
                CoordinatorEvent::RetryExhausted => {
                    eprintln!(
                        "{}",
                        "Warning: could not re-watch file after removal".yellow()
                    );
                }
                CoordinatorEvent::WatchFailed(message) => {
                    eprintln!("{} {message}", "Watch error:".red());
                }
                CoordinatorEvent::Shutdown => {
                    pending = None;
                    break;
                }
            }
        }

        retry.cancel_and_join();
        Ok(())
    }
}

fn run_pipeline(regenerate: &mut impl FnMut() -> anyhow::Result<()>) {
    println!(
        "\n[{}] Change detected, regenerating...",
        humantime::format_rfc3339_seconds(SystemTime::now())
    );
    if let Err(e) = regenerate() {
        eprintln!("{} {e:#}", "✗ Error:".red());
    }
}
