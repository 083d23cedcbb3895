//! The steppable, threaded pathfinding engine: [`PathFinder`].
//!
//! A caller (typically an editor UI thread) drives the engine through
//! [`start`](PathFinder::start), [`step`](PathFinder::step) and
//! [`stop`](PathFinder::stop) and reads the open list, closed list and path
//! after each step to repaint. None of these calls block on a search
//! iteration.
//!
//! Each run owns one worker thread. The worker receives step commands over
//! a channel and performs exactly one [`Search::step`] per command; in
//! free-running mode it also performs one iteration every time the step
//! interval elapses without a command. Stopping cancels the run's
//! [`Context`] and drops the command sender, which wakes a sleeping worker
//! so it exits at once. An iteration already in progress always completes.
//!
//! The graph is cloned into the run at `start`, so editing the caller's
//! graph while a search runs never races with the worker.

use std::fmt;
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use stepgraph_core::{Graph, NodeId};

use crate::algorithm::Algorithm;
use crate::context::Context;
use crate::search::{NodeInfo, Search, SearchStatus};

/// How a run advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// When `true`, only [`PathFinder::step`] advances the search.
    pub stepped: bool,
    /// Delay between automatic iterations when not stepped.
    pub step_interval: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            stepped: false,
            step_interval: Duration::from_millis(100),
        }
    }
}

impl RunConfig {
    /// Single-stepping: one iteration per [`PathFinder::step`] call.
    pub fn stepped() -> Self {
        Self {
            stepped: true,
            ..Self::default()
        }
    }

    /// Free-running with `interval_ms` milliseconds between iterations.
    pub fn auto(interval_ms: u64) -> Self {
        Self {
            stepped: false,
            step_interval: Duration::from_millis(interval_ms),
        }
    }
}

/// Lifecycle of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No run has been started yet.
    Idle,
    /// A run is active and accepts steps.
    Running,
    /// The last run ended by finding the goal or exhausting the open list.
    Finished,
    /// The last run was stopped before it finished.
    Stopped,
}

/// Notifications published to [`PathFinder::subscribe`] receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    /// One iteration completed. `iteration` counts from 1 within a run.
    Stepped {
        iteration: usize,
        status: SearchStatus,
    },
    /// The run finished; `found` tells whether a path was produced.
    Finished { found: bool },
    /// The run was stopped before finishing.
    Stopped,
}

/// Errors returned by [`PathFinder::start`].
#[derive(Debug)]
pub enum SearchError {
    /// An endpoint handle does not refer to a node of the given graph.
    UnknownNode(NodeId),
    /// The worker thread for the run could not be spawned.
    Spawn(io::Error),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "search endpoint {id} is not in the graph"),
            Self::Spawn(e) => write!(f, "failed to spawn search worker: {e}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(e) => Some(e),
            Self::UnknownNode(_) => None,
        }
    }
}

/// The open list, closed list and path captured under one lock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub open: Vec<NodeInfo>,
    pub closed: Vec<NodeInfo>,
    pub path: Vec<NodeInfo>,
    pub iterations: usize,
}

/// Callback invoked once per step, before the iteration runs.
pub type StepListener = Arc<dyn Fn() + Send + Sync>;

enum Command {
    Step,
}

struct Run {
    ctx: Context,
    commands: Sender<Command>,
}

struct RunState {
    search: Option<Search>,
    phase: EngineState,
}

struct Shared {
    state: Mutex<RunState>,
    listener: Mutex<Option<StepListener>>,
    subscribers: Mutex<Vec<Sender<SearchEvent>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn notify_listener(&self) {
        let listener = lock(&self.listener).clone();
        if let Some(f) = listener {
            f();
        }
    }

    fn emit(&self, event: SearchEvent) {
        lock(&self.subscribers).retain(|tx| tx.send(event).is_ok());
    }

    fn read<T: Default>(&self, f: impl FnOnce(&Search) -> T) -> T {
        lock(&self.state).search.as_ref().map(f).unwrap_or_default()
    }

    /// Worker loop of one run.
    fn work(&self, graph: &Graph, ctx: &Context, commands: Receiver<Command>, config: RunConfig) {
        loop {
            let next = if config.stepped {
                commands.recv().map_err(|_| RecvTimeoutError::Disconnected)
            } else {
                commands.recv_timeout(config.step_interval)
            };
            match next {
                Ok(Command::Step) => {}
                Err(RecvTimeoutError::Timeout) => {
                    if ctx.is_done() {
                        break;
                    }
                    self.notify_listener();
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
            if !self.iterate(graph, ctx) {
                break;
            }
        }
        log::trace!("search worker exiting");
    }

    /// Run one iteration unless the run was cancelled. Returns whether the
    /// run wants more iterations.
    fn iterate(&self, graph: &Graph, ctx: &Context) -> bool {
        let mut state = lock(&self.state);
        // Checked under the state lock so a restart can never interleave
        // with an iteration of the previous run.
        if ctx.is_done() {
            return false;
        }
        let Some(search) = state.search.as_mut() else {
            return false;
        };
        let status = search.step(graph);
        let iteration = search.iterations();
        log::trace!(
            "{} iteration {iteration}: {} open, {} closed, {status:?}",
            search.algorithm(),
            search.open().len(),
            search.closed().len(),
        );
        self.emit(SearchEvent::Stepped { iteration, status });
        if !status.is_finished() {
            return true;
        }

        let found = status == SearchStatus::Found;
        log::debug!(
            "{} finished after {iteration} iterations: {}",
            search.algorithm(),
            if found { "path found" } else { "no path" },
        );
        ctx.cancel();
        state.phase = EngineState::Finished;
        self.emit(SearchEvent::Finished { found });
        false
    }
}

/// Steppable single-source search over a snapshot of a [`Graph`].
///
/// All methods take `&self`; the engine can be shared between the thread
/// that drives it and the thread that paints it.
pub struct PathFinder {
    algorithm: Algorithm,
    shared: Arc<Shared>,
    run: Mutex<Option<Run>>,
}

impl PathFinder {
    /// Create an idle engine for `algorithm`.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            shared: Arc::new(Shared {
                state: Mutex::new(RunState {
                    search: None,
                    phase: EngineState::Idle,
                }),
                listener: Mutex::new(None),
                subscribers: Mutex::new(Vec::new()),
            }),
            run: Mutex::new(None),
        }
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Install the per-step callback, replacing any previous one.
    ///
    /// It may be invoked from the caller's thread or from the run's worker.
    pub fn set_step_listener<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *lock(&self.shared.listener) = Some(Arc::new(f));
    }

    pub fn clear_step_listener(&self) {
        *lock(&self.shared.listener) = None;
    }

    /// Receive every [`SearchEvent`] published from now on.
    pub fn subscribe(&self) -> Receiver<SearchEvent> {
        let (tx, rx) = mpsc::channel();
        lock(&self.shared.subscribers).push(tx);
        rx
    }

    /// Begin a search from `start` to `goal` over a snapshot of `graph`.
    ///
    /// An active run is stopped and its lists discarded first. The previous
    /// path is cleared as well. The first iteration is dispatched right
    /// away, in either mode.
    pub fn start(
        &self,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
        config: RunConfig,
    ) -> Result<(), SearchError> {
        for id in [start, goal] {
            if !graph.contains_node(id) {
                return Err(SearchError::UnknownNode(id));
            }
        }

        let mut run = lock(&self.run);
        if let Some(previous) = run.take() {
            if previous.ctx.cancel() {
                log::debug!("{}: restarting, previous run cancelled", self.algorithm);
            }
        }

        let snapshot = Arc::new(graph.clone());
        let ctx = Context::new();
        let (tx, rx) = mpsc::channel();
        {
            let mut state = lock(&self.shared.state);
            state.search = Some(Search::new(self.algorithm, start, goal));
            state.phase = EngineState::Running;
        }

        let shared = Arc::clone(&self.shared);
        let worker_ctx = ctx.clone();
        let spawned = thread::Builder::new()
            .name("stepgraph-search".into())
            .spawn(move || shared.work(&snapshot, &worker_ctx, rx, config));
        if let Err(e) = spawned {
            ctx.cancel();
            lock(&self.shared.state).phase = EngineState::Stopped;
            return Err(SearchError::Spawn(e));
        }

        log::debug!(
            "{}: run started from {start} to {goal} over {} nodes (stepped: {}, interval: {:?})",
            self.algorithm,
            graph.node_count(),
            config.stepped,
            config.step_interval,
        );
        *run = Some(Run { ctx, commands: tx });
        drop(run);

        self.step();
        Ok(())
    }

    /// Request one iteration. A no-op unless a run is active.
    ///
    /// The step listener is notified before the iteration is dispatched to
    /// the worker; this call does not wait for it.
    pub fn step(&self) {
        let commands = {
            let run = lock(&self.run);
            match run.as_ref() {
                Some(run) if !run.ctx.is_done() => run.commands.clone(),
                _ => return,
            }
        };
        self.shared.notify_listener();
        // A worker that has already exited has nothing left to do.
        let _ = commands.send(Command::Step);
    }

    /// Deactivate the current run. Idempotent; a no-op after the run
    /// finished on its own.
    pub fn stop(&self) {
        let Some(run) = lock(&self.run).take() else {
            return;
        };
        if !run.ctx.cancel() {
            return;
        }
        let mut state = lock(&self.shared.state);
        if state.phase == EngineState::Running {
            state.phase = EngineState::Stopped;
            log::debug!("{}: run stopped", self.algorithm);
            self.shared.emit(SearchEvent::Stopped);
        }
    }

    pub fn state(&self) -> EngineState {
        lock(&self.shared.state).phase
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    /// Snapshot of the frontier.
    pub fn open_list(&self) -> Vec<NodeInfo> {
        self.shared.read(|s| s.open().to_vec())
    }

    /// Snapshot of the expanded records.
    pub fn closed_list(&self) -> Vec<NodeInfo> {
        self.shared.read(|s| s.closed().to_vec())
    }

    /// Snapshot of the root-to-goal path; empty unless the last run found
    /// one.
    pub fn path(&self) -> Vec<NodeInfo> {
        self.shared.read(|s| s.path().to_vec())
    }

    /// All three lists at once, consistent with a single iteration boundary.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.read(|s| Snapshot {
            open: s.open().to_vec(),
            closed: s.closed().to_vec(),
            path: s.path().to_vec(),
            iterations: s.iterations(),
        })
    }

    /// Iterations performed by the current or last run.
    pub fn iterations(&self) -> usize {
        self.shared.read(Search::iterations)
    }
}

impl Default for PathFinder {
    fn default() -> Self {
        Self::new(Algorithm::default())
    }
}

impl Drop for PathFinder {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for PathFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFinder")
            .field("algorithm", &self.algorithm)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stepgraph_core::{Node, Point};

    const WAIT: Duration = Duration::from_secs(5);

    /// `n` nodes in a row, 100px apart, linked left to right.
    fn line(n: i32) -> (Graph, Vec<NodeId>) {
        let mut g = Graph::new();
        let ids: Vec<NodeId> = (0..n)
            .map(|i| g.add_node(Node::at(format!("N{i}"), Point::new(i * 100, 0))))
            .collect();
        for w in ids.windows(2) {
            g.add_edge(w[0], w[1], "e").unwrap();
        }
        (g, ids)
    }

    fn next_event(rx: &Receiver<SearchEvent>) -> SearchEvent {
        rx.recv_timeout(WAIT).expect("engine event")
    }

    fn wait_for(rx: &Receiver<SearchEvent>, want: SearchEvent) {
        loop {
            if next_event(rx) == want {
                return;
            }
        }
    }

    fn nodes(recs: &[NodeInfo]) -> Vec<NodeId> {
        recs.iter().map(|r| r.node).collect()
    }

    fn stepped(iteration: usize, status: SearchStatus) -> SearchEvent {
        SearchEvent::Stepped { iteration, status }
    }

    #[test]
    fn stepped_mode_advances_one_iteration_per_step() {
        let (g, ids) = line(3);
        let pf = PathFinder::new(Algorithm::Dijkstra);
        let rx = pf.subscribe();
        pf.start(&g, ids[0], ids[2], RunConfig::stepped()).unwrap();

        assert_eq!(next_event(&rx), stepped(1, SearchStatus::Running));
        assert_eq!(nodes(&pf.closed_list()), [ids[0]]);
        assert_eq!(nodes(&pf.open_list()), [ids[1]]);
        assert!(pf.path().is_empty());
        assert!(pf.is_running());

        pf.step();
        assert_eq!(next_event(&rx), stepped(2, SearchStatus::Running));
        pf.step();
        assert_eq!(next_event(&rx), stepped(3, SearchStatus::Found));
        assert_eq!(next_event(&rx), SearchEvent::Finished { found: true });
        assert_eq!(nodes(&pf.path()), ids);
        assert_eq!(pf.state(), EngineState::Finished);
        assert_eq!(pf.iterations(), 3);

        let snap = pf.snapshot();
        assert_eq!(snap.path, pf.path());
        assert_eq!(nodes(&snap.closed), [ids[0], ids[1]]);
        assert_eq!(nodes(&snap.open), [ids[2]]);
        assert_eq!(snap.iterations, 3);
    }

    #[test]
    fn auto_mode_runs_to_completion() {
        let (g, ids) = line(5);
        let pf = PathFinder::default();
        let rx = pf.subscribe();
        pf.start(&g, ids[0], ids[4], RunConfig::auto(0)).unwrap();
        wait_for(&rx, SearchEvent::Finished { found: true });
        assert_eq!(nodes(&pf.path()), ids);
        assert_eq!(pf.path().last().map(|r| r.g), Some(400.0));
    }

    #[test]
    fn steps_after_stop_change_nothing() {
        let (g, ids) = line(4);
        let pf = PathFinder::new(Algorithm::Dijkstra);
        let rx = pf.subscribe();
        pf.start(&g, ids[0], ids[3], RunConfig::stepped()).unwrap();
        assert_eq!(next_event(&rx), stepped(1, SearchStatus::Running));

        pf.stop();
        assert_eq!(pf.state(), EngineState::Stopped);
        assert_eq!(next_event(&rx), SearchEvent::Stopped);
        let before = (pf.open_list(), pf.closed_list(), pf.path());

        for _ in 0..5 {
            pf.step();
        }
        pf.stop();
        thread::sleep(Duration::from_millis(50));
        assert_eq!((pf.open_list(), pf.closed_list(), pf.path()), before);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stop_wakes_a_sleeping_auto_run() {
        let (g, ids) = line(4);
        let pf = PathFinder::default();
        let rx = pf.subscribe();
        pf.start(&g, ids[0], ids[3], RunConfig::auto(60_000)).unwrap();
        assert_eq!(next_event(&rx), stepped(1, SearchStatus::Running));
        pf.stop();
        assert_eq!(next_event(&rx), SearchEvent::Stopped);
        assert_eq!(pf.closed_list().len(), 1);
    }

    #[test]
    fn restart_discards_previous_lists_and_path() {
        let (g, ids) = line(4);
        let pf = PathFinder::new(Algorithm::Dijkstra);
        let rx = pf.subscribe();
        pf.start(&g, ids[0], ids[3], RunConfig::auto(0)).unwrap();
        wait_for(&rx, SearchEvent::Finished { found: true });
        assert_eq!(pf.path().len(), 4);

        pf.start(&g, ids[2], ids[3], RunConfig::stepped()).unwrap();
        assert_eq!(next_event(&rx), stepped(1, SearchStatus::Running));
        assert_eq!(nodes(&pf.closed_list()), [ids[2]]);
        assert_eq!(nodes(&pf.open_list()), [ids[3]]);
        assert!(pf.path().is_empty());
    }

    #[test]
    fn start_while_running_replaces_the_run() {
        let (g, ids) = line(4);
        let pf = PathFinder::new(Algorithm::Dijkstra);
        let rx = pf.subscribe();
        pf.start(&g, ids[0], ids[3], RunConfig::stepped()).unwrap();
        assert_eq!(next_event(&rx), stepped(1, SearchStatus::Running));

        pf.start(&g, ids[1], ids[3], RunConfig::stepped()).unwrap();
        assert_eq!(next_event(&rx), stepped(1, SearchStatus::Running));
        assert_eq!(nodes(&pf.closed_list()), [ids[1]]);
        assert!(pf.is_running());
    }

    #[test]
    fn failed_run_leaves_no_stale_path() {
        let (g, ids) = line(3);
        let pf = PathFinder::default();
        let rx = pf.subscribe();
        pf.start(&g, ids[0], ids[2], RunConfig::auto(0)).unwrap();
        wait_for(&rx, SearchEvent::Finished { found: true });
        assert!(!pf.path().is_empty());

        // Edges only point right, so the reverse search must fail.
        pf.start(&g, ids[2], ids[0], RunConfig::auto(0)).unwrap();
        wait_for(&rx, SearchEvent::Finished { found: false });
        assert!(pf.path().is_empty());
        assert_eq!(pf.state(), EngineState::Finished);
    }

    #[test]
    fn listener_fires_once_per_step() {
        let (g, ids) = line(2);
        let pf = PathFinder::new(Algorithm::Dijkstra);
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        pf.set_step_listener(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let rx = pf.subscribe();

        pf.start(&g, ids[0], ids[1], RunConfig::stepped()).unwrap();
        assert_eq!(next_event(&rx), stepped(1, SearchStatus::Running));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        pf.step();
        wait_for(&rx, SearchEvent::Finished { found: true });
        assert_eq!(count.load(Ordering::SeqCst), 2);

        pf.step();
        assert_eq!(count.load(Ordering::SeqCst), 2);

        pf.clear_step_listener();
        pf.start(&g, ids[0], ids[1], RunConfig::stepped()).unwrap();
        assert_eq!(next_event(&rx), stepped(1, SearchStatus::Running));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_steps_run_one_at_a_time() {
        const THREADS: usize = 8;
        const STEPS: usize = 10;
        let (g, ids) = line(200);
        let pf = PathFinder::new(Algorithm::Dijkstra);
        let rx = pf.subscribe();
        pf.start(&g, ids[0], ids[199], RunConfig::stepped()).unwrap();

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    for _ in 0..STEPS {
                        pf.step();
                    }
                });
            }
        });

        let total = THREADS * STEPS + 1;
        for want in 1..=total {
            assert_eq!(next_event(&rx), stepped(want, SearchStatus::Running));
        }
        assert_eq!(pf.iterations(), total);

        // Every iteration expanded the node the previous one opened.
        let snap = pf.snapshot();
        assert_eq!(nodes(&snap.closed), ids[..total]);
        assert_eq!(nodes(&snap.open), [ids[total]]);
        assert!(pf.is_running());
    }

    #[test]
    fn run_is_isolated_from_graph_edits() {
        let (mut g, ids) = line(3);
        let pf = PathFinder::new(Algorithm::Dijkstra);
        let rx = pf.subscribe();
        pf.start(&g, ids[0], ids[2], RunConfig::stepped()).unwrap();
        assert_eq!(next_event(&rx), stepped(1, SearchStatus::Running));

        g.remove_node(ids[1]).unwrap();
        pf.step();
        pf.step();
        wait_for(&rx, SearchEvent::Finished { found: true });
        assert_eq!(nodes(&pf.path()), ids);
    }

    #[test]
    fn unknown_endpoint_is_rejected() {
        let (mut g, ids) = line(2);
        g.remove_node(ids[1]).unwrap();
        let pf = PathFinder::default();
        let err = pf.start(&g, ids[0], ids[1], RunConfig::stepped()).unwrap_err();
        assert!(matches!(err, SearchError::UnknownNode(id) if id == ids[1]));
        assert_eq!(pf.state(), EngineState::Idle);
        pf.step();
        assert!(pf.open_list().is_empty());
    }

    #[test]
    fn stop_after_finish_keeps_finished_state() {
        let (g, ids) = line(2);
        let pf = PathFinder::default();
        let rx = pf.subscribe();
        pf.start(&g, ids[0], ids[1], RunConfig::auto(0)).unwrap();
        wait_for(&rx, SearchEvent::Finished { found: true });
        pf.stop();
        pf.stop();
        assert_eq!(pf.state(), EngineState::Finished);
        assert_eq!(pf.path().len(), 2);
        assert!(rx.try_recv().is_err());
    }
}
