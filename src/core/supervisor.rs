//! # Supervisor: launches runners, propagates one cancellation, joins within a timeout.
//!
//! The free functions [`launch`] and [`join_all`] are the whole mechanism; [`Supervisor`]
//! wires them together with the event listener, the OS signal listener and the
//! configured subscribers.
//!
//! ## High-level architecture
//! ```text
//! Supervisor::run():
//!   scope() ──► (CancellationToken, Trigger)
//!   listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)      (until released)
//!
//! Launch (registration order):
//!   [SignalListener]  Runner[0]  Runner[1]  ...  Runner[N-1]
//!         │              │          │                │
//!         └──► launch(bus, scope, trigger, runner) ──► tokio::spawn(runner lifecycle)
//!                                                     └─► RunnerHandle { name, done }
//!
//! Wait:
//!   scope cancelled (any Trigger::fire / OS signal)
//!   or, without the signal listener, every runner finished on its own ──► Trigger::fire()
//!
//! Shutdown path:
//!   Bus.publish(ShutdownRequested)
//!   join_all(timeout):   per runner, in parallel
//!      ├─ done within timeout ──► RunnerJoined
//!      └─ timeout elapsed     ──► ShutdownTimeout  ("took too long to stop")
//!   all joined ──► AllStopped
//!   release: Trigger::fire(), drain listener, flush subscribers (bounded by timeout)
//! ```
//!
//! ## Rules
//! - Runner errors and panics are published, never returned to the caller.
//! - `join_all` waits for **every** per-runner wait; total wall time is bounded by `timeout`,
//!   not `timeout × N`.
//! - A runner that overruns the timeout is abandoned, not aborted.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use procvisor::{Supervisor, SupervisorConfig, TaskError, TaskFn, TaskRef, Trigger};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = SupervisorConfig::default();
//!     cfg.timeout = Duration::from_secs(5);
//!     cfg.signals = false;
//!
//!     let job: TaskRef = TaskFn::arc("job", |_ctx: CancellationToken, trigger: Trigger| async move {
//!         // work, then bring everything down
//!         trigger.fire();
//!         Ok::<_, TaskError>(())
//!     });
//!
//!     Supervisor::builder(cfg).with_task(job).build()?.run().await;
//!     Ok(())
//! }
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::builder::SupervisorBuilder;
use crate::core::config::SupervisorConfig;
use crate::core::runner::{Runner, RunnerHandle};
use crate::core::scope::{self, Trigger};
use crate::error::RunnerError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet, panic_info};
use crate::tasks::{SignalListener, TaskKind};

/// Starts `runner` concurrently and returns the handle to join on.
///
/// The outcome of [`Runner::start`] is published as [`EventKind::RunnerStopped`] or
/// [`EventKind::RunnerFailed`]; a panic is caught and reported as
/// [`RunnerError::Panicked`]. Nothing is returned to the caller. The handle reports done
/// only after that event has been published.
pub fn launch(
    bus: &Bus,
    scope: &CancellationToken,
    trigger: &Trigger,
    runner: Runner,
) -> RunnerHandle {
    let handle = runner.handle();
    let done = handle.done().guard();
    let name = runner.name().to_string();
    let run = runner.run_lifecycle(scope.clone(), trigger.clone(), bus.clone());
    let bus = bus.clone();

    tokio::spawn(async move {
        // done is released only after the outcome is on the bus
        let _done = done;
        let outcome = match AssertUnwindSafe(run).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic_err) => Err(RunnerError::Panicked {
                task: name.clone(),
                info: panic_info(&*panic_err),
            }),
        };

        match outcome {
            Ok(()) => bus.publish(Event::new(EventKind::RunnerStopped).with_task(name.as_str())),
            Err(e) => bus.publish(
                Event::new(EventKind::RunnerFailed)
                    .with_task(name.as_str())
                    .with_reason(e.to_string()),
            ),
        }
    });
    handle
}

/// Blocks until `scope` is cancelled, then waits up to `timeout` for each runner in parallel.
///
/// Publishes [`EventKind::RunnerJoined`] or [`EventKind::ShutdownTimeout`] per runner and
/// [`EventKind::AllStopped`] when nobody overran. Never fails.
pub async fn join_all(
    bus: &Bus,
    scope: &CancellationToken,
    timeout: Duration,
    handles: &[RunnerHandle],
) {
    scope.cancelled().await;

    let waits = handles.iter().map(|h| async move {
        match time::timeout(timeout, h.done().wait()).await {
            Ok(()) => {
                bus.publish(Event::new(EventKind::RunnerJoined).with_task(h.name()));
                true
            }
            Err(_elapsed) => {
                bus.publish(
                    Event::new(EventKind::ShutdownTimeout)
                        .with_task(h.name())
                        .with_timeout(timeout),
                );
                false
            }
        }
    });

    let joined = futures::future::join_all(waits).await;
    if joined.iter().all(|ok| *ok) {
        bus.publish(Event::new(EventKind::AllStopped).with_timeout(timeout));
    }
}

/// Runs a fixed set of runners under one scope and shuts them down together.
pub struct Supervisor {
    cfg: SupervisorConfig,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    runners: Vec<Runner>,
}

impl Supervisor {
    /// Starts building a supervisor with the given configuration.
    pub fn builder(cfg: SupervisorConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: SupervisorConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
        runners: Vec<Runner>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            subscribers,
            runners,
        }
    }

    /// Event bus shared with every runner; subscribe before [`Supervisor::run`] to observe it.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Registered runners, in launch order.
    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    /// Number of registered runners (the signal listener is not counted).
    pub fn len(&self) -> usize {
        self.runners.len()
    }

    /// True if no runner is registered.
    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    /// Runs every registered runner until the scope is cancelled, then joins them.
    ///
    /// With `cfg.signals` the scope is only cancelled by a task firing the trigger or by
    /// an OS signal; runners that return early do not end the run. Without it, the run
    /// also ends once every runner has finished on its own.
    ///
    /// Returns once every runner has reported done or overran `cfg.timeout`, and the
    /// subscribers have been flushed. Failures are only visible through events.
    pub async fn run(self) {
        let Supervisor {
            cfg,
            bus,
            subscribers,
            runners,
        } = self;

        let (scope, trigger) = scope::scope();
        let release = CancellationToken::new();
        let listener = subscriber_listener(
            bus.subscribe(),
            SubscriberSet::new(subscribers, bus.clone()),
            release.clone(),
        );

        let signals = cfg.signals.then(|| {
            let runner = Runner::once(TaskKind::simple(SignalListener::new()));
            launch(&bus, &scope, &trigger, runner)
        });

        let mut handles: Vec<RunnerHandle> = runners
            .into_iter()
            .map(|runner| launch(&bus, &scope, &trigger, runner))
            .collect();

        if signals.is_some() {
            scope.cancelled().await;
        } else {
            let finished = futures::future::join_all(handles.iter().map(|h| h.done().wait()));
            tokio::select! {
                _ = scope.cancelled() => {}
                _ = finished => {
                    tracing::debug!("every runner finished on its own");
                    trigger.fire();
                }
            }
        }

        bus.publish(Event::new(EventKind::ShutdownRequested));
        handles.extend(signals);
        join_all(&bus, &scope, cfg.timeout, &handles).await;

        trigger.fire();
        release.cancel();
        let flush = async {
            if let Ok(set) = listener.await {
                set.shutdown().await;
            }
        };
        if time::timeout(cfg.timeout, flush).await.is_err() {
            tracing::warn!(
                timeout_ms = cfg.timeout.as_millis() as u64,
                "subscribers did not drain in time"
            );
        }
    }
}

/// Forwards bus events to the subscriber set until `release` is cancelled.
///
/// Events already queued on the bus are drained before the set is handed back.
fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    release: CancellationToken,
) -> JoinHandle<SubscriberSet> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                ev = rx.recv() => match ev {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => return set,
                },
                _ = release.cancelled() => break,
            }
        }

        loop {
            match rx.try_recv() {
                Ok(ev) => set.emit(&ev),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        set
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::time::Instant;

    use crate::error::TaskError;
    use crate::tasks::{TaskFn, TaskRef};

    /// Stops `delay` after the scope is cancelled.
    fn lingering(name: &'static str, delay: Duration) -> TaskRef {
        TaskFn::arc(name, move |ctx: CancellationToken, _trigger: Trigger| async move {
            ctx.cancelled().await;
            time::sleep(delay).await;
            Ok::<_, TaskError>(())
        })
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn kinds_for(events: &[Event], kind: EventKind) -> Vec<String> {
        events
            .iter()
            .filter(|e| e.kind == kind)
            .filter_map(|e| e.task.as_deref().map(str::to_string))
            .collect()
    }

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "collect"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn join_all_is_bounded_by_the_slowest_runner() {
        let bus = Bus::new(64);
        let (scope, trigger) = scope::scope();

        let handles: Vec<RunnerHandle> = [("a", 1), ("b", 2), ("c", 3)]
            .into_iter()
            .map(|(name, secs)| {
                let runner = Runner::once(lingering(name, Duration::from_secs(secs)));
                launch(&bus, &scope, &trigger, runner)
            })
            .collect();

        trigger.fire();
        let started = Instant::now();
        join_all(&bus, &scope, Duration::from_secs(10), &handles).await;
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_secs(3), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(3500), "elapsed {elapsed:?}");
        assert!(handles.iter().all(|h| h.done().is_complete()));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_runner_is_reported_and_abandoned() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let (scope, trigger) = scope::scope();

        let hung: TaskRef = TaskFn::arc("hung", |_ctx: CancellationToken, _trigger: Trigger| async {
            time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, TaskError>(())
        });
        let handles = vec![
            launch(&bus, &scope, &trigger, Runner::once(hung)),
            launch(&bus, &scope, &trigger, Runner::once(lingering("polite", Duration::ZERO))),
        ];

        trigger.fire();
        let started = Instant::now();
        join_all(&bus, &scope, Duration::from_secs(1), &handles).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!handles[0].done().is_complete());

        let events = drain(&mut rx);
        assert_eq!(kinds_for(&events, EventKind::ShutdownTimeout), vec!["hung"]);
        assert_eq!(kinds_for(&events, EventKind::RunnerJoined), vec!["polite"]);
        assert!(!events.iter().any(|e| e.kind == EventKind::AllStopped));
        let timeout = events
            .iter()
            .find(|e| e.kind == EventKind::ShutdownTimeout)
            .and_then(|e| e.timeout_ms);
        assert_eq!(timeout, Some(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn one_runner_cancelling_stops_all() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let (scope, trigger) = scope::scope();
        let ticks = Arc::new(AtomicUsize::new(0));

        let quitter: TaskRef = TaskFn::arc("quitter", |_ctx: CancellationToken, trigger: Trigger| async move {
            time::sleep(Duration::from_secs(1)).await;
            trigger.fire();
            Ok::<_, TaskError>(())
        });
        let counter = Arc::clone(&ticks);
        let ticker: TaskRef = TaskFn::arc("ticker", move |_ctx: CancellationToken, _trigger: Trigger| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        });

        let handles = vec![
            launch(&bus, &scope, &trigger, Runner::once(quitter)),
            launch(
                &bus,
                &scope,
                &trigger,
                Runner::every(ticker, Duration::from_millis(300)).unwrap(),
            ),
        ];

        join_all(&bus, &scope, Duration::from_secs(5), &handles).await;

        assert!(scope.is_cancelled());
        assert!(handles.iter().all(|h| h.done().is_complete()));
        assert!(ticks.load(Ordering::SeqCst) >= 3);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| e.kind == EventKind::AllStopped));
    }

    #[tokio::test]
    async fn panicking_runner_is_reported_and_still_done() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let (scope, trigger) = scope::scope();

        let bomb: TaskRef = TaskFn::arc("bomb", |_ctx: CancellationToken, _trigger: Trigger| async {
            if true {
                panic!("task blew up");
            }
            Ok::<_, TaskError>(())
        });
        let handle = launch(&bus, &scope, &trigger, Runner::once(bomb));
        handle.done().wait().await;

        let failed = loop {
            let ev = rx.recv().await.unwrap();
            if ev.kind == EventKind::RunnerFailed {
                break ev;
            }
        };
        assert_eq!(failed.task.as_deref(), Some("bomb"));
        assert!(failed.reason.as_deref().unwrap_or("").contains("task blew up"));
        assert!(!scope.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_everything_once_a_task_fires_the_trigger() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let collect = Arc::new(Collect::default());

        let oneshot: TaskRef = TaskFn::arc("oneshot", |_ctx: CancellationToken, trigger: Trigger| async move {
            time::sleep(Duration::from_secs(10)).await;
            trigger.fire();
            Ok::<_, TaskError>(())
        });
        let counter = Arc::clone(&ticks);
        let periodic: TaskRef = TaskFn::arc("periodic", move |_ctx: CancellationToken, _trigger: Trigger| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        });

        let cfg = SupervisorConfig {
            timeout: Duration::from_secs(30),
            signals: false,
            ..SupervisorConfig::default()
        };
        let sup = Supervisor::builder(cfg)
            .with_subscribers(vec![collect.clone() as Arc<dyn Subscribe>])
            .with_task(oneshot)
            .with_interval_task(Duration::from_secs(5), periodic)
            .build()
            .unwrap();
        assert_eq!(sup.len(), 2);

        let started = Instant::now();
        sup.run().await;

        assert!(started.elapsed() < Duration::from_secs(11));
        assert!(ticks.load(Ordering::SeqCst) >= 2);

        let seen = collect.seen.lock().unwrap().clone();
        assert!(seen.contains(&EventKind::ShutdownRequested));
        assert!(seen.contains(&EventKind::AllStopped));
        assert!(!seen.contains(&EventKind::ShutdownTimeout));
    }

    fn counting(name: &'static str, calls: &Arc<AtomicUsize>) -> TaskRef {
        let counter = Arc::clone(calls);
        TaskFn::arc(name, move |_ctx: CancellationToken, _trigger: Trigger| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TaskError>(())
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn run_without_signals_returns_when_every_runner_finishes() {
        let calls = Arc::new(AtomicUsize::new(0));

        let cfg = SupervisorConfig {
            signals: false,
            ..SupervisorConfig::default()
        };
        Supervisor::builder(cfg)
            .with_task(counting("job", &calls))
            .build()
            .unwrap()
            .run()
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_with_signals_outlives_runners_that_return_early() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stopper: TaskRef = TaskFn::arc("stopper", |_ctx: CancellationToken, trigger: Trigger| async move {
            time::sleep(Duration::from_secs(5)).await;
            trigger.fire();
            Ok::<_, TaskError>(())
        });

        let cfg = SupervisorConfig {
            signals: true,
            ..SupervisorConfig::default()
        };
        let started = Instant::now();
        Supervisor::builder(cfg)
            .with_task(counting("server-starter", &calls))
            .with_task(stopper)
            .build()
            .unwrap()
            .run()
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn run_with_signals_and_finished_runners_keeps_waiting() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sup = Supervisor::builder(SupervisorConfig::default())
            .with_task(counting("server-starter", &calls))
            .build()
            .unwrap();

        let res = time::timeout(Duration::from_secs(2), sup.run()).await;

        assert!(res.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// `io::Write` sink shared with the test body.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn default_supervisor_logs_runner_failures() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let failing: TaskRef = TaskFn::arc("failing", |_ctx: CancellationToken, trigger: Trigger| async move {
            trigger.fire();
            Err::<(), _>(TaskError::fail("boom"))
        });
        let cfg = SupervisorConfig {
            signals: false,
            ..SupervisorConfig::default()
        };
        Supervisor::builder(cfg)
            .with_task(failing)
            .build()
            .unwrap()
            .run()
            .await;

        let logs = captured.text();
        assert!(logs.contains("runner ended in error"), "logs: {logs}");
        assert!(logs.contains("boom"), "logs: {logs}");
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_published_before_done() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let (scope, trigger) = scope::scope();

        let failing: TaskRef = TaskFn::arc("failing", |_ctx: CancellationToken, _trigger: Trigger| async {
            Err::<(), _>(TaskError::fail("boom"))
        });
        let handle = launch(&bus, &scope, &trigger, Runner::once(failing));
        handle.done().wait().await;

        let events = drain(&mut rx);
        assert_eq!(kinds_for(&events, EventKind::RunnerFailed), vec!["failing"]);
    }
}
