//! In-process executor running each pipeline as a tokio task.
//!
//! Unique work is tracked per logical name. `Replace` signals the running
//! pipeline to stop and awaits it before the new one is spawned, so a new
//! cleanup never overlaps steps of the pipeline it supersedes. Cancellation
//! is honoured at step boundaries and during retry backoff.
//!
//! Each name has its own slot lock: waiting out a superseded pipeline only
//! blocks submissions under that name.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::{Pipeline, StepKind};
use crate::types::WorkData;
use crate::worker::Workers;

use super::retry::{self, RetryPolicy};
use super::{
    ExistingWorkPolicy, StepState, WorkExecutor, WorkHandle, WorkId, WorkInfo, WorkState,
};

/// Runs pipelines on the current tokio runtime.
#[derive(Clone)]
pub struct LocalExecutor {
    inner: Arc<Inner>,
}

struct Inner {
    workers: Workers,
    retry: RetryPolicy,
    unique: Mutex<HashMap<String, Slot>>,
    infos: Mutex<HashMap<String, Vec<WorkInfo>>>,
    next_id: AtomicU64,
}

/// The current work under one logical name.
type Slot = Arc<tokio::sync::Mutex<Option<UniqueWork>>>;

struct UniqueWork {
    handle: WorkHandle,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl LocalExecutor {
    pub fn new(workers: Workers, retry: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                workers,
                retry,
                unique: Mutex::new(HashMap::new()),
                infos: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Executor with every standard worker and the configured retry policy.
    pub fn from_config(config: &Config) -> PipelineResult<Self> {
        Ok(Self::new(
            Workers::from_config(config)?,
            RetryPolicy::from(&config.pipeline),
        ))
    }

    /// Step snapshots of current pipelines whose steps carry `tag`.
    pub fn work_infos_by_tag(&self, tag: &str) -> Vec<WorkInfo> {
        let infos = self.inner.lock_infos();
        let mut matching: Vec<WorkInfo> = infos
            .values()
            .flatten()
            .filter(|info| info.tags.iter().any(|t| t == tag))
            .cloned()
            .collect();
        matching.sort_by_key(|info| (info.work_id, info.index));
        matching
    }

    /// Step snapshots of the current pipeline under `name`.
    pub fn work_infos_for_name(&self, name: &str) -> Vec<WorkInfo> {
        self.inner
            .lock_infos()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl WorkExecutor for LocalExecutor {
    async fn submit(
        &self,
        name: &str,
        policy: ExistingWorkPolicy,
        pipeline: Pipeline,
    ) -> PipelineResult<WorkHandle> {
        let slot = self.inner.slot(name);
        let mut current = slot.lock().await;

        if let Some(existing) = current.as_ref() {
            if policy == ExistingWorkPolicy::Keep && !existing.task.is_finished() {
                tracing::info!(name, work_id = existing.handle.id(), "Keeping in-flight work");
                return Ok(existing.handle.clone());
            }
        }

        if let Some(previous) = current.take() {
            if !previous.task.is_finished() {
                tracing::info!(
                    name,
                    work_id = previous.handle.id(),
                    "Replacing in-flight work"
                );
            }
            stop(previous).await;
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let infos = pipeline
            .steps()
            .iter()
            .enumerate()
            .map(|(index, step)| WorkInfo {
                work_id: id,
                name: name.to_string(),
                index,
                kind: step.kind,
                tags: step.tags.clone(),
                state: StepState::Enqueued,
                attempts: 0,
                output: WorkData::new(),
            })
            .collect();
        self.inner.lock_infos().insert(name.to_string(), infos);

        let (state_tx, state_rx) = watch::channel(WorkState::Enqueued);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = WorkHandle::new(id, name, state_rx);

        tracing::info!(name, work_id = id, steps = pipeline.len(), "Enqueued pipeline");
        let task = tokio::spawn(run_pipeline(
            Arc::clone(&self.inner),
            id,
            name.to_string(),
            pipeline,
            cancel_rx,
            state_tx,
        ));

        *current = Some(UniqueWork {
            handle: handle.clone(),
            cancel: cancel_tx,
            task,
        });
        Ok(handle)
    }

    async fn cancel_unique_work(&self, name: &str) -> bool {
        let Some(slot) = self.inner.existing_slot(name) else {
            return false;
        };
        // Held until the task ends so a concurrent submit cannot overlap it.
        let mut current = slot.lock().await;
        match current.take() {
            Some(work) => {
                let running = !work.task.is_finished();
                tracing::info!(name, work_id = work.handle.id(), running, "Cancelling work");
                stop(work).await;
                running
            }
            None => false,
        }
    }
}

/// Signal a pipeline to stop and wait for its task to end.
async fn stop(work: UniqueWork) {
    let _ = work.cancel.send(true);
    if let Err(e) = work.task.await {
        tracing::error!(work_id = work.handle.id(), "Pipeline task panicked: {e}");
    }
}

impl Inner {
    fn lock_unique(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.unique.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, name: &str) -> Slot {
        Arc::clone(self.lock_unique().entry(name.to_string()).or_default())
    }

    fn existing_slot(&self, name: &str) -> Option<Slot> {
        self.lock_unique().get(name).cloned()
    }

    fn lock_infos(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<WorkInfo>>> {
        self.infos.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update_info(&self, name: &str, id: WorkId, index: usize, f: impl FnOnce(&mut WorkInfo)) {
        let mut infos = self.lock_infos();
        if let Some(info) = infos
            .get_mut(name)
            .and_then(|steps| steps.get_mut(index))
            .filter(|info| info.work_id == id)
        {
            f(info);
        }
    }

    fn mark_from(&self, name: &str, id: WorkId, from: usize, state: StepState) {
        let mut infos = self.lock_infos();
        if let Some(steps) = infos.get_mut(name) {
            for info in steps.iter_mut().skip(from).filter(|i| i.work_id == id) {
                info.state = state;
            }
        }
    }

    /// Run one step, retrying retryable failures with backoff.
    ///
    /// Returns the result and the number of attempts made.
    async fn run_step(
        &self,
        kind: StepKind,
        input: &WorkData,
        cancel: &mut watch::Receiver<bool>,
    ) -> (PipelineResult<WorkData>, u32) {
        let worker = match self.workers.get(kind) {
            Ok(worker) => worker,
            Err(e) => return (Err(e), 0),
        };

        let mut attempt = 0u32;
        loop {
            let result = worker.do_work(input).await;
            match result {
                Err(e) if attempt < self.retry.max_retries && retry::is_retryable(&e) => {
                    let delay = retry::backoff_duration(attempt, self.retry.base_delay_ms);
                    tracing::warn!(
                        step = %kind,
                        attempt = attempt + 1,
                        "Step failed, retrying in {:?}: {e}",
                        delay
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancelled(cancel) => return (Err(PipelineError::Cancelled), attempt + 1),
                    }
                    attempt += 1;
                }
                other => return (other, attempt + 1),
            }
        }
    }
}

/// Resolves once cancellation has been signalled.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            // Sender gone without cancelling: never resolve.
            std::future::pending::<()>().await;
        }
    }
}

async fn run_pipeline(
    inner: Arc<Inner>,
    id: WorkId,
    name: String,
    pipeline: Pipeline,
    mut cancel: watch::Receiver<bool>,
    state: watch::Sender<WorkState>,
) {
    let mut carried = WorkData::new();

    for (index, step) in pipeline.steps().iter().enumerate() {
        if *cancel.borrow() {
            tracing::info!(name = %name, work_id = id, "Pipeline cancelled before {} step", step.kind);
            inner.mark_from(&name, id, index, StepState::Cancelled);
            state.send_replace(WorkState::Cancelled);
            return;
        }

        state.send_replace(WorkState::Running {
            step: index,
            kind: step.kind,
        });
        inner.update_info(&name, id, index, |info| info.state = StepState::Running);
        if let Some(policy) = step.expedited {
            tracing::debug!(step = %step.kind, ?policy, "Expedited step");
        }

        let input = step.input.merged_with(&carried);
        let started = std::time::Instant::now();
        let (result, attempts) = inner.run_step(step.kind, &input, &mut cancel).await;

        match result {
            Ok(output) => {
                tracing::debug!(step = %step.kind, "Step finished in {:?}", started.elapsed());
                inner.update_info(&name, id, index, |info| {
                    info.state = StepState::Succeeded;
                    info.attempts = attempts;
                    info.output = output.clone();
                });
                carried = output;
            }
            Err(PipelineError::Cancelled) => {
                tracing::info!(name = %name, work_id = id, "Pipeline cancelled during {} step", step.kind);
                inner.mark_from(&name, id, index, StepState::Cancelled);
                state.send_replace(WorkState::Cancelled);
                return;
            }
            Err(e) => {
                tracing::error!(name = %name, work_id = id, step = %step.kind, "Step failed: {e}");
                inner.update_info(&name, id, index, |info| {
                    info.state = StepState::Failed;
                    info.attempts = attempts;
                });
                inner.mark_from(&name, id, index + 1, StepState::Blocked);
                state.send_replace(WorkState::Failed {
                    step: index,
                    kind: step.kind,
                    error: e.to_string(),
                });
                return;
            }
        }
    }

    tracing::info!(name = %name, work_id = id, "Pipeline succeeded");
    state.send_replace(WorkState::Succeeded { output: carried });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{build_pipeline, TAG_OUTPUT};
    use crate::types::{FilterRequest, KEY_IMAGE_URI};
    use crate::worker::Worker;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records start/end events and outputs `<kind>-out.png`.
    struct Recording {
        kind: StepKind,
        log: Log,
        delay: Duration,
    }

    #[async_trait]
    impl Worker for Recording {
        fn name(&self) -> &str {
            self.kind.as_str()
        }

        async fn do_work(&self, input: &WorkData) -> PipelineResult<WorkData> {
            let seen = input.get(KEY_IMAGE_URI).unwrap_or("-").to_string();
            self.log
                .lock()
                .unwrap()
                .push(format!("start {} {}", self.kind, seen));
            tokio::time::sleep(self.delay).await;
            self.log.lock().unwrap().push(format!("end {}", self.kind));
            if self.kind == StepKind::Cleanup {
                return Ok(WorkData::new());
            }
            Ok(WorkData::new().with(KEY_IMAGE_URI, format!("{}-out.png", self.kind)))
        }
    }

    /// Fails with a timeout until `failures` attempts have been made.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Worker for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn do_work(&self, _input: &WorkData) -> PipelineResult<WorkData> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(PipelineError::Timeout {
                    path: PathBuf::from("in.png"),
                    stage: "upload".to_string(),
                    timeout_ms: 1,
                });
            }
            Ok(WorkData::new().with(KEY_IMAGE_URI, "https://example.test/done.png"))
        }
    }

    /// Blocks until the test releases a permit.
    struct Gated {
        gate: Arc<tokio::sync::Semaphore>,
    }

    #[async_trait]
    impl Worker for Gated {
        fn name(&self) -> &str {
            "gated"
        }

        async fn do_work(&self, _input: &WorkData) -> PipelineResult<WorkData> {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| PipelineError::Cancelled)?;
            Ok(WorkData::new().with(KEY_IMAGE_URI, "gated-out.png"))
        }
    }

    struct Broken;

    #[async_trait]
    impl Worker for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn do_work(&self, _input: &WorkData) -> PipelineResult<WorkData> {
            Err(PipelineError::Decode {
                path: PathBuf::from("in.png"),
                message: "bad header".to_string(),
            })
        }
    }

    fn recording_workers(log: &Log, slow: Option<StepKind>) -> Workers {
        StepKind::ALL
            .into_iter()
            .fold(Workers::new(), |workers, kind| {
                let delay = if Some(kind) == slow {
                    Duration::from_millis(150)
                } else {
                    Duration::from_millis(1)
                };
                workers.register(
                    kind,
                    Arc::new(Recording {
                        kind,
                        log: Arc::clone(log),
                        delay,
                    }),
                )
            })
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay_ms: 1,
        }
    }

    fn log_lines(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_steps_run_in_order_consuming_previous_output() {
        let log = Log::default();
        let executor = LocalExecutor::new(recording_workers(&log, None), fast_retry());
        let request = FilterRequest::new("/in.png")
            .with_watercolor(true)
            .with_blur(true)
            .with_save_locally(true);
        let pipeline = build_pipeline(&request).unwrap();

        let mut handle = executor
            .submit("job", ExistingWorkPolicy::Replace, pipeline)
            .await
            .unwrap();
        let state = handle.wait().await;

        assert_eq!(
            state,
            WorkState::Succeeded {
                output: WorkData::new().with(KEY_IMAGE_URI, "save_to_gallery-out.png")
            }
        );
        assert_eq!(
            log_lines(&log),
            vec![
                "start cleanup /in.png",
                "end cleanup",
                "start watercolor /in.png",
                "end watercolor",
                "start blur watercolor-out.png",
                "end blur",
                "start save_to_gallery blur-out.png",
                "end save_to_gallery",
            ]
        );
    }

    #[tokio::test]
    async fn test_replace_cancels_previous_before_new_cleanup() {
        let log = Log::default();
        let executor = LocalExecutor::new(
            recording_workers(&log, Some(StepKind::Watercolor)),
            fast_retry(),
        );

        let first = build_pipeline(
            &FilterRequest::new("/first.png")
                .with_watercolor(true)
                .with_grayscale(true),
        )
        .unwrap();
        let mut first_handle = executor
            .submit("job", ExistingWorkPolicy::Replace, first)
            .await
            .unwrap();

        let mut watcher = first_handle.subscribe();
        watcher
            .wait_for(|s| {
                matches!(
                    s,
                    WorkState::Running {
                        kind: StepKind::Watercolor,
                        ..
                    }
                )
            })
            .await
            .unwrap();

        let second = build_pipeline(&FilterRequest::new("/second.png")).unwrap();
        let mut second_handle = executor
            .submit("job", ExistingWorkPolicy::Replace, second)
            .await
            .unwrap();

        assert_eq!(first_handle.wait().await, WorkState::Cancelled);
        assert!(matches!(
            second_handle.wait().await,
            WorkState::Succeeded { .. }
        ));
        assert_ne!(first_handle.id(), second_handle.id());

        let lines = log_lines(&log);
        assert!(!lines.iter().any(|l| l.starts_with("start grayscale")));
        let watercolor_end = lines.iter().position(|l| l == "end watercolor").unwrap();
        let second_cleanup = lines
            .iter()
            .position(|l| l == "start cleanup /second.png")
            .unwrap();
        assert!(watercolor_end < second_cleanup);
    }

    #[tokio::test]
    async fn test_keep_returns_in_flight_handle() {
        let log = Log::default();
        let executor = LocalExecutor::new(
            recording_workers(&log, Some(StepKind::Cleanup)),
            fast_retry(),
        );
        let pipeline = build_pipeline(&FilterRequest::new("/a.png")).unwrap();

        let first = executor
            .submit("job", ExistingWorkPolicy::Keep, pipeline.clone())
            .await
            .unwrap();
        let mut kept = executor
            .submit("job", ExistingWorkPolicy::Keep, pipeline)
            .await
            .unwrap();

        assert_eq!(first.id(), kept.id());
        assert!(matches!(kept.wait().await, WorkState::Succeeded { .. }));
        let cleanups = log_lines(&log)
            .iter()
            .filter(|l| l.starts_with("start cleanup"))
            .count();
        assert_eq!(cleanups, 1);
    }

    #[tokio::test]
    async fn test_retryable_failure_is_retried() {
        let log = Log::default();
        let flaky = Arc::new(Flaky {
            failures: 2,
            calls: AtomicU32::new(0),
        });
        let workers = recording_workers(&log, None).register(StepKind::Upload, flaky.clone());
        let executor = LocalExecutor::new(workers, fast_retry());

        let pipeline = build_pipeline(&FilterRequest::new("/a.png")).unwrap();
        let mut handle = executor
            .submit("job", ExistingWorkPolicy::Replace, pipeline)
            .await
            .unwrap();

        assert!(matches!(handle.wait().await, WorkState::Succeeded { .. }));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);

        let tagged = executor.work_infos_by_tag(TAG_OUTPUT);
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].kind, StepKind::Upload);
        assert_eq!(tagged[0].attempts, 3);
        assert_eq!(
            tagged[0].output.get(KEY_IMAGE_URI),
            Some("https://example.test/done.png")
        );
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let log = Log::default();
        let flaky = Arc::new(Flaky {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        });
        let workers = recording_workers(&log, None).register(StepKind::Upload, flaky.clone());
        let executor = LocalExecutor::new(workers, fast_retry());

        let pipeline = build_pipeline(&FilterRequest::new("/a.png")).unwrap();
        let mut handle = executor
            .submit("job", ExistingWorkPolicy::Replace, pipeline)
            .await
            .unwrap();

        assert!(matches!(
            handle.wait().await,
            WorkState::Failed {
                kind: StepKind::Upload,
                ..
            }
        ));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failure_blocks_remaining_steps() {
        let log = Log::default();
        let workers = recording_workers(&log, None).register(StepKind::Grayscale, Arc::new(Broken));
        let executor = LocalExecutor::new(workers, fast_retry());

        let request = FilterRequest::new("/a.png")
            .with_grayscale(true)
            .with_blur(true);
        let mut handle = executor
            .submit("job", ExistingWorkPolicy::Replace, build_pipeline(&request).unwrap())
            .await
            .unwrap();

        match handle.wait().await {
            WorkState::Failed { step, kind, error } => {
                assert_eq!(step, 1);
                assert_eq!(kind, StepKind::Grayscale);
                assert!(error.contains("bad header"));
            }
            other => panic!("unexpected state {other:?}"),
        }

        let states: Vec<_> = executor
            .work_infos_for_name("job")
            .iter()
            .map(|i| i.state)
            .collect();
        assert_eq!(
            states,
            vec![
                StepState::Succeeded,
                StepState::Failed,
                StepState::Blocked,
                StepState::Blocked
            ]
        );
        // Non-retryable errors run once.
        assert_eq!(executor.work_infos_for_name("job")[1].attempts, 1);
    }

    #[tokio::test]
    async fn test_missing_worker_fails_step() {
        let executor = LocalExecutor::new(Workers::new(), RetryPolicy::none());
        let pipeline = build_pipeline(&FilterRequest::new("/a.png")).unwrap();
        let mut handle = executor
            .submit("job", ExistingWorkPolicy::Replace, pipeline)
            .await
            .unwrap();

        match handle.wait().await {
            WorkState::Failed { kind, error, .. } => {
                assert_eq!(kind, StepKind::Cleanup);
                assert!(error.contains("No worker"));
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancel_unique_work() {
        let log = Log::default();
        let executor = LocalExecutor::new(
            recording_workers(&log, Some(StepKind::Cleanup)),
            fast_retry(),
        );
        let pipeline = build_pipeline(&FilterRequest::new("/a.png")).unwrap();
        let mut handle = executor
            .submit("job", ExistingWorkPolicy::Replace, pipeline)
            .await
            .unwrap();

        assert!(executor.cancel_unique_work("job").await);
        assert_eq!(handle.wait().await, WorkState::Cancelled);
        assert!(!executor.cancel_unique_work("job").await);
        assert!(!log_lines(&log).iter().any(|l| l.starts_with("start upload")));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_retry_backoff() {
        let log = Log::default();
        let flaky = Arc::new(Flaky {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        });
        let workers = recording_workers(&log, None).register(StepKind::Upload, flaky.clone());
        let slow_retry = RetryPolicy {
            max_retries: 5,
            base_delay_ms: 60_000,
        };
        let executor = LocalExecutor::new(workers, slow_retry);

        let pipeline = build_pipeline(&FilterRequest::new("/a.png")).unwrap();
        let mut handle = executor
            .submit("job", ExistingWorkPolicy::Replace, pipeline)
            .await
            .unwrap();
        handle
            .subscribe()
            .wait_for(|s| {
                matches!(
                    s,
                    WorkState::Running {
                        kind: StepKind::Upload,
                        ..
                    }
                )
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let cancelled = tokio::time::timeout(
            Duration::from_secs(5),
            executor.cancel_unique_work("job"),
        )
        .await
        .expect("cancel should not wait out the backoff");

        assert!(cancelled);
        assert_eq!(handle.wait().await, WorkState::Cancelled);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            executor.work_infos_for_name("job")[1].state,
            StepState::Cancelled
        );
    }

    #[tokio::test]
    async fn test_replace_does_not_block_other_names() {
        let log = Log::default();
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let workers = recording_workers(&log, None).register(
            StepKind::Watercolor,
            Arc::new(Gated {
                gate: Arc::clone(&gate),
            }),
        );
        let executor = LocalExecutor::new(workers, fast_retry());

        let stuck = build_pipeline(&FilterRequest::new("/a.png").with_watercolor(true)).unwrap();
        let mut stuck_handle = executor
            .submit("a", ExistingWorkPolicy::Replace, stuck)
            .await
            .unwrap();
        stuck_handle
            .subscribe()
            .wait_for(|s| {
                matches!(
                    s,
                    WorkState::Running {
                        kind: StepKind::Watercolor,
                        ..
                    }
                )
            })
            .await
            .unwrap();

        // Waits for the gated step to finish before it can start.
        let replacing = {
            let executor = executor.clone();
            let pipeline = build_pipeline(&FilterRequest::new("/a2.png")).unwrap();
            tokio::spawn(async move {
                executor
                    .submit("a", ExistingWorkPolicy::Replace, pipeline)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!replacing.is_finished());

        let other = build_pipeline(&FilterRequest::new("/b.png")).unwrap();
        let mut other_handle = tokio::time::timeout(
            Duration::from_secs(5),
            executor.submit("b", ExistingWorkPolicy::Replace, other),
        )
        .await
        .expect("submit under another name should not wait")
        .unwrap();
        assert!(matches!(
            other_handle.wait().await,
            WorkState::Succeeded { .. }
        ));
        assert!(!replacing.is_finished());

        gate.add_permits(1);
        let mut replaced_handle = replacing.await.unwrap().unwrap();
        assert_eq!(stuck_handle.wait().await, WorkState::Cancelled);
        assert!(matches!(
            replaced_handle.wait().await,
            WorkState::Succeeded { .. }
        ));
    }
}
