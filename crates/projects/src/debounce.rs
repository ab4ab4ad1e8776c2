//! Debounced asynchronous validation.
//!
//! Every input change bumps a generation counter. A check is issued only once
//! the input has been quiet for the settle delay, and its result is applied
//! only if no newer input arrived in the meantime. In-flight checks are never
//! aborted; their results are dropped when they come back stale.

use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use {
    tokio::{runtime::Handle, sync::watch},
    tracing::{debug, warn},
};

/// Boxed future returned by a check function.
pub type CheckFuture<R, E> = Pin<Box<dyn Future<Output = Result<R, E>> + Send>>;

/// Asynchronous check invoked with a settled input.
pub type CheckFn<T, R, E> = Arc<dyn Fn(T) -> CheckFuture<R, E> + Send + Sync>;

/// Receives failures of checks for the current input.
pub type ErrorFn<E> = Arc<dyn Fn(E) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus<R> {
    /// The input is settling or its check is in flight.
    Checking,
    /// Result of the check for the current input.
    Ready(R),
    /// The check for the current input failed. No result is known for it.
    Failed,
}

impl<R> CheckStatus<R> {
    pub fn ready(&self) -> Option<&R> {
        match self {
            Self::Checking | Self::Failed => None,
            Self::Ready(result) => Some(result),
        }
    }
}

struct Shared<R> {
    generation: AtomicU64,
    status: watch::Sender<CheckStatus<R>>,
}

impl<R> Shared<R> {
    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.status.send_modify(|status| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *status = CheckStatus::Checking;
        });
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Generation check and write happen under the channel lock so a newer
    /// `begin` cannot interleave.
    fn apply(&self, generation: u64, result: R) -> bool {
        self.status.send_if_modified(|status| {
            if !self.is_current(generation) {
                return false;
            }
            *status = CheckStatus::Ready(result);
            true
        })
    }

    fn fail(&self, generation: u64) -> bool {
        self.status.send_if_modified(|status| {
            if !self.is_current(generation) {
                return false;
            }
            *status = CheckStatus::Failed;
            true
        })
    }
}

/// Issues at most one check per settled input and surfaces only the result
/// for the input that is current when the check resolves.
pub struct DebouncedValidator<T, R, E> {
    delay: Duration,
    shared: Arc<Shared<R>>,
    check: CheckFn<T, R, E>,
    on_error: Option<ErrorFn<E>>,
    runtime: Option<Handle>,
}

impl<T, R, E> DebouncedValidator<T, R, E>
where
    T: Send + 'static,
    R: Clone + Send + Sync + 'static,
    E: Display + Send + 'static,
{
    /// `initial` is reported as ready until the first input settles.
    ///
    /// Checks run on the Tokio runtime current at construction, if any.
    pub fn new(delay: Duration, initial: R, check: CheckFn<T, R, E>) -> Self {
        let (status, _) = watch::channel(CheckStatus::Ready(initial));
        Self {
            delay,
            shared: Arc::new(Shared {
                generation: AtomicU64::new(0),
                status,
            }),
            check,
            on_error: None,
            runtime: Handle::try_current().ok(),
        }
    }

    #[must_use]
    pub fn with_error_handler(mut self, on_error: ErrorFn<E>) -> Self {
        self.on_error = Some(on_error);
        self
    }

    /// Record a new input value and schedule its check.
    ///
    /// May be called from any thread. The check is spawned on the runtime
    /// captured by [`Self::new`], falling back to the caller's runtime. With
    /// neither available the input is marked [`CheckStatus::Failed`].
    pub fn set_input(&self, input: T) {
        let generation = self.shared.begin();
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            warn!(generation, "no async runtime available, check not issued");
            self.shared.fail(generation);
            return;
        };
        let shared = Arc::clone(&self.shared);
        let check = Arc::clone(&self.check);
        let on_error = self.on_error.clone();
        let delay = self.delay;

        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if !shared.is_current(generation) {
                return;
            }

            debug!(generation, "input settled, issuing check");
            match check(input).await {
                Ok(result) => {
                    if !shared.apply(generation, result) {
                        debug!(generation, "discarding check result for superseded input");
                    }
                },
                Err(error) => {
                    if shared.fail(generation) {
                        warn!(generation, error = %error, "check failed");
                        if let Some(on_error) = on_error {
                            on_error(error);
                        }
                    } else {
                        debug!(generation, "discarding check failure for superseded input");
                    }
                },
            }
        });
    }

    pub fn status(&self) -> CheckStatus<R> {
        self.shared.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CheckStatus<R>> {
        self.shared.status.subscribe()
    }

    pub fn is_checking(&self) -> bool {
        matches!(*self.shared.status.borrow(), CheckStatus::Checking)
    }

    /// Invalidate every pending and in-flight check.
    pub fn close(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T, R, E> Drop for DebouncedValidator<T, R, E> {
    fn drop(&mut self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        std::{collections::HashMap, sync::Mutex},
        tokio::time::sleep,
    };

    const SETTLE: Duration = Duration::from_millis(500);

    /// Check that records its inputs and answers `len:<n>` after an optional
    /// per-input latency.
    fn recording_check(
        calls: Arc<Mutex<Vec<String>>>,
        latency: HashMap<&'static str, Duration>,
    ) -> CheckFn<String, String, String> {
        Arc::new(move |input: String| -> CheckFuture<String, String> {
            calls.lock().unwrap().push(input.clone());
            let delay = latency.get(input.as_str()).copied().unwrap_or_default();
            Box::pin(async move {
                sleep(delay).await;
                if input == "boom" {
                    Err("backend unavailable".to_string())
                } else {
                    Ok(format!("len:{}", input.len()))
                }
            })
        })
    }

    fn validator(
        latency: HashMap<&'static str, Duration>,
    ) -> (
        DebouncedValidator<String, String, String>,
        Arc<Mutex<Vec<String>>>,
    ) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let v = DebouncedValidator::new(
            SETTLE,
            "initial".to_string(),
            recording_check(Arc::clone(&calls), latency),
        );
        (v, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_issues_one_check_for_last_value() {
        let (v, calls) = validator(HashMap::new());

        v.set_input("a".into());
        sleep(Duration::from_millis(100)).await;
        v.set_input("ab".into());
        assert!(v.is_checking());

        sleep(Duration::from_millis(1_000)).await;
        assert_eq!(*calls.lock().unwrap(), vec!["ab".to_string()]);
        assert_eq!(v.status(), CheckStatus::Ready("len:2".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn stays_checking_until_settled() {
        let (v, calls) = validator(HashMap::new());
        assert_eq!(v.status(), CheckStatus::Ready("initial".into()));

        v.set_input("abc".into());
        sleep(Duration::from_millis(499)).await;
        assert!(v.is_checking());
        assert!(calls.lock().unwrap().is_empty());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(v.status(), CheckStatus::Ready("len:3".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn late_result_for_superseded_input_is_discarded() {
        let latency = HashMap::from([("slow", Duration::from_secs(3))]);
        let (v, calls) = validator(latency);
        let mut rx = v.subscribe();

        v.set_input("slow".into());
        sleep(Duration::from_millis(600)).await;
        // Check for "slow" is now in flight.
        v.set_input("quick".into());
        sleep(Duration::from_millis(600)).await;
        assert_eq!(v.status(), CheckStatus::Ready("len:5".into()));

        sleep(Duration::from_secs(5)).await;
        assert_eq!(*calls.lock().unwrap(), vec![
            "slow".to_string(),
            "quick".to_string()
        ]);
        assert_eq!(v.status(), CheckStatus::Ready("len:5".into()));
        // The stale "slow" answer never reached observers.
        assert_eq!(*rx.borrow_and_update(), CheckStatus::Ready("len:5".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_result_for_current_input_is_applied() {
        let latency = HashMap::from([("slow", Duration::from_secs(2))]);
        let (v, _calls) = validator(latency);

        v.set_input("slow".into());
        sleep(Duration::from_millis(1_000)).await;
        assert!(v.is_checking());
        sleep(Duration::from_secs(2)).await;
        assert_eq!(v.status(), CheckStatus::Ready("len:4".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_marks_current_input_failed_and_reports() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        let (v, _calls) = validator(HashMap::new());
        let v = v.with_error_handler(Arc::new(move |e: String| sink.lock().unwrap().push(e)));
        let mut rx = v.subscribe();

        v.set_input("ok".into());
        sleep(Duration::from_secs(1)).await;
        assert_eq!(v.status(), CheckStatus::Ready("len:2".into()));

        v.set_input("boom".into());
        sleep(Duration::from_secs(1)).await;
        // The previous input's result must not come back for "boom".
        assert_eq!(v.status(), CheckStatus::Failed);
        assert_eq!(v.status().ready(), None);
        assert_eq!(*rx.borrow_and_update(), CheckStatus::Failed);
        assert_eq!(*errors.lock().unwrap(), vec!["backend unavailable".to_string()]);

        v.set_input("again".into());
        sleep(Duration::from_secs(1)).await;
        assert_eq!(v.status(), CheckStatus::Ready("len:5".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn input_from_another_thread_uses_captured_runtime() {
        let (v, calls) = validator(HashMap::new());
        let v = Arc::new(v);

        let remote = Arc::clone(&v);
        std::thread::spawn(move || remote.set_input("abcd".into()))
            .join()
            .unwrap();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(*calls.lock().unwrap(), vec!["abcd".to_string()]);
        assert_eq!(v.status(), CheckStatus::Ready("len:4".into()));
    }

    #[test]
    fn input_without_runtime_fails_instead_of_panicking() {
        let (v, calls) = validator(HashMap::new());

        v.set_input("abc".into());

        assert_eq!(v.status(), CheckStatus::Failed);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn close_stops_pending_checks() {
        let (v, calls) = validator(HashMap::new());
        v.set_input("abc".into());
        v.close();
        sleep(Duration::from_secs(1)).await;
        assert!(calls.lock().unwrap().is_empty());
    }
}
