//! Cancelable operations.
//!
//! A [`CancelableOperation`] is the caller side of one asynchronous attempt to
//! produce a value. It moves exactly once from `Pending` to one of the terminal
//! states (`Settled`, `Failed`, `Canceled`), and never leaves it.
//!
//! The producing side only holds a [`Settler`], a weak back-reference: it
//! never keeps the operation alive, and a settlement arriving after the
//! operation was canceled or dropped is discarded.

use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll, Waker};

use tracing::{debug, warn};

use super::ApiClientError;

type CancelHook = Box<dyn FnOnce() + Send>;

/// Observable state of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    /// Not settled yet.
    Pending,
    /// Settled with a value.
    Settled,
    /// Settled with an error.
    Failed,
    /// Canceled before settlement.
    Canceled,
}

/// Terminal outcome of an operation.
///
/// Cancellation is its own outcome, not an error.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The operation produced a value.
    Settled(T),
    /// The operation failed.
    Failed(ApiClientError),
    /// The operation was canceled.
    Canceled,
}

impl<T> Outcome<T> {
    /// The terminal state this outcome stands for.
    pub fn state(&self) -> OperationState {
        match self {
            Self::Settled(_) => OperationState::Settled,
            Self::Failed(_) => OperationState::Failed,
            Self::Canceled => OperationState::Canceled,
        }
    }

    /// Whether the operation was canceled.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// The value, if settled.
    pub fn settled(self) -> Option<T> {
        match self {
            Self::Settled(value) => Some(value),
            Self::Failed(_) | Self::Canceled => None,
        }
    }

    /// Converts into a [`Result`], `None` meaning canceled.
    pub fn into_result(self) -> Option<Result<T, ApiClientError>> {
        match self {
            Self::Settled(value) => Some(Ok(value)),
            Self::Failed(error) => Some(Err(error)),
            Self::Canceled => None,
        }
    }
}

impl<T> From<Result<T, ApiClientError>> for Outcome<T> {
    fn from(value: Result<T, ApiClientError>) -> Self {
        match value {
            Ok(value) => Self::Settled(value),
            Err(error) => Self::Failed(error),
        }
    }
}

enum Slot<T> {
    Pending {
        hooks: Vec<CancelHook>,
        waker: Option<Waker>,
    },
    Done(Outcome<T>),
    Delivered(OperationState),
}

impl<T> Slot<T> {
    fn state(&self) -> OperationState {
        match self {
            Self::Pending { .. } => OperationState::Pending,
            Self::Done(outcome) => outcome.state(),
            Self::Delivered(state) => *state,
        }
    }
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The single terminal transition.
    ///
    /// Returns the cancel hooks and the waker of the pending state, or gives the
    /// outcome back if the operation is already terminal.
    fn complete(&self, outcome: Outcome<T>) -> Result<(Vec<CancelHook>, Option<Waker>), Outcome<T>> {
        let mut slot = self.lock();
        let Slot::Pending { hooks, waker } = &mut *slot else {
            return Err(outcome);
        };
        let hooks = mem::take(hooks);
        let waker = waker.take();
        *slot = Slot::Done(outcome);
        Ok((hooks, waker))
    }
}

trait Cancel: Send + Sync {
    fn cancel(&self) -> bool;
}

impl<T: Send> Cancel for Shared<T> {
    fn cancel(&self) -> bool {
        let Ok((hooks, waker)) = self.complete(Outcome::Canceled) else {
            return false;
        };
        // hooks run outside of the lock, they may inspect the operation
        for hook in hooks {
            hook();
        }
        if let Some(waker) = waker {
            waker.wake();
        }
        true
    }
}

/// A handle to one asynchronous attempt to produce a `T`, cancelable until it settles.
///
/// Await it (it is a [`Future`]) to get the [`Outcome`]. Awaiting an operation
/// that already settled resolves immediately.
///
/// Dropping a pending operation cancels it.
///
/// # Example
///
/// ```rust,no_run
/// use apicall_core::{ApiClient, EndpointConfig, Outcome, RequestParams};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::builder()
///     .with_base_url("http://localhost:3000")?
///     .build()?;
///
/// const USER: EndpointConfig = EndpointConfig::get("/user");
/// let operation = client.dispatch::<u64>(&USER, RequestParams::new())?;
///
/// let handle = operation.cancel_handle();
/// tokio::spawn(async move {
///     tokio::time::sleep(std::time::Duration::from_secs(1)).await;
///     handle.cancel();
/// });
///
/// match operation.await {
///     Outcome::Settled(count) => println!("{count} users"),
///     Outcome::Failed(error) => eprintln!("failed: {error}"),
///     Outcome::Canceled => println!("too slow"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct CancelableOperation<T> {
    shared: Arc<Shared<T>>,
}

impl<T> CancelableOperation<T> {
    /// Creates a pending operation and the [`Settler`] that completes it.
    pub fn pending() -> (Self, Settler<T>) {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::Pending {
                hooks: vec![],
                waker: None,
            }),
        });
        let settler = Settler {
            shared: Arc::downgrade(&shared),
        };
        (Self { shared }, settler)
    }

    /// Runs a future on the current tokio runtime, wrapped in a cancelable operation.
    ///
    /// Canceling (or dropping) the operation aborts the task driving the future.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::NoRuntime`] when called outside of a tokio runtime.
    pub fn spawn<F>(future: F) -> Result<Self, ApiClientError>
    where
        F: Future<Output = Result<T, ApiClientError>> + Send + 'static,
        T: Send + 'static,
    {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| ApiClientError::NoRuntime)?;
        let (operation, settler) = Self::pending();

        let task = runtime.spawn(async move {
            let outcome = Outcome::from(future.await);
            settler.complete(outcome);
        });
        let abort = task.abort_handle();
        operation.on_cancel(move || abort.abort());

        Ok(operation)
    }

    /// The current state.
    pub fn state(&self) -> OperationState {
        self.shared.lock().state()
    }

    /// Whether the operation has not reached a terminal state yet.
    pub fn is_pending(&self) -> bool {
        self.state() == OperationState::Pending
    }

    /// Registers a hook run once, synchronously, when the operation gets canceled.
    ///
    /// Hooks run in registration order. If the operation settles instead, the
    /// hook is dropped without running. No-op on a terminal operation.
    pub fn on_cancel<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.shared.lock();
        if let Slot::Pending { hooks, .. } = &mut *slot {
            hooks.push(Box::new(hook));
        }
    }

    /// Cancels the operation.
    ///
    /// Returns `true` if this call moved the operation to `Canceled`; canceling
    /// a terminal operation does nothing and returns `false`.
    pub fn cancel(&self) -> bool
    where
        T: Send,
    {
        self.shared.cancel()
    }

    /// A cloneable handle able to cancel this operation from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle
    where
        T: Send + 'static,
    {
        let shared: Arc<dyn Cancel> = self.shared.clone();
        CancelHandle {
            shared: Arc::downgrade(&shared),
        }
    }
}

impl<T> Future for CancelableOperation<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.shared.lock();
        if let Slot::Pending { waker, .. } = &mut *slot {
            if !waker.as_ref().is_some_and(|known| known.will_wake(cx.waker())) {
                *waker = Some(cx.waker().clone());
            }
            return Poll::Pending;
        }

        let state = slot.state();
        match mem::replace(&mut *slot, Slot::Delivered(state)) {
            Slot::Done(outcome) => Poll::Ready(outcome),
            Slot::Pending { .. } | Slot::Delivered(_) => {
                panic!("CancelableOperation polled after completion")
            }
        }
    }
}

impl<T> Drop for CancelableOperation<T> {
    fn drop(&mut self) {
        let Ok((hooks, _)) = self.shared.complete(Outcome::Canceled) else {
            return;
        };
        debug!("pending operation dropped, canceling");
        for hook in hooks {
            hook();
        }
    }
}

impl<T> fmt::Debug for CancelableOperation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelableOperation")
            .field("state", &self.state())
            .finish()
    }
}

/// Cancels an operation without owning it.
///
/// Holds a weak reference: once the operation is gone, canceling does nothing.
#[derive(Clone)]
pub struct CancelHandle {
    shared: Weak<dyn Cancel>,
}

impl CancelHandle {
    /// Cancels the operation, see [`CancelableOperation::cancel`].
    pub fn cancel(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.cancel())
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

/// The producing side of a [`CancelableOperation`].
///
/// Consumed by settling. Only the first terminal transition of an operation
/// takes effect: settling after a cancellation is a no-op.
pub struct Settler<T> {
    shared: Weak<Shared<T>>,
}

impl<T> Settler<T> {
    /// Settles the operation with a value. Returns whether it took effect.
    pub fn settle(self, value: T) -> bool {
        self.complete(Outcome::Settled(value))
    }

    /// Fails the operation. Returns whether it took effect.
    pub fn fail(self, error: ApiClientError) -> bool {
        self.complete(Outcome::Failed(error))
    }

    /// Whether settling would be discarded.
    pub fn is_closed(&self) -> bool {
        self.shared
            .upgrade()
            .is_none_or(|shared| shared.lock().state() != OperationState::Pending)
    }

    fn complete(self, outcome: Outcome<T>) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            warn!(discarded = ?outcome.state(), "operation dropped before settlement");
            return false;
        };
        match shared.complete(outcome) {
            Ok((_hooks, waker)) => {
                if let Some(waker) = waker {
                    waker.wake();
                }
                true
            }
            Err(outcome) => {
                debug!(state = ?shared.lock().state(), discarded = ?outcome.state(), "operation already terminal");
                false
            }
        }
    }
}

impl<T> fmt::Debug for Settler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settler")
            .field("closed", &self.is_closed())
            .finish()
    }
}
