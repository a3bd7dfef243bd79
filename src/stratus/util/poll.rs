use crate::stratus::config::Config;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Cancellation and pacing state threaded through a polling loop. Once the
/// token fires or the deadline passes, no further attempts are started.
#[derive(Debug, Clone)]
pub struct WaitContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    interval: Duration,
}

impl WaitContext {
    /// Context bounded by the configured poll timeout.
    pub fn new(token: CancellationToken) -> Self {
        Self::with_timeout(token, Config::PollTimeout.get_duration())
    }

    /// Context bounded by an explicit overall deadline.
    pub fn with_timeout(token: CancellationToken, timeout: Duration) -> Self {
        Self {
            token,
            deadline: Instant::now().checked_add(timeout),
            interval: Config::PollInterval.get_duration(),
        }
    }

    /// Context without a deadline; the token is the only stop signal.
    pub fn unbounded(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
            interval: Config::PollInterval.get_duration(),
        }
    }

    /// Overrides the sleep between attempts.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    fn expired(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    fn stop_reason(&self) -> Option<&'static str> {
        if self.token.is_cancelled() {
            Some("wait cancelled")
        } else if self.expired() {
            Some("wait deadline exceeded")
        } else {
            None
        }
    }
}

/// Why a wait loop stopped without the predicate turning true.
#[derive(Debug)]
pub enum WaitError<E> {
    /// The token fired or the deadline passed.
    Cancelled(String),
    /// The operation returned an error; the loop does not retry it.
    Aborted(E),
}

impl<E: fmt::Display> fmt::Display for WaitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitError::Cancelled(reason) => write!(f, "{}", reason),
            WaitError::Aborted(err) => write!(f, "{}", err),
        }
    }
}

impl<E: Error + 'static> Error for WaitError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WaitError::Cancelled(_) => None,
            WaitError::Aborted(err) => Some(err),
        }
    }
}

/// Repeatedly invokes `op` until it reports true, returns an error, or the
/// context stops the loop. Cancellation is checked before every attempt and
/// again before every sleep; a context that is already cancelled never
/// invokes the operation. Each attempt observes fresh state; nothing is
/// cached between iterations.
pub async fn wait<E, F, Fut>(ctx: &WaitContext, mut op: F) -> Result<(), WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    loop {
        if let Some(reason) = ctx.stop_reason() {
            return Err(WaitError::Cancelled(reason.to_string()));
        }

        match op().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(err) => return Err(WaitError::Aborted(err)),
        }

        if let Some(reason) = ctx.stop_reason() {
            return Err(WaitError::Cancelled(reason.to_string()));
        }

        let sleeper = time::sleep(ctx.interval);
        tokio::pin!(sleeper);
        tokio::select! {
            _ = ctx.token.cancelled() => {
                return Err(WaitError::Cancelled("wait cancelled".to_string()));
            }
            _ = sleeper.as_mut() => {}
        }
    }
}
