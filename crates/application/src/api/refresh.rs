//! Single-flight token refresh.
//!
//! At most one refresh runs at a time per coordinator. The first caller to
//! need a new access token becomes the leader and performs the refresh;
//! callers arriving while it is in flight park on a oneshot channel and are
//! released with the leader's outcome. The flight is reset on every exit
//! path, including cancellation of the leader, in which case parked callers
//! observe [`RefreshFailure::Abandoned`].

use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::error::RefreshFailure;

type Outcome = Result<String, RefreshFailure>;

#[derive(Debug, Default)]
enum Flight {
    #[default]
    Idle,
    InFlight {
        waiters: Vec<oneshot::Sender<Outcome>>,
    },
}

enum Role {
    Leader,
    Follower(oneshot::Receiver<Outcome>),
}

/// Coordinates token refreshes across concurrent requests.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    flight: Mutex<Flight>,
}

impl RefreshCoordinator {
    /// Create an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a refresh is running.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.flight.lock(), Flight::InFlight { .. })
    }

    /// Number of callers parked behind the running refresh.
    #[must_use]
    pub fn waiting(&self) -> usize {
        match &*self.flight.lock() {
            Flight::Idle => 0,
            Flight::InFlight { waiters } => waiters.len(),
        }
    }

    /// Obtains a fresh access token.
    ///
    /// Runs `refresh` if no refresh is in flight; otherwise waits for the
    /// running one and shares its outcome. `refresh` is responsible for
    /// persisting its result before returning.
    ///
    /// # Errors
    /// Returns the leader's failure, or [`RefreshFailure::Abandoned`] if the
    /// leader was dropped before settling.
    pub async fn refresh_with<F, Fut>(&self, refresh: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        match self.join() {
            Role::Follower(receiver) => {
                tracing::debug!("Token refresh in flight, waiting for its outcome");
                receiver
                    .await
                    .unwrap_or_else(|_| Err(RefreshFailure::Abandoned))
            }
            Role::Leader => {
                let guard = FlightGuard {
                    coordinator: self,
                    armed: true,
                };
                let outcome = refresh().await;
                guard.settle(&outcome);
                outcome
            }
        }
    }

    fn join(&self) -> Role {
        let mut flight = self.flight.lock();
        match &mut *flight {
            Flight::Idle => {
                *flight = Flight::InFlight {
                    waiters: Vec::new(),
                };
                Role::Leader
            }
            Flight::InFlight { waiters } => {
                let (sender, receiver) = oneshot::channel();
                waiters.push(sender);
                Role::Follower(receiver)
            }
        }
    }

    fn take_waiters(&self) -> Vec<oneshot::Sender<Outcome>> {
        match std::mem::take(&mut *self.flight.lock()) {
            Flight::Idle => Vec::new(),
            Flight::InFlight { waiters } => waiters,
        }
    }
}

/// Resets the flight when the leader finishes or is dropped.
struct FlightGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl FlightGuard<'_> {
    fn settle(mut self, outcome: &Outcome) {
        self.armed = false;
        let waiters = self.coordinator.take_waiters();
        tracing::debug!(waiters = waiters.len(), ok = outcome.is_ok(), "Releasing parked requests");
        for waiter in waiters {
            // A waiter whose request was cancelled has dropped its receiver.
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Token refresh abandoned before completion");
            // Dropping the senders fails every parked caller.
            drop(self.coordinator.take_waiters());
        }
    }
}
