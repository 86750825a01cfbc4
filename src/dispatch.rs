use std::time::Duration;
use log::{debug, warn};
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use crate::decision::{Context, Decider, Snapshot};
use crate::error::CoupError;

enum Seat {
    Idle(Box<dyn Decider>),
    // still working on a question that already timed out
    Busy(JoinHandle<Box<dyn Decider>>),
    // panicked, never asked again
    Lost,
}

/// Runs every question on tokio's blocking pool and stops waiting once the
/// deadline passes, so a stuck decider can't hold up the table.
pub(crate) struct Dispatch {
    handle: Handle,
    runtime: Option<Runtime>,
    seats: Vec<Seat>,
}

impl Dispatch {
    pub(crate) fn new(deciders: Vec<Box<dyn Decider>>) -> Result<Self, CoupError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("coup-decider")
            .enable_time()
            .build()
            .map_err(|err| CoupError::Runtime(err.to_string()))?;

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
            seats: deciders.into_iter().map(Seat::Idle).collect(),
        })
    }

    pub(crate) fn ask<T, Q>(&mut self, seat: usize, snapshot: Snapshot, timeout: Duration, query: Q) -> Result<T, CoupError>
    where
        T: Send + 'static,
        Q: FnOnce(&mut dyn Decider, &Context) -> T + Send + 'static,
    {
        self.reclaim(seat);

        let mut decider = match std::mem::replace(&mut self.seats[seat], Seat::Lost) {
            Seat::Idle(decider) => decider,
            Seat::Busy(task) => {
                debug!("seat {seat} is still busy with an earlier question");
                self.seats[seat] = Seat::Busy(task);
                return Err(CoupError::DecisionTimeout);
            }
            Seat::Lost => return Err(CoupError::DeciderPanicked),
        };

        let (tx, rx) = oneshot::channel();
        let task = self.handle.spawn_blocking(move || {
            let ctx = snapshot.context();
            // the receiver is gone when the answer is too late
            tx.send(query(decider.as_mut(), &ctx)).ok();
            decider
        });

        match self.handle.block_on(async move { tokio::time::timeout(timeout, rx).await }) {
            Ok(Ok(answer)) => {
                self.seats[seat] = match self.handle.block_on(task) {
                    Ok(decider) => Seat::Idle(decider),
                    Err(_) => Seat::Lost,
                };
                Ok(answer)
            }
            Ok(Err(_)) => {
                warn!("the decider for seat {seat} panicked");
                Err(CoupError::DeciderPanicked)
            }
            Err(_) => {
                self.seats[seat] = Seat::Busy(task);
                Err(CoupError::DecisionTimeout)
            }
        }
    }

    // takes a late decider back once it has finished, its answer is dropped
    fn reclaim(&mut self, seat: usize) {
        let finished = matches!(&self.seats[seat], Seat::Busy(task) if task.is_finished());
        if !finished {
            return;
        }

        if let Seat::Busy(task) = std::mem::replace(&mut self.seats[seat], Seat::Lost) {
            if let Ok(decider) = self.handle.block_on(task) {
                self.seats[seat] = Seat::Idle(decider);
            }
        }
    }
}

impl Drop for Dispatch {
    // don't wait on deciders that are still thinking
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};
    use crate::dispatch::Dispatch;
    use crate::testing::{snapshot, Script};
    use crate::{CoupError, Decider};

    #[test]
    fn answers_in_time() {
        let mut dispatch = Dispatch::new(vec![Box::new(Script::new()) as Box<dyn Decider>]).unwrap();
        let answer = dispatch.ask(0, snapshot(), Duration::from_secs(5), |decider, ctx| {
            decider.choose_card_to_lose(ctx)
        });
        assert_eq!(answer, Ok(0));
    }

    #[test]
    fn stops_waiting_at_the_deadline() {
        let slow = Script::new().lose(1).lose(1).slow(Duration::from_millis(300));
        let mut dispatch = Dispatch::new(vec![Box::new(slow) as Box<dyn Decider>]).unwrap();

        let started = Instant::now();
        let answer = dispatch.ask(0, snapshot(), Duration::from_millis(10), |decider, ctx| {
            decider.choose_card_to_lose(ctx)
        });
        assert_eq!(answer, Err(CoupError::DecisionTimeout));
        assert!(started.elapsed() < Duration::from_millis(200));

        // still thinking about the first question
        let answer = dispatch.ask(0, snapshot(), Duration::from_millis(10), |decider, ctx| {
            decider.choose_card_to_lose(ctx)
        });
        assert_eq!(answer, Err(CoupError::DecisionTimeout));

        // back once it is done, the late answer is gone
        std::thread::sleep(Duration::from_millis(400));
        let answer = dispatch.ask(0, snapshot(), Duration::from_secs(5), |decider, ctx| {
            decider.choose_card_to_lose(ctx)
        });
        assert_eq!(answer, Ok(1));
    }
}
