use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use sojourner_core::reminder::ReminderPayload;
use tokio::sync::{watch, Notify};
use tracing::{debug, error, info, warn};

use crate::dispatch::Dispatcher;
use crate::error::{Result, SchedulerError};
use crate::ident;
use crate::store::JobStore;
use crate::types::Job;

/// Queue key: earliest due time first, ID as tiebreaker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct DueEntry {
    due_time: DateTime<Utc>,
    id: String,
}

/// In-memory firing state. One mutex guards both halves so the queue and the
/// in-flight set never disagree.
struct FireQueue {
    heap: BinaryHeap<Reverse<DueEntry>>,
    /// IDs pulled for dispatch but not yet deleted. Cancelling these is
    /// rejected; the fire has already won.
    in_flight: HashSet<String>,
}

/// Core scheduler: persists one-shot jobs and fires each exactly once at its
/// due time.
///
/// Shared as `Arc<ReminderScheduler>` between the command layer (add, remove,
/// list) and its own firing loop ([`run`](Self::run)). The loop sleeps until
/// the earliest due time and is woken early whenever add or remove changes
/// what "earliest" means.
pub struct ReminderScheduler {
    store: JobStore,
    dispatcher: Arc<dyn Dispatcher>,
    queue: Mutex<FireQueue>,
    /// Woken whenever the earliest due time may have changed.
    wake: Notify,
}

impl ReminderScheduler {
    pub fn new(store: JobStore, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            store,
            dispatcher,
            queue: Mutex::new(FireQueue {
                heap: BinaryHeap::new(),
                in_flight: HashSet::new(),
            }),
            wake: Notify::new(),
        }
    }

    /// Schedule a new one-shot reminder. Returns the generated job ID.
    ///
    /// The due time must be in the future. On any failure no partial state
    /// remains: the job is either durably stored and queued, or absent.
    pub fn add_job(&self, payload: ReminderPayload, due_time: DateTime<Utc>) -> Result<String> {
        let now = Utc::now();
        if due_time <= now {
            return Err(SchedulerError::InvalidSchedule(format!(
                "due time {} is not in the future",
                due_time.to_rfc3339()
            )));
        }

        let id = ident::generate(&self.store)?;
        let job = Job {
            id: id.clone(),
            payload,
            due_time,
            created_at: now,
        };

        // Insert under the queue lock so the row and its queue entry appear
        // together relative to remove_job and the firing loop.
        {
            let mut q = self.queue.lock().unwrap();
            self.store.insert(&job)?;
            q.heap.push(Reverse(DueEntry {
                due_time,
                id: id.clone(),
            }));
        }
        self.wake.notify_one();

        info!(job_id = %id, due_time = %due_time.to_rfc3339(), task = %job.payload.task_name, "job scheduled");
        Ok(id)
    }

    /// Cancel a scheduled reminder.
    ///
    /// A job already pulled for dispatch reports `NotFound`: at that point
    /// the fire has won the race. For everything else the store delete is
    /// the commit point, and the queue entry is dropped with it.
    pub fn remove_job(&self, id: &str) -> Result<()> {
        {
            let mut q = self.queue.lock().unwrap();
            if q.in_flight.contains(id) {
                return Err(SchedulerError::NotFound { id: id.to_string() });
            }
            // Holding the lock across the delete keeps the firing loop from
            // pulling this ID between the in-flight check and the row removal.
            self.store.delete(id)?;
            q.heap.retain(|Reverse(entry)| entry.id != id);
        }
        self.wake.notify_one();

        info!(job_id = %id, "job cancelled");
        Ok(())
    }

    /// All pending jobs for one owner, soonest due first.
    pub fn get_user_jobs(&self, owner_id: u64) -> Result<Vec<Job>> {
        self.store.list_by_owner(owner_id)
    }

    /// Drive the firing loop until `shutdown` broadcasts `true`.
    ///
    /// Rebuilds the in-memory queue from the store first; jobs whose due time
    /// passed while the process was down fire on the first pass.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        match self.load_persisted() {
            Ok(count) => info!(count, "scheduler started"),
            Err(e) => error!(error = %e, "failed to load persisted jobs"),
        }

        loop {
            self.fire_due().await;

            let next = self.next_due_time();
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler shutting down");
                        break;
                    }
                }
                _ = self.wake.notified() => {}
                _ = wait_until(next) => {}
            }
        }
    }

    // --- private helpers ---------------------------------------------------

    /// Load every persisted job into the queue. Returns the number loaded.
    fn load_persisted(&self) -> Result<usize> {
        let jobs = self.store.list_all()?;
        let count = jobs.len();
        let now = Utc::now();

        let mut q = self.queue.lock().unwrap();
        for job in jobs {
            if job.due_time <= now {
                info!(job_id = %job.id, due_time = %job.due_time.to_rfc3339(), "job became due while offline");
            }
            q.heap.push(Reverse(DueEntry {
                due_time: job.due_time,
                id: job.id,
            }));
        }
        Ok(count)
    }

    /// Earliest queued due time, if any.
    fn next_due_time(&self) -> Option<DateTime<Utc>> {
        let q = self.queue.lock().unwrap();
        q.heap.peek().map(|Reverse(entry)| entry.due_time)
    }

    /// Pull every elapsed job off the queue and dispatch each in due order.
    async fn fire_due(&self) {
        let now = Utc::now();

        // Single lock region: pop and mark in-flight together, so a
        // concurrent remove_job either sees the heap entry or the in-flight
        // marker, never neither.
        let due: Vec<DueEntry> = {
            let mut q = self.queue.lock().unwrap();
            let mut due = Vec::new();
            while q
                .heap
                .peek()
                .is_some_and(|Reverse(entry)| entry.due_time <= now)
            {
                if let Some(Reverse(entry)) = q.heap.pop() {
                    q.in_flight.insert(entry.id.clone());
                    due.push(entry);
                }
            }
            due
        };

        for entry in due {
            self.fire_one(&entry.id).await;
            let mut q = self.queue.lock().unwrap();
            q.in_flight.remove(&entry.id);
        }
    }

    /// Dispatch a single due job, then delete it from the store.
    async fn fire_one(&self, id: &str) {
        let job = match self.store.get(id) {
            Ok(Some(job)) => job,
            Ok(None) => {
                // Row already gone: a cancel won while the queue entry was
                // stale. The store decides, so there is nothing to deliver.
                debug!(job_id = %id, "due entry has no row, skipping");
                return;
            }
            Err(e) => {
                // Leave the row alone; startup recovery picks it up again.
                error!(job_id = %id, error = %e, "failed to read due job");
                return;
            }
        };

        info!(job_id = %id, task = %job.payload.task_name, "firing job");
        if let Err(e) = self.dispatcher.dispatch(&job.payload).await {
            warn!(job_id = %id, error = %e, "delivery failed");
        }

        match self.store.delete(id) {
            Ok(()) => {}
            // Deleted elsewhere in the meantime; the job is gone either way.
            Err(SchedulerError::NotFound { .. }) => {}
            Err(e) => error!(job_id = %id, error = %e, "failed to delete fired job"),
        }
    }
}

/// Sleep until `at`, or forever when there is no upcoming job.
async fn wait_until(at: Option<DateTime<Utc>>) {
    match at {
        Some(at) => {
            // A non-positive delta means the job is already due; return
            // immediately so the loop fires it.
            if let Ok(delay) = (at - Utc::now()).to_std() {
                tokio::time::sleep(delay).await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}
