//! Primitive C (completion-channel fan-in) and Primitive D (cascade
//! shutdown, which is fan-in plus a `Stop` broadcast to every worker a
//! coordinator tracks).

use fleet_core::{ContainerId, ContainerStatus, CoreError, Ctx};
use fleet_runtime::RuntimeClient;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;

/// The final disposition of one worker container, as distinguished from the
/// runtime's own status after fan-in completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    Completed(ContainerId),
    Failed(ContainerId),
}

/// Receive on `completions` until every id in `tracked` has reported in or
/// `ctx` is cancelled. On cancellation, `Stop` is requested on every worker
/// that hasn't reported yet and the channel is drained best-effort before
/// returning. Every tracked worker that did report is then queried for its
/// final status to distinguish [`WorkerOutcome::Completed`] from
/// [`WorkerOutcome::Failed`]; workers that never reported (because the
/// coordinator was cancelled before they finished) are omitted.
pub async fn fan_in(
    ctx: &Ctx,
    runtime: &RuntimeClient,
    tracked: &[ContainerId],
    mut completions: mpsc::Receiver<ContainerId>,
) -> Result<Vec<WorkerOutcome>, CoreError> {
    let mut seen = HashSet::with_capacity(tracked.len());

    while seen.len() < tracked.len() {
        tokio::select! {
            _ = ctx.cancelled() => {
                cascade_stop(runtime, tracked, &seen).await;
                drain_best_effort(&mut completions, &mut seen, tracked.len());
                break;
            }
            maybe_id = completions.recv() => {
                match maybe_id {
                    Some(id) => { seen.insert(id); }
                    None => break, // every sender dropped; nothing more is coming
                }
            }
        }
    }

    let mut outcomes = Vec::with_capacity(seen.len());
    for id in tracked {
        if !seen.contains(id) {
            continue;
        }
        let outcome = match runtime.get(*id).await? {
            Some(container) if container.status() == ContainerStatus::Completed => WorkerOutcome::Completed(*id),
            _ => WorkerOutcome::Failed(*id),
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn drain_best_effort(rx: &mut mpsc::Receiver<ContainerId>, seen: &mut HashSet<ContainerId>, total: usize) {
    while seen.len() < total {
        match rx.try_recv() {
            Ok(id) => {
                seen.insert(id);
            }
            Err(_) => break,
        }
    }
}

/// Primitive D's core step: request `Stop` on every tracked worker that
/// hasn't reported completion yet. Failures are logged and otherwise
/// ignored — a worker that can't be stopped is still caught by the
/// runtime's own stale-timeout sweep.
pub async fn cascade_stop(runtime: &RuntimeClient, tracked: &[ContainerId], seen: &HashSet<ContainerId>) {
    for id in tracked {
        if seen.contains(id) {
            continue;
        }
        if let Err(err) = runtime.stop(*id).await {
            tracing::warn!(container_id = %id, error = %err, "cascade stop failed for worker");
        }
    }
}

/// Cascades a coordinator's own `Stop` to every worker it launched, then
/// waits on fan-in within `grace_window`. Workers still outstanding when the
/// window elapses are left to the runtime's stale-timeout sweep; this
/// returns whatever outcomes were collected before the timeout.
pub async fn cascade_shutdown(
    ctx: &Ctx,
    runtime: &RuntimeClient,
    tracked: &[ContainerId],
    completions: mpsc::Receiver<ContainerId>,
    grace_window: Duration,
) -> Result<Vec<WorkerOutcome>, CoreError> {
    cascade_stop(runtime, tracked, &HashSet::new()).await;
    match tokio::time::timeout(grace_window, fan_in(ctx, runtime, tracked, completions)).await {
        Ok(result) => result,
        Err(_) => Ok(Vec::new()),
    }
}

#[cfg(test)]
#[path = "fanin_tests.rs"]
mod tests;
