use core::time::Duration;

use crossbeam_channel::Receiver;
use humantime::format_duration;
use tracing::{debug, error, error_span};

use crate::{
    broadcast::BroadcastOutcome,
    chain::handle::ChainHandle,
    director::{CycleError, CycleOutcome, Director},
    schedule::{pause, Wait},
    util::task::{spawn_background_task, Next, TaskError, TaskHandle},
};

/// Run the cycles of `director` one after the other on a background task,
/// until the task is shut down.
///
/// A failed cycle is logged and the next one starts after `cycle_error_pause`.
/// So does a cycle whose broadcast left the client unchanged (rejected,
/// already current or exhausted), since the client is then still due.
pub fn spawn_director_worker<SrcChain: ChainHandle, DstChain: ChainHandle>(
    director: Director<SrcChain, DstChain>,
    cycle_error_pause: Duration,
) -> TaskHandle {
    spawn_background_task(
        error_span!(
            "director",
            src_chain = %director.src_chain().id(),
            dst_chain = %director.dst_chain().id(),
            client = %director.client_id(),
        ),
        None,
        move |shutdown: &Receiver<()>| -> Result<Next, TaskError<CycleError>> {
            match director.run_cycle(shutdown) {
                Ok(CycleOutcome::Broadcast(outcome)) if outcome.is_committed() => {
                    Ok(Next::Continue)
                }
                Ok(CycleOutcome::Broadcast(outcome)) => {
                    debug!(
                        "client {} was not updated ({}), pausing for {}",
                        director.client_id(),
                        outcome_name(&outcome),
                        format_duration(cycle_error_pause),
                    );

                    Ok(after_pause(cycle_error_pause, shutdown))
                }
                Ok(CycleOutcome::Cancelled) => Ok(Next::Abort),
                Err(e) => {
                    error!(
                        "Source -> {} | Destination -> {} | relay cycle failed: {}",
                        director.src_chain().id(),
                        director.dst_chain().id(),
                        e
                    );

                    Ok(after_pause(cycle_error_pause, shutdown))
                }
            }
        },
    )
}

fn after_pause(duration: Duration, shutdown: &Receiver<()>) -> Next {
    match pause(duration, shutdown) {
        Wait::Elapsed => Next::Continue,
        Wait::Cancelled => Next::Abort,
    }
}

fn outcome_name(outcome: &BroadcastOutcome) -> &'static str {
    match outcome {
        BroadcastOutcome::Committed { .. } => "committed",
        BroadcastOutcome::AlreadyCurrent { .. } => "already current",
        BroadcastOutcome::Rejected { .. } => "rejected",
        BroadcastOutcome::Exhausted { .. } => "retries exhausted",
    }
}
