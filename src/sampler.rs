use tracing::debug;

use crate::display::Progress;
use crate::errors::BenchError;
use crate::timer::Timer;

/// Run `command` `runs` times and keep the fastest duration.
///
/// Scheduling noise only ever adds time, so the minimum is the best estimate
/// of the true cost. A single failed trial fails the whole sample.
pub fn best_of<T: Timer + ?Sized>(
    timer: &mut T,
    command: &str,
    runs: usize,
    progress: &Progress,
) -> Result<f64, BenchError> {
    if runs == 0 {
        return Err(BenchError::InvalidRuns);
    }

    progress.start(command);
    let mut best = f64::INFINITY;
    for trial in 0..runs {
        let secs = match timer.time(command) {
            Ok(secs) => secs,
            Err(err) => {
                progress.failed();
                return Err(err);
            }
        };
        debug!(command, trial, secs, "sample");
        best = best.min(secs);
    }
    progress.done(best);

    Ok(best)
}
