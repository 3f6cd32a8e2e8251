use std::ffi::OsString;
use tracing::{debug, info, warn};

use crate::activity::ActivitySource;
use crate::combine::combine_counts;
use crate::counter::CountTable;
use crate::error::CheckError;
use crate::limits::{evaluate, Breach, LimitSpec, Verdict};
use crate::trigger::{InvocationOutput, KillTrigger};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    WithinLimits,
    KillTriggered { breach: Breach, output: InvocationOutput },
}

/// One pass of the transcode policy: fetch, count, combine, evaluate and,
/// on breach, run the kill trigger.
pub struct TranscodeCheck<S: ActivitySource, T: KillTrigger> {
    source: S,
    trigger: T,
    combine_ratio: u32,
}

impl<S: ActivitySource, T: KillTrigger> TranscodeCheck<S, T> {
    pub fn new(source: S, trigger: T, combine_ratio: u32) -> Self {
        Self {
            source,
            trigger,
            combine_ratio,
        }
    }

    pub async fn run(&self, spec: &LimitSpec, forwarded: &[OsString]) -> Result<CheckOutcome, CheckError> {
        let snapshot = self.source.fetch_snapshot().await?;

        let mut counts = CountTable::from_snapshot(&snapshot);
        debug!("{} transcode(s): {}", counts.total(), counts);
        if self.combine_ratio > 0 {
            combine_counts(&mut counts, self.combine_ratio, &spec.resolutions());
            debug!("after combining 1:{}: {}", self.combine_ratio, counts);
        }

        let breach = match evaluate(spec, &counts) {
            Verdict::NoBreach => return Ok(CheckOutcome::WithinLimits),
            Verdict::Breach(breach) => breach,
        };

        info!("Limit reached: {}, calling kill script", breach);
        let output = self.trigger.invoke(forwarded).await?;

        if !output.stdout.is_empty() {
            print!("{}", output.stdout);
        }
        if output.reported_error() {
            warn!("kill script exited with {:?} and wrote to stderr", output.exit_code);
            return Err(CheckError::Invocation(output.stderr.trim_end().to_string()));
        }

        Ok(CheckOutcome::KillTriggered { breach, output })
    }
}
