use std::fmt;

use crate::activity::SessionSnapshot;
use crate::resolution::Resolution;

pub const TRANSCODE_DECISION: &str = "transcode";

/// Transcoding sessions per registry resolution. Every resolution has an
/// entry, starting at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountTable {
    counts: [u32; Resolution::ALL.len()],
}

impl CountTable {
    /// Count sessions that are transcoding at a registry resolution. The
    /// session that triggered the notification is included.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let mut table = Self::default();
        for session in &snapshot.sessions {
            if session.transcode_decision != TRANSCODE_DECISION {
                continue;
            }
            if let Some(res) = Resolution::from_label(&session.video_resolution) {
                table.add(res, 1);
            }
        }
        table
    }

    pub fn get(&self, res: Resolution) -> u32 {
        self.counts[res.rank()]
    }

    pub fn add(&mut self, res: Resolution, n: u32) {
        let slot = &mut self.counts[res.rank()];
        *slot = slot.saturating_add(n);
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&n| u64::from(n)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resolution, u32)> + '_ {
        Resolution::ALL.into_iter().map(move |res| (res, self.get(res)))
    }
}

impl fmt::Display for CountTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (res, n) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", res, n)?;
            first = false;
        }
        Ok(())
    }
}
