use tracing::debug;

use crate::counter::CountTable;
use crate::resolution::Resolution;

/// Fold lower-resolution transcodes into the next higher resolution named in
/// `relevant`: every `ratio` sessions below count as one extra session above.
///
/// A single sweep runs from the highest relevant resolution down, reading the
/// lower count as currently stored. Lower counts are left untouched so they
/// still face their own limit. A ratio of zero disables combination.
pub fn combine_counts(counts: &mut CountTable, ratio: u32, relevant: &[Resolution]) {
    if ratio == 0 {
        return;
    }

    let ladder: Vec<Resolution> = Resolution::ALL
        .into_iter()
        .filter(|res| relevant.contains(res))
        .collect();

    for pair in ladder.windows(2).rev() {
        let (lower, current) = (pair[0], pair[1]);
        let combined = counts.get(lower) / ratio;
        if combined > 0 {
            debug!("{} {} transcodes count as {} more at {}", counts.get(lower), lower, combined, current);
        }
        counts.add(current, combined);
    }
}
