//! Event merger
//!
//! Interleaves the four per-axis sequences into one chronological stream.
//! Ordering is by timestamp; equal timestamps resolve by axis precedence
//! (X, Y, Z, E) and then by position within the axis sequence.

use std::cmp::Ordering;

use steptrace_core::PeakEvent;

use crate::streams::PeakStreams;

/// Merge per-axis sequences into one time-ordered sequence
///
/// The inputs are not modified. Runs in O(n log n) over the total event
/// count.
pub fn merge_events(streams: &PeakStreams) -> Vec<PeakEvent> {
    let mut merged: Vec<PeakEvent> = Vec::with_capacity(streams.len());
    for (_, events) in streams.iter_axes() {
        merged.extend_from_slice(events);
    }

    // Stable sort: within one axis, equal timestamps keep input order.
    merged.sort_by(chronological);

    tracing::trace!(events = merged.len(), "merged peak streams");
    merged
}

/// Total order used by the merger
pub fn chronological(a: &PeakEvent, b: &PeakEvent) -> Ordering {
    // Timestamps are finite by construction, so partial_cmp never fails;
    // -0.0 and 0.0 compare equal and fall through to precedence.
    a.timestamp()
        .partial_cmp(&b.timestamp())
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.axis().precedence().cmp(&b.axis().precedence()))
}

/// Whether a sequence is already in merge order
pub fn is_chronological(events: &[PeakEvent]) -> bool {
    events
        .windows(2)
        .all(|w| chronological(&w[0], &w[1]) != Ordering::Greater)
}
