//! Rotation ranking.
//!
//! Least-recently-used ordering for the two candidate lists. `None` (never
//! assigned) orders before every concrete date because `Option`'s derived
//! ordering puts `None` first, and dates compare numerically. Names break
//! remaining ties so repeated refreshes of identical data never reorder rows;
//! ids make the order total when two rows would otherwise compare equal.

use std::cmp::Ordering;

use crate::{CompanionCandidate, StudentCandidate};

/// Longest-idle student first, then by name.
pub fn rank_students(candidates: &mut [StudentCandidate]) {
    candidates.sort_by(compare_students);
}

/// Longest-unpaired-with-main first, then longest-idle overall, then by name.
pub fn rank_companions(candidates: &mut [CompanionCandidate]) {
    candidates.sort_by(compare_companions);
}

#[must_use]
pub fn compare_students(a: &StudentCandidate, b: &StudentCandidate) -> Ordering {
    a.last_activity
        .cmp(&b.last_activity)
        .then_with(|| a.person.name.cmp(&b.person.name))
        .then_with(|| a.person.id.cmp(&b.person.id))
}

#[must_use]
pub fn compare_companions(a: &CompanionCandidate, b: &CompanionCandidate) -> Ordering {
    a.last_paired
        .cmp(&b.last_paired)
        .then_with(|| a.last_activity.cmp(&b.last_activity))
        .then_with(|| a.person.name.cmp(&b.person.name))
        .then_with(|| a.person.id.cmp(&b.person.id))
}
