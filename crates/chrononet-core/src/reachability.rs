//! Temporal reachability: time-respecting paths across an ordered snapshot
//! sequence.
//!
//! Propagation walks the snapshots in chronological order and, within a
//! snapshot, the edge list in its given order. An edge extends a path only
//! when its source was reached earlier (in an earlier snapshot, or at an
//! earlier edge of the same snapshot) and its target was not. The first path
//! to reach a device is the only one kept; this is reachability, not
//! shortest-path.

use crate::capability::Capability;
use crate::device::DeviceDirectory;
use crate::id::DeviceId;
use crate::interval::TimeInterval;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// How a snapshot interval is compared against a query's interval filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalMatch {
    /// The snapshot interval must equal the filter.
    #[default]
    Exact,
    /// The snapshot interval must overlap the filter.
    Overlap,
}

/// Restricts a query to the snapshots whose interval matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalFilter {
    pub interval: TimeInterval,
    #[serde(default)]
    pub mode: IntervalMatch,
}

impl IntervalFilter {
    pub fn exact(interval: TimeInterval) -> Self {
        Self {
            interval,
            mode: IntervalMatch::Exact,
        }
    }

    pub fn overlapping(interval: TimeInterval) -> Self {
        Self {
            interval,
            mode: IntervalMatch::Overlap,
        }
    }

    pub fn matches(&self, interval: &TimeInterval) -> bool {
        match self.mode {
            IntervalMatch::Exact => *interval == self.interval,
            IntervalMatch::Overlap => interval.overlaps(&self.interval),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityQuery {
    pub source: String,
    /// Requested targets; duplicates are ignored and result order follows
    /// first occurrence.
    pub targets: Vec<String>,
    #[serde(default)]
    pub interval: Option<IntervalFilter>,
    /// Require snapshot-local send on the hop source and receive on the hop
    /// target.
    #[serde(default)]
    pub consider_capabilities: bool,
}

impl ReachabilityQuery {
    pub fn new(source: &str, targets: &[&str]) -> Self {
        Self {
            source: source.to_string(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
            interval: None,
            consider_capabilities: false,
        }
    }

    pub fn within(mut self, filter: IntervalFilter) -> Self {
        self.interval = Some(filter);
        self
    }

    pub fn with_capabilities(mut self, consider: bool) -> Self {
        self.consider_capabilities = consider;
        self
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// A time-respecting path and the interval of its final hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityPath {
    pub devices: Vec<DeviceId>,
    pub interval: TimeInterval,
}

impl ReachabilityPath {
    pub fn target(&self) -> Option<DeviceId> {
        self.devices.last().copied()
    }

    pub fn hops(&self) -> usize {
        self.devices.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachabilityResult {
    pub is_reachable: bool,
    /// One entry per reached target, in query order.
    pub paths: Vec<ReachabilityPath>,
}

impl ReachabilityResult {
    pub fn path_to(&self, device: DeviceId) -> Option<&ReachabilityPath> {
        self.paths.iter().find(|p| p.target() == Some(device))
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Path recorded for a reached device. `interval` is `None` only for the
/// source.
#[derive(Debug, Clone)]
struct Reached {
    path: Vec<DeviceId>,
    interval: Option<TimeInterval>,
}

/// Find time-respecting paths from `query.source` to each of `query.targets`.
///
/// Snapshots are expected to be chronologically ordered and disjoint; they
/// are stable-sorted by interval start but not otherwise validated. Unknown
/// device names never match.
pub fn find_reachability(
    snapshots: &[Snapshot],
    query: &ReachabilityQuery,
    directory: &DeviceDirectory,
) -> ReachabilityResult {
    let Some(source) = directory.id_of(&query.source) else {
        log::debug!("reachability source {:?} not in directory", query.source);
        return ReachabilityResult::default();
    };

    let mut ordered: Vec<&Snapshot> = snapshots
        .iter()
        .filter(|s| {
            query
                .interval
                .as_ref()
                .is_none_or(|filter| filter.matches(&s.interval()))
        })
        .collect();
    ordered.sort_by_key(|s| s.interval().start());

    let mut reached: HashMap<DeviceId, Reached> = HashMap::new();
    reached.insert(
        source,
        Reached {
            path: vec![source],
            interval: None,
        },
    );

    for snapshot in ordered {
        for edge in snapshot.edges() {
            let Some((from, to)) = edge.endpoints() else {
                continue;
            };
            // Same rule as transport: both ends must be vertices here.
            if snapshot.state(from).is_none() || snapshot.state(to).is_none() {
                continue;
            }
            if reached.contains_key(&to) {
                continue;
            }
            let Some(predecessor) = reached.get(&from) else {
                continue;
            };
            if query.consider_capabilities
                && !(snapshot.local_capabilities(from).has(Capability::Send)
                    && snapshot.local_capabilities(to).has(Capability::Receive))
            {
                continue;
            }

            let mut path = Vec::with_capacity(predecessor.path.len() + 1);
            path.extend_from_slice(&predecessor.path);
            path.push(to);
            reached.insert(
                to,
                Reached {
                    path,
                    interval: Some(snapshot.interval()),
                },
            );
        }
    }

    let mut seen = Vec::with_capacity(query.targets.len());
    let mut paths = Vec::new();
    for name in &query.targets {
        let Some(target) = directory.id_of(name) else {
            continue;
        };
        if seen.contains(&target) {
            continue;
        }
        seen.push(target);
        if let Some(Reached {
            path,
            interval: Some(interval),
        }) = reached.get(&target)
        {
            paths.push(ReachabilityPath {
                devices: path.clone(),
                interval: *interval,
            });
        }
    }

    ReachabilityResult {
        is_reachable: !paths.is_empty(),
        paths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilitySet;
    use crate::device::{Edge, EdgeDirection};

    fn iv(start: i64, end: i64) -> TimeInterval {
        TimeInterval::new(start, end).unwrap()
    }

    fn directory(names: &[&str]) -> (DeviceDirectory, Vec<DeviceId>) {
        let mut dir = DeviceDirectory::new();
        let ids = names.iter().map(|n| dir.add(n).unwrap()).collect();
        (dir, ids)
    }

    #[test]
    fn single_right_edge_reaches_target() {
        let (dir, ids) = directory(&["A", "B"]);
        let snaps = vec![Snapshot::new(
            0,
            iv(0, 3),
            dir.vertices(),
            vec![Edge::new(ids[0], ids[1], EdgeDirection::Right)],
        )];
        let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["B"]), &dir);
        assert!(result.is_reachable);
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].devices, vec![ids[0], ids[1]]);
        assert_eq!(result.paths[0].interval, iv(0, 3));
    }

    #[test]
    fn left_edge_is_mirror() {
        let (dir, ids) = directory(&["A", "B"]);
        let snaps = vec![Snapshot::new(
            0,
            iv(0, 3),
            dir.vertices(),
            vec![Edge::new(ids[0], ids[1], EdgeDirection::Left)],
        )];
        let forward = find_reachability(&snaps, &ReachabilityQuery::new("A", &["B"]), &dir);
        assert!(!forward.is_reachable);
        let backward = find_reachability(&snaps, &ReachabilityQuery::new("B", &["A"]), &dir);
        assert!(backward.is_reachable);
        assert_eq!(backward.paths[0].devices, vec![ids[1], ids[0]]);
    }

    #[test]
    fn edges_to_absent_devices_are_ignored() {
        let (dir, ids) = directory(&["A", "B", "C"]);
        let present: Vec<_> = dir.vertices().into_iter().filter(|d| d.id() != ids[1]).collect();
        let snaps = vec![
            Snapshot::new(
                0,
                iv(0, 3),
                present,
                vec![
                    Edge::new(ids[0], ids[1], EdgeDirection::Right),
                    Edge::new(ids[1], ids[2], EdgeDirection::Right),
                ],
            ),
            Snapshot::new(
                1,
                iv(3, 6),
                dir.vertices(),
                vec![Edge::new(ids[0], ids[1], EdgeDirection::Right)],
            ),
        ];
        let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["B", "C"]), &dir);
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].devices, vec![ids[0], ids[1]]);
        assert_eq!(result.paths[0].interval, iv(3, 6));
        assert!(result.path_to(ids[2]).is_none());
    }

    #[test]
    fn undirected_edge_never_propagates() {
        let (dir, ids) = directory(&["A", "B"]);
        let snaps = vec![Snapshot::new(
            0,
            iv(0, 3),
            dir.vertices(),
            vec![Edge::new(ids[0], ids[1], EdgeDirection::Undirected)],
        )];
        let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["B"]), &dir);
        assert!(!result.is_reachable);
        assert!(result.paths.is_empty());
    }

    #[test]
    fn later_snapshot_cannot_feed_earlier_hop() {
        // B -> C happens before A -> B, so C is not reachable from A.
        let (dir, ids) = directory(&["A", "B", "C"]);
        let snaps = vec![
            Snapshot::new(0, iv(0, 2), dir.vertices(), vec![Edge::new(ids[1], ids[2], EdgeDirection::Right)]),
            Snapshot::new(1, iv(2, 4), dir.vertices(), vec![Edge::new(ids[0], ids[1], EdgeDirection::Right)]),
        ];
        let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["B", "C"]), &dir);
        assert!(result.is_reachable);
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].target(), Some(ids[1]));
    }

    #[test]
    fn snapshots_are_sorted_by_start() {
        let (dir, ids) = directory(&["A", "B", "C"]);
        // Supplied out of order; chronologically A -> B precedes B -> C.
        let snaps = vec![
            Snapshot::new(1, iv(2, 4), dir.vertices(), vec![Edge::new(ids[1], ids[2], EdgeDirection::Right)]),
            Snapshot::new(0, iv(0, 2), dir.vertices(), vec![Edge::new(ids[0], ids[1], EdgeDirection::Right)]),
        ];
        let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["C"]), &dir);
        assert!(result.is_reachable);
        assert_eq!(result.paths[0].devices, vec![ids[0], ids[1], ids[2]]);
        assert_eq!(result.paths[0].interval, iv(2, 4));
    }

    #[test]
    fn first_discovery_wins() {
        let (dir, ids) = directory(&["A", "B", "C"]);
        let snaps = vec![
            Snapshot::new(
                0,
                iv(0, 2),
                dir.vertices(),
                vec![
                    Edge::new(ids[0], ids[1], EdgeDirection::Right),
                    Edge::new(ids[1], ids[2], EdgeDirection::Right),
                ],
            ),
            Snapshot::new(1, iv(2, 4), dir.vertices(), vec![Edge::new(ids[0], ids[2], EdgeDirection::Right)]),
        ];
        let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["C"]), &dir);
        assert_eq!(result.paths[0].devices, vec![ids[0], ids[1], ids[2]]);
        assert_eq!(result.paths[0].interval, iv(0, 2));
    }

    #[test]
    fn same_snapshot_hops_follow_edge_order() {
        let (dir, ids) = directory(&["A", "B", "C"]);
        // B -> C is enumerated before A -> B, so within this snapshot C stays unreached.
        let snaps = vec![Snapshot::new(
            0,
            iv(0, 2),
            dir.vertices(),
            vec![
                Edge::new(ids[1], ids[2], EdgeDirection::Right),
                Edge::new(ids[0], ids[1], EdgeDirection::Right),
            ],
        )];
        let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["C"]), &dir);
        assert!(!result.is_reachable);
    }

    #[test]
    fn capabilities_gate_hops() {
        let (dir, ids) = directory(&["A", "B"]);
        let mut snap = Snapshot::new(
            0,
            iv(0, 3),
            dir.vertices(),
            vec![Edge::new(ids[0], ids[1], EdgeDirection::Right)],
        );
        let query = ReachabilityQuery::new("A", &["B"]).with_capabilities(true);

        assert!(!find_reachability(std::slice::from_ref(&snap), &query, &dir).is_reachable);

        snap.set_local_capabilities(ids[0], CapabilitySet::of(&[Capability::Send]));
        assert!(!find_reachability(std::slice::from_ref(&snap), &query, &dir).is_reachable);

        snap.set_local_capabilities(ids[1], CapabilitySet::of(&[Capability::Receive]));
        assert!(find_reachability(std::slice::from_ref(&snap), &query, &dir).is_reachable);
    }

    #[test]
    fn exact_filter_keeps_only_matching_slice() {
        let (dir, ids) = directory(&["A", "B"]);
        let snaps = vec![
            Snapshot::new(0, iv(0, 3), dir.vertices(), vec![]),
            Snapshot::new(1, iv(3, 6), dir.vertices(), vec![Edge::new(ids[0], ids[1], EdgeDirection::Right)]),
        ];
        let exact = ReachabilityQuery::new("A", &["B"]).within(IntervalFilter::exact(iv(0, 3)));
        assert!(!find_reachability(&snaps, &exact, &dir).is_reachable);

        let overlap = ReachabilityQuery::new("A", &["B"]).within(IntervalFilter::overlapping(iv(2, 4)));
        assert!(find_reachability(&snaps, &overlap, &dir).is_reachable);
    }

    #[test]
    fn unmatched_filter_yields_empty() {
        let (dir, ids) = directory(&["A", "B"]);
        let snaps = vec![Snapshot::new(
            0,
            iv(0, 3),
            dir.vertices(),
            vec![Edge::new(ids[0], ids[1], EdgeDirection::Right)],
        )];
        let query = ReachabilityQuery::new("A", &["B"]).within(IntervalFilter::exact(iv(10, 20)));
        assert_eq!(find_reachability(&snaps, &query, &dir), ReachabilityResult::default());
    }

    #[test]
    fn unknown_names_are_ignored() {
        let (dir, ids) = directory(&["A", "B"]);
        let snaps = vec![Snapshot::new(
            0,
            iv(0, 3),
            dir.vertices(),
            vec![Edge::new(ids[0], ids[1], EdgeDirection::Right)],
        )];
        assert!(!find_reachability(&snaps, &ReachabilityQuery::new("nope", &["B"]), &dir).is_reachable);
        let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["ghost", "B", "B"]), &dir);
        assert_eq!(result.paths.len(), 1);
    }

    #[test]
    fn source_is_not_its_own_target() {
        let (dir, _) = directory(&["A"]);
        let snaps = vec![Snapshot::new(0, iv(0, 3), dir.vertices(), vec![])];
        let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["A"]), &dir);
        assert!(!result.is_reachable);
    }
}
