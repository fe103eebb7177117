/// Upstream closure of a point on a stream.
///
/// Starting from a point, the closure extends over:
/// - the rest of the stream above the point,
/// - every stream joining (by confluence) at or above a covered point,
///   in its entirety,
/// - the diverting parent of any covered stream, above its diversion point.
///
/// The result per stream is the lowest upstream key it is covered from;
/// keys only ever decrease while the closure grows, so it terminates on an
/// acyclic network.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::BasinNetwork;
use crate::error::QueryError;
use crate::stream::{CwmsId, Stream, StreamLocation};

/// A location upstream of a query point, with its distance from the
/// network outlet when that is defined.
#[derive(Debug, Clone)]
pub struct UpstreamEntry<'a> {
    pub stream: &'a Stream,
    pub location: &'a StreamLocation,
    pub cumulative_distance: Option<f64>,
}

/// Orders optional distances: defined ones first in increasing order,
/// undefined ones last.
pub fn by_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl BasinNetwork {
    /// For each stream upstream of `from_key` on `stream`, the upstream key
    /// above which it is covered.
    pub(crate) fn upstream_extent(&self, stream: &Stream, from_key: f64) -> BTreeMap<CwmsId, f64> {
        let mut extent: BTreeMap<CwmsId, f64> = BTreeMap::new();
        let mut pending = vec![(stream.id().clone(), from_key)];

        while let Some((id, key)) = pending.pop() {
            if extent.get(&id).is_some_and(|&covered| covered <= key) {
                continue;
            }
            extent.insert(id.clone(), key);

            let Some(current) = self.stream(&id) else {
                continue;
            };

            for tributary_id in self.confluence_tributaries_of(&id) {
                let joins_above = self
                    .stream(tributary_id)
                    .and_then(Stream::confluence_station)
                    .is_some_and(|station| current.upstream_key(station) >= key);
                if joins_above {
                    pending.push((tributary_id.clone(), f64::NEG_INFINITY));
                }
            }

            if let Some(parent) = self.diverting_stream(current) {
                if let Some(station) = current.diversion_station() {
                    pending.push((parent.id().clone(), parent.upstream_key(station)));
                }
            }
        }

        extent
    }

    /// Locations upstream of `location_id` (excluding it), ordered by
    /// increasing distance from the network outlet; ties and undefined
    /// distances are ordered by location id.
    pub fn upstream_of(&self, location_id: &CwmsId) -> Result<Vec<UpstreamEntry<'_>>, QueryError> {
        let (stream, location) = self
            .location(location_id)
            .ok_or_else(|| QueryError::UnknownLocation(location_id.clone()))?;

        let extent = self.upstream_extent(stream, stream.upstream_key(location.station()));

        let mut entries: Vec<UpstreamEntry<'_>> = extent
            .iter()
            .filter_map(|(id, &key)| self.stream(id).map(|s| (s, key)))
            .flat_map(|(s, key)| {
                s.locations()
                    .iter()
                    .filter(move |l| s.upstream_key(l.station()) >= key)
                    .map(move |l| (s, l))
            })
            .filter(|(_, l)| l.id() != location_id)
            .map(|(s, l)| UpstreamEntry {
                stream: s,
                location: l,
                cumulative_distance: self.cumulative_distance(l.id()).ok(),
            })
            .collect();

        entries.sort_by(|a, b| {
            by_distance(a.cumulative_distance, b.cumulative_distance)
                .then_with(|| a.location.id().cmp(b.location.id()))
        });

        Ok(entries)
    }

    /// Streams wholly or partly upstream of `location_id`, including the
    /// stream it sits on, ordered by the distance of their mouths from the
    /// network outlet.
    pub fn upstream_streams_of(&self, location_id: &CwmsId) -> Result<Vec<&Stream>, QueryError> {
        let (stream, location) = self
            .location(location_id)
            .ok_or_else(|| QueryError::UnknownLocation(location_id.clone()))?;

        let extent = self.upstream_extent(stream, stream.upstream_key(location.station()));

        let mut streams: Vec<(&Stream, Option<f64>)> = extent
            .keys()
            .filter_map(|id| self.stream(id))
            .map(|s| (s, self.stream_mouth_distance(s.id()).ok()))
            .collect();

        streams.sort_by(|(a, da), (b, db)| by_distance(*da, *db).then_with(|| a.id().cmp(b.id())));

        Ok(streams.into_iter().map(|(s, _)| s).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::resolve;
    use super::super::test_support::*;
    use super::*;
    use crate::stream::Bank;

    fn names(entries: &[UpstreamEntry<'_>]) -> Vec<String> {
        entries.iter().map(|e| e.location.id().name.clone()).collect()
    }

    /// Mainstem M (mouth-origin, length 100) with:
    /// - gauges at 10, 50, 90,
    /// - tributary T joining at 40 with a gauge at 3,
    /// - tributary U joining at 70 with a gauge at 2,
    /// - canal K diverting from M at 60 and ending outside the basin.
    fn network() -> BasinNetwork {
        resolve(vec![
            mainstem("M", Some(100.0))
                .with_locations(vec![
                    location("M", "M10", 10.0, None),
                    location("M", "M50", 50.0, None),
                    location("M", "M90", 90.0, None),
                ])
                .build()
                .unwrap(),
            flowing_into("T", Some(8.0), "M", 40.0)
                .with_locations(vec![location("T", "T3", 3.0, None)])
                .build()
                .unwrap(),
            flowing_into("U", Some(5.0), "M", 70.0)
                .with_locations(vec![location("U", "U2", 2.0, None)])
                .build()
                .unwrap(),
            mainstem("K", Some(12.0))
                .with_diverting_stream_id("M")
                .with_diversion_station(60.0)
                .with_diversion_bank(Bank::Left)
                .with_locations(vec![location("K", "K5", 5.0, None)])
                .build()
                .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_upstream_of_mainstem_location_includes_joining_tributaries() {
        let network = network();
        let entries = network.upstream_of(&id("M10")).unwrap();

        // Distances from outlet: T3 = 43, M50 = 50, U2 = 72, M90 = 90.
        assert_eq!(names(&entries), ["T3", "M50", "U2", "M90"]);
        assert!((entries[0].cumulative_distance.unwrap() - 43.0).abs() < 1e-9);
    }

    #[test]
    fn test_upstream_of_excludes_tributaries_joining_below() {
        let network = network();
        let entries = network.upstream_of(&id("M50")).unwrap();
        assert_eq!(names(&entries), ["U2", "M90"]);
    }

    #[test]
    fn test_diversion_parent_is_upstream_above_diversion_point() {
        let network = network();
        let entries = network.upstream_of(&id("K5")).unwrap();

        // K5 itself is excluded; M above station 60 feeds K.
        let found = names(&entries);
        assert!(found.contains(&"U2".to_string()), "U joins M above the diversion: {:?}", found);
        assert!(found.contains(&"M90".to_string()), "{:?}", found);
        assert!(!found.contains(&"M50".to_string()), "M50 is below the diversion: {:?}", found);
        assert!(!found.contains(&"T3".to_string()), "T joins below the diversion: {:?}", found);
    }

    #[test]
    fn test_diverted_canal_is_not_upstream_of_parent() {
        let network = network();
        let found = names(&network.upstream_of(&id("M10")).unwrap());
        assert!(!found.contains(&"K5".to_string()), "flow leaves through K: {:?}", found);
    }

    #[test]
    fn test_undefined_distances_sort_last() {
        let network = resolve(vec![
            mainstem("M", Some(100.0))
                .with_locations(vec![
                    location("M", "M10", 10.0, None),
                    location("M", "M90", 90.0, None),
                ])
                .build()
                .unwrap(),
            flowing_into("T", None, "M", 40.0)
                .with_locations(vec![location("T", "T3", 3.0, None)])
                .build()
                .unwrap(),
        ])
        .unwrap();

        let entries = network.upstream_of(&id("M10")).unwrap();
        assert_eq!(names(&entries), ["M90", "T3"]);
        assert!(entries[1].cumulative_distance.is_none());
    }

    #[test]
    fn test_upstream_streams_ordered_by_mouth_distance() {
        let network = network();
        let streams: Vec<_> = network
            .upstream_streams_of(&id("M10"))
            .unwrap()
            .into_iter()
            .map(|s| s.stream_id().to_string())
            .collect();
        assert_eq!(streams, ["M", "T", "U"]);
    }

    #[test]
    fn test_upstream_of_unknown_location() {
        let network = network();
        assert!(matches!(
            network.upstream_of(&id("Nowhere")),
            Err(QueryError::UnknownLocation(_))
        ));
    }

    #[test]
    fn test_by_distance_puts_undefined_last() {
        let mut distances = vec![None, Some(72.0), Some(43.0), None, Some(50.0)];
        distances.sort_by(|a, b| by_distance(*a, *b));
        assert_eq!(distances, [Some(43.0), Some(50.0), Some(72.0), None, None]);
    }
}
