/// Structural checks run by `resolve`, in order. Each returns the first
/// offending stream it finds.

use std::collections::{BTreeMap, HashMap};

use log::warn;

use crate::error::{NetworkError, ReferenceKind};
use crate::stream::{CwmsId, Stream};

pub(super) fn index_streams(
    streams: impl IntoIterator<Item = Stream>,
) -> Result<BTreeMap<CwmsId, Stream>, NetworkError> {
    let mut indexed = BTreeMap::new();
    for stream in streams {
        let id = stream.id().clone();
        if indexed.insert(id.clone(), stream).is_some() {
            return Err(NetworkError::DuplicateStream(id));
        }
    }
    Ok(indexed)
}

pub(super) fn index_locations(
    streams: &BTreeMap<CwmsId, Stream>,
) -> Result<BTreeMap<CwmsId, CwmsId>, NetworkError> {
    let mut locations: BTreeMap<CwmsId, CwmsId> = BTreeMap::new();

    for stream in streams.values() {
        for location in stream.locations() {
            if let Some(first) = locations.get(location.id()) {
                return Err(NetworkError::DuplicateLocation {
                    location: location.id().clone(),
                    first: first.clone(),
                    second: stream.id().clone(),
                });
            }
            if location.stream_id() != stream.id() {
                return Err(NetworkError::MisplacedLocation {
                    location: location.id().clone(),
                    listed_on: stream.id().clone(),
                    node_stream: location.stream_id().clone(),
                });
            }
            locations.insert(location.id().clone(), stream.id().clone());
        }
    }

    Ok(locations)
}

pub(super) fn check_reaches(streams: &BTreeMap<CwmsId, Stream>) -> Result<(), NetworkError> {
    for stream in streams.values() {
        for reach in stream.reaches() {
            for endpoint in [reach.upstream_location_id(), reach.downstream_location_id()] {
                if stream.find_location(endpoint).is_none() {
                    return Err(NetworkError::ReachOffStream {
                        reach: reach.id().clone(),
                        stream: stream.id().clone(),
                        location: endpoint.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

pub(super) fn check_references(streams: &BTreeMap<CwmsId, Stream>) -> Result<(), NetworkError> {
    for stream in streams.values() {
        let junctions = [
            (stream.diverting_stream_id(), ReferenceKind::Diversion),
            (stream.receiving_stream_id(), ReferenceKind::Confluence),
        ];
        let tributaries = stream
            .tributaries()
            .iter()
            .map(|t| (Some(t.as_str()), ReferenceKind::Tributary));

        for (name, kind) in junctions.into_iter().chain(tributaries) {
            let Some(name) = name else { continue };
            if !streams.contains_key(&stream.id().sibling(name)) {
                return Err(NetworkError::DanglingReference {
                    from: stream.id().clone(),
                    missing: name.to_string(),
                    kind,
                });
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Streams `id` references through its receiving and diverting junctions.
fn junction_targets<'a>(id: &CwmsId, streams: &'a BTreeMap<CwmsId, Stream>) -> Vec<&'a CwmsId> {
    let Some(stream) = streams.get(id) else {
        return Vec::new();
    };
    [stream.receiving_stream_id(), stream.diverting_stream_id()]
        .into_iter()
        .flatten()
        .filter_map(|name| streams.get_key_value(&id.sibling(name)).map(|(key, _)| key))
        .collect()
}

/// Depth-first search over the reference edges `stream -> receiving` and
/// `stream -> diverting`, on an explicit stack so chain length is not
/// bounded by the call stack.
pub(super) fn detect_cycles(streams: &BTreeMap<CwmsId, Stream>) -> Result<(), NetworkError> {
    let mut visits: HashMap<&CwmsId, Visit> = HashMap::new();

    for root in streams.keys() {
        if visits.contains_key(root) {
            continue;
        }
        visits.insert(root, Visit::InProgress);
        let mut path = vec![(root, junction_targets(root, streams).into_iter())];

        while let Some((_, remaining)) = path.last_mut() {
            let Some(next) = remaining.next() else {
                if let Some((done, _)) = path.pop() {
                    visits.insert(done, Visit::Done);
                }
                continue;
            };

            match visits.get(next).copied() {
                Some(Visit::Done) => {}
                Some(Visit::InProgress) => {
                    let start = path.iter().position(|(p, _)| *p == next).unwrap_or(0);
                    return Err(NetworkError::CycleDetected {
                        office: next.office_id.clone(),
                        streams: path[start..].iter().map(|(p, _)| p.name.clone()).collect(),
                    });
                }
                None => {
                    visits.insert(next, Visit::InProgress);
                    path.push((next, junction_targets(next, streams).into_iter()));
                }
            }
        }
    }

    Ok(())
}

pub(super) fn check_tributaries(streams: &BTreeMap<CwmsId, Stream>) -> Result<(), NetworkError> {
    for parent in streams.values() {
        for name in parent.tributaries() {
            let Some(tributary) = streams.get(&parent.id().sibling(name)) else {
                continue;
            };
            let points_back = tributary.receiving_stream_id() == Some(parent.stream_id())
                || tributary.diverting_stream_id() == Some(parent.stream_id());
            if !points_back {
                return Err(NetworkError::InconsistentTributary {
                    parent: parent.id().clone(),
                    tributary: tributary.id().clone(),
                });
            }
        }
    }
    Ok(())
}

/// Drainage areas out of order are suspicious but not structural, so they
/// are logged rather than rejected.
pub(super) fn warn_inconsistent_drainage(streams: &BTreeMap<CwmsId, Stream>) {
    for stream in streams.values() {
        for location in stream.locations() {
            if !location.has_consistent_drainage() {
                warn!(
                    "location {} has inconsistent drainage areas (total {:?}, ungaged {:?})",
                    location.id(),
                    location.total_drainage_area(),
                    location.ungaged_drainage_area()
                );
            }
        }
    }
}
