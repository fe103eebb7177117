/// Aggregate drainage area at a location.
///
/// A location's own `total_drainage_area`, when recorded, already covers
/// everything above it and is returned as is. Otherwise the area is
/// assembled by walking upstream:
///
/// 1. On each stream, the nearest location above the point that carries an
///    area (a gauge) covers everything above it.
/// 2. Streams joining between the point and that gauge contribute their
///    own area, measured from their mouth.
/// 3. With no gauge above the point, every stream joining above it
///    contributes, and a diversion-fed stream follows its parent above the
///    diversion point.
///
/// A diversion-fed stream whose parent already drains to the query stream
/// through confluences carries flow that is counted on the mainstem; it
/// contributes only its ungaged area and its diversion edge is not
/// followed.
///
/// A stream may be reached more than once, e.g. as the parent of two canals
/// diverting at different stations. It contributes once, from the lowest
/// point it is reached at.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::BasinNetwork;
use crate::error::QueryError;
use crate::stream::{CwmsId, Stream, StreamLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AreaBasis {
    /// Use `total_drainage_area`.
    Total,
    /// The catchment is counted elsewhere; use `ungaged_drainage_area`.
    Ungaged,
}

impl AreaBasis {
    fn area_of(self, location: &StreamLocation) -> Option<f64> {
        match self {
            AreaBasis::Total => location.total_drainage_area(),
            AreaBasis::Ungaged => location.ungaged_drainage_area(),
        }
    }
}

/// What a stream covers above a point: the area of its nearest gauge, and
/// the streams it draws from with the key each is reached at.
struct Coverage<'a> {
    gauge_area: Option<f64>,
    reaches: Vec<(&'a Stream, f64)>,
}

struct DrainageWalk<'a> {
    network: &'a BasinNetwork,
    /// The query stream and every stream draining to it through confluences.
    draining: BTreeSet<CwmsId>,
}

impl<'a> DrainageWalk<'a> {
    fn new(network: &'a BasinNetwork, stream: &Stream) -> Self {
        let mut draining = BTreeSet::new();
        let mut pending = vec![stream.id().clone()];
        while let Some(id) = pending.pop() {
            if draining.insert(id.clone()) {
                pending.extend(network.confluence_tributaries_of(&id).iter().cloned());
            }
        }

        Self { network, draining }
    }

    fn basis(&self, stream: &Stream) -> AreaBasis {
        let counted_elsewhere = stream
            .diverting_stream_id()
            .is_some_and(|parent| self.draining.contains(&stream.id().sibling(parent)));
        if counted_elsewhere {
            AreaBasis::Ungaged
        } else {
            AreaBasis::Total
        }
    }

    fn coverage(&self, stream: &'a Stream, from_key: f64) -> Coverage<'a> {
        let basis = self.basis(stream);
        let nearest_gauge = stream
            .locations()
            .iter()
            .filter_map(|l| basis.area_of(l).map(|area| (stream.upstream_key(l.station()), area)))
            .filter(|(key, _)| *key >= from_key)
            .min_by(|a, b| a.0.total_cmp(&b.0));
        let ceiling = nearest_gauge.map(|(key, _)| key);

        let network = self.network;
        let mut reaches = Vec::new();
        for tributary_id in network.confluence_tributaries_of(stream.id()) {
            let Some(tributary) = network.stream(tributary_id) else {
                continue;
            };
            let Some(station) = tributary.confluence_station() else {
                continue;
            };
            let key = stream.upstream_key(station);
            if key >= from_key && ceiling.is_none_or(|c| key < c) {
                reaches.push((tributary, f64::NEG_INFINITY));
            }
        }

        if ceiling.is_none() && basis == AreaBasis::Total {
            if let (Some(parent), Some(station)) =
                (network.diverting_stream(stream), stream.diversion_station())
            {
                reaches.push((parent, parent.upstream_key(station)));
            }
        }

        Coverage {
            gauge_area: nearest_gauge.map(|(_, area)| area),
            reaches,
        }
    }

    /// Lowest key each stream is reached at, starting from `from_key` on `root`.
    fn lowest_keys(&self, root: &'a Stream, from_key: f64) -> BTreeMap<CwmsId, f64> {
        let mut lowest: BTreeMap<CwmsId, f64> = BTreeMap::new();
        let mut pending = vec![(root, from_key)];

        while let Some((stream, key)) = pending.pop() {
            if lowest.get(stream.id()).is_some_and(|&covered| covered <= key) {
                continue;
            }
            lowest.insert(stream.id().clone(), key);
            pending.extend(self.coverage(stream, key).reaches);
        }

        lowest
    }
}

impl BasinNetwork {
    pub fn aggregate_drainage_area(&self, location_id: &CwmsId) -> Result<f64, QueryError> {
        let (stream, location) = self
            .location(location_id)
            .ok_or_else(|| QueryError::UnknownLocation(location_id.clone()))?;

        if let Some(total) = location.total_drainage_area() {
            return Ok(total);
        }

        let walk = DrainageWalk::new(self, stream);
        let lowest = walk.lowest_keys(stream, stream.upstream_key(location.station()));

        // Expand each stream once, from its lowest key. Streams seen only
        // from a higher key, above a gauge that now covers them, drop out.
        let mut counted = BTreeSet::new();
        let mut pending = vec![stream];
        let mut area = 0.0;
        let mut gauged = false;

        while let Some(current) = pending.pop() {
            let Some(&key) = lowest.get(current.id()) else {
                continue;
            };
            if !counted.insert(current.id().clone()) {
                continue;
            }
            let coverage = walk.coverage(current, key);
            if let Some(gauge_area) = coverage.gauge_area {
                area += gauge_area;
                gauged = true;
            }
            pending.extend(coverage.reaches.into_iter().map(|(s, _)| s));
        }

        if !gauged {
            return Err(QueryError::NoDrainageData {
                location: location_id.clone(),
            });
        }

        debug!(
            "aggregate drainage area at {}: {} over {} streams",
            location_id,
            area,
            counted.len()
        );
        Ok(area)
    }
}
