/// Basin network: a resolved, read-only graph over a set of streams.
///
/// Streams reference each other only by name. `resolve` indexes them by
/// `(office, stream)`, validates every reference, rejects junction cycles
/// and checks tributary lists, then materializes the edge index used by
/// the queries in `distance`, `upstream` and `drainage`.
///
/// A network is never updated in place. When the stream set changes,
/// resolve a new one and swap it in; readers holding the old network keep
/// a consistent view.

pub mod distance;
pub mod drainage;
pub mod upstream;
mod validate;

use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc;

use log::{debug, warn};
use threadpool::ThreadPool;

use crate::error::NetworkError;
use crate::stream::{CwmsId, Stream, StreamLocation};

pub use upstream::UpstreamEntry;

#[derive(Debug, Clone)]
pub struct BasinNetwork {
    streams: BTreeMap<CwmsId, Stream>,
    /// Location id to the id of the stream carrying it.
    locations: BTreeMap<CwmsId, CwmsId>,
    /// Receiving stream to the streams flowing into it.
    confluence_tributaries: HashMap<CwmsId, Vec<CwmsId>>,
    /// Parent stream to the streams diverting from it.
    diversions: HashMap<CwmsId, Vec<CwmsId>>,
}

/// Resolves a flat set of streams into a network, or reports the first
/// problem found. Nothing partially linked is ever returned.
pub fn resolve(streams: impl IntoIterator<Item = Stream>) -> Result<BasinNetwork, NetworkError> {
    let streams = validate::index_streams(streams)?;
    let locations = validate::index_locations(&streams)?;
    validate::check_reaches(&streams)?;
    validate::check_references(&streams)?;
    validate::detect_cycles(&streams)?;
    validate::check_tributaries(&streams)?;
    validate::warn_inconsistent_drainage(&streams);

    let mut confluence_tributaries: HashMap<CwmsId, Vec<CwmsId>> = HashMap::new();
    let mut diversions: HashMap<CwmsId, Vec<CwmsId>> = HashMap::new();

    for stream in streams.values() {
        if let Some(receiving) = stream.receiving_stream_id() {
            confluence_tributaries
                .entry(stream.id().sibling(receiving))
                .or_default()
                .push(stream.id().clone());
        }
        if let Some(diverting) = stream.diverting_stream_id() {
            diversions
                .entry(stream.id().sibling(diverting))
                .or_default()
                .push(stream.id().clone());
        }
    }

    debug!(
        "resolved basin network: {} streams, {} locations",
        streams.len(),
        locations.len()
    );

    Ok(BasinNetwork {
        streams,
        locations,
        confluence_tributaries,
        diversions,
    })
}

/// Resolves each office's streams as an independent network on a thread
/// pool. A failure in one office does not affect the others.
pub fn resolve_by_office(
    streams: impl IntoIterator<Item = Stream>,
    workers: usize,
) -> BTreeMap<String, Result<BasinNetwork, NetworkError>> {
    let mut by_office: BTreeMap<String, Vec<Stream>> = BTreeMap::new();
    for stream in streams {
        by_office
            .entry(stream.office_id().to_string())
            .or_default()
            .push(stream);
    }

    let pool = ThreadPool::new(workers.max(1));
    let (tx, rx) = mpsc::channel();
    let office_count = by_office.len();

    for (office, office_streams) in by_office {
        let tx = tx.clone();
        pool.execute(move || {
            let result = resolve(office_streams);
            if let Err(e) = &result {
                warn!("office {} network rejected: {}", office, e);
            }
            // The receiver outlives every job; a send failure means the
            // caller is gone and the result is no longer wanted.
            let _ = tx.send((office, result));
        });
    }
    drop(tx);

    let results: BTreeMap<_, _> = rx.iter().take(office_count).collect();
    pool.join();
    results
}

impl BasinNetwork {
    pub fn stream(&self, id: &CwmsId) -> Option<&Stream> {
        self.streams.get(id)
    }

    /// All streams, ordered by id.
    pub fn streams(&self) -> impl Iterator<Item = &Stream> {
        self.streams.values()
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// A location together with the stream it sits on.
    pub fn location(&self, id: &CwmsId) -> Option<(&Stream, &StreamLocation)> {
        let stream = self.streams.get(self.locations.get(id)?)?;
        let location = stream.locations().iter().find(|l| l.id() == id)?;
        Some((stream, location))
    }

    /// Streams whose confluence junction joins `id`.
    pub fn confluence_tributaries_of(&self, id: &CwmsId) -> &[CwmsId] {
        self.confluence_tributaries
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Streams whose diversion junction splits off `id`.
    pub fn diversions_from(&self, id: &CwmsId) -> &[CwmsId] {
        self.diversions.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn receiving_stream(&self, stream: &Stream) -> Option<&Stream> {
        let name = stream.receiving_stream_id()?;
        self.streams.get(&stream.id().sibling(name))
    }

    pub fn diverting_stream(&self, stream: &Stream) -> Option<&Stream> {
        let name = stream.diverting_stream_id()?;
        self.streams.get(&stream.id().sibling(name))
    }

    /// Streams that do not flow into any other stream.
    pub fn outlets(&self) -> impl Iterator<Item = &Stream> {
        self.streams
            .values()
            .filter(|s| s.receiving_stream_id().is_none())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
