/// Position marker on a stream: which stream, how far along it, which bank.
///
/// The direction in which `station` increases belongs to the owning
/// stream (`Stream::starts_downstream`), not to the node.

use super::{Bank, CwmsId};

#[derive(Debug, Clone, PartialEq)]
pub struct StreamNode {
    stream_id: CwmsId,
    station: f64,
    bank: Bank,
    station_units: Option<String>,
}

impl StreamNode {
    pub fn new(stream_id: CwmsId, station: f64, bank: Bank) -> Self {
        Self {
            stream_id,
            station,
            bank,
            station_units: None,
        }
    }

    /// Attach a unit tag for the station value. Units are carried, never converted.
    pub fn with_station_units(mut self, units: impl Into<String>) -> Self {
        self.station_units = Some(units.into());
        self
    }

    pub fn stream_id(&self) -> &CwmsId {
        &self.stream_id
    }

    pub fn station(&self) -> f64 {
        self.station
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    pub fn station_units(&self) -> Option<&str> {
        self.station_units.as_deref()
    }
}
