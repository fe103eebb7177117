/// Stream entity model.
///
/// A `Stream` is the aggregate: identity, length, direction convention,
/// up to two junctions (where it diverts from a parent and where it flows
/// into a receiving stream), and the locations and reaches positioned
/// along it. Streams are only produced by `StreamBuilder` and never change
/// after construction; to alter one, seed a new builder from it.

pub mod builder;
pub mod location;
pub mod node;
pub mod reach;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StreamError;

pub use builder::{
    ConfluencePending, ConfluenceStationSet, DiversionPending, DiversionStationSet, Ready,
    StreamBuilder,
};
pub use location::{StreamLocation, StreamLocationBuilder};
pub use node::StreamNode;
pub use reach::StreamReach;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Office-scoped identifier, e.g. `MVR` / `Illinois River`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CwmsId {
    pub office_id: String,
    pub name: String,
}

impl CwmsId {
    pub fn new(office_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            office_id: office_id.into(),
            name: name.into(),
        }
    }

    /// Another identifier in the same office.
    pub fn sibling(&self, name: impl Into<String>) -> Self {
        CwmsId::new(self.office_id.clone(), name)
    }
}

impl fmt::Display for CwmsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.office_id, self.name)
    }
}

/// Side of the channel, independent of flow direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Bank {
    Left,
    Right,
}

impl FromStr for Bank {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LEFT" => Ok(Bank::Left),
            "R" | "RIGHT" => Ok(Bank::Right),
            _ => Err(StreamError::InvalidBank(s.to_string())),
        }
    }
}

impl TryFrom<String> for Bank {
    type Error = StreamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Bank> for String {
    fn from(bank: Bank) -> Self {
        bank.to_string()
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bank::Left => write!(f, "L"),
            Bank::Right => write!(f, "R"),
        }
    }
}

/// Which end of a stream a junction sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JunctionKind {
    /// The stream splits off a parent stream here.
    Diversion,
    /// The stream joins its receiving stream here.
    Confluence,
}

impl fmt::Display for JunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JunctionKind::Diversion => write!(f, "diverting"),
            JunctionKind::Confluence => write!(f, "receiving"),
        }
    }
}

/// A complete junction: the other stream, the station on that stream
/// where the junction lies, and the bank it attaches to.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub stream_id: String,
    pub station: f64,
    pub bank: Bank,
}

// ---------------------------------------------------------------------------
// Stream
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    id: CwmsId,
    length: Option<f64>,
    starts_downstream: bool,
    diversion: Option<Junction>,
    confluence: Option<Junction>,
    tributaries: Vec<String>,
    reaches: Vec<StreamReach>,
    locations: Vec<StreamLocation>,
    comment: Option<String>,
    average_slope: Option<f64>,
}

impl Stream {
    pub fn id(&self) -> &CwmsId {
        &self.id
    }

    pub fn office_id(&self) -> &str {
        &self.id.office_id
    }

    pub fn stream_id(&self) -> &str {
        &self.id.name
    }

    pub fn length(&self) -> Option<f64> {
        self.length
    }

    /// True when stations are measured from the upstream head, increasing
    /// downstream; false when measured from the mouth, increasing upstream.
    pub fn starts_downstream(&self) -> bool {
        self.starts_downstream
    }

    pub fn diversion(&self) -> Option<&Junction> {
        self.diversion.as_ref()
    }

    pub fn confluence(&self) -> Option<&Junction> {
        self.confluence.as_ref()
    }

    /// The stream this one flows from.
    pub fn diverting_stream_id(&self) -> Option<&str> {
        self.diversion.as_ref().map(|j| j.stream_id.as_str())
    }

    pub fn diversion_station(&self) -> Option<f64> {
        self.diversion.as_ref().map(|j| j.station)
    }

    pub fn diversion_bank(&self) -> Option<Bank> {
        self.diversion.as_ref().map(|j| j.bank)
    }

    /// The stream this one flows into.
    pub fn receiving_stream_id(&self) -> Option<&str> {
        self.confluence.as_ref().map(|j| j.stream_id.as_str())
    }

    pub fn confluence_station(&self) -> Option<f64> {
        self.confluence.as_ref().map(|j| j.station)
    }

    pub fn confluence_bank(&self) -> Option<Bank> {
        self.confluence.as_ref().map(|j| j.bank)
    }

    /// Names of the streams listed as tributaries, in the same office.
    pub fn tributaries(&self) -> &[String] {
        &self.tributaries
    }

    pub fn reaches(&self) -> &[StreamReach] {
        &self.reaches
    }

    pub fn locations(&self) -> &[StreamLocation] {
        &self.locations
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn average_slope(&self) -> Option<f64> {
        self.average_slope
    }

    /// Seed a new builder from this stream, starting in the `Ready` state.
    pub fn to_builder(&self) -> StreamBuilder<Ready> {
        StreamBuilder::from(self)
    }

    /// Looks up one of this stream's own locations by name.
    pub fn find_location(&self, name: &str) -> Option<&StreamLocation> {
        self.locations.iter().find(|l| l.id().name == name)
    }

    /// Length of a reach from its endpoint stations, or `None` when either
    /// endpoint is not one of this stream's locations.
    pub fn reach_length(&self, reach: &StreamReach) -> Option<f64> {
        let upstream = self.find_location(reach.upstream_location_id())?;
        let downstream = self.find_location(reach.downstream_location_id())?;
        Some((downstream.station() - upstream.station()).abs())
    }

    /// Extent covered by the reaches whose endpoints resolve on this stream.
    pub fn reach_span(&self) -> Option<f64> {
        let stations: Vec<f64> = self
            .reaches
            .iter()
            .flat_map(|r| [r.upstream_location_id(), r.downstream_location_id()])
            .filter_map(|name| self.find_location(name))
            .map(|l| l.station())
            .collect();

        let min = stations.iter().copied().reduce(f64::min)?;
        let max = stations.iter().copied().reduce(f64::max)?;
        Some(max - min)
    }

    /// The recorded length, falling back to the reach span.
    pub fn effective_length(&self) -> Option<f64> {
        self.length.or_else(|| self.reach_span())
    }

    /// Ordering key along the stream: a larger key is further upstream.
    pub fn upstream_key(&self, station: f64) -> f64 {
        if self.starts_downstream { -station } else { station }
    }

    /// Distance from `station` down to this stream's mouth.
    ///
    /// Needs the effective length only when stations run downstream.
    pub fn distance_to_mouth(&self, station: f64) -> Option<f64> {
        if self.starts_downstream {
            self.effective_length().map(|length| length - station)
        } else {
            Some(station)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn location(stream: &str, name: &str, station: f64) -> StreamLocation {
        StreamLocation::builder()
            .with_id(CwmsId::new("SWT", name))
            .with_stream_node(StreamNode::new(CwmsId::new("SWT", stream), station, Bank::Left))
            .build()
            .expect("location should build")
    }

    fn reach(name: &str, upstream: &str, downstream: &str) -> StreamReach {
        StreamReach::new(CwmsId::new("SWT", name), upstream, downstream)
    }

    #[test]
    fn test_bank_parses_long_and_short_forms() {
        assert_eq!("L".parse::<Bank>(), Ok(Bank::Left));
        assert_eq!("left".parse::<Bank>(), Ok(Bank::Left));
        assert_eq!(" RIGHT ".parse::<Bank>(), Ok(Bank::Right));
        assert_eq!(
            "middle".parse::<Bank>(),
            Err(StreamError::InvalidBank("middle".to_string()))
        );
    }

    #[test]
    fn test_cwms_id_display_includes_office() {
        assert_eq!(CwmsId::new("MVR", "Illinois River").to_string(), "MVR/Illinois River");
    }

    #[test]
    fn test_reach_length_uses_absolute_station_difference() {
        let stream = StreamBuilder::new("SWT", "Arkansas River", true, Some(100.0))
            .with_locations(vec![
                location("Arkansas River", "Keystone", 40.0),
                location("Arkansas River", "Tulsa", 55.5),
            ])
            .build()
            .expect("stream should build");

        let r = reach("Keystone-Tulsa", "Keystone", "Tulsa");
        let length = stream.reach_length(&r).expect("both endpoints are on the stream");
        assert!((length - 15.5).abs() < 1e-9);

        let reversed = reach("Tulsa-Keystone", "Tulsa", "Keystone");
        assert!((stream.reach_length(&reversed).unwrap() - 15.5).abs() < 1e-9);
    }

    #[test]
    fn test_reach_length_none_when_endpoint_missing() {
        let stream = StreamBuilder::new("SWT", "Arkansas River", true, Some(100.0))
            .with_locations(vec![location("Arkansas River", "Keystone", 40.0)])
            .build()
            .unwrap();
        assert!(stream.reach_length(&reach("R", "Keystone", "Muskogee")).is_none());
    }

    #[test]
    fn test_effective_length_falls_back_to_reach_span() {
        let stream = StreamBuilder::new("SWT", "Bird Creek", false, None)
            .with_locations(vec![
                location("Bird Creek", "Owasso", 12.0),
                location("Bird Creek", "Sperry", 30.0),
                location("Bird Creek", "Avant", 51.0),
            ])
            .with_reaches(vec![
                reach("Lower", "Sperry", "Owasso"),
                reach("Upper", "Avant", "Sperry"),
            ])
            .build()
            .unwrap();

        assert_eq!(stream.length(), None);
        let span = stream.effective_length().expect("reach span should substitute");
        assert!((span - 39.0).abs() < 1e-9, "span should be 51 - 12, got {}", span);
    }

    #[test]
    fn test_effective_length_none_without_length_or_reaches() {
        let stream = StreamBuilder::new("SWT", "Bird Creek", false, None).build().unwrap();
        assert!(stream.effective_length().is_none());
    }

    #[test]
    fn test_distance_to_mouth_follows_direction_convention() {
        let downstream_running = StreamBuilder::new("SWT", "A", true, Some(10.0)).build().unwrap();
        assert!((downstream_running.distance_to_mouth(8.0).unwrap() - 2.0).abs() < 1e-9);

        let upstream_running = StreamBuilder::new("SWT", "B", false, None).build().unwrap();
        assert!((upstream_running.distance_to_mouth(8.0).unwrap() - 8.0).abs() < 1e-9);

        let unknown_length = StreamBuilder::new("SWT", "C", true, None).build().unwrap();
        assert!(unknown_length.distance_to_mouth(8.0).is_none());
    }

    #[test]
    fn test_upstream_key_orders_by_direction() {
        let head_origin = StreamBuilder::new("SWT", "A", true, Some(10.0)).build().unwrap();
        assert!(head_origin.upstream_key(2.0) > head_origin.upstream_key(8.0));

        let mouth_origin = StreamBuilder::new("SWT", "B", false, Some(10.0)).build().unwrap();
        assert!(mouth_origin.upstream_key(8.0) > mouth_origin.upstream_key(2.0));
    }
}
