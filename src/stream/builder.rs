//! Staged construction of `Stream`.
//!
//! Each stage is its own type, so a junction can only be supplied as a
//! complete, ordered triple: stream id, then station, then bank. Only the
//! `Ready` stage exposes the non-junction setters and `build()`.
//!
//! ```text
//!            with_diverting_stream_id          with_diversion_station          with_diversion_bank
//!   Ready ─────────────────────────▶ DiversionPending ──────────────▶ DiversionStationSet ─────────▶ Ready
//!   Ready ─────────────────────────▶ ConfluencePending ─────────────▶ ConfluenceStationSet ────────▶ Ready
//!            with_receiving_stream_id          with_confluence_station         with_confluence_bank
//! ```
//!
//! A half-specified junction does not compile:
//!
//! ```compile_fail
//! use basin_connectivity::stream::StreamBuilder;
//!
//! let stream = StreamBuilder::new("SWT", "Polecat Creek", false, Some(21.0))
//!     .with_receiving_stream_id("Arkansas River")
//!     .build();
//! ```
//!
//! Neither does starting the other chain before the first is finished:
//!
//! ```compile_fail
//! use basin_connectivity::stream::StreamBuilder;
//!
//! let builder = StreamBuilder::new("SWT", "Polecat Creek", false, Some(21.0))
//!     .with_diverting_stream_id("Arkansas River")
//!     .with_diversion_station(4.0)
//!     .with_receiving_stream_id("Arkansas River");
//! ```
//!
//! The complete form:
//!
//! ```
//! use basin_connectivity::stream::{Bank, StreamBuilder};
//!
//! let stream = StreamBuilder::new("SWT", "Polecat Creek", false, Some(21.0))
//!     .with_receiving_stream_id("Arkansas River")
//!     .with_confluence_station(512.3)
//!     .with_confluence_bank(Bank::Left)
//!     .with_comment("joins below Sand Springs")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(stream.receiving_stream_id(), Some("Arkansas River"));
//! assert_eq!(stream.confluence_bank(), Some(Bank::Left));
//! ```

use super::{Bank, CwmsId, Junction, JunctionKind, Stream, StreamLocation, StreamReach};
use crate::error::StreamError;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// No junction in progress; every setter and `build()` is available.
#[derive(Debug, Clone)]
pub struct Ready;

/// Diverting stream named; the diversion station must come next.
#[derive(Debug, Clone)]
pub struct DiversionPending {
    stream_id: String,
}

/// Diversion station given; the diversion bank must come next.
#[derive(Debug, Clone)]
pub struct DiversionStationSet {
    stream_id: String,
    station: f64,
}

/// Receiving stream named; the confluence station must come next.
#[derive(Debug, Clone)]
pub struct ConfluencePending {
    stream_id: String,
}

/// Confluence station given; the confluence bank must come next.
#[derive(Debug, Clone)]
pub struct ConfluenceStationSet {
    stream_id: String,
    station: f64,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StreamBuilder<S = Ready> {
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
    stage: S,
}

impl<S> StreamBuilder<S> {
    fn into_stage<T>(self, stage: T) -> StreamBuilder<T> {
        StreamBuilder {
            id: self.id,
            length: self.length,
            starts_downstream: self.starts_downstream,
            diversion: self.diversion,
            confluence: self.confluence,
            tributaries: self.tributaries,
            reaches: self.reaches,
            locations: self.locations,
            comment: self.comment,
            average_slope: self.average_slope,
            stage,
        }
    }
}

impl StreamBuilder<Ready> {
    pub fn new(
        office_id: impl Into<String>,
        stream_id: impl Into<String>,
        starts_downstream: bool,
        length: Option<f64>,
    ) -> Self {
        Self {
            id: CwmsId::new(office_id, stream_id),
            length,
            starts_downstream,
            diversion: None,
            confluence: None,
            tributaries: Vec::new(),
            reaches: Vec::new(),
            locations: Vec::new(),
            comment: None,
            average_slope: None,
            stage: Ready,
        }
    }

    /// Start the diversion junction: the stream this one flows from.
    pub fn with_diverting_stream_id(
        self,
        diverting_stream_id: impl Into<String>,
    ) -> StreamBuilder<DiversionPending> {
        self.into_stage(DiversionPending {
            stream_id: diverting_stream_id.into(),
        })
    }

    /// Start the confluence junction: the stream this one flows into.
    pub fn with_receiving_stream_id(
        self,
        receiving_stream_id: impl Into<String>,
    ) -> StreamBuilder<ConfluencePending> {
        self.into_stage(ConfluencePending {
            stream_id: receiving_stream_id.into(),
        })
    }

    pub fn with_tributaries<I, T>(mut self, tributaries: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tributaries = tributaries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reaches(mut self, reaches: impl IntoIterator<Item = StreamReach>) -> Self {
        self.reaches = reaches.into_iter().collect();
        self
    }

    pub fn with_locations(mut self, locations: impl IntoIterator<Item = StreamLocation>) -> Self {
        self.locations = locations.into_iter().collect();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_average_slope(mut self, average_slope: f64) -> Self {
        self.average_slope = Some(average_slope);
        self
    }

    pub fn build(self) -> Result<Stream, StreamError> {
        for (junction, kind) in [
            (&self.diversion, JunctionKind::Diversion),
            (&self.confluence, JunctionKind::Confluence),
        ] {
            if junction.as_ref().is_some_and(|j| j.stream_id == self.id.name) {
                return Err(StreamError::SelfJunction {
                    stream: self.id.clone(),
                    kind,
                });
            }
        }

        Ok(Stream {
            id: self.id,
            length: self.length,
            starts_downstream: self.starts_downstream,
            diversion: self.diversion,
            confluence: self.confluence,
            tributaries: self.tributaries,
            reaches: self.reaches,
            locations: self.locations,
            comment: self.comment,
            average_slope: self.average_slope,
        })
    }
}

impl StreamBuilder<DiversionPending> {
    pub fn with_diversion_station(self, station: f64) -> StreamBuilder<DiversionStationSet> {
        let stream_id = self.stage.stream_id.clone();
        self.into_stage(DiversionStationSet { stream_id, station })
    }
}

impl StreamBuilder<DiversionStationSet> {
    pub fn with_diversion_bank(self, bank: Bank) -> StreamBuilder<Ready> {
        let DiversionStationSet { stream_id, station } = self.stage.clone();
        let mut builder = self.into_stage(Ready);
        builder.diversion = Some(Junction {
            stream_id,
            station,
            bank,
        });
        builder
    }
}

impl StreamBuilder<ConfluencePending> {
    pub fn with_confluence_station(self, station: f64) -> StreamBuilder<ConfluenceStationSet> {
        let stream_id = self.stage.stream_id.clone();
        self.into_stage(ConfluenceStationSet { stream_id, station })
    }
}

impl StreamBuilder<ConfluenceStationSet> {
    pub fn with_confluence_bank(self, bank: Bank) -> StreamBuilder<Ready> {
        let ConfluenceStationSet { stream_id, station } = self.stage.clone();
        let mut builder = self.into_stage(Ready);
        builder.confluence = Some(Junction {
            stream_id,
            station,
            bank,
        });
        builder
    }
}

/// Seeds a builder with every field of an existing stream, including its
/// completed junctions, so it can be rebuilt with changes.
impl From<&Stream> for StreamBuilder<Ready> {
    fn from(stream: &Stream) -> Self {
        Self {
            id: stream.id.clone(),
            length: stream.length,
            starts_downstream: stream.starts_downstream,
            diversion: stream.diversion.clone(),
            confluence: stream.confluence.clone(),
            tributaries: stream.tributaries.clone(),
            reaches: stream.reaches.clone(),
            locations: stream.locations.clone(),
            comment: stream.comment.clone(),
            average_slope: stream.average_slope,
            stage: Ready,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
