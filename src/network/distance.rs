/// Cumulative distance from the network outlet.
///
/// Walks the chain of receiving streams from a stream to the terminal
/// stream. At each junction the confluence station is converted to a
/// distance above the receiving stream's mouth using that stream's
/// direction convention (see `Stream::distance_to_mouth`).
///
/// Every traversed stream must have an effective length (its recorded
/// length or its reach span); otherwise the distance is undefined.

use super::BasinNetwork;
use crate::error::QueryError;
use crate::stream::{CwmsId, Stream};

fn require_length(stream: &Stream) -> Result<f64, QueryError> {
    stream.effective_length().ok_or_else(|| QueryError::MissingLength {
        stream: stream.id().clone(),
    })
}

impl BasinNetwork {
    /// Distance from the stream's mouth down to the network outlet.
    pub fn stream_mouth_distance(&self, stream_id: &CwmsId) -> Result<f64, QueryError> {
        let mut current = self
            .stream(stream_id)
            .ok_or_else(|| QueryError::UnknownStream(stream_id.clone()))?;
        let mut distance = 0.0;

        loop {
            require_length(current)?;

            let Some(confluence) = current.confluence() else {
                return Ok(distance);
            };
            // Resolution guarantees the receiving stream exists.
            let receiving = self
                .receiving_stream(current)
                .ok_or_else(|| QueryError::UnknownStream(current.id().sibling(&confluence.stream_id)))?;

            require_length(receiving)?;
            distance += receiving
                .distance_to_mouth(confluence.station)
                .ok_or_else(|| QueryError::MissingLength {
                    stream: receiving.id().clone(),
                })?;
            current = receiving;
        }
    }

    /// Distance from a location down to the network outlet.
    pub fn cumulative_distance(&self, location_id: &CwmsId) -> Result<f64, QueryError> {
        let (stream, location) = self
            .location(location_id)
            .ok_or_else(|| QueryError::UnknownLocation(location_id.clone()))?;

        require_length(stream)?;
        let to_mouth = stream
            .distance_to_mouth(location.station())
            .ok_or_else(|| QueryError::MissingLength {
                stream: stream.id().clone(),
            })?;

        Ok(to_mouth + self.stream_mouth_distance(stream.id())?)
    }
}
