/// Named point features anchored to a stream node.
///
/// `StreamLocation` forwards station, bank and stream id to its node so
/// callers never need to reach through it; the node remains the single
/// source of truth for position.

use super::{Bank, CwmsId, StreamNode};
use crate::error::StreamError;

#[derive(Debug, Clone, PartialEq)]
pub struct StreamLocation {
    id: CwmsId,
    stream_node: StreamNode,
    published_station: Option<f64>,
    navigation_station: Option<f64>,
    lowest_measurable_stage: Option<f64>,
    total_drainage_area: Option<f64>,
    ungaged_drainage_area: Option<f64>,
    area_units: Option<String>,
    stage_units: Option<String>,
}

impl StreamLocation {
    pub fn builder() -> StreamLocationBuilder {
        StreamLocationBuilder::default()
    }

    pub fn id(&self) -> &CwmsId {
        &self.id
    }

    pub fn stream_node(&self) -> &StreamNode {
        &self.stream_node
    }

    pub fn station(&self) -> f64 {
        self.stream_node.station()
    }

    pub fn bank(&self) -> Bank {
        self.stream_node.bank()
    }

    pub fn stream_id(&self) -> &CwmsId {
        self.stream_node.stream_id()
    }

    pub fn station_units(&self) -> Option<&str> {
        self.stream_node.station_units()
    }

    pub fn published_station(&self) -> Option<f64> {
        self.published_station
    }

    pub fn navigation_station(&self) -> Option<f64> {
        self.navigation_station
    }

    pub fn lowest_measurable_stage(&self) -> Option<f64> {
        self.lowest_measurable_stage
    }

    pub fn total_drainage_area(&self) -> Option<f64> {
        self.total_drainage_area
    }

    pub fn ungaged_drainage_area(&self) -> Option<f64> {
        self.ungaged_drainage_area
    }

    pub fn area_units(&self) -> Option<&str> {
        self.area_units.as_deref()
    }

    pub fn stage_units(&self) -> Option<&str> {
        self.stage_units.as_deref()
    }

    /// `total >= ungaged >= 0` for whichever of the two are present.
    pub fn has_consistent_drainage(&self) -> bool {
        let total_ok = self.total_drainage_area.is_none_or(|t| t >= 0.0);
        let ungaged_ok = self.ungaged_drainage_area.is_none_or(|u| u >= 0.0);
        let ordered = match (self.total_drainage_area, self.ungaged_drainage_area) {
            (Some(total), Some(ungaged)) => total >= ungaged,
            _ => true,
        };
        total_ok && ungaged_ok && ordered
    }
}

/// Builder for `StreamLocation`. `id` and `stream_node` are mandatory.
#[derive(Debug, Clone, Default)]
pub struct StreamLocationBuilder {
    id: Option<CwmsId>,
    stream_node: Option<StreamNode>,
    published_station: Option<f64>,
    navigation_station: Option<f64>,
    lowest_measurable_stage: Option<f64>,
    total_drainage_area: Option<f64>,
    ungaged_drainage_area: Option<f64>,
    area_units: Option<String>,
    stage_units: Option<String>,
}

impl StreamLocationBuilder {
    pub fn with_id(mut self, id: CwmsId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_stream_node(mut self, stream_node: StreamNode) -> Self {
        self.stream_node = Some(stream_node);
        self
    }

    pub fn with_published_station(mut self, station: Option<f64>) -> Self {
        self.published_station = station;
        self
    }

    pub fn with_navigation_station(mut self, station: Option<f64>) -> Self {
        self.navigation_station = station;
        self
    }

    pub fn with_lowest_measurable_stage(mut self, stage: Option<f64>) -> Self {
        self.lowest_measurable_stage = stage;
        self
    }

    pub fn with_total_drainage_area(mut self, area: Option<f64>) -> Self {
        self.total_drainage_area = area;
        self
    }

    pub fn with_ungaged_drainage_area(mut self, area: Option<f64>) -> Self {
        self.ungaged_drainage_area = area;
        self
    }

    pub fn with_area_units(mut self, units: Option<String>) -> Self {
        self.area_units = units;
        self
    }

    pub fn with_stage_units(mut self, units: Option<String>) -> Self {
        self.stage_units = units;
        self
    }

    pub fn build(self) -> Result<StreamLocation, StreamError> {
        let id = self.id.ok_or(StreamError::MissingField {
            entity: "StreamLocation",
            field: "id",
        })?;
        if id.office_id.is_empty() {
            return Err(StreamError::MissingField {
                entity: "StreamLocation",
                field: "id.officeId",
            });
        }
        if id.name.is_empty() {
            return Err(StreamError::MissingField {
                entity: "StreamLocation",
                field: "id.name",
            });
        }
        let stream_node = self.stream_node.ok_or(StreamError::MissingField {
            entity: "StreamLocation",
            field: "streamNode",
        })?;

        Ok(StreamLocation {
            id,
            stream_node,
            published_station: self.published_station,
            navigation_station: self.navigation_station,
            lowest_measurable_stage: self.lowest_measurable_stage,
            total_drainage_area: self.total_drainage_area,
            ungaged_drainage_area: self.ungaged_drainage_area,
            area_units: self.area_units,
            stage_units: self.stage_units,
        })
    }
}
