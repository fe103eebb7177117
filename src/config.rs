/// Basin definition loader - parses basin.toml
///
/// Keeps stream, junction and location metadata out of code so a basin
/// can be redrawn (new gauges, corrected stations, another office's
/// streams) without recompiling. Every stream goes through the staged
/// builder, so a junction missing its station or bank is rejected by the
/// parser rather than producing a half-linked stream.
///
/// # File layout
///
/// ```toml
/// [[stream]]
/// office = "MVR"
/// id = "Mackinaw River"
/// starts_downstream = false
/// length = 130.0
///
/// [stream.confluence]
/// stream = "Illinois River"
/// station = 147.8
/// bank = "L"
///
/// [[stream.location]]
/// name = "Green Valley"
/// station = 15.8
/// bank = "R"
/// total_drainage_area = 1073.0
/// ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, StreamError};
use crate::stream::{Bank, CwmsId, Stream, StreamBuilder, StreamLocation, StreamNode, StreamReach};

// ---------------------------------------------------------------------------
// TOML Configuration Structures
// ---------------------------------------------------------------------------

/// Root of basin.toml
#[derive(Debug, Deserialize)]
struct BasinFile {
    #[serde(default)]
    stream: Vec<StreamConfig>,
}

/// One stream and everything positioned along it
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    pub office: String,
    pub id: String,
    #[serde(default)]
    pub starts_downstream: bool,
    pub length: Option<f64>,
    pub comment: Option<String>,
    pub average_slope: Option<f64>,
    #[serde(default)]
    pub tributaries: Vec<String>,
    pub diversion: Option<JunctionConfig>,
    pub confluence: Option<JunctionConfig>,
    #[serde(default, rename = "location")]
    pub locations: Vec<LocationConfig>,
    #[serde(default, rename = "reach")]
    pub reaches: Vec<ReachConfig>,
}

/// A junction is all three fields or absent; serde enforces that here.
#[derive(Debug, Clone, Deserialize)]
pub struct JunctionConfig {
    pub stream: String,
    pub station: f64,
    pub bank: Bank,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    pub name: String,
    pub station: f64,
    pub bank: Bank,
    pub station_units: Option<String>,
    pub published_station: Option<f64>,
    pub navigation_station: Option<f64>,
    pub lowest_measurable_stage: Option<f64>,
    pub total_drainage_area: Option<f64>,
    pub ungaged_drainage_area: Option<f64>,
    pub area_units: Option<String>,
    pub stage_units: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReachConfig {
    pub name: String,
    pub upstream: String,
    pub downstream: String,
    pub comment: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversion to the entity model
// ---------------------------------------------------------------------------

impl LocationConfig {
    fn into_location(self, stream_id: &CwmsId) -> Result<StreamLocation, StreamError> {
        let mut node = StreamNode::new(stream_id.clone(), self.station, self.bank);
        if let Some(units) = self.station_units {
            node = node.with_station_units(units);
        }

        StreamLocation::builder()
            .with_id(stream_id.sibling(self.name))
            .with_stream_node(node)
            .with_published_station(self.published_station)
            .with_navigation_station(self.navigation_station)
            .with_lowest_measurable_stage(self.lowest_measurable_stage)
            .with_total_drainage_area(self.total_drainage_area)
            .with_ungaged_drainage_area(self.ungaged_drainage_area)
            .with_area_units(self.area_units)
            .with_stage_units(self.stage_units)
            .build()
    }
}

impl StreamConfig {
    /// Builds the stream through the staged builder.
    pub fn into_stream(self) -> Result<Stream, StreamError> {
        let stream_id = CwmsId::new(self.office.clone(), self.id.clone());

        let locations = self
            .locations
            .into_iter()
            .map(|l| l.into_location(&stream_id))
            .collect::<Result<Vec<_>, _>>()?;

        let reaches = self.reaches.into_iter().map(|r| {
            let reach = StreamReach::new(stream_id.sibling(r.name), r.upstream, r.downstream);
            match r.comment {
                Some(comment) => reach.with_comment(comment),
                None => reach,
            }
        });

        let mut builder = StreamBuilder::new(self.office, self.id, self.starts_downstream, self.length)
            .with_tributaries(self.tributaries)
            .with_locations(locations)
            .with_reaches(reaches);

        if let Some(j) = self.diversion {
            builder = builder
                .with_diverting_stream_id(j.stream)
                .with_diversion_station(j.station)
                .with_diversion_bank(j.bank);
        }
        if let Some(j) = self.confluence {
            builder = builder
                .with_receiving_stream_id(j.stream)
                .with_confluence_station(j.station)
                .with_confluence_bank(j.bank);
        }
        if let Some(comment) = self.comment {
            builder = builder.with_comment(comment);
        }
        if let Some(slope) = self.average_slope {
            builder = builder.with_average_slope(slope);
        }

        builder.build()
    }
}

// ---------------------------------------------------------------------------
// Loading Functions
// ---------------------------------------------------------------------------

/// Parse a basin definition from TOML text.
pub fn load_basin_str(contents: &str) -> Result<Vec<Stream>, ConfigError> {
    let file: BasinFile = toml::from_str(contents)?;

    file.stream
        .into_iter()
        .map(|config| {
            let name = format!("{}/{}", config.office, config.id);
            config
                .into_stream()
                .map_err(|source| ConfigError::Stream { stream: name, source })
        })
        .collect()
}

/// Load a basin definition file.
pub fn load_basin<P: AsRef<Path>>(path: P) -> Result<Vec<Stream>, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_basin_str(&contents)
}

/// Load from the default location (basin.toml in the working directory).
pub fn load_basin_default() -> Result<Vec<Stream>, ConfigError> {
    load_basin("basin.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
