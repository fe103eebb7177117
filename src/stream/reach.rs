/// A named segment of a stream bounded by two of its locations.
///
/// Endpoints are location names in the reach's office. The reach length
/// is derived from the endpoint stations (see `Stream::reach_length`).

use super::CwmsId;

#[derive(Debug, Clone, PartialEq)]
pub struct StreamReach {
    id: CwmsId,
    upstream_location_id: String,
    downstream_location_id: String,
    comment: Option<String>,
}

impl StreamReach {
    pub fn new(
        id: CwmsId,
        upstream_location_id: impl Into<String>,
        downstream_location_id: impl Into<String>,
    ) -> Self {
        Self {
            id,
            upstream_location_id: upstream_location_id.into(),
            downstream_location_id: downstream_location_id.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn id(&self) -> &CwmsId {
        &self.id
    }

    pub fn office_id(&self) -> &str {
        &self.id.office_id
    }

    pub fn upstream_location_id(&self) -> &str {
        &self.upstream_location_id
    }

    pub fn downstream_location_id(&self) -> &str {
        &self.downstream_location_id
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}
