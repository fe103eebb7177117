/// Error types for stream construction, network resolution and queries.
///
/// Construction errors are reported by `build()`, network errors by
/// `network::resolve`, and query errors stand in for an "undefined"
/// answer so a missing measurement is never mistaken for zero.

use crate::stream::{CwmsId, JunctionKind};

/// Errors raised while constructing a single stream or location.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    /// A mandatory field was never supplied.
    #[error("the '{field}' field of a {entity} cannot be empty")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    /// The stream names itself as its diverting or receiving stream.
    #[error("stream {stream} cannot use itself as its {kind} stream")]
    SelfJunction { stream: CwmsId, kind: JunctionKind },

    /// A bank string was neither left nor right.
    #[error("invalid bank '{0}', expected L, LEFT, R or RIGHT")]
    InvalidBank(String),
}

/// Which kind of reference was left dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Diversion,
    Confluence,
    Tributary,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Diversion => write!(f, "diverting stream"),
            ReferenceKind::Confluence => write!(f, "receiving stream"),
            ReferenceKind::Tributary => write!(f, "tributary"),
        }
    }
}

/// Errors that prevent a set of streams from resolving into a network.
///
/// Resolution is all-or-nothing: any of these means no network was built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("stream {0} appears more than once")]
    DuplicateStream(CwmsId),

    #[error("location {location} is listed on both {first} and {second}")]
    DuplicateLocation {
        location: CwmsId,
        first: CwmsId,
        second: CwmsId,
    },

    /// A location's node places it on a different stream than the one listing it.
    #[error("location {location} is listed on {listed_on} but its node is on {node_stream}")]
    MisplacedLocation {
        location: CwmsId,
        listed_on: CwmsId,
        node_stream: CwmsId,
    },

    #[error("reach {reach} on {stream} references location '{location}' which is not on that stream")]
    ReachOffStream {
        reach: CwmsId,
        stream: CwmsId,
        location: String,
    },

    #[error("{from} references unknown {kind} '{missing}'")]
    DanglingReference {
        from: CwmsId,
        missing: String,
        kind: ReferenceKind,
    },

    /// Stream names are listed in traversal order, starting at the first
    /// stream revisited.
    #[error("junction cycle in office {office}: {}", streams.join(" -> "))]
    CycleDetected { office: String, streams: Vec<String> },

    #[error("{parent} lists {tributary} as a tributary but neither of its junctions points back")]
    InconsistentTributary { parent: CwmsId, tributary: CwmsId },
}

/// A query whose answer is undefined for the given network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown location {0}")]
    UnknownLocation(CwmsId),

    #[error("unknown stream {0}")]
    UnknownStream(CwmsId),

    /// A traversed stream has neither a length nor reaches to measure.
    #[error("distance undefined: stream {stream} has no length and no reach data")]
    MissingLength { stream: CwmsId },

    #[error("drainage area undefined: no drainage data at or upstream of {location}")]
    NoDrainageData { location: CwmsId },
}

/// Errors loading a basin definition file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse basin definition: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid stream '{stream}': {source}")]
    Stream {
        stream: String,
        #[source]
        source: StreamError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_streams_in_order() {
        let err = NetworkError::CycleDetected {
            office: "SWT".to_string(),
            streams: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(err.to_string(), "junction cycle in office SWT: A -> B");
    }

    #[test]
    fn test_dangling_reference_message_names_kind() {
        let err = NetworkError::DanglingReference {
            from: CwmsId::new("SWT", "Verdigris River"),
            missing: "Nowhere Creek".to_string(),
            kind: ReferenceKind::Confluence,
        };
        let message = err.to_string();
        assert!(message.contains("receiving stream"), "got: {}", message);
        assert!(message.contains("Nowhere Creek"), "got: {}", message);
    }
}
