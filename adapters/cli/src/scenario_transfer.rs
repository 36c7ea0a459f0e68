#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use skirmish_core::{Scenario, ScenarioError};

const TRANSFER_DOMAIN: &str = "skirmish";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded scenario payload.
pub(crate) const TRANSFER_HEADER: &str = "skirmish:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Reports whether the input looks like a transfer string rather than a path.
pub(crate) fn is_transfer_string(value: &str) -> bool {
    value.trim_start().starts_with(TRANSFER_HEADER)
}

/// Encodes the scenario into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(scenario: &Scenario) -> String {
    let payload = SerializablePayload {
        rows: scenario.glyph_rows(),
    };
    let json = serde_json::to_vec(&payload).expect("scenario payload serialization never fails");
    let encoded = STANDARD_NO_PAD.encode(json);
    format!(
        "{TRANSFER_HEADER}:{}x{}:{encoded}",
        scenario.columns(),
        scenario.rows()
    )
}

/// Decodes a scenario from the provided transfer string.
pub(crate) fn decode(value: &str) -> Result<Scenario, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingPrefix)?;
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(TransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(TransferError::InvalidEncoding)?;
    let decoded: SerializablePayload =
        serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)?;

    let scenario =
        Scenario::parse(&decoded.rows.join("\n")).map_err(TransferError::InvalidScenario)?;

    if scenario.columns() != columns || scenario.rows() != rows {
        return Err(TransferError::DimensionMismatch {
            declared: (columns, rows),
            found: (scenario.columns(), scenario.rows()),
        });
    }

    Ok(scenario)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializablePayload {
    rows: Vec<String>,
}

/// Errors that can occur while decoding scenario transfer strings.
#[derive(Debug)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded scenario.
    MissingPrefix,
    /// The encoded scenario did not contain a version segment.
    MissingVersion,
    /// The encoded scenario did not include grid dimensions.
    MissingDimensions,
    /// The encoded scenario did not include the payload segment.
    MissingPayload,
    /// The encoded scenario used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded scenario used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded scenario.
    InvalidDimensions(String),
    /// The header dimensions disagreed with the decoded grid.
    DimensionMismatch {
        /// Dimensions declared in the transfer header.
        declared: (u32, u32),
        /// Dimensions of the grid actually decoded.
        found: (u32, u32),
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// The decoded grid failed scenario validation.
    InvalidScenario(ScenarioError),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "transfer payload was empty"),
            Self::MissingPrefix => write!(f, "transfer string is missing the prefix"),
            Self::MissingVersion => write!(f, "transfer string is missing the version"),
            Self::MissingDimensions => {
                write!(f, "transfer string is missing the grid dimensions")
            }
            Self::MissingPayload => write!(f, "transfer string is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "transfer prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "transfer version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::DimensionMismatch { declared, found } => write!(
                f,
                "header declares a {}x{} grid but the payload holds {}x{}",
                declared.0, declared.1, found.0, found.1
            ),
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode transfer payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse transfer payload: {error}")
            }
            Self::InvalidScenario(error) => {
                write!(f, "decoded grid failed validation: {error}")
            }
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            Self::InvalidScenario(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), TransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| TransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| TransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| TransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(TransferError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_walled_scenario() {
        let text = "#######\n#G...E#\n#..#..#\n#E...G#\n#######";
        let scenario = Scenario::parse(text).expect("scenario parses");

        let encoded = encode(&scenario);
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:7x5:")));
        assert!(is_transfer_string(&encoded));

        let decoded = decode(&encoded).expect("scenario decodes");
        assert_eq!(scenario, decoded);
    }

    #[test]
    fn paths_are_not_mistaken_for_transfer_strings() {
        assert!(!is_transfer_string("scenarios/cavern.txt"));
        assert!(!is_transfer_string("skirmish.txt"));
    }

    #[test]
    fn decode_rejects_foreign_prefixes() {
        let error = decode("maze:v1:3x3:AAAA").expect_err("foreign prefix rejected");
        assert!(matches!(error, TransferError::InvalidPrefix(prefix) if prefix == "maze"));
    }

    #[test]
    fn decode_rejects_mismatched_dimensions() {
        let scenario = Scenario::parse("G.E").expect("scenario parses");
        let encoded = encode(&scenario);
        let tampered = encoded.replace(":3x1:", ":4x1:");

        let error = decode(&tampered).expect_err("dimension mismatch rejected");
        assert!(matches!(
            error,
            TransferError::DimensionMismatch {
                declared: (4, 1),
                found: (3, 1),
            }
        ));
    }

    #[test]
    fn decode_rejects_invalid_grids() {
        let payload = SerializablePayload {
            rows: vec!["G?E".to_owned()],
        };
        let json = serde_json::to_vec(&payload).expect("payload serializes");
        let encoded = STANDARD_NO_PAD.encode(json);
        let value = format!("{TRANSFER_HEADER}:3x1:{encoded}");

        let error = decode(&value).expect_err("invalid glyph rejected");
        assert!(matches!(error, TransferError::InvalidScenario(_)));
    }
}
