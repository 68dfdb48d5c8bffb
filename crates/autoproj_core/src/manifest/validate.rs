//! Structural validation of a decoded manifest.

use serde_json::{Map, Value};

use super::errors::ValidationError;
use super::{Manifest, Section, SequenceSpec};

const SEQUENCE_FIELDS: [&str; 4] = ["video", "startSlide", "endSlide", "sequenceName"];

/// Validate a decoded manifest.
///
/// Checks run in document order and stop at the first violation. Nothing is
/// returned for a manifest that is only partly valid.
pub fn validate(raw: &Value) -> Result<Manifest, ValidationError> {
    let root = raw.as_object().ok_or(ValidationError::NotAnObject)?;

    let sections = match root.get("sections") {
        None | Some(Value::Null) => return Err(ValidationError::MissingSections),
        Some(Value::Array(sections)) => sections,
        Some(_) => return Err(ValidationError::SectionsNotList),
    };
    if sections.is_empty() {
        return Err(ValidationError::EmptySections);
    }

    let sections = sections
        .iter()
        .enumerate()
        .map(|(index, section)| validate_section(index, section))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Manifest { sections })
}

fn validate_section(index: usize, raw: &Value) -> Result<Section, ValidationError> {
    let section = raw
        .as_object()
        .ok_or(ValidationError::SectionNotObject { section: index })?;

    let name = match section.get("section") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            return Err(ValidationError::MissingSectionField {
                section: index,
                field: "section",
            })
        }
        Some(_) => {
            return Err(ValidationError::InvalidSectionField {
                section: index,
                field: "section",
                expected: "a string",
            })
        }
    };

    let sequences = match section.get("sequences") {
        Some(Value::Array(sequences)) => sequences,
        None | Some(Value::Null) => {
            return Err(ValidationError::MissingSectionField {
                section: index,
                field: "sequences",
            })
        }
        Some(_) => {
            return Err(ValidationError::InvalidSectionField {
                section: index,
                field: "sequences",
                expected: "a list",
            })
        }
    };

    let sequences = sequences
        .iter()
        .enumerate()
        .map(|(sequence, raw)| validate_sequence(index, sequence, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Section { name, sequences })
}

fn validate_sequence(
    section: usize,
    sequence: usize,
    raw: &Value,
) -> Result<SequenceSpec, ValidationError> {
    let entry = raw
        .as_object()
        .ok_or(ValidationError::SequenceNotObject { section, sequence })?;

    // Field initializers run in order, so the first missing field is reported.
    Ok(SequenceSpec {
        video: required_string(entry, section, sequence, SEQUENCE_FIELDS[0])?,
        start_slide: required_string(entry, section, sequence, SEQUENCE_FIELDS[1])?,
        end_slide: required_string(entry, section, sequence, SEQUENCE_FIELDS[2])?,
        sequence_name: required_string(entry, section, sequence, SEQUENCE_FIELDS[3])?,
    })
}

fn required_string(
    entry: &Map<String, Value>,
    section: usize,
    sequence: usize,
    field: &'static str,
) -> Result<String, ValidationError> {
    match entry.get(field) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            Err(ValidationError::MissingSequenceField {
                section,
                sequence,
                field,
            })
        }
        Some(_) => Err(ValidationError::InvalidSequenceField {
            section,
            sequence,
            field,
        }),
    }
}
