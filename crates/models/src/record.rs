use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Store-assigned record identifier. Starts at 1 and only grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub const FIRST: RecordId = RecordId(1);

    pub fn get(self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` when the space is exhausted.
    pub fn next(self) -> Option<RecordId> {
        self.0.checked_add(1).map(RecordId)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(RecordId)
    }
}

/// One bicycle parked under one student's custody.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub student_id: String,
    pub student_name: String,
    pub bicycle_description: String,
    pub created_at: DateTime<Utc>,
}

/// Creation payload as sent by clients. Fields are untrusted until validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    pub student_id: String,
    pub student_name: String,
    pub bicycle_description: String,
}

/// Optional bounds layered on top of the non-empty rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldLimits {
    pub max_field_chars: Option<usize>,
}

/// A trimmed, validated creation request. Only obtainable through
/// [`RecordRequest::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRecord {
    student_id: String,
    student_name: String,
    bicycle_description: String,
}

impl RecordRequest {
    pub fn new(
        student_id: impl Into<String>,
        student_name: impl Into<String>,
        bicycle_description: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            student_name: student_name.into(),
            bicycle_description: bicycle_description.into(),
        }
    }

    /// Trim every field and check it is non-empty (and within `limits`).
    /// All offending fields are reported in one message.
    pub fn validate(&self, limits: FieldLimits) -> Result<NewRecord, ModelError> {
        let fields = [
            ("studentId", self.student_id.trim()),
            ("studentName", self.student_name.trim()),
            ("bicycleDescription", self.bicycle_description.trim()),
        ];

        let mut problems = Vec::new();
        for (name, value) in fields {
            if value.is_empty() {
                problems.push(format!("{name} must not be empty"));
            } else if let Some(max) = limits.max_field_chars {
                if value.chars().count() > max {
                    problems.push(format!("{name} must be at most {max} characters"));
                }
            }
        }
        if !problems.is_empty() {
            return Err(ModelError::Validation(problems.join("; ")));
        }

        let [(_, student_id), (_, student_name), (_, bicycle_description)] = fields;
        Ok(NewRecord {
            student_id: student_id.to_owned(),
            student_name: student_name.to_owned(),
            bicycle_description: bicycle_description.to_owned(),
        })
    }
}

impl NewRecord {
    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    pub fn bicycle_description(&self) -> &str {
        &self.bicycle_description
    }

    /// Stamp the record with its identity at the moment of acceptance.
    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> Record {
        Record {
            id,
            student_id: self.student_id,
            student_name: self.student_name,
            bicycle_description: self.bicycle_description,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_fields() {
        let req = RecordRequest::new("  2021001 ", "\tAna Pérez", "Bicicleta roja BMX\n");
        let new = req.validate(FieldLimits::default()).unwrap();
        assert_eq!(new.student_id(), "2021001");
        assert_eq!(new.student_name(), "Ana Pérez");
        assert_eq!(new.bicycle_description(), "Bicicleta roja BMX");
    }

    #[test]
    fn validate_rejects_blank_fields_and_names_them() {
        let err = RecordRequest::new("", "Juan", "   ").validate(FieldLimits::default()).unwrap_err();
        let ModelError::Validation(msg) = err;
        assert!(msg.contains("studentId"));
        assert!(msg.contains("bicycleDescription"));
        assert!(!msg.contains("studentName"));
    }

    #[test]
    fn validate_applies_optional_char_limit() {
        let limits = FieldLimits { max_field_chars: Some(4) };
        assert!(RecordRequest::new("1234", "Ñaño", "bmx").validate(limits).is_ok());
        let err = RecordRequest::new("12345", "Ana", "bmx").validate(limits).unwrap_err();
        assert_eq!(err, ModelError::Validation("studentId must be at most 4 characters".into()));
    }

    #[test]
    fn record_serializes_camel_case_with_bare_id() {
        let created_at = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z").unwrap().with_timezone(&Utc);
        let rec = RecordRequest::new("2021001", "Ana", "BMX")
            .validate(FieldLimits::default())
            .unwrap()
            .into_record(RecordId(7), created_at);
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["id"], 7);
        assert_eq!(v["studentId"], "2021001");
        assert_eq!(v["bicycleDescription"], "BMX");
        assert_eq!(v["createdAt"], "2024-03-01T10:00:00Z");
        let back: Record = serde_json::from_value(v).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn record_id_parses_and_advances() {
        assert_eq!("42".parse::<RecordId>().unwrap(), RecordId(42));
        assert!("x".parse::<RecordId>().is_err());
        assert_eq!(RecordId::FIRST.next(), Some(RecordId(2)));
        assert_eq!(RecordId(u64::MAX).next(), None);
    }
}
