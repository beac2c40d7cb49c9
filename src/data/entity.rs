//! The business entities that can become map markers
//!
//! Upstream services hand over loosely shaped JSON records. A record becomes a
//! [`MarkerEntity`] only when it carries a non-null id and a resolvable
//! position; its `markerType` then selects one of the typed payloads below.
//! Optional payload fields are deserialized leniently: a field with the wrong
//! JSON type is treated as absent instead of failing the whole record.

use crate::core::geo::LatLng;
use crate::data::position::resolve_position;
use crate::{MapError, Result};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Stable identifier of an entity, unique within its marker type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(String);

impl MarkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads an id from its wire form; strings and numbers are accepted
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MarkerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MarkerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for MarkerId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Worker-style event kinds sharing the worker-status template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    Worker,
    CheckIn,
    ShiftStart,
    ShiftEnd,
    BreakStart,
    BreakEnd,
    Task,
    Journal,
    Lead,
}

impl WorkerKind {
    pub const ALL: [WorkerKind; 9] = [
        WorkerKind::Worker,
        WorkerKind::CheckIn,
        WorkerKind::ShiftStart,
        WorkerKind::ShiftEnd,
        WorkerKind::BreakStart,
        WorkerKind::BreakEnd,
        WorkerKind::Task,
        WorkerKind::Journal,
        WorkerKind::Lead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerKind::Worker => "worker",
            WorkerKind::CheckIn => "check-in",
            WorkerKind::ShiftStart => "shift-start",
            WorkerKind::ShiftEnd => "shift-end",
            WorkerKind::BreakStart => "break-start",
            WorkerKind::BreakEnd => "break-end",
            WorkerKind::Task => "task",
            WorkerKind::Journal => "journal",
            WorkerKind::Lead => "lead",
        }
    }

    /// Human readable label used in popups and the legend
    pub fn label(&self) -> &'static str {
        match self {
            WorkerKind::Worker => "Worker",
            WorkerKind::CheckIn => "Check-in",
            WorkerKind::ShiftStart => "Shift Start",
            WorkerKind::ShiftEnd => "Shift End",
            WorkerKind::BreakStart => "Break Start",
            WorkerKind::BreakEnd => "Break End",
            WorkerKind::Task => "Task",
            WorkerKind::Journal => "Journal",
            WorkerKind::Lead => "Lead",
        }
    }
}

/// Discriminant of a marker, parsed from `markerType`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Worker(WorkerKind),
    Client,
    Competitor,
    Quotation,
    /// Any type outside the documented set, kept verbatim
    Other(String),
}

impl MarkerKind {
    /// Parses a `markerType` string; separators and case are normalised so
    /// `shiftStart`, `shift_start` and `shift-start` agree
    pub fn parse(marker_type: &str) -> Self {
        let folded: String = marker_type
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match folded.as_str() {
            "worker" | "workerstatus" | "staff" => MarkerKind::Worker(WorkerKind::Worker),
            "checkin" => MarkerKind::Worker(WorkerKind::CheckIn),
            "shiftstart" => MarkerKind::Worker(WorkerKind::ShiftStart),
            "shiftend" => MarkerKind::Worker(WorkerKind::ShiftEnd),
            "breakstart" => MarkerKind::Worker(WorkerKind::BreakStart),
            "breakend" => MarkerKind::Worker(WorkerKind::BreakEnd),
            "task" => MarkerKind::Worker(WorkerKind::Task),
            "journal" => MarkerKind::Worker(WorkerKind::Journal),
            "lead" => MarkerKind::Worker(WorkerKind::Lead),
            "client" => MarkerKind::Client,
            "competitor" => MarkerKind::Competitor,
            "quotation" | "quote" => MarkerKind::Quotation,
            _ => MarkerKind::Other(marker_type.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MarkerKind::Worker(kind) => kind.as_str(),
            MarkerKind::Client => "client",
            MarkerKind::Competitor => "competitor",
            MarkerKind::Quotation => "quotation",
            MarkerKind::Other(raw) => raw,
        }
    }

    /// Every documented kind, in legend order
    pub fn documented() -> Vec<MarkerKind> {
        WorkerKind::ALL
            .iter()
            .copied()
            .map(MarkerKind::Worker)
            .chain([
                MarkerKind::Client,
                MarkerKind::Competitor,
                MarkerKind::Quotation,
            ])
            .collect()
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address given either as free text or as structured parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Address {
    Text(String),
    Structured(StructuredAddress),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredAddress {
    #[serde(deserialize_with = "lenient")]
    pub street: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub suburb: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub province: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub postal_code: Option<String>,
}

impl Address {
    /// Single-line form, `None` when nothing printable is present
    pub fn one_line(&self) -> Option<String> {
        let line = match self {
            Address::Text(text) => text.trim().to_string(),
            Address::Structured(parts) => [
                &parts.street,
                &parts.suburb,
                &parts.city,
                &parts.province,
                &parts.postal_code,
            ]
            .iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        };
        (!line.is_empty()).then_some(line)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub email: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakData {
    #[serde(deserialize_with = "lenient")]
    pub start_time: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub end_time: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub duration_minutes: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    #[serde(deserialize_with = "lenient")]
    pub shift_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub start_time: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskInfo {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub priority: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub due_date: Option<String>,
}

/// Worker, shift, break, task, journal and lead records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkerStatus {
    #[serde(skip, default = "default_worker_kind")]
    pub kind: WorkerKind,
    #[serde(alias = "workerName", alias = "staffName", deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub job_status: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub break_data: Option<BreakData>,
    #[serde(deserialize_with = "lenient")]
    pub schedule: Option<Schedule>,
    #[serde(deserialize_with = "lenient")]
    pub task: Option<TaskInfo>,
    #[serde(deserialize_with = "lenient")]
    pub address: Option<Address>,
    #[serde(alias = "time", deserialize_with = "lenient")]
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub notes: Option<String>,
}

fn default_worker_kind() -> WorkerKind {
    WorkerKind::Worker
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self {
            kind: WorkerKind::Worker,
            name: None,
            title: None,
            description: None,
            job_status: None,
            break_data: None,
            schedule: None,
            task: None,
            address: None,
            timestamp: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    #[serde(alias = "clientName", deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(alias = "clientReference", deserialize_with = "lenient")]
    pub reference: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub price_tier: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub address: Option<Address>,
    #[serde(deserialize_with = "lenient")]
    pub contact: Option<Contact>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Geofencing {
    #[serde(deserialize_with = "lenient")]
    pub enabled: Option<bool>,
    #[serde(deserialize_with = "lenient_number")]
    pub radius_meters: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Competitor {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub threat_level: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub is_direct: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub geofencing: Option<Geofencing>,
    #[serde(deserialize_with = "lenient")]
    pub address: Option<Address>,
    #[serde(deserialize_with = "lenient")]
    pub contact: Option<Contact>,
    #[serde(deserialize_with = "lenient")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quotation {
    #[serde(deserialize_with = "lenient")]
    pub quotation_number: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub client_name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub total_amount: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub valid_until: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub created_at: Option<String>,
}

/// A record whose `markerType` is outside the documented set
#[derive(Debug, Clone, PartialEq)]
pub struct GenericEvent {
    pub marker_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub timestamp: Option<String>,
    pub raw: Value,
}

/// Tagged payload of a marker entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityDetails {
    Worker(WorkerStatus),
    Client(Client),
    Competitor(Competitor),
    Quotation(Quotation),
    Event(GenericEvent),
}

/// A renderable entity: id, resolved position and typed payload
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntity {
    pub id: MarkerId,
    pub position: LatLng,
    pub details: EntityDetails,
}

/// Why a raw record could not become a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingId,
    UnresolvedPosition,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingId => write!(f, "missing id"),
            Rejection::UnresolvedPosition => write!(f, "unresolvable position"),
        }
    }
}

impl MarkerEntity {
    pub fn new(id: impl Into<MarkerId>, position: LatLng, details: EntityDetails) -> Self {
        Self {
            id: id.into(),
            position,
            details,
        }
    }

    /// Converts a raw record. `default_type` is used when the record has no
    /// `markerType` of its own (typed collections know what they hold).
    pub fn from_value(
        value: &Value,
        default_type: Option<&str>,
    ) -> std::result::Result<Self, Rejection> {
        let id = value
            .get("id")
            .and_then(MarkerId::from_value)
            .ok_or(Rejection::MissingId)?;
        let position = resolve_position(value).ok_or(Rejection::UnresolvedPosition)?;

        let marker_type = value
            .get("markerType")
            .and_then(Value::as_str)
            .or(default_type)
            .unwrap_or("unknown");

        let details = match MarkerKind::parse(marker_type) {
            MarkerKind::Worker(kind) => EntityDetails::Worker(WorkerStatus {
                kind,
                ..payload::<WorkerStatus>(value)
            }),
            MarkerKind::Client => EntityDetails::Client(payload(value)),
            MarkerKind::Competitor => EntityDetails::Competitor(payload(value)),
            MarkerKind::Quotation => EntityDetails::Quotation(payload(value)),
            MarkerKind::Other(marker_type) => EntityDetails::Event(GenericEvent {
                marker_type,
                title: text_field(value, &["title", "name"]),
                description: text_field(value, &["description", "notes"]),
                timestamp: text_field(value, &["timestamp", "time", "createdAt"]),
                raw: value.clone(),
            }),
        };

        Ok(Self {
            id,
            position,
            details,
        })
    }

    /// Parses a single record from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value, None)
            .map_err(|reason| MapError::InvalidEntity(reason.to_string()))
    }

    pub fn kind(&self) -> MarkerKind {
        match &self.details {
            EntityDetails::Worker(worker) => MarkerKind::Worker(worker.kind),
            EntityDetails::Client(_) => MarkerKind::Client,
            EntityDetails::Competitor(_) => MarkerKind::Competitor,
            EntityDetails::Quotation(_) => MarkerKind::Quotation,
            EntityDetails::Event(event) => MarkerKind::Other(event.marker_type.clone()),
        }
    }

    /// Best display name available for list and tooltip use
    pub fn display_name(&self) -> String {
        let name = match &self.details {
            EntityDetails::Worker(w) => w.name.clone().or_else(|| w.title.clone()),
            EntityDetails::Client(c) => c.name.clone(),
            EntityDetails::Competitor(c) => c.name.clone(),
            EntityDetails::Quotation(q) => q.quotation_number.clone(),
            EntityDetails::Event(e) => e.title.clone(),
        };
        name.unwrap_or_else(|| format!("{} {}", self.kind(), self.id))
    }
}

fn payload<T: DeserializeOwned + Default>(value: &Value) -> T {
    T::deserialize(value).unwrap_or_default()
}

fn text_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Deserializes an optional field, treating type mismatches as absent
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Numbers may arrive as JSON numbers or numeric strings
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_marker_kind_parsing() {
        assert_eq!(
            MarkerKind::parse("shiftStart"),
            MarkerKind::Worker(WorkerKind::ShiftStart)
        );
        assert_eq!(
            MarkerKind::parse("break_end"),
            MarkerKind::Worker(WorkerKind::BreakEnd)
        );
        assert_eq!(
            MarkerKind::parse("check-in"),
            MarkerKind::Worker(WorkerKind::CheckIn)
        );
        assert_eq!(MarkerKind::parse("Client"), MarkerKind::Client);
        assert_eq!(
            MarkerKind::parse("warehouse"),
            MarkerKind::Other("warehouse".to_string())
        );
        assert_eq!(MarkerKind::documented().len(), 12);
    }

    #[test]
    fn test_client_from_value() {
        let entity = MarkerEntity::from_value(
            &json!({
                "id": 5,
                "markerType": "client",
                "position": [-26.2041, 28.0473],
                "status": "active",
                "reference": "CL-005",
                "contact": {"name": "Thandi", "phone": "011 555 0101"}
            }),
            None,
        )
        .unwrap();

        assert_eq!(entity.id, MarkerId::from("5"));
        assert_eq!(entity.kind(), MarkerKind::Client);
        assert_eq!(entity.position, LatLng::new(-26.2041, 28.0473));
        match entity.details {
            EntityDetails::Client(client) => {
                assert_eq!(client.status.as_deref(), Some("active"));
                assert_eq!(client.reference.as_deref(), Some("CL-005"));
                assert_eq!(
                    client.contact.and_then(|c| c.phone).as_deref(),
                    Some("011 555 0101")
                );
            }
            other => panic!("expected client, got {other:?}"),
        }
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            MarkerEntity::from_value(&json!({"position": [1.0, 2.0]}), None),
            Err(Rejection::MissingId)
        );
        assert_eq!(
            MarkerEntity::from_value(&json!({"id": null, "position": [1.0, 2.0]}), None),
            Err(Rejection::MissingId)
        );
        assert_eq!(
            MarkerEntity::from_value(&json!({"id": 9, "markerType": "quotation"}), None),
            Err(Rejection::UnresolvedPosition)
        );
    }

    #[test]
    fn test_default_type_and_explicit_type() {
        let raw = json!({"id": "t1", "location": {"lat": 1.0, "lng": 2.0}, "title": "Install"});
        let entity = MarkerEntity::from_value(&raw, Some("task")).unwrap();
        assert_eq!(entity.kind(), MarkerKind::Worker(WorkerKind::Task));

        let raw = json!({"id": "x", "markerType": "lead", "position": [1.0, 2.0]});
        let entity = MarkerEntity::from_value(&raw, Some("task")).unwrap();
        assert_eq!(entity.kind(), MarkerKind::Worker(WorkerKind::Lead));
    }

    #[test]
    fn test_wrong_field_types_are_ignored() {
        let raw = json!({
            "id": 1,
            "markerType": "quotation",
            "position": [1.0, 2.0],
            "quotationNumber": 42,
            "totalAmount": "1250.50",
            "status": {"nested": true}
        });
        let entity = MarkerEntity::from_value(&raw, None).unwrap();
        match entity.details {
            EntityDetails::Quotation(q) => {
                assert_eq!(q.quotation_number, None);
                assert_eq!(q.total_amount, Some(1250.5));
                assert_eq!(q.status, None);
            }
            other => panic!("expected quotation, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_keeps_raw_record() {
        let raw = json!({"id": 3, "markerType": "depot", "position": [1.0, 2.0], "name": "North"});
        let entity = MarkerEntity::from_value(&raw, None).unwrap();
        assert_eq!(entity.kind(), MarkerKind::Other("depot".to_string()));
        match &entity.details {
            EntityDetails::Event(event) => {
                assert_eq!(event.title.as_deref(), Some("North"));
                assert_eq!(event.raw, raw);
            }
            other => panic!("expected event, got {other:?}"),
        }
        assert_eq!(entity.display_name(), "North");
    }

    #[test]
    fn test_address_one_line() {
        let structured: Address = serde_json::from_value(json!({
            "street": "1 Main Rd",
            "city": "Pretoria",
            "postalCode": "",
        }))
        .unwrap();
        assert_eq!(structured.one_line().as_deref(), Some("1 Main Rd, Pretoria"));
        assert_eq!(Address::Text("   ".to_string()).one_line(), None);
    }

    #[test]
    fn test_from_json_str_reports_invalid_entity() {
        let err = MarkerEntity::from_json_str(r#"{"id": 1}"#).unwrap_err();
        assert!(matches!(err, MapError::InvalidEntity(_)));
        assert!(matches!(
            MarkerEntity::from_json_str("{not json"),
            Err(MapError::Serialization(_))
        ));
    }
}
