use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

// ============ Lead Enumerations ============

/// Primary reason the visitor got in touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserIntent {
    LearnMore,
    GetQuote,
    BookAssessment,
    ServiceExisting,
    Other,
}

impl UserIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserIntent::LearnMore => "learn_more",
            UserIntent::GetQuote => "get_quote",
            UserIntent::BookAssessment => "book_assessment",
            UserIntent::ServiceExisting => "service_existing",
            UserIntent::Other => "other",
        }
    }
}

/// Kind of property the treatment system is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    SingleFamily,
    Condo,
    MultiUnit,
    Commercial,
    SpaGym,
    Other,
}

/// Water concern tags a prospect can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Concern {
    TasteOdor,
    Chlorine,
    HardnessScale,
    LeadMetals,
    Pfas,
    Bacteria,
    WholeHomeFiltration,
    DrinkingWater,
    ShowerSkinHair,
    ApplianceProtection,
    Other,
}

/// Estimated budget bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BudgetRange {
    #[serde(rename = "under_1k")]
    Under1k,
    #[serde(rename = "1k_3k")]
    From1kTo3k,
    #[serde(rename = "3k_6k")]
    From3kTo6k,
    #[serde(rename = "6k_plus")]
    SixKPlus,
    #[serde(rename = "unsure")]
    Unsure,
}

// ============ Lead Documents ============

/// Inbound lead submission as accepted by `POST /api/leads`.
///
/// This is the one typed schema for a submission. Constraints that serde
/// cannot express (email grammar, occupant bounds, non-empty name) are
/// enforced by [`crate::validation::validate_lead`].
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct LeadCreate {
    pub full_name: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub user_intent: UserIntent,
    #[serde(default)]
    pub property_type: Option<PropertyType>,
    /// Household occupants, between 1 and 50.
    #[serde(default)]
    #[schema(minimum = 1, maximum = 50)]
    pub occupants: Option<i64>,
    #[serde(default)]
    pub concerns: Option<Vec<Concern>>,
    #[serde(default)]
    pub budget_range: Option<BudgetRange>,
    #[serde(default)]
    pub message: Option<String>,
    /// Marketing attribution or source tag.
    #[serde(default)]
    pub source: Option<String>,
    /// Accepted on input but not persisted. See [`parse_datetime`] for the
    /// accepted formats; values without an offset are read as UTC.
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub preferred_datetime: Option<DateTime<Utc>>,
}

/// A validated lead, exactly as it is written to the `lead` collection.
///
/// Absent optional fields are omitted from the stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Lead {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub user_intent: UserIntent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupants: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concerns: Option<Vec<Concern>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_range: Option<BudgetRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

// ============ Timestamp Decoding ============

// Epoch values above this are taken to be milliseconds.
const MAX_EPOCH_SECONDS: f64 = 2e10;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDateTime {
    Epoch(i64),
    EpochFloat(f64),
    Text(String),
}

/// Parses a timestamp the way browser forms and API clients send them.
///
/// Accepts RFC 3339 (`2025-03-01T10:30:00+02:00`), local date-times with or
/// without seconds (`2025-03-01T10:30`, the `datetime-local` input format),
/// plain dates (midnight), and Unix epochs in seconds or milliseconds, as a
/// number or a numeric string.
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    if let Ok(epoch) = raw.parse::<f64>() {
        return from_epoch(epoch);
    }

    Err(format!("invalid datetime: {:?}", raw))
}

fn from_epoch(value: f64) -> Result<DateTime<Utc>, String> {
    let seconds = if value.abs() > MAX_EPOCH_SECONDS {
        value / 1000.0
    } else {
        value
    };
    if !seconds.is_finite() {
        return Err(format!("invalid epoch timestamp: {}", value));
    }

    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
        .ok_or_else(|| format!("epoch timestamp out of range: {}", value))
}

fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawDateTime>::deserialize(deserializer)?;
    raw.map(|value| match value {
        RawDateTime::Epoch(seconds) => from_epoch(seconds as f64),
        RawDateTime::EpochFloat(seconds) => from_epoch(seconds),
        RawDateTime::Text(text) => parse_datetime(&text),
    })
    .transpose()
    .map_err(serde::de::Error::custom)
}

// ============ API Responses ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeadCreatedResponse {
    pub ok: bool,
    /// Identifier assigned by the document store.
    pub id: String,
}

/// Error body shared by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
}

/// Diagnostic snapshot returned by `GET /test`.
///
/// Values are human-readable status strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub backend: String,
    pub database: String,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub connection_status: String,
    pub collections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FaqItem {
    pub q: String,
    pub a: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FaqResponse {
    pub items: Vec<FaqItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Badge {
    pub label: String,
    pub issuer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PressMention {
    pub name: String,
    pub year: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthoritySignals {
    pub badges: Vec<Badge>,
    pub press: Vec<PressMention>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn parses_offset_and_local_forms() {
        assert_eq!(
            parse_datetime("2025-03-01T10:30:00Z").unwrap(),
            utc(2025, 3, 1, 10, 30, 0)
        );
        assert_eq!(
            parse_datetime("2025-03-01T12:30:00+02:00").unwrap(),
            utc(2025, 3, 1, 10, 30, 0)
        );
        assert_eq!(
            parse_datetime("2025-03-01T12:30+02:00").unwrap(),
            utc(2025, 3, 1, 10, 30, 0)
        );
        assert_eq!(
            parse_datetime("2025-03-01T10:30:00").unwrap(),
            utc(2025, 3, 1, 10, 30, 0)
        );
        assert_eq!(
            parse_datetime("2025-03-01T10:30:00.250").unwrap(),
            utc(2025, 3, 1, 10, 30, 0) + chrono::Duration::milliseconds(250)
        );
        assert_eq!(
            parse_datetime("2025-03-01T10:30").unwrap(),
            utc(2025, 3, 1, 10, 30, 0)
        );
        assert_eq!(
            parse_datetime("2025-03-01 10:30").unwrap(),
            utc(2025, 3, 1, 10, 30, 0)
        );
        assert_eq!(parse_datetime("2025-03-01").unwrap(), utc(2025, 3, 1, 0, 0, 0));
    }

    #[test]
    fn parses_epochs() {
        assert_eq!(parse_datetime("1740825000").unwrap(), utc(2025, 3, 1, 10, 30, 0));
        assert_eq!(
            parse_datetime("1740825000000").unwrap(),
            utc(2025, 3, 1, 10, 30, 0)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_datetime("next tuesday").is_err());
        assert!(parse_datetime("2025-13-01T10:30").is_err());
        assert!(parse_datetime("").is_err());
    }
}
