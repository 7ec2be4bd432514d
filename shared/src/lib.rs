use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ===== Records =====

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub device_id: String,
    pub track_accepted_date: Option<DateTime<Utc>>,
    pub notifications_accepted_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub platform: Option<String>,
    pub last_ip: Option<String>,
    pub last_location: Option<String>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    pub id: i32,
    pub title: String,
    pub file_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// In-app message delivered to a single user as part of a campaign.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub user_id: i32,
    pub content_id: i32,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(rename = "readedAt")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "readed_at"))]
    pub read_at: Option<DateTime<Utc>>,
    pub campaign_id: Option<String>,
}

// ===== Filtering =====

/// Comparison operators accepted in a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
    NotIlike,
    IsNull,
    IsNotNull,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 11] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Like,
        Self::Ilike,
        Self::NotIlike,
        Self::IsNull,
        Self::IsNotNull,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::NotIlike => "notIlike",
            Self::IsNull => "isNull",
            Self::IsNotNull => "isNotNull",
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Like | Self::Ilike | Self::NotIlike)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed values of `saints_users.platform`
pub const PLATFORMS: &[&str] = &["ios", "android"];

/// Value rule attached to a filterable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Timestamp,
    Enumerated(&'static [&'static str]),
}

impl FieldKind {
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text | Self::Enumerated(_))
    }
}

/// Filterable columns of `saints_users`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserField {
    Id,
    DeviceId,
    TrackAcceptedDate,
    NotificationsAcceptedDate,
    CreatedAt,
    Platform,
    LastIp,
    LastLocation,
}

impl UserField {
    pub const ALL: [UserField; 8] = [
        Self::Id,
        Self::DeviceId,
        Self::TrackAcceptedDate,
        Self::NotificationsAcceptedDate,
        Self::CreatedAt,
        Self::Platform,
        Self::LastIp,
        Self::LastLocation,
    ];

    /// Resolve either the property name (`deviceId`) or the column name (`device_id`)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.property() == name || f.column() == name)
    }

    pub fn property(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::DeviceId => "deviceId",
            Self::TrackAcceptedDate => "trackAcceptedDate",
            Self::NotificationsAcceptedDate => "notificationsAcceptedDate",
            Self::CreatedAt => "createdAt",
            Self::Platform => "platform",
            Self::LastIp => "lastIp",
            Self::LastLocation => "lastLocation",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::DeviceId => "device_id",
            Self::TrackAcceptedDate => "track_accepted_date",
            Self::NotificationsAcceptedDate => "notifications_accepted_date",
            Self::CreatedAt => "created_at",
            Self::Platform => "platform",
            Self::LastIp => "last_ip",
            Self::LastLocation => "last_location",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Id => FieldKind::Integer,
            Self::DeviceId | Self::LastIp | Self::LastLocation => FieldKind::Text,
            Self::TrackAcceptedDate | Self::NotificationsAcceptedDate | Self::CreatedAt => {
                FieldKind::Timestamp
            }
            Self::Platform => FieldKind::Enumerated(PLATFORMS),
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property())
    }
}

/// A single `{field, operator, value}` test as supplied by the host.
///
/// `operator` stays a raw string here so an unknown operator can be reported
/// by name instead of failing deserialization of the whole request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    #[serde(alias = "column")]
    pub field: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl FilterCondition {
    pub fn new(field: &str, operator: &str, value: Option<serde_json::Value>) -> Self {
        Self {
            field: field.to_string(),
            operator: operator.to_string(),
            value,
        }
    }

    pub fn equals(field: &str, value: serde_json::Value) -> Self {
        Self::new(field, "eq", Some(value))
    }

    pub fn is_null(field: &str) -> Self {
        Self::new(field, "isNull", None)
    }
}

// ===== Action payloads =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub users: Vec<User>,
    pub number_of_users: usize,
    pub next_page: i64,
}

/// Dropdown entry as rendered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownOption<T> {
    pub label: String,
    pub value: T,
}
