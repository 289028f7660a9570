//! Models for the point ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ======================================================================
// POINT TYPES
// ======================================================================

/// Why a ledger entry exists. Stored as a text tag in `point_logs.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointType {
    Publish,
    Views,
    Redemption,
    Refund,
}

impl PointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Views => "views",
            Self::Redemption => "redemption",
            Self::Refund => "refund",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "publish" => Some(Self::Publish),
            "views" => Some(Self::Views),
            "redemption" => Some(Self::Redemption),
            "refund" => Some(Self::Refund),
            _ => None,
        }
    }
}

// ======================================================================
// LEDGER ENTRIES
// ======================================================================

/// One immutable balance change. Positive `points` is an award, negative a
/// deduction. The sum of a user's entries always equals `users.points`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PointLog {
    pub id: i64,
    pub user_id: i64,
    pub post_id: Option<i64>,
    pub points: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub log_type: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl PointLog {
    pub fn point_type(&self) -> Option<PointType> {
        PointType::parse(&self.log_type)
    }
}

// ======================================================================
// ERRORS
// ======================================================================

#[derive(Debug, thiserror::Error)]
pub enum PointError {
    #[error("Poin tidak cukup. Dibutuhkan {required} poin, tersedia {available} poin.")]
    InsufficientPoints { required: i32, available: i32 },

    #[error("Jumlah poin harus lebih besar dari nol, bukan {amount}")]
    InvalidAmount { amount: i32 },

    #[error("Pengguna tidak ditemukan")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for PointError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_type_round_trip() {
        for tag in ["publish", "views", "redemption", "refund"] {
            let parsed = PointType::parse(tag).expect("known tag");
            assert_eq!(parsed.as_str(), tag);
        }
    }

    #[test]
    fn test_point_type_rejects_unknown_tag() {
        assert!(PointType::parse("bonus").is_none());
        assert!(PointType::parse("").is_none());
        assert!(PointType::parse("Publish").is_none());
    }
}
