//! Models for the redemption workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ======================================================================
// STATUS
// ======================================================================

/// Lifecycle of a redemption request. Stored as a text tag in
/// `redemption_requests.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Menunggu",
            Self::Processing => "Diproses",
            Self::Completed => "Selesai",
            Self::Rejected => "Ditolak",
        }
    }

    /// Completed and rejected requests never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// Statuses that count against the pending-request limit.
    pub fn counts_as_outstanding(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Legal admin transitions. Terminal states admit nothing, and writing
    /// the current status again is not a transition.
    pub fn can_transition_to(&self, next: RedemptionStatus) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                Self::Processing | Self::Completed | Self::Rejected
            ),
            Self::Processing => matches!(next, Self::Completed | Self::Rejected),
            Self::Completed | Self::Rejected => false,
        }
    }
}

// ======================================================================
// PAYMENT METHODS
// ======================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    EWallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::EWallet => "e_wallet",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bank_transfer" => Some(Self::BankTransfer),
            "e_wallet" => Some(Self::EWallet),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BankTransfer => "Transfer Bank",
            Self::EWallet => "E-Wallet",
        }
    }
}

/// Payout destination, validated per method. The columns of the unused
/// method are stored NULL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "payment_method", rename_all = "snake_case")]
pub enum PaymentDetails {
    BankTransfer {
        bank_name: String,
        account_number: String,
        account_holder: String,
    },
    EWallet {
        ewallet_provider: String,
        ewallet_number: String,
        ewallet_name: String,
    },
}

impl PaymentDetails {
    /// Build from the flat request fields, requiring exactly the fields of
    /// the chosen method.
    pub fn from_parts(
        method: PaymentMethod,
        bank_name: Option<String>,
        account_number: Option<String>,
        account_holder: Option<String>,
        ewallet_provider: Option<String>,
        ewallet_number: Option<String>,
        ewallet_name: Option<String>,
    ) -> Result<Self, RedemptionError> {
        fn required(value: Option<String>, field: &str) -> Result<String, RedemptionError> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(RedemptionError::Validation(format!(
                    "Kolom {field} wajib diisi"
                ))),
            }
        }

        match method {
            PaymentMethod::BankTransfer => Ok(Self::BankTransfer {
                bank_name: required(bank_name, "bank_name")?,
                account_number: required(account_number, "account_number")?,
                account_holder: required(account_holder, "account_holder")?,
            }),
            PaymentMethod::EWallet => Ok(Self::EWallet {
                ewallet_provider: required(ewallet_provider, "ewallet_provider")?,
                ewallet_number: required(ewallet_number, "ewallet_number")?,
                ewallet_name: required(ewallet_name, "ewallet_name")?,
            }),
        }
    }

    pub fn method(&self) -> PaymentMethod {
        match self {
            Self::BankTransfer { .. } => PaymentMethod::BankTransfer,
            Self::EWallet { .. } => PaymentMethod::EWallet,
        }
    }

    /// Flatten into the request-table column order:
    /// (method, bank_name, account_number, account_holder,
    ///  ewallet_provider, ewallet_number, ewallet_name).
    #[allow(clippy::type_complexity)]
    pub fn into_columns(
        self,
    ) -> (
        PaymentMethod,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
    ) {
        match self {
            Self::BankTransfer {
                bank_name,
                account_number,
                account_holder,
            } => (
                PaymentMethod::BankTransfer,
                Some(bank_name),
                Some(account_number),
                Some(account_holder),
                None,
                None,
                None,
            ),
            Self::EWallet {
                ewallet_provider,
                ewallet_number,
                ewallet_name,
            } => (
                PaymentMethod::EWallet,
                None,
                None,
                None,
                Some(ewallet_provider),
                Some(ewallet_number),
                Some(ewallet_name),
            ),
        }
    }
}

// ======================================================================
// CATALOG ITEMS
// ======================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RedemptionItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub point_cost: i32,
    pub rupiah_value: i32,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_is_active() -> bool {
    true
}

/// Admin payload for creating a catalog item.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRedemptionItem {
    pub name: String,
    pub description: Option<String>,
    pub point_cost: i32,
    pub rupiah_value: i32,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Admin payload for a partial catalog update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedemptionItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub point_cost: Option<i32>,
    pub rupiah_value: Option<i32>,
    pub sort_order: Option<i32>,
}

// ======================================================================
// REQUESTS
// ======================================================================

/// A user's claim to exchange points for a payout. `point_cost` and
/// `rupiah_value` are captured at submission time so later catalog edits
/// cannot change what was promised.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RedemptionRequest {
    pub id: i64,
    pub user_id: i64,
    pub redemption_item_id: i64,
    pub point_cost: i32,
    pub rupiah_value: i32,
    pub payment_method: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_holder: Option<String>,
    pub ewallet_provider: Option<String>,
    pub ewallet_number: Option<String>,
    pub ewallet_name: Option<String>,
    pub status: String,
    pub admin_note: Option<String>,
    pub processed_by: Option<i64>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RedemptionRequest {
    pub fn status(&self) -> Option<RedemptionStatus> {
        RedemptionStatus::parse(&self.status)
    }
}

// ======================================================================
// ERRORS
// ======================================================================

#[derive(Debug, thiserror::Error)]
pub enum RedemptionError {
    #[error("Poin tidak cukup. Dibutuhkan {required} poin, tersedia {available} poin.")]
    InsufficientPoints { required: i32, available: i32 },

    #[error("Anda sudah memiliki {limit} permintaan yang belum diproses. Silakan tunggu hingga permintaan sebelumnya selesai.")]
    MaxPendingRequests { limit: i64 },

    #[error("Anda harus menunggu {remaining_hours} jam lagi sebelum dapat mengajukan permintaan baru.")]
    CooldownActive { remaining_hours: i64 },

    #[error("Hadiah tidak ditemukan")]
    ItemNotFound,

    #[error("Hadiah sedang tidak aktif")]
    ItemInactive,

    #[error("Permintaan penukaran tidak ditemukan")]
    RequestNotFound,

    #[error("Status tidak dapat diubah dari {from} ke {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Validasi gagal: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RedemptionError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<crate::domains::points::PointError> for RedemptionError {
    fn from(err: crate::domains::points::PointError) -> Self {
        use crate::domains::points::PointError;
        match &err {
            PointError::InsufficientPoints {
                required,
                available,
            } => Self::InsufficientPoints {
                required: *required,
                available: *available,
            },
            PointError::InvalidAmount { .. } => Self::Validation(err.to_string()),
            _ => Self::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for tag in ["pending", "processing", "completed", "rejected"] {
            let parsed = RedemptionStatus::parse(tag).expect("known tag");
            assert_eq!(parsed.as_str(), tag);
        }
        assert!(RedemptionStatus::parse("cancelled").is_none());
    }

    #[test]
    fn test_outstanding_statuses() {
        assert!(RedemptionStatus::Pending.counts_as_outstanding());
        assert!(RedemptionStatus::Processing.counts_as_outstanding());
        assert!(!RedemptionStatus::Completed.counts_as_outstanding());
        assert!(!RedemptionStatus::Rejected.counts_as_outstanding());
    }

    #[test]
    fn test_transitions_from_pending() {
        let pending = RedemptionStatus::Pending;
        assert!(pending.can_transition_to(RedemptionStatus::Processing));
        assert!(pending.can_transition_to(RedemptionStatus::Completed));
        assert!(pending.can_transition_to(RedemptionStatus::Rejected));
        assert!(!pending.can_transition_to(RedemptionStatus::Pending));
    }

    #[test]
    fn test_transitions_from_processing() {
        let processing = RedemptionStatus::Processing;
        assert!(processing.can_transition_to(RedemptionStatus::Completed));
        assert!(processing.can_transition_to(RedemptionStatus::Rejected));
        assert!(!processing.can_transition_to(RedemptionStatus::Pending));
        assert!(!processing.can_transition_to(RedemptionStatus::Processing));
    }

    #[test]
    fn test_terminal_states_are_closed() {
        for terminal in [RedemptionStatus::Completed, RedemptionStatus::Rejected] {
            assert!(terminal.is_terminal());
            for next in [
                RedemptionStatus::Pending,
                RedemptionStatus::Processing,
                RedemptionStatus::Completed,
                RedemptionStatus::Rejected,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_payment_method_round_trip() {
        assert_eq!(
            PaymentMethod::parse("bank_transfer"),
            Some(PaymentMethod::BankTransfer)
        );
        assert_eq!(PaymentMethod::parse("e_wallet"), Some(PaymentMethod::EWallet));
        assert!(PaymentMethod::parse("cash").is_none());
    }

    #[test]
    fn test_bank_transfer_requires_bank_fields() {
        let ok = PaymentDetails::from_parts(
            PaymentMethod::BankTransfer,
            Some("BCA".into()),
            Some("1234567890".into()),
            Some("Budi Santoso".into()),
            None,
            None,
            None,
        );
        assert!(ok.is_ok());

        let missing = PaymentDetails::from_parts(
            PaymentMethod::BankTransfer,
            Some("BCA".into()),
            None,
            Some("Budi Santoso".into()),
            None,
            None,
            None,
        );
        assert!(matches!(missing, Err(RedemptionError::Validation(_))));
    }

    #[test]
    fn test_ewallet_ignores_bank_fields() {
        // Bank fields do not satisfy the e-wallet requirements.
        let result = PaymentDetails::from_parts(
            PaymentMethod::EWallet,
            Some("BCA".into()),
            Some("1234567890".into()),
            Some("Budi Santoso".into()),
            None,
            None,
            None,
        );
        assert!(matches!(result, Err(RedemptionError::Validation(_))));
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let result = PaymentDetails::from_parts(
            PaymentMethod::EWallet,
            None,
            None,
            None,
            Some("GoPay".into()),
            Some("   ".into()),
            Some("Budi Santoso".into()),
        );
        assert!(matches!(result, Err(RedemptionError::Validation(_))));
    }

    #[test]
    fn test_into_columns_nulls_the_other_method() {
        let details = PaymentDetails::EWallet {
            ewallet_provider: "GoPay".into(),
            ewallet_number: "081234567890".into(),
            ewallet_name: "Budi Santoso".into(),
        };
        assert_eq!(details.method(), PaymentMethod::EWallet);
        let (method, bank_name, account_number, account_holder, provider, number, name) =
            details.into_columns();
        assert_eq!(method, PaymentMethod::EWallet);
        assert!(bank_name.is_none() && account_number.is_none() && account_holder.is_none());
        assert_eq!(provider.as_deref(), Some("GoPay"));
        assert_eq!(number.as_deref(), Some("081234567890"));
        assert_eq!(name.as_deref(), Some("Budi Santoso"));
    }
}
