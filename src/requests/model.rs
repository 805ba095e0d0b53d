use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::documents::DocumentType;

/// Status of a document request.
///
/// `printed` is a legacy value still found in older records; it behaves
/// like `ready_for_pickup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    PaymentRequired,
    PaymentApproved,
    Approved,
    ReadyForPickup,
    Printed,
    Completed,
    Rejected,
}

/// Staff-facing partition of requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestView {
    Active,
    Archive,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::PaymentRequired => "payment_required",
            RequestStatus::PaymentApproved => "payment_approved",
            RequestStatus::Approved => "approved",
            RequestStatus::ReadyForPickup => "ready_for_pickup",
            RequestStatus::Printed => "printed",
            RequestStatus::Completed => "completed",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Which staff view a request with this status belongs to; rejected
    /// requests belong to none.
    pub fn view(&self) -> Option<RequestView> {
        match self {
            RequestStatus::Rejected => None,
            RequestStatus::ReadyForPickup | RequestStatus::Printed | RequestStatus::Completed => {
                Some(RequestView::Archive)
            }
            RequestStatus::Pending
            | RequestStatus::PaymentRequired
            | RequestStatus::PaymentApproved
            | RequestStatus::Approved => Some(RequestView::Active),
        }
    }

    /// The physical document has already been produced at least once.
    pub fn is_printed(&self) -> bool {
        matches!(self, RequestStatus::ReadyForPickup | RequestStatus::Printed)
    }

    /// Rendering and printing are allowed from here on.
    pub fn is_printable(&self) -> bool {
        matches!(self, RequestStatus::Approved) || self.is_printed()
    }

    /// Statuses at which a quoted amount must be on record.
    pub fn requires_amount(&self) -> bool {
        !matches!(self, RequestStatus::Pending | RequestStatus::Rejected)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "payment_required" => Ok(RequestStatus::PaymentRequired),
            "payment_approved" => Ok(RequestStatus::PaymentApproved),
            "approved" => Ok(RequestStatus::Approved),
            "ready_for_pickup" => Ok(RequestStatus::ReadyForPickup),
            "printed" => Ok(RequestStatus::Printed),
            "completed" => Ok(RequestStatus::Completed),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InitiatedBy {
    Student,
    Registrar,
}

impl InitiatedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitiatedBy::Student => "student",
            InitiatedBy::Registrar => "registrar",
        }
    }
}

impl FromStr for InitiatedBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(InitiatedBy::Student),
            "registrar" => Ok(InitiatedBy::Registrar),
            other => Err(format!("unknown initiator '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct DocumentRequest {
    #[schema(example = "f1e2d3c4-b5a6-7890-1234-567890abcdef")]
    pub id: Uuid,
    pub student_id: Uuid,
    #[schema(value_type = String, example = "GRADE SLIP")]
    pub document_type: DocumentType,
    #[schema(example = "Scholarship application")]
    pub purpose: String,
    #[schema(value_type = Option<String>, example = "150.00")]
    pub amount: Option<Decimal>,
    pub status: RequestStatus,
    pub initiated_by: InitiatedBy,
    pub remarks: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub printed_at: Option<DateTime<Utc>>,
}

impl DocumentRequest {
    pub fn new(
        student_id: Uuid,
        document_type: DocumentType,
        purpose: String,
        initiated_by: InitiatedBy,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            document_type,
            purpose,
            amount: None,
            status: RequestStatus::Pending,
            initiated_by,
            remarks: None,
            requirements: Vec::new(),
            created_at: now,
            updated_at: now,
            printed_at: None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRequestPayload {
    /// Required when a registrar files on behalf of a student.
    pub student_id: Option<Uuid>,
    #[schema(example = "TOR")]
    pub document_type: String,
    #[schema(example = "Employment")]
    pub purpose: String,
    pub requirements: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForwardPayload {
    #[schema(value_type = Option<String>, example = "150.00")]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectPayload {
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub view: Option<RequestView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RequestStatus; 8] = [
        RequestStatus::Pending,
        RequestStatus::PaymentRequired,
        RequestStatus::PaymentApproved,
        RequestStatus::Approved,
        RequestStatus::ReadyForPickup,
        RequestStatus::Printed,
        RequestStatus::Completed,
        RequestStatus::Rejected,
    ];

    #[test]
    fn test_status_string_round_trip() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_partition_is_function_of_status() {
        assert_eq!(RequestStatus::Pending.view(), Some(RequestView::Active));
        assert_eq!(RequestStatus::Approved.view(), Some(RequestView::Active));
        assert_eq!(RequestStatus::ReadyForPickup.view(), Some(RequestView::Archive));
        assert_eq!(RequestStatus::Printed.view(), Some(RequestView::Archive));
        assert_eq!(RequestStatus::Completed.view(), Some(RequestView::Archive));
        assert_eq!(RequestStatus::Rejected.view(), None);
    }

    #[test]
    fn test_printable_only_after_approval() {
        let printable: Vec<_> = ALL.iter().filter(|s| s.is_printable()).collect();
        assert_eq!(
            printable,
            vec![
                &RequestStatus::Approved,
                &RequestStatus::ReadyForPickup,
                &RequestStatus::Printed
            ]
        );
    }

    #[test]
    fn test_new_request_starts_pending() {
        let request = DocumentRequest::new(
            Uuid::new_v4(),
            DocumentType::Diploma,
            "Board exam".to_string(),
            InitiatedBy::Student,
        );
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(request.amount.is_none());
        assert!(request.printed_at.is_none());
        assert!(!request.id.is_nil());
    }

    #[test]
    fn test_request_deserializes_unknown_document_type() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "student_id": Uuid::new_v4(),
            "document_type": "Certificate of Something",
            "purpose": "x",
            "amount": "75.50",
            "status": "payment_required",
            "initiated_by": "registrar",
            "remarks": null,
            "created_at": "2026-01-05T08:00:00Z",
            "updated_at": "2026-01-05T08:00:00Z",
            "printed_at": null
        });
        let request: DocumentRequest = serde_json::from_value(json).unwrap();
        assert!(!request.document_type.is_known());
        assert!(request.requirements.is_empty());
        assert_eq!(request.amount.unwrap().to_string(), "75.50");
    }
}
