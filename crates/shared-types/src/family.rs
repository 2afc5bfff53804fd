use serde::{Deserialize, Serialize};

/// A child as listed on the parent dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChildSummary {
    pub id: i64,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default)]
    pub attendance_rate: f64,
    #[serde(default)]
    pub average_grade: f64,
}

/// A fee line billed to a parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fee {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
}

impl Fee {
    pub fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case("pending")
    }
}

/// Sum of the amounts still pending.
pub fn outstanding_total(fees: &[Fee]) -> f64 {
    fees.iter().filter(|f| f.is_pending()).map(|f| f.amount).sum()
}
