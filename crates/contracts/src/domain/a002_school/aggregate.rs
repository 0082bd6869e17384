use serde::{Deserialize, Serialize};

use crate::domain::a001_package::PackageId;
use crate::domain::common::EntityMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn from_str_or_unpaid(s: &str) -> Self {
        match s {
            "paid" => PaymentStatus::Paid,
            _ => PaymentStatus::Unpaid,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// A registered school (one per registrant). `school_name` is the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub school_name: String,
    pub admin_email: String,
    pub selected_package: PackageId,
    pub payment_status: PaymentStatus,
    /// Denormalized number of class records, maintained by conditional writes
    pub class_count: u32,
    /// Denormalized number of provisioned accounts (students, teachers, parents)
    pub user_count: u32,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl School {
    pub fn new_for_insert(school_name: String, admin_email: String, package: PackageId) -> Self {
        Self {
            school_name: school_name.trim().to_string(),
            admin_email: admin_email.trim().to_lowercase(),
            selected_package: package,
            payment_status: PaymentStatus::Unpaid,
            class_count: 0,
            user_count: 0,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.school_name.is_empty() {
            return Err("School name must not be empty".into());
        }
        if !self.admin_email.contains('@') {
            return Err("Invalid admin email".into());
        }
        Ok(())
    }

    /// unpaid -> paid, exactly once. Returns false if already paid.
    pub fn mark_paid(&mut self) -> bool {
        match self.payment_status {
            PaymentStatus::Unpaid => {
                self.payment_status = PaymentStatus::Paid;
                self.metadata.touch();
                true
            }
            PaymentStatus::Paid => false,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// Super admin request to move a school to another tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePackageDto {
    pub package_type: String,
}
