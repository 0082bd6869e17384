//! Provisioning decisions derived from the package catalog.
//!
//! These functions only answer "may this be created?". Denial is an expected
//! outcome and is returned as a value. Making the answer stick against
//! concurrent writers is the job of the storage layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::aggregate::{get, Package, PackageId};

/// Why a provisioning request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DenyReason {
    /// The school already owns `limit` classes
    LimitReached { package: PackageId, limit: u32 },
    /// The school already has `quota` provisioned accounts
    QuotaExceeded { package: PackageId, quota: u32 },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::LimitReached { package, limit } => write!(
                f,
                "Batas maksimum kelas tercapai untuk paket {} ({} kelas).",
                package, limit
            ),
            DenyReason::QuotaExceeded { package, quota } => write!(
                f,
                "Kuota akun untuk paket {} sudah penuh ({} akun).",
                package, quota
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum Decision {
    Allow,
    Deny { reason: DenyReason },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Allow iff `current_class_count < max_classes`
pub fn can_create_class(package: &Package, current_class_count: u32) -> Decision {
    if current_class_count < package.max_classes {
        Decision::Allow
    } else {
        Decision::Deny {
            reason: DenyReason::LimitReached {
                package: package.id,
                limit: package.max_classes,
            },
        }
    }
}

/// Capacity stamped onto a new class record
pub fn class_capacity_for(package_id: PackageId) -> u32 {
    get(package_id).per_class_capacity
}

/// Allow iff `current_user_count < account_quota`
pub fn can_create_user(package: &Package, current_user_count: u32) -> Decision {
    if current_user_count < package.account_quota {
        Decision::Allow
    } else {
        Decision::Deny {
            reason: DenyReason::QuotaExceeded {
                package: package.id,
                quota: package.account_quota,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_limits_per_package() {
        for pkg in crate::domain::a001_package::catalog() {
            for count in 0..pkg.max_classes {
                assert!(can_create_class(pkg, count).is_allowed(), "{} at {}", pkg.id, count);
            }
            assert_eq!(
                can_create_class(pkg, pkg.max_classes),
                Decision::Deny {
                    reason: DenyReason::LimitReached {
                        package: pkg.id,
                        limit: pkg.max_classes
                    }
                }
            );
        }
    }

    #[test]
    fn test_siswa_never_gets_a_class() {
        let siswa = get(PackageId::Siswa);
        assert!(!can_create_class(siswa, 0).is_allowed());
        assert!(!can_create_class(siswa, 1).is_allowed());
    }

    #[test]
    fn test_capacity() {
        assert_eq!(class_capacity_for(PackageId::Kelas), 40);
        assert_eq!(class_capacity_for(PackageId::Angkatan), 40);
        assert_eq!(class_capacity_for(PackageId::Sekolah), 40);
        assert_eq!(class_capacity_for(PackageId::Siswa), 1);
    }

    #[test]
    fn test_user_quota() {
        let kelas = get(PackageId::Kelas);
        assert!(can_create_user(kelas, 39).is_allowed());
        assert_eq!(
            can_create_user(kelas, 40),
            Decision::Deny {
                reason: DenyReason::QuotaExceeded {
                    package: PackageId::Kelas,
                    quota: 40
                }
            }
        );
        let siswa = get(PackageId::Siswa);
        assert!(can_create_user(siswa, 0).is_allowed());
        assert!(!can_create_user(siswa, 1).is_allowed());
    }

    #[test]
    fn test_deny_message_names_package_and_limit() {
        let reason = DenyReason::LimitReached {
            package: PackageId::Angkatan,
            limit: 15,
        };
        let msg = reason.to_string();
        assert!(msg.contains("angkatan"));
        assert!(msg.contains("15"));
    }
}
