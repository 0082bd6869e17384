use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ID Type
// ============================================================================

/// Identifier of a purchasable package tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageId {
    /// Individual package for a single student
    Siswa,
    /// One class, 40 accounts
    Kelas,
    /// One grade year, 15 classes
    Angkatan,
    /// Whole school, 45 classes
    Sekolah,
}

impl PackageId {
    pub const ALL: [PackageId; 4] = [
        PackageId::Siswa,
        PackageId::Kelas,
        PackageId::Angkatan,
        PackageId::Sekolah,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageId::Siswa => "siswa",
            PackageId::Kelas => "kelas",
            PackageId::Angkatan => "angkatan",
            PackageId::Sekolah => "sekolah",
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned for any package identifier outside the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNotFound(pub String);

impl fmt::Display for PackageNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown package: '{}'", self.0)
    }
}

impl std::error::Error for PackageNotFound {}

impl FromStr for PackageId {
    type Err = PackageNotFound;

    /// Exact, case-sensitive match. There is no fallback tier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| PackageNotFound(s.to_string()))
    }
}

// ============================================================================
// Catalog entry
// ============================================================================

/// Static catalog entry: commercial and provisioning attributes of a tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: PackageId,
    pub name: &'static str,
    /// Price in rupiah
    pub price: i64,
    pub account_quota: u32,
    pub max_classes: u32,
    pub per_class_capacity: u32,
    pub description: &'static str,
}

impl Package {
    /// Item label sent to the payment gateway, e.g. "Paket Kelas - 40 Akun"
    pub fn item_name(&self) -> String {
        format!("Paket {} - {} Akun", self.name, self.account_quota)
    }
}

static CATALOG: [Package; 4] = [
    Package {
        id: PackageId::Siswa,
        name: "Siswa",
        price: 50_000,
        account_quota: 1,
        max_classes: 0,
        per_class_capacity: 1,
        description: "Paket individual untuk 1 siswa",
    },
    Package {
        id: PackageId::Kelas,
        name: "Kelas",
        price: 100_000,
        account_quota: 40,
        max_classes: 1,
        per_class_capacity: 40,
        description: "Paket untuk 1 kelas (40 akun)",
    },
    Package {
        id: PackageId::Angkatan,
        name: "Angkatan",
        price: 500_000,
        account_quota: 600,
        max_classes: 15,
        per_class_capacity: 40,
        description: "Paket untuk 1 angkatan (15 kelas, 600 akun)",
    },
    Package {
        id: PackageId::Sekolah,
        name: "Sekolah",
        price: 1_000_000,
        account_quota: 1800,
        max_classes: 45,
        per_class_capacity: 40,
        description: "Paket untuk seluruh sekolah (45 kelas, 1800 akun)",
    },
];

/// Full catalog in display order
pub fn catalog() -> &'static [Package] {
    &CATALOG
}

/// Catalog entry for a typed identifier
pub fn get(id: PackageId) -> &'static Package {
    match id {
        PackageId::Siswa => &CATALOG[0],
        PackageId::Kelas => &CATALOG[1],
        PackageId::Angkatan => &CATALOG[2],
        PackageId::Sekolah => &CATALOG[3],
    }
}

/// Resolve a raw identifier coming from a request or a stored record
pub fn lookup(package_id: &str) -> Result<&'static Package, PackageNotFound> {
    package_id.parse::<PackageId>().map(get)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_matches_policy_table() {
        let expected = [
            ("siswa", 50_000, 1, 0, 1),
            ("kelas", 100_000, 40, 1, 40),
            ("angkatan", 500_000, 600, 15, 40),
            ("sekolah", 1_000_000, 1800, 45, 40),
        ];
        for (id, price, quota, max_classes, capacity) in expected {
            let pkg = lookup(id).unwrap();
            assert_eq!(pkg.id.as_str(), id);
            assert_eq!(pkg.price, price);
            assert_eq!(pkg.account_quota, quota);
            assert_eq!(pkg.max_classes, max_classes);
            assert_eq!(pkg.per_class_capacity, capacity);
        }
    }

    #[test]
    fn test_lookup_unknown_is_not_found() {
        for raw in ["", "Kelas", "KELAS", " kelas", "premium", "default"] {
            assert_eq!(lookup(raw), Err(PackageNotFound(raw.to_string())));
        }
    }

    #[test]
    fn test_get_agrees_with_catalog_order() {
        for pkg in catalog() {
            assert_eq!(get(pkg.id), pkg);
        }
    }

    #[test]
    fn test_item_name() {
        assert_eq!(get(PackageId::Kelas).item_name(), "Paket Kelas - 40 Akun");
        assert_eq!(get(PackageId::Siswa).item_name(), "Paket Siswa - 1 Akun");
    }

    #[test]
    fn test_package_id_serde_is_lowercase() {
        let json = serde_json::to_string(&PackageId::Angkatan).unwrap();
        assert_eq!(json, "\"angkatan\"");
        let back: PackageId = serde_json::from_str("\"sekolah\"").unwrap();
        assert_eq!(back, PackageId::Sekolah);
    }
}
