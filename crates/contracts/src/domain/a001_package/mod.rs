pub mod aggregate;
pub mod policy;

pub use aggregate::{catalog, get, lookup, Package, PackageId, PackageNotFound};
pub use policy::{can_create_class, can_create_user, class_capacity_for, Decision, DenyReason};
