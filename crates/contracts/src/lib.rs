//! Types shared between the Anak Hebat backend and its clients.
//!
//! Everything here is pure: the package catalog and provisioning policy,
//! aggregates, request/response DTOs and projection shapes.

pub mod domain;
pub mod projections;
pub mod system;
pub mod usecases;
