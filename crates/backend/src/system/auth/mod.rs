pub mod extractor;
pub mod jwt;
pub mod password;
pub mod service;
pub mod session_repository;
