//! Clinic management backend: patient registration, lookup and substring
//! search with a case-insensitive email-uniqueness rule, plus appointment
//! scheduling, over a swappable storage layer.

pub mod domain;
pub mod rest;
pub mod storage;
