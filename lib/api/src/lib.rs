//! # tasador API
//!
//! JSON REST surface over [`PricingEngine`](tasador_matching::PricingEngine).
//! One engine, and so one embedding model, is shared by every request.

pub mod rest;

pub use rest::{configure, PriceRequest, RestApi};
