//! HTTP handlers

pub mod about;
pub mod dashboard;
pub mod detection;
pub mod health;
pub mod quiz;
pub mod upload;
