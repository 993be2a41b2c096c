//! HTTP transport and configuration for the fetal health service

pub mod api;
pub mod config;
