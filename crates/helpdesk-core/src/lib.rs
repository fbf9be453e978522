//! Session controller, tool loop, and port traits for the helpdesk agent.
//!
//! This crate defines the "ports" (store, gateway, and page-fetch traits)
//! that the infrastructure layer implements. It depends only on
//! `helpdesk-types` -- never on `helpdesk-infra` or any database/IO crate.

pub mod agent;
pub mod chat;
pub mod llm;
pub mod repository;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;
