//! Model gateway abstraction.
//!
//! - `ModelGateway`: RPITIT trait implemented by concrete backends in helpdesk-infra
//! - `BoxModelGateway`: object-safe wrapper for runtime backend selection

pub mod box_gateway;
pub mod gateway;
