//! Application layer: the payment gateway client.
//!
//! [`gateway::GatewayClient`] assembles, signs and sends requests and turns
//! the bank's answers into typed results.

pub mod endpoint;
pub mod gateway;
