//! Broker messaging: topic namespace, payload codec, transport trait and
//! the gateway that ties them to the application core.

pub mod codec;
pub mod gateway;
pub mod topics;
pub mod transport;

pub use gateway::MessagingGateway;
pub use transport::{InboundMessage, MqttTransport};
