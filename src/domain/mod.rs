//! Domain layer: local records mirroring the gateway's remote objects,
//! the wire payloads exchanged with it, and the ports implemented by the
//! infrastructure layer.

pub mod card;
pub mod charge;
pub mod customer;
pub mod plan;
pub mod ports;
pub mod refund;
pub mod remote;
pub mod subscription;
