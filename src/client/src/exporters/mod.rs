pub mod encoder;
pub mod transport;

pub use encoder::{decode_payload, encode_event, encode_json, inflate_payload};
pub use transport::{auth_header, send_event, send_event_payload, Delivery};
