//! Transport layer: SOAP wire-format details (serialization/deserialization).

mod enqueue;

pub use enqueue::{
    CONTENT_TYPE, SOAP_ACTION, TransportError, decode_enqueue_response, encode_enqueue_envelope,
};
