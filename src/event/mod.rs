//! Inbound storage notifications
//!
//! Cloud Storage announces new objects through several delivery paths. This
//! module reduces all of them to a single [`ObjectReference`].

mod normalize;

pub use normalize::{is_supported_media, normalize, ObjectReference, SUPPORTED_EXTENSION};
