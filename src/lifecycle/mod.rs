//! Session lifecycle transitions: start, terminate, submit, validate.

pub mod manager;

pub use manager::{
    start_session, submit_session, terminate_session, validate_session,
};
