//! Typed client for the remote hand-notes API
//!
//! Server payloads are decoded once here; the rest of the crate only sees
//! [`messages`] types and [`crate::Error`].

pub mod client;
pub mod messages;

pub use client::ApiClient;
pub use messages::{
    AuthProbe, AuthToken, Hand, HandAndNote, HandPlayer, HandReference, Note, Player,
    PlayerDetails, Transcript, UserProfile,
};
