//! End-to-end intake tests.
//!
//! These drive a [`Dropzone`](super::Dropzone) over in-memory and native
//! payloads and check what reaches the consumer callback.
