//! Outbound HTTP: the `reqwest` transport and the observability interceptor
//! that wraps it.

pub mod interceptor;
pub mod transport;

pub use interceptor::{LoggingInterceptor, INTERCEPTOR_SOURCE};
pub use transport::ReqwestTransport;
