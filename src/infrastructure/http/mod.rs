// HTTP module - Remote API access
pub mod client;
pub mod payment;

pub use client::ApiClient;
pub use payment::{PaymentProvider, TokenPayment};
