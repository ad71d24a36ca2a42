//! Infrastructure Layer
//!
//! Provider HTTP clients and transaction persistence.

pub mod http;
pub mod mada;
pub mod memory;
pub mod paypal;
pub mod postgres;
pub mod processor;
pub mod stc_pay;
pub mod stripe;

pub use mada::MadaProcessor;
pub use memory::MemoryTransactionRepository;
pub use paypal::PayPalProcessor;
pub use postgres::PgTransactionRepository;
pub use processor::{Processor, build_processors};
pub use stc_pay::StcPayProcessor;
pub use stripe::StripeProcessor;
