//! # pagseguro-dev
//!
//! Developer stub of the PagSeguro gateway.
//!
//! A client configured in developer mode sends every request here instead of
//! the live API. The stub keeps checkouts and transactions in memory, lets
//! you "pay" a checkout in the browser, and posts the resulting notification
//! to your store.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/pagseguro_developer/checkout` | Create checkout |
//! | GET | `/pagseguro_developer/payment?code=` | Pay a checkout |
//! | GET | `/pagseguro_developer_notification/{code}` | Transaction lookup |
//! | POST | `/webhook/pagseguro` | Sample notification receiver |

pub mod handlers;
pub mod routes;
pub mod state;
pub mod stub;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
