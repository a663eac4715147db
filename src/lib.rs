//! Bridge orchestrator library
//!
//! Validates a bridge transaction request, optionally swaps the caller's asset
//! through allow-listed venues, and dispatches the result to a single-destination
//! bridge endpoint as one all-or-nothing unit.

pub mod allowlist;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod ledger;
pub mod orchestrator;
pub mod service;
pub mod swap;
pub mod types;
pub mod validator;

// Re-export public types for convenience
pub use allowlist::{function_selector, AllowlistRegistry, InMemoryAllowlist, Selector};
pub use config::{AllowlistConfig, BridgeAdapterConfig, Config, EndpointConfig};
pub use dispatcher::{BridgeDispatcher, BridgeEndpoint, TokenBridgeEndpoint};
pub use error::{CustodyError, OrchestratorError};
pub use events::{NotificationSink, RecordingSink, TracingSink, TransferStarted};
pub use ledger::Ledger;
pub use orchestrator::{Staging, TransferOrchestrator, TransferReceipt, TransferState};
pub use service::TransferService;
pub use swap::{SimulatedVenue, SwapCall, SwapCallInvoker, SwapExecutor};
pub use types::{BridgeTransactionRequest, EntryPoint, SwapStep};
pub use validator::BridgeDataValidator;
