//! Shared test helpers for bridge orchestrator tests
//!
//! This module provides constants and builders used across the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bridge_orchestrator::{
    AllowlistRegistry, BridgeEndpoint, BridgeTransactionRequest, Config, InMemoryAllowlist, Ledger,
    RecordingSink, SimulatedVenue, SwapCallInvoker, SwapStep, TokenBridgeEndpoint,
    TransferOrchestrator,
};
use ethereum_types::{Address, H256, U256};

// ============================================================================
// CONSTANTS
// ============================================================================

// -------------------------------- USERS ---------------------------------

/// Dummy caller funding the transfer
pub const DUMMY_CALLER_ADDR: &str = "0x00000000000000000000000000000000000000aa";

/// Dummy beneficiary on the destination chain
pub const DUMMY_RECEIVER_ADDR: &str = "0x00000000000000000000000000000000000000bb";

/// Dummy referrer for attribution metadata
pub const DUMMY_REFERRER_ADDR: &str = "0x00000000000000000000000000000000000000cc";

// ------------------------- TOKENS AND CONTRACTS -------------------------

/// Dummy token swapped into the accepted asset (e.g. a stablecoin)
pub const DUMMY_SOURCE_TOKEN_ADDR: &str = "0x000000000000000000000000000000000000000a";

/// Dummy token produced by the first leg of a two-step swap
pub const DUMMY_INTERMEDIATE_TOKEN_ADDR: &str = "0x000000000000000000000000000000000000000b";

/// Dummy allow-listed swap venue
pub const DUMMY_VENUE_ADDR: &str = "0x000000000000000000000000000000000000000d";

/// Second allow-listed swap venue
pub const DUMMY_SECOND_VENUE_ADDR: &str = "0x000000000000000000000000000000000000000e";

/// Swap venue that is never allow-listed
pub const DUMMY_UNLISTED_VENUE_ADDR: &str = "0x000000000000000000000000000000000000000f";

/// Router granted spending rights on behalf of a venue
pub const DUMMY_ROUTER_ADDR: &str = "0x0000000000000000000000000000000000000010";

// -------------------------------- AMOUNTS -------------------------------

/// Accepted-asset amount bridged by default
pub const DUMMY_AMOUNT: u64 = 100;

/// Balance every funded account starts with
pub const DUMMY_FUNDING: u64 = 1_000;

/// Reserves each venue holds per asset
pub const DUMMY_VENUE_RESERVES: u64 = 10_000;

// ============================================================================
// ADDRESS AND AMOUNT HELPERS
// ============================================================================

/// Parses a `0x`-prefixed 40-hex-character address.
pub fn address(hex_str: &str) -> Address {
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(hex_str.trim_start_matches("0x"), &mut bytes).unwrap();
    Address::from(bytes)
}

/// `n` whole tokens at 18 decimals.
pub fn units(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

pub fn caller() -> Address {
    address(DUMMY_CALLER_ADDR)
}

pub fn receiver() -> Address {
    address(DUMMY_RECEIVER_ADDR)
}

pub fn source_token() -> Address {
    address(DUMMY_SOURCE_TOKEN_ADDR)
}

pub fn intermediate_token() -> Address {
    address(DUMMY_INTERMEDIATE_TOKEN_ADDR)
}

pub fn venue() -> Address {
    address(DUMMY_VENUE_ADDR)
}

pub fn second_venue() -> Address {
    address(DUMMY_SECOND_VENUE_ADDR)
}

pub fn unlisted_venue() -> Address {
    address(DUMMY_UNLISTED_VENUE_ADDR)
}

pub fn router() -> Address {
    address(DUMMY_ROUTER_ADDR)
}

/// The accepted asset of the default adapter (DAI).
pub fn accepted_asset() -> Address {
    test_config().adapter.accepted_asset
}

pub fn source_endpoint() -> Address {
    test_config().adapter.source_endpoint
}

pub fn destination_endpoint() -> Address {
    test_config().adapter.destination_endpoint
}

pub fn orchestrator_address() -> Address {
    test_config().adapter.orchestrator_address
}

/// Random transaction id, so tests never share correlation ids.
pub fn random_tx_id() -> H256 {
    H256::from(rand::random::<[u8; 32]>())
}

// ============================================================================
// CONFIG AND REQUEST BUILDERS
// ============================================================================

/// Default xDai bridge adapter with both dummy venues allow-listed.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.allowlist.contracts = vec![address(DUMMY_VENUE_ADDR), address(DUMMY_SECOND_VENUE_ADDR)];
    config.allowlist.function_signatures = vec![SimulatedVenue::SWAP_SIGNATURE.to_string()];
    config
}

/// A valid direct-path request for `amount` of the accepted asset.
pub fn direct_request(amount: U256) -> BridgeTransactionRequest {
    let config = test_config();
    BridgeTransactionRequest {
        transaction_id: random_tx_id(),
        bridge_name: config.adapter.bridge_name.clone(),
        integrator: "test-integrator".to_string(),
        referrer: address(DUMMY_REFERRER_ADDR),
        sending_asset_id: config.adapter.accepted_asset,
        receiver: receiver(),
        min_amount: amount,
        destination_chain_id: config.adapter.destination_chain_id,
        has_source_swaps: false,
        has_destination_call: false,
    }
}

/// A valid swap-path request for `amount` of the accepted asset.
pub fn swap_request(amount: U256) -> BridgeTransactionRequest {
    BridgeTransactionRequest {
        has_source_swaps: true,
        ..direct_request(amount)
    }
}

/// A swap step through `venue` that pays back `amount_out` of `destination_asset`.
pub fn swap_step(
    venue: Address,
    source_asset: Address,
    destination_asset: Address,
    source_amount: U256,
    amount_out: U256,
    requires_deposit: bool,
) -> SwapStep {
    SwapStep {
        call_target: venue,
        approval_target: venue,
        source_asset,
        destination_asset,
        call_payload: SimulatedVenue::encode_swap(amount_out),
        source_amount,
        requires_deposit,
    }
}

// ============================================================================
// LEDGER AND ORCHESTRATOR BUILDERS
// ============================================================================

/// Ledger where the caller holds and has approved the orchestrator for every
/// test asset, and both venues hold reserves of every asset.
pub fn funded_ledger() -> Ledger {
    let mut ledger = Ledger::new();
    let custody = orchestrator_address();
    for asset in [accepted_asset(), source_token(), intermediate_token()] {
        ledger.mint(asset, caller(), units(DUMMY_FUNDING)).unwrap();
        ledger.approve(asset, caller(), custody, units(DUMMY_FUNDING));
        for reserve_holder in [venue(), second_venue(), unlisted_venue()] {
            ledger
                .mint(asset, reserve_holder, units(DUMMY_VENUE_RESERVES))
                .unwrap();
        }
    }
    ledger
}

/// Orchestrator plus the test doubles it was wired with.
pub struct TestHarness {
    pub orchestrator: TransferOrchestrator,
    pub allowlist: Arc<InMemoryAllowlist>,
    pub sink: Arc<RecordingSink>,
}

/// Orchestrator over `SimulatedVenue` and an unlimited token bridge endpoint.
pub fn harness() -> TestHarness {
    harness_with(
        Arc::new(SimulatedVenue),
        Arc::new(TokenBridgeEndpoint::new(source_endpoint())),
    )
}

/// Orchestrator over the given invoker and endpoint.
pub fn harness_with(
    invoker: Arc<dyn SwapCallInvoker>,
    endpoint: Arc<dyn BridgeEndpoint>,
) -> TestHarness {
    harness_from(test_allowlist(), invoker, endpoint)
}

/// Registry seeded from the `[allowlist]` section of [`test_config`].
pub fn test_allowlist() -> Arc<InMemoryAllowlist> {
    let config = test_config();
    Arc::new(InMemoryAllowlist::from_parts(
        config.allowlist.contracts.iter().copied(),
        &config.allowlist.function_signatures,
    ))
}

/// Orchestrator reading `allowlist`, for tests whose doubles mutate the registry.
pub fn harness_from(
    allowlist: Arc<InMemoryAllowlist>,
    invoker: Arc<dyn SwapCallInvoker>,
    endpoint: Arc<dyn BridgeEndpoint>,
) -> TestHarness {
    let _ = tracing_subscriber::fmt::try_init();

    let sink = Arc::new(RecordingSink::new());
    let registry: Arc<dyn AllowlistRegistry> = allowlist.clone();

    let orchestrator = TransferOrchestrator::new(
        test_config().adapter,
        registry,
        invoker,
        endpoint,
        sink.clone(),
    )
    .unwrap();

    TestHarness {
        orchestrator,
        allowlist,
        sink,
    }
}
