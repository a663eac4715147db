//! Integration tests for the direct transfer entry point
//!
//! These tests run `start_bridge_tokens` end to end against an in-memory
//! ledger and check custody movements and the published notification.

use std::sync::Arc;

use bridge_orchestrator::{
    CustodyError, InMemoryAllowlist, OrchestratorError, RecordingSink, SimulatedVenue,
    TokenBridgeEndpoint, TransferOrchestrator,
};
use ethereum_types::{Address, U256};

#[path = "helpers.rs"]
mod test_helpers;
use test_helpers::{
    accepted_asset, caller, destination_endpoint, direct_request, funded_ledger, harness,
    harness_with, orchestrator_address, source_endpoint, source_token, swap_request, test_config, units,
    DUMMY_AMOUNT, DUMMY_FUNDING,
};

// ============================================================================
// SUCCESSFUL TRANSFERS
// ============================================================================

/// What is tested: a valid direct transfer moves exactly min_amount into the endpoint
/// Why: This is the core success path of the direct entry point
#[test]
fn test_direct_transfer_success() {
    let h = harness();
    let mut ledger = funded_ledger();
    let request = direct_request(units(DUMMY_AMOUNT));

    let receipt = h
        .orchestrator
        .start_bridge_tokens(&mut ledger, caller(), &request)
        .unwrap();

    assert_eq!(
        ledger.balance_of(&accepted_asset(), &source_endpoint()),
        units(DUMMY_AMOUNT)
    );
    assert_eq!(
        ledger.balance_of(&accepted_asset(), &caller()),
        units(DUMMY_FUNDING - DUMMY_AMOUNT)
    );
    // Nothing is left behind in custody
    assert_eq!(ledger.balance_of(&accepted_asset(), &orchestrator_address()), U256::zero());
    assert_eq!(
        ledger.allowance(&accepted_asset(), &orchestrator_address(), &source_endpoint()),
        U256::zero()
    );

    assert_eq!(receipt.produced_amount, units(DUMMY_AMOUNT));
    assert_eq!(receipt.surplus, U256::zero());
}

/// What is tested: the published notification carries every request field
/// Why: The notification is the only durable record of a started transfer
#[test]
fn test_direct_transfer_notification() {
    let h = harness();
    let mut ledger = funded_ledger();
    let request = direct_request(units(DUMMY_AMOUNT));

    let receipt = h
        .orchestrator
        .start_bridge_tokens(&mut ledger, caller(), &request)
        .unwrap();

    let events = h.sink.find(&request.transaction_id);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event, &receipt.event);
    assert_eq!(event.bridge_name, "gnosis");
    assert_eq!(event.sending_asset_id, accepted_asset());
    // xDAI is native on the destination chain
    assert_eq!(event.receiving_asset_id, Address::zero());
    assert_eq!(event.receiver, request.receiver);
    assert_eq!(event.min_amount, units(DUMMY_AMOUNT));
    assert_eq!(event.destination_chain_id, 100);
    assert!(!event.has_source_swaps);
    assert!(!event.has_destination_call);
}

/// What is tested: has_destination_call is carried through to the notification
/// Why: Destination-side execution is out of scope here but downstream relies on the flag
#[test]
fn test_direct_transfer_carries_destination_call_flag() {
    let h = harness();
    let mut ledger = funded_ledger();
    let mut request = direct_request(units(DUMMY_AMOUNT));
    request.has_destination_call = true;

    let receipt = h
        .orchestrator
        .start_bridge_tokens(&mut ledger, caller(), &request)
        .unwrap();

    assert!(receipt.event.has_destination_call);
}

/// What is tested: two transfers with the same transaction id both succeed
/// Why: Uniqueness of transaction ids is caller-supplied and not enforced
#[test]
fn test_direct_transfer_duplicate_transaction_id() {
    let h = harness();
    let mut ledger = funded_ledger();
    let request = direct_request(units(DUMMY_AMOUNT));

    h.orchestrator
        .start_bridge_tokens(&mut ledger, caller(), &request)
        .unwrap();
    h.orchestrator
        .start_bridge_tokens(&mut ledger, caller(), &request)
        .unwrap();

    assert_eq!(h.sink.find(&request.transaction_id).len(), 2);
    assert_eq!(
        ledger.balance_of(&accepted_asset(), &source_endpoint()),
        units(2 * DUMMY_AMOUNT)
    );
}

// ============================================================================
// CUSTODY FAULTS
// ============================================================================

/// What is tested: a caller without allowance gets an allowance fault
/// Why: Custody faults surface verbatim and the endpoint balance is unchanged
#[test]
fn test_direct_transfer_insufficient_allowance() {
    let h = harness();
    let mut ledger = funded_ledger();
    ledger.approve(accepted_asset(), caller(), orchestrator_address(), units(1));
    let before = ledger.clone();

    let result = h.orchestrator.start_bridge_tokens(
        &mut ledger,
        caller(),
        &direct_request(units(DUMMY_AMOUNT)),
    );

    assert!(matches!(
        result,
        Err(OrchestratorError::Custody(CustodyError::InsufficientAllowance { .. }))
    ));
    assert_eq!(ledger, before);
    assert_eq!(ledger.balance_of(&accepted_asset(), &source_endpoint()), U256::zero());
    assert!(h.sink.events().is_empty());
}

/// What is tested: a caller without funds gets a balance fault
/// Why: Partial funding is a failure, not a partial transfer
#[test]
fn test_direct_transfer_insufficient_balance() {
    let h = harness();
    let mut ledger = funded_ledger();
    ledger.approve(accepted_asset(), caller(), orchestrator_address(), U256::MAX);
    let before = ledger.clone();

    let result = h.orchestrator.start_bridge_tokens(
        &mut ledger,
        caller(),
        &direct_request(units(DUMMY_FUNDING + 1)),
    );

    assert!(matches!(
        result,
        Err(OrchestratorError::Custody(CustodyError::InsufficientBalance { .. }))
    ));
    assert_eq!(ledger, before);
    assert!(h.sink.events().is_empty());
}

// ============================================================================
// INVALID REQUESTS
// ============================================================================

/// What is tested: every validation failure leaves custody untouched
/// Why: Nothing observable may change when the request is rejected
#[test]
fn test_direct_transfer_invalid_requests_change_nothing() {
    let h = harness();
    let mut ledger = funded_ledger();
    let before = ledger.clone();

    let mut cases = Vec::new();
    cases.push((direct_request(U256::zero()), OrchestratorError::InvalidAmount));
    for bad_receiver in [Address::zero(), source_endpoint(), destination_endpoint()] {
        let mut request = direct_request(units(DUMMY_AMOUNT));
        request.receiver = bad_receiver;
        cases.push((request, OrchestratorError::InvalidReceiver));
    }
    let mut wrong_chain = direct_request(units(DUMMY_AMOUNT));
    wrong_chain.destination_chain_id = 10;
    cases.push((wrong_chain, OrchestratorError::InvalidDestinationChain));
    let mut wrong_token = direct_request(units(DUMMY_AMOUNT));
    wrong_token.sending_asset_id = source_token();
    cases.push((wrong_token, OrchestratorError::InvalidSendingToken));
    cases.push((swap_request(units(DUMMY_AMOUNT)), OrchestratorError::InvalidCallFlag));

    for (request, expected) in cases {
        let result = h.orchestrator.start_bridge_tokens(&mut ledger, caller(), &request);
        assert_eq!(result.unwrap_err(), expected);
        assert_eq!(ledger, before);
    }
    assert!(h.sink.events().is_empty());
}

// ============================================================================
// BRIDGE ENDPOINT FAILURES
// ============================================================================

/// What is tested: an amount outside the endpoint's limits reverts the whole transfer
/// Why: The deposit already pulled into custody must be undone
#[test]
fn test_direct_transfer_endpoint_limit() {
    let endpoint = TokenBridgeEndpoint::new(source_endpoint())
        .with_limits(None, Some(units(DUMMY_AMOUNT - 1)));
    let h = harness_with(Arc::new(SimulatedVenue), Arc::new(endpoint));
    let mut ledger = funded_ledger();
    let before = ledger.clone();

    let result = h.orchestrator.start_bridge_tokens(
        &mut ledger,
        caller(),
        &direct_request(units(DUMMY_AMOUNT)),
    );

    match result {
        Err(OrchestratorError::BridgeTransferReverted { reason }) => {
            assert!(reason.contains("not within limits"), "reason: {}", reason);
        }
        other => panic!("expected BridgeTransferReverted, got {:?}", other),
    }
    assert_eq!(ledger, before);
    assert!(h.sink.events().is_empty());
}

/// What is tested: an amount below the endpoint minimum is refused
/// Why: The xDai bridge enforces a per-transaction minimum
#[test]
fn test_direct_transfer_below_endpoint_minimum() {
    let endpoint =
        TokenBridgeEndpoint::new(source_endpoint()).with_limits(Some(units(DUMMY_AMOUNT + 1)), None);
    let h = harness_with(Arc::new(SimulatedVenue), Arc::new(endpoint));
    let mut ledger = funded_ledger();

    let result = h.orchestrator.start_bridge_tokens(
        &mut ledger,
        caller(),
        &direct_request(units(DUMMY_AMOUNT)),
    );

    assert!(matches!(result, Err(OrchestratorError::BridgeTransferReverted { .. })));
    assert_eq!(ledger, funded_ledger());
}

/// What is tested: the orchestrator refuses an endpoint at the wrong address
/// Why: Funds must only ever reach the adapter's source endpoint
#[test]
fn test_orchestrator_rejects_mismatched_endpoint() {
    let config = test_config();
    let result = TransferOrchestrator::new(
        config.adapter,
        Arc::new(InMemoryAllowlist::new()),
        Arc::new(SimulatedVenue),
        Arc::new(TokenBridgeEndpoint::new(destination_endpoint())),
        Arc::new(RecordingSink::new()),
    );

    assert!(result.is_err());
}
