//! End-to-end tests for stc-provider.
//!
//! The first group pins the wire format: a fixed transfer signed with the
//! RFC 8032 test key must produce byte-identical BCS, signature, and
//! transaction id to what a Starcoin node computes. The second group runs
//! the full client flow against the in-memory chain: keystore, signer,
//! submission, block production, and confirmation.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use stc_provider::crypto::keys::AccountKeypair;
use stc_provider::gateway::{EventFilter, GatewayError, InMemoryGateway, NodeGateway, SubmissionError};
use stc_provider::transaction::{peer_to_peer, sign_message, sign_raw_user_transaction};
use stc_provider::types::{
    AccountAddress, AuthenticationKey, ChainId, RawUserTransactionBuilder, SignedUserTransaction,
    TransactionAuthenticator,
};
use stc_provider::{ConfirmationState, Keystore, ReceiptIdentifier, Signer, SignerError, TransactionRequest};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// RFC 8032 test vector 1 secret key.
const RFC_SECRET: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
const RFC_PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
const RFC_ADDRESS: &str = "0xf4eb152cfd2054c1080fd9d57c48913b";

const GOLDEN_RAW: &str = concat!(
    "00000000000000000000000000000001",
    "0500000000000000",
    "02",
    "00000000000000000000000000000001",
    "0f5472616e73666572536372697074730c706565725f746f5f70656572",
    "01070000000000000000000000000000000103535443035354430003",
    "1000000000000000000000000000000001",
    "0100",
    "1000040000000000000000000000000000",
    "8096980000000000",
    "0100000000000000",
    "0d3078313a3a5354433a3a535443",
    "7c3ea36000000000",
    "fe",
);

const GOLDEN_SIGNATURE: &str = "5aab5daa600c5b85a18e48aa315d656b9302d78977763d30891e4018106fbd418c0291bf40a7930bf827b51de48ea66459f89635433bd0052951f69942ce3501";

const GOLDEN_TXN_ID: &str = "b4674bd3929b97025576b4d30912aeae0e5b04206c8588c77df1162af75a31cd";

const GOLDEN_MESSAGE_SIGNATURE: &str = "c7a8149a29b0638fb53b94719815b9fe6306fbce1a6003b160d21d7a720370fa76036797396f65153d46c395a221ca603d6b252cdedf248b1009cdc548adde0d";

const PASSWORD: &str = "e2e password";

fn rfc_keypair() -> AccountKeypair {
    AccountKeypair::from_hex(RFC_SECRET).unwrap()
}

/// Sender 0x1, sequence 5, 1024 nanoSTC to 0x1 on the dev chain.
fn golden_transaction() -> SignedUserTransaction {
    let raw = RawUserTransactionBuilder::new(
        AccountAddress::ONE,
        ChainId::dev(),
        peer_to_peer("0x1", 1024, None).unwrap(),
    )
    .sequence_number(5)
    .expiration_timestamp_secs(1_621_311_100)
    .build();
    sign_raw_user_transaction(&rfc_keypair(), raw).unwrap()
}

/// A dev chain with the RFC key's account funded, and an unlocked signer
/// for it.
async fn funded_signer(balance: u128) -> (Arc<InMemoryGateway>, Signer<InMemoryGateway>) {
    let keypair = rfc_keypair();
    let gateway = Arc::new(InMemoryGateway::default());
    gateway.create_account(AuthenticationKey::ed25519(&keypair.public_key()), balance);

    let keystore = Keystore::encrypt(&keypair, PASSWORD).unwrap();
    let keystore = Keystore::from_json(&keystore.to_json().unwrap()).unwrap();
    let signer = Signer::new(Arc::clone(&gateway), keystore);
    signer.unlock(PASSWORD).await.unwrap();
    (gateway, signer)
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[test]
fn raw_transaction_bytes_match_node_encoding() {
    let txn = golden_transaction();
    assert_eq!(txn.raw_txn().to_hex().unwrap(), GOLDEN_RAW);
}

#[test]
fn signature_and_id_match_node() {
    let txn = golden_transaction();

    match txn.authenticator() {
        TransactionAuthenticator::Ed25519 {
            public_key,
            signature,
        } => {
            assert_eq!(public_key.to_hex(), RFC_PUBLIC);
            assert_eq!(signature.to_hex(), GOLDEN_SIGNATURE);
        }
        other => panic!("unexpected authenticator {:?}", other),
    }
    assert!(txn.verify_signature());
    assert_eq!(txn.id().unwrap().to_hex(), GOLDEN_TXN_ID);
}

#[test]
fn signed_transaction_bytes_and_decode() {
    let txn = golden_transaction();
    let expected = format!("{}0020{}40{}", GOLDEN_RAW, RFC_PUBLIC, GOLDEN_SIGNATURE);

    let hex = txn.to_hex().unwrap();
    assert_eq!(hex, expected);

    let decoded = SignedUserTransaction::from_hex(&hex).unwrap();
    assert_eq!(decoded, txn);
    assert_eq!(decoded.id().unwrap().to_hex(), GOLDEN_TXN_ID);
}

#[test]
fn message_signature_matches_node() {
    let keypair = rfc_keypair();
    let account = AccountAddress::from_public_key(&keypair.public_key());
    assert_eq!(account.to_string(), RFC_ADDRESS);

    let signed = sign_message(&keypair, account, b"hello", ChainId::dev()).unwrap();
    assert_eq!(signed.signature().unwrap().to_hex(), GOLDEN_MESSAGE_SIGNATURE);
    assert!(signed.verify());
    assert!(signed.verify_for_account());
}

#[test]
fn receipt_identifier_for_rfc_key() {
    let public_key = rfc_keypair().public_key();
    let auth_key = AuthenticationKey::ed25519(&public_key);
    let receipt = ReceiptIdentifier::new(auth_key.derived_address(), Some(auth_key));

    let encoded = receipt.encode();
    assert_eq!(
        encoded,
        "stc1p7n432t8ayp2vzzq0m82hcjy38d3u2g27sams69ae7nx503mhuv30f6c49n7jq4xppq8an4tufzgnkr54zge"
    );
    assert_eq!(ReceiptIdentifier::decode(&encoded).unwrap(), receipt);

    // The address-only form is shorter and carries no key.
    let bare = ReceiptIdentifier::new(auth_key.derived_address(), None);
    let decoded = ReceiptIdentifier::decode(&bare.encode()).unwrap();
    assert_eq!(decoded.address, auth_key.derived_address());
    assert_eq!(decoded.auth_key, None);
}

// ---------------------------------------------------------------------------
// Client flow
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn send_transfer_and_wait_for_confirmation() {
    let (gateway, signer) = funded_signer(1_000_000_000).await;
    assert_eq!(signer.address().to_string(), RFC_ADDRESS);

    // Pay a fresh account through its receipt identifier so the chain can
    // create it with the right auth key.
    let payee_key = AccountKeypair::from_bytes(&[42u8; 32]);
    let payee_auth = AuthenticationKey::ed25519(&payee_key.public_key());
    let receipt = ReceiptIdentifier::new(payee_auth.derived_address(), Some(payee_auth));
    let payload = peer_to_peer(&receipt.encode(), 5_000, None).unwrap();

    let pending = signer
        .send_transaction(TransactionRequest::new(payload))
        .await
        .unwrap();
    assert_eq!(pending.status().await.unwrap(), ConfirmationState::Pending);

    let producer = Arc::clone(&gateway);
    tokio::spawn(async move {
        time::sleep(Duration::from_millis(1_500)).await;
        producer.produce_block();
        time::sleep(Duration::from_secs(1)).await;
        producer.produce_block();
    });

    let info = pending.wait(1, Duration::from_secs(60)).await.unwrap();
    assert_eq!(info.transaction_hash, pending.hash());
    assert_eq!(info.block_number, 1);
    assert!(info.status.is_executed());

    assert_eq!(
        gateway.get_balance(payee_auth.derived_address(), None).await.unwrap(),
        Some(5_000)
    );
    assert_eq!(gateway.get_sequence_number(signer.address()).await.unwrap(), 1);

    let events = gateway.get_events_of_transaction(pending.hash()).await.unwrap();
    assert_eq!(events.len(), 2);

    let in_range = gateway
        .query_events(&EventFilter {
            from_block: Some(0),
            to_block: Some(2),
            ..EventFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(in_range.len(), 2);
}

#[tokio::test]
async fn reused_sequence_number_is_refused() {
    let (gateway, signer) = funded_signer(1_000_000_000).await;
    let transfer = || TransactionRequest::new(peer_to_peer("0x1", 1, None).unwrap());

    for _ in 0..5 {
        signer.send_transaction(transfer()).await.unwrap();
    }
    gateway.produce_block();
    assert_eq!(gateway.get_sequence_number(signer.address()).await.unwrap(), 5);

    let first = signer.send_transaction(transfer()).await.unwrap();
    assert_eq!(gateway.pending_count(), 1);

    // Same sequence number while the first is still in the pool.
    let err = signer
        .send_transaction(transfer().sequence_number(5))
        .await
        .unwrap_err();
    match err {
        SignerError::Gateway(GatewayError::Submission(SubmissionError::SequenceNumberTooOld(_))) => {}
        other => panic!("expected a stale sequence rejection, got {:?}", other),
    }
    assert_eq!(gateway.pending_count(), 1);

    // The first one is unaffected and still confirms.
    gateway.produce_blocks(2);
    assert!(matches!(
        first.status().await.unwrap(),
        ConfirmationState::Confirmed { .. }
    ));
    assert_eq!(gateway.get_sequence_number(signer.address()).await.unwrap(), 6);
}

#[tokio::test]
async fn underfunded_account_cannot_pay_for_gas() {
    let (_gateway, signer) = funded_signer(10).await;

    let err = signer
        .send_transaction(TransactionRequest::new(peer_to_peer("0x1", 1, None).unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SignerError::Gateway(GatewayError::Submission(
            SubmissionError::InsufficientBalanceForGas(_)
        ))
    ));
}

#[tokio::test]
async fn gas_estimate_while_locked() {
    let (gateway, signer) = funded_signer(1_000_000_000).await;
    signer.lock().await;

    let gas = signer
        .estimate_gas(TransactionRequest::new(peer_to_peer("0x1", 1, None).unwrap()))
        .await
        .unwrap();
    assert!(gas > 0);
    assert_eq!(gateway.pending_count(), 0);
    assert_eq!(gateway.block_number().await.unwrap(), 0);
}
