mod common;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use common::{brick_at, seed_brick, setup};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use wall::purchase::{assemble_purchase_batch, PurchaseRequest};
use wall::WallError;

fn decode(encoded: &str) -> Transaction {
    let bytes = BASE64_STANDARD.decode(encoded).unwrap();
    bincode::deserialize(&bytes).unwrap()
}

#[tokio::test]
async fn one_transaction_per_brick_not_owned_by_purchaser() {
    let h = setup().await;
    let purchaser = Pubkey::new_unique();
    let service = h.chain.service_address();
    let tree = Pubkey::new_unique();
    h.ledger.add_tree(&tree, 14, 5);

    for (i, asset) in ["asset-a", "asset-b", "asset-c"].iter().enumerate() {
        seed_brick(&h.db, i as i32, 0, asset).await;
        h.das.add_asset(asset, &service, &tree, 14);
    }

    let request = PurchaseRequest {
        purchaser: purchaser.to_string(),
        bricks: vec![(0, 0), (1, 0), (2, 0)],
    };
    let txs = assemble_purchase_batch(&h.db, &h.chain, &h.config, &request)
        .await
        .unwrap();
    assert_eq!(txs.len(), 3);

    for encoded in &txs {
        let tx = decode(encoded);
        // Fee payer is the purchaser and the batch shares one checkpoint.
        assert_eq!(tx.message.account_keys[0], purchaser);
        assert_eq!(tx.message.recent_blockhash, h.ledger.blockhash);
        // compute budget x2, price, service fee, leaf transfer, tip
        assert_eq!(tx.message.instructions.len(), 6);
    }
}

#[tokio::test]
async fn bricks_already_owned_by_purchaser_are_skipped() {
    let h = setup().await;
    let purchaser = Pubkey::new_unique();
    let service = h.chain.service_address();
    let tree = Pubkey::new_unique();
    h.ledger.add_tree(&tree, 14, 5);

    seed_brick(&h.db, 0, 0, "asset-a").await;
    seed_brick(&h.db, 1, 0, "asset-b").await;
    h.das.add_asset("asset-a", &service, &tree, 14);
    h.das.add_asset("asset-b", &purchaser, &tree, 14);

    let request = PurchaseRequest {
        purchaser: purchaser.to_string(),
        bricks: vec![(0, 0), (1, 0)],
    };
    let txs = assemble_purchase_batch(&h.db, &h.chain, &h.config, &request)
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);
}

#[tokio::test]
async fn bricks_owned_by_third_party_are_excluded_not_fatal() {
    let h = setup().await;
    let purchaser = Pubkey::new_unique();
    let service = h.chain.service_address();
    let somebody = Pubkey::new_unique();
    let tree = Pubkey::new_unique();
    h.ledger.add_tree(&tree, 14, 5);

    seed_brick(&h.db, 0, 0, "asset-a").await;
    seed_brick(&h.db, 1, 0, "asset-b").await;
    h.das.add_asset("asset-a", &service, &tree, 14);
    h.das.add_asset("asset-b", &somebody, &tree, 14);

    let request = PurchaseRequest {
        purchaser: purchaser.to_string(),
        bricks: vec![(0, 0), (1, 0)],
    };
    let txs = assemble_purchase_batch(&h.db, &h.chain, &h.config, &request)
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);

    // The store is untouched by assembly; reconciliation owns the flag.
    assert!(!brick_at(&h.db, 1, 0).await.purchased);
}

#[tokio::test]
async fn unknown_brick_fails_the_whole_batch() {
    let h = setup().await;
    seed_brick(&h.db, 0, 0, "asset-a").await;

    let request = PurchaseRequest {
        purchaser: Pubkey::new_unique().to_string(),
        bricks: vec![(0, 0), (99, 99)],
    };
    let err = assemble_purchase_batch(&h.db, &h.chain, &h.config, &request)
        .await
        .unwrap_err();
    match &err {
        WallError::UnknownBricks { missing } => assert_eq!(missing, &vec![(99, 99)]),
        other => panic!("expected UnknownBricks, got {other:?}"),
    }
    assert!(err.is_validation());
}

#[tokio::test]
async fn malformed_purchaser_address_is_rejected() {
    let h = setup().await;
    let request = PurchaseRequest {
        purchaser: "not-an-address".to_string(),
        bricks: vec![],
    };
    let err = assemble_purchase_batch(&h.db, &h.chain, &h.config, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, WallError::InvalidAddress(_)));
}
