mod common;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use common::{brick_at, seed_brick, setup};
use sea_orm::DatabaseConnection;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::system_instruction;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use wall::edit::{assemble_edit_payment, confirm_edit, EditConfirmation, EditPaymentRequest};
use wall::WallError;

async fn seed_editable(db: &DatabaseConnection, x: i32, y: i32, asset: &str) {
    seed_brick(db, x, y, asset).await;
    db::store::mark_purchased_by_assets(db, &[asset.to_string()])
        .await
        .unwrap();
    db::store::set_image_location(db, x, y, Some(format!("images/{asset}.png")))
        .await
        .unwrap();
}

fn payment_tx(payer: &Pubkey, to: &Pubkey, lamports: u64) -> VersionedTransaction {
    let ix = system_instruction::transfer(payer, to, lamports);
    let mut tx = Transaction::new_with_payer(&[ix], Some(payer));
    tx.message.recent_blockhash = Hash::new_unique();
    VersionedTransaction::from(tx)
}

#[tokio::test]
async fn edit_payment_aggregates_price_across_bricks() {
    let h = setup().await;
    seed_editable(&h.db, 0, 0, "asset-a").await;
    seed_editable(&h.db, 1, 0, "asset-b").await;

    let payer = Pubkey::new_unique();
    let request = EditPaymentRequest {
        payer: payer.to_string(),
        bricks: vec![(0, 0), (1, 0)],
    };
    let encoded = assemble_edit_payment(&h.db, &h.chain, &h.config, &request)
        .await
        .unwrap();

    let tx: Transaction =
        bincode::deserialize(&BASE64_STANDARD.decode(&encoded).unwrap()).unwrap();
    assert_eq!(tx.message.account_keys[0], payer);
    let transfer = &tx.message.instructions[2];
    let lamports = u64::from_le_bytes(transfer.data[4..12].try_into().unwrap());
    assert_eq!(lamports, h.config.edit_price_lamports * 2);
}

#[tokio::test]
async fn edit_payment_requires_purchased_bricks_with_content() {
    let h = setup().await;
    seed_editable(&h.db, 0, 0, "asset-a").await;
    // Purchased but never filled.
    seed_brick(&h.db, 1, 0, "asset-b").await;
    db::store::mark_purchased_by_assets(&h.db, &["asset-b".to_string()])
        .await
        .unwrap();
    // Never purchased.
    seed_brick(&h.db, 2, 0, "asset-c").await;

    let request = EditPaymentRequest {
        payer: Pubkey::new_unique().to_string(),
        bricks: vec![(0, 0), (1, 0), (2, 0)],
    };
    let err = assemble_edit_payment(&h.db, &h.chain, &h.config, &request)
        .await
        .unwrap_err();
    match &err {
        WallError::NotEditable {
            not_purchased,
            missing_image,
        } => {
            assert_eq!(not_purchased, &vec![(2, 0)]);
            assert_eq!(missing_image, &vec![(1, 0), (2, 0)]);
        }
        other => panic!("expected NotEditable, got {other:?}"),
    }
    assert!(err.is_conflict());
}

#[tokio::test]
async fn confirmed_edit_consumes_the_transaction_exactly_once() {
    let h = setup().await;
    seed_editable(&h.db, 0, 0, "asset-a").await;

    let payer = Pubkey::new_unique();
    let signature = Signature::new_unique();
    h.ledger.add_transaction(
        signature,
        payment_tx(&payer, &h.config.funds_address, h.config.edit_price_lamports),
    );

    let request = EditConfirmation {
        username: "alice".to_string(),
        address: payer.to_string(),
        signature: signature.to_string(),
        bricks: vec![(0, 0)],
    };

    confirm_edit(&h.db, &h.chain, &h.state, &h.config, &request)
        .await
        .unwrap();

    // The payment re-opened the image slot.
    assert_eq!(brick_at(&h.db, 0, 0).await.image_location, None);
    assert!(db::store::edit_exists(&h.db, &signature.to_string())
        .await
        .unwrap());

    // Re-fill so only the replay check can reject the second attempt.
    db::store::set_image_location(&h.db, 0, 0, Some("images/again.png".to_string()))
        .await
        .unwrap();

    let err = confirm_edit(&h.db, &h.chain, &h.state, &h.config, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, WallError::EditAlreadyConsumed { .. }));
    assert!(err.is_conflict());
}

#[tokio::test]
async fn wrong_payment_amount_is_rejected() {
    let h = setup().await;
    seed_editable(&h.db, 0, 0, "asset-a").await;

    let payer = Pubkey::new_unique();
    let signature = Signature::new_unique();
    h.ledger.add_transaction(
        signature,
        payment_tx(&payer, &h.config.funds_address, h.config.edit_price_lamports - 1),
    );

    let request = EditConfirmation {
        username: "alice".to_string(),
        address: payer.to_string(),
        signature: signature.to_string(),
        bricks: vec![(0, 0)],
    };
    let err = confirm_edit(&h.db, &h.chain, &h.state, &h.config, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, WallError::PaymentMismatch(_)));

    // Nothing was consumed or mutated.
    assert!(!db::store::edit_exists(&h.db, &signature.to_string())
        .await
        .unwrap());
    assert!(brick_at(&h.db, 0, 0).await.image_location.is_some());
}

#[tokio::test]
async fn missing_payment_reports_not_found_after_retries() {
    let h = setup().await;
    seed_editable(&h.db, 0, 0, "asset-a").await;

    let request = EditConfirmation {
        username: "alice".to_string(),
        address: Pubkey::new_unique().to_string(),
        signature: Signature::new_unique().to_string(),
        bricks: vec![(0, 0)],
    };
    let err = confirm_edit(&h.db, &h.chain, &h.state, &h.config, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, WallError::PaymentNotFound(_)));
}
