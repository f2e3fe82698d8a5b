//! Concurrent access tests for the ledger service.
//!
//! Validates single-writer-per-cashbox serialization: many tasks hammering
//! one cashbox settle at the sequential-equivalent balance with a fully
//! derivable balance_after chain, while independent cashboxes proceed in
//! parallel. Tests skip when no database is reachable.

mod common;

use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

use registra_core::ledger::{EntryView, TransactionCategory, TransactionKind, verify_chain};
use registra_db::repositories::transaction::TransactionFilter;
use registra_db::{CashboxRepository, TransactionRepository};
use registra_shared::types::PageRequest;

// ============================================================================
// Test: alternating income/expense on one cashbox settles exactly
// ============================================================================
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_writers_settle_exactly() {
    let Some(db) = common::prepare().await else {
        return;
    };

    const WRITERS: usize = 50;
    let opening = dec!(100);
    let amount = dec!(1);

    let cashbox = common::new_cashbox(&db, opening).await;
    let ledger = Arc::new(common::ledger(&db));
    let barrier = Arc::new(Barrier::new(WRITERS));

    let mut handles = Vec::with_capacity(WRITERS);
    for i in 0..WRITERS {
        let ledger = Arc::clone(&ledger);
        let barrier = Arc::clone(&barrier);
        let cashbox_id = cashbox.id;

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            if i % 2 == 0 {
                ledger
                    .record_income(
                        cashbox_id,
                        common::entry(amount, TransactionCategory::Payment),
                    )
                    .await
            } else {
                ledger
                    .record_expense(
                        cashbox_id,
                        common::entry(amount, TransactionCategory::Expense),
                    )
                    .await
            }
        }));
    }

    for result in join_all(handles).await {
        result
            .expect("task should not panic")
            .expect("writes never overdraw: the opening balance covers every interleaving");
    }

    // 25 incomes and 25 expenses of 1 cancel out exactly.
    let repo = CashboxRepository::new(db.clone());
    let final_balance = repo.get(cashbox.id).await.unwrap().current_balance;
    assert_eq!(final_balance, opening, "lost update detected");

    // Replay agrees with the stored balance.
    let report = ledger.reconcile(cashbox.id).await.unwrap();
    assert!(!report.drifted);
    assert_eq!(report.computed_balance, opening);

    // The balance_after snapshots form a derivable chain in commit order.
    let page = TransactionRepository::new(db.clone())
        .list(
            cashbox.id,
            TransactionFilter::default(),
            PageRequest {
                page: 1,
                per_page: 100,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.meta.total, WRITERS as u64);

    let mut rows = page.data;
    rows.sort_by_key(|t| t.seq);
    let chain: Vec<(EntryView, Decimal)> = rows
        .iter()
        .map(|t| {
            (
                EntryView {
                    kind: TransactionKind::from(t.kind),
                    amount: t.amount,
                    reversed_kind: None,
                },
                t.balance_after,
            )
        })
        .collect();
    assert!(
        verify_chain(opening, &chain).unwrap(),
        "balance_after chain broken under concurrency"
    );
}

// ============================================================================
// Test: the zero floor holds under concurrent overdraw pressure
// ============================================================================
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overdraw_pressure_never_goes_negative() {
    let Some(db) = common::prepare().await else {
        return;
    };

    const WRITERS: usize = 30;
    // Only 10 of the 30 unit expenses can ever succeed.
    let opening = dec!(10);

    let cashbox = common::new_cashbox(&db, opening).await;
    let ledger = Arc::new(common::ledger(&db));
    let barrier = Arc::new(Barrier::new(WRITERS));

    let mut handles = Vec::with_capacity(WRITERS);
    for _ in 0..WRITERS {
        let ledger = Arc::clone(&ledger);
        let barrier = Arc::clone(&barrier);
        let cashbox_id = cashbox.id;

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            ledger
                .record_expense(cashbox_id, common::entry(dec!(1), TransactionCategory::Expense))
                .await
        }));
    }

    let mut succeeded = 0u32;
    for result in join_all(handles).await {
        if result.expect("task should not panic").is_ok() {
            succeeded += 1;
        }
    }
    assert_eq!(succeeded, 10, "exactly the available balance may be spent");

    let repo = CashboxRepository::new(db.clone());
    assert_eq!(repo.get(cashbox.id).await.unwrap().current_balance, dec!(0));

    let report = ledger.reconcile(cashbox.id).await.unwrap();
    assert!(!report.drifted);
}

// ============================================================================
// Test: independent cashboxes proceed in parallel
// ============================================================================
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_cashboxes_do_not_interfere() {
    let Some(db) = common::prepare().await else {
        return;
    };

    const PER_BOX: usize = 20;
    let box_a = common::new_cashbox(&db, dec!(0)).await;
    let box_b = common::new_cashbox(&db, dec!(0)).await;
    let ledger = Arc::new(common::ledger(&db));
    let barrier = Arc::new(Barrier::new(PER_BOX * 2));

    let mut handles = Vec::with_capacity(PER_BOX * 2);
    for cashbox_id in [box_a.id, box_b.id] {
        for _ in 0..PER_BOX {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);

            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                ledger
                    .record_income(cashbox_id, common::entry(dec!(2), TransactionCategory::Payment))
                    .await
            }));
        }
    }

    for result in join_all(handles).await {
        result.expect("task should not panic").expect("incomes never fail");
    }

    let repo = CashboxRepository::new(db.clone());
    assert_eq!(repo.get(box_a.id).await.unwrap().current_balance, dec!(40));
    assert_eq!(repo.get(box_b.id).await.unwrap().current_balance, dec!(40));
}
