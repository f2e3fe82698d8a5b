//! Database seeder for Registra development and testing.
//!
//! Seeds a demo branch with two cashboxes and a handful of ledger entries
//! for local development. All entries go through the ledger service, so the
//! seeded data satisfies the same invariants as production data.
//!
//! Usage: cargo run --bin seeder

use std::time::Duration;

use rust_decimal_macros::dec;
use uuid::Uuid;

use registra_core::ledger::{EntryInput, EntryRef, ReferenceKind, TransactionCategory};
use registra_db::repositories::cashbox::CreateCashboxInput;
use registra_db::{CashboxRepository, Ledger};
use registra_shared::types::ActorId;

/// Demo branch ID (consistent for all seeds)
const DEMO_BRANCH_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo actor ID (consistent for all seeds)
const DEMO_ACTOR_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = registra_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let cashboxes = CashboxRepository::new(db.clone());
    let ledger = Ledger::new(db.clone(), Duration::from_secs(5));
    let branch_id = Uuid::parse_str(DEMO_BRANCH_ID).expect("valid demo branch id");
    let actor = ActorId::from_uuid(Uuid::parse_str(DEMO_ACTOR_ID).expect("valid demo actor id"));

    println!("Seeding front register...");
    let front = cashboxes
        .create(CreateCashboxInput {
            branch_id: Some(branch_id),
            name: "Front register".to_string(),
            initial_balance: dec!(1000),
        })
        .await
        .expect("Failed to create front register");

    println!("Seeding back-office safe...");
    let safe = cashboxes
        .create(CreateCashboxInput {
            branch_id: Some(branch_id),
            name: "Back-office safe".to_string(),
            initial_balance: dec!(0),
        })
        .await
        .expect("Failed to create back-office safe");

    println!("Recording sample entries...");
    ledger
        .record_income(
            front.id,
            EntryInput {
                amount: dec!(250),
                category: TransactionCategory::Payment,
                description: "Walk-in order payment".to_string(),
                actor,
                reference: Some(EntryRef {
                    kind: ReferenceKind::Payment,
                    id: Uuid::new_v4(),
                }),
                metadata: None,
            },
        )
        .await
        .expect("Failed to record payment");

    ledger
        .record_income(
            front.id,
            EntryInput {
                amount: dec!(400),
                category: TransactionCategory::CustodyDeposit,
                description: "Customer custody deposit".to_string(),
                actor,
                reference: Some(EntryRef {
                    kind: ReferenceKind::Custody,
                    id: Uuid::new_v4(),
                }),
                metadata: None,
            },
        )
        .await
        .expect("Failed to record custody deposit");

    ledger
        .record_expense(
            front.id,
            EntryInput {
                amount: dec!(85.50),
                category: TransactionCategory::Expense,
                description: "Cleaning supplies".to_string(),
                actor,
                reference: None,
                metadata: None,
            },
        )
        .await
        .expect("Failed to record expense");

    ledger
        .record_income(
            safe.id,
            EntryInput {
                amount: dec!(5000),
                category: TransactionCategory::InitialBalance,
                description: "Opening float transferred from head office".to_string(),
                actor,
                reference: None,
                metadata: None,
            },
        )
        .await
        .expect("Failed to record opening float");

    let front_report = ledger.reconcile(front.id).await.expect("Failed to reconcile");
    println!(
        "Front register balance: {} (drifted: {})",
        front_report.computed_balance, front_report.drifted
    );

    println!("Seeding complete!");
}
