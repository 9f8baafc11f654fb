use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    CategoryCmd, ChangeCmd, Currency, DebitsCreditsCmd, Engine, EngineError, Money,
    TransactionKind, TransactionListFilter, UpdateTransactionCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![user.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

async fn reference_minor(engine: &Engine, id: Uuid, user: &str) -> Option<i64> {
    engine
        .transaction(id, user)
        .await
        .unwrap()
        .reference_amount
        .map(Money::amount_minor)
}

#[tokio::test]
async fn account_currency_debit_mirrors_amount() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let id = engine
        .new_debits_credits(DebitsCreditsCmd::new(
            account, "alice", "Groceries", -4250, date(1, 3),
        ))
        .await
        .unwrap();

    let tx = engine.transaction(id, "alice").await.unwrap();
    assert_eq!(tx.kind, TransactionKind::DebitsCredits);
    assert_eq!(tx.amount, Money::new(-4250, Currency::Eur));
    assert_eq!(tx.reference_amount, Some(Money::new(-4250, Currency::Eur)));
}

#[tokio::test]
async fn foreign_debit_without_rate_stays_unresolved() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let id = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Taxi", -1000, date(1, 3))
                .currency(Currency::Usd),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, id, "alice").await, None);

    let balance = engine.account_balance(account, "alice").await.unwrap();
    assert_eq!(balance.balance_minor, 0);
    assert_eq!(balance.entries, 1);
    assert_eq!(balance.unresolved, 1);
}

#[tokio::test]
async fn new_change_fills_later_debits() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let debit = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Dinner", -38_000, date(1, 10))
                .currency(Currency::Thb),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, debit, "alice").await, None);

    let change = engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "ATM",
            -10_000,
            380_000,
            Currency::Thb,
            date(1, 5),
        ))
        .await
        .unwrap();

    assert_eq!(reference_minor(&engine, debit, "alice").await, Some(-1000));
    assert_eq!(reference_minor(&engine, change, "alice").await, Some(-10_000));

    let tx = engine.transaction(change, "alice").await.unwrap();
    assert_eq!(tx.exchange_rate(), Some(dec!(38)));
}

#[tokio::test]
async fn debit_before_any_change_gets_no_rate() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "ATM",
            -10_000,
            380_000,
            Currency::Thb,
            date(1, 5),
        ))
        .await
        .unwrap();
    let debit = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Dinner", -38_000, date(1, 4))
                .currency(Currency::Thb),
        )
        .await
        .unwrap();

    assert_eq!(reference_minor(&engine, debit, "alice").await, None);
}

#[tokio::test]
async fn multi_hop_chain_prices_foreign_debit() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "To francs",
            -10_000,
            9_500,
            Currency::Chf,
            date(1, 1),
        ))
        .await
        .unwrap();
    engine
        .new_change(
            ChangeCmd::new(
                account,
                "alice",
                "To baht",
                -9_500,
                380_000,
                Currency::Thb,
                date(1, 10),
            )
            .currency(Currency::Chf),
        )
        .await
        .unwrap();
    engine
        .new_change(
            ChangeCmd::new(
                account,
                "alice",
                "To dollars",
                -380_000,
                10_500,
                Currency::Usd,
                date(1, 20),
            )
            .currency(Currency::Thb),
        )
        .await
        .unwrap();

    let debit = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Hotel", -5_000, date(1, 25))
                .currency(Currency::Usd),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, debit, "alice").await, Some(-4762));

    let rate = engine
        .exchange_rate("alice", Currency::Usd, Currency::Eur, date(1, 25))
        .await
        .unwrap();
    assert_eq!(rate.map(|r| r.round_dp(6)), Some(dec!(0.952381)));

    let before_dollars = engine
        .exchange_rate("alice", Currency::Usd, Currency::Eur, date(1, 15))
        .await
        .unwrap();
    assert_eq!(before_dollars, None);
}

#[tokio::test]
async fn update_change_cascade_stops_at_next_change() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let january = engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "January ATM",
            -10_000,
            350_000,
            Currency::Thb,
            date(1, 1),
        ))
        .await
        .unwrap();
    engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "February ATM",
            -10_000,
            400_000,
            Currency::Thb,
            date(2, 1),
        ))
        .await
        .unwrap();

    let in_january = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Market", -35_000, date(1, 15))
                .currency(Currency::Thb),
        )
        .await
        .unwrap();
    let in_february = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Market", -40_000, date(2, 15))
                .currency(Currency::Thb),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, in_january, "alice").await, Some(-1000));
    assert_eq!(reference_minor(&engine, in_february, "alice").await, Some(-1000));

    engine
        .update_change(
            january,
            "alice",
            UpdateTransactionCmd::new().new_amount_minor(500_000),
        )
        .await
        .unwrap();

    assert_eq!(reference_minor(&engine, in_january, "alice").await, Some(-700));
    assert_eq!(reference_minor(&engine, in_february, "alice").await, Some(-1000));
}

#[tokio::test]
async fn force_save_skips_cascade_until_recompute() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let change = engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "ATM",
            -10_000,
            400_000,
            Currency::Thb,
            date(2, 1),
        ))
        .await
        .unwrap();
    let debit = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Market", -40_000, date(2, 15))
                .currency(Currency::Thb),
        )
        .await
        .unwrap();

    engine
        .force_save_change(
            change,
            "alice",
            UpdateTransactionCmd::new().new_amount_minor(500_000),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, debit, "alice").await, Some(-1000));

    let updated = engine.recompute_reference_amounts("alice").await.unwrap();
    assert_eq!(updated, 1);
    assert_eq!(reference_minor(&engine, debit, "alice").await, Some(-800));
}

#[tokio::test]
async fn moving_a_change_later_clears_the_old_window() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let change = engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "ATM",
            -10_000,
            380_000,
            Currency::Thb,
            date(1, 1),
        ))
        .await
        .unwrap();
    let debit = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Dinner", -38_000, date(1, 10))
                .currency(Currency::Thb),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, debit, "alice").await, Some(-1000));

    engine
        .update_change(change, "alice", UpdateTransactionCmd::new().date(date(1, 20)))
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, debit, "alice").await, None);
}

#[tokio::test]
async fn deleting_a_change_recomputes_its_window() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let change = engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "ATM",
            -10_000,
            380_000,
            Currency::Thb,
            date(1, 1),
        ))
        .await
        .unwrap();
    let debit = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Dinner", -38_000, date(1, 10))
                .currency(Currency::Thb),
        )
        .await
        .unwrap();

    engine.delete_transaction(change, "alice").await.unwrap();

    assert_eq!(reference_minor(&engine, debit, "alice").await, None);
    let err = engine.transaction(change, "alice").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );
}

#[tokio::test]
async fn inactive_change_provides_no_rate() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    engine
        .new_change(
            ChangeCmd::new(
                account,
                "alice",
                "Draft ATM",
                -10_000,
                380_000,
                Currency::Thb,
                date(1, 1),
            )
            .active(false),
        )
        .await
        .unwrap();
    let debit = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Dinner", -38_000, date(1, 10))
                .currency(Currency::Thb),
        )
        .await
        .unwrap();

    assert_eq!(reference_minor(&engine, debit, "alice").await, None);
}

#[tokio::test]
async fn invalid_changes_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let same_currency = engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "Nothing",
            -10_000,
            10_000,
            Currency::Eur,
            date(1, 1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(same_currency, EngineError::InvalidChange(_)));

    let zero = engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "Nothing",
            0,
            10_000,
            Currency::Usd,
            date(1, 1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(zero, EngineError::InvalidChange(_)));
}

#[tokio::test]
async fn kind_specific_updates_reject_other_kind() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let debit = engine
        .new_debits_credits(DebitsCreditsCmd::new(
            account, "alice", "Rent", -80_000, date(1, 1),
        ))
        .await
        .unwrap();
    let change = engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "ATM",
            -10_000,
            11_000,
            Currency::Usd,
            date(1, 1),
        ))
        .await
        .unwrap();

    let err = engine
        .update_change(debit, "alice", UpdateTransactionCmd::new().name("x"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("change not exists".to_string()));

    let err = engine
        .update_debits_credits(change, "alice", UpdateTransactionCmd::new().name("x"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("debits_credits not exists".to_string())
    );

    let err = engine.delete_change(debit, "alice").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("change not exists".to_string()));
}

#[tokio::test]
async fn update_debit_recomputes_reference() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "ATM",
            -10_000,
            11_000,
            Currency::Usd,
            date(1, 1),
        ))
        .await
        .unwrap();
    let debit = engine
        .new_debits_credits(DebitsCreditsCmd::new(
            account, "alice", "Lunch", -1_500, date(1, 2),
        ))
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, debit, "alice").await, Some(-1_500));

    engine
        .update_debits_credits(
            debit,
            "alice",
            UpdateTransactionCmd::new()
                .amount_minor(-2_200)
                .currency(Currency::Usd),
        )
        .await
        .unwrap();

    let tx = engine.transaction(debit, "alice").await.unwrap();
    assert_eq!(tx.amount, Money::new(-2_200, Currency::Usd));
    assert_eq!(tx.reference_amount, Some(Money::new(-2_000, Currency::Eur)));
}

#[tokio::test]
async fn rates_cross_accounts_and_account_delete_cascades() {
    let (engine, _db) = engine_with_db().await;
    let main = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();
    let exchange = engine
        .new_account("Exchange", Currency::Eur, "alice")
        .await
        .unwrap();

    engine
        .new_change(ChangeCmd::new(
            exchange,
            "alice",
            "Bureau",
            -10_000,
            11_000,
            Currency::Usd,
            date(1, 1),
        ))
        .await
        .unwrap();
    let debit = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(main, "alice", "Museum", -1_100, date(1, 10))
                .currency(Currency::Usd),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, debit, "alice").await, Some(-1_000));

    engine.delete_account(exchange, "alice").await.unwrap();

    assert_eq!(reference_minor(&engine, debit, "alice").await, None);
    let accounts = engine.list_accounts("alice", true).await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Main");
}

#[tokio::test]
async fn users_are_isolated() {
    let (engine, _db) = engine_with_db().await;
    let alice_account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();
    let bob_account = engine.new_account("Main", Currency::Eur, "bob").await.unwrap();

    engine
        .new_change(ChangeCmd::new(
            alice_account,
            "alice",
            "ATM",
            -10_000,
            11_000,
            Currency::Usd,
            date(1, 1),
        ))
        .await
        .unwrap();

    let bob_debit = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(bob_account, "bob", "Coffee", -500, date(1, 2))
                .currency(Currency::Usd),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, bob_debit, "bob").await, None);

    let err = engine.account(alice_account, "bob").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("account not exists".to_string()));

    let err = engine
        .new_debits_credits(DebitsCreditsCmd::new(
            alice_account, "bob", "Sneaky", -100, date(1, 2),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("account not exists".to_string()));

    let err = engine.transaction(bob_debit, "alice").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );
}

#[tokio::test]
async fn account_names_are_unique_per_user() {
    let (engine, _db) = engine_with_db().await;
    let main = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let err = engine
        .new_account(" main ", Currency::Usd, "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("main".to_string()));

    engine.new_account("Main", Currency::Usd, "bob").await.unwrap();

    engine.rename_account(main, "Daily", "alice").await.unwrap();
    engine.set_account_archived(main, true, "alice").await.unwrap();
    assert!(engine.list_accounts("alice", false).await.unwrap().is_empty());

    let account = engine.account(main, "alice").await.unwrap();
    assert_eq!(account.name, "Daily");
    assert!(account.archived);
}

#[tokio::test]
async fn balance_sums_active_debits_credits() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    engine
        .new_debits_credits(DebitsCreditsCmd::new(
            account, "alice", "Salary", 250_000, date(1, 1),
        ))
        .await
        .unwrap();
    engine
        .new_debits_credits(DebitsCreditsCmd::new(
            account, "alice", "Rent", -80_000, date(1, 2),
        ))
        .await
        .unwrap();
    engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Maybe", -5_000, date(1, 3)).active(false),
        )
        .await
        .unwrap();
    engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "ATM",
            -10_000,
            11_000,
            Currency::Usd,
            date(1, 4),
        ))
        .await
        .unwrap();

    let balance = engine.account_balance(account, "alice").await.unwrap();
    assert_eq!(balance.balance(), Money::new(170_000, Currency::Eur));
    assert_eq!(balance.entries, 2);
    assert_eq!(balance.unresolved, 0);
}

#[tokio::test]
async fn list_transactions_filters() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    engine
        .new_debits_credits(DebitsCreditsCmd::new(
            account, "alice", "Rent", -80_000, date(1, 1),
        ))
        .await
        .unwrap();
    engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Draft", -1_000, date(1, 5)).active(false),
        )
        .await
        .unwrap();
    engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "ATM",
            -10_000,
            11_000,
            Currency::Usd,
            date(1, 10),
        ))
        .await
        .unwrap();

    let all = engine
        .list_transactions("alice", &TransactionListFilter::default())
        .await
        .unwrap();
    let names: Vec<_> = all.iter().map(|tx| tx.name.as_str()).collect();
    assert_eq!(names, vec!["ATM", "Rent"]);

    let with_drafts = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                include_inactive: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(with_drafts.len(), 3);

    let changes = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                kind: Some(TransactionKind::Change),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].new_amount, Some(Money::new(11_000, Currency::Usd)));

    let early = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                account_id: Some(account),
                to: Some(date(1, 9)),
                include_inactive: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(early.len(), 2);

    assert!(
        engine
            .list_transactions("bob", &TransactionListFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn deleting_category_reparents_children_and_clears_transactions() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let food = engine
        .new_category(CategoryCmd::new("alice", "Food").color("#FFAA00"))
        .await
        .unwrap();
    let restaurants = engine
        .new_category(CategoryCmd::new("alice", "Restaurants").parent_id(food))
        .await
        .unwrap();

    let err = engine
        .new_category(CategoryCmd::new("alice", "restaurants").parent_id(food))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("restaurants".to_string()));

    let err = engine
        .new_category(CategoryCmd::new("bob", "Snacks").parent_id(food))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("category not exists".to_string())
    );

    let debit = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Groceries", -4_000, date(1, 1))
                .category_id(food),
        )
        .await
        .unwrap();

    engine.delete_category(food, "alice").await.unwrap();

    let categories = engine.list_categories("alice").await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].id, restaurants);
    assert_eq!(categories[0].parent_id, None);

    let tx = engine.transaction(debit, "alice").await.unwrap();
    assert_eq!(tx.category_id, None);
}

#[tokio::test]
async fn empty_names_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .new_account("   ", Currency::Eur, "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidName("account name must not be empty".to_string())
    );
}

#[tokio::test]
async fn change_is_priced_with_its_own_rate() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let change = engine
        .new_change(
            ChangeCmd::new(account, "alice", "Back home", -10_000, 300, Currency::Eur, date(1, 1))
                .currency(Currency::Thb),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, change, "alice").await, Some(-300));

    engine
        .update_change(change, "alice", UpdateTransactionCmd::new().new_amount_minor(400))
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, change, "alice").await, Some(-400));

    engine
        .update_change(change, "alice", UpdateTransactionCmd::new())
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, change, "alice").await, Some(-400));
}

#[tokio::test]
async fn balance_overflow_is_an_error() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    for name in ["Jackpot", "Another jackpot"] {
        engine
            .new_debits_credits(DebitsCreditsCmd::new(
                account,
                "alice",
                name,
                i64::MAX,
                date(1, 1),
            ))
            .await
            .unwrap();
    }

    let err = engine.account_balance(account, "alice").await.unwrap_err();
    assert_eq!(err, EngineError::InvalidAmount("balance too large".to_string()));
}

#[tokio::test]
async fn oversized_conversion_stays_unresolved_in_cascade() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Baht", Currency::Thb, "alice").await.unwrap();

    let huge = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Huge", -(i64::MAX / 2), date(2, 1))
                .currency(Currency::Eur),
        )
        .await
        .unwrap();
    let small = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Coffee", -500, date(2, 2))
                .currency(Currency::Eur),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, huge, "alice").await, None);

    engine
        .new_change(
            ChangeCmd::new(account, "alice", "ATM", -10_000, 380_000, Currency::Thb, date(1, 1))
                .currency(Currency::Eur),
        )
        .await
        .unwrap();

    assert_eq!(reference_minor(&engine, huge, "alice").await, None);
    assert_eq!(reference_minor(&engine, small, "alice").await, Some(-19_000));
}

#[tokio::test]
async fn cascade_leaves_rows_after_the_next_change_alone() {
    let (engine, _db) = engine_with_db().await;
    let account = engine.new_account("Main", Currency::Eur, "alice").await.unwrap();

    let january = engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "January ATM",
            -10_000,
            350_000,
            Currency::Thb,
            date(1, 1),
        ))
        .await
        .unwrap();
    let february = engine
        .new_change(ChangeCmd::new(
            account,
            "alice",
            "February ATM",
            -10_000,
            400_000,
            Currency::Thb,
            date(2, 1),
        ))
        .await
        .unwrap();
    let in_february = engine
        .new_debits_credits(
            DebitsCreditsCmd::new(account, "alice", "Market", -40_000, date(2, 15))
                .currency(Currency::Thb),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, in_february, "alice").await, Some(-1000));

    // Stale on purpose: the February rate is now 50 but the debit keeps 40.
    engine
        .force_save_change(
            february,
            "alice",
            UpdateTransactionCmd::new().new_amount_minor(500_000),
        )
        .await
        .unwrap();

    engine
        .update_change(
            january,
            "alice",
            UpdateTransactionCmd::new().new_amount_minor(500_000),
        )
        .await
        .unwrap();
    assert_eq!(reference_minor(&engine, in_february, "alice").await, Some(-1000));

    engine.recompute_reference_amounts("alice").await.unwrap();
    assert_eq!(reference_minor(&engine, in_february, "alice").await, Some(-800));
}
