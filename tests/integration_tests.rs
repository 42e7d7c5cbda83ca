//! Integration tests for bookkeeping-core

use bigdecimal::BigDecimal;
use bookkeeping_core::config::NumberingPolicy;
use bookkeeping_core::utils::{enhanced_rules, JsonFileStorage, MemoryStorage};
use bookkeeping_core::{
    patterns, AccountType, BankDetails, Book, BookConfig, CompanyStorage, EntryType, ErrorKind,
    InventoryAllocation, NewGroup, NewLedger, NewStockItem, NewVoucher, TaxDetails, VoucherEntry,
    VoucherType,
};
use chrono::NaiveDate;

fn dec(s: &str) -> BigDecimal {
    s.parse().unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
}

async fn open_book() -> (Book<MemoryStorage>, MemoryStorage) {
    let storage = MemoryStorage::new();
    let book = Book::open(storage.clone(), BookConfig::default()).await.unwrap();
    (book, storage)
}

async fn sales_ledger(book: &mut Book<MemoryStorage>) -> String {
    book.create_ledger(NewLedger::new("Sales", "g5", dec("0"), EntryType::Credit))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_sale_and_rent_workflow() {
    let (mut book, _) = open_book().await;
    let sales = sales_ledger(&mut book).await;
    let rent = book
        .create_ledger(NewLedger::new("Rent", "g8", dec("0"), EntryType::Debit))
        .await
        .unwrap()
        .id;

    book.create_voucher(patterns::sale(day(1), "l1", &sales, dec("1000"), "Counter sale").unwrap())
        .await
        .unwrap();

    assert_eq!(book.ledger_balance("l1").unwrap().to_string(), "1000.00 Dr");
    assert_eq!(book.ledger_balance(&sales).unwrap().to_string(), "1000.00 Cr");
    let pnl = book.profit_and_loss().unwrap();
    assert_eq!(pnl.total_income, dec("1000"));
    assert_eq!(pnl.net_profit, dec("1000"));

    book.create_voucher(patterns::payment(day(2), &rent, "l1", dec("500"), "April rent").unwrap())
        .await
        .unwrap();

    assert_eq!(book.ledger_balance("l1").unwrap().to_string(), "500.00 Dr");
    let pnl = book.profit_and_loss().unwrap();
    assert_eq!(pnl.net_profit, dec("500"));
    assert!(pnl.expense_side.iter().any(|l| l.label == "Net Profit" && l.amount == dec("500")));

    let sheet = book.balance_sheet().unwrap();
    assert!(sheet.is_balanced);
    assert_eq!(sheet.total_assets, dec("500"));
    assert_eq!(sheet.total_liabilities, dec("500"));
    assert!(sheet.liabilities.iter().any(|l| l.label == "Profit & Loss A/c"));

    let trial = book.trial_balance();
    assert!(trial.is_balanced);
    assert_eq!(trial.total_debit, trial.total_credit);

    let report = book.validate_integrity().unwrap();
    assert!(report.is_valid, "{:?}", report.issues);
}

#[tokio::test]
async fn test_unbalanced_voucher_rejected() {
    let (mut book, storage) = open_book().await;
    let sales = sales_ledger(&mut book).await;
    let saves = storage.save_count();

    let mut voucher = NewVoucher::new(VoucherType::Sales, day(3));
    voucher.entries.push(VoucherEntry::debit("l1", dec("100")));
    voucher.entries.push(VoucherEntry::credit(&sales, dec("90")));

    let err = book.create_voucher(voucher).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("10.00"), "{err}");
    assert!(book.state().vouchers.is_empty());
    assert_eq!(storage.save_count(), saves);
}

#[tokio::test]
async fn test_all_violations_reported_together() {
    let (mut book, _) = open_book().await;

    let mut voucher = NewVoucher::new(VoucherType::Journal, day(3));
    voucher.entries.push(VoucherEntry::debit("", dec("10")));
    voucher.entries.push(VoucherEntry::credit("nowhere", dec("-5")));

    let err = book.create_voucher(voucher).await.unwrap_err();
    // missing ledger, unknown ledger, negative amount, unbalanced
    assert_eq!(err.violations().len(), 4);
}

#[tokio::test]
async fn test_unknown_group_is_reference_error() {
    let (book, _) = open_book().await;
    assert_eq!(book.group_balance("g99").unwrap_err().kind(), ErrorKind::Reference);
    assert_eq!(book.ledger_balance("l99").unwrap_err().kind(), ErrorKind::Reference);
}

#[tokio::test]
async fn test_group_rollup_through_nested_groups() {
    let (mut book, _) = open_book().await;
    let sales = sales_ledger(&mut book).await;
    let petty = book
        .create_group(NewGroup::new("Petty Cash", AccountType::Asset).under("g4"))
        .await
        .unwrap();
    let drawer = book
        .create_ledger(NewLedger::new("Drawer", &petty.id, dec("250"), EntryType::Debit))
        .await
        .unwrap();

    book.create_voucher(patterns::sale(day(4), &drawer.id, &sales, dec("50"), "").unwrap())
        .await
        .unwrap();

    assert_eq!(book.group_balance(&petty.id).unwrap().to_string(), "300.00 Dr");
    assert_eq!(book.group_balance("g2").unwrap().to_string(), "300.00 Dr");

    let drill = book.group_drill_down("g4").unwrap();
    assert_eq!(drill.groups.len(), 1);
    assert_eq!(drill.ledgers.len(), 1);
    assert_eq!(drill.total.to_string(), "300.00 Dr");
}

#[tokio::test]
async fn test_delete_is_idempotent_and_symmetric() {
    let (mut book, _) = open_book().await;
    let sales = sales_ledger(&mut book).await;
    let before = book.ledger_balance("l1").unwrap();

    let voucher = book
        .create_voucher(patterns::sale(day(5), "l1", &sales, dec("720"), "").unwrap())
        .await
        .unwrap();
    assert_ne!(book.ledger_balance("l1").unwrap(), before);

    assert!(book.delete_voucher(&voucher.id).await.unwrap());
    assert_eq!(book.ledger_balance("l1").unwrap(), before);
    assert!(!book.delete_voucher(&voucher.id).await.unwrap());
    assert!(book.state().vouchers.is_empty());
}

#[tokio::test]
async fn test_sequential_numbers_never_reused() {
    let (mut book, _) = open_book().await;
    let sales = sales_ledger(&mut book).await;

    let mut ids = Vec::new();
    for n in 1..=3 {
        let v = book
            .create_voucher(patterns::sale(day(n), "l1", &sales, dec("10"), "").unwrap())
            .await
            .unwrap();
        assert_eq!(v.number, n as u64);
        ids.push(v.id);
    }

    book.delete_voucher(&ids[1]).await.unwrap();
    let next = book
        .create_voucher(patterns::sale(day(9), "l1", &sales, dec("10"), "").unwrap())
        .await
        .unwrap();
    assert_eq!(next.number, 4);
}

#[tokio::test]
async fn test_live_count_numbering() {
    let config = BookConfig {
        voucher_numbering: NumberingPolicy::LiveCount,
        ..BookConfig::default()
    };
    let mut book = Book::open(MemoryStorage::new(), config).await.unwrap();
    let sales = book
        .create_ledger(NewLedger::new("Sales", "g5", dec("0"), EntryType::Credit))
        .await
        .unwrap()
        .id;

    let first = book
        .create_voucher(patterns::sale(day(1), "l1", &sales, dec("10"), "").unwrap())
        .await
        .unwrap();
    book.create_voucher(patterns::sale(day(2), "l1", &sales, dec("10"), "").unwrap())
        .await
        .unwrap();
    book.delete_voucher(&first.id).await.unwrap();

    let third = book
        .create_voucher(patterns::sale(day(3), "l1", &sales, dec("10"), "").unwrap())
        .await
        .unwrap();
    assert_eq!(third.number, 2);
}

#[tokio::test]
async fn test_json_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("company.json");

    let mut book = Book::open(JsonFileStorage::new(&path), BookConfig::default())
        .await
        .unwrap();
    let bank = book
        .create_ledger(
            NewLedger::new("HDFC Current", "g3", dec("5000"), EntryType::Debit).with_bank_details(
                BankDetails {
                    account_number: Some("50200012345".to_string()),
                    ifsc: Some("HDFC0000123".to_string()),
                    bank_name: Some("HDFC Bank".to_string()),
                },
            ),
        )
        .await
        .unwrap();
    let export = book
        .create_ledger(NewLedger::new("Export Sales", "g5", dec("0"), EntryType::Credit).with_currency("USD"))
        .await
        .unwrap();

    let mut voucher = NewVoucher::new(VoucherType::Receipt, day(6));
    voucher.currency_symbol = Some("$".to_string());
    voucher
        .entries
        .push(VoucherEntry::debit(&bank.id, dec("8300")).with_forex(dec("100"), dec("83")));
    voucher.entries.push(VoucherEntry::credit(&export.id, dec("8300")));
    book.create_voucher(voucher).await.unwrap();

    let reopened = Book::open(JsonFileStorage::new(&path), BookConfig::default())
        .await
        .unwrap();
    assert_eq!(reopened.state(), book.state());

    let text = book.export_json().unwrap();
    let (mut other, _) = open_book().await;
    other.import_json(&text).await.unwrap();
    assert_eq!(other.state(), book.state());
    assert_eq!(other.ledger_balance(&bank.id).unwrap().to_string(), "13300.00 Dr");
}

#[tokio::test]
async fn test_rejected_import_keeps_state() {
    let (mut book, storage) = open_book().await;
    sales_ledger(&mut book).await;
    let before = book.state().clone();
    let saves = storage.save_count();

    let err = book.import_json("{\"groups\": [").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);

    let cyclic = r#"{
        "groups": [
            {"id": "a", "name": "A", "parentGroupId": "b", "type": "Asset"},
            {"id": "b", "name": "B", "parentGroupId": "a", "type": "Asset"}
        ],
        "ledgers": [],
        "financialYearStart": "2024-04-01"
    }"#;
    let err = book.import_json(cyclic).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);

    assert_eq!(book.state(), &before);
    assert_eq!(storage.save_count(), saves);
}

#[tokio::test]
async fn test_failed_save_rolls_back() {
    let (mut book, storage) = open_book().await;
    let sales = sales_ledger(&mut book).await;
    let before = book.state().clone();

    storage.set_fail_saves(true);
    let err = book
        .create_voucher(patterns::sale(day(7), "l1", &sales, dec("99"), "").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(book.state(), &before);

    storage.set_fail_saves(false);
    let voucher = book
        .create_voucher(patterns::sale(day(7), "l1", &sales, dec("99"), "").unwrap())
        .await
        .unwrap();
    assert_eq!(voucher.number, 1);
    assert_eq!(storage.load().await.unwrap().as_ref(), Some(book.state()));
}

#[tokio::test]
async fn test_inventory_vouchers_drive_stock_and_ledgers() {
    let (mut book, _) = open_book().await;
    let sales = sales_ledger(&mut book).await;
    let purchases = book
        .create_ledger(NewLedger::new("Purchases", "g6", dec("0"), EntryType::Debit))
        .await
        .unwrap()
        .id;
    let item = book
        .create_stock_item(
            NewStockItem::new("Widget", "Nos", dec("10"), dec("100"))
                .in_godown("gd1")
                .with_reorder_level(dec("12")),
        )
        .await
        .unwrap();

    book.create_voucher(
        patterns::purchase_of_stock(
            day(8),
            &purchases,
            "l1",
            vec![InventoryAllocation::new(&item.id, "gd1", dec("5"), dec("110"))],
            "Restock",
        )
        .unwrap(),
    )
    .await
    .unwrap();
    book.create_voucher(
        patterns::sale_of_stock(
            day(9),
            "l1",
            &sales,
            vec![InventoryAllocation::new(&item.id, "gd1", dec("3"), dec("150"))],
            "Retail",
        )
        .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(book.ledger_balance(&sales).unwrap().to_string(), "450.00 Cr");
    assert_eq!(book.ledger_balance("l1").unwrap().to_string(), "100.00 Cr");

    let valuation = book.stock_valuation();
    let row = &valuation.rows[0];
    assert_eq!(row.closing_quantity, dec("12"));
    assert_eq!(row.rate, dec("103.3333"));
    assert_eq!(row.value, dec("1240.00"));
    assert!(row.low_stock);

    let mut voucher = NewVoucher::new(VoucherType::Sales, day(10));
    voucher.entries.push(VoucherEntry::debit("l1", dec("10")));
    voucher.entries.push(
        VoucherEntry::credit(&sales, dec("10"))
            .with_allocation(InventoryAllocation::new("missing-item", "gd1", dec("1"), dec("10"))),
    );
    let err = book.create_voucher(voucher).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_gst_register_splits_by_state() {
    let config = BookConfig {
        gst: bookkeeping_core::config::GstConfig {
            home_state_code: Some("29".to_string()),
            ..Default::default()
        },
        ..BookConfig::default()
    };
    let mut book = Book::open(MemoryStorage::new(), config).await.unwrap();
    let sales = book
        .create_ledger(NewLedger::new("Sales @12%", "g5", dec("0"), EntryType::Credit).with_tax_details(
            TaxDetails {
                tax_rate: Some(dec("12")),
                ..TaxDetails::default()
            },
        ))
        .await
        .unwrap()
        .id;
    let local = book
        .create_ledger(NewLedger::new("Bangalore Traders", "g9", dec("0"), EntryType::Debit).with_tax_details(
            TaxDetails {
                gstin: Some("29ABCDE1234F1Z5".to_string()),
                ..TaxDetails::default()
            },
        ))
        .await
        .unwrap()
        .id;
    let outside = book
        .create_ledger(NewLedger::new("Mumbai Retail", "g9", dec("0"), EntryType::Debit).with_tax_details(
            TaxDetails {
                gstin: Some("27ABCDE1234F1Z5".to_string()),
                ..TaxDetails::default()
            },
        ))
        .await
        .unwrap()
        .id;

    book.create_voucher(patterns::sale(day(11), &local, &sales, dec("1000"), "").unwrap())
        .await
        .unwrap();
    book.create_voucher(patterns::sale(day(12), &outside, &sales, dec("2000"), "").unwrap())
        .await
        .unwrap();
    book.create_voucher(patterns::sale(day(13), "l1", &sales, dec("100"), "").unwrap())
        .await
        .unwrap();

    let register = book.gst_sales_register().unwrap();
    assert_eq!(register.rows.len(), 3);
    assert_eq!(register.rows[0].tax.cgst_amount, dec("60.00"));
    assert_eq!(register.rows[0].tax.sgst_amount, dec("60.00"));
    assert_eq!(register.rows[1].tax.igst_amount, dec("240.00"));
    assert_eq!(register.rows[2].gstin, "URP");
    assert_eq!(register.total_taxable_value, dec("3100"));
    assert_eq!(register.total_tax, dec("372.00"));
}

#[tokio::test]
async fn test_enhanced_rules_reject_duplicate_names() {
    let config = BookConfig::default();
    let rules = enhanced_rules(&config);
    let (book, _) = open_book().await;

    let mut data = book.state().clone();
    let err = data
        .create_ledger(NewLedger::new("cash", "g4", dec("0"), EntryType::Debit), &rules)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
