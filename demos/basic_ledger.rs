//! Basic ledger usage example

use bigdecimal::BigDecimal;
use bookkeeping_core::utils::MemoryStorage;
use bookkeeping_core::{
    observability, patterns, AccountType, Book, BookConfig, EntryType, NewGroup, NewLedger,
};
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_tracing();
    println!("🧾 Bookkeeping Core - Basic Ledger Example\n");

    // Open a fresh company with in-memory storage
    let mut book = Book::open(MemoryStorage::new(), BookConfig::default()).await?;

    // 1. Extend the seeded chart of accounts
    println!("📊 Setting up Chart of Accounts...");
    let office = book
        .create_group(NewGroup::new("Office Expenses", AccountType::Expense).under("g8"))
        .await?;
    let capital = book
        .create_ledger(NewLedger::new("Owner's Capital", "g1", BigDecimal::from(0), EntryType::Credit))
        .await?;
    let sales = book
        .create_ledger(NewLedger::new("Sales", "g5", BigDecimal::from(0), EntryType::Credit))
        .await?;
    let rent = book
        .create_ledger(NewLedger::new("Rent", &office.id, BigDecimal::from(0), EntryType::Debit))
        .await?;

    for group in &book.state().groups {
        println!("  ✓ Group: {} ({:?})", group.name, group.group_type);
    }
    println!();

    // 2. Post some vouchers; cash opens at zero so capital comes in by receipt
    println!("💰 Posting Vouchers...\n");
    let d = |day| NaiveDate::from_ymd_opt(2024, 4, day).ok_or("bad date");

    book.create_voucher(patterns::receipt(d(1)?, "l1", &capital.id, BigDecimal::from(20000), "Capital brought in")?)
        .await?;
    println!("  ✓ Receipt: ₹20,000 capital in cash");

    book.create_voucher(patterns::sale(d(5)?, "l1", &sales.id, BigDecimal::from(12000), "Counter sales")?)
        .await?;
    println!("  ✓ Sales: ₹12,000");

    book.create_voucher(patterns::payment(d(10)?, &rent.id, "l1", BigDecimal::from(8000), "April rent")?)
        .await?;
    println!("  ✓ Payment: ₹8,000 rent");

    // 3. Reports
    println!("\n📈 Generating Financial Reports...\n");

    println!("📒 Day Book:");
    for row in book.day_book() {
        println!(
            "  #{} {} {:?} {} ₹{}",
            row.number, row.date, row.voucher_type, row.particulars, row.amount
        );
    }
    println!();

    let trial_balance = book.trial_balance();
    println!("🔍 Trial Balance:");
    for row in &trial_balance.rows {
        println!("  {:<20} Dr {:>10} Cr {:>10}", row.ledger_name, row.debit, row.credit);
    }
    println!(
        "  Balanced: {}",
        if trial_balance.is_balanced { "✅ Yes" } else { "❌ No" }
    );
    println!();

    let pnl = book.profit_and_loss()?;
    println!("💹 Profit & Loss:");
    for line in &pnl.expense_side {
        println!("  Dr {}: ₹{}", line.label, line.amount);
    }
    for line in &pnl.income_side {
        println!("  Cr {}: ₹{}", line.label, line.amount);
    }
    println!();

    let balance_sheet = book.balance_sheet()?;
    println!("📊 Balance Sheet:");
    for line in &balance_sheet.liabilities {
        println!("  Liability {}: ₹{}", line.label, line.amount);
    }
    for line in &balance_sheet.assets {
        println!("  Asset {}: ₹{}", line.label, line.amount);
    }
    println!(
        "  Balanced: {}",
        if balance_sheet.is_balanced { "✅ Yes" } else { "❌ No" }
    );

    println!("\n💵 Cash: {}", book.ledger_balance("l1")?);
    Ok(())
}
