//! GST sales register example

use bigdecimal::BigDecimal;
use bookkeeping_core::config::GstConfig;
use bookkeeping_core::utils::MemoryStorage;
use bookkeeping_core::{
    observability, patterns, Book, BookConfig, EntryType, GstCalculation, GstRate, NewLedger,
    SupplyKind, TaxDetails,
};
use chrono::NaiveDate;

fn party(name: &str, gstin: Option<&str>) -> NewLedger {
    let ledger = NewLedger::new(name, "g9", BigDecimal::from(0), EntryType::Debit);
    match gstin {
        Some(gstin) => ledger.with_tax_details(TaxDetails {
            gstin: Some(gstin.to_string()),
            ..TaxDetails::default()
        }),
        None => ledger,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_tracing();
    println!("🧾 Bookkeeping Core - GST Sales Register Example\n");

    // 1. A standalone calculation
    println!("🏢 Intra-state vs Inter-state on ₹10,000 at 18%:");
    let base = BigDecimal::from(10000);
    for kind in [SupplyKind::IntraState, SupplyKind::InterState] {
        let calc = GstCalculation::calculate(base.clone(), GstRate::for_supply(BigDecimal::from(18), kind))?;
        println!(
            "  {:?}: CGST ₹{} SGST ₹{} IGST ₹{} Invoice ₹{}",
            kind, calc.cgst_amount, calc.sgst_amount, calc.igst_amount, calc.invoice_value
        );
    }
    println!();

    // 2. A company registered in Karnataka (29)
    let config = BookConfig {
        gst: GstConfig {
            home_state_code: Some("29".to_string()),
            ..GstConfig::default()
        },
        ..BookConfig::default()
    };
    let mut book = Book::open(MemoryStorage::new(), config).await?;

    let sales = book
        .create_ledger(
            NewLedger::new("Sales @12%", "g5", BigDecimal::from(0), EntryType::Credit).with_tax_details(
                TaxDetails {
                    tax_rate: Some(BigDecimal::from(12)),
                    ..TaxDetails::default()
                },
            ),
        )
        .await?;
    let local = book.create_ledger(party("Bangalore Traders", Some("29ABCDE1234F1Z5"))).await?;
    let outside = book.create_ledger(party("Mumbai Retail", Some("27ABCDE1234F1Z5"))).await?;
    let walk_in = book.create_ledger(party("Walk-in Customer", None)).await?;

    let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).ok_or("bad date");
    book.create_voucher(patterns::sale(d(2)?, &local.id, &sales.id, BigDecimal::from(25000), "Invoice 001")?)
        .await?;
    book.create_voucher(patterns::sale(d(3)?, &outside.id, &sales.id, BigDecimal::from(40000), "Invoice 002")?)
        .await?;
    book.create_voucher(patterns::sale(d(4)?, &walk_in.id, &sales.id, BigDecimal::from(1500), "Cash memo")?)
        .await?;

    // 3. The register
    let register = book.gst_sales_register()?;
    println!("📋 GST Sales Register:");
    for row in &register.rows {
        println!(
            "  #{} {} {:<20} {:<16} taxable ₹{} CGST ₹{} SGST ₹{} IGST ₹{}",
            row.number,
            row.date,
            row.party_name,
            row.gstin,
            row.tax.taxable_value,
            row.tax.cgst_amount,
            row.tax.sgst_amount,
            row.tax.igst_amount
        );
    }
    println!();
    println!("  Taxable: ₹{}", register.total_taxable_value);
    println!("  CGST:    ₹{}", register.total_cgst);
    println!("  SGST:    ₹{}", register.total_sgst);
    println!("  IGST:    ₹{}", register.total_igst);
    println!("  Tax:     ₹{}", register.total_tax);

    Ok(())
}
