//! Invoice computation examples

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;
use std::sync::Arc;

use einvoice_core::{
    irn, AppliedTax, HsnRegistry, Invoice, LineItemBuilder, TaxCategory, TaxEngine,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 E-Invoice Core - Invoice Workflow Examples\n");

    // 1. HSN registry with the built-in classification table
    let registry = Arc::new(HsnRegistry::with_defaults());
    let stats = registry.statistics();
    println!("📚 HSN registry: {} codes ({} exempt, {} taxable)", stats.total, stats.exempt, stats.taxable);
    println!();

    // 2. Build line items; the registry resolves rates and exemptions
    let laptop = LineItemBuilder::new("Office laptop", "8471")
        .quantity(BigDecimal::from(10))
        .unit_price(BigDecimal::from_str("100.00")?)
        .discount_percent(BigDecimal::from(10))
        .with_registry(&registry)
        .build()?;

    let medicine = LineItemBuilder::new("Medicaments", "3004")
        .quantity(BigDecimal::from(20))
        .unit_price(BigDecimal::from_str("12.50")?)
        .with_registry(&registry)
        .build()?;

    println!("📦 Line items:");
    for item in [&laptop, &medicine] {
        println!(
            "  {} - base {}, discount {}, tax {}, total {}",
            item.description,
            item.base_amount(),
            item.discount_amount(),
            item.tax_amount(),
            item.line_total()
        );
    }
    println!();

    // 3. Invoice totals are derived from the line items on every read
    let issue_date = NaiveDate::from_ymd_opt(2024, 6, 11).ok_or("bad date")?;
    let invoice = Invoice::new("INV-2024-001", issue_date, vec![laptop, medicine])?;

    println!("🧮 Invoice {}:", invoice.invoice_number());
    println!("  Subtotal:   {}", invoice.subtotal());
    println!("  Discounts:  {}", invoice.total_discount());
    println!("  Taxable:    {}", invoice.taxable_amount());
    println!("  Tax:        {}", invoice.total_tax());
    println!("  Total:      {}", invoice.total_amount());

    let breakdown = invoice.tax_breakdown();
    for detail in &breakdown.tax_details {
        println!(
            "  {}: taxable {}, tax {}, exempt {}",
            detail.category, detail.taxable_amount, detail.tax_amount, detail.exempt_amount
        );
    }
    println!();

    // 4. Additive vs cascading tax stacking
    let engine = TaxEngine::new(Arc::clone(&registry));
    let taxes = vec![
        AppliedTax::new(TaxCategory::Vat, BigDecimal::from(10)),
        AppliedTax::new(TaxCategory::Excise, BigDecimal::from(10)),
    ];

    let additive = engine.calculate_multiple_taxes(&BigDecimal::from(1000), &taxes)?;
    let cascading = engine.calculate_cascading_tax(&BigDecimal::from(1000), &taxes)?;
    println!("⚖️  Two 10% taxes on 1000:");
    println!("  Additive:  {}", additive.total);
    println!("  Cascading: {}", cascading.total);
    println!();

    // 5. Decompose a tax-inclusive price
    let reverse = engine.calculate_reverse_tax(
        &BigDecimal::from_str("107.50")?,
        &BigDecimal::from_str("7.5")?,
    )?;
    println!("🔄 107.50 tax-inclusive at 7.5%:");
    println!("  Base: {}", reverse.base_amount);
    println!("  Tax:  {}", reverse.tax_amount);
    println!();

    // 6. IRN construction and parsing
    let invoice_irn = irn::build(invoice.invoice_number(), "94ND90NR", Some(invoice.issue_date()))?;
    println!("🔖 IRN: {}", invoice_irn);

    let components = irn::parse(&invoice_irn)?;
    println!(
        "  parsed -> invoice {}, service {}, date {}",
        components.invoice_number, components.service_id, components.date_stamp
    );

    Ok(())
}
