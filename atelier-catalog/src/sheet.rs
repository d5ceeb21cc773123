use std::fmt::{self, Write};

use crate::costing::CostingBreakdown;
use crate::currency::{format_currency, format_currency_compact, CURRENCY_CODE, CURRENCY_NAME};

/// Plain-text costing sheet suitable for printing.
pub fn render_sheet(breakdown: &CostingBreakdown) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_sheet(&mut out, breakdown);
    out
}

fn write_sheet(out: &mut impl Write, breakdown: &CostingBreakdown) -> fmt::Result {
    let params = &breakdown.parameters;
    let run = params.quantity;

    writeln!(out, "COSTING SHEET")?;
    writeln!(out, "Product: {}", breakdown.product.name)?;
    writeln!(out, "Currency: {} ({})", CURRENCY_CODE, CURRENCY_NAME)?;
    writeln!(
        out,
        "Run: {} | Labor: {}% | Overhead: {}% | Markup: {}x",
        run, params.labor_percentage, params.overhead_percentage, params.markup_multiplier
    )?;

    for category in &breakdown.categories {
        writeln!(out)?;
        writeln!(
            out,
            "{} ({:.1}%)  {}",
            category.category,
            category.percentage,
            format_currency(category.total_for_run)
        )?;
        for line in &category.lines {
            writeln!(
                out,
                "  {:<28} {} {:<8} @ {:>14}  = {:>14}  x{} = {:>14}  {:>5.1}%",
                line.name,
                line.quantity,
                line.unit,
                format_currency(line.unit_cost),
                format_currency(line.line_total),
                run,
                format_currency(line.line_total_for_run),
                line.percentage_of_category
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Material cost (per unit):   {}", format_currency(breakdown.material_cost))?;
    writeln!(
        out,
        "Material cost (total for {}): {}",
        run,
        format_currency(breakdown.total_material_cost_for_run)
    )?;
    writeln!(
        out,
        "Labor ({}%):                {}",
        params.labor_percentage,
        format_currency(breakdown.labor_cost_for_run)
    )?;
    writeln!(
        out,
        "Overhead ({}%):             {}",
        params.overhead_percentage,
        format_currency(breakdown.overhead_cost_for_run)
    )?;
    writeln!(
        out,
        "Total production cost:      {} ({})",
        format_currency(breakdown.total_production_cost_for_run),
        format_currency_compact(breakdown.total_production_cost_for_run)
    )?;
    writeln!(
        out,
        "Total cost per unit:        {}",
        format_currency(breakdown.total_production_cost_per_unit)
    )?;
    writeln!(
        out,
        "Suggested retail ({}x):     {}",
        params.markup_multiplier,
        format_currency(breakdown.suggested_retail)
    )?;

    if !breakdown.top_cost_drivers.is_empty() {
        writeln!(out)?;
        writeln!(out, "Top cost drivers")?;
        for driver in &breakdown.top_cost_drivers {
            writeln!(
                out,
                "  {}. {}  {}",
                driver.rank,
                driver.name,
                format_currency(driver.line_total)
            )?;
        }
    }

    Ok(())
}
