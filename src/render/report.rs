use crate::portfolio::Evaluation;
use crate::render::ViewState;
use std::fmt::Write;

/// Rows in the sampled total-payoff table.
const TABLE_ROWS: usize = 11;

/// Plain-text rendering of one evaluation: title, legend of the visible
/// series, a sampled total-payoff table, point prices and the formula block.
pub fn render_text(eval: &Evaluation, view: &ViewState) -> String {
    let mut out = String::new();
    let m = &eval.market;

    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "Derivative Portfolio Payoff and BS Option Price Point (r={}, sigma={}, T={})",
        m.risk_free_rate, m.volatility, m.time_to_maturity
    );
    out.push('\n');

    out.push_str("Legend:\n");
    for (i, leg) in eval.legs.iter().enumerate() {
        if view.payoff_line_visible(i) {
            let _ = writeln!(out, "  --  {}", leg.label);
        }
    }
    out.push_str("  ==  Total Portfolio Payoff\n");
    for (i, leg) in eval.option_legs.iter().enumerate() {
        if view.price_curve_visible(i) {
            let _ = writeln!(out, "  ~~  {}", leg.curve_label);
        }
        let _ = writeln!(out, "  o   {}", leg.point_label);
    }
    out.push('\n');

    let _ = writeln!(out, "{:>12}  {:>14}", "S at expiry", "Total payoff");
    let prices = eval.grid.values();
    for idx in sample_indices(prices.len(), TABLE_ROWS) {
        let _ = writeln!(out, "{:>12.2}  {:>14.2}", prices[idx], eval.total[idx]);
    }
    out.push('\n');

    let mut blocks = Vec::with_capacity(eval.option_legs.len() + 1);
    blocks.push(eval.general_formulas.to_string());
    blocks.extend(eval.option_legs.iter().map(|leg| leg.explanation.to_string()));
    out.push_str(&blocks.join("\n\n"));
    out.push('\n');

    out
}

/// Evenly spread indices into a sequence of `len`, first and last included.
fn sample_indices(len: usize, rows: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    if len <= rows {
        return (0..len).collect();
    }
    let mut idx: Vec<usize> = (0..rows).map(|i| i * (len - 1) / (rows - 1)).collect();
    idx.dedup();
    idx
}
