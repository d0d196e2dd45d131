pub mod report;

use crate::portfolio::Evaluation;

/// Which curves the renderer currently shows. Owned by the rendering side;
/// the engine never reads it.
///
/// The total payoff line and the S0 price points are always visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    payoff_lines: Vec<bool>,
    price_curves: Vec<bool>,
}

impl ViewState {
    /// Everything visible, sized to the evaluation's legs.
    pub fn for_evaluation(eval: &Evaluation) -> Self {
        Self {
            payoff_lines: vec![true; eval.legs.len()],
            price_curves: vec![true; eval.option_legs.len()],
        }
    }

    /// Hide every per-leg payoff line if any is shown, otherwise show all.
    pub fn toggle_payoff_lines(&mut self) {
        toggle_all(&mut self.payoff_lines);
    }

    /// Same rule for the Black-Scholes price curves.
    pub fn toggle_price_curves(&mut self) {
        toggle_all(&mut self.price_curves);
    }

    pub fn payoff_line_visible(&self, leg: usize) -> bool {
        self.payoff_lines.get(leg).copied().unwrap_or(false)
    }

    pub fn price_curve_visible(&self, leg: usize) -> bool {
        self.price_curves.get(leg).copied().unwrap_or(false)
    }
}

fn toggle_all(flags: &mut [bool]) {
    let any_visible = flags.iter().any(|v| *v);
    flags.iter_mut().for_each(|v| *v = !any_visible);
}
