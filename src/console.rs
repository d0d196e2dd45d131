//! Interactive console front end. Collects market parameters and legs,
//! then runs evaluation rounds until the user stops.

use crate::config::AppConfig;
use crate::errors::{EngineError, EngineResult};
use crate::models::{MarketParameters, Position, PositionKind, PriceGrid, PriceSample};
use crate::portfolio::{self, Evaluation};
use crate::render::{report, ViewState};
use std::io::{BufRead, Write};

pub struct Console<R, W> {
    input: R,
    output: W,
    max_positions: usize,
    grid: PriceGrid,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, config: &AppConfig) -> EngineResult<Self> {
        Ok(Self {
            input,
            output,
            max_positions: config.max_positions,
            grid: config.price_grid()?,
        })
    }

    /// Full session: parameters, legs, then plot rounds.
    pub fn run(&mut self) -> EngineResult<()> {
        let mut market = self.read_market("initial")?;
        let mut positions = self.read_positions()?;
        tracing::info!(legs = positions.len(), "portfolio entered");

        loop {
            let spot = self.read_spot()?;
            match portfolio::evaluate(&positions, &market, &self.grid, spot) {
                Ok(eval) => self.show(&eval)?,
                Err(e) => {
                    tracing::warn!("evaluation failed: {e}");
                    writeln!(self.output, "Evaluation failed: {e}")?;
                }
            }

            if !self.confirm("\nWould you like to create another plot? (y/n): ")? {
                writeln!(self.output, "Exiting the program.")?;
                return Ok(());
            }

            if !self.confirm("\nWould you like to keep the same values for r, sigma, and T? (y/n): ")? {
                market = self.read_market("new")?;
            }

            self.edit_strikes(&mut positions)?;
        }
    }

    pub fn read_market(&mut self, which: &str) -> EngineResult<MarketParameters> {
        let r = self.prompt_f64(&format!("Enter the {which} risk-free rate (r): "))?;
        let sigma = self.prompt_f64(&format!("Enter the {which} volatility (sigma): "))?;
        let t = self.prompt_f64(&format!("Enter the {which} time to maturity (T): "))?;
        Ok(MarketParameters::new(r, sigma, t))
    }

    pub fn read_positions(&mut self) -> EngineResult<Vec<Position>> {
        writeln!(
            self.output,
            "\nEnter the details for up to {} instruments (or type 'done' to finish):",
            self.max_positions
        )?;

        let mut positions = Vec::with_capacity(self.max_positions);
        'instruments: while positions.len() < self.max_positions {
            let n = positions.len() + 1;
            loop {
                let text = self.read_line(&format!(
                    "Enter position type for instrument {n} (stock, call, put, bond) or 'done' to finish: "
                ))?;
                if text.eq_ignore_ascii_case("done") {
                    break 'instruments;
                }

                let kind = match text.parse::<PositionKind>() {
                    Ok(k) => k,
                    Err(e) => {
                        self.report_invalid(&e)?;
                        continue;
                    }
                };

                let quantity = self.prompt_f64(&format!("Enter quantity for {kind}: "))?;
                let strike = if kind.requires_strike() {
                    Some(self.prompt_f64(&format!("Enter strike price for {kind}: "))?)
                } else {
                    None
                };

                match Position::from_parts(&text, quantity, strike) {
                    Ok(p) => {
                        positions.push(p);
                        break;
                    }
                    Err(e) => self.report_invalid(&e)?,
                }
            }
        }
        Ok(positions)
    }

    fn read_spot(&mut self) -> EngineResult<PriceSample> {
        loop {
            let s = self.prompt_f64(
                "Enter the initial stock price (S) for which to calculate the BS price point: ",
            )?;
            match PriceSample::new(s) {
                Ok(sample) => return Ok(sample),
                Err(e) => self.report_invalid(&e)?,
            }
        }
    }

    /// Offer a new strike for every strike-bearing leg; empty input keeps it.
    fn edit_strikes(&mut self, positions: &mut [Position]) -> EngineResult<()> {
        writeln!(
            self.output,
            "\nEnter the updated strike prices for each instrument (or press Enter to keep the current values):"
        )?;

        for position in positions.iter_mut() {
            let Some(current) = position.strike() else {
                continue;
            };
            let prompt = format!(
                "Enter new strike price for {} (current: {current}): ",
                position.kind()
            );
            loop {
                let text = self.read_line(&prompt)?;
                if text.is_empty() {
                    break;
                }
                match text.parse::<f64>() {
                    Ok(k) if k.is_finite() && k >= 0.0 => {
                        *position = position.with_strike(k);
                        break;
                    }
                    Ok(k) => {
                        let e = EngineError::Input(format!("strike must be a non-negative number, got {k}"));
                        self.report_invalid(&e)?;
                    }
                    Err(_) => {
                        let e = EngineError::Input(format!("'{text}' is not a number"));
                        self.report_invalid(&e)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Print the report, then let the user flip curve visibility until
    /// they continue.
    fn show(&mut self, eval: &Evaluation) -> EngineResult<()> {
        let mut view = ViewState::for_evaluation(eval);
        loop {
            write!(self.output, "\n{}", report::render_text(eval, &view))?;
            let choice = self.read_line(
                "Enter 'l' to toggle payoff lines, 'b' to toggle BS curves, or press Enter to continue: ",
            )?;
            match choice.to_ascii_lowercase().as_str() {
                "" => return Ok(()),
                "l" => view.toggle_payoff_lines(),
                "b" => view.toggle_price_curves(),
                other => writeln!(self.output, "Unknown option '{other}'")?,
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> EngineResult<bool> {
        Ok(self.read_line(prompt)?.eq_ignore_ascii_case("y"))
    }

    fn prompt_f64(&mut self, prompt: &str) -> EngineResult<f64> {
        loop {
            let text = self.read_line(prompt)?;
            match text.parse::<f64>() {
                Ok(v) if v.is_finite() => return Ok(v),
                _ => {
                    let e = EngineError::Input(format!("'{text}' is not a number"));
                    self.report_invalid(&e)?;
                }
            }
        }
    }

    fn report_invalid(&mut self, e: &EngineError) -> EngineResult<()> {
        tracing::warn!("rejected console input: {e}");
        writeln!(self.output, "Invalid input: {e}")?;
        Ok(())
    }

    /// Prompt and read one trimmed line. End of input is an error.
    fn read_line(&mut self, prompt: &str) -> EngineResult<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(EngineError::Input("unexpected end of input".into()));
        }
        Ok(line.trim().to_string())
    }
}
