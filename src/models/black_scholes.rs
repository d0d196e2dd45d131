use crate::errors::{EngineError, EngineResult};
use crate::models::position::{OptionKind, PriceGrid};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;

/// Header block shown above every per-leg derivation.
pub const GENERAL_FORMULAS: &str = "General BS Call: C(S,t) = S * N(d1) - K * exp(-r * (T - t)) * N(d2)\n\
General BS Put: P(S,t) = K * exp(-r * (T - t)) * N(-d2) - S * N(-d1)\n\
d1 = [ln(S/K) + (r + 0.5 * sigma^2) * (T - t)] / (sigma * sqrt(T - t))\n\
d2 = d1 - sigma * sqrt(T - t)";

/// Black-Scholes price of a European option together with its d1/d2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    pub price: f64,
    pub d1: f64,
    pub d2: f64,
}

/// Substituted derivation of one point price. Numeric fields keep full
/// precision; only `lines` is rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub kind: OptionKind,
    pub spot: f64,
    pub strike: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub time_to_maturity: f64,
    pub d1: f64,
    pub d2: f64,
    pub price: f64,
    pub lines: Vec<String>,
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// Closed-form Black-Scholes pricing for European calls and puts.
///
/// C = S*N(d1) - K*exp(-r*T)*N(d2)
/// P = K*exp(-r*T)*N(-d2) - S*N(-d1)
///
/// where d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma*sqrt(T))
/// and d2 = d1 - sigma*sqrt(T).
///
/// Inputs outside S > 0, K > 0, sigma > 0, T > 0 are rejected with
/// `EngineError::Domain` rather than producing NaN or infinity.
#[derive(Debug, Clone)]
pub struct BlackScholes {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::new()
    }
}

impl BlackScholes {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }

    /// Standard normal CDF.
    #[inline]
    pub fn n(&self, x: f64) -> f64 {
        self.normal.cdf(x)
    }

    pub fn d1_d2(&self, s: f64, k: f64, r: f64, sigma: f64, t: f64) -> EngineResult<(f64, f64)> {
        check_domain(s, k, r, sigma, t)?;

        let sigma_sqrt_t = sigma * t.sqrt();
        if sigma_sqrt_t <= 0.0 {
            return Err(EngineError::Domain(format!(
                "sigma*sqrt(T) underflows to zero for sigma={sigma}, T={t}"
            )));
        }

        let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
        let d2 = d1 - sigma_sqrt_t;
        if !(d1.is_finite() && d2.is_finite()) {
            return Err(EngineError::Domain(format!(
                "d1/d2 not finite for S={s}, K={k}, r={r}, sigma={sigma}, T={t}"
            )));
        }
        Ok((d1, d2))
    }

    pub fn call_price(&self, s: f64, k: f64, r: f64, sigma: f64, t: f64) -> EngineResult<Quote> {
        let (d1, d2) = self.d1_d2(s, k, r, sigma, t)?;
        let price = s * self.n(d1) - k * (-r * t).exp() * self.n(d2);
        Ok(Quote { price, d1, d2 })
    }

    pub fn put_price(&self, s: f64, k: f64, r: f64, sigma: f64, t: f64) -> EngineResult<Quote> {
        let (d1, d2) = self.d1_d2(s, k, r, sigma, t)?;
        let price = k * (-r * t).exp() * self.n(-d2) - s * self.n(-d1);
        Ok(Quote { price, d1, d2 })
    }

    #[inline]
    pub fn quote(
        &self,
        kind: OptionKind,
        s: f64,
        k: f64,
        r: f64,
        sigma: f64,
        t: f64,
    ) -> EngineResult<Quote> {
        match kind {
            OptionKind::Call => self.call_price(s, k, r, sigma, t),
            OptionKind::Put => self.put_price(s, k, r, sigma, t),
        }
    }

    /// Price at every grid point, same length and order as the grid.
    pub fn price_curve(
        &self,
        kind: OptionKind,
        k: f64,
        r: f64,
        sigma: f64,
        t: f64,
        grid: &PriceGrid,
    ) -> EngineResult<Vec<f64>> {
        // Grid points are positive by construction, so only the shared
        // parameters can fail; check them once up front.
        let first = grid
            .values()
            .first()
            .copied()
            .ok_or_else(|| EngineError::InvalidGrid("grid is empty".into()))?;
        check_domain(first, k, r, sigma, t)?;

        grid.values()
            .iter()
            .map(|&s| self.quote(kind, s, k, r, sigma, t).map(|q| q.price))
            .collect()
    }

    /// Point price at `s0` with the substituted formulas, rounded to two
    /// decimals for display.
    pub fn explain(
        &self,
        kind: OptionKind,
        s0: f64,
        k: f64,
        r: f64,
        sigma: f64,
        t: f64,
    ) -> EngineResult<Explanation> {
        let Quote { price, d1, d2 } = self.quote(kind, s0, k, r, sigma, t)?;

        let price_line = match kind {
            OptionKind::Call => format!(
                "BS Call Price = {s0} * N({d1:.2}) - {k} * exp({neg_r} * {t}) * N({d2:.2}) = {price:.2}",
                neg_r = -r,
            ),
            OptionKind::Put => format!(
                "BS Put Price = {k} * exp({neg_r} * {t}) * N({neg_d2:.2}) - {s0} * N({neg_d1:.2}) = {price:.2}",
                neg_r = -r,
                neg_d1 = -d1,
                neg_d2 = -d2,
            ),
        };

        let lines = vec![
            format!("{kind}: S={s0}, K={k}, r={r}, sigma={sigma}, T={t}"),
            format!(
                "d1 = [ln({s0}/{k}) + ({r} + 0.5 * {sigma}^2) * {t}] / ({sigma} * sqrt({t})) = {d1:.2}"
            ),
            format!("d2 = {d1:.2} - {sigma} * sqrt({t}) = {d2:.2}"),
            price_line,
        ];

        Ok(Explanation {
            kind,
            spot: s0,
            strike: k,
            risk_free_rate: r,
            volatility: sigma,
            time_to_maturity: t,
            d1,
            d2,
            price,
            lines,
        })
    }
}

fn check_domain(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> EngineResult<()> {
    if !(s.is_finite() && s > 0.0) {
        return Err(EngineError::Domain(format!("underlying price S must be > 0, got {s}")));
    }
    if !(k.is_finite() && k > 0.0) {
        return Err(EngineError::Domain(format!("strike K must be > 0, got {k}")));
    }
    if !r.is_finite() {
        return Err(EngineError::Domain(format!("risk-free rate must be finite, got {r}")));
    }
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(EngineError::Domain(format!("volatility sigma must be > 0, got {sigma}")));
    }
    if !(t.is_finite() && t > 0.0) {
        return Err(EngineError::Domain(format!("time to maturity T must be > 0, got {t}")));
    }
    Ok(())
}
