//! Portfolio legs, shared market parameters and the price grid.

use crate::errors::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field-less discriminant of a [`Position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionKind {
    Stock,
    Call,
    Put,
    Bond,
}

impl PositionKind {
    pub fn requires_strike(self) -> bool {
        !matches!(self, Self::Stock)
    }
}

impl fmt::Display for PositionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stock => write!(f, "stock"),
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
            Self::Bond => write!(f, "bond"),
        }
    }
}

impl FromStr for PositionKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(Self::Stock),
            "call" => Ok(Self::Call),
            "put" => Ok(Self::Put),
            "bond" => Ok(Self::Bond),
            _ => Err(EngineError::InvalidPositionKind(s.trim().to_string())),
        }
    }
}

/// Option legs the pricing engine can value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "Call"),
            Self::Put => write!(f, "Put"),
        }
    }
}

/// One portfolio leg. Quantity is signed: negative means short.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Position {
    Stock { quantity: f64 },
    Call { quantity: f64, strike: f64 },
    Put { quantity: f64, strike: f64 },
    /// Zero-coupon bond; `strike` is the face value.
    Bond { quantity: f64, strike: f64 },
}

impl Position {
    /// Boundary constructor for raw collaborator input.
    ///
    /// Unknown kinds fail with `InvalidPositionKind`; bad numbers and a
    /// missing strike on call/put/bond fail with `Input`. A strike supplied
    /// for a stock is ignored.
    pub fn from_parts(kind: &str, quantity: f64, strike: Option<f64>) -> EngineResult<Self> {
        let kind = kind.parse::<PositionKind>()?;

        if !quantity.is_finite() {
            return Err(EngineError::Input(format!("quantity must be finite, got {quantity}")));
        }

        if !kind.requires_strike() {
            return Ok(Self::Stock { quantity });
        }

        let strike = strike
            .ok_or_else(|| EngineError::Input(format!("a strike is required for {kind}")))?;
        if !strike.is_finite() || strike < 0.0 {
            return Err(EngineError::Input(format!(
                "strike must be a non-negative number, got {strike}"
            )));
        }

        Ok(match kind {
            PositionKind::Call => Self::Call { quantity, strike },
            PositionKind::Put => Self::Put { quantity, strike },
            PositionKind::Bond => Self::Bond { quantity, strike },
            PositionKind::Stock => Self::Stock { quantity },
        })
    }

    pub fn kind(&self) -> PositionKind {
        match self {
            Self::Stock { .. } => PositionKind::Stock,
            Self::Call { .. } => PositionKind::Call,
            Self::Put { .. } => PositionKind::Put,
            Self::Bond { .. } => PositionKind::Bond,
        }
    }

    pub fn quantity(&self) -> f64 {
        match *self {
            Self::Stock { quantity }
            | Self::Call { quantity, .. }
            | Self::Put { quantity, .. }
            | Self::Bond { quantity, .. } => quantity,
        }
    }

    /// Strike (or face value). `None` for stock.
    pub fn strike(&self) -> Option<f64> {
        match *self {
            Self::Stock { .. } => None,
            Self::Call { strike, .. } | Self::Put { strike, .. } | Self::Bond { strike, .. } => {
                Some(strike)
            }
        }
    }

    /// Replace the strike of a strike-bearing leg. No-op for stock.
    pub fn with_strike(self, new_strike: f64) -> Self {
        match self {
            Self::Stock { .. } => self,
            Self::Call { quantity, .. } => Self::Call { quantity, strike: new_strike },
            Self::Put { quantity, .. } => Self::Put { quantity, strike: new_strike },
            Self::Bond { quantity, .. } => Self::Bond { quantity, strike: new_strike },
        }
    }

    /// Option leg view, for the pricing engine.
    pub fn as_option(&self) -> Option<(OptionKind, f64)> {
        match *self {
            Self::Call { strike, .. } => Some((OptionKind::Call, strike)),
            Self::Put { strike, .. } => Some((OptionKind::Put, strike)),
            Self::Stock { .. } | Self::Bond { .. } => None,
        }
    }

    /// Legend label, e.g. `Call Payoff (Qty: 2, Strike: 100)`.
    pub fn label(&self) -> String {
        let name = match self.kind() {
            PositionKind::Stock => "Stock",
            PositionKind::Call => "Call",
            PositionKind::Put => "Put",
            PositionKind::Bond => "Bond",
        };
        format!(
            "{name} Payoff (Qty: {}, Strike: {})",
            self.quantity(),
            self.strike().unwrap_or(0.0)
        )
    }
}

/// Market parameters shared by every leg in one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketParameters {
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub time_to_maturity: f64,
}

impl MarketParameters {
    pub fn new(risk_free_rate: f64, volatility: f64, time_to_maturity: f64) -> Self {
        Self {
            risk_free_rate,
            volatility,
            time_to_maturity,
        }
    }

    /// exp(-r*T)
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_maturity).exp()
    }
}

/// Ordered, strictly positive, strictly increasing underlying prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceGrid {
    values: Vec<f64>,
}

impl PriceGrid {
    /// Evenly spaced grid over [min, max], both endpoints included.
    pub fn linspace(min: f64, max: f64, points: usize) -> EngineResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(EngineError::InvalidGrid(format!(
                "bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min <= 0.0 {
            return Err(EngineError::InvalidGrid(format!("lower bound must be > 0, got {min}")));
        }
        if max <= min {
            return Err(EngineError::InvalidGrid(format!(
                "upper bound {max} must exceed lower bound {min}"
            )));
        }
        if points < 2 {
            return Err(EngineError::InvalidGrid(format!("need at least 2 points, got {points}")));
        }

        let step = (max - min) / (points - 1) as f64;
        let mut values: Vec<f64> = (0..points).map(|i| min + step * i as f64).collect();
        // Pin the last point so rounding never overshoots the bound.
        values[points - 1] = max;

        Ok(Self { values })
    }

    /// Explicit grid supplied by the caller.
    pub fn from_values(values: Vec<f64>) -> EngineResult<Self> {
        if values.is_empty() {
            return Err(EngineError::InvalidGrid("grid is empty".into()));
        }
        if let Some(bad) = values.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(EngineError::InvalidGrid(format!(
                "prices must be finite and > 0, got {bad}"
            )));
        }
        if values.windows(2).any(|w| w[1] <= w[0]) {
            return Err(EngineError::InvalidGrid("prices must be strictly increasing".into()));
        }
        Ok(Self { values })
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The chosen underlying price S0 at which point prices are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSample(f64);

impl PriceSample {
    pub fn new(spot: f64) -> EngineResult<Self> {
        if !spot.is_finite() || spot <= 0.0 {
            return Err(EngineError::Domain(format!("underlying price must be > 0, got {spot}")));
        }
        Ok(Self(spot))
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }
}
