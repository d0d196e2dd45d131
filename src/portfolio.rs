//! Portfolio evaluation: the one place payoff and pricing results meet.

use crate::errors::EngineResult;
use crate::models::payoff;
use crate::models::{
    BlackScholes, Explanation, MarketParameters, OptionKind, Position, PriceGrid, PriceSample,
    Quote, GENERAL_FORMULAS,
};
use serde::{Deserialize, Serialize};

/// A leg as it arrives from a collaborator, before kind validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPosition {
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: f64,
    #[serde(default)]
    pub strike: Option<f64>,
}

impl RawPosition {
    pub fn into_position(self) -> EngineResult<Position> {
        Position::from_parts(&self.kind, self.quantity, self.strike)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LegPayoff {
    pub position: Position,
    pub label: String,
    pub payoff: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionLegPricing {
    pub position: Position,
    pub kind: OptionKind,
    pub strike: f64,
    pub curve_label: String,
    pub curve: Vec<f64>,
    pub point_label: String,
    pub point: Quote,
    pub explanation: Explanation,
}

/// Everything the rendering side needs for one plot.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub market: MarketParameters,
    pub spot: PriceSample,
    pub grid: PriceGrid,
    pub legs: Vec<LegPayoff>,
    pub total: Vec<f64>,
    pub option_legs: Vec<OptionLegPricing>,
    pub general_formulas: &'static str,
}

/// Evaluate payoffs for every leg and Black-Scholes pricing for every
/// option leg. Fails on the first domain error; nothing partial is returned.
pub fn evaluate(
    positions: &[Position],
    market: &MarketParameters,
    grid: &PriceGrid,
    spot: PriceSample,
) -> EngineResult<Evaluation> {
    let MarketParameters {
        risk_free_rate: r,
        volatility: sigma,
        time_to_maturity: t,
    } = *market;

    let mut total = vec![0.0; grid.len()];
    let mut legs = Vec::with_capacity(positions.len());
    for position in positions {
        let leg = payoff::payoff_of(position, grid, r, t);
        payoff::accumulate(&mut total, &leg);
        legs.push(LegPayoff {
            position: *position,
            label: position.label(),
            payoff: leg,
        });
    }

    let pricer = BlackScholes::new();
    let s0 = spot.value();
    let mut option_legs = Vec::new();
    for position in positions {
        let Some((kind, strike)) = position.as_option() else {
            continue;
        };

        let curve = pricer.price_curve(kind, strike, r, sigma, t, grid)?;
        let explanation = pricer.explain(kind, s0, strike, r, sigma, t)?;
        let point = Quote {
            price: explanation.price,
            d1: explanation.d1,
            d2: explanation.d2,
        };

        option_legs.push(OptionLegPricing {
            position: *position,
            kind,
            strike,
            curve_label: format!("BS {kind} Price Curve (K={strike})"),
            curve,
            point_label: format!("BS {kind} Price at S={s0}, K={strike}: {:.2}", point.price),
            point,
            explanation,
        });
    }

    tracing::debug!(
        legs = legs.len(),
        option_legs = option_legs.len(),
        grid_points = grid.len(),
        spot = s0,
        "portfolio evaluated"
    );

    Ok(Evaluation {
        market: *market,
        spot,
        grid: grid.clone(),
        legs,
        total,
        option_legs,
        general_formulas: GENERAL_FORMULAS,
    })
}

/// Validate raw collaborator legs, then evaluate. A single malformed leg
/// aborts the whole evaluation.
pub fn evaluate_raw(
    raw: Vec<RawPosition>,
    market: &MarketParameters,
    grid: &PriceGrid,
    spot: PriceSample,
) -> EngineResult<Evaluation> {
    let positions = raw
        .into_iter()
        .map(RawPosition::into_position)
        .collect::<EngineResult<Vec<_>>>()?;
    evaluate(&positions, market, grid, spot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;

    fn market() -> MarketParameters {
        MarketParameters::new(0.05, 0.2, 1.0)
    }

    fn grid() -> PriceGrid {
        PriceGrid::linspace(0.01, 200.0, 1000).unwrap()
    }

    #[test]
    fn test_full_portfolio() {
        let positions = [
            Position::Stock { quantity: 1.0 },
            Position::Call { quantity: 1.0, strike: 100.0 },
            Position::Put { quantity: -1.0, strike: 100.0 },
            Position::Bond { quantity: 1.0, strike: 100.0 },
        ];
        let g = grid();
        let eval = evaluate(&positions, &market(), &g, PriceSample::new(100.0).unwrap()).unwrap();

        assert_eq!(eval.legs.len(), 4);
        assert_eq!(eval.total.len(), g.len());
        assert_eq!(eval.option_legs.len(), 2, "only call and put are priced");

        let expected_total = payoff::aggregate(&positions, &g, 0.05, 1.0);
        for (a, b) in eval.total.iter().zip(&expected_total) {
            assert!((a - b).abs() < 1e-9);
        }

        let call = &eval.option_legs[0];
        assert_eq!(call.kind, OptionKind::Call);
        assert_eq!(call.curve.len(), g.len());
        assert!((call.point.price - 10.45).abs() < 0.01);
        assert_eq!(call.point_label, "BS Call Price at S=100, K=100: 10.45");
        assert_eq!(call.curve_label, "BS Call Price Curve (K=100)");

        let put = &eval.option_legs[1];
        assert!((put.point.price - 5.57).abs() < 0.01);
        assert_eq!(put.explanation.kind, OptionKind::Put);
    }

    #[test]
    fn test_non_option_portfolio_needs_no_pricing() {
        // sigma = 0 is only a problem for option legs.
        let positions = [Position::Stock { quantity: 1.0 }, Position::Bond { quantity: 1.0, strike: 100.0 }];
        let m = MarketParameters::new(0.05, 0.0, 1.0);
        let eval = evaluate(&positions, &m, &grid(), PriceSample::new(50.0).unwrap()).unwrap();
        assert!(eval.option_legs.is_empty());
    }

    #[test]
    fn test_domain_error_aborts() {
        let positions = [Position::Call { quantity: 1.0, strike: 100.0 }];
        let m = MarketParameters::new(0.05, 0.2, 0.0);
        let err = evaluate(&positions, &m, &grid(), PriceSample::new(100.0).unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::Domain(_)), "{err}");
    }

    #[test]
    fn test_zero_strike_call_is_domain_error() {
        let positions = [Position::Call { quantity: 1.0, strike: 0.0 }];
        let err = evaluate(&positions, &market(), &grid(), PriceSample::new(100.0).unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::Domain(_)));
    }

    #[test]
    fn test_raw_bad_kind_aborts_whole_evaluation() {
        let raw = vec![
            RawPosition { kind: "stock".into(), quantity: 1.0, strike: None },
            RawPosition { kind: "swaption".into(), quantity: 1.0, strike: Some(100.0) },
        ];
        let err = evaluate_raw(raw, &market(), &grid(), PriceSample::new(100.0).unwrap()).unwrap_err();
        assert_eq!(err, EngineError::InvalidPositionKind("swaption".into()));
    }

    #[test]
    fn test_raw_deserializes_without_strike() {
        let raw: RawPosition = serde_json::from_str(r#"{"type":"stock","quantity":2}"#).unwrap();
        assert_eq!(raw.into_position().unwrap(), Position::Stock { quantity: 2.0 });
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let positions = [Position::Put { quantity: 2.0, strike: 90.0 }];
        let s0 = PriceSample::new(95.0).unwrap();
        let a = evaluate(&positions, &market(), &grid(), s0).unwrap();
        let b = evaluate(&positions, &market(), &grid(), s0).unwrap();
        assert_eq!(a.total, b.total);
        assert_eq!(a.option_legs[0].curve, b.option_legs[0].curve);
        assert_eq!(a.option_legs[0].explanation, b.option_legs[0].explanation);
    }
}
