use crate::models::position::{Position, PriceGrid};

/// Terminal payoff of one leg at every grid point.
///
/// Stock: q*S, Call: q*max(S-K, 0), Put: q*max(K-S, 0),
/// Bond: q*K*exp(-r*T), constant across the grid.
///
/// Pure function. Output has the same length and order as the grid.
pub fn payoff_of(position: &Position, grid: &PriceGrid, r: f64, t: f64) -> Vec<f64> {
    let prices = grid.values();
    match *position {
        Position::Stock { quantity } => prices.iter().map(|&s| quantity * s).collect(),
        Position::Call { quantity, strike } => prices
            .iter()
            .map(|&s| quantity * (s - strike).max(0.0))
            .collect(),
        Position::Put { quantity, strike } => prices
            .iter()
            .map(|&s| quantity * (strike - s).max(0.0))
            .collect(),
        Position::Bond { quantity, strike } => {
            let discounted = quantity * strike * (-r * t).exp();
            vec![discounted; prices.len()]
        }
    }
}

/// Elementwise sum of every leg's payoff. Zero vector for an empty portfolio.
pub fn aggregate(positions: &[Position], grid: &PriceGrid, r: f64, t: f64) -> Vec<f64> {
    let mut total = vec![0.0; grid.len()];
    for position in positions {
        accumulate(&mut total, &payoff_of(position, grid, r, t));
    }
    total
}

/// total[i] += leg[i]
#[inline]
pub(crate) fn accumulate(total: &mut [f64], leg: &[f64]) {
    for (acc, v) in total.iter_mut().zip(leg) {
        *acc += v;
    }
}
