pub mod position;
pub mod payoff;
pub mod black_scholes;

pub use black_scholes::{BlackScholes, Explanation, Quote, GENERAL_FORMULAS};
pub use position::{MarketParameters, OptionKind, Position, PositionKind, PriceGrid, PriceSample};
