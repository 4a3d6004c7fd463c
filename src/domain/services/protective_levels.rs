//! Stop-loss / take-profit price calculation

use crate::config::RiskParameters;
use crate::domain::entities::direction::TradeDirection;
use crate::domain::value_objects::price::Price;
use crate::domain::value_objects::protective_levels::ProtectiveLevels;
use crate::domain::value_objects::round_decimals;

/// Smallest standard price increment of the instrument
pub const PIP_SIZE: f64 = 0.0001;

/// Decimals kept on protective prices
const PRICE_DECIMALS: i32 = 5;

#[derive(Debug, Clone, Copy)]
pub struct ProtectiveLevelCalculator {
    stop_loss_pips: f64,
    take_profit_pips: f64,
}

impl ProtectiveLevelCalculator {
    pub fn new(risk: &RiskParameters) -> Self {
        Self {
            stop_loss_pips: risk.stop_loss_pips,
            take_profit_pips: risk.take_profit_pips,
        }
    }

    /// Levels for a position entered at `entry_price`
    ///
    /// The stop-loss always sits on the adverse side: below entry for a buy,
    /// above entry for a sell.
    pub fn compute_levels(&self, direction: TradeDirection, entry_price: Price) -> ProtectiveLevels {
        let (stop_loss, take_profit) = match direction {
            TradeDirection::Buy => (
                entry_price.offset_pips(-self.stop_loss_pips, PIP_SIZE),
                entry_price.offset_pips(self.take_profit_pips, PIP_SIZE),
            ),
            TradeDirection::Sell => (
                entry_price.offset_pips(self.stop_loss_pips, PIP_SIZE),
                entry_price.offset_pips(-self.take_profit_pips, PIP_SIZE),
            ),
        };

        ProtectiveLevels {
            stop_loss: round_decimals(stop_loss, PRICE_DECIMALS),
            take_profit: round_decimals(take_profit, PRICE_DECIMALS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> ProtectiveLevelCalculator {
        ProtectiveLevelCalculator::new(&RiskParameters::default())
    }

    fn price(value: f64) -> Price {
        Price::new(value).unwrap()
    }

    #[test]
    fn test_sell_levels() {
        let levels = calculator().compute_levels(TradeDirection::Sell, price(1.1));
        assert_eq!(levels.stop_loss, 1.103);
        assert_eq!(levels.take_profit, 1.096);
    }

    #[test]
    fn test_buy_levels() {
        let levels = calculator().compute_levels(TradeDirection::Buy, price(1.1));
        assert_eq!(levels.stop_loss, 1.097);
        assert_eq!(levels.take_profit, 1.104);
    }

    #[test]
    fn test_levels_are_on_opposite_sides() {
        let calc = calculator();
        for entry in [0.5, 0.98765, 1.0, 1.08123, 1.1, 1.23456, 1.5, 2.0] {
            let buy = calc.compute_levels(TradeDirection::Buy, price(entry));
            assert!(buy.stop_loss < entry && entry < buy.take_profit);

            let sell = calc.compute_levels(TradeDirection::Sell, price(entry));
            assert!(sell.take_profit < entry && entry < sell.stop_loss);
        }
    }

    #[test]
    fn test_compute_levels_is_deterministic() {
        let calc = calculator();
        let first = calc.compute_levels(TradeDirection::Sell, price(1.08347));
        let second = calc.compute_levels(TradeDirection::Sell, price(1.08347));
        assert_eq!(first.stop_loss.to_bits(), second.stop_loss.to_bits());
        assert_eq!(first.take_profit.to_bits(), second.take_profit.to_bits());
    }

    #[test]
    fn test_levels_rounded_to_five_decimals() {
        let levels = calculator().compute_levels(TradeDirection::Buy, price(1.0834567891));
        for value in [levels.stop_loss, levels.take_profit] {
            let scaled = value * 100_000.0;
            assert!((scaled - scaled.round()).abs() < 1e-6, "{} not rounded", value);
        }
        assert_eq!(levels.stop_loss, 1.08046);
        assert_eq!(levels.take_profit, 1.08746);
    }

    #[test]
    fn test_custom_distances() {
        let risk = RiskParameters::new(0.02, 15.0, 45.0).unwrap();
        let levels =
            ProtectiveLevelCalculator::new(&risk).compute_levels(TradeDirection::Buy, price(1.2));
        assert_eq!(levels.stop_loss, 1.1985);
        assert_eq!(levels.take_profit, 1.2045);
    }
}
