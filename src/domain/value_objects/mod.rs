pub mod credentials;
pub mod lot_size;
pub mod price;
pub mod protective_levels;

/// Round half away from zero to a fixed number of decimals
pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_decimals() {
        assert_eq!(round_decimals(1.8333333, 2), 1.83);
        assert_eq!(round_decimals(1.103000000001, 5), 1.103);
        assert_eq!(round_decimals(1.096049999, 5), 1.09605);
    }
}
