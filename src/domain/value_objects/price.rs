#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() {
            Err("Price must be finite".to_string())
        } else if value > 0.0 {
            Ok(Price(value))
        } else {
            Err("Price must be positive".to_string())
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Move the price by a number of pips, positive or negative
    pub fn offset_pips(&self, pips: f64, pip_size: f64) -> f64 {
        self.0 + pips * pip_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_new_valid() {
        let price = Price::new(1.1);
        assert!(price.is_ok());
        assert_eq!(price.unwrap().value(), 1.1);
    }

    #[test]
    fn test_price_new_zero() {
        let price = Price::new(0.0);
        assert!(price.is_err());
        assert_eq!(price.unwrap_err(), "Price must be positive");
    }

    #[test]
    fn test_price_new_negative() {
        assert!(Price::new(-1.0).is_err());
    }

    #[test]
    fn test_price_new_nan() {
        let price = Price::new(f64::NAN);
        assert_eq!(price.unwrap_err(), "Price must be finite");
    }

    #[test]
    fn test_offset_pips() {
        let price = Price::new(1.1).unwrap();
        assert!((price.offset_pips(30.0, 0.0001) - 1.103).abs() < 1e-12);
        assert!((price.offset_pips(-40.0, 0.0001) - 1.096).abs() < 1e-12);
    }
}
