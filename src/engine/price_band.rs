use crate::store::CoreError;

pub const DEFAULT_PRICE_MARGIN: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub low: f64,
    pub base: f64,
    pub high: f64,
}

/**
 * The price pipeline predicts `log1p(price)`. Undo it and widen by `margin_fraction` on both
 * sides.
 */
pub fn price_range(predicted_log_price: f64, margin_fraction: f64) -> Result<PriceRange, CoreError> {
    if !predicted_log_price.is_finite() {
        return Err(CoreError::InvalidArgument(format!(
            "predicted log price must be finite, got {}",
            predicted_log_price
        )));
    }
    if !(margin_fraction >= 0.0 && margin_fraction < 1.0) {
        return Err(CoreError::InvalidArgument(format!(
            "margin must be in [0, 1), got {}",
            margin_fraction
        )));
    }

    let base = predicted_log_price.exp_m1();
    Ok(PriceRange {
        low: base * (1.0 - margin_fraction),
        base,
        high: base * (1.0 + margin_fraction),
    })
}
