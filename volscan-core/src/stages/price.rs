//! Day-over-day close change in percent. Undefined on the first row.

use super::Stage;
use crate::domain::AnnotatedBar;

#[derive(Debug, Clone, Copy, Default)]
pub struct PriceChange;

/// `(close - prev_close) / prev_close * 100`, `None` if not finite.
pub fn pct_change(prev_close: f64, close: f64) -> Option<f64> {
    let pct = (close - prev_close) / prev_close * 100.0;
    pct.is_finite().then_some(pct)
}

impl Stage for PriceChange {
    fn name(&self) -> &str {
        "price_change"
    }

    fn warmup(&self) -> usize {
        1
    }

    fn apply(&self, mut rows: Vec<AnnotatedBar>) -> Vec<AnnotatedBar> {
        let mut prev_close: Option<f64> = None;
        for row in rows.iter_mut() {
            row.price_change_pct = prev_close.and_then(|p| pct_change(p, row.bar.close));
            prev_close = Some(row.bar.close);
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{assert_approx, make_rows, DEFAULT_EPSILON};

    #[test]
    fn first_row_undefined() {
        let out = PriceChange.apply(make_rows(&[100.0, 103.0], &[1, 1]));
        assert!(out[0].price_change_pct.is_none());
        assert_approx(out[1].price_change_pct.unwrap(), 3.0, 1e-9);
    }

    #[test]
    fn negative_change() {
        let out = PriceChange.apply(make_rows(&[64.0, 48.0], &[1, 1]));
        assert_approx(out[1].price_change_pct.unwrap(), -25.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_previous_close_is_undefined() {
        assert_eq!(pct_change(0.0, 5.0), None);
        assert_eq!(pct_change(0.0, 0.0), None);
    }

    #[test]
    fn empty_input() {
        assert!(PriceChange.apply(vec![]).is_empty());
    }
}
