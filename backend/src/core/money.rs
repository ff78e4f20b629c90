//! Money arithmetic for the waterfall
//!
//! Every amount the engine moves is an `i64` number of cents. Two operations
//! need care:
//!
//! - Applying a fractional multiple (1.5x preference, 2x cap) to a cents amount.
//!   The product is rounded to the nearest cent exactly once.
//! - Splitting an amount pro-rata across weights. Splits use `u128`
//!   intermediates and the largest-remainder method so the parts always sum to
//!   the input. This is what lets the engine check conservation with `==`.
//!
//! # Example
//!
//! ```
//! use waterfall_core_rs::core::money::allocate_pro_rata;
//!
//! // $100.00 split 1:1:1 -> 3334 + 3333 + 3333 cents
//! let parts = allocate_pro_rata(10_000, &[1, 1, 1]);
//! assert_eq!(parts, vec![3_334, 3_333, 3_333]);
//! assert_eq!(parts.iter().sum::<i64>(), 10_000);
//! ```

/// Number of cents in one dollar
pub const CENTS_PER_DOLLAR: i64 = 100;

/// Apply a multiple to a cents amount, rounding to the nearest cent
///
/// # Example
/// ```
/// use waterfall_core_rs::core::money::apply_multiple;
///
/// assert_eq!(apply_multiple(500_000_000, 1.25), 625_000_000);
/// assert_eq!(apply_multiple(1, 0.5), 1); // half rounds away from zero
/// ```
pub fn apply_multiple(amount: i64, multiple: f64) -> i64 {
    (amount as f64 * multiple).round() as i64
}

/// `apply_multiple`, or `None` when the product does not fit in i64 cents
///
/// # Example
/// ```
/// use waterfall_core_rs::core::money::checked_multiple;
///
/// assert_eq!(checked_multiple(200, 1.5), Some(300));
/// assert_eq!(checked_multiple(4_000_000_000_000_000_000, 3.0), None);
/// ```
pub fn checked_multiple(amount: i64, multiple: f64) -> Option<i64> {
    to_cents((amount as f64 * multiple).round())
}

/// Convert a dollar amount to cents, rounding to the nearest cent
pub fn dollars_to_cents(dollars: f64) -> i64 {
    (dollars * CENTS_PER_DOLLAR as f64).round() as i64
}

/// `dollars_to_cents`, or `None` for NaN, infinities and amounts outside i64 cents
pub fn checked_dollars_to_cents(dollars: f64) -> Option<i64> {
    to_cents((dollars * CENTS_PER_DOLLAR as f64).round())
}

// i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
fn to_cents(value: f64) -> Option<i64> {
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Convert cents to dollars (display and FFI only, never fed back into the engine)
pub fn cents_to_dollars(cents: i64) -> f64 {
    cents as f64 / CENTS_PER_DOLLAR as f64
}

/// Split `amount` across `weights` in proportion, with no cent lost or created
///
/// Each part starts as `floor(amount * w / total)`. The cents left over
/// (strictly fewer than the number of weights) go one each to the parts with
/// the largest fractional remainders; ties go to the lower index. A zero weight
/// always receives zero.
///
/// Returns all zeros when `amount <= 0` or every weight is zero; callers that
/// must not lose money check the total weight first.
pub fn allocate_pro_rata(amount: i64, weights: &[u128]) -> Vec<i64> {
    let mut parts = vec![0i64; weights.len()];
    let total_weight: u128 = weights.iter().sum();
    if amount <= 0 || total_weight == 0 {
        return parts;
    }

    let amount_u = amount as u128;
    let mut remainders: Vec<(usize, u128)> = Vec::with_capacity(weights.len());
    let mut distributed: i64 = 0;

    for (i, &weight) in weights.iter().enumerate() {
        let product = amount_u * weight;
        let base = (product / total_weight) as i64;
        parts[i] = base;
        distributed += base;
        if weight > 0 {
            remainders.push((i, product % total_weight));
        }
    }

    let leftover = (amount - distributed) as usize;
    if leftover > 0 {
        // Largest remainder first; stable sort keeps lower indices ahead on ties
        remainders.sort_by(|a, b| b.1.cmp(&a.1));
        for &(i, _) in remainders.iter().take(leftover) {
            parts[i] += 1;
        }
    }

    parts
}
