//! Rate arithmetic shared by every planner.

/// Crafting speed assumed for every recipe, whatever its category.
///
/// Stands in for the fastest assembling machine; there is no per-machine model.
pub const ASSUMED_CRAFTING_SPEED: f64 = 1.25;

/// Smallest value a flow link carries, so renderers never draw zero-width bands.
pub const MIN_LINK_VALUE: f64 = 0.01;

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rate at which an ingredient must be supplied to run a recipe at `recipe_rate`
/// units per second of its primary output.
#[must_use]
pub fn ingredient_rate(ingredient_amount: f64, recipe_rate: f64, output_amount: f64) -> f64 {
    (ingredient_amount * recipe_rate) / output_amount
}

/// Machines needed to sustain `rate` of a recipe's primary output.
///
/// Rounded up to the next hundredth.
#[must_use]
pub fn machines_needed(rate: f64, crafting_time: f64, output_amount: f64) -> f64 {
    (rate * crafting_time / (output_amount * ASSUMED_CRAFTING_SPEED) * 100.0).ceil() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(10.0), 10.0);
        assert_eq!(round2(0.004), 0.0);
    }

    #[test]
    fn test_ingredient_rate() {
        assert_eq!(ingredient_rate(2.0, 10.0, 1.0), 20.0);
        assert_eq!(ingredient_rate(3.0, 10.0, 2.0), 15.0);
    }

    #[test]
    fn test_machines_needed() {
        assert_eq!(machines_needed(10.0, 1.0, 1.0), 8.0);
        // 1 * 0.5 / 1.25 = 0.4
        assert_eq!(machines_needed(1.0, 0.5, 1.0), 0.4);
        // 1 / 3.75 = 0.2666.. rounds up
        assert_eq!(machines_needed(1.0, 1.0, 3.0), 0.27);
    }
}
