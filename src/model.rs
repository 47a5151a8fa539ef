use num_traits::Float;

use crate::config::CircuitConfig;
use crate::series::SeriesPoint;
use crate::uncertain::Uncertain;
use crate::Result;

/// Evaluate the theoretical charging-circuit model over the configured grid.
///
/// The predicted current follows the exponential decay
///
/// $$
///     I(t) = \frac{V_{\text{supply}}}{R} \exp\left( - \frac{t}{R C} \right),
/// $$
///
/// with uncertainty propagated from the component tolerances through the
/// division, multiplication, negation and the nonlinear `exp`. The grid is
/// synthetic and independent of the measured timestamps: `grid.steps` points,
/// one grid unit apart, each unit spanning `grid.step_seconds` inside the
/// exponent. Reported time values are in grid units, matching the plot axis.
///
/// # Errors
/// Returns [`crate::Error::Configuration`] for a zero-valued resistance or
/// capacitance, which would put a zero in a denominator of the formula.
pub fn evaluate<E: Float>(config: &CircuitConfig<E>) -> Result<Vec<SeriesPoint<E>>> {
    config.validate()?;

    let resistance = config.resistance.to_uncertain();
    let peak = config.supply_voltage.to_uncertain() / resistance;
    let time_constant = resistance * config.capacitance.to_uncertain();

    let points = (0..config.grid.steps)
        .map(|step| {
            let time = E::from(step).expect("grid index must fit in `E`");
            let seconds = Uncertain::exact(time * config.grid.step_seconds);
            SeriesPoint {
                time,
                current: predicted_current(seconds, peak, time_constant),
            }
        })
        .collect();

    Ok(points)
}

/// One step of the model.
///
/// A zero-valued exponent with nonzero uncertainty is degenerate for
/// relative-uncertainty propagation, so such a step is substituted with an
/// exact zero instead of being pushed through `exp`. The check is an explicit
/// predicate, not a caught division error. On the synthetic grid the exponent
/// at $t = 0$ is an exact zero, which is not degenerate: the step evaluates
/// to $V_{\text{supply}} / R$ with its propagated uncertainty.
fn predicted_current<E: Float>(
    seconds: Uncertain<E>,
    peak: Uncertain<E>,
    time_constant: Uncertain<E>,
) -> Uncertain<E> {
    let exponent = -(seconds / time_constant);
    if exponent.is_degenerate() {
        return Uncertain::exact(E::zero());
    }
    peak * exponent.apply(E::exp)
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::config::{CircuitConfig, Component, Grid};
    use crate::uncertain::Uncertain;
    use crate::Error;

    use super::{evaluate, predicted_current};

    #[test]
    fn series_has_exactly_one_point_per_grid_step() {
        let config = CircuitConfig::<f64>::default();
        let series = evaluate(&config).unwrap();
        assert_eq!(series.len(), 600);
    }

    #[test]
    fn grid_times_are_monotonically_non_decreasing() {
        let config = CircuitConfig::<f64>::default();
        let series = evaluate(&config).unwrap();
        for (earlier, later) in series.iter().tuple_windows() {
            assert!(earlier.time <= later.time);
        }
    }

    #[test]
    fn first_step_is_the_peak_current_not_the_zero_substitution() {
        let config = CircuitConfig::<f64>::default();
        let series = evaluate(&config).unwrap();

        let first = series[0].current;
        approx::assert_relative_eq!(first.value(), 5.0 / 220.0, max_relative = 1e-12);
        assert!(first.abs_uncertainty() > 0.0);
    }

    #[test]
    fn current_decays_along_the_grid() {
        let config = CircuitConfig::<f64>::default();
        let series = evaluate(&config).unwrap();
        for (earlier, later) in series.iter().tuple_windows() {
            assert!(later.current.value() < earlier.current.value());
        }
    }

    #[test]
    fn later_steps_follow_the_analytical_decay() {
        let config = CircuitConfig::<f64>::default();
        let series = evaluate(&config).unwrap();

        let time_constant = 220.0 * 100e-6;
        for step in [1, 10, 300, 599] {
            let seconds = f64::from(step) / 1000.0;
            let expected = 5.0 / 220.0 * (-seconds / time_constant).exp();
            approx::assert_relative_eq!(
                series[step as usize].current.value(),
                expected,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn degenerate_exponent_is_substituted_with_an_exact_zero() {
        let peak = Uncertain::new(5.0 / 220.0, 1e-3);
        let time_constant = Uncertain::new(0.022, 0.0022);
        // Zero seconds with a nonzero uncertainty is exactly the case a
        // relative-uncertainty rule cannot propagate.
        let current = predicted_current(Uncertain::new(0.0, 0.5), peak, time_constant);
        assert_eq!(current.value(), 0.0);
        assert_eq!(current.abs_uncertainty(), 0.0);
    }

    #[test]
    fn zero_capacitance_is_rejected() {
        let config = CircuitConfig {
            capacitance: Component {
                value: 0.0,
                tolerance: 5e-6,
            },
            ..CircuitConfig::<f64>::default()
        };
        assert!(matches!(evaluate(&config), Err(Error::Configuration(_))));
    }

    #[test]
    fn custom_grid_length_is_honoured() {
        let config = CircuitConfig {
            grid: Grid {
                steps: 42,
                step_seconds: 0.01,
            },
            ..CircuitConfig::<f64>::default()
        };
        let series = evaluate(&config).unwrap();
        assert_eq!(series.len(), 42);
    }
}
