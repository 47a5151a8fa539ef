use std::fs;
use std::path::Path;

use log::info;
use num_traits::Float;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::uncertain::Uncertain;
use crate::{Error, Result};

/// A circuit component rating with its manufacturing tolerance.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Component<E> {
    pub value: E,
    pub tolerance: E,
}

impl<E: Float> Component<E> {
    pub fn to_uncertain(self) -> Uncertain<E> {
        Uncertain::new(self.value, self.tolerance)
    }
}

/// The synthetic time grid the model is evaluated on.
///
/// The grid is independent of the measured timestamps: `steps` evenly spaced
/// points, one grid unit apart, with each unit spanning `step_seconds` of
/// real time inside the model formula.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(bound(deserialize = "E: Deserialize<'de> + Float"))]
pub struct Grid<E> {
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default = "default_step_seconds")]
    pub step_seconds: E,
}

const fn default_steps() -> usize {
    600
}

fn default_step_seconds<E: Float>() -> E {
    E::from(1e-3).expect("1e-3 must be representable in `E`")
}

impl<E: Float> Default for Grid<E> {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            step_seconds: default_step_seconds(),
        }
    }
}

/// Parameters of one analysis run
///
/// These are supplied as configuration, never derived from the data, and stay
/// fixed for the duration of a run.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(bound(deserialize = "E: Deserialize<'de> + Float"))]
pub struct CircuitConfig<E> {
    /// Absolute instrument uncertainty attached to every parsed voltage.
    pub voltage_tolerance: E,
    pub resistance: Component<E>,
    pub capacitance: Component<E>,
    pub supply_voltage: Component<E>,
    #[serde(default)]
    pub grid: Grid<E>,
}

impl<E: Float + DeserializeOwned> CircuitConfig<E> {
    /// Parse a configuration from its TOML representation.
    ///
    /// # Errors
    /// Returns an error if the document fails to parse or the parameters are
    /// rejected by [`CircuitConfig::validate`].
    pub fn from_toml(document: &str) -> Result<Self> {
        let config: Self = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or its contents are
    /// rejected by [`CircuitConfig::from_toml`].
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("reading circuit configuration from {}", path.display());
        let document = fs::read_to_string(path)?;
        Self::from_toml(&document)
    }
}

impl<E: Float> CircuitConfig<E> {
    /// Reject parameter sets that make the pipeline formulae undefined.
    ///
    /// A zero-valued resistance or capacitance puts a zero in a denominator
    /// of Ohm's law or the model time constant. That is a configuration
    /// error, caught here rather than surfaced as an infinite uncertainty
    /// somewhere downstream.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] for zero-valued resistance or
    /// capacitance, or for any negative tolerance.
    pub fn validate(&self) -> Result<()> {
        if self.resistance.value.is_zero() {
            return Err(Error::Configuration("resistance must be nonzero".into()));
        }
        if self.capacitance.value.is_zero() {
            return Err(Error::Configuration("capacitance must be nonzero".into()));
        }
        for (name, tolerance) in [
            ("resistance", self.resistance.tolerance),
            ("capacitance", self.capacitance.tolerance),
            ("supply_voltage", self.supply_voltage.tolerance),
            ("voltage_tolerance", self.voltage_tolerance),
        ] {
            if tolerance < E::zero() {
                return Err(Error::Configuration(format!(
                    "{name} tolerance must be non-negative"
                )));
            }
        }
        Ok(())
    }
}

impl Default for CircuitConfig<f64> {
    /// The bench setup the analysis was first run against: a 220 Ohm
    /// resistor, a 100 uF capacitor and a 5 V supply, read with a meter
    /// accurate to 50 uV.
    fn default() -> Self {
        Self {
            voltage_tolerance: 0.00005,
            resistance: Component {
                value: 220.0,
                tolerance: 10.0,
            },
            capacitance: Component {
                value: 100e-6,
                tolerance: 5e-6,
            },
            supply_voltage: Component {
                value: 5.0,
                tolerance: 0.00005,
            },
            grid: Grid::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CircuitConfig, Component, Grid};
    use crate::Error;

    const EXAMPLE: &str = r"
        voltage_tolerance = 0.00005

        [resistance]
        value = 220.0
        tolerance = 10.0

        [capacitance]
        value = 100e-6
        tolerance = 5e-6

        [supply_voltage]
        value = 5.0
        tolerance = 0.00005
    ";

    #[test]
    fn example_document_parses_with_default_grid() {
        let config: CircuitConfig<f64> = CircuitConfig::from_toml(EXAMPLE).unwrap();
        approx::assert_relative_eq!(config.resistance.value, 220.0);
        approx::assert_relative_eq!(config.capacitance.tolerance, 5e-6);
        assert_eq!(config.grid.steps, 600);
        approx::assert_relative_eq!(config.grid.step_seconds, 1e-3);
    }

    #[test]
    fn serialized_default_round_trips() {
        let config = CircuitConfig::<f64>::default();
        let document = toml::to_string(&config).unwrap();
        let reparsed: CircuitConfig<f64> = CircuitConfig::from_toml(&document).unwrap();
        approx::assert_relative_eq!(reparsed.supply_voltage.value, config.supply_voltage.value);
        assert_eq!(reparsed.grid.steps, config.grid.steps);
    }

    #[test]
    fn zero_resistance_is_rejected() {
        let config = CircuitConfig {
            resistance: Component {
                value: 0.0,
                tolerance: 10.0,
            },
            ..CircuitConfig::<f64>::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
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
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let config = CircuitConfig {
            voltage_tolerance: -0.1,
            ..CircuitConfig::<f64>::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn custom_grid_overrides_defaults() {
        let document = format!("{EXAMPLE}\n[grid]\nsteps = 50\nstep_seconds = 0.01\n");
        let config: CircuitConfig<f64> = CircuitConfig::from_toml(&document).unwrap();
        let grid: Grid<f64> = config.grid;
        assert_eq!(grid.steps, 50);
        approx::assert_relative_eq!(grid.step_seconds, 0.01);
    }
}
