use std::io::BufRead;
use std::path::Path;

use itertools::multiunzip;
use log::debug;
use ndarray::Array1;
use num_traits::Float;
use serde::de::DeserializeOwned;

use crate::config::CircuitConfig;
use crate::uncertain::Uncertain;
use crate::{current, ingest, model, Result};

/// One point of a current-over-time series.
#[derive(Clone, Copy, Debug)]
pub struct SeriesPoint<E> {
    /// Offset from the start of the series, measured or in grid units.
    pub time: E,
    pub current: Uncertain<E>,
}

/// A plottable series: x values, central y values and their uncertainties.
///
/// The three arrays are equal-length and index-aligned by construction, so a
/// visualization sink can draw error bars without further bookkeeping.
#[derive(Clone, Debug)]
pub struct Series<E> {
    x: Array1<E>,
    y: Array1<E>,
    y_err: Array1<E>,
    label: String,
}

impl<E: Float> Series<E> {
    pub fn from_points(points: &[SeriesPoint<E>], label: impl Into<String>) -> Self {
        let (x, y, y_err): (Vec<E>, Vec<E>, Vec<E>) = multiunzip(
            points
                .iter()
                .map(|p| (p.time, p.current.value(), p.current.abs_uncertainty())),
        );
        Self {
            x: Array1::from(x),
            y: Array1::from(y),
            y_err: Array1::from(y_err),
            label: label.into(),
        }
    }

    pub const fn x(&self) -> &Array1<E> {
        &self.x
    }

    pub const fn y(&self) -> &Array1<E> {
        &self.y
    }

    pub const fn y_err(&self) -> &Array1<E> {
        &self.y_err
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// The seam to the external plotting collaborator.
///
/// The analysis hands over ordered `(x, y, y_err)` sequences and axis labels;
/// rendering, styling and display live entirely behind this trait.
pub trait SeriesSink<E> {
    fn axis_labels(&mut self, x_label: &str, y_label: &str);
    fn plot_series(&mut self, series: &Series<E>);
}

/// Measured and predicted current, aligned for comparison.
#[derive(Clone, Debug)]
pub struct Comparison<E> {
    pub measured: Series<E>,
    pub predicted: Series<E>,
    pub x_label: String,
    pub y_label: String,
}

impl<E: Float> Comparison<E> {
    /// Hand both series to a visualization sink. Pure marshaling.
    pub fn render_into<S: SeriesSink<E>>(&self, sink: &mut S) {
        sink.axis_labels(&self.x_label, &self.y_label);
        sink.plot_series(&self.predicted);
        sink.plot_series(&self.measured);
    }
}

/// Run the whole analysis over a raw-data source.
///
/// Ingests the wrapped-format lines, derives the measured current series and
/// evaluates the model over the configured grid, returning the aligned pair.
/// Either both series come back complete or the run fails; there is no
/// partial output.
///
/// # Errors
/// Returns an error for an invalid configuration, an unreadable source or a
/// malformed input line.
pub fn analyse<E, R>(source: R, config: &CircuitConfig<E>) -> Result<Comparison<E>>
where
    E: Float + DeserializeOwned,
    R: BufRead,
{
    config.validate()?;
    let rows = ingest::read_rows(source, config.voltage_tolerance)?;
    compare(&rows, config)
}

/// [`analyse`] over an on-disk raw data file.
///
/// # Errors
/// As [`analyse`], plus the file-open failure.
pub fn analyse_file<E: Float + DeserializeOwned>(
    path: &Path,
    config: &CircuitConfig<E>,
) -> Result<Comparison<E>> {
    config.validate()?;
    let rows = ingest::from_file(path, config.voltage_tolerance)?;
    compare(&rows, config)
}

fn compare<E: Float>(
    rows: &[ingest::MeasurementRow<E>],
    config: &CircuitConfig<E>,
) -> Result<Comparison<E>> {
    debug!("comparing {} measurement rows against the model", rows.len());

    let measured = current::derive_currents(rows, config.resistance.to_uncertain())?;
    let predicted = model::evaluate(config)?;

    Ok(Comparison {
        measured: Series::from_points(&measured, "Measured"),
        predicted: Series::from_points(&predicted, "Predicted"),
        x_label: "Time (ms)".into(),
        y_label: "Current (A)".into(),
    })
}
