use num_traits::Float;

use crate::ingest::MeasurementRow;
use crate::series::SeriesPoint;
use crate::uncertain::Uncertain;
use crate::{Error, Result};

/// Derive the measured current series from the parsed rows.
///
/// Each row yields one point: the time offset from the first row's timestamp
/// and the current through the resistor by Ohm's law,
///
/// $$
///     I_i = \frac{V_{\text{start},i} - V_{\text{end},i}}{R},
/// $$
///
/// with uncertainty propagated through the subtraction and the division. The
/// first point always lands at offset zero; row order is preserved.
///
/// # Errors
/// Returns [`Error::Configuration`] for a zero-valued resistance. That is a
/// broken parameter set, not a data problem, and failing here beats
/// propagating an infinite uncertainty into the published series.
pub fn derive_currents<E: Float>(
    rows: &[MeasurementRow<E>],
    resistance: Uncertain<E>,
) -> Result<Vec<SeriesPoint<E>>> {
    if resistance.value().is_zero() {
        return Err(Error::Configuration(
            "resistance must be nonzero to derive currents".into(),
        ));
    }

    let Some(first) = rows.first() else {
        return Ok(vec![]);
    };
    let initial_time = first.timestamp;

    Ok(rows
        .iter()
        .map(|row| SeriesPoint {
            time: row.timestamp - initial_time,
            current: (row.voltage_start - row.voltage_end) / resistance,
        })
        .collect())
}
