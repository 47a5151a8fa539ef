use num_traits::Float;

#[derive(Clone, Copy, Debug, PartialEq)]
/// A quantity with an absolute measurement uncertainty
///
/// The uncertainty is the $\pm$ bound on the central value, in the same units
/// as the value itself, and is non-negative by construction. Arithmetic
/// produces fresh values with the uncertainty propagated by first-order
/// linearization, combining independent contributions in quadrature:
///
/// $$
///     \sigma_f = \sqrt{ \left( \frac{\partial f}{\partial a} \sigma_a
///     \right)^2 + \left( \frac{\partial f}{\partial b} \sigma_b \right)^2 }
/// $$
///
/// This is the standard (GUM) rule for uncorrelated inputs. The worst-case
/// linear sum would give materially larger published uncertainties; the
/// quadrature choice is deliberate and assumed throughout the crate.
pub struct Uncertain<E> {
    value: E,
    uncertainty: E,
}

impl<E: Float> Uncertain<E> {
    /// Construct from a central value and an absolute uncertainty.
    ///
    /// The magnitude of `uncertainty` is taken, so the non-negativity
    /// invariant holds for any input.
    pub fn new(value: E, uncertainty: E) -> Self {
        Self {
            value,
            uncertainty: uncertainty.abs(),
        }
    }

    /// A quantity known exactly, with zero uncertainty.
    ///
    /// An exact zero is a valid value, distinct from "undefined".
    pub fn exact(value: E) -> Self {
        Self {
            value,
            uncertainty: E::zero(),
        }
    }

    pub const fn value(&self) -> E {
        self.value
    }

    pub const fn abs_uncertainty(&self) -> E {
        self.uncertainty
    }

    /// Whether a relative-uncertainty propagation rule is undefined here.
    ///
    /// True for a zero-valued quantity carrying nonzero uncertainty: the
    /// relative uncertainty divides by the value. An exact zero is not
    /// degenerate, it propagates cleanly through the linearized rules.
    pub fn is_degenerate(&self) -> bool {
        self.value.is_zero() && !self.uncertainty.is_zero()
    }

    /// Propagate through an arbitrary scalar function `f`.
    ///
    /// Linearized propagation, $\sigma_{f(x)} = |f'(x)| \sigma_x$, with the
    /// derivative estimated by central finite difference. The step is
    /// $\sqrt{\epsilon} \max(|x|, 1)$, which balances truncation and
    /// round-off error for smooth `f` and stays well defined at $x = 0$.
    pub fn apply<F: Fn(E) -> E>(&self, f: F) -> Self {
        let two = E::one() + E::one();
        let step = E::epsilon().sqrt() * self.value.abs().max(E::one());
        let derivative = (f(self.value + step) - f(self.value - step)) / (two * step);
        Self {
            value: f(self.value),
            uncertainty: (derivative * self.uncertainty).abs(),
        }
    }
}

impl<E: Float> std::ops::Add for Uncertain<E> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
            uncertainty: self.uncertainty.hypot(rhs.uncertainty),
        }
    }
}

impl<E: Float> std::ops::Sub for Uncertain<E> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            value: self.value - rhs.value,
            uncertainty: self.uncertainty.hypot(rhs.uncertainty),
        }
    }
}

impl<E: Float> std::ops::Mul for Uncertain<E> {
    type Output = Self;

    /// $\sigma = \sqrt{(b \sigma_a)^2 + (a \sigma_b)^2}$, which unlike the
    /// relative-uncertainty form stays defined when either value is zero.
    fn mul(self, rhs: Self) -> Self {
        Self {
            value: self.value * rhs.value,
            uncertainty: (rhs.value * self.uncertainty).hypot(self.value * rhs.uncertainty),
        }
    }
}

impl<E: Float> std::ops::Div for Uncertain<E> {
    type Output = Self;

    /// $\sigma = \sqrt{(\sigma_a / b)^2 + (a \sigma_b / b^2)^2}$
    ///
    /// A zero-valued divisor is a caller error; the pipeline rejects it as a
    /// configuration problem before any division happens.
    fn div(self, rhs: Self) -> Self {
        Self {
            value: self.value / rhs.value,
            uncertainty: (self.uncertainty / rhs.value)
                .hypot(self.value * rhs.uncertainty / (rhs.value * rhs.value)),
        }
    }
}

impl<E: Float> std::ops::Neg for Uncertain<E> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            value: -self.value,
            uncertainty: self.uncertainty,
        }
    }
}
