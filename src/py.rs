use crate::{DDFloat, Error};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// A double-double floating-point number.
///
/// The value is the unevaluated sum of two doubles, which gives about 32
/// significant decimal digits.
#[pyclass(name = "DDFloat")]
struct PyDDFloat {
    inner: DDFloat,
}

impl PyDDFloat {
    fn wrap(inner: DDFloat) -> PyDDFloat {
        PyDDFloat { inner }
    }
}

#[pymethods]
impl PyDDFloat {
    /// Create a new number from the two words `hi` and `lo`. The pair is
    /// normalized.
    #[new]
    #[pyo3(signature = (hi, lo=0.0))]
    fn new(hi: f64, lo: f64) -> Self {
        Self::wrap(DDFloat::new(hi, lo))
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
    fn __repr__(&self) -> String {
        format!("DDFloat({})", self.inner)
    }
    fn __float__(&self) -> f64 {
        self.inner.to_f64()
    }
    /// Returns the leading word.
    fn hi(&self) -> f64 {
        self.inner.hi()
    }
    /// Returns the trailing word.
    fn lo(&self) -> f64 {
        self.inner.lo()
    }
    /// Returns the category of the number.
    fn get_category(&self) -> String {
        format!("{:?}", self.inner.category())
    }
    /// Returns true if the number is negative.
    fn is_negative(&self) -> bool {
        self.inner.is_negative()
    }
    /// Returns true if the number is +-inf.
    fn is_inf(&self) -> bool {
        self.inner.is_inf()
    }
    /// Returns true if the number is NaN.
    fn is_nan(&self) -> bool {
        self.inner.is_nan()
    }
    /// Returns true if the number is +-zero.
    fn is_zero(&self) -> bool {
        self.inner.is_zero()
    }

    fn __add__(&self, other: &PyDDFloat) -> PyDDFloat {
        Self::wrap(self.inner + other.inner)
    }
    fn __sub__(&self, other: &PyDDFloat) -> PyDDFloat {
        Self::wrap(self.inner - other.inner)
    }
    fn __mul__(&self, other: &PyDDFloat) -> PyDDFloat {
        Self::wrap(self.inner * other.inner)
    }
    fn __truediv__(&self, other: &PyDDFloat) -> PyDDFloat {
        Self::wrap(self.inner / other.inner)
    }
    fn __neg__(&self) -> PyDDFloat {
        Self::wrap(-self.inner)
    }
    fn __abs__(&self) -> PyDDFloat {
        self.abs()
    }
    fn __lt__(&self, other: &PyDDFloat) -> bool {
        self.inner < other.inner
    }
    fn __le__(&self, other: &PyDDFloat) -> bool {
        self.inner <= other.inner
    }
    fn __eq__(&self, other: &PyDDFloat) -> bool {
        self.inner == other.inner
    }
    fn __ne__(&self, other: &PyDDFloat) -> bool {
        self.inner != other.inner
    }
    fn __gt__(&self, other: &PyDDFloat) -> bool {
        self.inner > other.inner
    }
    fn __ge__(&self, other: &PyDDFloat) -> bool {
        self.inner >= other.inner
    }

    /// Returns the absolute value of the number.
    fn abs(&self) -> PyDDFloat {
        Self::wrap(self.inner.abs())
    }
    /// Returns the maximum of two numbers (as defined by IEEE 754).
    fn max(&self, other: &PyDDFloat) -> PyDDFloat {
        Self::wrap(self.inner.max(&other.inner))
    }
    /// Returns the minimum of two numbers (as defined by IEEE 754).
    fn min(&self, other: &PyDDFloat) -> PyDDFloat {
        Self::wrap(self.inner.min(&other.inner))
    }
    /// Returns the number raised to the integer power `exp`.
    fn powi(&self, exp: i32) -> PyDDFloat {
        Self::wrap(self.inner.powi(exp))
    }
    /// Returns the number raised to the power `exp`.
    fn powf(&self, exp: &PyDDFloat) -> PyDDFloat {
        Self::wrap(self.inner.powf(&exp.inner))
    }
    /// Returns the square root of the number.
    fn sqrt(&self) -> PyDDFloat {
        Self::wrap(self.inner.sqrt())
    }
    /// Returns the cube root of the number.
    fn cbrt(&self) -> PyDDFloat {
        Self::wrap(self.inner.cbrt())
    }
    /// Returns the n-th root of the number.
    fn root_n(&self, n: u32) -> PyDDFloat {
        Self::wrap(self.inner.root_n(n))
    }
    /// Returns the exponential of the number.
    fn exp(&self) -> PyDDFloat {
        Self::wrap(self.inner.exp())
    }
    /// Returns the natural logarithm of the number.
    fn ln(&self) -> PyDDFloat {
        Self::wrap(self.inner.ln())
    }
    /// Returns the error function of the number.
    fn erf(&self) -> PyDDFloat {
        Self::wrap(self.inner.erf())
    }
    /// Returns the complementary error function of the number.
    fn erfc(&self) -> PyDDFloat {
        Self::wrap(self.inner.erfc())
    }
    /// Returns the gamma function of the number.
    fn gamma(&self) -> PyDDFloat {
        Self::wrap(self.inner.gamma())
    }
    /// Returns the log of the gamma function of the number.
    fn ln_gamma(&self) -> PyDDFloat {
        Self::wrap(self.inner.ln_gamma())
    }
    /// Returns the regularized lower incomplete gamma P(self, x).
    fn gamma_p(&self, x: &PyDDFloat) -> PyDDFloat {
        Self::wrap(self.inner.gamma_p(&x.inner))
    }
    /// Returns the regularized upper incomplete gamma Q(self, x).
    fn gamma_q(&self, x: &PyDDFloat) -> PyDDFloat {
        Self::wrap(self.inner.gamma_q(&x.inner))
    }
    /// Returns x such that Q(self, x) = q.
    fn inverse_gamma_q(&self, q: &PyDDFloat) -> PyDDFloat {
        Self::wrap(self.inner.inverse_upper_incomplete_gamma(&q.inner))
    }
    /// Evaluates the Legendre polynomial of degree `n` at this number.
    fn legendre_p(&self, n: u32) -> PyResult<PyDDFloat> {
        Ok(Self::wrap(self.inner.legendre_p(n)?))
    }
    /// Returns the rising factorial with `n` factors.
    fn rising_factorial(&self, n: u32) -> PyResult<PyDDFloat> {
        Ok(Self::wrap(self.inner.rising_factorial(n)?))
    }
    /// Prints the number using the internal representation.
    fn dump(&self) {
        self.inner.dump();
    }
} // impl PyDDFloat

/// Parses a decimal literal.
///
/// Raises ValueError if the string is not a number.
#[pyfunction]
fn parse(s: &str) -> PyResult<PyDDFloat> {
    Ok(PyDDFloat::wrap(DDFloat::parse(s)?))
}

/// Returns the mathematical constant pi.
#[pyfunction]
fn pi() -> PyDDFloat {
    PyDDFloat::wrap(DDFloat::PI)
}

/// Returns the mathematical constant e (Euler's number).
#[pyfunction]
fn e() -> PyDDFloat {
    PyDDFloat::wrap(DDFloat::E)
}

/// Returns the natural logarithm of 2.
#[pyfunction]
fn ln2() -> PyDDFloat {
    PyDDFloat::wrap(DDFloat::LN_2)
}

/// Returns n! for n <= 256.
#[pyfunction]
fn factorial(n: u32) -> PyResult<PyDDFloat> {
    Ok(PyDDFloat::wrap(DDFloat::factorial(n)?))
}

/// Returns a new number with the fp64 value 'val'.
#[pyfunction]
fn from_fp64(val: f64) -> PyDDFloat {
    PyDDFloat::wrap(DDFloat::from_f64(val))
}

#[pymodule]
fn _ddfloat(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDDFloat>()?;

    m.add_function(wrap_pyfunction!(parse, m)?)?;
    m.add_function(wrap_pyfunction!(pi, m)?)?;
    m.add_function(wrap_pyfunction!(e, m)?)?;
    m.add_function(wrap_pyfunction!(ln2, m)?)?;
    m.add_function(wrap_pyfunction!(factorial, m)?)?;
    m.add_function(wrap_pyfunction!(from_fp64, m)?)?;
    Ok(())
}
