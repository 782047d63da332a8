use crate::{config, Error, FloatValue, Semantics};
use core::cmp::Ordering;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::format;
use std::string::{String, ToString};

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Semantics class defining the layout of a number.
///
/// This class holds the widths of the exponent and mantissa fields.
#[pyclass(name = "Semantics")]
#[derive(Clone)]
struct PySemantics {
    inner: Semantics,
}

#[pymethods]
impl PySemantics {
    /// Create a new semantics object.
    ///
    /// Args:
    ///     exp_size: The size of the exponent in bits (1 to 32)
    ///     mantissa_size: The size of the mantissa in bits, including the
    ///         explicit leading bit (1 to 62)
    #[new]
    fn new(exp_size: u32, mantissa_size: u32) -> PyResult<Self> {
        let sem = Semantics::new(exp_size, mantissa_size)?;
        Ok(PySemantics { inner: sem })
    }
    /// Returns the process-wide semantics, locking them.
    #[staticmethod]
    fn global() -> Self {
        PySemantics {
            inner: Semantics::global(),
        }
    }
    /// Returns the length of the exponent in bits.
    fn get_exponent_len(&self) -> u32 {
        self.inner.get_exponent_len()
    }
    /// Returns the length of the mantissa in bits.
    fn get_mantissa_len(&self) -> u32 {
        self.inner.get_mantissa_len()
    }
    /// Returns the exponent bias.
    fn get_bias(&self) -> u32 {
        self.inner.get_bias()
    }
    fn __eq__(&self, other: &PySemantics) -> bool {
        self.inner == other.inner
    }
    fn __str__(&self) -> String {
        format!("{:?}", self.inner)
    }
    fn __repr__(&self) -> String {
        self.__str__()
    }
}

/// A binary floating point number with configurable widths.
#[pyclass(name = "FloatValue")]
struct PyFloatValue {
    inner: FloatValue,
}

impl PyFloatValue {
    fn wrap(inner: FloatValue) -> Self {
        PyFloatValue { inner }
    }
}

#[pymethods]
impl PyFloatValue {
    /// Create a new number from a Python float.
    ///
    /// Args:
    ///     sem: The semantics of the number
    ///     val: The value to convert
    #[new]
    fn new(sem: &PySemantics, val: f64) -> Self {
        Self::wrap(FloatValue::from_f64(sem.inner, val))
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
    fn __repr__(&self) -> String {
        format!("FloatValue({})", self.inner)
    }
    /// Returns the mantissa field.
    fn get_mantissa(&self) -> u64 {
        self.inner.get_mantissa()
    }
    /// Returns the biased exponent field.
    fn get_exponent(&self) -> u32 {
        self.inner.get_exponent()
    }
    /// Returns the category of the number.
    fn get_category(&self) -> String {
        format!("{:?}", self.inner.get_category())
    }
    /// Returns the semantics of the number.
    fn get_semantics(&self) -> PySemantics {
        PySemantics {
            inner: self.inner.get_semantics(),
        }
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
    /// Returns true if the number is zero.
    fn is_zero(&self) -> bool {
        self.inner.is_zero()
    }
    /// Compares the magnitudes of two numbers. Returns -1, 0 or 1.
    fn cmp_abs(&self, other: &PyFloatValue) -> i32 {
        match self.inner.cmp_abs(&other.inner) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }
    fn add(&self, other: &PyFloatValue) -> PyResult<PyFloatValue> {
        Ok(Self::wrap(self.inner.try_add(&other.inner)?))
    }
    fn sub(&self, other: &PyFloatValue) -> PyResult<PyFloatValue> {
        Ok(Self::wrap(self.inner.try_sub(&other.inner)?))
    }
    fn __add__(&self, other: &PyFloatValue) -> PyResult<PyFloatValue> {
        self.add(other)
    }
    fn __sub__(&self, other: &PyFloatValue) -> PyResult<PyFloatValue> {
        self.sub(other)
    }
    /// Returns the number with the sign flipped.
    fn __neg__(&self) -> PyFloatValue {
        Self::wrap(self.inner.neg())
    }
    fn __eq__(&self, other: &PyFloatValue) -> bool {
        self.inner == other.inner
    }
    /// Convert to f64.
    fn to_float64(&self) -> f64 {
        self.inner.as_f64()
    }
}

/// Returns zero with the given semantics.
#[pyfunction]
fn zero(sem: &PySemantics) -> PyFloatValue {
    PyFloatValue::wrap(FloatValue::zero(sem.inner))
}

/// Returns +inf, or -inf when `negative` is set.
#[pyfunction]
#[pyo3(signature = (sem, negative=false))]
fn inf(sem: &PySemantics, negative: bool) -> PyFloatValue {
    PyFloatValue::wrap(FloatValue::inf(sem.inner, negative))
}

/// Returns NaN with the given semantics.
#[pyfunction]
fn nan(sem: &PySemantics) -> PyFloatValue {
    PyFloatValue::wrap(FloatValue::nan(sem.inner))
}

/// Converts `val` using the process-wide semantics.
#[pyfunction]
fn from_fp64(val: f64) -> PyFloatValue {
    PyFloatValue::wrap(FloatValue::from(val))
}

/// Locks the process-wide mantissa width. Returns False if it was locked.
#[pyfunction]
fn set_mantissa_bits(bits: u32) -> bool {
    config::set_mantissa_bits(bits)
}

/// Locks the process-wide exponent width. Returns False if it was locked.
#[pyfunction]
fn set_exponent_bits(bits: u32) -> bool {
    config::set_exponent_bits(bits)
}

#[pymodule]
fn _bitfloat(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyFloatValue>()?;
    m.add_class::<PySemantics>()?;

    m.add_function(wrap_pyfunction!(zero, m)?)?;
    m.add_function(wrap_pyfunction!(inf, m)?)?;
    m.add_function(wrap_pyfunction!(nan, m)?)?;
    m.add_function(wrap_pyfunction!(from_fp64, m)?)?;
    m.add_function(wrap_pyfunction!(set_mantissa_bits, m)?)?;
    m.add_function(wrap_pyfunction!(set_exponent_bits, m)?)?;
    Ok(())
}
