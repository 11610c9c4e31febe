#![allow(clippy::useless_conversion)]

use nalgebra::{SMatrix, Vector2, Vector3};
use pyo3::{exceptions::PyValueError, prelude::*, types::PyDict, wrap_pyfunction};

use crate::{
    api::{estimate_fundamental_matrix, estimate_similarity_transform},
    error::EstimationError,
    settings::{RansacOptions, DEFAULT_RANDOM_SEED},
};

fn to_value_error(err: EstimationError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn rows_to_python<const C: usize>(matrix: &SMatrix<f64, 3, C>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

#[pyclass(name = "RansacOptions")]
#[derive(Clone)]
pub struct PyRansacOptions {
    inner: RansacOptions,
}

#[pymethods]
impl PyRansacOptions {
    #[new]
    #[pyo3(signature = (
        max_error=4.0,
        min_inlier_ratio=0.1,
        confidence=0.99,
        max_num_trials=10_000,
        min_num_trials=0,
        local_optimization=true,
        max_num_local_trials=10,
        random_seed=Some(DEFAULT_RANDOM_SEED),
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        max_error: f64,
        min_inlier_ratio: f64,
        confidence: f64,
        max_num_trials: usize,
        min_num_trials: usize,
        local_optimization: bool,
        max_num_local_trials: usize,
        random_seed: Option<u64>,
    ) -> PyResult<Self> {
        let inner = RansacOptions {
            max_error,
            min_inlier_ratio,
            confidence,
            max_num_trials,
            min_num_trials,
            local_optimization,
            max_num_local_trials,
            random_seed,
        };
        inner.validate().map_err(to_value_error)?;
        Ok(Self { inner })
    }

    #[getter]
    pub fn max_error(&self) -> f64 {
        self.inner.max_error
    }

    #[getter]
    pub fn min_inlier_ratio(&self) -> f64 {
        self.inner.min_inlier_ratio
    }

    #[getter]
    pub fn confidence(&self) -> f64 {
        self.inner.confidence
    }

    #[getter]
    pub fn max_num_trials(&self) -> usize {
        self.inner.max_num_trials
    }

    #[getter]
    pub fn random_seed(&self) -> Option<u64> {
        self.inner.random_seed
    }

    fn __repr__(&self) -> String {
        format!("{:?}", self.inner)
    }
}

/// LO-RANSAC with the 7-point solver and 8-point refinement.
///
/// Returns `None` on failure, otherwise a dict with `F`, `num_inliers` and
/// the boolean `inliers` mask.
#[pyfunction(signature = (points2D1, points2D2, options=None))]
#[allow(non_snake_case)]
pub fn fundamental_matrix_estimation(
    py: Python<'_>,
    points2D1: Vec<[f64; 2]>,
    points2D2: Vec<[f64; 2]>,
    options: Option<PyRansacOptions>,
) -> PyResult<PyObject> {
    let options = options.map(|o| o.inner).unwrap_or_default();
    let points1: Vec<Vector2<f64>> = points2D1.iter().map(|p| Vector2::from(*p)).collect();
    let points2: Vec<Vector2<f64>> = points2D2.iter().map(|p| Vector2::from(*p)).collect();

    let report = py
        .allow_threads(|| estimate_fundamental_matrix(&points1, &points2, &options))
        .map_err(to_value_error)?;
    let Some(model) = report.model.filter(|_| report.success) else {
        return Ok(py.None());
    };

    let out = PyDict::new_bound(py);
    out.set_item("F", rows_to_python(&model.f))?;
    out.set_item("num_inliers", report.support.num_inliers)?;
    out.set_item("inliers", report.inlier_mask)?;
    Ok(out.into_any().unbind())
}

/// LO-RANSAC over the Umeyama similarity estimator.
///
/// Returns `None` on failure, otherwise a dict with the 3x4 `matrix`,
/// `num_inliers` and the boolean `inliers` mask.
#[pyfunction(signature = (src, tgt, options=None))]
pub fn similarity_transform_estimation(
    py: Python<'_>,
    src: Vec<[f64; 3]>,
    tgt: Vec<[f64; 3]>,
    options: Option<PyRansacOptions>,
) -> PyResult<PyObject> {
    let options = options.map(|o| o.inner).unwrap_or_default();
    let src: Vec<Vector3<f64>> = src.iter().map(|p| Vector3::from(*p)).collect();
    let tgt: Vec<Vector3<f64>> = tgt.iter().map(|p| Vector3::from(*p)).collect();

    let report = py
        .allow_threads(|| estimate_similarity_transform(&src, &tgt, &options))
        .map_err(to_value_error)?;
    let Some(model) = report.model.filter(|_| report.success) else {
        return Ok(py.None());
    };

    let out = PyDict::new_bound(py);
    out.set_item("matrix", rows_to_python(model.matrix()))?;
    out.set_item("num_inliers", report.support.num_inliers)?;
    out.set_item("inliers", report.inlier_mask)?;
    Ok(out.into_any().unbind())
}

#[pymodule]
fn loransac(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyRansacOptions>()?;
    m.add_function(wrap_pyfunction!(fundamental_matrix_estimation, m)?)?;
    m.add_function(wrap_pyfunction!(similarity_transform_estimation, m)?)?;
    Ok(())
}
