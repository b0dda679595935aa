//! Python bindings, built with the `python` feature.

use std::path::Path;

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::checker::{global_checker, CheckOutcome};
use crate::error::SpellError;
use crate::lexicon::init_global_lexicon;
use crate::logging;

fn to_py_err(e: SpellError) -> PyErr {
    match e {
        SpellError::BundleNotFound(_) | SpellError::Io(_) => PyIOError::new_err(e.to_string()),
        SpellError::BundleCorrupt { .. } | SpellError::Config(_) => PyValueError::new_err(e.to_string()),
        _ => PyRuntimeError::new_err(e.to_string()),
    }
}

fn outcome_to_dict<'py>(py: Python<'py>, outcome: &CheckOutcome) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("success", outcome.success)?;
    if let Some(message) = &outcome.error {
        dict.set_item("error", message)?;
    }
    dict.set_item("tokens", &outcome.tokens)?;
    let offsets: Vec<i64> = outcome
        .token_offsets
        .iter()
        .map(|o| o.map_or(-1, |v| v as i64))
        .collect();
    dict.set_item("token_offsets", offsets)?;

    let errors = PyDict::new(py);
    for (idx, record) in outcome.errors.iter() {
        let entry = PyDict::new(py);
        entry.set_item("original", &record.original)?;
        entry.set_item("suggestions", &record.suggestions)?;
        entry.set_item("confidence", record.confidence)?;
        let error_type = match record.error_type {
            crate::diagnose::ErrorType::Spelling => "spelling",
            crate::diagnose::ErrorType::Contextual => "contextual",
            crate::diagnose::ErrorType::RegisterMismatch => "register_mismatch",
        };
        entry.set_item("error_type", error_type)?;
        entry.set_item("span", record.span)?;
        if let Some(offset) = record.offset {
            entry.set_item("offset", offset)?;
        }
        errors.set_item(idx, entry)?;
    }
    dict.set_item("errors", errors)?;
    Ok(dict)
}

/// Load the lexicon bundle once per process.
#[pyfunction]
fn init_lexicon(path: String) -> PyResult<bool> {
    init_global_lexicon(Path::new(&path)).map_err(to_py_err)?;
    Ok(true)
}

#[pyfunction]
fn check_spelling<'py>(py: Python<'py>, text: String) -> PyResult<Bound<'py, PyDict>> {
    let outcome = crate::checker::check(&text);
    outcome_to_dict(py, &outcome)
}

/// Check many texts in parallel; results keep the input order.
#[pyfunction]
fn check_spelling_batch<'py>(py: Python<'py>, texts: Vec<String>) -> PyResult<Vec<Bound<'py, PyDict>>> {
    let outcomes = match global_checker() {
        Ok(checker) => checker.check_batch(&texts),
        Err(e) => texts.iter().map(|_| CheckOutcome::failure(e.to_string())).collect(),
    };
    outcomes.iter().map(|o| outcome_to_dict(py, o)).collect()
}

#[pyfunction]
fn segment(text: String) -> PyResult<Vec<String>> {
    let checker = global_checker().map_err(to_py_err)?;
    Ok(checker.segment(&text))
}

#[pymodule]
fn khmer_spell(m: &Bound<'_, PyModule>) -> PyResult<()> {
    logging::init();
    m.add_function(wrap_pyfunction!(init_lexicon, m)?)?;
    m.add_function(wrap_pyfunction!(check_spelling, m)?)?;
    m.add_function(wrap_pyfunction!(check_spelling_batch, m)?)?;
    m.add_function(wrap_pyfunction!(segment, m)?)?;
    Ok(())
}
