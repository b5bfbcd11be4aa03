// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PyO3 bindings for the redaction engine (regex detection only)

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::redaction::{
    CustomPattern, PIICategory, RedactionError, RedactionOptions, RedactionResult,
    RedactionService, RedactorConfig,
};

fn to_py_err(err: RedactionError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Extract configuration from a Python dict; missing keys keep their defaults
pub fn config_from_py_dict(dict: &Bound<'_, PyDict>) -> PyResult<RedactorConfig> {
    let mut config = RedactorConfig::default();

    macro_rules! extract_field {
        ($field:ident) => {
            if let Some(value) = dict.get_item(stringify!($field))? {
                config.$field = value.extract()?;
            }
        };
    }

    extract_field!(detect_email);
    extract_field!(detect_phone_number);
    extract_field!(detect_ssn);
    extract_field!(detect_credit_card);
    extract_field!(detect_ip_address);
    extract_field!(token_width);
    extract_field!(cloud_timeout_ms);
    extract_field!(batch_concurrency);

    if let Some(value) = dict.get_item("custom_patterns")? {
        let items: Vec<Bound<'_, PyDict>> = value.extract()?;
        for item in items {
            let pattern: String = item
                .get_item("pattern")?
                .ok_or_else(|| PyValueError::new_err("Missing 'pattern' field"))?
                .extract()?;
            let description: String = match item.get_item("description")? {
                Some(val) => val.extract()?,
                None => String::new(),
            };
            let category = match item.get_item("category")? {
                Some(val) => val
                    .extract::<String>()?
                    .parse::<PIICategory>()
                    .map_err(to_py_err)?,
                None => PIICategory::Custom,
            };
            let confidence: f64 = match item.get_item("confidence")? {
                Some(val) => val.extract()?,
                None => 0.8,
            };
            let enabled: bool = match item.get_item("enabled")? {
                Some(val) => val.extract()?,
                None => true,
            };

            config.custom_patterns.push(CustomPattern {
                category,
                pattern,
                description,
                confidence,
                enabled,
            });
        }
    }

    config.validate().map_err(to_py_err)?;
    Ok(config)
}

/// Extract per-call options from a Python dict
pub fn options_from_py_dict(dict: &Bound<'_, PyDict>) -> PyResult<RedactionOptions> {
    let mut options = RedactionOptions::default();

    if let Some(value) = dict.get_item("masking_character")? {
        let masking: String = value.extract()?;
        let mut chars = masking.chars();
        options.masking_character = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(PyValueError::new_err(format!(
                    "masking_character must be a single character, got {:?}",
                    masking
                )))
            }
        };
    }

    if let Some(value) = dict.get_item("confidence_threshold")? {
        options.confidence_threshold = value.extract()?;
    }

    if let Some(value) = dict.get_item("categories")? {
        let names: Vec<String> = value.extract()?;
        options = options.with_category_names(names).map_err(to_py_err)?;
    }

    options.validate().map_err(to_py_err)?;
    Ok(options)
}

fn result_to_py<'py>(py: Python<'py>, result: &RedactionResult) -> PyResult<Bound<'py, PyDict>> {
    let py_dict = PyDict::new(py);
    let py_entities = PyList::empty(py);

    for entity in &result.entities {
        let item_dict = PyDict::new(py);
        item_dict.set_item("category", entity.category.as_str())?;
        item_dict.set_item("subcategory", entity.subcategory.as_deref())?;
        item_dict.set_item("text", entity.text.as_str())?;
        item_dict.set_item("start", entity.start)?;
        item_dict.set_item("length", entity.length)?;
        item_dict.set_item("confidence_score", entity.confidence_score)?;
        py_entities.append(item_dict)?;
    }

    py_dict.set_item("redacted_text", result.redacted_text.as_str())?;
    py_dict.set_item("entities", py_entities)?;
    py_dict.set_item("original_length", result.original_length)?;
    py_dict.set_item("redacted_length", result.redacted_length)?;
    Ok(py_dict)
}

/// PII redactor exposed to Python
///
/// # Example (Python)
/// ```python
/// from pii_redaction import PIIRedactorRust
///
/// redactor = PIIRedactorRust({"detect_ip_address": False})
/// result = redactor.redact("SSN: 123-45-6789", {"masking_character": "X"})
/// print(result["redacted_text"])  # "SSN: XXX"
/// ```
#[pyclass]
pub struct PIIRedactorRust {
    service: RedactionService,
    runtime: tokio::runtime::Runtime,
}

#[pymethods]
impl PIIRedactorRust {
    #[new]
    #[pyo3(signature = (config_dict=None))]
    pub fn new(config_dict: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let config = match config_dict {
            Some(dict) => config_from_py_dict(dict)?,
            None => RedactorConfig::default(),
        };
        let service = RedactionService::new(config).map_err(to_py_err)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PyRuntimeError::new_err(format!("Failed to start runtime: {}", e)))?;

        Ok(Self { service, runtime })
    }

    /// Redact PII in one text
    #[pyo3(signature = (text, options=None))]
    pub fn redact<'py>(
        &self,
        py: Python<'py>,
        text: &str,
        options: Option<&Bound<'py, PyDict>>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let options = match options {
            Some(dict) => options_from_py_dict(dict)?,
            None => RedactionOptions::default(),
        };
        let result = self
            .runtime
            .block_on(self.service.redact_pii(text, Some(&options)))
            .map_err(to_py_err)?;
        result_to_py(py, &result)
    }

    /// Redact a list of texts; one result dict per input, same order
    pub fn batch_redact<'py>(
        &self,
        py: Python<'py>,
        texts: Vec<String>,
    ) -> PyResult<Bound<'py, PyList>> {
        let results = self.runtime.block_on(self.service.batch_redact_pii(texts.as_slice()));
        let py_list = PyList::empty(py);
        for result in &results {
            py_list.append(result_to_py(py, result)?)?;
        }
        Ok(py_list)
    }
}

/// Python module: pii_redaction
#[pymodule]
fn pii_redaction(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PIIRedactorRust>()?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("__doc__", "PII detection and redaction for knowledge-base ingestion")?;

    Ok(())
}
