//! Categorical label encoding
//!
//! A [`LabelCodec`] is a bijection between the string categories observed in
//! one column and the integer codes `0..k`. Codes are assigned in
//! lexicographic category order, so the mapping is deterministic for any
//! input ordering: for the personality column `Extrovert` = 0 and
//! `Introvert` = 1, for the Yes/No flags `No` = 0 and `Yes` = 1.
//!
//! The codec fitted during normalization is the same codec used to decode
//! predictions later; it is never refitted within a session.

use crate::error::{PersonaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bidirectional category <-> code mapping for one categorical column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelCodec {
    /// Categories in code order: `classes[code]` is the decoded value
    classes: Vec<String>,
    /// Reverse lookup: category -> code
    codes: HashMap<String, i64>,
}

impl LabelCodec {
    /// Fit a codec from the observed values of a column.
    ///
    /// Duplicates are collapsed; codes follow sorted category order.
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        classes.sort();
        classes.dedup();

        let codes = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code as i64))
            .collect();

        Self { classes, codes }
    }

    /// Encode a category to its integer code.
    pub fn encode(&self, value: &str) -> Result<i64> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| PersonaError::UnknownCategory(value.to_string()))
    }

    /// Decode an integer code back to its category.
    pub fn decode(&self, code: i64) -> Result<&str> {
        if code < 0 || code as usize >= self.classes.len() {
            return Err(PersonaError::InvalidCode {
                code,
                n_classes: self.classes.len(),
            });
        }
        Ok(&self.classes[code as usize])
    }

    /// Categories in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of fitted categories.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
