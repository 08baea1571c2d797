//! Dataset loading and normalization
//!
//! Reads the raw survey CSV, renames the source columns to their canonical
//! semantic names, label-encodes the three categorical columns and casts
//! everything to `Float64`. The fitted codecs travel with the dataset; they
//! are required to decode predictions at the end of the pipeline.

use crate::data::{
    FeatureSummary, LabelCodec, RunningStats, CATEGORICAL_COLUMNS, COLUMN_MAP, FEATURE_COLUMNS,
    TARGET_COLUMN,
};
use crate::error::{PersonaError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use tracing::info;

/// The three codecs fitted during normalization, one per categorical column
#[derive(Debug, Clone)]
pub struct LabelCodecs {
    pub stage_fear: LabelCodec,
    pub drained_after_socializing: LabelCodec,
    pub personality: LabelCodec,
}

impl LabelCodecs {
    /// Look up the codec for a canonical column name.
    pub fn for_column(&self, name: &str) -> Option<&LabelCodec> {
        match name {
            "stage_fear" => Some(&self.stage_fear),
            "drained_after_socializing" => Some(&self.drained_after_socializing),
            TARGET_COLUMN => Some(&self.personality),
            _ => None,
        }
    }
}

/// Normalized dataset: canonical column names, encoded categoricals,
/// all columns `Float64`. Immutable after construction.
#[derive(Debug, Clone)]
pub struct NormalizedDataset {
    df: DataFrame,
    codecs: LabelCodecs,
}

impl NormalizedDataset {
    /// The normalized DataFrame.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// The codecs fitted during normalization.
    pub fn codecs(&self) -> &LabelCodecs {
        &self.codecs
    }

    pub fn n_rows(&self) -> usize {
        self.df.height()
    }

    /// Canonical feature-column order shared by training and inference.
    pub fn feature_columns(&self) -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }

    /// Extract the feature matrix in canonical column order.
    pub fn features(&self) -> Result<Array2<f64>> {
        columns_to_array2(&self.df, &FEATURE_COLUMNS)
    }

    /// Extract the encoded label vector.
    pub fn labels(&self) -> Result<Array1<f64>> {
        let values = column_to_vec(&self.df, TARGET_COLUMN)?;
        Ok(Array1::from_vec(values))
    }

    /// Descriptive statistics per feature column (one Welford pass each).
    pub fn feature_summaries(&self) -> Result<Vec<FeatureSummary>> {
        FEATURE_COLUMNS
            .iter()
            .map(|col| {
                let mut stats = RunningStats::new();
                for value in column_to_vec(&self.df, col)? {
                    stats.update(value);
                }
                Ok(stats.summarize(col))
            })
            .collect()
    }

    /// Row count per decoded label, in label-code order.
    pub fn label_distribution(&self) -> Result<Vec<(String, usize)>> {
        let codec = &self.codecs.personality;
        let mut counts = vec![0usize; codec.len()];
        for label in column_to_vec(&self.df, TARGET_COLUMN)? {
            let code = label as i64;
            codec.decode(code)?;
            counts[code as usize] += 1;
        }
        Ok(codec
            .classes()
            .iter()
            .zip(counts)
            .map(|(class, count)| (class.clone(), count))
            .collect())
    }
}

/// Loads the raw survey dataset and produces a [`NormalizedDataset`]
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader;

impl DatasetLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load and normalize a CSV file.
    pub fn load_csv(&self, path: &str) -> Result<NormalizedDataset> {
        let file = File::open(path)?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(file);

        let df = reader
            .finish()
            .map_err(|e| PersonaError::DataError(e.to_string()))?;

        self.normalize(&df)
    }

    /// Normalize an in-memory DataFrame with the raw source schema.
    pub fn normalize(&self, df: &DataFrame) -> Result<NormalizedDataset> {
        let mut df = df.clone();

        // Canonical renames; any absent raw column is a schema mismatch
        for (raw, canonical) in COLUMN_MAP {
            df.rename(raw, canonical.into())
                .map_err(|_| PersonaError::SchemaMismatch {
                    missing: raw.to_string(),
                })?;
        }

        let stage_fear = encode_column(&mut df, CATEGORICAL_COLUMNS[0])?;
        let drained_after_socializing = encode_column(&mut df, CATEGORICAL_COLUMNS[1])?;
        let personality = encode_column(&mut df, CATEGORICAL_COLUMNS[2])?;

        let df = cast_columns_to_f64(df)?;

        info!(rows = df.height(), columns = df.width(), "dataset normalized");

        Ok(NormalizedDataset {
            df,
            codecs: LabelCodecs {
                stage_fear,
                drained_after_socializing,
                personality,
            },
        })
    }
}

/// Fit a codec over one string column and replace the column with its codes.
fn encode_column(df: &mut DataFrame, name: &str) -> Result<LabelCodec> {
    let (codec, codes) = {
        let column = df.column(name).map_err(|_| PersonaError::SchemaMismatch {
            missing: name.to_string(),
        })?;
        let ca = column
            .as_materialized_series()
            .str()
            .map_err(|e| PersonaError::DataError(e.to_string()))?;

        let codec = LabelCodec::fit(ca.into_iter().flatten());
        let codes = ca
            .into_iter()
            .map(|v| match v {
                Some(s) => codec.encode(s),
                None => Err(PersonaError::DataError(format!(
                    "null value in column '{name}'"
                ))),
            })
            .collect::<Result<Vec<i64>>>()?;
        (codec, codes)
    };

    df.with_column(Series::new(name.into(), codes))?;
    Ok(codec)
}

/// Cast every numeric column to Float64 for consistent downstream extraction.
fn cast_columns_to_f64(df: DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    for col in df.get_columns() {
        match col.dtype() {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32 => {
                let casted = col
                    .cast(&DataType::Float64)
                    .map_err(|e| PersonaError::DataError(e.to_string()))?;
                result = result
                    .with_column(casted)
                    .map_err(|e| PersonaError::DataError(e.to_string()))?
                    .clone();
            }
            _ => {}
        }
    }
    Ok(result)
}

/// Extract one column as a contiguous f64 Vec.
fn column_to_vec(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df.column(name).map_err(|_| PersonaError::SchemaMismatch {
        missing: name.to_string(),
    })?;
    let series_f64 = series
        .cast(&DataType::Float64)
        .map_err(|e| PersonaError::DataError(e.to_string()))?;
    Ok(series_f64
        .f64()
        .map_err(|e| PersonaError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect())
}

/// Extract named columns into a row-major `Array2<f64>`.
fn columns_to_array2(df: &DataFrame, col_names: &[&str]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|name| column_to_vec(df, name))
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}
