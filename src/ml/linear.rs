use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::ml::sparse::SparseVector;
use crate::ml::RankingModel;

/// Errors loading a linear model file. Fatal at startup.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("I/O error reading model: {0}")]
    Io(#[from] std::io::Error),

    #[error("model header is missing the {0} field")]
    MissingField(&'static str),

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("weight matrix is truncated: expected {expected} rows, got {got}")]
    Truncated { expected: usize, got: usize },
}

/// A linear multiclass model in the liblinear text format.
///
/// The header declares the solver, the class labels, and the feature count;
/// the `w` section holds one row of per-class weights per feature. Loaded
/// once and immutable afterwards; sharing across workers needs no
/// synchronization.
#[derive(Debug, Clone)]
pub struct LinearModel {
    solver_type: String,
    labels: Vec<usize>,
    nr_feature: usize,
    bias: f64,
    // Row-major: weights[feature * n_cols + class_column].
    weights: Vec<f64>,
    n_cols: usize,
}

impl LinearModel {
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self, ModelError> {
        let mut solver_type = None;
        let mut nr_class = None;
        let mut labels: Option<Vec<usize>> = None;
        let mut nr_feature = None;
        let mut bias = None;

        let mut lines = reader.lines().enumerate();

        for (offset, line) in &mut lines {
            let line_number = offset + 1;
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "w" {
                break;
            }

            let (key, value) = line.split_once(' ').ok_or_else(|| ModelError::Malformed {
                line: line_number,
                message: format!("expected a key/value header line, got: {}", line),
            })?;

            match key {
                "solver_type" => solver_type = Some(value.to_string()),
                "nr_class" => nr_class = Some(parse_field(value, line_number)?),
                "nr_feature" => nr_feature = Some(parse_field(value, line_number)?),
                "bias" => bias = Some(parse_field(value, line_number)?),
                "label" => {
                    labels = Some(
                        value
                            .split_whitespace()
                            .map(|label| parse_field(label, line_number))
                            .collect::<Result<_, _>>()?,
                    )
                }
                _ => {
                    return Err(ModelError::Malformed {
                        line: line_number,
                        message: format!("unknown header field: {}", key),
                    })
                }
            }
        }

        let solver_type = solver_type.ok_or(ModelError::MissingField("solver_type"))?;
        let nr_class: usize = nr_class.ok_or(ModelError::MissingField("nr_class"))?;
        let labels = labels.ok_or(ModelError::MissingField("label"))?;
        let nr_feature: usize = nr_feature.ok_or(ModelError::MissingField("nr_feature"))?;
        let bias: f64 = bias.ok_or(ModelError::MissingField("bias"))?;

        if labels.len() != nr_class {
            return Err(ModelError::Malformed {
                line: 0,
                message: format!(
                    "label count {} does not match nr_class {}",
                    labels.len(),
                    nr_class
                ),
            });
        }

        // liblinear collapses binary models to a single weight column.
        let n_cols = if nr_class == 2 && solver_type != "MCSVM_CS" {
            1
        } else {
            nr_class
        };

        // With a non-negative bias, liblinear appends one bias row.
        let expected_rows = if bias >= 0.0 {
            nr_feature + 1
        } else {
            nr_feature
        };

        let mut weights = Vec::with_capacity(expected_rows * n_cols);
        let mut rows = 0;
        for (offset, line) in &mut lines {
            let line_number = offset + 1;
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let row: Vec<f64> = line
                .split_whitespace()
                .map(|weight| parse_field(weight, line_number))
                .collect::<Result<_, _>>()?;
            if row.len() != n_cols {
                return Err(ModelError::Malformed {
                    line: line_number,
                    message: format!("expected {} weights per row, got {}", n_cols, row.len()),
                });
            }

            weights.extend(row);
            rows += 1;
        }

        if rows != expected_rows {
            return Err(ModelError::Truncated {
                expected: expected_rows,
                got: rows,
            });
        }

        Ok(LinearModel {
            solver_type,
            labels,
            nr_feature,
            bias,
            weights,
            n_cols,
        })
    }

    pub fn solver_type(&self) -> &str {
        &self.solver_type
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn nr_feature(&self) -> usize {
        self.nr_feature
    }

    /// Decision values per class, in label order.
    pub fn decision_values(&self, vector: &SparseVector) -> Vec<f64> {
        let mut columns = vec![0.0; self.n_cols];

        for &(index, value) in vector.entries() {
            let feature = index as usize;
            if feature >= self.nr_feature {
                continue;
            }
            let row = &self.weights[feature * self.n_cols..(feature + 1) * self.n_cols];
            for (column, weight) in columns.iter_mut().zip(row) {
                *column += weight * value;
            }
        }

        if self.bias >= 0.0 {
            let row = &self.weights[self.nr_feature * self.n_cols..];
            for (column, weight) in columns.iter_mut().zip(row) {
                *column += weight * self.bias;
            }
        }

        if self.n_cols == 1 {
            // Binary model: the single decision value is for labels[0].
            vec![columns[0], -columns[0]]
        } else {
            columns
        }
    }
}

impl RankingModel for LinearModel {
    fn predict_sorted(&self, vector: &SparseVector) -> Vec<usize> {
        let decisions = self.decision_values(vector);

        let mut ranked: Vec<(usize, f64)> = self
            .labels
            .iter()
            .copied()
            .zip(decisions)
            .collect();
        // Score-descending; ties break towards the lowest label ID, the
        // numberer's total order.
        ranked.sort_by(|(label_a, score_a), (label_b, score_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| label_a.cmp(label_b))
        });

        ranked.into_iter().map(|(label, _)| label).collect()
    }
}

fn parse_field<T: std::str::FromStr>(value: &str, line: usize) -> Result<T, ModelError> {
    value.parse().map_err(|_| ModelError::Malformed {
        line,
        message: format!("cannot parse value: {}", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_CLASS: &str = "solver_type L2R_L2LOSS_SVC\n\
                               nr_class 3\n\
                               label 0 1 2\n\
                               nr_feature 2\n\
                               bias -1\n\
                               w\n\
                               0.5 0.1 0.2\n\
                               0.0 0.4 0.3\n";

    fn vector(entries: &[(u32, f64)]) -> SparseVector {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_header_round_trip() {
        let model = LinearModel::from_reader(THREE_CLASS.as_bytes()).unwrap();
        assert_eq!(model.solver_type(), "L2R_L2LOSS_SVC");
        assert_eq!(model.labels(), &[0, 1, 2]);
        assert_eq!(model.nr_feature(), 2);
    }

    #[test]
    fn test_predict_sorted_ranks_by_score() {
        let model = LinearModel::from_reader(THREE_CLASS.as_bytes()).unwrap();

        // Feature 0 favors label 0.
        assert_eq!(model.predict_sorted(&vector(&[(0, 1.0)])), vec![0, 2, 1]);
        // Feature 1 favors label 1 over 2 over 0.
        assert_eq!(model.predict_sorted(&vector(&[(1, 1.0)])), vec![1, 2, 0]);
    }

    #[test]
    fn test_duplicate_buckets_accumulate() {
        let model = LinearModel::from_reader(THREE_CLASS.as_bytes()).unwrap();

        // Two writes to bucket 1 double its contribution, lifting label 1
        // past the single write to bucket 0.
        let scores = model.decision_values(&vector(&[(0, 1.0), (1, 1.0), (1, 1.0)]));
        assert!((scores[0] - 0.5).abs() < 1e-12);
        assert!((scores[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_ties_break_towards_lowest_id() {
        let uniform = "solver_type L2R_L2LOSS_SVC\n\
                       nr_class 3\n\
                       label 2 0 1\n\
                       nr_feature 1\n\
                       bias -1\n\
                       w\n\
                       0.0 0.0 0.0\n";
        let model = LinearModel::from_reader(uniform.as_bytes()).unwrap();

        assert_eq!(model.predict_sorted(&vector(&[(0, 1.0)])), vec![0, 1, 2]);
    }

    #[test]
    fn test_binary_model_uses_decision_sign() {
        let binary = "solver_type L2R_L2LOSS_SVC\n\
                      nr_class 2\n\
                      label 0 1\n\
                      nr_feature 1\n\
                      bias -1\n\
                      w\n\
                      0.7\n";
        let model = LinearModel::from_reader(binary.as_bytes()).unwrap();

        assert_eq!(model.predict_sorted(&vector(&[(0, 1.0)])), vec![0, 1]);
        assert_eq!(model.predict_sorted(&vector(&[(0, -1.0)])), vec![1, 0]);
    }

    #[test]
    fn test_bias_row() {
        let biased = "solver_type L2R_L2LOSS_SVC\n\
                      nr_class 3\n\
                      label 0 1 2\n\
                      nr_feature 1\n\
                      bias 1\n\
                      w\n\
                      0.0 0.0 0.0\n\
                      0.0 1.0 0.0\n";
        let model = LinearModel::from_reader(biased.as_bytes()).unwrap();

        // The bias row alone puts label 1 on top even for an empty vector.
        assert_eq!(model.predict_sorted(&SparseVector::new()), vec![1, 0, 2]);
    }

    #[test]
    fn test_malformed_models_are_rejected() {
        assert!(matches!(
            LinearModel::from_reader("solver_type X\nw\n".as_bytes()),
            Err(ModelError::MissingField("nr_class"))
        ));

        let truncated = "solver_type X\nnr_class 3\nlabel 0 1 2\nnr_feature 2\nbias -1\nw\n0 0 0\n";
        assert!(matches!(
            LinearModel::from_reader(truncated.as_bytes()),
            Err(ModelError::Truncated {
                expected: 2,
                got: 1
            })
        ));

        let ragged = "solver_type X\nnr_class 3\nlabel 0 1 2\nnr_feature 1\nbias -1\nw\n0 0\n";
        assert!(matches!(
            LinearModel::from_reader(ragged.as_bytes()),
            Err(ModelError::Malformed { .. })
        ));
    }
}
