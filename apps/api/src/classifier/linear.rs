use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::{ClassifierError, RoleClassifier};

/// Bag-of-words linear model: each label scores `bias + sum(weights[token])`.
///
/// On disk it is a JSON object:
///
/// ```json
/// {
///   "labels": ["Data Scientist", "Web Developer"],
///   "bias": [0.0, 0.1],
///   "weights": { "python": [1.4, 0.2], "react": [0.0, 1.7] }
/// }
/// ```
///
/// Tokens are matched lower-cased. `bias` may be omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearRoleModel {
    labels: Vec<String>,
    #[serde(default)]
    bias: Vec<f64>,
    weights: HashMap<String, Vec<f64>>,
}

impl LinearRoleModel {
    pub fn from_path(path: &Path) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ClassifierError::Load {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ClassifierError> {
        let mut model: LinearRoleModel = serde_json::from_str(raw)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&mut self) -> Result<(), ClassifierError> {
        let width = self.labels.len();
        if width == 0 {
            return Err(ClassifierError::Invalid("model has no labels".into()));
        }
        if self.bias.is_empty() {
            self.bias = vec![0.0; width];
        } else if self.bias.len() != width {
            return Err(ClassifierError::Invalid(format!(
                "bias has {} entries, expected {width}",
                self.bias.len()
            )));
        }
        if let Some((token, row)) = self.weights.iter().find(|(_, row)| row.len() != width) {
            return Err(ClassifierError::Invalid(format!(
                "weights for '{token}' have {} entries, expected {width}",
                row.len()
            )));
        }
        // Lookups are lower-case.
        self.weights = std::mem::take(&mut self.weights)
            .into_iter()
            .map(|(token, row)| (token.to_lowercase(), row))
            .collect();
        Ok(())
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl RoleClassifier for LinearRoleModel {
    fn predict(&self, text: &str) -> Result<String, ClassifierError> {
        let mut scores = self.bias.clone();
        for token in text.split_whitespace() {
            if let Some(row) = self.weights.get(&token.to_lowercase()) {
                for (score, weight) in scores.iter_mut().zip(row) {
                    *score += weight;
                }
            }
        }

        // Ties go to the earliest label.
        let mut best = 0;
        for (i, score) in scores.iter().enumerate() {
            if score.is_nan() {
                return Err(ClassifierError::Prediction(format!(
                    "score for '{}' is not a number",
                    self.labels[i]
                )));
            }
            if *score > scores[best] {
                best = i;
            }
        }

        Ok(self.labels[best].clone())
    }
}
