//! Model serialization and persistence
//!
//! Trained models are stored as pretty-printed JSON. A saved model keeps
//! exactly what scoring consumes (configuration, kernel parameters, and per
//! class pair the intercept and support set), so a loaded model classifies
//! identically to the one that was saved.

use crate::api::TrainedModel;
use crate::classifier::{BinaryClassifier, ClassPair, MultiClassSVM, PairClassifier, SupportSet};
use crate::core::{Result, SVMError, SvmConfig};
use crate::kernel::Kernel;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a trained multi-class model
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializableModel<K> {
    /// Hyperparameters the model was trained with
    pub config: SvmConfig,
    /// Kernel parameters
    pub kernel: K,
    pub num_classes: usize,
    /// One entry per class pair, in lexicographic pair order
    pub classifiers: Vec<SerializablePair>,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Serializable representation of a single binary classifier
#[derive(Debug, Serialize, Deserialize)]
pub struct SerializableBinaryModel<K> {
    pub config: SvmConfig,
    pub kernel: K,
    pub classifier: SerializablePair,
    pub metadata: ModelMetadata,
}

/// One trained pair: its classes, intercept and support set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializablePair {
    /// Class behind the -1 side
    pub lower: usize,
    /// Class behind the +1 side
    pub upper: usize,
    pub intercept: f64,
    pub support_vectors: Vec<SerializableSupportVector>,
}

/// Support vector with its signed label and dual coefficient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableSupportVector {
    pub features: Vec<f64>,
    /// -1 or +1
    pub label: f64,
    pub alpha: f64,
}

/// Model metadata for tracking and validation
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Kernel name
    pub kernel_name: String,
    /// Feature dimensionality
    pub dim: usize,
    /// Support vectors over all pairs
    pub n_support_vectors: usize,
    /// Creation timestamp
    pub created_at: String,
}

impl ModelMetadata {
    fn new(kernel_name: &str, dim: usize, n_support_vectors: usize) -> Self {
        Self {
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            kernel_name: kernel_name.to_string(),
            dim,
            n_support_vectors,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl SerializablePair {
    fn from_classifier<K: Kernel>(classifier: &BinaryClassifier<K>) -> Result<Self> {
        let (classes, intercept, support) = match (
            classifier.classes(),
            classifier.intercept(),
            classifier.support_set(),
        ) {
            (Some(classes), Some(intercept), Some(support)) => (classes, intercept, support),
            _ => return Err(SVMError::ModelNotTrained),
        };

        let support_vectors = support
            .vectors()
            .iter()
            .zip(support.labels().iter().zip(support.alpha()))
            .map(|(features, (&label, &alpha))| SerializableSupportVector {
                features: features.clone(),
                label,
                alpha,
            })
            .collect();

        Ok(Self {
            lower: classes[0],
            upper: classes[1],
            intercept,
            support_vectors,
        })
    }

    fn to_classifier<K: Kernel>(&self, kernel: K, config: SvmConfig) -> Result<BinaryClassifier<K>> {
        let mut vectors = Vec::with_capacity(self.support_vectors.len());
        let mut labels = Vec::with_capacity(self.support_vectors.len());
        let mut alpha = Vec::with_capacity(self.support_vectors.len());
        for sv in &self.support_vectors {
            vectors.push(sv.features.clone());
            labels.push(sv.label);
            alpha.push(sv.alpha);
        }
        let support = SupportSet::new(vectors, labels, alpha)?;
        BinaryClassifier::from_parts(
            kernel,
            config,
            [self.lower, self.upper],
            self.intercept,
            support,
        )
    }
}

impl<K> SerializableModel<K>
where
    K: Kernel + Clone + Debug + Serialize + DeserializeOwned,
{
    /// Capture a trained multi-class model
    pub fn from_model(model: &MultiClassSVM<K>) -> Result<Self> {
        let dim = model.dim().ok_or(SVMError::ModelNotTrained)?;
        let classifiers = model
            .pairs()
            .iter()
            .map(|p| SerializablePair::from_classifier(&p.classifier))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config: model.config().clone(),
            kernel: model.kernel().clone(),
            num_classes: model.num_classes(),
            classifiers,
            metadata: ModelMetadata::new(model.kernel().name(), dim, model.n_support_vectors()),
        })
    }

    /// Capture the model behind a high-level handle
    pub fn from_trained_model(model: &TrainedModel<K>) -> Result<Self> {
        Self::from_model(model.inner())
    }

    /// Rebuild the multi-class model
    pub fn to_model(&self) -> Result<MultiClassSVM<K>> {
        let pairs = self
            .classifiers
            .iter()
            .map(|entry| {
                Ok(PairClassifier {
                    pair: ClassPair::new(entry.lower, entry.upper)?,
                    classifier: entry.to_classifier(self.kernel.clone(), self.config.clone())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let model =
            MultiClassSVM::from_parts(self.kernel.clone(), self.config.clone(), self.num_classes, pairs)?;
        if model.dim() != Some(self.metadata.dim) {
            return Err(SVMError::DimensionMismatch {
                expected: self.metadata.dim,
                actual: model.dim().unwrap_or(0),
            });
        }
        Ok(model)
    }

    /// Rebuild the model behind a high-level handle
    pub fn to_trained_model(&self) -> Result<TrainedModel<K>> {
        TrainedModel::from_model(self.to_model()?)
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path)
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path)
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== SVM Model Summary ===");
        println!("Kernel: {} {:?}", self.metadata.kernel_name, self.kernel);
        println!("Classes: {}", self.num_classes);
        println!("Pair Classifiers: {}", self.classifiers.len());
        println!("Features: {}", self.metadata.dim);
        println!("Support Vectors: {}", self.metadata.n_support_vectors);
        for entry in &self.classifiers {
            println!(
                "  ({}, {}): {} support vectors, intercept {:.6}",
                entry.lower,
                entry.upper,
                entry.support_vectors.len(),
                entry.intercept
            );
        }
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Training Parameters:");
        println!("  C: {}", self.config.c);
        println!("  Fit Intercept: {}", self.config.fit_intercept);
        println!("  Tolerance: {}", self.config.tolerance);
        println!("  Max Passes: {}", self.config.max_passes);
        println!("  Threshold: {:?}", self.config.threshold);
    }
}

impl<K> SerializableBinaryModel<K>
where
    K: Kernel + Clone + Serialize + DeserializeOwned,
{
    /// Capture a trained binary classifier
    pub fn from_classifier(classifier: &BinaryClassifier<K>) -> Result<Self> {
        let dim = classifier.dim().ok_or(SVMError::ModelNotTrained)?;
        Ok(Self {
            config: classifier.config().clone(),
            kernel: classifier.kernel().clone(),
            classifier: SerializablePair::from_classifier(classifier)?,
            metadata: ModelMetadata::new(
                classifier.kernel().name(),
                dim,
                classifier.n_support_vectors(),
            ),
        })
    }

    /// Rebuild the binary classifier
    pub fn to_classifier(&self) -> Result<BinaryClassifier<K>> {
        let classifier = self
            .classifier
            .to_classifier(self.kernel.clone(), self.config.clone())?;
        if classifier.dim() != Some(self.metadata.dim) {
            return Err(SVMError::DimensionMismatch {
                expected: self.metadata.dim,
                actual: classifier.dim().unwrap_or(0),
            });
        }
        Ok(classifier)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path)
    }
}

fn save_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)
        .map_err(|e| SVMError::SerializationError(e.to_string()))
}

fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| SVMError::SerializationError(e.to_string()))
}
