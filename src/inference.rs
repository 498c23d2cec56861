//! Boundary to the external inference engine.
//!
//! The evaluation pipeline never loads models or talks to devices. It hands
//! a named input tensor to an [`InferenceEngine`] and reads back raw scores
//! for a named output. Closures with the right signature are engines too,
//! which keeps stubs in tests short:
//!
//! ```rust,ignore
//! let engine = |_req: InferenceRequest<'_>| -> Result<EngineOutputs> {
//!     Ok(EngineOutputs::single("logits", RawScores::flat(vec![2.0, 0.0])))
//! };
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::preprocess::Tensor;

/// One call into the engine.
#[derive(Debug, Clone, Copy)]
pub struct InferenceRequest<'a> {
    /// Name of the input stream the tensor is bound to.
    pub input_name: &'a str,
    /// Preprocessed input.
    pub tensor: &'a Tensor,
    /// File the tensor was produced from.
    pub source: &'a Path,
}

/// Raw per-class scores as produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScores {
    /// Dimensions reported by the engine, e.g. `[1, 7]`.
    pub shape: Vec<usize>,
    /// Row-major values.
    pub values: Vec<f32>,
}

impl RawScores {
    /// One-dimensional scores.
    #[must_use]
    pub fn flat(values: Vec<f32>) -> Self {
        Self { shape: vec![values.len()], values }
    }

    /// Scores with an explicit shape.
    #[must_use]
    pub fn with_shape(shape: Vec<usize>, values: Vec<f32>) -> Self {
        Self { shape, values }
    }
}

/// Named outputs of one engine call.
#[derive(Debug, Clone, Default)]
pub struct EngineOutputs(HashMap<String, RawScores>);

impl EngineOutputs {
    /// Outputs holding a single named entry.
    #[must_use]
    pub fn single(name: impl Into<String>, scores: RawScores) -> Self {
        let mut outputs = Self::default();
        outputs.insert(name, scores);
        outputs
    }

    /// Add or replace a named output.
    pub fn insert(&mut self, name: impl Into<String>, scores: RawScores) {
        self.0.insert(name.into(), scores);
    }

    /// Take a named output.
    pub fn take(&mut self, name: &str) -> Option<RawScores> {
        self.0.remove(name)
    }

    /// Output names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// An inference engine: tensor in, named raw scores out.
///
/// Implementations report their own failures as [`Error::Inference`]; any
/// error they return is treated as a per-sample failure.
pub trait InferenceEngine {
    /// Run the model on one input.
    fn infer(&mut self, request: InferenceRequest<'_>) -> Result<EngineOutputs>;
}

impl<F> InferenceEngine for F
where
    F: FnMut(InferenceRequest<'_>) -> Result<EngineOutputs>,
{
    fn infer(&mut self, request: InferenceRequest<'_>) -> Result<EngineOutputs> {
        self(request)
    }
}

/// Binds an engine to the input and output names of one model.
pub struct InferenceAdapter<E> {
    engine: E,
    input_name: String,
    output_name: String,
}

impl<E: InferenceEngine> InferenceAdapter<E> {
    /// Create an adapter.
    pub fn new(engine: E, input_name: impl Into<String>, output_name: impl Into<String>) -> Self {
        Self {
            engine,
            input_name: input_name.into(),
            output_name: output_name.into(),
        }
    }

    /// Input stream name.
    #[must_use]
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Output stream name.
    #[must_use]
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Run the engine and extract the configured output.
    ///
    /// Every failure comes back as [`Error::Inference`].
    pub fn run(&mut self, tensor: &Tensor, source: &Path) -> Result<RawScores> {
        let request = InferenceRequest {
            input_name: &self.input_name,
            tensor,
            source,
        };

        let mut outputs = self.engine.infer(request).map_err(|e| match e {
            Error::Inference { .. } => e,
            other => Error::Inference { message: other.to_string() },
        })?;

        outputs.take(&self.output_name).ok_or_else(|| Error::Inference {
            message: format!(
                "engine returned no output named '{}' (got {:?})",
                self.output_name,
                outputs.names()
            ),
        })
    }
}
