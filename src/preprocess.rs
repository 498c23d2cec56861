//! Image preprocessing into model input tensors.
//!
//! Every image is decoded to RGB, resized to the model's fixed input size and
//! cast to the element type the engine declares. The tensor is laid out as
//! HWC (`[H, W, 3]`), with a leading batch axis of 1 when the engine expects
//! batched input.

use std::path::Path;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Element type of the model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorDtype {
    /// Raw 8-bit channel values.
    #[default]
    U8,
    /// Channel values as `f32` in `0.0..=255.0`.
    F32,
    /// Channel values as `f32` scaled to `0.0..=1.0`.
    F32Normalized,
}

/// Tensor element storage.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    /// 8-bit elements.
    U8(Vec<u8>),
    /// 32-bit float elements.
    F32(Vec<f32>),
}

impl TensorData {
    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    /// True when there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A preprocessed image ready for inference.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    /// Dimensions, outermost first.
    pub shape: Vec<usize>,
    /// Row-major element data.
    pub data: TensorData,
}

impl Tensor {
    /// Element type of this tensor.
    #[must_use]
    pub fn dtype(&self) -> TensorDtype {
        match self.data {
            TensorData::U8(_) => TensorDtype::U8,
            TensorData::F32(_) => TensorDtype::F32,
        }
    }

    /// Number of elements implied by the shape.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Input contract of the model: spatial size, element type and batching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Input width in pixels.
    pub width: u32,
    /// Input height in pixels.
    pub height: u32,
    /// Element type.
    #[serde(default)]
    pub dtype: TensorDtype,
    /// Prepend a batch axis of size 1.
    #[serde(default = "default_batched")]
    pub batched: bool,
}

fn default_batched() -> bool {
    true
}

impl Default for InputSpec {
    fn default() -> Self {
        Self {
            width: 224,
            height: 224,
            dtype: TensorDtype::U8,
            batched: true,
        }
    }
}

impl InputSpec {
    /// Shape of tensors produced for this spec.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        let hwc = [self.height as usize, self.width as usize, 3];
        if self.batched {
            std::iter::once(1).chain(hwc).collect()
        } else {
            hwc.to_vec()
        }
    }
}

/// Turns image files into tensors matching an [`InputSpec`].
#[derive(Debug, Clone)]
pub struct Preprocessor {
    spec: InputSpec,
    filter: FilterType,
}

impl Preprocessor {
    /// Create a preprocessor for the given input contract.
    ///
    /// Fails if either spatial dimension is zero.
    pub fn new(spec: InputSpec) -> Result<Self> {
        if spec.width == 0 || spec.height == 0 {
            return Err(Error::Config(format!(
                "input size must be non-zero, got {}x{}",
                spec.width, spec.height
            )));
        }
        Ok(Self { spec, filter: FilterType::Triangle })
    }

    /// Use a different resampling filter.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// The input contract.
    #[must_use]
    pub fn spec(&self) -> &InputSpec {
        &self.spec
    }

    /// Load, decode and convert one image file.
    ///
    /// The format is detected from the file contents, not its extension.
    pub fn load(&self, path: &Path) -> Result<Tensor> {
        let decode_error = |reason: String| Error::Decode { path: path.to_path_buf(), reason };
        let img = image::ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| decode_error(e.to_string()))?
            .decode()
            .map_err(|e| decode_error(e.to_string()))?;
        Ok(self.convert(&img))
    }

    /// Convert an already decoded image.
    #[must_use]
    pub fn convert(&self, img: &image::DynamicImage) -> Tensor {
        let rgb = img.to_rgb8();
        let rgb = if rgb.dimensions() == (self.spec.width, self.spec.height) {
            rgb
        } else {
            image::imageops::resize(&rgb, self.spec.width, self.spec.height, self.filter)
        };

        let raw = rgb.into_raw();
        let data = match self.spec.dtype {
            TensorDtype::U8 => TensorData::U8(raw),
            TensorDtype::F32 => TensorData::F32(raw.into_iter().map(f32::from).collect()),
            TensorDtype::F32Normalized => {
                TensorData::F32(raw.into_iter().map(|v| f32::from(v) / 255.0).collect())
            }
        };

        Tensor { shape: self.spec.shape(), data }
    }
}
