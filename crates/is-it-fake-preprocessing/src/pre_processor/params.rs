/// Target spatial size of the model input.
///
/// Mirrors the `size` field of a Hugging Face `preprocessor_config.json`, which
/// is written either as a bare integer or as an object.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSize {
    Square(u32),
    Dimensions { height: u32, width: u32 },
    /// Resized to a square of this edge; the classifiers we target are square-input.
    ShortestEdge { shortest_edge: u32 },
}

impl ImageSize {
    /// (width, height) in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match *self {
            Self::Square(edge) | Self::ShortestEdge { shortest_edge: edge } => (edge, edge),
            Self::Dimensions { height, width } => (width, height),
        }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::Dimensions {
            height: 224,
            width: 224,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct PreprocessorParams {
    do_resize: bool,
    size: ImageSize,
    do_rescale: bool,
    /// Multiplier applied to raw 0-255 channel values, usually 1/255.
    rescale_factor: f32,
    do_normalize: bool,
    /// Per-channel (R, G, B) mean subtracted after rescaling.
    image_mean: [f32; 3],
    /// Per-channel (R, G, B) standard deviation divided out after the mean.
    image_std: [f32; 3],
}

impl PreprocessorParams {
    pub fn new(size: ImageSize, image_mean: [f32; 3], image_std: [f32; 3]) -> Self {
        let (width, height) = size.dimensions();
        assert!(width > 0 && height > 0, "size must be non-zero");
        assert!(
            image_std.iter().all(|std| *std != 0.0),
            "image_std must not contain zeros"
        );
        Self {
            size,
            image_mean,
            image_std,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn without_resize(mut self) -> Self {
        self.do_resize = false;
        self
    }

    #[must_use]
    pub fn do_resize(&self) -> bool {
        self.do_resize
    }

    #[must_use]
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Rescale factor, or `None` when rescaling is disabled.
    #[must_use]
    pub fn rescale(&self) -> Option<f32> {
        self.do_rescale.then_some(self.rescale_factor)
    }

    /// Mean and std, or `None` when normalization is disabled.
    #[must_use]
    pub fn normalization(&self) -> Option<([f32; 3], [f32; 3])> {
        self.do_normalize.then_some((self.image_mean, self.image_std))
    }
}

impl Default for PreprocessorParams {
    fn default() -> Self {
        Self {
            do_resize: true,
            size: ImageSize::default(),
            do_rescale: true,
            rescale_factor: 1.0 / 255.0,
            do_normalize: true,
            image_mean: [0.5; 3],
            image_std: [0.5; 3],
        }
    }
}
