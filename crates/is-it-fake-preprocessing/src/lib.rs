//! Pre-processing for is-it-fake
//!
//! Decodes uploaded or captured image bytes into RGB images and turns those
//! images into the normalized `NCHW` tensors an image-classification model expects.

pub mod pre_processor;

pub use pre_processor::{
    DecodeError, ImageSize, PreprocessorParams, SUPPORTED_EXTENSIONS, decode_image,
    has_supported_extension, to_input_array,
};
