mod decode;
mod params;
mod tensor;

pub use decode::{DecodeError, SUPPORTED_EXTENSIONS, decode_image, has_supported_extension};
pub use params::{ImageSize, PreprocessorParams};
pub use tensor::to_input_array;
