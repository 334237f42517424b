use image::{DynamicImage, imageops::FilterType};
use ndarray::Array4;

use super::PreprocessorParams;

/// Convert an image into a `[1, 3, height, width]` float array.
///
/// Resizing uses bilinear filtering, matching the `resample=2` default of
/// ViT-style image processors.
#[must_use]
pub fn to_input_array(image: &DynamicImage, params: &PreprocessorParams) -> Array4<f32> {
    let rgb = if params.do_resize() {
        let (width, height) = params.size().dimensions();
        image
            .resize_exact(width, height, FilterType::Triangle)
            .into_rgb8()
    } else {
        image.to_rgb8()
    };

    let (width, height) = rgb.dimensions();
    let rescale = params.rescale();
    let normalization = params.normalization();

    let mut input = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for channel in 0..3 {
            let mut value = f32::from(pixel[channel]);
            if let Some(factor) = rescale {
                value *= factor;
            }
            if let Some((mean, std)) = normalization {
                value = (value - mean[channel]) / std[channel];
            }
            input[[0, channel, y as usize, x as usize]] = value;
        }
    }
    input
}
