use anyhow::{ensure, Result};
use image::DynamicImage;
use ndarray::Array4;

/// Prepare an image for the embedding model: convert to RGB, resize to the
/// model's input resolution, scale pixel values to [0, 1] and lay the data
/// out as an NHWC tensor with a leading batch axis.
pub fn preprocess(img: &DynamicImage, size: (u32, u32)) -> Result<Array4<f32>> {
    let (width, height) = size;
    ensure!(
        width > 0 && height > 0,
        "input resolution must be non-zero, got {}x{}",
        width,
        height
    );

    let resized = img.resize_exact(width, height, image::imageops::FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let input_data: Vec<f32> = rgb.as_raw().iter().map(|&p| p as f32 / 255.0).collect();

    let input = Array4::from_shape_vec((1, height as usize, width as usize, 3), input_data)?;
    Ok(input)
}
