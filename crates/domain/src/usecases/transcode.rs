//! Image transcoding - fit an image within dimension and byte budgets

use crate::model::{DecodedImage, ImageAsset};
use crate::policy::ImageLimits;
use crate::ports::{CodecError, ImageCodec};

/// Transcoder running the quality search over an [`ImageCodec`]
pub struct ImageTranscoder<C: ImageCodec> {
    codec: C,
    limits: ImageLimits,
}

impl<C: ImageCodec> ImageTranscoder<C> {
    pub fn new(codec: C, limits: ImageLimits) -> Self {
        Self { codec, limits }
    }

    /// Decode, downscale if needed, and compress under the byte budget
    ///
    /// Quality starts high and drops by a fixed step until the output fits or
    /// the floor is reached. At the floor the result is kept even if it still
    /// exceeds the budget.
    pub fn prepare(&self, bytes: &[u8]) -> Result<ImageAsset, CodecError> {
        let decoded = self.codec.decode(bytes)?;
        let (image, resized) = self.bound_dimensions(decoded);

        let limits = &self.limits;
        let step = limits.quality_step.max(1);
        let mut quality = limits.start_quality;

        let encoded = loop {
            let encoded = self.codec.encode_jpeg(&image, quality)?;
            tracing::debug!(quality, bytes = encoded.len(), "Encoded image");

            if encoded.len() <= limits.byte_budget || quality <= limits.quality_floor {
                break encoded;
            }
            quality = quality.saturating_sub(step).max(limits.quality_floor);
        };

        if encoded.len() > limits.byte_budget {
            tracing::warn!(
                quality,
                bytes = encoded.len(),
                budget = limits.byte_budget,
                "Image still over budget at quality floor"
            );
        }

        Ok(ImageAsset {
            source_len: bytes.len(),
            width: image.width,
            height: image.height,
            encoded,
            quality,
            resized,
        })
    }

    fn bound_dimensions(&self, image: DecodedImage) -> (DecodedImage, bool) {
        let max = self.limits.max_dimension;
        if image.width <= max && image.height <= max {
            return (image, false);
        }

        let (width, height) = scaled_dimensions(image.width, image.height, max);
        tracing::debug!(
            from_width = image.width,
            from_height = image.height,
            width,
            height,
            "Downscaling image"
        );
        (self.codec.resize(&image, width, height), true)
    }
}

/// Dimensions scaled by `min(max / width, max / height)`, preserving aspect ratio
pub fn scaled_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    let ratio = f64::min(
        f64::from(max) / f64::from(width),
        f64::from(max) / f64::from(height),
    );
    let scaled_width = (f64::from(width) * ratio) as u32;
    let scaled_height = (f64::from(height) * ratio) as u32;
    (scaled_width.max(1), scaled_height.max(1))
}
