//! Image codec: `image` for decoding and resampling, `jpeg-encoder` for output

use autotweet_domain::{CodecError, DecodedImage, ImageCodec};
use image::RgbImage;
use image::imageops::{self, FilterType};
use jpeg_encoder::{ColorType, Encoder};

/// Decodes common formats, resamples with Lanczos3, encodes progressive JPEG
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRsCodec;

impl ImageCodec for ImageRsCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, CodecError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
        let rgb = decoded.to_rgb8();
        Ok(DecodedImage {
            width: rgb.width(),
            height: rgb.height(),
            pixels: rgb.into_raw(),
        })
    }

    fn resize(&self, image: &DecodedImage, width: u32, height: u32) -> DecodedImage {
        let Some(buffer) = RgbImage::from_raw(image.width, image.height, image.pixels.clone())
        else {
            tracing::warn!(
                width = image.width,
                height = image.height,
                "Pixel buffer does not match dimensions, skipping resize"
            );
            return image.clone();
        };

        let resized = imageops::resize(&buffer, width, height, FilterType::Lanczos3);
        DecodedImage {
            width: resized.width(),
            height: resized.height(),
            pixels: resized.into_raw(),
        }
    }

    fn encode_jpeg(&self, image: &DecodedImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        let (Ok(width), Ok(height)) = (u16::try_from(image.width), u16::try_from(image.height))
        else {
            return Err(CodecError::Encode(format!(
                "{}x{} exceeds the JPEG dimension limit",
                image.width, image.height
            )));
        };

        let mut out = Vec::new();
        let mut encoder = Encoder::new(&mut out, quality);
        encoder.set_progressive(true);
        encoder
            .encode(&image.pixels, width, height, ColorType::Rgb)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autotweet_domain::ImageLimits;
    use autotweet_domain::usecases::ImageTranscoder;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, if x % 2 == 0 { 255 } else { 64 }])
        });
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_decode_drops_alpha() {
        let decoded = ImageRsCodec.decode(&png_bytes(4, 3)).unwrap();

        assert_eq!((decoded.width, decoded.height), (4, 3));
        assert_eq!(decoded.pixels.len(), 4 * 3 * 3);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = ImageRsCodec.decode(b"definitely not an image");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_encode_produces_jpeg() {
        let decoded = ImageRsCodec.decode(&png_bytes(16, 16)).unwrap();
        let jpeg = ImageRsCodec.encode_jpeg(&decoded, 80).unwrap();

        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let roundtrip = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((roundtrip.width(), roundtrip.height()), (16, 16));
    }

    #[test]
    fn test_encode_is_progressive() {
        let decoded = ImageRsCodec.decode(&png_bytes(16, 16)).unwrap();
        let jpeg = ImageRsCodec.encode_jpeg(&decoded, 95).unwrap();

        let has_marker = |marker: u8| jpeg.windows(2).any(|w| w == [0xFF, marker]);
        assert!(has_marker(0xC2), "missing SOF2 marker");
        assert!(!has_marker(0xC0), "unexpected baseline SOF0 marker");
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let image = DecodedImage {
            width: 70_000,
            height: 1,
            pixels: vec![0; 70_000 * 3],
        };

        let result = ImageRsCodec.encode_jpeg(&image, 90);

        assert!(matches!(result, Err(CodecError::Encode(_))));
    }

    #[test]
    fn test_lower_quality_is_not_larger() {
        let decoded = ImageRsCodec.decode(&png_bytes(64, 64)).unwrap();
        let high = ImageRsCodec.encode_jpeg(&decoded, 95).unwrap();
        let low = ImageRsCodec.encode_jpeg(&decoded, 50).unwrap();
        assert!(low.len() <= high.len());
    }

    #[test]
    fn test_resize_changes_dimensions() {
        let decoded = ImageRsCodec.decode(&png_bytes(40, 20)).unwrap();
        let resized = ImageRsCodec.resize(&decoded, 10, 5);

        assert_eq!((resized.width, resized.height), (10, 5));
        assert_eq!(resized.pixels.len(), 10 * 5 * 3);
    }

    #[test]
    fn test_transcoder_with_real_codec() {
        let limits = ImageLimits {
            max_dimension: 32,
            ..Default::default()
        };
        let transcoder = ImageTranscoder::new(ImageRsCodec, limits);

        let asset = transcoder.prepare(&png_bytes(64, 16)).unwrap();

        assert!(asset.resized);
        assert_eq!((asset.width, asset.height), (32, 8));
        assert_eq!(asset.quality, 95);
        assert_eq!(&asset.encoded[..2], &[0xFF, 0xD8]);
    }
}
