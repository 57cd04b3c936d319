use crate::error::RenderError;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, RgbImage};
use std::path::PathBuf;

// Largest logo file accepted, before decoding.
pub const MAX_LOGO_BYTES: usize = 4 * 1024 * 1024;
pub const MAX_LOGO_PIXELS: u32 = 600;
const JPEG_QUALITY: u8 = 90;

pub const LOGO_RESOURCE_ID: &str = "logo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl LogoSource {
    pub fn describe(&self) -> String {
        match self {
            LogoSource::Bytes(bytes) => format!("{} in-memory bytes", bytes.len()),
            LogoSource::Path(path) => path.display().to_string(),
        }
    }

    fn read(&self) -> Result<Vec<u8>, RenderError> {
        let bytes = match self {
            LogoSource::Bytes(bytes) => bytes.clone(),
            LogoSource::Path(path) => std::fs::read(path)
                .map_err(|err| RenderError::Asset(format!("cannot read logo {}: {}", path.display(), err)))?,
        };
        if bytes.is_empty() {
            return Err(RenderError::Asset("logo is empty".to_string()));
        }
        if bytes.len() > MAX_LOGO_BYTES {
            return Err(RenderError::Asset(format!(
                "logo is {} bytes, limit is {}",
                bytes.len(),
                MAX_LOGO_BYTES
            )));
        }
        Ok(bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

// Transparent pixels are composited onto white; PDF output has no soft mask.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let a = a as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        out.put_pixel(x, y, image::Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

impl LogoImage {
    pub fn load(source: &LogoSource) -> Result<Self, RenderError> {
        let bytes = source.read()?;
        Self::decode(&bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RenderError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|err| RenderError::Asset(format!("logo is not a readable PNG or JPEG: {}", err)))?;
        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::Asset("logo has no pixels".to_string()));
        }
        let decoded = if width > MAX_LOGO_PIXELS || height > MAX_LOGO_PIXELS {
            decoded.resize(MAX_LOGO_PIXELS, MAX_LOGO_PIXELS, FilterType::Triangle)
        } else {
            decoded
        };
        let rgb = flatten_onto_white(&decoded);
        let (width, height) = rgb.dimensions();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
            .encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|err| RenderError::Asset(format!("cannot encode logo: {}", err)))?;
        Ok(Self { width, height, jpeg })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn data_uri(&self) -> String {
        format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.jpeg)
        )
    }
}

#[cfg(test)]
pub(crate) fn test_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    let image = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode test png");
    out.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_logo_becomes_jpeg() {
        let logo = LogoImage::decode(&test_png(40, 20, [30, 60, 200, 255])).expect("logo decodes");
        assert_eq!((logo.width, logo.height), (40, 20));
        assert_eq!(&logo.jpeg[..2], &[0xFF, 0xD8]);
        assert!(logo.data_uri().starts_with("data:image/jpeg;base64,"));
        assert!((logo.aspect_ratio() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn transparent_pixels_are_white() {
        let image = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 0])));
        let flat = flatten_onto_white(&image);
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn large_logos_are_downscaled() {
        let logo = LogoImage::decode(&test_png(1200, 300, [0, 0, 0, 255])).expect("logo decodes");
        assert_eq!(logo.width, MAX_LOGO_PIXELS);
        assert!(logo.height <= MAX_LOGO_PIXELS);
    }

    #[test]
    fn unreadable_logos_are_asset_errors() {
        assert!(matches!(
            LogoImage::decode(b"not an image"),
            Err(RenderError::Asset(_))
        ));
        assert!(matches!(
            LogoImage::load(&LogoSource::Bytes(Vec::new())),
            Err(RenderError::Asset(_))
        ));
        assert!(matches!(
            LogoImage::load(&LogoSource::Path(PathBuf::from("/nonexistent/logo.png"))),
            Err(RenderError::Asset(_))
        ));
    }
}
