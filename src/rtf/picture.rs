//! RTF picture handling.
//!
//! RTF embeds images in `\pict` destinations. The image format is named by
//! a "blip" control word (`\pngblip`, `\jpegblip`, ...); when it is missing
//! the format is detected from the payload signature. Formats RTF has no
//! word for (GIF, TIFF) are written without one and found again by
//! signature when read back.

/// Image type in RTF documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageType {
    /// Enhanced Metafile
    Emf,
    /// Windows Metafile
    Wmf,
    /// PNG image
    Png,
    /// JPEG image
    Jpeg,
    /// DIB (BITMAPINFOHEADER + pixels, no file header)
    Dib,
    /// BMP file (with `BM` file header)
    Bmp,
    /// GIF image
    Gif,
    /// TIFF image
    Tiff,
    /// Mac PICT format
    Pict,
    /// Unknown or unsupported format
    #[default]
    Unknown,
}

impl ImageType {
    /// Image type selected by a `\pict` control word, if it is a format word.
    pub fn from_control_word(word: &str) -> Option<Self> {
        Some(match word {
            "emfblip" => ImageType::Emf,
            "pngblip" => ImageType::Png,
            "jpegblip" => ImageType::Jpeg,
            "wmetafile" => ImageType::Wmf,
            "dibitmap" => ImageType::Dib,
            "macpict" => ImageType::Pict,
            // Device-dependent bitmaps cannot be interpreted without the
            // device they were captured on.
            "wbitmap" => ImageType::Unknown,
            _ => return None,
        })
    }

    /// Format control word and parameter written for this type.
    pub fn control_word(self) -> Option<(&'static str, Option<i32>)> {
        match self {
            ImageType::Emf => Some(("emfblip", None)),
            ImageType::Png => Some(("pngblip", None)),
            ImageType::Jpeg => Some(("jpegblip", None)),
            ImageType::Wmf => Some(("wmetafile", Some(8))),
            ImageType::Dib | ImageType::Bmp => Some(("dibitmap", Some(0))),
            ImageType::Pict => Some(("macpict", None)),
            ImageType::Gif | ImageType::Tiff | ImageType::Unknown => None,
        }
    }

    /// MIME type used in `data:` URIs.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageType::Emf => "image/x-emf",
            ImageType::Wmf => "image/x-wmf",
            ImageType::Png => "image/png",
            ImageType::Jpeg => "image/jpeg",
            ImageType::Dib | ImageType::Bmp => "image/bmp",
            ImageType::Gif => "image/gif",
            ImageType::Tiff => "image/tiff",
            ImageType::Pict => "image/x-pict",
            ImageType::Unknown => "application/octet-stream",
        }
    }

    /// Image type for a MIME type. Unrecognized types are `Unknown`.
    pub fn from_mime_type(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/x-emf" | "image/emf" => ImageType::Emf,
            "image/x-wmf" | "image/wmf" => ImageType::Wmf,
            "image/png" => ImageType::Png,
            "image/jpeg" | "image/jpg" | "image/pjpeg" => ImageType::Jpeg,
            "image/bmp" | "image/x-bmp" | "image/x-ms-bmp" => ImageType::Bmp,
            "image/gif" => ImageType::Gif,
            "image/tiff" | "image/tif" => ImageType::Tiff,
            "image/x-pict" | "image/pict" => ImageType::Pict,
            _ => ImageType::Unknown,
        }
    }

    /// Whether `\picw`/`\pich` are measured in pixels for this type.
    #[inline]
    pub fn is_bitmap(self) -> bool {
        matches!(
            self,
            ImageType::Png
                | ImageType::Jpeg
                | ImageType::Dib
                | ImageType::Bmp
                | ImageType::Gif
                | ImageType::Tiff
        )
    }
}

/// Picture collected from a `\pict` destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Picture {
    /// Image type named by the blip word, `Unknown` if none
    pub image_type: ImageType,
    /// Decoded image data
    pub data: Vec<u8>,
    /// Picture width (`\picw`): pixels for bitmaps, 0.01 mm for metafiles
    pub width: Option<i32>,
    /// Picture height (`\pich`)
    pub height: Option<i32>,
    /// Goal width in twips (`\picwgoal`)
    pub goal_width: Option<i32>,
    /// Goal height in twips (`\pichgoal`)
    pub goal_height: Option<i32>,
    /// Horizontal scaling percentage
    pub scale_x: Option<i32>,
    /// Vertical scaling percentage
    pub scale_y: Option<i32>,
}

impl Picture {
    /// Effective image type: the declared type, or the detected signature
    /// when no format word was present.
    pub fn resolved_type(&self) -> ImageType {
        match self.image_type {
            ImageType::Unknown => detect_image_type(&self.data),
            declared => declared,
        }
    }

    /// Get the computed width in twips, considering scaling.
    #[inline]
    pub fn computed_width(&self) -> Option<i32> {
        self.goal_width
            .filter(|w| *w > 0)
            .or_else(|| self.bitmap_extent(self.width))
            .map(|w| scale(w, self.scale_x))
            .filter(|w| *w > 0)
    }

    /// Get the computed height in twips, considering scaling.
    #[inline]
    pub fn computed_height(&self) -> Option<i32> {
        self.goal_height
            .filter(|h| *h > 0)
            .or_else(|| self.bitmap_extent(self.height))
            .map(|h| scale(h, self.scale_y))
            .filter(|h| *h > 0)
    }

    /// `\picw`/`\pich` in twips, only meaningful for bitmaps.
    fn bitmap_extent(&self, pixels: Option<i32>) -> Option<i32> {
        if self.resolved_type().is_bitmap() {
            pixels
                .filter(|p| *p > 0)
                .map(|p| p.saturating_mul(crate::common::unit::TWIPS_PER_PX))
        } else {
            None
        }
    }
}

#[inline]
fn scale(value: i32, percent: Option<i32>) -> i32 {
    match percent {
        Some(p) if p > 0 => {
            let scaled = i64::from(value) * i64::from(p) / 100;
            i32::try_from(scaled).unwrap_or(if scaled < 0 { i32::MIN } else { i32::MAX })
        },
        _ => value,
    }
}

/// Detect image type from binary signature.
pub fn detect_image_type(data: &[u8]) -> ImageType {
    if data.is_empty() {
        return ImageType::Unknown;
    }

    // Check JPEG signature (starts with FFD8)
    if data.starts_with(&[0xFF, 0xD8]) {
        return ImageType::Jpeg;
    }

    // Check PNG signature
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return ImageType::Png;
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return ImageType::Gif;
    }

    if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        return ImageType::Tiff;
    }

    // EMF: EMR_HEADER record type 1 with " EMF" signature at offset 40
    if data.len() >= 44 && data[0..4] == [0x01, 0x00, 0x00, 0x00] && &data[40..44] == b" EMF" {
        return ImageType::Emf;
    }

    // WMF: Aldus placeable header, or a standard METAHEADER
    if data.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A])
        || data.starts_with(&[0x01, 0x00, 0x09, 0x00])
        || data.starts_with(&[0x02, 0x00, 0x09, 0x00])
    {
        return ImageType::Wmf;
    }

    if data.starts_with(b"BM") {
        return ImageType::Bmp;
    }

    ImageType::Unknown
}

/// Size of the BMP file header that precedes a DIB in a `.bmp` file.
pub const BMP_FILE_HEADER_LEN: usize = 14;

/// Prepend a BMP file header to a DIB so it can be used as `image/bmp`.
pub fn dib_to_bmp(dib: &[u8]) -> Vec<u8> {
    let info_len = read_u32(dib, 0).unwrap_or(40) as usize;
    let bit_count = read_u16(dib, 14).unwrap_or(24);
    let colors_used = read_u32(dib, 32).unwrap_or(0) as usize;
    let palette_entries = match (colors_used, bit_count) {
        (0, 1..=8) => 1usize << bit_count,
        (n, _) => n,
    };
    let pixel_offset = BMP_FILE_HEADER_LEN + info_len + palette_entries * 4;
    let file_len = BMP_FILE_HEADER_LEN + dib.len();

    let mut bmp = Vec::with_capacity(file_len);
    bmp.extend_from_slice(b"BM");
    bmp.extend_from_slice(&(file_len as u32).to_le_bytes());
    bmp.extend_from_slice(&[0; 4]);
    bmp.extend_from_slice(&(pixel_offset as u32).to_le_bytes());
    bmp.extend_from_slice(dib);
    bmp
}

/// Strip the BMP file header, leaving the DIB `\dibitmap` expects.
pub fn bmp_to_dib(bmp: &[u8]) -> &[u8] {
    if bmp.starts_with(b"BM") && bmp.len() >= BMP_FILE_HEADER_LEN {
        &bmp[BMP_FILE_HEADER_LEN..]
    } else {
        bmp
    }
}

/// Pixel dimensions stored in an image header, where cheap to read.
pub fn pixel_size(data: &[u8]) -> Option<(u32, u32)> {
    match detect_image_type(data) {
        ImageType::Png => {
            // IHDR is always the first chunk
            Some((read_u32_be(data, 16)?, read_u32_be(data, 20)?))
        },
        ImageType::Gif => Some((
            u32::from(read_u16(data, 6)?),
            u32::from(read_u16(data, 8)?),
        )),
        ImageType::Bmp => dib_size(&data[BMP_FILE_HEADER_LEN.min(data.len())..]),
        _ => None,
    }
}

/// Pixel dimensions of a DIB.
pub fn dib_size(dib: &[u8]) -> Option<(u32, u32)> {
    let width = read_u32(dib, 4)? as i32;
    let height = read_u32(dib, 8)? as i32;
    Some((width.unsigned_abs(), height.unsigned_abs()))
}

#[inline]
fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

#[inline]
fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[inline]
fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_dib() -> Vec<u8> {
        // 2x1 24-bit DIB: 40-byte BITMAPINFOHEADER + one padded row
        let mut dib = Vec::new();
        dib.extend_from_slice(&40u32.to_le_bytes());
        dib.extend_from_slice(&2i32.to_le_bytes());
        dib.extend_from_slice(&1i32.to_le_bytes());
        dib.extend_from_slice(&1u16.to_le_bytes());
        dib.extend_from_slice(&24u16.to_le_bytes());
        dib.extend_from_slice(&[0; 24]);
        dib.extend_from_slice(&[0xFF; 8]);
        dib
    }

    #[test]
    fn test_detect_png() {
        let png_sig = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_image_type(&png_sig), ImageType::Png);
    }

    #[test]
    fn test_detect_jpeg() {
        let jpeg_sig = vec![0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(detect_image_type(&jpeg_sig), ImageType::Jpeg);
    }

    #[test]
    fn test_detect_other_signatures() {
        assert_eq!(detect_image_type(b"GIF89a...."), ImageType::Gif);
        assert_eq!(detect_image_type(b"II*\0rest"), ImageType::Tiff);
        assert_eq!(detect_image_type(b"BM......"), ImageType::Bmp);
        assert_eq!(detect_image_type(&[0x01, 0x02]), ImageType::Unknown);
        assert_eq!(detect_image_type(&[]), ImageType::Unknown);
    }

    #[test]
    fn test_mime_types() {
        for ty in [
            ImageType::Emf,
            ImageType::Wmf,
            ImageType::Png,
            ImageType::Jpeg,
            ImageType::Gif,
            ImageType::Tiff,
            ImageType::Pict,
            ImageType::Unknown,
        ] {
            assert_eq!(ImageType::from_mime_type(ty.mime_type()), ty);
        }
        assert_eq!(ImageType::from_mime_type("IMAGE/JPG"), ImageType::Jpeg);
        assert_eq!(ImageType::from_mime_type("text/plain"), ImageType::Unknown);
    }

    #[test]
    fn test_dib_bmp_conversion() {
        let dib = tiny_dib();
        let bmp = dib_to_bmp(&dib);
        assert_eq!(detect_image_type(&bmp), ImageType::Bmp);
        assert_eq!(read_u32(&bmp, 2), Some(bmp.len() as u32));
        assert_eq!(read_u32(&bmp, 10), Some(54));
        assert_eq!(bmp_to_dib(&bmp), &dib[..]);
        assert_eq!(pixel_size(&bmp), Some((2, 1)));
    }

    #[test]
    fn test_picture_dimensions() {
        let pic = Picture {
            image_type: ImageType::Png,
            width: Some(96),
            height: Some(96),
            scale_x: Some(200), // 200% scale
            scale_y: Some(50),
            ..Default::default()
        };
        // Bitmap extents are pixels
        assert_eq!(pic.computed_width(), Some(2880));
        assert_eq!(pic.computed_height(), Some(720));

        let goal = Picture {
            image_type: ImageType::Emf,
            width: Some(2540),
            goal_width: Some(1440),
            ..Default::default()
        };
        assert_eq!(goal.computed_width(), Some(1440));
        assert_eq!(goal.computed_height(), None);
    }

    #[test]
    fn test_picture_dimensions_out_of_range() {
        let negative = Picture {
            image_type: ImageType::Png,
            width: Some(4),
            goal_height: Some(-5),
            height: Some(0),
            ..Default::default()
        };
        // A bad goal falls back to the pixel extent
        assert_eq!(negative.computed_width(), Some(60));
        assert_eq!(negative.computed_height(), None);

        let huge = Picture {
            image_type: ImageType::Emf,
            goal_width: Some(i32::MAX),
            scale_x: Some(i32::MAX),
            ..Default::default()
        };
        assert_eq!(huge.computed_width(), Some(i32::MAX));
    }
}
