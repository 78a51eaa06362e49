//! Profile photo harvesting from PDF CVs.
//!
//! # Selection rule
//! Pages are scanned in order and, within a page, image XObjects in the order the page's
//! resource dictionary lists them. The first image whose encoded payload is at least
//! `min_encoded_bytes` long and whose pixel size is larger than `min_dimension` on both
//! sides wins; scanning stops there. Icons, logos and bullet glyphs fall under the size
//! threshold.
//!
//! # Payloads
//! JPEG (`/DCTDecode`) and JPEG 2000 streams already hold an image file; any filters
//! stacked before them are undone and the file bytes are kept as they are. Raw pixel
//! streams (unfiltered, `/FlateDecode` and the like) are decoded from `/Width`, `/Height`,
//! `/ColorSpace` and `/BitsPerComponent` and re-encoded as PNG.
//!
//! # Output
//! The payload is written to `<stem>_profile_photo.png`. JPEG payloads keep the `.png`
//! name because consumers route on it.

use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info, warn};

use crate::errors::ExtractError;
use crate::extraction::Extraction;
use crate::models::{PersistedPhoto, StoredDocument};

pub const PHOTO_SUFFIX: &str = "_profile_photo.png";

/// Bound on page-tree hops when looking for inherited resources.
const MAX_INHERITANCE_DEPTH: usize = 32;
/// Bound on Form XObject nesting.
const MAX_FORM_DEPTH: usize = 4;
/// Raw pixel streams larger than this are not decoded.
const MAX_RAW_PIXELS: u64 = 40_000_000;

/// Size thresholds for accepting an embedded image as a profile photo.
#[derive(Debug, Clone)]
pub struct PhotoHarvester {
    /// Payloads shorter than this are decoding artefacts, not photos.
    pub min_encoded_bytes: usize,
    /// Both width and height must be strictly greater than this.
    pub min_dimension: u32,
    /// Stop after examining this many images. `None` scans the whole document.
    pub max_images: Option<usize>,
}

impl Default for PhotoHarvester {
    fn default() -> Self {
        Self {
            min_encoded_bytes: 100,
            min_dimension: 100,
            max_images: None,
        }
    }
}

/// A raster image that passed the size test.
struct CandidateImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

/// Harvests with the default thresholds.
pub fn harvest(document: &StoredDocument, destination: &Path) -> Extraction<PersistedPhoto> {
    PhotoHarvester::default().harvest(document, destination)
}

/// Output filename for a given document.
pub fn photo_filename(document: &StoredDocument) -> String {
    format!("{}{PHOTO_SUFFIX}", document.stem())
}

impl PhotoHarvester {
    pub fn with_limit(max_images: Option<usize>) -> Self {
        Self {
            max_images,
            ..Self::default()
        }
    }

    /// Finds the profile photo in `document` and writes it into `destination`.
    ///
    /// Non-PDF documents and PDFs without a qualifying image yield `Empty`.
    pub fn harvest(
        &self,
        document: &StoredDocument,
        destination: &Path,
    ) -> Extraction<PersistedPhoto> {
        if !document.is_pdf() {
            return Extraction::Empty;
        }

        let doc = match Document::load(document.path()) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(
                    "Photo harvest could not open {}: {e}",
                    document.path().display()
                );
                return Extraction::Failed(e.into());
            }
        };

        let Some(candidate) = self.find_candidate(&doc) else {
            debug!("No profile photo found in {}", document.path().display());
            return Extraction::Empty;
        };

        let filename = photo_filename(document);
        let path = destination.join(&filename);
        if let Err(e) = std::fs::write(&path, &candidate.bytes) {
            warn!("Could not write profile photo {}: {e}", path.display());
            return Extraction::Failed(ExtractError::Io(e));
        }
        info!(
            "Saved {}x{} profile photo to {}",
            candidate.width,
            candidate.height,
            path.display()
        );
        Extraction::Found(PersistedPhoto { filename, path })
    }

    fn find_candidate(&self, doc: &Document) -> Option<CandidateImage> {
        let mut examined = 0usize;
        for (page_number, page_id) in doc.get_pages() {
            for (image_id, stream) in page_images(doc, page_id) {
                if self.max_images.is_some_and(|max| examined >= max) {
                    debug!("Photo scan limit of {examined} images reached");
                    return None;
                }
                examined += 1;

                match self.accept(doc, stream) {
                    Ok(Some(candidate)) => return Some(candidate),
                    Ok(None) => {}
                    Err(e) => debug!("Skipping image {image_id:?} on page {page_number}: {e}"),
                }
            }
        }
        None
    }

    /// Applies the size test to one image XObject, decoding its payload as needed.
    fn accept(
        &self,
        doc: &Document,
        stream: &Stream,
    ) -> Result<Option<CandidateImage>, ExtractError> {
        let filters = stream_filters(&stream.dict);
        match filters.last().map(Vec::as_slice) {
            Some(b"DCTDecode" | b"JPXDecode") => {
                let bytes = if filters.len() == 1 {
                    stream.content.clone()
                } else {
                    stream.decompressed_content()?
                };
                if bytes.len() < self.min_encoded_bytes {
                    return Ok(None);
                }
                let (width, height) = decoded_dimensions(&bytes)?;
                Ok(self
                    .large_enough(width, height)
                    .then_some(CandidateImage { bytes, width, height }))
            }
            // bilevel scans, never a photo
            Some(b"CCITTFaxDecode" | b"JBIG2Decode") => Ok(None),
            _ => {
                let width = dimension(&stream.dict, b"Width")?;
                let height = dimension(&stream.dict, b"Height")?;
                if !self.large_enough(width, height) {
                    return Ok(None);
                }
                let pixels = if filters.is_empty() {
                    stream.content.clone()
                } else {
                    stream.decompressed_content()?
                };
                let image = raw_image(doc, &stream.dict, width, height, pixels)?;
                let mut bytes = Vec::new();
                image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
                if bytes.len() < self.min_encoded_bytes {
                    return Ok(None);
                }
                Ok(Some(CandidateImage { bytes, width, height }))
            }
        }
    }

    fn large_enough(&self, width: u32, height: u32) -> bool {
        width > self.min_dimension && height > self.min_dimension
    }
}

/// Reads width and height from the image header after sniffing its format.
fn decoded_dimensions(bytes: &[u8]) -> Result<(u32, u32), ExtractError> {
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// `/Filter` as a list of names, outermost first.
fn stream_filters(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok())
            .map(<[u8]>::to_vec)
            .collect(),
        _ => Vec::new(),
    }
}

fn dimension(dict: &Dictionary, key: &[u8]) -> Result<u32, ExtractError> {
    let value = dict.get(key)?.as_i64()?;
    u32::try_from(value).map_err(|_| {
        ExtractError::UnsupportedImage(format!(
            "/{} out of range: {value}",
            String::from_utf8_lossy(key)
        ))
    })
}

/// Builds an image from an 8-bit Gray, RGB or CMYK sample stream.
fn raw_image(
    doc: &Document,
    dict: &Dictionary,
    width: u32,
    height: u32,
    mut pixels: Vec<u8>,
) -> Result<DynamicImage, ExtractError> {
    let bits = dict.get(b"BitsPerComponent").and_then(Object::as_i64).unwrap_or(8);
    if bits != 8 {
        return Err(ExtractError::UnsupportedImage(format!(
            "{bits} bits per component"
        )));
    }
    let components = color_components(doc, dict)?;
    let area = u64::from(width) * u64::from(height);
    if area > MAX_RAW_PIXELS {
        return Err(ExtractError::UnsupportedImage(format!(
            "{width}x{height} raw image is too large"
        )));
    }
    let expected = (area * components as u64) as usize;
    if pixels.len() < expected {
        return Err(ExtractError::UnsupportedImage(format!(
            "expected {expected} sample bytes, found {}",
            pixels.len()
        )));
    }
    pixels.truncate(expected);

    let short = || ExtractError::UnsupportedImage("sample buffer does not fit image".to_string());
    let image = match components {
        1 => DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, pixels).ok_or_else(short)?),
        3 => DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, pixels).ok_or_else(short)?),
        _ => {
            let rgb: Vec<u8> = pixels
                .chunks_exact(4)
                .flat_map(|cmyk| {
                    let k = 255 - u16::from(cmyk[3]);
                    [0usize, 1, 2].map(|i| ((255 - u16::from(cmyk[i])) * k / 255) as u8)
                })
                .collect();
            DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, rgb).ok_or_else(short)?)
        }
    };
    Ok(image)
}

/// Samples per pixel for the supported colour spaces: 1 (gray), 3 (RGB) or 4 (CMYK).
fn color_components(doc: &Document, dict: &Dictionary) -> Result<usize, ExtractError> {
    let space = resolve(doc, dict.get(b"ColorSpace")?)?;
    match space {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" => Ok(1),
            b"DeviceRGB" | b"CalRGB" => Ok(3),
            b"DeviceCMYK" => Ok(4),
            other => Err(unsupported(String::from_utf8_lossy(other))),
        },
        Object::Array(items) => {
            let family = items.first().and_then(|obj| obj.as_name().ok());
            match family {
                Some(b"CalGray") => Ok(1),
                Some(b"CalRGB") => Ok(3),
                Some(b"ICCBased") => {
                    let profile = items
                        .get(1)
                        .ok_or_else(|| unsupported("ICCBased without profile"))?;
                    let n = resolve(doc, profile)?.as_stream()?.dict.get(b"N")?.as_i64()?;
                    match n {
                        1 => Ok(1),
                        3 => Ok(3),
                        4 => Ok(4),
                        _ => Err(unsupported(format!("ICCBased with {n} components"))),
                    }
                }
                Some(other) => Err(unsupported(String::from_utf8_lossy(other))),
                None => Err(unsupported("array without family")),
            }
        }
        _ => Err(unsupported("of unexpected type")),
    }
}

fn unsupported(what: impl std::fmt::Display) -> ExtractError {
    ExtractError::UnsupportedImage(format!("colour space {what}"))
}

/// Image XObjects of a page, in resource order.
fn page_images(doc: &Document, page_id: ObjectId) -> Vec<(ObjectId, &Stream)> {
    let mut images = Vec::new();
    let Some(resources) = page_resources(doc, page_id) else {
        return images;
    };
    let mut seen = HashSet::new();
    collect_images(doc, resources, 0, &mut seen, &mut images);
    images
}

/// The page's `/Resources`, following `/Parent` links when the page inherits them.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve(doc, resources).ok()?.as_dict().ok();
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn collect_images<'a>(
    doc: &'a Document,
    resources: &'a Dictionary,
    depth: usize,
    seen: &mut HashSet<ObjectId>,
    out: &mut Vec<(ObjectId, &'a Stream)>,
) {
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| resolve(doc, obj).ok())
        .and_then(|obj| obj.as_dict().ok())
    else {
        return;
    };

    for (name, obj) in xobjects.iter() {
        let Object::Reference(id) = obj else {
            continue;
        };
        if !seen.insert(*id) {
            continue;
        }
        let stream = match doc.get_object(*id).and_then(Object::as_stream) {
            Ok(stream) => stream,
            Err(e) => {
                debug!(
                    "Skipping XObject /{}: {e}",
                    String::from_utf8_lossy(name)
                );
                continue;
            }
        };
        let subtype = stream.dict.get(b"Subtype").and_then(Object::as_name).ok();
        match subtype {
            Some(b"Image") => out.push((*id, stream)),
            Some(b"Form") if depth < MAX_FORM_DEPTH => {
                if let Some(form_resources) = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|obj| resolve(doc, obj).ok())
                    .and_then(|obj| obj.as_dict().ok())
                {
                    collect_images(doc, form_resources, depth + 1, seen, out);
                }
            }
            _ => {}
        }
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> lopdf::Result<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}
