//! PDF watermark overlay via content-stream stamping.
//!
//! Each page gets an appended content stream wrapped in `q … Q`, with an
//! `ExtGState` carrying the watermark opacity and a shared Type1 Helvetica
//! resource. The text matrix comes straight from the placement transform,
//! converted into PDF user space (y-up).
//!
//! # Examples
//!
//! ```no_run
//! use aquamark::render::{OverlayTarget, PdfTarget, RenderContext};
//! use aquamark::attributes::WatermarkAttributes;
//!
//! # async fn example() -> aquamark::Result<()> {
//! let mut target = PdfTarget::from_file("contract.pdf").await?;
//! let ctx = RenderContext::with_system_font()?;
//! target.apply_overlay(&WatermarkAttributes::new("CONFIDENTIAL"), &ctx).await?;
//! target.save("contract-stamped.pdf").await?;
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use log::debug;
use tokio::task;

use crate::attributes::WatermarkAttributes;
use crate::error::{Result, WatermarkError};
use crate::placement::{
    build_transform, resolve_position, resolve_tiled, trademark_transform, Coordinates, Surface,
};
use crate::render::{OverlayTarget, RenderContext};

/// US Letter, used when no page in the parent chain declares a media box.
const DEFAULT_PAGE_SIZE: (f64, f64) = (612.0, 792.0);

const FONT_RESOURCE: &str = "AqF1";

/// A PDF document being watermarked.
#[derive(Debug)]
pub struct PdfTarget {
    document: Document,
    source: Option<PathBuf>,
    font_id: Option<ObjectId>,
    overlay_count: usize,
}

impl PdfTarget {
    /// Wrap an already-loaded document.
    pub fn from_document(document: Document) -> Self {
        Self {
            document,
            source: None,
            font_id: None,
            overlay_count: 0,
        }
    }

    /// Load a PDF from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(bytes)?;
        Ok(Self::from_document(document))
    }

    /// Load a PDF from a file.
    ///
    /// # Errors
    ///
    /// Returns [`WatermarkError::FileNotFound`] when the path does not exist
    /// and [`WatermarkError::FailedToLoadPdf`] when parsing fails.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(WatermarkError::file_not_found(path));
        }

        let bytes = tokio::fs::read(&path).await?;
        let loaded = task::spawn_blocking(move || Document::load_mem(&bytes))
            .await
            .map_err(|e| WatermarkError::other(format!("Load task failed: {e}")))?;

        let document = loaded
            .map_err(|e| WatermarkError::failed_to_load_pdf(path.clone(), e.to_string()))?;

        Ok(Self {
            document,
            source: Some(path),
            font_id: None,
            overlay_count: 0,
        })
    }

    /// The underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consume the target, returning the watermarked document.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// The file this document was loaded from, when it came from disk.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Serialize the watermarked document to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = self.document.clone();
        doc.compress();
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Save the watermarked document to a file.
    ///
    /// The write goes to a temporary sibling first and is renamed into
    /// place, so a failed save never truncates an existing output.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let mut doc = self.document.clone();

        task::spawn_blocking(move || {
            doc.compress();

            let tmp_path = path.with_extension("tmp");
            let file = std::fs::File::create(&tmp_path).map_err(|e| {
                WatermarkError::FailedToWrite {
                    path: tmp_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::new(file);
            doc.save_to(&mut writer)
                .map_err(|e| WatermarkError::FailedToWrite {
                    path: tmp_path.clone(),
                    source: std::io::Error::other(e),
                })?;
            writer.flush().map_err(|e| WatermarkError::FailedToWrite {
                path: tmp_path.clone(),
                source: e,
            })?;

            std::fs::rename(&tmp_path, &path).map_err(|e| WatermarkError::FailedToWrite {
                path,
                source: e,
            })
        })
        .await
        .map_err(|e| WatermarkError::other(format!("Write task failed: {e}")))?
    }

    /// Media box size for a page, following the parent chain for inherited
    /// boxes.
    fn page_size(&self, page_id: ObjectId) -> Result<(f64, f64)> {
        let mut dict = self.document.get_object(page_id)?.as_dict()?;
        loop {
            if let Ok(obj) = dict.get(b"MediaBox") {
                let arr = self.resolve(obj)?.as_array()?;
                if arr.len() == 4 {
                    let nums: Vec<f64> = arr.iter().filter_map(object_to_f64).collect();
                    if nums.len() == 4 {
                        return Ok((nums[2] - nums[0], nums[3] - nums[1]));
                    }
                }
                return Err(WatermarkError::render_failed("malformed MediaBox entry"));
            }
            match dict.get(b"Parent") {
                Ok(Object::Reference(parent)) => {
                    dict = self.document.get_object(*parent)?.as_dict()?;
                }
                _ => return Ok(DEFAULT_PAGE_SIZE),
            }
        }
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => Ok(self.document.get_object(*id)?),
            other => Ok(other),
        }
    }

    fn font_object_id(&mut self) -> ObjectId {
        *self.font_id.get_or_insert_with(|| {
            self.document.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            })
        })
    }

    /// Insert `value` under `name` in the page's resource sub-dictionary
    /// (`Font`, `ExtGState`, ...), creating whatever is missing along the
    /// way. Both the resources and the sub-dictionary may be indirect.
    fn add_resource(
        &mut self,
        page_id: ObjectId,
        category: &str,
        name: &str,
        value: Object,
    ) -> Result<()> {
        enum Location {
            InPage,
            Indirect(ObjectId),
        }

        let page = self.document.get_object(page_id)?.as_dict()?;
        let resources = match page.get(b"Resources") {
            Ok(Object::Reference(id)) => Location::Indirect(*id),
            _ => Location::InPage,
        };

        let resources_dict = match resources {
            Location::Indirect(id) => self.document.get_object_mut(id)?.as_dict_mut()?,
            Location::InPage => {
                let page = self.document.get_object_mut(page_id)?.as_dict_mut()?;
                if !page.has(b"Resources") {
                    page.set("Resources", Dictionary::new());
                }
                page.get_mut(b"Resources")?.as_dict_mut()?
            }
        };

        let sub = match resources_dict.get(category.as_bytes()) {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(Object::Dictionary(_)) => None,
            _ => {
                resources_dict.set(category, Dictionary::new());
                None
            }
        };

        match sub {
            Some(id) => {
                self.document
                    .get_object_mut(id)?
                    .as_dict_mut()?
                    .set(name, value);
            }
            None => {
                resources_dict
                    .get_mut(category.as_bytes())?
                    .as_dict_mut()?
                    .set(name, value);
            }
        }
        Ok(())
    }

    /// Append an encoded content stream to a page's `Contents`.
    fn append_content(&mut self, page_id: ObjectId, content: Content) -> Result<()> {
        let encoded = content.encode()?;
        let stream_id = self
            .document
            .add_object(Stream::new(dictionary! {}, encoded));

        let page = self.document.get_object_mut(page_id)?.as_dict_mut()?;
        let contents = match page.get(b"Contents") {
            Ok(Object::Reference(existing)) => {
                vec![Object::Reference(*existing), Object::Reference(stream_id)].into()
            }
            Ok(Object::Array(existing)) => {
                let mut array = existing.clone();
                array.push(Object::Reference(stream_id));
                array.into()
            }
            _ => Object::Reference(stream_id),
        };
        page.set("Contents", contents);
        Ok(())
    }

    fn build_stamp(
        &self,
        attrs: &WatermarkAttributes,
        ctx: &RenderContext,
        page_h: f64,
        positions: &[Coordinates],
        gs_name: &str,
    ) -> Content {
        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new("gs", vec![Object::Name(gs_name.into())]),
        ];

        let color = [
            f32::from(attrs.color.r) / 255.0,
            f32::from(attrs.color.g) / 255.0,
            f32::from(attrs.color.b) / 255.0,
        ];
        let baseline = ctx.fonts.baseline_offset(attrs.size);
        let trademark = ctx.trademarks.select(attrs);

        for coords in positions {
            // Flip into PDF user space: box origin becomes bottom-left, y-up.
            let pdf_coords = Coordinates::new(
                coords.x,
                page_h - coords.y - coords.height,
                coords.width,
                coords.height,
            );
            let transform = build_transform(pdf_coords, attrs.rotation);
            let m = transform.matrix();
            let (bx, by) = transform.apply(0.0, baseline);

            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![Object::Name(FONT_RESOURCE.into()), (attrs.size as f32).into()],
            ));
            operations.push(Operation::new(
                "rg",
                vec![color[0].into(), color[1].into(), color[2].into()],
            ));
            operations.push(Operation::new(
                "Tm",
                vec![
                    (m[0] as f32).into(),
                    (m[1] as f32).into(),
                    (m[2] as f32).into(),
                    (m[3] as f32).into(),
                    (bx as f32).into(),
                    (by as f32).into(),
                ],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(
                    to_win_ansi(&attrs.text),
                    StringFormat::Literal,
                )],
            ));

            if let Some(strategy) = trademark {
                let glyph_transform = trademark_transform(
                    pdf_coords,
                    pdf_coords.width,
                    pdf_coords.height,
                    attrs.rotation,
                );
                let (gx, gy) = glyph_transform.apply(0.0, 0.0);

                operations.push(Operation::new(
                    "Tf",
                    vec![
                        Object::Name(FONT_RESOURCE.into()),
                        ((attrs.size * strategy.scale()) as f32).into(),
                    ],
                ));
                operations.push(Operation::new(
                    "Tm",
                    vec![
                        (m[0] as f32).into(),
                        (m[1] as f32).into(),
                        (m[2] as f32).into(),
                        (m[3] as f32).into(),
                        (gx as f32).into(),
                        (gy as f32).into(),
                    ],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(
                        to_win_ansi(strategy.glyph()),
                        StringFormat::Literal,
                    )],
                ));
            }

            operations.push(Operation::new("ET", vec![]));
        }

        operations.push(Operation::new("Q", vec![]));
        Content { operations }
    }
}

impl OverlayTarget for PdfTarget {
    async fn apply_overlay(
        &mut self,
        attrs: &WatermarkAttributes,
        ctx: &RenderContext,
    ) -> Result<()> {
        attrs.validate()?;

        let (content_w, content_h) = ctx.fonts.measure(&attrs.text, attrs.size);
        let font_id = self.font_object_id();

        self.overlay_count += 1;
        let gs_name = format!("AqGS{}", self.overlay_count);
        let gs = dictionary! {
            "Type" => "ExtGState",
            "ca" => attrs.opacity as f32,
            "CA" => attrs.opacity as f32,
        };

        let page_ids: Vec<ObjectId> = self.document.get_pages().into_values().collect();
        debug!(
            "Stamping {:?} onto {} page(s)",
            attrs.text,
            page_ids.len()
        );

        for page_id in page_ids {
            let (page_w, page_h) = self.page_size(page_id)?;
            let surface = Surface::new(page_w, page_h);

            let positions = if attrs.tiled {
                resolve_tiled(surface, content_w, content_h, attrs.tile_spacing)?
            } else {
                vec![resolve_position(
                    surface,
                    attrs.anchor,
                    content_w,
                    content_h,
                    attrs.margin,
                )?]
            };

            let content = self.build_stamp(attrs, ctx, page_h, &positions, &gs_name);

            self.add_resource(page_id, "Font", FONT_RESOURCE, Object::Reference(font_id))?;
            self.add_resource(page_id, "ExtGState", &gs_name, Object::Dictionary(gs.clone()))?;
            self.append_content(page_id, content)?;
        }

        Ok(())
    }
}

fn object_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Encode text for a WinAnsi-encoded Type1 font. Characters outside the
/// Latin-1 range degrade to '?'.
fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if c as u32 <= 255 { c as u8 } else { b'?' })
        .collect()
}
