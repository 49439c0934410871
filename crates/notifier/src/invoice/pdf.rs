//! PDF serialization of the invoice layout.
//!
//! Writes the draw operations with the two standard Helvetica fonts and an
//! optional logo XObject. The content stream is left uncompressed, so
//! rendering the same layout twice yields byte-identical output.

use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str};

use super::layout::{DrawOp, PAGE_HEIGHT, PAGE_WIDTH};
use super::InvoiceError;

const FONT_REGULAR: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");
const LOGO_NAME: Name<'static> = Name(b"Im1");

/// A decoded logo, ready for embedding.
///
/// Decoded once at startup from the configured PNG; the raw channels are kept
/// so each render only has to flate-compress them.
#[derive(Debug, Clone)]
pub struct LogoImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl LogoImage {
    /// Decode a PNG into separated color and alpha channels.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a decodable image.
    pub fn decode(png: &[u8]) -> Result<Self, InvoiceError> {
        let decoded = image::load_from_memory(png)?.to_rgba8();
        let (width, height) = decoded.dimensions();

        let pixels = width as usize * height as usize;
        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(pixels);
        let mut opaque = true;
        for pixel in decoded.pixels() {
            let [r, g, b, a] = pixel.0;
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
            opaque &= a == u8::MAX;
        }

        Ok(Self {
            width,
            height,
            rgb,
            alpha: (!opaque).then_some(alpha),
        })
    }

    /// Height in points when drawn at the given width, preserving aspect.
    #[must_use]
    pub fn scaled_height(&self, width: f32) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        {
            width * self.height as f32 / self.width.max(1) as f32
        }
    }
}

/// Serialize draw operations into a single-page PDF.
pub(crate) fn write_pdf(ops: &[DrawOp], logo: Option<&LogoImage>) -> Vec<u8> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let page_id = alloc.bump();
    let content_id = alloc.bump();
    let font_regular_id = alloc.bump();
    let font_bold_id = alloc.bump();
    let logo_id = logo.map(|_| alloc.bump());
    let mask_id = logo.and_then(|img| img.alpha.as_ref().map(|_| alloc.bump()));

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
    page.parent(page_tree_id);
    page.contents(content_id);
    let mut resources = page.resources();
    resources
        .fonts()
        .pair(FONT_REGULAR, font_regular_id)
        .pair(FONT_BOLD, font_bold_id);
    if let Some(logo_id) = logo_id {
        resources.x_objects().pair(LOGO_NAME, logo_id);
    }
    resources.finish();
    page.finish();

    pdf.type1_font(font_regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(font_bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    if let (Some(img), Some(logo_id)) = (logo, logo_id) {
        write_logo_xobject(&mut pdf, logo_id, mask_id, img);
    }

    let mut content = Content::new();
    for op in ops {
        match op {
            DrawOp::Text(t) => {
                content.begin_text();
                content.set_fill_rgb(t.color.r, t.color.g, t.color.b);
                content.set_font(if t.bold { FONT_BOLD } else { FONT_REGULAR }, t.size);
                content.next_line(t.x, PAGE_HEIGHT - t.y - t.size);
                content.show(Str(&win_ansi(&t.text)));
                content.end_text();
            }
            DrawOp::Rule(r) => {
                let color = super::layout::Color::RULE;
                content.set_stroke_rgb(color.r, color.g, color.b);
                content.set_line_width(1.0);
                content.move_to(r.x1, PAGE_HEIGHT - r.y);
                content.line_to(r.x2, PAGE_HEIGHT - r.y);
                content.stroke();
            }
            DrawOp::Logo(l) => {
                if let Some(img) = logo {
                    let height = img.scaled_height(l.width);
                    content.save_state();
                    content.transform([l.width, 0.0, 0.0, height, l.x, PAGE_HEIGHT - l.y - height]);
                    content.x_object(LOGO_NAME);
                    content.restore_state();
                }
            }
        }
    }
    pdf.stream(content_id, &content.finish());

    pdf.finish()
}

/// Transcode text to WinAnsi (cp1252), the encoding declared on both fonts.
///
/// Product names can carry arbitrary Unicode; characters outside the
/// encoding render as `?` rather than as mojibake.
#[allow(clippy::cast_possible_truncation)]
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8a,
            '‹' => 0x8b,
            'Œ' => 0x8c,
            'Ž' => 0x8e,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9a,
            '›' => 0x9b,
            'œ' => 0x9c,
            'ž' => 0x9e,
            'Ÿ' => 0x9f,
            _ => b'?',
        })
        .collect()
}


fn write_logo_xobject(pdf: &mut Pdf, logo_id: Ref, mask_id: Option<Ref>, img: &LogoImage) {
    let width = i32::try_from(img.width).unwrap_or(i32::MAX);
    let height = i32::try_from(img.height).unwrap_or(i32::MAX);

    let compressed = compress_to_vec_zlib(&img.rgb, 8);
    let mut image = pdf.image_xobject(logo_id, &compressed);
    image.filter(Filter::FlateDecode);
    image.width(width);
    image.height(height);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    if let Some(mask_id) = mask_id {
        image.s_mask(mask_id);
    }
    image.finish();

    if let (Some(mask_id), Some(alpha)) = (mask_id, img.alpha.as_ref()) {
        let compressed = compress_to_vec_zlib(alpha, 8);
        let mut mask = pdf.image_xobject(mask_id, &compressed);
        mask.filter(Filter::FlateDecode);
        mask.width(width);
        mask.height(height);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        mask.finish();
    }
}
