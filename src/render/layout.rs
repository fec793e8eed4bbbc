//! Page geometry and drawing primitives.
//!
//! The page is addressed in millimeters from the top-left corner; every
//! primitive converts to printpdf's bottom-left origin internally. Section
//! positions are never absolute constants: callers accumulate a [`Cursor`]
//! from the top margin, so the layout scales consistently if the margins
//! change.

use printpdf::{
    Image, ImageTransform, IndirectFontRef, Line, Mm, PdfLayerReference, Point,
};

use crate::format::{self, PT_TO_MM};

/// A4 portrait.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
/// Margin on all four sides.
pub const MARGIN_MM: f32 = 8.0;
/// Usable content width between the side margins.
pub const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

/// Dots per inch the barcode raster is embedded at.
const IMAGE_DPI: f32 = 300.0;
/// Pixel edge length in millimeters at [`IMAGE_DPI`].
const PX_TO_MM: f32 = 25.4 / IMAGE_DPI;

/// Label font size inside boxes, points.
const LABEL_SIZE_PT: f32 = 4.5;
/// Default value font size inside boxes, points.
const VALUE_SIZE_PT: f32 = 6.5;

/// Horizontal alignment of a value within its box or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Right,
    Center,
}

/// Vertical offset from the top of the page, in millimeters.
///
/// Threaded by value through every drawing call: each section takes the
/// cursor it should start at and returns the cursor below what it drew.
/// There is no hidden mutable position shared between sections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor(f32);

impl Cursor {
    /// Cursor at the top margin of a fresh page.
    pub fn top() -> Self {
        Cursor(MARGIN_MM)
    }

    /// Cursor at an explicit offset from the page top.
    pub fn at(y_mm: f32) -> Self {
        Cursor(y_mm)
    }

    /// Offset from the page top in millimeters.
    pub fn y(self) -> f32 {
        self.0
    }

    /// A cursor `dy_mm` further down the page.
    pub fn advance(self, dy_mm: f32) -> Self {
        Cursor(self.0 + dy_mm)
    }
}

/// Drawing surface for one page: a printpdf layer plus the two fonts every
/// DANFE section uses. Owned by a single render call; a fresh canvas is
/// created per page so concurrent renders never share drawing state.
pub struct Canvas {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Canvas {
    pub fn new(layer: PdfLayerReference, regular: IndirectFontRef, bold: IndirectFontRef) -> Self {
        layer.set_outline_thickness(0.4);
        Self {
            layer,
            regular,
            bold,
        }
    }

    fn font(&self, bold: bool) -> &IndirectFontRef {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    /// Estimated rendered width of `text` in millimeters.
    fn text_width_mm(text: &str, size_pt: f32) -> f32 {
        text.chars().count() as f32 * size_pt * PT_TO_MM * 0.5
    }

    /// Place text with its baseline `baseline_mm` below the page top.
    pub fn text(&self, text: &str, size_pt: f32, x_mm: f32, baseline_mm: f32, bold: bool) {
        if text.is_empty() {
            return;
        }
        self.layer.use_text(
            text,
            size_pt,
            Mm(x_mm),
            Mm(PAGE_HEIGHT_MM - baseline_mm),
            self.font(bold),
        );
    }

    /// Place text aligned within the horizontal span `[x_mm, x_mm + w_mm]`.
    pub fn text_aligned(
        &self,
        text: &str,
        size_pt: f32,
        x_mm: f32,
        w_mm: f32,
        baseline_mm: f32,
        align: HAlign,
        bold: bool,
    ) {
        let width = Self::text_width_mm(text, size_pt);
        let x = match align {
            HAlign::Left => x_mm,
            HAlign::Right => x_mm + (w_mm - width).max(0.0),
            HAlign::Center => x_mm + ((w_mm - width) / 2.0).max(0.0),
        };
        self.text(text, size_pt, x, baseline_mm, bold);
    }

    /// Stroke a rectangle whose top-left corner is `(x_mm, y_mm)` from the
    /// page's top-left.
    pub fn rect(&self, x_mm: f32, y_mm: f32, w_mm: f32, h_mm: f32) {
        let top = PAGE_HEIGHT_MM - y_mm;
        let bottom = PAGE_HEIGHT_MM - y_mm - h_mm;
        let points = vec![
            (Point::new(Mm(x_mm), Mm(bottom)), false),
            (Point::new(Mm(x_mm + w_mm), Mm(bottom)), false),
            (Point::new(Mm(x_mm + w_mm), Mm(top)), false),
            (Point::new(Mm(x_mm), Mm(top)), false),
        ];
        let outline = Line {
            points,
            is_closed: true,
        };
        self.layer.add_line(outline);
    }

    /// Horizontal rule at `y_mm` from the page top.
    pub fn hline(&self, x1_mm: f32, x2_mm: f32, y_mm: f32) {
        self.line(x1_mm, y_mm, x2_mm, y_mm);
    }

    /// Vertical rule from `y1_mm` down to `y2_mm`.
    pub fn vline(&self, x_mm: f32, y1_mm: f32, y2_mm: f32) {
        self.line(x_mm, y1_mm, x_mm, y2_mm);
    }

    fn line(&self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(PAGE_HEIGHT_MM - y1)), false),
                (Point::new(Mm(x2), Mm(PAGE_HEIGHT_MM - y2)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    /// Draw a labeled field box: bordered rectangle, small-caps label in
    /// the top-left corner, and the (truncated) value near the bottom per
    /// the given alignment. Advances nothing; the caller owns the cursor.
    pub fn draw_box(
        &self,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
        label: &str,
        value: &str,
        align: HAlign,
    ) {
        self.rect(x_mm, y_mm, w_mm, h_mm);
        let label = format::truncate(
            &label.to_uppercase(),
            format::max_chars(w_mm - 1.6, LABEL_SIZE_PT),
        );
        self.text(&label, LABEL_SIZE_PT, x_mm + 0.8, y_mm + 2.4, false);
        let value = format::truncate(value, format::max_chars(w_mm - 1.6, VALUE_SIZE_PT));
        self.text_aligned(
            &value,
            VALUE_SIZE_PT,
            x_mm + 0.8,
            w_mm - 1.6,
            y_mm + h_mm - 1.4,
            align,
            false,
        );
    }

    /// Draw a bold label marking a logical section boundary; no box.
    pub fn section_header(&self, y_mm: f32, text: &str) {
        self.text(&text.to_uppercase(), 6.0, MARGIN_MM, y_mm + 3.6, true);
    }

    /// Embed an image scaled to fill the target rectangle.
    pub fn image(&self, image: &printpdf::image_crate::DynamicImage, x_mm: f32, y_mm: f32, w_mm: f32, h_mm: f32) {
        let natural_w = image.width() as f32 * PX_TO_MM;
        let natural_h = image.height() as f32 * PX_TO_MM;
        if natural_w <= 0.0 || natural_h <= 0.0 {
            return;
        }
        let pdf_image = Image::from_dynamic_image(image);
        pdf_image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x_mm)),
                translate_y: Some(Mm(PAGE_HEIGHT_MM - y_mm - h_mm)),
                rotate: None,
                scale_x: Some(w_mm / natural_w),
                scale_y: Some(h_mm / natural_h),
                dpi: Some(IMAGE_DPI),
            },
        );
    }
}
