//! # danfe
//!
//! DANFE generation library for Rust.
//!
//! Takes the raw XML of a Brazilian electronic invoice (NF-e) and renders
//! the DANFE, the standardized A4 paper representation, as a PDF.
//!
//! ## Quick Start
//!
//! ```no_run
//! use danfe::render_file;
//!
//! fn main() -> danfe::Result<()> {
//!     let rendered = render_file("nota.xml")?;
//!     rendered.save_to(".")?;
//!     println!("wrote {} ({} pages)", rendered.filename, rendered.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Producer-tolerant parsing**: namespace and prefix variations across
//!   emitter software are irrelevant; elements are matched by local name
//! - **Graceful degradation**: only a missing `infNFe` section is fatal,
//!   every other absent field renders as an empty box
//! - **Print-accurate layout**: fixed A4 geometry with Code 128 access-key
//!   barcode and Brazilian number and date formatting
//! - **Pagination**: item overflow continues onto follow-up pages, or can
//!   be truncated to a single page
//! - **Parallel batch rendering**: uses Rayon when rendering many notes

pub mod detect;
pub mod error;
pub mod format;
pub mod model;
pub mod render;
pub mod xml;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use detect::{detect_kind, is_nfe_xml, DocKind};
pub use error::{Error, Result};
pub use model::{
    AdditionalInfo, Address, DanfeFields, IcmsDetail, IcmsRegime, Identification, LineItem, Party,
    Protocol, Totals, Transport,
};
pub use render::{
    render_danfe, DanfeRenderer, OverflowPolicy, RenderOptions, RenderedDanfe,
};
pub use xml::{extract_fields, extract_from_document};

use std::path::Path;

use rayon::prelude::*;

/// Render a DANFE from NF-e XML text.
///
/// # Example
///
/// ```no_run
/// use danfe::render_str;
///
/// let xml = std::fs::read_to_string("nota.xml").unwrap();
/// let rendered = render_str(&xml).unwrap();
/// std::fs::write(&rendered.filename, &rendered.bytes).unwrap();
/// ```
pub fn render_str(xml: &str) -> Result<RenderedDanfe> {
    render_str_with_options(xml, &RenderOptions::default())
}

/// Render a DANFE from NF-e XML text with custom options.
///
/// # Example
///
/// ```no_run
/// use danfe::{render_str_with_options, RenderOptions};
///
/// let xml = std::fs::read_to_string("nota.xml").unwrap();
/// let options = RenderOptions::new().single_page();
/// let rendered = render_str_with_options(&xml, &options).unwrap();
/// ```
pub fn render_str_with_options(xml: &str, options: &RenderOptions) -> Result<RenderedDanfe> {
    let fields = xml::extract_fields(xml)?;
    render::render_danfe(&fields, options)
}

/// Render a DANFE from an NF-e XML file.
pub fn render_file<P: AsRef<Path>>(path: P) -> Result<RenderedDanfe> {
    render_file_with_options(path, &RenderOptions::default())
}

/// Render a DANFE from an NF-e XML file with custom options.
pub fn render_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &RenderOptions,
) -> Result<RenderedDanfe> {
    let xml = std::fs::read_to_string(path)?;
    render_str_with_options(&xml, options)
}

/// Extract the DANFE field set from an NF-e XML file without rendering.
pub fn fields_from_file<P: AsRef<Path>>(path: P) -> Result<DanfeFields> {
    let xml = std::fs::read_to_string(path)?;
    xml::extract_fields(&xml)
}

/// Serialize the extracted field set as JSON for inspection.
///
/// # Example
///
/// ```no_run
/// use danfe::inspect_json;
///
/// let xml = std::fs::read_to_string("nota.xml").unwrap();
/// println!("{}", inspect_json(&xml, true).unwrap());
/// ```
pub fn inspect_json(xml: &str, pretty: bool) -> Result<String> {
    let fields = xml::extract_fields(xml)?;
    let json = if pretty {
        serde_json::to_string_pretty(&fields)
    } else {
        serde_json::to_string(&fields)
    };
    json.map_err(|e| Error::Other(e.to_string()))
}

/// Render many NF-e XML files in parallel.
///
/// Results are returned in input order; one bad file never aborts the
/// batch.
///
/// # Example
///
/// ```no_run
/// use danfe::{render_batch, RenderOptions};
///
/// let paths = ["a.xml", "b.xml", "c.xml"];
/// for result in render_batch(&paths, &RenderOptions::default()) {
///     match result {
///         Ok(rendered) => { rendered.save_to("out").unwrap(); }
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// ```
pub fn render_batch<P: AsRef<Path> + Sync>(
    paths: &[P],
    options: &RenderOptions,
) -> Vec<Result<RenderedDanfe>> {
    paths
        .par_iter()
        .map(|path| render_file_with_options(path, options))
        .collect()
}

/// Builder for extracting and rendering DANFEs.
///
/// # Example
///
/// ```no_run
/// use danfe::Danfe;
///
/// let bytes = Danfe::new()
///     .single_page()
///     .with_title("NF 951354")
///     .parse_file("nota.xml")?
///     .to_pdf()?
///     .bytes;
/// # Ok::<(), danfe::Error>(())
/// ```
pub struct Danfe {
    options: RenderOptions,
}

impl Danfe {
    /// Create a new Danfe builder.
    pub fn new() -> Self {
        Self {
            options: RenderOptions::default(),
        }
    }

    /// Truncate items to a single page instead of paginating.
    pub fn single_page(mut self) -> Self {
        self.options = self.options.single_page();
        self
    }

    /// Set the overflow policy.
    pub fn with_overflow(mut self, policy: OverflowPolicy) -> Self {
        self.options = self.options.with_overflow(policy);
        self
    }

    /// Set the PDF title metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.options = self.options.with_title(title);
        self
    }

    /// Extract fields from XML text and return a result wrapper.
    pub fn parse_str(self, xml: &str) -> Result<DanfeResult> {
        let fields = xml::extract_fields(xml)?;
        Ok(DanfeResult {
            fields,
            options: self.options,
        })
    }

    /// Extract fields from an XML file.
    pub fn parse_file<P: AsRef<Path>>(self, path: P) -> Result<DanfeResult> {
        let xml = std::fs::read_to_string(path)?;
        self.parse_str(&xml)
    }
}

impl Default for Danfe {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of extracting an NF-e document.
pub struct DanfeResult {
    /// The extracted field set
    pub fields: DanfeFields,
    /// Render options to use
    options: RenderOptions,
}

impl DanfeResult {
    /// Render the PDF.
    pub fn to_pdf(&self) -> Result<RenderedDanfe> {
        render::render_danfe(&self.fields, &self.options)
    }

    /// Serialize the fields as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(&self.fields)
        } else {
            serde_json::to_string(&self.fields)
        };
        json.map_err(|e| Error::Other(e.to_string()))
    }

    /// Get the extracted fields.
    pub fn fields(&self) -> &DanfeFields {
        &self.fields
    }
}
