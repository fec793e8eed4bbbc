//! Rendering options.

/// Options for rendering a DANFE.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// What to do when line items exceed one page.
    pub overflow: OverflowPolicy,

    /// PDF document title metadata.
    pub title: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overflow policy.
    pub fn with_overflow(mut self, policy: OverflowPolicy) -> Self {
        self.overflow = policy;
        self
    }

    /// Truncate items to a single page instead of paginating.
    pub fn single_page(mut self) -> Self {
        self.overflow = OverflowPolicy::Truncate;
        self
    }

    /// Set the PDF title metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            overflow: OverflowPolicy::Paginate,
            title: "DANFE".to_string(),
        }
    }
}

/// What happens to line items that do not fit on one page.
///
/// Never an error either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Continue onto further pages, repeating header and footer.
    #[default]
    Paginate,
    /// Single-page output: rows beyond the page capacity are dropped.
    Truncate,
}
