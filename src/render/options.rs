//! Rendering options and configuration.

/// Options for rendering a document tree.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Maximum heading level (1-6)
    pub max_heading_level: u8,

    /// Prefix for image paths in output (e.g., "./images/")
    pub image_path_prefix: String,

    /// Render image items
    pub include_images: bool,

    /// Wrap small print in `<sub>` tags (Markdown only)
    pub small_text_tags: bool,

    /// Escape special Markdown characters in text items
    pub escape_special_chars: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Enable or disable image output.
    pub fn with_images(mut self, include: bool) -> Self {
        self.include_images = include;
        self
    }

    /// Enable or disable `<sub>` tags around small print.
    pub fn with_small_text_tags(mut self, enabled: bool) -> Self {
        self.small_text_tags = enabled;
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_heading_level: 6,
            image_path_prefix: String::new(),
            include_images: true,
            small_text_tags: true,
            escape_special_chars: false,
        }
    }
}
