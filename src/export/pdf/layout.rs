use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Page geometry of the paginated format, in PDF points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Body text size
    pub font_size: f32,
    /// Section and sub-heading size
    pub heading_size: f32,
    /// Line advance as a multiple of the font size
    pub line_height_factor: f32,
    /// Distance of the page-number baseline from the bottom edge
    pub footer_baseline: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        // A4 portrait with one-inch margins
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin_top: 72.0,
            margin_bottom: 72.0,
            margin_left: 72.0,
            margin_right: 72.0,
            font_size: 11.0,
            heading_size: 14.0,
            line_height_factor: 1.5,
            footer_baseline: 36.0,
        }
    }
}

impl PageLayout {
    /// Width available to text
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Line advance for text of `size`
    pub fn line_height(&self, size: f32) -> f32 {
        size * self.line_height_factor
    }

    /// Lowest y (measured from the top) a line may reach
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin_bottom
    }

    /// Check that at least one heading line fits on a page
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.page_width,
            self.page_height,
            self.font_size,
            self.heading_size,
            self.line_height_factor,
        ];
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(anyhow!("export.page dimensions and font sizes must be positive"));
        }

        let margins = [self.margin_top, self.margin_bottom, self.margin_left, self.margin_right];
        if margins.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(anyhow!("export.page margins must not be negative"));
        }

        if self.content_width() <= 0.0 {
            return Err(anyhow!("export.page margins leave no horizontal space"));
        }

        let tallest = self.line_height(self.font_size.max(self.heading_size));
        if self.margin_top + tallest > self.bottom_limit() {
            return Err(anyhow!("export.page margins leave no room for a single line"));
        }

        if self.footer_baseline < 0.0 || self.footer_baseline > self.page_height {
            return Err(anyhow!("export.page footer_baseline is outside the page"));
        }

        Ok(())
    }
}
