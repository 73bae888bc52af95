//! Consistent color theme and styling for terminal output.

use crate::catalog::NamedTypeKind;
use console::Style;
use owo_colors::OwoColorize;
use std::sync::LazyLock;

/// Global theme instance for consistent styling across the application.
pub static THEME: LazyLock<Theme> = LazyLock::new(Theme::default);

/// Color theme for terminal output.
#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub error: Style,
    pub warning: Style,
    /// File paths
    pub path: Style,
    /// Numbers and metrics
    pub number: Style,
    pub documented: Style,
    pub external: Style,
    pub local: Style,
    pub tuple: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Style::new().green().bright(),
            error: Style::new().red().bright(),
            warning: Style::new().yellow().bright(),
            path: Style::new().magenta(),
            number: Style::new().cyan(),
            documented: Style::new().green().bold(),
            external: Style::new().blue(),
            local: Style::new().yellow(),
            tuple: Style::new().magenta(),
        }
    }
}

impl Theme {
    /// Format a success message with checkmark.
    pub fn success_with_icon(&self, text: &str) -> String {
        if Self::should_disable_colors() {
            format!("✓ {text}")
        } else {
            format!("{} {}", "✓".green(), self.success.apply_to(text))
        }
    }

    /// Format an error message with X mark.
    pub fn error_with_icon(&self, text: &str) -> String {
        if Self::should_disable_colors() {
            format!("✗ {text}")
        } else {
            format!("{} {}", "✗".red(), self.error.apply_to(text))
        }
    }

    /// Format a warning message with warning sign.
    pub fn warning_with_icon(&self, text: &str) -> String {
        if Self::should_disable_colors() {
            format!("⚠ {text}")
        } else {
            format!("{} {}", "⚠".yellow(), self.warning.apply_to(text))
        }
    }

    /// Check if color output should be disabled.
    pub fn should_disable_colors() -> bool {
        use is_terminal::IsTerminal;
        std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal()
    }

    /// Style used for named types of `kind`
    pub fn kind_style(&self, kind: NamedTypeKind) -> &Style {
        match kind {
            NamedTypeKind::Documented => &self.documented,
            NamedTypeKind::External => &self.external,
            NamedTypeKind::Local => &self.local,
            NamedTypeKind::Tuple => &self.tuple,
        }
    }

    /// Apply theme styling conditionally based on terminal support.
    pub fn apply<T: std::fmt::Display>(&self, style: &Style, text: T) -> String {
        if Self::should_disable_colors() {
            text.to_string()
        } else {
            style.apply_to(text).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icons_keep_text() {
        let theme = Theme::default();
        assert!(theme.success_with_icon("Saved").contains("Saved"));
        assert!(theme.error_with_icon("Failed").contains("Failed"));
        assert!(theme.apply(&theme.number, 42).contains("42"));
    }

    #[test]
    fn test_kind_styles_keep_kind_name() {
        let theme = Theme::default();
        let text = theme.apply(
            theme.kind_style(NamedTypeKind::Tuple),
            NamedTypeKind::Tuple.as_str(),
        );
        assert!(text.contains(NamedTypeKind::Tuple.as_str()));
    }
}
