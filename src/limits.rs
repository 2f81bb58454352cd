// Analyzer resource limits
//
// Bounds pathological input (deeply nested expressions, oversized files)
// so analysis degrades into a diagnostic instead of a stack overflow or
// memory exhaustion. All limits have permissive defaults and can be
// overridden from analyzer.toml.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct AnalyzerLimits {
    // Tokenizer limits
    pub max_input_size: usize,        // Maximum source size in bytes
    pub max_token_count: usize,       // Maximum number of tokens per input
    pub max_identifier_length: usize, // Maximum identifier length in bytes
    pub max_string_length: usize,     // Maximum string literal length in bytes
    pub max_comment_length: usize,    // Maximum comment length in bytes

    // Parser limits
    pub max_expr_depth: usize, // Maximum expression recursion depth
}

impl Default for AnalyzerLimits {
    fn default() -> Self {
        Self {
            max_input_size: 10_000_000, // 10 MB
            max_token_count: 100_000,
            max_identifier_length: 1_000,
            max_string_length: 100_000,
            max_comment_length: 100_000,
            max_expr_depth: 256,
        }
    }
}

impl AnalyzerLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load limits from analyzer.toml, falling back to defaults.
    ///
    /// Returns an error only if the TOML is malformed, not if the file is
    /// missing.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, LimitError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| LimitError {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        let config: AnalyzerConfig = toml::from_str(&content).map_err(|e| LimitError {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;

        // Only override the values the file specifies
        let mut limits = Self::default();

        if let Some(limits_config) = config.limits {
            if let Some(v) = limits_config.max_input_size {
                limits.max_input_size = v;
            }
            if let Some(v) = limits_config.max_token_count {
                limits.max_token_count = v;
            }
            if let Some(v) = limits_config.max_identifier_length {
                limits.max_identifier_length = v;
            }
            if let Some(v) = limits_config.max_string_length {
                limits.max_string_length = v;
            }
            if let Some(v) = limits_config.max_comment_length {
                limits.max_comment_length = v;
            }
            if let Some(v) = limits_config.max_expr_depth {
                limits.max_expr_depth = v;
            }
        }

        Ok(limits)
    }

    /// Validate that all limits are positive and not absurdly large
    pub fn validate(&self) -> Result<(), LimitError> {
        const MAX_REASONABLE: usize = 100_000_000; // 100 MB

        if self.max_input_size == 0 || self.max_input_size > MAX_REASONABLE {
            return Err(LimitError::invalid("max_input_size", self.max_input_size));
        }

        if self.max_token_count == 0 {
            return Err(LimitError::invalid("max_token_count", self.max_token_count));
        }

        if self.max_identifier_length == 0 || self.max_identifier_length > 100_000 {
            return Err(LimitError::invalid(
                "max_identifier_length",
                self.max_identifier_length,
            ));
        }

        if self.max_string_length == 0 || self.max_string_length > MAX_REASONABLE {
            return Err(LimitError::invalid(
                "max_string_length",
                self.max_string_length,
            ));
        }

        if self.max_comment_length == 0 || self.max_comment_length > MAX_REASONABLE {
            return Err(LimitError::invalid(
                "max_comment_length",
                self.max_comment_length,
            ));
        }

        if self.max_expr_depth == 0 || self.max_expr_depth > 10_000 {
            return Err(LimitError::invalid("max_expr_depth", self.max_expr_depth));
        }

        Ok(())
    }
}

/// TOML configuration structures for deserialization
#[derive(Debug, Deserialize)]
struct AnalyzerConfig {
    limits: Option<LimitsConfig>,
}

#[derive(Debug, Deserialize)]
struct LimitsConfig {
    max_input_size: Option<usize>,
    max_token_count: Option<usize>,
    max_identifier_length: Option<usize>,
    max_string_length: Option<usize>,
    max_comment_length: Option<usize>,
    max_expr_depth: Option<usize>,
}

/// Error type for limit validation and loading
#[derive(Debug, Clone)]
pub struct LimitError {
    pub message: String,
}

impl LimitError {
    fn invalid(name: &str, value: usize) -> Self {
        Self {
            message: format!(
                "Invalid limit '{}': {} (must be positive and reasonable)",
                name, value
            ),
        }
    }
}

impl std::fmt::Display for LimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Limit error: {}", self.message)
    }
}

impl std::error::Error for LimitError {}
