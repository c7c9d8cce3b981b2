use imgbed_core::constants::{is_supported_image_type, SUPPORTED_IMAGE_TYPES};
use imgbed_core::{format_file_size, SelectedFile, UploadLimits};
use serde::{Deserialize, Serialize};

/// Pre-flight validation errors. Nothing has been processed or sent when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Too many files: {count} selected, at most {max} files per batch")]
    TooManyFiles { count: usize, max: usize },

    #[error("Batch too large: total size {} exceeds the limit of {}", human_size(.total), human_size(.max))]
    BatchTooLarge { total: u64, max: u64 },

    #[error("Unsupported file type: {mime_type}. Supported types: {}", SUPPORTED_IMAGE_TYPES.join(", "))]
    UnsupportedType { mime_type: String },

    #[error("File too large: {} (max: {})", human_size(.size), human_size(.max))]
    FileTooLarge { size: u64, max: u64 },

    #[error("File name must not be empty")]
    EmptyName,

    /// A per-file failure inside a batch. `position` is 1-based.
    #[error("File #{position} ({name}): {source}")]
    InBatch {
        position: usize,
        name: String,
        #[source]
        source: Box<ValidationError>,
    },
}

fn human_size(bytes: &u64) -> String {
    format_file_size(*bytes)
}

/// `{valid, reason}` view of a validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Result<(), ValidationError>> for ValidationResult {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self {
                valid: true,
                reason: None,
            },
            Err(e) => Self {
                valid: false,
                reason: Some(e.to_string()),
            },
        }
    }
}

/// Upload validator
///
/// Pure function of its input and the configured limits. Batch-level checks
/// run before any per-file check, and the first failure wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    limits: UploadLimits,
}

impl Validator {
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Validate content type
    pub fn validate_content_type(&self, mime_type: &str) -> Result<(), ValidationError> {
        if !is_supported_image_type(mime_type) {
            return Err(ValidationError::UnsupportedType {
                mime_type: mime_type.to_string(),
            });
        }
        Ok(())
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.limits.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.limits.max_file_size,
            });
        }
        Ok(())
    }

    /// Validate file name
    pub fn validate_name(&self, name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    /// Type, then size, then name.
    pub fn validate_file(&self, file: &SelectedFile) -> Result<(), ValidationError> {
        self.validate_content_type(&file.mime_type)?;
        self.validate_file_size(file.byte_size)?;
        self.validate_name(&file.name)?;
        Ok(())
    }

    /// Count, then total size, then every file in order.
    pub fn validate_batch(&self, files: &[SelectedFile]) -> Result<(), ValidationError> {
        if files.len() > self.limits.max_batch_count {
            return Err(ValidationError::TooManyFiles {
                count: files.len(),
                max: self.limits.max_batch_count,
            });
        }

        let total: u64 = files.iter().map(|f| f.byte_size).sum();
        if total > self.limits.max_batch_size {
            return Err(ValidationError::BatchTooLarge {
                total,
                max: self.limits.max_batch_size,
            });
        }

        for (i, file) in files.iter().enumerate() {
            if let Err(e) = self.validate_file(file) {
                tracing::debug!(position = i + 1, name = %file.name, error = %e, "Batch rejected");
                return Err(ValidationError::InBatch {
                    position: i + 1,
                    name: file.name.clone(),
                    source: Box::new(e),
                });
            }
        }

        Ok(())
    }

    pub fn check_file(&self, file: &SelectedFile) -> ValidationResult {
        self.validate_file(file).into()
    }

    pub fn check_batch(&self, files: &[SelectedFile]) -> ValidationResult {
        self.validate_batch(files).into()
    }
}
