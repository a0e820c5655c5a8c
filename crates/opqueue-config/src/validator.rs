//! Configuration validation.

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::validate_queue(config, &mut result);
        Self::validate_logging(config, &mut result);
        result
    }

    fn validate_queue(config: &Config, result: &mut ValidationResult) {
        let queue = &config.queue;

        if queue.max_workers == 0 {
            result.add_error(ValidationError::new(
                "queue.max_workers",
                "max_workers must be greater than 0",
            ));
        }

        if queue.min_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "queue.min_timeout_ms",
                "min_timeout_ms must be greater than 0",
            ));
        }

        if queue.default_timeout_ms < queue.min_timeout_ms {
            result.add_error(ValidationError::new(
                "queue.default_timeout_ms",
                format!(
                    "default_timeout_ms ({}) is below min_timeout_ms ({})",
                    queue.default_timeout_ms, queue.min_timeout_ms
                ),
            ));
        }

        if queue.auto_cleanup_threshold > 0 && queue.keep_completed >= queue.auto_cleanup_threshold {
            result.add_warning(ValidationWarning::new(
                "queue.keep_completed",
                "keep_completed is not below auto_cleanup_threshold, auto-cleanup will rarely free space",
            ));
        }

        if queue.max_queue_size > 0 && queue.auto_cleanup_threshold > queue.max_queue_size {
            result.add_warning(ValidationWarning::new(
                "queue.auto_cleanup_threshold",
                "auto_cleanup_threshold exceeds max_queue_size and will never trigger",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "Log level cannot be empty",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
