use crate::config::AppConfig;
use crate::error::{BomcodeError, BomcodeResult};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

pub fn validate_model<T: Validate>(model: &T) -> BomcodeResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(BomcodeError::validation("config", error_messages))
        }
    }
}

/// Flattens nested validation errors into `section.field: message` pairs
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.join(", ")
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(message) => format!("{}: {}", path, message),
                        None => format!("{}: validation failed ({})", path, error.code),
                    };
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(&path, nested, messages),
            ValidationErrorsKind::List(items) => {
                for (idx, nested) in items {
                    collect_messages(&format!("{}[{}]", path, idx), nested, messages);
                }
            }
        }
    }
}

pub fn validate_config(config: &AppConfig) -> BomcodeResult<()> {
    validate_model(config)?;

    if config.enrichment.identifier_column.trim() == config.enrichment.result_column.trim() {
        return Err(BomcodeError::validation(
            "enrichment.result_column",
            "Result column must differ from the identifier column",
        ));
    }

    Ok(())
}
