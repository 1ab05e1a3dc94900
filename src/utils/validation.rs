use crate::utils::error::{DeskError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DeskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DeskError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DeskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DeskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DeskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeskError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

// 以下為表單欄位驗證，錯誤一律回報為 ValidationError

pub fn validate_required<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| DeskError::validation(field_name, format!("{} is required", field_name)))
}

pub fn validate_required_text<'a>(field_name: &str, value: &'a Option<String>) -> Result<&'a str> {
    let text = validate_required(field_name, value)?.trim();
    if text.is_empty() {
        return Err(DeskError::validation(
            field_name,
            format!("{} cannot be empty", field_name),
        ));
    }
    Ok(text)
}

pub fn validate_positive_amount(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DeskError::validation(
            field_name,
            format!("{} must be greater than zero, got {}", field_name, value),
        ));
    }
    Ok(())
}

pub fn validate_file_extension(field_name: &str, file_name: &str, allowed_extensions: &[&str]) -> Result<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if allowed_extensions.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(DeskError::validation(
            field_name,
            format!(
                "Unsupported file type: {}. Allowed types: {}",
                ext,
                allowed_extensions.join(", ")
            ),
        )),
        None => Err(DeskError::validation(
            field_name,
            format!("'{}' has no extension", file_name),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("sheets.api_base", "https://sheets.googleapis.com").is_ok());
        assert!(validate_url("sheets.api_base", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("sheets.api_base", "").is_err());
        assert!(validate_url("sheets.api_base", "invalid-url").is_err());
        assert!(validate_url("sheets.api_base", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_required_text() {
        assert_eq!(
            validate_required_text("customer_name", &Some("  Asha ".to_string())).unwrap(),
            "Asha"
        );
        assert!(validate_required_text("customer_name", &Some("   ".to_string())).is_err());
        assert!(matches!(
            validate_required_text("customer_name", &None),
            Err(DeskError::ValidationError { field, .. }) if field == "customer_name"
        ));
    }

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount("amount", 250000.0).is_ok());
        assert!(validate_positive_amount("amount", 0.0).is_err());
        assert!(validate_positive_amount("roi", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        let allowed = ["png", "jpg", "jpeg", "pdf"];
        assert!(validate_file_extension("certificate", "cert.PDF", &allowed).is_ok());
        assert!(validate_file_extension("certificate", "scan.jpeg", &allowed).is_ok());
        assert!(validate_file_extension("certificate", "notes.txt", &allowed).is_err());
        assert!(validate_file_extension("certificate", "README", &allowed).is_err());
    }
}
