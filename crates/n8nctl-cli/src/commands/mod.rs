//! CLI command implementations.

pub mod credential;
pub mod execution;
pub mod tag;
pub mod webhook;
pub mod workflow;

use n8nctl_api::ApiError;

/// Report an API error and return the exit code.
///
/// Non-2xx responses always surface the raw body, not just the extracted
/// message.
pub(crate) fn fail(err: ApiError, json: bool) -> i32 {
    if json {
        println!("{}", serde_json::json!({ "error": err.to_string() }));
    } else {
        eprintln!("Error: {}", err);
        if let ApiError::Api { body, message, .. } = &err {
            if !body.is_empty() && body.trim() != message {
                eprintln!("{}", body);
            }
        }
    }
    1
}

/// Read and parse a JSON document from a file.
pub(crate) fn read_document(path: &std::path::Path) -> Result<serde_json::Value, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"name\": \"Demo\", \"nodes\": []}}").unwrap();

        let document = read_document(file.path()).unwrap();
        assert_eq!(document["name"], "Demo");
    }

    #[test]
    fn test_read_document_errors_name_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = read_document(file.path()).unwrap_err();
        assert!(err.contains(&file.path().display().to_string()));

        let err = read_document(std::path::Path::new("/no/such/file.json")).unwrap_err();
        assert!(err.contains("/no/such/file.json"));
    }
}
