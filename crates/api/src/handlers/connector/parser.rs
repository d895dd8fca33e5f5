use crate::errors::ApiError;
use axum::extract::Multipart;
use blobfinder_driver::UploadFile;
use std::collections::HashMap;
use std::str::FromStr;

/// Field name carrying uploaded files
const UPLOAD_FIELD: &str = "upload";

/// Parameters of one connector request, merged from the query string and body
#[derive(Debug, Default)]
pub struct ConnectorRequest {
    params: HashMap<String, Vec<String>>,
    pub(super) uploads: Vec<UploadFile>,
}

impl ConnectorRequest {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut request = Self::default();
        request.extend(pairs);
        request
    }

    /// Reads a multipart body: file fields named `upload[]` become uploads,
    /// every other field is a plain parameter
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut request = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::error!("Multipart parsing error: {}", e);
            ApiError::MalformedRequest(e.to_string())
        })? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) if strip_brackets(&name) == UPLOAD_FIELD => {
                    let data = field.bytes().await.map_err(|e| {
                        tracing::error!("Failed to read upload {}: {}", file_name, e);
                        ApiError::MalformedRequest(e.to_string())
                    })?;

                    tracing::debug!("Received upload {} ({} bytes)", file_name, data.len());
                    request.uploads.push(UploadFile { name: file_name, data });
                }
                Some(file_name) => {
                    tracing::warn!("Ignoring file {} in field {}", file_name, name);
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| ApiError::MalformedRequest(e.to_string()))?;
                    request.push(&name, value);
                }
            }
        }

        Ok(request)
    }

    pub fn extend(&mut self, pairs: Vec<(String, String)>) {
        for (name, value) in pairs {
            self.push(&name, value);
        }
    }

    /// `targets[]` and `targets` address the same parameter
    pub fn push(&mut self, name: &str, value: String) {
        self.params
            .entry(strip_brackets(name).to_string())
            .or_default()
            .push(value);
    }

    /// First non-empty value of a parameter
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values(name)
            .iter()
            .map(String::as_str)
            .find(|v| !v.is_empty())
    }

    pub fn required(&self, name: &'static str) -> Result<&str, ApiError> {
        self.get(name).ok_or(ApiError::MissingParameter(name))
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.params.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.optional_flag(name).unwrap_or(false)
    }

    pub fn optional_flag(&self, name: &str) -> Option<bool> {
        self.get(name).map(|v| matches!(v, "1" | "true"))
    }

    pub fn number<T: FromStr>(&self, name: &'static str) -> Result<T, ApiError> {
        let value = self.required(name)?;
        value.trim().parse().map_err(|_| ApiError::InvalidParameter {
            name,
            value: value.to_string(),
        })
    }

    pub fn uploads(&self) -> &[UploadFile] {
        &self.uploads
    }
}

fn strip_brackets(name: &str) -> &str {
    name.strip_suffix("[]").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(pairs: &[(&str, &str)]) -> ConnectorRequest {
        ConnectorRequest::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn array_parameters_merge_with_plain_names() {
        let req = request(&[("targets[]", "a1_x"), ("targets", "a1_y"), ("cmd", "rm")]);
        assert_eq!(req.values("targets"), ["a1_x", "a1_y"]);
        assert_eq!(req.get("cmd"), Some("rm"));
        assert!(req.values("mimes").is_empty());
    }

    #[test]
    fn empty_values_count_as_missing() {
        let req = request(&[("target", ""), ("name", "")]);
        assert_eq!(req.get("target"), None);
        assert!(matches!(req.required("name"), Err(ApiError::MissingParameter("name"))));
    }

    #[test]
    fn flags_and_numbers() {
        let req = request(&[("init", "1"), ("tree", "0"), ("cut", "true"), ("width", "120"), ("degree", "x")]);
        assert!(req.flag("init"));
        assert!(!req.flag("tree"));
        assert!(req.flag("cut"));
        assert!(!req.flag("download"));
        assert_eq!(req.optional_flag("overwrite"), None);
        assert_eq!(req.number::<u32>("width").unwrap(), 120);
        assert!(matches!(
            req.number::<i32>("degree"),
            Err(ApiError::InvalidParameter { name: "degree", .. })
        ));
        assert!(matches!(req.number::<u32>("height"), Err(ApiError::MissingParameter("height"))));
    }
}
