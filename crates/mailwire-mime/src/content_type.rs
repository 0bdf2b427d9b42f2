//! MIME content type and content disposition values.

use std::fmt;

/// Ordered MIME parameter list.
///
/// Names are stored exactly as received. Setting a name that is already
/// present replaces its value in place, so the list keeps encounter order
/// and the last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing an existing value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Gets a parameter by its exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Gets a parameter ignoring ASCII case, as RFC 2045 names are matched.
    #[must_use]
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over `(name, value)` pairs in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            // Quote value if it contains special characters
            if value.is_empty()
                || value.contains(|c: char| c.is_whitespace() || "()<>@,;:\\\"/[]?=".contains(c))
            {
                write!(f, "; {key}=\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))?;
            } else {
                write!(f, "; {key}={value}")?;
            }
        }
        Ok(())
    }
}

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters (e.g., charset=utf-8, boundary=xxx).
    pub parameters: Parameters,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: Parameters::new(),
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.set(key, value);
        self
    }

    /// Checks the type and subtype ignoring case; `*` matches anything.
    #[must_use]
    pub fn matches(&self, main_type: &str, sub_type: &str) -> bool {
        (main_type == "*" || self.main_type.eq_ignore_ascii_case(main_type))
            && (sub_type == "*" || self.sub_type.eq_ignore_ascii_case(sub_type))
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get_ignore_case("charset")
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters.get_ignore_case("boundary")
    }

    /// Returns the name parameter if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.parameters.get_ignore_case("name")
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("multipart")
    }

    /// Checks if this is a text content type.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("text")
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.main_type, self.sub_type, self.parameters)
    }
}

/// MIME content disposition (RFC 2183).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    /// Disposition token (e.g., "inline", "attachment").
    pub disposition: String,
    /// Disposition parameters (e.g., filename).
    pub parameters: Parameters,
}

impl ContentDisposition {
    /// Creates a disposition without parameters.
    #[must_use]
    pub fn new(disposition: impl Into<String>) -> Self {
        Self {
            disposition: disposition.into(),
            parameters: Parameters::new(),
        }
    }

    /// Returns true if the disposition is `attachment`.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.disposition.eq_ignore_ascii_case("attachment")
    }

    /// Returns the filename parameter if present.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.parameters.get_ignore_case("filename")
    }
}

impl fmt::Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.disposition, self.parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_keep_encounter_order() {
        let mut params = Parameters::new();
        params.set("b", "2");
        params.set("a", "1");
        let names: Vec<_> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_parameters_last_write_wins() {
        let mut params = Parameters::new();
        params.set("charset", "us-ascii");
        params.set("format", "flowed");
        params.set("charset", "utf-8");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("charset"), Some("utf-8"));
    }

    #[test]
    fn test_parameters_case_sensitive_keys() {
        let mut params = Parameters::new();
        params.set("CHARSET", "US-ASCII");
        params.set("charset", "utf-8");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("CHARSET"), Some("US-ASCII"));
        assert_eq!(params.get_ignore_case("Charset"), Some("US-ASCII"));
    }

    #[test]
    fn test_content_type_matches() {
        let ct = ContentType::new("TEXT", "PLAIN");
        assert!(ct.matches("text", "plain"));
        assert!(ct.matches("text", "*"));
        assert!(ct.matches("*", "*"));
        assert!(!ct.matches("message", "rfc822"));
        assert!(ct.is_text());
        assert!(!ct.is_multipart());
    }

    #[test]
    fn test_content_type_display() {
        let ct = ContentType::new("text", "plain").with_parameter("charset", "utf-8");
        assert_eq!(ct.to_string(), "text/plain; charset=utf-8");

        let ct = ContentType::new("multipart", "mixed").with_parameter("boundary", "a b");
        assert_eq!(ct.to_string(), "multipart/mixed; boundary=\"a b\"");
    }

    #[test]
    fn test_content_type_boundary() {
        let ct = ContentType::new("multipart", "mixed").with_parameter("BOUNDARY", "xyz");
        assert_eq!(ct.boundary(), Some("xyz"));
        assert_eq!(ct.charset(), None);
    }

    #[test]
    fn test_disposition_attachment() {
        let mut dsp = ContentDisposition::new("ATTACHMENT");
        dsp.parameters.set("filename", "report.pdf");
        assert!(dsp.is_attachment());
        assert_eq!(dsp.filename(), Some("report.pdf"));
        assert!(!ContentDisposition::new("inline").is_attachment());
    }
}
