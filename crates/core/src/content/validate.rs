/// Content row validation.
use std::collections::HashSet;

use thiserror::Error;

use super::row::ContentRow;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("page identifier cannot be empty")]
    EmptyPage,
    #[error("page identifier '{0}' may only contain lowercase letters, digits and '-'")]
    InvalidPage(String),
    #[error("section cannot be empty")]
    EmptySection,
    #[error("content key cannot be empty")]
    EmptyKey,
    #[error("row belongs to page '{found}', expected '{expected}'")]
    ForeignRow { expected: String, found: String },
    #[error("duplicate content key '{key}' in section '{section}'")]
    DuplicateKey { section: String, key: String },
}

/// Page identifiers double as URL segments (`rules-faqs`).
pub fn validate_page_id(page: &str) -> Result<(), ValidationError> {
    if page.is_empty() {
        return Err(ValidationError::EmptyPage);
    }
    let valid = page
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(ValidationError::InvalidPage(page.to_string()));
    }
    Ok(())
}

/// Validate that a row has the minimum required fields.
pub fn validate_row(row: &ContentRow) -> Result<(), ValidationError> {
    validate_page_id(&row.page)?;
    if row.section.trim().is_empty() {
        return Err(ValidationError::EmptySection);
    }
    if row.content_key.trim().is_empty() {
        return Err(ValidationError::EmptyKey);
    }
    Ok(())
}

/// Validate a full page snapshot before it replaces the stored rows.
pub fn validate_page_rows(page: &str, rows: &[ContentRow]) -> Result<(), ValidationError> {
    validate_page_id(page)?;
    let mut seen = HashSet::new();
    for row in rows {
        validate_row(row)?;
        if row.page != page {
            return Err(ValidationError::ForeignRow {
                expected: page.to_string(),
                found: row.page.clone(),
            });
        }
        if !seen.insert((row.section.as_str(), row.content_key.as_str())) {
            return Err(ValidationError::DuplicateKey {
                section: row.section.clone(),
                key: row.content_key.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_ids() {
        assert!(validate_page_id("rules-faqs").is_ok());
        assert_eq!(validate_page_id(""), Err(ValidationError::EmptyPage));
        assert!(matches!(
            validate_page_id("Rules FAQs"),
            Err(ValidationError::InvalidPage(_))
        ));
    }

    #[test]
    fn snapshot_rejects_duplicates_and_foreign_rows() {
        let dup = vec![
            ContentRow::text("home", "hero", "title", "a"),
            ContentRow::text("home", "hero", "title", "b"),
        ];
        assert!(matches!(
            validate_page_rows("home", &dup),
            Err(ValidationError::DuplicateKey { .. })
        ));

        let foreign = vec![ContentRow::text("about", "hero", "title", "a")];
        assert!(matches!(
            validate_page_rows("home", &foreign),
            Err(ValidationError::ForeignRow { .. })
        ));

        let blank_key = vec![ContentRow::text("home", "hero", " ", "a")];
        assert_eq!(
            validate_page_rows("home", &blank_key),
            Err(ValidationError::EmptyKey)
        );
    }
}
