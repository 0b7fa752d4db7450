use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Display metadata for one crawled page.
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub url: String,
    pub title: String,
}

#[derive(Deserialize)]
struct CatalogRow {
    name: String,
    url: String,
    title: String,
}

/// Page catalog loaded from the crawl manifest CSV (`name,url,title`).
/// Fills in title/url for index entries whose metadata predates those fields.
pub struct PageCatalog {
    rows: HashMap<String, PageMeta>,
}

impl PageCatalog {
    /// Load the catalog from a CSV file. Malformed rows fail the load:
    /// a broken manifest is a deployment problem, not something to paper over.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open page catalog {}", path.display()))?;

        let mut rows = HashMap::new();
        for record in reader.deserialize() {
            let row: CatalogRow = record.context("Failed to parse page catalog row")?;
            rows.insert(
                row.name,
                PageMeta {
                    url: row.url,
                    title: row.title,
                },
            );
        }

        Ok(Self { rows })
    }

    /// Look up a page by its source name.
    pub fn find(&self, name: &str) -> Option<&PageMeta> {
        self.rows.get(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_and_find() {
        let file = write_csv(
            "name,url,title\n\
             visit-us,https://example.org/visit,Visit us\n\
             contact,https://example.org/contact,Contact\n",
        );
        let catalog = PageCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);

        let page = catalog.find("visit-us").unwrap();
        assert_eq!(page.url, "https://example.org/visit");
        assert_eq!(page.title, "Visit us");
    }

    #[test]
    fn test_find_missing_returns_none() {
        let file = write_csv("name,url,title\nvisit-us,https://example.org/visit,Visit us\n");
        let catalog = PageCatalog::load(file.path()).unwrap();
        assert!(catalog.find("no-such-page").is_none());
    }

    #[test]
    fn test_header_only_catalog_is_empty() {
        let file = write_csv("name,url,title\n");
        let catalog = PageCatalog::load(file.path()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_quoted_title_with_comma() {
        let file = write_csv(
            "name,url,title\n\
             hours,https://example.org/hours,\"Hours, locations, and parking\"\n",
        );
        let catalog = PageCatalog::load(file.path()).unwrap();
        assert_eq!(
            catalog.find("hours").unwrap().title,
            "Hours, locations, and parking"
        );
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(PageCatalog::load(Path::new("/nonexistent/catalog.csv")).is_err());
    }
}
