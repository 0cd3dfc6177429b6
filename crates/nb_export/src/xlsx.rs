use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nb_core::{ArticleRecord, Error, ExportSink, Result};
use rust_xlsxwriter::Workbook;
use tokio::sync::Mutex;
use tracing::info;

const COLUMNS: [&str; 6] = [
    "Title",
    "Description",
    "Date",
    "Image FileName",
    "Count of Search Phrase",
    "Money Present",
];

/// Writes one worksheet per exported page into a single workbook. The whole
/// workbook is rewritten after every page so that pages already exported
/// survive a mid-run failure.
pub struct XlsxSink {
    path: PathBuf,
    pages: Mutex<Vec<(u32, Vec<ArticleRecord>)>>,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pages: Mutex::new(Vec::new()),
        }
    }

    fn save(pages: &[(u32, Vec<ArticleRecord>)], path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();

        for (page_index, records) in pages {
            let sheet = workbook.add_worksheet();
            sheet
                .set_name(format!("page{page_index}"))
                .map_err(xlsx_err)?;

            for (col, name) in COLUMNS.iter().enumerate() {
                sheet.write_string(0, col as u16, *name).map_err(xlsx_err)?;
            }
            for (i, record) in records.iter().enumerate() {
                let row = i as u32 + 1;
                sheet
                    .write_string(row, 0, record.title.as_str())
                    .map_err(xlsx_err)?;
                sheet
                    .write_string(row, 1, record.description.as_str())
                    .map_err(xlsx_err)?;
                sheet
                    .write_string(row, 2, record.date.as_str())
                    .map_err(xlsx_err)?;
                sheet
                    .write_string(row, 3, record.image_filename.as_str())
                    .map_err(xlsx_err)?;
                sheet
                    .write_string(row, 4, record.phrase_counts.as_str())
                    .map_err(xlsx_err)?;
                sheet
                    .write_boolean(row, 5, record.money_present)
                    .map_err(xlsx_err)?;
            }
        }

        workbook.save(path).map_err(xlsx_err)
    }
}

fn xlsx_err(e: rust_xlsxwriter::XlsxError) -> Error {
    Error::Export(e.to_string())
}

#[async_trait]
impl ExportSink for XlsxSink {
    async fn write_page(&self, page_index: u32, records: &[ArticleRecord]) -> Result<()> {
        let mut pages = self.pages.lock().await;
        pages.push((page_index, records.to_vec()));
        Self::save(&pages, &self.path)?;
        info!(
            "workbook {} now holds {} pages",
            self.path.display(),
            pages.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            description: "about it".to_string(),
            date: "March 10, 2024".to_string(),
            image_filename: "page(1)_image-news(1).png".to_string(),
            money_present: true,
            phrase_counts: "Title: 1; Description: 0".to_string(),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nb_xlsx_{}_{name}", std::process::id()))
    }

    /// An xlsx file is a zip archive; pull the XML parts back out so the
    /// assertions see what a reader of the workbook would see.
    fn workbook_xml(path: &Path) -> (String, String) {
        use std::io::Read;

        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();

        let mut workbook = String::new();
        archive
            .by_name("xl/workbook.xml")
            .unwrap()
            .read_to_string(&mut workbook)
            .unwrap();

        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        let mut strings = String::new();
        for name in names {
            if name.starts_with("xl/worksheets/") || name == "xl/sharedStrings.xml" {
                let mut part = String::new();
                archive.by_name(&name).unwrap().read_to_string(&mut part).unwrap();
                strings.push_str(&part);
            }
        }
        (workbook, strings)
    }

    #[tokio::test]
    async fn test_workbook_written_per_page() {
        let path = temp_path("pages.xlsx");
        let sink = XlsxSink::new(&path);

        sink.write_page(1, &[record("a")]).await.unwrap();
        let (workbook, _) = workbook_xml(&path);
        assert!(workbook.contains(r#"name="page1""#));
        assert!(!workbook.contains(r#"name="page2""#));

        sink.write_page(2, &[record("b"), record("c")]).await.unwrap();
        let (workbook, strings) = workbook_xml(&path);
        // Pages exported earlier survive the rewrite.
        assert!(workbook.contains(r#"name="page1""#));
        assert!(workbook.contains(r#"name="page2""#));

        for column in COLUMNS {
            assert!(strings.contains(column), "missing header {column:?}");
        }
        for title in ["a", "b", "c"] {
            assert!(strings.contains(&format!(">{title}<")), "missing row {title:?}");
        }

        std::fs::remove_file(&path).unwrap();
    }
}
