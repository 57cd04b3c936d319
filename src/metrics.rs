use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageMetrics {
    pub page_number: usize,
    pub layout_ms: f64,
    pub command_count: usize,
    pub flowable_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentMetrics {
    pub pages: Vec<PageMetrics>,
    pub total_layout_ms: f64,
    pub page_breaks: usize,
    pub table_rows: usize,
    pub output_bytes: usize,
}

impl DocumentMetrics {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
