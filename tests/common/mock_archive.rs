use async_trait::async_trait;
use chisel_sdf::archive::{ArchiveError, ArchiveQuery, PackageAvailability, QueryOptions};
use parking_lot::Mutex;

/// Archive query returning canned rows and remembering every request.
#[derive(Debug, Default)]
pub struct MockArchive {
    rows: Vec<PackageAvailability>,
    fail_with: Option<String>,
    pub queries: Mutex<Vec<QueryOptions>>,
}

impl MockArchive {
    pub fn with_rows(rows: Vec<PackageAvailability>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().len()
    }
}

#[async_trait]
impl ArchiveQuery for MockArchive {
    async fn query(&self, options: &QueryOptions) -> Result<Vec<PackageAvailability>, ArchiveError> {
        self.queries.lock().push(options.clone());
        match &self.fail_with {
            Some(message) => Err(ArchiveError::Query(message.clone())),
            None => Ok(self.rows.clone()),
        }
    }
}
