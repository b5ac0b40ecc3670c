use crate::core::transform::validate_and_transform;
use crate::core::validator::LotterySchema;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::TransformedRecord;
use crate::domain::report::{
    BatchReport, Extraction, FileOutcome, FileReport, FileStatus, ProcessedFile, SourceDocument,
    TransformResult,
};
use crate::utils::error::{EtlError, Result};
use chrono::Utc;
use futures::future::try_join_all;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Reads lottery result files from `source`, validates and flattens them,
/// and writes the valid ones under the same name to `sink`.
pub struct LotteryPipeline<S: Storage, C: ConfigProvider> {
    source: S,
    sink: S,
    config: C,
    schema: Arc<LotterySchema>,
}

impl<S, C> LotteryPipeline<S, C>
where
    S: Storage + Clone + 'static,
    C: ConfigProvider,
{
    pub fn new(source: S, sink: S, config: C) -> Result<Self> {
        Ok(Self {
            source,
            sink,
            config,
            schema: Arc::new(LotterySchema::new()?),
        })
    }

    fn has_extension(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == self.config.file_extension())
            .unwrap_or(false)
    }

    /// Runs `task` for every item with at most `concurrent_files` in flight,
    /// returning results in input order.
    async fn run_bounded<T, R, F, Fut>(&self, items: Vec<T>, task: F) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send,
        Fut: Future<Output = R> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_files()));

        let handles: Vec<_> = items
            .into_iter()
            .map(|item| {
                let semaphore = Arc::clone(&semaphore);
                let work = task(item);
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.map_err(|_| {
                        EtlError::ConcurrencyError {
                            details: "File semaphore closed".to_string(),
                        }
                    })?;
                    Ok::<R, EtlError>(work.await)
                })
            })
            .collect();

        let joined = try_join_all(handles)
            .await
            .map_err(|e| EtlError::ConcurrencyError {
                details: format!("Task join error: {}", e),
            })?;

        joined.into_iter().collect()
    }

    async fn write_report(&self, report: &BatchReport) -> Result<()> {
        let Some(report_path) = self.config.report_path() else {
            return Ok(());
        };

        let json = serde_json::to_vec_pretty(report)?;
        if let Some(parent) = Path::new(report_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(report_path, json).await?;
        tracing::info!("📝 Run report written to {}", report_path);
        Ok(())
    }
}

/// 2-space indentation with a trailing newline.
fn render_output(record: &TransformedRecord) -> Result<Vec<u8>> {
    let mut json = serde_json::to_vec_pretty(record)?;
    json.push(b'\n');
    Ok(json)
}

fn log_outcome(file_name: &str, status: &FileStatus) {
    match status {
        FileStatus::Transformed { output_file, prizes } => {
            tracing::info!("✅ Transformed: {} ({} prizes) -> {}", file_name, prizes, output_file)
        }
        FileStatus::Checked { prizes } => {
            tracing::info!("✅ Valid: {} ({} prizes, dry run)", file_name, prizes)
        }
        FileStatus::Invalid { violations } => {
            tracing::error!("❌ Invalid JSON format: {}", file_name);
            for violation in violations {
                tracing::debug!("   {} - {}", file_name, violation);
            }
        }
        FileStatus::Failed { reason } => {
            tracing::error!("⚠️ Error processing {}: {}", file_name, reason)
        }
    }
}

#[async_trait::async_trait]
impl<S, C> Pipeline for LotteryPipeline<S, C>
where
    S: Storage + Clone + 'static,
    C: ConfigProvider,
{
    async fn extract(&self) -> Result<Extraction> {
        let started_at = Utc::now();
        tracing::info!("📂 Scanning {}", self.config.input_dir());

        // 目錄無法讀取時整個批次失敗，單一檔案讀取失敗則只記錄該檔
        let files: Vec<String> = self
            .source
            .list_files()
            .await?
            .into_iter()
            .filter(|name| self.has_extension(name))
            .collect();

        tracing::debug!(
            "Found {} .{} files",
            files.len(),
            self.config.file_extension()
        );

        let source = self.source.clone();
        let documents = self
            .run_bounded(files, move |file_name| {
                let source = source.clone();
                async move {
                    let contents = source.read_file(&file_name).await;
                    SourceDocument {
                        file_name,
                        contents,
                    }
                }
            })
            .await?;

        Ok(Extraction {
            started_at,
            documents,
        })
    }

    async fn transform(&self, extraction: Extraction) -> Result<TransformResult> {
        let processed = extraction
            .documents
            .into_iter()
            .map(|document| {
                let outcome = match document.contents {
                    Ok(bytes) => validate_and_transform(&self.schema, &bytes),
                    Err(e) => FileOutcome::Failed(e.to_string()),
                };
                ProcessedFile {
                    file_name: document.file_name,
                    outcome,
                }
            })
            .collect();

        Ok(TransformResult {
            started_at: extraction.started_at,
            processed,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<BatchReport> {
        let dry_run = self.config.dry_run();
        // 即使沒有任何有效檔案，輸出目錄也要存在
        if !dry_run {
            self.sink.ensure_root().await?;
        }
        let sink = self.sink.clone();

        let files = self
            .run_bounded(result.processed, move |processed| {
                let sink = sink.clone();
                async move {
                    let status = match processed.outcome {
                        FileOutcome::Transformed(record) if dry_run => FileStatus::Checked {
                            prizes: record.prizes.len(),
                        },
                        FileOutcome::Transformed(record) => {
                            let written = match render_output(&record) {
                                Ok(json) => sink.write_file(&processed.file_name, &json).await,
                                Err(e) => Err(e),
                            };
                            match written {
                                Ok(()) => FileStatus::Transformed {
                                    output_file: sink.location(&processed.file_name),
                                    prizes: record.prizes.len(),
                                },
                                Err(e) => FileStatus::Failed {
                                    reason: e.to_string(),
                                },
                            }
                        }
                        FileOutcome::Rejected(violations) => FileStatus::Invalid { violations },
                        FileOutcome::Failed(reason) => FileStatus::Failed { reason },
                    };
                    log_outcome(&processed.file_name, &status);
                    FileReport {
                        file_name: processed.file_name,
                        status,
                    }
                }
            })
            .await?;

        let report = BatchReport {
            started_at: result.started_at,
            finished_at: Utc::now(),
            dry_run,
            files,
        };

        self.write_report(&report).await?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        unreadable: Arc<Mutex<Vec<String>>>,
        root_ready: Arc<Mutex<bool>>,
    }

    impl MockStorage {
        fn with_file(self, name: &str, contents: &[u8]) -> Self {
            self.files
                .lock()
                .unwrap()
                .insert(name.to_string(), contents.to_vec());
            self
        }

        fn with_unreadable(self, name: &str) -> Self {
            self.unreadable.lock().unwrap().push(name.to_string());
            self.with_file(name, b"")
        }

        fn get_file(&self, name: &str) -> Option<Vec<u8>> {
            self.files.lock().unwrap().get(name).cloned()
        }

        fn file_count(&self) -> usize {
            self.files.lock().unwrap().len()
        }

        fn root_ready(&self) -> bool {
            *self.root_ready.lock().unwrap()
        }
    }

    impl Storage for MockStorage {
        async fn list_files(&self) -> Result<Vec<String>> {
            let mut names: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
            names.sort();
            Ok(names)
        }

        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            if self.unreadable.lock().unwrap().iter().any(|name| name == path) {
                return Err(EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("Permission denied: {}", path),
                )));
            }
            self.get_file(path).ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn ensure_root(&self) -> Result<()> {
            *self.root_ready.lock().unwrap() = true;
            Ok(())
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn location(&self, path: &str) -> String {
            format!("mock://{}", path)
        }
    }

    struct TestConfig {
        dry_run: bool,
    }

    impl ConfigProvider for TestConfig {
        fn input_dir(&self) -> &str {
            "mock-in"
        }

        fn output_dir(&self) -> &str {
            "mock-out"
        }

        fn file_extension(&self) -> &str {
            "json"
        }

        fn concurrent_files(&self) -> usize {
            2
        }

        fn report_path(&self) -> Option<&str> {
            None
        }

        fn dry_run(&self) -> bool {
            self.dry_run
        }
    }

    fn lottery_json(date: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "statusMessage": "ok",
            "statusCode": 200,
            "response": {"result": {"date": date, "data": {
                "first": {"price": "6000000", "number": [{"round": 1, "value": "730209"}]},
                "last2": {"price": "2000", "number": [{"round": 1, "value": "51"}]}
            }}}
        }))
        .unwrap()
    }

    fn status_of<'a>(report: &'a BatchReport, file_name: &str) -> Option<&'a FileStatus> {
        report
            .files
            .iter()
            .find(|f| f.file_name == file_name)
            .map(|f| &f.status)
    }

    async fn run(
        source: MockStorage,
        sink: MockStorage,
        dry_run: bool,
    ) -> BatchReport {
        let pipeline = LotteryPipeline::new(source, sink, TestConfig { dry_run }).unwrap();
        let extraction = pipeline.extract().await.unwrap();
        let result = pipeline.transform(extraction).await.unwrap();
        pipeline.load(result).await.unwrap()
    }

    #[tokio::test]
    async fn test_extract_filters_by_extension_in_sorted_order() {
        let source = MockStorage::default()
            .with_file("b.json", &lottery_json("2025-02-01"))
            .with_file("notes.txt", b"not lottery data")
            .with_file("a.json", &lottery_json("2025-01-16"))
            .with_file("archive.json.bak", b"{}");

        let pipeline =
            LotteryPipeline::new(source, MockStorage::default(), TestConfig { dry_run: false })
                .unwrap();
        let extraction = pipeline.extract().await.unwrap();

        let names: Vec<&str> = extraction
            .documents
            .iter()
            .map(|d| d.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[tokio::test]
    async fn test_batch_skips_bad_files_and_writes_valid_ones() {
        let source = MockStorage::default()
            .with_file("2025-01-16.json", &lottery_json("2025-01-16"))
            .with_file(
                "missing-data.json",
                br#"{"statusMessage":"ok","statusCode":200,"response":{"result":{"date":"2025-01-01"}}}"#,
            )
            .with_file("truncated.json", b"{\"statusMessage\":")
            .with_unreadable("locked.json");
        let sink = MockStorage::default();

        let report = run(source, sink.clone(), false).await;

        assert_eq!(report.total(), 4);
        assert_eq!(report.transformed_count(), 1);
        assert_eq!(report.invalid_count(), 1);
        assert_eq!(report.failed_count(), 2);
        assert!(matches!(
            status_of(&report, "2025-01-16.json"),
            Some(FileStatus::Transformed { prizes: 2, .. })
        ));
        assert!(matches!(
            status_of(&report, "missing-data.json"),
            Some(FileStatus::Invalid { .. })
        ));
        assert!(matches!(
            status_of(&report, "locked.json"),
            Some(FileStatus::Failed { reason }) if reason.contains("Permission denied")
        ));

        assert_eq!(sink.file_count(), 1);
        let written: serde_json::Value =
            serde_json::from_slice(&sink.get_file("2025-01-16.json").unwrap()).unwrap();
        assert_eq!(written["lotteryDate"], "2025-01-16");
        assert_eq!(written["prizes"][1]["category"], "last2");
    }

    #[tokio::test]
    async fn test_output_uses_two_space_indentation() {
        let source = MockStorage::default().with_file("draw.json", &lottery_json("2025-01-16"));
        let sink = MockStorage::default();

        run(source, sink.clone(), false).await;

        let written = String::from_utf8(sink.get_file("draw.json").unwrap()).unwrap();
        assert!(written.starts_with("{\n  \"lotteryDate\": \"2025-01-16\",\n  \"prizes\": [\n    {"));
        assert!(written.ends_with("}\n"));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let source = MockStorage::default().with_file("draw.json", &lottery_json("2025-01-16"));
        let sink = MockStorage::default();

        let report = run(source, sink.clone(), true).await;

        assert!(report.dry_run);
        assert_eq!(sink.file_count(), 0);
        assert!(!sink.root_ready());
        assert!(matches!(
            status_of(&report, "draw.json"),
            Some(FileStatus::Checked { prizes: 2 })
        ));
    }

    #[tokio::test]
    async fn test_output_root_prepared_without_valid_files() {
        let source = MockStorage::default()
            .with_file("truncated.json", b"{\"statusMessage\":")
            .with_file("empty.json", b"{}");
        let sink = MockStorage::default();

        let report = run(source, sink.clone(), false).await;

        assert_eq!(report.transformed_count(), 0);
        assert_eq!(sink.file_count(), 0);
        assert!(sink.root_ready());
    }

    #[tokio::test]
    async fn test_empty_input_produces_empty_report() {
        let report = run(MockStorage::default(), MockStorage::default(), false).await;
        assert_eq!(report.total(), 0);
        assert!(report.finished_at >= report.started_at);
    }
}
