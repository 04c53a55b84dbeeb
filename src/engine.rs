use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use napi::bindgen_prelude::Buffer;
use tracing::{debug, info};

use crate::analysis::{
    AnalysisResult, AnalysisService, Completion, HttpAnalysisService, SelectedImage, Session,
    VisionType,
};
use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use crate::report::{self, pdf, ReportDocument, ReportOptions};
use crate::types::{AnalysisResultJs, AnalyzerConfigJs, ContrastVerdictJs};

/// Owns one [`Session`] and drives analysis and export against it.
///
/// The session lock is only taken for short synchronous steps and is never
/// held across an `.await`. While a submission waits on the network, the
/// host can keep changing colors or select another image; a response that
/// returns after a newer selection is dropped by the session's generation check.
pub struct Analyzer {
    session: Mutex<Session>,
    service: Arc<dyn AnalysisService>,
    config: AnalyzerConfig,
    report_options: ReportOptions,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig, service: Arc<dyn AnalysisService>) -> Self {
        Self {
            session: Mutex::new(Session::new()),
            service,
            config,
            report_options: ReportOptions::default(),
        }
    }

    /// Analyzer talking to the configured HTTP endpoint.
    pub fn with_http(config: AnalyzerConfig) -> Result<Self> {
        let service = HttpAnalysisService::new(&config)?;
        info!(endpoint = service.endpoint(), "analyzer ready");
        Ok(Self::new(config, Arc::new(service)))
    }

    pub fn with_report_options(mut self, options: ReportOptions) -> Self {
        self.report_options = options;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the session under the lock.
    pub fn read<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        f(&self.lock())
    }

    /// Mutate the session under the lock.
    pub fn update<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        f(&mut self.lock())
    }

    /// Submit the selected image.
    ///
    /// `Ok(None)` means the response arrived after a newer selection or
    /// submission and was discarded.
    pub async fn submit(&self) -> Result<Option<AnalysisResult>> {
        let ticket = self.update(Session::begin)?;
        let attempt = ticket.run(self.service.as_ref()).await;

        match self.update(|session| session.complete(ticket, attempt))? {
            Completion::Applied => Ok(self.read(|session| session.current_result().cloned())),
            Completion::Superseded => Ok(None),
        }
    }

    /// Compose the report, reading the original image outside the lock.
    pub async fn export(&self) -> ReportDocument {
        let draft = self.read(|session| report::draft(session, self.report_options));
        draft.acquire().await
    }

    pub async fn export_pdf(&self) -> Result<Vec<u8>> {
        let report = self.export().await;
        pdf::render(&report)
    }

    /// Export and write the PDF under `dir` using the configured file name.
    pub async fn save_report(&self, dir: &Path) -> Result<PathBuf> {
        let report = self.export().await;
        pdf::save(&report, dir, &self.config.report_file_name).await
    }
}

/// Node-facing wrapper around [`Analyzer`].
#[napi]
pub struct AnalyzerSession {
    inner: Arc<Analyzer>,
}

#[napi]
impl AnalyzerSession {
    #[napi(constructor)]
    pub fn new(config: Option<AnalyzerConfigJs>) -> napi::Result<Self> {
        let overrides = config.unwrap_or_default();
        let base = overrides.apply(AnalyzerConfig::from_env()?);
        let options = ReportOptions {
            include_live_checker: overrides.include_live_checker.unwrap_or(false),
        };
        let analyzer = Analyzer::with_http(base)?.with_report_options(options);
        Ok(Self {
            inner: Arc::new(analyzer),
        })
    }

    #[napi]
    pub fn select_image(&self, name: String, bytes: Buffer) {
        self.inner
            .update(|session| session.select_image(SelectedImage::from_bytes(name, bytes.to_vec())));
    }

    #[napi]
    pub fn select_image_file(&self, path: String) {
        self.inner
            .update(|session| session.select_image(SelectedImage::from_path(path)));
    }

    #[napi]
    pub fn image_name(&self) -> String {
        self.inner.read(|session| session.image_name().to_string())
    }

    #[napi]
    pub fn set_vision_type(&self, vision_type: String) -> napi::Result<()> {
        let vision_type: VisionType = vision_type.parse()?;
        self.inner.update(|session| session.set_vision_type(vision_type));
        Ok(())
    }

    #[napi]
    pub fn vision_type(&self) -> String {
        self.inner.read(|session| session.vision_type().to_string())
    }

    #[napi]
    pub fn set_foreground(&self, hex: String) -> napi::Result<()> {
        self.inner
            .update(|session| session.checker_mut().set_foreground(&hex))?;
        Ok(())
    }

    #[napi]
    pub fn set_background(&self, hex: String) -> napi::Result<()> {
        self.inner
            .update(|session| session.checker_mut().set_background(&hex))?;
        Ok(())
    }

    #[napi]
    pub fn live_verdict(&self) -> ContrastVerdictJs {
        self.inner.read(|session| session.checker().verdict()).into()
    }

    #[napi]
    pub fn state(&self) -> String {
        self.inner.read(|session| session.state().as_str().to_string())
    }

    #[napi]
    pub fn result(&self) -> Option<AnalysisResultJs> {
        self.inner
            .read(|session| session.current_result().map(AnalysisResultJs::from))
    }

    #[napi]
    pub fn elapsed_seconds(&self) -> Option<f64> {
        self.inner.read(|session| session.elapsed_seconds())
    }

    #[napi]
    pub fn simulated_image_data_uri(&self) -> Option<String> {
        self.inner.read(|session| {
            session
                .current_result()
                .and_then(|result| result.simulated_image_data_uri())
        })
    }

    /// Resolves to the new result, or `null` when there was no image to send
    /// or the response was superseded.
    #[napi]
    pub async fn submit(&self) -> napi::Result<Option<AnalysisResultJs>> {
        let analyzer = Arc::clone(&self.inner);
        match analyzer.submit().await {
            Ok(result) => Ok(result.as_ref().map(AnalysisResultJs::from)),
            Err(Error::NoImageSelected) => {
                debug!("submit ignored: no image selected");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    #[napi]
    pub async fn export_pdf(&self) -> napi::Result<Buffer> {
        let analyzer = Arc::clone(&self.inner);
        let bytes = analyzer.export_pdf().await?;
        Ok(bytes.into())
    }

    /// Write the PDF into `dir` (default: current directory) and return its path.
    #[napi]
    pub async fn save_report(&self, dir: Option<String>) -> napi::Result<String> {
        let analyzer = Arc::clone(&self.inner);
        let dir = PathBuf::from(dir.unwrap_or_else(|| ".".to_string()));
        let path = analyzer.save_report(&dir).await?;
        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::result_with_regions;
    use crate::analysis::session::tests::StubService;
    use crate::analysis::SessionState;
    use crate::report::{ImageKind, Page};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Holds every request until the gate is opened.
    struct GatedService {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl AnalysisService for GatedService {
        async fn analyze(
            &self,
            _file_name: &str,
            _image: Vec<u8>,
            vision_type: VisionType,
        ) -> Result<AnalysisResult> {
            self.gate.notified().await;
            let mut result = result_with_regions(&[]);
            result.simulation_type = vision_type;
            Ok(result)
        }
    }

    fn analyzer_with(service: Arc<dyn AnalysisService>) -> Analyzer {
        Analyzer::new(AnalyzerConfig::default(), service)
    }

    #[tokio::test]
    async fn submit_then_export_embeds_both_images() {
        let analyzer = analyzer_with(Arc::new(StubService::ok()));
        analyzer.update(|s| s.select_image(SelectedImage::from_bytes("photo.jpg", b"jpeg".to_vec())));

        let result = analyzer.submit().await.unwrap().unwrap();
        assert_eq!(result.text_regions.len(), 1);
        assert_eq!(analyzer.read(|s| s.state()), SessionState::Succeeded);

        let report = analyzer.export().await;
        assert_eq!(report.image_kinds(), [ImageKind::Original, ImageKind::Simulated]);
        assert!(matches!(report.pages()[0], Page::Text(_)));
    }

    #[tokio::test]
    async fn submit_without_image_is_an_error() {
        let analyzer = analyzer_with(Arc::new(StubService::ok()));
        assert!(matches!(analyzer.submit().await, Err(Error::NoImageSelected)));
    }

    #[tokio::test]
    async fn reselect_during_flight_discards_response() {
        let gate = Arc::new(Notify::new());
        let analyzer = analyzer_with(Arc::new(GatedService { gate: gate.clone() }));
        analyzer.update(|s| s.select_image(SelectedImage::from_bytes("first.png", vec![1])));

        let reselect = async {
            tokio::task::yield_now().await;
            analyzer.update(|s| s.select_image(SelectedImage::from_bytes("second.png", vec![2])));
            gate.notify_one();
        };
        let (outcome, ()) = tokio::join!(analyzer.submit(), reselect);

        assert!(outcome.unwrap().is_none());
        analyzer.read(|s| {
            assert!(s.current_result().is_none());
            assert!(s.elapsed_seconds().is_none());
            assert_eq!(s.image_name(), "second.png");
            assert_eq!(s.state(), SessionState::Idle);
        });
    }

    #[tokio::test]
    async fn color_edits_during_flight_do_not_block() {
        let gate = Arc::new(Notify::new());
        let analyzer = analyzer_with(Arc::new(GatedService { gate: gate.clone() }));
        analyzer.update(|s| s.select_image(SelectedImage::from_bytes("a.png", vec![1])));

        let edit = async {
            tokio::task::yield_now().await;
            analyzer
                .update(|s| s.checker_mut().set_foreground("#777777"))
                .unwrap();
            gate.notify_one();
        };
        let (outcome, ()) = tokio::join!(analyzer.submit(), edit);

        assert!(outcome.unwrap().is_some());
        assert_eq!(analyzer.read(|s| s.checker().foreground().hex().to_string()), "#777777");
    }

    #[tokio::test]
    async fn failed_submit_surfaces_error() {
        let analyzer = analyzer_with(Arc::new(StubService::failing()));
        analyzer.update(|s| s.select_image(SelectedImage::from_bytes("a.png", vec![1])));
        let err = analyzer.submit().await.unwrap_err();
        assert!(matches!(err, Error::AnalysisRequestFailed(_)));
        assert_eq!(analyzer.read(|s| s.state()), SessionState::Failed);
    }

    #[tokio::test]
    async fn export_pdf_produces_document() {
        let analyzer = analyzer_with(Arc::new(StubService::ok()));
        let bytes = analyzer.export_pdf().await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn save_report_uses_configured_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalyzerConfig {
            report_file_name: "custom.pdf".to_string(),
            ..AnalyzerConfig::default()
        };
        let analyzer = Analyzer::new(config, Arc::new(StubService::ok()));

        let path = analyzer.save_report(dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("custom.pdf"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn report_options_reach_export() {
        let analyzer = analyzer_with(Arc::new(StubService::ok()))
            .with_report_options(ReportOptions { include_live_checker: true });
        let report = analyzer.export().await;
        assert!(report.text_lines().any(|l| l == "Live Contrast Checker:"));
    }
}
