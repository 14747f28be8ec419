// Runs session effects against the filesystem and the insight service.
//
// The session decides what happens next; the driver only performs the I/O an
// effect asks for and feeds the outcome back until the session settles.

use std::path::{Path, PathBuf};

use consolidator_core::consolidate::ExtractionRules;
use consolidator_core::session::{run_consolidation, Effect, Event, Session};
use consolidator_insights::{request_insights, InsightError, InsightProvider};
use consolidator_io::{export_xlsx, read_workbook_path, ExportResult};

pub struct Driver {
    input: PathBuf,
    export_dir: PathBuf,
    provider: Result<Box<dyn InsightProvider>, InsightError>,
    sample_limit: usize,
    /// Last successful export
    pub exported: Option<ExportResult>,
    /// Last insight failure, kept for exit-code mapping
    pub insight_error: Option<InsightError>,
}

impl Driver {
    pub fn new(input: PathBuf) -> Self {
        let export_dir = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            input,
            export_dir,
            provider: Err(InsightError::Disabled),
            sample_limit: consolidator_config::settings::DEFAULT_SAMPLE_LIMIT,
            exported: None,
            insight_error: None,
        }
    }

    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    pub fn with_insights(
        mut self,
        provider: Result<Box<dyn InsightProvider>, InsightError>,
        sample_limit: usize,
    ) -> Self {
        self.provider = provider;
        self.sample_limit = sample_limit;
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Display name of the input: its file name component
    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.input.to_string_lossy().to_string())
    }

    /// Feed `event` to the session and run effects until none is left.
    pub fn dispatch(&mut self, session: Session, event: Event) -> Session {
        let (mut session, mut effect) = session.handle(event);
        loop {
            let next = match effect {
                Effect::None => return session,
                Effect::Consolidate { file_name, rules } => self.consolidate(&file_name, &rules),
                Effect::Export { file_name } => self.export(&session, &file_name),
                Effect::RequestInsights => self.analyze(&session),
            };
            (session, effect) = session.handle(next);
        }
    }

    fn consolidate(&self, file_name: &str, rules: &ExtractionRules) -> Event {
        log::info!("reading {}", self.input.display());
        run_consolidation(read_workbook_path(&self.input), file_name, rules)
    }

    fn export(&mut self, session: &Session, file_name: &str) -> Event {
        let records = session.result.as_ref().map(|r| r.data.as_slice()).unwrap_or(&[]);
        let outcome = export_xlsx(records, &self.export_dir, file_name).map(|exported| {
            let name = exported.file_name();
            self.exported = Some(exported);
            name
        });
        Event::ExportFinished(outcome)
    }

    fn analyze(&mut self, session: &Session) -> Event {
        let records = session.result.as_ref().map(|r| r.data.as_slice()).unwrap_or(&[]);
        let outcome = match &self.provider {
            Ok(provider) => request_insights(provider.as_ref(), records, self.sample_limit),
            Err(e) => Err(e.clone()),
        };
        self.insight_error = outcome.as_ref().err().cloned();
        Event::AnalysisFinished(outcome.map_err(Into::into))
    }
}
