//! Session state for one upload-to-download flow.
//!
//! A `Session` is a plain value. `Session::handle` takes the current state and
//! an event and returns the next state plus the side effect the driver must
//! perform. The driver performs the effect (read the workbook, write the
//! export, call the insight service) and feeds the outcome back as another
//! event. Nothing here does I/O.
//!
//! Failures never discard a result that is already in place: an export or
//! insight failure leaves the consolidated data usable.

use crate::consolidate::{consolidate, ExtractionRules};
use crate::error::ConsolidateError;
use crate::grid::Workbook;
use crate::record::{ConsolidationResult, InsightResult};

/// Where the session is in its flow. Busy phases ignore new requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Consolidating,
    Ready,
    Exporting,
    Analyzing,
}

impl Phase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Consolidating | Phase::Exporting | Phase::Analyzing)
    }
}

/// Why an insight request failed, as far as the user is concerned
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisFailure {
    /// Network, credential or service error
    Unavailable(String),
    /// Service answered, but not with the expected JSON shape
    Malformed(String),
}

/// User-facing message left by the last failed operation
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    InvalidColumn(String),
    ProcessingFailed,
    ExportFailed,
    InsightsUnavailable { malformed: bool },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::InvalidColumn(detail) => {
                format!("Specify a valid column letter (e.g. A, B, C, AA): {}", detail)
            }
            Notice::ProcessingFailed => {
                "Could not process the workbook. Check that the file and column are valid.".to_string()
            }
            Notice::ExportFailed => "Could not write the consolidated workbook.".to_string(),
            Notice::InsightsUnavailable { malformed: false } => {
                "AI insights are unavailable right now.".to_string()
            }
            Notice::InsightsUnavailable { malformed: true } => {
                "AI insights are unavailable right now (the service returned an unexpected response).".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ColumnEntered(String),
    FileSelected { name: String },
    ConsolidationFinished(Result<ConsolidationResult, ConsolidateError>),
    ExportRequested,
    /// Ok carries the written file name
    ExportFinished(Result<String, ConsolidateError>),
    AnalysisRequested,
    AnalysisFinished(Result<InsightResult, AnalysisFailure>),
    /// Drop the current analysis; the consolidated result stays
    AnalysisCleared,
    Reset,
}

/// Side effect the driver must perform after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Read the selected file and consolidate it with these rules
    Consolidate { file_name: String, rules: ExtractionRules },
    /// Write the current result's records as a workbook
    Export { file_name: String },
    /// Send the current result's values to the insight service
    RequestInsights,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub rules: ExtractionRules,
    pub phase: Phase,
    pub result: Option<ConsolidationResult>,
    pub analysis: Option<InsightResult>,
    pub exported: Option<String>,
    pub notice: Option<Notice>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ExtractionRules::default())
    }
}

impl Session {
    pub fn new(rules: ExtractionRules) -> Self {
        Self {
            rules,
            phase: Phase::Idle,
            result: None,
            analysis: None,
            exported: None,
            notice: None,
        }
    }

    /// Whether an insight request would be accepted right now
    pub fn can_analyze(&self) -> bool {
        !self.phase.is_busy() && self.result.as_ref().is_some_and(|r| r.total_rows > 0)
    }

    pub fn can_export(&self) -> bool {
        !self.phase.is_busy() && self.result.is_some()
    }

    pub fn handle(mut self, event: Event) -> (Session, Effect) {
        match event {
            Event::ColumnEntered(column) => {
                self.rules.column = column;
                (self, Effect::None)
            }

            Event::FileSelected { name } => {
                if self.phase.is_busy() {
                    return (self, Effect::None);
                }
                // Validate before touching the file
                if let Err(e) = self.rules.validate() {
                    self.notice = Some(Notice::InvalidColumn(e.detail().to_string()));
                    return (self, Effect::None);
                }
                self.result = None;
                self.analysis = None;
                self.exported = None;
                self.notice = None;
                self.phase = Phase::Consolidating;
                let rules = self.rules.clone();
                (self, Effect::Consolidate { file_name: name, rules })
            }

            Event::ConsolidationFinished(outcome) => {
                if self.phase != Phase::Consolidating {
                    return (self, Effect::None);
                }
                match outcome {
                    Ok(result) => {
                        self.result = Some(result);
                        self.phase = Phase::Ready;
                    }
                    Err(e) => {
                        log::warn!("consolidation failed: {}", e);
                        self.notice = Some(match e {
                            ConsolidateError::Validation(detail) => Notice::InvalidColumn(detail),
                            _ => Notice::ProcessingFailed,
                        });
                        self.phase = Phase::Idle;
                    }
                }
                (self, Effect::None)
            }

            Event::ExportRequested => {
                if !self.can_export() {
                    return (self, Effect::None);
                }
                let file_name = self
                    .result
                    .as_ref()
                    .map(|r| r.file_name.clone())
                    .unwrap_or_default();
                self.phase = Phase::Exporting;
                (self, Effect::Export { file_name })
            }

            Event::ExportFinished(outcome) => {
                if self.phase != Phase::Exporting {
                    return (self, Effect::None);
                }
                match outcome {
                    Ok(name) => self.exported = Some(name),
                    Err(e) => {
                        log::warn!("export failed: {}", e);
                        self.notice = Some(Notice::ExportFailed);
                    }
                }
                self.phase = Phase::Ready;
                (self, Effect::None)
            }

            Event::AnalysisRequested => {
                if !self.can_analyze() {
                    return (self, Effect::None);
                }
                self.phase = Phase::Analyzing;
                (self, Effect::RequestInsights)
            }

            Event::AnalysisFinished(outcome) => {
                if self.phase != Phase::Analyzing {
                    return (self, Effect::None);
                }
                match outcome {
                    Ok(analysis) => self.analysis = Some(analysis),
                    Err(failure) => {
                        let malformed = matches!(failure, AnalysisFailure::Malformed(_));
                        match &failure {
                            AnalysisFailure::Unavailable(cause) | AnalysisFailure::Malformed(cause) => {
                                log::warn!("insight request failed: {}", cause);
                            }
                        }
                        self.notice = Some(Notice::InsightsUnavailable { malformed });
                    }
                }
                self.phase = Phase::Ready;
                (self, Effect::None)
            }

            Event::AnalysisCleared => {
                if !self.phase.is_busy() {
                    self.analysis = None;
                }
                (self, Effect::None)
            }

            Event::Reset => (Session::new(self.rules), Effect::None),
        }
    }
}

/// Run the consolidation effect against an already-parsed workbook.
///
/// Convenience for drivers that parse and consolidate in one step.
pub fn run_consolidation(
    workbook: Result<Workbook, ConsolidateError>,
    file_name: &str,
    rules: &ExtractionRules,
) -> Event {
    Event::ConsolidationFinished(workbook.and_then(|wb| consolidate(&wb, file_name, rules)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;
    use crate::grid::SheetGrid;

    fn sample_workbook(values: &[&str]) -> Workbook {
        let mut sheet = SheetGrid::new("Sheet1");
        for (i, v) in values.iter().enumerate() {
            sheet.set(3 + i, 1, CellValue::from(*v));
        }
        let mut wb = Workbook::new();
        wb.push(sheet);
        wb
    }

    fn consolidated_session(values: &[&str]) -> Session {
        let (session, effect) = Session::default().handle(Event::FileSelected { name: "book.xlsx".into() });
        let Effect::Consolidate { file_name, rules } = effect else {
            panic!("expected consolidate effect, got {:?}", effect);
        };
        let event = run_consolidation(Ok(sample_workbook(values)), &file_name, &rules);
        let (session, effect) = session.handle(event);
        assert_eq!(effect, Effect::None);
        session
    }

    fn sample_insight() -> InsightResult {
        InsightResult {
            summary: "Fruit names".into(),
            insights: vec!["a".into(), "b".into(), "c".into()],
            suggested_categories: vec!["fruit".into()],
        }
    }

    #[test]
    fn test_invalid_column_stops_before_parse() {
        for column in ["", "1"] {
            let session = Session::default();
            let (session, _) = session.handle(Event::ColumnEntered(column.into()));
            let (session, effect) = session.handle(Event::FileSelected { name: "book.xlsx".into() });
            assert_eq!(effect, Effect::None);
            assert_eq!(session.phase, Phase::Idle);
            assert!(matches!(session.notice, Some(Notice::InvalidColumn(_))));
        }
    }

    #[test]
    fn test_file_selected_emits_consolidate_with_rules() {
        let (session, _) = Session::default().handle(Event::ColumnEntered("c".into()));
        let (session, effect) = session.handle(Event::FileSelected { name: "f.xlsx".into() });
        assert_eq!(session.phase, Phase::Consolidating);
        assert_eq!(
            effect,
            Effect::Consolidate {
                file_name: "f.xlsx".into(),
                rules: ExtractionRules::new("c", 4),
            }
        );
    }

    #[test]
    fn test_consolidation_success_then_export() {
        let session = consolidated_session(&["x", "y"]);
        assert_eq!(session.phase, Phase::Ready);
        assert_eq!(session.result.as_ref().unwrap().total_rows, 2);

        let (session, effect) = session.handle(Event::ExportRequested);
        assert_eq!(effect, Effect::Export { file_name: "book.xlsx".into() });
        assert_eq!(session.phase, Phase::Exporting);

        let (session, _) = session.handle(Event::ExportFinished(Ok("Consolidado_book.xlsx".into())));
        assert_eq!(session.exported.as_deref(), Some("Consolidado_book.xlsx"));
        assert_eq!(session.phase, Phase::Ready);
    }

    #[test]
    fn test_parse_failure_sets_generic_notice() {
        let (session, _) = Session::default().handle(Event::FileSelected { name: "bad.xlsx".into() });
        let event = run_consolidation(
            Err(ConsolidateError::Parse("zip header missing".into())),
            "bad.xlsx",
            &ExtractionRules::default(),
        );
        let (session, _) = session.handle(event);
        assert_eq!(session.notice, Some(Notice::ProcessingFailed));
        assert!(session.result.is_none());
        assert_eq!(session.phase, Phase::Idle);
        assert!(!session.notice.unwrap().message().contains("zip"));
    }

    #[test]
    fn test_analysis_disallowed_on_empty_dataset() {
        let session = consolidated_session(&[]);
        assert!(!session.can_analyze());
        let (session, effect) = session.handle(Event::AnalysisRequested);
        assert_eq!(effect, Effect::None);
        assert_eq!(session.phase, Phase::Ready);

        let (_, effect) = Session::default().handle(Event::AnalysisRequested);
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn test_analysis_failure_keeps_result() {
        let session = consolidated_session(&["x"]);
        let (session, effect) = session.handle(Event::AnalysisRequested);
        assert_eq!(effect, Effect::RequestInsights);

        let (session, _) = session.handle(Event::AnalysisFinished(Err(AnalysisFailure::Malformed(
            "not json".into(),
        ))));
        assert_eq!(session.notice, Some(Notice::InsightsUnavailable { malformed: true }));
        assert!(session.result.is_some());
        assert!(session.can_export());
    }

    #[test]
    fn test_analysis_success() {
        let session = consolidated_session(&["apple", "pear"]);
        let (session, _) = session.handle(Event::AnalysisRequested);
        let (session, _) = session.handle(Event::AnalysisFinished(Ok(sample_insight())));
        assert_eq!(session.analysis, Some(sample_insight()));
        assert!(session.notice.is_none());
    }

    #[test]
    fn test_busy_session_ignores_requests() {
        let session = consolidated_session(&["x"]);
        let (session, _) = session.handle(Event::AnalysisRequested);
        assert_eq!(session.phase, Phase::Analyzing);

        let (session, effect) = session.handle(Event::ExportRequested);
        assert_eq!(effect, Effect::None);
        let (session, effect) = session.handle(Event::FileSelected { name: "other.xlsx".into() });
        assert_eq!(effect, Effect::None);
        assert_eq!(session.result.as_ref().unwrap().file_name, "book.xlsx");
    }

    #[test]
    fn test_new_file_clears_previous_state() {
        let session = consolidated_session(&["x"]);
        let (session, _) = session.handle(Event::AnalysisRequested);
        let (session, _) = session.handle(Event::AnalysisFinished(Ok(sample_insight())));

        let (session, effect) = session.handle(Event::FileSelected { name: "next.xlsx".into() });
        assert!(matches!(effect, Effect::Consolidate { .. }));
        assert!(session.result.is_none());
        assert!(session.analysis.is_none());
    }

    #[test]
    fn test_clearing_analysis_keeps_result() {
        let session = consolidated_session(&["x", "y"]);
        let (session, _) = session.handle(Event::AnalysisRequested);
        let (session, _) = session.handle(Event::AnalysisFinished(Ok(sample_insight())));
        let (session, _) = session.handle(Event::ExportRequested);
        let (session, _) = session.handle(Event::ExportFinished(Ok("Consolidado_book.xlsx".into())));

        let (session, effect) = session.handle(Event::AnalysisCleared);
        assert_eq!(effect, Effect::None);
        assert!(session.analysis.is_none());
        assert_eq!(session.result.as_ref().unwrap().total_rows, 2);
        assert_eq!(session.exported.as_deref(), Some("Consolidado_book.xlsx"));
        assert_eq!(session.phase, Phase::Ready);

        // A new analysis can be requested right away
        let (_, effect) = session.handle(Event::AnalysisRequested);
        assert_eq!(effect, Effect::RequestInsights);
    }

    #[test]
    fn test_clearing_ignored_while_analyzing() {
        let session = consolidated_session(&["x"]);
        let (session, _) = session.handle(Event::AnalysisRequested);
        let (session, _) = session.handle(Event::AnalysisCleared);
        assert_eq!(session.phase, Phase::Analyzing);
        let (session, _) = session.handle(Event::AnalysisFinished(Ok(sample_insight())));
        assert_eq!(session.analysis, Some(sample_insight()));
    }

    #[test]
    fn test_reset_keeps_rules() {
        let (session, _) = Session::default().handle(Event::ColumnEntered("D".into()));
        let (session, _) = session.handle(Event::Reset);
        assert_eq!(session.rules.column, "D");
        assert_eq!(session.phase, Phase::Idle);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let session = consolidated_session(&["x"]);
        let before = session.clone();
        let (session, _) = session.handle(Event::ExportFinished(Ok("late.xlsx".into())));
        assert_eq!(session, before);
    }
}
