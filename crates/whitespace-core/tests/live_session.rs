use pretty_assertions::assert_eq;
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;
use whitespace_core::{
    ConfigProvider, CursorPosition, CursorProvider, DocumentId, DocumentProvider,
    HighlightCategory, HighlightLayer, ManualTimer, Position, RenderSink, RuleKind, RuleSet,
    ScanOutcome, Span, WhitespaceConfig, WhitespaceHighlighter,
};

const DELAY: Duration = Duration::from_millis(250);
const DOC_A: DocumentId = DocumentId(1);
const DOC_B: DocumentId = DocumentId(2);

#[derive(Default)]
struct FakeHost {
    documents: HashMap<DocumentId, (String, u64)>,
    active: Option<DocumentId>,
    cursor: Option<CursorPosition>,
    config: WhitespaceConfig,
    renders_whitespace: bool,
}

impl FakeHost {
    fn with_document(id: DocumentId, text: &str) -> Self {
        let mut host = Self::default();
        host.open(id, text);
        host.active = Some(id);
        host
    }

    fn open(&mut self, id: DocumentId, text: &str) {
        self.documents.insert(id, (text.to_string(), 1));
    }

    fn edit(&mut self, id: DocumentId, text: &str) {
        let entry = self.documents.get_mut(&id).unwrap();
        entry.0 = text.to_string();
        entry.1 += 1;
    }
}

impl DocumentProvider for FakeHost {
    fn active_document(&self) -> Option<DocumentId> {
        self.active
    }

    fn revision(&self, document: DocumentId) -> Option<u64> {
        self.documents.get(&document).map(|(_, rev)| *rev)
    }

    fn text(&self, document: DocumentId) -> Option<Cow<'_, str>> {
        self.documents
            .get(&document)
            .map(|(text, _)| Cow::Borrowed(text.as_str()))
    }
}

impl CursorProvider for FakeHost {
    fn cursor(&self) -> Option<CursorPosition> {
        self.cursor
    }
}

impl ConfigProvider for FakeHost {
    fn config(&self) -> WhitespaceConfig {
        self.config.clone()
    }

    fn host_renders_whitespace(&self) -> bool {
        self.renders_whitespace
    }
}

#[derive(Default)]
struct RecordingSink {
    paints: Vec<(HighlightLayer, Vec<Span>)>,
    messages: Vec<String>,
}

impl RecordingSink {
    /// Spans from the most recent paint of `category`.
    fn latest(&self, category: HighlightCategory) -> Vec<(usize, usize)> {
        self.paints
            .iter()
            .rev()
            .find(|(layer, _)| layer.category == category)
            .map(|(_, spans)| spans.iter().map(|s| (s.start, s.end)).collect())
            .unwrap_or_default()
    }

    fn scan_count(&self) -> usize {
        self.paints.len() / HighlightCategory::ALL.len()
    }
}

impl RenderSink for RecordingSink {
    fn paint(&mut self, layer: &HighlightLayer, spans: &[Span]) {
        self.paints.push((layer.clone(), spans.to_vec()));
    }

    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

fn highlighter(config: WhitespaceConfig) -> WhitespaceHighlighter<ManualTimer> {
    WhitespaceHighlighter::new(RuleSet::builtin().unwrap(), config, ManualTimer::new())
}

fn advance(
    hl: &mut WhitespaceHighlighter<ManualTimer>,
    by: Duration,
    host: &FakeHost,
    sink: &mut RecordingSink,
) -> Vec<ScanOutcome> {
    hl.timer_mut()
        .advance(by)
        .into_iter()
        .map(|handle| hl.fire(handle, host, host, host, sink))
        .collect()
}

const TRAILING: HighlightCategory = HighlightCategory::Rule(RuleKind::TrailingWhitespace);
const MIXED: HighlightCategory = HighlightCategory::Rule(RuleKind::MixedIndentation);

#[test]
fn test_burst_of_edits_scans_once_with_last_text() {
    let mut host = FakeHost::with_document(DOC_A, "a");
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    let texts = ["a ", "a  ", "a  \nb", "a  \nb\t", "a  \nb\t\n"];
    for text in texts {
        host.edit(DOC_A, text);
        hl.on_text_changed(&host, DOC_A);
        assert_eq!(
            advance(&mut hl, Duration::from_millis(100), &host, &mut sink),
            vec![]
        );
    }
    assert_eq!(sink.scan_count(), 0);

    let outcomes = advance(&mut hl, Duration::from_millis(150), &host, &mut sink);
    assert_eq!(
        outcomes,
        vec![ScanOutcome::Painted {
            document: DOC_A,
            spans: 2
        }]
    );
    assert_eq!(sink.scan_count(), 1);
    assert_eq!(sink.latest(TRAILING), vec![(1, 3), (5, 6)]);

    // Quiet afterwards.
    assert_eq!(advance(&mut hl, DELAY * 4, &host, &mut sink), vec![]);
    assert_eq!(sink.scan_count(), 1);
}

#[test]
fn test_each_category_painted_once_per_scan() {
    let host = FakeHost::with_document(DOC_A, " \tx  \n");
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.on_text_changed(&host, DOC_A);
    advance(&mut hl, DELAY, &host, &mut sink);

    let categories: Vec<_> = sink.paints.iter().map(|(layer, _)| layer.category).collect();
    assert_eq!(categories, HighlightCategory::ALL.to_vec());
    assert_eq!(sink.latest(MIXED), vec![(0, 2)]);
    assert_eq!(sink.latest(TRAILING), vec![(3, 5)]);
    assert_eq!(sink.latest(HighlightCategory::WhitespaceGlyphs), vec![]);
    assert!(
        sink.paints[1]
            .1
            .iter()
            .all(|s| s.annotation == Some("Unnecessary trailing whitespace."))
    );
}

#[test]
fn test_toggle_twice_restores_results() {
    let host = FakeHost::with_document(DOC_A, "x  \n \ty\n");
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.on_active_document_changed(&host);
    advance(&mut hl, DELAY, &host, &mut sink);
    let before = (sink.latest(MIXED), sink.latest(TRAILING));
    assert_eq!(before, (vec![(4, 6)], vec![(1, 3)]));

    assert!(!hl.toggle(&host, &mut sink));
    advance(&mut hl, DELAY, &host, &mut sink);
    assert_eq!((sink.latest(MIXED), sink.latest(TRAILING)), (vec![], vec![]));

    assert!(hl.toggle(&host, &mut sink));
    advance(&mut hl, DELAY, &host, &mut sink);
    assert_eq!((sink.latest(MIXED), sink.latest(TRAILING)), before);

    assert!(hl.show_highlights());
    assert_eq!(
        sink.messages,
        vec![
            "Whitespace highlighting disabled".to_string(),
            "Whitespace highlighting enabled".to_string(),
        ]
    );
    assert_eq!(sink.scan_count(), 3);
}

#[test]
fn test_toggle_is_debounced_with_edits() {
    let mut host = FakeHost::with_document(DOC_A, "a ");
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.on_text_changed(&host, DOC_A);
    advance(&mut hl, Duration::from_millis(100), &host, &mut sink);
    hl.toggle(&host, &mut sink);
    advance(&mut hl, Duration::from_millis(100), &host, &mut sink);
    host.edit(DOC_A, "a  ");
    hl.on_text_changed(&host, DOC_A);
    advance(&mut hl, DELAY, &host, &mut sink);

    assert_eq!(sink.scan_count(), 1);
    assert_eq!(sink.latest(TRAILING), vec![]);
}

#[test]
fn test_switching_documents_rearms_for_new_document() {
    let mut host = FakeHost::with_document(DOC_A, "a  ");
    host.open(DOC_B, "b\t\nc");
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.on_text_changed(&host, DOC_A);
    advance(&mut hl, Duration::from_millis(200), &host, &mut sink);
    host.active = Some(DOC_B);
    hl.on_active_document_changed(&host);

    let outcomes = advance(&mut hl, DELAY, &host, &mut sink);
    assert_eq!(
        outcomes,
        vec![ScanOutcome::Painted {
            document: DOC_B,
            spans: 1
        }]
    );
    assert_eq!(sink.scan_count(), 1);
    assert_eq!(sink.latest(TRAILING), vec![(1, 2)]);
}

#[test]
fn test_unannounced_switch_discards_stale_scan() {
    let mut host = FakeHost::with_document(DOC_A, "a  ");
    host.open(DOC_B, "b\t");
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.on_text_changed(&host, DOC_A);
    host.active = Some(DOC_B);

    assert_eq!(
        advance(&mut hl, DELAY, &host, &mut sink),
        vec![ScanOutcome::Stale]
    );
    assert!(sink.paints.is_empty());
}

#[test]
fn test_closing_document_cancels_pending_scan() {
    let mut host = FakeHost::with_document(DOC_A, "a  ");
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.on_text_changed(&host, DOC_A);
    host.documents.remove(&DOC_A);
    host.active = None;
    hl.on_document_closed(DOC_A);

    assert!(!hl.scheduler().is_pending());
    assert_eq!(advance(&mut hl, DELAY, &host, &mut sink), vec![]);
    assert!(sink.paints.is_empty());
}

#[test]
fn test_missing_document_is_not_an_error() {
    let mut host = FakeHost::with_document(DOC_A, "a  ");
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.on_text_changed(&host, DOC_A);
    host.active = None;
    assert_eq!(
        advance(&mut hl, DELAY, &host, &mut sink),
        vec![ScanOutcome::NoDocument]
    );

    // With nothing active, triggers do not arm anything.
    hl.on_active_document_changed(&host);
    assert!(!hl.scheduler().is_pending());
    assert!(sink.paints.is_empty());
}

#[test]
fn test_edits_to_background_documents_are_ignored() {
    let mut host = FakeHost::with_document(DOC_A, "a");
    host.open(DOC_B, "b  ");
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    host.edit(DOC_B, "b   ");
    hl.on_text_changed(&host, DOC_B);
    assert!(!hl.scheduler().is_pending());
    assert_eq!(advance(&mut hl, DELAY, &host, &mut sink), vec![]);
}

#[test]
fn test_cursor_suppression_live() {
    let mut host = FakeHost::with_document(DOC_A, "foo  \nbar");
    host.cursor = Some(CursorPosition::LineColumn(Position::new(0, 5)));
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.on_text_changed(&host, DOC_A);
    advance(&mut hl, DELAY, &host, &mut sink);
    assert_eq!(sink.latest(TRAILING), vec![]);

    host.cursor = Some(CursorPosition::Offset(4));
    hl.on_text_changed(&host, DOC_A);
    advance(&mut hl, DELAY, &host, &mut sink);
    assert_eq!(sink.latest(TRAILING), vec![(3, 5)]);
}

#[test]
fn test_cursor_move_rescans_without_edit() {
    let mut host = FakeHost::with_document(DOC_A, "foo  \nbar");
    host.cursor = Some(CursorPosition::Offset(0));
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.on_text_changed(&host, DOC_A);
    advance(&mut hl, DELAY, &host, &mut sink);
    assert_eq!(sink.latest(TRAILING), vec![(3, 5)]);

    host.cursor = Some(CursorPosition::Offset(5));
    hl.on_cursor_moved(&host);
    assert!(hl.scheduler().is_pending());
    advance(&mut hl, DELAY, &host, &mut sink);
    assert_eq!(sink.scan_count(), 2);
    assert_eq!(sink.latest(TRAILING), vec![]);
}

#[test]
fn test_config_change_disables_one_rule() {
    let mut host = FakeHost::with_document(DOC_A, " \tx  \n");
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.on_text_changed(&host, DOC_A);
    advance(&mut hl, DELAY, &host, &mut sink);
    assert_eq!(sink.latest(MIXED), vec![(0, 2)]);

    host.config.rule_mut(RuleKind::MixedIndentation).enabled = false;
    host.config.debounce_ms = 50;
    hl.on_config_changed(&host, &host);

    assert_eq!(
        advance(&mut hl, Duration::from_millis(50), &host, &mut sink),
        vec![ScanOutcome::Painted {
            document: DOC_A,
            spans: 1
        }]
    );
    assert_eq!(sink.latest(MIXED), vec![]);
    assert_eq!(sink.latest(TRAILING), vec![(3, 5)]);
    assert!(!hl.config().is_rule_enabled(RuleKind::MixedIndentation));
}

#[test]
fn test_toggled_state_survives_unrelated_config_change() {
    let mut host = FakeHost::with_document(DOC_A, "a  ");
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.toggle(&host, &mut sink);
    host.config.debounce_ms = 100;
    hl.on_config_changed(&host, &host);
    assert!(!hl.show_highlights());

    host.config.show_highlights = false;
    hl.on_config_changed(&host, &host);
    assert!(!hl.show_highlights());

    host.config.show_highlights = true;
    hl.on_config_changed(&host, &host);
    assert!(hl.show_highlights());
}

#[test]
fn test_color_overrides_reach_the_sink() {
    let mut host = FakeHost::with_document(DOC_A, "a  ");
    host.config.trailing_whitespace.color = Some("rgba(255, 0, 0, 0.25)".to_string());
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(WhitespaceConfig::default());

    hl.on_config_changed(&host, &host);
    advance(&mut hl, DELAY, &host, &mut sink);

    let colors: Vec<_> = sink
        .paints
        .iter()
        .map(|(layer, _)| (layer.category, layer.color.clone()))
        .collect();
    assert_eq!(
        colors,
        vec![
            (MIXED, None),
            (TRAILING, Some("rgba(255, 0, 0, 0.25)".to_string())),
            (HighlightCategory::WhitespaceGlyphs, None),
        ]
    );
}

#[test]
fn test_glyphs_respect_host_whitespace_rendering() {
    let mut host = FakeHost::with_document(DOC_A, "a \t\n");
    host.config.show_whitespace_glyphs = true;
    let mut sink = RecordingSink::default();
    let mut hl = highlighter(host.config.clone());

    hl.on_text_changed(&host, DOC_A);
    advance(&mut hl, DELAY, &host, &mut sink);
    assert_eq!(
        sink.latest(HighlightCategory::WhitespaceGlyphs),
        vec![(1, 2), (2, 3)]
    );

    host.renders_whitespace = true;
    hl.on_text_changed(&host, DOC_A);
    advance(&mut hl, DELAY, &host, &mut sink);
    assert_eq!(sink.latest(HighlightCategory::WhitespaceGlyphs), vec![]);
    // Classification itself is unaffected.
    assert_eq!(sink.latest(TRAILING), vec![(1, 3)]);

    host.config.defer_to_host_whitespace = false;
    hl.on_config_changed(&host, &host);
    advance(&mut hl, DELAY, &host, &mut sink);
    assert_eq!(
        sink.latest(HighlightCategory::WhitespaceGlyphs),
        vec![(1, 2), (2, 3)]
    );
}
