//! Progressive reveal: the per-span state machine and the script that runs
//! the same machine inside the rendered document.

/// State of one cloze span. `Full` is terminal; spans never regress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reveal {
    Hidden,
    Partial,
    Full,
}

impl Reveal {
    /// Advances one step. Triggering a full span is a no-op.
    pub fn advance(self) -> Reveal {
        match self {
            Reveal::Hidden => Reveal::Partial,
            Reveal::Partial => Reveal::Full,
            Reveal::Full => Reveal::Full,
        }
    }
}

/// All spans of one document plus the shared "reveal next" cursor.
pub struct RevealBoard {
    spans: Vec<Reveal>,
    cursor: usize,
}

impl RevealBoard {
    pub fn new(count: usize) -> Self {
        Self {
            spans: vec![Reveal::Hidden; count],
            cursor: 0,
        }
    }

    pub fn span(&self, index: usize) -> Reveal {
        self.spans[index]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Direct trigger on a single span; the cursor is not involved.
    pub fn reveal_span(&mut self, index: usize) {
        self.spans[index] = self.spans[index].advance();
    }

    /// Global trigger: advances the span at the cursor one step. Completing a
    /// span moves the cursor on (wrapping); a span already completed by direct
    /// triggers is skipped without revealing anything. At most one span
    /// changes per trigger.
    pub fn reveal_next(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let current = self.spans[self.cursor];
        if current == Reveal::Full {
            self.cursor = (self.cursor + 1) % self.spans.len();
            return;
        }
        let next = current.advance();
        self.spans[self.cursor] = next;
        if next == Reveal::Full {
            self.cursor = (self.cursor + 1) % self.spans.len();
        }
    }
}

/// The same machine in the document: `data-revealed` holds the per-span
/// state, `currentClozeIndex` the cursor. Partial shows the first character
/// of the answer; full swaps class `cloze` for `revealed`.
pub const REVEAL_SCRIPT: &str = r#"    <script>
        let clozeElements = [];
        let currentClozeIndex = 0;

        document.addEventListener('DOMContentLoaded', () => {
            clozeElements = Array.from(document.querySelectorAll('.cloze'));

            document.addEventListener('keydown', (event) => {
                if (event.key === 'ArrowRight') {
                    event.preventDefault();
                    revealNextCloze();
                }
            });
        });

        function advanceElement(element) {
            let original = element.getAttribute('data-original');
            if (!element.getAttribute('data-revealed')) {
                element.textContent = original.charAt(0) + '…';
                element.setAttribute('data-revealed', 'partial');
                return 'partial';
            }
            if (element.getAttribute('data-revealed') === 'partial') {
                element.textContent = original;
                element.classList.remove('cloze');
                element.classList.add('revealed');
                element.setAttribute('data-revealed', 'full');
                return 'full';
            }
            return 'noop';
        }

        function revealNextCloze() {
            if (clozeElements.length === 0) return;

            let currentElement = clozeElements[currentClozeIndex];
            if (currentElement.getAttribute('data-revealed') === 'full') {
                currentClozeIndex = (currentClozeIndex + 1) % clozeElements.length;
                return;
            }
            if (advanceElement(currentElement) === 'full') {
                currentClozeIndex = (currentClozeIndex + 1) % clozeElements.length;
            }
        }

        function revealCloze(element) {
            advanceElement(element);
        }
    </script>
"#;

#[test]
fn test_reveal_is_monotonic() {
    let mut board = RevealBoard::new(1);
    assert_eq!(board.span(0), Reveal::Hidden);

    board.reveal_span(0);
    assert_eq!(board.span(0), Reveal::Partial);
    board.reveal_span(0);
    assert_eq!(board.span(0), Reveal::Full);

    // Triggering a full span again is a no-op.
    board.reveal_span(0);
    assert_eq!(board.span(0), Reveal::Full);
}

#[test]
fn test_global_cursor_wraps_over_two_spans() {
    let mut board = RevealBoard::new(2);

    board.reveal_next();
    assert_eq!(board.span(0), Reveal::Partial);
    assert_eq!(board.cursor(), 0);

    board.reveal_next();
    assert_eq!(board.span(0), Reveal::Full);
    assert_eq!(board.cursor(), 1);

    board.reveal_next();
    assert_eq!(board.span(1), Reveal::Partial);
    assert_eq!(board.cursor(), 1);

    board.reveal_next();
    assert_eq!(board.span(1), Reveal::Full);
    assert_eq!(board.cursor(), 0);
}

#[test]
fn test_global_trigger_never_cascades() {
    let mut board = RevealBoard::new(2);
    board.reveal_next();
    board.reveal_next();

    // Span 0 just completed; span 1 must still be untouched.
    assert_eq!(board.span(1), Reveal::Hidden);
}

#[test]
fn test_global_trigger_skips_span_completed_by_clicks() {
    let mut board = RevealBoard::new(2);
    board.reveal_span(0);
    board.reveal_span(0);
    assert_eq!(board.span(0), Reveal::Full);

    // First trigger only moves the cursor past the finished span.
    board.reveal_next();
    assert_eq!(board.cursor(), 1);
    assert_eq!(board.span(1), Reveal::Hidden);

    board.reveal_next();
    assert_eq!(board.span(1), Reveal::Partial);
}

#[test]
fn test_empty_board_ignores_global_trigger() {
    let mut board = RevealBoard::new(0);
    board.reveal_next();
    assert_eq!(board.cursor(), 0);
}
