//! Per-document render state.

use crate::render::Matter;

/// Marker closing one open section container.
const SECTION_CLOSE: &str = "</section>\n";

/// Tracks the stack of open section containers.
///
/// Heading levels map to nesting: a heading at level `n` supersedes every
/// open section at level `n` or deeper. Keeping the actual levels on a stack
/// means a document that jumps levels still closes exactly the sections it
/// opened.
#[derive(Debug, Default)]
pub(crate) struct SectionState {
    open: Vec<u8>,
}

impl SectionState {
    /// Close every section at `level` or deeper, then track the section the
    /// caller is about to open. The caller emits the opening tag itself.
    pub(crate) fn open(&mut self, level: u8, out: &mut String) {
        while self.open.last().is_some_and(|&l| l >= level) {
            self.open.pop();
            out.push_str(SECTION_CLOSE);
        }
        self.open.push(level);
    }

    /// Close every open section. Idempotent.
    pub(crate) fn flush(&mut self, out: &mut String) {
        for _ in self.open.drain(..) {
            out.push_str(SECTION_CLOSE);
        }
    }
}

/// Forward-only matter phase machine.
#[derive(Debug, Default)]
pub(crate) struct MatterState {
    current: Matter,
}

impl MatterState {
    pub(crate) fn current(&self) -> Matter {
        self.current
    }

    /// Advance to `to`, returning the transition when the phase changed.
    /// Same-phase requests are no-ops and backward requests are refused.
    pub(crate) fn advance(&mut self, to: Matter) -> Option<(Matter, Matter)> {
        match to.cmp(&self.current) {
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Less => {
                tracing::warn!(
                    from = self.current.name(),
                    to = to.name(),
                    "ignoring backward matter transition"
                );
                None
            }
            std::cmp::Ordering::Greater => {
                let from = std::mem::replace(&mut self.current, to);
                Some((from, to))
            }
        }
    }
}
