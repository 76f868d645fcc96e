use thiserror::Error;

use self::block::{BlockKind, BlockSummary, BlockWriter};
use self::diagnostics::{Diagnostic, Reporter};
use self::line::{classify, Line, BYTE_MAX, WORD_MAX};
use self::listing::ListingLine;
use self::preprocessor::{ConditionalStack, DefineSet};

/// Maintains the set of defined symbols and the conditional inclusion stack.
pub mod preprocessor;

/// Classifies source lines into directives and octal data.
pub mod line;

/// Accumulates bytes and frames absolute format blocks.
pub mod block;

/// Collects line-tagged errors and notes.
pub mod diagnostics;

/// Listing records for `--list` output.
pub mod listing;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TranslateError {
    #[error("line {line}: {source}")]
    Capacity {
        line: usize,
        source: block::CapacityError,
    },
}

/// The outcome of a run.
///
/// The image is always fully formed, errors or not; whether it is persisted
/// is the caller's decision.
#[derive(Debug)]
pub struct Translation {
    /// Complete absolute format image, halt block included.
    pub image: Vec<u8>,
    /// Collected errors and notes in input order.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of error-severity diagnostics.
    pub errors: usize,
    /// One summary per emitted block.
    pub blocks: Vec<BlockSummary>,
    /// Per-line listing records, when requested.
    pub listing: Vec<ListingLine>,
}

/// Single-pass translation state, threaded through every line.
#[derive(Debug, Default)]
pub struct Translator {
    defines: DefineSet,
    conditions: ConditionalStack,
    writer: BlockWriter,
    reporter: Reporter,
    blocks: Vec<BlockSummary>,
    listing: Option<Vec<ListingLine>>,
    line: usize,
}

impl Translator {
    pub fn new() -> Translator {
        Translator::default()
    }

    /// Predefine a symbol for `#ifdef` evaluation.
    pub fn define(&mut self, symbol: &str) {
        self.defines.define(symbol);
    }

    /// Record a listing entry for every physical input line.
    pub fn with_listing(mut self) -> Translator {
        self.listing = Some(Vec::new());
        self
    }

    pub fn translate(mut self, input: &str) -> Result<Translation, TranslateError> {
        for raw in input.lines() {
            self.process_line(raw)?;
        }
        self.flush(BlockKind::Data);
        self.flush(BlockKind::Halt);

        let errors = self.reporter.error_count();
        Ok(Translation {
            image: self.writer.into_image(),
            diagnostics: self.reporter.into_diagnostics(),
            errors,
            blocks: self.blocks,
            listing: self.listing.unwrap_or_default(),
        })
    }

    fn process_line(&mut self, raw: &str) -> Result<(), TranslateError> {
        self.line += 1;
        if let Some(listing) = &mut self.listing {
            listing.push(ListingLine::new(self.line, self.writer.pc(), raw));
        }

        let text = raw.trim();
        if text.is_empty() || text.starts_with("//") {
            return Ok(());
        }

        match classify(text) {
            Ok(parsed) if parsed.is_conditional() => self.apply_conditional(parsed),
            // Inside a false branch everything else is invisible, syntax
            // errors included.
            _ if self.conditions.is_suppressed() => {}
            Ok(parsed) => self.apply(parsed)?,
            Err(err) => self.reporter.error(self.line, err.to_string()),
        }
        Ok(())
    }

    fn apply_conditional(&mut self, parsed: Line) {
        let result = match parsed {
            Line::IfLiteral(active) => {
                self.conditions.push(active);
                Ok(())
            }
            Line::Ifdef(symbol) => {
                self.conditions.push(self.defines.contains(symbol));
                Ok(())
            }
            Line::Else => self.conditions.toggle_else(),
            Line::Endif => self.conditions.pop(),
            _ => unreachable!("only conditional lines reach here"),
        };
        if let Err(err) = result {
            self.reporter.error(self.line, err.to_string());
        }
    }

    fn apply(&mut self, parsed: Line) -> Result<(), TranslateError> {
        match parsed {
            Line::Define(symbol) => {
                self.defines.define(symbol);
                self.reporter.note(self.line, format!("#define {symbol}"));
            }
            Line::UserError(text) => {
                self.reporter.error(self.line, format!("\"{text}\""));
            }
            Line::UserWarning(text) => {
                self.reporter.note(self.line, format!("\"{text}\""));
            }
            Line::Origin(value) => {
                self.flush(BlockKind::Data);
                if value > WORD_MAX {
                    self.reporter
                        .error(self.line, format!("range org={value:06o}"));
                }
                // The value lands in org/pc even when out of range, so
                // later consistency checks track the declared addresses.
                self.writer.set_origin(value);
            }
            Line::CheckCurrent(value) => {
                if value > WORD_MAX {
                    self.reporter
                        .error(self.line, format!("'::' range check={value:06o}"));
                }
                let pc = self.writer.pc();
                if pc != value {
                    self.reporter.error(
                        self.line,
                        format!(
                            "consistency check, expecting pc={pc:06o} but \":: {value:06o}\" specified"
                        ),
                    );
                }
                self.flush(BlockKind::Data);
            }
            Line::CheckPrevious(value) => {
                if value > WORD_MAX {
                    self.reporter
                        .error(self.line, format!("':' range check={value:06o}"));
                }
                let lagging = i64::from(self.writer.pc()) - 2;
                if lagging != i64::from(value) {
                    self.reporter.error(
                        self.line,
                        format!(
                            "consistency check, expecting (pc-2)={lagging:06o} but \": {value:06o}\" specified"
                        ),
                    );
                }
                self.flush(BlockKind::Data);
            }
            Line::Byte(value) => {
                if value > BYTE_MAX {
                    self.reporter
                        .error(self.line, format!("range b={value:04o}"));
                }
                self.push_byte((value & 0xff) as u8)?;
            }
            Line::Words(words) => {
                for &word in &words {
                    if word > WORD_MAX {
                        self.reporter
                            .error(self.line, format!("range word={word:06o}"));
                    }
                }
                if self.writer.pc() % 2 != 0 {
                    self.reporter
                        .error(self.line, format!("odd pc={:06o}", self.writer.pc()));
                }
                for &word in &words {
                    self.push_word((word & 0xffff) as u16)?;
                }
            }
            Line::IfLiteral(_) | Line::Ifdef(_) | Line::Else | Line::Endif => {
                unreachable!("conditional lines are handled before suppression gating")
            }
        }
        Ok(())
    }

    fn push_word(&mut self, word: u16) -> Result<(), TranslateError> {
        self.writer
            .push_word(word)
            .map_err(|source| TranslateError::Capacity {
                line: self.line,
                source,
            })
    }

    fn push_byte(&mut self, byte: u8) -> Result<(), TranslateError> {
        self.writer
            .push_byte(byte)
            .map_err(|source| TranslateError::Capacity {
                line: self.line,
                source,
            })
    }

    fn flush(&mut self, kind: BlockKind) {
        if let Some(summary) = self.writer.flush(kind) {
            self.blocks.push(summary);
        }
    }
}

/// Utility function for translating a transcription with a set of
/// predefined symbols.
#[tracing::instrument]
pub fn translate_source(input: &str, defines: &[String]) -> Result<Translation, TranslateError> {
    let mut translator = Translator::new();
    for symbol in defines {
        translator.define(symbol);
    }
    translator.translate(input)
}
