use ariadne::{Color, ColorGenerator, Config, Fmt, Label, Report, ReportKind, Source as Cache};

use std::io;
use std::ops::Range;

use crate::error::{CompileError, ErrorKind};
use crate::source::Source;

type Span = (String, Range<usize>);

fn note(kind: ErrorKind) -> Option<String> {
    match kind {
        ErrorKind::StaticCast => Some(format!(
            "an explicit conversion is written {}type{} value",
            Fmt::fg("(", Color::Yellow),
            Fmt::fg(")", Color::Yellow),
        )),
        ErrorKind::StaticScope => Some(format!(
            "variables are declared as {} name = value;",
            Fmt::fg("type", Color::Rgb(205, 150, 100)),
        )),
        _ => None,
    }
}

impl CompileError {
    /// Builds the colored terminal report for this error.
    pub fn report(&self, source: &Source, color: bool) -> Report<'static, Span> {
        let end = source.text.len();
        let range = if self.span.start >= end && end > 0 {
            end - 1..end
        } else {
            self.span.clone()
        };
        let span = (source.name.clone(), range);

        let mut report = Report::build(ReportKind::Error, span.clone())
            .with_config(Config::default().with_color(color))
            .with_code(self.kind.code())
            .with_message(self.header())
            .with_label(
                Label::new(span)
                    .with_message(&self.message)
                    .with_color(ColorGenerator::new().next()),
            );

        if let Some(note) = note(self.kind) {
            report = report.with_note(note);
        }
        report.finish()
    }

    pub fn eprint(&self, source: &Source, color: bool) -> io::Result<()> {
        self.report(source, color)
            .eprint((source.name.clone(), Cache::from(source.text.clone())))
    }
}
