/// The newline-handling mode an [`Interner`](crate::Interner)/line source
/// is fixed to at construction (spec §4.1).
///
/// The recognized input separator is always `"\n"`, optionally preceded by
/// `"\r"`. `Raw` keeps whatever separator (if any) was actually present on
/// a line, so distinct endings intern to distinct tokens. `Lf`/`Crlf` strip
/// the separator before interning (so equivalent lines with different
/// endings intern to the same id) and re-emit the configured separator
/// when writing lines back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    /// Keep the trailing newline (and `\r`, if any) verbatim on every line.
    #[default]
    Raw,
    /// Strip `"\r\n"` or `"\n"` on read; write `"\n"`.
    Lf,
    /// Strip `"\r\n"` or `"\n"` on read; write `"\r\n"`.
    Crlf,
}

impl Newline {
    /// The byte sequence this mode writes after each line.
    pub fn separator(self) -> &'static str {
        match self {
            Newline::Raw => "",
            Newline::Lf => "\n",
            Newline::Crlf => "\r\n",
        }
    }

    /// Strips a single trailing `"\r\n"` or `"\n"` from `line`, if this mode
    /// calls for stripping. `Raw` returns `line` unchanged.
    pub fn strip<'a>(self, line: &'a str) -> &'a str {
        match self {
            Newline::Raw => line,
            Newline::Lf | Newline::Crlf => {
                let line = line.strip_suffix('\n').unwrap_or(line);
                line.strip_suffix('\r').unwrap_or(line)
            }
        }
    }
}
