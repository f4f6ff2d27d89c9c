use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use fence::CodeBlock;
use harness::{CompilationResult, HarnessError};

/// Terminal styling for user-facing output.
pub struct Style {
    no_color: bool,
}

impl Style {
    pub fn new(no_color: bool) -> Self {
        Style { no_color }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.no_color {
            s.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, s)
        }
    }

    fn pass(&self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(&self) -> String {
        self.paint("31", "FAIL")
    }

    fn color_choice(&self) -> ColorChoice {
        if self.no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        }
    }
}

pub fn print_result(result: &CompilationResult, style: &Style) {
    if result.success() {
        eprintln!("  {}  {} : {}", style.pass(), result.document, result.index);
    } else {
        eprintln!(
            "  {}  {} : {} ({})",
            style.fail(),
            result.document,
            result.index,
            result.exit
        );
    }
}

pub fn print_summary(passed: usize, failed: usize, style: &Style) {
    eprintln!();
    if failed == 0 {
        eprintln!("test result: {}. {} passed, 0 failed", style.paint("32", "ok"), passed);
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (remaining examples skipped)",
            style.paint("31", "FAILED"),
            passed,
            failed
        );
    }
}

pub fn print_listing(blocks: &[CodeBlock]) {
    for block in blocks {
        println!("{} (line {})", block, block.line);
    }
}

pub fn print_error(err: &HarnessError, style: &Style) {
    if let HarnessError::Unterminated { path, source } = err {
        // Point at the fence in its document when the file is still readable.
        if let Ok(text) = std::fs::read_to_string(path) {
            let mut files = SimpleFiles::new();
            let file_id = files.add(path.display().to_string(), text);
            let writer = StandardStream::stderr(style.color_choice());
            let config = term::Config::default();
            let diagnostic = source.to_diagnostic(file_id);
            let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            return;
        }
    }
    eprintln!("{}: {}", style.paint("1;31", "error"), err);
}
