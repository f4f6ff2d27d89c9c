use std::fs;
use std::path::{Path, PathBuf};

use fence::CodeBlock;
use harness::aggregate::{SEPARATOR, render};
use harness::split::write_split;
use harness::{
    CompilationResult, CompileRun, Compiler, Exit, HarnessConfig, HarnessError, ProcessCompiler,
    RunState,
};
use tempfile::TempDir;

/// Rejects any unit whose source contains `reject`, recording what it saw.
struct FakeCompiler {
    reject: &'static str,
    seen: Vec<String>,
    units: Vec<PathBuf>,
}

impl FakeCompiler {
    fn rejecting(reject: &'static str) -> Self {
        FakeCompiler {
            reject,
            seen: Vec::new(),
            units: Vec::new(),
        }
    }
}

impl Compiler for FakeCompiler {
    fn compile(&mut self, unit: &Path) -> harness::Result<Exit> {
        let source = fs::read_to_string(unit).expect("unit must exist while compiling");
        self.seen.push(source.trim().to_string());
        self.units.push(unit.to_path_buf());
        if source.contains(self.reject) {
            Ok(Exit::with_code(1))
        } else {
            Ok(Exit::SUCCESS)
        }
    }
}

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn lpg_fence(code: &str) -> String {
    format!("```lpg\n{}\n```\n", code)
}

/// A documentation tree with three examples spread over two documents.
fn docs() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "a.md",
        &format!("# A\n\n{}\ntext\n\n{}", lpg_fence("one()"), lpg_fence("two()")),
    );
    write(dir.path(), "b/c.md", &format!("# C\n{}", lpg_fence("three()")));
    write(dir.path(), "b/notes.txt", &lpg_fence("ignored()"));
    dir
}

fn config_in(out: &TempDir) -> HarnessConfig {
    HarnessConfig {
        output: out.path().join("documentation.lpg"),
        split_dir: out.path().join("split"),
        ..HarnessConfig::default()
    }
}

fn block(document: &str, index: usize, content: &str) -> CodeBlock {
    CodeBlock {
        document: PathBuf::from(document),
        index,
        content: content.to_string(),
        span: 0..content.len(),
        line: 1,
    }
}

#[test]
fn discovers_documents_in_sorted_order() {
    let dir = docs();
    write(dir.path(), "0-first.md", "");
    let found = harness::discover_documents(dir.path(), ".md").unwrap();
    let names: Vec<String> = found
        .iter()
        .map(|p| harness::discover::document_label(dir.path(), p))
        .collect();
    assert_eq!(names, vec!["0-first.md", "a.md", "b/c.md"]);
}

#[test]
fn collects_blocks_across_documents() {
    let dir = docs();
    let blocks = harness::collect_blocks(dir.path(), &HarnessConfig::default()).unwrap();
    let labels: Vec<String> = blocks.iter().map(|b| b.to_string()).collect();
    assert_eq!(labels, vec!["a.md : 0", "a.md : 1", "b/c.md : 0"]);
    let contents: Vec<&str> = blocks.iter().map(|b| b.content.as_str()).collect();
    assert_eq!(contents, vec!["one()", "two()", "three()"]);
}

#[test]
fn missing_root_is_fatal() {
    let out = TempDir::new().unwrap();
    let config = config_in(&out);
    let missing = out.path().join("does-not-exist");

    let err = harness::aggregate(&missing, &config).unwrap_err();
    assert!(matches!(err, HarnessError::InvalidRoot(ref p) if p == &missing));
    assert!(!config.output.exists());

    assert!(matches!(
        harness::split(&missing, &config),
        Err(HarnessError::InvalidRoot(_))
    ));

    let mut compiler = FakeCompiler::rejecting("never");
    let err = harness::compile(&missing, &config, &mut compiler, |_| {}).unwrap_err();
    assert!(matches!(err, HarnessError::InvalidRoot(_)));
    assert!(compiler.seen.is_empty());
}

#[test]
fn file_root_is_rejected() {
    let dir = docs();
    let err = harness::collect_blocks(&dir.path().join("a.md"), &HarnessConfig::default())
        .unwrap_err();
    assert!(matches!(err, HarnessError::InvalidRoot(_)));
}

#[test]
fn aggregate_annotates_each_block() {
    let dir = docs();
    let out = TempDir::new().unwrap();
    let config = config_in(&out);

    let report = harness::aggregate(dir.path(), &config).unwrap();
    assert_eq!(report.blocks, 3);
    assert_eq!(report.path, config.output);

    let written = fs::read_to_string(&config.output).unwrap();
    assert_eq!(
        written,
        "// a.md : 0\none()\n// a.md : 1\ntwo()\n// b/c.md : 0\nthree()\n"
    );
}

#[test]
fn aggregate_of_empty_tree_has_no_separators() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "empty.md", "");
    write(dir.path(), "prose.md", "# Nothing to see\n");
    let out = TempDir::new().unwrap();
    let config = config_in(&out);

    let report = harness::aggregate(dir.path(), &config).unwrap();
    assert_eq!(report.blocks, 0);
    let written = fs::read_to_string(&config.output).unwrap();
    assert!(!written.contains(SEPARATOR));
    assert!(written.is_empty());
}

#[test]
fn aggregate_overwrites_previous_artifact() {
    let dir = docs();
    let out = TempDir::new().unwrap();
    let config = config_in(&out);
    fs::write(&config.output, "stale content that is much longer than the new one\n".repeat(50))
        .unwrap();

    harness::aggregate(dir.path(), &config).unwrap();
    let written = fs::read_to_string(&config.output).unwrap();
    assert!(!written.contains("stale"));
    assert!(written.starts_with("// a.md : 0\n"));
}

#[test]
fn unterminated_block_aborts_before_writing() {
    let dir = docs();
    write(dir.path(), "z.md", &format!("{}\n```lpg\nbroken(", lpg_fence("fine()")));
    let out = TempDir::new().unwrap();
    let config = config_in(&out);
    fs::write(&config.output, "previous").unwrap();

    let err = harness::aggregate(dir.path(), &config).unwrap_err();
    match err {
        HarnessError::Unterminated { path, source } => {
            assert_eq!(path, dir.path().join("z.md"));
            assert_eq!(source.index, 1);
            assert_eq!(source.line, 5);
        }
        other => panic!("expected unterminated block, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&config.output).unwrap(), "previous");
}

#[test]
fn render_without_annotations() {
    let blocks = vec![block("a.md", 0, "x"), block("a.md", 1, "")];
    let aggregate = render(&blocks, false);
    assert_eq!(aggregate.len(), 2);
    assert_eq!(aggregate.finish(), "//\nx\n//\n\n");
}

#[test]
fn split_counter_is_global() {
    let dir = docs();
    let out = TempDir::new().unwrap();
    let config = config_in(&out);

    let written = harness::split(dir.path(), &config).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["0.lpg", "1.lpg", "2.lpg"]);
    assert_eq!(
        fs::read_to_string(config.split_dir.join("2.lpg")).unwrap(),
        "three()\n"
    );

    let mut on_disk: Vec<String> = fs::read_dir(&config.split_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    on_disk.sort();
    assert_eq!(on_disk, vec!["0.lpg", "1.lpg", "2.lpg"]);
}

#[test]
fn split_removes_files_from_larger_runs() {
    let out = TempDir::new().unwrap();
    let dir = out.path().join("split");
    fs::create_dir_all(&dir).unwrap();
    for name in ["0.lpg", "5.lpg", "9.lpg", "README.md", "notes.lpg"] {
        fs::write(dir.join(name), "old").unwrap();
    }

    write_split(&[block("a.md", 0, "new()")], &dir, "lpg").unwrap();

    let mut on_disk: Vec<String> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    on_disk.sort();
    assert_eq!(on_disk, vec!["0.lpg", "README.md", "notes.lpg"]);
    assert_eq!(fs::read_to_string(dir.join("0.lpg")).unwrap(), "new()\n");
}

#[test]
fn split_cleanup_errors_are_reported() {
    let out = TempDir::new().unwrap();
    let dir = out.path().join("split");
    // A directory that looks like a stale example cannot be removed as a file.
    fs::create_dir_all(dir.join("7.lpg")).unwrap();

    let err = write_split(&[block("a.md", 0, "new()")], &dir, "lpg").unwrap_err();
    match err {
        HarnessError::Write { path, .. } => assert_eq!(path, dir.join("7.lpg")),
        other => panic!("expected a write error, got {other:?}"),
    }
}

#[test]
fn compile_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.md", &format!("{}{}", lpg_fence("ok(1)"), lpg_fence("bad(2)")));
    write(dir.path(), "b.md", &lpg_fence("ok(3)"));
    let out = TempDir::new().unwrap();
    let config = config_in(&out);

    let mut compiler = FakeCompiler::rejecting("bad");
    let mut reported: Vec<CompilationResult> = Vec::new();
    let err = harness::compile(dir.path(), &config, &mut compiler, |r| reported.push(r.clone()))
        .unwrap_err();

    match err {
        HarnessError::CompilationFailed {
            document,
            index,
            exit,
        } => {
            assert_eq!(document, "a.md");
            assert_eq!(index, 1);
            assert_eq!(exit, Exit::with_code(1));
        }
        other => panic!("expected compilation failure, got {other:?}"),
    }

    assert_eq!(compiler.seen, vec!["ok(1)", "bad(2)"]);
    assert_eq!(reported.len(), 2);
    assert!(reported[0].success());
    assert!(!reported[1].success());
}

#[test]
fn compile_reports_success_for_clean_tree() {
    let dir = docs();
    let out = TempDir::new().unwrap();
    let config = config_in(&out);

    let mut compiler = FakeCompiler::rejecting("never");
    let report = harness::compile(dir.path(), &config, &mut compiler, |_| {}).unwrap();
    assert_eq!(report.passed(), 3);
    assert_eq!(compiler.seen, vec!["one()", "two()", "three()"]);

    // Units are distinct files, each removed after its compilation.
    assert_eq!(compiler.units.len(), 3);
    for unit in &compiler.units {
        assert!(!unit.exists(), "{} was not cleaned up", unit.display());
        assert_eq!(unit.extension().and_then(|e| e.to_str()), Some("lpg"));
    }
}

#[test]
fn compile_run_state_machine() {
    let blocks = vec![
        block("a.md", 0, "ok"),
        block("a.md", 1, "bad"),
        block("b.md", 0, "ok"),
    ];
    let mut compiler = FakeCompiler::rejecting("bad");
    let mut run = CompileRun::new(&blocks, &mut compiler, "lpg");
    assert_eq!(run.state(), RunState::Pending);

    assert!(run.step().unwrap().unwrap().success());
    assert_eq!(run.state(), RunState::Compiling(0));

    assert!(!run.step().unwrap().unwrap().success());
    assert_eq!(run.state(), RunState::Failed);

    assert!(run.step().unwrap().is_none());
    assert_eq!(run.results().len(), 2);
    assert!(matches!(
        run.finish(),
        Err(HarnessError::CompilationFailed { index: 1, .. })
    ));
}

#[test]
fn compile_run_with_no_blocks_succeeds() {
    let mut compiler = FakeCompiler::rejecting("never");
    let mut run = CompileRun::new(&[], &mut compiler, "lpg");
    assert!(run.step().unwrap().is_none());
    assert_eq!(run.state(), RunState::Success);
    assert_eq!(run.finish().unwrap().passed(), 0);
}

#[test]
fn missing_compiler_is_a_launch_error() {
    let blocks = vec![block("a.md", 0, "x")];
    let mut compiler = ProcessCompiler::new("/nonexistent/lpg-compiler", "compile");
    let err = harness::compile_blocks(&blocks, &mut compiler, "lpg", |_| {}).unwrap_err();
    assert!(matches!(err, HarnessError::CompilerLaunch { .. }));
}

#[cfg(unix)]
#[test]
fn process_compiler_reads_exit_status() {
    let blocks = vec![block("a.md", 0, "x")];

    let mut accepting = ProcessCompiler::new("true", "compile");
    let report = harness::compile_blocks(&blocks, &mut accepting, "lpg", |_| {}).unwrap();
    assert_eq!(report.passed(), 1);

    let mut rejecting = ProcessCompiler::new("false", "compile");
    let err = harness::compile_blocks(&blocks, &mut rejecting, "lpg", |_| {}).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::CompilationFailed { exit, .. } if exit == Exit::with_code(1)
    ));
}

#[test]
fn config_defaults_and_overrides() {
    let config = HarnessConfig::from_toml("").unwrap();
    assert_eq!(config, HarnessConfig::default());
    assert_eq!(config.start_tag, "```lpg");
    assert_eq!(config.compile_command, "compile");

    let config = HarnessConfig::from_toml(
        "start_tag = \"```rust\"\nsuffix = \".markdown\"\nannotate = false\n",
    )
    .unwrap();
    assert_eq!(config.start_tag, "```rust");
    assert_eq!(config.end_tag, "```");
    assert_eq!(config.suffix, ".markdown");
    assert!(!config.annotate);
}

#[test]
fn config_rejects_bad_input() {
    assert!(matches!(
        HarnessConfig::from_toml("no_such_key = 1"),
        Err(HarnessError::Config(_))
    ));
    assert!(matches!(
        HarnessConfig::from_toml("end_tag = \"\""),
        Err(HarnessError::Config(_))
    ));
    assert!(matches!(
        HarnessConfig::from_toml("suffix = \"\""),
        Err(HarnessError::Config(_))
    ));
}

#[test]
fn config_is_discovered_in_root() {
    let dir = docs();
    assert_eq!(
        HarnessConfig::discover(None, dir.path()).unwrap(),
        HarnessConfig::default()
    );

    write(dir.path(), "lpg-doc.toml", "compiler = \"/opt/lpg/bin/lpg\"\n");
    let config = HarnessConfig::discover(None, dir.path()).unwrap();
    assert_eq!(config.compiler, PathBuf::from("/opt/lpg/bin/lpg"));

    let missing = dir.path().join("missing.toml");
    assert!(matches!(
        HarnessConfig::discover(Some(&missing), dir.path()),
        Err(HarnessError::Read { .. })
    ));
}

#[test]
fn custom_tags_from_config() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "page.md",
        "```rust\nfn main() {}\n```\n```lpg\nlpg()\n```\n",
    );
    let config = HarnessConfig {
        start_tag: "```rust".to_string(),
        ..HarnessConfig::default()
    };
    let blocks = harness::collect_blocks(dir.path(), &config).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].content, "fn main() {}");
}

/// Compiles the first unit, then cannot be launched any more.
struct LaunchFailsAfterFirst {
    calls: usize,
}

impl Compiler for LaunchFailsAfterFirst {
    fn compile(&mut self, _unit: &Path) -> harness::Result<Exit> {
        self.calls += 1;
        if self.calls == 1 {
            Ok(Exit::SUCCESS)
        } else {
            Err(HarnessError::CompilerLaunch {
                compiler: PathBuf::from("lpg"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            })
        }
    }
}

#[test]
fn compile_run_aborted_by_launch_error_never_succeeds() {
    let blocks = vec![
        block("a.md", 0, "one"),
        block("a.md", 1, "two"),
        block("b.md", 0, "three"),
    ];
    let mut compiler = LaunchFailsAfterFirst { calls: 0 };
    let mut run = CompileRun::new(&blocks, &mut compiler, "lpg");

    assert!(run.step().unwrap().unwrap().success());
    assert!(matches!(
        run.step(),
        Err(HarnessError::CompilerLaunch { .. })
    ));
    assert_eq!(run.state(), RunState::Aborted(1));
    assert!(run.step().unwrap().is_none());
    assert_eq!(run.results().len(), 1);

    match run.finish() {
        Err(HarnessError::Aborted { document, index }) => {
            assert_eq!(document, "a.md");
            assert_eq!(index, 1);
        }
        other => panic!("expected an aborted run, got {other:?}"),
    }
    assert_eq!(compiler.calls, 2);
}
