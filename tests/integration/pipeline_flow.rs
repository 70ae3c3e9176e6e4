//! End-to-end pipeline runs against a fake schema compiler.

#![cfg(unix)]

use crate::integration::test_utils::{at, mtime, set_mtime, write_archive, write_source, FakeCompiler};
use idlsync::compiler::CompilerConfig;
use idlsync::error::PipelineError;
use idlsync::extract::StaticResolver;
use idlsync::pipeline::{Pipeline, PipelineConfig};
use idlsync::types::{DependencyRef, RunState};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Layout {
    src: PathBuf,
    out: PathBuf,
    external: PathBuf,
}

fn layout(root: &Path) -> Layout {
    let layout = Layout {
        src: root.join("src"),
        out: root.join("out"),
        external: root.join("external"),
    };
    fs::create_dir_all(&layout.src).unwrap();
    layout
}

fn pipeline(layout: &Layout, compiler: &FakeCompiler) -> Pipeline {
    pipeline_with_dependencies(layout, compiler, Vec::new(), StaticResolver::new())
}

fn pipeline_with_dependencies(
    layout: &Layout,
    compiler: &FakeCompiler,
    dependencies: Vec<DependencyRef>,
    resolver: StaticResolver,
) -> Pipeline {
    let config = PipelineConfig::new(
        layout.src.clone(),
        layout.out.clone(),
        layout.external.clone(),
    )
    .with_extensions("def", "gen")
    .with_dependencies(dependencies)
    .with_compiler(CompilerConfig {
        binary: compiler.binary.to_string_lossy().into_owned(),
        ..CompilerConfig::default()
    });
    Pipeline::new(config, Box::new(resolver))
}

#[test]
fn test_stale_output_is_recompiled_and_stamped_with_newest_source() {
    let temp_dir = TempDir::new().unwrap();
    let layout = layout(temp_dir.path());
    let a = write_source(&layout.src, "a.def", 100);
    let b = write_source(&layout.src, "b.def", 200);
    fs::create_dir_all(&layout.out).unwrap();
    set_mtime(&layout.out, 150);

    let compiler = FakeCompiler::succeeding(&temp_dir.path().join("bin"));
    let pipeline = pipeline(&layout, &compiler);

    let outcome = pipeline.run().unwrap();
    assert_eq!(outcome.state, RunState::Compiled);
    assert_eq!(
        outcome.generated_files,
        vec![layout.out.join("a.gen"), layout.out.join("b.gen")]
    );
    // The marker is the newest source time, not the wall clock
    assert_eq!(mtime(&layout.out), at(200));

    let invocations = compiler.invocations();
    assert_eq!(invocations.len(), 1);
    let expected_tail = format!("{} {}", a.display(), b.display());
    assert!(invocations[0].ends_with(&expected_tail), "{}", invocations[0]);

    // Second run with nothing changed never reaches the compiler
    let second = pipeline.run().unwrap();
    assert_eq!(second.state, RunState::Skipped);
    assert_eq!(second.generated_files, outcome.generated_files);
    assert_eq!(compiler.invocations().len(), 1);
    assert_eq!(mtime(&layout.out), at(200));
}

#[test]
fn test_equal_timestamps_are_up_to_date() {
    let temp_dir = TempDir::new().unwrap();
    let layout = layout(temp_dir.path());
    write_source(&layout.src, "a.def", 300);
    fs::create_dir_all(&layout.out).unwrap();
    set_mtime(&layout.out, 300);

    let compiler = FakeCompiler::succeeding(&temp_dir.path().join("bin"));
    let outcome = pipeline(&layout, &compiler).run().unwrap();
    assert_eq!(outcome.state, RunState::Skipped);
    assert!(compiler.invocations().is_empty());
}

#[test]
fn test_missing_output_dir_compiles() {
    let temp_dir = TempDir::new().unwrap();
    let layout = layout(temp_dir.path());
    write_source(&layout.src, "nested/deep/a.def", 500);

    let compiler = FakeCompiler::succeeding(&temp_dir.path().join("bin"));
    let outcome = pipeline(&layout, &compiler).run().unwrap();
    assert_eq!(outcome.state, RunState::Compiled);
    assert_eq!(outcome.generated_files, vec![layout.out.join("a.gen")]);
    assert_eq!(mtime(&layout.out), at(500));
}

#[test]
fn test_touching_a_source_triggers_recompile() {
    let temp_dir = TempDir::new().unwrap();
    let layout = layout(temp_dir.path());
    write_source(&layout.src, "a.def", 100);
    let b = write_source(&layout.src, "b.def", 200);

    let compiler = FakeCompiler::succeeding(&temp_dir.path().join("bin"));
    let pipeline = pipeline(&layout, &compiler);
    pipeline.run().unwrap();
    assert_eq!(compiler.invocations().len(), 1);

    set_mtime(&b, 250);
    assert_eq!(pipeline.run().unwrap().state, RunState::Compiled);
    assert_eq!(compiler.invocations().len(), 2);
    assert_eq!(mtime(&layout.out), at(250));
}

#[test]
fn test_forced_run_compiles_up_to_date_sources() {
    let temp_dir = TempDir::new().unwrap();
    let layout = layout(temp_dir.path());
    write_source(&layout.src, "a.def", 100);
    fs::create_dir_all(&layout.out).unwrap();
    set_mtime(&layout.out, 400);

    let compiler = FakeCompiler::succeeding(&temp_dir.path().join("bin"));
    let outcome = pipeline(&layout, &compiler)
        .run_forced()
        .unwrap();
    assert_eq!(outcome.state, RunState::Compiled);
    assert_eq!(compiler.invocations().len(), 1);
    assert_eq!(mtime(&layout.out), at(100));
}

#[test]
fn test_failed_compile_leaves_marker_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let layout = layout(temp_dir.path());
    write_source(&layout.src, "a.def", 100);
    write_source(&layout.src, "b.def", 200);
    fs::create_dir_all(&layout.out).unwrap();
    set_mtime(&layout.out, 150);

    let compiler = FakeCompiler::failing(&temp_dir.path().join("bin"), 2);
    let pipeline = pipeline(&layout, &compiler);

    let result = pipeline.run();
    assert!(matches!(result, Err(PipelineError::CompilerExit { code: 2 })));
    assert_eq!(mtime(&layout.out), at(150));

    // Still stale, so the next run retries
    assert!(matches!(
        pipeline.run(),
        Err(PipelineError::CompilerExit { code: 2 })
    ));
    assert_eq!(compiler.invocations().len(), 2);
}

#[test]
fn test_failed_first_compile_stays_stale() {
    let temp_dir = TempDir::new().unwrap();
    let layout = layout(temp_dir.path());
    write_source(&layout.src, "a.def", 100);

    let compiler = FakeCompiler::failing(&temp_dir.path().join("bin"), 1);
    let pipeline = pipeline(&layout, &compiler);
    assert!(pipeline.run().is_err());
    assert!(pipeline.status().unwrap().stale);
}

#[test]
fn test_empty_source_dir_skips_compiler_and_marker() {
    let temp_dir = TempDir::new().unwrap();
    let layout = layout(temp_dir.path());
    fs::create_dir_all(&layout.out).unwrap();
    set_mtime(&layout.out, 150);

    let compiler = FakeCompiler::succeeding(&temp_dir.path().join("bin"));
    let outcome = pipeline(&layout, &compiler).run().unwrap();
    assert_eq!(outcome.state, RunState::Skipped);
    assert!(outcome.generated_files.is_empty());
    assert!(compiler.invocations().is_empty());
    assert_eq!(mtime(&layout.out), at(150));
}

#[test]
fn test_extracted_dependencies_are_on_the_include_path() {
    let temp_dir = TempDir::new().unwrap();
    let layout = layout(temp_dir.path());
    write_source(&layout.src, "service.def", 100);

    let archive = temp_dir.path().join("repo/common-1.0.jar");
    write_archive(
        &archive,
        &[
            ("shared/types.def", "struct Shared {}"),
            ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0"),
        ],
    );
    let dependency = DependencyRef::new("com.acme", "common", "1.0");
    let resolver = StaticResolver::new().with_archive(dependency.clone(), archive);

    let compiler = FakeCompiler::succeeding(&temp_dir.path().join("bin"));
    let outcome = pipeline_with_dependencies(&layout, &compiler, vec![dependency], resolver)
        .run()
        .unwrap();

    assert_eq!(
        outcome.extracted_files,
        vec![layout.external.join("shared/types.def")]
    );
    assert!(!layout.external.join("META-INF").exists());

    let invocation = &compiler.invocations()[0];
    let includes = format!(
        "-I {} -I {} -o {}",
        layout.src.display(),
        layout.external.display(),
        layout.out.display()
    );
    assert!(invocation.starts_with(&includes), "{}", invocation);
    // Extracted files are includes, not compile inputs
    assert!(!invocation.contains("types.def"));
}

#[test]
fn test_unresolvable_dependency_aborts_before_compile() {
    let temp_dir = TempDir::new().unwrap();
    let layout = layout(temp_dir.path());
    write_source(&layout.src, "a.def", 100);

    let compiler = FakeCompiler::succeeding(&temp_dir.path().join("bin"));
    let pipeline = pipeline_with_dependencies(
        &layout,
        &compiler,
        vec![DependencyRef::new("com.acme", "missing", "1.0")],
        StaticResolver::new(),
    );

    assert!(matches!(pipeline.run(), Err(PipelineError::Extract(_))));
    assert!(compiler.invocations().is_empty());
    assert!(!layout.out.exists());
}
