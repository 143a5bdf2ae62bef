use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use stanza_cli::{Args, Command, run};

/// Demo poems live at the workspace root, not in the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("workspace root")
        .join("demos")
}

/// Collects all .poem files from a directory
fn collect_poem_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("poem")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(command: Command) -> Args {
    Args {
        command,
        config: None,
        log_level: "off".to_string(),
    }
}

fn to_yaml(input: &Path, output: &Path) -> Args {
    args(Command::ToYaml {
        input: input.to_string_lossy().to_string(),
        output: Some(output.to_string_lossy().to_string()),
    })
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_poem_files(demos_path());

    assert!(!demos.is_empty(), "No demo poems found in demos/");

    let mut failed = Vec::new();
    for demo in &demos {
        let stem = demo.file_stem().unwrap().to_string_lossy().to_string();
        let yaml = temp_dir.path().join(format!("{stem}.yaml"));
        let poem = temp_dir.path().join(format!("{stem}.poem"));

        let result = run(&to_yaml(demo, &yaml)).and_then(|()| {
            run(&args(Command::ToPoem {
                input: yaml.to_string_lossy().to_string(),
                output: Some(poem.to_string_lossy().to_string()),
            }))
        });
        if let Err(e) = result {
            failed.push((demo.clone(), e));
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemo poems that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo poem(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_poem_files(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();
    for demo in &error_demos {
        let output = temp_dir.path().join(format!(
            "error_{}.yaml",
            demo.file_stem().unwrap().to_string_lossy()
        ));
        if run(&to_yaml(demo, &output)).is_ok() {
            unexpectedly_succeeded.push(demo.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_build_demo_directory() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let out = temp_dir.path().join("records");

    run(&args(Command::Build {
        dir: demos_path().to_string_lossy().to_string(),
        output: out.to_string_lossy().to_string(),
    }))
    .expect("demo directory should build");

    let lanterns = fs::read_to_string(out.join("lanterns.yaml")).expect("lanterns.yaml");
    assert!(lanterns.contains("All rights reserved."), "{lanterns}");
    assert!(!lanterns.contains("$ref"), "{lanterns}");

    let low_tide = fs::read_to_string(out.join("low-tide.yaml")).expect("low-tide.yaml");
    assert!(low_tide.contains("its own outline, still"), "{low_tide}");
    assert!(!low_tide.contains("draft notes"), "{low_tide}");
}

#[test]
fn e2e_batch_with_failures_exits_with_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let result = run(&args(Command::ToYaml {
        input: demos_path().join("errors").to_string_lossy().to_string(),
        output: Some(temp_dir.path().to_string_lossy().to_string()),
    }));

    let err = result.expect_err("error demos should fail");
    assert_eq!(err.to_string(), "2 of 2 file(s) failed");
}

#[test]
fn e2e_explicit_config() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = temp_dir.path().join("config.toml");
    fs::write(&config, "[parser]\ndefault_author = \"R. Vale\"\n").expect("write config");

    let poem = temp_dir.path().join("quiet.poem");
    fs::write(&poem, "Quiet\n2024-02-02\n\nsmall hours\n").expect("write poem");
    let yaml = temp_dir.path().join("quiet.yaml");

    let mut run_args = to_yaml(&poem, &yaml);
    run_args.config = Some(config.to_string_lossy().to_string());
    run(&run_args).expect("conversion should succeed");

    let record = fs::read_to_string(&yaml).expect("quiet.yaml");
    assert!(record.contains("author: R. Vale"), "{record}");
}
