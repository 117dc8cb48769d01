use anyhow::Result;
use std::path::Path;

use gotask::core::GotaskError;
use gotask::freshness::{is_stale, is_stale_recursive};
use gotask::test_utils::write_at;

#[test]
fn test_missing_output_is_stale() -> Result<()> {
    let temp = tempfile::tempdir()?;
    write_at(&temp.path().join("src/a.go"), "package a\n", 1_000);

    assert!(is_stale(&temp.path().join("out/bin"), &[temp.path().join("src/a.go")])?);
    Ok(())
}

#[test]
fn test_output_newer_than_all_inputs_is_fresh() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let inputs: Vec<_> = ["a.go", "b.go", "c.go"].iter().map(|f| temp.path().join(f)).collect();
    for (i, input) in inputs.iter().enumerate() {
        write_at(input, "package a\n", 1_000 + i as u64);
    }
    write_at(&temp.path().join("app"), "", 2_000);

    assert!(!is_stale(&temp.path().join("app"), &inputs)?);

    write_at(&inputs[1], "package a // changed\n", 3_000);
    assert!(is_stale(&temp.path().join("app"), &inputs)?);
    Ok(())
}

#[test]
fn test_missing_input_is_an_error() -> Result<()> {
    let temp = tempfile::tempdir()?;
    write_at(&temp.path().join("app"), "", 2_000);

    let err = is_stale(&temp.path().join("app"), &[temp.path().join("gone.go")]).unwrap_err();
    match err.downcast_ref::<GotaskError>() {
        Some(GotaskError::StaleCheckError {
            path,
            ..
        }) => assert!(path.ends_with("gone.go")),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_recursive_inputs_see_nested_changes() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let dir = temp.path().join("enums");
    write_at(&dir.join("color.go"), "package enums\n", 1_000);
    write_at(&dir.join("nested/shade.go"), "package nested\n", 1_000);
    let output = temp.path().join("color_string.go");
    write_at(&output, "", 2_000);

    assert!(!is_stale_recursive(&output, &[dir.as_path()])?);
    assert!(!is_stale(&output, &[Path::new(&dir).join("color.go")])?);

    write_at(&dir.join("nested/shade.go"), "package nested // changed\n", 3_000);
    assert!(is_stale_recursive(&output, &[dir.as_path()])?);
    Ok(())
}
