use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn command_closest() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("subplace")?;
    let output = cmd
        .arg("closest")
        .arg("tests/place/backbone.nwk")
        .arg("tests/place/aln.fa")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // Human and Chimp tie for Q1, alignment order wins
    assert_eq!(stdout, "Q1\tHuman\t1\nQ2\tRat\t1\n");

    Ok(())
}

#[test]
fn command_closest_fragment() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("subplace")?;
    let output = cmd
        .arg("closest")
        .arg("tests/place/backbone.nwk")
        .arg("tests/place/aln.fa")
        .args(["-k", "2", "--fragment"])
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout.lines().count(), 4);
    assert!(stdout.contains("Q1\tHuman\t0\nQ1\tChimp\t0\n"));
    assert!(stdout.contains("Q2\tRat\t1\nQ2\tMouse\t2\n"));

    Ok(())
}

#[test]
fn command_closest_query_file() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("subplace")?;
    let output = cmd
        .arg("closest")
        .arg("tests/place/backbone.nwk")
        .arg("tests/place/aln.fa")
        .args(["-q", "tests/place/query.fa"])
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "Q1\tHuman\t1\n");

    Ok(())
}

#[test]
fn command_closest_missing_reference() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("subplace")?;
    let output = cmd
        .arg("closest")
        .arg("tests/place/backbone.nwk")
        .arg("tests/place/query.fa")
        .output()?;
    let stderr = String::from_utf8(output.stderr)?;

    assert!(!output.status.success());
    assert!(stderr.contains("backbone leaves have no sequence"));

    Ok(())
}
