use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn command_tokens() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("subplace")?;
    let output = cmd.arg("tokens").arg("tests/place/backbone.nwk").output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // Derooted: the heavier root child is spliced out
    assert_eq!(stdout.lines().count(), 1);
    assert_eq!(
        stdout.trim(),
        "(((Human:0.0625{0},Chimp:0.0625{1}):0.125{2},Gorilla:0.125{3}):0.25{4},Orangutan:0.375{5},(Rhesus:0.5{6},(Mouse:0.75{7},Rat:0.75{8}):1.5{9}):0.375{10}){11};"
    );

    Ok(())
}

#[test]
fn command_tokens_labels() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("subplace")?;
    let output = cmd
        .arg("tokens")
        .arg("tests/place/backbone.nwk")
        .arg("--labels")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("Human%%0:0.0625"));
    assert!(stdout.contains("Orangutan%%5:0.375"));
    assert!(stdout.contains("Rat%%8:0.75"));
    assert!(!stdout.contains('{'));

    Ok(())
}

#[test]
fn command_tokens_bad_label() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("subplace")?;
    cmd.arg("tokens")
        .arg("stdin")
        .write_stdin("(A%%1:1,B:1,C:1);\n");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("reserved separator"));

    Ok(())
}
