//! The `omrtrack init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_absent(Path::new("omrtrack.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("tests")?;
    write_if_absent(Path::new("tests/sample.toml"), SAMPLE_TEST)?;
    write_if_absent(Path::new("tests/sample-answers.toml"), SAMPLE_ANSWERS)?;
    write_if_absent(Path::new("tests/sample-key.toml"), SAMPLE_KEY)?;

    println!("\nNext steps:");
    println!("  1. Run: omrtrack validate --test tests/sample.toml");
    println!(
        "  2. Run: omrtrack grade --test tests/sample.toml --answers tests/sample-answers.toml --key tests/sample-key.toml"
    );
    println!("  3. Or sit it live: omrtrack take --test tests/sample.toml");

    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# omrtrack configuration

history_path = "./omrtrack-history.json"
output_dir = "./omrtrack-reports"

# Reject marks other than A, B, C, D
strict_options = false

# Default study timer length
study_minutes = 25
"#;

const SAMPLE_TEST: &str = r#"[test]
name = "Sample mini mock"
duration_minutes = 10

[test.questions]
physics = 3
chemistry = 3
biology = 4
"#;

const SAMPLE_ANSWERS: &str = r#"[marks]
1 = "A"
2 = "C"
3 = "B"
4 = "D"
6 = "A"
7 = "B"
8 = "B"
9 = "C"
10 = "A"
"#;

const SAMPLE_KEY: &str = r#"[marks]
1 = "A"
2 = "B"
3 = "B"
4 = "D"
5 = "C"
6 = "A"
7 = "B"
8 = "D"
9 = "C"
10 = "A"
"#;
