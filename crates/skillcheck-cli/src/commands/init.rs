//! The `skillcheck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("skillcheck.toml").exists() {
        println!("skillcheck.toml already exists, skipping.");
    } else {
        std::fs::write("skillcheck.toml", SAMPLE_CONFIG)?;
        println!("Created skillcheck.toml");
    }

    std::fs::create_dir_all("catalogs")?;
    let example_path = std::path::Path::new("catalogs/example.toml");
    if example_path.exists() {
        println!("catalogs/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_CATALOG)?;
        println!("Created catalogs/example.toml");
    }

    if std::path::Path::new("answers.toml").exists() {
        println!("answers.toml already exists, skipping.");
    } else {
        std::fs::write("answers.toml", EXAMPLE_ANSWERS)?;
        println!("Created answers.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set SKILLCHECK_JUDGE_KEY (or edit skillcheck.toml) to use a real Judge0 backend");
    println!("  2. Run: skillcheck validate --catalog catalogs/example.toml");
    println!("  3. Run: skillcheck take --catalog catalogs/example.toml --answers answers.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# skillcheck configuration

[judge]
# auto: remote when a real key is set, simulated otherwise ("demo" and
# "development" count as no key). remote | simulated force a backend.
mode = "auto"
api_key = "${JUDGE0_API_KEY}"
base_url = "https://ce.judge0.com"
auth_header = "X-RapidAPI-Key"
request_timeout_secs = 30
simulated_latency_ms = 1500

[evaluator]
max_concurrency = 4

[session]
tick_interval_ms = 1000
"#;

const EXAMPLE_CATALOG: &str = r#"[assessment]
id = "example"
name = "Example Assessment"
description = "A short assessment to get started"
time_limit_secs = 600

[[questions]]
id = 1
section = "Data Analyst"
type = "multiple-choice"
prompt = "Which Excel function is used to find values in a table?"
options = ["COUNTIF", "VLOOKUP", "SUMIF", "AVG"]
answer = "VLOOKUP"

[[questions]]
id = 2
section = "Data Analyst"
type = "coding"
prompt = "Read two integers separated by a space and print their sum."
language = "python"
starter_code = """
a, b = map(int, input().split())
"""
test_cases = [
    { input = "2 3", expected_output = "5" },
    { input = "-1 1", expected_output = "0" },
]
"#;

const EXAMPLE_ANSWERS: &str = r#"[answers]
1 = "VLOOKUP"
2 = """
import sys
for line in sys.stdin:
    a, b = map(int, line.split())
    print(a + b)
"""
"#;
