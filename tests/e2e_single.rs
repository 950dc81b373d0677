
use std::fs;
use std::process::Output;

use tempfile::tempdir;

use support_single::{closed_port_url, run_loadburst, spawn_http_server};

fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn expect_success(output: &Output) -> Result<String, String> {
    if !output.status.success() {
        return Err(describe(output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn expect_lines(stdout: &str, lines: &[&str]) -> Result<(), String> {
    for line in lines {
        if !stdout.lines().any(|candidate| candidate == *line) {
            return Err(format!("Missing line '{}' in report:\n{}", line, stdout));
        }
    }
    Ok(())
}

#[test]
fn e2e_single_text_report() -> Result<(), String> {
    let (url, _server) = spawn_http_server("200 OK")?;

    let output = run_loadburst([
        "-u",
        url.as_str(),
        "-c",
        "3",
        "-n",
        "4",
        "-t",
        "10",
        "--no-color",
    ])?;
    let stdout = expect_success(&output)?;

    expect_lines(
        &stdout,
        &[
            "=== Performance Test Report ===",
            "Total Requests: 12",
            "Successful: 12 (100.00%)",
            "Failed: 0 (0.00%)",
            "=== Status Code Distribution ===",
            "Status 200: 12 requests",
        ],
    )?;
    if stdout.contains("=== Error Distribution ===") {
        return Err(format!("Unexpected error section:\n{}", stdout));
    }
    Ok(())
}

#[test]
fn e2e_single_server_errors_are_reported() -> Result<(), String> {
    let (url, _server) = spawn_http_server("500 Internal Server Error")?;

    let output = run_loadburst([
        "-u",
        url.as_str(),
        "-c",
        "2",
        "-n",
        "3",
        "-X",
        "post",
        "-d",
        "{}",
    ])?;
    let stdout = expect_success(&output)?;

    expect_lines(
        &stdout,
        &[
            "Total Requests: 6",
            "Successful: 0 (0.00%)",
            "Failed: 6 (100.00%)",
            "Status 500: 6 requests",
        ],
    )
}

#[test]
fn e2e_single_unreachable_target_records_transport_errors() -> Result<(), String> {
    let url = closed_port_url()?;

    let output = run_loadburst([
        "-u",
        url.as_str(),
        "-c",
        "2",
        "-n",
        "2",
        "--request-timeout",
        "2s",
    ])?;
    let stdout = expect_success(&output)?;

    expect_lines(
        &stdout,
        &[
            "Total Requests: 4",
            "Failed: 4 (100.00%)",
            "Status 0: 4 requests",
            "=== Error Distribution ===",
        ],
    )
}

#[test]
fn e2e_single_config_file_and_json_output() -> Result<(), String> {
    let (url, _server) = spawn_http_server("202 Accepted")?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config_path = dir.path().join("loadburst.toml");
    let config = format!(
        "url = \"{}\"\nusers = 2\nrequests = 5\nramp_up = 1\noutput_format = \"json\"\nheaders = [\"X-Suite: e2e\"]\n",
        url
    );
    fs::write(&config_path, config).map_err(|err| format!("write config failed: {}", err))?;

    let config_arg = config_path.to_string_lossy().into_owned();
    let output = run_loadburst(["--config", config_arg.as_str(), "-n", "3"])?;
    let stdout = expect_success(&output)?;

    let summary: serde_json::Value =
        serde_json::from_str(&stdout).map_err(|err| format!("invalid JSON: {}\n{}", err, stdout))?;
    let total = summary
        .get("total_requests")
        .and_then(serde_json::Value::as_u64);
    if total != Some(6) {
        return Err(format!("Expected CLI requests to win (6 total), got {:?}", total));
    }
    let accepted = summary
        .pointer("/status_codes/202")
        .and_then(serde_json::Value::as_u64);
    if accepted != Some(6) {
        return Err(format!("Unexpected status histogram: {}", stdout));
    }
    Ok(())
}

#[test]
fn e2e_single_missing_url_fails() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config_path = dir.path().join("loadburst.json");
    fs::write(&config_path, "{\"users\": 1}")
        .map_err(|err| format!("write config failed: {}", err))?;

    let config_arg = config_path.to_string_lossy().into_owned();
    let output = run_loadburst(["--config", config_arg.as_str()])?;
    if output.status.success() {
        return Err(format!("Expected failure without URL.\n{}", describe(&output)));
    }
    Ok(())
}

#[test]
fn e2e_single_invalid_header_reports_failed_run() -> Result<(), String> {
    let (url, _server) = spawn_http_server("200 OK")?;

    let output = run_loadburst(["-u", url.as_str(), "-c", "2", "-n", "1", "-H", "Bad Header: x"])?;
    if output.status.success() {
        return Err(format!("Expected failure for invalid header.\n{}", describe(&output)));
    }
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    expect_lines(&stdout, &["=== Performance Test Report ===", "Total Requests: 0"])
}
