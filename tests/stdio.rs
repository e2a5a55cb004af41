use serde_json::{json, Value};
use std::io::{Read, Write};
use std::process::{Command, Stdio};

/// Runs the server binary over `frames`, closes its stdin, and collects what it wrote.
fn run_server(args: &[&str], frames: &[Value]) -> (Vec<Value>, String, bool) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_weather-server"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn weather-server");

    {
        let mut stdin = child.stdin.take().expect("stdin");
        for frame in frames {
            let mut line = serde_json::to_vec(frame).unwrap();
            line.push(b'\n');
            stdin.write_all(&line).unwrap();
        }
        stdin.write_all(b"this is not json\n").unwrap();
    }

    let mut stdout = String::new();
    child.stdout.take().unwrap().read_to_string(&mut stdout).unwrap();
    let mut stderr = String::new();
    child.stderr.take().unwrap().read_to_string(&mut stderr).unwrap();
    let status = child.wait().unwrap();

    let replies = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout carries only frames"))
        .collect();
    (replies, stderr, status.success())
}

fn request(id: u64, method: &str, params: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})
}

#[test]
fn full_session_over_stdio() {
    let frames = [
        request(1, "initialize", json!({
            "protocolVersion": "2025-06-18",
            "capabilities": {},
            "clientInfo": {"name": "test-client", "version": "1.0.0"}
        })),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        request(2, "tools/list", json!({})),
        request(3, "tools/call", json!({"name": "get_weather", "arguments": {"city": "New York", "units": "celsius"}})),
        request(4, "resources/list", json!({})),
        request(5, "resources/read", json!({"uri": "weather://cities"})),
    ];
    let (replies, stderr, success) = run_server(&[], &frames);

    assert!(success);
    assert!(stderr.contains("Weather MCP server running on stdio"));
    let ids: Vec<Value> = replies.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, [json!(1), json!(2), json!(3), json!(4), json!(5)]);

    assert_eq!(replies[0]["result"]["serverInfo"]["name"], json!("weather-server"));
    assert_eq!(replies[1]["result"]["tools"][0]["name"], json!("get_weather"));

    let text = replies[2]["result"]["content"][0]["text"].as_str().unwrap();
    let report: Value = serde_json::from_str(text).unwrap();
    assert_eq!(report["city"], json!("New York"));
    assert!(report["temperature"].is_number());

    assert_eq!(replies[3]["result"]["resources"][0]["uri"], json!("weather://cities"));
    let cities = replies[4]["result"]["contents"][0]["text"].as_str().unwrap();
    assert!(cities.contains("Tokyo"));
}

#[test]
fn renamed_tool_answers_repeated_calls() {
    let frames: Vec<Value> = ["New York", "London", "Paris"]
        .iter()
        .enumerate()
        .map(|(i, city)| {
            request(i as u64 + 1, "tools/call", json!({"name": "get_weather_2", "arguments": {"city": city}}))
        })
        .collect();
    let (replies, _, success) = run_server(&[], &frames);

    assert!(success);
    assert_eq!(replies.len(), 3);
    for (reply, city) in replies.iter().zip(["New York", "London", "Paris"]) {
        let text = reply["result"]["content"][0]["text"].as_str().unwrap();
        let report: Value = serde_json::from_str(text).unwrap();
        assert_eq!(report["city"], json!(city));
    }
}

#[test]
fn errors_do_not_end_the_session() {
    let frames = [
        request(1, "tools/call", json!({"name": "get_forecast", "arguments": {}})),
        request(2, "resources/read", json!({"uri": "weather://moon"})),
        request(3, "prompts/list", json!({})),
        request(4, "ping", json!({})),
    ];
    let (replies, _, success) = run_server(&["--latency-ms", "1"], &frames);

    assert!(success);
    assert_eq!(replies[0]["result"]["isError"], json!(true));
    assert_eq!(replies[0]["result"]["content"][0]["text"], json!("Unknown tool: get_forecast"));
    assert_eq!(replies[1]["error"]["code"], json!(-32002));
    assert_eq!(replies[2]["error"]["message"], json!("Unknown method: prompts/list"));
    assert_eq!(replies[3]["result"], json!({}));
}
