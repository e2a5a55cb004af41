/*!
A minimal Model Context Protocol (MCP) server that speaks JSON-RPC over stdio.

weather-server exposes a small, fixed set of tools and resources to an MCP
client (an agent, an IDE, a test harness) over a pair of byte streams. Its
payloads are simulated: the interesting part is the request handling, not
the weather.

# Overview

One request is handled at a time, start to finish:

1. [`stdio::Server`] reads a newline-terminated frame from the input stream.
2. [`messages::decode`] turns it into a request or notification. Malformed
   frames are logged and dropped.
3. [`mcp::dispatch`] routes the request by method name against an immutable
   [`registry::Registry`], validating tool arguments against their schema.
4. [`messages::encode`] serializes the response, which is written and flushed
   before the next frame is read.

Everything that can go wrong inside a request becomes a response. Only a
broken output stream ends the loop early.

# Quick Start

```
use weather_server::registry::ServerInfo;
use weather_server::stdio::Server;
use weather_server::weather::{self, WeatherConfig};

let registry = weather::registry(ServerInfo::default(), &WeatherConfig::default()).unwrap();

let input = concat!(
    r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"get_weather","arguments":{"city":"Paris"}}}"#,
    "\n",
);
let mut output = Vec::new();
Server::new(&registry).serve(input.as_bytes(), &mut output).unwrap();

let reply: serde_json::Value = serde_json::from_slice(&output).unwrap();
let text = reply["result"]["content"][0]["text"].as_str().unwrap();
let report: serde_json::Value = serde_json::from_str(text).unwrap();
assert_eq!(report["city"], "Paris");
assert_eq!(report["units"], "celsius");
```

# Adding a tool

Implement [`mcp::tools::Tool`] and pass it to
[`registry::RegistryBuilder::tool`]. The dispatcher needs no changes; the
registry is the routing table.

# Logging

Diagnostics are written to stderr with logwise. stdout carries protocol
frames and nothing else.

# Module Organization

- [`jrpc`] - JSON-RPC 2.0 message types
- [`messages`] - frame decoding and encoding
- [`mcp`] - method dispatch, tools and resources
- [`registry`] - the immutable table of tools and resources
- [`stdio`] - the transport loop
- [`weather`] - the simulated weather tools and resources
*/
pub mod jrpc;
pub mod mcp;
pub mod messages;
pub mod registry;
pub mod stdio;
pub mod weather;
