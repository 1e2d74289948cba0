//! Fake resolver executables for driving the bridge end to end.
//!
//! Each helper writes a small Python script into a tempdir and marks it
//! executable. The well-behaved resolver appends every request line it
//! receives to `requests.log` next to the script, so tests can count wire
//! traffic.

use std::fs;
use std::path::PathBuf;

#[cfg(unix)]
fn mark_executable(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path).expect("metadata").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions).expect("chmod");
}

fn write_script(name: &str, script: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let script_path = dir.path().join(name);
    fs::write(&script_path, script).expect("write script");
    #[cfg(unix)]
    mark_executable(&script_path);
    (dir, script_path)
}

/// A resolver that answers topics, symbols, and assets from a fixed table.
///
/// Topics ending in `/Missing` and assets named `missing` are answered with an
/// error message.
pub fn write_fake_resolver() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let script = r#"#!/usr/bin/env python3
import json
import os
import sys

LOG_PATH = os.path.join(os.path.dirname(os.path.abspath(__file__)), "requests.log")

def send(payload):
    sys.stdout.write(json.dumps(payload) + "\n")
    sys.stdout.flush()

def log(line):
    with open(LOG_PATH, "a", encoding="utf-8") as fh:
        fh.write(line)

def information(title, platforms):
    return {
        "kind": {"name": "Class", "id": "class", "isSymbol": True},
        "url": "https://example.com/documentation/" + title.lower(),
        "title": title,
        "abstract": "A class.",
        "language": {"name": "Swift", "id": "swift"},
        "availableLanguages": [{"name": "Swift", "id": "swift"}],
        "platforms": platforms,
        "declarationFragments": None,
    }

send({"bundleIdentifier": "com.example.Docs"})

for line in sys.stdin:
    if not line.strip():
        continue
    log(line)
    message = json.loads(line)
    if "topic" in message:
        url = message["topic"]
        if url.endswith("/Missing"):
            send({"errorMessage": "unknown topic"})
        else:
            send({"resolvedInformation": information(url.rsplit("/", 1)[-1], None)})
    elif "symbol" in message:
        platforms = [{"name": "Mac Catalyst", "introduced": "13.5"}]
        send({"resolvedInformation": information(message["symbol"], platforms)})
    elif "asset" in message:
        asset = message["asset"]
        if asset["assetName"] == "missing":
            send({"errorMessage": "no such asset"})
        else:
            send({"asset": {
                "name": asset["assetName"],
                "bundleIdentifier": asset["bundleIdentifier"],
                "variants": {"1x": "https://example.com/images/logo.png"},
            }})
"#;

    let (dir, script_path) = write_script("fake-resolver", script);
    let log_path = dir.path().join("requests.log");
    (dir, script_path, log_path)
}

/// A resolver whose first output is not a bundle identifier.
pub fn write_bad_handshake_resolver() -> (tempfile::TempDir, PathBuf) {
    let script = r#"#!/usr/bin/env python3
import json
import sys

sys.stdout.write(json.dumps({"errorMessage": "not a handshake"}) + "\n")
sys.stdout.flush()
"#;
    write_script("bad-handshake-resolver", script)
}

/// A resolver that announces itself and immediately exits.
pub fn write_exiting_resolver() -> (tempfile::TempDir, PathBuf) {
    let script = r#"#!/usr/bin/env python3
import json
import sys

sys.stdout.write(json.dumps({"bundleIdentifier": "com.example.Docs"}) + "\n")
sys.stdout.flush()
"#;
    write_script("exiting-resolver", script)
}

/// A resolver that floods stderr before answering each request.
///
/// The burst is far larger than a pipe buffer, so replies only arrive if
/// stderr is drained independently of the request/response stream.
pub fn write_stderr_burst_resolver() -> (tempfile::TempDir, PathBuf) {
    let script = r#"#!/usr/bin/env python3
import json
import sys

def send(payload):
    sys.stdout.write(json.dumps(payload) + "\n")
    sys.stdout.flush()

send({"bundleIdentifier": "com.example.Docs"})

for line in sys.stdin:
    if not line.strip():
        continue
    sys.stderr.write("x" * (1 << 20))
    sys.stderr.flush()
    send({"errorMessage": "busy"})
"#;
    write_script("stderr-burst-resolver", script)
}
