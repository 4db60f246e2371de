// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reading and writing the flat `key=value` cache file.

use crate::error::{ImageToolError, Result};
use crate::platform::file_ops;
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Load the cache entries from `path`. A missing file is an empty cache.
pub fn load_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ImageToolError::CacheStoreIo(format!(
            "Failed to read cache file {}: {e}",
            path.display()
        ))
    })?;
    Ok(parse_properties(&contents))
}

/// Persist `entries` to `path`, replacing the previous file atomically.
pub fn save_entries(entries: &BTreeMap<String, String>, path: &Path) -> Result<()> {
    let contents = render_properties(entries);
    file_ops::write_atomically(path, contents.as_bytes()).map_err(|e| {
        ImageToolError::CacheStoreIo(format!(
            "Failed to write cache file {}: {e}",
            path.display()
        ))
    })
}

pub(crate) fn parse_properties(contents: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();

    for raw_line in contents.lines() {
        let line = raw_line.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let (key, value) = match find_separator(line) {
            Some(index) => (&line[..index], line[index + 1..].trim_start()),
            None => (line, ""),
        };

        let key = unescape(key.trim_end()).to_lowercase();
        if key.is_empty() {
            continue;
        }
        entries.insert(key, unescape(value));
    }

    entries
}

pub(crate) fn render_properties(entries: &BTreeMap<String, String>) -> String {
    let mut output = format!("#{}\n", Utc::now().to_rfc2822());
    for (key, value) in entries {
        output.push_str(&escape(key, true));
        output.push('=');
        output.push_str(&escape(value, false));
        output.push('\n');
    }
    output
}

fn find_separator(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' | ':' => return Some(index),
            _ => {}
        }
    }
    None
}

fn escape(text: &str, is_key: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '=' | ':' | ' ' if is_key => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('t') => unescaped.push('\t'),
            Some(other) => unescaped.push(other),
            None => {}
        }
    }
    unescaped
}
