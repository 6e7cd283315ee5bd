// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// The smallest submission that passes every rule.
pub fn minimal_form() -> Value {
    json!({
        "name": "Al",
        "email": "a@b.co",
        "subject": "Hey",
        "message": "Hello there!"
    })
}

/// A realistic, distinct submission per index.
pub fn valid_form(i: usize) -> Value {
    json!({
        "name": format!("Visitor {i}"),
        "email": format!("visitor{i}@example.org"),
        "subject": format!("Question number {i}"),
        "message": format!("Hi, I saw project {i} on your site and have a question."),
    })
}

/// Bodies that must never reach the dispatcher.
pub fn malformed_bodies() -> Vec<&'static str> {
    vec![
        "",
        "{",
        "null",
        "42",
        "\"name\"",
        r#"["Al","a@b.co","Hey","Hello there!"]"#,
        "name=Al&email=a@b.co",
    ]
}

/// Forms that are well-formed JSON but break at least one rule.
pub fn invalid_forms() -> Vec<(Value, &'static [&'static str])> {
    vec![
        (json!({}), &["name", "email", "subject", "message"]),
        (
            json!({"name": "A", "email": "a@b.co", "subject": "Hey", "message": "Hello there!"}),
            &["name"],
        ),
        (
            json!({"name": "Al", "email": "not-an-email", "subject": "Hey", "message": "Hello there!"}),
            &["email"],
        ),
        (
            json!({"name": "Al", "email": "a@b.co", "subject": "Hi", "message": "too short"}),
            &["subject", "message"],
        ),
        (
            json!({"name": "<>", "email": "a@b.co", "subject": "Hey", "message": "Hello there!"}),
            &["name"],
        ),
        (
            json!({"name": "Al", "email": "a@b.co", "subject": "Hey", "message": "x".repeat(2001)}),
            &["message"],
        ),
        (
            json!({"name": 7, "email": "a@b.co", "subject": "Hey", "message": "Hello there!"}),
            &["name"],
        ),
        (
            json!({"name": 42, "email": "bad", "subject": "x", "message": "short"}),
            &["name", "email", "subject", "message"],
        ),
        (
            json!({"name": "Al", "email": "a@b.co", "subject": true, "message": {"text": "Hello there!"}}),
            &["subject", "message"],
        ),
    ]
}

/// Addresses with a plausible `local@domain.tld` look that no mail header
/// can carry.
pub fn unusable_emails() -> Vec<&'static str> {
    vec![
        "a,b@c.de",
        "x\"y@c.de",
        "a(b)@c.de",
        "a<b@c.de",
        "a:b@c.de",
        "a..b@c.de",
        "a@b.c,d",
    ]
}
