//! Simulated commerce data for the BASTION reference pack.
//!
//! All data in this module is fictional and derived deterministically from
//! the inputs, so repeated runs print the same results. No external systems
//! are contacted.

use serde_json::{json, Value};

use crate::CommerceError;

const CONDITIONS: [&str; 5] = ["Sunny", "Cloudy", "Rainy", "Windy", "Snowy"];

/// A stable small number derived from `input`, in `[lo, hi]`.
fn fingerprint(input: &str, lo: u64, hi: u64) -> u64 {
    let sum = input
        .bytes()
        .fold(17u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
    lo + sum % (hi - lo + 1)
}

// ── Public API lookups ───────────────────────────────────────────────────────

pub fn weather(city: &str) -> Value {
    let condition = CONDITIONS[fingerprint(city, 0, 4) as usize];
    json!({
        "city": city,
        "temperature": fingerprint(city, 32, 95),
        "condition": condition,
        "humidity": fingerprint(&city.to_lowercase(), 30, 90)
    })
}

pub fn product_search(query: &str) -> Value {
    json!({
        "query": query,
        "results": fingerprint(query, 10, 500),
        "top_result": format!("Best {} - ${}", query, fingerprint(&query.to_uppercase(), 10, 200))
    })
}

// ── Customer database (mock) ─────────────────────────────────────────────────

pub fn user_profile(user_id: &str) -> Value {
    json!({
        "user_id": user_id,
        "name": format!("User_{}", user_id),
        "email": format!("user_{}@example.com", user_id),
        "created": "2024-01-15"
    })
}

pub fn order_summary(user_id: &str) -> Value {
    json!({
        "user_id": user_id,
        "total_orders": fingerprint(user_id, 1, 50),
        "total_spent": format!("${}", fingerprint(&format!("spent:{}", user_id), 100, 5000))
    })
}

// ── Side-effecting operations (mock) ─────────────────────────────────────────

pub fn notification(user_id: &str, message: &str) -> Value {
    json!({
        "user_id": user_id,
        "message": message,
        "status": "sent",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

/// Issue a refund. Fails for amounts that are not strictly positive.
pub fn refund(order_id: &str, amount: f64) -> Result<Value, CommerceError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CommerceError::InvalidAmount {
            order_id: order_id.to_string(),
            amount,
        });
    }
    Ok(json!({
        "order_id": order_id,
        "amount": amount,
        "status": "processed",
        "refund_id": format!("REF-{}", fingerprint(order_id, 10000, 99999))
    }))
}
