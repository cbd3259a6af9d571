//! Canned server payloads shared by the integration tests

use serde_json::json;

use registration_client::models::{
    AggregatedProfile, DlqEntry, ErrorLogEntry, FailedMessage, RegistrationInput,
    RegistrationReceipt, StatsSnapshot,
};

pub fn first_year_input() -> RegistrationInput {
    RegistrationInput {
        student_name: "A B".to_string(),
        student_id: "S1".to_string(),
        email: "a@b.edu".to_string(),
        program: "Engineering".to_string(),
        year_level: "First Year".to_string(),
    }
}

pub fn returning_input() -> RegistrationInput {
    RegistrationInput {
        student_name: "C D".to_string(),
        student_id: "S2".to_string(),
        email: "c@d.edu".to_string(),
        program: "History".to_string(),
        year_level: "Third Year".to_string(),
    }
}

pub fn first_year_receipt() -> RegistrationReceipt {
    serde_json::from_value(json!({
        "success": true,
        "message": "Registration submitted successfully",
        "registrationId": 101,
        "status": "PENDING",
        "isFirstYear": true,
        "routedTo": ["Housing System", "Library System"],
        "routingMessage": "First-year student routed to Housing and Library",
        "translationChain": {
            "originalFormat": "JSON",
            "translationSteps": [
                {"translatorName": "JsonToXml", "fromFormat": "JSON", "toFormat": "XML", "durationMs": 4},
                {"translatorName": "XmlToCsv", "fromFormat": "XML", "toFormat": "CSV", "durationMs": 3}
            ],
            "totalTranslationTimeMs": 7,
            "successful": true
        }
    }))
    .unwrap()
}

pub fn returning_receipt() -> RegistrationReceipt {
    serde_json::from_value(json!({
        "success": true,
        "message": "Registration submitted successfully",
        "registrationId": 102,
        "status": "PENDING",
        "isFirstYear": false,
        "routedTo": ["Billing System", "Library System"],
        "routingMessage": "Returning student routed to Billing and Library"
    }))
    .unwrap()
}

/// Profile for the first-year student: housing and library only
pub fn first_year_profile() -> AggregatedProfile {
    serde_json::from_value(json!({
        "studentId": "S1",
        "studentName": "A B",
        "program": "Engineering",
        "yearLevel": "First Year",
        "aggregationStatus": "COMPLETE",
        "responsesReceived": 2,
        "responsesExpected": 2,
        "aggregationTimeMs": 5004,
        "housing": {"building": "North Hall", "roomNumber": "214"},
        "library": {"libraryCardNumber": "LIB-S1", "maxBooksAllowed": 5}
    }))
    .unwrap()
}

pub fn stats(messages_in_dlq: u64) -> StatsSnapshot {
    serde_json::from_value(json!({
        "totalFailedMessages": 4,
        "messagesInDlq": messages_in_dlq,
        "pendingRetry": 1,
        "retrySuccess": 2,
        "totalErrors": 9,
        "unresolvedErrors": 3,
        "awaitingManualRetry": messages_in_dlq,
        "manualRetrySuccess": 0,
        "errorsByCategory": {"NETWORK_TIMEOUT": 5, "INVALID_DATA": 4},
        "errorsByStage": {"ROUTING": 6, "TRANSLATION": 3}
    }))
    .unwrap()
}

pub fn failed_message(id: i64) -> FailedMessage {
    serde_json::from_value(json!({
        "id": id,
        "studentId": format!("S{}", id),
        "studentName": "E F",
        "failureStage": "ROUTING",
        "errorCategory": "NETWORK_TIMEOUT",
        "errorMessage": "Housing System did not respond",
        "status": "PENDING_RETRY",
        "retryAttempts": 1,
        "maxRetryAttempts": 3,
        "nextRetryAt": "2025-03-01T10:16:00"
    }))
    .unwrap()
}

pub fn dlq_entry(id: i64) -> DlqEntry {
    serde_json::from_value(json!({
        "id": id,
        "studentId": format!("S{}", id),
        "studentName": "G H",
        "email": "g@h.edu",
        "failureStage": "AGGREGATION",
        "errorCategory": "SYSTEM_DOWN",
        "status": "AWAITING_MANUAL_RETRY",
        "retryAttempts": 3,
        "maxRetryAttempts": 3,
        "movedToDlqAt": "2025-03-01T10:20:00",
        "retryHistory": "[2025-03-01 10:15:30] Attempt 1: FAILED - Scheduling next retry in 30 seconds\n[2025-03-01 10:16:00] Attempt 2: FAILED - Moving to DLQ"
    }))
    .unwrap()
}

pub fn error_log_entry(id: i64, category: &str) -> ErrorLogEntry {
    serde_json::from_value(json!({
        "id": id,
        "errorTimestamp": "2025-03-01T10:15:30",
        "studentName": "A B",
        "studentId": "S1",
        "errorStage": "ROUTING",
        "errorCategory": category,
        "errorMessage": "Housing System unavailable",
        "severity": "ERROR",
        "resolved": false
    }))
    .unwrap()
}
