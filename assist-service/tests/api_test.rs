//! End-to-end API tests against a live service instance.
//!
//! Requires `TEST_MONGODB_URI`; each test runs in its own database.

mod common;

use common::TestApp;
use mongodb::bson::doc;
use serde_json::{json, Value};

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = require_mongodb!(TestApp::spawn());

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn register_login_and_fetch_identity() {
    let app = require_mongodb!(TestApp::spawn());

    let response = app
        .client
        .post(format!("{}/auth/register", app.address))
        .json(&json!({
            "name": "Alice",
            "email": "alice@example.com",
            "password": "password123",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    // Wrong password twice, then the right one.
    for _ in 0..2 {
        let response = app
            .client
            .post(format!("{}/auth/login", app.address))
            .json(&json!({ "email": "alice@example.com", "password": "wrong-password" }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 401);
        let body: Value = response.json().await.expect("Invalid JSON");
        assert_eq!(body["error"], "Invalid credentials");
    }

    let response = app
        .client
        .post(format!("{}/auth/login", app.address))
        .json(&json!({ "email": "alice@example.com", "password": "password123" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["user"]["email"], "alice@example.com");

    // The login set an httpOnly cookie; the identity endpoint honors it.
    let response = app
        .client
        .get(format!("{}/auth/user", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["user"]["name"], "Alice");
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = require_mongodb!(TestApp::spawn());

    for expected_status in [201, 400] {
        let response = app
            .client
            .post(format!("{}/auth/register", app.address))
            .json(&json!({
                "name": "Bob",
                "email": "bob@example.com",
                "password": "password123",
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), expected_status);
    }
}

#[tokio::test]
async fn anonymous_faq_query_is_rejected_without_side_effects() {
    let app = require_mongodb!(TestApp::spawn_low_confidence());

    let response = app
        .client
        .post(format!("{}/faq", app.address))
        .json(&json!({ "message": "How do I reset my password?" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
    let count = app
        .db
        .tickets()
        .count_documents(doc! {}, None)
        .await
        .expect("Failed to count tickets");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn low_confidence_query_opens_exactly_one_pending_ticket() {
    let app = require_mongodb!(TestApp::spawn_low_confidence());
    app.register_and_login("Carol", "carol@example.com", "password123")
        .await;

    let question = "How do I transfer my license to a new machine?";
    let response = app
        .client
        .post(format!("{}/faq", app.address))
        .json(&json!({ "message": question }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["forwarded_to_helpdesk"], true);
    assert!(body["answer"]
        .as_str()
        .expect("answer missing")
        .contains("forwarded your query"));

    let tickets: Vec<assist_service::models::Ticket> = {
        let cursor = app
            .db
            .tickets()
            .find(doc! {}, None)
            .await
            .expect("Failed to query tickets");
        futures::TryStreamExt::try_collect(cursor)
            .await
            .expect("Failed to collect tickets")
    };
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].question, question);
    assert_eq!(
        tickets[0].status,
        assist_service::models::TicketStatus::Pending
    );
    assert_eq!(tickets[0].user_email, "carol@example.com");
}

#[tokio::test]
async fn high_confidence_query_answers_without_a_ticket() {
    let app = require_mongodb!(TestApp::spawn());
    app.register_and_login("Dave", "dave@example.com", "password123")
        .await;

    let response = app
        .client
        .post(format!("{}/faq", app.address))
        .json(&json!({ "message": "What are your business hours?" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["forwarded_to_helpdesk"], false);
    assert_eq!(body["answer"], "Canned answer.");

    let count = app
        .db
        .tickets()
        .count_documents(doc! {}, None)
        .await
        .expect("Failed to count tickets");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn empty_faq_message_is_a_bad_request() {
    let app = require_mongodb!(TestApp::spawn());
    app.register_and_login("Eve", "eve@example.com", "password123")
        .await;

    for payload in [json!({}), json!({ "message": "" }), json!({ "message": "   " })] {
        let response = app
            .client
            .post(format!("{}/faq", app.address))
            .json(&payload)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 400);
    }
}

#[tokio::test]
async fn unreachable_faq_model_degrades_to_an_in_band_apology() {
    let app = require_mongodb!(TestApp::spawn_unreachable_faq());
    app.register_and_login("Peggy", "peggy@example.com", "password123")
        .await;

    let response = app
        .client
        .post(format!("{}/faq", app.address))
        .json(&json!({ "message": "Is the service down?" }))
        .send()
        .await
        .expect("Failed to execute request");

    // The chat stays usable: a 200 with an apology, not a gateway error.
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["answer"], assist_service::services::UPSTREAM_APOLOGY);
    assert_eq!(body["confidence_score"], 0.0);
    assert_eq!(body["forwarded_to_helpdesk"], false);

    let count = app
        .db
        .tickets()
        .count_documents(doc! {}, None)
        .await
        .expect("Failed to count tickets");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn saving_a_session_twice_under_one_title_keeps_one_session() {
    let app = require_mongodb!(TestApp::spawn());
    app.register_and_login("Frank", "frank@example.com", "password123")
        .await;

    let first_save = json!({
        "title": "License questions",
        "messages": [
            { "id": "m1", "content": "Hi", "sender": "user",
              "timestamp": "2024-06-15T10:00:00Z" },
        ],
    });
    let second_save = json!({
        "title": "License questions",
        "messages": [
            { "id": "m1", "content": "Hi", "sender": "user",
              "timestamp": "2024-06-15T10:00:00Z" },
            { "id": "m2", "content": "Hello!", "sender": "bot",
              "timestamp": "2024-06-15T10:00:05Z", "confidence_score": 0.97 },
        ],
    });

    for payload in [&first_save, &second_save] {
        let response = app
            .client
            .post(format!("{}/chat/sessions", app.address))
            .json(payload)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200);
    }

    let response = app
        .client
        .get(format!("{}/chat/sessions", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Invalid JSON");
    let sessions = body["sessions"].as_array().expect("sessions missing");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["messages"].as_array().map(Vec::len), Some(2));

    // Fetching by id returns the same session under its envelope.
    let session_id = sessions[0]["id"].as_str().expect("session id missing");
    let response = app
        .client
        .get(format!("{}/chat/sessions/{}", app.address, session_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["session"]["id"], session_id);
    assert_eq!(body["session"]["title"], "License questions");
    assert_eq!(body["session"]["messages"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn sessions_are_invisible_to_other_users() {
    let app = require_mongodb!(TestApp::spawn());
    app.register_and_login("Grace", "grace@example.com", "password123")
        .await;

    let response = app
        .client
        .post(format!("{}/chat/sessions", app.address))
        .json(&json!({ "title": "Private chat", "messages": [] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    let session_id = body["session"]["id"]
        .as_str()
        .expect("session id missing")
        .to_string();

    // A second browser session for another user.
    let other = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build HTTP client");
    let other_app = TestApp {
        address: app.address.clone(),
        db: app.db.clone(),
        client: other,
    };
    other_app
        .register_and_login("Heidi", "heidi@example.com", "password123")
        .await;

    let response = other_app
        .client
        .get(format!("{}/chat/sessions", other_app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["sessions"].as_array().map(Vec::len), Some(0));

    // Fetching or deleting by id across users is a plain 404.
    let response = other_app
        .client
        .get(format!("{}/chat/sessions/{}", other_app.address, session_id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);

    let response = other_app
        .client
        .delete(format!(
            "{}/chat/sessions?sessionId={}",
            other_app.address, session_id
        ))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn renaming_to_an_existing_title_is_rejected() {
    let app = require_mongodb!(TestApp::spawn());
    app.register_and_login("Ivan", "ivan@example.com", "password123")
        .await;

    let mut ids = Vec::new();
    for title in ["First", "Second"] {
        let response = app
            .client
            .post(format!("{}/chat/sessions", app.address))
            .json(&json!({ "title": title, "messages": [] }))
            .send()
            .await
            .expect("Failed to execute request");
        let body: Value = response.json().await.expect("Invalid JSON");
        ids.push(
            body["session"]["id"]
                .as_str()
                .expect("session id missing")
                .to_string(),
        );
    }

    let response = app
        .client
        .put(format!("{}/chat/sessions", app.address))
        .json(&json!({ "sessionId": ids[1], "title": "First", "messages": [] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["error"], "A session with this title already exists");
}

#[tokio::test]
async fn ticket_lifecycle_feeds_knowledge_base_and_notifications() {
    let app = require_mongodb!(TestApp::spawn_low_confidence());
    app.register_and_login("Judy", "judy@example.com", "password123")
        .await;

    // Escalate a question.
    let response = app
        .client
        .post(format!("{}/faq", app.address))
        .json(&json!({ "message": "Can I get a refund after 60 days?" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    // The operator picks it up.
    app.helpdesk_login().await;
    let response = app
        .client
        .get(format!("{}/helpdesk/tickets", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    let tickets = body["tickets"].as_array().expect("tickets missing");
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["status"], "pending");
    let ticket_id = tickets[0]["id"].as_str().expect("ticket id missing").to_string();

    let response = app
        .client
        .post(format!("{}/helpdesk/tickets/{}", app.address, ticket_id))
        .json(&json!({ "answer": "Refunds are available within 90 days." }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    // The answer lands in the knowledge base, keyed by ticket.
    let faq_count = app
        .db
        .faqs()
        .count_documents(doc! {}, None)
        .await
        .expect("Failed to count knowledge-base entries");
    assert_eq!(faq_count, 1);

    // The user sees the answer in the notification feed.
    let response = app
        .client
        .get(format!("{}/user/notifications", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    let notifications = body["tickets"].as_array().expect("tickets missing");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["seen"], false);
    assert_eq!(
        notifications[0]["answer"],
        "Refunds are available within 90 days."
    );

    let response = app
        .client
        .put(format!("{}/user/notifications", app.address))
        .json(&json!({ "ticketId": ticket_id }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["success"], true);

    // Another user cannot mark it.
    let other = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build HTTP client");
    let other_app = TestApp {
        address: app.address.clone(),
        db: app.db.clone(),
        client: other,
    };
    other_app
        .register_and_login("Mallory", "mallory@example.com", "password123")
        .await;
    let response = other_app
        .client
        .put(format!("{}/user/notifications", other_app.address))
        .json(&json!({ "ticketId": ticket_id }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn tickets_can_be_rejected_or_removed() {
    let app = require_mongodb!(TestApp::spawn());
    app.helpdesk_login().await;

    let mut ids = Vec::new();
    for question in ["First question?", "Second question?"] {
        let response = app
            .client
            .post(format!("{}/helpdesk/tickets", app.address))
            .json(&json!({
                "userId": "64f000000000000000000001",
                "userEmail": "walkin@example.com",
                "question": question,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.expect("Invalid JSON");
        ids.push(body["ticket"]["id"].as_str().expect("ticket id missing").to_string());
    }

    // Default close is a reject; the document stays for analytics.
    let response = app
        .client
        .delete(format!("{}/helpdesk/tickets/{}", app.address, ids[0]))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    // Explicit remove deletes outright.
    let response = app
        .client
        .delete(format!(
            "{}/helpdesk/tickets/{}?action=remove",
            app.address, ids[1]
        ))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let count = app
        .db
        .tickets()
        .count_documents(doc! {}, None)
        .await
        .expect("Failed to count tickets");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn helpdesk_surface_requires_the_operator_token() {
    let app = require_mongodb!(TestApp::spawn());

    // No cookie at all.
    let response = app
        .client
        .get(format!("{}/helpdesk/tickets", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);

    // A valid user token is not an operator token.
    app.register_and_login("Niaj", "niaj@example.com", "password123")
        .await;
    let response = app
        .client
        .get(format!("{}/helpdesk/queries/stats", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);

    // Wrong operator credentials never mint a cookie.
    let response = app
        .client
        .post(format!("{}/helpdesk/login", app.address))
        .json(&json!({ "email": common::HELPDESK_EMAIL, "password": "nope" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn stats_reflect_the_ticket_snapshot() {
    let app = require_mongodb!(TestApp::spawn_low_confidence());
    app.register_and_login("Olivia", "olivia@example.com", "password123")
        .await;

    for message in ["Question one?", "Question two?"] {
        let response = app
            .client
            .post(format!("{}/faq", app.address))
            .json(&json!({ "message": message }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200);
    }

    app.helpdesk_login().await;
    let response = app
        .client
        .get(format!("{}/helpdesk/tickets", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Invalid JSON");
    let ticket_id = body["tickets"][0]["id"].as_str().expect("ticket id missing").to_string();

    let response = app
        .client
        .post(format!("{}/helpdesk/tickets/{}", app.address, ticket_id))
        .json(&json!({ "answer": "Answered." }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .client
        .get(format!("{}/helpdesk/queries/stats", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let stats: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(stats["totalTickets"], 2);
    assert_eq!(stats["pendingTickets"], 1);
    assert_eq!(stats["answeredTickets"], 1);
    assert_eq!(stats["resolutionRate"], 100);
    assert_eq!(stats["totalUsers"], 1);
    assert_eq!(stats["ticketsPerDay"].as_array().map(Vec::len), Some(7));
    // Both questions were filed today.
    let per_day = stats["ticketsPerDay"].as_array().expect("ticketsPerDay missing");
    assert_eq!(per_day[6], 2);
}
