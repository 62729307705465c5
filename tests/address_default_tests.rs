//! Address-book behaviour against a real Postgres (`TEST_DATABASE_URL`).

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{authed_json_request, authed_request, body_json, create_db_app, json_request};
use storefront_backend::{
    auth::Role,
    database::{
        AddressBook, AddressFields, AddressRepository, AddressType, CredentialStore, NewLoginSession,
        NewUser, SessionRepository, StoreError, UserRepository,
    },
};

async fn create_user(pool: &PgPool, prefix: &str) -> i64 {
    let suffix = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    UserRepository::new(pool.clone())
        .create_user(NewUser {
            username: format!("{}_{}", prefix, suffix),
            email: format!("{}_{}@example.com", prefix, suffix),
            password_hash: "$2b$04$not-a-real-hash".into(),
            role: Role::User,
            phone_number: None,
            image: None,
            is_verified: false,
            is_blocked: false,
        })
        .await
        .unwrap()
        .id
}

fn fields(line: &str) -> AddressFields {
    AddressFields {
        address_line1: line.into(),
        city: "Springfield".into(),
        country: "US".into(),
        postal_code: "12345".into(),
        address_type: AddressType::Home,
    }
}

async fn defaults(repo: &AddressRepository, user_id: i64, book: AddressBook) -> Vec<i64> {
    repo.list(user_id, book)
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.is_default == Some(true))
        .map(|a| a.id)
        .collect()
}

#[tokio::test]
async fn first_billing_address_is_default() {
    let pool = require_database!();
    let user_id = create_user(&pool, "billing").await;
    let repo = AddressRepository::new(pool.clone());

    let first = repo
        .add(user_id, AddressBook::Billing, &fields("1 Main St"))
        .await
        .unwrap();
    let second = repo
        .add(user_id, AddressBook::Billing, &fields("2 Main St"))
        .await
        .unwrap();

    assert_eq!(first.is_default, Some(true));
    assert_eq!(second.is_default, Some(false));
    assert_eq!(
        defaults(&repo, user_id, AddressBook::Billing).await,
        vec![first.id]
    );
}

#[tokio::test]
async fn set_default_moves_the_single_default() {
    let pool = require_database!();
    let user_id = create_user(&pool, "shipping").await;
    let repo = AddressRepository::new(pool.clone());

    let a = repo
        .add(user_id, AddressBook::Shipping, &fields("A St"))
        .await
        .unwrap();
    let b = repo
        .add(user_id, AddressBook::Shipping, &fields("B St"))
        .await
        .unwrap();

    repo.set_default(user_id, AddressBook::Shipping, b.id)
        .await
        .unwrap();
    assert_eq!(
        defaults(&repo, user_id, AddressBook::Shipping).await,
        vec![b.id]
    );

    repo.set_default(user_id, AddressBook::Shipping, a.id)
        .await
        .unwrap();
    assert_eq!(
        defaults(&repo, user_id, AddressBook::Shipping).await,
        vec![a.id]
    );
}

#[tokio::test]
async fn set_default_is_idempotent() {
    let pool = require_database!();
    let user_id = create_user(&pool, "idem").await;
    let repo = AddressRepository::new(pool.clone());

    let a = repo
        .add(user_id, AddressBook::Billing, &fields("A St"))
        .await
        .unwrap();

    for _ in 0..2 {
        repo.set_default(user_id, AddressBook::Billing, a.id)
            .await
            .unwrap();
        assert_eq!(
            defaults(&repo, user_id, AddressBook::Billing).await,
            vec![a.id]
        );
    }
}

#[tokio::test]
async fn set_default_on_foreign_address_is_not_found() {
    let pool = require_database!();
    let owner = create_user(&pool, "owner").await;
    let other = create_user(&pool, "other").await;
    let repo = AddressRepository::new(pool.clone());

    let a = repo
        .add(owner, AddressBook::Shipping, &fields("A St"))
        .await
        .unwrap();

    let err = repo
        .set_default(other, AddressBook::Shipping, a.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
    assert_eq!(
        defaults(&repo, owner, AddressBook::Shipping).await,
        vec![a.id]
    );
}

#[tokio::test]
async fn general_book_has_no_default_flag() {
    let pool = require_database!();
    let user_id = create_user(&pool, "general").await;
    let repo = AddressRepository::new(pool.clone());

    let added = repo
        .add(user_id, AddressBook::General, &fields("A St"))
        .await
        .unwrap();
    assert_eq!(added.is_default, None);

    let address = repo
        .find(user_id, AddressBook::General, added.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(address.is_default, None);
    assert_eq!(address.address_type, "home");
}

#[tokio::test]
async fn concurrent_adds_for_one_user_leave_exactly_one_default() {
    let pool = require_database!();
    let user_id = create_user(&pool, "race").await;

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let repo = AddressRepository::new(pool.clone());
            tokio::spawn(async move {
                repo.add(user_id, AddressBook::Shipping, &fields(&format!("{} Race St", i)))
                    .await
            })
        })
        .collect();

    let mut added = Vec::new();
    for task in tasks {
        added.push(task.await.unwrap().expect("add failed under contention"));
    }

    assert_eq!(added.len(), 4);
    assert_eq!(
        added.iter().filter(|a| a.is_default == Some(true)).count(),
        1
    );
    let repo = AddressRepository::new(pool.clone());
    assert_eq!(defaults(&repo, user_id, AddressBook::Shipping).await.len(), 1);
}

#[tokio::test]
async fn set_default_for_different_users_never_contends() {
    let pool = require_database!();
    let repo = AddressRepository::new(pool.clone());

    let mut targets = Vec::new();
    for i in 0..6 {
        let user_id = create_user(&pool, &format!("parallel{}", i)).await;
        repo.add(user_id, AddressBook::Shipping, &fields("A St"))
            .await
            .unwrap();
        let second = repo
            .add(user_id, AddressBook::Shipping, &fields("B St"))
            .await
            .unwrap();
        targets.push((user_id, second.id));
    }

    for _ in 0..3 {
        let tasks: Vec<_> = targets
            .iter()
            .map(|&(user_id, address_id)| {
                let repo = AddressRepository::new(pool.clone());
                tokio::spawn(async move {
                    repo.set_default(user_id, AddressBook::Shipping, address_id)
                        .await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().expect("set_default failed for an unrelated user");
        }
    }

    for (user_id, address_id) in targets {
        assert_eq!(
            defaults(&repo, user_id, AddressBook::Shipping).await,
            vec![address_id]
        );
    }
}

#[tokio::test]
async fn set_default_over_http_returns_address_id() {
    let pool = require_database!();
    let app = create_db_app(pool.clone());
    let suffix = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let username = format!("http_{}", suffix);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/register",
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "s3cret-password",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            json!({ "identifier": username, "password": "s3cret-password" }),
        ))
        .await
        .unwrap();
    let tokens = body_json(response).await;
    let access = tokens["access_token"].as_str().unwrap().to_string();

    let address = json!({
        "address_line1": "1 Main St",
        "city": "Springfield",
        "country": "US",
        "postal_code": "12345",
        "type": "home",
    });
    let mut ids = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(authed_json_request(
                "POST",
                "/user/shipping-address",
                &access,
                address.clone(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        ids.push(body_json(response).await["address_id"].as_i64().unwrap());
    }

    let uri = format!("/user/shipping-address/{}/default", ids[1]);
    let response = app
        .clone()
        .oneshot(authed_request("PATCH", &uri, &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["address_id"], ids[1]);
    assert_eq!(body["message"], "Shipping address set as default");

    let response = app
        .oneshot(authed_request("GET", "/user/shipping-address", &access))
        .await
        .unwrap();
    let listed = body_json(response).await;
    let defaults: Vec<i64> = listed["addresses"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["is_default"] == true)
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(defaults, vec![ids[1]]);
}

#[tokio::test]
async fn deleting_a_user_removes_sessions_and_addresses() {
    let pool = require_database!();
    let user_id = create_user(&pool, "cascade").await;
    let addresses = AddressRepository::new(pool.clone());
    let sessions = SessionRepository::new(pool.clone());
    let users = UserRepository::new(pool.clone());

    addresses
        .add(user_id, AddressBook::Billing, &fields("A St"))
        .await
        .unwrap();
    sessions
        .insert(NewLoginSession {
            user_id,
            browser: "curl".into(),
            os: "Unknown".into(),
            device: "Other".into(),
            ip_address: "127.0.0.1".into(),
        })
        .await
        .unwrap();

    users.delete(user_id).await.unwrap();

    assert!(users.find_user_by_id(user_id).await.unwrap().is_none());
    assert!(sessions.list_for_user(user_id).await.unwrap().is_empty());
    assert!(
        addresses
            .list(user_id, AddressBook::Billing)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(matches!(
        users.delete(user_id).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn add_for_unknown_user_is_not_found() {
    let pool = require_database!();
    let repo = AddressRepository::new(pool.clone());

    let err = repo
        .add(i64::MAX, AddressBook::Billing, &fields("A St"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}
