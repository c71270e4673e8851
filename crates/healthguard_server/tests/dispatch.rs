use std::sync::Arc;

use async_trait::async_trait;
use healthguard_advisor::{
    AdvisorClient, AdvisorError, FoodItem, RecommendationEngine, ScriptedRandom, WeatherRules,
    WeatherSnapshot,
};
use healthguard_server::{Dispatcher, MemoryStore, Request, Response, Status};
use serde_json::{Value, json};

struct ClearSkies;

#[async_trait]
impl AdvisorClient for ClearSkies {
    async fn fetch_weather(&self) -> Result<WeatherSnapshot, AdvisorError> {
        Ok(WeatherSnapshot {
            temperature: 22.0,
            description: "晴".into(),
            display_text: "Today 北京市 晴 22°C".into(),
        })
    }

    async fn fetch_foods(&self) -> Result<Vec<FoodItem>, AdvisorError> {
        Ok(vec![
            FoodItem {
                name: "Ham, cooked".into(),
                calories_per_100g: 145.0,
                protein_per_100g: 20.0,
                sodium_mg_per_100g: 1200.0,
            },
            FoodItem {
                name: "Cod, baked".into(),
                calories_per_100g: 105.0,
                protein_per_100g: 23.0,
                sodium_mg_per_100g: 78.0,
            },
        ])
    }
}

fn dispatcher() -> Dispatcher {
    let engine = RecommendationEngine::new(
        Arc::new(ClearSkies),
        Arc::new(ScriptedRandom::always(0)),
        WeatherRules::default(),
    );
    Dispatcher::new(Arc::new(MemoryStore::new()), Arc::new(engine))
}

async fn call(d: &Dispatcher, action: &str, payload: Value) -> Response {
    d.handle(Request {
        action: action.into(),
        payload,
    })
    .await
}

async fn ok_data(d: &Dispatcher, action: &str, payload: Value) -> Value {
    let resp = call(d, action, payload).await;
    assert_eq!(resp.status, Status::Success, "{action}: {:?}", resp.message);
    resp.data.unwrap_or(Value::Null)
}

async fn register_and_login(d: &Dispatcher, name: &str) -> i64 {
    let resp = call(d, "register", json!({"username": name, "password": "secret1", "age": 30})).await;
    assert!(resp.is_success(), "{:?}", resp.message);
    let session = ok_data(d, "login", json!({"username": name, "password": "secret1"})).await;
    assert_eq!(session["role"], "user");
    session["id"].as_i64().unwrap()
}

#[tokio::test]
async fn register_login_and_duplicate() {
    let d = dispatcher();
    let id = register_and_login(&d, "amy").await;
    assert!(id > 1);

    let dup = call(&d, "register", json!({"username": "amy", "password": "secret1"})).await;
    assert_eq!(dup.status, Status::Error);

    let bad = call(&d, "login", json!({"username": "amy", "password": "wrong!!"})).await;
    assert_eq!(bad.status, Status::Error);

    let short = call(&d, "register", json!({"username": "bob", "password": "123"})).await;
    assert_eq!(short.status, Status::Error);

    let admin = ok_data(&d, "login", json!({"username": "admin", "password": "123456"})).await;
    assert_eq!(admin["role"], "admin");
}

#[tokio::test]
async fn records_stats_and_recommendation() {
    let d = dispatcher();
    let id = register_and_login(&d, "amy").await;

    for (date, sys, weight) in [("2025-03-02", 150, 71.0), ("2025-03-01", 118, 70.0)] {
        let resp = call(
            &d,
            "add_record",
            json!({"user_id": id, "date": date, "weight": weight, "sys_bp": sys, "dia_bp": 80}),
        )
        .await;
        assert!(resp.is_success(), "{:?}", resp.message);
    }
    let bad_date = call(&d, "add_record", json!({"user_id": id, "date": "03/01/2025"})).await;
    assert_eq!(bad_date.status, Status::Error);

    let records = ok_data(&d, "get_records", json!({"user_id": id})).await;
    let dates: Vec<_> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["record_date"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(dates, vec!["2025-03-01", "2025-03-02"]);

    let stats = ok_data(&d, "get_sys_stats", Value::Null).await;
    assert_eq!(stats, json!({"user_count": 1, "avg_weight": 70.5, "total_records": 2}));

    // latest record is 150/80, so the low-sodium dish is chosen
    let rec = ok_data(&d, "get_recommendation", json!({"user_id": id})).await;
    assert_eq!(rec["raw"]["bp_high"], true);
    assert_eq!(rec["raw"]["indoor"], false);
    assert_eq!(rec["raw"]["food"]["name"], "Cod, baked");
    assert!(rec["text"].as_str().unwrap().contains("BP elevated (150/80)"));

    let empty = ok_data(&d, "get_recommendation", json!({"user_id": 999})).await;
    assert_eq!(empty["raw"]["bp_high"], false);
}

#[tokio::test]
async fn profile_updates_and_hides_password() {
    let d = dispatcher();
    let id = register_and_login(&d, "amy").await;

    let empty = call(&d, "update_profile", json!({"user_id": id, "profile_data": {}})).await;
    assert_eq!(empty.status, Status::Error);

    let resp = call(
        &d,
        "update_profile",
        json!({"user_id": id, "profile_data": {"height": 168.0, "blood_type": "A"}}),
    )
    .await;
    assert!(resp.is_success());

    let profile = ok_data(&d, "get_profile", json!({"user_id": id})).await;
    assert_eq!(profile["height"], 168.0);
    assert_eq!(profile["blood_type"], "A");
    assert_eq!(profile["age"], 30);
    assert!(profile.get("password_hash").is_none());

    let missing = ok_data(&d, "get_profile", json!({"user_id": 999})).await;
    assert!(missing.is_null());
}

#[tokio::test]
async fn care_plan_actions() {
    let d = dispatcher();
    let id = register_and_login(&d, "amy").await;

    for start in ["2025-01-01", "2025-02-01"] {
        let resp = call(
            &d,
            "add_medication",
            json!({"user_id": id, "medicine_name": "Amlodipine", "dosage": "5mg",
                   "frequency": "daily", "start_date": start}),
        )
        .await;
        assert!(resp.is_success(), "{:?}", resp.message);
    }
    let meds = ok_data(&d, "get_medications", json!({"user_id": id})).await;
    assert_eq!(meds[0]["start_date"], "2025-02-01");
    let med_id = meds[0]["id"].as_i64().unwrap();
    assert!(call(&d, "delete_medication", json!({"med_id": med_id})).await.is_success());
    assert_eq!(call(&d, "delete_medication", json!({"med_id": med_id})).await.status, Status::Error);

    let resp = call(
        &d,
        "add_goal",
        json!({"user_id": id, "goal_type": "weight", "target_value": 65.0,
               "current_value": 70.0, "start_date": "2025-01-01", "end_date": "2025-06-01"}),
    )
    .await;
    assert!(resp.is_success(), "{:?}", resp.message);
    let goals = ok_data(&d, "get_goals", json!({"user_id": id})).await;
    let goal_id = goals[0]["id"].as_i64().unwrap();
    assert!(
        call(&d, "update_goal_progress", json!({"goal_id": goal_id, "current_value": 68.5}))
            .await
            .is_success()
    );
    let goals = ok_data(&d, "get_goals", json!({"user_id": id})).await;
    assert_eq!(goals[0]["current_value"], 68.5);
    assert_eq!(goals[0]["status"], "active");

    for time in ["21:00", "08:00"] {
        let resp = call(
            &d,
            "add_reminder",
            json!({"user_id": id, "reminder_type": "medication", "title": "pill", "reminder_time": time}),
        )
        .await;
        assert!(resp.is_success(), "{:?}", resp.message);
    }
    let reminders = ok_data(&d, "get_reminders", json!({"user_id": id})).await;
    assert_eq!(reminders[0]["reminder_time"], "08:00");
    assert_eq!(reminders[0]["repeat_type"], "once");

    let resp = call(
        &d,
        "add_diet",
        json!({"user_id": id, "record_date": "2025-03-01", "meal_type": "lunch",
               "food_description": "rice and fish"}),
    )
    .await;
    assert!(resp.is_success(), "{:?}", resp.message);
    let diet = ok_data(&d, "get_diet_records", json!({"user_id": id, "date": "2025-03-01"})).await;
    assert_eq!(diet[0]["calories"], 0);
    let other_day = ok_data(&d, "get_diet_records", json!({"user_id": id, "date": "2025-03-02"})).await;
    assert_eq!(other_day, json!([]));
}

#[tokio::test]
async fn admin_user_management_and_notifications() {
    let d = dispatcher();
    let amy = register_and_login(&d, "amy").await;
    register_and_login(&d, "bob").await;

    let users = ok_data(&d, "list_users", json!({"query": "am"})).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["username"], "amy");

    assert!(call(&d, "send_notification", json!({"user_id": amy, "message": "check in"})).await.is_success());
    assert!(call(&d, "send_notification", json!({"user_id": amy, "message": "drink water"})).await.is_success());
    let unread = ok_data(&d, "get_notifications", json!({"user_id": amy})).await;
    assert_eq!(unread[0]["message"], "drink water");
    let first = unread[1]["id"].as_i64().unwrap();
    assert!(call(&d, "mark_notification_read", json!({"notif_id": first})).await.is_success());
    let unread = ok_data(&d, "get_notifications", json!({"user_id": amy})).await;
    assert_eq!(unread.as_array().unwrap().len(), 1);
    let all = ok_data(&d, "get_notifications", json!({"user_id": amy, "only_unread": false})).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    assert!(call(&d, "delete_user", json!({"user_id": amy})).await.is_success());
    let users = ok_data(&d, "list_users", Value::Null).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    let stats = ok_data(&d, "get_sys_stats", Value::Null).await;
    assert_eq!(stats["user_count"], 1);
}

#[tokio::test]
async fn unknown_action_and_missing_recorder() {
    let d = dispatcher();
    let resp = call(&d, "drop_tables", Value::Null).await;
    assert_eq!(resp.status, Status::Error);
    assert_eq!(resp.message.as_deref(), Some("Unknown action"));

    let resp = call(&d, "metrics", Value::Null).await;
    assert_eq!(resp.status, Status::Error);

    let resp = call(&d, "get_records", json!({"user": 1})).await;
    assert_eq!(resp.status, Status::Error);
    assert!(resp.message.unwrap().contains("invalid payload"));
}
